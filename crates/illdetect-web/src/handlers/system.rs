//! Service-level endpoints: index, health, status, ML collaborator probe.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde_json::json;

use crate::state::SharedState;

/// GET / — API index document.
pub async fn api_info(State(state): State<SharedState>) -> impl IntoResponse {
    Json(json!({
        "message": "IllDetect API - Cardiovascular Risk Prediction",
        "version": state.config.api_version,
        "status": "active",
        "endpoints": {
            "health":      "GET /api/health - Check API health status",
            "status":      "GET /api/status - Get server status",
            "predict":     "POST /api/predict - Submit cardiovascular prediction",
            "predictions": "GET /api/predictions - Get prediction history",
            "statistics":  "GET /api/statistics - Get prediction statistics",
            "ml_health":   "GET /api/ml-health - Check ML service connectivity"
        }
    }))
}

/// GET /api/health — service health including store connectivity.
pub async fn health(State(state): State<SharedState>) -> impl IntoResponse {
    let store_ok = state.store.ping().await;
    Json(json!({
        "success": true,
        "message": "IllDetect API is healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "uptime": state.uptime_secs(),
        "version": state.config.api_version,
        "database_status": if store_ok { "connected" } else { "error" },
    }))
}

/// GET /api/status — lightweight status report.
pub async fn status(State(state): State<SharedState>) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "message": "IllDetect API is running",
        "timestamp": Utc::now().to_rfc3339(),
        "uptime": state.uptime_secs(),
        "version": state.config.api_version,
    }))
}

/// GET /api/ml-health — probe the ML collaborator's health endpoints.
///
/// Reporting only: estimation never waits on this, and an unreachable
/// model still leaves the rule-based fallback available.
pub async fn ml_health(State(state): State<SharedState>) -> impl IntoResponse {
    let Some(client) = state.estimator.remote_client() else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "ml_service": {
                    "status": "not_configured",
                    "fallback": "rule-based prediction available",
                }
            })),
        );
    };

    match client.probe_health().await {
        Ok(health) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "ml_service": {
                    "status": "connected",
                    "url": client.base_url(),
                    "endpoint_used": health.endpoint_used,
                    "health": health.body,
                    "circuit_open": state.estimator.circuit_open().await,
                    "timestamp": Utc::now().to_rfc3339(),
                }
            })),
        ),
        Err(err) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "ml_service": {
                    "status": "disconnected",
                    "url": client.base_url(),
                    "error": err.to_string(),
                    "note": "ML service may be starting up (cold start)",
                    "fallback": "rule-based prediction available",
                    "timestamp": Utc::now().to_rfc3339(),
                }
            })),
        ),
    }
}
