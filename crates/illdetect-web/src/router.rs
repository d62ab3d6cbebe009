//! Axum router — maps all URL paths to handlers.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{
    predict::predict,
    predictions::list_predictions,
    statistics::statistics,
    system::{api_info, health, ml_health, status},
};
use crate::state::{AppState, SharedState};

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let shared: SharedState = Arc::new(state);

    Router::new()
        .route("/",                get(api_info))
        .route("/api/predict",     post(predict))
        .route("/api/predictions", get(list_predictions))
        .route("/api/statistics",  get(statistics))
        .route("/api/health",      get(health))
        .route("/api/status",      get(status))
        .route("/api/ml-health",   get(ml_health))

        // Middleware
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
