//! End-to-end fallback behavior against in-process mock ML services.

use axum::routing::post;
use axum::{Json, Router};
use illdetect_core::assessment::PredictionSource;
use illdetect_core::metrics::{HealthMetrics, MetricsInput};
use illdetect_ml::{MlClient, RiskEstimator};
use serde_json::json;

fn high_risk_metrics() -> HealthMetrics {
    MetricsInput {
        age: Some(56),
        gender: Some(2),
        height: Some(170),
        weight: Some(90),
        ap_hi: Some(145),
        ap_lo: Some(95),
        cholesterol: Some(3),
        gluc: Some(3),
        smoke: Some(1),
        alco: Some(1),
        active: Some(0),
        sex: None,
    }
    .validate()
    .unwrap()
}

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn healthy_remote_is_preferred() {
    let app = Router::new().route(
        "/api/predict",
        post(|| async {
            Json(json!({
                "success": true,
                "prediction": 1,
                "confidence": 0.91,
                "risk_level": "HIGH",
                "bmi": 31.1
            }))
        }),
    );
    let base = spawn(app).await;

    let estimator = RiskEstimator::new(Some(MlClient::new(base).unwrap()));
    let estimate = estimator.estimate(&high_risk_metrics()).await;

    assert_eq!(estimate.assessment.source, PredictionSource::MlModel);
    assert_eq!(estimate.assessment.confidence, 91);
    assert!(estimate.insights.is_some());
}

#[tokio::test]
async fn second_endpoint_is_tried_after_404() {
    // Only the unprefixed path exists, like a bare Flask deployment.
    let app = Router::new().route(
        "/predict",
        post(|| async { Json(json!({ "success": true, "prediction": 0, "confidence": 0.12 })) }),
    );
    let base = spawn(app).await;

    let estimator = RiskEstimator::new(Some(MlClient::new(base).unwrap()));
    let estimate = estimator.estimate(&high_risk_metrics()).await;

    assert_eq!(estimate.assessment.source, PredictionSource::MlModel);
    assert_eq!(estimate.assessment.risk, 0);
}

#[tokio::test]
async fn malformed_json_on_every_endpoint_falls_back() {
    let bogus = || async { "this is not json" };
    let app = Router::new()
        .route("/api/predict", post(bogus))
        .route("/predict", post(bogus));
    let base = spawn(app).await;

    let estimator = RiskEstimator::new(Some(MlClient::new(base).unwrap()));
    let estimate = estimator.estimate(&high_risk_metrics()).await;

    // Rule-based result for the same inputs, no error surfaced.
    assert_eq!(estimate.assessment.source, PredictionSource::RuleBased);
    assert_eq!(estimate.assessment.confidence, 95);
    assert_eq!(estimate.assessment.risk, 1);
    assert_eq!(estimate.assessment.bmi, 31.1);
}

#[tokio::test]
async fn unrecognized_shape_falls_back() {
    let app = Router::new().route(
        "/api/predict",
        post(|| async { Json(json!({ "success": true, "verdict": "fine" })) }),
    );
    let base = spawn(app).await;

    let estimator = RiskEstimator::new(Some(MlClient::new(base).unwrap()));
    let estimate = estimator.estimate(&high_risk_metrics()).await;

    assert_eq!(estimate.assessment.source, PredictionSource::RuleBased);
    assert_eq!(estimate.assessment.risk_label, "High Risk");
}
