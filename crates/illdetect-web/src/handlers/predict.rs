//! POST /api/predict — validate, estimate, persist, respond.

use axum::extract::State;
use axum::http::header::USER_AGENT;
use axum::http::HeaderMap;
use axum::Json;
use illdetect_common::error::{ApiError, IllDetectError};
use illdetect_core::metrics::{HealthMetrics, MetricsInput};
use illdetect_core::{PredictionSource, RiskAssessment};
use illdetect_ml::MlInsights;
use illdetect_store::{generate_session_id, PredictionRecord};
use serde::Serialize;
use tracing::{info, warn};

use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct PredictionBody {
    pub risk: u8,
    pub confidence: u32,
    pub probability: f64,
    pub risk_label: String,
    /// One-decimal string, the shape the result card renders.
    pub bmi: String,
    pub source: PredictionSource,
}

#[derive(Debug, Serialize)]
pub struct Lifestyle {
    pub smoking: &'static str,
    pub alcohol: &'static str,
    pub physical_activity: &'static str,
}

/// Echo of the submitted record with the gender re-derived in both
/// human-readable and frontend encodings.
#[derive(Debug, Serialize)]
pub struct PatientData {
    pub age: u32,
    pub gender: &'static str,
    /// Frontend encoding (0 = Female, 1 = Male) for the UI form.
    pub sex: i64,
    pub height: u32,
    pub weight: u32,
    pub bmi: String,
    pub blood_pressure: String,
    pub cholesterol: &'static str,
    pub glucose: &'static str,
    pub lifestyle: Lifestyle,
}

#[derive(Debug, Serialize)]
pub struct CompatPatientData {
    pub bmi: f64,
    pub bmi_category: String,
    pub sex: i64,
}

/// Frontend-compatibility section: older app trees read the assessment
/// from a nested `data` object with these field names.
#[derive(Debug, Serialize)]
pub struct CompatData {
    pub prediction: u8,
    pub confidence: u32,
    pub probability: f64,
    pub risk_level: &'static str,
    /// Three-tier presentation overlay (localized) with its color hint.
    pub level: &'static str,
    pub color: &'static str,
    pub patient_data: CompatPatientData,
    pub interpretation: String,
    pub result_message: String,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub success: bool,
    pub prediction: PredictionBody,
    pub patient_data: PatientData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ml_insights: Option<MlInsights>,
    pub saved: bool,
    pub message: &'static str,
    pub data: CompatData,
}

pub async fn predict(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(input): Json<MetricsInput>,
) -> Result<Json<PredictResponse>, ApiError> {
    let metrics = input
        .validate()
        .map_err(IllDetectError::Validation)?;

    let estimate = state.estimator.estimate(&metrics).await;

    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let record = PredictionRecord::new(
        &metrics,
        &estimate.assessment,
        generate_session_id(),
        user_agent,
    );

    // Best-effort persistence: a store failure downgrades to saved:false.
    let saved = match state.store.insert(&record).await {
        Ok(()) => true,
        Err(err) => {
            warn!(error = %err, "failed to persist prediction");
            false
        }
    };

    info!(
        risk = estimate.assessment.risk,
        confidence = estimate.assessment.confidence,
        source = estimate.assessment.source.as_str(),
        saved,
        "prediction completed"
    );

    Ok(Json(build_response(&metrics, estimate.assessment, estimate.insights, saved)))
}

fn build_response(
    metrics: &HealthMetrics,
    assessment: RiskAssessment,
    insights: Option<MlInsights>,
    saved: bool,
) -> PredictResponse {
    let bmi_text = format!("{:.1}", assessment.bmi);
    let tier = assessment.tier();
    let yes_no = |flag: bool| if flag { "Yes" } else { "No" };

    let interpretation = insights
        .as_ref()
        .map(|i| i.interpretation.clone())
        .unwrap_or_else(|| "Prediction completed".to_string());
    let result_message = insights
        .as_ref()
        .map(|i| i.recommendation.clone())
        .unwrap_or_else(|| "Please consult with healthcare professional".to_string());
    let bmi_category = insights
        .as_ref()
        .map(|i| i.bmi_category.clone())
        .unwrap_or_else(|| "Unknown".to_string());

    PredictResponse {
        success: true,
        prediction: PredictionBody {
            risk: assessment.risk,
            confidence: assessment.confidence,
            probability: assessment.probability,
            risk_label: assessment.risk_label.clone(),
            bmi: bmi_text.clone(),
            source: assessment.source,
        },
        patient_data: PatientData {
            age: metrics.age,
            gender: metrics.gender.as_str(),
            sex: metrics.gender.frontend_code(),
            height: metrics.height_cm,
            weight: metrics.weight_kg,
            bmi: bmi_text,
            blood_pressure: format!("{}/{}", metrics.ap_hi, metrics.ap_lo),
            cholesterol: metrics.cholesterol.describe(),
            glucose: metrics.glucose.describe(),
            lifestyle: Lifestyle {
                smoking: yes_no(metrics.smoke),
                alcohol: yes_no(metrics.alco),
                physical_activity: yes_no(metrics.active),
            },
        },
        data: CompatData {
            prediction: assessment.risk,
            confidence: assessment.confidence,
            probability: assessment.probability,
            risk_level: if assessment.is_high_risk() { "HIGH" } else { "LOW" },
            level: tier.display_id(),
            color: tier.color(),
            patient_data: CompatPatientData {
                bmi: assessment.bmi,
                bmi_category,
                sex: metrics.gender.frontend_code(),
            },
            interpretation,
            result_message,
        },
        ml_insights: insights,
        saved,
        message: "Prediction completed successfully",
    }
}
