//! Tolerant parsing of remote ML service responses.
//!
//! The Flask deployments answered in more than one shape over their
//! lifetime: payload nested under `data` or flat at the root, optional
//! `confidence` / `probability` / `risk_level`, BMI sometimes inside a
//! `patient_data` object, sometimes a string. Instead of guessing field
//! names ad hoc, the known shapes form a declarative variant list tried
//! in fixed priority order; the first variant that yields a prediction
//! wins.

use illdetect_core::assessment::{PredictionSource, RiskAssessment};
use illdetect_core::metrics::HealthMetrics;
use serde::Serialize;
use serde_json::Value;

/// Extra context the remote model supplies alongside the prediction.
#[derive(Debug, Clone, Serialize)]
pub struct MlInsights {
    /// Raw model confidence in [0, 1], before percentage scaling.
    pub model_confidence: f64,
    pub bmi_category: String,
    pub interpretation: String,
    pub recommendation: String,
}

/// A successfully parsed remote prediction.
#[derive(Debug, Clone)]
pub struct RemotePrediction {
    pub assessment: RiskAssessment,
    pub insights: MlInsights,
}

/// A known response shape: a name for diagnostics plus a selector that
/// locates the payload object within the response body.
struct SchemaVariant {
    name: &'static str,
    select: fn(&Value) -> Option<&Value>,
}

/// Known shapes, in priority order. `data`-nested responses are checked
/// first because flat responses never carry a `data` object.
const VARIANTS: [SchemaVariant; 2] = [
    SchemaVariant {
        name: "nested_data",
        select: |body| body.get("data").filter(|d| d.is_object()),
    },
    SchemaVariant {
        name: "flat",
        select: |body| Some(body),
    },
];

/// Parse a remote response body into a prediction.
///
/// Returns `None` when no known variant yields a usable prediction — the
/// caller treats that exactly like a transport failure. `metrics` supplies
/// the locally computed BMI used when the response omits one; a BMI the
/// remote explicitly sends always wins.
pub fn parse_prediction(body: &Value, metrics: &HealthMetrics) -> Option<RemotePrediction> {
    // Gate mirrors the upstream contract: a response counts only if it
    // flags success or carries a prediction at all.
    let success = body.get("success").and_then(Value::as_bool).unwrap_or(false);
    if !success && lookup(body, body, &["prediction"]).is_none() {
        return None;
    }

    for variant in &VARIANTS {
        let Some(payload) = (variant.select)(body) else { continue };
        if let Some(parsed) = parse_payload(payload, body, metrics) {
            tracing::debug!(variant = variant.name, "parsed ML response");
            return Some(parsed);
        }
    }
    None
}

fn parse_payload(payload: &Value, root: &Value, metrics: &HealthMetrics) -> Option<RemotePrediction> {
    let prediction = lookup(payload, root, &["prediction"])?.as_i64()?;
    let risk: u8 = match prediction {
        0 => 0,
        1 => 1,
        _ => return None,
    };

    let model_confidence = lookup(payload, root, &["confidence"])
        .and_then(Value::as_f64)
        .unwrap_or(0.5);
    let probability = lookup(payload, root, &["probability"])
        .and_then(Value::as_f64)
        .unwrap_or(model_confidence);
    let risk_level = lookup(payload, root, &["risk_level"])
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| if risk == 1 { "HIGH".into() } else { "LOW".into() });

    // Prefer a BMI the remote explicitly reports; otherwise merge in the
    // locally computed value. Never let an absent field zero out BMI.
    let bmi = payload
        .pointer("/patient_data/bmi")
        .or_else(|| payload.get("bmi"))
        .and_then(as_lenient_f64)
        .unwrap_or_else(|| metrics.bmi_display());

    let high = risk_level.eq_ignore_ascii_case("high");
    let assessment = RiskAssessment {
        risk,
        confidence: (model_confidence * 100.0).round() as u32,
        probability,
        bmi,
        risk_label: if high { "High Risk" } else { "Low Risk" }.to_string(),
        source: PredictionSource::MlModel,
    };

    let insights = MlInsights {
        model_confidence,
        bmi_category: payload
            .pointer("/patient_data/bmi_category")
            .or_else(|| payload.get("bmi_category"))
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
            .to_string(),
        interpretation: lookup(payload, root, &["interpretation"])
            .and_then(Value::as_str)
            .unwrap_or("ML prediction completed")
            .to_string(),
        recommendation: lookup(payload, root, &["result_message", "recommendation"])
            .and_then(Value::as_str)
            .unwrap_or("Follow medical advice")
            .to_string(),
    };

    Some(RemotePrediction { assessment, insights })
}

/// Look a field up in the payload first, then at the response root.
fn lookup<'a>(payload: &'a Value, root: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    for key in keys {
        if let Some(v) = payload.get(key).filter(|v| !v.is_null()) {
            return Some(v);
        }
        if let Some(v) = root.get(key).filter(|v| !v.is_null()) {
            return Some(v);
        }
    }
    None
}

/// Numbers sometimes arrive stringified ("31.1"); accept both.
fn as_lenient_f64(value: &Value) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use illdetect_core::metrics::MetricsInput;
    use serde_json::json;

    fn metrics() -> HealthMetrics {
        MetricsInput {
            age: Some(50),
            gender: Some(2),
            height: Some(170),
            weight: Some(90),
            ap_hi: Some(130),
            ap_lo: Some(85),
            cholesterol: Some(2),
            gluc: Some(1),
            smoke: Some(0),
            alco: Some(0),
            active: Some(1),
            sex: None,
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn flat_response_with_all_fields() {
        let body = json!({
            "success": true,
            "prediction": 1,
            "confidence": 0.87,
            "probability": 0.87,
            "risk_level": "HIGH",
            "bmi": 31.1,
            "interpretation": "elevated risk",
            "result_message": "see a cardiologist"
        });
        let parsed = parse_prediction(&body, &metrics()).unwrap();
        assert_eq!(parsed.assessment.risk, 1);
        assert_eq!(parsed.assessment.confidence, 87);
        assert_eq!(parsed.assessment.bmi, 31.1);
        assert_eq!(parsed.assessment.risk_label, "High Risk");
        assert_eq!(parsed.assessment.source, PredictionSource::MlModel);
        assert_eq!(parsed.insights.recommendation, "see a cardiologist");
    }

    #[test]
    fn nested_data_variant_wins_over_flat() {
        let body = json!({
            "success": true,
            "data": {
                "prediction": 0,
                "confidence": 0.22,
                "patient_data": { "bmi": "24.9", "bmi_category": "Normal" }
            }
        });
        let parsed = parse_prediction(&body, &metrics()).unwrap();
        assert_eq!(parsed.assessment.risk, 0);
        assert_eq!(parsed.assessment.confidence, 22);
        assert_eq!(parsed.assessment.bmi, 24.9);
        assert_eq!(parsed.insights.bmi_category, "Normal");
    }

    #[test]
    fn missing_optionals_take_defaults() {
        let body = json!({ "prediction": 1 });
        let parsed = parse_prediction(&body, &metrics()).unwrap();
        // confidence defaults to 0.5, scaled to 50.
        assert_eq!(parsed.assessment.confidence, 50);
        assert_eq!(parsed.assessment.probability, 0.5);
        // risk_level derived from prediction == 1.
        assert_eq!(parsed.assessment.risk_label, "High Risk");
        // BMI merged from local computation: 90 / 1.70^2 = 31.1.
        assert_eq!(parsed.assessment.bmi, 31.1);
        assert_eq!(parsed.insights.interpretation, "ML prediction completed");
    }

    #[test]
    fn probability_defaults_to_confidence() {
        let body = json!({ "prediction": 0, "confidence": 0.3 });
        let parsed = parse_prediction(&body, &metrics()).unwrap();
        assert_eq!(parsed.assessment.probability, 0.3);
        assert_eq!(parsed.assessment.confidence, 30);
    }

    #[test]
    fn unusable_bodies_are_rejected() {
        assert!(parse_prediction(&json!({}), &metrics()).is_none());
        assert!(parse_prediction(&json!({ "success": false }), &metrics()).is_none());
        assert!(parse_prediction(&json!({ "prediction": "yes" }), &metrics()).is_none());
        assert!(parse_prediction(&json!({ "prediction": 7 }), &metrics()).is_none());
        assert!(parse_prediction(&json!([1, 2, 3]), &metrics()).is_none());
    }

    #[test]
    fn success_flag_alone_is_not_enough() {
        // success=true but no prediction anywhere: still malformed.
        let body = json!({ "success": true, "data": { "confidence": 0.9 } });
        assert!(parse_prediction(&body, &metrics()).is_none());
    }
}
