//! Rule-based cardiovascular risk scoring.
//!
//! The authoritative fallback calculator: a deterministic weighted sum of
//! ten independent risk-factor contributions. The arithmetic is a fixed
//! behavioral contract — identical inputs must always yield identical
//! assessments, so every constant here is load-bearing.

use crate::assessment::{PredictionSource, RiskAssessment};
use crate::gender::Gender;
use crate::metrics::{HealthMetrics, Level3};

/// Confidence is clamped into [10, 95].
const CONFIDENCE_MIN: u32 = 10;
const CONFIDENCE_MAX: u32 = 95;

/// Confidence at or above this maps to a high-risk flag.
const HIGH_RISK_THRESHOLD: u32 = 65;

/// Point contributions of the ten risk factors, in declaration order:
/// age, gender, BMI, systolic BP, diastolic BP, cholesterol, glucose,
/// smoking, alcohol, physical inactivity.
pub fn risk_factor_points(metrics: &HealthMetrics, bmi: f64) -> [u32; 10] {
    [
        match metrics.age {
            a if a > 55 => 25,
            a if a > 45 => 15,
            _           => 5,
        },
        match metrics.gender {
            Gender::Male   => 10,
            Gender::Female => 5,
        },
        match bmi {
            b if b > 30.0 => 20,
            b if b > 25.0 => 10,
            _             => 0,
        },
        match metrics.ap_hi {
            s if s > 140 => 25,
            s if s > 120 => 15,
            _            => 5,
        },
        match metrics.ap_lo {
            d if d > 90 => 20,
            d if d > 80 => 10,
            _           => 5,
        },
        match metrics.cholesterol {
            Level3::WellAboveNormal => 25,
            Level3::AboveNormal     => 15,
            Level3::Normal          => 0,
        },
        match metrics.glucose {
            Level3::WellAboveNormal => 20,
            Level3::AboveNormal     => 10,
            Level3::Normal          => 0,
        },
        if metrics.smoke { 15 } else { 0 },
        if metrics.alco { 5 } else { 0 },
        if metrics.active { 0 } else { 10 },
    ]
}

/// Score a validated metrics record.
///
/// Pure and total: assumes domain validation already happened and can
/// therefore never fail. This is the terminal fallback of the estimator
/// chain — it makes no outbound calls.
pub fn score(metrics: &HealthMetrics) -> RiskAssessment {
    let bmi = metrics.bmi();

    let total: u32 = risk_factor_points(metrics, bmi).iter().sum();
    let confidence = total.clamp(CONFIDENCE_MIN, CONFIDENCE_MAX);
    let risk = if confidence >= HIGH_RISK_THRESHOLD { 1 } else { 0 };

    RiskAssessment {
        risk,
        confidence,
        probability: confidence as f64 / 100.0,
        bmi: metrics.bmi_display(),
        risk_label: RiskAssessment::label_for(risk).to_string(),
        source: PredictionSource::RuleBased,
    }
}
