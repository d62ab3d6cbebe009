//! Risk assessment output types and the presentation-tier overlay.

use serde::{Deserialize, Serialize};

/// Where an assessment came from. Purely informational: the UI and the
/// persisted record show it, scoring never depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionSource {
    MlModel,
    RuleBased,
    Local,
}

impl PredictionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionSource::MlModel   => "ml_model",
            PredictionSource::RuleBased => "rule_based",
            PredictionSource::Local     => "local",
        }
    }
}

/// One cardiovascular risk assessment. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// 0 = low risk, 1 = high risk. What `risk_prediction` persists.
    pub risk: u8,
    /// Risk-strength score, integer in [10, 95]. Doubles as the
    /// percentage shown to users; not a statistical calibration.
    pub confidence: u32,
    /// confidence / 100.
    pub probability: f64,
    /// BMI rounded to one decimal place.
    pub bmi: f64,
    pub risk_label: String,
    pub source: PredictionSource,
}

impl RiskAssessment {
    pub fn is_high_risk(&self) -> bool {
        self.risk == 1
    }

    /// Presentation tier for this assessment's confidence.
    pub fn tier(&self) -> RiskTier {
        RiskTier::from_confidence(self.confidence)
    }

    pub fn label_for(risk: u8) -> &'static str {
        if risk == 1 { "High Risk" } else { "Low Risk" }
    }
}

/// Three-tier display overlay used by some UI variants.
///
/// The persisted prediction stays binary; this mapping exists only for
/// presentation and is derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub fn from_confidence(confidence: u32) -> Self {
        if confidence >= 65 {
            RiskTier::High
        } else if confidence >= 40 {
            RiskTier::Medium
        } else {
            RiskTier::Low
        }
    }

    pub fn display_en(&self) -> &'static str {
        match self {
            RiskTier::Low    => "Low",
            RiskTier::Medium => "Medium",
            RiskTier::High   => "High",
        }
    }

    /// Localized names used by the Indonesian UI.
    pub fn display_id(&self) -> &'static str {
        match self {
            RiskTier::Low    => "Rendah",
            RiskTier::Medium => "Sedang",
            RiskTier::High   => "Tinggi",
        }
    }

    /// Traffic-light color hint for the result card.
    pub fn color(&self) -> &'static str {
        match self {
            RiskTier::Low    => "green",
            RiskTier::Medium => "yellow",
            RiskTier::High   => "red",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_thresholds() {
        assert_eq!(RiskTier::from_confidence(10), RiskTier::Low);
        assert_eq!(RiskTier::from_confidence(39), RiskTier::Low);
        assert_eq!(RiskTier::from_confidence(40), RiskTier::Medium);
        assert_eq!(RiskTier::from_confidence(64), RiskTier::Medium);
        assert_eq!(RiskTier::from_confidence(65), RiskTier::High);
        assert_eq!(RiskTier::from_confidence(95), RiskTier::High);
    }

    #[test]
    fn tier_display() {
        assert_eq!(RiskTier::High.display_id(), "Tinggi");
        assert_eq!(RiskTier::Medium.color(), "yellow");
    }

    #[test]
    fn source_tags() {
        assert_eq!(PredictionSource::MlModel.as_str(), "ml_model");
        assert_eq!(
            serde_json::to_string(&PredictionSource::RuleBased).unwrap(),
            "\"rule_based\""
        );
    }
}
