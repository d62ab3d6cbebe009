//! illdetect-core — Domain model for cardiovascular risk assessment.
//!
//! Holds the pieces every other crate builds on: the validated
//! `HealthMetrics` input record, the three-way gender codec, the
//! rule-based scoring function, and the `RiskAssessment` output.

pub mod assessment;
pub mod gender;
pub mod metrics;
pub mod scoring;

pub use assessment::{PredictionSource, RiskAssessment, RiskTier};
pub use gender::Gender;
pub use metrics::{HealthMetrics, Level3, MetricsInput};
pub use scoring::score;
