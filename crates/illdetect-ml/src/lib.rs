//! illdetect-ml — Remote ML inference client and estimator orchestration.
//!
//! The remote model is an external collaborator that may be cold, slow,
//! or gone; everything in this crate is built around that assumption.
//! `MlClient` talks to it, `schema` makes sense of whatever shape it
//! answers in, and `RiskEstimator` guarantees the caller an assessment
//! by falling back to the rule-based scorer.

pub mod client;
pub mod estimator;
pub mod schema;

pub use client::{MlClient, MlHealth};
pub use estimator::{Estimate, RiskEstimator};
pub use schema::{MlInsights, RemotePrediction};
