//! Estimator orchestration: remote model first, rule-based always.
//!
//! `estimate` is infallible for validated input. Remote failures are
//! recovered silently (logged, never surfaced); a circuit breaker stops
//! hammering a dead service with 20-second attempts on every request.

use std::time::{Duration, Instant};

use illdetect_core::assessment::RiskAssessment;
use illdetect_core::metrics::HealthMetrics;
use illdetect_core::scoring;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::client::MlClient;
use crate::schema::MlInsights;

/// Consecutive full remote failures before the circuit opens.
const FAILURE_THRESHOLD: u32 = 3;

/// How long an open circuit skips the remote service.
const COOLDOWN: Duration = Duration::from_secs(60);

/// Explicit breaker state, replacing ad hoc fail counters on a singleton.
#[derive(Debug, Clone, Copy)]
enum CircuitState {
    Closed { consecutive_failures: u32 },
    Open { until: Instant },
}

/// One risk estimation result: the assessment plus any extra context the
/// remote model offered.
#[derive(Debug, Clone)]
pub struct Estimate {
    pub assessment: RiskAssessment,
    pub insights: Option<MlInsights>,
}

/// Scores health metrics, preferring the remote ML model when one is
/// configured and reachable, always able to answer via the rule-based
/// scorer.
pub struct RiskEstimator {
    remote: Option<MlClient>,
    circuit: Mutex<CircuitState>,
}

impl RiskEstimator {
    pub fn new(remote: Option<MlClient>) -> Self {
        Self {
            remote,
            circuit: Mutex::new(CircuitState::Closed { consecutive_failures: 0 }),
        }
    }

    /// Rule-based only, no remote collaborator.
    pub fn local_only() -> Self {
        Self::new(None)
    }

    pub fn remote_client(&self) -> Option<&MlClient> {
        self.remote.as_ref()
    }

    /// Produce an assessment for validated metrics.
    ///
    /// Never fails: any remote problem degrades to the rule-based scorer,
    /// which is pure and total over validated input.
    pub async fn estimate(&self, metrics: &HealthMetrics) -> Estimate {
        if let Some(client) = &self.remote {
            if self.circuit_allows().await {
                match client.predict(metrics).await {
                    Ok(remote) => {
                        self.record_success().await;
                        return Estimate {
                            assessment: remote.assessment,
                            insights: Some(remote.insights),
                        };
                    }
                    Err(err) => {
                        self.record_failure().await;
                        warn!(error = %err, "ML service unavailable, falling back to rule-based scoring");
                    }
                }
            } else {
                info!("ML circuit open, going straight to rule-based scoring");
            }
        }

        Estimate {
            assessment: scoring::score(metrics),
            insights: None,
        }
    }

    async fn circuit_allows(&self) -> bool {
        let mut state = self.circuit.lock().await;
        match *state {
            CircuitState::Closed { .. } => true,
            CircuitState::Open { until } => {
                if Instant::now() >= until {
                    // Half-open: let one request through to test the service.
                    *state = CircuitState::Closed { consecutive_failures: FAILURE_THRESHOLD - 1 };
                    true
                } else {
                    false
                }
            }
        }
    }

    async fn record_success(&self) {
        let mut state = self.circuit.lock().await;
        *state = CircuitState::Closed { consecutive_failures: 0 };
    }

    async fn record_failure(&self) {
        let mut state = self.circuit.lock().await;
        let failures = match *state {
            CircuitState::Closed { consecutive_failures } => consecutive_failures + 1,
            CircuitState::Open { .. } => return,
        };
        if failures >= FAILURE_THRESHOLD {
            warn!(failures, cooldown_secs = COOLDOWN.as_secs(), "opening ML circuit");
            *state = CircuitState::Open { until: Instant::now() + COOLDOWN };
        } else {
            *state = CircuitState::Closed { consecutive_failures: failures };
        }
    }

    /// Current breaker position, for the status endpoint.
    pub async fn circuit_open(&self) -> bool {
        matches!(*self.circuit.lock().await, CircuitState::Open { until } if Instant::now() < until)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use illdetect_core::assessment::PredictionSource;
    use illdetect_core::metrics::MetricsInput;

    fn metrics() -> HealthMetrics {
        MetricsInput {
            age: Some(30),
            gender: Some(1),
            height: Some(165),
            weight: Some(60),
            ap_hi: Some(110),
            ap_lo: Some(70),
            cholesterol: Some(1),
            gluc: Some(1),
            smoke: Some(0),
            alco: Some(0),
            active: Some(1),
            sex: None,
        }
        .validate()
        .unwrap()
    }

    #[tokio::test]
    async fn local_only_estimator_is_rule_based() {
        let estimator = RiskEstimator::local_only();
        let estimate = estimator.estimate(&metrics()).await;
        assert_eq!(estimate.assessment.source, PredictionSource::RuleBased);
        assert_eq!(estimate.assessment.confidence, 20);
        assert!(estimate.insights.is_none());
    }

    #[tokio::test]
    async fn unreachable_remote_falls_back_silently() {
        // Port 9 (discard) on localhost: connection refused immediately.
        let client = MlClient::new("http://127.0.0.1:9").unwrap();
        let estimator = RiskEstimator::new(Some(client));
        let estimate = estimator.estimate(&metrics()).await;
        assert_eq!(estimate.assessment.source, PredictionSource::RuleBased);
        assert_eq!(estimate.assessment.risk, 0);
    }

    #[tokio::test]
    async fn circuit_opens_after_repeated_failures() {
        let client = MlClient::new("http://127.0.0.1:9").unwrap();
        let estimator = RiskEstimator::new(Some(client));

        for _ in 0..3 {
            estimator.estimate(&metrics()).await;
        }
        assert!(estimator.circuit_open().await);

        // Still answers while open.
        let estimate = estimator.estimate(&metrics()).await;
        assert_eq!(estimate.assessment.source, PredictionSource::RuleBased);
    }
}
