//! HTTP client for the remote ML inference service.
//!
//! The service runs on free-tier hosting and cold-starts, so requests
//! carry generous timeouts and every operation walks a ranked list of
//! candidate paths — deployments have exposed the API both with and
//! without the `/api` prefix.

use std::time::Duration;

use illdetect_common::error::{IllDetectError, Result};
use illdetect_core::metrics::HealthMetrics;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::schema::{self, RemotePrediction};

/// Prediction paths tried in order; first success wins.
const PREDICT_PATHS: [&str; 2] = ["/api/predict", "/predict"];

/// Health-probe paths tried in order.
const HEALTH_PATHS: [&str; 3] = ["/api/health", "/health", "/ping"];

/// Per-attempt prediction timeout. Generous to ride out cold starts.
const PREDICT_TIMEOUT: Duration = Duration::from_secs(20);

const HEALTH_TIMEOUT: Duration = Duration::from_secs(15);

/// Feature payload sent to the model, field names fixed by its API.
#[derive(Debug, Serialize)]
struct FeaturePayload {
    age: u32,
    /// ML encoding: 0 = Female, 1 = Male.
    gender: i64,
    height: u32,
    weight: u32,
    ap_hi: u32,
    ap_lo: u32,
    cholesterol: i64,
    gluc: i64,
    smoke: u8,
    alco: u8,
    active: u8,
}

impl FeaturePayload {
    fn from_metrics(m: &HealthMetrics) -> Self {
        Self {
            age: m.age,
            gender: m.gender.ml_code(),
            height: m.height_cm,
            weight: m.weight_kg,
            ap_hi: m.ap_hi,
            ap_lo: m.ap_lo,
            cholesterol: m.cholesterol.code(),
            gluc: m.glucose.code(),
            smoke: m.smoke as u8,
            alco: m.alco as u8,
            active: m.active as u8,
        }
    }
}

/// Outcome of a health probe, reported by the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct MlHealth {
    pub endpoint_used: String,
    pub body: Value,
}

#[derive(Debug, Clone)]
pub struct MlClient {
    http: reqwest::Client,
    base_url: String,
}

impl MlClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submit a feature payload, walking the candidate endpoints.
    ///
    /// Fails only when every endpoint fails (transport error, non-2xx, or
    /// a body no known schema variant can parse). Callers recover by
    /// falling back to the rule-based scorer.
    pub async fn predict(&self, metrics: &HealthMetrics) -> Result<RemotePrediction> {
        let payload = FeaturePayload::from_metrics(metrics);
        let mut last_failure = String::new();

        for path in PREDICT_PATHS {
            let url = format!("{}{}", self.base_url, path);
            debug!(%url, "trying ML endpoint");

            let response = match self
                .http
                .post(&url)
                .timeout(PREDICT_TIMEOUT)
                .json(&payload)
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(err) => {
                    warn!(%url, error = %err, "ML endpoint unreachable");
                    last_failure = format!("{url}: {err}");
                    continue;
                }
            };

            let status = response.status();
            if !status.is_success() {
                warn!(%url, %status, "ML endpoint returned error status");
                last_failure = format!("{url}: HTTP {status}");
                continue;
            }

            let body: Value = match response.json().await {
                Ok(body) => body,
                Err(err) => {
                    warn!(%url, error = %err, "ML endpoint returned non-JSON body");
                    last_failure = format!("{url}: {err}");
                    continue;
                }
            };

            match schema::parse_prediction(&body, metrics) {
                Some(parsed) => {
                    info!(%url, risk = parsed.assessment.risk, "ML prediction succeeded");
                    return Ok(parsed);
                }
                None => {
                    warn!(%url, "ML endpoint returned unparseable payload");
                    last_failure = format!("{url}: unrecognized response shape");
                }
            }
        }

        Err(IllDetectError::RemoteUnavailable(last_failure))
    }

    /// Probe the service's health paths in order.
    ///
    /// Used only for status reporting; estimation never waits on this.
    pub async fn probe_health(&self) -> Result<MlHealth> {
        let mut last_failure = String::new();

        for path in HEALTH_PATHS {
            let url = format!("{}{}", self.base_url, path);
            match self.http.get(&url).timeout(HEALTH_TIMEOUT).send().await {
                Ok(resp) if resp.status().is_success() => {
                    let body = resp.json().await.unwrap_or(Value::Null);
                    return Ok(MlHealth { endpoint_used: url, body });
                }
                Ok(resp) => {
                    last_failure = format!("{url}: HTTP {}", resp.status());
                }
                Err(err) => {
                    last_failure = format!("{url}: {err}");
                }
            }
        }

        Err(IllDetectError::RemoteUnavailable(last_failure))
    }
}
