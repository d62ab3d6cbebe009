//! Shared application state for the web server.

use std::sync::Arc;
use std::time::Instant;

use illdetect_common::error::Result;
use illdetect_common::AppConfig;
use illdetect_ml::{MlClient, RiskEstimator};
use illdetect_store::{MemoryStore, PredictionStore, SupabaseStore};
use tracing::{info, warn};

/// Shared state injected into every Axum handler.
pub struct AppState {
    pub config: AppConfig,
    pub estimator: RiskEstimator,
    pub store: Arc<dyn PredictionStore>,
    pub started_at: Instant,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    /// Wire collaborators from configuration.
    ///
    /// Both collaborators are optional: without an ML URL the estimator
    /// is rule-based only, and without Supabase credentials predictions
    /// are held in process memory.
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let estimator = match &config.ml_service_url {
            Some(url) => {
                info!(%url, "ML service configured");
                RiskEstimator::new(Some(MlClient::new(url.clone())?))
            }
            None => {
                info!("no ML service configured, predictions are rule-based");
                RiskEstimator::local_only()
            }
        };

        let store: Arc<dyn PredictionStore> =
            match (&config.supabase_url, &config.supabase_anon_key) {
                (Some(url), Some(key)) => {
                    info!(%url, "prediction store: Supabase");
                    Arc::new(SupabaseStore::new(url, key)?)
                }
                _ => {
                    warn!("no Supabase credentials, prediction store is in-memory");
                    Arc::new(MemoryStore::new())
                }
            };

        Ok(Self {
            config,
            estimator,
            store,
            started_at: Instant::now(),
        })
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
