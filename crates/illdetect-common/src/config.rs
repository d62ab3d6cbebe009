//! Environment-driven service configuration, loaded once at startup.

use crate::error::{IllDetectError, Result};

/// Runtime configuration for the IllDetect service.
///
/// The ML service and the prediction store are both optional
/// collaborators: without an ML base URL every estimate is rule-based,
/// and without store credentials assessments are returned unsaved.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Base URL of the remote ML inference service, e.g.
    /// `https://api-ml-production.up.railway.app`.
    pub ml_service_url: Option<String>,
    /// Supabase project URL for the prediction store.
    pub supabase_url: Option<String>,
    /// Supabase anon key, sent as both apikey and bearer token.
    pub supabase_anon_key: Option<String>,
    pub api_version: String,
}

impl AppConfig {
    /// Load configuration from the environment (and `.env` if present).
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| IllDetectError::Config(format!("PORT is not a port number: {raw}")))?,
            Err(_) => 5001,
        };

        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port,
            ml_service_url: non_empty(std::env::var("ML_SERVICE_URL").ok()),
            supabase_url: non_empty(std::env::var("SUPABASE_URL").ok()),
            supabase_anon_key: non_empty(std::env::var("SUPABASE_ANON_KEY").ok()),
            api_version: std::env::var("API_VERSION").unwrap_or_else(|_| "1.0.0".to_string()),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_vars_are_treated_as_unset() {
        assert_eq!(non_empty(Some("  ".to_string())), None);
        assert_eq!(non_empty(Some(String::new())), None);
        assert_eq!(
            non_empty(Some("https://example.test".to_string())),
            Some("https://example.test".to_string())
        );
    }
}
