//! Supabase (PostgREST) adapter for the prediction store.
//!
//! The table is managed externally; this adapter only inserts rows,
//! lists them with pagination/filters, and feeds the statistics
//! aggregation. All failures are reported as `IllDetectError::Store`
//! and recovered upstream (`saved: false`), never surfaced as request
//! errors.

use async_trait::async_trait;
use illdetect_common::error::{IllDetectError, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use tracing::{debug, warn};

use crate::record::{
    aggregate, page_offset, PredictionFilter, PredictionPage, PredictionRecord, PredictionStats,
    StatsRow,
};
use crate::PredictionStore;

const TABLE: &str = "cardiovascular_predictions";

#[derive(Debug, Clone)]
pub struct SupabaseStore {
    http: reqwest::Client,
    rest_url: String,
}

impl SupabaseStore {
    pub fn new(project_url: &str, anon_key: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(anon_key)
            .map_err(|_| IllDetectError::Config("supabase anon key is not a valid header value".into()))?;
        headers.insert("apikey", key);
        let bearer = HeaderValue::from_str(&format!("Bearer {anon_key}"))
            .map_err(|_| IllDetectError::Config("supabase anon key is not a valid header value".into()))?;
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            rest_url: format!("{}/rest/v1/{}", project_url.trim_end_matches('/'), TABLE),
        })
    }
}

/// PostgREST `eq.` filter params for a listing filter.
fn filter_params(filter: &PredictionFilter) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if let Some(risk) = filter.risk_level {
        params.push(("risk_prediction", format!("eq.{risk}")));
    }
    if let Some(gender) = filter.gender {
        params.push(("gender", format!("eq.{gender}")));
    }
    params
}

/// Total row count from a `Content-Range` header (`items 0-9/57`).
fn parse_content_range_total(value: &str) -> Option<u64> {
    value.rsplit('/').next()?.trim().parse().ok()
}

#[async_trait]
impl PredictionStore for SupabaseStore {
    async fn insert(&self, record: &PredictionRecord) -> Result<()> {
        let response = self
            .http
            .post(&self.rest_url)
            .header("Prefer", "return=minimal")
            .json(&[record])
            .send()
            .await
            .map_err(|e| IllDetectError::Store(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, %body, "prediction insert rejected");
            return Err(IllDetectError::Store(format!("insert failed: HTTP {status}")));
        }

        debug!(session_id = %record.session_id, "prediction persisted");
        Ok(())
    }

    async fn list(&self, page: u32, limit: u32, filter: &PredictionFilter) -> Result<PredictionPage> {
        let page = page.max(1);
        let offset = page_offset(page, limit);

        let mut params = vec![
            ("select", "*".to_string()),
            ("order", "created_at.desc".to_string()),
            ("offset", offset.to_string()),
            ("limit", limit.to_string()),
        ];
        params.extend(filter_params(filter));

        let response = self
            .http
            .get(&self.rest_url)
            .header("Prefer", "count=exact")
            .query(&params)
            .send()
            .await
            .map_err(|e| IllDetectError::Store(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IllDetectError::Store(format!("list failed: HTTP {status}")));
        }

        let total = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range_total);

        let data: Vec<PredictionRecord> = response
            .json()
            .await
            .map_err(|e| IllDetectError::Store(e.to_string()))?;

        let total = total.unwrap_or(data.len() as u64);
        Ok(PredictionPage::new(data, page, limit, total))
    }

    async fn statistics(&self) -> Result<PredictionStats> {
        let params = [(
            "select",
            "risk_prediction,gender,age,bmi,prediction_source".to_string(),
        )];

        let response = self
            .http
            .get(&self.rest_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| IllDetectError::Store(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IllDetectError::Store(format!("statistics failed: HTTP {status}")));
        }

        let rows: Vec<StatsRow> = response
            .json()
            .await
            .map_err(|e| IllDetectError::Store(e.to_string()))?;

        Ok(aggregate(&rows))
    }

    async fn ping(&self) -> bool {
        let params = [("select", "age"), ("limit", "1")];
        match self.http.get(&self.rest_url).query(&params).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(err) => {
                debug!(error = %err, "prediction store ping failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_range_parsing() {
        assert_eq!(parse_content_range_total("0-9/57"), Some(57));
        assert_eq!(parse_content_range_total("items 0-9/57"), Some(57));
        assert_eq!(parse_content_range_total("*/120"), Some(120));
        assert_eq!(parse_content_range_total("0-9/*"), None);
        assert_eq!(parse_content_range_total("nonsense"), None);
    }

    #[test]
    fn filters_become_eq_params() {
        let params = filter_params(&PredictionFilter { risk_level: Some(1), gender: Some(2) });
        assert_eq!(
            params,
            vec![
                ("risk_prediction", "eq.1".to_string()),
                ("gender", "eq.2".to_string())
            ]
        );
        assert!(filter_params(&PredictionFilter::default()).is_empty());
    }

    #[test]
    fn rest_url_targets_the_prediction_table() {
        let store = SupabaseStore::new("https://project.supabase.co/", "anon-key").unwrap();
        assert_eq!(
            store.rest_url,
            "https://project.supabase.co/rest/v1/cardiovascular_predictions"
        );
    }
}
