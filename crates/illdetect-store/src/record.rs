//! Persisted prediction records, list filters, and statistics.

use chrono::{DateTime, Utc};
use illdetect_core::assessment::RiskAssessment;
use illdetect_core::gender::Gender;
use illdetect_core::metrics::HealthMetrics;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// One row of the prediction table: the full input record (dataset
/// encoding) plus the assessment and request metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub age: u32,
    pub gender: Gender,
    pub height: u32,
    pub weight: u32,
    pub ap_hi: u32,
    pub ap_lo: u32,
    pub cholesterol: i64,
    pub gluc: i64,
    pub smoke: u8,
    pub alco: u8,
    pub active: u8,

    pub risk_prediction: u8,
    pub confidence_score: u32,
    pub probability: f64,
    pub bmi: f64,
    pub prediction_source: String,

    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Assigned by the store; absent on insert.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl PredictionRecord {
    pub fn new(
        metrics: &HealthMetrics,
        assessment: &RiskAssessment,
        session_id: String,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            age: metrics.age,
            gender: metrics.gender,
            height: metrics.height_cm,
            weight: metrics.weight_kg,
            ap_hi: metrics.ap_hi,
            ap_lo: metrics.ap_lo,
            cholesterol: metrics.cholesterol.code(),
            gluc: metrics.glucose.code(),
            smoke: metrics.smoke as u8,
            alco: metrics.alco as u8,
            active: metrics.active as u8,
            risk_prediction: assessment.risk,
            confidence_score: assessment.confidence,
            probability: assessment.probability,
            bmi: assessment.bmi,
            prediction_source: assessment.source.as_str().to_string(),
            session_id,
            user_agent,
            created_at: None,
        }
    }
}

/// `session_<millis>_<random>` ids matching what earlier clients wrote,
/// so one table holds both generations of traffic.
pub fn generate_session_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(13)
        .map(|c| (c as char).to_ascii_lowercase())
        .collect();
    format!("session_{}_{}", Utc::now().timestamp_millis(), suffix)
}

/// Optional listing filters.
#[derive(Debug, Clone, Default)]
pub struct PredictionFilter {
    /// 0 = low risk, 1 = high risk.
    pub risk_level: Option<u8>,
    /// Dataset encoding: 1 = Female, 2 = Male.
    pub gender: Option<i64>,
}

/// Row offset for a 1-based page, widened to `u64` so arbitrarily large
/// page numbers address past the data instead of overflowing.
pub fn page_offset(page: u32, limit: u32) -> u64 {
    (page.max(1) as u64 - 1) * limit as u64
}

/// One page of records plus pagination bookkeeping.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionPage {
    pub data: Vec<PredictionRecord>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl PredictionPage {
    pub fn new(data: Vec<PredictionRecord>, page: u32, limit: u32, total: u64) -> Self {
        let total_pages = if limit == 0 { 0 } else { total.div_ceil(limit as u64) };
        Self { data, page, limit, total, total_pages }
    }
}

/// The projection statistics are computed from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsRow {
    pub risk_prediction: u8,
    pub gender: i64,
    pub age: u32,
    pub bmi: Option<f64>,
    pub prediction_source: Option<String>,
}

impl From<&PredictionRecord> for StatsRow {
    fn from(r: &PredictionRecord) -> Self {
        Self {
            risk_prediction: r.risk_prediction,
            gender: r.gender.dataset_code(),
            age: r.age,
            bmi: Some(r.bmi),
            prediction_source: Some(r.prediction_source.clone()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GenderCounts {
    pub male: u64,
    pub female: u64,
}

/// Aggregate counts over the whole table.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionStats {
    pub total: u64,
    #[serde(rename = "highRisk")]
    pub high_risk: u64,
    #[serde(rename = "lowRisk")]
    pub low_risk: u64,
    #[serde(rename = "byGender")]
    pub by_gender: GenderCounts,
    #[serde(rename = "averageAge")]
    pub average_age: f64,
    #[serde(rename = "averageBMI")]
    pub average_bmi: f64,
}

/// Pure aggregation over fetched rows. Rows without a BMI are excluded
/// from the BMI average but still count everywhere else.
pub fn aggregate(rows: &[StatsRow]) -> PredictionStats {
    let total = rows.len() as u64;
    let high_risk = rows.iter().filter(|r| r.risk_prediction == 1).count() as u64;
    let male = rows.iter().filter(|r| r.gender == 2).count() as u64;

    let average_age = if rows.is_empty() {
        0.0
    } else {
        rows.iter().map(|r| r.age as f64).sum::<f64>() / rows.len() as f64
    };

    let with_bmi: Vec<f64> = rows.iter().filter_map(|r| r.bmi).collect();
    let average_bmi = if with_bmi.is_empty() {
        0.0
    } else {
        with_bmi.iter().sum::<f64>() / with_bmi.len() as f64
    };

    PredictionStats {
        total,
        high_risk,
        low_risk: total - high_risk,
        by_gender: GenderCounts { male, female: total - male },
        average_age,
        average_bmi,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(risk: u8, gender: i64, age: u32, bmi: Option<f64>) -> StatsRow {
        StatsRow { risk_prediction: risk, gender, age, bmi, prediction_source: None }
    }

    #[test]
    fn aggregate_empty_table() {
        let stats = aggregate(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.average_age, 0.0);
        assert_eq!(stats.average_bmi, 0.0);
    }

    #[test]
    fn aggregate_counts_and_averages() {
        let rows = vec![
            row(1, 2, 60, Some(31.0)),
            row(0, 1, 30, Some(22.0)),
            row(0, 1, 40, None),
        ];
        let stats = aggregate(&rows);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.high_risk, 1);
        assert_eq!(stats.low_risk, 2);
        assert_eq!(stats.by_gender.male, 1);
        assert_eq!(stats.by_gender.female, 2);
        assert!((stats.average_age - 130.0 / 3.0).abs() < 1e-9);
        // Null BMI excluded from the BMI average.
        assert!((stats.average_bmi - 26.5).abs() < 1e-9);
    }

    #[test]
    fn stats_serialize_with_legacy_keys() {
        let json = serde_json::to_value(aggregate(&[])).unwrap();
        assert!(json.get("highRisk").is_some());
        assert!(json.get("byGender").is_some());
        assert!(json.get("averageBMI").is_some());
    }

    #[test]
    fn session_ids_follow_the_legacy_shape() {
        let id = generate_session_id();
        assert!(id.starts_with("session_"));
        assert_eq!(id.split('_').count(), 3);
        assert_eq!(id.split('_').next_back().unwrap().len(), 13);
    }

    #[test]
    fn page_math() {
        let page = PredictionPage::new(vec![], 2, 10, 57);
        assert_eq!(page.total_pages, 6);
        let page = PredictionPage::new(vec![], 1, 10, 0);
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn page_offset_never_overflows() {
        assert_eq!(page_offset(1, 10), 0);
        assert_eq!(page_offset(0, 10), 0);
        assert_eq!(page_offset(3, 10), 20);
        // u32::MAX * 100 does not fit in u32; the widened math must.
        assert_eq!(page_offset(u32::MAX, 100), (u32::MAX as u64 - 1) * 100);
    }
}
