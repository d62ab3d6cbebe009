//! illdetect-store — Prediction persistence behind a trait seam.
//!
//! The real store is a managed Supabase table reached over PostgREST;
//! handlers only see the `PredictionStore` trait so tests can swap in
//! `MemoryStore`. Persistence is best-effort by contract: a failed write
//! becomes `saved: false`, never a failed response.

pub mod record;
pub mod supabase;

use async_trait::async_trait;
use illdetect_common::error::Result;
use tokio::sync::RwLock;

pub use record::{
    aggregate, generate_session_id, page_offset, GenderCounts, PredictionFilter,
    PredictionPage, PredictionRecord, PredictionStats, StatsRow,
};
pub use supabase::SupabaseStore;

#[async_trait]
pub trait PredictionStore: Send + Sync {
    /// Insert one record. One prediction, one row.
    async fn insert(&self, record: &PredictionRecord) -> Result<()>;

    /// Newest-first page of records, optionally filtered.
    async fn list(&self, page: u32, limit: u32, filter: &PredictionFilter) -> Result<PredictionPage>;

    /// Aggregate statistics over the whole table.
    async fn statistics(&self) -> Result<PredictionStats>;

    /// Connectivity check for health reporting only.
    async fn ping(&self) -> bool;
}

/// In-memory store used in tests and when no Supabase credentials are
/// configured.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: RwLock<Vec<PredictionRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PredictionStore for MemoryStore {
    async fn insert(&self, record: &PredictionRecord) -> Result<()> {
        let mut row = record.clone();
        row.created_at = Some(chrono::Utc::now());
        self.rows.write().await.push(row);
        Ok(())
    }

    async fn list(&self, page: u32, limit: u32, filter: &PredictionFilter) -> Result<PredictionPage> {
        let rows = self.rows.read().await;
        let page = page.max(1);

        let filtered: Vec<PredictionRecord> = rows
            .iter()
            .rev() // newest first
            .filter(|r| filter.risk_level.is_none_or(|want| r.risk_prediction == want))
            .filter(|r| filter.gender.is_none_or(|want| r.gender.dataset_code() == want))
            .cloned()
            .collect();

        let total = filtered.len() as u64;
        let start = usize::try_from(page_offset(page, limit)).unwrap_or(usize::MAX);
        let data = filtered
            .into_iter()
            .skip(start)
            .take(limit as usize)
            .collect();

        Ok(PredictionPage::new(data, page, limit, total))
    }

    async fn statistics(&self) -> Result<PredictionStats> {
        let rows = self.rows.read().await;
        let stat_rows: Vec<StatsRow> = rows.iter().map(StatsRow::from).collect();
        Ok(aggregate(&stat_rows))
    }

    async fn ping(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use illdetect_core::metrics::MetricsInput;
    use illdetect_core::scoring;

    fn record(age: u32, gender: i64, active: i64) -> PredictionRecord {
        let metrics = MetricsInput {
            age: Some(age as i64),
            gender: Some(gender),
            height: Some(170),
            weight: Some(70),
            ap_hi: Some(120),
            ap_lo: Some(80),
            cholesterol: Some(1),
            gluc: Some(1),
            smoke: Some(0),
            alco: Some(0),
            active: Some(active),
            sex: None,
        }
        .validate()
        .unwrap();
        let assessment = scoring::score(&metrics);
        PredictionRecord::new(&metrics, &assessment, generate_session_id(), None)
    }

    #[tokio::test]
    async fn memory_store_lists_newest_first() {
        let store = MemoryStore::new();
        store.insert(&record(30, 1, 1)).await.unwrap();
        store.insert(&record(60, 2, 0)).await.unwrap();

        let page = store.list(1, 10, &PredictionFilter::default()).await.unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.data[0].age, 60);
    }

    #[tokio::test]
    async fn memory_store_applies_filters() {
        let store = MemoryStore::new();
        store.insert(&record(30, 1, 1)).await.unwrap();
        store.insert(&record(60, 2, 0)).await.unwrap();

        let males = store
            .list(1, 10, &PredictionFilter { gender: Some(2), risk_level: None })
            .await
            .unwrap();
        assert_eq!(males.total, 1);
        assert_eq!(males.data[0].age, 60);
    }

    #[tokio::test]
    async fn memory_store_tolerates_huge_page_numbers() {
        let store = MemoryStore::new();
        store.insert(&record(30, 1, 1)).await.unwrap();

        let page = store
            .list(u32::MAX, 100, &PredictionFilter::default())
            .await
            .unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.total, 1);
    }

    #[tokio::test]
    async fn memory_store_statistics() {
        let store = MemoryStore::new();
        store.insert(&record(30, 1, 1)).await.unwrap();
        store.insert(&record(50, 2, 1)).await.unwrap();

        let stats = store.statistics().await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.by_gender.female, 1);
        assert!((stats.average_age - 40.0).abs() < 1e-9);
    }
}
