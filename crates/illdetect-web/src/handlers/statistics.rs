//! GET /api/statistics — aggregate counts over the prediction table.

use axum::extract::State;
use axum::Json;
use illdetect_common::error::ApiError;
use illdetect_store::PredictionStats;
use serde::Serialize;

use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct StatisticsResponse {
    pub success: bool,
    pub statistics: PredictionStats,
}

pub async fn statistics(
    State(state): State<SharedState>,
) -> Result<Json<StatisticsResponse>, ApiError> {
    let statistics = state.store.statistics().await?;
    Ok(Json(StatisticsResponse { success: true, statistics }))
}
