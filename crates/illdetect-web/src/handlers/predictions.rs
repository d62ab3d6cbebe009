//! GET /api/predictions — paginated prediction history.

use axum::extract::{Query, State};
use axum::Json;
use illdetect_common::error::{ApiError, FieldError, IllDetectError};
use illdetect_store::{PredictionFilter, PredictionPage};
use serde::{Deserialize, Serialize};

use crate::state::SharedState;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    #[serde(rename = "riskLevel")]
    pub risk_level: Option<u8>,
    pub gender: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub success: bool,
    pub data: Vec<illdetect_store::PredictionRecord>,
    pub pagination: Pagination,
}

fn validate_query(query: &ListQuery) -> Result<(u32, u32, PredictionFilter), Vec<FieldError>> {
    let mut errors = Vec::new();

    let page = query.page.unwrap_or(1);
    if page < 1 {
        errors.push(FieldError::new("page", "must be at least 1"));
    }

    let limit = query.limit.unwrap_or(10);
    if !(1..=100).contains(&limit) {
        errors.push(FieldError::new("limit", "must be between 1 and 100"));
    }

    if let Some(risk) = query.risk_level {
        if risk > 1 {
            errors.push(FieldError::new("riskLevel", "must be 0 or 1"));
        }
    }
    if let Some(gender) = query.gender {
        if !(1..=2).contains(&gender) {
            errors.push(FieldError::new("gender", "must be 1 (Female) or 2 (Male)"));
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok((
        page,
        limit,
        PredictionFilter { risk_level: query.risk_level, gender: query.gender },
    ))
}

pub async fn list_predictions(
    State(state): State<SharedState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>, ApiError> {
    let (page, limit, filter) = validate_query(&query).map_err(IllDetectError::Validation)?;

    let page: PredictionPage = state.store.list(page, limit, &filter).await?;

    Ok(Json(ListResponse {
        success: true,
        pagination: Pagination {
            page: page.page,
            limit: page.limit,
            total: page.total,
            total_pages: page.total_pages,
        },
        data: page.data,
    }))
}
