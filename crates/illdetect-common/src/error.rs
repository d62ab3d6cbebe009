use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// A single field that failed domain validation.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self { field, message: message.into() }
    }
}

#[derive(Debug, Error)]
pub enum IllDetectError {
    /// Input outside the declared domain. The only error surfaced to callers.
    #[error("validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldError>),

    /// A gender value outside its encoding domain. Contract violation:
    /// validated input can never produce this.
    #[error("invalid {scheme} gender encoding: {value}")]
    InvalidEncoding { scheme: &'static str, value: i64 },

    /// All candidate ML endpoints failed. Always recovered by the
    /// rule-based fallback, never propagated to a caller.
    #[error("ML service unavailable: {0}")]
    RemoteUnavailable(String),

    /// Prediction store failure. Recovered as `saved: false`.
    #[error("prediction store error: {0}")]
    Store(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, IllDetectError>;

/// Error wrapper returned by HTTP handlers.
///
/// Maps the taxonomy onto status codes: validation problems are the
/// caller's fault (400 with field detail); anything else that escapes the
/// recovery paths is a 500 with a generic message.
#[derive(Debug)]
pub struct ApiError(pub IllDetectError);

impl<E> From<E> for ApiError
where
    E: Into<IllDetectError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<FieldError>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self.0 {
            IllDetectError::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                "Validation error".to_string(),
                Some(fields),
            ),
            other => {
                tracing::error!(error = %other, "unrecovered internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        (status, Json(ErrorBody { success: false, error, details })).into_response()
    }
}
