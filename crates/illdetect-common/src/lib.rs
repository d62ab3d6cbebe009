//! illdetect-common — Shared errors and configuration used across all IllDetect crates.

pub mod config;
pub mod error;

pub use config::AppConfig;
pub use error::{ApiError, FieldError, IllDetectError, Result};
