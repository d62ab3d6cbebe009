//! Gender codec: three integer encodings of biological sex.
//!
//! Three collaborators each chose a different convention:
//!
//! | Frontend (UI form) | Dataset (storage) | ML (model input) |
//! |--------------------|-------------------|------------------|
//! | 0 = Female         | 1 = Female        | 0 = Female       |
//! | 1 = Male           | 2 = Male          | 1 = Male         |
//!
//! The dataset encoding is canonical inside the service. All
//! translations are pure lookups; out-of-domain values are a contract
//! error (`InvalidEncoding`), never silently coerced.

use illdetect_common::error::{IllDetectError, Result};
use serde::{Deserialize, Serialize};

/// Biological sex, stored and serialized in the dataset convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    /// Decode from the dataset convention (1 = Female, 2 = Male).
    pub fn from_dataset(value: i64) -> Result<Self> {
        match value {
            1 => Ok(Gender::Female),
            2 => Ok(Gender::Male),
            other => Err(IllDetectError::InvalidEncoding { scheme: "dataset", value: other }),
        }
    }

    /// Decode from the frontend convention (0 = Female, 1 = Male).
    pub fn from_frontend(value: i64) -> Result<Self> {
        match value {
            0 => Ok(Gender::Female),
            1 => Ok(Gender::Male),
            other => Err(IllDetectError::InvalidEncoding { scheme: "frontend", value: other }),
        }
    }

    /// Dataset encoding, matching the persisted schema.
    pub fn dataset_code(&self) -> i64 {
        match self {
            Gender::Female => 1,
            Gender::Male   => 2,
        }
    }

    /// Frontend encoding, used by the UI form.
    pub fn frontend_code(&self) -> i64 {
        match self {
            Gender::Female => 0,
            Gender::Male   => 1,
        }
    }

    /// ML encoding, expected by the remote model's feature vector.
    pub fn ml_code(&self) -> i64 {
        match self {
            Gender::Female => 0,
            Gender::Male   => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Female => "Female",
            Gender::Male   => "Male",
        }
    }
}

impl TryFrom<i64> for Gender {
    type Error = IllDetectError;

    fn try_from(value: i64) -> Result<Self> {
        Gender::from_dataset(value)
    }
}

impl From<Gender> for i64 {
    fn from(g: Gender) -> i64 {
        g.dataset_code()
    }
}

/// frontend {0,1} → dataset {1,2}
pub fn to_dataset(frontend: i64) -> Result<i64> {
    Ok(Gender::from_frontend(frontend)?.dataset_code())
}

/// dataset {1,2} → frontend {0,1}
pub fn to_frontend(dataset: i64) -> Result<i64> {
    Ok(Gender::from_dataset(dataset)?.frontend_code())
}

/// dataset {1,2} → ML {0,1}
pub fn to_ml(dataset: i64) -> Result<i64> {
    Ok(Gender::from_dataset(dataset)?.ml_code())
}
