//! Health-metrics input record and its domain validation.
//!
//! `MetricsInput` is the raw wire shape (everything an integer, gender in
//! either encoding); `HealthMetrics` is the validated, strongly typed
//! record the estimator consumes. No partial record is ever scored:
//! validation happens in one place, before estimation.

use illdetect_common::error::{FieldError, IllDetectError};
use serde::{Deserialize, Serialize};

use crate::gender::Gender;

/// Three-level clinical measurement (cholesterol, glucose).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Level3 {
    Normal,
    AboveNormal,
    WellAboveNormal,
}

impl Level3 {
    pub fn code(&self) -> i64 {
        match self {
            Level3::Normal          => 1,
            Level3::AboveNormal     => 2,
            Level3::WellAboveNormal => 3,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Level3::Normal          => "Normal",
            Level3::AboveNormal     => "Above Normal",
            Level3::WellAboveNormal => "Well Above Normal",
        }
    }
}

impl TryFrom<i64> for Level3 {
    type Error = IllDetectError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Level3::Normal),
            2 => Ok(Level3::AboveNormal),
            3 => Ok(Level3::WellAboveNormal),
            other => Err(IllDetectError::InvalidEncoding { scheme: "level3", value: other }),
        }
    }
}

impl From<Level3> for i64 {
    fn from(l: Level3) -> i64 {
        l.code()
    }
}

/// A complete, validated health-metrics record (dataset encoding).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthMetrics {
    /// Age in years, [1, 120].
    pub age: u32,
    pub gender: Gender,
    /// Height in cm, [100, 250].
    pub height_cm: u32,
    /// Weight in kg, [30, 200].
    pub weight_kg: u32,
    /// Systolic blood pressure, [80, 250].
    pub ap_hi: u32,
    /// Diastolic blood pressure, [40, 150].
    pub ap_lo: u32,
    pub cholesterol: Level3,
    pub glucose: Level3,
    pub smoke: bool,
    pub alco: bool,
    pub active: bool,
}

impl HealthMetrics {
    /// Body mass index at full precision: kg / (m)^2.
    pub fn bmi(&self) -> f64 {
        let height_m = self.height_cm as f64 / 100.0;
        self.weight_kg as f64 / (height_m * height_m)
    }

    /// BMI rounded to one decimal place for display and persistence.
    pub fn bmi_display(&self) -> f64 {
        (self.bmi() * 10.0).round() / 10.0
    }
}

/// Raw prediction request payload, prior to validation.
///
/// Gender arrives in one of two conventions: `gender` (dataset 1/2) or
/// `sex` (frontend 0/1). At least one is required; `gender` wins when
/// both are present, matching the original backend.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricsInput {
    pub age: Option<i64>,
    pub gender: Option<i64>,
    pub sex: Option<i64>,
    pub height: Option<i64>,
    pub weight: Option<i64>,
    pub ap_hi: Option<i64>,
    pub ap_lo: Option<i64>,
    pub cholesterol: Option<i64>,
    pub gluc: Option<i64>,
    pub smoke: Option<i64>,
    pub alco: Option<i64>,
    pub active: Option<i64>,
}

impl MetricsInput {
    /// Validate every field against its declared domain, collecting all
    /// failures rather than stopping at the first.
    pub fn validate(&self) -> Result<HealthMetrics, Vec<FieldError>> {
        let mut errors = Vec::new();

        let age = require_range(&mut errors, "age", self.age, 1, 120);
        let height = require_range(&mut errors, "height", self.height, 100, 250);
        let weight = require_range(&mut errors, "weight", self.weight, 30, 200);
        let ap_hi = require_range(&mut errors, "ap_hi", self.ap_hi, 80, 250);
        let ap_lo = require_range(&mut errors, "ap_lo", self.ap_lo, 40, 150);
        let cholesterol = require_level3(&mut errors, "cholesterol", self.cholesterol);
        let gluc = require_level3(&mut errors, "gluc", self.gluc);
        let smoke = require_flag(&mut errors, "smoke", self.smoke);
        let alco = require_flag(&mut errors, "alco", self.alco);
        let active = require_flag(&mut errors, "active", self.active);

        let gender = match (self.gender, self.sex) {
            (Some(g), _) => match Gender::from_dataset(g) {
                Ok(g) => Some(g),
                Err(_) => {
                    errors.push(FieldError::new("gender", "must be 1 (Female) or 2 (Male)"));
                    None
                }
            },
            (None, Some(s)) => match Gender::from_frontend(s) {
                Ok(g) => Some(g),
                Err(_) => {
                    errors.push(FieldError::new("sex", "must be 0 (Female) or 1 (Male)"));
                    None
                }
            },
            (None, None) => {
                errors.push(FieldError::new("gender", "either gender (1/2) or sex (0/1) is required"));
                None
            }
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        // Every unwrap below is backed by the emptiness check above.
        Ok(HealthMetrics {
            age: age.unwrap(),
            gender: gender.unwrap(),
            height_cm: height.unwrap(),
            weight_kg: weight.unwrap(),
            ap_hi: ap_hi.unwrap(),
            ap_lo: ap_lo.unwrap(),
            cholesterol: cholesterol.unwrap(),
            glucose: gluc.unwrap(),
            smoke: smoke.unwrap(),
            alco: alco.unwrap(),
            active: active.unwrap(),
        })
    }
}

fn require_range(
    errors: &mut Vec<FieldError>,
    field: &'static str,
    value: Option<i64>,
    min: i64,
    max: i64,
) -> Option<u32> {
    match value {
        Some(v) if (min..=max).contains(&v) => Some(v as u32),
        Some(_) => {
            errors.push(FieldError::new(field, format!("must be between {min} and {max}")));
            None
        }
        None => {
            errors.push(FieldError::new(field, "is required"));
            None
        }
    }
}

fn require_level3(
    errors: &mut Vec<FieldError>,
    field: &'static str,
    value: Option<i64>,
) -> Option<Level3> {
    match value.map(Level3::try_from) {
        Some(Ok(level)) => Some(level),
        Some(Err(_)) => {
            errors.push(FieldError::new(field, "must be 1, 2 or 3"));
            None
        }
        None => {
            errors.push(FieldError::new(field, "is required"));
            None
        }
    }
}

fn require_flag(
    errors: &mut Vec<FieldError>,
    field: &'static str,
    value: Option<i64>,
) -> Option<bool> {
    match value {
        Some(0) => Some(false),
        Some(1) => Some(true),
        Some(_) => {
            errors.push(FieldError::new(field, "must be 0 or 1"));
            None
        }
        None => {
            errors.push(FieldError::new(field, "is required"));
            None
        }
    }
}
