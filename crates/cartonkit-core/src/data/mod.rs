//! Reference data for carton design
//!
//! This module provides:
//! - The flute catalogue (flute code to board thickness)
//! - Manufacturing allowance tables keyed by glue side and flute
//! - Lenient numeric coercion used when reading persisted tables

pub mod allowances;
pub mod flutes;

use crate::error::DataError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Which face of the board the glue lap is bonded to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GlueSide {
    /// Lap glued on the inside of the carton
    Inside,
    /// Lap glued on the outside of the carton
    #[default]
    Outside,
}

impl fmt::Display for GlueSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlueSide::Inside => write!(f, "inside"),
            GlueSide::Outside => write!(f, "outside"),
        }
    }
}

impl FromStr for GlueSide {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "inside" | "in" => Ok(GlueSide::Inside),
            "outside" | "out" => Ok(GlueSide::Outside),
            _ => Err(DataError::UnknownGlueSide {
                value: s.to_string(),
            }),
        }
    }
}

/// Normalise a flute code: trimmed and upper-cased
pub fn normalize_flute_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Coerce a loosely-typed JSON value into a number.
///
/// Missing, null, empty-string and unparseable values read as `0.0`.
pub(crate) fn coerce_number(value: Option<&Value>) -> f64 {
    let n = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        Some(Value::Bool(true)) => 1.0,
        _ => 0.0,
    };
    if n.is_finite() {
        n
    } else {
        0.0
    }
}
