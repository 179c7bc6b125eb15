//! Flute catalogue
//!
//! Maps corrugation flute codes to board thickness. The catalogue is
//! normally loaded from a persisted JSON array and is always sanitised
//! on the way in: codes are trimmed and upper-cased, rows without a code
//! or with a bad thickness are dropped, and duplicate codes keep the
//! last row seen.

use super::{coerce_number, normalize_flute_code};
use crate::error::{DataError, DataResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// A single flute profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flute {
    /// Flute code (e.g. "B", "BC")
    pub flute: String,
    /// Board thickness in mm
    pub thickness: f64,
}

impl Flute {
    /// Create a validated flute row
    pub fn new(code: &str, thickness: f64) -> DataResult<Self> {
        let flute = normalize_flute_code(code);
        if flute.is_empty() {
            return Err(DataError::EmptyFluteCode);
        }
        if !thickness.is_finite() || thickness <= 0.0 {
            return Err(DataError::InvalidThickness { flute, thickness });
        }
        Ok(Self { flute, thickness })
    }
}

const DEFAULT_FLUTES: [(&str, f64); 9] = [
    ("E", 2.0),
    ("R", 2.5),
    ("B", 3.0),
    ("C", 4.0),
    ("A", 5.0),
    ("BE", 5.0),
    ("BR", 5.5),
    ("BC", 7.0),
    ("AC", 9.0),
];

/// Ordered collection of flutes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FluteCatalogue {
    flutes: Vec<Flute>,
}

impl FluteCatalogue {
    /// Standard catalogue shipped with the tool
    pub fn standard() -> Self {
        Self {
            flutes: DEFAULT_FLUTES
                .iter()
                .map(|(code, thickness)| Flute {
                    flute: (*code).to_string(),
                    thickness: *thickness,
                })
                .collect(),
        }
    }

    /// Build a catalogue from rows, sanitising them.
    ///
    /// Falls back to the standard catalogue when nothing usable remains.
    pub fn from_rows(rows: impl IntoIterator<Item = Flute>) -> Self {
        let mut flutes: Vec<Flute> = Vec::new();
        for row in rows {
            let clean = match Flute::new(&row.flute, row.thickness) {
                Ok(clean) => clean,
                Err(e) => {
                    warn!("Dropping flute row '{}': {}", row.flute, e);
                    continue;
                }
            };
            match flutes.iter().position(|f| f.flute == clean.flute) {
                Some(idx) => {
                    warn!(
                        "Duplicate flute {}: {} mm replaces {} mm",
                        clean.flute, clean.thickness, flutes[idx].thickness
                    );
                    flutes[idx].thickness = clean.thickness;
                }
                None => flutes.push(clean),
            }
        }

        if flutes.is_empty() {
            warn!("No usable flute rows, using the standard catalogue");
            Self::standard()
        } else {
            Self { flutes }
        }
    }

    /// Build a catalogue from a loosely-typed JSON blob.
    ///
    /// Anything other than an array yields the standard catalogue.
    pub fn from_value(value: &Value) -> Self {
        let Some(items) = value.as_array() else {
            warn!("Flute catalogue is not an array, using the standard catalogue");
            return Self::standard();
        };

        let rows = items.iter().filter_map(|item| {
            let code = match item.get("flute") {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => {
                    warn!("Dropping flute row without a code: {}", item);
                    return None;
                }
            };
            let thickness = match item.get("thickness") {
                None | Some(Value::Null) => return None,
                Some(v) => {
                    let n = coerce_number(Some(v));
                    if n == 0.0 {
                        return None;
                    }
                    n
                }
            };
            Some(Flute {
                flute: code,
                thickness,
            })
        });

        Self::from_rows(rows)
    }

    /// Board thickness for a flute code, if catalogued
    pub fn thickness_for(&self, code: &str) -> Option<f64> {
        let code = normalize_flute_code(code);
        self.flutes
            .iter()
            .find(|f| f.flute == code)
            .map(|f| f.thickness)
    }

    /// Check if a flute code is catalogued
    pub fn contains(&self, code: &str) -> bool {
        self.thickness_for(code).is_some()
    }

    /// Iterate flutes in catalogue order
    pub fn iter(&self) -> impl Iterator<Item = &Flute> {
        self.flutes.iter()
    }

    /// Number of flutes
    pub fn len(&self) -> usize {
        self.flutes.len()
    }

    /// Check if the catalogue is empty
    pub fn is_empty(&self) -> bool {
        self.flutes.is_empty()
    }
}

impl Default for FluteCatalogue {
    fn default() -> Self {
        Self::standard()
    }
}
