//! Allowance resolution
//!
//! Picks the allowance row for a (glue side, flute) pair and extracts the
//! H1 and flap allowance from whatever shape the row's style sections
//! take. Rows are searched in a fixed order so the same table always
//! yields the same numbers:
//!
//! 1. the exact (side, flute) row
//! 2. the row whose flute thickness is closest to the requested one
//! 3. the built-in "B" flute row
//!
//! Inside the chosen row, H1 and flap are looked up in a style-specific
//! path first (`rsc.h1`), then an exact key anywhere, then any key ending
//! in the field name. Nested maps are walked in sorted key order.

use cartonkit_core::{AllowanceEntry, AllowanceTable, FluteCatalogue, GlueSide};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// Flute of the row used when nothing else matches.
pub const FALLBACK_FLUTE: &str = "B";

/// Style section read by default.
pub const DEFAULT_STYLE_KEY: &str = "rsc";

/// Allowance numbers for one design pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AllowanceRow {
    pub p1: f64,
    pub p2: f64,
    pub p3: f64,
    pub p4: f64,
    pub h1: f64,
    pub flap: f64,
}

impl AllowanceRow {
    /// P1..P4 in panel order
    pub fn adds(&self) -> [f64; 4] {
        [self.p1, self.p2, self.p3, self.p4]
    }
}

/// Where a resolved row came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AllowanceSource {
    /// The table had a row for the requested flute
    Exact,
    /// Borrowed from the flute with the closest board thickness
    NearestThickness { flute: String },
    /// Built-in "B" flute row
    BuiltinDefault,
}

/// A resolved row plus provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedAllowance {
    pub row: AllowanceRow,
    pub source: AllowanceSource,
    /// Glue-lap width suggested by the table, when set
    pub suggested_glue_lap: Option<f64>,
}

/// Read-only view over an allowance table
#[derive(Debug, Clone)]
pub struct AllowanceResolver<'a> {
    table: &'a AllowanceTable,
    flutes: &'a FluteCatalogue,
    style_key: String,
}

impl<'a> AllowanceResolver<'a> {
    pub fn new(table: &'a AllowanceTable, flutes: &'a FluteCatalogue) -> Self {
        Self {
            table,
            flutes,
            style_key: DEFAULT_STYLE_KEY.to_string(),
        }
    }

    /// Read a different style section (`hsc`, `ffsc`, ...)
    pub fn with_style_key(mut self, key: &str) -> Self {
        let key = normalize_key(key);
        if !key.is_empty() {
            self.style_key = key;
        }
        self
    }

    pub fn style_key(&self) -> &str {
        &self.style_key
    }

    /// Resolve the row for a glue side and flute.
    ///
    /// `thickness` is the board thickness of the design; it drives the
    /// nearest-tier search when the flute is not catalogued and the H1
    /// default when no H1 is stored.
    pub fn resolve(&self, side: GlueSide, flute: &str, thickness: f64) -> ResolvedAllowance {
        if let Some(entry) = self.table.find(side, flute) {
            return self.extract(entry, thickness, AllowanceSource::Exact);
        }

        let target = self.flutes.thickness_for(flute).unwrap_or(thickness);
        if let Some(entry) = self.nearest_thickness(side, target) {
            warn!(
                "No {} allowance row for flute '{}', using '{}' (nearest thickness to {} mm)",
                side, flute, entry.flute, target
            );
            let source = AllowanceSource::NearestThickness {
                flute: entry.flute.clone(),
            };
            return self.extract(entry, thickness, source);
        }

        warn!(
            "No usable {} allowance rows for flute '{}', using built-in '{}' row",
            side, flute, FALLBACK_FLUTE
        );
        let standard = AllowanceTable::standard();
        match standard.find(side, FALLBACK_FLUTE) {
            Some(entry) => self.extract(entry, thickness, AllowanceSource::BuiltinDefault),
            None => self.extract(
                &AllowanceEntry::blank(FALLBACK_FLUTE),
                thickness,
                AllowanceSource::BuiltinDefault,
            ),
        }
    }

    fn nearest_thickness(&self, side: GlueSide, target: f64) -> Option<&'a AllowanceEntry> {
        if !target.is_finite() {
            return None;
        }
        let mut best: Option<(&'a AllowanceEntry, f64)> = None;
        for entry in self.table.rows(side) {
            let Some(t) = self.flutes.thickness_for(&entry.flute) else {
                continue;
            };
            let diff = (t - target).abs();
            // Strict comparison keeps the first row on ties
            if best.is_none_or(|(_, d)| diff < d) {
                best = Some((entry, diff));
            }
        }
        best.map(|(entry, _)| entry)
    }

    fn extract(
        &self,
        entry: &AllowanceEntry,
        thickness: f64,
        source: AllowanceSource,
    ) -> ResolvedAllowance {
        let h1 = lookup_numeric(&entry.sections, &self.style_key, "h1").unwrap_or(2.0 * thickness);
        let flap = lookup_numeric(&entry.sections, &self.style_key, "flap").unwrap_or(0.0);
        let panels = entry.panels;
        let finite = |v: f64| if v.is_finite() { v } else { 0.0 };

        ResolvedAllowance {
            row: AllowanceRow {
                p1: finite(panels.p1),
                p2: finite(panels.p2),
                p3: finite(panels.p3),
                p4: finite(panels.p4),
                h1: finite(h1),
                flap: finite(flap),
            },
            source,
            suggested_glue_lap: (panels.gl.is_finite() && panels.gl > 0.0).then_some(panels.gl),
        }
    }
}

fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

struct Leaf {
    path: Vec<String>,
    key: String,
    value: f64,
}

fn collect_leaves(map: &Map<String, Value>, path: &mut Vec<String>, out: &mut Vec<Leaf>) {
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();
    for key in keys {
        let Some(value) = map.get(key) else {
            continue;
        };
        match value {
            Value::Object(inner) => {
                path.push(normalize_key(key));
                collect_leaves(inner, path, out);
                path.pop();
            }
            Value::Number(n) => {
                if let Some(v) = n.as_f64() {
                    out.push(Leaf {
                        path: path.clone(),
                        key: normalize_key(key),
                        value: v,
                    });
                }
            }
            Value::String(s) => {
                if let Ok(v) = s.trim().parse::<f64>() {
                    out.push(Leaf {
                        path: path.clone(),
                        key: normalize_key(key),
                        value: v,
                    });
                }
            }
            _ => {}
        }
    }
}

/// Find a numeric field in arbitrarily nested style sections.
pub fn lookup_numeric(sections: &Map<String, Value>, style_key: &str, field: &str) -> Option<f64> {
    let style = normalize_key(style_key);
    let field = normalize_key(field);
    let mut leaves = Vec::new();
    collect_leaves(sections, &mut Vec::new(), &mut leaves);

    let in_style = |leaf: &&Leaf| {
        !style.is_empty()
            && (leaf.path.iter().any(|seg| seg.contains(&style)) || leaf.key.contains(&style))
    };

    leaves
        .iter()
        .find(|leaf| in_style(leaf) && leaf.key.ends_with(&field))
        .or_else(|| leaves.iter().find(|leaf| leaf.key == field))
        .or_else(|| leaves.iter().find(|leaf| leaf.key.ends_with(&field)))
        .map(|leaf| leaf.value)
}
