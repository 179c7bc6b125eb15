//! Manufacturing allowance tables
//!
//! An allowance table holds one row per flute for each glue side. A row
//! carries the per-panel width corrections (P1..P4) plus the suggested
//! glue-lap width, and any number of named style sections (`hsc`, `rsc`,
//! `ffsc`, ...) with the flap allowance and H1 for that style.
//!
//! Tables are round-tripped through a JSON blob, so reading is lenient:
//! flute codes are normalised and every missing or malformed number reads
//! as zero.

use super::flutes::FluteCatalogue;
use super::{coerce_number, normalize_flute_code, GlueSide};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Per-panel width corrections and the suggested glue-lap width (mm)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelAllowances {
    pub p1: f64,
    pub p2: f64,
    pub p3: f64,
    pub p4: f64,
    /// Suggested glue-lap width
    pub gl: f64,
}

impl PanelAllowances {
    /// P1..P4 in panel order
    pub fn adds(&self) -> [f64; 4] {
        [self.p1, self.p2, self.p3, self.p4]
    }
}

/// One row of the allowance table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllowanceEntry {
    /// Flute code this row applies to
    pub flute: String,
    /// Panel corrections
    #[serde(default)]
    pub panels: PanelAllowances,
    /// Style sections (`rsc: {flap, h1}` and friends) and any other keys
    #[serde(flatten)]
    pub sections: Map<String, Value>,
}

impl AllowanceEntry {
    /// Row with every allowance at zero
    pub fn blank(flute: &str) -> Self {
        let mut sections = Map::new();
        for style in ["hsc", "rsc", "ffsc"] {
            sections.insert(style.to_string(), style_section(0.0, 0.0));
        }
        Self {
            flute: normalize_flute_code(flute),
            panels: PanelAllowances::default(),
            sections,
        }
    }

    /// Read a row from a loosely-typed JSON value
    pub fn from_value(value: &Value) -> Self {
        let flute = match value.get("flute") {
            Some(Value::String(s)) => normalize_flute_code(s),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };

        let panels_value = value.get("panels");
        let field = |name: &str| coerce_number(panels_value.and_then(|p| p.get(name)));
        let panels = PanelAllowances {
            p1: field("p1"),
            p2: field("p2"),
            p3: field("p3"),
            p4: field("p4"),
            gl: field("gl"),
        };

        let mut sections = Map::new();
        if let Some(obj) = value.as_object() {
            for (key, val) in obj {
                if key == "flute" || key == "panels" {
                    continue;
                }
                if let Some(clean) = sanitize_section(val) {
                    sections.insert(key.clone(), clean);
                }
            }
        }

        Self {
            flute,
            panels,
            sections,
        }
    }

    /// Copy with flute code normalised and every section number coerced
    pub fn sanitized(&self) -> Self {
        let value = serde_json::to_value(self).unwrap_or(Value::Null);
        Self::from_value(&value)
    }

    /// Numeric value stored at `section.field`, if present
    pub fn section_value(&self, section: &str, field: &str) -> Option<f64> {
        self.sections
            .get(section)
            .and_then(|s| s.get(field))
            .and_then(Value::as_f64)
    }
}

fn style_section(flap: f64, h1: f64) -> Value {
    let mut obj = Map::new();
    obj.insert("flap".to_string(), Value::from(flap));
    obj.insert("h1".to_string(), Value::from(h1));
    Value::Object(obj)
}

fn sanitize_section(value: &Value) -> Option<Value> {
    match value {
        Value::Object(obj) => {
            let mut clean = Map::new();
            for (key, val) in obj {
                match val {
                    Value::Object(_) => {
                        if let Some(nested) = sanitize_section(val) {
                            clean.insert(key.clone(), nested);
                        }
                    }
                    _ => {
                        clean.insert(key.clone(), Value::from(coerce_number(Some(val))));
                    }
                }
            }
            Some(Value::Object(clean))
        }
        Value::Number(_) | Value::String(_) => Some(Value::from(coerce_number(Some(value)))),
        _ => None,
    }
}

/// Allowance rows for both glue sides
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AllowanceTable {
    #[serde(default)]
    pub inside: Vec<AllowanceEntry>,
    #[serde(default)]
    pub outside: Vec<AllowanceEntry>,
}

impl AllowanceTable {
    /// The shipped default table
    pub fn standard() -> Self {
        Self {
            inside: STANDARD_INSIDE.iter().map(StandardRow::entry).collect(),
            outside: STANDARD_OUTSIDE.iter().map(StandardRow::entry).collect(),
        }
    }

    /// Default rows for exactly the flutes in `flutes`, in catalogue order.
    ///
    /// Flutes without a shipped default get a blank row.
    pub fn defaults_for(flutes: &FluteCatalogue) -> Self {
        let standard = Self::standard();
        let pick = |rows: &[AllowanceEntry], code: &str| {
            rows.iter()
                .find(|r| r.flute == code)
                .cloned()
                .unwrap_or_else(|| AllowanceEntry::blank(code))
        };

        Self {
            inside: flutes
                .iter()
                .map(|f| pick(&standard.inside, &f.flute))
                .collect(),
            outside: flutes
                .iter()
                .map(|f| pick(&standard.outside, &f.flute))
                .collect(),
        }
    }

    /// Read a table from a loosely-typed JSON blob
    pub fn from_value(value: &Value) -> Self {
        let rows = |key: &str| -> Vec<AllowanceEntry> {
            value
                .get(key)
                .and_then(Value::as_array)
                .map(|arr| arr.iter().map(AllowanceEntry::from_value).collect())
                .unwrap_or_default()
        };
        Self {
            inside: rows("inside"),
            outside: rows("outside"),
        }
    }

    /// Copy with every row sanitised
    pub fn sanitized(&self) -> Self {
        Self {
            inside: self.inside.iter().map(AllowanceEntry::sanitized).collect(),
            outside: self.outside.iter().map(AllowanceEntry::sanitized).collect(),
        }
    }

    /// Complete the table against a flute catalogue.
    ///
    /// Rows are de-duplicated by flute (last row wins, first position kept),
    /// missing default rows are appended, then a blank row is appended for
    /// any catalogue flute still absent.
    pub fn ensure_complete(&self, flutes: &FluteCatalogue) -> Self {
        let defaults = Self::defaults_for(flutes);
        Self {
            inside: ensure_side(&self.inside, &defaults.inside, flutes),
            outside: ensure_side(&self.outside, &defaults.outside, flutes),
        }
    }

    /// Rows for one glue side
    pub fn rows(&self, side: GlueSide) -> &[AllowanceEntry] {
        match side {
            GlueSide::Inside => &self.inside,
            GlueSide::Outside => &self.outside,
        }
    }

    /// Exact row lookup by (side, flute)
    pub fn find(&self, side: GlueSide, flute: &str) -> Option<&AllowanceEntry> {
        let code = normalize_flute_code(flute);
        self.rows(side).iter().find(|r| r.flute == code)
    }

    /// Total number of rows across both sides
    pub fn len(&self) -> usize {
        self.inside.len() + self.outside.len()
    }

    /// Check if both sides are empty
    pub fn is_empty(&self) -> bool {
        self.inside.is_empty() && self.outside.is_empty()
    }
}

fn ensure_side(
    existing: &[AllowanceEntry],
    defaults: &[AllowanceEntry],
    flutes: &FluteCatalogue,
) -> Vec<AllowanceEntry> {
    let mut out: Vec<AllowanceEntry> = Vec::new();
    for row in existing {
        upsert(&mut out, row.sanitized(), true);
    }
    for row in defaults {
        upsert(&mut out, row.sanitized(), false);
    }
    for flute in flutes.iter() {
        upsert(&mut out, AllowanceEntry::blank(&flute.flute), false);
    }
    out
}

fn upsert(rows: &mut Vec<AllowanceEntry>, row: AllowanceEntry, overwrite: bool) {
    match rows.iter().position(|r| r.flute == row.flute) {
        Some(idx) => {
            if overwrite {
                rows[idx] = row;
            }
        }
        None => rows.push(row),
    }
}

struct StandardRow {
    flute: &'static str,
    panels: [f64; 5],
    hsc: (f64, f64),
    rsc: (f64, f64),
    ffsc: (f64, f64),
}

impl StandardRow {
    fn entry(&self) -> AllowanceEntry {
        let [p1, p2, p3, p4, gl] = self.panels;
        let mut sections = Map::new();
        sections.insert("hsc".to_string(), style_section(self.hsc.0, self.hsc.1));
        sections.insert("rsc".to_string(), style_section(self.rsc.0, self.rsc.1));
        sections.insert("ffsc".to_string(), style_section(self.ffsc.0, self.ffsc.1));
        AllowanceEntry {
            flute: self.flute.to_string(),
            panels: PanelAllowances { p1, p2, p3, p4, gl },
            sections,
        }
    }
}

// (flap, h1) per style
const STANDARD_INSIDE: [StandardRow; 9] = [
    StandardRow { flute: "E", panels: [2.0, 2.0, 2.0, 0.0, 28.0], hsc: (0.0, 2.0), rsc: (0.0, 3.0), ffsc: (0.0, 6.0) },
    StandardRow { flute: "R", panels: [2.0, 2.0, 3.0, 0.0, 28.0], hsc: (0.0, 3.0), rsc: (0.0, 5.0), ffsc: (0.0, 7.0) },
    StandardRow { flute: "B", panels: [3.0, 3.0, 3.0, 0.0, 28.0], hsc: (0.0, 3.0), rsc: (0.0, 6.0), ffsc: (0.0, 8.0) },
    StandardRow { flute: "C", panels: [4.0, 4.0, 4.0, 1.0, 28.0], hsc: (1.0, 4.0), rsc: (1.0, 8.0), ffsc: (1.0, 12.0) },
    StandardRow { flute: "A", panels: [5.0, 5.0, 5.0, 2.0, 30.0], hsc: (3.0, 5.0), rsc: (3.0, 10.0), ffsc: (1.0, 14.0) },
    StandardRow { flute: "BE", panels: [5.0, 5.0, 5.0, 2.0, 30.0], hsc: (3.0, 5.0), rsc: (3.0, 10.0), ffsc: (1.0, 14.0) },
    StandardRow { flute: "BR", panels: [5.0, 5.0, 5.0, 2.0, 30.0], hsc: (3.0, 5.0), rsc: (3.0, 11.0), ffsc: (1.0, 15.0) },
    StandardRow { flute: "BC", panels: [7.0, 7.0, 7.0, 2.0, 35.0], hsc: (4.0, 7.0), rsc: (4.0, 14.0), ffsc: (0.0, 20.0) },
    StandardRow { flute: "AC", panels: [10.0, 10.0, 10.0, 7.0, 35.0], hsc: (6.0, 10.0), rsc: (6.0, 20.0), ffsc: (4.0, 28.0) },
];

const STANDARD_OUTSIDE: [StandardRow; 9] = [
    StandardRow { flute: "E", panels: [2.0, 2.0, 2.0, 0.0, 28.0], hsc: (0.0, 2.0), rsc: (0.0, 3.0), ffsc: (0.0, 6.0) },
    StandardRow { flute: "R", panels: [4.0, 2.0, 2.0, 0.0, 28.0], hsc: (0.0, 3.0), rsc: (0.0, 5.0), ffsc: (0.0, 7.0) },
    StandardRow { flute: "B", panels: [5.0, 3.0, 3.0, 0.0, 28.0], hsc: (0.0, 3.0), rsc: (0.0, 6.0), ffsc: (0.0, 8.0) },
    StandardRow { flute: "C", panels: [6.0, 4.0, 4.0, 0.0, 28.0], hsc: (1.0, 4.0), rsc: (1.0, 8.0), ffsc: (0.0, 12.0) },
    StandardRow { flute: "A", panels: [8.0, 5.0, 5.0, 0.0, 30.0], hsc: (3.0, 5.0), rsc: (3.0, 10.0), ffsc: (1.0, 14.0) },
    StandardRow { flute: "BE", panels: [8.0, 5.0, 5.0, 0.0, 30.0], hsc: (3.0, 5.0), rsc: (3.0, 10.0), ffsc: (1.0, 14.0) },
    StandardRow { flute: "BR", panels: [8.0, 5.0, 5.0, 0.0, 30.0], hsc: (3.0, 5.0), rsc: (3.0, 11.0), ffsc: (1.0, 15.0) },
    StandardRow { flute: "BC", panels: [12.0, 7.0, 7.0, -2.0, 35.0], hsc: (4.0, 7.0), rsc: (4.0, 14.0), ffsc: (0.0, 20.0) },
    StandardRow { flute: "AC", panels: [17.0, 10.0, 10.0, 0.0, 35.0], hsc: (6.0, 10.0), rsc: (6.0, 20.0), ffsc: (4.0, 28.0) },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::flutes::Flute;
    use serde_json::json;

    #[test]
    fn test_standard_table() {
        let table = AllowanceTable::standard();
        assert_eq!(table.inside.len(), 9);
        assert_eq!(table.outside.len(), 9);

        let b = table.find(GlueSide::Outside, "b").unwrap();
        assert_eq!(b.panels.adds(), [5.0, 3.0, 3.0, 0.0]);
        assert_eq!(b.section_value("rsc", "h1"), Some(6.0));
        assert_eq!(b.section_value("rsc", "flap"), Some(0.0));

        let bc = table.find(GlueSide::Outside, "BC").unwrap();
        assert_eq!(bc.panels.p4, -2.0);
    }

    #[test]
    fn test_entry_from_value_is_lenient() {
        let entry = AllowanceEntry::from_value(&json!({
            "flute": " c ",
            "panels": {"p1": "4", "p2": "", "p3": null},
            "rsc": {"flap": "1", "h1": 8},
            "note": "ignored"
        }));
        assert_eq!(entry.flute, "C");
        assert_eq!(entry.panels.adds(), [4.0, 0.0, 0.0, 0.0]);
        assert_eq!(entry.section_value("rsc", "flap"), Some(1.0));
        assert_eq!(entry.sections.get("note"), Some(&json!(0.0)));
    }

    #[test]
    fn test_defaults_for_catalogue() {
        let flutes = FluteCatalogue::from_rows(vec![
            Flute::new("B", 3.0).unwrap(),
            Flute::new("AA", 10.0).unwrap(),
        ]);
        let table = AllowanceTable::defaults_for(&flutes);
        assert_eq!(table.inside.len(), 2);
        assert_eq!(table.inside[0].panels.p1, 3.0);
        assert_eq!(table.inside[1].flute, "AA");
        assert_eq!(table.inside[1].panels, PanelAllowances::default());
    }

    #[test]
    fn test_ensure_complete_keeps_edits_and_adds_missing() {
        let mut edited = AllowanceEntry::blank("b");
        edited.panels.p1 = 9.0;
        let table = AllowanceTable {
            inside: vec![],
            outside: vec![edited],
        };

        let flutes = FluteCatalogue::standard();
        let done = table.ensure_complete(&flutes);

        assert_eq!(done.outside.len(), 9);
        assert_eq!(done.outside[0].flute, "B");
        assert_eq!(done.outside[0].panels.p1, 9.0);
        assert_eq!(done.inside.len(), 9);
        assert_eq!(
            done.find(GlueSide::Inside, "C").unwrap().panels.p4,
            1.0
        );
    }

    #[test]
    fn test_serde_round_trip_preserves_sections() {
        let table = AllowanceTable::standard();
        let text = serde_json::to_string(&table).unwrap();
        let back: AllowanceTable = serde_json::from_str(&text).unwrap();
        assert_eq!(back, table);
    }
}
