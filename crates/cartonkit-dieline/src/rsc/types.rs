//! Type definitions for the Regular Slotted Case generator

use crate::error::{ParameterError, ParameterResult};
use cartonkit_core::GlueSide;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// FEFCO code of the Regular Slotted Case.
pub const RSC_STYLE: &str = "0201";

pub const DEFAULT_LENGTH: f64 = 267.0;
pub const DEFAULT_WIDTH: f64 = 120.0;
pub const DEFAULT_HEIGHT: f64 = 80.0;
pub const DEFAULT_THICKNESS: f64 = 3.0;
pub const DEFAULT_GLUE_LAP: f64 = 28.0;
pub const DEFAULT_BEVEL_ANGLE: f64 = 24.0;
pub const DEFAULT_SLOT_WIDTH: f64 = 9.0;
pub const MIN_SLOT_WIDTH: f64 = 0.5;

/// Replace a non-finite or non-positive value with a fallback
pub(crate) fn positive_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}

/// Replace a non-finite value with 0 and clamp negatives to 0
pub(crate) fn non_negative(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

/// Round half towards positive infinity, the way the layout tables were
/// calibrated.
pub(crate) fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Internal carton dimensions and board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxSpec {
    /// Internal length in mm
    pub length: f64,
    /// Internal width in mm
    pub width: f64,
    /// Internal height in mm
    pub height: f64,
    /// Board thickness in mm
    pub thickness: f64,
    /// FEFCO style code
    pub style: String,
}

impl Default for BoxSpec {
    fn default() -> Self {
        Self {
            length: DEFAULT_LENGTH,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            thickness: DEFAULT_THICKNESS,
            style: RSC_STYLE.to_string(),
        }
    }
}

impl BoxSpec {
    pub fn new(length: f64, width: f64, height: f64, thickness: f64) -> Self {
        Self {
            length,
            width,
            height,
            thickness,
            style: RSC_STYLE.to_string(),
        }
    }

    /// True when the style code names the Regular Slotted Case
    pub fn is_rsc(&self) -> bool {
        let code = self.style.trim();
        code.is_empty() || code == RSC_STYLE || code.eq_ignore_ascii_case("rsc")
    }

    /// Copy with every unusable dimension replaced by its default
    pub fn sanitized(&self) -> Self {
        Self {
            length: positive_or(self.length, DEFAULT_LENGTH),
            width: positive_or(self.width, DEFAULT_WIDTH),
            height: positive_or(self.height, DEFAULT_HEIGHT),
            thickness: positive_or(self.thickness, DEFAULT_THICKNESS),
            style: self.style.trim().to_string(),
        }
    }

    /// Report the first dimension the engine would have to repair
    pub fn validate(&self) -> ParameterResult<()> {
        for (name, value) in [
            ("length", self.length),
            ("width", self.width),
            ("height", self.height),
            ("thickness", self.thickness),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ParameterError::InvalidDimensions(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Which panel the glue lap is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GlueOff {
    /// Lap on a width panel
    #[default]
    Small,
    /// Lap on a length panel
    Large,
}

impl fmt::Display for GlueOff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlueOff::Small => write!(f, "small"),
            GlueOff::Large => write!(f, "large"),
        }
    }
}

impl FromStr for GlueOff {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "small" | "w" | "width" => Ok(GlueOff::Small),
            "large" | "l" | "length" => Ok(GlueOff::Large),
            _ => Err(ParameterError::InvalidValue {
                name: "glue_off".to_string(),
                reason: format!("expected 'small' or 'large', got '{}'", s),
            }),
        }
    }
}

/// Glue lap configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlueConfig {
    pub side: GlueSide,
    pub off: GlueOff,
    /// Lap width in mm
    pub lap_width: f64,
    /// Explicit bevel rise in mm; 0 means derive it from the angle
    pub extension_a: f64,
    /// Bevel angle in degrees
    pub bevel_angle_deg: f64,
}

impl Default for GlueConfig {
    fn default() -> Self {
        Self {
            side: GlueSide::Outside,
            off: GlueOff::Small,
            lap_width: DEFAULT_GLUE_LAP,
            extension_a: 0.0,
            bevel_angle_deg: DEFAULT_BEVEL_ANGLE,
        }
    }
}

impl GlueConfig {
    /// Copy with unusable numbers repaired.
    ///
    /// `lap_fallback` replaces a missing lap width, normally the table's
    /// suggested lap for the flute.
    pub fn sanitized(&self, lap_fallback: f64) -> Self {
        Self {
            side: self.side,
            off: self.off,
            lap_width: positive_or(self.lap_width, positive_or(lap_fallback, DEFAULT_GLUE_LAP)),
            extension_a: non_negative(self.extension_a),
            bevel_angle_deg: if self.bevel_angle_deg.is_finite() {
                self.bevel_angle_deg
            } else {
                DEFAULT_BEVEL_ANGLE
            },
        }
    }

    pub fn validate(&self) -> ParameterResult<()> {
        if !self.lap_width.is_finite() || self.lap_width <= 0.0 {
            return Err(ParameterError::InvalidDimensions(format!(
                "lap_width must be a positive number, got {}",
                self.lap_width
            )));
        }
        if !self.extension_a.is_finite() || self.extension_a < 0.0 {
            return Err(ParameterError::InvalidValue {
                name: "extension_a".to_string(),
                reason: format!("must be zero or positive, got {}", self.extension_a),
            });
        }
        if !(self.bevel_angle_deg > 0.0 && self.bevel_angle_deg < 90.0) {
            return Err(ParameterError::OutOfRange {
                name: "bevel_angle_deg".to_string(),
                value: self.bevel_angle_deg,
                min: 0.0,
                max: 90.0,
            });
        }
        Ok(())
    }
}

/// The gap field a user changed last
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GapEdit {
    #[default]
    None,
    TopInner,
    TopOuter,
    BotInner,
    BotOuter,
}

impl GapEdit {
    pub fn is_outer(self) -> bool {
        matches!(self, GapEdit::TopOuter | GapEdit::BotOuter)
    }

    /// Same field on the opposite edge
    pub fn mirrored(self) -> Self {
        match self {
            GapEdit::None => GapEdit::None,
            GapEdit::TopInner => GapEdit::BotInner,
            GapEdit::TopOuter => GapEdit::BotOuter,
            GapEdit::BotInner => GapEdit::TopInner,
            GapEdit::BotOuter => GapEdit::TopOuter,
        }
    }
}

impl fmt::Display for GapEdit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GapEdit::None => "none",
            GapEdit::TopInner => "top-inner",
            GapEdit::TopOuter => "top-outer",
            GapEdit::BotInner => "bot-inner",
            GapEdit::BotOuter => "bot-outer",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for GapEdit {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "" | "none" => Ok(GapEdit::None),
            "topinner" => Ok(GapEdit::TopInner),
            "topouter" => Ok(GapEdit::TopOuter),
            "botinner" | "bottominner" => Ok(GapEdit::BotInner),
            "botouter" | "bottomouter" => Ok(GapEdit::BotOuter),
            _ => Err(ParameterError::InvalidValue {
                name: "last_edited".to_string(),
                reason: format!("unknown gap field '{}'", s),
            }),
        }
    }
}

/// Flap gap locks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GapLocks {
    /// Keep top outer = top inner + panel delta
    pub top: bool,
    /// Keep bottom outer = bottom inner + panel delta
    pub bottom: bool,
    /// Keep bottom gaps equal to top gaps
    pub symmetry: bool,
}

impl Default for GapLocks {
    fn default() -> Self {
        Self {
            top: true,
            bottom: true,
            symmetry: true,
        }
    }
}

/// Gaps between opposing flaps, in mm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GapConfig {
    pub top_inner: f64,
    pub top_outer: f64,
    pub bot_inner: f64,
    pub bot_outer: f64,
    pub locks: GapLocks,
    pub last_edited: GapEdit,
}

impl GapConfig {
    pub fn get(&self, field: GapEdit) -> Option<f64> {
        match field {
            GapEdit::None => None,
            GapEdit::TopInner => Some(self.top_inner),
            GapEdit::TopOuter => Some(self.top_outer),
            GapEdit::BotInner => Some(self.bot_inner),
            GapEdit::BotOuter => Some(self.bot_outer),
        }
    }

    pub(crate) fn set(&mut self, field: GapEdit, value: f64) {
        match field {
            GapEdit::None => {}
            GapEdit::TopInner => self.top_inner = value,
            GapEdit::TopOuter => self.top_outer = value,
            GapEdit::BotInner => self.bot_inner = value,
            GapEdit::BotOuter => self.bot_outer = value,
        }
    }

    /// Record a user edit of one gap field
    pub fn with_edit(mut self, field: GapEdit, value: f64) -> Self {
        self.set(field, value);
        self.last_edited = field;
        self
    }

    /// Copy with non-finite gaps replaced by 0
    pub fn sanitized(&self) -> Self {
        let finite = |v: f64| if v.is_finite() { v } else { 0.0 };
        Self {
            top_inner: finite(self.top_inner),
            top_outer: finite(self.top_outer),
            bot_inner: finite(self.bot_inner),
            bot_outer: finite(self.bot_outer),
            locks: self.locks,
            last_edited: self.last_edited,
        }
    }

    /// True when the bottom gaps mirror the top gaps
    pub fn is_symmetric(&self) -> bool {
        self.top_inner == self.bot_inner && self.top_outer == self.bot_outer
    }
}

/// Slot cutting configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotConfig {
    /// Nominal slot width in mm
    pub slot_width: f64,
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            slot_width: DEFAULT_SLOT_WIDTH,
        }
    }
}

impl SlotConfig {
    pub fn sanitized(&self) -> Self {
        let width = if self.slot_width.is_finite() {
            self.slot_width.max(MIN_SLOT_WIDTH)
        } else {
            DEFAULT_SLOT_WIDTH
        };
        Self { slot_width: width }
    }
}

/// A point on the blank, in mm with y pointing down
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Append a point unless it repeats the previous one
pub(crate) fn push_unique_point(path: &mut Vec<Point>, point: Point) {
    if let Some(last) = path.last() {
        if (point.x - last.x).abs() < 1e-6 && (point.y - last.y).abs() < 1e-6 {
            return;
        }
    }
    path.push(point);
}

/// Which body dimension a panel spans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PanelRole {
    #[serde(rename = "L")]
    Length,
    #[serde(rename = "W")]
    Width,
}

impl fmt::Display for PanelRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanelRole::Length => write!(f, "L"),
            PanelRole::Width => write!(f, "W"),
        }
    }
}

/// One body panel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    pub role: PanelRole,
    /// Rounded panel width in mm
    pub width: f64,
}

/// Top or bottom edge of the blank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Top,
    Bottom,
}

/// Inner and outer flap values for one edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct EdgeFlaps {
    /// Flaps on panels 1 and 3
    pub inner: f64,
    /// Flaps on panels 2 and 4
    pub outer: f64,
}

impl EdgeFlaps {
    /// Values in panel order
    pub fn per_panel(&self) -> [f64; 4] {
        [self.inner, self.outer, self.inner, self.outer]
    }

    pub fn max(&self) -> f64 {
        self.inner.max(self.outer)
    }
}

/// Flap heights for both edges
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct FlapHeights {
    pub top: EdgeFlaps,
    pub bottom: EdgeFlaps,
}

/// Free-edge y of every flap, in panel order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlapEdges {
    pub top: [f64; 4],
    pub bottom: [f64; 4],
}

impl FlapEdges {
    pub fn edge(&self, edge: Edge) -> [f64; 4] {
        match edge {
            Edge::Top => self.top,
            Edge::Bottom => self.bottom,
        }
    }
}

/// Bevelled transition from the glue lap to the outer sheet edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChamferGeometry {
    /// Outer-edge x where both chamfer lines end
    pub outer_x: f64,
    /// Inner x where the chamfers leave the flap edges
    pub start_x: f64,
    pub top_start_y: f64,
    pub bottom_start_y: f64,
    /// Rise actually applied, before clamping
    pub vertical_change: f64,
    pub top_y: f64,
    pub bottom_y: f64,
}

impl ChamferGeometry {
    /// Vertical segment joining the chamfers, when they do not meet
    pub fn outer_edge(&self) -> Option<(Point, Point)> {
        (self.bottom_y > self.top_y).then(|| {
            (
                Point::new(self.outer_x, self.top_y),
                Point::new(self.outer_x, self.bottom_y),
            )
        })
    }
}

/// A slotted x-interval around one vertical score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlotInterval {
    pub score_x: f64,
    pub start: f64,
    pub end: f64,
}

impl SlotInterval {
    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

/// Slots planned for one blank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotPlan {
    /// Nominal half-width before clamping
    pub half_width: f64,
    /// Intervals in ascending x
    pub intervals: Vec<SlotInterval>,
}

/// Ordered cut vertices along one edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryPath {
    pub edge: Edge,
    pub vertices: Vec<Point>,
}

/// Crease direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreKind {
    Vertical,
    Horizontal,
}

/// A straight crease line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreLine {
    pub kind: ScoreKind,
    pub start: Point,
    pub end: Point,
}

/// Size of the glued carton folded flat
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FoldedFlat {
    pub length: f64,
    pub width: f64,
    pub thickness: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(2.49), 2.0);
    }

    #[test]
    fn test_box_spec_sanitized() {
        let spec = BoxSpec::new(f64::NAN, -1.0, 0.0, f64::INFINITY).sanitized();
        assert_eq!(spec.length, DEFAULT_LENGTH);
        assert_eq!(spec.width, DEFAULT_WIDTH);
        assert_eq!(spec.height, DEFAULT_HEIGHT);
        assert_eq!(spec.thickness, DEFAULT_THICKNESS);
        assert!(spec.is_rsc());
    }

    #[test]
    fn test_box_spec_validate() {
        assert!(BoxSpec::default().validate().is_ok());
        let err = BoxSpec::new(100.0, 0.0, 50.0, 3.0).validate().unwrap_err();
        assert!(matches!(err, ParameterError::InvalidDimensions(ref m) if m.contains("width")));
    }

    #[test]
    fn test_style_codes() {
        let mut spec = BoxSpec::default();
        spec.style = "RSC".to_string();
        assert!(spec.is_rsc());
        spec.style = "0427".to_string();
        assert!(!spec.is_rsc());
    }

    #[test]
    fn test_glue_config_sanitized() {
        let glue = GlueConfig {
            lap_width: 0.0,
            extension_a: -5.0,
            bevel_angle_deg: f64::NAN,
            ..GlueConfig::default()
        }
        .sanitized(32.0);
        assert_eq!(glue.lap_width, 32.0);
        assert_eq!(glue.extension_a, 0.0);
        assert_eq!(glue.bevel_angle_deg, DEFAULT_BEVEL_ANGLE);

        let glue = GlueConfig {
            lap_width: f64::NAN,
            ..GlueConfig::default()
        }
        .sanitized(0.0);
        assert_eq!(glue.lap_width, DEFAULT_GLUE_LAP);
    }

    #[test]
    fn test_glue_config_validate() {
        assert!(GlueConfig::default().validate().is_ok());
        let glue = GlueConfig {
            bevel_angle_deg: 90.0,
            ..GlueConfig::default()
        };
        assert!(matches!(
            glue.validate(),
            Err(ParameterError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_gap_edit_parse_and_mirror() {
        assert_eq!("top-inner".parse::<GapEdit>().unwrap(), GapEdit::TopInner);
        assert_eq!("BottomOuter".parse::<GapEdit>().unwrap(), GapEdit::BotOuter);
        assert!("middle".parse::<GapEdit>().is_err());
        assert_eq!(GapEdit::TopOuter.mirrored(), GapEdit::BotOuter);
        assert_eq!(GapEdit::BotInner.to_string(), "bot-inner");
        assert_eq!("bot-inner".parse::<GapEdit>().unwrap(), GapEdit::BotInner);
        assert!(GapEdit::BotOuter.is_outer());
        assert!(!GapEdit::BotInner.is_outer());
    }

    #[test]
    fn test_flap_edges_by_edge() {
        let edges = FlapEdges {
            top: [1.0, 2.0, 3.0, 4.0],
            bottom: [5.0; 4],
        };
        assert_eq!(edges.edge(Edge::Top), [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(edges.edge(Edge::Bottom), [5.0; 4]);
    }

    #[test]
    fn test_gap_with_edit() {
        let gaps = GapConfig::default().with_edit(GapEdit::BotOuter, 4.0);
        assert_eq!(gaps.bot_outer, 4.0);
        assert_eq!(gaps.last_edited, GapEdit::BotOuter);
        assert_eq!(gaps.get(GapEdit::BotOuter), Some(4.0));
        assert_eq!(gaps.get(GapEdit::None), None);
    }

    #[test]
    fn test_slot_config_sanitized() {
        assert_eq!(SlotConfig { slot_width: 0.1 }.sanitized().slot_width, MIN_SLOT_WIDTH);
        assert_eq!(
            SlotConfig {
                slot_width: f64::NAN
            }
            .sanitized()
            .slot_width,
            DEFAULT_SLOT_WIDTH
        );
    }

    #[test]
    fn test_push_unique_point() {
        let mut path = vec![Point::new(0.0, 0.0)];
        push_unique_point(&mut path, Point::new(0.0, 0.0));
        push_unique_point(&mut path, Point::new(1.0, 0.0));
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn test_edge_flaps_per_panel() {
        let flaps = EdgeFlaps {
            inner: 60.0,
            outer: 59.0,
        };
        assert_eq!(flaps.per_panel(), [60.0, 59.0, 60.0, 59.0]);
        assert_eq!(flaps.max(), 60.0);
    }

    #[test]
    fn test_chamfer_outer_edge() {
        let mut chamfer = ChamferGeometry {
            outer_x: 0.0,
            start_x: 23.5,
            top_start_y: 0.0,
            bottom_start_y: 206.0,
            vertical_change: 10.0,
            top_y: 10.0,
            bottom_y: 196.0,
        };
        assert!(chamfer.outer_edge().is_some());
        chamfer.bottom_y = 10.0;
        assert!(chamfer.outer_edge().is_none());
    }
}
