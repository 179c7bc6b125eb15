//! Glue-lap chamfer
//!
//! The glue lap has no flaps, so its top and bottom edges are bevelled
//! from the flap edge of panel 1 back to the sheet's outer edge. The rise
//! comes from the bevel angle unless an explicit extension is given.

use super::types::{ChamferGeometry, Point};

pub const MIN_BEVEL_ANGLE: f64 = 0.1;
pub const MAX_BEVEL_ANGLE: f64 = 89.9;

/// Vertical extent of the blank
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerticalBounds {
    pub top: f64,
    pub bottom: f64,
}

impl VerticalBounds {
    pub fn new(top: f64, bottom: f64) -> Self {
        Self {
            top: top.min(bottom),
            bottom: top.max(bottom),
        }
    }

    /// Clamp without panicking on NaN or inverted bounds
    pub fn clamp(&self, y: f64) -> f64 {
        if y.is_nan() {
            return self.top;
        }
        y.max(self.top).min(self.bottom)
    }
}

/// Compute the chamfer end points.
///
/// The top chamfer runs from `(start_x, top_edge_y)` to the outer edge,
/// dropping by the rise; the bottom chamfer mirrors it upwards.
pub fn chamfer(
    sheet_outer_x: f64,
    start_x: f64,
    top_edge_y: f64,
    bottom_edge_y: f64,
    bevel_angle_deg: f64,
    extension_a: f64,
    bounds: VerticalBounds,
) -> ChamferGeometry {
    let run = (start_x - sheet_outer_x).max(0.0);
    let angle = if bevel_angle_deg.is_finite() {
        bevel_angle_deg.clamp(MIN_BEVEL_ANGLE, MAX_BEVEL_ANGLE)
    } else {
        MIN_BEVEL_ANGLE
    };
    let auto_vertical = run * angle.to_radians().tan();
    let vertical_change = if extension_a.is_finite() && extension_a > 0.0 {
        extension_a
    } else {
        auto_vertical
    };

    ChamferGeometry {
        outer_x: sheet_outer_x,
        start_x,
        top_start_y: top_edge_y,
        bottom_start_y: bottom_edge_y,
        vertical_change,
        top_y: bounds.clamp(top_edge_y + vertical_change),
        bottom_y: bounds.clamp(bottom_edge_y - vertical_change),
    }
}

impl ChamferGeometry {
    /// Where the two chamfer lines cross when they overshoot each other.
    ///
    /// Returns `None` when a vertical outer edge separates them.
    pub fn meeting_point(&self) -> Option<Point> {
        if self.bottom_y > self.top_y {
            return None;
        }
        let top_drop = self.top_y - self.top_start_y;
        let bottom_drop = self.bottom_y - self.bottom_start_y;
        let denom = bottom_drop - top_drop;
        let t = if denom.abs() > f64::EPSILON {
            ((self.top_start_y - self.bottom_start_y) / denom).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let x = self.start_x + (self.outer_x - self.start_x) * t;
        let y = self.top_start_y + top_drop * t;
        Some(Point::new(x, y))
    }
}
