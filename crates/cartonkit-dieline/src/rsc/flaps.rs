//! Flap height solver
//!
//! Flaps on panels 1 and 3 (the inner pair) are sized from panel 2's
//! width, flaps on panels 2 and 4 (the outer pair) from panel 3's width,
//! each less its gap and a fixed clearance.

use super::layout::PanelLayout;
use super::types::{EdgeFlaps, FlapEdges, FlapHeights, GapConfig, GapEdit};

/// Clearance subtracted from every flap pair, in mm.
pub const FLAP_CLEARANCE: f64 = 2.0;

impl GapConfig {
    /// Starting gaps for a fresh layout.
    ///
    /// Inner flaps leave `P2 - 2 * reference_flap - t` between them so the
    /// inner pair meets at the reference height; outer gaps start at 0.
    /// All locks are on.
    pub fn seeded(layout: &PanelLayout, thickness: f64) -> Self {
        let p2 = layout.panels[1].width;
        let inner = (p2 - 2.0 * layout.reference_flap - thickness).max(0.0);
        let inner = if inner.is_finite() { inner } else { 0.0 };
        Self {
            top_inner: inner,
            top_outer: 0.0,
            bot_inner: inner,
            bot_outer: 0.0,
            ..Self::default()
        }
    }
}

/// Apply lock and symmetry constraints after an edit.
///
/// `delta` is `P3 - P2`. Edited values are mirrored first, the
/// outer = inner + delta locks are applied per edge, and with symmetry on
/// the bottom edge finally copies the top.
pub fn propagate_gaps(gaps: &GapConfig, delta: f64) -> GapConfig {
    let mut g = gaps.sanitized();
    let delta = if delta.is_finite() { delta } else { 0.0 };
    let edit = g.last_edited;

    if g.locks.symmetry {
        if let Some(value) = g.get(edit) {
            g.set(edit.mirrored(), value);
        }
    }

    let outer_driven = edit.is_outer();
    if g.locks.top {
        if outer_driven {
            g.top_inner = g.top_outer - delta;
        } else {
            g.top_outer = g.top_inner + delta;
        }
    }
    if g.locks.bottom {
        if outer_driven {
            g.bot_inner = g.bot_outer - delta;
        } else {
            g.bot_outer = g.bot_inner + delta;
        }
    }

    if g.locks.symmetry {
        g.bot_inner = g.top_inner;
        g.bot_outer = g.top_outer;
    }

    g
}

fn flap_height(panel: f64, gap: f64, flap_allowance: f64) -> f64 {
    let h = ((panel - FLAP_CLEARANCE - gap) / 2.0 + flap_allowance).floor();
    if h.is_finite() {
        h.max(0.0)
    } else {
        0.0
    }
}

/// Flap heights from the two middle panels and the current gaps
pub fn solve_flaps(p2: f64, p3: f64, gaps: &GapConfig, flap_allowance: f64) -> FlapHeights {
    FlapHeights {
        top: EdgeFlaps {
            inner: flap_height(p2, gaps.top_inner, flap_allowance),
            outer: flap_height(p3, gaps.top_outer, flap_allowance),
        },
        bottom: EdgeFlaps {
            inner: flap_height(p2, gaps.bot_inner, flap_allowance),
            outer: flap_height(p3, gaps.bot_outer, flap_allowance),
        },
    }
}

/// Free-edge y of each flap
pub fn flap_edges(layout: &PanelLayout, flaps: &FlapHeights) -> FlapEdges {
    let top_score = layout.top_score_y();
    let bottom_score = layout.bottom_score_y();
    FlapEdges {
        top: flaps.top.per_panel().map(|h| top_score - h),
        bottom: flaps.bottom.per_panel().map(|h| bottom_score + h),
    }
}

/// Re-apply locks after a single field edit and solve the flaps
pub fn edit_and_solve(
    layout: &PanelLayout,
    gaps: &GapConfig,
    field: GapEdit,
    value: f64,
    flap_allowance: f64,
) -> (GapConfig, FlapHeights) {
    let p2 = layout.panels[1].width;
    let p3 = layout.panels[2].width;
    let gaps = propagate_gaps(&gaps.clone().with_edit(field, value), p3 - p2);
    let flaps = solve_flaps(p2, p3, &gaps, flap_allowance);
    (gaps, flaps)
}
