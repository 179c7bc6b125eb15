//! Slot planning
//!
//! Every vertical score is slotted where it meets the flaps. A slot is
//! centred on its score but may not reach the sheet's outer edge, so near
//! a narrow glue lap the half-width shrinks and can vanish entirely.

use super::types::{SlotInterval, SlotPlan, MIN_SLOT_WIDTH};

/// Minimum material kept between a slot and the sheet's outer edge, in mm.
pub const SLOT_EDGE_CLEARANCE: f64 = 0.75;

/// Plan one slot per score position.
///
/// Positions are sorted ascending. A score whose clamped half-width is not
/// positive gets no slot.
pub fn plan_slots(slot_width: f64, score_positions: &[f64], left_bound: f64) -> SlotPlan {
    let width = if slot_width.is_finite() {
        slot_width.max(MIN_SLOT_WIDTH)
    } else {
        MIN_SLOT_WIDTH
    };
    let nominal = width / 2.0;

    let mut xs: Vec<f64> = score_positions
        .iter()
        .copied()
        .filter(|x| x.is_finite())
        .collect();
    xs.sort_by(f64::total_cmp);

    let intervals = xs
        .into_iter()
        .filter_map(|x| {
            let half = nominal.min(x - left_bound - SLOT_EDGE_CLEARANCE);
            (half > 0.0).then(|| SlotInterval {
                score_x: x,
                start: x - half,
                end: x + half,
            })
        })
        .collect();

    SlotPlan {
        half_width: nominal,
        intervals,
    }
}

impl SlotPlan {
    /// The slot around a given score, if one was cut
    pub fn at_score(&self, score_x: f64) -> Option<&SlotInterval> {
        self.intervals
            .iter()
            .find(|s| (s.score_x - score_x).abs() < 1e-9)
    }
}
