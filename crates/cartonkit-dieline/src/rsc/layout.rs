//! Panel layout
//!
//! Turns internal dimensions plus allowances into the four body panel
//! widths and the overall sheet size. All positions use the blank's
//! frame: x grows right from the sheet's outer (glue lap) edge, y grows
//! down from the top of the top flaps.

use super::allowance::AllowanceRow;
use super::types::{round_half_up, BoxSpec, GlueConfig, GlueOff, Panel, PanelRole};
use serde::{Deserialize, Serialize};

/// Body panels and sheet dimensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelLayout {
    pub panels: [Panel; 4],
    pub glue_lap: f64,
    pub total_width: f64,
    /// Score-to-score body height
    pub s2s: f64,
    /// Nominal flap height, half the internal width
    pub reference_flap: f64,
    pub total_height: f64,
}

impl PanelLayout {
    pub fn widths(&self) -> [f64; 4] {
        [
            self.panels[0].width,
            self.panels[1].width,
            self.panels[2].width,
            self.panels[3].width,
        ]
    }

    /// x of the glue score followed by the three internal scores
    pub fn score_xs(&self) -> [f64; 4] {
        let mut xs = [0.0; 4];
        let mut x = self.glue_lap;
        for (i, panel) in self.panels.iter().enumerate() {
            xs[i] = x;
            x += panel.width;
        }
        xs
    }

    /// x of the sheet's right (free) edge
    pub fn right_edge(&self) -> f64 {
        self.total_width
    }

    pub fn top_score_y(&self) -> f64 {
        self.reference_flap
    }

    pub fn bottom_score_y(&self) -> f64 {
        self.reference_flap + self.s2s
    }

    /// Index of the panel containing `x`.
    ///
    /// Anything left of the first internal score maps to panel 0 and
    /// anything past the last maps to panel 3.
    pub fn panel_index_at(&self, x: f64) -> usize {
        let xs = self.score_xs();
        xs[1..].iter().take_while(|&&score| x >= score).count()
    }
}

/// Compute the panel layout for a Regular Slotted Case
pub fn layout(spec: &BoxSpec, glue: &GlueConfig, row: &AllowanceRow) -> PanelLayout {
    let roles = match glue.off {
        GlueOff::Large => [
            PanelRole::Length,
            PanelRole::Width,
            PanelRole::Length,
            PanelRole::Width,
        ],
        GlueOff::Small => [
            PanelRole::Width,
            PanelRole::Length,
            PanelRole::Width,
            PanelRole::Length,
        ],
    };

    let adds = row.adds();
    let panels: [Panel; 4] = std::array::from_fn(|i| {
        let base = match roles[i] {
            PanelRole::Length => spec.length,
            PanelRole::Width => spec.width,
        };
        Panel {
            role: roles[i],
            width: round_half_up(base + adds[i]).max(0.0),
        }
    });

    let glue_lap = round_half_up(glue.lap_width).max(0.0);
    let total_width = glue_lap + panels.iter().map(|p| p.width).sum::<f64>();
    let s2s = round_half_up(spec.height + row.h1).max(0.0);
    let reference_flap = round_half_up(spec.width / 2.0).max(0.0);

    PanelLayout {
        panels,
        glue_lap,
        total_width,
        s2s,
        reference_flap,
        total_height: 2.0 * reference_flap + s2s,
    }
}
