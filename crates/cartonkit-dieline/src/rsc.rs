//! Regular Slotted Case (FEFCO 0201) die-line generator
//!
//! Runs the whole geometry pipeline from one snapshot of the inputs:
//! allowance row, panel layout, gap locks, flap heights, slots, glue-lap
//! chamfer and both cutting boundaries. The result also carries the
//! score lines, the closed cut outline and the folded-flat size.

pub mod allowance;
pub mod boundary;
pub mod chamfer;
pub mod flaps;
pub mod layout;
pub mod slots;
pub mod types;

use crate::error::{DielineError, DielineResult, ParameterError};
use allowance::{AllowanceResolver, ResolvedAllowance};
use boundary::{build_boundary, flap_edge_fn};
use cartonkit_core::{AllowanceTable, FluteCatalogue};
use chamfer::{chamfer, VerticalBounds};
use flaps::{flap_edges, propagate_gaps, solve_flaps};
use layout::PanelLayout;
use serde::{Deserialize, Serialize};
use slots::plan_slots;
use tracing::debug;
pub use types::*;

/// Everything needed to design one blank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignRequest {
    pub spec: BoxSpec,
    /// Flute code used for the allowance lookup
    pub flute: String,
    pub glue: GlueConfig,
    /// Current gaps; `None` seeds them from the layout
    pub gaps: Option<GapConfig>,
    pub slot: SlotConfig,
}

impl Default for DesignRequest {
    fn default() -> Self {
        Self {
            spec: BoxSpec::default(),
            flute: "B".to_string(),
            glue: GlueConfig::default(),
            gaps: None,
            slot: SlotConfig::default(),
        }
    }
}

impl DesignRequest {
    /// Collect every input the engine would have to repair.
    ///
    /// The engine never fails on these; callers use this to warn.
    pub fn validate(&self) -> Vec<ParameterError> {
        let mut problems = Vec::new();
        if let Err(e) = self.spec.validate() {
            problems.push(e);
        }
        if let Err(e) = self.glue.validate() {
            problems.push(e);
        }
        if !self.slot.slot_width.is_finite() || self.slot.slot_width < MIN_SLOT_WIDTH {
            problems.push(ParameterError::OutOfRange {
                name: "slot_width".to_string(),
                value: self.slot.slot_width,
                min: MIN_SLOT_WIDTH,
                max: f64::INFINITY,
            });
        }
        if let Some(gaps) = &self.gaps {
            for (name, value) in [
                ("gap_top_inner", gaps.top_inner),
                ("gap_top_outer", gaps.top_outer),
                ("gap_bot_inner", gaps.bot_inner),
                ("gap_bot_outer", gaps.bot_outer),
            ] {
                if !value.is_finite() {
                    problems.push(ParameterError::InvalidValue {
                        name: name.to_string(),
                        reason: "not a finite number".to_string(),
                    });
                }
            }
        }
        problems
    }
}

/// A fully dimensioned blank
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DieLine {
    /// Inputs after sanitising
    pub spec: BoxSpec,
    pub flute: String,
    pub glue: GlueConfig,
    pub slot: SlotConfig,
    pub allowance: ResolvedAllowance,
    pub layout: PanelLayout,
    /// Gaps after lock propagation
    pub gaps: GapConfig,
    pub flaps: FlapHeights,
    pub flap_edges: FlapEdges,
    pub chamfer: ChamferGeometry,
    pub slots: SlotPlan,
    pub top_boundary: BoundaryPath,
    pub bottom_boundary: BoundaryPath,
    pub scores: Vec<ScoreLine>,
    /// Closed cut outline, first vertex not repeated
    pub outline: Vec<Point>,
    pub folded_flat: FoldedFlat,
}

impl DieLine {
    /// Sheet size as (width, height) in mm
    pub fn sheet_size(&self) -> (f64, f64) {
        (self.layout.total_width, self.layout.total_height)
    }
}

/// Die-line generator bound to one allowance table
#[derive(Debug, Clone)]
pub struct DieLineEngine<'a> {
    resolver: AllowanceResolver<'a>,
    flutes: &'a FluteCatalogue,
}

impl<'a> DieLineEngine<'a> {
    pub fn new(table: &'a AllowanceTable, flutes: &'a FluteCatalogue) -> Self {
        Self {
            resolver: AllowanceResolver::new(table, flutes),
            flutes,
        }
    }

    /// Read allowances from a different style section
    pub fn with_style_key(mut self, key: &str) -> Self {
        self.resolver = self.resolver.with_style_key(key);
        self
    }

    pub fn resolver(&self) -> &AllowanceResolver<'a> {
        &self.resolver
    }

    /// Design a blank.
    ///
    /// Only an unsupported style is an error; every numeric input is
    /// repaired to a usable value first.
    pub fn design(&self, request: &DesignRequest) -> DielineResult<DieLine> {
        if !request.spec.is_rsc() {
            return Err(DielineError::UnsupportedStyle(request.spec.style.clone()));
        }

        let flute = cartonkit_core::data::normalize_flute_code(&request.flute);
        let mut spec = request.spec.sanitized();
        if !(request.spec.thickness.is_finite() && request.spec.thickness > 0.0) {
            if let Some(t) = self.flutes.thickness_for(&flute) {
                spec.thickness = t;
            }
        }

        let allowance = self
            .resolver
            .resolve(request.glue.side, &flute, spec.thickness);
        let glue = request
            .glue
            .sanitized(allowance.suggested_glue_lap.unwrap_or(0.0));
        let slot = request.slot.sanitized();

        let layout = layout::layout(&spec, &glue, &allowance.row);
        let p2 = layout.panels[1].width;
        let p3 = layout.panels[2].width;

        let gaps = match &request.gaps {
            Some(gaps) => gaps.clone(),
            None => GapConfig::seeded(&layout, spec.thickness),
        };
        let gaps = propagate_gaps(&gaps, p3 - p2);
        let flaps = solve_flaps(p2, p3, &gaps, allowance.row.flap);
        let edges = flap_edges(&layout, &flaps);

        let sheet_left = 0.0;
        let slots = plan_slots(slot.slot_width, &layout.score_xs(), sheet_left);
        let glue_score = layout.glue_lap;
        let start_x = slots
            .at_score(glue_score)
            .map(|s| s.start)
            .unwrap_or(glue_score);

        let top_edge = flap_edge_fn(&layout, edges.edge(Edge::Top));
        let bottom_edge = flap_edge_fn(&layout, edges.edge(Edge::Bottom));

        let chamfer = chamfer(
            sheet_left,
            start_x,
            top_edge(start_x),
            bottom_edge(start_x),
            glue.bevel_angle_deg,
            glue.extension_a,
            VerticalBounds::new(0.0, layout.total_height),
        );

        let top_boundary = build_boundary(
            Edge::Top,
            &top_edge,
            layout.top_score_y(),
            &slots.intervals,
            start_x,
            layout.right_edge(),
        );
        let bottom_boundary = build_boundary(
            Edge::Bottom,
            &bottom_edge,
            layout.bottom_score_y(),
            &slots.intervals,
            start_x,
            layout.right_edge(),
        );

        let scores = score_lines(&layout);
        let outline = outline(&chamfer, &top_boundary, &bottom_boundary);
        let folded_flat = FoldedFlat {
            length: p2 + p3,
            width: flaps.top.max() + layout.s2s + flaps.bottom.max(),
            thickness: 2.0 * spec.thickness,
        };

        debug!(
            "Designed RSC {}x{}x{} flute {}: sheet {}x{} mm, flaps top {}/{} bottom {}/{}",
            spec.length,
            spec.width,
            spec.height,
            flute,
            layout.total_width,
            layout.total_height,
            flaps.top.inner,
            flaps.top.outer,
            flaps.bottom.inner,
            flaps.bottom.outer
        );

        Ok(DieLine {
            spec,
            flute,
            glue,
            slot,
            allowance,
            layout,
            gaps,
            flaps,
            flap_edges: edges,
            chamfer,
            slots,
            top_boundary,
            bottom_boundary,
            scores,
            outline,
            folded_flat,
        })
    }

    /// Design a blank, rejecting any input `design` would have to repair
    pub fn design_strict(&self, request: &DesignRequest) -> DielineResult<DieLine> {
        if let Some(problem) = request.validate().into_iter().next() {
            return Err(problem.into());
        }
        self.design(request)
    }
}

/// Four vertical creases between the horizontal ones, and the two
/// horizontal creases from the glue score to the right edge
fn score_lines(layout: &PanelLayout) -> Vec<ScoreLine> {
    let top = layout.top_score_y();
    let bottom = layout.bottom_score_y();
    let mut scores: Vec<ScoreLine> = layout
        .score_xs()
        .iter()
        .map(|&x| ScoreLine {
            kind: ScoreKind::Vertical,
            start: Point::new(x, top),
            end: Point::new(x, bottom),
        })
        .collect();
    for y in [top, bottom] {
        scores.push(ScoreLine {
            kind: ScoreKind::Horizontal,
            start: Point::new(layout.glue_lap, y),
            end: Point::new(layout.right_edge(), y),
        });
    }
    scores
}

/// Closed cut outline running clockwise from the top chamfer
fn outline(chamfer: &ChamferGeometry, top: &BoundaryPath, bottom: &BoundaryPath) -> Vec<Point> {
    let mut points = Vec::with_capacity(top.vertices.len() + bottom.vertices.len() + 2);

    match chamfer.meeting_point() {
        None => push_unique_point(&mut points, Point::new(chamfer.outer_x, chamfer.top_y)),
        Some(apex) => push_unique_point(&mut points, apex),
    }
    for &p in &top.vertices {
        push_unique_point(&mut points, p);
    }
    for &p in bottom.vertices.iter().rev() {
        push_unique_point(&mut points, p);
    }
    if chamfer.meeting_point().is_none() {
        push_unique_point(&mut points, Point::new(chamfer.outer_x, chamfer.bottom_y));
    }

    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_design(request: &DesignRequest) -> DieLine {
        let table = AllowanceTable::standard();
        let flutes = FluteCatalogue::standard();
        DieLineEngine::new(&table, &flutes)
            .design(request)
            .unwrap()
    }

    #[test]
    fn test_default_design() {
        let die = engine_design(&DesignRequest::default());
        assert_eq!(die.sheet_size(), (813.0, 206.0));
        assert_eq!(die.flaps.top.per_panel(), [60.0; 4]);
        assert_eq!(die.folded_flat.length, 393.0);
        assert_eq!(die.folded_flat.width, 206.0);
        assert_eq!(die.folded_flat.thickness, 6.0);
        assert_eq!(die.scores.len(), 6);
    }

    #[test]
    fn test_unsupported_style() {
        let table = AllowanceTable::standard();
        let flutes = FluteCatalogue::standard();
        let mut request = DesignRequest::default();
        request.spec.style = "0427".to_string();
        let err = DieLineEngine::new(&table, &flutes)
            .design(&request)
            .unwrap_err();
        assert!(matches!(err, DielineError::UnsupportedStyle(ref s) if s == "0427"));
    }

    #[test]
    fn test_thickness_falls_back_to_flute() {
        let mut request = DesignRequest::default();
        request.flute = "bc".to_string();
        request.spec.thickness = f64::NAN;
        let die = engine_design(&request);
        assert_eq!(die.spec.thickness, 7.0);
        assert_eq!(die.flute, "BC");
        assert_eq!(die.glue.lap_width, 28.0);
    }

    #[test]
    fn test_missing_lap_uses_table_suggestion() {
        let mut request = DesignRequest::default();
        request.flute = "AC".to_string();
        request.glue.lap_width = 0.0;
        let die = engine_design(&request);
        assert_eq!(die.glue.lap_width, 35.0);
        assert_eq!(die.layout.glue_lap, 35.0);
    }

    #[test]
    fn test_outline_closes_through_outer_edge() {
        let die = engine_design(&DesignRequest::default());
        let first = die.outline[0];
        let last = *die.outline.last().unwrap();
        assert_eq!(first.x, 0.0);
        assert_eq!(last.x, 0.0);
        assert!(last.y > first.y);
        assert!(die.chamfer.outer_edge().is_some());
    }

    #[test]
    fn test_strict_design_rejects_repairs() {
        let table = AllowanceTable::standard();
        let flutes = FluteCatalogue::standard();
        let engine = DieLineEngine::new(&table, &flutes);

        let mut request = DesignRequest::default();
        assert!(engine.design_strict(&request).is_ok());

        request.glue.bevel_angle_deg = 95.0;
        let err = engine.design_strict(&request).unwrap_err();
        assert!(matches!(
            err,
            DielineError::Parameter(ParameterError::OutOfRange { ref name, .. }) if name == "bevel_angle_deg"
        ));
        // the lenient path still designs it
        assert!(engine.design(&request).is_ok());
    }

    #[test]
    fn test_validate_reports_problems() {
        let mut request = DesignRequest::default();
        assert!(request.validate().is_empty());
        request.spec.height = -1.0;
        request.slot.slot_width = 0.1;
        request.gaps = Some(GapConfig {
            top_inner: f64::NAN,
            ..GapConfig::default()
        });
        assert_eq!(request.validate().len(), 3);
    }
}
