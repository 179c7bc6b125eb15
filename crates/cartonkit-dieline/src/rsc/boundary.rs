//! Cutting boundary paths
//!
//! Each flap edge is a step function of x. The boundary follows it from
//! the glue slot to the sheet's right edge, dropping into every slot down
//! to the score line and climbing back out on the far side.

use super::layout::PanelLayout;
use super::types::{push_unique_point, BoundaryPath, Edge, Point, SlotInterval};

/// Step function giving the flap-edge y of the panel containing x
pub fn flap_edge_fn(layout: &PanelLayout, edges: [f64; 4]) -> impl Fn(f64) -> f64 {
    let layout = layout.clone();
    move |x| edges[layout.panel_index_at(x)]
}

/// Build the boundary along one edge.
///
/// `start_x` is the left edge of the glue slot, or the glue score when the
/// lap is too narrow to slot. Consecutive duplicate vertices are dropped.
pub fn build_boundary(
    edge: Edge,
    flap_edge: impl Fn(f64) -> f64,
    score_y: f64,
    slots: &[SlotInterval],
    start_x: f64,
    right_bound: f64,
) -> BoundaryPath {
    let mut vertices = Vec::with_capacity(slots.len() * 4 + 2);
    push_unique_point(&mut vertices, Point::new(start_x, flap_edge(start_x)));

    for slot in slots {
        push_unique_point(&mut vertices, Point::new(slot.start, flap_edge(slot.start)));
        push_unique_point(&mut vertices, Point::new(slot.start, score_y));
        push_unique_point(&mut vertices, Point::new(slot.end, score_y));
        push_unique_point(&mut vertices, Point::new(slot.end, flap_edge(slot.end)));
    }

    push_unique_point(&mut vertices, Point::new(right_bound, flap_edge(right_bound)));

    BoundaryPath { edge, vertices }
}

impl BoundaryPath {
    pub fn first(&self) -> Option<Point> {
        self.vertices.first().copied()
    }

    pub fn last(&self) -> Option<Point> {
        self.vertices.last().copied()
    }

    /// Total polyline length in mm
    pub fn length(&self) -> f64 {
        self.vertices
            .windows(2)
            .map(|w| (w[1].x - w[0].x).hypot(w[1].y - w[0].y))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rsc::allowance::AllowanceRow;
    use crate::rsc::layout::layout;
    use crate::rsc::slots::plan_slots;
    use crate::rsc::types::{BoxSpec, GlueConfig};

    fn standard_b_layout() -> PanelLayout {
        let row = AllowanceRow {
            p1: 5.0,
            p2: 3.0,
            p3: 3.0,
            p4: 0.0,
            h1: 6.0,
            flap: 0.0,
        };
        layout(&BoxSpec::default(), &GlueConfig::default(), &row)
    }

    #[test]
    fn test_step_function() {
        let l = standard_b_layout();
        let f = flap_edge_fn(&l, [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(f(0.0), 1.0);
        assert_eq!(f(152.0), 1.0);
        assert_eq!(f(153.0), 2.0);
        assert_eq!(f(500.0), 3.0);
        assert_eq!(f(813.0), 4.0);
    }

    #[test]
    fn test_top_boundary_with_equal_flaps() {
        let l = standard_b_layout();
        let plan = plan_slots(9.0, &l.score_xs(), 0.0);
        let path = build_boundary(
            Edge::Top,
            flap_edge_fn(&l, [0.0; 4]),
            l.top_score_y(),
            &plan.intervals,
            plan.intervals[0].start,
            l.right_edge(),
        );

        assert_eq!(path.first(), Some(Point::new(23.5, 0.0)));
        assert_eq!(path.vertices[1], Point::new(23.5, 60.0));
        assert_eq!(path.vertices[2], Point::new(32.5, 60.0));
        assert_eq!(path.vertices[3], Point::new(32.5, 0.0));
        assert_eq!(path.last(), Some(Point::new(813.0, 0.0)));
        // start + 4 slots x 4 vertices with the first slot's top corner collapsed + end
        assert_eq!(path.vertices.len(), 17);
    }

    #[test]
    fn test_steps_between_uneven_flaps() {
        let l = standard_b_layout();
        let plan = plan_slots(9.0, &l.score_xs(), 0.0);
        let path = build_boundary(
            Edge::Bottom,
            flap_edge_fn(&l, [186.0, 206.0, 186.0, 206.0]),
            l.bottom_score_y(),
            &plan.intervals,
            plan.intervals[0].start,
            l.right_edge(),
        );

        // Second slot straddles the first internal score at x = 153
        assert!(path.vertices.contains(&Point::new(148.5, 186.0)));
        assert!(path.vertices.contains(&Point::new(157.5, 206.0)));
        assert_eq!(path.last(), Some(Point::new(813.0, 206.0)));
    }

    #[test]
    fn test_no_slots() {
        let l = standard_b_layout();
        let path = build_boundary(
            Edge::Top,
            flap_edge_fn(&l, [5.0; 4]),
            l.top_score_y(),
            &[],
            l.glue_lap,
            l.right_edge(),
        );
        assert_eq!(
            path.vertices,
            vec![Point::new(28.0, 5.0), Point::new(813.0, 5.0)]
        );
        assert_eq!(path.length(), 785.0);
    }
}
