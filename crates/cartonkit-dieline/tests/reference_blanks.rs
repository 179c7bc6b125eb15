use cartonkit_core::{AllowanceTable, FluteCatalogue, GlueSide};
use cartonkit_dieline::rsc::slots::SLOT_EDGE_CLEARANCE;
use cartonkit_dieline::rsc::{Edge, PanelRole, Point};
use cartonkit_dieline::{AllowanceSource, BoxSpec, DesignRequest, DieLineEngine, GlueConfig, GlueOff};

fn design(request: &DesignRequest) -> cartonkit_dieline::DieLine {
    let table = AllowanceTable::standard();
    let flutes = FluteCatalogue::standard();
    DieLineEngine::new(&table, &flutes).design(request).unwrap()
}

fn standard_b_request() -> DesignRequest {
    DesignRequest {
        spec: BoxSpec::new(267.0, 120.0, 80.0, 3.0),
        flute: "B".to_string(),
        glue: GlueConfig {
            side: GlueSide::Outside,
            off: GlueOff::Small,
            lap_width: 28.0,
            ..GlueConfig::default()
        },
        ..DesignRequest::default()
    }
}

#[test]
fn test_standard_b_layout() {
    let die = design(&standard_b_request());
    let layout = &die.layout;

    assert_eq!(die.allowance.source, AllowanceSource::Exact);
    assert_eq!(
        layout.panels.map(|p| p.role),
        [
            PanelRole::Width,
            PanelRole::Length,
            PanelRole::Width,
            PanelRole::Length
        ]
    );
    assert_eq!(layout.widths(), [125.0, 270.0, 123.0, 267.0]);
    assert_eq!(layout.total_width, 813.0);
    assert_eq!(layout.s2s, 86.0);
    assert_eq!(layout.reference_flap, 60.0);
    assert_eq!(layout.total_height, 2.0 * 60.0 + 86.0);
}

#[test]
fn test_standard_b_seeded_flaps_fill_the_sheet() {
    let die = design(&standard_b_request());
    let max_top = die.flaps.top.max();
    let max_bottom = die.flaps.bottom.max();
    assert_eq!(max_top + die.layout.s2s + max_bottom, die.layout.total_height);
    assert_eq!(die.flap_edges.top, [0.0; 4]);
    assert_eq!(die.flap_edges.bottom, [206.0; 4]);
    assert!(die.gaps.is_symmetric());
}

#[test]
fn test_standard_b_boundaries() {
    let die = design(&standard_b_request());
    assert_eq!(die.top_boundary.edge, Edge::Top);
    assert_eq!(die.top_boundary.first(), Some(Point::new(23.5, 0.0)));
    assert_eq!(die.top_boundary.last(), Some(Point::new(813.0, 0.0)));
    assert_eq!(die.bottom_boundary.last(), Some(Point::new(813.0, 206.0)));
    assert_eq!(die.slots.intervals.len(), 4);

    let slot_floor: Vec<&Point> = die
        .top_boundary
        .vertices
        .iter()
        .filter(|p| p.y == die.layout.top_score_y())
        .collect();
    assert_eq!(slot_floor.len(), 8);
}

#[test]
fn test_narrow_glue_lap_slot() {
    let mut request = standard_b_request();
    request.glue.lap_width = 10.0;
    request.slot.slot_width = 30.0;
    let die = design(&request);

    let glue = die.slots.at_score(10.0).unwrap();
    let half = glue.end - glue.score_x;
    assert!(half <= 10.0 - SLOT_EDGE_CLEARANCE);
    assert!(glue.width() > 0.0);
    assert!(glue.start >= SLOT_EDGE_CLEARANCE);
    assert!(die.slots.intervals.iter().all(|s| s.end > s.start));
    assert_eq!(die.top_boundary.first().map(|p| p.x), Some(glue.start));
}

#[test]
fn test_right_angle_bevel_clamps() {
    let mut request = standard_b_request();
    request.glue.bevel_angle_deg = 90.0;
    request.glue.extension_a = 0.0;
    let die = design(&request);

    let bottom_bound = die.layout.total_height;
    assert_eq!(die.chamfer.top_y, bottom_bound);
    assert_eq!(die.chamfer.bottom_y, 0.0);
    assert!(die.chamfer.outer_edge().is_none());

    let apex = die.chamfer.meeting_point().unwrap();
    assert!(apex.y >= 0.0 && apex.y <= bottom_bound);
    assert_eq!(die.outline[0], apex);
}

#[test]
fn test_inside_glue_large_off() {
    let mut request = standard_b_request();
    request.glue.side = GlueSide::Inside;
    request.glue.off = GlueOff::Large;
    let die = design(&request);
    // inside B: P = [3, 3, 3, 0]
    assert_eq!(die.layout.widths(), [270.0, 123.0, 270.0, 120.0]);
    assert_eq!(die.layout.total_width, 28.0 + 783.0);
}

#[test]
fn test_serializes_to_json() {
    let die = design(&standard_b_request());
    let value = serde_json::to_value(&die).unwrap();
    assert_eq!(value["layout"]["total_width"], 813.0);
    assert_eq!(value["layout"]["panels"][0]["role"], "W");
    assert_eq!(value["allowance"]["source"]["kind"], "exact");
}
