#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn wp(x: f64, y: f64) -> WorldPoint {
    WorldPoint::new(x, y)
}

// =============================================================
// WorldRect
// =============================================================

#[test]
fn rect_from_corners_normalizes() {
    let r = WorldRect::from_corners(wp(10.0, 20.0), wp(4.0, 2.0));
    assert_eq!(r.x, 4.0);
    assert_eq!(r.y, 2.0);
    assert_eq!(r.w, 6.0);
    assert_eq!(r.h, 18.0);
}

#[test]
fn rect_from_equal_corners_is_empty() {
    let r = WorldRect::from_corners(wp(5.0, 5.0), wp(5.0, 5.0));
    assert_eq!(r.w, 0.0);
    assert_eq!(r.h, 0.0);
}

#[test]
fn rect_center() {
    let r = WorldRect::new(0.0, 0.0, 10.0, 4.0);
    assert_eq!(r.center(), wp(5.0, 2.0));
}

#[test]
fn rect_contains_interior_and_edges() {
    let r = WorldRect::new(0.0, 0.0, 10.0, 10.0);
    assert!(r.contains(wp(5.0, 5.0)));
    assert!(r.contains(wp(0.0, 0.0)));
    assert!(r.contains(wp(10.0, 10.0)));
    assert!(!r.contains(wp(10.1, 5.0)));
    assert!(!r.contains(wp(5.0, -0.1)));
}

#[test]
fn rect_expand_grows_all_sides() {
    let r = WorldRect::new(10.0, 10.0, 20.0, 20.0).expand(5.0);
    assert_eq!(r.x, 5.0);
    assert_eq!(r.y, 5.0);
    assert_eq!(r.w, 30.0);
    assert_eq!(r.h, 30.0);
}

#[test]
fn rect_union_covers_both() {
    let a = WorldRect::new(0.0, 0.0, 10.0, 10.0);
    let b = WorldRect::new(20.0, -5.0, 5.0, 10.0);
    let u = a.union(b);
    assert_eq!(u.x, 0.0);
    assert_eq!(u.y, -5.0);
    assert_eq!(u.w, 25.0);
    assert_eq!(u.h, 15.0);
}

#[test]
fn rect_intersects_overlapping() {
    let a = WorldRect::new(0.0, 0.0, 10.0, 10.0);
    let b = WorldRect::new(5.0, 5.0, 10.0, 10.0);
    assert!(a.intersects(b));
    assert!(b.intersects(a));
}

#[test]
fn rect_intersects_touching_edge() {
    let a = WorldRect::new(0.0, 0.0, 10.0, 10.0);
    let b = WorldRect::new(10.0, 0.0, 10.0, 10.0);
    assert!(a.intersects(b));
}

#[test]
fn rect_intersects_disjoint_is_false() {
    let a = WorldRect::new(0.0, 0.0, 10.0, 10.0);
    let b = WorldRect::new(11.0, 11.0, 2.0, 2.0);
    assert!(!a.intersects(b));
}

// =============================================================
// Distances
// =============================================================

#[test]
fn dist_sq_basic() {
    assert!(approx_eq(dist_sq(wp(0.0, 0.0), wp(3.0, 4.0)), 25.0));
}

#[test]
fn dist_sq_to_segment_projects_onto_interior() {
    // Point above the middle of a horizontal segment.
    let d = dist_sq_to_segment(wp(5.0, 3.0), wp(0.0, 0.0), wp(10.0, 0.0));
    assert!(approx_eq(d, 9.0));
}

#[test]
fn dist_sq_to_segment_clamps_before_start() {
    let d = dist_sq_to_segment(wp(-4.0, 3.0), wp(0.0, 0.0), wp(10.0, 0.0));
    assert!(approx_eq(d, 25.0));
}

#[test]
fn dist_sq_to_segment_clamps_past_end() {
    let d = dist_sq_to_segment(wp(13.0, 4.0), wp(0.0, 0.0), wp(10.0, 0.0));
    assert!(approx_eq(d, 25.0));
}

#[test]
fn dist_sq_to_degenerate_segment_is_point_distance() {
    let d = dist_sq_to_segment(wp(3.0, 4.0), wp(0.0, 0.0), wp(0.0, 0.0));
    assert!(approx_eq(d, 25.0));
}

#[test]
fn dist_sq_to_segment_zero_on_segment() {
    let d = dist_sq_to_segment(wp(5.0, 0.0), wp(0.0, 0.0), wp(10.0, 0.0));
    assert!(approx_eq(d, 0.0));
}

// =============================================================
// polyline_hit
// =============================================================

#[test]
fn polyline_hit_empty_never_hits() {
    assert!(!polyline_hit(&[], wp(0.0, 0.0), 100.0));
}

#[test]
fn polyline_hit_single_point() {
    assert!(polyline_hit(&[wp(10.0, 10.0)], wp(12.0, 10.0), 3.0));
    assert!(!polyline_hit(&[wp(10.0, 10.0)], wp(20.0, 10.0), 3.0));
}

#[test]
fn polyline_hit_near_middle_segment() {
    let pts = [wp(0.0, 0.0), wp(10.0, 0.0), wp(10.0, 10.0)];
    assert!(polyline_hit(&pts, wp(10.5, 5.0), 1.0));
}

#[test]
fn polyline_hit_outside_tolerance_misses() {
    let pts = [wp(0.0, 0.0), wp(10.0, 0.0)];
    assert!(!polyline_hit(&pts, wp(5.0, 2.0), 1.0));
}

// =============================================================
// smooth_polyline
// =============================================================

#[test]
fn smooth_empty_and_single_are_empty() {
    assert!(smooth_polyline(&[]).is_empty());
    assert!(smooth_polyline(&[wp(1.0, 1.0)]).is_empty());
}

#[test]
fn smooth_two_points_is_a_line() {
    let cmds = smooth_polyline(&[wp(0.0, 0.0), wp(5.0, 5.0)]);
    assert_eq!(cmds, vec![PathCmd::MoveTo(wp(0.0, 0.0)), PathCmd::LineTo(wp(5.0, 5.0))]);
}

#[test]
fn smooth_starts_at_first_point() {
    let cmds = smooth_polyline(&[wp(1.0, 2.0), wp(3.0, 4.0), wp(5.0, 6.0)]);
    assert_eq!(cmds[0], PathCmd::MoveTo(wp(1.0, 2.0)));
}

#[test]
fn smooth_ends_with_line_to_last_point() {
    let pts = [wp(0.0, 0.0), wp(10.0, 0.0), wp(20.0, 10.0), wp(30.0, 10.0)];
    let cmds = smooth_polyline(&pts);
    assert_eq!(*cmds.last().unwrap(), PathCmd::LineTo(wp(30.0, 10.0)));
}

#[test]
fn smooth_interior_points_become_controls() {
    let pts = [wp(0.0, 0.0), wp(10.0, 0.0), wp(20.0, 10.0)];
    let cmds = smooth_polyline(&pts);
    // MoveTo, one quad through the interior point, final LineTo.
    assert_eq!(cmds.len(), 3);
    match cmds[1] {
        PathCmd::QuadTo { ctrl, to } => {
            assert_eq!(ctrl, wp(10.0, 0.0));
            assert_eq!(to, midpoint(wp(10.0, 0.0), wp(20.0, 10.0)));
        }
        _ => panic!("expected QuadTo, got {:?}", cmds[1]),
    }
}

#[test]
fn smooth_command_count_scales_with_points() {
    let pts: Vec<WorldPoint> = (0..20).map(|i| wp(f64::from(i), 0.0)).collect();
    // MoveTo + one quad per interior point + LineTo.
    assert_eq!(smooth_polyline(&pts).len(), 20);
}

// =============================================================
// route_points
// =============================================================

#[test]
fn route_straight_passes_through_waypoints() {
    let pts = route_points(
        ConnectionStyle::Straight,
        wp(0.0, 0.0),
        &[wp(5.0, 5.0)],
        wp(10.0, 0.0),
    );
    assert_eq!(pts, vec![wp(0.0, 0.0), wp(5.0, 5.0), wp(10.0, 0.0)]);
}

#[test]
fn route_orthogonal_segments_are_axis_aligned() {
    let pts = route_points(ConnectionStyle::Orthogonal, wp(0.0, 0.0), &[], wp(10.0, 8.0));
    for seg in pts.windows(2) {
        let horizontal = approx_eq(seg[0].y, seg[1].y);
        let vertical = approx_eq(seg[0].x, seg[1].x);
        assert!(horizontal || vertical, "diagonal segment {seg:?}");
    }
}

#[test]
fn route_orthogonal_elbow_at_mid_x() {
    let pts = route_points(ConnectionStyle::Orthogonal, wp(0.0, 0.0), &[], wp(10.0, 8.0));
    assert_eq!(pts, vec![wp(0.0, 0.0), wp(5.0, 0.0), wp(5.0, 8.0), wp(10.0, 8.0)]);
}

#[test]
fn route_orthogonal_visits_every_waypoint() {
    let way = wp(20.0, 30.0);
    let pts = route_points(ConnectionStyle::Orthogonal, wp(0.0, 0.0), &[way], wp(40.0, 0.0));
    assert!(pts.contains(&way));
}

#[test]
fn route_curved_starts_and_ends_at_endpoints() {
    let pts = route_points(
        ConnectionStyle::Curved,
        wp(0.0, 0.0),
        &[wp(10.0, 20.0)],
        wp(30.0, 0.0),
    );
    assert_eq!(pts[0], wp(0.0, 0.0));
    let last = *pts.last().unwrap();
    assert!(approx_eq(last.x, 30.0));
    assert!(approx_eq(last.y, 0.0));
}

#[test]
fn route_curved_passes_through_waypoints() {
    let way = wp(10.0, 20.0);
    let pts = route_points(ConnectionStyle::Curved, wp(0.0, 0.0), &[way], wp(30.0, 0.0));
    let on_curve = pts.iter().any(|p| approx_eq(p.x, way.x) && approx_eq(p.y, way.y));
    assert!(on_curve);
}

#[test]
fn route_curved_sample_count() {
    let pts = route_points(ConnectionStyle::Curved, wp(0.0, 0.0), &[wp(5.0, 5.0)], wp(10.0, 0.0));
    // Two spans, CATMULL_SAMPLES points each, plus the starting point.
    assert_eq!(pts.len(), 2 * crate::consts::CATMULL_SAMPLES + 1);
}

// =============================================================
// sample_catmull_rom
// =============================================================

#[test]
fn catmull_fewer_than_two_stops_is_identity() {
    assert!(sample_catmull_rom(&[]).is_empty());
    assert_eq!(sample_catmull_rom(&[wp(1.0, 1.0)]), vec![wp(1.0, 1.0)]);
}

#[test]
fn catmull_two_collinear_stops_stay_on_the_line() {
    let pts = sample_catmull_rom(&[wp(0.0, 0.0), wp(10.0, 0.0)]);
    for p in pts {
        assert!(approx_eq(p.y, 0.0));
    }
}

#[test]
fn catmull_hits_every_stop() {
    let stops = [wp(0.0, 0.0), wp(10.0, 10.0), wp(20.0, -10.0), wp(30.0, 0.0)];
    let pts = sample_catmull_rom(&stops);
    for stop in &stops {
        let found = pts.iter().any(|p| approx_eq(p.x, stop.x) && approx_eq(p.y, stop.y));
        assert!(found, "curve misses stop {stop:?}");
    }
}

// =============================================================
// best_insertion_index
// =============================================================

#[test]
fn insertion_index_with_no_waypoints_is_zero() {
    let idx = best_insertion_index(wp(0.0, 0.0), &[], wp(10.0, 0.0), wp(5.0, 2.0));
    assert_eq!(idx, 0);
}

#[test]
fn insertion_index_picks_nearest_span() {
    let way = [wp(10.0, 0.0)];
    // Near the second span (between the waypoint and the end).
    let idx = best_insertion_index(wp(0.0, 0.0), &way, wp(20.0, 0.0), wp(15.0, 1.0));
    assert_eq!(idx, 1);
    // Near the first span.
    let idx = best_insertion_index(wp(0.0, 0.0), &way, wp(20.0, 0.0), wp(5.0, 1.0));
    assert_eq!(idx, 0);
}

// =============================================================
// bbox_of
// =============================================================

#[test]
fn bbox_of_empty_is_none() {
    assert!(bbox_of(&[]).is_none());
}

#[test]
fn bbox_of_single_point_is_degenerate() {
    let r = bbox_of(&[wp(3.0, 4.0)]).unwrap();
    assert_eq!(r, WorldRect::new(3.0, 4.0, 0.0, 0.0));
}

#[test]
fn bbox_of_points() {
    let r = bbox_of(&[wp(1.0, 5.0), wp(-2.0, 0.0), wp(4.0, 3.0)]).unwrap();
    assert_eq!(r, WorldRect::new(-2.0, 0.0, 6.0, 5.0));
}
