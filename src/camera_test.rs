#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-10;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn world_approx_eq(a: WorldPoint, b: WorldPoint) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

fn screen_approx_eq(a: ScreenPoint, b: ScreenPoint) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

// --- Point types ---

#[test]
fn screen_point_new() {
    let p = ScreenPoint::new(3.0, 4.0);
    assert_eq!(p.x, 3.0);
    assert_eq!(p.y, 4.0);
}

#[test]
fn world_point_new() {
    let p = WorldPoint::new(-1.5, 2.5);
    assert_eq!(p.x, -1.5);
    assert_eq!(p.y, 2.5);
}

#[test]
fn world_point_equality() {
    assert_eq!(WorldPoint::new(1.0, 2.0), WorldPoint::new(1.0, 2.0));
    assert_ne!(WorldPoint::new(1.0, 2.0), WorldPoint::new(1.0, 3.0));
}

#[test]
fn world_point_serde_round_trip() {
    let p = WorldPoint::new(12.5, -3.25);
    let json = serde_json::to_string(&p).unwrap();
    let back: WorldPoint = serde_json::from_str(&json).unwrap();
    assert_eq!(p, back);
}

// --- Camera defaults ---

#[test]
fn camera_default_pan_is_zero() {
    let cam = Camera::default();
    assert_eq!(cam.pan_x, 0.0);
    assert_eq!(cam.pan_y, 0.0);
}

#[test]
fn camera_default_zoom_is_one() {
    let cam = Camera::default();
    assert_eq!(cam.zoom, 1.0);
}

// --- screen_to_world ---

#[test]
fn screen_to_world_identity() {
    let cam = Camera::default();
    let world = cam.screen_to_world(ScreenPoint::new(50.0, 75.0));
    assert!(world_approx_eq(world, WorldPoint::new(50.0, 75.0)));
}

#[test]
fn screen_to_world_with_zoom() {
    let cam = Camera { pan_x: 0.0, pan_y: 0.0, zoom: 4.0 };
    let world = cam.screen_to_world(ScreenPoint::new(40.0, 80.0));
    assert!(approx_eq(world.x, 10.0));
    assert!(approx_eq(world.y, 20.0));
}

#[test]
fn screen_to_world_with_pan() {
    let cam = Camera { pan_x: 100.0, pan_y: 50.0, zoom: 1.0 };
    let world = cam.screen_to_world(ScreenPoint::new(100.0, 50.0));
    assert!(world_approx_eq(world, WorldPoint::new(0.0, 0.0)));
}

#[test]
fn screen_to_world_with_pan_and_zoom() {
    let cam = Camera { pan_x: 20.0, pan_y: 10.0, zoom: 2.0 };
    // screen (20, 10) -> world (0, 0) because (20-20)/2 = 0, (10-10)/2 = 0
    let world = cam.screen_to_world(ScreenPoint::new(20.0, 10.0));
    assert!(world_approx_eq(world, WorldPoint::new(0.0, 0.0)));
}

#[test]
fn screen_to_world_negative_coords() {
    let cam = Camera::default();
    let world = cam.screen_to_world(ScreenPoint::new(-10.0, -20.0));
    assert!(world_approx_eq(world, WorldPoint::new(-10.0, -20.0)));
}

// --- world_to_screen ---

#[test]
fn world_to_screen_identity() {
    let cam = Camera::default();
    let screen = cam.world_to_screen(WorldPoint::new(50.0, 75.0));
    assert!(screen_approx_eq(screen, ScreenPoint::new(50.0, 75.0)));
}

#[test]
fn world_to_screen_with_zoom() {
    let cam = Camera { pan_x: 0.0, pan_y: 0.0, zoom: 2.0 };
    let screen = cam.world_to_screen(WorldPoint::new(10.0, 20.0));
    assert!(approx_eq(screen.x, 20.0));
    assert!(approx_eq(screen.y, 40.0));
}

#[test]
fn world_to_screen_with_pan_and_zoom() {
    let cam = Camera { pan_x: 20.0, pan_y: 10.0, zoom: 3.0 };
    let screen = cam.world_to_screen(WorldPoint::new(5.0, 5.0));
    // 5*3 + 20 = 35, 5*3 + 10 = 25
    assert!(approx_eq(screen.x, 35.0));
    assert!(approx_eq(screen.y, 25.0));
}

// --- Round trips ---

#[test]
fn round_trip_identity() {
    let cam = Camera::default();
    let world = WorldPoint::new(100.0, 200.0);
    let back = cam.screen_to_world(cam.world_to_screen(world));
    assert!(world_approx_eq(world, back));
}

#[test]
fn round_trip_with_pan_and_zoom() {
    let cam = Camera { pan_x: 50.0, pan_y: -30.0, zoom: 2.0 };
    let world = WorldPoint::new(100.0, 200.0);
    let back = cam.screen_to_world(cam.world_to_screen(world));
    assert!(world_approx_eq(world, back));
}

#[test]
fn round_trip_fractional_zoom() {
    let cam = Camera { pan_x: 13.7, pan_y: -42.3, zoom: 0.75 };
    let world = WorldPoint::new(333.3, -999.9);
    let back = cam.screen_to_world(cam.world_to_screen(world));
    assert!(world_approx_eq(world, back));
}

#[test]
fn round_trip_screen_first() {
    let cam = Camera { pan_x: 10.0, pan_y: 20.0, zoom: 1.5 };
    let screen = ScreenPoint::new(400.0, 300.0);
    let back = cam.world_to_screen(cam.screen_to_world(screen));
    assert!(screen_approx_eq(screen, back));
}

// --- screen_dist_to_world ---

#[test]
fn screen_dist_to_world_identity_at_zoom_one() {
    let cam = Camera::default();
    assert!(approx_eq(cam.screen_dist_to_world(42.0), 42.0));
}

#[test]
fn screen_dist_to_world_with_zoom() {
    let cam = Camera { pan_x: 0.0, pan_y: 0.0, zoom: 2.0 };
    assert!(approx_eq(cam.screen_dist_to_world(10.0), 5.0));
}

#[test]
fn screen_dist_to_world_ignores_pan() {
    let cam = Camera { pan_x: 999.0, pan_y: -999.0, zoom: 4.0 };
    assert!(approx_eq(cam.screen_dist_to_world(8.0), 2.0));
}

// --- pan_by ---

#[test]
fn pan_by_accumulates() {
    let mut cam = Camera::default();
    cam.pan_by(10.0, -5.0);
    cam.pan_by(2.0, 3.0);
    assert!(approx_eq(cam.pan_x, 12.0));
    assert!(approx_eq(cam.pan_y, -2.0));
}

#[test]
fn pan_by_does_not_touch_zoom() {
    let mut cam = Camera { pan_x: 0.0, pan_y: 0.0, zoom: 2.5 };
    cam.pan_by(100.0, 100.0);
    assert_eq!(cam.zoom, 2.5);
}

// --- zoom_at ---

#[test]
fn zoom_at_multiplies_zoom() {
    let mut cam = Camera::default();
    cam.zoom_at(2.0, ScreenPoint::new(0.0, 0.0));
    assert!(approx_eq(cam.zoom, 2.0));
}

#[test]
fn zoom_at_preserves_world_point_under_anchor() {
    let mut cam = Camera { pan_x: 37.0, pan_y: -12.0, zoom: 1.3 };
    let anchor = ScreenPoint::new(420.0, 260.0);
    let before = cam.screen_to_world(anchor);
    cam.zoom_at(1.7, anchor);
    let after = cam.screen_to_world(anchor);
    assert!(world_approx_eq(before, after));
}

#[test]
fn zoom_at_preserves_anchor_when_zooming_out() {
    let mut cam = Camera { pan_x: -80.0, pan_y: 40.0, zoom: 3.0 };
    let anchor = ScreenPoint::new(100.0, 700.0);
    let before = cam.screen_to_world(anchor);
    cam.zoom_at(0.4, anchor);
    let after = cam.screen_to_world(anchor);
    assert!(world_approx_eq(before, after));
}

#[test]
fn zoom_at_clamps_to_max() {
    let mut cam = Camera { pan_x: 0.0, pan_y: 0.0, zoom: 8.0 };
    cam.zoom_at(100.0, ScreenPoint::new(50.0, 50.0));
    assert_eq!(cam.zoom, 10.0);
}

#[test]
fn zoom_at_clamps_to_min() {
    let mut cam = Camera { pan_x: 0.0, pan_y: 0.0, zoom: 0.2 };
    cam.zoom_at(0.001, ScreenPoint::new(50.0, 50.0));
    assert_eq!(cam.zoom, 0.1);
}

#[test]
fn zoom_at_anchor_invariant_survives_clamping() {
    let mut cam = Camera { pan_x: 5.0, pan_y: 5.0, zoom: 9.0 };
    let anchor = ScreenPoint::new(300.0, 200.0);
    let before = cam.screen_to_world(anchor);
    cam.zoom_at(5.0, anchor); // clamps at 10.0
    let after = cam.screen_to_world(anchor);
    assert!(world_approx_eq(before, after));
}

#[test]
fn zoom_at_identity_factor_is_noop() {
    let mut cam = Camera { pan_x: 11.0, pan_y: 22.0, zoom: 1.5 };
    cam.zoom_at(1.0, ScreenPoint::new(640.0, 360.0));
    assert!(approx_eq(cam.pan_x, 11.0));
    assert!(approx_eq(cam.pan_y, 22.0));
    assert!(approx_eq(cam.zoom, 1.5));
}

// --- fit_to ---

#[test]
fn fit_to_centers_content() {
    let mut cam = Camera::default();
    cam.fit_to(WorldPoint::new(4000.0, 4000.0), 800.0, 600.0, 1000.0, 800.0, 0.0);
    // The content center must land on the viewport center.
    let center = cam.world_to_screen(WorldPoint::new(4000.0, 4000.0));
    assert!(approx_eq(center.x, 500.0));
    assert!(approx_eq(center.y, 400.0));
}

#[test]
fn fit_to_fits_both_axes() {
    let mut cam = Camera::default();
    cam.fit_to(WorldPoint::new(0.0, 0.0), 2000.0, 500.0, 1000.0, 800.0, 0.0);
    // Width is the limiting axis: 1000 / 2000 = 0.5.
    assert!(approx_eq(cam.zoom, 0.5));
}

#[test]
fn fit_to_respects_margin() {
    let mut cam = Camera::default();
    cam.fit_to(WorldPoint::new(0.0, 0.0), 900.0, 100.0, 1000.0, 800.0, 50.0);
    // Available width is 1000 - 100 = 900, so zoom is exactly 1.
    assert!(approx_eq(cam.zoom, 1.0));
}

#[test]
fn fit_to_clamps_zoom() {
    let mut cam = Camera::default();
    cam.fit_to(WorldPoint::new(0.0, 0.0), 10.0, 10.0, 2000.0, 2000.0, 0.0);
    assert_eq!(cam.zoom, 10.0);
}

#[test]
fn fit_to_with_zero_viewport_is_noop() {
    let mut cam = Camera { pan_x: 7.0, pan_y: 8.0, zoom: 1.25 };
    cam.fit_to(WorldPoint::new(0.0, 0.0), 800.0, 600.0, 0.0, 0.0, 40.0);
    assert_eq!(cam.pan_x, 7.0);
    assert_eq!(cam.pan_y, 8.0);
    assert_eq!(cam.zoom, 1.25);
}
