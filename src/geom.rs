//! Pure geometry: stroke smoothing, connector routing, and distance helpers.
//!
//! Everything in this module operates on world-space values and is total —
//! degenerate inputs (empty polylines, zero-length segments) produce empty or
//! identity results rather than errors.

#[cfg(test)]
#[path = "geom_test.rs"]
mod geom_test;

use serde::{Deserialize, Serialize};

use crate::camera::WorldPoint;
use crate::consts::{CATMULL_SAMPLES, CATMULL_TENSION};

/// An axis-aligned rectangle in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl WorldRect {
    #[must_use]
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Build a normalized rectangle from two opposite corners.
    #[must_use]
    pub fn from_corners(a: WorldPoint, b: WorldPoint) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            w: (a.x - b.x).abs(),
            h: (a.y - b.y).abs(),
        }
    }

    #[must_use]
    pub fn center(&self) -> WorldPoint {
        WorldPoint::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    #[must_use]
    pub fn contains(&self, p: WorldPoint) -> bool {
        p.x >= self.x && p.x <= self.x + self.w && p.y >= self.y && p.y <= self.y + self.h
    }

    /// Grow the rectangle by `pad` on every side.
    #[must_use]
    pub fn expand(&self, pad: f64) -> Self {
        Self {
            x: self.x - pad,
            y: self.y - pad,
            w: self.w + pad * 2.0,
            h: self.h + pad * 2.0,
        }
    }

    /// Smallest rectangle covering both `self` and `other`.
    #[must_use]
    pub fn union(&self, other: WorldRect) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = (self.x + self.w).max(other.x + other.w);
        let bottom = (self.y + self.h).max(other.y + other.h);
        Self { x, y, w: right - x, h: bottom - y }
    }

    #[must_use]
    pub fn intersects(&self, other: WorldRect) -> bool {
        self.x <= other.x + other.w
            && self.x + self.w >= other.x
            && self.y <= other.y + other.h
            && self.y + self.h >= other.y
    }
}

/// Routing style for connector lines and anchor links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStyle {
    /// Straight segments through the waypoints.
    #[default]
    Straight,
    /// A smooth curve through the waypoints.
    Curved,
    /// Axis-aligned segments with one elbow pair per span.
    Orthogonal,
}

/// A drawing command for a flattened stroke outline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCmd {
    MoveTo(WorldPoint),
    LineTo(WorldPoint),
    QuadTo { ctrl: WorldPoint, to: WorldPoint },
}

/// Midpoint of two points.
#[must_use]
pub fn midpoint(a: WorldPoint, b: WorldPoint) -> WorldPoint {
    WorldPoint::new((a.x + b.x) * 0.5, (a.y + b.y) * 0.5)
}

/// Squared distance between two points.
#[must_use]
pub fn dist_sq(a: WorldPoint, b: WorldPoint) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

/// Squared distance from `p` to the segment `a`-`b`.
///
/// Projects `p` onto the segment and clamps the parameter to `[0, 1]`, so
/// points beyond either end measure against the nearer endpoint.
#[must_use]
pub fn dist_sq_to_segment(p: WorldPoint, a: WorldPoint, b: WorldPoint) -> f64 {
    let vx = b.x - a.x;
    let vy = b.y - a.y;
    let len_sq = vx * vx + vy * vy;
    if len_sq == 0.0 {
        return dist_sq(p, a);
    }
    let t = (((p.x - a.x) * vx + (p.y - a.y) * vy) / len_sq).clamp(0.0, 1.0);
    let closest = WorldPoint::new(a.x + t * vx, a.y + t * vy);
    dist_sq(p, closest)
}

/// Whether `p` lies within `tolerance` of any segment of the polyline.
///
/// A single-point polyline is treated as that point; an empty one never hits.
#[must_use]
pub fn polyline_hit(points: &[WorldPoint], p: WorldPoint, tolerance: f64) -> bool {
    let tol_sq = tolerance * tolerance;
    match points {
        [] => false,
        [only] => dist_sq(p, *only) <= tol_sq,
        _ => points
            .windows(2)
            .any(|seg| dist_sq_to_segment(p, seg[0], seg[1]) <= tol_sq),
    }
}

/// Smooth a freehand polyline into quadratic segments through successive
/// midpoints.
///
/// Each interior point becomes a control point whose curve passes through the
/// midpoint to its successor, which keeps the stroke close to the sampled
/// input without a fitting pass. Returns an empty list for fewer than two
/// points.
#[must_use]
pub fn smooth_polyline(points: &[WorldPoint]) -> Vec<PathCmd> {
    match points {
        [] | [_] => Vec::new(),
        [a, b] => vec![PathCmd::MoveTo(*a), PathCmd::LineTo(*b)],
        _ => {
            let mut cmds = Vec::with_capacity(points.len());
            cmds.push(PathCmd::MoveTo(points[0]));
            for i in 1..points.len() - 1 {
                cmds.push(PathCmd::QuadTo {
                    ctrl: points[i],
                    to: midpoint(points[i], points[i + 1]),
                });
            }
            cmds.push(PathCmd::LineTo(points[points.len() - 1]));
            cmds
        }
    }
}

/// Route a connector from `start` through `waypoints` to `end`, flattened to
/// a polyline ready for drawing or hit-testing.
#[must_use]
pub fn route_points(
    style: ConnectionStyle,
    start: WorldPoint,
    waypoints: &[WorldPoint],
    end: WorldPoint,
) -> Vec<WorldPoint> {
    let stops = collect_stops(start, waypoints, end);
    match style {
        ConnectionStyle::Straight => stops,
        ConnectionStyle::Orthogonal => route_orthogonal(&stops),
        ConnectionStyle::Curved => sample_catmull_rom(&stops),
    }
}

fn collect_stops(start: WorldPoint, waypoints: &[WorldPoint], end: WorldPoint) -> Vec<WorldPoint> {
    let mut stops = Vec::with_capacity(waypoints.len() + 2);
    stops.push(start);
    stops.extend_from_slice(waypoints);
    stops.push(end);
    stops
}

/// Manhattan routing: each span gets a vertical elbow pair at its mid-x.
fn route_orthogonal(stops: &[WorldPoint]) -> Vec<WorldPoint> {
    let mut out = Vec::with_capacity(stops.len() * 3);
    if let Some(first) = stops.first() {
        out.push(*first);
    }
    for seg in stops.windows(2) {
        let (p, q) = (seg[0], seg[1]);
        let mid_x = (p.x + q.x) * 0.5;
        out.push(WorldPoint::new(mid_x, p.y));
        out.push(WorldPoint::new(mid_x, q.y));
        out.push(q);
    }
    out
}

/// Flatten a cardinal spline through `stops` into a polyline.
///
/// Endpoint spans use mirrored phantom points so the curve starts and ends
/// exactly at the first and last stop.
#[must_use]
pub fn sample_catmull_rom(stops: &[WorldPoint]) -> Vec<WorldPoint> {
    if stops.len() < 2 {
        return stops.to_vec();
    }

    let first = stops[0];
    let last = stops[stops.len() - 1];
    let phantom_start = WorldPoint::new(2.0 * first.x - stops[1].x, 2.0 * first.y - stops[1].y);
    let phantom_end = WorldPoint::new(
        2.0 * last.x - stops[stops.len() - 2].x,
        2.0 * last.y - stops[stops.len() - 2].y,
    );

    let mut padded = Vec::with_capacity(stops.len() + 2);
    padded.push(phantom_start);
    padded.extend_from_slice(stops);
    padded.push(phantom_end);

    let mut out = Vec::with_capacity((stops.len() - 1) * CATMULL_SAMPLES + 1);
    out.push(first);
    for span in padded.windows(4) {
        let (p0, p1, p2, p3) = (span[0], span[1], span[2], span[3]);
        for step in 1..=CATMULL_SAMPLES {
            let t = step as f64 / CATMULL_SAMPLES as f64;
            out.push(hermite_point(p0, p1, p2, p3, t));
        }
    }
    out
}

/// Evaluate the span `p1`-`p2` of a cardinal spline at `t` using the Hermite
/// basis, with tangents scaled by the tension constant.
fn hermite_point(p0: WorldPoint, p1: WorldPoint, p2: WorldPoint, p3: WorldPoint, t: f64) -> WorldPoint {
    let t2 = t * t;
    let t3 = t2 * t;
    let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
    let h10 = t3 - 2.0 * t2 + t;
    let h01 = -2.0 * t3 + 3.0 * t2;
    let h11 = t3 - t2;

    let m1x = CATMULL_TENSION * (p2.x - p0.x);
    let m1y = CATMULL_TENSION * (p2.y - p0.y);
    let m2x = CATMULL_TENSION * (p3.x - p1.x);
    let m2y = CATMULL_TENSION * (p3.y - p1.y);

    WorldPoint::new(
        h00 * p1.x + h10 * m1x + h01 * p2.x + h11 * m2x,
        h00 * p1.y + h10 * m1y + h01 * p2.y + h11 * m2y,
    )
}

/// Index in the waypoint list at which inserting `p` splits the nearest span
/// of the connector's control polygon.
#[must_use]
pub fn best_insertion_index(
    start: WorldPoint,
    waypoints: &[WorldPoint],
    end: WorldPoint,
    p: WorldPoint,
) -> usize {
    let stops = collect_stops(start, waypoints, end);
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, seg) in stops.windows(2).enumerate() {
        let d = dist_sq_to_segment(p, seg[0], seg[1]);
        if d < best_dist {
            best_dist = d;
            best = i;
        }
    }
    best
}

/// Bounding box of a point set, or `None` when empty.
#[must_use]
pub fn bbox_of(points: &[WorldPoint]) -> Option<WorldRect> {
    let first = points.first()?;
    let mut min_x = first.x;
    let mut min_y = first.y;
    let mut max_x = first.x;
    let mut max_y = first.y;
    for p in &points[1..] {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Some(WorldRect::new(min_x, min_y, max_x - min_x, max_y - min_y))
}
