//! Pan/zoom camera and the two coordinate spaces.
//!
//! Screen space is CSS pixels with the origin at the viewport top-left; world
//! space is canvas units with the origin at the virtual canvas top-left. The
//! two are kept apart by distinct point types, and every conversion between
//! them lives in this module: `world = (screen - pan) / zoom`.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_ZOOM, MIN_ZOOM};

/// A point in screen space (CSS pixels).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A point in world space (canvas units).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
}

impl WorldPoint {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Camera state for pan/zoom over the virtual canvas.
///
/// `pan_x` / `pan_y` are in CSS pixels. `zoom` is a scale factor (1.0 = no
/// zoom) clamped to `[MIN_ZOOM, MAX_ZOOM]`.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { pan_x: 0.0, pan_y: 0.0, zoom: 1.0 }
    }
}

impl Camera {
    /// Convert a screen-space point to world coordinates.
    #[must_use]
    pub fn screen_to_world(&self, screen: ScreenPoint) -> WorldPoint {
        WorldPoint {
            x: (screen.x - self.pan_x) / self.zoom,
            y: (screen.y - self.pan_y) / self.zoom,
        }
    }

    /// Convert a world-space point to screen coordinates.
    #[must_use]
    pub fn world_to_screen(&self, world: WorldPoint) -> ScreenPoint {
        ScreenPoint {
            x: world.x * self.zoom + self.pan_x,
            y: world.y * self.zoom + self.pan_y,
        }
    }

    /// Convert a screen-space distance (pixels) to world-space distance.
    #[must_use]
    pub fn screen_dist_to_world(&self, screen_dist: f64) -> f64 {
        screen_dist / self.zoom
    }

    /// Translate the camera by a screen-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    /// Multiply the zoom by `factor`, keeping the world point under `anchor`
    /// fixed on screen. The result is clamped to the zoom range.
    pub fn zoom_at(&mut self, factor: f64, anchor: ScreenPoint) {
        let new_zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        // Solve pan' so that (anchor - pan') / zoom' == (anchor - pan) / zoom.
        let scale = new_zoom / self.zoom;
        self.pan_x = anchor.x - (anchor.x - self.pan_x) * scale;
        self.pan_y = anchor.y - (anchor.y - self.pan_y) * scale;
        self.zoom = new_zoom;
    }

    /// Center a world rectangle of `content_w` × `content_h` around
    /// `content_center` in the viewport, zoomed so the whole rectangle fits
    /// with `margin_px` of breathing room on every side.
    ///
    /// Does nothing if the viewport or the content has no extent yet.
    pub fn fit_to(
        &mut self,
        content_center: WorldPoint,
        content_w: f64,
        content_h: f64,
        viewport_w: f64,
        viewport_h: f64,
        margin_px: f64,
    ) {
        if content_w <= 0.0 || content_h <= 0.0 || viewport_w <= 0.0 || viewport_h <= 0.0 {
            return;
        }
        let avail_w = (viewport_w - margin_px * 2.0).max(1.0);
        let avail_h = (viewport_h - margin_px * 2.0).max(1.0);
        self.zoom = (avail_w / content_w).min(avail_h / content_h).clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan_x = viewport_w * 0.5 - content_center.x * self.zoom;
        self.pan_y = viewport_h * 0.5 - content_center.y * self.zoom;
    }
}
