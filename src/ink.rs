//! Ink layer: freehand strokes, parametric shapes, and the two erasers.
//!
//! Committed paths are grouped per page. The store never touches the canvas;
//! instead it queues [`RasterOp`]s describing the pixel work the presentation
//! layer must apply to the ink cache. While a freehand stroke is in progress
//! only the newest segment is queued; anything that invalidates the cache as
//! a whole (shape sizing, magic erasing, undo, a zoom rescale) queues a
//! single rebuild instead.
//!
//! Point buffers are shared (`Arc`) between the live store and history
//! snapshots. A committed path never mutates its buffer, so snapshot clones
//! stay shallow.

#[cfg(test)]
#[path = "ink_test.rs"]
mod ink_test;

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::camera::WorldPoint;
use crate::consts::{MIN_SHAPE_EXTENT, RASTER_REBUILD_DELAY_MS};
use crate::doc::PageId;
use crate::geom;

/// Unique identifier for an annotation path.
pub type PathId = Uuid;

/// What a stored path draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathKind {
    /// Opaque freehand stroke.
    Pen,
    /// Translucent freehand stroke.
    Highlighter,
    /// Freehand stroke painted with destination-out compositing; cuts into
    /// earlier ink and survives cache rebuilds.
    Eraser,
    /// Straight segment between the two stored points.
    Line,
    /// Axis-aligned rectangle outline spanned by the two stored points.
    Rect,
    /// Ellipse inscribed in the spanned rectangle.
    Circle,
    /// Five-point star inscribed in the spanned rectangle.
    Star,
    /// Straight segment with one or two arrowheads.
    Arrow,
    /// Thick translucent underline.
    Emphasis,
    /// Translucent rectangle wash over a document region.
    BoxHighlight,
}

impl PathKind {
    /// Freehand kinds accumulate points as the pointer moves.
    #[must_use]
    pub fn is_freehand(self) -> bool {
        matches!(self, Self::Pen | Self::Highlighter | Self::Eraser)
    }

    /// Shape kinds store `[start, current]` and are redrawn parametrically.
    #[must_use]
    pub fn is_shape(self) -> bool {
        !self.is_freehand()
    }
}

/// Arrowhead placement for [`PathKind::Arrow`] paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowKind {
    /// Head at the release end only.
    Single,
    /// Heads at both ends.
    Double,
}

/// One stroke or shape on a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationPath {
    /// Unique identifier for this path.
    pub id: PathId,
    /// What the path draws.
    pub kind: PathKind,
    /// World-space points; two entries for shape kinds.
    pub points: Arc<Vec<WorldPoint>>,
    /// Stroke (or fill) color as a CSS color string.
    pub color: String,
    /// Stroke width in world units.
    pub stroke_width: f64,
    /// Paint opacity in `[0, 1]`.
    pub opacity: f64,
    /// Arrowhead placement; only meaningful for arrow paths.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrow_kind: Option<ArrowKind>,
}

impl AnnotationPath {
    /// Bounding box of the stored points, or `None` for an empty path.
    #[must_use]
    pub fn bbox(&self) -> Option<geom::WorldRect> {
        geom::bbox_of(&self.points)
    }
}

/// Raster work queued by the core for the presentation layer.
#[derive(Debug, Clone)]
pub enum RasterOp {
    /// Clear the ink cache and repaint every committed path on the current
    /// page plus the active path, if any.
    Rebuild,
    /// Stroke the newest segment of the active freehand path.
    Segment {
        from: WorldPoint,
        to: WorldPoint,
        color: String,
        width: f64,
        opacity: f64,
        /// Paint with destination-out compositing (rubber eraser).
        erase: bool,
    },
}

/// A stroke or shape currently being drawn.
#[derive(Debug, Clone)]
struct ActivePath {
    page: PageId,
    path: AnnotationPath,
}

/// Per-page ink plus the raster-op queue and supersample bookkeeping.
pub struct InkStore {
    pages: HashMap<PageId, Vec<AnnotationPath>>,
    active: Option<ActivePath>,
    ops: Vec<RasterOp>,
    raster_scale: f64,
    pending_rescale: Option<(f64, f64)>, // (apply_at_ms, scale)
}

impl InkStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            active: None,
            ops: Vec::new(),
            raster_scale: supersample_for(1.0),
            pending_rescale: None,
        }
    }

    /// Committed paths on a page, oldest first.
    #[must_use]
    pub fn paths(&self, page: PageId) -> &[AnnotationPath] {
        self.pages.get(&page).map_or(&[][..], |v| v.as_slice())
    }

    /// The in-progress path, if a stroke or shape gesture is active.
    #[must_use]
    pub fn active_path(&self) -> Option<&AnnotationPath> {
        self.active.as_ref().map(|a| &a.path)
    }

    /// Current supersample factor for the ink cache.
    #[must_use]
    pub fn raster_scale(&self) -> f64 {
        self.raster_scale
    }

    // --- Freehand strokes ---

    /// Open a freehand path with its first point. Any previous active path
    /// is discarded.
    pub fn begin_stroke(
        &mut self,
        page: PageId,
        kind: PathKind,
        color: String,
        stroke_width: f64,
        opacity: f64,
        start: WorldPoint,
    ) {
        self.active = Some(ActivePath {
            page,
            path: AnnotationPath {
                id: Uuid::new_v4(),
                kind,
                points: Arc::new(vec![start]),
                color,
                stroke_width,
                opacity,
                arrow_kind: None,
            },
        });
    }

    /// Append a point to the active freehand path and queue the incremental
    /// segment. Ignored when no freehand path is active.
    pub fn extend_stroke(&mut self, p: WorldPoint) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if !active.path.kind.is_freehand() {
            return;
        }
        let Some(last) = active.path.points.last().copied() else {
            return;
        };
        Arc::make_mut(&mut active.path.points).push(p);
        let seg = RasterOp::Segment {
            from: last,
            to: p,
            color: active.path.color.clone(),
            width: active.path.stroke_width,
            opacity: active.path.opacity,
            erase: active.path.kind == PathKind::Eraser,
        };
        self.queue_segment(seg);
    }

    /// Close the active freehand path and commit it to its page. Paths with
    /// fewer than two points are dropped and `None` is returned.
    pub fn finish_stroke(&mut self) -> Option<PathId> {
        let active = self.active.take()?;
        if active.path.points.len() < 2 {
            return None;
        }
        let id = active.path.id;
        self.pages.entry(active.page).or_default().push(active.path);
        Some(id)
    }

    // --- Parametric shapes ---

    /// Open a shape path as `[start, start]` and queue a repaint.
    pub fn begin_shape(
        &mut self,
        page: PageId,
        kind: PathKind,
        color: String,
        stroke_width: f64,
        opacity: f64,
        arrow_kind: Option<ArrowKind>,
        start: WorldPoint,
    ) {
        self.active = Some(ActivePath {
            page,
            path: AnnotationPath {
                id: Uuid::new_v4(),
                kind,
                points: Arc::new(vec![start, start]),
                color,
                stroke_width,
                opacity,
                arrow_kind,
            },
        });
        self.queue_rebuild();
    }

    /// Move the live corner of the active shape and queue a repaint.
    pub fn update_shape(&mut self, current: WorldPoint) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if !active.path.kind.is_shape() {
            return;
        }
        let points = Arc::make_mut(&mut active.path.points);
        if let Some(last) = points.last_mut() {
            *last = current;
        }
        self.queue_rebuild();
    }

    /// Close the active shape and commit it. Shapes smaller than the minimum
    /// extent on both axes are dropped (a repaint is queued to clear the
    /// preview) and `None` is returned.
    pub fn finish_shape(&mut self) -> Option<PathId> {
        let active = self.active.take()?;
        let [start, end] = active.path.points.as_slice() else {
            self.queue_rebuild();
            return None;
        };
        let extent = (start.x - end.x).abs().max((start.y - end.y).abs());
        if extent < MIN_SHAPE_EXTENT {
            self.queue_rebuild();
            return None;
        }
        let id = active.path.id;
        self.pages.entry(active.page).or_default().push(active.path);
        Some(id)
    }

    /// Drop the active path without committing. Returns whether one existed.
    /// The cache is repainted to wipe any segments already drawn.
    pub fn cancel_active(&mut self) -> bool {
        if self.active.take().is_none() {
            return false;
        }
        self.queue_rebuild();
        true
    }

    // --- Erasers ---

    /// Remove every path on `page` with at least one stored point within
    /// `radius` of `center`. Returns the number of removed paths.
    pub fn magic_erase(&mut self, page: PageId, center: WorldPoint, radius: f64) -> usize {
        let Some(paths) = self.pages.get_mut(&page) else {
            return 0;
        };
        let radius_sq = radius * radius;
        let before = paths.len();
        paths.retain(|path| {
            !path
                .points
                .iter()
                .any(|p| geom::dist_sq(*p, center) <= radius_sq)
        });
        let removed = before - paths.len();
        if removed > 0 {
            self.queue_rebuild();
        }
        removed
    }

    /// Remove every committed path on a page. Returns the number removed.
    pub fn clear_page(&mut self, page: PageId) -> usize {
        let removed = self.pages.remove(&page).map_or(0, |paths| paths.len());
        if removed > 0 {
            self.queue_rebuild();
        }
        removed
    }

    // --- Snapshots ---

    /// Clone the per-page path table. Point buffers are shared, not copied.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<PageId, Vec<AnnotationPath>> {
        self.pages.clone()
    }

    /// Replace all pages, dropping any active path, and queue a repaint.
    pub fn restore(&mut self, pages: HashMap<PageId, Vec<AnnotationPath>>) {
        self.pages = pages;
        self.active = None;
        self.queue_rebuild();
    }

    // --- Raster cache bookkeeping ---

    /// Record a zoom change. The new supersample factor is applied once the
    /// zoom has been quiet for the rebuild delay.
    pub fn schedule_rescale(&mut self, zoom: f64, now_ms: f64) {
        let target = supersample_for(zoom);
        if (target - self.raster_scale).abs() < f64::EPSILON {
            self.pending_rescale = None;
            return;
        }
        self.pending_rescale = Some((now_ms + RASTER_REBUILD_DELAY_MS, target));
    }

    /// Apply a due rescale, if any. Returns `true` when the cache was
    /// invalidated and a redraw is needed.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        let Some((apply_at, scale)) = self.pending_rescale else {
            return false;
        };
        if now_ms < apply_at {
            return false;
        }
        self.pending_rescale = None;
        self.raster_scale = scale;
        self.queue_rebuild();
        true
    }

    /// Drain the queued raster ops for the presentation layer.
    pub fn take_ops(&mut self) -> Vec<RasterOp> {
        std::mem::take(&mut self.ops)
    }

    /// Force a full repaint of the ink cache.
    pub fn invalidate(&mut self) {
        self.queue_rebuild();
    }

    fn queue_rebuild(&mut self) {
        self.ops.clear();
        self.ops.push(RasterOp::Rebuild);
    }

    fn queue_segment(&mut self, seg: RasterOp) {
        // A pending rebuild repaints from live state and subsumes segments.
        if matches!(self.ops.first(), Some(RasterOp::Rebuild)) {
            return;
        }
        self.ops.push(seg);
    }
}

impl Default for InkStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Supersample factor for the ink cache at a given zoom.
#[must_use]
pub fn supersample_for(zoom: f64) -> f64 {
    (zoom * 1.5).max(1.5)
}
