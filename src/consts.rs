//! Shared numeric constants for the annotation engine.

// ── World geometry ──────────────────────────────────────────────

/// Side length of the square virtual canvas, in world units.
pub const CANVAS_SIZE: f64 = 8000.0;

/// Center coordinate of the virtual canvas on both axes.
pub const CANVAS_CENTER: f64 = CANVAS_SIZE / 2.0;

// ── Zoom ────────────────────────────────────────────────────────

/// Lower zoom clamp (10% scale).
pub const MIN_ZOOM: f64 = 0.1;

/// Upper zoom clamp (1000% scale).
pub const MAX_ZOOM: f64 = 10.0;

/// Multiplier for one discrete zoom-in step; zoom-out uses the inverse.
pub const ZOOM_STEP: f64 = 1.2;

/// Wheel-delta-to-zoom sensitivity for ctrl+wheel / pinch zoom.
pub const WHEEL_ZOOM_SENSITIVITY: f64 = 0.002;

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space hit slop in pixels for connector and anchor-link polylines.
pub const CONNECTOR_HIT_PX: f64 = 15.0;

/// Screen-space hit slop in pixels for handles and control points.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

// ── Gestures ────────────────────────────────────────────────────

/// World-space radius swept by the magic eraser.
pub const MAGIC_ERASER_RADIUS: f64 = 20.0;

/// Shapes with a bounding box smaller than this on both axes are discarded
/// on release, in world units.
pub const MIN_SHAPE_EXTENT: f64 = 5.0;

/// Screen-space movement below this is a click, not a drag.
pub const DRAG_THRESHOLD_PX: f64 = 3.0;

/// World-unit margin outside the document bounds within which a released
/// link still snaps to a document anchor.
pub const ANCHOR_SNAP_MARGIN: f64 = 50.0;

// ── History ─────────────────────────────────────────────────────

/// Maximum retained history snapshots; the oldest is evicted beyond this.
pub const MAX_HISTORY: usize = 50;

// ── Timing ──────────────────────────────────────────────────────

/// Zoom must be quiet for this long before the ink raster is rebuilt at the
/// new supersample scale.
pub const RASTER_REBUILD_DELAY_MS: f64 = 150.0;

/// Lifetime of a laser trail point before it fully fades.
pub const LASER_FADE_MS: f64 = 1000.0;

// ── Notes ───────────────────────────────────────────────────────

/// Side length of a minimized note, in world units.
pub const NOTE_MIN_SIZE: f64 = 32.0;

// ── Ink styling ─────────────────────────────────────────────────

/// Opacity for highlighter strokes.
pub const HIGHLIGHT_OPACITY: f64 = 0.4;

/// Opacity for emphasis strokes.
pub const EMPHASIS_OPACITY: f64 = 0.45;

/// Opacity for box-highlight washes.
pub const BOX_HIGHLIGHT_OPACITY: f64 = 0.25;

// ── Ink raster cache ────────────────────────────────────────────

/// World-unit margin around the document kept in the ink raster cache, so
/// strokes spilling past the page edge still hit the cache.
pub const INK_CACHE_MARGIN: f64 = 200.0;

/// Upper bound on either pixel dimension of the ink cache canvas. Browsers
/// refuse canvases much beyond this.
pub const RASTER_MAX_DIM: f64 = 8192.0;

// ── Curves ──────────────────────────────────────────────────────

/// Cardinal-spline tension for curved connectors (0.5 = Catmull-Rom).
pub const CATMULL_TENSION: f64 = 0.5;

/// Flattening samples per curve span.
pub const CATMULL_SAMPLES: usize = 16;

/// π / 5 (36°), the angular step of a 10-vertex star polygon.
pub const FRAC_PI_5: f64 = std::f64::consts::PI / 5.0;

/// Inner-to-outer radius ratio for the five-point star shape.
pub const STAR_INNER_RATIO: f64 = 0.5;
