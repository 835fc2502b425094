//! Rendering: draws the annotation scene and maintains the offscreen ink
//! cache.
//!
//! This module is the only place that touches [`web_sys::CanvasRenderingContext2d`].
//! It receives a read-only view of the engine state plus the queued
//! [`RasterOp`]s and produces pixels; it never mutates application state.
//!
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`.
//! The top-level caller ([`crate::engine::Engine::render`]) handles the result.

use std::f64::consts::PI;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::camera::WorldPoint;
use crate::consts::{
    FRAC_PI_5, HANDLE_RADIUS_PX, INK_CACHE_MARGIN, LASER_FADE_MS, RASTER_MAX_DIM, STAR_INNER_RATIO,
};
use crate::doc::{DocLayout, NoteKind, StickyNote};
use crate::engine::EngineCore;
use crate::geom::{self, PathCmd, WorldRect};
use crate::hit;
use crate::ink::{AnnotationPath, ArrowKind, PathKind, RasterOp};

/// Arrowhead length in world units.
const ARROW_SIZE: f64 = 10.0;

/// Arrowhead half-angle in radians (~30°).
const ARROW_ANGLE: f64 = PI / 6.0;

/// Selection dash segment length in screen pixels.
const SELECTION_DASH_PX: f64 = 4.0;

/// Laser trail color and width (screen pixels).
const LASER_COLOR: &str = "#FF3B30";
const LASER_WIDTH_PX: f64 = 3.0;

/// Inner padding of a note card, world units.
const NOTE_PAD: f64 = 8.0;
const NOTE_FONT_PX: f64 = 13.0;
const NOTE_INK: &str = "#1F1A17";
const NOTE_BORDER: &str = "rgba(31, 26, 23, 0.35)";

/// Fetch the 2D context of a canvas element.
///
/// # Errors
///
/// Returns `Err` when the element has no 2D context or the context object has
/// an unexpected type.
pub fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, JsValue> {
    canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(JsValue::from)
}

/// Draw the full scene.
///
/// Queued raster ops are applied to the ink cache first; the cache is then
/// composited under the note layer. Without a loaded document there is no
/// cache region, so ink is stroked directly instead.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails (e.g. invalid context state).
pub fn draw(
    ctx: &CanvasRenderingContext2d,
    ink_ctx: &CanvasRenderingContext2d,
    ink_canvas: &HtmlCanvasElement,
    core: &EngineCore,
    ops: &[RasterOp],
) -> Result<(), JsValue> {
    let cache_region = core.layout.map(|l| l.rect().expand(INK_CACHE_MARGIN));
    if let Some(region) = cache_region {
        apply_raster_ops(ink_ctx, ink_canvas, core, region, ops)?;
    }

    let zoom = core.camera.zoom;

    // Layer 1: clear and set up the world transform.
    ctx.set_transform(core.dpr, 0.0, 0.0, core.dpr, 0.0, 0.0)?;
    ctx.clear_rect(0.0, 0.0, core.viewport_width, core.viewport_height);
    ctx.translate(core.camera.pan_x, core.camera.pan_y)?;
    ctx.scale(zoom, zoom)?;

    // Layer 2: document page and ink. With a document the ink comes from the
    // cache; eraser cuts already happened there, so compositing is plain.
    if let (Some(layout), Some(region)) = (core.layout, cache_region) {
        draw_document(ctx, layout, zoom);
        ctx.draw_image_with_html_canvas_element_and_dw_and_dh(
            ink_canvas,
            region.x,
            region.y,
            region.w,
            region.h,
        )?;
    } else {
        // Ink goes down before anything else so destination-out strokes only
        // ever cut ink pixels.
        for path in core.ink.paths(core.page) {
            draw_path(ctx, path)?;
        }
        if let Some(active) = core.ink.active_path() {
            draw_path(ctx, active)?;
        }
    }

    // Layer 3: links under the cards.
    for note in core.notes.notes(core.page) {
        if let Some(route) = hit::anchor_route(note, core.layout) {
            let selected = core.ui.selected_notes.contains(&note.id);
            draw_anchor_link(ctx, note, &route, zoom, selected)?;
        }
    }
    for conn in core.notes.connections(core.page) {
        let Some(route) = hit::connection_route(&core.notes, core.page, conn) else {
            continue;
        };
        let selected = core.ui.selected_connection == Some(conn.id);
        stroke_polyline(ctx, &route, if selected { "#1E90FF" } else { &conn.color }, 2.0);
        if selected {
            draw_point_handles(ctx, &conn.control_points, zoom)?;
        }
    }

    // Layer 4: note cards.
    for note in core.notes.notes(core.page) {
        draw_note(ctx, note, zoom)?;
    }

    // Layer 5: transient UI.
    for id in &core.ui.selected_notes {
        if let Some(note) = core.notes.note(core.page, *id) {
            draw_note_selection(ctx, note, zoom)?;
        }
    }
    if let Some(rect) = core.ui.lasso {
        draw_lasso(ctx, rect, zoom)?;
    }
    if let Some((from, to)) = core.ui.link_preview {
        draw_link_preview(ctx, from, to, &core.ui.connection_color, zoom)?;
    }
    if !core.ui.laser.is_empty() {
        draw_laser(ctx, core, zoom);
    }

    Ok(())
}

// =============================================================
// Ink cache
// =============================================================

/// Apply queued raster ops to the offscreen cache canvas.
///
/// The cache covers `region` at `cache_scale` pixels per world unit;
/// the transform below maps world coordinates straight onto it.
fn apply_raster_ops(
    ink_ctx: &CanvasRenderingContext2d,
    ink_canvas: &HtmlCanvasElement,
    core: &EngineCore,
    region: WorldRect,
    ops: &[RasterOp],
) -> Result<(), JsValue> {
    if ops.is_empty() {
        return Ok(());
    }
    let scale = cache_scale(core.ink.raster_scale(), region);

    for op in ops {
        match op {
            RasterOp::Rebuild => {
                // Resizing the backing store also clears it.
                ink_canvas.set_width(((region.w * scale).ceil() as u32).max(1));
                ink_canvas.set_height(((region.h * scale).ceil() as u32).max(1));
                set_cache_transform(ink_ctx, region, scale)?;
                ink_ctx.set_line_cap("round");
                ink_ctx.set_line_join("round");
                for path in core.ink.paths(core.page) {
                    draw_path(ink_ctx, path)?;
                }
                if let Some(active) = core.ink.active_path() {
                    draw_path(ink_ctx, active)?;
                }
            }
            RasterOp::Segment { from, to, color, width, opacity, erase } => {
                set_cache_transform(ink_ctx, region, scale)?;
                ink_ctx.set_line_cap("round");
                ink_ctx.set_line_join("round");
                if *erase {
                    ink_ctx.set_global_composite_operation("destination-out")?;
                }
                ink_ctx.set_global_alpha(*opacity);
                ink_ctx.set_stroke_style_str(color);
                ink_ctx.set_line_width(*width);
                ink_ctx.begin_path();
                ink_ctx.move_to(from.x, from.y);
                ink_ctx.line_to(to.x, to.y);
                ink_ctx.stroke();
                ink_ctx.set_global_alpha(1.0);
                ink_ctx.set_global_composite_operation("source-over")?;
            }
        }
    }
    Ok(())
}

/// Supersample factor actually used for the cache, capped so the backing
/// store never exceeds the canvas dimension limit.
fn cache_scale(raster_scale: f64, region: WorldRect) -> f64 {
    let max_dim = region.w.max(region.h).max(1.0);
    raster_scale.min(RASTER_MAX_DIM / max_dim)
}

fn set_cache_transform(
    ink_ctx: &CanvasRenderingContext2d,
    region: WorldRect,
    scale: f64,
) -> Result<(), JsValue> {
    ink_ctx.set_transform(scale, 0.0, 0.0, scale, -region.x * scale, -region.y * scale)
}

// =============================================================
// Document page
// =============================================================

fn draw_document(ctx: &CanvasRenderingContext2d, layout: DocLayout, zoom: f64) {
    let r = layout.rect();
    ctx.save();
    ctx.set_fill_style_str("#fff");
    ctx.fill_rect(r.x, r.y, r.w, r.h);
    ctx.set_stroke_style_str("#C8C2BC");
    ctx.set_line_width(1.0 / zoom);
    ctx.stroke_rect(r.x, r.y, r.w, r.h);
    ctx.restore();
}

// =============================================================
// Ink paths
// =============================================================

fn draw_path(ctx: &CanvasRenderingContext2d, path: &AnnotationPath) -> Result<(), JsValue> {
    let pts = path.points.as_slice();
    if pts.len() < 2 {
        return Ok(());
    }
    let a = pts[0];
    let b = pts[pts.len() - 1];

    ctx.save();
    ctx.set_stroke_style_str(&path.color);
    ctx.set_line_width(path.stroke_width);
    ctx.set_global_alpha(path.opacity);
    ctx.set_line_cap("round");
    ctx.set_line_join("round");
    if path.kind == PathKind::Eraser {
        ctx.set_global_composite_operation("destination-out")?;
    }

    match path.kind {
        PathKind::Pen | PathKind::Highlighter | PathKind::Eraser => stroke_smooth(ctx, pts),
        PathKind::Line | PathKind::Emphasis => {
            ctx.begin_path();
            ctx.move_to(a.x, a.y);
            ctx.line_to(b.x, b.y);
            ctx.stroke();
        }
        PathKind::Rect => {
            let r = WorldRect::from_corners(a, b);
            ctx.stroke_rect(r.x, r.y, r.w, r.h);
        }
        PathKind::Circle => {
            let rx = (a.x - b.x).abs() * 0.5;
            let ry = (a.y - b.y).abs() * 0.5;
            if rx > 0.0 && ry > 0.0 {
                let c = geom::midpoint(a, b);
                ctx.begin_path();
                ctx.ellipse(c.x, c.y, rx, ry, 0.0, 0.0, 2.0 * PI)?;
                ctx.stroke();
            }
        }
        PathKind::Star => {
            star_path(ctx, a, b);
            ctx.stroke();
        }
        PathKind::Arrow => {
            ctx.begin_path();
            ctx.move_to(a.x, a.y);
            ctx.line_to(b.x, b.y);
            ctx.stroke();
            ctx.set_fill_style_str(&path.color);
            let angle = (b.y - a.y).atan2(b.x - a.x);
            draw_arrowhead(ctx, b, angle);
            if path.arrow_kind == Some(ArrowKind::Double) {
                draw_arrowhead(ctx, a, angle + PI);
            }
        }
        PathKind::BoxHighlight => {
            ctx.set_fill_style_str(&path.color);
            let r = WorldRect::from_corners(a, b);
            ctx.fill_rect(r.x, r.y, r.w, r.h);
        }
    }

    ctx.restore();
    Ok(())
}

/// Stroke a freehand polyline through its smoothed curve commands.
fn stroke_smooth(ctx: &CanvasRenderingContext2d, pts: &[WorldPoint]) {
    ctx.begin_path();
    for cmd in geom::smooth_polyline(pts) {
        match cmd {
            PathCmd::MoveTo(p) => ctx.move_to(p.x, p.y),
            PathCmd::LineTo(p) => ctx.line_to(p.x, p.y),
            PathCmd::QuadTo { ctrl, to } => ctx.quadratic_curve_to(ctrl.x, ctrl.y, to.x, to.y),
        }
    }
    ctx.stroke();
}

/// Trace a ten-vertex star inscribed in the box spanned by `a` and `b`.
#[allow(clippy::similar_names)]
fn star_path(ctx: &CanvasRenderingContext2d, a: WorldPoint, b: WorldPoint) {
    let c = geom::midpoint(a, b);
    let rx_outer = (a.x - b.x).abs() * 0.5;
    let ry_outer = (a.y - b.y).abs() * 0.5;
    let rx_inner = rx_outer * STAR_INNER_RATIO;
    let ry_inner = ry_outer * STAR_INNER_RATIO;
    let offset = std::f64::consts::FRAC_PI_2;

    ctx.begin_path();
    for i in 0..10 {
        let angle = FRAC_PI_5.mul_add(f64::from(i), -offset);
        let (rx, ry) = if i % 2 == 0 {
            (rx_outer, ry_outer)
        } else {
            (rx_inner, ry_inner)
        };
        let px = c.x + rx * angle.cos();
        let py = c.y + ry * angle.sin();
        if i == 0 {
            ctx.move_to(px, py);
        } else {
            ctx.line_to(px, py);
        }
    }
    ctx.close_path();
}

fn draw_arrowhead(ctx: &CanvasRenderingContext2d, tip: WorldPoint, angle: f64) {
    let x1 = tip.x - ARROW_SIZE * (angle - ARROW_ANGLE).cos();
    let y1 = tip.y - ARROW_SIZE * (angle - ARROW_ANGLE).sin();
    let x2 = tip.x - ARROW_SIZE * (angle + ARROW_ANGLE).cos();
    let y2 = tip.y - ARROW_SIZE * (angle + ARROW_ANGLE).sin();

    ctx.begin_path();
    ctx.move_to(tip.x, tip.y);
    ctx.line_to(x1, y1);
    ctx.line_to(x2, y2);
    ctx.close_path();
    ctx.fill();
}

// =============================================================
// Links
// =============================================================

fn stroke_polyline(ctx: &CanvasRenderingContext2d, route: &[WorldPoint], color: &str, width: f64) {
    if route.len() < 2 {
        return;
    }
    ctx.save();
    ctx.set_stroke_style_str(color);
    ctx.set_line_width(width);
    ctx.set_line_join("round");
    ctx.begin_path();
    ctx.move_to(route[0].x, route[0].y);
    for p in &route[1..] {
        ctx.line_to(p.x, p.y);
    }
    ctx.stroke();
    ctx.restore();
}

/// Anchor links are dashed to set them apart from note-to-note connectors;
/// the document end carries a small filled dot.
fn draw_anchor_link(
    ctx: &CanvasRenderingContext2d,
    note: &StickyNote,
    route: &[WorldPoint],
    zoom: f64,
    selected: bool,
) -> Result<(), JsValue> {
    if route.len() < 2 {
        return Ok(());
    }
    let color = if selected { "#1E90FF" } else { note.connection_color.as_str() };

    ctx.save();
    ctx.set_line_dash(&dash_array(SELECTION_DASH_PX * 1.5 / zoom))?;
    stroke_polyline(ctx, route, color, 1.5);
    ctx.set_line_dash(&js_sys::Array::new())?;

    let end = route[route.len() - 1];
    ctx.set_fill_style_str(color);
    ctx.begin_path();
    ctx.arc(end.x, end.y, 3.0 / zoom.max(0.5), 0.0, 2.0 * PI)?;
    ctx.fill();
    ctx.restore();

    if selected {
        draw_point_handles(ctx, &note.anchor_points, zoom)?;
        draw_point_handles(ctx, &route[route.len() - 1..], zoom)?;
    }
    Ok(())
}

fn draw_link_preview(
    ctx: &CanvasRenderingContext2d,
    from: WorldPoint,
    to: WorldPoint,
    color: &str,
    zoom: f64,
) -> Result<(), JsValue> {
    ctx.save();
    ctx.set_line_dash(&dash_array(SELECTION_DASH_PX / zoom))?;
    stroke_polyline(ctx, &[from, to], color, 1.5);
    ctx.set_line_dash(&js_sys::Array::new())?;
    ctx.restore();
    Ok(())
}

// =============================================================
// Note cards
// =============================================================

fn draw_note(ctx: &CanvasRenderingContext2d, note: &StickyNote, zoom: f64) -> Result<(), JsValue> {
    let (w, h) = note.size();

    ctx.save();
    ctx.set_fill_style_str(&note.color);
    ctx.fill_rect(note.x, note.y, w, h);
    ctx.set_stroke_style_str(NOTE_BORDER);
    ctx.set_line_width(1.0);
    ctx.stroke_rect(note.x, note.y, w, h);

    // Folded corner, the sticky-note tell.
    ctx.begin_path();
    ctx.move_to(note.x + w - 10.0, note.y + h);
    ctx.line_to(note.x + w, note.y + h - 10.0);
    ctx.line_to(note.x + w, note.y + h);
    ctx.close_path();
    ctx.set_fill_style_str("rgba(31, 26, 23, 0.2)");
    ctx.fill();

    if !note.minimized {
        match note.kind {
            NoteKind::Text => draw_note_text(ctx, note, w, h)?,
            NoteKind::Table => {
                if let Some(table) = &note.table {
                    draw_note_table(ctx, note, table, w, h)?;
                } else {
                    draw_kind_label(ctx, note, w, h)?;
                }
            }
            NoteKind::Image | NoteKind::Audio | NoteKind::Drawing => {
                draw_kind_label(ctx, note, w, h)?;
            }
        }
    }
    ctx.restore();

    // Link handle, always visible so linking is discoverable.
    let handle = hit::link_handle_pos(note);
    ctx.save();
    ctx.set_fill_style_str("#fff");
    ctx.set_stroke_style_str(&note.connection_color);
    ctx.set_line_width(1.0 / zoom);
    ctx.begin_path();
    ctx.arc(handle.x, handle.y, HANDLE_RADIUS_PX * 0.5 / zoom, 0.0, 2.0 * PI)?;
    ctx.fill();
    ctx.stroke();
    ctx.restore();
    Ok(())
}

fn draw_note_text(
    ctx: &CanvasRenderingContext2d,
    note: &StickyNote,
    w: f64,
    h: f64,
) -> Result<(), JsValue> {
    if note.text.is_empty() {
        return Ok(());
    }
    let max_w = (w - NOTE_PAD * 2.0).max(1.0);
    let line_height = NOTE_FONT_PX * 1.3;
    let max_lines = (((h - NOTE_PAD * 2.0) / line_height).floor() as usize).max(1);

    ctx.set_fill_style_str(NOTE_INK);
    ctx.set_text_align("left");
    ctx.set_text_baseline("top");
    ctx.set_font(&format!("{NOTE_FONT_PX}px sans-serif"));

    let mut lines = wrap_text(ctx, &note.text, max_w);
    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            *last = ellipsize(ctx, last, max_w);
        }
    }
    for (idx, line) in lines.iter().enumerate() {
        let y = (idx as f64).mul_add(line_height, note.y + NOTE_PAD);
        ctx.fill_text(line, note.x + NOTE_PAD, y)?;
    }
    Ok(())
}

fn draw_note_table(
    ctx: &CanvasRenderingContext2d,
    note: &StickyNote,
    table: &[Vec<String>],
    w: f64,
    h: f64,
) -> Result<(), JsValue> {
    let cols = table.iter().map(Vec::len).max().unwrap_or(0);
    if cols == 0 {
        return Ok(());
    }
    let row_h = 22.0;
    let inner_w = w - NOTE_PAD * 2.0;
    let inner_h = h - NOTE_PAD * 2.0;
    let rows = table.len().min(((inner_h / row_h).floor() as usize).max(1));
    let col_w = inner_w / cols as f64;
    let x0 = note.x + NOTE_PAD;
    let y0 = note.y + NOTE_PAD;

    ctx.set_stroke_style_str(NOTE_BORDER);
    ctx.set_line_width(1.0);
    ctx.set_fill_style_str(NOTE_INK);
    ctx.set_text_align("left");
    ctx.set_text_baseline("middle");
    ctx.set_font(&format!("{}px sans-serif", NOTE_FONT_PX - 2.0));

    for (r, row) in table.iter().take(rows).enumerate() {
        let y = (r as f64).mul_add(row_h, y0);
        ctx.stroke_rect(x0, y, inner_w, row_h);
        for (c, cell) in row.iter().take(cols).enumerate() {
            let x = (c as f64).mul_add(col_w, x0);
            let fitted = ellipsize(ctx, cell, (col_w - 6.0).max(1.0));
            ctx.fill_text(&fitted, x + 3.0, y + row_h * 0.5)?;
        }
    }
    // Column rules over the stroked rows.
    for c in 1..cols {
        let x = (c as f64).mul_add(col_w, x0);
        ctx.begin_path();
        ctx.move_to(x, y0);
        ctx.line_to(x, (rows as f64).mul_add(row_h, y0));
        ctx.stroke();
    }
    Ok(())
}

/// Centered placeholder for media kinds that render out of band.
fn draw_kind_label(
    ctx: &CanvasRenderingContext2d,
    note: &StickyNote,
    w: f64,
    h: f64,
) -> Result<(), JsValue> {
    ctx.set_fill_style_str("rgba(31, 26, 23, 0.5)");
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    ctx.set_font(&format!("{NOTE_FONT_PX}px sans-serif"));
    ctx.fill_text(kind_label(note.kind), note.x + w * 0.5, note.y + h * 0.5)?;
    Ok(())
}

fn kind_label(kind: NoteKind) -> &'static str {
    match kind {
        NoteKind::Text => "text",
        NoteKind::Image => "image",
        NoteKind::Audio => "audio",
        NoteKind::Table => "table",
        NoteKind::Drawing => "drawing",
    }
}

// =============================================================
// Selection UI
// =============================================================

fn draw_note_selection(
    ctx: &CanvasRenderingContext2d,
    note: &StickyNote,
    zoom: f64,
) -> Result<(), JsValue> {
    let r = note.rect();

    ctx.save();
    ctx.set_stroke_style_str("#1E90FF");
    ctx.set_line_width(1.0 / zoom);
    ctx.set_line_dash(&dash_array(SELECTION_DASH_PX / zoom))?;
    let pad = 2.0 / zoom;
    ctx.stroke_rect(r.x - pad, r.y - pad, r.w + pad * 2.0, r.h + pad * 2.0);
    ctx.set_line_dash(&js_sys::Array::new())?;
    ctx.restore();
    Ok(())
}

fn draw_point_handles(
    ctx: &CanvasRenderingContext2d,
    points: &[WorldPoint],
    zoom: f64,
) -> Result<(), JsValue> {
    if points.is_empty() {
        return Ok(());
    }
    let radius = HANDLE_RADIUS_PX * 0.5 / zoom;

    ctx.save();
    ctx.set_fill_style_str("#fff");
    ctx.set_stroke_style_str("#1E90FF");
    ctx.set_line_width(1.0 / zoom);
    for p in points {
        ctx.begin_path();
        ctx.arc(p.x, p.y, radius, 0.0, 2.0 * PI)?;
        ctx.fill();
        ctx.stroke();
    }
    ctx.restore();
    Ok(())
}

fn draw_lasso(ctx: &CanvasRenderingContext2d, rect: WorldRect, zoom: f64) -> Result<(), JsValue> {
    ctx.save();
    ctx.set_line_dash(&dash_array(SELECTION_DASH_PX / zoom))?;
    ctx.set_stroke_style_str("#1E90FF");
    ctx.set_fill_style_str("rgba(30, 144, 255, 0.12)");
    ctx.set_line_width(1.0 / zoom);
    ctx.fill_rect(rect.x, rect.y, rect.w, rect.h);
    ctx.stroke_rect(rect.x, rect.y, rect.w, rect.h);
    ctx.set_line_dash(&js_sys::Array::new())?;
    ctx.restore();
    Ok(())
}

// =============================================================
// Laser
// =============================================================

/// Stroke the laser trail segment by segment, newest opaque and the tail
/// fading out over the fade window.
fn draw_laser(ctx: &CanvasRenderingContext2d, core: &EngineCore, zoom: f64) {
    let trail = &core.ui.laser;
    if trail.len() < 2 {
        return;
    }
    ctx.save();
    ctx.set_stroke_style_str(LASER_COLOR);
    ctx.set_line_width(LASER_WIDTH_PX / zoom);
    ctx.set_line_cap("round");
    for pair in trail.windows(2) {
        let age = core.now_ms - pair[1].at_ms;
        ctx.set_global_alpha((1.0 - age / LASER_FADE_MS).clamp(0.0, 1.0));
        ctx.begin_path();
        ctx.move_to(pair[0].pos.x, pair[0].pos.y);
        ctx.line_to(pair[1].pos.x, pair[1].pos.y);
        ctx.stroke();
    }
    ctx.set_global_alpha(1.0);
    ctx.restore();
}

// =============================================================
// Text measurement
// =============================================================

/// Greedy word wrap against measured widths; words wider than a line are
/// broken by characters.
fn wrap_text(ctx: &CanvasRenderingContext2d, text: &str, max_w: f64) -> Vec<String> {
    let mut lines = Vec::new();
    for raw in text.lines() {
        let mut current = String::new();
        for word in raw.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_owned()
            } else {
                format!("{current} {word}")
            };
            if text_width(ctx, &candidate) <= max_w {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if text_width(ctx, word) <= max_w {
                current = word.to_owned();
                continue;
            }
            for ch in word.chars() {
                let mut grown = current.clone();
                grown.push(ch);
                if !current.is_empty() && text_width(ctx, &grown) > max_w {
                    lines.push(std::mem::take(&mut current));
                    current.push(ch);
                } else {
                    current = grown;
                }
            }
        }
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn ellipsize(ctx: &CanvasRenderingContext2d, text: &str, max_w: f64) -> String {
    if text_width(ctx, text) <= max_w {
        return text.to_owned();
    }
    let mut chars: Vec<char> = text.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let candidate = format!("{}...", chars.iter().collect::<String>().trim_end());
        if text_width(ctx, &candidate) <= max_w {
            return candidate;
        }
    }
    "...".to_owned()
}

fn text_width(ctx: &CanvasRenderingContext2d, text: &str) -> f64 {
    ctx.measure_text(text).map_or(f64::INFINITY, |m| m.width())
}

fn dash_array(len: f64) -> js_sys::Array {
    let arr = js_sys::Array::new();
    arr.push(&len.into());
    arr.push(&len.into());
    arr
}
