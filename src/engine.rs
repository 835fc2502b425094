//! The interaction controller: `EngineCore` holds all workspace state and
//! turns host events into mutations, history commits, and [`Action`]s;
//! `Engine` wraps it with the two canvas elements and the render entry point.
//!
//! Gesture protocol: pointer-down opens an [`InputState`] variant,
//! pointer-move applies live updates, pointer-up commits at most one history
//! snapshot. Aborting (Escape, tool switch) restores the last committed
//! snapshot instead, so a half-finished drag leaves no trace.

use std::collections::HashMap;

use thiserror::Error;
use wasm_bindgen::JsValue;
use web_sys::HtmlCanvasElement;

use crate::camera::{Camera, ScreenPoint, WorldPoint};
use crate::consts::{
    BOX_HIGHLIGHT_OPACITY, DRAG_THRESHOLD_PX, EMPHASIS_OPACITY, HIGHLIGHT_OPACITY, LASER_FADE_MS,
    MAGIC_ERASER_RADIUS, MAX_HISTORY, WHEEL_ZOOM_SENSITIVITY, ZOOM_STEP,
};
use crate::doc::{
    self, ConnectionId, DocLayout, NoteId, NoteKind, NoteStore, PageId, PageState, StickyNote,
    TextSection, WorkspaceRecord,
};
use crate::geom::{self, ConnectionStyle, WorldRect};
use crate::history::History;
use crate::hit;
use crate::ink::{AnnotationPath, ArrowKind, InkStore, PathKind};
use crate::input::{
    Button, ControlPointOwner, EraserMode, InputState, Key, LaserPoint, Modifiers, Tool, UiState,
    WheelDelta,
};
use crate::render;

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Screen-pixel breathing room around the document when fitting the viewport.
const DOC_FIT_MARGIN_PX: f64 = 48.0;

/// Errors surfaced at the host boundary.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A stored workspace could not be parsed.
    #[error("failed to decode workspace record: {0}")]
    RecordDecode(serde_json::Error),
    /// The workspace could not be serialized.
    #[error("failed to encode workspace record: {0}")]
    RecordEncode(serde_json::Error),
    /// The operation needs a loaded document.
    #[error("no document loaded")]
    DocumentNotLoaded,
}

/// Actions returned from event handlers for the host to process.
#[derive(Debug, Clone)]
pub enum Action {
    /// State changed in a way that needs a redraw.
    RenderNeeded,
    /// A history snapshot was committed; the host should schedule a save.
    AutosaveNeeded,
    /// The host should set the CSS cursor over the canvas.
    SetCursor(String),
    /// The host should open its editor overlay for the given note.
    EditNoteRequested { id: NoteId },
    /// The host should open a context menu at the given screen position.
    ContextMenuRequested { at: ScreenPoint },
}

/// One history entry: everything a gesture can change.
#[derive(Clone, Default)]
struct Snapshot {
    ink: HashMap<PageId, Vec<AnnotationPath>>,
    pages: HashMap<PageId, PageState>,
    sections: Vec<TextSection>,
}

/// Core engine state — all logic that doesn't depend on the canvas elements.
///
/// Separated from `Engine` so it can be tested without WASM/browser
/// dependencies.
pub struct EngineCore {
    pub ink: InkStore,
    pub notes: NoteStore,
    pub camera: Camera,
    pub ui: UiState,
    pub input: InputState,
    /// Placement of the loaded document, if any.
    pub layout: Option<DocLayout>,
    /// Current page, 1-based.
    pub page: PageId,
    pub page_count: u32,
    history: History<Snapshot>,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub dpr: f64,
    /// Latest host timestamp, advanced by `on_frame` and `on_wheel`.
    pub now_ms: f64,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self {
            ink: InkStore::new(),
            notes: NoteStore::new(),
            camera: Camera::default(),
            ui: UiState::default(),
            input: InputState::default(),
            layout: None,
            page: 1,
            page_count: 1,
            history: History::new(Snapshot::default(), MAX_HISTORY),
            viewport_width: 0.0,
            viewport_height: 0.0,
            dpr: 1.0,
            now_ms: 0.0,
        }
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Document lifecycle ---

    /// Place a decoded document on the canvas and fit the viewport to it.
    /// Resets to page 1.
    pub fn load_document(
        &mut self,
        page_count: u32,
        page_width: f64,
        page_height: f64,
    ) -> Vec<Action> {
        let layout = DocLayout::centered(page_width, page_height);
        self.layout = Some(layout);
        self.page_count = page_count.max(1);
        self.page = 1;
        self.camera.fit_to(
            layout.rect().center(),
            layout.width,
            layout.height,
            self.viewport_width,
            self.viewport_height,
            DOC_FIT_MARGIN_PX,
        );
        self.ink.schedule_rescale(self.camera.zoom, self.now_ms);
        self.ink.invalidate();
        vec![Action::RenderNeeded]
    }

    /// Switch to another page of the loaded document, clamped to the valid
    /// range. Aborts any in-progress gesture and clears the selection.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::DocumentNotLoaded`] when no document is loaded.
    pub fn set_page(&mut self, page: PageId) -> Result<Vec<Action>, EngineError> {
        if self.layout.is_none() {
            return Err(EngineError::DocumentNotLoaded);
        }
        let mut actions = self.abort_gesture();
        let clamped = page.clamp(1, self.page_count);
        if clamped != self.page {
            self.page = clamped;
            self.ui.selected_notes.clear();
            self.ui.selected_connection = None;
            self.ink.invalidate();
            actions.push(Action::RenderNeeded);
        }
        Ok(actions)
    }

    /// Remove every ink path on the current page in one undoable step.
    pub fn clear_page(&mut self) -> Vec<Action> {
        let mut actions = self.abort_gesture();
        if self.ink.clear_page(self.page) > 0 {
            actions.extend(self.commit_with_render());
        }
        actions
    }

    // --- Persistence ---

    /// The serializable shape of the whole workspace.
    #[must_use]
    pub fn record(&self) -> WorkspaceRecord {
        let (pages, sections) = self.notes.snapshot();
        let mut sticky_notes = HashMap::new();
        let mut note_connections = HashMap::new();
        for (page, state) in pages {
            if !state.notes.is_empty() {
                sticky_notes.insert(page, state.notes);
            }
            if !state.connections.is_empty() {
                note_connections.insert(page, state.connections);
            }
        }
        WorkspaceRecord {
            annotations: self.ink.snapshot(),
            sticky_notes,
            note_connections,
            text_sections: sections,
        }
    }

    /// Replace the workspace from a stored record and restart history there.
    pub fn load_record(&mut self, record: WorkspaceRecord) -> Vec<Action> {
        let mut pages: HashMap<PageId, PageState> = HashMap::new();
        for (page, notes) in record.sticky_notes {
            pages.entry(page).or_default().notes = notes;
        }
        for (page, connections) in record.note_connections {
            pages.entry(page).or_default().connections = connections;
        }
        self.notes.restore(pages, record.text_sections);
        self.ink.restore(record.annotations);
        self.ui.selected_notes.clear();
        self.ui.selected_connection = None;
        self.ui.lasso = None;
        self.ui.link_preview = None;
        self.input = InputState::Idle;
        self.history.reset(self.snapshot());
        vec![Action::RenderNeeded]
    }

    /// [`Self::record`] as a JSON string for the wasm boundary.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::RecordEncode`] when serialization fails.
    pub fn record_json(&self) -> Result<String, EngineError> {
        serde_json::to_string(&self.record()).map_err(EngineError::RecordEncode)
    }

    /// [`Self::load_record`] from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::RecordDecode`] when the JSON does not parse.
    pub fn load_record_json(&mut self, json: &str) -> Result<Vec<Action>, EngineError> {
        let record: WorkspaceRecord =
            serde_json::from_str(json).map_err(EngineError::RecordDecode)?;
        Ok(self.load_record(record))
    }

    /// Smallest world rectangle covering the document and every annotation on
    /// the current page, expanded by `padding`. `None` when there is nothing
    /// to export.
    #[must_use]
    pub fn export_bounds(&self, padding: f64) -> Option<WorldRect> {
        let mut bounds: Option<WorldRect> = self.layout.map(|l| l.rect());
        let mut grow = |r: WorldRect| {
            bounds = Some(match bounds {
                Some(b) => b.union(r),
                None => r,
            });
        };
        for note in self.notes.notes(self.page) {
            grow(note.rect());
        }
        for path in self.ink.paths(self.page) {
            if let Some(b) = path.bbox() {
                grow(b);
            }
        }
        bounds.map(|b| b.expand(padding))
    }

    // --- Tool / style configuration ---

    /// Switch the active tool, aborting any in-progress gesture first.
    pub fn set_tool(&mut self, tool: Tool) -> Vec<Action> {
        if self.ui.tool == tool {
            return Vec::new();
        }
        let mut actions = self.abort_gesture();
        self.ui.tool = tool;
        actions.push(Action::RenderNeeded);
        actions
    }

    pub fn set_eraser_mode(&mut self, mode: EraserMode) {
        self.ui.eraser_mode = mode;
    }

    /// Set the stroke color and width for pen and shape tools.
    pub fn set_pen(&mut self, color: String, width: f64) {
        self.ui.stroke_color = color;
        self.ui.stroke_width = width.max(0.5);
    }

    /// Set the fill color and content kind for newly placed notes.
    pub fn set_note_defaults(&mut self, color: String, kind: NoteKind) {
        self.ui.note_color = color;
        self.ui.note_kind = kind;
    }

    /// Set the default connector color, restyling the selected connector and
    /// the selected notes' anchor links in one undoable step.
    pub fn set_connection_color(&mut self, color: String) -> Vec<Action> {
        self.ui.connection_color = color.clone();
        let mut changed = false;
        if let Some(cid) = self.ui.selected_connection {
            if let Some(conn) = self.notes.connection_mut(self.page, cid) {
                if conn.color != color {
                    conn.color = color.clone();
                    changed = true;
                }
            }
        }
        for id in self.ui.selected_notes.clone() {
            if let Some(note) = self.notes.note_mut(self.page, id) {
                if note.connection_color != color {
                    note.connection_color = color.clone();
                    changed = true;
                }
            }
        }
        if changed { self.commit_with_render() } else { Vec::new() }
    }

    /// Set the default routing style, restyling the selected connector and
    /// the selected notes' anchor links in one undoable step.
    pub fn set_connection_style(&mut self, style: ConnectionStyle) -> Vec<Action> {
        self.ui.connection_style = style;
        let mut changed = false;
        if let Some(cid) = self.ui.selected_connection {
            if let Some(conn) = self.notes.connection_mut(self.page, cid) {
                if conn.style != style {
                    conn.style = style;
                    changed = true;
                }
            }
        }
        for id in self.ui.selected_notes.clone() {
            if let Some(note) = self.notes.note_mut(self.page, id) {
                if note.connection_style != style {
                    note.connection_style = style;
                    changed = true;
                }
            }
        }
        if changed { self.commit_with_render() } else { Vec::new() }
    }

    // --- Note edits from the host ---

    /// Replace a note's text body. No-op (and no commit) when unchanged.
    pub fn set_note_text(&mut self, id: NoteId, text: String) -> Vec<Action> {
        let Some(note) = self.notes.note_mut(self.page, id) else {
            return Vec::new();
        };
        if note.text == text {
            return Vec::new();
        }
        note.text = text;
        self.commit_with_render()
    }

    /// Recolor a note card.
    pub fn set_note_color(&mut self, id: NoteId, color: String) -> Vec<Action> {
        let Some(note) = self.notes.note_mut(self.page, id) else {
            return Vec::new();
        };
        if note.color == color {
            return Vec::new();
        }
        note.color = color;
        self.commit_with_render()
    }

    /// Collapse a note to its minimized square or expand it back.
    pub fn set_note_minimized(&mut self, id: NoteId, minimized: bool) -> Vec<Action> {
        let Some(note) = self.notes.note_mut(self.page, id) else {
            return Vec::new();
        };
        if note.minimized == minimized {
            return Vec::new();
        }
        note.minimized = minimized;
        self.commit_with_render()
    }

    /// Replace a table note's cell grid.
    pub fn set_note_table(&mut self, id: NoteId, table: Option<Vec<Vec<String>>>) -> Vec<Action> {
        let Some(note) = self.notes.note_mut(self.page, id) else {
            return Vec::new();
        };
        if note.table == table {
            return Vec::new();
        }
        note.table = table;
        self.commit_with_render()
    }

    // --- Viewport ---

    /// Update viewport dimensions and device pixel ratio.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) -> Vec<Action> {
        self.viewport_width = width_css;
        self.viewport_height = height_css;
        self.dpr = dpr;
        vec![Action::RenderNeeded]
    }

    pub fn zoom_in(&mut self) -> Vec<Action> {
        self.zoom_step(ZOOM_STEP)
    }

    pub fn zoom_out(&mut self) -> Vec<Action> {
        self.zoom_step(1.0 / ZOOM_STEP)
    }

    fn zoom_step(&mut self, factor: f64) -> Vec<Action> {
        let center = ScreenPoint::new(self.viewport_width * 0.5, self.viewport_height * 0.5);
        self.camera.zoom_at(factor, center);
        self.ink.schedule_rescale(self.camera.zoom, self.now_ms);
        vec![Action::RenderNeeded]
    }

    // --- Pointer events ---

    pub fn on_pointer_down(
        &mut self,
        screen_pt: ScreenPoint,
        button: Button,
        modifiers: Modifiers,
    ) -> Vec<Action> {
        // A second button mid-gesture is ignored.
        if !matches!(self.input, InputState::Idle) {
            return Vec::new();
        }
        if matches!(button, Button::Middle | Button::Secondary) {
            self.input = InputState::Panning { last_screen: screen_pt, travel: 0.0, button };
            return self.cursor_action("grabbing").into_iter().collect();
        }

        let world = self.camera.screen_to_world(screen_pt);
        match self.ui.tool {
            Tool::Select => self.select_pointer_down(world, modifiers),
            Tool::Note => self.place_note(world),
            Tool::Laser => {
                self.ui.laser.push(LaserPoint { pos: world, at_ms: self.now_ms });
                self.input = InputState::Lasering;
                vec![Action::RenderNeeded]
            }
            Tool::Eraser if self.ui.eraser_mode == EraserMode::Magic => {
                let removed = self.ink.magic_erase(self.page, world, MAGIC_ERASER_RADIUS);
                self.input = InputState::ErasingPaths { removed };
                if removed > 0 { vec![Action::RenderNeeded] } else { Vec::new() }
            }
            tool => self.begin_ink(tool, world),
        }
    }

    pub fn on_pointer_move(
        &mut self,
        screen_pt: ScreenPoint,
        _modifiers: Modifiers,
    ) -> Vec<Action> {
        let world = self.camera.screen_to_world(screen_pt);
        match self.input.clone() {
            InputState::Idle => {
                let cursor = self.hover_cursor(world);
                self.cursor_action(cursor).into_iter().collect()
            }
            InputState::Panning { last_screen, travel, button } => {
                let dx = screen_pt.x - last_screen.x;
                let dy = screen_pt.y - last_screen.y;
                self.camera.pan_by(dx, dy);
                self.input = InputState::Panning {
                    last_screen: screen_pt,
                    travel: travel + dx.hypot(dy),
                    button,
                };
                vec![Action::RenderNeeded]
            }
            InputState::Lasso { anchor_world, prior } => {
                let rect = WorldRect::from_corners(anchor_world, world);
                let mut selection = prior.clone();
                for id in hit::notes_in_rect(&self.notes, self.page, rect) {
                    if !selection.contains(&id) {
                        selection.push(id);
                    }
                }
                self.ui.lasso = Some(rect);
                self.ui.selected_notes = selection;
                self.input = InputState::Lasso { anchor_world, prior };
                vec![Action::RenderNeeded]
            }
            InputState::DraggingNotes { start_world, origins, moved, pressed } => {
                let dx = world.x - start_world.x;
                let dy = world.y - start_world.y;
                let screen_travel = (dx * self.camera.zoom).hypot(dy * self.camera.zoom);
                if !moved && screen_travel < DRAG_THRESHOLD_PX {
                    return Vec::new();
                }
                for (id, ox, oy) in &origins {
                    if let Some(note) = self.notes.note_mut(self.page, *id) {
                        note.x = ox + dx;
                        note.y = oy + dy;
                    }
                }
                self.input =
                    InputState::DraggingNotes { start_world, origins, moved: true, pressed };
                vec![Action::RenderNeeded]
            }
            InputState::DraggingControlPoint { owner, index, .. } => {
                match owner {
                    ControlPointOwner::Connection(cid) => {
                        if let Some(conn) = self.notes.connection_mut(self.page, cid) {
                            if let Some(p) = conn.control_points.get_mut(index) {
                                *p = world;
                            }
                        }
                    }
                    ControlPointOwner::Anchor(nid) => {
                        if let Some(note) = self.notes.note_mut(self.page, nid) {
                            if let Some(p) = note.anchor_points.get_mut(index) {
                                *p = world;
                            }
                        }
                    }
                }
                self.input = InputState::DraggingControlPoint { owner, index, moved: true };
                vec![Action::RenderNeeded]
            }
            InputState::DraggingAnchorEnd { note, .. } => {
                let anchor = self.layout.and_then(|l| l.anchor_at(world));
                if let Some(n) = self.notes.note_mut(self.page, note) {
                    n.anchor = anchor;
                }
                self.input = InputState::DraggingAnchorEnd { note, moved: true };
                vec![Action::RenderNeeded]
            }
            InputState::Linking { .. } => {
                if let Some(preview) = self.ui.link_preview.as_mut() {
                    preview.1 = world;
                }
                vec![Action::RenderNeeded]
            }
            InputState::Stroking => {
                self.ink.extend_stroke(world);
                vec![Action::RenderNeeded]
            }
            InputState::DrawingShape => {
                self.ink.update_shape(world);
                vec![Action::RenderNeeded]
            }
            InputState::ErasingPaths { removed } => {
                let hits = self.ink.magic_erase(self.page, world, MAGIC_ERASER_RADIUS);
                self.input = InputState::ErasingPaths { removed: removed + hits };
                if hits > 0 { vec![Action::RenderNeeded] } else { Vec::new() }
            }
            InputState::Lasering => {
                self.ui.laser.push(LaserPoint { pos: world, at_ms: self.now_ms });
                vec![Action::RenderNeeded]
            }
        }
    }

    pub fn on_pointer_up(
        &mut self,
        screen_pt: ScreenPoint,
        _button: Button,
        modifiers: Modifiers,
    ) -> Vec<Action> {
        let world = self.camera.screen_to_world(screen_pt);
        match self.input.clone() {
            InputState::Idle => Vec::new(),
            InputState::Panning { travel, button, .. } => {
                self.input = InputState::Idle;
                let mut actions: Vec<Action> = self.cursor_action("default").into_iter().collect();
                if button == Button::Secondary && travel < DRAG_THRESHOLD_PX {
                    actions.push(Action::ContextMenuRequested { at: screen_pt });
                }
                actions
            }
            InputState::Lasso { .. } => {
                // Selection was applied live; just drop the rectangle.
                self.ui.lasso = None;
                self.input = InputState::Idle;
                vec![Action::RenderNeeded]
            }
            InputState::DraggingNotes { moved, pressed, .. } => {
                self.input = InputState::Idle;
                if moved || self.ui.tool == Tool::Note {
                    return self.commit_with_render();
                }
                // A plain click on a multi-selection collapses it to the
                // pressed note; shift-clicks already toggled on the way down.
                if !modifiers.shift && self.ui.selected_notes.len() > 1 {
                    self.ui.selected_notes = vec![pressed];
                    return vec![Action::RenderNeeded];
                }
                Vec::new()
            }
            InputState::DraggingControlPoint { moved, .. }
            | InputState::DraggingAnchorEnd { moved, .. } => {
                self.input = InputState::Idle;
                if moved { self.commit_with_render() } else { Vec::new() }
            }
            InputState::Linking { from } => self.finish_link(from, world),
            InputState::Stroking => {
                self.input = InputState::Idle;
                match self.ink.finish_stroke() {
                    Some(_) => self.commit_with_render(),
                    None => {
                        log::debug!("dropped stroke with fewer than two points");
                        vec![Action::RenderNeeded]
                    }
                }
            }
            InputState::DrawingShape => {
                self.input = InputState::Idle;
                match self.ink.finish_shape() {
                    Some(_) => self.commit_with_render(),
                    None => {
                        log::debug!("dropped shape under the minimum extent");
                        vec![Action::RenderNeeded]
                    }
                }
            }
            InputState::ErasingPaths { removed } => {
                self.input = InputState::Idle;
                if removed > 0 { self.commit_with_render() } else { Vec::new() }
            }
            InputState::Lasering => {
                // The trail outlives the gesture and decays on frame ticks.
                self.input = InputState::Idle;
                Vec::new()
            }
        }
    }

    /// Double-press: expand a minimized note, open the note editor, or edit
    /// connector waypoints.
    pub fn on_double_click(
        &mut self,
        screen_pt: ScreenPoint,
        _modifiers: Modifiers,
    ) -> Vec<Action> {
        if self.ui.tool != Tool::Select {
            return Vec::new();
        }
        let world = self.camera.screen_to_world(screen_pt);

        if let Some(id) = hit::note_at(&self.notes, self.page, world) {
            let Some(note) = self.notes.note_mut(self.page, id) else {
                return Vec::new();
            };
            if note.minimized {
                note.minimized = false;
                return self.commit_with_render();
            }
            return match note.kind {
                NoteKind::Text | NoteKind::Table => vec![Action::EditNoteRequested { id }],
                _ => Vec::new(),
            };
        }

        // On the selected connector, a double-press removes the waypoint
        // under the pointer.
        if let Some(cid) = self.ui.selected_connection {
            if let Some(conn) = self.notes.connection(self.page, cid) {
                if let Some(index) = hit::connection_point_at(conn, &self.camera, world) {
                    if let Some(conn) = self.notes.connection_mut(self.page, cid) {
                        conn.control_points.remove(index);
                    }
                    return self.commit_with_render();
                }
            }
        }

        // Anywhere on a connector's line, a double-press splices in a new
        // waypoint at the nearest span.
        if let Some(cid) = hit::connection_at(&self.notes, self.page, &self.camera, world) {
            let Some(conn) = self.notes.connection(self.page, cid) else {
                return Vec::new();
            };
            let (Some(start), Some(end)) = (
                self.notes.note_center(self.page, conn.source),
                self.notes.note_center(self.page, conn.target),
            ) else {
                return Vec::new();
            };
            let index = geom::best_insertion_index(start, &conn.control_points, end, world);
            if let Some(conn) = self.notes.connection_mut(self.page, cid) {
                conn.control_points.insert(index, world);
            }
            self.ui.selected_connection = Some(cid);
            self.ui.selected_notes.clear();
            return self.commit_with_render();
        }

        // Same for a note's anchor link.
        if let Some(id) = hit::anchor_link_at(&self.notes, self.page, self.layout, &self.camera, world)
        {
            let Some(layout) = self.layout else {
                return Vec::new();
            };
            let Some(note) = self.notes.note(self.page, id) else {
                return Vec::new();
            };
            if let Some(index) = hit::anchor_point_at(note, &self.camera, world) {
                if let Some(note) = self.notes.note_mut(self.page, id) {
                    note.anchor_points.remove(index);
                }
                return self.commit_with_render();
            }
            let Some(anchor) = note.anchor else {
                return Vec::new();
            };
            let index = geom::best_insertion_index(
                note.center(),
                &note.anchor_points,
                layout.anchor_pos(anchor),
                world,
            );
            if let Some(note) = self.notes.note_mut(self.page, id) {
                note.anchor_points.insert(index, world);
            }
            self.ui.selected_notes = vec![id];
            self.ui.selected_connection = None;
            return self.commit_with_render();
        }

        Vec::new()
    }

    // --- Wheel / keyboard / frame ---

    pub fn on_wheel(
        &mut self,
        screen_pt: ScreenPoint,
        delta: WheelDelta,
        modifiers: Modifiers,
        now_ms: f64,
    ) -> Vec<Action> {
        self.now_ms = now_ms;
        if modifiers.ctrl || modifiers.meta {
            let factor = (-delta.dy * WHEEL_ZOOM_SENSITIVITY).exp();
            self.camera.zoom_at(factor, screen_pt);
            self.ink.schedule_rescale(self.camera.zoom, now_ms);
        } else {
            self.camera.pan_by(-delta.dx, -delta.dy);
        }
        vec![Action::RenderNeeded]
    }

    pub fn on_key_down(&mut self, key: Key, modifiers: Modifiers) -> Vec<Action> {
        let primary = modifiers.ctrl || modifiers.meta;
        match key.0.as_str() {
            "Delete" | "Backspace" => self.delete_selection(),
            "Escape" => {
                let actions = self.abort_gesture();
                if !actions.is_empty() {
                    return actions;
                }
                if self.ui.selected_notes.is_empty() && self.ui.selected_connection.is_none() {
                    return Vec::new();
                }
                self.ui.selected_notes.clear();
                self.ui.selected_connection = None;
                vec![Action::RenderNeeded]
            }
            "z" | "Z" if primary && modifiers.shift => self.redo(),
            "z" | "Z" if primary => self.undo(),
            "y" | "Y" if primary => self.redo(),
            _ => Vec::new(),
        }
    }

    /// Per-frame tick: applies the debounced raster rescale and decays the
    /// laser trail.
    pub fn on_frame(&mut self, now_ms: f64) -> Vec<Action> {
        self.now_ms = now_ms;
        let mut render = self.ink.tick(now_ms);
        if !self.ui.laser.is_empty() {
            self.ui.laser.retain(|p| now_ms - p.at_ms < LASER_FADE_MS);
            // Fading is continuous, so keep redrawing until the trail is gone.
            render = true;
        }
        if render { vec![Action::RenderNeeded] } else { Vec::new() }
    }

    // --- Editing commands ---

    /// Delete the selected notes (cascading to their connectors) and the
    /// selected connector in one undoable step.
    pub fn delete_selection(&mut self) -> Vec<Action> {
        let mut deleted = false;
        for id in std::mem::take(&mut self.ui.selected_notes) {
            if self.notes.remove_note(self.page, id).is_some() {
                deleted = true;
            }
        }
        if let Some(cid) = self.ui.selected_connection.take() {
            if self.notes.remove_connection(self.page, cid).is_some() {
                deleted = true;
            }
        }
        if deleted { self.commit_with_render() } else { Vec::new() }
    }

    pub fn undo(&mut self) -> Vec<Action> {
        let mut actions = self.abort_gesture();
        let Some(snap) = self.history.undo() else {
            return actions;
        };
        self.restore(snap);
        actions.push(Action::AutosaveNeeded);
        actions.push(Action::RenderNeeded);
        actions
    }

    pub fn redo(&mut self) -> Vec<Action> {
        let mut actions = self.abort_gesture();
        let Some(snap) = self.history.redo() else {
            return actions;
        };
        self.restore(snap);
        actions.push(Action::AutosaveNeeded);
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Cancel the in-progress gesture without committing. Gestures that
    /// mutate state during motion are rolled back to the last committed
    /// snapshot.
    pub fn abort_gesture(&mut self) -> Vec<Action> {
        match std::mem::take(&mut self.input) {
            InputState::Idle => Vec::new(),
            InputState::Panning { .. } => self.cursor_action("default").into_iter().collect(),
            InputState::Lasso { prior, .. } => {
                self.ui.lasso = None;
                self.ui.selected_notes = prior;
                vec![Action::RenderNeeded]
            }
            InputState::Linking { .. } => {
                self.ui.link_preview = None;
                vec![Action::RenderNeeded]
            }
            InputState::Stroking | InputState::DrawingShape => {
                if self.ink.cancel_active() {
                    vec![Action::RenderNeeded]
                } else {
                    Vec::new()
                }
            }
            InputState::Lasering => Vec::new(),
            InputState::DraggingNotes { .. }
            | InputState::DraggingControlPoint { .. }
            | InputState::DraggingAnchorEnd { .. }
            | InputState::ErasingPaths { .. } => {
                let snap = self.history.current();
                self.restore(snap);
                vec![Action::RenderNeeded]
            }
        }
    }

    // --- Queries ---

    /// Ids of the selected notes, in selection order.
    #[must_use]
    pub fn selection(&self) -> &[NoteId] {
        &self.ui.selected_notes
    }

    #[must_use]
    pub fn selected_connection(&self) -> Option<ConnectionId> {
        self.ui.selected_connection
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    // --- Gesture internals ---

    fn select_pointer_down(&mut self, world: WorldPoint, modifiers: Modifiers) -> Vec<Action> {
        // Waypoint handles of the selected connector take precedence.
        if let Some(cid) = self.ui.selected_connection {
            if let Some(conn) = self.notes.connection(self.page, cid) {
                if let Some(index) = hit::connection_point_at(conn, &self.camera, world) {
                    self.input = InputState::DraggingControlPoint {
                        owner: ControlPointOwner::Connection(cid),
                        index,
                        moved: false,
                    };
                    return vec![Action::RenderNeeded];
                }
            }
        }

        // Then the anchor-link handles of selected notes.
        for id in self.ui.selected_notes.clone() {
            let Some(note) = self.notes.note(self.page, id) else {
                continue;
            };
            if let Some(index) = hit::anchor_point_at(note, &self.camera, world) {
                self.input = InputState::DraggingControlPoint {
                    owner: ControlPointOwner::Anchor(id),
                    index,
                    moved: false,
                };
                return vec![Action::RenderNeeded];
            }
            if hit::anchor_end_at(note, self.layout, &self.camera, world) {
                self.input = InputState::DraggingAnchorEnd { note: id, moved: false };
                return vec![Action::RenderNeeded];
            }
        }

        if let Some(from) = hit::link_handle_at(&self.notes, self.page, &self.camera, world) {
            let start = self
                .notes
                .note(self.page, from)
                .map_or(world, hit::link_handle_pos);
            self.ui.link_preview = Some((start, world));
            self.input = InputState::Linking { from };
            return vec![Action::RenderNeeded];
        }

        if let Some(id) = hit::note_at(&self.notes, self.page, world) {
            return self.begin_note_drag(id, world, modifiers);
        }

        if let Some(cid) = hit::connection_at(&self.notes, self.page, &self.camera, world) {
            self.ui.selected_connection = Some(cid);
            self.ui.selected_notes.clear();
            return vec![Action::RenderNeeded];
        }

        if let Some(id) =
            hit::anchor_link_at(&self.notes, self.page, self.layout, &self.camera, world)
        {
            self.ui.selected_notes = vec![id];
            self.ui.selected_connection = None;
            return vec![Action::RenderNeeded];
        }

        // Empty space: lasso. With shift the current selection is kept and
        // extended.
        let prior = if modifiers.shift {
            self.ui.selected_notes.clone()
        } else {
            self.ui.selected_notes.clear();
            Vec::new()
        };
        self.ui.selected_connection = None;
        self.ui.lasso = Some(WorldRect::from_corners(world, world));
        self.input = InputState::Lasso { anchor_world: world, prior };
        vec![Action::RenderNeeded]
    }

    fn begin_note_drag(
        &mut self,
        id: NoteId,
        world: WorldPoint,
        modifiers: Modifiers,
    ) -> Vec<Action> {
        self.ui.selected_connection = None;
        if modifiers.shift {
            if let Some(pos) = self.ui.selected_notes.iter().position(|n| *n == id) {
                // Shift-press on a selected note deselects it; no drag.
                self.ui.selected_notes.remove(pos);
                return vec![Action::RenderNeeded];
            }
            self.ui.selected_notes.push(id);
        } else if !self.ui.selected_notes.contains(&id) {
            self.ui.selected_notes = vec![id];
        }
        let origins = self
            .ui
            .selected_notes
            .iter()
            .filter_map(|nid| self.notes.note(self.page, *nid).map(|n| (*nid, n.x, n.y)))
            .collect();
        self.input = InputState::DraggingNotes {
            start_world: world,
            origins,
            moved: false,
            pressed: id,
        };
        vec![Action::RenderNeeded]
    }

    /// Place a new note centered under the pointer, anchoring it when it
    /// lands on the document. The placement commits on release so the note
    /// can be dragged into position as part of the same gesture.
    fn place_note(&mut self, world: WorldPoint) -> Vec<Action> {
        let kind = self.ui.note_kind;
        let (w, h) = doc::note_size(kind, false);
        let note = StickyNote {
            id: uuid::Uuid::new_v4(),
            page: self.page,
            kind,
            x: world.x - w * 0.5,
            y: world.y - h * 0.5,
            text: String::new(),
            media_url: None,
            table: None,
            minimized: false,
            anchor: self.layout.and_then(|l| l.anchor_at(world)),
            anchor_points: Vec::new(),
            color: self.ui.note_color.clone(),
            connection_color: self.ui.connection_color.clone(),
            connection_style: self.ui.connection_style,
        };
        let id = note.id;
        let origin = (id, note.x, note.y);
        self.notes.insert_note(note);
        self.ui.selected_notes = vec![id];
        self.ui.selected_connection = None;
        self.input = InputState::DraggingNotes {
            start_world: world,
            origins: vec![origin],
            moved: false,
            pressed: id,
        };
        vec![Action::RenderNeeded]
    }

    fn begin_ink(&mut self, tool: Tool, world: WorldPoint) -> Vec<Action> {
        let Some(kind) = tool.path_kind() else {
            return Vec::new();
        };
        let (color, width, opacity) = self.ink_style(kind);
        if kind.is_freehand() {
            self.ink.begin_stroke(self.page, kind, color, width, opacity, world);
            self.input = InputState::Stroking;
        } else {
            let arrow = (kind == PathKind::Arrow).then_some(ArrowKind::Single);
            self.ink.begin_shape(self.page, kind, color, width, opacity, arrow, world);
            self.input = InputState::DrawingShape;
        }
        vec![Action::RenderNeeded]
    }

    fn ink_style(&self, kind: PathKind) -> (String, f64, f64) {
        match kind {
            PathKind::Highlighter => (
                self.ui.stroke_color.clone(),
                self.ui.highlighter_width,
                HIGHLIGHT_OPACITY,
            ),
            PathKind::Eraser => ("#000".into(), self.ui.eraser_width, 1.0),
            PathKind::Emphasis => (
                self.ui.stroke_color.clone(),
                self.ui.highlighter_width,
                EMPHASIS_OPACITY,
            ),
            PathKind::BoxHighlight => (
                self.ui.stroke_color.clone(),
                self.ui.stroke_width,
                BOX_HIGHLIGHT_OPACITY,
            ),
            _ => (self.ui.stroke_color.clone(), self.ui.stroke_width, 1.0),
        }
    }

    /// Resolve a finished link drag: connect to the note under the pointer,
    /// or re-anchor to the document, or do nothing.
    fn finish_link(&mut self, from: NoteId, world: WorldPoint) -> Vec<Action> {
        self.ui.link_preview = None;
        self.input = InputState::Idle;

        if let Some(target) = hit::note_at(&self.notes, self.page, world) {
            if target != from {
                let color = self.ui.connection_color.clone();
                let style = self.ui.connection_style;
                if self
                    .notes
                    .link_notes(self.page, from, target, color, style)
                    .is_some()
                {
                    return self.commit_with_render();
                }
            }
            // Self-link or duplicate: nothing to commit.
            return vec![Action::RenderNeeded];
        }

        if let Some(anchor) = self.layout.and_then(|l| l.anchor_at(world)) {
            if let Some(note) = self.notes.note_mut(self.page, from) {
                note.anchor = Some(anchor);
                note.anchor_points.clear();
                return self.commit_with_render();
            }
        }

        vec![Action::RenderNeeded]
    }

    fn hover_cursor(&self, world: WorldPoint) -> &'static str {
        match self.ui.tool {
            Tool::Select => {
                if hit::link_handle_at(&self.notes, self.page, &self.camera, world).is_some() {
                    "crosshair"
                } else if hit::note_at(&self.notes, self.page, world).is_some() {
                    "move"
                } else if hit::connection_at(&self.notes, self.page, &self.camera, world).is_some()
                {
                    "pointer"
                } else {
                    "default"
                }
            }
            Tool::Laser => "none",
            _ => "crosshair",
        }
    }

    fn cursor_action(&mut self, cursor: &str) -> Option<Action> {
        if self.ui.cursor == cursor {
            return None;
        }
        self.ui.cursor = cursor.to_owned();
        Some(Action::SetCursor(cursor.to_owned()))
    }

    // --- History internals ---

    fn snapshot(&self) -> Snapshot {
        let (pages, sections) = self.notes.snapshot();
        Snapshot { ink: self.ink.snapshot(), pages, sections }
    }

    fn restore(&mut self, snap: Snapshot) {
        self.ink.restore(snap.ink);
        self.notes.restore(snap.pages, snap.sections);
        self.prune_selection();
    }

    fn prune_selection(&mut self) {
        let page = self.page;
        self.ui.selected_notes.retain(|id| self.notes.note(page, *id).is_some());
        if let Some(cid) = self.ui.selected_connection {
            if self.notes.connection(page, cid).is_none() {
                self.ui.selected_connection = None;
            }
        }
    }

    /// Record the current state as one undo step. Every caller is the end of
    /// a completed structural change.
    fn commit(&mut self) -> Vec<Action> {
        let dropped = self.notes.retain_valid_connections(self.page);
        if dropped > 0 {
            log::warn!("dropped {dropped} dangling connections before commit");
        }
        self.history.commit(self.snapshot());
        vec![Action::AutosaveNeeded]
    }

    fn commit_with_render(&mut self) -> Vec<Action> {
        let mut actions = self.commit();
        actions.push(Action::RenderNeeded);
        actions
    }
}

/// The full engine. Wraps [`EngineCore`] and owns the display canvas plus the
/// offscreen ink cache canvas.
pub struct Engine {
    canvas: HtmlCanvasElement,
    ink_canvas: HtmlCanvasElement,
    pub core: EngineCore,
}

impl Engine {
    /// Create an engine bound to the display canvas and an offscreen canvas
    /// for the ink raster cache (both created by the host).
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement, ink_canvas: HtmlCanvasElement) -> Self {
        Self { canvas, ink_canvas, core: EngineCore::new() }
    }

    // --- Viewport ---

    /// Update viewport dimensions, resizing the display canvas backing store.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) -> Vec<Action> {
        let actions = self.core.set_viewport(width_css, height_css, dpr);
        self.canvas.set_width((width_css * dpr).max(1.0) as u32);
        self.canvas.set_height((height_css * dpr).max(1.0) as u32);
        actions
    }

    // --- Render ---

    /// Apply queued raster ops to the ink cache and draw the scene.
    ///
    /// # Errors
    ///
    /// Returns `Err` if any `Canvas2D` call fails.
    pub fn render(&mut self) -> Result<(), JsValue> {
        let ops = self.core.ink.take_ops();
        let ctx = render::context_2d(&self.canvas)?;
        let ink_ctx = render::context_2d(&self.ink_canvas)?;
        render::draw(&ctx, &ink_ctx, &self.ink_canvas, &self.core, &ops)
    }

    // --- Delegated document lifecycle ---

    pub fn load_document(
        &mut self,
        page_count: u32,
        page_width: f64,
        page_height: f64,
    ) -> Vec<Action> {
        self.core.load_document(page_count, page_width, page_height)
    }

    /// # Errors
    ///
    /// Returns [`EngineError::DocumentNotLoaded`] when no document is loaded.
    pub fn set_page(&mut self, page: PageId) -> Result<Vec<Action>, EngineError> {
        self.core.set_page(page)
    }

    pub fn clear_page(&mut self) -> Vec<Action> {
        self.core.clear_page()
    }

    // --- Delegated persistence ---

    #[must_use]
    pub fn record(&self) -> WorkspaceRecord {
        self.core.record()
    }

    pub fn load_record(&mut self, record: WorkspaceRecord) -> Vec<Action> {
        self.core.load_record(record)
    }

    /// # Errors
    ///
    /// Returns [`EngineError::RecordEncode`] when serialization fails.
    pub fn record_json(&self) -> Result<String, EngineError> {
        self.core.record_json()
    }

    /// # Errors
    ///
    /// Returns [`EngineError::RecordDecode`] when the JSON does not parse.
    pub fn load_record_json(&mut self, json: &str) -> Result<Vec<Action>, EngineError> {
        self.core.load_record_json(json)
    }

    #[must_use]
    pub fn export_bounds(&self, padding: f64) -> Option<WorldRect> {
        self.core.export_bounds(padding)
    }

    // --- Delegated configuration ---

    pub fn set_tool(&mut self, tool: Tool) -> Vec<Action> {
        self.core.set_tool(tool)
    }

    pub fn set_eraser_mode(&mut self, mode: EraserMode) {
        self.core.set_eraser_mode(mode);
    }

    pub fn set_pen(&mut self, color: String, width: f64) {
        self.core.set_pen(color, width);
    }

    pub fn set_note_defaults(&mut self, color: String, kind: NoteKind) {
        self.core.set_note_defaults(color, kind);
    }

    pub fn set_connection_color(&mut self, color: String) -> Vec<Action> {
        self.core.set_connection_color(color)
    }

    pub fn set_connection_style(&mut self, style: ConnectionStyle) -> Vec<Action> {
        self.core.set_connection_style(style)
    }

    // --- Delegated note edits ---

    pub fn set_note_text(&mut self, id: NoteId, text: String) -> Vec<Action> {
        self.core.set_note_text(id, text)
    }

    pub fn set_note_color(&mut self, id: NoteId, color: String) -> Vec<Action> {
        self.core.set_note_color(id, color)
    }

    pub fn set_note_minimized(&mut self, id: NoteId, minimized: bool) -> Vec<Action> {
        self.core.set_note_minimized(id, minimized)
    }

    pub fn set_note_table(&mut self, id: NoteId, table: Option<Vec<Vec<String>>>) -> Vec<Action> {
        self.core.set_note_table(id, table)
    }

    // --- Delegated input events ---

    pub fn on_pointer_down(
        &mut self,
        screen_pt: ScreenPoint,
        button: Button,
        modifiers: Modifiers,
    ) -> Vec<Action> {
        self.core.on_pointer_down(screen_pt, button, modifiers)
    }

    pub fn on_pointer_move(
        &mut self,
        screen_pt: ScreenPoint,
        modifiers: Modifiers,
    ) -> Vec<Action> {
        self.core.on_pointer_move(screen_pt, modifiers)
    }

    pub fn on_pointer_up(
        &mut self,
        screen_pt: ScreenPoint,
        button: Button,
        modifiers: Modifiers,
    ) -> Vec<Action> {
        self.core.on_pointer_up(screen_pt, button, modifiers)
    }

    pub fn on_double_click(
        &mut self,
        screen_pt: ScreenPoint,
        modifiers: Modifiers,
    ) -> Vec<Action> {
        self.core.on_double_click(screen_pt, modifiers)
    }

    pub fn on_wheel(
        &mut self,
        screen_pt: ScreenPoint,
        delta: WheelDelta,
        modifiers: Modifiers,
        now_ms: f64,
    ) -> Vec<Action> {
        self.core.on_wheel(screen_pt, delta, modifiers, now_ms)
    }

    pub fn on_key_down(&mut self, key: Key, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_key_down(key, modifiers)
    }

    pub fn on_frame(&mut self, now_ms: f64) -> Vec<Action> {
        self.core.on_frame(now_ms)
    }

    // --- Delegated commands ---

    pub fn zoom_in(&mut self) -> Vec<Action> {
        self.core.zoom_in()
    }

    pub fn zoom_out(&mut self) -> Vec<Action> {
        self.core.zoom_out()
    }

    pub fn undo(&mut self) -> Vec<Action> {
        self.core.undo()
    }

    pub fn redo(&mut self) -> Vec<Action> {
        self.core.redo()
    }

    pub fn delete_selection(&mut self) -> Vec<Action> {
        self.core.delete_selection()
    }

    pub fn abort_gesture(&mut self) -> Vec<Action> {
        self.core.abort_gesture()
    }

    // --- Delegated queries ---

    #[must_use]
    pub fn selection(&self) -> &[NoteId] {
        self.core.selection()
    }

    #[must_use]
    pub fn selected_connection(&self) -> Option<ConnectionId> {
        self.core.selected_connection()
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.core.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.core.can_redo()
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.core.camera()
    }
}
