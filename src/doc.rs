//! Object model: sticky notes, connectors, text sections, and the document
//! layout.
//!
//! Notes and connectors are grouped per page in a [`NoteStore`]. Connector
//! endpoints are never stored — they are resolved from the live note centers
//! whenever something draws or hit-tests them, so a connector follows its
//! notes automatically. A note may additionally carry a [`DocAnchor`], a
//! percentage position on the background document that marks the spot the
//! note refers to.
//!
//! [`WorkspaceRecord`] is the serialized shape of everything here plus the
//! ink layer; it is what autosave writes and what a stored workspace loads
//! from.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::camera::WorldPoint;
use crate::consts::{ANCHOR_SNAP_MARGIN, CANVAS_CENTER, NOTE_MIN_SIZE};
use crate::geom::{ConnectionStyle, WorldRect};
use crate::ink::AnnotationPath;

/// Unique identifier for a sticky note.
pub type NoteId = Uuid;

/// Unique identifier for a connector.
pub type ConnectionId = Uuid;

/// Unique identifier for a text section.
pub type SectionId = Uuid;

/// Document page number, starting at 1.
pub type PageId = u32;

/// Content carried by a sticky note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteKind {
    /// Plain text body.
    #[default]
    Text,
    /// An image referenced by `media_url`.
    Image,
    /// An audio clip referenced by `media_url`.
    Audio,
    /// A small grid of text cells.
    Table,
    /// An embedded drawing referenced by `media_url`.
    Drawing,
}

/// A note's position on the background document, stored as percentage
/// offsets so it keeps pointing at the same spot regardless of layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DocAnchor {
    pub x_percent: f64,
    pub y_percent: f64,
}

/// A sticky note placed on the canvas.
///
/// `x` / `y` are the world-space top-left corner; the footprint is derived
/// from `kind` and `minimized` via [`note_size`], never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StickyNote {
    pub id: NoteId,
    /// Page this note belongs to.
    pub page: PageId,
    pub kind: NoteKind,
    pub x: f64,
    pub y: f64,
    /// Text body (or caption for media kinds).
    pub text: String,
    /// Media location for image/audio/drawing kinds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    /// Cell grid for table kind, rows of columns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<Vec<Vec<String>>>,
    /// Whether the note is collapsed to its minimized square.
    pub minimized: bool,
    /// Document position this note refers to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<DocAnchor>,
    /// User waypoints shaping the anchor link.
    pub anchor_points: Vec<WorldPoint>,
    /// Card color as a CSS color string.
    pub color: String,
    /// Color for the anchor link and new connectors from this note.
    pub connection_color: String,
    /// Routing style for the anchor link.
    pub connection_style: ConnectionStyle,
}

impl StickyNote {
    /// World-space footprint of this note.
    #[must_use]
    pub fn size(&self) -> (f64, f64) {
        note_size(self.kind, self.minimized)
    }

    /// World-space bounding rectangle of this note.
    #[must_use]
    pub fn rect(&self) -> WorldRect {
        let (w, h) = self.size();
        WorldRect::new(self.x, self.y, w, h)
    }

    /// World-space center of this note.
    #[must_use]
    pub fn center(&self) -> WorldPoint {
        self.rect().center()
    }
}

/// Footprint of a note in world units, as a function of content kind and
/// minimized state only.
#[must_use]
pub fn note_size(kind: NoteKind, minimized: bool) -> (f64, f64) {
    if minimized {
        return (NOTE_MIN_SIZE, NOTE_MIN_SIZE);
    }
    match kind {
        NoteKind::Text => (180.0, 120.0),
        NoteKind::Image => (200.0, 150.0),
        NoteKind::Audio => (200.0, 64.0),
        NoteKind::Table => (240.0, 160.0),
        NoteKind::Drawing => (200.0, 160.0),
    }
}

/// A connector between two sticky notes.
///
/// Only the note ids are stored; endpoints are resolved from the live note
/// centers at draw/hit time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteConnection {
    pub id: ConnectionId,
    /// Page this connector belongs to.
    pub page: PageId,
    /// Note the link was dragged from.
    pub source: NoteId,
    /// Note the link was dropped on.
    pub target: NoteId,
    /// Line color as a CSS color string.
    pub color: String,
    /// Routing style.
    pub style: ConnectionStyle,
    /// User waypoints the route passes through.
    pub control_points: Vec<WorldPoint>,
}

/// A floating text block. The engine stores and positions it; a host-side
/// editor owns its content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextSection {
    pub id: SectionId,
    pub text: String,
    pub x: f64,
    pub y: f64,
}

/// Notes and connectors on one page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageState {
    pub notes: Vec<StickyNote>,
    pub connections: Vec<NoteConnection>,
}

/// Placement of the background document in world space.
#[derive(Debug, Clone, Copy)]
pub struct DocLayout {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DocLayout {
    /// Center a document of the given size on the canvas midpoint.
    #[must_use]
    pub fn centered(width: f64, height: f64) -> Self {
        Self {
            x: CANVAS_CENTER - width * 0.5,
            y: CANVAS_CENTER - height * 0.5,
            width,
            height,
        }
    }

    /// World-space bounds of the document.
    #[must_use]
    pub fn rect(&self) -> WorldRect {
        WorldRect::new(self.x, self.y, self.width, self.height)
    }

    /// Derive anchor percentages for a world point, if it falls within the
    /// snap margin around the document bounds.
    #[must_use]
    pub fn anchor_at(&self, p: WorldPoint) -> Option<DocAnchor> {
        if !self.rect().expand(ANCHOR_SNAP_MARGIN).contains(p) {
            return None;
        }
        Some(DocAnchor {
            x_percent: (p.x - self.x) / self.width * 100.0,
            y_percent: (p.y - self.y) / self.height * 100.0,
        })
    }

    /// World position of an anchor on this document.
    #[must_use]
    pub fn anchor_pos(&self, anchor: DocAnchor) -> WorldPoint {
        WorldPoint::new(
            self.x + anchor.x_percent / 100.0 * self.width,
            self.y + anchor.y_percent / 100.0 * self.height,
        )
    }
}

/// In-memory store of notes, connectors, and text sections.
pub struct NoteStore {
    pages: HashMap<PageId, PageState>,
    sections: Vec<TextSection>,
}

impl NoteStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self { pages: HashMap::new(), sections: Vec::new() }
    }

    // --- Notes ---

    /// Notes on a page, oldest first (draw order; later notes are on top).
    #[must_use]
    pub fn notes(&self, page: PageId) -> &[StickyNote] {
        self.pages.get(&page).map_or(&[][..], |p| p.notes.as_slice())
    }

    /// Look up a note by id on a page.
    #[must_use]
    pub fn note(&self, page: PageId, id: NoteId) -> Option<&StickyNote> {
        self.notes(page).iter().find(|n| n.id == id)
    }

    /// Mutable note lookup.
    pub fn note_mut(&mut self, page: PageId, id: NoteId) -> Option<&mut StickyNote> {
        self.pages
            .get_mut(&page)?
            .notes
            .iter_mut()
            .find(|n| n.id == id)
    }

    /// World-space center of a note, if it exists.
    #[must_use]
    pub fn note_center(&self, page: PageId, id: NoteId) -> Option<WorldPoint> {
        self.note(page, id).map(StickyNote::center)
    }

    /// Insert a note onto its page.
    pub fn insert_note(&mut self, note: StickyNote) {
        self.pages.entry(note.page).or_default().notes.push(note);
    }

    /// Remove a note, cascading to every connector that references it.
    /// Returns the removed note and the number of connectors that went with
    /// it, or `None` if the note doesn't exist.
    pub fn remove_note(&mut self, page: PageId, id: NoteId) -> Option<(StickyNote, usize)> {
        let state = self.pages.get_mut(&page)?;
        let idx = state.notes.iter().position(|n| n.id == id)?;
        let note = state.notes.remove(idx);
        let before = state.connections.len();
        state.connections.retain(|c| c.source != id && c.target != id);
        Some((note, before - state.connections.len()))
    }

    // --- Connections ---

    /// Connectors on a page.
    #[must_use]
    pub fn connections(&self, page: PageId) -> &[NoteConnection] {
        self.pages
            .get(&page)
            .map_or(&[][..], |p| p.connections.as_slice())
    }

    /// Look up a connector by id on a page.
    #[must_use]
    pub fn connection(&self, page: PageId, id: ConnectionId) -> Option<&NoteConnection> {
        self.connections(page).iter().find(|c| c.id == id)
    }

    /// Mutable connector lookup.
    pub fn connection_mut(&mut self, page: PageId, id: ConnectionId) -> Option<&mut NoteConnection> {
        self.pages
            .get_mut(&page)?
            .connections
            .iter_mut()
            .find(|c| c.id == id)
    }

    /// Link two notes with a new connector.
    ///
    /// Returns `None` without inserting when the notes are the same, either
    /// end is missing, or the unordered pair is already linked.
    pub fn link_notes(
        &mut self,
        page: PageId,
        a: NoteId,
        b: NoteId,
        color: String,
        style: ConnectionStyle,
    ) -> Option<ConnectionId> {
        if a == b || self.note(page, a).is_none() || self.note(page, b).is_none() {
            return None;
        }
        let state = self.pages.entry(page).or_default();
        let duplicate = state
            .connections
            .iter()
            .any(|c| (c.source == a && c.target == b) || (c.source == b && c.target == a));
        if duplicate {
            return None;
        }
        let id = Uuid::new_v4();
        state.connections.push(NoteConnection {
            id,
            page,
            source: a,
            target: b,
            color,
            style,
            control_points: Vec::new(),
        });
        Some(id)
    }

    /// Remove a connector by id.
    pub fn remove_connection(&mut self, page: PageId, id: ConnectionId) -> Option<NoteConnection> {
        let state = self.pages.get_mut(&page)?;
        let idx = state.connections.iter().position(|c| c.id == id)?;
        Some(state.connections.remove(idx))
    }

    /// Drop connectors whose endpoints no longer exist. Returns the number
    /// removed; normally zero, since note removal cascades.
    pub fn retain_valid_connections(&mut self, page: PageId) -> usize {
        let Some(state) = self.pages.get_mut(&page) else {
            return 0;
        };
        let ids: Vec<NoteId> = state.notes.iter().map(|n| n.id).collect();
        let before = state.connections.len();
        state
            .connections
            .retain(|c| ids.contains(&c.source) && ids.contains(&c.target));
        before - state.connections.len()
    }

    // --- Text sections ---

    /// All text sections, in creation order.
    #[must_use]
    pub fn sections(&self) -> &[TextSection] {
        &self.sections
    }

    /// Mutable section lookup.
    pub fn section_mut(&mut self, id: SectionId) -> Option<&mut TextSection> {
        self.sections.iter_mut().find(|s| s.id == id)
    }

    /// Append a new text section and return its id.
    pub fn add_section(&mut self, text: String, x: f64, y: f64) -> SectionId {
        let id = Uuid::new_v4();
        self.sections.push(TextSection { id, text, x, y });
        id
    }

    /// Remove a text section by id.
    pub fn remove_section(&mut self, id: SectionId) -> Option<TextSection> {
        let idx = self.sections.iter().position(|s| s.id == id)?;
        Some(self.sections.remove(idx))
    }

    // --- Snapshots ---

    /// Clone the page table and sections for a history snapshot.
    #[must_use]
    pub fn snapshot(&self) -> (HashMap<PageId, PageState>, Vec<TextSection>) {
        (self.pages.clone(), self.sections.clone())
    }

    /// Replace all pages and sections from a snapshot.
    pub fn restore(&mut self, pages: HashMap<PageId, PageState>, sections: Vec<TextSection>) {
        self.pages = pages;
        self.sections = sections;
    }
}

impl Default for NoteStore {
    fn default() -> Self {
        Self::new()
    }
}

/// The serialized shape of a whole workspace, as written by autosave and
/// read back on load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkspaceRecord {
    /// Ink paths keyed by page.
    #[serde(default)]
    pub annotations: HashMap<PageId, Vec<AnnotationPath>>,
    /// Sticky notes keyed by page.
    #[serde(default)]
    pub sticky_notes: HashMap<PageId, Vec<StickyNote>>,
    /// Connectors keyed by page.
    #[serde(default)]
    pub note_connections: HashMap<PageId, Vec<NoteConnection>>,
    /// Floating text blocks.
    #[serde(default)]
    pub text_sections: Vec<TextSection>,
}
