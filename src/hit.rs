//! Hit-testing for notes, connectors, and their editing handles.
//!
//! All queries take world-space points; tolerances are given in screen pixels
//! and converted through the camera, so targets stay the same apparent size
//! at every zoom. Overlap ties go to the topmost object (last in draw order).

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::{Camera, WorldPoint};
use crate::consts::{CONNECTOR_HIT_PX, HANDLE_RADIUS_PX};
use crate::doc::{ConnectionId, DocLayout, NoteConnection, NoteId, NoteStore, PageId, StickyNote};
use crate::geom::{self, WorldRect};

/// Topmost note whose body contains `p`.
#[must_use]
pub fn note_at(store: &NoteStore, page: PageId, p: WorldPoint) -> Option<NoteId> {
    store
        .notes(page)
        .iter()
        .rev()
        .find(|n| n.rect().contains(p))
        .map(|n| n.id)
}

/// World position of a note's link handle, at the midpoint of its right edge.
#[must_use]
pub fn link_handle_pos(note: &StickyNote) -> WorldPoint {
    let r = note.rect();
    WorldPoint::new(r.x + r.w, r.y + r.h * 0.5)
}

/// Topmost note whose link handle is under `p`.
#[must_use]
pub fn link_handle_at(
    store: &NoteStore,
    page: PageId,
    camera: &Camera,
    p: WorldPoint,
) -> Option<NoteId> {
    let radius = camera.screen_dist_to_world(HANDLE_RADIUS_PX);
    let r_sq = radius * radius;
    store
        .notes(page)
        .iter()
        .rev()
        .find(|n| geom::dist_sq(link_handle_pos(n), p) <= r_sq)
        .map(|n| n.id)
}

/// Resolved polyline for a connector, following the live note centers.
///
/// `None` when either endpoint note no longer exists on the page.
#[must_use]
pub fn connection_route(
    store: &NoteStore,
    page: PageId,
    conn: &NoteConnection,
) -> Option<Vec<WorldPoint>> {
    let start = store.note_center(page, conn.source)?;
    let end = store.note_center(page, conn.target)?;
    Some(geom::route_points(conn.style, start, &conn.control_points, end))
}

/// Topmost connector whose routed line passes under `p`.
#[must_use]
pub fn connection_at(
    store: &NoteStore,
    page: PageId,
    camera: &Camera,
    p: WorldPoint,
) -> Option<ConnectionId> {
    let tolerance = camera.screen_dist_to_world(CONNECTOR_HIT_PX);
    store
        .connections(page)
        .iter()
        .rev()
        .find(|c| {
            connection_route(store, page, c)
                .is_some_and(|route| geom::polyline_hit(&route, p, tolerance))
        })
        .map(|c| c.id)
}

/// Index of the connector control point under `p`, if any.
#[must_use]
pub fn connection_point_at(conn: &NoteConnection, camera: &Camera, p: WorldPoint) -> Option<usize> {
    point_index_at(&conn.control_points, camera, p)
}

/// Resolved polyline for a note's anchor link, from the note center through
/// its waypoints to the anchored document position.
///
/// `None` when the note has no anchor or no document is loaded.
#[must_use]
pub fn anchor_route(note: &StickyNote, layout: Option<DocLayout>) -> Option<Vec<WorldPoint>> {
    let layout = layout?;
    let anchor = note.anchor?;
    Some(geom::route_points(
        note.connection_style,
        note.center(),
        &note.anchor_points,
        layout.anchor_pos(anchor),
    ))
}

/// Topmost note whose anchor link passes under `p`.
#[must_use]
pub fn anchor_link_at(
    store: &NoteStore,
    page: PageId,
    layout: Option<DocLayout>,
    camera: &Camera,
    p: WorldPoint,
) -> Option<NoteId> {
    let tolerance = camera.screen_dist_to_world(CONNECTOR_HIT_PX);
    store
        .notes(page)
        .iter()
        .rev()
        .find(|n| anchor_route(n, layout).is_some_and(|route| geom::polyline_hit(&route, p, tolerance)))
        .map(|n| n.id)
}

/// Index of the anchor-link waypoint of `note` under `p`, if any.
#[must_use]
pub fn anchor_point_at(note: &StickyNote, camera: &Camera, p: WorldPoint) -> Option<usize> {
    point_index_at(&note.anchor_points, camera, p)
}

/// Whether `p` is on the document end of `note`'s anchor link.
#[must_use]
pub fn anchor_end_at(
    note: &StickyNote,
    layout: Option<DocLayout>,
    camera: &Camera,
    p: WorldPoint,
) -> bool {
    let (Some(layout), Some(anchor)) = (layout, note.anchor) else {
        return false;
    };
    let radius = camera.screen_dist_to_world(HANDLE_RADIUS_PX);
    geom::dist_sq(layout.anchor_pos(anchor), p) <= radius * radius
}

/// Ids of every note whose bounds intersect `rect`, in draw order.
#[must_use]
pub fn notes_in_rect(store: &NoteStore, page: PageId, rect: WorldRect) -> Vec<NoteId> {
    store
        .notes(page)
        .iter()
        .filter(|n| n.rect().intersects(rect))
        .map(|n| n.id)
        .collect()
}

fn point_index_at(points: &[WorldPoint], camera: &Camera, p: WorldPoint) -> Option<usize> {
    let radius = camera.screen_dist_to_world(HANDLE_RADIUS_PX);
    let r_sq = radius * radius;
    points.iter().position(|cp| geom::dist_sq(*cp, p) <= r_sq)
}
