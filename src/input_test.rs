#![allow(clippy::float_cmp)]

use super::*;

// =============================================================
// Tool
// =============================================================

#[test]
fn tool_default_is_select() {
    assert_eq!(Tool::default(), Tool::Select);
}

#[test]
fn freehand_and_shape_are_disjoint() {
    let all = [
        Tool::Select,
        Tool::Pen,
        Tool::Highlighter,
        Tool::Eraser,
        Tool::Note,
        Tool::Laser,
        Tool::Line,
        Tool::Rect,
        Tool::Circle,
        Tool::Star,
        Tool::Arrow,
        Tool::Emphasis,
        Tool::BoxHighlight,
    ];
    for tool in all {
        assert!(
            !(tool.is_freehand() && tool.is_shape()),
            "{tool:?} claims to be both freehand and shape"
        );
    }
}

#[test]
fn freehand_tools() {
    assert!(Tool::Pen.is_freehand());
    assert!(Tool::Highlighter.is_freehand());
    assert!(Tool::Eraser.is_freehand());
    assert!(!Tool::Select.is_freehand());
    assert!(!Tool::Rect.is_freehand());
}

#[test]
fn shape_tools() {
    assert!(Tool::Line.is_shape());
    assert!(Tool::Rect.is_shape());
    assert!(Tool::Circle.is_shape());
    assert!(Tool::Star.is_shape());
    assert!(Tool::Arrow.is_shape());
    assert!(Tool::Emphasis.is_shape());
    assert!(Tool::BoxHighlight.is_shape());
    assert!(!Tool::Pen.is_shape());
    assert!(!Tool::Laser.is_shape());
}

#[test]
fn path_kind_covers_ink_tools() {
    assert_eq!(Tool::Pen.path_kind(), Some(PathKind::Pen));
    assert_eq!(Tool::Highlighter.path_kind(), Some(PathKind::Highlighter));
    assert_eq!(Tool::Eraser.path_kind(), Some(PathKind::Eraser));
    assert_eq!(Tool::Arrow.path_kind(), Some(PathKind::Arrow));
    assert_eq!(Tool::BoxHighlight.path_kind(), Some(PathKind::BoxHighlight));
}

#[test]
fn path_kind_is_none_for_non_ink_tools() {
    assert_eq!(Tool::Select.path_kind(), None);
    assert_eq!(Tool::Note.path_kind(), None);
    assert_eq!(Tool::Laser.path_kind(), None);
}

// =============================================================
// EraserMode
// =============================================================

#[test]
fn eraser_mode_default_is_rubber() {
    assert_eq!(EraserMode::default(), EraserMode::Rubber);
}

// =============================================================
// Modifiers
// =============================================================

#[test]
fn modifiers_default_all_false() {
    let m = Modifiers::default();
    assert!(!m.shift);
    assert!(!m.ctrl);
    assert!(!m.alt);
    assert!(!m.meta);
}

#[test]
fn modifiers_individual_flags() {
    let m = Modifiers { shift: true, ctrl: false, alt: true, meta: false };
    assert!(m.shift);
    assert!(!m.ctrl);
    assert!(m.alt);
    assert!(!m.meta);
}

// =============================================================
// Button / Key / WheelDelta
// =============================================================

#[test]
fn button_equality() {
    assert_eq!(Button::Primary, Button::Primary);
    assert_ne!(Button::Primary, Button::Secondary);
    assert_ne!(Button::Middle, Button::Secondary);
}

#[test]
fn key_stores_string() {
    let k = Key("Escape".into());
    assert_eq!(k.0, "Escape");
    assert_eq!(k, Key("Escape".into()));
}

#[test]
fn wheel_delta_values() {
    let w = WheelDelta { dx: 1.5, dy: -3.0 };
    assert_eq!(w.dx, 1.5);
    assert_eq!(w.dy, -3.0);
}

// =============================================================
// UiState
// =============================================================

#[test]
fn ui_state_defaults() {
    let ui = UiState::default();
    assert_eq!(ui.tool, Tool::Select);
    assert_eq!(ui.eraser_mode, EraserMode::Rubber);
    assert_eq!(ui.stroke_width, 3.0);
    assert!(ui.highlighter_width > ui.stroke_width);
    assert!(ui.eraser_width > ui.stroke_width);
    assert_eq!(ui.note_kind, NoteKind::Text);
    assert_eq!(ui.connection_style, ConnectionStyle::Straight);
}

#[test]
fn ui_state_default_has_no_selection_or_transients() {
    let ui = UiState::default();
    assert!(ui.selected_notes.is_empty());
    assert!(ui.selected_connection.is_none());
    assert!(ui.lasso.is_none());
    assert!(ui.link_preview.is_none());
    assert!(ui.laser.is_empty());
    assert_eq!(ui.cursor, "default");
}

// =============================================================
// InputState
// =============================================================

#[test]
fn input_state_default_is_idle() {
    let s = InputState::default();
    assert!(matches!(s, InputState::Idle));
}
