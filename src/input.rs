//! Input model: tools, modifier keys, mouse buttons, and the gesture state machine.
//!
//! `Tool` and `Modifiers` capture the user's intent at the time of a pointer
//! event. `UiState` is the persistent tool and selection state the renderer
//! draws from. `InputState` is the active gesture being tracked between
//! pointer-down and pointer-up, carrying all context needed to apply
//! incremental updates during motion and commit exactly one history snapshot
//! on release.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::{ScreenPoint, WorldPoint};
use crate::doc::{ConnectionId, NoteId, NoteKind};
use crate::geom::{ConnectionStyle, WorldRect};
use crate::ink::PathKind;

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Pointer / selection tool (default).
    #[default]
    Select,
    /// Freehand pen stroke.
    Pen,
    /// Wide translucent freehand stroke.
    Highlighter,
    /// Eraser; behavior depends on [`EraserMode`].
    Eraser,
    /// Place a sticky note.
    Note,
    /// Transient laser pointer trail.
    Laser,
    /// Straight line segment.
    Line,
    /// Rectangle outline.
    Rect,
    /// Circle outline.
    Circle,
    /// Five-point star outline.
    Star,
    /// Directed arrow.
    Arrow,
    /// Thick translucent underline stroke.
    Emphasis,
    /// Translucent highlight wash over a rectangular region.
    BoxHighlight,
}

impl Tool {
    /// Whether this tool draws point-by-point as the pointer moves.
    #[must_use]
    pub fn is_freehand(self) -> bool {
        matches!(self, Self::Pen | Self::Highlighter | Self::Eraser)
    }

    /// Whether this tool drags out a two-point shape.
    #[must_use]
    pub fn is_shape(self) -> bool {
        matches!(
            self,
            Self::Line
                | Self::Rect
                | Self::Circle
                | Self::Star
                | Self::Arrow
                | Self::Emphasis
                | Self::BoxHighlight
        )
    }

    /// The ink path kind this tool produces, or `None` for tools that do not
    /// draw ink.
    #[must_use]
    pub fn path_kind(self) -> Option<PathKind> {
        match self {
            Self::Pen => Some(PathKind::Pen),
            Self::Highlighter => Some(PathKind::Highlighter),
            Self::Eraser => Some(PathKind::Eraser),
            Self::Line => Some(PathKind::Line),
            Self::Rect => Some(PathKind::Rect),
            Self::Circle => Some(PathKind::Circle),
            Self::Star => Some(PathKind::Star),
            Self::Arrow => Some(PathKind::Arrow),
            Self::Emphasis => Some(PathKind::Emphasis),
            Self::BoxHighlight => Some(PathKind::BoxHighlight),
            Self::Select | Self::Note | Self::Laser => None,
        }
    }
}

/// How the eraser tool removes ink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EraserMode {
    /// Paint transparency over whatever the stroke covers (default).
    #[default]
    Rubber,
    /// Delete whole paths the pointer sweeps across.
    Magic,
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key.
///
/// The inner string holds the key name as reported by the browser (e.g.
/// `"Delete"`, `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// One sample of the laser pointer trail.
#[derive(Debug, Clone, Copy)]
pub struct LaserPoint {
    /// World-space position of the sample.
    pub pos: WorldPoint,
    /// Timestamp the sample was captured, in host milliseconds.
    pub at_ms: f64,
}

/// Persistent tool and selection state visible to the renderer.
#[derive(Debug, Clone)]
pub struct UiState {
    /// Currently active tool.
    pub tool: Tool,
    /// Eraser behavior when [`Tool::Eraser`] is active.
    pub eraser_mode: EraserMode,
    /// Stroke color for pen and shape tools, as a CSS color string.
    pub stroke_color: String,
    /// Pen and shape stroke width in world units.
    pub stroke_width: f64,
    /// Highlighter stroke width in world units.
    pub highlighter_width: f64,
    /// Rubber eraser width in world units.
    pub eraser_width: f64,
    /// Fill color for newly placed notes.
    pub note_color: String,
    /// Content kind for newly placed notes.
    pub note_kind: NoteKind,
    /// Line color for newly created connectors.
    pub connection_color: String,
    /// Routing style for newly created connectors.
    pub connection_style: ConnectionStyle,
    /// Ids of the currently selected notes, in selection order.
    pub selected_notes: Vec<NoteId>,
    /// The currently selected connector, if any.
    pub selected_connection: Option<ConnectionId>,
    /// Live lasso rectangle while a lasso drag is in progress.
    pub lasso: Option<WorldRect>,
    /// Live link line while a link drag is in progress, from handle to pointer.
    pub link_preview: Option<(WorldPoint, WorldPoint)>,
    /// Laser pointer trail, oldest first; samples expire as they fade.
    pub laser: Vec<LaserPoint>,
    /// CSS cursor last pushed to the host, so repeats are suppressed.
    pub cursor: String,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            tool: Tool::default(),
            eraser_mode: EraserMode::default(),
            stroke_color: "#1F1A17".into(),
            stroke_width: 3.0,
            highlighter_width: 18.0,
            eraser_width: 24.0,
            note_color: "#FFD966".into(),
            note_kind: NoteKind::default(),
            connection_color: "#1E90FF".into(),
            connection_style: ConnectionStyle::default(),
            selected_notes: Vec::new(),
            selected_connection: None,
            lasso: None,
            link_preview: None,
            laser: Vec::new(),
            cursor: "default".into(),
        }
    }
}

/// What a dragged control point belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlPointOwner {
    /// A waypoint on a note-to-note connector.
    Connection(ConnectionId),
    /// A waypoint on a note's anchor link.
    Anchor(NoteId),
}

/// Internal state for the input state machine.
///
/// Each active variant carries the gesture context needed to apply motion
/// updates and decide on pointer-up whether anything is worth committing.
#[derive(Debug, Clone)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    Idle,
    /// The user is panning the canvas with the middle or secondary button.
    Panning {
        /// Screen-space position of the previous pointer event, used to
        /// compute the pan delta.
        last_screen: ScreenPoint,
        /// Total screen-space distance traveled, used to tell a click from
        /// a drag on release.
        travel: f64,
        /// Button that started the pan.
        button: Button,
    },
    /// The user is dragging out a lasso selection rectangle.
    Lasso {
        /// World-space corner where the drag started.
        anchor_world: WorldPoint,
        /// Selection to extend (shift-lasso); empty for a replacing lasso.
        prior: Vec<NoteId>,
    },
    /// The user is moving the selected notes.
    DraggingNotes {
        /// World-space pointer position at the start of the drag.
        start_world: WorldPoint,
        /// Original note positions, used to apply the delta without drift.
        origins: Vec<(NoteId, f64, f64)>,
        /// Whether the pointer has moved past the click threshold.
        moved: bool,
        /// Note under the pointer at pointer-down, for click handling on
        /// release.
        pressed: NoteId,
    },
    /// The user is dragging a connector or anchor-link waypoint.
    DraggingControlPoint {
        /// What the waypoint belongs to.
        owner: ControlPointOwner,
        /// Index of the waypoint in its owner's list.
        index: usize,
        /// Whether the waypoint has actually moved.
        moved: bool,
    },
    /// The user is dragging the document end of a note's anchor link.
    DraggingAnchorEnd {
        /// Note whose anchor is being repositioned.
        note: NoteId,
        /// Whether the anchor has actually moved.
        moved: bool,
    },
    /// The user is dragging a new link out of a note's link handle.
    Linking {
        /// Note the link started from.
        from: NoteId,
    },
    /// A freehand stroke is in progress; the live path lives in the ink store.
    Stroking,
    /// A two-point shape is being dragged out; the live path lives in the
    /// ink store.
    DrawingShape,
    /// The magic eraser is sweeping; whole paths are deleted as it moves.
    ErasingPaths {
        /// Paths deleted so far during this sweep.
        removed: usize,
    },
    /// The laser pointer is active; the trail lives in [`UiState::laser`].
    Lasering,
}

impl Default for InputState {
    fn default() -> Self {
        Self::Idle
    }
}
