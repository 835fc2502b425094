//! Canvas annotation engine for document markup.
//!
//! This crate is compiled to WebAssembly and runs in the browser. A background
//! document (a PDF page or an image) sits on a large pannable, zoomable
//! virtual canvas; the engine owns everything the user layers on top of it:
//! freehand ink and parametric shapes, sticky notes with document anchors,
//! connector lines between notes, selection, and a bounded undo history. The
//! host JavaScript layer is responsible only for wiring DOM events to the
//! engine and reacting to the [`engine::Action`]s it returns (scheduling
//! redraws, debouncing autosave, opening editor overlays).
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`doc`] | Sticky notes, connectors, text sections, document layout |
//! | [`ink`] | Annotation paths, erasers, and the raster-op queue |
//! | [`camera`] | Pan/zoom camera and coordinate conversions |
//! | [`geom`] | Stroke smoothing, connector routing, distance helpers |
//! | [`input`] | Input event types and the gesture state machine |
//! | [`hit`] | Hit-testing notes, connectors, and handles |
//! | [`history`] | Bounded linear undo/redo over snapshots |
//! | [`render`] | Scene rendering to the 2D contexts |
//! | [`consts`] | Shared numeric constants (zoom limits, tolerances, etc.) |

pub mod camera;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod geom;
pub mod history;
pub mod hit;
pub mod ink;
pub mod input;
pub mod render;
