//! Client engine for a personal whiteboard: sticky notes, text boxes, images,
//! reminder cards and freehand ink on a fixed-size canvas.
//!
//! The engine owns everything between raw input events and the remote store:
//! it turns pointer and keyboard input into document edits, keeps a bounded
//! undo history, and persists edits optimistically (debounced per note,
//! reconciled wholesale after undo/redo). The host renders the document and
//! carries out the returned [`engine::Action`]s that concern the page
//! (scrolling, cursor, pointer capture).
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Interaction state machine [`engine::EngineCore`] and the persisting [`engine::Engine`] |
//! | [`notes`] | Note creation, property edits and reminder edits |
//! | [`doc`] | Notes, strokes, and the in-memory entity store |
//! | [`viewport`] | Zoom, canvas orientation and screen-to-canvas mapping |
//! | [`input`] | Tools, input event types and gesture state |
//! | [`hit`] | Hit-testing notes, handles and ink |
//! | [`history`] | Bounded undo/redo of document snapshots |
//! | [`reminder`] | Reminder title and date-line encoding |
//! | [`sync`] | Gated, debounced persistence to the remote store |
//! | [`share`] | Share links and the share panel |
//! | [`config`] | Environment configuration |
//! | [`consts`] | Shared numeric constants (zoom limits, minimum sizes, etc.) |

pub mod config;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod history;
pub mod hit;
pub mod input;
pub mod notes;
pub mod reminder;
pub mod share;
pub mod sync;
pub mod viewport;
