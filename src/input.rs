//! Input model: tools, modifier keys, buttons, and the gesture state machine.
//!
//! `Tool` and `Modifiers` capture the user's intent at the time of a pointer
//! event. `DragState` is the active gesture tracked between pointer-down and
//! pointer-up, carrying a deep copy of the entity as it was when the gesture
//! began so every frame is computed from the same origin. `InkState` tracks
//! the stroke being drawn by the pen tool.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use std::collections::HashSet;

use crate::consts::{DEFAULT_PEN_COLOR, DEFAULT_STROKE_WIDTH};
use crate::doc::{Note, NoteId, StrokeId};
use crate::viewport::{Point, ScrollOffset};

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Pointer / selection tool (default).
    #[default]
    Select,
    /// Pan the scroll container.
    Hand,
    /// Place a sticky note.
    Note,
    /// Place a reminder card.
    Reminder,
    /// Place a text box.
    Text,
    /// Image placement; pointer input behaves like select.
    Image,
    /// Freehand ink.
    Pen,
    /// Remove ink strokes under the pointer.
    Eraser,
}

impl Tool {
    /// Tool bound to a single-key shortcut (`v/h/n/r/t`).
    #[must_use]
    pub fn from_shortcut(key: &str) -> Option<Self> {
        match key {
            "v" => Some(Self::Select),
            "h" => Some(Self::Hand),
            "n" => Some(Self::Note),
            "r" => Some(Self::Reminder),
            "t" => Some(Self::Text),
            _ => None,
        }
    }
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

impl Modifiers {
    /// Ctrl on most platforms, Cmd on macOS.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
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

/// A keyboard key as reported by the browser (e.g. `"Delete"`, `"z"`, `" "`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(name.to_string())
    }

    /// Case-insensitive comparison against a key name.
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.0.eq_ignore_ascii_case(name)
    }

    #[must_use]
    pub fn is_space(&self) -> bool {
        self.0 == " " || self.0 == "Space"
    }
}

/// One of the eight resize handles on a note's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeHandle {
    T,
    B,
    L,
    R,
    Tl,
    Tr,
    Bl,
    Br,
}

impl ResizeHandle {
    /// All handles, corners first so they win over overlapping edges.
    pub const ALL: [Self; 8] = [Self::Tl, Self::Tr, Self::Bl, Self::Br, Self::T, Self::B, Self::L, Self::R];

    #[must_use]
    pub fn left(self) -> bool {
        matches!(self, Self::L | Self::Tl | Self::Bl)
    }

    #[must_use]
    pub fn right(self) -> bool {
        matches!(self, Self::R | Self::Tr | Self::Br)
    }

    #[must_use]
    pub fn top(self) -> bool {
        matches!(self, Self::T | Self::Tl | Self::Tr)
    }

    #[must_use]
    pub fn bottom(self) -> bool {
        matches!(self, Self::B | Self::Bl | Self::Br)
    }

    /// Position of the handle in the note's unrotated frame, as fractions
    /// of width and height measured from the top-left corner.
    #[must_use]
    pub fn anchor(self) -> (f64, f64) {
        let fx = if self.left() {
            0.0
        } else if self.right() {
            1.0
        } else {
            0.5
        };
        let fy = if self.top() {
            0.0
        } else if self.bottom() {
            1.0
        } else {
            0.5
        };
        (fx, fy)
    }

    /// CSS cursor shown while dragging this handle.
    #[must_use]
    pub fn cursor(self) -> &'static str {
        match self {
            Self::T | Self::B => "ns-resize",
            Self::L | Self::R => "ew-resize",
            Self::Bl | Self::Tr => "nesw-resize",
            Self::Tl | Self::Br => "nwse-resize",
        }
    }
}

/// The active pointer gesture.
///
/// Each active variant carries the pointer position and entity state captured
/// at pointer-down; moves are always computed relative to that origin.
#[derive(Debug, Clone, Default)]
pub enum DragState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// Scrolling the container with the hand tool.
    Panning {
        /// Screen-space pointer position at pointer-down.
        origin: Point,
        /// Container scroll offsets at pointer-down.
        scroll_origin: ScrollOffset,
    },
    /// Moving a note.
    Moving {
        /// Canvas-space pointer position at pointer-down.
        origin: Point,
        start: Box<Note>,
    },
    /// Resizing a note by one handle.
    Resizing {
        origin: Point,
        start: Box<Note>,
        handle: ResizeHandle,
    },
    /// Rotating a note about its center.
    Rotating {
        origin: Point,
        start: Box<Note>,
    },
}

impl DragState {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// Pen sub-state: the stroke currently being drawn.
#[derive(Debug, Clone, Default)]
pub struct InkState {
    /// Pen is down.
    pub drawing: bool,
    /// Points captured so far for the live stroke.
    pub path: Vec<Point>,
    /// Id of the live stroke, also present in the document while drawing.
    pub stroke_id: Option<StrokeId>,
    /// Set when the live stroke was erased or abandoned; it is discarded on release.
    pub cancelled: bool,
}

impl InkState {
    /// Forget the live stroke entirely.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Mark the live stroke as abandoned and stop drawing. Returns its id.
    pub fn cancel(&mut self) -> Option<StrokeId> {
        self.cancelled = true;
        self.drawing = false;
        self.path.clear();
        self.stroke_id.take()
    }
}

/// Which text field currently has keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFocus {
    /// A note's content body.
    Content(NoteId),
    /// A reminder's name field.
    ReminderName(NoteId),
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone)]
pub struct UiState {
    /// Currently active tool.
    pub tool: Tool,
    /// Selected note ids.
    pub selection: HashSet<NoteId>,
    /// Whether the color picker popover is open.
    pub show_color_picker: bool,
    /// Text field with focus; keyboard shortcuts are suppressed while set.
    pub focus: Option<TextFocus>,
    /// Tool to restore when a held Space is released.
    pub space_restore: Option<Tool>,
    /// Color for new strokes.
    pub pen_color: String,
    /// Width for new strokes.
    pub pen_thickness: f64,
    /// A primary pointer button is held.
    pub pointer_down: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            tool: Tool::default(),
            selection: HashSet::new(),
            show_color_picker: false,
            focus: None,
            space_restore: None,
            pen_color: DEFAULT_PEN_COLOR.to_string(),
            pen_thickness: DEFAULT_STROKE_WIDTH,
            pointer_down: false,
        }
    }
}

impl UiState {
    /// Replace the selection with exactly `id`.
    pub fn select_only(&mut self, id: NoteId) {
        self.selection.clear();
        self.selection.insert(id);
    }

    /// The selected note id when exactly one note is selected.
    #[must_use]
    pub fn single_selection(&self) -> Option<NoteId> {
        if self.selection.len() == 1 { self.selection.iter().next().copied() } else { None }
    }
}
