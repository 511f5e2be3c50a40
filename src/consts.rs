//! Shared numeric constants for the whiteboard engine.

use uuid::Uuid;

// ── Viewport ────────────────────────────────────────────────────

/// Smallest allowed zoom scale.
pub const MIN_SCALE: f64 = 0.2;

/// Largest allowed zoom scale.
pub const MAX_SCALE: f64 = 3.0;

/// Zoom scale a fresh viewport starts at.
pub const DEFAULT_SCALE: f64 = 0.75;

/// Multiplier applied to `-delta_y` of a ctrl/cmd + wheel event.
pub const WHEEL_ZOOM_FACTOR: f64 = 0.001;

/// Viewport widths (CSS px) below this select the portrait canvas.
pub const PORTRAIT_BREAKPOINT_PX: f64 = 768.0;

// ── Notes ───────────────────────────────────────────────────────

/// Minimum note width, and minimum height for non-text notes.
pub const MIN_NOTE_SIZE: f64 = 150.0;

/// Minimum height of a text note.
pub const MIN_TEXT_HEIGHT: f64 = 50.0;

/// Font size bounds in points.
pub const MIN_FONT_SIZE: u32 = 8;
pub const MAX_FONT_SIZE: u32 = 96;

/// Starting value of the z-index pool when nothing higher has been seen.
pub const Z_INDEX_FLOOR: i64 = 10;

/// Maximum tilt (degrees, either direction) given to new sticky notes.
pub const STICKY_TILT_DEG: f64 = 2.0;

// ── Ink ─────────────────────────────────────────────────────────

/// Distance (canvas units) within which the eraser removes a stroke.
pub const ERASER_RADIUS: f64 = 10.0;

/// Stroke width used when none is given.
pub const DEFAULT_STROKE_WIDTH: f64 = 3.0;

/// Pen color used when none is given.
pub const DEFAULT_PEN_COLOR: &str = "black";

/// CSS cursor for the eraser: a translucent circle the size of the eraser.
pub const ERASER_CURSOR: &str = "url('data:image/svg+xml;utf8,<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"24\" height=\"24\" viewBox=\"0 0 24 24\"><circle cx=\"12\" cy=\"12\" r=\"10\" stroke=\"black\" stroke-width=\"1.5\" fill=\"white\" fill-opacity=\"0.5\"/></svg>') 12 12, auto";

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space hit slop in pixels for resize handles.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

/// Distance above the top edge to the rotate handle, in screen pixels.
pub const ROTATE_HANDLE_OFFSET_PX: f64 = 24.0;

// ── History / sync ──────────────────────────────────────────────

/// Maximum number of undo snapshots retained.
pub const HISTORY_LIMIT: usize = 50;

/// Debounce window for per-note field saves, in milliseconds.
pub const SAVE_DEBOUNCE_MS: u64 = 400;

/// Whiteboard used when neither an explicit id nor an owned board exists.
pub const DEFAULT_WHITEBOARD_ID: Uuid = Uuid::from_u128(0xa111_1111_b222_c333_d444_e555_5555_5555);

/// Strokes with fewer points than this are never persisted.
pub const MIN_PERSISTED_POINTS: usize = 2;

/// Title given to a whiteboard created during bootstrap.
pub const DEFAULT_WHITEBOARD_TITLE: &str = "My Whiteboard";
