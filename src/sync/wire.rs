//! Wire rows exchanged with the remote store, and the mapping between them
//! and the in-memory document types.
//!
//! DESIGN
//! ======
//! Outbound rows (`NoteRow`, `StrokeRow`) are complete and strongly typed.
//! Inbound records (`NoteRecord`, `StrokeRecord`) tolerate missing and null
//! fields and fill in the documented defaults, so one malformed row never
//! fails a whole load. Reminder-ness crosses this boundary as a title prefix
//! and is decoded into `NoteVariant` here and nowhere else.

#[cfg(test)]
#[path = "wire_test.rs"]
mod wire_test;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

use crate::consts::{DEFAULT_PEN_COLOR, DEFAULT_STROKE_WIDTH};
use crate::doc::{Note, NoteColor, NoteId, NoteKind, NoteVariant, Stroke, StrokeId, WhiteboardId};
use crate::reminder;
use crate::viewport::Point;

const DEFAULT_NOTE_POS: f64 = 100.0;
const DEFAULT_NOTE_SIZE: f64 = 200.0;
const DEFAULT_Z_INDEX: i64 = 1;
const DEFAULT_FONT_SIZE: u32 = 16;

// =============================================================================
// NOTES
// =============================================================================

/// Full note row sent on upsert.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteRow {
    pub id: NoteId,
    pub whiteboard_id: WhiteboardId,
    #[serde(rename = "type")]
    pub kind: NoteKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
    pub z_index: i64,
    pub color: NoteColor,
    pub content: String,
    pub title: String,
    pub image_url: Option<String>,
    pub font_size: u32,
    /// RFC 3339 timestamp stamped at serialization time.
    pub updated_at: String,
}

impl NoteRow {
    /// Build the upsert row for `note`, stamped with the current time.
    #[must_use]
    pub fn from_note(note: &Note, whiteboard_id: WhiteboardId) -> Self {
        Self {
            id: note.id,
            whiteboard_id,
            kind: note.kind,
            x: note.x,
            y: note.y,
            width: note.width,
            height: note.height,
            rotation: note.rotation,
            z_index: note.z_index,
            color: note.color,
            content: note.content.clone(),
            title: note.title(),
            image_url: note.image_url.clone(),
            font_size: note.font_size,
            updated_at: now_rfc3339(),
        }
    }
}

/// Note row as returned by the store; every field but `id` is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoteRecord {
    pub id: NoteId,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub rotation: Option<f64>,
    #[serde(default)]
    pub z_index: Option<i64>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub font_size: Option<u32>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl NoteRecord {
    /// Convert to a `Note`, applying load defaults and decoding reminder titles.
    #[must_use]
    pub fn into_note(self) -> Note {
        let kind = self.kind.as_deref().map_or(NoteKind::Sticky, parse_kind);
        let title = self.title.unwrap_or_default();
        Note {
            id: self.id,
            kind,
            x: self.x.unwrap_or(DEFAULT_NOTE_POS),
            y: self.y.unwrap_or(DEFAULT_NOTE_POS),
            width: self.width.unwrap_or(DEFAULT_NOTE_SIZE),
            height: self.height.unwrap_or(DEFAULT_NOTE_SIZE),
            rotation: self.rotation.unwrap_or(0.0),
            z_index: self.z_index.unwrap_or(DEFAULT_Z_INDEX),
            color: self.color.as_deref().map_or(NoteColor::Yellow, parse_color),
            content: self.content.unwrap_or_default(),
            variant: decode_variant(kind, title),
            image_url: self.image_url,
            font_size: self.font_size.unwrap_or(DEFAULT_FONT_SIZE),
            created_at: self.created_at.as_deref().map_or(0, parse_millis),
        }
    }
}

/// Decode a stored title into a note variant. Only sticky notes can be reminders.
#[must_use]
pub fn decode_variant(kind: NoteKind, title: String) -> NoteVariant {
    if kind == NoteKind::Sticky && reminder::is_reminder_title(&title) {
        let parsed = reminder::parse_title(&title);
        NoteVariant::Reminder { checked: parsed.checked, name: parsed.name }
    } else {
        NoteVariant::Plain { title }
    }
}

fn parse_kind(raw: &str) -> NoteKind {
    match raw {
        "text" => NoteKind::Text,
        "image" => NoteKind::Image,
        _ => NoteKind::Sticky,
    }
}

fn parse_color(raw: &str) -> NoteColor {
    match raw {
        "pink" => NoteColor::Pink,
        "blue" => NoteColor::Blue,
        "green" => NoteColor::Green,
        "transparent" => NoteColor::Transparent,
        _ => NoteColor::Yellow,
    }
}

// =============================================================================
// STROKES
// =============================================================================

/// Stroke row sent on upsert. `stroke_width` is omitted for stores whose
/// schema predates it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrokeRow {
    pub id: StrokeId,
    pub whiteboard_id: WhiteboardId,
    pub user_id: String,
    pub path_points: Vec<Point>,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
}

impl StrokeRow {
    /// Build the upsert row for `stroke`, with or without the width field.
    #[must_use]
    pub fn from_stroke(stroke: &Stroke, whiteboard_id: WhiteboardId, user_id: &str, with_width: bool) -> Self {
        Self {
            id: stroke.id,
            whiteboard_id,
            user_id: user_id.to_string(),
            path_points: stroke.points.clone(),
            color: stroke.color.clone(),
            stroke_width: with_width.then_some(stroke.thickness),
        }
    }
}

/// Stroke row as returned by the store.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StrokeRecord {
    pub id: StrokeId,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub whiteboard_id: Option<WhiteboardId>,
    #[serde(default, alias = "points")]
    pub path_points: Option<Vec<Point>>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub stroke_width: Option<f64>,
    #[serde(default)]
    pub thickness: Option<f64>,
}

impl StrokeRecord {
    /// Convert to a `Stroke`. Width comes from `stroke_width`, then
    /// `thickness`, then the default.
    #[must_use]
    pub fn into_stroke(self, whiteboard_id: WhiteboardId) -> Stroke {
        Stroke {
            id: self.id,
            user_id: self.user_id.unwrap_or_default(),
            whiteboard_id: self.whiteboard_id.unwrap_or(whiteboard_id),
            points: self.path_points.unwrap_or_default(),
            color: self.color.unwrap_or_else(|| DEFAULT_PEN_COLOR.to_string()),
            thickness: self.stroke_width.or(self.thickness).unwrap_or(DEFAULT_STROKE_WIDTH),
        }
    }
}

// =============================================================================
// WHITEBOARDS AND SHARES
// =============================================================================

/// Whiteboard container record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhiteboardRow {
    pub id: WhiteboardId,
    #[serde(default)]
    pub title: String,
}

/// Share record mapping a share id to a whiteboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareRow {
    pub id: Uuid,
    pub whiteboard_id: WhiteboardId,
}

// --- Response envelopes ---

#[derive(Debug, Default, Deserialize)]
pub struct BoardEnvelope {
    #[serde(default)]
    pub board: Option<WhiteboardRow>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BoardsEnvelope {
    #[serde(default)]
    pub boards: Vec<WhiteboardRow>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NotesEnvelope {
    #[serde(default)]
    pub notes: Vec<NoteRecord>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DrawingsEnvelope {
    #[serde(default)]
    pub drawings: Vec<StrokeRecord>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SharesEnvelope {
    #[serde(default)]
    pub shares: Vec<ShareRow>,
}

// =============================================================================
// TIME
// =============================================================================

/// Current UTC time as RFC 3339.
#[must_use]
pub fn now_rfc3339() -> String {
    OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default()
}

/// Current time in unix milliseconds.
#[must_use]
pub fn now_millis() -> i64 {
    to_millis(OffsetDateTime::now_utc())
}

fn parse_millis(raw: &str) -> i64 {
    OffsetDateTime::parse(raw, &Rfc3339).map_or(0, to_millis)
}

fn to_millis(at: OffsetDateTime) -> i64 {
    i64::try_from(at.unix_timestamp_nanos() / 1_000_000).unwrap_or_default()
}
