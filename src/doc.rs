//! Document model: notes, ink strokes, and the in-memory entity store.
//!
//! This module defines what lives on the canvas (`Note`, `Stroke`) and the
//! store that owns all live entities (`DocStore`). Reminder-ness is an
//! explicit `NoteVariant` here; the prefix-encoded title only exists at the
//! wire boundary (see [`crate::sync::wire`]).
//!
//! The store hands out clones for history snapshots and sync payloads, so a
//! snapshot taken before an edit is never altered by that edit.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::{MIN_NOTE_SIZE, MIN_TEXT_HEIGHT, Z_INDEX_FLOOR};
use crate::history::Snapshot;
use crate::reminder;
use crate::viewport::{Orientation, Point, reorient_center};

/// Unique identifier for a note.
pub type NoteId = Uuid;

/// Unique identifier for an ink stroke.
pub type StrokeId = Uuid;

/// Identifier of the remote whiteboard container.
pub type WhiteboardId = Uuid;

/// The kind of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteKind {
    /// Colored square sticky note.
    #[default]
    Sticky,
    /// Borderless text box.
    Text,
    /// Embedded image.
    Image,
}

/// Background color of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteColor {
    #[default]
    Yellow,
    Pink,
    Blue,
    Green,
    /// Used by text and image notes.
    Transparent,
}

/// Presentation/behavior variant of a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteVariant {
    /// Ordinary note; the title is a plain caption.
    Plain { title: String },
    /// Reminder card with a checkbox and a task name.
    Reminder { checked: bool, name: String },
}

impl Default for NoteVariant {
    fn default() -> Self {
        Self::Plain { title: String::new() }
    }
}

/// A rectangular canvas entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub id: NoteId,
    pub kind: NoteKind,
    /// Left edge in canvas units.
    pub x: f64,
    /// Top edge in canvas units.
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Clockwise rotation in degrees; not normalized.
    pub rotation: f64,
    /// Stacking order; higher draws on top.
    pub z_index: i64,
    pub color: NoteColor,
    pub content: String,
    pub variant: NoteVariant,
    /// Data URL or remote URL, only for image notes.
    pub image_url: Option<String>,
    /// Font size in points, within `[MIN_FONT_SIZE, MAX_FONT_SIZE]`.
    pub font_size: u32,
    /// Client-assigned creation time in unix milliseconds.
    pub created_at: i64,
}

impl Note {
    /// Center of the note's bounding box.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Move the note so its center lands on `center`, keeping its size.
    pub fn recenter(&mut self, center: Point) {
        self.x = center.x - self.width / 2.0;
        self.y = center.y - self.height / 2.0;
    }

    /// Smallest height a resize may produce.
    #[must_use]
    pub fn min_height(&self) -> f64 {
        if self.kind == NoteKind::Text { MIN_TEXT_HEIGHT } else { MIN_NOTE_SIZE }
    }

    /// Whether this note renders and behaves as a reminder card.
    #[must_use]
    pub fn is_reminder(&self) -> bool {
        self.kind == NoteKind::Sticky && matches!(self.variant, NoteVariant::Reminder { .. })
    }

    /// Title as stored on the wire: reminders carry their checkbox prefix.
    #[must_use]
    pub fn title(&self) -> String {
        match &self.variant {
            NoteVariant::Plain { title } => title.clone(),
            NoteVariant::Reminder { checked, name } => reminder::format_title(*checked, name),
        }
    }
}

/// A freehand ink stroke.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub id: StrokeId,
    pub user_id: String,
    pub whiteboard_id: WhiteboardId,
    /// Path in canvas units; append-only while drawing.
    pub points: Vec<Point>,
    /// Color token (name or hex).
    pub color: String,
    /// Stroke width in canvas units.
    pub thickness: f64,
}

/// Monotonic z-index allocator shared by all notes.
#[derive(Debug, Clone, Copy)]
pub struct ZPool {
    top: i64,
}

impl Default for ZPool {
    fn default() -> Self {
        Self { top: Z_INDEX_FLOOR }
    }
}

impl ZPool {
    /// Allocate the next z-index above everything handed out so far.
    pub fn next(&mut self) -> i64 {
        self.top += 1;
        self.top
    }

    /// Raise the pool to at least `max(observed, Z_INDEX_FLOOR)`. Never lowers it.
    pub fn advance_to(&mut self, observed: Option<i64>) {
        let floor = observed.unwrap_or(Z_INDEX_FLOOR).max(Z_INDEX_FLOOR);
        self.top = self.top.max(floor);
    }

    /// Highest z-index allocated or observed.
    #[must_use]
    pub fn top(&self) -> i64 {
        self.top
    }
}

/// In-memory store of notes and strokes, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct DocStore {
    notes: Vec<Note>,
    strokes: Vec<Stroke>,
}

impl DocStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Notes ---

    #[must_use]
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    #[must_use]
    pub fn note(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == *id)
    }

    /// Append a note.
    pub fn insert_note(&mut self, note: Note) {
        self.notes.push(note);
    }

    /// Apply `edit` to the note with `id` and return a copy of the result.
    pub fn update_note<F>(&mut self, id: &NoteId, edit: F) -> Option<Note>
    where
        F: FnOnce(&mut Note),
    {
        let note = self.notes.iter_mut().find(|n| n.id == *id)?;
        edit(note);
        Some(note.clone())
    }

    /// Remove every note whose id is in `ids`. Returns the ids actually removed.
    pub fn remove_notes(&mut self, ids: &HashSet<NoteId>) -> Vec<NoteId> {
        let removed = self
            .notes
            .iter()
            .filter(|n| ids.contains(&n.id))
            .map(|n| n.id)
            .collect();
        self.notes.retain(|n| !ids.contains(&n.id));
        removed
    }

    /// Return notes sorted by `(z_index, id)` for draw order.
    #[must_use]
    pub fn sorted_notes(&self) -> Vec<&Note> {
        let mut notes: Vec<&Note> = self.notes.iter().collect();
        notes.sort_by(|a, b| a.z_index.cmp(&b.z_index).then_with(|| a.id.cmp(&b.id)));
        notes
    }

    /// Highest z-index among notes, if any.
    #[must_use]
    pub fn max_z_index(&self) -> Option<i64> {
        self.notes.iter().map(|n| n.z_index).max()
    }

    /// Rotate every note's center into the canvas of orientation `to`.
    pub fn reorient(&mut self, to: Orientation) {
        for note in &mut self.notes {
            let center = reorient_center(note.center(), to);
            note.recenter(center);
        }
    }

    // --- Strokes ---

    #[must_use]
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    #[must_use]
    pub fn stroke(&self, id: &StrokeId) -> Option<&Stroke> {
        self.strokes.iter().find(|s| s.id == *id)
    }

    /// Append a stroke.
    pub fn push_stroke(&mut self, stroke: Stroke) {
        self.strokes.push(stroke);
    }

    /// Append a point to a stroke's path. Returns false if the stroke is gone.
    pub fn append_point(&mut self, id: &StrokeId, point: Point) -> bool {
        let Some(stroke) = self.strokes.iter_mut().find(|s| s.id == *id) else {
            return false;
        };
        stroke.points.push(point);
        true
    }

    /// Remove a stroke by id, returning it if it was present.
    pub fn remove_stroke(&mut self, id: &StrokeId) -> Option<Stroke> {
        let idx = self.strokes.iter().position(|s| s.id == *id)?;
        Some(self.strokes.remove(idx))
    }

    /// Remove every stroke, returning their ids.
    pub fn clear_strokes(&mut self) -> Vec<StrokeId> {
        self.strokes.drain(..).map(|s| s.id).collect()
    }

    // --- Whole-document ---

    /// Replace all notes (e.g. after a remote load).
    pub fn load_notes(&mut self, notes: Vec<Note>) {
        self.notes = notes;
    }

    /// Replace all strokes (e.g. after a remote load).
    pub fn load_strokes(&mut self, strokes: Vec<Stroke>) {
        self.strokes = strokes;
    }

    /// Deep copy of the current notes and strokes.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot { notes: self.notes.clone(), strokes: self.strokes.clone() }
    }

    /// Replace both collections with a snapshot's contents.
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.notes = snapshot.notes;
        self.strokes = snapshot.strokes;
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
