//! Note operations: creation, deletion, property edits and reminder edits.
//!
//! These are the `EngineCore` entry points driven by toolbar buttons, text
//! fields and the task picker rather than by raw pointer input. Each one that
//! changes the document records one history snapshot first and returns the
//! actions to persist: `NoteCreated` for new notes (written immediately),
//! `NoteChanged` for edits (debounced), `NotesDeleted` for removals.

#[cfg(test)]
#[path = "notes_test.rs"]
mod notes_test;

use rand::Rng;
use uuid::Uuid;

use crate::consts::{MAX_FONT_SIZE, MIN_FONT_SIZE, STICKY_TILT_DEG};
use crate::doc::{Note, NoteColor, NoteId, NoteKind, NoteVariant};
use crate::engine::{Action, EngineCore};
use crate::input::Tool;
use crate::reminder::{self, PLACEHOLDER_NAME, Task};
use crate::sync::wire::now_millis;
use crate::viewport::Point;

const REMINDER_SIZE: (f64, f64) = (360.0, 280.0);
const TASK_REMINDER_SIZE: (f64, f64) = (340.0, 260.0);
const TASK_JITTER: (f64, f64) = (60.0, 40.0);

/// Per-kind defaults for a new note.
struct Template {
    width: f64,
    height: f64,
    title: &'static str,
    color: NoteColor,
    font_size: u32,
    tilted: bool,
    /// Centered on the pointer; otherwise the top-left corner sits there.
    centered: bool,
}

fn template(kind: NoteKind) -> Template {
    match kind {
        NoteKind::Sticky => Template {
            width: 256.0,
            height: 256.0,
            title: "New Note",
            color: NoteColor::Yellow,
            font_size: 16,
            tilted: true,
            centered: true,
        },
        NoteKind::Text => Template {
            width: 400.0,
            height: 100.0,
            title: "Text Box",
            color: NoteColor::Transparent,
            font_size: 24,
            tilted: false,
            centered: false,
        },
        NoteKind::Image => Template {
            width: 300.0,
            height: 300.0,
            title: "Image",
            color: NoteColor::Transparent,
            font_size: 16,
            tilted: false,
            centered: true,
        },
    }
}

/// Small random tilt given to sticky notes and reminders.
fn tilt() -> f64 {
    rand::rng().random_range(-STICKY_TILT_DEG..STICKY_TILT_DEG)
}

impl EngineCore {
    // --- Creation ---

    /// Create a note of `kind` at canvas point `at`. Points outside the
    /// canvas are ignored.
    pub fn create_note(&mut self, kind: NoteKind, at: Point) -> Vec<Action> {
        self.create_with_image(kind, at, None)
    }

    /// Place an image note at `at`, or at the canvas center when `None`.
    /// The host supplies the image as a data URL or remote URL.
    pub fn add_image(&mut self, image_url: String, at: Option<Point>) -> Vec<Action> {
        let at = at.unwrap_or_else(|| self.viewport.canvas_center());
        self.create_with_image(NoteKind::Image, at, Some(image_url))
    }

    fn create_with_image(&mut self, kind: NoteKind, at: Point, image_url: Option<String>) -> Vec<Action> {
        if !self.viewport.contains(at) {
            return Vec::new();
        }
        self.snapshot();
        let t = template(kind);
        let (x, y) = if t.centered { (at.x - t.width / 2.0, at.y - t.height / 2.0) } else { (at.x, at.y) };
        let note = Note {
            id: Uuid::new_v4(),
            kind,
            x,
            y,
            width: t.width,
            height: t.height,
            rotation: if t.tilted { tilt() } else { 0.0 },
            z_index: self.z.next(),
            color: t.color,
            content: String::new(),
            variant: NoteVariant::Plain { title: t.title.to_string() },
            image_url,
            font_size: t.font_size,
            created_at: now_millis(),
        };
        self.place(note)
    }

    /// Create a reminder card centered on `at`, kept inside the canvas.
    pub fn add_reminder(&mut self, at: Point) -> Vec<Action> {
        self.snapshot();
        let (width, height) = REMINDER_SIZE;
        let size = self.viewport.canvas_size();
        let note = Note {
            x: (at.x - width / 2.0).min(size.width - width).max(0.0),
            y: (at.y - height / 2.0).min(size.height - height).max(0.0),
            ..self.reminder_note(width, height, PLACEHOLDER_NAME, reminder::set_date("", &reminder::today()))
        };
        self.place(note)
    }

    /// Create a reminder card from a task near the canvas center.
    pub fn add_task_reminder(&mut self, task: &Task) -> Vec<Action> {
        self.snapshot();
        let (width, height) = TASK_REMINDER_SIZE;
        let size = self.viewport.canvas_size();
        let mut rng = rand::rng();
        let jitter_x = rng.random_range(-TASK_JITTER.0..TASK_JITTER.0);
        let jitter_y = rng.random_range(-TASK_JITTER.1..TASK_JITTER.1);
        let name = task.title.trim();
        let name = if name.is_empty() { PLACEHOLDER_NAME } else { name };
        let note = Note {
            x: (size.width / 2.0 - width / 2.0 + jitter_x).min(size.width - width).max(0.0),
            y: (size.height / 2.0 - height / 2.0 + jitter_y).min(size.height - height).max(0.0),
            ..self.reminder_note(width, height, name, reminder::content_from_task(task, &reminder::today()))
        };
        self.place(note)
    }

    fn reminder_note(&mut self, width: f64, height: f64, name: &str, content: String) -> Note {
        Note {
            id: Uuid::new_v4(),
            kind: NoteKind::Sticky,
            x: 0.0,
            y: 0.0,
            width,
            height,
            rotation: tilt(),
            z_index: self.z.next(),
            color: NoteColor::Pink,
            content,
            variant: NoteVariant::Reminder { checked: false, name: name.to_string() },
            image_url: None,
            font_size: 16,
            created_at: now_millis(),
        }
    }

    /// Insert a new note, select it and return to the select tool.
    fn place(&mut self, note: Note) -> Vec<Action> {
        self.doc.insert_note(note.clone());
        self.ui.select_only(note.id);
        let mut actions = vec![Action::NoteCreated(note)];
        actions.extend(self.set_tool(Tool::Select));
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Selection-wide edits ---

    /// Delete every selected note.
    pub fn delete_selected(&mut self) -> Vec<Action> {
        if self.ui.selection.is_empty() {
            return Vec::new();
        }
        self.snapshot();
        let removed = self.doc.remove_notes(&self.ui.selection);
        self.ui.selection.clear();
        self.ui.show_color_picker = false;
        vec![Action::NotesDeleted(removed), Action::RenderNeeded]
    }

    /// Set the color of every selected note and close the picker.
    pub fn recolor(&mut self, color: NoteColor) -> Vec<Action> {
        self.ui.show_color_picker = false;
        self.edit_selection(|n| n.color = color)
    }

    /// Step the font size of every selected note by `delta` points, clamped.
    pub fn change_font_size(&mut self, delta: i32) -> Vec<Action> {
        self.edit_selection(|n| {
            let next = (i64::from(n.font_size) + i64::from(delta))
                .clamp(i64::from(MIN_FONT_SIZE), i64::from(MAX_FONT_SIZE));
            n.font_size = u32::try_from(next).unwrap_or(MIN_FONT_SIZE);
        })
    }

    fn edit_selection<F>(&mut self, edit: F) -> Vec<Action>
    where
        F: Fn(&mut Note),
    {
        if self.ui.selection.is_empty() {
            return Vec::new();
        }
        self.snapshot();
        let ids: Vec<NoteId> = self.ui.selection.iter().copied().collect();
        let mut actions: Vec<Action> = ids
            .iter()
            .filter_map(|id| self.doc.update_note(id, &edit))
            .map(Action::NoteChanged)
            .collect();
        actions.push(Action::RenderNeeded);
        actions
    }

    pub fn toggle_color_picker(&mut self) {
        self.ui.show_color_picker = !self.ui.show_color_picker && !self.ui.selection.is_empty();
    }

    // --- Single-note edits ---

    /// Replace a note's body text. The first change in an edit session
    /// records the snapshot; later keystrokes only reschedule the save.
    pub fn set_content(&mut self, id: NoteId, content: &str) -> Vec<Action> {
        if self.doc.note(&id).is_none_or(|n| n.content == content) {
            return Vec::new();
        }
        self.snapshot_for_edit(id);
        self.changed(id, |n| n.content = content.to_string())
    }

    /// Give a note the next z-index. Returns the raised note.
    pub fn bring_to_front(&mut self, id: &NoteId) -> Option<Note> {
        self.doc.note(id)?;
        let z = self.z.next();
        self.doc.update_note(id, |n| n.z_index = z)
    }

    /// Select `id` (unless already selected) and raise it.
    pub fn select_and_bring_to_front(&mut self, id: NoteId) -> Vec<Action> {
        if !self.ui.selection.contains(&id) {
            self.ui.select_only(id);
        }
        match self.bring_to_front(&id) {
            Some(note) => vec![Action::NoteChanged(note), Action::RenderNeeded],
            None => Vec::new(),
        }
    }

    // --- Reminders ---

    /// Flip a reminder's checkbox.
    pub fn toggle_checked(&mut self, id: NoteId) -> Vec<Action> {
        if !self.doc.note(&id).is_some_and(Note::is_reminder) {
            return Vec::new();
        }
        self.snapshot();
        self.changed(id, |n| {
            if let NoteVariant::Reminder { checked, .. } = &mut n.variant {
                *checked = !*checked;
            }
        })
    }

    /// Rename a reminder, keeping its checked state. Blank names are ignored.
    pub fn rename_reminder(&mut self, id: NoteId, name: &str) -> Vec<Action> {
        let name = name.trim();
        let Some(NoteVariant::Reminder { name: current, .. }) = self.doc.note(&id).map(|n| &n.variant) else {
            return Vec::new();
        };
        if name.is_empty() || name == current.as_str() {
            return Vec::new();
        }
        self.snapshot();
        self.changed(id, |n| {
            if let NoteVariant::Reminder { name: slot, .. } = &mut n.variant {
                *slot = name.to_string();
            }
        })
    }

    /// Write `date` (`YYYY-MM-DD`) into a note's date line. Empty dates are ignored.
    pub fn set_reminder_date(&mut self, id: NoteId, date: &str) -> Vec<Action> {
        if date.is_empty() || self.doc.note(&id).is_none() {
            return Vec::new();
        }
        self.snapshot();
        self.changed(id, |n| n.content = reminder::set_date(&n.content, date))
    }

    fn changed<F>(&mut self, id: NoteId, edit: F) -> Vec<Action>
    where
        F: FnOnce(&mut Note),
    {
        match self.doc.update_note(&id, edit) {
            Some(note) => vec![Action::NoteChanged(note), Action::RenderNeeded],
            None => Vec::new(),
        }
    }
}
