//! Interaction engine: the pointer/keyboard state machine over the document.
//!
//! DESIGN
//! ======
//! `EngineCore` is fully synchronous. Each input handler mutates the
//! document, selection and gesture state, then returns the [`Action`]s the
//! outside world must carry out: persistence (note/stroke writes, history
//! reconciliation) and host effects (scrolling, cursor, pointer capture).
//! `Engine` pairs the core with a [`SyncEngine`] and routes the persistence
//! actions to it, so the core stays testable without a runtime.
//!
//! Every undoable action records exactly one history snapshot when it starts.
//! A drag records at pointer-down; its per-frame updates only emit
//! `NoteChanged`, which the sync engine debounces.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use tracing::debug;
use uuid::Uuid;

use crate::consts::{ERASER_CURSOR, MIN_NOTE_SIZE};
use crate::doc::{DocStore, Note, NoteId, NoteKind, Stroke, StrokeId, WhiteboardId, ZPool};
use crate::history::{History, Snapshot};
use crate::hit::{HitPart, hit_test, path_near, rotate, strokes_near};
use crate::input::{Button, DragState, InkState, Key, Modifiers, ResizeHandle, TextFocus, Tool, UiState};
use crate::sync::remote::SyncError;
use crate::sync::{Loaded, SyncEngine, SyncFailure};
use crate::viewport::{ContentRect, Point, ScrollOffset, Viewport};

/// Effects returned from input handlers for the host and sync layer to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A note was created; persist immediately.
    NoteCreated(Note),
    /// A note's fields changed; persist after the debounce window.
    NoteChanged(Note),
    /// Notes were removed locally; delete them remotely.
    NotesDeleted(Vec<NoteId>),
    /// A finished stroke; persist if long enough.
    StrokeCommitted(Stroke),
    /// Strokes were removed locally; delete them remotely.
    StrokesDeleted(Vec<StrokeId>),
    /// Undo/redo replaced the document; bring the store in line.
    HistoryRestored { before: Snapshot, after: Snapshot },
    /// Set the scroll container's offsets.
    ScrollTo(ScrollOffset),
    SetCursor(String),
    /// A gesture started; deliver pointer-up even outside the canvas.
    CapturePointer,
    /// The gesture ended; the pointer-up subscription can be dropped.
    ReleasePointer,
    /// Suppress the browser's default handling of the event.
    PreventDefault,
    RenderNeeded,
}

/// Core engine state: everything except the network.
pub struct EngineCore {
    pub doc: DocStore,
    pub viewport: Viewport,
    pub ui: UiState,
    pub input: DragState,
    pub ink: InkState,
    pub history: History,
    pub z: ZPool,
    /// Author recorded on new strokes.
    pub user_id: String,
    /// Whiteboard recorded on new strokes.
    pub whiteboard_id: WhiteboardId,
    /// Note whose content edit session has already taken its snapshot.
    editing: Option<NoteId>,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self {
            doc: DocStore::new(),
            viewport: Viewport::default(),
            ui: UiState::default(),
            input: DragState::default(),
            ink: InkState::default(),
            history: History::new(),
            z: ZPool::default(),
            user_id: String::new(),
            whiteboard_id: Uuid::nil(),
            editing: None,
        }
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Core sized for a viewport `width` CSS pixels wide.
    #[must_use]
    pub fn for_viewport_width(width: f64) -> Self {
        Self { viewport: Viewport::for_width(width), ..Self::default() }
    }

    // --- Data inputs ---

    /// Replace local collections with a remote load. `None` keeps the local
    /// collection. History, selection and any live stroke are dropped.
    pub fn load(&mut self, notes: Option<Vec<Note>>, strokes: Option<Vec<Stroke>>) {
        if let Some(notes) = notes {
            self.doc.load_notes(notes);
            self.z.advance_to(self.doc.max_z_index());
        }
        if let Some(strokes) = strokes {
            self.doc.load_strokes(strokes);
        }
        self.ui.selection.retain(|id| self.doc.note(id).is_some());
        self.history.clear();
        self.ink.reset();
        self.input = DragState::Idle;
        self.editing = None;
    }

    /// Report the content element's on-screen origin (`None` when unmounted).
    pub fn set_content_rect(&mut self, rect: Option<ContentRect>) {
        self.viewport.content = rect;
    }

    /// Report the scroll container's current offsets.
    pub fn set_scroll(&mut self, scroll: ScrollOffset) {
        self.viewport.scroll = scroll;
    }

    /// Record the state before an undoable action.
    pub(crate) fn snapshot(&mut self) {
        self.history.record(self.doc.snapshot());
        self.editing = None;
    }

    /// Take the content-edit snapshot once per edit session of `id`.
    pub(crate) fn snapshot_for_edit(&mut self, id: NoteId) {
        if self.editing != Some(id) {
            self.snapshot();
            self.editing = Some(id);
        }
    }

    // --- Tool / focus ---

    /// Select a tool explicitly. Cancels a Space-hold and any live stroke.
    pub fn set_tool(&mut self, tool: Tool) -> Vec<Action> {
        self.ui.space_restore = None;
        self.switch_tool(tool)
    }

    fn switch_tool(&mut self, tool: Tool) -> Vec<Action> {
        let mut actions = Vec::new();
        if tool != Tool::Pen {
            if let Some(id) = self.ink.stroke_id {
                debug!(stroke_id = %id, "live stroke discarded on tool change");
                self.doc.remove_stroke(&id);
                self.ink.reset();
                actions.push(Action::RenderNeeded);
            }
        }
        self.ui.tool = tool;
        actions.push(Action::SetCursor(self.cursor().to_string()));
        actions
    }

    /// Move keyboard focus. Leaving a field ends its edit session.
    pub fn set_focus(&mut self, focus: Option<TextFocus>) {
        let still_editing = matches!(focus, Some(TextFocus::Content(id)) if self.editing == Some(id));
        if !still_editing {
            self.editing = None;
        }
        self.ui.focus = focus;
    }

    pub fn set_pen_color(&mut self, color: &str) {
        self.ui.pen_color = color.to_string();
    }

    pub fn set_pen_thickness(&mut self, thickness: f64) {
        self.ui.pen_thickness = thickness;
    }

    // --- Viewport ---

    /// Add `delta` to the zoom scale (clamped).
    pub fn zoom(&mut self, delta: f64) -> Vec<Action> {
        self.viewport.zoom(delta);
        vec![Action::RenderNeeded]
    }

    /// Ctrl/Cmd + wheel zooms; a plain wheel is left to native scrolling.
    pub fn on_wheel(&mut self, delta_y: f64, modifiers: Modifiers) -> Vec<Action> {
        if self.viewport.on_wheel(delta_y, modifiers.command()) {
            vec![Action::PreventDefault, Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }

    /// Track a viewport width change, rotating notes when the orientation
    /// flips. Not persisted: the stored layout is orientation-independent.
    pub fn resize_viewport(&mut self, width: f64) -> Vec<Action> {
        match self.viewport.resize(width) {
            Some(orientation) => {
                debug!(?orientation, "canvas orientation changed");
                self.doc.reorient(orientation);
                vec![Action::RenderNeeded]
            }
            None => Vec::new(),
        }
    }

    // --- Pointer ---

    pub fn on_pointer_down(&mut self, screen: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        if button != Button::Primary {
            return Vec::new();
        }
        self.ui.pointer_down = true;
        let pt = self.viewport.screen_to_canvas(screen);

        match self.ui.tool {
            Tool::Pen => self.begin_stroke(pt),
            Tool::Eraser => {
                if !self.doc.strokes().is_empty() {
                    self.snapshot();
                }
                let mut actions = vec![Action::CapturePointer];
                actions.extend(self.erase_at(pt));
                actions
            }
            Tool::Hand => {
                self.input = DragState::Panning { origin: screen, scroll_origin: self.viewport.scroll };
                vec![Action::CapturePointer, Action::SetCursor(self.cursor().to_string())]
            }
            Tool::Note => self.create_note(NoteKind::Sticky, pt),
            Tool::Text => self.create_note(NoteKind::Text, pt),
            Tool::Reminder => self.add_reminder(pt),
            Tool::Select | Tool::Image => self.select_at(pt, modifiers),
        }
    }

    pub fn on_pointer_move(&mut self, screen: Point, _modifiers: Modifiers) -> Vec<Action> {
        let pt = self.viewport.screen_to_canvas(screen);
        if self.ink.drawing && self.ui.tool == Tool::Pen {
            return self.extend_stroke(pt);
        }
        if self.ui.tool == Tool::Eraser && self.ui.pointer_down {
            return self.erase_at(pt);
        }

        let next = match &self.input {
            DragState::Idle => return Vec::new(),
            DragState::Panning { origin, scroll_origin } => {
                let scroll = ScrollOffset {
                    x: scroll_origin.x - (screen.x - origin.x),
                    y: scroll_origin.y - (screen.y - origin.y),
                };
                self.viewport.scroll = scroll;
                return vec![Action::PreventDefault, Action::ScrollTo(scroll)];
            }
            DragState::Moving { origin, start } => Note {
                x: start.x + (pt.x - origin.x),
                y: start.y + (pt.y - origin.y),
                ..(**start).clone()
            },
            DragState::Rotating { origin, start } => {
                Note { rotation: rotated(start, *origin, pt), ..(**start).clone() }
            }
            DragState::Resizing { origin, start, handle } => {
                resized(start, *handle, Point::new(pt.x - origin.x, pt.y - origin.y))
            }
        };
        self.apply_geometry(&next)
    }

    /// Global pointer-up: ends any gesture wherever the pointer is.
    pub fn on_pointer_up(&mut self, _screen: Point, button: Button, _modifiers: Modifiers) -> Vec<Action> {
        if button == Button::Primary {
            self.ui.pointer_down = false;
        }
        let mut actions = Vec::new();
        if !self.input.is_idle() || self.ink.drawing || self.ui.tool == Tool::Eraser {
            actions.push(Action::ReleasePointer);
        }
        self.input = DragState::Idle;

        if self.ink.drawing && !self.ink.cancelled && !self.ink.path.is_empty() {
            if let Some(stroke) = self.ink.stroke_id.and_then(|id| self.doc.stroke(&id)) {
                actions.push(Action::StrokeCommitted(stroke.clone()));
            }
        }
        self.ink.reset();

        actions.push(Action::SetCursor(self.cursor().to_string()));
        actions.push(Action::RenderNeeded);
        actions
    }

    fn select_at(&mut self, pt: Point, modifiers: Modifiers) -> Vec<Action> {
        let Some(hit) = hit_test(pt, &self.doc, &self.viewport, self.ui.single_selection()) else {
            self.ui.selection.clear();
            self.ui.show_color_picker = false;
            return vec![Action::RenderNeeded];
        };
        let Some(start) = self.doc.note(&hit.note_id).cloned() else {
            return Vec::new();
        };

        let mut actions = Vec::new();
        match hit.part {
            HitPart::Rotate => {
                self.snapshot();
                self.input = DragState::Rotating { origin: pt, start: Box::new(start) };
            }
            HitPart::Resize(handle) => {
                self.snapshot();
                self.input = DragState::Resizing { origin: pt, start: Box::new(start), handle };
            }
            HitPart::Body => {
                if !self.ui.selection.contains(&start.id) && !modifiers.shift {
                    self.ui.select_only(start.id);
                }
                self.snapshot();
                let start = match self.bring_to_front(&start.id) {
                    Some(raised) => {
                        actions.push(Action::NoteChanged(raised.clone()));
                        raised
                    }
                    None => start,
                };
                self.input = DragState::Moving { origin: pt, start: Box::new(start) };
            }
        }
        actions.push(Action::CapturePointer);
        actions.push(Action::SetCursor(self.cursor().to_string()));
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Copy a gesture frame's geometry onto the live note.
    fn apply_geometry(&mut self, next: &Note) -> Vec<Action> {
        let changed = self.doc.update_note(&next.id, |n| {
            n.x = next.x;
            n.y = next.y;
            n.width = next.width;
            n.height = next.height;
            n.rotation = next.rotation;
        });
        match changed {
            Some(note) => vec![Action::NoteChanged(note), Action::RenderNeeded],
            None => Vec::new(),
        }
    }

    // --- Ink ---

    fn begin_stroke(&mut self, pt: Point) -> Vec<Action> {
        self.snapshot();
        let stroke = Stroke {
            id: Uuid::new_v4(),
            user_id: self.user_id.clone(),
            whiteboard_id: self.whiteboard_id,
            points: vec![pt],
            color: self.ui.pen_color.clone(),
            thickness: self.ui.pen_thickness,
        };
        self.ink = InkState { drawing: true, path: vec![pt], stroke_id: Some(stroke.id), cancelled: false };
        self.doc.push_stroke(stroke);
        vec![Action::CapturePointer, Action::RenderNeeded]
    }

    fn extend_stroke(&mut self, pt: Point) -> Vec<Action> {
        if self.ink.cancelled {
            return Vec::new();
        }
        self.ink.path.push(pt);
        match self.ink.stroke_id {
            Some(id) if self.doc.append_point(&id, pt) => vec![Action::RenderNeeded],
            _ => Vec::new(),
        }
    }

    /// Erase at `pt`: the live stroke first, otherwise every committed
    /// stroke within the eraser radius.
    fn erase_at(&mut self, pt: Point) -> Vec<Action> {
        if let Some(live) = self.ink.stroke_id {
            if path_near(&self.ink.path, pt) {
                self.ink.cancel();
                self.doc.remove_stroke(&live);
                return vec![Action::RenderNeeded];
            }
        }

        let mut hits = strokes_near(self.doc.strokes(), pt);
        if hits.is_empty() {
            return Vec::new();
        }
        for id in &hits {
            self.doc.remove_stroke(id);
        }
        if let Some(live) = self.ink.stroke_id.filter(|id| hits.contains(id)) {
            self.ink.cancel();
            hits.retain(|id| *id != live);
        }
        vec![Action::StrokesDeleted(hits), Action::RenderNeeded]
    }

    /// Remove every stroke in one undoable step. No-op without strokes.
    pub fn clear_drawings(&mut self) -> Vec<Action> {
        if self.doc.strokes().is_empty() {
            return Vec::new();
        }
        self.snapshot();
        let mut ids = self.doc.clear_strokes();
        if let Some(live) = self.ink.stroke_id {
            ids.retain(|id| *id != live);
            self.ink.cancel();
        }
        vec![Action::StrokesDeleted(ids), Action::RenderNeeded]
    }

    // --- Keyboard ---

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        if self.ui.focus.is_some() {
            return Vec::new();
        }
        if modifiers.command() && key.is("z") {
            return if modifiers.shift { self.redo() } else { self.undo() };
        }
        if modifiers.command() && key.is("y") {
            return self.redo();
        }
        if key.is("Delete") || key.is("Backspace") {
            return self.delete_selected();
        }
        if key.is_space() {
            let mut actions = vec![Action::PreventDefault];
            if self.ui.tool != Tool::Hand {
                self.ui.space_restore = Some(self.ui.tool);
                actions.extend(self.switch_tool(Tool::Hand));
            }
            return actions;
        }
        if modifiers.command() || modifiers.alt {
            return Vec::new();
        }
        match Tool::from_shortcut(&key.0) {
            Some(tool) => self.set_tool(tool),
            None => Vec::new(),
        }
    }

    /// Releasing Space returns to the tool active before the hold.
    pub fn on_key_up(&mut self, key: &Key, _modifiers: Modifiers) -> Vec<Action> {
        if !key.is_space() {
            return Vec::new();
        }
        match self.ui.space_restore.take() {
            Some(previous) => self.switch_tool(previous),
            None => Vec::new(),
        }
    }

    // --- History ---

    pub fn undo(&mut self) -> Vec<Action> {
        let current = self.doc.snapshot();
        match self.history.undo(current.clone()) {
            Some(previous) => self.restore(current, previous),
            None => Vec::new(),
        }
    }

    pub fn redo(&mut self) -> Vec<Action> {
        let current = self.doc.snapshot();
        match self.history.redo(current.clone()) {
            Some(next) => self.restore(current, next),
            None => Vec::new(),
        }
    }

    fn restore(&mut self, before: Snapshot, after: Snapshot) -> Vec<Action> {
        self.doc.restore(after.clone());
        self.z.advance_to(self.doc.max_z_index());
        self.ui.selection.clear();
        self.ui.show_color_picker = false;
        self.input = DragState::Idle;
        self.editing = None;
        if self.ink.stroke_id.is_some_and(|id| self.doc.stroke(&id).is_none()) {
            self.ink.reset();
        }
        vec![Action::HistoryRestored { before, after }, Action::RenderNeeded]
    }

    // --- Queries ---

    /// CSS cursor for the current tool and gesture.
    #[must_use]
    pub fn cursor(&self) -> &'static str {
        if matches!(self.input, DragState::Panning { .. }) || self.ui.tool == Tool::Hand {
            return "grabbing";
        }
        match self.ui.tool {
            Tool::Eraser => return ERASER_CURSOR,
            Tool::Note | Tool::Reminder | Tool::Text | Tool::Pen => return "crosshair",
            _ => {}
        }
        match &self.input {
            DragState::Rotating { .. } => "alias",
            DragState::Resizing { handle, .. } => handle.cursor(),
            _ => "default",
        }
    }

    /// The note the property toolbar applies to: set only with exactly one selection.
    #[must_use]
    pub fn selected_note(&self) -> Option<&Note> {
        self.ui.single_selection().and_then(|id| self.doc.note(&id))
    }

    #[must_use]
    pub fn note(&self, id: &NoteId) -> Option<&Note> {
        self.doc.note(id)
    }

    /// Whether a content edit session is open for `id`.
    #[must_use]
    pub fn is_editing(&self, id: &NoteId) -> bool {
        self.editing == Some(*id)
    }
}

// =============================================================================
// GESTURE GEOMETRY
// =============================================================================

/// Rotation after dragging the rotate handle from `origin` to `pt`, in degrees.
/// Not normalized: repeated turns accumulate past ±360.
#[must_use]
pub fn rotated(start: &Note, origin: Point, pt: Point) -> f64 {
    let c = start.center();
    let from = (origin.y - c.y).atan2(origin.x - c.x);
    let to = (pt.y - c.y).atan2(pt.x - c.x);
    start.rotation + (to - from).to_degrees()
}

/// Bounds after dragging `handle` by the canvas-space `delta`.
///
/// The delta is taken into the note's unrotated frame so the handle follows
/// the pointer on rotated notes. Size is floored at the minimum, and the
/// position shifts so the opposite edge or corner stays where it was.
#[must_use]
pub fn resized(start: &Note, handle: ResizeHandle, delta: Point) -> Note {
    let rad = start.rotation.to_radians();
    let local = rotate(delta, -rad);

    let mut width = start.width;
    let mut height = start.height;
    if handle.left() {
        width -= local.x;
    } else if handle.right() {
        width += local.x;
    }
    if handle.top() {
        height -= local.y;
    } else if handle.bottom() {
        height += local.y;
    }
    let width = width.max(MIN_NOTE_SIZE);
    let height = height.max(start.min_height());

    let w_diff = width - start.width;
    let h_diff = height - start.height;
    let shift_x = if handle.left() {
        -w_diff / 2.0
    } else if handle.right() {
        w_diff / 2.0
    } else {
        0.0
    };
    let shift_y = if handle.top() {
        -h_diff / 2.0
    } else if handle.bottom() {
        h_diff / 2.0
    } else {
        0.0
    };
    let shift = rotate(Point::new(shift_x, shift_y), rad);

    Note {
        x: start.x + shift.x - w_diff / 2.0,
        y: start.y + shift.y - h_diff / 2.0,
        width,
        height,
        ..start.clone()
    }
}

// =============================================================================
// ENGINE
// =============================================================================

/// The full engine: `EngineCore` plus persistence.
///
/// Handlers delegate to the core and pass the returned actions through the
/// sync engine before handing them back to the host.
pub struct Engine {
    pub core: EngineCore,
    sync: SyncEngine,
}

impl Engine {
    #[must_use]
    pub fn new(mut core: EngineCore, sync: SyncEngine) -> Self {
        core.user_id = sync.user_id().unwrap_or_default().to_string();
        core.whiteboard_id = sync.whiteboard_id();
        Self { core, sync }
    }

    #[must_use]
    pub fn sync(&self) -> &SyncEngine {
        &self.sync
    }

    // --- Loading / identity ---

    /// Bootstrap the whiteboard and apply the result.
    ///
    /// Returns `Ok(false)` when loading is gated off or the result went stale.
    ///
    /// # Errors
    ///
    /// Returns a [`SyncError`] if the whiteboard record could not be fetched
    /// or created.
    pub async fn load(&mut self) -> Result<bool, SyncError> {
        let Some(pending) = self.sync.bootstrap() else {
            return Ok(false);
        };
        let loaded = pending.await?;
        Ok(self.apply_load(loaded))
    }

    /// Apply a bootstrap result unless a newer identity superseded it.
    pub fn apply_load(&mut self, loaded: Loaded) -> bool {
        if !self.sync.accept_load(&loaded) {
            return false;
        }
        self.core.whiteboard_id = loaded.whiteboard_id;
        self.core.load(loaded.notes, loaded.strokes);
        true
    }

    pub fn set_user(&mut self, user_id: Option<String>) {
        self.core.user_id = user_id.clone().unwrap_or_default();
        self.sync.set_user(user_id);
    }

    pub fn set_whiteboard(&mut self, whiteboard_id: Option<WhiteboardId>) {
        self.sync.set_whiteboard(whiteboard_id);
        self.core.whiteboard_id = self.sync.whiteboard_id();
    }

    pub fn set_offline(&mut self, offline: bool) {
        self.sync.set_offline(offline);
    }

    /// Writes that failed after every fallback.
    #[must_use]
    pub fn sync_failures(&self) -> Vec<SyncFailure> {
        self.sync.failures()
    }

    /// Wait for every scheduled and in-flight write.
    pub async fn settle(&mut self) {
        self.sync.settle().await;
    }

    // --- Delegated inputs ---

    pub fn on_pointer_down(&mut self, screen: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        let actions = self.core.on_pointer_down(screen, button, modifiers);
        self.persist(actions)
    }

    pub fn on_pointer_move(&mut self, screen: Point, modifiers: Modifiers) -> Vec<Action> {
        let actions = self.core.on_pointer_move(screen, modifiers);
        self.persist(actions)
    }

    pub fn on_pointer_up(&mut self, screen: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        let actions = self.core.on_pointer_up(screen, button, modifiers);
        self.persist(actions)
    }

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        let actions = self.core.on_key_down(key, modifiers);
        self.persist(actions)
    }

    pub fn on_key_up(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        let actions = self.core.on_key_up(key, modifiers);
        self.persist(actions)
    }

    pub fn set_tool(&mut self, tool: Tool) -> Vec<Action> {
        let actions = self.core.set_tool(tool);
        self.persist(actions)
    }

    pub fn undo(&mut self) -> Vec<Action> {
        let actions = self.core.undo();
        self.persist(actions)
    }

    pub fn redo(&mut self) -> Vec<Action> {
        let actions = self.core.redo();
        self.persist(actions)
    }

    pub fn clear_drawings(&mut self) -> Vec<Action> {
        let actions = self.core.clear_drawings();
        self.persist(actions)
    }

    /// Route a batch of core actions through persistence, for operations
    /// called on `core` directly (note edits, reminder ops).
    pub fn apply(&mut self, actions: Vec<Action>) -> Vec<Action> {
        self.persist(actions)
    }

    fn persist(&mut self, actions: Vec<Action>) -> Vec<Action> {
        for action in &actions {
            match action {
                Action::NoteCreated(note) => self.sync.save_note_now(note.clone()),
                Action::NoteChanged(note) => self.sync.schedule_note_save(note.clone()),
                Action::NotesDeleted(ids) => self.sync.delete_notes(ids),
                Action::StrokeCommitted(stroke) => self.sync.save_stroke(stroke.clone()),
                Action::StrokesDeleted(ids) => self.sync.delete_strokes(ids),
                Action::HistoryRestored { before, after } => {
                    let cancelled = self.sync.cancel_all();
                    debug!(cancelled, "pending saves cancelled for history switch");
                    self.sync.reconcile(before, after);
                }
                _ => {}
            }
        }
        actions
    }
}
