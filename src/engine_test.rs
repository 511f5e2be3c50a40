#![allow(clippy::float_cmp)]

use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::consts::MIN_TEXT_HEIGHT;
use crate::doc::NoteColor;
use crate::doc::test_helpers::{sticky, stroke, text};
use crate::sync::SyncOptions;
use crate::sync::mock::MockTransport;
use crate::sync::remote::{Method, RemoteStore};
use crate::viewport::Orientation;

// =============================================================
// Helpers
// =============================================================

/// A core whose screen and canvas coordinates coincide.
fn core() -> EngineCore {
    let mut core = EngineCore::new();
    core.viewport.scale = 1.0;
    core.set_content_rect(Some(ContentRect { left: 0.0, top: 0.0 }));
    core.user_id = "user-1".into();
    core
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn no_modifiers() -> Modifiers {
    Modifiers::default()
}

fn ctrl() -> Modifiers {
    Modifiers { ctrl: true, ..Default::default() }
}

fn down(core: &mut EngineCore, x: f64, y: f64) -> Vec<Action> {
    core.on_pointer_down(pt(x, y), Button::Primary, no_modifiers())
}

fn drag_to(core: &mut EngineCore, x: f64, y: f64) -> Vec<Action> {
    core.on_pointer_move(pt(x, y), no_modifiers())
}

fn up(core: &mut EngineCore) -> Vec<Action> {
    core.on_pointer_up(pt(0.0, 0.0), Button::Primary, no_modifiers())
}

fn with_note(core: &mut EngineCore, note: Note) -> NoteId {
    let id = note.id;
    core.doc.insert_note(note);
    id
}

fn has_action<F>(actions: &[Action], pred: F) -> bool
where
    F: Fn(&Action) -> bool,
{
    actions.iter().any(pred)
}

fn committed(actions: &[Action]) -> Option<&Stroke> {
    actions.iter().find_map(|a| match a {
        Action::StrokeCommitted(s) => Some(s),
        _ => None,
    })
}

fn assert_close(a: f64, b: f64) {
    assert!((a - b).abs() < 1e-9, "{a} != {b}");
}

// =============================================================
// Pen
// =============================================================

#[test]
fn pen_stroke_commits_on_pointer_up() {
    let mut core = core();
    core.set_tool(Tool::Pen);
    let actions = down(&mut core, 10.0, 10.0);
    assert!(has_action(&actions, |a| matches!(a, Action::CapturePointer)));
    assert_eq!(core.doc.strokes().len(), 1);

    drag_to(&mut core, 20.0, 20.0);
    drag_to(&mut core, 30.0, 30.0);
    let actions = up(&mut core);

    let stroke = committed(&actions).unwrap();
    assert_eq!(stroke.points, vec![pt(10.0, 10.0), pt(20.0, 20.0), pt(30.0, 30.0)]);
    assert_eq!(stroke.user_id, "user-1");
    assert_eq!(stroke.color, "black");
    assert_eq!(stroke.thickness, 3.0);
    assert_eq!(core.history.len(), 1);
    assert!(!core.ink.drawing);
    assert!(core.ink.stroke_id.is_none());
}

#[test]
fn pen_uses_current_pen_settings() {
    let mut core = core();
    core.set_tool(Tool::Pen);
    core.set_pen_color("#ff0000");
    core.set_pen_thickness(6.0);
    down(&mut core, 1.0, 1.0);
    let s = &core.doc.strokes()[0];
    assert_eq!(s.color, "#ff0000");
    assert_eq!(s.thickness, 6.0);
}

#[test]
fn leaving_pen_mid_stroke_discards_it() {
    let mut core = core();
    core.set_tool(Tool::Pen);
    down(&mut core, 10.0, 10.0);
    drag_to(&mut core, 20.0, 20.0);
    core.set_tool(Tool::Select);

    assert!(core.doc.strokes().is_empty());
    let actions = up(&mut core);
    assert!(committed(&actions).is_none());
}

// =============================================================
// Eraser
// =============================================================

#[test]
fn eraser_radius_is_inclusive() {
    let mut core = core();
    let at_radius = stroke(&[(10.0, 0.0), (20.0, 0.0)]);
    let beyond = stroke(&[(10.01, 0.0), (20.0, 0.0)]);
    core.doc.load_strokes(vec![at_radius.clone(), beyond.clone()]);
    core.set_tool(Tool::Eraser);

    let actions = down(&mut core, 0.0, 0.0);
    assert!(actions.contains(&Action::StrokesDeleted(vec![at_radius.id])));
    assert_eq!(core.doc.strokes().len(), 1);
    assert_eq!(core.doc.strokes()[0].id, beyond.id);
    assert_eq!(core.history.len(), 1);
}

#[test]
fn eraser_drag_takes_one_snapshot() {
    let mut core = core();
    let a = stroke(&[(100.0, 100.0), (110.0, 100.0)]);
    let b = stroke(&[(300.0, 300.0), (310.0, 300.0)]);
    core.doc.load_strokes(vec![a.clone(), b.clone()]);
    core.set_tool(Tool::Eraser);

    assert!(down(&mut core, 0.0, 0.0).iter().all(|a| !matches!(a, Action::StrokesDeleted(_))));
    assert!(drag_to(&mut core, 100.0, 100.0).contains(&Action::StrokesDeleted(vec![a.id])));
    assert!(drag_to(&mut core, 305.0, 302.0).contains(&Action::StrokesDeleted(vec![b.id])));
    assert!(core.doc.strokes().is_empty());
    assert_eq!(core.history.len(), 1);
}

#[test]
fn eraser_without_strokes_takes_no_snapshot() {
    let mut core = core();
    core.set_tool(Tool::Eraser);
    down(&mut core, 0.0, 0.0);
    assert!(core.history.is_empty());
}

#[test]
fn eraser_hover_without_button_does_nothing() {
    let mut core = core();
    core.doc.load_strokes(vec![stroke(&[(5.0, 5.0), (6.0, 6.0)])]);
    core.set_tool(Tool::Eraser);
    assert!(drag_to(&mut core, 5.0, 5.0).is_empty());
    assert_eq!(core.doc.strokes().len(), 1);
}

#[test]
fn erasing_live_stroke_cancels_it() {
    let mut core = core();
    core.set_tool(Tool::Pen);
    down(&mut core, 50.0, 50.0);
    drag_to(&mut core, 60.0, 60.0);

    // Eraser hit on the in-progress path, as a stylus eraser end would do.
    core.ui.pointer_down = true;
    let actions = core.erase_at(pt(60.0, 62.0));
    assert_eq!(actions, vec![Action::RenderNeeded]);
    assert!(core.ink.cancelled);
    assert!(core.doc.strokes().is_empty());

    assert!(drag_to(&mut core, 70.0, 70.0).is_empty());
    assert!(committed(&up(&mut core)).is_none());
}

// =============================================================
// Select / move / rotate / resize
// =============================================================

#[test]
fn clicking_note_selects_raises_and_moves_it() {
    let mut core = core();
    let id = with_note(&mut core, sticky(100.0, 100.0, 200.0, 200.0));

    let actions = down(&mut core, 150.0, 150.0);
    assert!(core.ui.selection.contains(&id));
    assert_eq!(core.note(&id).unwrap().z_index, 11);
    assert!(has_action(&actions, |a| matches!(a, Action::NoteChanged(n) if n.z_index == 11)));
    assert!(matches!(core.input, DragState::Moving { .. }));

    drag_to(&mut core, 160.0, 170.0);
    let actions = drag_to(&mut core, 170.0, 180.0);
    let note = core.note(&id).unwrap();
    assert_eq!((note.x, note.y), (120.0, 130.0));
    assert!(has_action(&actions, |a| matches!(a, Action::NoteChanged(n) if n.x == 120.0)));
    assert_eq!(core.history.len(), 1);

    let actions = up(&mut core);
    assert!(core.input.is_idle());
    assert!(actions.contains(&Action::ReleasePointer));
}

#[test]
fn shift_click_keeps_existing_selection() {
    let mut core = core();
    let first = with_note(&mut core, sticky(0.0, 0.0, 200.0, 200.0));
    let second = with_note(&mut core, sticky(500.0, 500.0, 200.0, 200.0));
    core.ui.select_only(first);

    core.on_pointer_down(pt(600.0, 600.0), Button::Primary, Modifiers { shift: true, ..Default::default() });
    assert!(core.ui.selection.contains(&first));
    assert!(!core.ui.selection.contains(&second));
}

#[test]
fn clicking_background_clears_selection_and_picker() {
    let mut core = core();
    let id = with_note(&mut core, sticky(0.0, 0.0, 200.0, 200.0));
    core.ui.select_only(id);
    core.ui.show_color_picker = true;

    down(&mut core, 900.0, 900.0);
    assert!(core.ui.selection.is_empty());
    assert!(!core.ui.show_color_picker);
    assert!(core.history.is_empty());
}

#[test]
fn rotate_handle_adds_angle_delta() {
    let mut core = core();
    let id = with_note(&mut core, sticky(100.0, 100.0, 200.0, 200.0));
    core.ui.select_only(id);

    down(&mut core, 200.0, 76.0);
    assert!(matches!(core.input, DragState::Rotating { .. }));
    assert_eq!(core.cursor(), "alias");

    drag_to(&mut core, 324.0, 200.0);
    assert_close(core.note(&id).unwrap().rotation, 90.0);
    assert_eq!(core.history.len(), 1);
}

#[test]
fn resize_is_floored_at_minimum_size() {
    let mut core = core();
    let id = with_note(&mut core, sticky(100.0, 100.0, 200.0, 200.0));
    core.ui.select_only(id);

    down(&mut core, 300.0, 300.0);
    assert_eq!(core.cursor(), "nwse-resize");
    drag_to(&mut core, -5000.0, -5000.0);
    let note = core.note(&id).unwrap();
    assert_eq!((note.width, note.height), (MIN_NOTE_SIZE, MIN_NOTE_SIZE));
    assert_eq!((note.x, note.y), (100.0, 100.0));
}

#[test]
fn left_handle_keeps_right_edge_fixed() {
    let mut core = core();
    let id = with_note(&mut core, sticky(100.0, 100.0, 200.0, 200.0));
    core.ui.select_only(id);

    down(&mut core, 100.0, 200.0);
    drag_to(&mut core, 50.0, 240.0);
    let note = core.note(&id).unwrap();
    assert_eq!(note.width, 250.0);
    assert_eq!(note.height, 200.0);
    assert_eq!(note.x, 50.0);
    assert_eq!(note.x + note.width, 300.0);
}

#[test]
fn text_notes_have_lower_height_floor() {
    let mut core = core();
    let id = with_note(&mut core, text(100.0, 100.0, 400.0, 100.0));
    core.ui.select_only(id);

    down(&mut core, 300.0, 100.0);
    drag_to(&mut core, 300.0, 600.0);
    let note = core.note(&id).unwrap();
    assert_eq!(note.height, MIN_TEXT_HEIGHT);
    assert_eq!(note.y + note.height, 200.0);
}

#[test]
fn resize_follows_rotated_frame() {
    let start = Note { rotation: 90.0, ..sticky(0.0, 0.0, 200.0, 200.0) };
    let next = resized(&start, ResizeHandle::R, pt(0.0, 50.0));
    assert_close(next.width, 250.0);
    assert_close(next.height, 200.0);
    assert_close(next.x, -25.0);
    assert_close(next.y, 25.0);
}

#[test]
fn rotation_is_not_normalized() {
    let start = Note { rotation: 350.0, ..sticky(0.0, 0.0, 200.0, 200.0) };
    // Quarter turn from the right of center to below it.
    let r = rotated(&start, pt(200.0, 100.0), pt(100.0, 200.0));
    assert_close(r, 440.0);
}

// =============================================================
// Pan / wheel / orientation
// =============================================================

#[test]
fn hand_tool_pans_scroll_container() {
    let mut core = core();
    core.set_tool(Tool::Hand);
    core.set_scroll(ScrollOffset { x: 100.0, y: 100.0 });

    let actions = down(&mut core, 50.0, 50.0);
    assert!(actions.contains(&Action::SetCursor("grabbing".into())));
    let actions = drag_to(&mut core, 80.0, 70.0);
    assert!(actions.contains(&Action::ScrollTo(ScrollOffset { x: 70.0, y: 80.0 })));
    assert!(core.history.is_empty());
}

#[test]
fn wheel_zooms_only_with_command_modifier() {
    let mut core = EngineCore::new();
    assert!(core.on_wheel(-100.0, no_modifiers()).is_empty());
    assert_eq!(core.viewport.scale, 0.75);

    let actions = core.on_wheel(-100.0, ctrl());
    assert!(actions.contains(&Action::PreventDefault));
    assert_close(core.viewport.scale, 0.85);
}

#[test]
fn orientation_flip_round_trips_note_centers() {
    let mut core = EngineCore::for_viewport_width(1280.0);
    let id = with_note(&mut core, sticky(300.0, 200.0, 256.0, 256.0));
    let before = core.note(&id).unwrap().center();

    assert_eq!(core.resize_viewport(500.0), vec![Action::RenderNeeded]);
    assert_eq!(core.viewport.orientation, Orientation::Portrait);
    assert!(core.resize_viewport(600.0).is_empty());
    core.resize_viewport(1024.0);

    let after = core.note(&id).unwrap().center();
    assert_close(after.x, before.x);
    assert_close(after.y, before.y);
}

// =============================================================
// Keyboard
// =============================================================

#[test]
fn shortcuts_switch_tools() {
    let mut core = core();
    for (key, tool) in [("n", Tool::Note), ("r", Tool::Reminder), ("t", Tool::Text), ("h", Tool::Hand), ("v", Tool::Select)] {
        core.on_key_down(&Key::new(key), no_modifiers());
        assert_eq!(core.ui.tool, tool);
    }
}

#[test]
fn shortcuts_are_suppressed_while_typing() {
    let mut core = core();
    let id = with_note(&mut core, sticky(0.0, 0.0, 200.0, 200.0));
    core.ui.select_only(id);
    core.set_focus(Some(TextFocus::Content(id)));

    assert!(core.on_key_down(&Key::new("Backspace"), no_modifiers()).is_empty());
    assert!(core.on_key_down(&Key::new("n"), no_modifiers()).is_empty());
    assert_eq!(core.doc.notes().len(), 1);
    assert_eq!(core.ui.tool, Tool::Select);
}

#[test]
fn delete_key_removes_selection() {
    let mut core = core();
    let id = with_note(&mut core, sticky(0.0, 0.0, 200.0, 200.0));
    core.ui.select_only(id);
    let actions = core.on_key_down(&Key::new("Delete"), no_modifiers());
    assert!(actions.contains(&Action::NotesDeleted(vec![id])));
    assert!(core.doc.notes().is_empty());
}

#[test]
fn space_hold_switches_to_hand_and_back() {
    let mut core = core();
    core.set_tool(Tool::Note);
    let actions = core.on_key_down(&Key::new(" "), no_modifiers());
    assert!(actions.contains(&Action::PreventDefault));
    assert_eq!(core.ui.tool, Tool::Hand);

    // Key repeat must not overwrite the tool to restore.
    core.on_key_down(&Key::new(" "), no_modifiers());
    core.on_key_up(&Key::new(" "), no_modifiers());
    assert_eq!(core.ui.tool, Tool::Note);
}

#[test]
fn undo_redo_shortcuts() {
    let mut core = core();
    core.create_note(crate::doc::NoteKind::Sticky, pt(500.0, 500.0));
    core.on_key_down(&Key::new("z"), ctrl());
    assert!(core.doc.notes().is_empty());
    core.on_key_down(&Key::new("Z"), Modifiers { shift: true, meta: true, ..Default::default() });
    assert_eq!(core.doc.notes().len(), 1);
    core.on_key_down(&Key::new("z"), ctrl());
    core.on_key_down(&Key::new("y"), ctrl());
    assert_eq!(core.doc.notes().len(), 1);
}

// =============================================================
// History
// =============================================================

#[test]
fn undo_then_redo_restores_final_state() {
    let mut core = core();
    core.create_note(crate::doc::NoteKind::Sticky, pt(500.0, 500.0));
    down(&mut core, 500.0, 500.0);
    drag_to(&mut core, 600.0, 650.0);
    up(&mut core);
    core.recolor(NoteColor::Blue);
    let final_state = core.doc.snapshot();
    assert_eq!(core.history.len(), 3);

    for _ in 0..3 {
        assert!(!core.undo().is_empty());
    }
    assert!(core.doc.notes().is_empty());
    assert!(core.undo().is_empty());

    for _ in 0..3 {
        core.redo();
    }
    assert_eq!(core.doc.snapshot(), final_state);
}

#[test]
fn undo_reports_both_states_and_clears_selection() {
    let mut core = core();
    let actions = core.create_note(crate::doc::NoteKind::Sticky, pt(500.0, 500.0));
    let Some(Action::NoteCreated(note)) = actions.first() else {
        panic!("expected a created note");
    };

    let actions = core.undo();
    let Some(Action::HistoryRestored { before, after }) = actions.first() else {
        panic!("expected a history action");
    };
    assert_eq!(before.notes, vec![note.clone()]);
    assert!(after.notes.is_empty());
    assert!(core.ui.selection.is_empty());
}

#[test]
fn clear_drawings_is_one_undoable_step() {
    let mut core = core();
    assert!(core.clear_drawings().is_empty());
    assert!(core.history.is_empty());

    let a = stroke(&[(0.0, 0.0), (1.0, 1.0)]);
    let b = stroke(&[(5.0, 5.0), (6.0, 6.0)]);
    core.doc.load_strokes(vec![a.clone(), b.clone()]);
    let actions = core.clear_drawings();
    assert!(actions.contains(&Action::StrokesDeleted(vec![a.id, b.id])));
    assert!(core.doc.strokes().is_empty());

    core.undo();
    assert_eq!(core.doc.strokes(), &[a, b]);
}

// =============================================================
// Cursor / load
// =============================================================

#[test]
fn cursor_follows_tool_and_gesture() {
    let mut core = core();
    assert_eq!(core.cursor(), "default");
    core.set_tool(Tool::Pen);
    assert_eq!(core.cursor(), "crosshair");
    core.set_tool(Tool::Eraser);
    assert_eq!(core.cursor(), ERASER_CURSOR);
    core.set_tool(Tool::Hand);
    assert_eq!(core.cursor(), "grabbing");
}

#[test]
fn load_replaces_collections_and_advances_z() {
    let mut core = core();
    core.create_note(crate::doc::NoteKind::Sticky, pt(500.0, 500.0));
    let loaded = Note { z_index: 30, ..sticky(0.0, 0.0, 200.0, 200.0) };

    core.load(Some(vec![loaded.clone()]), None);
    assert_eq!(core.doc.notes(), &[loaded]);
    assert_eq!(core.z.top(), 30);
    assert!(core.history.is_empty());
    assert!(core.ui.selection.is_empty());

    let actions = core.create_note(crate::doc::NoteKind::Sticky, pt(500.0, 500.0));
    assert!(has_action(&actions, |a| matches!(a, Action::NoteCreated(n) if n.z_index == 31)));
}

// =============================================================
// Engine (core + sync)
// =============================================================

async fn engine(mock: &Arc<MockTransport>) -> Engine {
    let sync = SyncEngine::new(
        RemoteStore::new(mock.clone()),
        SyncOptions { user_id: Some("user-1".into()), whiteboard_id: Some(Uuid::new_v4()), ..SyncOptions::default() },
    );
    let mut engine = Engine::new(core(), sync);
    assert!(engine.load().await.unwrap());
    mock.clear();
    engine
}

#[tokio::test(start_paused = true)]
async fn engine_writes_create_immediately_and_undo_deletes() {
    let mock = MockTransport::new();
    let mut engine = engine(&mock).await;
    engine.set_tool(Tool::Note);
    engine.on_pointer_down(pt(500.0, 500.0), Button::Primary, no_modifiers());
    engine.on_pointer_up(pt(500.0, 500.0), Button::Primary, no_modifiers());
    engine.settle().await;
    assert_eq!(mock.calls_to(Method::Put, "/whiteboard-notes/").len(), 1);

    mock.clear();
    engine.undo();
    engine.settle().await;
    assert_eq!(mock.calls_to(Method::Delete, "/whiteboard-notes/").len(), 1);
    assert!(mock.calls_to(Method::Put, "/whiteboard-notes/").is_empty());
}

#[tokio::test(start_paused = true)]
async fn engine_coalesces_drag_frames() {
    let mock = MockTransport::new();
    let mut engine = engine(&mock).await;
    let note = sticky(100.0, 100.0, 200.0, 200.0);
    engine.core.doc.insert_note(note.clone());

    engine.on_pointer_down(pt(150.0, 150.0), Button::Primary, no_modifiers());
    for step in 1..=20 {
        engine.on_pointer_move(pt(150.0 + f64::from(step), 150.0), no_modifiers());
        tokio::time::advance(Duration::from_millis(10)).await;
    }
    engine.on_pointer_up(pt(170.0, 150.0), Button::Primary, no_modifiers());
    engine.settle().await;

    let puts = mock.calls_to(Method::Put, &format!("/whiteboard-notes/{}", note.id));
    assert_eq!(puts.len(), 1);
    assert_eq!(puts[0].body.as_ref().unwrap()["x"], 120.0);
}

#[tokio::test(start_paused = true)]
async fn engine_surfaces_stroke_failures() {
    let mock = MockTransport::new();
    let mut engine = engine(&mock).await;
    mock.fail(Method::Put, "/whiteboard-drawings/");

    engine.set_tool(Tool::Pen);
    engine.on_pointer_down(pt(10.0, 10.0), Button::Primary, no_modifiers());
    engine.on_pointer_move(pt(20.0, 20.0), no_modifiers());
    engine.on_pointer_up(pt(20.0, 20.0), Button::Primary, no_modifiers());
    engine.settle().await;

    let failures = engine.sync_failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].site, crate::sync::STROKE_SAVE_SITE);
}

#[tokio::test(start_paused = true)]
async fn engine_offline_keeps_local_edits() {
    let mock = MockTransport::new();
    let mut engine = engine(&mock).await;
    engine.set_offline(true);
    let actions = engine.core.create_note(crate::doc::NoteKind::Text, pt(10.0, 10.0));
    engine.apply(actions);
    engine.settle().await;
    assert_eq!(engine.core.doc.notes().len(), 1);
    assert!(mock.calls().is_empty());
}
