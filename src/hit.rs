#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::consts::{ERASER_RADIUS, HANDLE_RADIUS_PX, ROTATE_HANDLE_OFFSET_PX};
use crate::doc::{DocStore, Note, NoteId, Stroke, StrokeId};
use crate::input::ResizeHandle;
use crate::viewport::{Point, Viewport};

/// Which part of a note was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    Resize(ResizeHandle),
    Rotate,
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub note_id: NoteId,
    pub part: HitPart,
}

/// Test which note (if any) is under `pt`, checking the selected note's
/// handles first and then note bodies from the top of the stack down.
#[must_use]
pub fn hit_test(pt: Point, doc: &DocStore, viewport: &Viewport, selected: Option<NoteId>) -> Option<Hit> {
    if let Some(note) = selected.and_then(|id| doc.note(&id)) {
        if let Some(part) = hit_handles(note, pt, viewport) {
            return Some(Hit { note_id: note.id, part });
        }
    }
    doc.sorted_notes()
        .into_iter()
        .rev()
        .find(|n| note_contains(n, pt))
        .map(|n| Hit { note_id: n.id, part: HitPart::Body })
}

fn hit_handles(note: &Note, pt: Point, viewport: &Viewport) -> Option<HitPart> {
    let slop = viewport.screen_dist_to_canvas(HANDLE_RADIUS_PX);
    let offset = viewport.screen_dist_to_canvas(ROTATE_HANDLE_OFFSET_PX);
    if rotate_handle_point(note, offset).distance(pt) <= slop {
        return Some(HitPart::Rotate);
    }
    ResizeHandle::ALL
        .into_iter()
        .find(|h| handle_point(note, *h).distance(pt) <= slop)
        .map(HitPart::Resize)
}

/// Whether `pt` lies inside the note's rotated rectangle.
#[must_use]
pub fn note_contains(note: &Note, pt: Point) -> bool {
    let local = to_local(note, pt);
    local.x.abs() <= note.width / 2.0 && local.y.abs() <= note.height / 2.0
}

/// Canvas position of a resize handle, following the note's rotation.
#[must_use]
pub fn handle_point(note: &Note, handle: ResizeHandle) -> Point {
    let (fx, fy) = handle.anchor();
    to_global(note, Point::new((fx - 0.5) * note.width, (fy - 0.5) * note.height))
}

/// Canvas position of the rotate handle, `offset` above the top edge.
#[must_use]
pub fn rotate_handle_point(note: &Note, offset: f64) -> Point {
    to_global(note, Point::new(0.0, -note.height / 2.0 - offset))
}

/// Map a canvas point into the note's unrotated frame, relative to its center.
fn to_local(note: &Note, pt: Point) -> Point {
    let c = note.center();
    rotate(Point::new(pt.x - c.x, pt.y - c.y), -note.rotation.to_radians())
}

/// Inverse of [`to_local`].
fn to_global(note: &Note, local: Point) -> Point {
    let c = note.center();
    let p = rotate(local, note.rotation.to_radians());
    Point::new(c.x + p.x, c.y + p.y)
}

/// Rotate a vector by `rad` radians.
#[must_use]
pub fn rotate(v: Point, rad: f64) -> Point {
    let (sin, cos) = rad.sin_cos();
    Point::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

// --- Ink ---

/// Whether any point of `path` is within the eraser radius of `pt` (inclusive).
#[must_use]
pub fn path_near(path: &[Point], pt: Point) -> bool {
    path.iter().any(|p| p.distance(pt) <= ERASER_RADIUS)
}

/// Ids of committed strokes the eraser touches at `pt`.
#[must_use]
pub fn strokes_near(strokes: &[Stroke], pt: Point) -> Vec<StrokeId> {
    strokes.iter().filter(|s| path_near(&s.points, pt)).map(|s| s.id).collect()
}
