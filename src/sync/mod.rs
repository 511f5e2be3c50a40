//! Sync engine: optimistic, debounced persistence of the document.
//!
//! DESIGN
//! ======
//! Local state is authoritative for the session; the remote store is a
//! durability target. Every write runs in its own spawned task so nothing in
//! the interaction path awaits the network.
//!
//! - Field edits go through a per-note debounce table (`pending`). A new edit
//!   for the same note aborts the previous timer, so only the latest note
//!   value is sent once the window elapses.
//! - Creates, deletes and stroke saves are written immediately.
//! - Undo/redo hands the engine a `(before, after)` pair; the id-set
//!   difference becomes one batch of concurrent upserts and deletes.
//! - Loads are tagged with a generation number. Changing user or whiteboard
//!   bumps it, and `accept_load` drops results from older generations.
//!
//! ERROR HANDLING
//! ==============
//! Writes are gated on user id, whiteboard readiness and the offline flag;
//! gated writes are skipped with a debug event. Remote failures are logged
//! inside their task and never roll back local state. A stroke save that
//! fails even without `stroke_width` is also appended to the failure list.

pub mod remote;
pub mod wire;

#[cfg(test)]
#[path = "mock_test.rs"]
pub(crate) mod mock;

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::{BoxFuture, join_all, join4};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::consts::{DEFAULT_WHITEBOARD_ID, DEFAULT_WHITEBOARD_TITLE, MIN_PERSISTED_POINTS, SAVE_DEBOUNCE_MS};
use crate::doc::{Note, NoteId, Stroke, StrokeId, WhiteboardId};
use crate::history::Snapshot;
use remote::{RemoteStore, SyncError};
use wire::{NoteRow, StrokeRow, WhiteboardRow};

/// Call site recorded for a stroke save that failed after the fallback.
pub const STROKE_SAVE_SITE: &str = "stroke_save";

/// Identity and timing inputs for a [`SyncEngine`].
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Authenticated user; reads and writes are disabled without one.
    pub user_id: Option<String>,
    /// Explicit whiteboard; otherwise resolved during bootstrap.
    pub whiteboard_id: Option<WhiteboardId>,
    /// Suppresses all remote traffic.
    pub offline: bool,
    /// Debounce window for field edits.
    pub debounce: Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self { user_id: None, whiteboard_id: None, offline: false, debounce: Duration::from_millis(SAVE_DEBOUNCE_MS) }
    }
}

/// A write that failed after every fallback, kept for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncFailure {
    pub site: &'static str,
    pub entity_id: Uuid,
    pub message: String,
}

/// Result of a bootstrap, tagged with the generation that started it.
///
/// `None` collections mean the fetch failed and local state should be kept.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub generation: u64,
    pub whiteboard_id: WhiteboardId,
    pub notes: Option<Vec<Note>>,
    pub strokes: Option<Vec<Stroke>>,
}

/// Destination captured when a write is issued.
#[derive(Debug, Clone)]
struct WriteTarget {
    whiteboard_id: WhiteboardId,
    user_id: String,
}

/// Remote writes implied by replacing `before` with `after`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcilePlan {
    pub upsert_notes: Vec<Note>,
    pub delete_notes: Vec<NoteId>,
    pub upsert_strokes: Vec<Stroke>,
    pub delete_strokes: Vec<StrokeId>,
}

impl ReconcilePlan {
    /// Upsert everything in `after`; delete what only `before` has.
    /// Strokes too short to persist are left out of the upserts.
    #[must_use]
    pub fn diff(before: &Snapshot, after: &Snapshot) -> Self {
        let after_notes: HashSet<NoteId> = after.notes.iter().map(|n| n.id).collect();
        let after_strokes: HashSet<StrokeId> = after.strokes.iter().map(|s| s.id).collect();
        Self {
            upsert_notes: after.notes.clone(),
            delete_notes: before
                .notes
                .iter()
                .map(|n| n.id)
                .filter(|id| !after_notes.contains(id))
                .collect(),
            upsert_strokes: after
                .strokes
                .iter()
                .filter(|s| s.points.len() >= MIN_PERSISTED_POINTS)
                .cloned()
                .collect(),
            delete_strokes: before
                .strokes
                .iter()
                .map(|s| s.id)
                .filter(|id| !after_strokes.contains(id))
                .collect(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.upsert_notes.is_empty()
            && self.delete_notes.is_empty()
            && self.upsert_strokes.is_empty()
            && self.delete_strokes.is_empty()
    }

    async fn run(self, remote: &RemoteStore, target: &WriteTarget) {
        let upsert_notes = join_all(self.upsert_notes.iter().map(|n| upsert_note(remote, target, n)));
        let delete_notes = join_all(self.delete_notes.iter().map(|id| delete_note(remote, *id)));
        let upsert_strokes = join_all(self.upsert_strokes.iter().map(|s| async move {
            if let Err(e) = upsert_stroke(remote, target, s).await {
                error!(stroke_id = %s.id, error = %e, "stroke upsert failed during reconcile");
            }
        }));
        let delete_strokes = join_all(self.delete_strokes.iter().map(|id| delete_stroke(remote, *id)));
        join4(upsert_notes, delete_notes, upsert_strokes, delete_strokes).await;
    }
}

/// Debounced, gated persistence of notes and strokes.
pub struct SyncEngine {
    remote: RemoteStore,
    user_id: Option<String>,
    explicit_whiteboard: Option<WhiteboardId>,
    whiteboard_id: WhiteboardId,
    ready: bool,
    offline: bool,
    debounce: Duration,
    generation: u64,
    /// Debounce table: one scheduled save per note.
    pending: HashMap<NoteId, JoinHandle<()>>,
    /// Immediate writes not yet known to be finished.
    in_flight: Vec<JoinHandle<()>>,
    failures: Arc<Mutex<Vec<SyncFailure>>>,
}

impl SyncEngine {
    #[must_use]
    pub fn new(remote: RemoteStore, options: SyncOptions) -> Self {
        Self {
            remote,
            user_id: options.user_id,
            explicit_whiteboard: options.whiteboard_id,
            whiteboard_id: options.whiteboard_id.unwrap_or(DEFAULT_WHITEBOARD_ID),
            ready: false,
            offline: options.offline,
            debounce: options.debounce,
            generation: 0,
            pending: HashMap::new(),
            in_flight: Vec::new(),
            failures: Arc::new(Mutex::new(Vec::new())),
        }
    }

    // --- Identity / gating ---

    /// Change the current user. Invalidates readiness and any load in flight.
    pub fn set_user(&mut self, user_id: Option<String>) {
        self.user_id = user_id;
        self.invalidate();
    }

    /// Change the explicit whiteboard. Invalidates readiness and any load in flight.
    pub fn set_whiteboard(&mut self, whiteboard_id: Option<WhiteboardId>) {
        self.explicit_whiteboard = whiteboard_id;
        if let Some(id) = whiteboard_id {
            self.whiteboard_id = id;
        }
        self.invalidate();
    }

    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    fn invalidate(&mut self) {
        self.generation += 1;
        self.ready = false;
    }

    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// The effective whiteboard id.
    #[must_use]
    pub fn whiteboard_id(&self) -> WhiteboardId {
        self.whiteboard_id
    }

    /// Whether the whiteboard record is confirmed to exist remotely.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    #[must_use]
    pub fn is_offline(&self) -> bool {
        self.offline
    }

    /// Whether a write issued now would reach the store.
    #[must_use]
    pub fn can_write(&self) -> bool {
        self.target().is_some()
    }

    #[must_use]
    pub fn remote(&self) -> &RemoteStore {
        &self.remote
    }

    fn target(&self) -> Option<WriteTarget> {
        if self.offline || !self.ready {
            return None;
        }
        let user_id = self.user_id.clone()?;
        Some(WriteTarget { whiteboard_id: self.whiteboard_id, user_id })
    }

    // --- Bootstrap ---

    /// Start loading the whiteboard for the current identity.
    ///
    /// Marks the engine not ready and returns a detached future that resolves
    /// the effective whiteboard id, creates the record if missing, and fetches
    /// notes and strokes. Returns `None` when offline or without a user. Hand
    /// the result to [`accept_load`](Self::accept_load).
    pub fn bootstrap(&mut self) -> Option<BoxFuture<'static, Result<Loaded, SyncError>>> {
        self.invalidate();
        if self.offline {
            debug!("offline; whiteboard load skipped");
            return None;
        }
        let Some(user_id) = self.user_id.clone() else {
            debug!("no user; whiteboard load skipped");
            return None;
        };
        let remote = self.remote.clone();
        let explicit = self.explicit_whiteboard;
        let generation = self.generation;

        Some(Box::pin(async move {
            let whiteboard_id = resolve_whiteboard_id(&remote, explicit, &user_id).await;
            ensure_whiteboard(&remote, whiteboard_id).await?;

            let (notes, strokes) = tokio::join!(remote.list_notes(whiteboard_id), remote.list_strokes(whiteboard_id));
            let notes = match notes {
                Ok(notes) => {
                    info!(%whiteboard_id, count = notes.len(), "notes loaded");
                    Some(notes)
                }
                Err(e) => {
                    warn!(%whiteboard_id, error = %e, "note fetch failed");
                    None
                }
            };
            let strokes = match strokes {
                Ok(strokes) => {
                    info!(%whiteboard_id, count = strokes.len(), "strokes loaded");
                    Some(strokes)
                }
                Err(e) => {
                    warn!(%whiteboard_id, error = %e, "stroke fetch failed");
                    None
                }
            };
            Ok(Loaded { generation, whiteboard_id, notes, strokes })
        }))
    }

    /// Adopt a finished load if it belongs to the current generation.
    /// Marks the engine ready. Returns false for stale results.
    pub fn accept_load(&mut self, loaded: &Loaded) -> bool {
        if loaded.generation != self.generation {
            debug!(generation = loaded.generation, current = self.generation, "stale load dropped");
            return false;
        }
        self.whiteboard_id = loaded.whiteboard_id;
        self.ready = true;
        true
    }

    // --- Notes ---

    /// Schedule a debounced upsert of `note`, replacing any pending save for it.
    pub fn schedule_note_save(&mut self, note: Note) {
        self.cancel_pending(&note.id);
        let Some(target) = self.target() else {
            debug!(note_id = %note.id, "sync gated; note save skipped");
            return;
        };
        let remote = self.remote.clone();
        let delay = self.debounce;
        let id = note.id;
        if let Some(handle) = spawn(async move {
            tokio::time::sleep(delay).await;
            upsert_note(&remote, &target, &note).await;
        }) {
            self.pending.insert(id, handle);
        }
    }

    /// Upsert `note` immediately (used for creation).
    pub fn save_note_now(&mut self, note: Note) {
        self.cancel_pending(&note.id);
        let Some(target) = self.target() else {
            debug!(note_id = %note.id, "sync gated; note create skipped");
            return;
        };
        let remote = self.remote.clone();
        self.track(async move { upsert_note(&remote, &target, &note).await });
    }

    /// Delete notes remotely. Pending saves for them are cancelled first so a
    /// late debounced upsert cannot resurrect a deleted note.
    pub fn delete_notes(&mut self, ids: &[NoteId]) {
        for id in ids {
            self.cancel_pending(id);
        }
        if ids.is_empty() {
            return;
        }
        if self.target().is_none() {
            debug!(count = ids.len(), "sync gated; note delete skipped");
            return;
        }
        let remote = self.remote.clone();
        let ids = ids.to_vec();
        self.track(async move {
            join_all(ids.iter().map(|id| delete_note(&remote, *id))).await;
        });
    }

    // --- Strokes ---

    /// Persist a finished stroke. Strokes with fewer than two points are
    /// dropped. A rejected save is retried once without `stroke_width`.
    pub fn save_stroke(&mut self, stroke: Stroke) {
        if stroke.points.len() < MIN_PERSISTED_POINTS {
            debug!(stroke_id = %stroke.id, points = stroke.points.len(), "stroke too short; not saved");
            return;
        }
        let Some(target) = self.target() else {
            debug!(stroke_id = %stroke.id, "sync gated; stroke save skipped");
            return;
        };
        let remote = self.remote.clone();
        let failures = Arc::clone(&self.failures);
        self.track(async move {
            if let Err(e) = upsert_stroke(&remote, &target, &stroke).await {
                error!(stroke_id = %stroke.id, error = %e, "stroke save failed");
                record_failure(&failures, SyncFailure {
                    site: STROKE_SAVE_SITE,
                    entity_id: stroke.id,
                    message: e.to_string(),
                });
            }
        });
    }

    /// Delete strokes remotely, concurrently.
    pub fn delete_strokes(&mut self, ids: &[StrokeId]) {
        if ids.is_empty() {
            return;
        }
        if self.target().is_none() {
            debug!(count = ids.len(), "sync gated; stroke delete skipped");
            return;
        }
        let remote = self.remote.clone();
        let ids = ids.to_vec();
        self.track(async move {
            join_all(ids.iter().map(|id| delete_stroke(&remote, *id))).await;
        });
    }

    // --- History ---

    /// Bring the store in line with an undo/redo switch from `before` to `after`.
    pub fn reconcile(&mut self, before: &Snapshot, after: &Snapshot) {
        let Some(target) = self.target() else {
            debug!("sync gated; reconcile skipped");
            return;
        };
        let plan = ReconcilePlan::diff(before, after);
        if plan.is_empty() {
            return;
        }
        let remote = self.remote.clone();
        self.track(async move { plan.run(&remote, &target).await });
    }

    /// Abort every pending debounced save. Returns how many were live.
    pub fn cancel_all(&mut self) -> usize {
        let live = self.pending_count();
        for (_, handle) in self.pending.drain() {
            handle.abort();
        }
        live
    }

    /// Number of debounced saves still waiting or running.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.values().filter(|h| !h.is_finished()).count()
    }

    /// Wait for every pending save and in-flight write to finish.
    pub async fn settle(&mut self) {
        let handles: Vec<JoinHandle<()>> = self
            .pending
            .drain()
            .map(|(_, h)| h)
            .chain(self.in_flight.drain(..))
            .collect();
        for handle in handles {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    warn!(error = %e, "sync task failed");
                }
            }
        }
    }

    /// Writes that failed after every fallback, oldest first.
    #[must_use]
    pub fn failures(&self) -> Vec<SyncFailure> {
        self.failures.lock().map(|f| f.clone()).unwrap_or_default()
    }

    // --- Plumbing ---

    fn cancel_pending(&mut self, id: &NoteId) {
        if let Some(handle) = self.pending.remove(id) {
            handle.abort();
        }
        self.pending.retain(|_, h| !h.is_finished());
    }

    fn track<F>(&mut self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.in_flight.retain(|h| !h.is_finished());
        if let Some(handle) = spawn(fut) {
            self.in_flight.push(handle);
        }
    }
}

// =============================================================================
// TASK BODIES
// =============================================================================

fn spawn<F>(fut: F) -> Option<JoinHandle<()>>
where
    F: Future<Output = ()> + Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => Some(handle.spawn(fut)),
        Err(e) => {
            warn!(error = %e, "no async runtime; remote write dropped");
            None
        }
    }
}

async fn resolve_whiteboard_id(remote: &RemoteStore, explicit: Option<WhiteboardId>, user_id: &str) -> WhiteboardId {
    if let Some(id) = explicit {
        info!(whiteboard_id = %id, "using explicit whiteboard");
        return id;
    }
    match remote.list_whiteboards(user_id).await {
        Ok(boards) => {
            if let Some(first) = boards.first() {
                info!(whiteboard_id = %first.id, "using first owned whiteboard");
                return first.id;
            }
        }
        Err(e) => warn!(user_id, error = %e, "whiteboard list failed"),
    }
    info!(whiteboard_id = %DEFAULT_WHITEBOARD_ID, "using default whiteboard");
    DEFAULT_WHITEBOARD_ID
}

async fn ensure_whiteboard(remote: &RemoteStore, id: WhiteboardId) -> Result<(), SyncError> {
    let existing = remote.get_whiteboard(id).await.map_err(|e| {
        warn!(whiteboard_id = %id, error = %e, "whiteboard fetch failed");
        e
    })?;
    if existing.is_some() {
        return Ok(());
    }
    let row = WhiteboardRow { id, title: DEFAULT_WHITEBOARD_TITLE.to_string() };
    remote.create_whiteboard(&row).await.map_err(|e| {
        warn!(whiteboard_id = %id, error = %e, "whiteboard create failed");
        e
    })?;
    info!(whiteboard_id = %id, "whiteboard created");
    Ok(())
}

async fn upsert_note(remote: &RemoteStore, target: &WriteTarget, note: &Note) {
    let row = NoteRow::from_note(note, target.whiteboard_id);
    if let Err(e) = remote.upsert_note(&row).await {
        error!(note_id = %note.id, error = %e, "note upsert failed");
    }
}

async fn delete_note(remote: &RemoteStore, id: NoteId) {
    if let Err(e) = remote.delete_note(id).await {
        error!(note_id = %id, error = %e, "note delete failed");
    }
}

async fn delete_stroke(remote: &RemoteStore, id: StrokeId) {
    if let Err(e) = remote.delete_stroke(id).await {
        error!(stroke_id = %id, error = %e, "stroke delete failed");
    }
}

/// Upsert with `stroke_width`, then once more without it if rejected.
async fn upsert_stroke(remote: &RemoteStore, target: &WriteTarget, stroke: &Stroke) -> Result<(), SyncError> {
    let row = StrokeRow::from_stroke(stroke, target.whiteboard_id, &target.user_id, true);
    match remote.upsert_stroke(&row).await {
        Ok(()) => Ok(()),
        Err(e) => {
            warn!(stroke_id = %stroke.id, error = %e, "stroke upsert rejected; retrying without stroke_width");
            let reduced = StrokeRow { stroke_width: None, ..row };
            remote.upsert_stroke(&reduced).await
        }
    }
}

fn record_failure(failures: &Mutex<Vec<SyncFailure>>, failure: SyncFailure) {
    match failures.lock() {
        Ok(mut list) => list.push(failure),
        Err(e) => error!(error = %e, "failure list poisoned"),
    }
}
