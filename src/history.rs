//! Undo/redo history over paired `(notes, strokes)` snapshots.
//!
//! A snapshot is recorded before every undoable action. Undo swaps the live
//! document for the newest snapshot and remembers the replaced state for
//! redo; any new recording discards the redo stack. Notes and strokes are
//! kept in one value so actions touching both undo atomically.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use std::collections::VecDeque;

use crate::consts::HISTORY_LIMIT;
use crate::doc::{Note, Stroke};

/// Immutable deep copy of every note and stroke at one instant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub notes: Vec<Note>,
    pub strokes: Vec<Stroke>,
}

/// Bounded undo stack plus redo stack.
#[derive(Debug, Clone)]
pub struct History {
    past: VecDeque<Snapshot>,
    future: Vec<Snapshot>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_limit(HISTORY_LIMIT)
    }
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// History keeping at most `limit` undo entries.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self { past: VecDeque::with_capacity(limit), future: Vec::new(), limit: limit.max(1) }
    }

    /// Record the state before an undoable action and drop the redo stack.
    pub fn record(&mut self, before: Snapshot) {
        self.push_past(before);
        self.future.clear();
    }

    /// Step back. `current` becomes the newest redo entry; returns the state
    /// to restore, or `None` when there is nothing to undo.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let previous = self.past.pop_back()?;
        self.future.push(current);
        Some(previous)
    }

    /// Step forward. `current` goes back onto the undo stack; returns the
    /// state to restore, or `None` when there is nothing to redo.
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.future.pop()?;
        self.push_past(current);
        Some(next)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Number of undo entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.past.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.past.is_empty()
    }

    /// Number of redo entries.
    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.future.len()
    }

    /// Forget all history, e.g. after loading a different whiteboard.
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    fn push_past(&mut self, snapshot: Snapshot) {
        if self.past.len() == self.limit {
            self.past.pop_front();
        }
        self.past.push_back(snapshot);
    }
}
