//! Share links: read-only access to a whiteboard through a durable share id.
//!
//! DESIGN
//! ======
//! A whiteboard keeps at most one share id in practice: opening the share
//! panel reuses the first share the store lists for the board and only
//! creates a new one when none exists. The URL handed to the user is
//! `{public_base_url}/share/{share_id}`; rendering it as a QR code is the
//! host's job.
//!
//! ERROR HANDLING
//! ==============
//! Failures never touch canvas state. Opening the panel turns any remote
//! error into the panel's inline, dismissable message; resolving a share id
//! maps failures onto [`ShareError`], whose messages are user-facing.

#[cfg(test)]
#[path = "share_test.rs"]
mod share_test;

use tracing::{info, warn};
use uuid::Uuid;

use crate::doc::WhiteboardId;
use crate::sync::remote::{RemoteStore, SyncError};
use crate::sync::wire::ShareRow;

/// Inline message shown when a share link could not be produced.
pub const SHARE_FAILED_MESSAGE: &str = "Failed to create share link.";

/// Errors resolving a share id into a whiteboard.
#[derive(Debug, thiserror::Error)]
pub enum ShareError {
    /// The id is empty or not a UUID.
    #[error("Invalid share link.")]
    Invalid,

    /// The store could not be reached or answered with an error.
    #[error("Failed to load share.")]
    LoadFailed(#[source] SyncError),

    /// The store has no share with this id.
    #[error("Share not found.")]
    NotFound,
}

/// State of the share panel as the host renders it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SharePanel {
    /// Whether sharing is offered at all.
    pub allowed: bool,
    pub open: bool,
    /// Share URL once one has been obtained.
    pub url: Option<String>,
    pub loading: bool,
    /// Inline error, cleared by [`SharePanel::dismiss_error`].
    pub error: Option<String>,
}

impl SharePanel {
    #[must_use]
    pub fn new(allowed: bool) -> Self {
        Self { allowed, ..Self::default() }
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }
}

/// Creates, reuses and resolves share ids against the remote store.
#[derive(Clone)]
pub struct ShareService {
    remote: RemoteStore,
    public_base_url: String,
}

impl ShareService {
    #[must_use]
    pub fn new(remote: RemoteStore, public_base_url: &str) -> Self {
        Self { remote, public_base_url: public_base_url.trim_end_matches('/').to_string() }
    }

    /// Public URL for a share id.
    #[must_use]
    pub fn share_url(&self, share_id: Uuid) -> String {
        format!("{}/share/{share_id}", self.public_base_url)
    }

    /// Return the board's existing share id, creating one if it has none.
    ///
    /// # Errors
    ///
    /// Returns a [`SyncError`] if listing or creating shares fails.
    pub async fn ensure_share(&self, whiteboard_id: WhiteboardId) -> Result<Uuid, SyncError> {
        let existing = self.remote.list_shares(whiteboard_id).await?;
        if let Some(share) = existing.first() {
            return Ok(share.id);
        }
        let row = ShareRow { id: Uuid::new_v4(), whiteboard_id };
        self.remote.create_share(&row).await?;
        info!(share_id = %row.id, whiteboard_id = %whiteboard_id, "share created");
        Ok(row.id)
    }

    /// Open the share panel for `whiteboard_id` and fill in its URL.
    ///
    /// Does nothing when sharing is not allowed. A URL already obtained is
    /// kept; failures land in `panel.error`.
    pub async fn open(&self, panel: &mut SharePanel, whiteboard_id: WhiteboardId) {
        if !panel.allowed {
            return;
        }
        panel.open = true;
        if panel.url.is_some() {
            return;
        }
        panel.loading = true;
        panel.error = None;
        match self.ensure_share(whiteboard_id).await {
            Ok(share_id) => panel.url = Some(self.share_url(share_id)),
            Err(e) => {
                warn!(whiteboard_id = %whiteboard_id, error = %e, "share link failed");
                panel.error = Some(SHARE_FAILED_MESSAGE.to_string());
            }
        }
        panel.loading = false;
    }

    /// Resolve a share id (as taken from a share URL) to its whiteboard.
    ///
    /// # Errors
    ///
    /// Returns [`ShareError::Invalid`] for an empty or malformed id,
    /// [`ShareError::NotFound`] when the store has no such share, and
    /// [`ShareError::LoadFailed`] for any other remote failure.
    pub async fn resolve(&self, share_id: &str) -> Result<WhiteboardId, ShareError> {
        let share_id = share_id.trim();
        if share_id.is_empty() {
            return Err(ShareError::Invalid);
        }
        let id = Uuid::parse_str(share_id).map_err(|_| ShareError::Invalid)?;
        match self.remote.get_share(id).await {
            Ok(Some(share)) => Ok(share.whiteboard_id),
            Ok(None) => Err(ShareError::NotFound),
            Err(e) => {
                warn!(share_id = %id, error = %e, "share lookup failed");
                Err(ShareError::LoadFailed(e))
            }
        }
    }
}
