//! Remote store access: the `Transport` seam, its HTTP implementation, and a
//! typed table of the whiteboard endpoints.
//!
//! DESIGN
//! ======
//! `Transport` is the only thing that knows about HTTP. It takes a method, a
//! path relative to the API base, and an optional JSON body, and returns the
//! decoded JSON response (`Null` for an empty body). `RemoteStore` wraps a
//! shared transport and gives every endpoint a typed signature, so the sync
//! engine never builds paths or parses envelopes itself.
//!
//! ERROR HANDLING
//! ==============
//! Non-2xx responses become `SyncError::Http` carrying the status and body;
//! 401 is split out as `Unauthorized`. List endpoints tolerate a null or
//! keyless envelope and return an empty list.

#[cfg(test)]
#[path = "remote_test.rs"]
mod remote_test;

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use super::wire::{
    BoardEnvelope, BoardsEnvelope, DrawingsEnvelope, NoteRow, NotesEnvelope, ShareRow, SharesEnvelope, StrokeRow,
    WhiteboardRow,
};
use crate::doc::{Note, NoteId, Stroke, StrokeId, WhiteboardId};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by remote store operations.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The store returned a non-success HTTP status.
    #[error("remote returned status {status}")]
    Http { status: u16, body: String },

    /// The store rejected the credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// The request could not be sent or the response could not be read.
    #[error("request failed: {0}")]
    Request(String),

    /// The response body was not the expected JSON.
    #[error("response decode failed: {0}")]
    Decode(#[from] serde_json::Error),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),

    /// The response envelope lacked its expected key.
    #[error("response missing field: {0}")]
    MissingField(&'static str),
}

// =============================================================================
// TRANSPORT
// =============================================================================

/// HTTP method of a store request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

/// Request function for the remote store. Enables mocking in tests.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Send one request to `path` (relative to the API base).
    ///
    /// # Errors
    ///
    /// Returns a [`SyncError`] if the request fails, the store answers with a
    /// non-success status, or the body is not JSON.
    async fn request(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, SyncError>;
}

/// Connection timeouts for [`HttpTransport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

/// `Transport` over HTTP with optional bearer authentication.
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpTransport {
    /// Build a transport for `base_url` (a trailing `/` is trimmed).
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::ClientBuild`] if the HTTP client fails to build.
    pub fn new(base_url: &str, token: Option<String>, timeouts: HttpTimeouts) -> Result<Self, SyncError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| SyncError::ClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_string(), token })
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn request(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, SyncError> {
        let method = match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };
        let mut request = self.http.request(method, format!("{}{path}", self.base_url));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SyncError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| SyncError::Request(e.to_string()))?;

        if status == 401 {
            return Err(SyncError::Unauthorized);
        }
        if !(200..300).contains(&status) {
            return Err(SyncError::Http { status, body: text });
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

// =============================================================================
// REMOTE STORE
// =============================================================================

/// Typed access to the whiteboard endpoints over a shared transport.
#[derive(Clone)]
pub struct RemoteStore {
    transport: Arc<dyn Transport>,
}

impl RemoteStore {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    // --- Whiteboards ---

    /// Fetch a whiteboard record; `None` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns a [`SyncError`] if the request fails.
    pub async fn get_whiteboard(&self, id: WhiteboardId) -> Result<Option<WhiteboardRow>, SyncError> {
        let value = self.get(&format!("/whiteboards/{id}")).await?;
        Ok(envelope::<BoardEnvelope>(value)?.board)
    }

    /// Create a whiteboard record.
    ///
    /// # Errors
    ///
    /// Returns a [`SyncError`] if the request fails.
    pub async fn create_whiteboard(&self, row: &WhiteboardRow) -> Result<(), SyncError> {
        self.send(Method::Post, "/whiteboards", Some(serde_json::to_value(row)?))
            .await
    }

    /// Whiteboards owned by `user_id`, oldest first as returned by the store.
    ///
    /// # Errors
    ///
    /// Returns a [`SyncError`] if the request fails.
    pub async fn list_whiteboards(&self, user_id: &str) -> Result<Vec<WhiteboardRow>, SyncError> {
        let value = self.get(&format!("/whiteboards?user_id={user_id}")).await?;
        Ok(envelope::<BoardsEnvelope>(value)?.boards)
    }

    // --- Notes ---

    /// All notes of a whiteboard, with load defaults applied.
    ///
    /// # Errors
    ///
    /// Returns a [`SyncError`] if the request fails.
    pub async fn list_notes(&self, whiteboard_id: WhiteboardId) -> Result<Vec<Note>, SyncError> {
        let value = self
            .get(&format!("/whiteboard-notes?whiteboard_id={whiteboard_id}"))
            .await?;
        let records = envelope::<NotesEnvelope>(value)?.notes;
        Ok(records.into_iter().map(super::wire::NoteRecord::into_note).collect())
    }

    /// Create or replace a note.
    ///
    /// # Errors
    ///
    /// Returns a [`SyncError`] if the request fails.
    pub async fn upsert_note(&self, row: &NoteRow) -> Result<(), SyncError> {
        self.send(Method::Put, &format!("/whiteboard-notes/{}", row.id), Some(serde_json::to_value(row)?))
            .await
    }

    /// Delete a note.
    ///
    /// # Errors
    ///
    /// Returns a [`SyncError`] if the request fails.
    pub async fn delete_note(&self, id: NoteId) -> Result<(), SyncError> {
        self.send(Method::Delete, &format!("/whiteboard-notes/{id}"), None)
            .await
    }

    // --- Strokes ---

    /// All strokes of a whiteboard.
    ///
    /// # Errors
    ///
    /// Returns a [`SyncError`] if the request fails.
    pub async fn list_strokes(&self, whiteboard_id: WhiteboardId) -> Result<Vec<Stroke>, SyncError> {
        let value = self
            .get(&format!("/whiteboard-drawings?whiteboard_id={whiteboard_id}"))
            .await?;
        let records = envelope::<DrawingsEnvelope>(value)?.drawings;
        Ok(records.into_iter().map(|r| r.into_stroke(whiteboard_id)).collect())
    }

    /// Create or replace a stroke.
    ///
    /// # Errors
    ///
    /// Returns a [`SyncError`] if the request fails.
    pub async fn upsert_stroke(&self, row: &StrokeRow) -> Result<(), SyncError> {
        self.send(Method::Put, &format!("/whiteboard-drawings/{}", row.id), Some(serde_json::to_value(row)?))
            .await
    }

    /// Delete a stroke.
    ///
    /// # Errors
    ///
    /// Returns a [`SyncError`] if the request fails.
    pub async fn delete_stroke(&self, id: StrokeId) -> Result<(), SyncError> {
        self.send(Method::Delete, &format!("/whiteboard-drawings/{id}"), None)
            .await
    }

    // --- Shares ---

    /// Existing shares of a whiteboard.
    ///
    /// # Errors
    ///
    /// Returns a [`SyncError`] if the request fails.
    pub async fn list_shares(&self, whiteboard_id: WhiteboardId) -> Result<Vec<ShareRow>, SyncError> {
        let value = self
            .get(&format!("/whiteboard-shares?whiteboard_id={whiteboard_id}"))
            .await?;
        Ok(envelope::<SharesEnvelope>(value)?.shares)
    }

    /// Create a share record.
    ///
    /// # Errors
    ///
    /// Returns a [`SyncError`] if the request fails.
    pub async fn create_share(&self, row: &ShareRow) -> Result<(), SyncError> {
        self.send(Method::Post, "/whiteboard-shares", Some(serde_json::to_value(row)?))
            .await
    }

    /// Look up a share by id; `None` when the store reports no such share.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::MissingField`] when the response has no `share`
    /// key at all, or another [`SyncError`] if the request fails.
    pub async fn get_share(&self, share_id: Uuid) -> Result<Option<ShareRow>, SyncError> {
        let value = self
            .get(&format!("/whiteboard-shares/{share_id}"))
            .await?;
        field(value, "share")
    }

    // --- Plumbing ---

    async fn get(&self, path: &str) -> Result<Value, SyncError> {
        self.transport.request(Method::Get, path, None).await
    }

    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> Result<(), SyncError> {
        self.transport.request(method, path, body).await?;
        Ok(())
    }
}

/// Decode a list/lookup envelope, treating a null body as empty.
fn envelope<T: DeserializeOwned + Default>(value: Value) -> Result<T, SyncError> {
    if value.is_null() {
        return Ok(T::default());
    }
    Ok(serde_json::from_value(value)?)
}

/// Decode the value under `key`, which must be present.
fn field<T: DeserializeOwned>(value: Value, key: &'static str) -> Result<T, SyncError> {
    let Value::Object(mut map) = value else {
        return Err(SyncError::MissingField(key));
    };
    let inner = map.remove(key).ok_or(SyncError::MissingField(key))?;
    Ok(serde_json::from_value(inner)?)
}
