//! Runtime configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::time::Duration;

use uuid::Uuid;

use crate::consts::SAVE_DEBOUNCE_MS;
use crate::doc::WhiteboardId;
use crate::sync::SyncOptions;
use crate::sync::remote::HttpTimeouts;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:3000/api";
pub const DEFAULT_PUBLIC_BASE_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Errors from reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `CORKBOARD_WHITEBOARD_ID` is set but is not a UUID.
    #[error("CORKBOARD_WHITEBOARD_ID is not a valid uuid: {0}")]
    InvalidWhiteboardId(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub public_base_url: String,
    pub user_id: Option<String>,
    pub whiteboard_id: Option<WhiteboardId>,
    pub offline: bool,
    pub save_debounce_ms: u64,
    pub timeouts: HttpTimeouts,
}

impl Config {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `CORKBOARD_API_BASE_URL`: default `http://127.0.0.1:3000/api`
    /// - `CORKBOARD_API_TOKEN`: bearer token for the remote store
    /// - `CORKBOARD_PUBLIC_BASE_URL`: base of share URLs
    /// - `CORKBOARD_USER_ID`: current user; remote access is off without it
    /// - `CORKBOARD_WHITEBOARD_ID`: explicit whiteboard id
    /// - `CORKBOARD_OFFLINE`: `1` or `true` disables remote traffic
    /// - `CORKBOARD_SAVE_DEBOUNCE_MS`: default 400
    /// - `CORKBOARD_REQUEST_TIMEOUT_SECS`: default 30
    /// - `CORKBOARD_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidWhiteboardId`] when the whiteboard id
    /// is set but malformed. Malformed numbers fall back to their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let whiteboard_id = match env_string("CORKBOARD_WHITEBOARD_ID") {
            Some(raw) => Some(Uuid::parse_str(&raw).map_err(|_| ConfigError::InvalidWhiteboardId(raw))?),
            None => None,
        };

        Ok(Self {
            api_base_url: base_url("CORKBOARD_API_BASE_URL", DEFAULT_API_BASE_URL),
            api_token: env_string("CORKBOARD_API_TOKEN"),
            public_base_url: base_url("CORKBOARD_PUBLIC_BASE_URL", DEFAULT_PUBLIC_BASE_URL),
            user_id: env_string("CORKBOARD_USER_ID"),
            whiteboard_id,
            offline: env_string("CORKBOARD_OFFLINE").is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true")),
            save_debounce_ms: env_parse("CORKBOARD_SAVE_DEBOUNCE_MS", SAVE_DEBOUNCE_MS),
            timeouts: HttpTimeouts {
                request_secs: env_parse("CORKBOARD_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
                connect_secs: env_parse("CORKBOARD_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
            },
        })
    }

    /// Identity and timing for the sync engine.
    #[must_use]
    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            user_id: self.user_id.clone(),
            whiteboard_id: self.whiteboard_id,
            offline: self.offline,
            debounce: Duration::from_millis(self.save_debounce_ms),
        }
    }
}

/// Non-empty, trimmed value of `key`.
fn env_string(key: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        _ => None,
    }
}

fn base_url(key: &str, default: &str) -> String {
    env_string(key).unwrap_or_else(|| default.to_string()).trim_end_matches('/').to_string()
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    env_string(key).map_or(default, |v| v.parse::<T>().unwrap_or(default))
}
