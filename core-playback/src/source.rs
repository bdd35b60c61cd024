//! Source and identity types.

use core_runtime::logging::redact_url;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// The media origin a controller plays. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaybackSource(String);

impl PlaybackSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The URL with credentials, query and fragment removed, for logging.
    pub fn redacted(&self) -> String {
        redact_url(&self.0)
    }
}

impl From<&str> for PlaybackSource {
    fn from(url: &str) -> Self {
        Self::new(url)
    }
}

impl From<String> for PlaybackSource {
    fn from(url: String) -> Self {
        Self::new(url)
    }
}

impl fmt::Display for PlaybackSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

/// Unique identifier of a controller instance, used in spans and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ControllerId(Uuid);

impl ControllerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ControllerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ControllerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
