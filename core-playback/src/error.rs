//! # Playback Error Types
//!
//! Error taxonomy for the playback controller.
//!
//! Transport calls (`play`, `seek`) never return these to the caller. They
//! are either absorbed with a `debug!` line (preconditions) or reported
//! through logging, [`last_error`](crate::PlaybackController::last_error)
//! and the event bus (terminal failures).

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Errors that can occur during playback operations.
#[derive(Error, Debug)]
pub enum PlaybackError {
    // ========================================================================
    // Mode Detection
    // ========================================================================
    /// The prober could not decide. Always resolved to buffered playback.
    #[error("Streaming probe was inconclusive: {0}")]
    ProbeIndeterminate(String),

    // ========================================================================
    // Buffered Loading (terminal)
    // ========================================================================
    /// The full-payload download failed.
    #[error("Download failed: {0}")]
    FetchFailed(String),

    /// The payload was downloaded but could not be turned into a player.
    #[error("Decode failed: {0}")]
    DecodeFailed(String),

    // ========================================================================
    // Transport Control
    // ========================================================================
    /// A transport call arrived before the controller could serve it.
    #[error("Precondition not met: {0}")]
    PreconditionViolation(&'static str),

    // ========================================================================
    // Configuration
    // ========================================================================
    /// `PlaybackConfig` failed validation.
    #[error("Invalid playback configuration: {0}")]
    InvalidConfig(String),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// A host capability reported an error.
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),
}

impl PlaybackError {
    /// Returns `true` if the controller can never become ready after this error.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PlaybackError::FetchFailed(_) | PlaybackError::DecodeFailed(_)
        )
    }

    /// Returns `true` for premature calls that are dropped silently.
    pub fn is_precondition(&self) -> bool {
        matches!(self, PlaybackError::PreconditionViolation(_))
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
