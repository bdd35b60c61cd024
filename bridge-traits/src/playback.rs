//! Playback bridge traits.
//!
//! The playback core never decodes or renders audio itself. It drives three
//! host-provided collaborators:
//!
//! - [`AssetProber`]: answers "can this URL be streamed directly?"
//! - [`StreamingEngine`]: creates a [`StreamingPlayer`] that plays straight
//!   from the remote source (AVPlayer, ExoPlayer, ...)
//! - [`BufferedEngine`]: turns a fully downloaded payload into a
//!   [`BufferedPlayer`] (AVAudioPlayer, MediaPlayer with a data source, ...)
//!
//! Player handles are shared as `Arc<dyn ...>` and every method takes `&self`;
//! implementations are expected to use interior mutability, matching how the
//! native engines are driven from arbitrary queues.

use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Which backend drives playback for a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackMode {
    /// The streaming engine plays directly from the URL.
    Streaming,
    /// The whole payload is downloaded, then decoded and played locally.
    Buffered,
}

impl fmt::Display for PlaybackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackMode::Streaming => f.write_str("streaming"),
            PlaybackMode::Buffered => f.write_str("buffered"),
        }
    }
}

/// Outcome of probing a remote asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AssetProbe {
    /// The platform believes it can play the asset.
    pub playable: bool,
    /// The platform can read the asset's container/metadata.
    pub readable: bool,
}

impl AssetProbe {
    pub fn new(playable: bool, readable: bool) -> Self {
        Self { playable, readable }
    }

    /// A probe that rejects streaming outright.
    pub fn unsupported() -> Self {
        Self::default()
    }

    /// Streaming requires both flags.
    pub fn is_streamable(&self) -> bool {
        self.playable && self.readable
    }
}

/// Asset-probing capability.
///
/// Probing may touch the network, so it is async and always called from a
/// background task.
#[async_trait]
pub trait AssetProber: Send + Sync {
    /// Inspect `url` and report whether it can be streamed.
    ///
    /// # Errors
    ///
    /// Any error is treated by the caller as a negative probe.
    async fn probe(&self, url: &str) -> Result<AssetProbe>;
}

/// Status of the item loaded into a streaming player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemStatus {
    /// Metadata has not been resolved yet.
    #[default]
    Unknown,
    /// The item can report position and duration.
    ReadyToPlay,
    /// The item failed to load.
    Failed,
}

/// Handle to a native streaming player.
pub trait StreamingPlayer: Send + Sync {
    /// Start or resume playback. Calling it while already playing is harmless.
    fn play(&self);

    /// Seek to an absolute position.
    fn seek(&self, position: Duration);

    /// Live playback position as reported by the engine.
    ///
    /// May be stale or zero unless [`item_status`](Self::item_status) is
    /// [`ItemStatus::ReadyToPlay`].
    fn current_time(&self) -> Duration;

    /// Asset duration, `None` while unknown or indefinite (live streams).
    fn duration(&self) -> Option<Duration>;

    /// Status of the current item.
    fn item_status(&self) -> ItemStatus;

    /// Whether the engine is currently advancing playback.
    fn is_playing(&self) -> bool;
}

/// Streaming engine capability.
pub trait StreamingEngine: Send + Sync {
    /// Create a player for `url`. Must not block on the network.
    fn open(&self, url: &str) -> Result<Arc<dyn StreamingPlayer>>;
}

/// Handle to a native player that owns a fully decoded payload.
pub trait BufferedPlayer: Send + Sync {
    /// Start playback. Returns `false` if the engine refused.
    fn play(&self) -> bool;

    /// Move the playhead to an absolute position.
    fn set_current_time(&self, position: Duration);

    /// Synchronous playhead position.
    fn current_time(&self) -> Duration;

    /// Total duration of the decoded payload.
    fn duration(&self) -> Duration;

    /// Output volume, normalized to `0.0..=1.0`.
    fn set_volume(&self, volume: f32);

    /// Whether the engine is currently advancing playback.
    fn is_playing(&self) -> bool;
}

/// Full-buffer decode capability.
#[async_trait]
pub trait BufferedEngine: Send + Sync {
    /// Configure the platform audio session for playback (e.g. the iOS
    /// `.playback` category). Called before every decode.
    async fn activate_session(&self) -> Result<()> {
        Ok(())
    }

    /// Decode a complete payload into a ready-to-play handle.
    ///
    /// # Errors
    ///
    /// Returns an error when the bytes are not a supported audio format.
    async fn decode(&self, payload: Bytes) -> Result<Arc<dyn BufferedPlayer>>;
}
