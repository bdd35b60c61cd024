//! Per-controller playback settings.

use bridge_traits::http::TlsTrustPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{PlaybackError, Result};

/// How a seek fraction is applied to a streaming source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamingSeekMode {
    /// Seek to `fraction * duration`, like buffered playback. Ignored while
    /// the duration is unknown.
    #[default]
    FractionOfDuration,
    /// Treat the argument as whole seconds (`0.9` seeks to 0 s, `42.7` to
    /// 42 s). Kept for hosts that depend on the older behaviour.
    LegacyWholeSeconds,
}

/// Settings applied to a single [`PlaybackController`](crate::PlaybackController).
///
/// Every field has a default, so partial JSON/TOML documents deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Period of progress notifications.
    pub progress_interval: Duration,
    /// Seek interpretation for streaming sources.
    pub streaming_seek: StreamingSeekMode,
    /// Certificate policy for the buffered download.
    ///
    /// Defaults to accepting any certificate so self-signed media servers
    /// keep working. Set [`TlsTrustPolicy::VerifyCertificates`] when the
    /// origin has a valid chain.
    pub download_trust: TlsTrustPolicy,
    /// Volume applied to a buffered player once it is ready.
    pub buffered_volume: f32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            progress_interval: Duration::from_secs(1),
            streaming_seek: StreamingSeekMode::default(),
            download_trust: TlsTrustPolicy::AcceptInvalidCertificates,
            buffered_volume: 1.0,
        }
    }
}

impl PlaybackConfig {
    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn with_streaming_seek(mut self, mode: StreamingSeekMode) -> Self {
        self.streaming_seek = mode;
        self
    }

    pub fn with_download_trust(mut self, trust: TlsTrustPolicy) -> Self {
        self.download_trust = trust;
        self
    }

    pub fn with_buffered_volume(mut self, volume: f32) -> Self {
        self.buffered_volume = volume;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::InvalidConfig`] for a zero progress interval
    /// or a volume outside `0.0..=1.0`.
    pub fn validate(&self) -> Result<()> {
        if self.progress_interval.is_zero() {
            return Err(PlaybackError::InvalidConfig(
                "Progress interval must be greater than zero".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.buffered_volume) {
            return Err(PlaybackError::InvalidConfig(format!(
                "Buffered volume must be between 0.0 and 1.0, got {}",
                self.buffered_volume
            )));
        }

        Ok(())
    }
}
