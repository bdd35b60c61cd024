use std::sync::Arc;
use std::time::Duration;

use bridge_traits::playback::{ItemStatus, StreamingPlayer};
use tracing::info;

use super::{PlayOutcome, TickOutcome};
use crate::config::StreamingSeekMode;
use crate::error::{PlaybackError, Result};
use crate::observer::format_mm_ss;

/// Adapter over a native streaming player.
///
/// Position is served from the last progress tick rather than queried live;
/// the engine's value is unreliable until the item is ready to play.
pub(crate) struct StreamingBackend {
    player: Arc<dyn StreamingPlayer>,
    last_observed: f64,
    total_logged: bool,
}

impl StreamingBackend {
    pub(crate) fn new(player: Arc<dyn StreamingPlayer>) -> Self {
        Self {
            player,
            last_observed: 0.0,
            total_logged: false,
        }
    }

    pub(crate) fn play(&self) -> PlayOutcome {
        self.player.play();
        PlayOutcome::Started
    }

    pub(crate) fn seek(&self, fraction: f64, mode: StreamingSeekMode) -> Result<()> {
        if !fraction.is_finite() {
            return Err(PlaybackError::PreconditionViolation(
                "seek fraction must be finite",
            ));
        }

        let target = match mode {
            StreamingSeekMode::FractionOfDuration => {
                let duration = self.player.duration().ok_or(
                    PlaybackError::PreconditionViolation("streaming duration not known yet"),
                )?;
                duration.mul_f64(fraction.clamp(0.0, 1.0))
            }
            // Saturating cast: negatives become zero.
            StreamingSeekMode::LegacyWholeSeconds => Duration::from_secs(fraction.trunc() as u64),
        };

        self.player.seek(target);
        Ok(())
    }

    pub(crate) fn duration_secs(&self) -> f64 {
        self.player
            .duration()
            .map(|duration| duration.as_secs_f64())
            .unwrap_or(0.0)
    }

    pub(crate) fn current_time_secs(&self) -> f64 {
        self.last_observed
    }

    /// An item that is still buffering keeps the ticker alive; only a ready
    /// item that stopped playing, or a failed item, ends it.
    pub(crate) fn tick(&mut self) -> TickOutcome {
        match self.player.item_status() {
            ItemStatus::Unknown => return TickOutcome::Skip,
            ItemStatus::Failed => return TickOutcome::Stop,
            ItemStatus::ReadyToPlay if !self.player.is_playing() => return TickOutcome::Stop,
            ItemStatus::ReadyToPlay => {}
        }

        self.last_observed = self.player.current_time().as_secs_f64();

        let total = format_mm_ss(self.duration_secs());
        if !self.total_logged && self.player.duration().is_some() {
            info!(total = %total, "Streaming total time {}", total);
            self.total_logged = true;
        }

        TickOutcome::Emit {
            position_secs: self.last_observed,
            total,
        }
    }
}
