use std::sync::Arc;

use bridge_traits::playback::BufferedPlayer;
use tracing::debug;

use super::{PlayOutcome, TickOutcome};
use crate::error::{PlaybackError, Result};
use crate::observer::format_mm_ss;

/// A play request captured before the payload is decoded.
pub(crate) type PendingPlay = Box<dyn FnOnce(&dyn BufferedPlayer) -> bool + Send>;

/// Adapter over a full-buffer player, with its loading lifecycle.
pub(crate) enum BufferedBackend {
    /// Download or decode in flight. Holds at most one deferred play.
    Loading { pending: Option<PendingPlay> },
    Ready { player: Arc<dyn BufferedPlayer> },
    /// Terminal; the controller never becomes ready.
    Failed,
}

impl BufferedBackend {
    pub(crate) fn loading() -> Self {
        BufferedBackend::Loading { pending: None }
    }

    pub(crate) fn is_ready(&self) -> bool {
        matches!(self, BufferedBackend::Ready { .. })
    }

    pub(crate) fn has_pending_play(&self) -> bool {
        matches!(self, BufferedBackend::Loading { pending: Some(_) })
    }

    /// Switch to `Ready` and hand back the deferred play, if any.
    ///
    /// Only a `Loading` backend transitions; anything else is left untouched.
    pub(crate) fn mark_ready(&mut self, player: Arc<dyn BufferedPlayer>) -> Option<PendingPlay> {
        match self {
            BufferedBackend::Loading { pending } => {
                let pending = pending.take();
                *self = BufferedBackend::Ready { player };
                pending
            }
            _ => None,
        }
    }

    /// Switch to `Failed`, discarding any deferred play.
    pub(crate) fn mark_failed(&mut self) {
        if let BufferedBackend::Loading { pending } = self {
            if pending.is_some() {
                debug!("Discarding queued play for failed source");
            }
            *self = BufferedBackend::Failed;
        }
    }

    pub(crate) fn play(&mut self) -> Result<PlayOutcome> {
        match self {
            BufferedBackend::Loading { pending } => {
                if pending.is_some() {
                    debug!("Replacing previously queued play");
                }
                *pending = Some(Box::new(|player: &dyn BufferedPlayer| player.play()));
                Ok(PlayOutcome::Queued)
            }
            BufferedBackend::Ready { player } => Ok(if player.play() {
                PlayOutcome::Started
            } else {
                PlayOutcome::Refused
            }),
            BufferedBackend::Failed => Err(PlaybackError::PreconditionViolation(
                "buffered source failed to load",
            )),
        }
    }

    pub(crate) fn seek(&self, fraction: f64) -> Result<()> {
        let BufferedBackend::Ready { player } = self else {
            return Err(PlaybackError::PreconditionViolation(
                "buffered player not ready",
            ));
        };
        if !fraction.is_finite() {
            return Err(PlaybackError::PreconditionViolation(
                "seek fraction must be finite",
            ));
        }

        player.set_current_time(player.duration().mul_f64(fraction.clamp(0.0, 1.0)));
        Ok(())
    }

    pub(crate) fn duration_secs(&self) -> f64 {
        match self {
            BufferedBackend::Ready { player } => player.duration().as_secs_f64(),
            _ => 0.0,
        }
    }

    pub(crate) fn current_time_secs(&self) -> f64 {
        match self {
            BufferedBackend::Ready { player } => player.current_time().as_secs_f64(),
            _ => 0.0,
        }
    }

    pub(crate) fn tick(&mut self) -> TickOutcome {
        match self {
            BufferedBackend::Ready { player } if player.is_playing() => TickOutcome::Emit {
                position_secs: player.current_time().as_secs_f64(),
                total: format_mm_ss(player.duration().as_secs_f64()),
            },
            _ => TickOutcome::Stop,
        }
    }
}
