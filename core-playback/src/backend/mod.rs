//! The two playback backends behind one dispatch point.
//!
//! [`ActiveBackend`] is chosen once, when the mode resolves. Every transport
//! call after that is a single `match` on it.

mod buffered;
mod streaming;

pub(crate) use buffered::BufferedBackend;
pub(crate) use streaming::StreamingBackend;

use bridge_traits::playback::PlaybackMode;

use crate::config::StreamingSeekMode;
use crate::error::Result;

/// What a progress tick should do.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TickOutcome {
    /// Notify the observer.
    Emit { position_secs: f64, total: String },
    /// Nothing to report yet; keep ticking.
    Skip,
    /// Playback has stopped; end the ticker.
    Stop,
}

/// Result of a `play()` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlayOutcome {
    Started,
    /// Stored until the buffered source is ready.
    Queued,
    /// The engine declined to start.
    Refused,
}

pub(crate) enum ActiveBackend {
    Streaming(StreamingBackend),
    Buffered(BufferedBackend),
}

impl ActiveBackend {
    pub(crate) fn mode(&self) -> PlaybackMode {
        match self {
            ActiveBackend::Streaming(_) => PlaybackMode::Streaming,
            ActiveBackend::Buffered(_) => PlaybackMode::Buffered,
        }
    }

    pub(crate) fn is_ready(&self) -> bool {
        match self {
            ActiveBackend::Streaming(_) => true,
            ActiveBackend::Buffered(backend) => backend.is_ready(),
        }
    }

    pub(crate) fn play(&mut self) -> Result<PlayOutcome> {
        match self {
            ActiveBackend::Streaming(backend) => Ok(backend.play()),
            ActiveBackend::Buffered(backend) => backend.play(),
        }
    }

    pub(crate) fn seek(&self, fraction: f64, streaming_mode: StreamingSeekMode) -> Result<()> {
        match self {
            ActiveBackend::Streaming(backend) => backend.seek(fraction, streaming_mode),
            ActiveBackend::Buffered(backend) => backend.seek(fraction),
        }
    }

    pub(crate) fn duration_secs(&self) -> f64 {
        match self {
            ActiveBackend::Streaming(backend) => backend.duration_secs(),
            ActiveBackend::Buffered(backend) => backend.duration_secs(),
        }
    }

    pub(crate) fn current_time_secs(&self) -> f64 {
        match self {
            ActiveBackend::Streaming(backend) => backend.current_time_secs(),
            ActiveBackend::Buffered(backend) => backend.current_time_secs(),
        }
    }

    pub(crate) fn tick(&mut self) -> TickOutcome {
        match self {
            ActiveBackend::Streaming(backend) => backend.tick(),
            ActiveBackend::Buffered(backend) => backend.tick(),
        }
    }
}
