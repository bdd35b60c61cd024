//! Mode detection.
//!
//! Streaming is chosen only on a positive probe. Errors and negative
//! answers both fall back to buffered playback, so detection always
//! resolves to a definite mode.

use bridge_traits::playback::{AssetProber, PlaybackMode};
use tracing::{debug, instrument, warn};

use crate::error::PlaybackError;
use crate::source::{ControllerId, PlaybackSource};

#[instrument(skip_all, fields(controller_id = %id, url = %source))]
pub(crate) async fn detect_mode(
    prober: &dyn AssetProber,
    source: &PlaybackSource,
    id: ControllerId,
) -> PlaybackMode {
    match prober.probe(source.as_str()).await {
        Ok(probe) if probe.is_streamable() => {
            debug!("Probe accepted source for streaming");
            PlaybackMode::Streaming
        }
        Ok(probe) => {
            debug!(
                playable = probe.playable,
                readable = probe.readable,
                "Probe rejected streaming, falling back to buffered"
            );
            PlaybackMode::Buffered
        }
        Err(err) => {
            let err = PlaybackError::ProbeIndeterminate(err.to_string());
            warn!(error = %err, "Falling back to buffered playback");
            PlaybackMode::Buffered
        }
    }
}
