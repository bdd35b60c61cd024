//! Facade crate for the hybrid playback workspace.
//!
//! Re-exports the playback controller together with the capability traits and
//! runtime services a host needs to wire it up. Enable `desktop-shims` (default)
//! to get the reqwest-backed HTTP client and HEAD-request asset prober.

pub use bridge_traits as bridge;
pub use core_playback::{
    format_mm_ss, ControllerId, PlaybackConfig, PlaybackController, PlaybackError,
    PlaybackMode, PlaybackSource, ProgressObserver, StreamingSeekMode,
};
pub use core_runtime::{config::CoreConfig, events, logging};

#[cfg(feature = "desktop-shims")]
pub use bridge_desktop::{HttpAssetProber, ReqwestHttpClient};
