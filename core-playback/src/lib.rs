//! # Hybrid Playback Controller
//!
//! Plays a remote audio source through one of two backends:
//!
//! - **Streaming**: the host's streaming engine plays directly from the URL.
//!   Chosen when the asset prober reports the source as both playable and
//!   readable.
//! - **Buffered**: the whole payload is downloaded, decoded by the host's
//!   buffered engine and played locally. Chosen for everything else.
//!
//! Mode detection runs in the background as soon as a
//! [`PlaybackController`] is created. Transport calls made while a buffered
//! download is still running are handled the way a user expects: a `play()`
//! is remembered and fires once the payload is ready, a `seek()` is dropped.
//!
//! While playing, a registered [`ProgressObserver`] receives the position and
//! the formatted total duration about once per second.
//!
//! ## Wiring
//!
//! ```ignore
//! use core_playback::{PlaybackConfig, PlaybackController};
//! use core_runtime::config::CoreConfig;
//!
//! let core = CoreConfig::builder()
//!     .streaming_engine(streaming)
//!     .buffered_engine(buffered)
//!     .build()?;
//!
//! let controller = PlaybackController::new(url, &core, PlaybackConfig::default())?;
//! controller.set_observer(&observer);
//! controller.play();
//! ```

mod backend;
pub mod config;
pub mod controller;
pub mod error;
mod mode;
pub mod observer;
mod progress;
pub mod source;

pub use bridge_traits::playback::PlaybackMode;
pub use config::{PlaybackConfig, StreamingSeekMode};
pub use controller::PlaybackController;
pub use error::{PlaybackError, Result};
pub use observer::{format_mm_ss, ProgressObserver};
pub use source::{ControllerId, PlaybackSource};
