//! # Host Bridge Traits
//!
//! Capability traits the playback core needs from the host platform.
//!
//! ## Overview
//!
//! The core decides *how* to play a remote audio URL (stream it or download
//! it first) and keeps a progress observer informed. Everything that touches
//! the network or the audio hardware lives behind the traits in this crate,
//! so the same controller runs against AVFoundation on iOS, ExoPlayer on
//! Android or an in-memory fake in tests.
//!
//! ## Traits
//!
//! ### Networking
//! - [`HttpClient`](http::HttpClient) - Async HTTP with a per-request TLS trust policy
//! - [`AssetProber`](playback::AssetProber) - Decides whether a URL is streamable
//!
//! ### Audio engines
//! - [`StreamingEngine`](playback::StreamingEngine) / [`StreamingPlayer`](playback::StreamingPlayer)
//! - [`BufferedEngine`](playback::BufferedEngine) / [`BufferedPlayer`](playback::BufferedPlayer)
//!
//! ### Utilities
//! - [`LoggerSink`](logger::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | HTTP / probe        | Audio engines       |
//! |----------|---------------------|---------------------|
//! | Desktop  | `bridge-desktop`    | host supplied       |
//! | iOS      | host supplied       | AVPlayer / AVAudioPlayer |
//! | Android  | host supplied       | ExoPlayer / MediaPlayer  |
//!
//! ## Fail-Fast Strategy
//!
//! `core_runtime::config::CoreConfigBuilder::build` returns
//! `CapabilityMissing` when a required capability was not injected and no
//! desktop default exists.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync`. Player handles take `&self` on
//! every method, so implementations use interior mutability.
//!
//! ## Examples
//!
//! ### Implementing AssetProber
//!
//! ```ignore
//! use async_trait::async_trait;
//! use bridge_traits::error::Result;
//! use bridge_traits::playback::{AssetProbe, AssetProber};
//!
//! pub struct ExtensionProber;
//!
//! #[async_trait]
//! impl AssetProber for ExtensionProber {
//!     async fn probe(&self, url: &str) -> Result<AssetProbe> {
//!         let streamable = url.ends_with(".m3u8");
//!         Ok(AssetProbe::new(streamable, streamable))
//!     }
//! }
//! ```

pub mod error;
pub mod http;
pub mod logger;
pub mod playback;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, TlsTrustPolicy};
pub use logger::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use playback::{
    AssetProbe, AssetProber, BufferedEngine, BufferedPlayer, ItemStatus, PlaybackMode,
    StreamingEngine, StreamingPlayer,
};
