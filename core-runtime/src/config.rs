//! # Core Configuration Module
//!
//! Capability wiring for playback controllers.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! holding every host capability a controller needs. It fails fast when a
//! capability is missing, before any controller is created.
//!
//! ## Required Dependencies
//!
//! - `StreamingEngine` - plays a URL directly (AVPlayer, ExoPlayer)
//! - `BufferedEngine` - decodes a downloaded payload (AVAudioPlayer, MediaPlayer)
//!
//! ## Optional Dependencies (with platform defaults)
//!
//! - `HttpClient` - full-payload downloads (desktop default: reqwest)
//! - `AssetProber` - streamability check (desktop default: HEAD request)
//! - `EventBus` - lifecycle event fan-out (optional)
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .streaming_engine(Arc::new(AvPlayerEngine::new()))
//!     .buffered_engine(Arc::new(AvAudioEngine::new()))
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! Missing capabilities produce `Error::CapabilityMissing` with a message
//! that says how to provide them on each platform.

use crate::error::{Error, Result};
use crate::events::EventBus;
use bridge_traits::{AssetProber, BufferedEngine, HttpClient, StreamingEngine};
use std::sync::Arc;

/// Host capabilities shared by every controller.
///
/// Cheap to clone; all capabilities are reference counted.
#[derive(Clone)]
pub struct CoreConfig {
    /// HTTP client for full-payload downloads
    pub http_client: Arc<dyn HttpClient>,

    /// Decides whether a URL can be streamed
    pub asset_prober: Arc<dyn AssetProber>,

    /// Direct-from-URL playback engine
    pub streaming_engine: Arc<dyn StreamingEngine>,

    /// Decode-from-memory playback engine
    pub buffered_engine: Arc<dyn BufferedEngine>,

    /// Optional lifecycle event fan-out
    pub event_bus: Option<EventBus>,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("http_client", &"HttpClient { ... }")
            .field("asset_prober", &"AssetProber { ... }")
            .field("streaming_engine", &"StreamingEngine { ... }")
            .field("buffered_engine", &"BufferedEngine { ... }")
            .field("event_bus", &self.event_bus)
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }
}

fn streaming_engine_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "StreamingEngine".to_string(),
        message: "StreamingEngine implementation is required for direct URL playback. \
                 iOS/macOS: inject an AVPlayer-backed engine. \
                 Android: inject an ExoPlayer-backed engine."
            .to_string(),
    }
}

fn buffered_engine_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "BufferedEngine".to_string(),
        message: "BufferedEngine implementation is required for download-then-play sources. \
                 iOS/macOS: inject an AVAudioPlayer-backed engine. \
                 Android: inject a MediaPlayer-backed engine."
            .to_string(),
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn http_client_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "HttpClient implementation is required for buffered downloads. \
                 Desktop: ensure the 'desktop-shims' feature is enabled to use the default ReqwestHttpClient. \
                 Mobile: inject a platform-native HTTP client (URLSession/OkHttp)."
            .to_string(),
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn asset_prober_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "AssetProber".to_string(),
        message: "AssetProber implementation is required for mode detection. \
                 Desktop: ensure the 'desktop-shims' feature is enabled to use the default HttpAssetProber. \
                 Mobile: inject a prober backed by AVURLAsset or MediaExtractor."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let client = ReqwestHttpClient::new()
        .map_err(|e| Error::Internal(format!("Failed to create default HttpClient: {}", e)))?;
    let client: Arc<dyn HttpClient> = Arc::new(client);
    Ok(client)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    Err(http_client_missing_error())
}

#[cfg(feature = "desktop-shims")]
fn provide_default_asset_prober(http_client: &Arc<dyn HttpClient>) -> Result<Arc<dyn AssetProber>> {
    use bridge_desktop::HttpAssetProber;

    let prober: Arc<dyn AssetProber> = Arc::new(HttpAssetProber::new(Arc::clone(http_client)));
    Ok(prober)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_asset_prober(_http_client: &Arc<dyn HttpClient>) -> Result<Arc<dyn AssetProber>> {
    Err(asset_prober_missing_error())
}

/// Builder for constructing [`CoreConfig`] instances.
#[derive(Default)]
pub struct CoreConfigBuilder {
    http_client: Option<Arc<dyn HttpClient>>,
    asset_prober: Option<Arc<dyn AssetProber>>,
    streaming_engine: Option<Arc<dyn StreamingEngine>>,
    buffered_engine: Option<Arc<dyn BufferedEngine>>,
    event_bus: Option<EventBus>,
}

impl CoreConfigBuilder {
    /// Sets the HTTP client implementation.
    ///
    /// If not provided, the desktop default (reqwest-based) will be used when
    /// the `desktop-shims` feature is enabled.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets the asset prober implementation.
    ///
    /// If not provided, the desktop default (`HEAD` request through the
    /// configured HTTP client) will be used when the `desktop-shims` feature
    /// is enabled.
    pub fn asset_prober(mut self, prober: Arc<dyn AssetProber>) -> Self {
        self.asset_prober = Some(prober);
        self
    }

    /// Sets the streaming engine implementation (required).
    pub fn streaming_engine(mut self, engine: Arc<dyn StreamingEngine>) -> Self {
        self.streaming_engine = Some(engine);
        self
    }

    /// Sets the buffered engine implementation (required).
    pub fn buffered_engine(mut self, engine: Arc<dyn BufferedEngine>) -> Self {
        self.buffered_engine = Some(engine);
        self
    }

    /// Publishes controller lifecycle events on `bus`.
    pub fn event_bus(mut self, bus: EventBus) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// # Errors
    ///
    /// Returns `Error::CapabilityMissing` when an engine is missing, or when
    /// the HTTP client or prober is missing and no desktop default applies.
    pub fn build(self) -> Result<CoreConfig> {
        let streaming_engine = self
            .streaming_engine
            .ok_or_else(streaming_engine_missing_error)?;
        let buffered_engine = self
            .buffered_engine
            .ok_or_else(buffered_engine_missing_error)?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client()?,
        };

        let asset_prober = match self.asset_prober {
            Some(prober) => prober,
            None => provide_default_asset_prober(&http_client)?,
        };

        Ok(CoreConfig {
            http_client,
            asset_prober,
            streaming_engine,
            buffered_engine,
            event_bus: self.event_bus,
        })
    }
}
