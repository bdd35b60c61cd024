//! HEAD-request asset prober.
//!
//! Without a native media stack on desktop, streamability is judged from the
//! response headers of a `HEAD` request:
//!
//! - **playable**: 2xx status and an audio `Content-Type` (`audio/*` or an HLS
//!   playlist type). An absent or `application/octet-stream` type falls back
//!   to the URL's file extension.
//! - **readable**: the server advertises `Accept-Ranges: bytes`, or the asset
//!   is an HLS playlist (segments are fetched whole).
//!
//! A server that rejects `HEAD` yields a negative probe, not an error.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bridge_traits::{
    error::Result,
    http::{HttpClient, HttpRequest, HttpResponse, TlsTrustPolicy},
    playback::{AssetProbe, AssetProber},
};
use tracing::debug;

const HLS_CONTENT_TYPES: &[&str] = &[
    "application/vnd.apple.mpegurl",
    "application/x-mpegurl",
    "audio/mpegurl",
    "audio/x-mpegurl",
];

const AUDIO_EXTENSIONS: &[&str] = &["mp3", "m4a", "aac", "wav", "aiff", "caf", "flac", "m3u8"];

/// Asset prober backed by any [`HttpClient`].
pub struct HttpAssetProber {
    client: Arc<dyn HttpClient>,
    timeout: Duration,
    trust: TlsTrustPolicy,
}

impl HttpAssetProber {
    pub fn new(client: Arc<dyn HttpClient>) -> Self {
        Self {
            client,
            timeout: Duration::from_secs(10),
            trust: TlsTrustPolicy::VerifyCertificates,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Certificate policy for probe requests. Defaults to verifying.
    pub fn with_trust(mut self, trust: TlsTrustPolicy) -> Self {
        self.trust = trust;
        self
    }

    /// Derive the probe outcome from a `HEAD` response.
    pub fn classify(url: &str, response: &HttpResponse) -> AssetProbe {
        if !response.is_success() {
            return AssetProbe::unsupported();
        }

        let content_type = response
            .header("content-type")
            .map(|value| {
                value
                    .split(';')
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_ascii_lowercase()
            })
            .unwrap_or_default();

        let extension = url_extension(url);
        let is_hls = HLS_CONTENT_TYPES.contains(&content_type.as_str())
            || extension.as_deref() == Some("m3u8");

        let playable = if content_type.is_empty() || content_type == "application/octet-stream" {
            extension
                .as_deref()
                .map(|ext| AUDIO_EXTENSIONS.contains(&ext))
                .unwrap_or(false)
        } else {
            content_type.starts_with("audio/") || is_hls
        };

        let readable = is_hls
            || response
                .header("accept-ranges")
                .map(|value| value.trim().eq_ignore_ascii_case("bytes"))
                .unwrap_or(false);

        AssetProbe::new(playable, readable)
    }
}

/// Lowercased extension of the URL path, ignoring query and fragment.
fn url_extension(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let path = path.split_once("://").map(|(_, rest)| rest).unwrap_or(path);
    let (_, file) = path.rsplit_once('/')?;
    let (_, ext) = file.rsplit_once('.')?;
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_ascii_lowercase())
    }
}

#[async_trait]
impl AssetProber for HttpAssetProber {
    async fn probe(&self, url: &str) -> Result<AssetProbe> {
        let request = HttpRequest::head(url)
            .timeout(self.timeout)
            .trust(self.trust);
        let response = self.client.execute(request).await?;
        let probe = Self::classify(url, &response);
        debug!(
            status = response.status,
            playable = probe.playable,
            readable = probe.readable,
            "Asset probe complete"
        );
        Ok(probe)
    }
}
