//! # Desktop Bridge Implementations
//!
//! Default implementations of the networking bridge traits for desktop
//! platforms (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest`, with a separate pool for requests that
//!   opt out of certificate validation
//! - `AssetProber` using a `HEAD` request and response headers
//!
//! Audio engines are not provided here; hosts inject their own
//! `StreamingEngine` and `BufferedEngine`.
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use bridge_desktop::{HttpAssetProber, ReqwestHttpClient};
//!
//! let http = Arc::new(ReqwestHttpClient::new()?);
//! let prober = HttpAssetProber::new(http.clone());
//! ```

mod http;
mod probe;

pub use http::ReqwestHttpClient;
pub use probe::HttpAssetProber;
