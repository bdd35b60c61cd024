//! HTTP Client Abstraction
//!
//! Async HTTP operations with a per-request TLS trust policy.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::error::{BridgeError, Result};

/// HTTP method types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Head,
}

/// How server certificates are validated for a request.
///
/// `AcceptInvalidCertificates` disables certificate and hostname validation.
/// It exists for self-signed media servers and must be opted into explicitly
/// per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TlsTrustPolicy {
    /// Validate the chain against the platform roots.
    #[default]
    VerifyCertificates,
    /// Trust whatever certificate the server presents.
    AcceptInvalidCertificates,
}

impl TlsTrustPolicy {
    pub fn is_permissive(&self) -> bool {
        matches!(self, TlsTrustPolicy::AcceptInvalidCertificates)
    }
}

/// HTTP request builder
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub timeout: Option<Duration>,
    pub trust: TlsTrustPolicy,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            timeout: None,
            trust: TlsTrustPolicy::default(),
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn head(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Head, url)
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    pub fn trust(mut self, policy: TlsTrustPolicy) -> Self {
        self.trust = policy;
        self
    }
}

/// HTTP response
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

impl HttpResponse {
    /// Check if response status is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Async HTTP client trait
///
/// Implementations must honour [`HttpRequest::trust`]; a client that cannot
/// relax validation should fail permissive requests with
/// [`BridgeError::NotAvailable`] rather than silently verifying.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::http::{HttpClient, HttpRequest};
///
/// async fn fetch(client: &dyn HttpClient) -> Result<Bytes> {
///     client.fetch_bytes(HttpRequest::get("https://media.example.com/a.mp3")).await
/// }
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Execute an HTTP request. Non-2xx statuses are returned, not raised.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Network connection fails
    /// - TLS validation fails
    /// - Request times out
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;

    /// Execute a request and return the body, failing on non-2xx statuses.
    async fn fetch_bytes(&self, request: HttpRequest) -> Result<Bytes> {
        let url = request.url.clone();
        let response = self.execute(request).await?;
        if !response.is_success() {
            return Err(BridgeError::Http {
                status: response.status,
                url,
            });
        }
        Ok(response.body)
    }
}
