//! HTTP Client Implementation using Reqwest

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, TlsTrustPolicy},
};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("hybrid-playback/", env!("CARGO_PKG_VERSION"));

/// Reqwest-based HTTP client implementation
///
/// Holds two connection pools: one that validates server certificates and
/// one that accepts anything. Each request picks a pool from
/// [`HttpRequest::trust`], so relaxing validation for a media download never
/// leaks into unrelated traffic.
pub struct ReqwestHttpClient {
    verifying: Client,
    permissive: Option<Client>,
}

impl ReqwestHttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// Create a new HTTP client with custom timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let verifying = Self::builder(timeout)
            .build()
            .map_err(|e| BridgeError::OperationFailed(format!("Failed to build HTTP client: {e}")))?;
        let permissive = Self::builder(timeout)
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| BridgeError::OperationFailed(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            verifying,
            permissive: Some(permissive),
        })
    }

    /// Wrap an existing client.
    ///
    /// Requests asking for [`TlsTrustPolicy::AcceptInvalidCertificates`] fail
    /// with [`BridgeError::NotAvailable`] unless a permissive client is
    /// supplied too.
    pub fn with_client(client: Client, permissive: Option<Client>) -> Self {
        Self {
            verifying: client,
            permissive,
        }
    }

    fn builder(timeout: Duration) -> reqwest::ClientBuilder {
        Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .user_agent(USER_AGENT)
    }

    /// Convert bridge HttpMethod to reqwest Method
    fn convert_method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Head => reqwest::Method::HEAD,
        }
    }

    fn client_for(&self, trust: TlsTrustPolicy) -> Result<&Client> {
        match trust {
            TlsTrustPolicy::VerifyCertificates => Ok(&self.verifying),
            TlsTrustPolicy::AcceptInvalidCertificates => self.permissive.as_ref().ok_or_else(|| {
                BridgeError::NotAvailable(
                    "HTTP client was built without a permissive TLS pool".to_string(),
                )
            }),
        }
    }

    /// Build reqwest request from bridge request
    fn build_request(&self, request: HttpRequest) -> Result<reqwest::RequestBuilder> {
        let client = self.client_for(request.trust)?;
        let method = Self::convert_method(request.method);
        let mut req = client.request(method, &request.url);

        for (key, value) in request.headers {
            req = req.header(key, value);
        }

        if let Some(timeout) = request.timeout {
            req = req.timeout(timeout);
        }

        Ok(req)
    }

    /// The URL is stripped from the message; signed media URLs carry tokens.
    fn map_error(e: reqwest::Error) -> BridgeError {
        let e = e.without_url();
        if e.is_timeout() {
            BridgeError::OperationFailed("Request timed out".to_string())
        } else if e.is_connect() {
            BridgeError::OperationFailed(format!("Connection failed: {}", e))
        } else {
            BridgeError::OperationFailed(e.to_string())
        }
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        if request.trust.is_permissive() {
            warn!(method = ?request.method, "Sending request with certificate validation disabled");
        }
        debug!(method = ?request.method, "Executing HTTP request");

        let response = self
            .build_request(request)?
            .send()
            .await
            .map_err(|e| {
                let err = Self::map_error(e);
                warn!(error = %err, "HTTP request failed");
                err
            })?;

        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|s| (k.to_string(), s.to_string())))
            .collect();

        let body = response.bytes().await.map_err(Self::map_error)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
