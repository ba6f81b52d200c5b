//! HTTP transport adapter.
//!
//! Implements the [`protocol::HttpTransport`] trait over [`reqwest`]. The
//! response body is handed back as reqwest's chunk stream wrapped in a
//! [`ByteStream`]; nothing is read before the caller polls it.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Connection pooling, TLS, timeouts, and the user agent
//! live here. The `fetcher` crate sees only [`protocol::HttpTransport`].

pub mod config;

pub use config::TransportConfig;

use async_trait::async_trait;
use protocol::{ByteStream, HttpRequest, HttpResponse, HttpTransport, RequestMethod, SparqlError};
use tracing::debug;

/// [`HttpTransport`] backed by a shared [`reqwest::Client`].
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Builds a transport with [`TransportConfig::default`].
    pub fn new() -> Result<Self, SparqlError> {
        Self::from_config(&TransportConfig::default())
    }

    /// Builds a transport whose client applies `config`.
    pub fn from_config(config: &TransportConfig) -> Result<Self, SparqlError> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = config.connect_timeout() {
            builder = builder.connect_timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| SparqlError::configuration(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Wraps an existing client, e.g. one configured with a proxy or custom
    /// root certificates.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, SparqlError> {
        let method = match request.method {
            RequestMethod::Get => reqwest::Method::GET,
            RequestMethod::Post => reqwest::Method::POST,
        };

        let mut builder = self.client.request(method, request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        debug!(method = %request.method, url = %request.url, "sending SPARQL request");
        let response = builder.send().await.map_err(|e| {
            if e.is_builder() {
                SparqlError::configuration(format!("invalid request for {}: {e}", request.url))
            } else {
                SparqlError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        debug!(url = %request.url, status = status.as_u16(), "SPARQL endpoint responded");

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status
                .canonical_reason()
                .map(str::to_owned)
                .unwrap_or_else(|| status.as_str().to_owned()),
            body: ByteStream::from_fallible(response.bytes_stream()),
        })
    }
}
