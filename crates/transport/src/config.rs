//! Client-level settings for the reqwest transport.

use std::time::Duration;

use serde::Deserialize;

/// Settings applied once, when the underlying HTTP client is built.
///
/// Deserialises with every field optional; missing fields take the values of
/// [`TransportConfig::default`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Whole-request timeout in seconds, covering connect, headers, and body.
    /// `None` disables the timeout.
    pub timeout_secs: Option<u64>,
    /// Connect-phase timeout in seconds. `None` leaves the client default.
    pub connect_timeout_secs: Option<u64>,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl TransportConfig {
    /// [`timeout_secs`](Self::timeout_secs) as a [`Duration`].
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// [`connect_timeout_secs`](Self::connect_timeout_secs) as a [`Duration`].
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            connect_timeout_secs: None,
            user_agent: format!("sparql-fetcher/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}
