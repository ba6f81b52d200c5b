//! Fetcher configuration.

use std::collections::BTreeMap;

use protocol::RequestMethod;
use serde::Deserialize;
use transport::TransportConfig;

/// Request shaping applied to every call a fetcher makes.
///
/// Deserialises with every field optional; missing fields take the values of
/// [`FetcherConfig::default`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// How queries are carried. Updates are always posted.
    pub method: RequestMethod,
    /// Headers added to every request. An `Accept` entry is ignored for query
    /// operations, which always negotiate their own result format.
    pub default_headers: BTreeMap<String, String>,
    /// Extra URL parameters appended after `query` (e.g. `timeout`,
    /// `default-graph-uri`).
    pub additional_url_params: BTreeMap<String, String>,
    /// Whether binding keys and variable names carry the `?` marker.
    pub prefix_variables: bool,
    /// Settings for the default reqwest transport. Ignored when a transport
    /// is injected.
    pub transport: TransportConfig,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            method: RequestMethod::Get,
            default_headers: BTreeMap::new(),
            additional_url_params: BTreeMap::new(),
            prefix_variables: true,
            transport: TransportConfig::default(),
        }
    }
}
