//! The endpoint fetcher and its builder.

use std::sync::Arc;

use classifier::SparqlQueryParser;
use futures::StreamExt;
use protocol::{
    ByteStream, HttpRequest, HttpTransport, OxrdfTermFactory, QueryKind, QueryParser, SparqlError,
    TermFactory, TripleStream, TripleStreamDecoder, SPARQL_RESULTS_JSON,
};
use tracing::debug;
use transport::ReqwestTransport;
use turtle::TurtleDecoder;

use crate::ask::decode_ask;
use crate::config::FetcherConfig;
use crate::request::{query_request, update_request};
use crate::rows::{decode_bindings, decode_results, BindingsStream, RowEventStream};

/// Result of [`SparqlEndpointFetcher::fetch`], shaped by the query kind.
pub enum QueryResults {
    /// SELECT: one binding set per row.
    Bindings(BindingsStream),
    /// ASK: the answer.
    Boolean(bool),
    /// CONSTRUCT or DESCRIBE: the result graph.
    Triples(TripleStream),
}

impl std::fmt::Debug for QueryResults {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bindings(_) => f.write_str("Bindings(..)"),
            Self::Boolean(answer) => f.debug_tuple("Boolean").field(answer).finish(),
            Self::Triples(_) => f.write_str("Triples(..)"),
        }
    }
}

/// Client for a single SPARQL protocol endpoint.
///
/// Every operation is independent: a fetcher holds only shared read-only
/// capabilities and configuration, so one instance (or its clones) may serve
/// any number of concurrent calls. Result streams are lazy; no body bytes are
/// read until the returned stream is polled.
#[derive(Clone)]
pub struct SparqlEndpointFetcher {
    transport: Arc<dyn HttpTransport>,
    term_factory: Arc<dyn TermFactory>,
    query_parser: Arc<dyn QueryParser>,
    triple_decoder: Arc<dyn TripleStreamDecoder>,
    config: FetcherConfig,
}

impl std::fmt::Debug for SparqlEndpointFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SparqlEndpointFetcher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SparqlEndpointFetcher {
    /// A fetcher with every default capability and [`FetcherConfig::default`].
    pub fn new() -> Result<Self, SparqlError> {
        Self::builder().build()
    }

    /// Starts a builder with every capability unset.
    pub fn builder() -> SparqlEndpointFetcherBuilder {
        SparqlEndpointFetcherBuilder::new()
    }

    /// The configuration applied to every request.
    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Determines which result pipeline applies to `query`.
    pub fn classify(&self, query: &str) -> Result<QueryKind, SparqlError> {
        self.query_parser.classify(query)
    }

    /// Sends `query` to `endpoint` asking for `accept` and returns the raw body.
    ///
    /// A non-2xx response yields a stream whose only item is
    /// [`SparqlError::Protocol`]; the response body is dropped unread.
    /// Connection failures are returned directly.
    pub async fn fetch_raw(
        &self,
        endpoint: &str,
        query: &str,
        accept: &str,
    ) -> Result<ByteStream, SparqlError> {
        let request = query_request(&self.config, endpoint, query, accept);
        self.send(endpoint, request).await
    }

    /// Runs a SELECT query and streams one [`protocol::BindingSet`] per row.
    pub async fn fetch_rows(
        &self,
        endpoint: &str,
        query: &str,
    ) -> Result<BindingsStream, SparqlError> {
        let body = self.fetch_raw(endpoint, query, SPARQL_RESULTS_JSON).await?;
        Ok(decode_bindings(
            body,
            Arc::clone(&self.term_factory),
            self.config.prefix_variables,
        ))
    }

    /// Like [`fetch_rows`](Self::fetch_rows), but also yields the projected
    /// variable list when the response announces it.
    pub async fn fetch_results(
        &self,
        endpoint: &str,
        query: &str,
    ) -> Result<RowEventStream, SparqlError> {
        let body = self.fetch_raw(endpoint, query, SPARQL_RESULTS_JSON).await?;
        Ok(decode_results(
            body,
            Arc::clone(&self.term_factory),
            self.config.prefix_variables,
        ))
    }

    /// Runs an ASK query.
    pub async fn fetch_boolean(&self, endpoint: &str, query: &str) -> Result<bool, SparqlError> {
        let body = self.fetch_raw(endpoint, query, SPARQL_RESULTS_JSON).await?;
        decode_ask(body).await
    }

    /// Runs a CONSTRUCT or DESCRIBE query and streams the resulting triples.
    pub async fn fetch_triples(
        &self,
        endpoint: &str,
        query: &str,
    ) -> Result<TripleStream, SparqlError> {
        let accept = self.triple_decoder.media_type();
        let body = self.fetch_raw(endpoint, query, accept).await?;
        Ok(self.triple_decoder.decode(body))
    }

    /// Classifies `query` and runs the matching pipeline.
    pub async fn fetch(&self, endpoint: &str, query: &str) -> Result<QueryResults, SparqlError> {
        let kind = self.classify(query)?;
        debug!(endpoint, %kind, "dispatching query by kind");

        match kind {
            QueryKind::Row => Ok(QueryResults::Bindings(
                self.fetch_rows(endpoint, query).await?,
            )),
            QueryKind::Boolean => Ok(QueryResults::Boolean(
                self.fetch_boolean(endpoint, query).await?,
            )),
            QueryKind::Graph => Ok(QueryResults::Triples(
                self.fetch_triples(endpoint, query).await?,
            )),
            QueryKind::Unknown => Err(SparqlError::UnsupportedQuery(format!(
                "no result pipeline for {kind} queries"
            ))),
        }
    }

    /// Posts a SPARQL update to `endpoint`.
    ///
    /// The update text is sent as is; it is not classified first.
    pub async fn fetch_update(&self, endpoint: &str, update: &str) -> Result<(), SparqlError> {
        let request = update_request(&self.config, endpoint, update);
        let mut body = self.send(endpoint, request).await?;

        while let Some(chunk) = body.next_chunk().await {
            chunk?;
        }
        Ok(())
    }

    async fn send(&self, endpoint: &str, request: HttpRequest) -> Result<ByteStream, SparqlError> {
        let response = self.transport.send(request).await?;

        if response.is_success() {
            return Ok(response.body);
        }

        debug!(
            endpoint,
            status = response.status,
            "endpoint rejected the request"
        );
        Ok(ByteStream::failed(SparqlError::Protocol {
            endpoint: endpoint.to_string(),
            status: response.status,
            status_text: response.status_text,
        }))
    }
}

/// Assembles a [`SparqlEndpointFetcher`]; unset capabilities take their defaults.
#[derive(Default)]
pub struct SparqlEndpointFetcherBuilder {
    transport: Option<Arc<dyn HttpTransport>>,
    term_factory: Option<Arc<dyn TermFactory>>,
    query_parser: Option<Arc<dyn QueryParser>>,
    triple_decoder: Option<Arc<dyn TripleStreamDecoder>>,
    config: FetcherConfig,
}

impl SparqlEndpointFetcherBuilder {
    /// Equivalent to [`SparqlEndpointFetcher::builder`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the reqwest transport. [`FetcherConfig::transport`] is then unused.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Replaces the oxrdf term factory used to build binding values.
    pub fn term_factory(mut self, term_factory: Arc<dyn TermFactory>) -> Self {
        self.term_factory = Some(term_factory);
        self
    }

    /// Replaces the spargebra classifier used by `classify` and `fetch`.
    pub fn query_parser(mut self, query_parser: Arc<dyn QueryParser>) -> Self {
        self.query_parser = Some(query_parser);
        self
    }

    /// Replaces the Turtle decoder; its media type becomes the `Accept` header
    /// of graph queries.
    pub fn triple_decoder(mut self, triple_decoder: Arc<dyn TripleStreamDecoder>) -> Self {
        self.triple_decoder = Some(triple_decoder);
        self
    }

    /// Sets the request configuration; defaults to [`FetcherConfig::default`].
    pub fn config(mut self, config: FetcherConfig) -> Self {
        self.config = config;
        self
    }

    /// Fails only when the default transport cannot be created from
    /// [`FetcherConfig::transport`].
    pub fn build(self) -> Result<SparqlEndpointFetcher, SparqlError> {
        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::from_config(&self.config.transport)?),
        };

        Ok(SparqlEndpointFetcher {
            transport,
            term_factory: self
                .term_factory
                .unwrap_or_else(|| Arc::new(OxrdfTermFactory)),
            query_parser: self
                .query_parser
                .unwrap_or_else(|| Arc::new(SparqlQueryParser::new())),
            triple_decoder: self
                .triple_decoder
                .unwrap_or_else(|| Arc::new(TurtleDecoder::new())),
            config: self.config,
        })
    }
}
