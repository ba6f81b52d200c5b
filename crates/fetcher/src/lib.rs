//! SPARQL endpoint fetcher.
//!
//! [`SparqlEndpointFetcher`] sends queries to a SPARQL protocol endpoint and
//! decodes the responses as they stream in:
//!
//! | Operation | Query form | Accept | Result |
//! |-----------|------------|--------|--------|
//! | [`fetch_rows`](SparqlEndpointFetcher::fetch_rows) | `SELECT` | `application/sparql-results+json` | [`BindingsStream`] |
//! | [`fetch_results`](SparqlEndpointFetcher::fetch_results) | `SELECT` | `application/sparql-results+json` | [`RowEventStream`] |
//! | [`fetch_boolean`](SparqlEndpointFetcher::fetch_boolean) | `ASK` | `application/sparql-results+json` | `bool` |
//! | [`fetch_triples`](SparqlEndpointFetcher::fetch_triples) | `CONSTRUCT`, `DESCRIBE` | `text/turtle` | [`protocol::TripleStream`] |
//! | [`fetch`](SparqlEndpointFetcher::fetch) | any query | by kind | [`QueryResults`] |
//! | [`fetch_update`](SparqlEndpointFetcher::fetch_update) | update | n/a | `()` |
//!
//! An endpoint that answers with a non-2xx status produces
//! [`protocol::SparqlError::Protocol`] as the first item of the result stream
//! (or as the error of the async call for `fetch_boolean` and `fetch_update`).
//!
//! ## Architectural Layer
//!
//! **Composition root.** This crate wires the `transport`, `classifier`, and
//! `turtle` adapters into the ports defined by `protocol`. Each capability can
//! be replaced through [`SparqlEndpointFetcherBuilder`].
//!
//! ```no_run
//! # async fn run() -> Result<(), protocol::SparqlError> {
//! use futures::TryStreamExt;
//!
//! let fetcher = fetcher::SparqlEndpointFetcher::new()?;
//! let mut rows = fetcher
//!     .fetch_rows("https://dbpedia.org/sparql", "SELECT * WHERE { ?s ?p ?o } LIMIT 10")
//!     .await?;
//! while let Some(row) = rows.try_next().await? {
//!     println!("{:?}", row.get("?s"));
//! }
//! # Ok(())
//! # }
//! ```

mod ask;
pub mod config;
mod fetcher;
mod request;
mod rows;

pub use config::FetcherConfig;
pub use fetcher::{QueryResults, SparqlEndpointFetcher, SparqlEndpointFetcherBuilder};
pub use rows::{BindingsStream, RowEvent, RowEventStream};
