//! Core SPARQL protocol domain.
//!
//! This crate contains the term model glue, the binding mapper, the incremental
//! results scanner, the error types, and the port traits every infrastructure
//! crate implements. Infrastructure crates implement the traits defined here;
//! they never add protocol rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`types`] | Result formats, media types, request methods |
//! | [`terms`] | Raw term descriptors and the [`TermFactory`] port |
//! | [`bindings`] | [`BindingSet`] and the row mapper |
//! | [`query`] | [`QueryKind`] and the [`QueryParser`] port |
//! | [`transport`] | [`ByteStream`] and the [`HttpTransport`] port |
//! | [`graph`] | The [`TripleStreamDecoder`] port |
//! | [`results_json`] | Incremental SPARQL results JSON scanner |
//! | [`errors`] | Error and retry-policy types |

pub mod bindings;
pub mod errors;
pub mod graph;
pub mod query;
pub mod results_json;
pub mod terms;
pub mod transport;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use bindings::{map_row, variable_key, BindingSet, RawRow, VARIABLE_MARKER};
pub use errors::{RetryPolicy, SparqlError};
pub use graph::{TripleStream, TripleStreamDecoder};
pub use query::{QueryKind, QueryParser};
pub use results_json::{ResultsEvent, ResultsJsonScanner};
pub use terms::{OxrdfTermFactory, RawTerm, TermFactory};
pub use transport::{ByteStream, HttpRequest, HttpResponse, HttpTransport};
pub use types::{
    RequestMethod, ResultFormat, FORM_URLENCODED, SPARQL_RESULTS_JSON, SPARQL_UPDATE, TURTLE,
};

// The RDF model the ports are expressed in.
pub use oxrdf::{Term, Triple};
