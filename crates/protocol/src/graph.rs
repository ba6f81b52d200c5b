//! Triple stream decoding port.
//!
//! CONSTRUCT and DESCRIBE responses are RDF serialisations. Parsing them is
//! delegated to a [`TripleStreamDecoder`]; the `turtle` crate provides the
//! default implementation.

use futures::stream::BoxStream;
use oxrdf::Triple;

use crate::errors::SparqlError;
use crate::transport::ByteStream;

/// Triples in arrival order; a syntax error ends the stream after being yielded.
pub type TripleStream = BoxStream<'static, Result<Triple, SparqlError>>;

/// Incrementally parses a serialised graph into triples.
pub trait TripleStreamDecoder: Send + Sync {
    /// Media type this decoder understands, sent as the `Accept` header.
    fn media_type(&self) -> &'static str;

    /// Returns a lazy stream over the triples in `body`.
    ///
    /// Chunk errors from `body` are forwarded unchanged; syntax errors are
    /// reported as [`SparqlError::Decode`].
    fn decode(&self, body: ByteStream) -> TripleStream;
}
