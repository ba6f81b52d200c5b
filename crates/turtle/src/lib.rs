//! Turtle triple stream adapter.
//!
//! Implements the [`protocol::TripleStreamDecoder`] trait with the push-based
//! low-level parser from [`oxttl`]. Body chunks are handed to the parser as
//! they arrive and every triple it can complete is yielded immediately, so a
//! CONSTRUCT result is never held in memory as a whole.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Serialisation details live here; the `protocol` crate
//! sees only [`protocol::TripleStreamDecoder`].

use futures::StreamExt;
use oxttl::TurtleParser;
use protocol::{ByteStream, SparqlError, TripleStream, TripleStreamDecoder, TURTLE};

/// [`TripleStreamDecoder`] for `text/turtle` bodies.
#[derive(Clone, Default)]
pub struct TurtleDecoder {
    parser: TurtleParser,
}

impl TurtleDecoder {
    /// A decoder without a base IRI.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves relative IRIs in the response against `base_iri`.
    pub fn with_base_iri(self, base_iri: impl Into<String>) -> Result<Self, SparqlError> {
        let parser = self
            .parser
            .with_base_iri(base_iri)
            .map_err(|e| SparqlError::configuration(format!("invalid base IRI: {e}")))?;
        Ok(Self { parser })
    }
}

impl std::fmt::Debug for TurtleDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurtleDecoder").finish_non_exhaustive()
    }
}

impl TripleStreamDecoder for TurtleDecoder {
    fn media_type(&self) -> &'static str {
        TURTLE
    }

    fn decode(&self, mut body: ByteStream) -> TripleStream {
        let mut parser = self.parser.clone().low_level();

        let triples = async_stream::stream! {
            let mut emitted: usize = 0;

            loop {
                let finished = match body.next().await {
                    Some(Ok(bytes)) => {
                        parser.extend_from_slice(&bytes);
                        false
                    }
                    Some(Err(e)) => {
                        yield Err(e);
                        return;
                    }
                    None => {
                        parser.end();
                        true
                    }
                };

                while let Some(result) = parser.parse_next() {
                    match result {
                        Ok(triple) => {
                            emitted += 1;
                            yield Ok(triple);
                        }
                        Err(e) => {
                            yield Err(SparqlError::Decode(e.to_string()));
                            return;
                        }
                    }
                }

                if finished {
                    break;
                }
            }

            tracing::debug!(triples = emitted, "turtle stream finished");
        };

        Box::pin(triples)
    }
}
