//! SPARQL query classification adapter.
//!
//! Implements the [`protocol::QueryParser`] trait on the [`spargebra`] SPARQL
//! 1.1 grammar. Only the outermost form of the parsed algebra is inspected:
//!
//! | Parsed form | [`QueryKind`] |
//! |-------------|---------------|
//! | `SELECT` | [`QueryKind::Row`] |
//! | `ASK` | [`QueryKind::Boolean`] |
//! | `CONSTRUCT`, `DESCRIBE` | [`QueryKind::Graph`] |
//! | any update operation | [`QueryKind::Unknown`] |
//!
//! Text that is neither a valid query nor a valid update is a
//! [`SparqlError::Syntax`] carrying the query grammar's diagnostic.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** All grammar details live here; the `protocol` crate sees
//! only [`protocol::QueryParser`].

use protocol::{QueryKind, QueryParser, SparqlError};
use spargebra::{Query, Update};

/// [`QueryParser`] backed by the `spargebra` grammar.
///
/// Stateless; a single instance may be shared freely.
#[derive(Debug, Clone, Copy, Default)]
pub struct SparqlQueryParser;

impl SparqlQueryParser {
    /// Returns the parser; equivalent to [`SparqlQueryParser::default`].
    pub fn new() -> Self {
        Self
    }
}

impl QueryParser for SparqlQueryParser {
    fn classify(&self, query: &str) -> Result<QueryKind, SparqlError> {
        match query.parse::<Query>() {
            Ok(parsed) => Ok(kind_of(&parsed)),
            Err(query_error) => {
                if query.parse::<Update>().is_ok() {
                    tracing::debug!("query text is an update; no result pipeline applies");
                    Ok(QueryKind::Unknown)
                } else {
                    Err(SparqlError::syntax(query_error.to_string()))
                }
            }
        }
    }
}

fn kind_of(query: &Query) -> QueryKind {
    match query {
        Query::Select { .. } => QueryKind::Row,
        Query::Ask { .. } => QueryKind::Boolean,
        Query::Construct { .. } | Query::Describe { .. } => QueryKind::Graph,
    }
}
