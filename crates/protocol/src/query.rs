//! Query classification.
//!
//! The client never interprets a query beyond deciding which result shape it
//! produces. That decision is a [`QueryKind`], supplied by a [`QueryParser`]
//! implementation backed by a real SPARQL grammar.

use serde::{Deserialize, Serialize};

use crate::errors::SparqlError;

/// The result shape a query produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryKind {
    /// SELECT: a sequence of binding sets.
    Row,
    /// ASK: a single boolean.
    Boolean,
    /// CONSTRUCT or DESCRIBE: a sequence of triples.
    Graph,
    /// Valid SPARQL that is not a query operation (e.g. an update).
    Unknown,
}

impl std::fmt::Display for QueryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Row => "ROW",
            Self::Boolean => "BOOLEAN",
            Self::Graph => "GRAPH",
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

/// Classifies query text into a [`QueryKind`].
///
/// Implementations are pure: the same text always yields the same answer and
/// the call has no side effects, so one instance may serve concurrent callers.
pub trait QueryParser: Send + Sync {
    /// Returns the kind of `query`, or [`SparqlError::Syntax`] if the text is
    /// not valid SPARQL.
    fn classify(&self, query: &str) -> Result<QueryKind, SparqlError>;
}
