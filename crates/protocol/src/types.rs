//! Shared value types for the SPARQL protocol domain.
//!
//! These carry the content-negotiation and request-shape choices that every
//! pipeline makes: which serialisation to ask the endpoint for, and which HTTP
//! method carries the query text.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Result serialisations
// ---------------------------------------------------------------------------

/// A response serialisation this client can decode incrementally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultFormat {
    /// SPARQL 1.1 Query Results JSON, used for SELECT and ASK.
    SparqlResultsJson,
    /// Turtle, used for CONSTRUCT and DESCRIBE.
    Turtle,
}

impl ResultFormat {
    /// Media type sent in the `Accept` header for this format.
    pub fn media_type(self) -> &'static str {
        match self {
            Self::SparqlResultsJson => SPARQL_RESULTS_JSON,
            Self::Turtle => TURTLE,
        }
    }
}

impl std::fmt::Display for ResultFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.media_type())
    }
}

/// Media type of SPARQL 1.1 Query Results JSON.
pub const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// Media type of Turtle.
pub const TURTLE: &str = "text/turtle";

/// Media type of a SPARQL 1.1 Update request body.
pub const SPARQL_UPDATE: &str = "application/sparql-update";

/// Media type of an HTML-form encoded request body.
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

// ---------------------------------------------------------------------------
// Request shape
// ---------------------------------------------------------------------------

/// HTTP method used to carry a query to the endpoint.
///
/// `Get` puts the query into the URL; `Post` sends it as an HTML-form encoded
/// body. Updates are always posted regardless of this setting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestMethod {
    /// `GET <endpoint>?query=...`
    #[default]
    Get,
    /// `POST <endpoint>` with a form-encoded body.
    Post,
}

impl RequestMethod {
    /// Returns the method token as sent on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl std::fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_negotiate_their_media_types() {
        assert_eq!(
            ResultFormat::SparqlResultsJson.media_type(),
            "application/sparql-results+json"
        );
        assert_eq!(ResultFormat::Turtle.media_type(), "text/turtle");
    }

    #[test]
    fn method_deserialises_from_uppercase_token() {
        let method: RequestMethod = serde_json::from_str("\"POST\"").unwrap();
        assert_eq!(method, RequestMethod::Post);
        assert_eq!(RequestMethod::default(), RequestMethod::Get);
    }
}
