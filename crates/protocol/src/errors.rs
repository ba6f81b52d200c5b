//! Error and retry-policy types for the SPARQL protocol domain.
//!
//! [`SparqlError`] covers every failure the client can surface: query syntax,
//! transport, HTTP status, payload decoding, and a boolean response that never
//! carried an answer. Nothing in this workspace retries or swallows these; they
//! reach the caller at the narrowest boundary that can report them.
//!
//! [`RetryPolicy`] is advice for callers that want to retry on their own:
//! [`SparqlError::retry_policy`] classifies each failure.

use std::time::Duration;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Retry semantics
// ---------------------------------------------------------------------------

/// Whether an error condition is safe to retry and, if so, after what delay.
///
/// ## Rules
///
/// - `Retryable`: connection failures, timeouts, `5xx` and `429` responses.
/// - `NonRetryable`: malformed queries, malformed payloads, `4xx` responses,
///   invalid configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum RetryPolicy {
    /// The operation may be retried.
    Retryable {
        /// Minimum back-off before the next attempt. `None` means retry
        /// immediately or apply the caller's own back-off schedule.
        after: Option<Duration>,
    },
    /// The operation must not be retried without changing the request.
    NonRetryable,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Every failure produced while classifying, dispatching, or decoding a query.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SparqlError {
    /// The query text was rejected by the SPARQL grammar.
    ///
    /// Produced by: query classification. Never recovered.
    #[error("SPARQL syntax error: {message}")]
    Syntax {
        /// Parser diagnostic, including position information when available.
        message: String,
    },

    /// The request could not be sent or the response body could not be read
    /// (DNS failure, refused connection, timeout, reset mid-body).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The endpoint answered with a non-2xx status.
    ///
    /// Delivered as the first item of the response byte stream, before any
    /// payload bytes.
    #[error("Invalid SPARQL endpoint ({endpoint}) response: {status_text}")]
    Protocol {
        /// Endpoint URL the request was sent to (without query parameters).
        endpoint: String,
        /// Numeric HTTP status code.
        status: u16,
        /// Reason phrase for the status (e.g. `"Internal Server Error"`).
        status_text: String,
    },

    /// The response payload is not a well-formed document of the negotiated
    /// format.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A boolean (ASK) response finished without carrying a `boolean` member.
    #[error("No valid ASK response")]
    MissingAnswer,

    /// The query parsed, but its form has no result pipeline (e.g. an update
    /// submitted through the query path).
    #[error("Unsupported query: {0}")]
    UnsupportedQuery(String),

    /// A configured header, parameter, or client option is invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },
}

impl SparqlError {
    /// Builds a [`SparqlError::Syntax`] from any parser diagnostic.
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::Syntax {
            message: message.into(),
        }
    }

    /// Builds a [`SparqlError::Configuration`] from any description.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Classifies whether the failed operation may be retried unchanged.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            Self::Transport(_) => RetryPolicy::Retryable { after: None },
            Self::Protocol { status, .. } if *status == 429 || *status >= 500 => {
                RetryPolicy::Retryable { after: None }
            }
            _ => RetryPolicy::NonRetryable,
        }
    }
}

impl From<serde_json::Error> for SparqlError {
    fn from(e: serde_json::Error) -> Self {
        SparqlError::Decode(e.to_string())
    }
}

/// Result alias used throughout the protocol crate.
pub type Result<T> = std::result::Result<T, SparqlError>;
