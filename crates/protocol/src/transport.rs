//! HTTP transport port and the uniform byte-stream abstraction.
//!
//! Every HTTP client library exposes response bodies differently (a stream of
//! `Bytes`, an `AsyncRead`, a fully buffered vector). [`ByteStream`] is the one
//! shape the decoders accept; adapters convert into it once, at the transport
//! boundary, and nothing downstream knows which client produced the bytes.
//!
//! ## Architectural Layer
//!
//! **Port definition.** [`HttpTransport`] is implemented by the `transport`
//! crate (reqwest) and by test doubles. This module performs no I/O.

use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use bytes::Bytes;
use futures::io::{AsyncRead, AsyncReadExt};
use futures::stream::{self, BoxStream, Stream, StreamExt};

use crate::errors::SparqlError;
use crate::types::RequestMethod;

/// Read size used when adapting an [`AsyncRead`] into a [`ByteStream`].
pub const READ_CHUNK_SIZE: usize = 8 * 1024;

// ---------------------------------------------------------------------------
// ByteStream
// ---------------------------------------------------------------------------

/// A single-pass, pull-based sequence of body chunks.
///
/// Nothing is read until the consumer polls. Errors are items: a failed read
/// or a rejected response surfaces as an `Err` chunk in stream order, so one
/// error path covers both transport and status failures.
pub struct ByteStream {
    inner: BoxStream<'static, Result<Bytes, SparqlError>>,
}

impl ByteStream {
    /// Wraps a stream that already reports [`SparqlError`]s.
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes, SparqlError>> + Send + 'static,
    {
        Self {
            inner: stream.boxed(),
        }
    }

    /// Wraps a client-native chunk stream; its errors become
    /// [`SparqlError::Transport`].
    pub fn from_fallible<S, E>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes, E>> + Send + 'static,
        E: std::fmt::Display,
    {
        Self::new(stream.map(|chunk| chunk.map_err(|e| SparqlError::Transport(e.to_string()))))
    }

    /// A stream over in-memory chunks, yielded in order.
    pub fn from_chunks<I, B>(chunks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        I::IntoIter: Send + 'static,
        B: Into<Bytes>,
    {
        Self::new(stream::iter(chunks.into_iter().map(|chunk| Ok(chunk.into()))))
    }

    /// Adapts an asynchronous reader, reading at most [`READ_CHUNK_SIZE`]
    /// bytes per chunk. A read error ends the stream after being yielded.
    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        let chunks = stream::unfold(Some(reader), |state| async move {
            let mut reader = state?;
            let mut buf = vec![0u8; READ_CHUNK_SIZE];
            match reader.read(&mut buf).await {
                Ok(0) => None,
                Ok(n) => {
                    buf.truncate(n);
                    Some((Ok(Bytes::from(buf)), Some(reader)))
                }
                Err(e) => Some((Err(SparqlError::Transport(e.to_string())), None)),
            }
        });
        Self::new(chunks)
    }

    /// A stream whose only item is `error`.
    pub fn failed(error: SparqlError) -> Self {
        Self::new(stream::once(async move { Err(error) }))
    }

    /// An empty body.
    pub fn empty() -> Self {
        Self::new(stream::empty())
    }

    /// Pulls the next chunk; `None` marks the end of the body.
    pub async fn next_chunk(&mut self) -> Option<Result<Bytes, SparqlError>> {
        self.inner.next().await
    }
}

impl Stream for ByteStream {
    type Item = Result<Bytes, SparqlError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

impl std::fmt::Debug for ByteStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteStream").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Request / response
// ---------------------------------------------------------------------------

/// A fully described outgoing request. The transport adds nothing but what its
/// own configuration requires (user agent, timeout).
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: RequestMethod,
    /// Absolute URL, query string included.
    pub url: String,
    /// Header name/value pairs in insertion order.
    pub headers: Vec<(String, String)>,
    /// Request body; `None` for GET.
    pub body: Option<Bytes>,
}

impl HttpRequest {
    /// A bodiless GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: RequestMethod::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// A POST request carrying `body` with the given content type.
    pub fn post(url: impl Into<String>, content_type: &str, body: impl Into<Bytes>) -> Self {
        Self {
            method: RequestMethod::Post,
            url: url.into(),
            headers: vec![("Content-Type".to_string(), content_type.to_string())],
            body: Some(body.into()),
        }
    }

    /// Appends a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Returns the first value of header `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Response head plus an unread body.
#[derive(Debug)]
pub struct HttpResponse {
    /// Numeric status code.
    pub status: u16,
    /// Reason phrase for the status.
    pub status_text: String,
    /// Body, not yet read.
    pub body: ByteStream,
}

impl HttpResponse {
    /// Returns `true` for any 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// ---------------------------------------------------------------------------
// Port
// ---------------------------------------------------------------------------

/// Sends one HTTP request and returns as soon as the response head arrives.
///
/// Implementations must not read the body. Connection-level failures are
/// returned as [`SparqlError::Transport`]; non-2xx statuses are *not* errors
/// here, they are returned as ordinary responses for the caller to judge.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Dispatches `request` and resolves with the status and the unread body.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, SparqlError>;
}
