//! Boolean decoding for ASK responses.

use protocol::{ByteStream, ResultsEvent, ResultsJsonScanner, SparqlError};

/// Reads `body` until the top-level `boolean` member appears.
///
/// Resolves as soon as the answer is seen; the rest of the body is not read.
/// A body that ends without the member, whether the document closed or was
/// cut short, resolves to [`SparqlError::MissingAnswer`]. Malformed bytes
/// before that point are [`SparqlError::Decode`].
pub(crate) async fn decode_ask(mut body: ByteStream) -> Result<bool, SparqlError> {
    let mut scanner = ResultsJsonScanner::new();

    while let Some(chunk) = body.next_chunk().await {
        for event in scanner.feed(&chunk?)? {
            if let ResultsEvent::Boolean(answer) = event {
                return Ok(answer);
            }
        }
    }

    tracing::debug!(
        complete = scanner.is_done(),
        "ASK response ended without an answer"
    );
    Err(SparqlError::MissingAnswer)
}
