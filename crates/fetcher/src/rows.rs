//! Bindings decoding for SELECT responses.

use std::sync::Arc;

use futures::stream::BoxStream;
use futures::StreamExt;
use protocol::{
    map_row, variable_key, BindingSet, ByteStream, ResultsEvent, ResultsJsonScanner, SparqlError,
    TermFactory,
};

/// One binding set per result row, in response order.
pub type BindingsStream = BoxStream<'static, Result<BindingSet, SparqlError>>;

/// Row events including the variable list announced by the response head.
pub type RowEventStream = BoxStream<'static, Result<RowEvent, SparqlError>>;

/// Item of [`RowEventStream`].
#[derive(Debug, Clone, PartialEq)]
pub enum RowEvent {
    /// Projected variable names from `head.vars`, keyed the same way as the
    /// bindings.
    Variables(Vec<String>),
    /// One result row.
    Bindings(BindingSet),
}

/// Scans a SPARQL results JSON body, yielding raw events as soon as each one
/// is complete.
///
/// Chunk errors are forwarded and end the stream. A body that ends before the
/// document closes ends with [`SparqlError::Decode`].
fn results_events(
    mut body: ByteStream,
) -> BoxStream<'static, Result<ResultsEvent, SparqlError>> {
    let events = async_stream::stream! {
        let mut scanner = ResultsJsonScanner::new();
        let mut rows: usize = 0;

        while let Some(chunk) = body.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };

            match scanner.feed(&chunk) {
                Ok(events) => {
                    for event in events {
                        if matches!(event, ResultsEvent::Row(_)) {
                            rows += 1;
                        }
                        yield Ok(event);
                    }
                }
                Err(e) => {
                    yield Err(e);
                    return;
                }
            }
        }

        if let Err(e) = scanner.finish() {
            yield Err(e);
            return;
        }

        tracing::debug!(rows, "results document finished");
    };

    Box::pin(events)
}

/// Decodes a SELECT body into variable and row events.
pub(crate) fn decode_results(
    body: ByteStream,
    factory: Arc<dyn TermFactory>,
    prefix: bool,
) -> RowEventStream {
    results_events(body)
        .filter_map(move |event| {
            let mapped = match event {
                Ok(ResultsEvent::Variables(vars)) => Some(Ok(RowEvent::Variables(
                    vars.iter().map(|v| variable_key(v, prefix)).collect(),
                ))),
                Ok(ResultsEvent::Row(row)) => {
                    Some(Ok(RowEvent::Bindings(map_row(factory.as_ref(), &row, prefix))))
                }
                Ok(ResultsEvent::Boolean(_)) => None,
                Err(e) => Some(Err(e)),
            };
            futures::future::ready(mapped)
        })
        .boxed()
}

/// Decodes a SELECT body into binding sets only.
pub(crate) fn decode_bindings(
    body: ByteStream,
    factory: Arc<dyn TermFactory>,
    prefix: bool,
) -> BindingsStream {
    decode_results(body, factory, prefix)
        .filter_map(|event| {
            futures::future::ready(match event {
                Ok(RowEvent::Bindings(bindings)) => Some(Ok(bindings)),
                Ok(RowEvent::Variables(_)) => None,
                Err(e) => Some(Err(e)),
            })
        })
        .boxed()
}
