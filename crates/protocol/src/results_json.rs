//! Incremental scanner for SPARQL 1.1 Query Results JSON.
//!
//! The scanner is fed body chunks as they arrive and returns the events that
//! became complete in that chunk:
//!
//! - each element of `results.bindings`, as soon as its closing `}` is seen
//! - the `head.vars` array
//! - the top-level `boolean` member
//!
//! Only the value currently being captured is buffered. Everything else
//! (links, unknown members, whitespace) is tokenised and dropped, so memory use
//! is bounded by the largest single row rather than by the document.
//!
//! Structural bytes in JSON are all ASCII and never occur inside a multi-byte
//! UTF-8 sequence, so the scanner works on raw bytes and leaves string
//! decoding to `serde_json` once a captured value is complete.

use serde::de::IgnoredAny;

use crate::bindings::RawRow;
use crate::errors::{Result, SparqlError};

/// A value extracted from the results document.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultsEvent {
    /// The projected variable names from `head.vars`, without any marker.
    Variables(Vec<String>),
    /// One element of `results.bindings`.
    Row(RawRow),
    /// The answer of an ASK query.
    Boolean(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Value,
    ValueOrEnd,
    Key,
    KeyOrEnd,
    Colon,
    CommaOrEnd,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lex {
    Structural,
    Str { escaped: bool, key: bool },
    Scalar,
}

#[derive(Debug)]
enum Frame {
    /// `key` is the member currently being read or last read.
    Object { key: Option<String> },
    Array,
}

#[derive(Debug, Clone, Copy)]
enum Target {
    Variables,
    Row,
    Boolean,
}

#[derive(Debug)]
struct Capture {
    target: Target,
    /// Buffer index of the value's first byte.
    start: usize,
    /// Stack depth at which the value started.
    depth: usize,
}

/// Push-based scanner over one results document.
#[derive(Debug)]
pub struct ResultsJsonScanner {
    buf: Vec<u8>,
    /// Next unprocessed index into `buf`.
    pos: usize,
    /// Bytes dropped from the front of `buf` so far; for error offsets.
    offset: usize,
    /// Start of the string or scalar token being lexed.
    token_start: usize,
    lex: Lex,
    expect: Expect,
    stack: Vec<Frame>,
    capture: Option<Capture>,
}

impl ResultsJsonScanner {
    /// A scanner expecting the start of a document.
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            pos: 0,
            offset: 0,
            token_start: 0,
            lex: Lex::Structural,
            expect: Expect::Value,
            stack: Vec::new(),
            capture: None,
        }
    }

    /// Feeds the next chunk and returns every event completed by it, in
    /// document order.
    ///
    /// After an error the scanner is in an unspecified state and must be
    /// discarded.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<Vec<ResultsEvent>> {
        self.buf.extend_from_slice(bytes);

        let mut events = Vec::new();
        while self.pos < self.buf.len() {
            self.step(&mut events)?;
        }
        self.compact();

        Ok(events)
    }

    /// Checks that the document ended cleanly. Call once the body is exhausted.
    pub fn finish(&self) -> Result<()> {
        if self.expect == Expect::Done && self.lex == Lex::Structural {
            Ok(())
        } else {
            Err(SparqlError::Decode(format!(
                "unexpected end of SPARQL results JSON at offset {}",
                self.offset + self.pos
            )))
        }
    }

    /// Returns `true` once the top-level object has closed.
    pub fn is_done(&self) -> bool {
        self.expect == Expect::Done
    }

    // -----------------------------------------------------------------------
    // Lexing
    // -----------------------------------------------------------------------

    fn step(&mut self, events: &mut Vec<ResultsEvent>) -> Result<()> {
        let i = self.pos;
        let b = self.buf[i];

        match self.lex {
            Lex::Str { escaped: true, key } => {
                if !matches!(b, b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't' | b'u') {
                    return Err(self.unexpected(b, i));
                }
                self.lex = Lex::Str {
                    escaped: false,
                    key,
                };
            }
            Lex::Str {
                escaped: false,
                key,
            } => match b {
                b'\\' => self.lex = Lex::Str { escaped: true, key },
                b'"' => {
                    self.lex = Lex::Structural;
                    if key {
                        let name: String = serde_json::from_slice(&self.buf[self.token_start..=i])?;
                        if let Some(Frame::Object { key }) = self.stack.last_mut() {
                            *key = Some(name);
                        }
                        self.expect = Expect::Colon;
                    } else {
                        self.complete_value(i + 1, events)?;
                    }
                }
                // Control characters must be escaped inside strings.
                0x00..=0x1f => return Err(self.unexpected(b, i)),
                _ => {}
            },
            Lex::Scalar => {
                if is_delimiter(b) {
                    self.lex = Lex::Structural;
                    serde_json::from_slice::<IgnoredAny>(&self.buf[self.token_start..i])?;
                    self.complete_value(i, events)?;
                    // The delimiter itself is structural; reprocess it.
                    return Ok(());
                }
            }
            Lex::Structural => self.structural(b, i, events)?,
        }

        self.pos += 1;
        Ok(())
    }

    fn structural(&mut self, b: u8, i: usize, events: &mut Vec<ResultsEvent>) -> Result<()> {
        if b.is_ascii_whitespace() {
            return Ok(());
        }

        match self.expect {
            Expect::Value | Expect::ValueOrEnd => {
                if self.expect == Expect::ValueOrEnd && b == b']' {
                    self.stack.pop();
                    return self.complete_value(i + 1, events);
                }
                if self.stack.is_empty() && b != b'{' {
                    return Err(SparqlError::Decode(
                        "SPARQL results JSON must be an object".to_string(),
                    ));
                }

                self.begin_value(i);
                match b {
                    b'{' => {
                        self.stack.push(Frame::Object { key: None });
                        self.expect = Expect::KeyOrEnd;
                    }
                    b'[' => {
                        self.stack.push(Frame::Array);
                        self.expect = Expect::ValueOrEnd;
                    }
                    b'"' => {
                        self.token_start = i;
                        self.lex = Lex::Str {
                            escaped: false,
                            key: false,
                        };
                    }
                    b'-' | b'0'..=b'9' | b't' | b'f' | b'n' => {
                        self.token_start = i;
                        self.lex = Lex::Scalar;
                    }
                    _ => return Err(self.unexpected(b, i)),
                }
            }
            Expect::Key | Expect::KeyOrEnd => match b {
                b'}' if self.expect == Expect::KeyOrEnd => {
                    self.stack.pop();
                    self.complete_value(i + 1, events)?;
                }
                b'"' => {
                    self.token_start = i;
                    self.lex = Lex::Str {
                        escaped: false,
                        key: true,
                    };
                }
                _ => return Err(self.unexpected(b, i)),
            },
            Expect::Colon => {
                if b != b':' {
                    return Err(self.unexpected(b, i));
                }
                self.expect = Expect::Value;
            }
            Expect::CommaOrEnd => match (self.stack.last(), b) {
                (Some(Frame::Object { .. }), b',') => self.expect = Expect::Key,
                (Some(Frame::Array), b',') => self.expect = Expect::Value,
                (Some(Frame::Object { .. }), b'}') | (Some(Frame::Array), b']') => {
                    self.stack.pop();
                    self.complete_value(i + 1, events)?;
                }
                _ => return Err(self.unexpected(b, i)),
            },
            Expect::Done => {
                return Err(SparqlError::Decode(format!(
                    "trailing data after SPARQL results JSON at offset {}",
                    self.offset + i
                )));
            }
        }

        Ok(())
    }

    // -----------------------------------------------------------------------
    // Path matching and capture
    // -----------------------------------------------------------------------

    /// Starts capturing if the value about to begin sits at a target path.
    fn begin_value(&mut self, i: usize) {
        if self.capture.is_some() {
            return;
        }

        let target = match self.stack.as_slice() {
            [Frame::Object { key: Some(k) }] if k == "boolean" => Some(Target::Boolean),
            [Frame::Object { key: Some(h) }, Frame::Object { key: Some(v) }]
                if h == "head" && v == "vars" =>
            {
                Some(Target::Variables)
            }
            [Frame::Object { key: Some(r) }, Frame::Object { key: Some(b) }, Frame::Array]
                if r == "results" && b == "bindings" =>
            {
                Some(Target::Row)
            }
            _ => None,
        };

        if let Some(target) = target {
            self.capture = Some(Capture {
                target,
                start: i,
                depth: self.stack.len(),
            });
        }
    }

    /// Records that a value ended just before `end`, emitting it if it was the
    /// one being captured.
    fn complete_value(&mut self, end: usize, events: &mut Vec<ResultsEvent>) -> Result<()> {
        if let Some(capture) = self.capture.take() {
            if capture.depth == self.stack.len() {
                let slice = &self.buf[capture.start..end];
                let event = match capture.target {
                    Target::Row => ResultsEvent::Row(serde_json::from_slice(slice)?),
                    Target::Variables => ResultsEvent::Variables(serde_json::from_slice(slice)?),
                    Target::Boolean => ResultsEvent::Boolean(serde_json::from_slice(slice)?),
                };
                events.push(event);
            } else {
                self.capture = Some(capture);
            }
        }

        self.expect = if self.stack.is_empty() {
            Expect::Done
        } else {
            Expect::CommaOrEnd
        };
        Ok(())
    }

    /// Drops buffered bytes that no pending token or capture still needs.
    fn compact(&mut self) {
        let keep_from = match (&self.capture, self.lex) {
            (Some(capture), _) => capture.start,
            (None, Lex::Str { key: true, .. }) | (None, Lex::Scalar) => self.token_start,
            _ => self.pos,
        };
        if keep_from == 0 {
            return;
        }

        self.buf.drain(..keep_from);
        self.pos -= keep_from;
        self.offset += keep_from;
        self.token_start = self.token_start.saturating_sub(keep_from);
        if let Some(capture) = &mut self.capture {
            capture.start -= keep_from;
        }
    }

    fn unexpected(&self, b: u8, i: usize) -> SparqlError {
        SparqlError::Decode(format!(
            "unexpected {:?} in SPARQL results JSON at offset {}",
            char::from(b),
            self.offset + i
        ))
    }
}

impl Default for ResultsJsonScanner {
    fn default() -> Self {
        Self::new()
    }
}

fn is_delimiter(b: u8) -> bool {
    matches!(b, b',' | b'}' | b']') || b.is_ascii_whitespace()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terms::RawTerm;

    const SELECT_DOC: &str = r#"{
        "head": { "vars": ["s", "label"], "link": ["http://example.org/meta"] },
        "results": {
            "distinct": false,
            "bindings": [
                { "s": { "type": "uri", "value": "http://example.org/a" } },
                {
                    "s": { "type": "uri", "value": "http://example.org/b" },
                    "label": { "type": "literal", "value": "B \"quoted\" \\ {x}", "xml:lang": "en" }
                }
            ]
        }
    }"#;

    fn scan_all<C: AsRef<[u8]>>(chunks: &[C]) -> Result<Vec<ResultsEvent>> {
        let mut scanner = ResultsJsonScanner::new();
        let mut events = Vec::new();
        for chunk in chunks {
            events.extend(scanner.feed(chunk.as_ref())?);
        }
        scanner.finish()?;
        Ok(events)
    }

    fn rows(events: &[ResultsEvent]) -> Vec<&RawRow> {
        events
            .iter()
            .filter_map(|e| match e {
                ResultsEvent::Row(row) => Some(row),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn extracts_variables_and_rows_in_document_order() {
        let events = scan_all(&[SELECT_DOC]).unwrap();

        assert_eq!(events.len(), 3);
        assert_eq!(
            events[0],
            ResultsEvent::Variables(vec!["s".to_string(), "label".to_string()])
        );

        let rows = rows(&events);
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].get("s"),
            Some(&RawTerm::NamedRef {
                iri: "http://example.org/a".to_string()
            })
        );
        assert_eq!(
            rows[1].get("label"),
            Some(&RawTerm::LangLiteral {
                value: "B \"quoted\" \\ {x}".to_string(),
                language: "en".to_string()
            })
        );
    }

    #[test]
    fn byte_at_a_time_feeding_matches_whole_document() {
        let whole = scan_all(&[SELECT_DOC]).unwrap();
        let bytes: Vec<&[u8]> = SELECT_DOC.as_bytes().chunks(1).collect();

        assert_eq!(scan_all(&bytes).unwrap(), whole);
    }

    #[test]
    fn rows_are_emitted_before_the_array_closes() {
        let mut scanner = ResultsJsonScanner::new();

        let first = scanner
            .feed(br#"{"results":{"bindings":[{"x":{"type":"literal","value":"1"}},"#)
            .unwrap();
        assert_eq!(rows(&first).len(), 1);

        let second = scanner
            .feed(br#"{"x":{"type":"literal","value":"2"}}"#)
            .unwrap();
        assert_eq!(rows(&second).len(), 1);

        assert!(scanner.finish().is_err());
        assert!(scanner.feed(b"]}}").unwrap().is_empty());
        assert!(scanner.finish().is_ok());
    }

    #[test]
    fn only_the_pending_row_is_buffered() {
        let mut scanner = ResultsJsonScanner::new();
        scanner
            .feed(br#"{"results":{"bindings":[{"x":{"type":"literal","value":"1"}},{"x":"#)
            .unwrap();

        assert_eq!(scanner.buf, br#"{"x":"#.to_vec());
    }

    #[test]
    fn nested_members_named_like_targets_are_ignored() {
        let doc = br#"{"results":{"bindings":[
            {"boolean":{"type":"literal","value":"true"},
             "results":{"type":"literal","value":"r"}}
        ]}}"#;
        let events = scan_all(&[doc]).unwrap();

        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], ResultsEvent::Row(row) if row.len() == 2));
    }

    #[test]
    fn boolean_member_is_extracted() {
        let events = scan_all(&[br#"{"head":{},"boolean":true}"#]).unwrap();
        assert_eq!(events, vec![ResultsEvent::Boolean(true)]);

        let split = scan_all(&[r#"{"boolean":fa"#, "lse }"]).unwrap();
        assert_eq!(split, vec![ResultsEvent::Boolean(false)]);
    }

    #[test]
    fn document_without_targets_yields_nothing() {
        assert!(scan_all(&[b"{}"]).unwrap().is_empty());
        assert!(scan_all(&[br#"{"head":{"vars":[]},"results":{"bindings":[]}}"#])
            .unwrap()
            .iter()
            .all(|e| matches!(e, ResultsEvent::Variables(v) if v.is_empty())));
    }

    #[test]
    fn escaped_keys_split_across_chunks() {
        let events = scan_all(&[
            r#"{"resu"#,
            r#"lts":{"bindings":[{"a\"b":{"value":"#,
            r#""http://x"}}]}}"#,
        ])
        .unwrap();

        let rows = rows(&events);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].contains_key("a\"b"));
    }

    #[test]
    fn malformed_documents_are_decode_errors() {
        assert!(matches!(
            scan_all(&[b"[1, 2]"]),
            Err(SparqlError::Decode(_))
        ));
        assert!(matches!(
            scan_all(&[br#"{"boolean" true}"#]),
            Err(SparqlError::Decode(_))
        ));
        assert!(matches!(
            scan_all(&[br#"{"boolean": tru }"#]),
            Err(SparqlError::Decode(_))
        ));
        assert!(matches!(
            scan_all(&[br#"{"boolean": "yes"}"#]),
            Err(SparqlError::Decode(_))
        ));
        assert!(matches!(
            scan_all(&[br#"{} {}"#]),
            Err(SparqlError::Decode(_))
        ));
    }

    #[test]
    fn skipped_strings_are_still_validated() {
        assert!(matches!(
            scan_all(&[br#"{"link":"\q","results":{"bindings":[]}}"#]),
            Err(SparqlError::Decode(_))
        ));
        assert!(matches!(
            scan_all(&["{\"link\":\"a\u{1}b\",\"results\":{\"bindings\":[]}}"]),
            Err(SparqlError::Decode(_))
        ));
        assert!(matches!(
            scan_all(&["{\"head\":{\"link\":[\"x\ny\"]},\"boolean\":true}"]),
            Err(SparqlError::Decode(_))
        ));
        assert!(scan_all(&[br#"{"link":"a\/b\u00e9\t","boolean":true}"#]).is_ok());
    }

    #[test]
    fn truncated_document_fails_on_finish() {
        let mut scanner = ResultsJsonScanner::new();
        scanner.feed(br#"{"results":{"bindings":["#).unwrap();
        assert!(matches!(scanner.finish(), Err(SparqlError::Decode(_))));

        assert!(matches!(
            ResultsJsonScanner::new().finish(),
            Err(SparqlError::Decode(_))
        ));
    }
}
