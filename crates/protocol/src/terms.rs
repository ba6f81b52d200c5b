//! Raw term descriptors and the term factory port.
//!
//! A SPARQL results document describes each bound value as a small JSON object
//! (`{"type": "literal", "value": "hello", "xml:lang": "en"}`). [`RawTerm`]
//! decodes that object once, at the JSON boundary, into a closed set of
//! variants so nothing downstream inspects untyped fields again.
//!
//! Turning a [`RawTerm`] into an RDF [`Term`] is delegated to a
//! [`TermFactory`]. [`OxrdfTermFactory`] is the default implementation.

use oxrdf::{BlankNode, Literal, NamedNode, Term};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Raw descriptors
// ---------------------------------------------------------------------------

/// One bound value as described by the endpoint, already resolved to its kind.
///
/// Resolution rules applied while decoding:
///
/// - `"type": "bnode"` → [`RawTerm::BlankNode`]
/// - `"type": "literal"` with `xml:lang` → [`RawTerm::LangLiteral`], even when a
///   `datatype` is also present
/// - `"type": "literal"` with `datatype` → [`RawTerm::TypedLiteral`]
/// - `"type": "literal"` with neither → [`RawTerm::PlainLiteral`]
/// - any other or absent type → [`RawTerm::NamedRef`]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawDescriptor")]
pub enum RawTerm {
    /// An IRI reference.
    NamedRef {
        /// The IRI.
        iri: String,
    },
    /// A blank node, identified by its endpoint-assigned label.
    BlankNode {
        /// Label without the `_:` prefix.
        label: String,
    },
    /// A literal with neither language nor datatype.
    PlainLiteral {
        /// Lexical form.
        value: String,
    },
    /// A language-tagged literal.
    LangLiteral {
        /// Lexical form.
        value: String,
        /// BCP-47 language tag as sent by the endpoint.
        language: String,
    },
    /// A literal with an explicit datatype IRI.
    TypedLiteral {
        /// Lexical form.
        value: String,
        /// Datatype IRI.
        datatype: String,
    },
}

/// Wire shape of a term descriptor; only used to build a [`RawTerm`].
#[derive(Deserialize)]
struct RawDescriptor {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    value: String,
    #[serde(rename = "xml:lang", default)]
    language: Option<String>,
    #[serde(default)]
    datatype: Option<String>,
}

impl From<RawDescriptor> for RawTerm {
    fn from(raw: RawDescriptor) -> Self {
        match raw.kind.as_deref() {
            Some("bnode") => RawTerm::BlankNode { label: raw.value },
            Some("literal") => match (raw.language, raw.datatype) {
                (Some(language), _) => RawTerm::LangLiteral {
                    value: raw.value,
                    language,
                },
                (None, Some(datatype)) => RawTerm::TypedLiteral {
                    value: raw.value,
                    datatype,
                },
                (None, None) => RawTerm::PlainLiteral { value: raw.value },
            },
            _ => RawTerm::NamedRef { iri: raw.value },
        }
    }
}

impl RawTerm {
    /// Builds the RDF term this descriptor denotes.
    pub fn to_term(&self, factory: &dyn TermFactory) -> Term {
        match self {
            RawTerm::NamedRef { iri } => factory.named_node(iri),
            RawTerm::BlankNode { label } => factory.blank_node(label),
            RawTerm::PlainLiteral { value } => factory.literal(value),
            RawTerm::LangLiteral { value, language } => factory.language_literal(value, language),
            RawTerm::TypedLiteral { value, datatype } => factory.typed_literal(value, datatype),
        }
    }
}

// ---------------------------------------------------------------------------
// Term factory port
// ---------------------------------------------------------------------------

/// Constructs RDF terms from already-classified raw fields.
///
/// Implementations must be safe to share across concurrent decodes; the
/// fetcher holds a single instance behind an `Arc`.
pub trait TermFactory: Send + Sync {
    /// An IRI reference.
    fn named_node(&self, iri: &str) -> Term;

    /// A blank node with the given label.
    fn blank_node(&self, label: &str) -> Term;

    /// A simple literal (`xsd:string`).
    fn literal(&self, value: &str) -> Term;

    /// A language-tagged literal.
    fn language_literal(&self, value: &str, language: &str) -> Term;

    /// A literal with an explicit datatype.
    fn typed_literal(&self, value: &str, datatype: &str) -> Term;
}

/// [`TermFactory`] producing [`oxrdf`] terms.
///
/// Values are taken as the endpoint sent them. IRIs, labels, and language tags
/// are not re-validated; language tags are only lowercased into oxrdf's
/// canonical form: a well-formed results document already guarantees
/// them, and a malformed one is the endpoint's fault, not this decoder's.
#[derive(Debug, Clone, Copy, Default)]
pub struct OxrdfTermFactory;

impl TermFactory for OxrdfTermFactory {
    fn named_node(&self, iri: &str) -> Term {
        NamedNode::new_unchecked(iri).into()
    }

    fn blank_node(&self, label: &str) -> Term {
        BlankNode::new_unchecked(label).into()
    }

    fn literal(&self, value: &str) -> Term {
        Literal::new_simple_literal(value).into()
    }

    fn language_literal(&self, value: &str, language: &str) -> Term {
        Literal::new_language_tagged_literal_unchecked(value, language.to_ascii_lowercase()).into()
    }

    fn typed_literal(&self, value: &str, datatype: &str) -> Term {
        Literal::new_typed_literal(value, NamedNode::new_unchecked(datatype)).into()
    }
}
