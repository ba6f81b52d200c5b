//! Binding sets and the row mapper.
//!
//! A [`BindingSet`] is one solution of a SELECT query: the variables bound in
//! that row and the term each is bound to. Unbound variables are absent, so two
//! rows of the same result may carry different key sets.

use std::collections::{BTreeMap, HashMap};

use oxrdf::Term;

use crate::terms::{RawTerm, TermFactory};

/// Marker prepended to variable names in binding keys.
pub const VARIABLE_MARKER: char = '?';

/// One decoded row before term construction: variable name → descriptor.
pub type RawRow = HashMap<String, RawTerm>;

/// One solution row: variable key → bound term.
///
/// Keys are unique and iterate in sorted order. Whether they carry the
/// [`VARIABLE_MARKER`] depends on how the row was mapped; see [`map_row`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingSet(BTreeMap<String, Term>);

impl BindingSet {
    /// Returns the term bound to `key`, if any.
    pub fn get(&self, key: &str) -> Option<&Term> {
        self.0.get(key)
    }

    /// Returns `true` if `key` is bound in this row.
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Iterates over the bound keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterates over `(key, term)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Term)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of bound variables.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no variable is bound.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the set, returning the underlying map.
    pub fn into_inner(self) -> BTreeMap<String, Term> {
        self.0
    }
}

impl IntoIterator for BindingSet {
    type Item = (String, Term);
    type IntoIter = std::collections::btree_map::IntoIter<String, Term>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Builds the binding key for `name`, prepending [`VARIABLE_MARKER`] when
/// `prefix` is set.
pub fn variable_key(name: &str, prefix: bool) -> String {
    if prefix {
        let mut key = String::with_capacity(name.len() + 1);
        key.push(VARIABLE_MARKER);
        key.push_str(name);
        key
    } else {
        name.to_string()
    }
}

/// Maps one raw row to a [`BindingSet`], one key per input entry.
pub fn map_row(factory: &dyn TermFactory, row: &RawRow, prefix: bool) -> BindingSet {
    BindingSet(
        row.iter()
            .map(|(name, raw)| (variable_key(name, prefix), raw.to_term(factory)))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terms::OxrdfTermFactory;
    use oxrdf::NamedNode;

    fn row(json: &str) -> RawRow {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn keys_are_prefixed_with_the_marker() {
        let bindings = map_row(
            &OxrdfTermFactory,
            &row(r#"{
                "s": {"type": "uri", "value": "http://example.org/s"},
                "o": {"type": "literal", "value": "x"}
            }"#),
            true,
        );

        assert_eq!(bindings.keys().collect::<Vec<_>>(), vec!["?o", "?s"]);
        assert_eq!(
            bindings.get("?s"),
            Some(&Term::from(NamedNode::new_unchecked("http://example.org/s")))
        );
    }

    #[test]
    fn unprefixed_keys_keep_the_raw_name() {
        let bindings = map_row(
            &OxrdfTermFactory,
            &row(r#"{"name": {"type": "literal", "value": "Alice"}}"#),
            false,
        );

        assert!(bindings.contains("name"));
        assert!(!bindings.contains("?name"));
    }

    #[test]
    fn language_tagged_row_value() {
        let bindings = map_row(
            &OxrdfTermFactory,
            &row(r#"{"s": {"type": "literal", "value": "hello", "xml:lang": "en"}}"#),
            true,
        );

        match bindings.get("?s") {
            Some(Term::Literal(literal)) => {
                assert_eq!(literal.value(), "hello");
                assert_eq!(literal.language(), Some("en"));
            }
            other => panic!("expected language-tagged literal, got {other:?}"),
        }
    }

    #[test]
    fn empty_row_maps_to_empty_set() {
        let bindings = map_row(&OxrdfTermFactory, &RawRow::new(), true);
        assert!(bindings.is_empty());
        assert_eq!(bindings.len(), 0);
    }
}
