//! Clause types for query chains.
//!
//! A [`FieldClause`] is a flat, insertion-ordered set of field matches that
//! are ANDed together. A [`Clause`] is whatever may occupy a clause position
//! in a chain: a field clause or a nested [`QueryChain`].

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::chain::QueryChain;
use crate::value::FieldValue;

/// Flat mapping from field name to value.
///
/// Keys are unique and keep the order in which they were first inserted,
/// which is also the order they are rendered in.
///
/// # Example
///
/// ```
/// use querychain::FieldClause;
///
/// let clause = FieldClause::new()
///     .with("service", "web")
///     .with("status", vec!["error", "warn"]);
///
/// assert_eq!(clause.len(), 2);
/// assert_eq!(clause.keys().collect::<Vec<_>>(), ["service", "status"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldClause {
    fields: Vec<(String, FieldValue)>,
}

impl FieldClause {
    /// Creates an empty clause. It renders as the empty string.
    pub fn new() -> Self {
        FieldClause::default()
    }

    /// Adds a field and returns the clause.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(field, value);
        self
    }

    /// Sets a field's value.
    ///
    /// An existing key keeps its position and its previous value is returned.
    pub fn insert(
        &mut self,
        field: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Option<FieldValue> {
        let field = field.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(key, _)| *key == field) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.fields.push((field, value));
                None
            }
        }
    }

    /// Looks up a field's value.
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(key, _)| key == field)
            .map(|(_, value)| value)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the clause has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over `(field, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Iterates over field names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(key, _)| key.as_str())
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for FieldClause {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut clause = FieldClause::new();
        for (key, value) in iter {
            clause.insert(key, value);
        }
        clause
    }
}

impl Serialize for FieldClause {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FieldClause {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FieldClauseVisitor;

        impl<'de> Visitor<'de> for FieldClauseVisitor {
            type Value = FieldClause;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a map of field names to scalars or lists of scalars")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<FieldClause, A::Error> {
                let mut clause = FieldClause::new();
                while let Some((key, value)) = access.next_entry::<String, FieldValue>()? {
                    clause.insert(key, value);
                }
                Ok(clause)
            }
        }

        deserializer.deserialize_map(FieldClauseVisitor)
    }
}

/// Anything that can stand in a clause position of a chain.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// Flat field matches.
    Field(FieldClause),
    /// Nested group, rendered in its own parentheses.
    Chain(QueryChain),
}

impl Clause {
    /// Returns the field clause, if this is one.
    pub fn as_field(&self) -> Option<&FieldClause> {
        match self {
            Clause::Field(field) => Some(field),
            Clause::Chain(_) => None,
        }
    }

    /// Returns the nested chain, if this is one.
    pub fn as_chain(&self) -> Option<&QueryChain> {
        match self {
            Clause::Field(_) => None,
            Clause::Chain(chain) => Some(chain),
        }
    }

    /// Nesting depth: 0 for a field clause, otherwise the chain's depth.
    pub fn depth(&self) -> usize {
        match self {
            Clause::Field(_) => 0,
            Clause::Chain(chain) => chain.depth(),
        }
    }
}

impl From<FieldClause> for Clause {
    fn from(field: FieldClause) -> Self {
        Clause::Field(field)
    }
}

impl From<QueryChain> for Clause {
    fn from(chain: QueryChain) -> Self {
        Clause::Chain(chain)
    }
}

impl Serialize for Clause {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Clause::Field(field) => field.serialize(serializer),
            Clause::Chain(chain) => chain.serialize(serializer),
        }
    }
}
