//! The query chain model.
//!
//! A [`QueryChain`] is the alternating sequence
//! `clause, operator, clause, ..., clause`. It is stored as a leading clause
//! followed by `(operator, clause)` pairs, so a typed chain always has odd
//! length, starts and ends with a clause, and is never empty.
//!
//! Typed chains are built with [`QueryChain::single`] and
//! [`QueryChain::from_parts`], which refuse nesting deeper than
//! [`DEFAULT_MAX_DEPTH`](crate::DEFAULT_MAX_DEPTH). Untyped input goes through
//! [`validate_chain`](crate::validate_chain) or
//! [`parse_query`](crate::parse_query) instead.

use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::clause::{Clause, FieldClause};
use crate::error::{self, ChainError, Rejection};
use crate::op::Operator;
use crate::validate::Limits;

/// A validated, immutable boolean query.
///
/// # Example
///
/// ```
/// use querychain::{Compile, FieldClause, Operator, QueryChain};
///
/// let inner = QueryChain::from_parts(
///     FieldClause::new().with("b", 2),
///     vec![(Operator::Or, FieldClause::new().with("c", 3).into())],
/// )?;
/// let chain = QueryChain::from_parts(
///     FieldClause::new().with("a", 1),
///     vec![(Operator::And, inner.into())],
/// )?;
///
/// assert_eq!(chain.len(), 3);
/// assert_eq!(chain.depth(), 2);
/// assert_eq!(chain.compile(), "(a:1 AND (b:2 OR c:3))");
/// # Ok::<(), querychain::ChainError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct QueryChain {
    first: Box<Clause>,
    rest: Vec<(Operator, Clause)>,
    depth: usize,
}

impl QueryChain {
    /// Creates a length-1 chain.
    ///
    /// Fails with [`Rejection::TooDeep`] if `clause` is a chain already
    /// nested [`DEFAULT_MAX_DEPTH`](crate::DEFAULT_MAX_DEPTH) levels deep.
    pub fn single(clause: impl Into<Clause>) -> error::Result<Self> {
        QueryChain::from_parts(clause, Vec::new())
    }

    /// Creates a chain from its leading clause and the `(operator, clause)`
    /// pairs that follow it, with the default limits.
    pub fn from_parts(
        first: impl Into<Clause>,
        rest: Vec<(Operator, Clause)>,
    ) -> error::Result<Self> {
        QueryChain::from_parts_with_limits(first, rest, Limits::default())
    }

    /// Creates a chain, rejecting it if the result would nest deeper than
    /// `limits.max_depth`.
    ///
    /// The error points at the first clause whose nesting crosses the limit.
    pub fn from_parts_with_limits(
        first: impl Into<Clause>,
        rest: Vec<(Operator, Clause)>,
        limits: Limits,
    ) -> error::Result<Self> {
        let chain = QueryChain::assemble(first.into(), rest);
        if chain.depth <= limits.max_depth {
            return Ok(chain);
        }

        let position = chain
            .clauses()
            .position(|clause| clause.depth() + 1 > limits.max_depth)
            .map_or(0, |index| index * 2);
        Err(ChainError::new(
            Rejection::TooDeep {
                limit: limits.max_depth,
            },
            &[],
            position,
        ))
    }

    /// Builds a chain without a depth check. Callers bound nesting themselves.
    pub(crate) fn assemble(first: Clause, rest: Vec<(Operator, Clause)>) -> Self {
        let nested = rest
            .iter()
            .map(|(_, clause)| clause.depth())
            .fold(first.depth(), usize::max);
        QueryChain {
            first: Box::new(first),
            rest,
            depth: nested + 1,
        }
    }

    /// The leading clause.
    pub fn first(&self) -> &Clause {
        &self.first
    }

    /// The `(operator, clause)` pairs after the leading clause.
    pub fn rest(&self) -> &[(Operator, Clause)] {
        &self.rest
    }

    /// Number of elements (clauses plus operators). Always odd.
    pub fn len(&self) -> usize {
        1 + 2 * self.rest.len()
    }

    /// Always `false`: an empty chain cannot be constructed.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Number of clauses at this level.
    pub fn clause_count(&self) -> usize {
        1 + self.rest.len()
    }

    /// Clauses at this level, in order.
    pub fn clauses(&self) -> impl Iterator<Item = &Clause> {
        std::iter::once(&*self.first).chain(self.rest.iter().map(|(_, clause)| clause))
    }

    /// Operators at this level, in order.
    pub fn operators(&self) -> impl Iterator<Item = Operator> + '_ {
        self.rest.iter().map(|(op, _)| *op)
    }

    /// Elements in sequence order, alternating clause and operator.
    pub fn elements(&self) -> impl Iterator<Item = Element<'_>> {
        std::iter::once(Element::Clause(&*self.first)).chain(
            self.rest
                .iter()
                .flat_map(|(op, clause)| [Element::Operator(*op), Element::Clause(clause)]),
        )
    }

    /// Nesting depth, counting this chain as 1. Computed at construction.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// One element of a chain, as seen when walking it in order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Element<'a> {
    /// A clause position.
    Clause(&'a Clause),
    /// An operator position.
    Operator(Operator),
}

impl From<FieldClause> for QueryChain {
    fn from(field: FieldClause) -> Self {
        QueryChain::assemble(Clause::Field(field), Vec::new())
    }
}

impl TryFrom<serde_json::Value> for QueryChain {
    type Error = ChainError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        crate::validate::parse_query(&value)
    }
}

impl TryFrom<&serde_json::Value> for QueryChain {
    type Error = ChainError;

    fn try_from(value: &serde_json::Value) -> Result<Self, Self::Error> {
        crate::validate::parse_query(value)
    }
}

/// Serializes to the array form `[clause, "OP", clause, ...]`.
impl Serialize for QueryChain {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for element in self.elements() {
            match element {
                Element::Clause(clause) => seq.serialize_element(clause)?,
                Element::Operator(op) => seq.serialize_element(&op)?,
            }
        }
        seq.end()
    }
}

/// Deserializes through the validator, so malformed chains are rejected
/// with the same reasons as [`validate_chain`](crate::validate_chain).
impl<'de> Deserialize<'de> for QueryChain {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        QueryChain::try_from(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::Compile;

    fn field(key: &str, value: i64) -> FieldClause {
        FieldClause::new().with(key, value)
    }

    #[test]
    fn single_chain_shape() {
        let chain = QueryChain::single(field("a", 1)).unwrap();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.clause_count(), 1);
        assert_eq!(chain.operators().count(), 0);
        assert_eq!(chain.depth(), 1);
        assert!(!chain.is_empty());
    }

    #[test]
    fn elements_alternate() {
        let chain = QueryChain::from_parts(
            field("a", 1),
            vec![
                (Operator::And, field("b", 2).into()),
                (Operator::OrNot, field("c", 3).into()),
            ],
        )
        .unwrap();
        assert_eq!(chain.len(), 5);

        let elements: Vec<_> = chain.elements().collect();
        assert_eq!(elements.len(), 5);
        for (i, element) in elements.iter().enumerate() {
            match element {
                Element::Clause(_) => assert_eq!(i % 2, 0),
                Element::Operator(_) => assert_eq!(i % 2, 1),
            }
        }
        assert_eq!(
            chain.operators().collect::<Vec<_>>(),
            [Operator::And, Operator::OrNot]
        );
    }

    #[test]
    fn nested_typed_chain_compiles() {
        let inner = QueryChain::from_parts(field("b", 2), vec![(Operator::Or, field("c", 3).into())])
            .unwrap();
        let outer = QueryChain::from_parts(field("a", 1), vec![(Operator::And, inner.into())])
            .unwrap();
        assert_eq!(outer.first().as_field(), Some(&field("a", 1)));
        assert_eq!(outer.compile(), "(a:1 AND (b:2 OR c:3))");
    }

    #[test]
    fn depth_counts_nesting() {
        let inner = QueryChain::single(field("b", 2)).unwrap();
        let middle =
            QueryChain::from_parts(field("a", 1), vec![(Operator::Or, inner.into())]).unwrap();
        let outer = QueryChain::single(middle).unwrap();
        assert_eq!(outer.depth(), 3);
    }

    #[test]
    fn constructors_enforce_depth_limit() {
        let limits = Limits { max_depth: 3 };
        let mut chain = QueryChain::single(field("a", 1)).unwrap();
        for _ in 0..2 {
            chain = QueryChain::from_parts_with_limits(chain, Vec::new(), limits).unwrap();
        }
        assert_eq!(chain.depth(), 3);

        let err = QueryChain::from_parts_with_limits(
            field("x", 0),
            vec![(Operator::And, chain.into())],
            limits,
        )
        .unwrap_err();
        assert_eq!(err.reason, Rejection::TooDeep { limit: 3 });
        assert_eq!(err.location(), vec![2]);
    }

    #[test]
    fn default_limit_stops_runaway_nesting() {
        let mut chain = QueryChain::single(field("a", 1)).unwrap();
        let mut failure = None;
        for _ in 0..200_000 {
            match QueryChain::single(chain.clone()) {
                Ok(next) => chain = next,
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }

        let err = failure.expect("nesting should hit the default limit");
        assert_eq!(
            err.reason,
            Rejection::TooDeep {
                limit: crate::DEFAULT_MAX_DEPTH
            }
        );
        assert_eq!(chain.depth(), crate::DEFAULT_MAX_DEPTH);
        assert!(chain.compile().starts_with("(((("));
    }

    #[test]
    fn serializes_to_array_form() {
        let chain = QueryChain::from_parts(
            field("a", 1),
            vec![(
                Operator::AndNot,
                QueryChain::single(field("b", 2)).unwrap().into(),
            )],
        )
        .unwrap();
        let text = serde_json::to_string(&chain).unwrap();
        assert_eq!(text, r#"[{"a":1},"AND NOT",[{"b":2}]]"#);
    }

    #[test]
    fn deserialize_validates() {
        let chain: QueryChain = serde_json::from_str(r#"[{"a":1},"OR",{"b":2}]"#).unwrap();
        assert_eq!(chain.len(), 3);

        let err = serde_json::from_str::<QueryChain>(r#"[{"a":1},"AND"]"#).unwrap_err();
        assert!(err.to_string().contains("cannot end with an operator"));
    }

    #[test]
    fn field_clause_wraps_as_single() {
        let chain = QueryChain::from(field("a", 1));
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.depth(), 1);
        assert_eq!(chain.first().as_field(), Some(&field("a", 1)));
    }
}
