//! Runtime validation of untyped query sequences.
//!
//! Input arrives as JSON values. Each element is classified by [`Shape`]
//! and fed through a two-state automaton that alternates between expecting
//! a clause and expecting an operator:
//!
//! ```text
//!            clause                 operator
//! EXPECT_CLAUSE ───▶ EXPECT_OPERATOR ───▶ EXPECT_CLAUSE ...
//!
//! accept: input exhausted in EXPECT_OPERATOR (a clause was just consumed)
//! ```
//!
//! Elements that are themselves arrays are validated recursively under the
//! same rules. A failure anywhere rejects the whole input.

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::chain::QueryChain;
use crate::clause::{Clause, FieldClause};
use crate::error::{ChainError, Rejection, Result};
use crate::op::Operator;
use crate::value::{describe, FieldValue};

/// Default limit on chain nesting. The root chain counts as level 1.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Resource limits applied while validating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Deepest allowed chain nesting, counting the root chain as 1.
    pub max_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// How an untyped element is interpreted, checked in this order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape<'a> {
    /// An array: a nested chain.
    Chain(&'a [Value]),
    /// A string equal to one of the four operator tokens.
    Operator(Operator),
    /// An object: a field clause.
    Field(&'a Map<String, Value>),
    /// Anything else.
    Other,
}

impl<'a> Shape<'a> {
    /// Classifies a JSON value.
    pub fn of(value: &'a Value) -> Self {
        match value {
            Value::Array(items) => Shape::Chain(items),
            Value::String(s) => Operator::from_token(s).map_or(Shape::Other, Shape::Operator),
            Value::Object(map) => Shape::Field(map),
            _ => Shape::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    ExpectClause,
    ExpectOperator,
}

/// Validates untyped sequences into [`QueryChain`]s.
///
/// # Example
///
/// ```
/// use querychain::{Rejection, Validator};
/// use serde_json::json;
///
/// let validator = Validator::new().max_depth(2);
///
/// let ok = validator.validate(&[json!({"a": 1}), json!("OR"), json!([{"b": 2}])]);
/// assert!(ok.is_ok());
///
/// let err = validator
///     .validate(&[json!([[{"a": 1}]])])
///     .unwrap_err();
/// assert_eq!(err.reason, Rejection::TooDeep { limit: 2 });
/// ```
#[derive(Debug, Clone, Default)]
pub struct Validator {
    limits: Limits,
}

impl Validator {
    /// Creates a validator with default limits.
    pub fn new() -> Self {
        Validator::default()
    }

    /// Creates a validator with the given limits.
    pub fn with_limits(limits: Limits) -> Self {
        Validator { limits }
    }

    /// Sets the deepest allowed nesting.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.limits.max_depth = max_depth;
        self
    }

    /// Returns the limits in effect.
    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Validates a sequence as a chain.
    pub fn validate(&self, items: &[Value]) -> Result<QueryChain> {
        let mut path = Vec::new();
        let result = self.walk(items, &mut path);
        log_outcome(&result);
        result
    }

    /// Builds a chain from either a single field clause object (wrapped as a
    /// length-1 chain) or an array.
    pub fn parse(&self, value: &Value) -> Result<QueryChain> {
        let result = match Shape::of(value) {
            Shape::Chain(items) => return self.validate(items),
            Shape::Field(map) => field_clause(map, &[], 0).map(QueryChain::from),
            Shape::Operator(op) => Err(ChainError::new(
                Rejection::StartsWithOperator(op),
                &[],
                0,
            )),
            Shape::Other => Err(ChainError::new(
                Rejection::MalformedStart {
                    found: describe(value),
                },
                &[],
                0,
            )),
        };
        log_outcome(&result);
        result
    }

    fn walk(&self, items: &[Value], path: &mut Vec<usize>) -> Result<QueryChain> {
        if path.len() >= self.limits.max_depth {
            let (position, parent) = match path.split_last() {
                Some((last, parent)) => (*last, parent),
                None => (0, &[][..]),
            };
            return Err(ChainError::new(
                Rejection::TooDeep {
                    limit: self.limits.max_depth,
                },
                parent,
                position,
            ));
        }

        let Some((head, tail)) = items.split_first() else {
            return Err(ChainError::new(Rejection::Empty, path, 0));
        };

        let first = match self.clause(head, 0, path) {
            Some(clause) => clause?,
            None => {
                let reason = match Shape::of(head) {
                    Shape::Operator(op) => Rejection::StartsWithOperator(op),
                    _ => Rejection::MalformedStart {
                        found: describe(head),
                    },
                };
                return Err(ChainError::new(reason, path, 0));
            }
        };

        let mut rest = Vec::with_capacity(tail.len() / 2);
        let mut state = State::ExpectOperator;
        let mut pending = None;

        for (offset, item) in tail.iter().enumerate() {
            let index = offset + 1;
            match state {
                State::ExpectOperator => match Shape::of(item) {
                    Shape::Operator(op) => {
                        pending = Some(op);
                        state = State::ExpectClause;
                    }
                    _ => {
                        return Err(ChainError::new(
                            Rejection::ExpectedOperator {
                                found: describe(item),
                            },
                            path,
                            index,
                        ));
                    }
                },
                State::ExpectClause => {
                    let clause = match self.clause(item, index, path) {
                        Some(clause) => clause?,
                        None => {
                            return Err(ChainError::new(
                                Rejection::ExpectedClause {
                                    found: describe(item),
                                },
                                path,
                                index,
                            ));
                        }
                    };
                    if let Some(op) = pending.take() {
                        rest.push((op, clause));
                    }
                    state = State::ExpectOperator;
                }
            }
        }

        if let Some(op) = pending {
            return Err(ChainError::new(
                Rejection::EndsWithOperator(op),
                path,
                items.len() - 1,
            ));
        }

        Ok(QueryChain::assemble(first, rest))
    }

    /// Interprets `item` as a clause. Returns `None` when it is not
    /// clause-shaped at all.
    fn clause(
        &self,
        item: &Value,
        index: usize,
        path: &mut Vec<usize>,
    ) -> Option<Result<Clause>> {
        match Shape::of(item) {
            Shape::Chain(nested) => {
                path.push(index);
                let result = self.walk(nested, path);
                path.pop();
                Some(result.map(Clause::Chain))
            }
            Shape::Field(map) => Some(field_clause(map, path, index).map(Clause::Field)),
            Shape::Operator(_) | Shape::Other => None,
        }
    }
}

fn field_clause(map: &Map<String, Value>, path: &[usize], index: usize) -> Result<FieldClause> {
    let mut clause = FieldClause::new();
    for (key, value) in map {
        let Some(value) = FieldValue::from_json(value) else {
            return Err(ChainError::new(
                Rejection::InvalidFieldValue {
                    field: key.clone(),
                    found: describe(value),
                },
                path,
                index,
            ));
        };
        clause.insert(key.as_str(), value);
    }
    Ok(clause)
}

fn log_outcome(result: &Result<QueryChain>) {
    match result {
        Ok(chain) => trace!(
            elements = chain.len(),
            depth = chain.depth(),
            "query chain accepted"
        ),
        Err(err) => debug!(
            path = ?err.path,
            position = err.position,
            reason = %err.reason,
            "query chain rejected"
        ),
    }
}

/// Validates a sequence with the default limits.
///
/// # Example
///
/// ```
/// use querychain::{validate_chain, Rejection};
/// use serde_json::json;
///
/// let chain = validate_chain(&[json!({"a": 1}), json!("AND"), json!({"b": 2})]).unwrap();
/// assert_eq!(chain.len(), 3);
///
/// let err = validate_chain(&[json!({"a": 1}), json!({"b": 2})]).unwrap_err();
/// assert!(matches!(err.reason, Rejection::ExpectedOperator { .. }));
/// assert_eq!(err.position, 1);
/// ```
pub fn validate_chain(items: &[Value]) -> Result<QueryChain> {
    Validator::new().validate(items)
}

/// Builds a chain from a field clause object or an array, with the default
/// limits.
pub fn parse_query(value: &Value) -> Result<QueryChain> {
    Validator::new().parse(value)
}
