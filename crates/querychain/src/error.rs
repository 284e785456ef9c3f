//! Error types for the querychain crate.

use std::fmt;

use thiserror::Error;

use crate::op::Operator;

/// Why a sequence is not a valid query chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// The sequence has no elements.
    #[error("query cannot be empty, expected [query] or [query, operator, query, ...]")]
    Empty,

    /// The first element is an operator token.
    #[error("query cannot start with an operator ('{0}'), it must start with a query")]
    StartsWithOperator(Operator),

    /// The first element is neither a clause nor an operator.
    #[error("query must start with a field clause or nested chain, found {found}")]
    MalformedStart { found: String },

    /// A clause is followed by something other than an operator token.
    #[error("expected an operator ('AND' | 'OR' | 'AND NOT' | 'OR NOT') after a query, found {found}")]
    ExpectedOperator { found: String },

    /// The last element is an operator.
    #[error("query cannot end with an operator ('{0}'), expected a query after it")]
    EndsWithOperator(Operator),

    /// An operator is followed by something other than a clause.
    #[error("expected a field clause or nested chain after an operator, found {found}")]
    ExpectedClause { found: String },

    /// A field clause binds a field to something other than a scalar or a
    /// list of scalars.
    #[error("field '{field}' must be a scalar or a list of scalars, found {found}")]
    InvalidFieldValue { field: String, found: String },

    /// Nested chains go deeper than the configured limit.
    #[error("query nesting exceeds the limit of {limit} levels")]
    TooDeep { limit: usize },
}

/// A rejection together with where it was found.
///
/// `path` holds the indices of the nested chains leading from the root to
/// the sequence that holds the defect; `position` is the index of the
/// offending element inside that sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainError {
    /// What is wrong.
    pub reason: Rejection,
    /// Indices of enclosing nested chains, outermost first.
    pub path: Vec<usize>,
    /// Index inside the innermost sequence.
    pub position: usize,
}

impl ChainError {
    pub(crate) fn new(reason: Rejection, path: &[usize], position: usize) -> Self {
        ChainError {
            reason,
            path: path.to_vec(),
            position,
        }
    }

    /// Full location as indices from the root, ending with `position`.
    pub fn location(&self) -> Vec<usize> {
        let mut location = self.path.clone();
        location.push(self.position);
        location
    }
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at $", self.reason)?;
        for index in self.location() {
            write!(f, "[{}]", index)?;
        }
        Ok(())
    }
}

impl std::error::Error for ChainError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.reason)
    }
}

/// Result type for querychain operations.
pub type Result<T> = std::result::Result<T, ChainError>;
