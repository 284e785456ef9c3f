//! Boolean operators joining clauses in a chain.
//!
//! The [`Operator`] enum is closed: exactly four tokens are recognized, and
//! matching is case-sensitive.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Operator placed between two adjacent clauses of a
/// [`QueryChain`](crate::QueryChain).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    /// Both sides must match.
    #[serde(rename = "AND")]
    And,
    /// Either side may match.
    #[serde(rename = "OR")]
    Or,
    /// Left side matches and right side does not.
    #[serde(rename = "AND NOT")]
    AndNot,
    /// Left side matches or right side does not.
    #[serde(rename = "OR NOT")]
    OrNot,
}

impl Operator {
    /// Every operator, in token order.
    pub const ALL: [Operator; 4] = [
        Operator::And,
        Operator::Or,
        Operator::AndNot,
        Operator::OrNot,
    ];

    /// Returns the literal token written into the compiled query.
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::And => "AND",
            Operator::Or => "OR",
            Operator::AndNot => "AND NOT",
            Operator::OrNot => "OR NOT",
        }
    }

    /// Returns `true` for the `NOT` forms.
    pub fn is_negated(self) -> bool {
        matches!(self, Operator::AndNot | Operator::OrNot)
    }

    /// Recognizes an operator token. Returns `None` for anything else,
    /// including differently-cased spellings.
    pub fn from_token(token: &str) -> Option<Operator> {
        Operator::ALL.into_iter().find(|op| op.as_str() == token)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a string that is not an operator token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown operator '{0}', expected one of 'AND', 'OR', 'AND NOT', 'OR NOT'")]
pub struct UnknownOperator(pub String);

impl FromStr for Operator {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::from_token(s).ok_or_else(|| UnknownOperator(s.to_string()))
    }
}
