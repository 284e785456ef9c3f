//! Querychain - nested boolean query chains compiled to search strings.
//!
//! A query is an alternating chain of clauses and operators:
//!
//! ```text
//! clause, operator, clause, operator, ..., clause
//! ```
//!
//! where a clause is either a flat set of field matches or another chain.
//! Chains compile to a single search expression such as
//! `(service:"web" AND (status:("error" OR "warn") OR NOT env:"dev"))`.
//!
//! # Quick Start
//!
//! ```rust
//! use querychain::{compile, parse_query};
//! use serde_json::json;
//!
//! let query = parse_query(&json!([
//!     {"service": "web"},
//!     "AND",
//!     [{"status": ["error", "warn"]}, "OR NOT", {"env": "dev"}]
//! ]))
//! .unwrap();
//!
//! assert_eq!(
//!     compile(&query),
//!     r#"(service:"web" AND (status:("error" OR "warn") OR NOT env:"dev"))"#
//! );
//! ```
//!
//! # Chain Shape
//!
//! A valid chain is non-empty and has odd length. Even positions hold
//! clauses, odd positions hold one of the operators `AND`, `OR`, `AND NOT`,
//! `OR NOT`. Typed chains built with [`QueryChain::single`] and
//! [`QueryChain::from_parts`] satisfy this by construction. Untyped JSON
//! input is checked by [`validate_chain`], which reports the first defect
//! as a [`Rejection`] together with its location.
//!
//! | Rejection | Example input |
//! |-----------|---------------|
//! | `Empty` | `[]` |
//! | `StartsWithOperator` | `["AND", {"a": 1}]` |
//! | `MalformedStart` | `[42]` |
//! | `ExpectedOperator` | `[{"a": 1}, {"b": 2}]` |
//! | `EndsWithOperator` | `[{"a": 1}, "AND"]` |
//! | `ExpectedClause` | `[{"a": 1}, "AND", "OR"]` |
//! | `InvalidFieldValue` | `[{"a": {"b": 1}}]` |
//! | `TooDeep` | nesting beyond [`Limits::max_depth`] |
//!
//! # Rendering
//!
//! A [`FieldClause`] compiled on its own renders bare. The JSON entry points
//! ([`parse_query`], [`compile_json`]) always produce a chain, so a bare
//! object gains the chain's outer parentheses there.
//!
//! | Input | via [`compile`] on a `FieldClause` | via [`compile_json`] |
//! |-------|------------------------------------|----------------------|
//! | `{"name": "John"}` | `name:"John"` | `(name:"John")` |
//! | `{"status": ["active", "pending"]}` | `status:("active" OR "pending")` | `(status:("active" OR "pending"))` |
//! | `{}` | empty string | `()` |
//!
//! | Chain input | Output |
//! |-------------|--------|
//! | `[{"name": "John"}]` | `(name:"John")` |
//! | `[{"a": 1}, "AND", {"b": 2}]` | `(a:1 AND b:2)` |
//! | `[{"a": 1}, "AND", [{"b": 2}, "OR", {"c": 3}]]` | `(a:1 AND (b:2 OR c:3))` |

mod chain;
mod clause;
mod compile;
mod error;
mod op;
mod validate;
mod value;

// Re-export public API
pub use chain::{Element, QueryChain};
pub use clause::{Clause, FieldClause};
pub use compile::{compile, compile_json, Compile};
pub use error::{ChainError, Rejection, Result};
pub use op::{Operator, UnknownOperator};
pub use validate::{parse_query, validate_chain, Limits, Shape, Validator, DEFAULT_MAX_DEPTH};
pub use value::{FieldValue, Number, Scalar};
