//! Compilation of clauses and chains to search-string syntax.
//!
//! Rendering rules:
//!
//! | Input | Output |
//! |-------|--------|
//! | field with scalar | `key:value` (strings quoted, others bare) |
//! | field with list | `key:(v1 OR v2 OR ...)` |
//! | field clause | fields joined with ` AND `, empty clause is `""` |
//! | chain | elements joined with single spaces, wrapped in `( )` |
//!
//! Nested chains are parenthesized independently, so a chain nested N
//! levels deep produces N levels of parentheses. String content is written
//! verbatim: quotes and parentheses inside values or keys are not escaped.

use std::fmt::{self, Write};

use serde_json::Value;
use tracing::trace;

use crate::chain::{Element, QueryChain};
use crate::clause::{Clause, FieldClause};
use crate::error::Result;
use crate::validate::parse_query;
use crate::value::{FieldValue, Scalar};

/// Types that render to a search-string expression.
///
/// Compilation is pure and infallible: the same value always yields the
/// same string.
pub trait Compile {
    /// Writes the expression into `out`.
    fn compile_into(&self, out: &mut String);

    /// Returns the expression as a new string.
    fn compile(&self) -> String {
        let mut out = String::new();
        self.compile_into(&mut out);
        out
    }
}

impl Compile for FieldClause {
    fn compile_into(&self, out: &mut String) {
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                out.push_str(" AND ");
            }
            out.push_str(key);
            out.push(':');
            value.compile_into(out);
        }
    }
}

impl Compile for FieldValue {
    fn compile_into(&self, out: &mut String) {
        match self {
            FieldValue::Scalar(scalar) => scalar.compile_into(out),
            FieldValue::List(values) => {
                out.push('(');
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        out.push_str(" OR ");
                    }
                    value.compile_into(out);
                }
                out.push(')');
            }
        }
    }
}

impl Compile for Scalar {
    fn compile_into(&self, out: &mut String) {
        // Writing to a String cannot fail.
        let _ = write!(out, "{}", self);
    }
}

impl Compile for QueryChain {
    fn compile_into(&self, out: &mut String) {
        out.push('(');
        for (i, element) in self.elements().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            match element {
                Element::Clause(clause) => clause.compile_into(out),
                Element::Operator(op) => out.push_str(op.as_str()),
            }
        }
        out.push(')');
    }
}

impl Compile for Clause {
    fn compile_into(&self, out: &mut String) {
        match self {
            Clause::Field(field) => field.compile_into(out),
            Clause::Chain(chain) => chain.compile_into(out),
        }
    }
}

/// Compiles a field clause, chain, or clause.
///
/// # Example
///
/// ```
/// use querychain::{compile, FieldClause, QueryChain};
///
/// let field = FieldClause::new().with("name", "John");
/// assert_eq!(compile(&field), r#"name:"John""#);
///
/// let chain = QueryChain::single(field)?;
/// assert_eq!(compile(&chain), r#"(name:"John")"#);
/// # Ok::<(), querychain::ChainError>(())
/// ```
pub fn compile<C: Compile + ?Sized>(query: &C) -> String {
    let out = query.compile();
    trace!(length = out.len(), "query compiled");
    out
}

/// Parses untyped input and compiles it.
///
/// Unlike [`compile`], a bare field clause object is compiled as a length-1
/// chain, so it gains an outer pair of parentheses.
pub fn compile_json(value: &Value) -> Result<String> {
    let chain = parse_query(value)?;
    Ok(compile(&chain))
}

impl fmt::Display for FieldClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.compile())
    }
}

impl fmt::Display for QueryChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.compile())
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.compile())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::Operator;

    fn field(key: &str, value: impl Into<FieldValue>) -> FieldClause {
        FieldClause::new().with(key, value)
    }

    fn chain(first: impl Into<Clause>, rest: Vec<(Operator, Clause)>) -> QueryChain {
        QueryChain::from_parts(first, rest).unwrap()
    }

    #[test]
    fn scalar_fields() {
        assert_eq!(field("name", "John").compile(), r#"name:"John""#);
        assert_eq!(field("age", 30).compile(), "age:30");
        assert_eq!(field("active", true).compile(), "active:true");
        assert_eq!(field("status", None::<&str>).compile(), "status:null");
    }

    #[test]
    fn list_fields() {
        assert_eq!(
            field("status", vec!["active", "pending"]).compile(),
            r#"status:("active" OR "pending")"#
        );

        let mixed = FieldValue::List(vec![Scalar::from(1), Scalar::from("two"), Scalar::from(true)]);
        assert_eq!(field("values", mixed).compile(), r#"values:(1 OR "two" OR true)"#);
    }

    #[test]
    fn empty_list_renders_empty_group() {
        assert_eq!(field("tags", Vec::<&str>::new()).compile(), "tags:()");
    }

    #[test]
    fn multiple_fields_are_anded() {
        let clause = FieldClause::new().with("name", "John").with("age", 30);
        assert_eq!(clause.compile(), r#"name:"John" AND age:30"#);
    }

    #[test]
    fn empty_field_clause() {
        assert_eq!(FieldClause::new().compile(), "");
    }

    #[test]
    fn single_chain_is_parenthesized() {
        assert_eq!(
            QueryChain::single(field("name", "John")).unwrap().compile(),
            r#"(name:"John")"#
        );
    }

    #[test]
    fn operators_are_literal() {
        for (op, expected) in [
            (Operator::And, "(a:1 AND b:2)"),
            (Operator::Or, "(a:1 OR b:2)"),
            (Operator::AndNot, "(a:1 AND NOT b:2)"),
            (Operator::OrNot, "(a:1 OR NOT b:2)"),
        ] {
            let q = chain(field("a", 1), vec![(op, field("b", 2).into())]);
            assert_eq!(q.compile(), expected);
        }
    }

    #[test]
    fn nested_chain_gets_own_group() {
        let inner = chain(field("b", 2), vec![(Operator::Or, field("c", 3).into())]);
        let outer = chain(field("a", 1), vec![(Operator::And, inner.into())]);
        assert_eq!(outer.compile(), "(a:1 AND (b:2 OR c:3))");
    }

    #[test]
    fn deep_nesting_adds_levels() {
        let mut q = QueryChain::single(field("a", 1)).unwrap();
        for _ in 0..3 {
            q = QueryChain::single(q).unwrap();
        }
        assert_eq!(q.compile(), "((((a:1))))");
    }

    #[test]
    fn empty_field_clause_inside_chain() {
        let q = chain(FieldClause::new(), vec![(Operator::And, field("a", 1).into())]);
        assert_eq!(q.compile(), "( AND a:1)");
    }

    #[test]
    fn display_matches_compile() {
        let q = chain(field("a", 1), vec![(Operator::OrNot, field("b", "x").into())]);
        assert_eq!(q.to_string(), q.compile());
        assert_eq!(Clause::from(q.clone()).to_string(), q.compile());
        assert_eq!(field("a", 1).to_string(), "a:1");
    }

    #[test]
    fn compile_json_wraps_objects() {
        let value = serde_json::json!({"name": "John"});
        assert_eq!(compile_json(&value).unwrap(), r#"(name:"John")"#);

        let value = serde_json::json!([{"a": 1}, "AND"]);
        assert!(compile_json(&value).is_err());
    }
}
