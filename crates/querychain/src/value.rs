//! Value types for field clauses.
//!
//! A field in a [`FieldClause`](crate::FieldClause) maps to a [`FieldValue`]:
//! either a single [`Scalar`] or a list of scalars. Lists may mix scalar
//! types freely.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Numeric value supporting all common numeric types.
///
/// Numbers are stored in one of three variants to preserve precision:
/// - `I64` for signed integers
/// - `U64` for unsigned integers
/// - `F64` for floating point
///
/// Rendering uses each variant's `Display`, so `30`, `-4` and `1.5` come out
/// as written and an integral float such as `30.0` renders as `30`.
///
/// Deserialization goes through [`Number::from_json`], so the same input
/// yields the same variant whether it arrives via serde or the validator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Number {
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// 64-bit floating point.
    F64(f64),
}

impl Number {
    /// Converts a JSON number, picking the narrowest variant that holds it.
    pub fn from_json(n: &serde_json::Number) -> Option<Self> {
        if let Some(u) = n.as_u64() {
            Some(Number::U64(u))
        } else if let Some(i) = n.as_i64() {
            Some(Number::I64(i))
        } else {
            n.as_f64().map(Number::F64)
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::I64(n) => write!(f, "{}", n),
            Number::U64(n) => write!(f, "{}", n),
            Number::F64(n) => write!(f, "{}", n),
        }
    }
}

impl<'de> Deserialize<'de> for Number {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let n = serde_json::Number::deserialize(deserializer)?;
        Number::from_json(&n)
            .ok_or_else(|| serde::de::Error::custom(format!("unsupported number {}", n)))
    }
}

macro_rules! number_from {
    ($variant:ident as $repr:ty: $($t:ty),*) => {
        $(
            impl From<$t> for Number {
                fn from(n: $t) -> Self {
                    Number::$variant(n as $repr)
                }
            }
        )*
    };
}

number_from!(I64 as i64: i8, i16, i32, i64, isize);
number_from!(U64 as u64: u8, u16, u32, u64, usize);
number_from!(F64 as f64: f32, f64);

/// A single literal a field can be matched against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Null literal.
    Null,
    /// Boolean literal.
    Bool(bool),
    /// Numeric literal.
    Number(Number),
    /// String literal, quoted when rendered.
    String(String),
}

impl Scalar {
    /// Returns `true` if this is the null literal.
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    /// Extracts the string value, if present.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    /// Extracts the number value, if present.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Scalar::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Extracts the boolean value, if present.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Converts a JSON value. Arrays and objects are not scalars.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => Some(Scalar::Null),
            serde_json::Value::Bool(b) => Some(Scalar::Bool(*b)),
            serde_json::Value::Number(n) => Number::from_json(n).map(Scalar::Number),
            serde_json::Value::String(s) => Some(Scalar::String(s.clone())),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
        }
    }
}

/// Strings are wrapped in double quotes with their content verbatim (no
/// escaping). Every other literal is written bare.
impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => f.write_str("null"),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::String(s) => write!(f, "\"{}\"", s),
        }
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::String(s)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string())
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl From<Number> for Scalar {
    fn from(n: Number) -> Self {
        Scalar::Number(n)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(value: Option<T>) -> Self {
        value.map_or(Scalar::Null, Into::into)
    }
}

macro_rules! scalar_from_number {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Scalar {
                fn from(n: $t) -> Self {
                    Scalar::Number(Number::from(n))
                }
            }
        )*
    };
}

scalar_from_number!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, usize, isize);

/// The value bound to one field: a scalar, or a list of scalars that is
/// rendered as an OR group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// A single literal.
    Scalar(Scalar),
    /// Alternatives, any of which may match.
    List(Vec<Scalar>),
}

impl FieldValue {
    /// Returns `true` if this value is a list.
    pub fn is_list(&self) -> bool {
        matches!(self, FieldValue::List(_))
    }

    /// Converts a JSON value, accepting a scalar or an array of scalars.
    ///
    /// Returns `None` for objects and for arrays holding non-scalars.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Array(items) => items
                .iter()
                .map(Scalar::from_json)
                .collect::<Option<Vec<_>>>()
                .map(FieldValue::List),
            other => Scalar::from_json(other).map(FieldValue::Scalar),
        }
    }
}

impl From<Scalar> for FieldValue {
    fn from(value: Scalar) -> Self {
        FieldValue::Scalar(value)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        FieldValue::Scalar(value.into())
    }
}

macro_rules! field_value_from_scalar {
    ($($t:ty),*) => {
        $(
            impl From<$t> for FieldValue {
                fn from(value: $t) -> Self {
                    FieldValue::Scalar(Scalar::from(value))
                }
            }
        )*
    };
}

field_value_from_scalar!(
    String, &str, bool, Number, i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, usize, isize
);

impl<T: Into<Scalar>> From<Vec<T>> for FieldValue {
    fn from(values: Vec<T>) -> Self {
        FieldValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Scalar>, const N: usize> From<[T; N]> for FieldValue {
    fn from(values: [T; N]) -> Self {
        FieldValue::List(values.into_iter().map(Into::into).collect())
    }
}

/// Returns a short description of a JSON value's kind for diagnostics.
pub(crate) fn describe(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "null".to_string(),
        serde_json::Value::Bool(b) => format!("boolean {}", b),
        serde_json::Value::Number(n) => format!("number {}", n),
        serde_json::Value::String(s) => format!("string \"{}\"", s),
        serde_json::Value::Array(items) => format!("array of {} element(s)", items.len()),
        serde_json::Value::Object(_) => "object".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalar_display() {
        assert_eq!(Scalar::from("John").to_string(), "\"John\"");
        assert_eq!(Scalar::from(30).to_string(), "30");
        assert_eq!(Scalar::from(true).to_string(), "true");
        assert_eq!(Scalar::Null.to_string(), "null");
        assert_eq!(Scalar::from(-4i64).to_string(), "-4");
        assert_eq!(Scalar::from(1.5f64).to_string(), "1.5");
    }

    #[test]
    fn integral_float_renders_without_fraction() {
        assert_eq!(Number::F64(30.0).to_string(), "30");
    }

    #[test]
    fn string_content_is_verbatim() {
        assert_eq!(Scalar::from("a \"b\" (c)").to_string(), "\"a \"b\" (c)\"");
    }

    #[test]
    fn scalar_extractors() {
        assert_eq!(Scalar::from("x").as_str(), Some("x"));
        assert_eq!(Scalar::from(3u8).as_number(), Some(Number::U64(3)));
        assert_eq!(Scalar::from(false).as_bool(), Some(false));
        assert!(Scalar::Null.is_null());

        // Wrong type returns None
        assert_eq!(Scalar::from("x").as_number(), None);
        assert_eq!(Scalar::from(1).as_str(), None);
    }

    #[test]
    fn option_converts_to_null() {
        assert_eq!(Scalar::from(None::<&str>), Scalar::Null);
        assert_eq!(Scalar::from(Some(2)), Scalar::Number(Number::I64(2)));
    }

    #[test]
    fn number_from_json_prefers_integers() {
        let n = serde_json::Number::from(30u64);
        assert_eq!(Number::from_json(&n), Some(Number::U64(30)));

        let n = serde_json::Number::from(-3i64);
        assert_eq!(Number::from_json(&n), Some(Number::I64(-3)));

        let n = serde_json::Number::from_f64(2.5).unwrap();
        assert_eq!(Number::from_json(&n), Some(Number::F64(2.5)));
    }

    #[test]
    fn deserialize_matches_from_json() {
        for value in [json!(1), json!(-3), json!(2.5), json!(u64::MAX)] {
            let via_serde: Number = serde_json::from_value(value.clone()).unwrap();
            let n = value.as_number().unwrap();
            assert_eq!(Some(via_serde), Number::from_json(n));
        }
        assert!(serde_json::from_value::<Number>(json!("1")).is_err());
    }

    #[test]
    fn field_value_from_json() {
        assert_eq!(
            FieldValue::from_json(&json!("a")),
            Some(FieldValue::Scalar(Scalar::from("a")))
        );
        assert_eq!(
            FieldValue::from_json(&json!([1, "two", true, null])),
            Some(FieldValue::List(vec![
                Scalar::Number(Number::U64(1)),
                Scalar::from("two"),
                Scalar::Bool(true),
                Scalar::Null,
            ]))
        );
        assert_eq!(FieldValue::from_json(&json!({"a": 1})), None);
        assert_eq!(FieldValue::from_json(&json!([[1]])), None);
    }

    #[test]
    fn field_value_conversions() {
        assert!(!FieldValue::from("x").is_list());
        assert!(FieldValue::from(vec!["a", "b"]).is_list());
        assert_eq!(
            FieldValue::from([1, 2]),
            FieldValue::List(vec![Scalar::from(1), Scalar::from(2)])
        );
    }

    #[test]
    fn describe_kinds() {
        assert_eq!(describe(&json!(null)), "null");
        assert_eq!(describe(&json!("FOO")), "string \"FOO\"");
        assert_eq!(describe(&json!([1, 2])), "array of 2 element(s)");
        assert_eq!(describe(&json!({})), "object");
    }
}
