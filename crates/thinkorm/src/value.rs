//! Bound values and their bind types.
//!
//! A [`Value`] is what ends up on the parameter list of a rendered statement.
//! Every value carries an inferred [`BindType`] so a driver can pick the right
//! parameter type without inspecting the SQL text.

use serde::Serialize;

/// A value bound to a statement placeholder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

/// Driver-level parameter type of a bound value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BindType {
    Null,
    Bool,
    Int,
    Str,
}

impl Value {
    /// Infer the bind type. Floats travel as strings to keep their precision.
    pub fn bind_type(&self) -> BindType {
        match self {
            Value::Null => BindType::Null,
            Value::Bool(_) => BindType::Bool,
            Value::Int(_) => BindType::Int,
            Value::Float(_) | Value::Text(_) => BindType::Str,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Split a comma-separated text value into trimmed text values.
    ///
    /// Non-text values are returned as a single-element list.
    pub(crate) fn split_list(&self) -> Vec<Value> {
        match self {
            Value::Text(s) if s.contains(',') => s
                .split(',')
                .map(|part| Value::Text(part.trim().to_string()))
                .collect(),
            other => vec![other.clone()],
        }
    }

    /// Render the value as an inline SQL literal.
    pub fn to_literal(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => String::from(if *b { "1" } else { "0" }),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Text(s) => {
                let mut out = String::with_capacity(s.len() + 2);
                out.push('\'');
                for ch in s.chars() {
                    if ch == '\'' {
                        out.push('\'');
                    }
                    out.push(ch);
                }
                out.push('\'');
                out
            }
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            other => f.write_str(&other.to_literal()),
        }
    }
}

/// Invoke `$mac!` with every scalar type that converts into a [`Value`].
///
/// Conversion impls for the other value-carrying types ([`crate::Operand`],
/// [`crate::Param`], [`crate::PkData`]) are generated from this one list so
/// they never drift apart.
macro_rules! with_scalar_types {
    ($mac:ident) => {
        $mac!(bool, i8, i16, i32, i64, u8, u16, u32, u64, usize, f32, f64, String, &str, &String);
    };
}
pub(crate) use with_scalar_types;

macro_rules! impl_int_from {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Int(i64::from(v))
            }
        })*
    };
}

macro_rules! impl_wide_int_from {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                // beyond i64 the decimal text keeps the exact value
                match i64::try_from(v) {
                    Ok(n) => Value::Int(n),
                    Err(_) => Value::Text(v.to_string()),
                }
            }
        })*
    };
}

impl_int_from!(i8, i16, i32, i64, u8, u16, u32);
impl_wide_int_from!(u64, usize);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_type_is_inferred() {
        assert_eq!(Value::from(1).bind_type(), BindType::Int);
        assert_eq!(Value::from("a").bind_type(), BindType::Str);
        assert_eq!(Value::from(1.5).bind_type(), BindType::Str);
        assert_eq!(Value::from(true).bind_type(), BindType::Bool);
        assert_eq!(Value::from(None::<i32>).bind_type(), BindType::Null);
    }

    #[test]
    fn text_literal_doubles_quotes() {
        assert_eq!(Value::from("it's").to_literal(), "'it''s'");
        assert_eq!(Value::Null.to_literal(), "NULL");
        assert_eq!(Value::from(false).to_literal(), "0");
    }

    #[test]
    fn split_list_trims_parts() {
        assert_eq!(
            Value::from("1, 2,3").split_list(),
            vec![Value::from("1"), Value::from("2"), Value::from("3")]
        );
        assert_eq!(Value::from(7).split_list(), vec![Value::Int(7)]);
    }

    #[test]
    fn wide_unsigned_keeps_exact_value() {
        assert_eq!(Value::from(42_u64), Value::Int(42));
        assert_eq!(Value::from(i64::MAX as u64), Value::Int(i64::MAX));
        assert_eq!(Value::from(u64::MAX), Value::from("18446744073709551615"));
        assert_eq!(Value::from(u64::MAX).to_literal(), "'18446744073709551615'");
    }
}
