//! Query condition types.
//!
//! Operator strings such as `">="`, `"not like"` or `"exp"` are resolved once,
//! when a condition is declared, into the closed [`Operator`] enum. The
//! renderer only ever sees typed [`Condition`] values.

use crate::error::{OrmError, OrmResult};
use crate::expression::Expression;
use crate::options::Options;
use crate::param::Param;
use crate::value::{Value, with_scalar_types};
use serde::Serialize;
use std::str::FromStr;

/// Binary comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CompareOp {
    Eq,
    Neq,
    Gt,
    Egt,
    Lt,
    Elt,
    Like,
    NotLike,
}

impl CompareOp {
    pub fn as_sql(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Neq => "<>",
            CompareOp::Gt => ">",
            CompareOp::Egt => ">=",
            CompareOp::Lt => "<",
            CompareOp::Elt => "<=",
            CompareOp::Like => "LIKE",
            CompareOp::NotLike => "NOT LIKE",
        }
    }
}

/// Every operator accepted by `where_op`.
///
/// # Example
/// ```ignore
/// use thinkorm::Operator;
///
/// assert_eq!("NOT IN".parse::<Operator>()?, Operator::NotIn);
/// assert_eq!(">=".parse::<Operator>()?, "egt".parse::<Operator>()?);
/// # Ok::<(), thinkorm::OrmError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Operator {
    Compare(CompareOp),
    In,
    NotIn,
    Between,
    NotBetween,
    Null,
    NotNull,
    Exp,
}

impl Operator {
    /// Resolve an operator string, ignoring case and surrounding whitespace.
    pub fn parse(op: &str) -> Option<Self> {
        let normalized = op.trim().to_ascii_lowercase();
        let normalized = normalized.split_whitespace().collect::<Vec<_>>().join(" ");
        let resolved = match normalized.as_str() {
            "=" | "eq" => Operator::Compare(CompareOp::Eq),
            "<>" | "!=" | "neq" => Operator::Compare(CompareOp::Neq),
            ">" | "gt" => Operator::Compare(CompareOp::Gt),
            ">=" | "egt" => Operator::Compare(CompareOp::Egt),
            "<" | "lt" => Operator::Compare(CompareOp::Lt),
            "<=" | "elt" => Operator::Compare(CompareOp::Elt),
            "like" => Operator::Compare(CompareOp::Like),
            "not like" | "notlike" => Operator::Compare(CompareOp::NotLike),
            "in" => Operator::In,
            "not in" | "notin" => Operator::NotIn,
            "between" => Operator::Between,
            "not between" | "notbetween" => Operator::NotBetween,
            "null" | "is null" => Operator::Null,
            "notnull" | "not null" | "is not null" => Operator::NotNull,
            "exp" => Operator::Exp,
            _ => return None,
        };
        Some(resolved)
    }

    pub fn is_null_test(self) -> bool {
        matches!(self, Operator::Null | Operator::NotNull)
    }
}

impl FromStr for Operator {
    type Err = OrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::parse(s).ok_or_else(|| OrmError::validation(format!("Unknown operator '{s}'")))
    }
}

/// The right-hand side of a declared condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Value(Value),
    List(Vec<Value>),
    Raw(Expression),
    /// An operator travelling with its values, e.g. `("between", [18, 30])`.
    Tuple(String, Vec<Value>),
}

impl Operand {
    pub fn tuple<T: Into<Value>>(op: impl Into<String>, values: impl IntoIterator<Item = T>) -> Self {
        Operand::Tuple(op.into(), values.into_iter().map(Into::into).collect())
    }
}

impl From<Value> for Operand {
    fn from(v: Value) -> Self {
        Operand::Value(v)
    }
}

impl From<Expression> for Operand {
    fn from(e: Expression) -> Self {
        Operand::Raw(e)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Operand {
    fn from(v: Vec<T>) -> Self {
        Operand::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Operand {
    fn from(v: [T; N]) -> Self {
        Operand::List(v.into_iter().map(Into::into).collect())
    }
}

macro_rules! impl_operand_from_scalar {
    ($($t:ty),*) => {
        $(impl From<$t> for Operand {
            fn from(v: $t) -> Self {
                Operand::Value(v.into())
            }
        })*
    };
}

with_scalar_types!(impl_operand_from_scalar);

impl<T: Into<Value>> From<Option<T>> for Operand {
    fn from(v: Option<T>) -> Self {
        Operand::Value(v.into())
    }
}

/// A typed condition applied to one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Condition {
    /// `field <op> ?`
    Compare { op: CompareOp, value: Value },
    /// `field <op> <raw sql>`
    CompareRaw { op: CompareOp, expr: Expression },
    /// `field IS NULL`
    Null,
    /// `field IS NOT NULL`
    NotNull,
    /// `field [NOT] IN (?, ...)`
    In { values: Vec<Value>, negated: bool },
    /// `field [NOT] BETWEEN ? AND ?`
    Between {
        from: Value,
        to: Value,
        negated: bool,
    },
    /// `(field <raw sql>)` with the fragment's own binds
    Exp { expr: Expression, binds: Vec<Param> },
    /// `field [NOT] IN (SELECT ...)`
    InQuery { query: Box<Options>, negated: bool },
}

impl Condition {
    pub fn eq(value: impl Into<Value>) -> Self {
        Condition::Compare {
            op: CompareOp::Eq,
            value: value.into(),
        }
    }

    pub fn compare(op: CompareOp, value: impl Into<Value>) -> Self {
        Condition::Compare {
            op,
            value: value.into(),
        }
    }

    pub fn in_list<T: Into<Value>>(values: impl IntoIterator<Item = T>) -> Self {
        Condition::In {
            values: values.into_iter().map(Into::into).collect(),
            negated: false,
        }
    }

    pub fn not_in<T: Into<Value>>(values: impl IntoIterator<Item = T>) -> Self {
        Condition::In {
            values: values.into_iter().map(Into::into).collect(),
            negated: true,
        }
    }

    pub fn between(from: impl Into<Value>, to: impl Into<Value>) -> Self {
        Condition::Between {
            from: from.into(),
            to: to.into(),
            negated: false,
        }
    }

    pub fn exp(expr: impl Into<Expression>) -> Self {
        Condition::Exp {
            expr: expr.into(),
            binds: Vec::new(),
        }
    }

    /// Build a condition from a resolved operator and its operand.
    ///
    /// Comma-separated text feeds `IN` and `BETWEEN`; `exp` turns text into a
    /// raw fragment.
    pub fn from_operand(op: Operator, operand: Operand) -> OrmResult<Self> {
        match (op, operand) {
            (_, Operand::Tuple(inner, _)) => Err(OrmError::validation(format!(
                "Operator tuple '{inner}' cannot follow another operator"
            ))),
            (Operator::Null, _) => Ok(Condition::Null),
            (Operator::NotNull, _) => Ok(Condition::NotNull),

            (Operator::Compare(op), Operand::Value(value)) => Ok(Condition::Compare { op, value }),
            (Operator::Compare(op), Operand::Raw(expr)) => Ok(Condition::CompareRaw { op, expr }),
            (Operator::Compare(op), Operand::List(_)) => Err(OrmError::validation(format!(
                "Operator '{}' expects a single value",
                op.as_sql()
            ))),

            (Operator::In | Operator::NotIn, operand) => {
                let negated = op == Operator::NotIn;
                match operand {
                    Operand::Value(v) => Ok(Condition::In {
                        values: v.split_list(),
                        negated,
                    }),
                    Operand::List(values) | Operand::Tuple(_, values) => {
                        Ok(Condition::In { values, negated })
                    }
                    Operand::Raw(expr) => {
                        let kw = if negated { "NOT IN" } else { "IN" };
                        Ok(Condition::exp(format!("{kw} ({expr})")))
                    }
                }
            }

            (Operator::Between | Operator::NotBetween, operand) => {
                let negated = op == Operator::NotBetween;
                let values = match operand {
                    Operand::Value(v) => v.split_list(),
                    Operand::List(values) | Operand::Tuple(_, values) => values,
                    Operand::Raw(expr) => {
                        let kw = if negated { "NOT BETWEEN" } else { "BETWEEN" };
                        return Ok(Condition::exp(format!("{kw} {expr}")));
                    }
                };
                match <[Value; 2]>::try_from(values) {
                    Ok([from, to]) => Ok(Condition::Between { from, to, negated }),
                    Err(values) => Err(OrmError::validation(format!(
                        "BETWEEN expects 2 values, got {}",
                        values.len()
                    ))),
                }
            }

            (Operator::Exp, Operand::Raw(expr)) => Ok(Condition::exp(expr)),
            (Operator::Exp, Operand::Value(Value::Text(sql))) => Ok(Condition::exp(sql)),
            (Operator::Exp, _) => Err(OrmError::validation(
                "Operator 'exp' expects raw SQL text",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_parse_is_case_insensitive() {
        assert_eq!(Operator::parse("LIKE"), Some(Operator::Compare(CompareOp::Like)));
        assert_eq!(Operator::parse(" Not   Like "), Some(Operator::Compare(CompareOp::NotLike)));
        assert_eq!(Operator::parse("NOTNULL"), Some(Operator::NotNull));
        assert_eq!(Operator::parse("not null"), Some(Operator::NotNull));
        assert_eq!(Operator::parse("Null"), Some(Operator::Null));
        assert_eq!(Operator::parse("!="), Some(Operator::Compare(CompareOp::Neq)));
        assert_eq!(Operator::parse("~~"), None);
    }

    #[test]
    fn unknown_operator_is_a_validation_error() {
        let err = "~~".parse::<Operator>().unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn in_accepts_comma_separated_text() {
        let cond = Condition::from_operand(Operator::In, Operand::from("1,2")).unwrap();
        assert_eq!(
            cond,
            Condition::In {
                values: vec![Value::from("1"), Value::from("2")],
                negated: false
            }
        );
    }

    #[test]
    fn between_requires_two_values() {
        let ok = Condition::from_operand(Operator::Between, Operand::from([1, 10])).unwrap();
        assert_eq!(ok, Condition::between(1, 10));

        let err = Condition::from_operand(Operator::Between, Operand::from([1])).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn compare_rejects_lists() {
        let op = Operator::Compare(CompareOp::Gt);
        assert!(Condition::from_operand(op, Operand::from(vec![1, 2])).is_err());
    }

    #[test]
    fn exp_wraps_text() {
        let cond = Condition::from_operand(Operator::Exp, Operand::from("> score")).unwrap();
        assert_eq!(cond, Condition::exp("> score"));
    }
}
