//! The WHERE declaration grammar.
//!
//! Every `where*` call ends up in [`Query::parse_where_exp`], which classifies
//! the call into a raw fragment or a typed [`Condition`] on a field, and then
//! records it in the per-field ledger.

use super::Query;
use crate::condition::{CompareOp, Condition, Operand, Operator};
use crate::error::OrmError;
use crate::expression::Expression;
use crate::ident::has_metachar;
use crate::options::{Logic, WhereEntry};
use crate::param::Param;
use crate::statement::count_positional;
use crate::value::Value;

impl Query {
    // ── AND ─────────────────────────────────────────────────────────────

    /// `field = value`; a list value becomes `field IN (...)`.
    ///
    /// A field containing SQL metacharacters is taken as raw SQL and `value`
    /// supplies its positional binds.
    pub fn r#where(&mut self, field: &str, value: impl Into<Operand>) -> &mut Self {
        self.parse_where_exp(Logic::And, field, None, Some(value.into()), Vec::new())
    }

    /// `field <op> value`, where `op` is any operator [`Operator::parse`]
    /// accepts (`=`, `<>`, `>=`, `like`, `in`, `between`, `null`, `exp`, ...).
    pub fn where_op(&mut self, field: &str, op: &str, value: impl Into<Operand>) -> &mut Self {
        self.parse_where_exp(Logic::And, field, Some(op), Some(value.into()), Vec::new())
    }

    /// A bare field: raw SQL if it contains metacharacters, otherwise
    /// `field IS NULL`.
    pub fn where_field(&mut self, field: &str) -> &mut Self {
        self.parse_where_exp(Logic::And, field, None, None, Vec::new())
    }

    /// Bulk import: one equality (or IN) condition per entry.
    pub fn where_map<K, V>(&mut self, map: impl IntoIterator<Item = (K, V)>) -> &mut Self
    where
        K: AsRef<str>,
        V: Into<Operand>,
    {
        self.push_map(Logic::And, map)
    }

    /// A parenthesized group built by `f` on a fresh query.
    pub fn where_group(&mut self, f: impl FnOnce(&mut Query)) -> &mut Self {
        self.push_group(Logic::And, f)
    }

    /// Raw boolean SQL; `binds` fill its `?` placeholders in order.
    pub fn where_raw<P: Into<Param>>(
        &mut self,
        sql: impl Into<Expression>,
        binds: impl IntoIterator<Item = P>,
    ) -> &mut Self {
        let binds = binds.into_iter().map(Into::into).collect();
        self.push_raw(Logic::And, sql.into(), binds)
    }

    /// `(field <raw sql>)`.
    pub fn where_exp(&mut self, field: &str, sql: impl Into<Expression>) -> &mut Self {
        self.where_exp_bind(field, sql, Vec::<Param>::new())
    }

    /// `(field <raw sql>)` with binds for the fragment's placeholders.
    pub fn where_exp_bind<P: Into<Param>>(
        &mut self,
        field: &str,
        sql: impl Into<Expression>,
        binds: impl IntoIterator<Item = P>,
    ) -> &mut Self {
        let binds = binds.into_iter().map(Into::into).collect();
        self.parse_where_exp(
            Logic::And,
            field,
            Some("exp"),
            Some(Operand::Raw(sql.into())),
            binds,
        )
    }

    pub fn where_null(&mut self, field: &str) -> &mut Self {
        self.push_condition(Logic::And, field, Condition::Null)
    }

    pub fn where_not_null(&mut self, field: &str) -> &mut Self {
        self.push_condition(Logic::And, field, Condition::NotNull)
    }

    pub fn where_in<T: Into<Value>>(
        &mut self,
        field: &str,
        values: impl IntoIterator<Item = T>,
    ) -> &mut Self {
        self.push_condition(Logic::And, field, Condition::in_list(values))
    }

    pub fn where_not_in<T: Into<Value>>(
        &mut self,
        field: &str,
        values: impl IntoIterator<Item = T>,
    ) -> &mut Self {
        self.push_condition(Logic::And, field, Condition::not_in(values))
    }

    pub fn where_between(
        &mut self,
        field: &str,
        from: impl Into<Value>,
        to: impl Into<Value>,
    ) -> &mut Self {
        self.push_condition(Logic::And, field, Condition::between(from, to))
    }

    pub fn where_not_between(
        &mut self,
        field: &str,
        from: impl Into<Value>,
        to: impl Into<Value>,
    ) -> &mut Self {
        let condition = Condition::Between {
            from: from.into(),
            to: to.into(),
            negated: true,
        };
        self.push_condition(Logic::And, field, condition)
    }

    pub fn where_like(&mut self, field: &str, pattern: impl Into<Value>) -> &mut Self {
        let condition = Condition::compare(CompareOp::Like, pattern);
        self.push_condition(Logic::And, field, condition)
    }

    pub fn where_not_like(&mut self, field: &str, pattern: impl Into<Value>) -> &mut Self {
        let condition = Condition::compare(CompareOp::NotLike, pattern);
        self.push_condition(Logic::And, field, condition)
    }

    /// `EXISTS (SELECT ...)` built by `f` on a fresh query.
    pub fn where_exists(&mut self, f: impl FnOnce(&mut Query)) -> &mut Self {
        self.push_exists(Logic::And, f, false)
    }

    pub fn where_not_exists(&mut self, f: impl FnOnce(&mut Query)) -> &mut Self {
        self.push_exists(Logic::And, f, true)
    }

    /// `field IN (SELECT ...)` built by `f` on a fresh query.
    pub fn where_in_query(&mut self, field: &str, f: impl FnOnce(&mut Query)) -> &mut Self {
        self.push_in_query(Logic::And, field, f, false)
    }

    pub fn where_not_in_query(&mut self, field: &str, f: impl FnOnce(&mut Query)) -> &mut Self {
        self.push_in_query(Logic::And, field, f, true)
    }

    // ── OR ──────────────────────────────────────────────────────────────

    pub fn where_or(&mut self, field: &str, value: impl Into<Operand>) -> &mut Self {
        self.parse_where_exp(Logic::Or, field, None, Some(value.into()), Vec::new())
    }

    pub fn where_or_op(&mut self, field: &str, op: &str, value: impl Into<Operand>) -> &mut Self {
        self.parse_where_exp(Logic::Or, field, Some(op), Some(value.into()), Vec::new())
    }

    pub fn where_or_field(&mut self, field: &str) -> &mut Self {
        self.parse_where_exp(Logic::Or, field, None, None, Vec::new())
    }

    pub fn where_or_map<K, V>(&mut self, map: impl IntoIterator<Item = (K, V)>) -> &mut Self
    where
        K: AsRef<str>,
        V: Into<Operand>,
    {
        self.push_map(Logic::Or, map)
    }

    pub fn where_or_group(&mut self, f: impl FnOnce(&mut Query)) -> &mut Self {
        self.push_group(Logic::Or, f)
    }

    pub fn where_or_raw<P: Into<Param>>(
        &mut self,
        sql: impl Into<Expression>,
        binds: impl IntoIterator<Item = P>,
    ) -> &mut Self {
        let binds = binds.into_iter().map(Into::into).collect();
        self.push_raw(Logic::Or, sql.into(), binds)
    }

    pub fn where_or_exists(&mut self, f: impl FnOnce(&mut Query)) -> &mut Self {
        self.push_exists(Logic::Or, f, false)
    }

    // ── XOR ─────────────────────────────────────────────────────────────

    pub fn where_xor(&mut self, field: &str, value: impl Into<Operand>) -> &mut Self {
        self.parse_where_exp(Logic::Xor, field, None, Some(value.into()), Vec::new())
    }

    pub fn where_xor_op(&mut self, field: &str, op: &str, value: impl Into<Operand>) -> &mut Self {
        self.parse_where_exp(Logic::Xor, field, Some(op), Some(value.into()), Vec::new())
    }

    pub fn where_xor_group(&mut self, f: impl FnOnce(&mut Query)) -> &mut Self {
        self.push_group(Logic::Xor, f)
    }

    pub fn where_xor_raw<P: Into<Param>>(
        &mut self,
        sql: impl Into<Expression>,
        binds: impl IntoIterator<Item = P>,
    ) -> &mut Self {
        let binds = binds.into_iter().map(Into::into).collect();
        self.push_raw(Logic::Xor, sql.into(), binds)
    }

    // ── grammar ─────────────────────────────────────────────────────────

    /// Classify one declaration and record it under `logic`.
    ///
    /// `extra` carries binds for an `exp` fragment.
    pub(crate) fn parse_where_exp(
        &mut self,
        logic: Logic,
        field: &str,
        op: Option<&str>,
        operand: Option<Operand>,
        extra: Vec<Param>,
    ) -> &mut Self {
        let field = field.trim();
        if field.is_empty() {
            self.record_error("Empty field name in where condition");
            return self;
        }

        if has_metachar(field) {
            let mut binds: Vec<Param> = match operand {
                None => Vec::new(),
                Some(Operand::Value(v)) => vec![Param::positional(v)],
                Some(Operand::List(values) | Operand::Tuple(_, values)) => {
                    values.into_iter().map(Param::positional).collect()
                }
                Some(Operand::Raw(_)) => {
                    self.record_error(format!("Raw field '{field}' cannot take a raw operand"));
                    return self;
                }
            };
            binds.extend(extra);
            return self.push_raw(logic, Expression::new(field), binds);
        }

        // `("between", [a, b])` carries its own operator
        let (op, operand) = match (op, operand) {
            (None, Some(Operand::Tuple(op, mut values))) => {
                let operand = if values.len() == 1 {
                    Operand::Value(values.remove(0))
                } else {
                    Operand::List(values)
                };
                (Some(op), Some(operand))
            }
            (op, operand) => (op.map(str::to_string), operand),
        };

        let condition = match (op.as_deref(), operand) {
            (None, None) => Ok(Condition::Null),
            (None, Some(Operand::Value(value))) => Ok(Condition::eq(value)),
            (None, Some(Operand::List(values) | Operand::Tuple(_, values))) => Ok(Condition::In {
                values,
                negated: false,
            }),
            (None, Some(Operand::Raw(expr))) => Ok(Condition::CompareRaw {
                op: CompareOp::Eq,
                expr,
            }),
            (Some(op), operand) => match Operator::parse(op) {
                None => Err(format!("Unknown operator '{op}' on field '{field}'")),
                Some(resolved) if resolved.is_null_test() => {
                    Condition::from_operand(resolved, Operand::Value(Value::Null))
                        .map_err(OrmError::into_message)
                }
                Some(resolved) => match operand {
                    Some(operand) => Condition::from_operand(resolved, operand)
                        .map_err(|e| format!("{} (field '{field}')", e.into_message())),
                    None => Err(format!("Operator '{op}' on field '{field}' needs a value")),
                },
            },
        };

        match condition {
            Ok(Condition::Exp { expr, .. }) => {
                if !self.check_placeholders(&expr, &extra) {
                    return self;
                }
                self.push_condition(logic, field, Condition::Exp { expr, binds: extra })
            }
            Ok(condition) => self.push_condition(logic, field, condition),
            Err(message) => {
                self.record_error(message);
                self
            }
        }
    }

    /// Append `condition` to the `(logic, field)` ledger and store the whole
    /// ledger for the field.
    pub(crate) fn push_condition(
        &mut self,
        logic: Logic,
        field: &str,
        condition: Condition,
    ) -> &mut Self {
        let field = field.trim();
        let ledger = self.multi.entry((logic, field.to_string())).or_default();
        ledger.push(condition);
        let conditions = ledger.clone();
        self.options.r#where.upsert_field(logic, field, conditions);
        self
    }

    fn push_raw(&mut self, logic: Logic, expr: Expression, binds: Vec<Param>) -> &mut Self {
        if !self.check_placeholders(&expr, &binds) {
            return self;
        }
        self.options
            .r#where
            .push(logic, WhereEntry::Raw { expr, binds });
        self
    }

    fn push_map<K, V>(&mut self, logic: Logic, map: impl IntoIterator<Item = (K, V)>) -> &mut Self
    where
        K: AsRef<str>,
        V: Into<Operand>,
    {
        for (field, value) in map {
            self.parse_where_exp(logic, field.as_ref(), None, Some(value.into()), Vec::new());
        }
        self
    }

    fn push_group(&mut self, logic: Logic, f: impl FnOnce(&mut Query)) -> &mut Self {
        let mut child = self.child();
        f(&mut child);
        if let Some(err) = child.build_error.take() {
            self.record_error(err);
        }
        self.bind.extend(&child.bind);
        let tree = std::mem::take(&mut child.options.r#where);
        if !tree.is_empty() {
            self.options.r#where.push(logic, WhereEntry::Group(tree));
        }
        self
    }

    fn push_exists(&mut self, logic: Logic, f: impl FnOnce(&mut Query), negated: bool) -> &mut Self {
        if let Some(sub) = self.subquery(f) {
            self.options.r#where.push(
                logic,
                WhereEntry::Exists {
                    query: Box::new(sub),
                    negated,
                },
            );
        }
        self
    }

    fn push_in_query(
        &mut self,
        logic: Logic,
        field: &str,
        f: impl FnOnce(&mut Query),
        negated: bool,
    ) -> &mut Self {
        match self.subquery(f) {
            Some(sub) => {
                let condition = Condition::InQuery {
                    query: Box::new(sub),
                    negated,
                };
                self.push_condition(logic, field, condition)
            }
            None => self,
        }
    }

    /// Positional binds must match the fragment's `?` placeholders.
    fn check_placeholders(&mut self, expr: &Expression, binds: &[Param]) -> bool {
        let marks = count_positional(expr.as_str());
        let given = binds.iter().filter(|p| !p.is_named()).count();
        if marks != given {
            self.record_error(format!(
                "Raw fragment '{expr}' has {marks} placeholder(s) but {given} bind(s)"
            ));
            return false;
        }
        true
    }
}
