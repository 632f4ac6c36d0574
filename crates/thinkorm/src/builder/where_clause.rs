//! WHERE rendering.
//!
//! Entries under one connective are joined with its keyword. When more than
//! one connective is populated, each connective's entries are wrapped in
//! parentheses and the groups are joined, in declaration order, with the
//! keyword of the group that follows:
//!
//! ```text
//! AND[a, b] + OR[c]  =>  (a = ? AND b = ?) OR (c = ?)
//! ```

use super::Render;
use crate::condition::{CompareOp, Condition};
use crate::ident::split_fanout;
use crate::options::{Logic, SoftDelete, WhereEntry, WhereTree};
use crate::param::ParamList;
use crate::value::Value;
use std::borrow::Cow;

/// Wrap `tree` so the soft-delete filter is AND-ed after the existing conditions.
pub(crate) fn apply_soft_delete(tree: &WhereTree, soft: &SoftDelete) -> WhereTree {
    let mut out = WhereTree::new();
    if !tree.is_empty() {
        out.push(Logic::And, WhereEntry::Group(tree.clone()));
    }
    out.push(
        Logic::And,
        WhereEntry::Field {
            field: soft.field.clone(),
            conditions: vec![soft.condition.clone()],
        },
    );
    out
}

impl Render<'_> {
    pub(super) fn parse_where(&self, params: &mut ParamList) -> String {
        let tree = match &self.options.soft_delete {
            Some(soft) => Cow::Owned(apply_soft_delete(&self.options.r#where, soft)),
            None => Cow::Borrowed(&self.options.r#where),
        };
        let body = self.build_where(&tree, params);
        if body.is_empty() {
            String::new()
        } else {
            format!(" WHERE {body}")
        }
    }

    pub(super) fn build_where(&self, tree: &WhereTree, params: &mut ParamList) -> String {
        let mut groups: Vec<(Logic, String)> = Vec::new();
        for (logic, entries) in tree.iter() {
            let parts: Vec<String> = entries
                .iter()
                .map(|entry| self.parse_entry(entry, params))
                .filter(|s| !s.is_empty())
                .collect();
            if !parts.is_empty() {
                groups.push((logic, parts.join(&format!(" {} ", logic.as_sql()))));
            }
        }

        if groups.len() == 1 {
            return groups.pop().map(|(_, s)| s).unwrap_or_default();
        }
        let mut out = String::new();
        for (i, (logic, body)) in groups.iter().enumerate() {
            if i > 0 {
                out.push(' ');
                out.push_str(logic.as_sql());
                out.push(' ');
            }
            out.push('(');
            out.push_str(body);
            out.push(')');
        }
        out
    }

    fn parse_entry(&self, entry: &WhereEntry, params: &mut ParamList) -> String {
        match entry {
            WhereEntry::Field { field, conditions } => match split_fanout(field) {
                Some((logic, names)) => {
                    let parts: Vec<String> = names
                        .iter()
                        .map(|name| self.parse_conditions(name, conditions, params))
                        .collect();
                    format!("({})", parts.join(&format!(" {} ", logic.as_sql())))
                }
                None => self.parse_conditions(field, conditions, params),
            },
            WhereEntry::Raw { expr, binds } => {
                params.extend_params(binds.iter().cloned());
                format!("({expr})")
            }
            WhereEntry::Group(tree) => {
                let inner = self.build_where(tree, params);
                if inner.is_empty() {
                    inner
                } else {
                    format!("({inner})")
                }
            }
            WhereEntry::Exists { query, negated } => {
                let sub = self.builder.select_sql(query, params);
                let not = if *negated { "NOT " } else { "" };
                format!("{not}EXISTS ({sub})")
            }
        }
    }

    /// All conditions on one field; several render as a parenthesized
    /// conjunction.
    fn parse_conditions(
        &self,
        field: &str,
        conditions: &[Condition],
        params: &mut ParamList,
    ) -> String {
        let key = self.parse_key(field);
        match conditions {
            [] => String::new(),
            [single] => self.parse_item(&key, single, params),
            many => {
                let parts: Vec<String> = many
                    .iter()
                    .map(|c| self.parse_item(&key, c, params))
                    .collect();
                format!("({})", parts.join(" AND "))
            }
        }
    }

    fn parse_item(&self, key: &str, condition: &Condition, params: &mut ParamList) -> String {
        match condition {
            Condition::Compare {
                op: CompareOp::Eq,
                value: Value::Null,
            } => format!("{key} IS NULL"),
            Condition::Compare {
                op: CompareOp::Neq,
                value: Value::Null,
            } => format!("{key} IS NOT NULL"),
            Condition::Compare { op, value } => {
                params.push(value.clone());
                format!("{key} {} ?", op.as_sql())
            }
            Condition::CompareRaw { op, expr } => format!("{key} {} {expr}", op.as_sql()),
            Condition::Null => format!("{key} IS NULL"),
            Condition::NotNull => format!("{key} IS NOT NULL"),
            Condition::In { values, negated } => {
                if values.is_empty() {
                    return String::from(if *negated { "1=1" } else { "1=0" });
                }
                let marks = vec!["?"; values.len()].join(",");
                for v in values {
                    params.push(v.clone());
                }
                let not = if *negated { "NOT " } else { "" };
                format!("{key} {not}IN ({marks})")
            }
            Condition::Between { from, to, negated } => {
                params.push(from.clone());
                params.push(to.clone());
                let not = if *negated { "NOT " } else { "" };
                format!("{key} {not}BETWEEN ? AND ?")
            }
            Condition::Exp { expr, binds } => {
                params.extend_params(binds.iter().cloned());
                format!("({key} {expr})")
            }
            Condition::InQuery { query, negated } => {
                let sub = self.builder.select_sql(query, params);
                let not = if *negated { "NOT " } else { "" };
                format!("{key} {not}IN ({sub})")
            }
        }
    }
}
