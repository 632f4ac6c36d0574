//! Clause renderer: lowers an [`Options`] document to SQL text.
//!
//! Rendering is pure. Each clause is rendered to a fragment carrying its own
//! leading space, and the fragments are substituted into [`SELECT_SQL`]. An
//! empty clause leaves nothing behind.
//!
//! # Example
//! ```ignore
//! use thinkorm::{Builder, Query, QueryConfig};
//!
//! let mut q = Query::new(QueryConfig::default());
//! q.table("user").r#where("id", 1);
//! let options = q.normalize()?;
//! let stmt = Builder::generic().select(&options);
//! assert_eq!(stmt.sql(), "SELECT * FROM user WHERE id = ?");
//! # Ok::<(), thinkorm::OrmError>(())
//! ```

mod dialect;
mod where_clause;

#[cfg(test)]
mod tests;

pub use dialect::{Dialect, Generic, Mysql};

use crate::config::QueryConfig;
use crate::ident::{has_metachar, parse_sql_table};
use crate::options::{FieldItem, FieldSpec, JoinOn, Options, OrderItem, UnionBody};
use crate::param::ParamList;
use crate::statement::Statement;
use std::sync::Arc;

/// Clause order of a SELECT statement.
pub const SELECT_SQL: &str = "SELECT%DISTINCT% %FIELD% FROM %TABLE%%FORCE%%JOIN%%WHERE%%GROUP%%HAVING%%UNION%%ORDER%%LIMIT%%LOCK%%COMMENT%";

/// Renders [`Options`] documents with a [`Dialect`].
#[derive(Debug, Clone)]
pub struct Builder {
    dialect: Arc<dyn Dialect>,
    prefix: String,
}

impl Builder {
    pub fn new(dialect: Arc<dyn Dialect>) -> Self {
        Self {
            dialect,
            prefix: String::new(),
        }
    }

    /// A builder for the generic dialect.
    pub fn generic() -> Self {
        Self::new(Arc::new(Generic))
    }

    pub fn from_config(config: &QueryConfig) -> Self {
        Self::new(config.dialect.dialect()).with_prefix(config.prefix.clone())
    }

    /// Set the prefix used to expand `__NAME__` placeholders.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Render a SELECT statement.
    pub fn select(&self, options: &Options) -> Statement {
        let mut params = ParamList::new();
        let sql = self.select_sql(options, &mut params);
        Statement::new(sql, params, options.fetch_sql)
    }

    /// Render a SELECT, appending bound values to `params`.
    ///
    /// Fragments are rendered in template order so the params follow the
    /// placeholders of the final text.
    pub(crate) fn select_sql(&self, options: &Options, params: &mut ParamList) -> String {
        let r = Render {
            builder: self,
            options,
        };
        let distinct = r.parse_distinct();
        let field = r.parse_field();
        let table = r.parse_table();
        let force = r.parse_force();
        let join = r.parse_join();
        let r#where = r.parse_where(params);
        let group = r.parse_group();
        let having = r.parse_having();
        let union = r.parse_union(params);
        let order = r.parse_order();
        let limit = r.parse_limit();
        let lock = r.parse_lock();
        let comment = r.parse_comment();

        fill_template(SELECT_SQL, |name| {
            let fragment = match name {
                "DISTINCT" => &distinct,
                "FIELD" => &field,
                "TABLE" => &table,
                "FORCE" => &force,
                "JOIN" => &join,
                "WHERE" => &r#where,
                "GROUP" => &group,
                "HAVING" => &having,
                "UNION" => &union,
                "ORDER" => &order,
                "LIMIT" => &limit,
                "LOCK" => &lock,
                "COMMENT" => &comment,
                _ => return None,
            };
            Some(fragment.as_str())
        })
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::generic()
    }
}

/// Substitute `%NAME%` tokens in one pass; unknown tokens stay literal.
fn fill_template<'a>(template: &str, fragment: impl Fn(&str) -> Option<&'a str>) -> String {
    let mut out = String::with_capacity(template.len() * 2);
    let mut rest = template;
    while let Some(start) = rest.find('%') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('%') {
            Some(end) => match fragment(&after[..end]) {
                Some(text) => {
                    out.push_str(text);
                    rest = &after[end + 1..];
                }
                None => {
                    out.push('%');
                    rest = after;
                }
            },
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Per-statement rendering context.
struct Render<'a> {
    builder: &'a Builder,
    options: &'a Options,
}

impl Render<'_> {
    /// Resolve placeholders, swap a known table for its alias, then quote.
    fn parse_key(&self, key: &str) -> String {
        let key = parse_sql_table(key, &self.builder.prefix);
        let qualified = match key.split_once('.') {
            Some((table, column)) if !has_metachar(&key) => self
                .options
                .alias
                .get(table)
                .map(|alias| format!("{alias}.{column}")),
            _ => None,
        };
        match qualified {
            Some(k) => self.builder.dialect.parse_key(&k),
            None => self.builder.dialect.parse_key(&key),
        }
    }

    fn table_with_alias(&self, table: &str) -> String {
        let resolved = parse_sql_table(table, &self.builder.prefix);
        if resolved.contains(')') || resolved.contains(char::is_whitespace) {
            return resolved.into_owned();
        }
        let mut out = self.builder.dialect.parse_key(&resolved);
        if let Some(alias) = self.options.alias.get(&*resolved) {
            out.push(' ');
            out.push_str(&self.builder.dialect.parse_key(alias));
        }
        out
    }

    fn parse_distinct(&self) -> String {
        if self.options.distinct {
            " DISTINCT".to_string()
        } else {
            String::new()
        }
    }

    fn parse_table(&self) -> String {
        self.options
            .table
            .iter()
            .map(|t| self.table_with_alias(t))
            .collect::<Vec<_>>()
            .join(",")
    }

    fn parse_field(&self) -> String {
        match &self.options.field {
            FieldSpec::All => "*".to_string(),
            FieldSpec::List(items) => items
                .iter()
                .map(|item| match item {
                    FieldItem::Column(c) => self.parse_key(c),
                    FieldItem::Aliased { column, alias } => format!(
                        "{} AS {}",
                        self.parse_key(column),
                        self.builder.dialect.parse_key(alias)
                    ),
                    FieldItem::Raw(e) => e.to_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    fn parse_join(&self) -> String {
        let mut out = String::new();
        for join in &self.options.join {
            out.push(' ');
            out.push_str(join.ty.as_sql());
            out.push_str(" JOIN ");
            out.push_str(&self.table_with_alias(&join.table));

            let on: Vec<String> = join
                .on
                .iter()
                .map(|c| match c {
                    JoinOn::Eq { left, right } => {
                        format!("{}={}", self.parse_key(left), self.parse_key(right))
                    }
                    JoinOn::Text(text) => text.clone(),
                    JoinOn::Raw(e) => e.to_string(),
                })
                .collect();
            if !on.is_empty() {
                out.push_str(" ON ");
                out.push_str(&on.join(" AND "));
            }
        }
        out
    }

    fn parse_group(&self) -> String {
        match &self.options.group {
            Some(group) if !group.trim().is_empty() => {
                let keys: Vec<String> = if group.contains('(') {
                    vec![group.trim().to_string()]
                } else {
                    group.split(',').map(|g| self.parse_key(g.trim())).collect()
                };
                format!(" GROUP BY {}", keys.join(","))
            }
            _ => String::new(),
        }
    }

    fn parse_having(&self) -> String {
        match &self.options.having {
            Some(having) => format!(" HAVING {having}"),
            None => String::new(),
        }
    }

    fn parse_order(&self) -> String {
        if self.options.order.is_empty() {
            return String::new();
        }
        let items: Vec<String> = self
            .options
            .order
            .iter()
            .map(|item| match item {
                OrderItem::Field { field, dir } => match dir {
                    Some(dir) => format!("{} {}", self.parse_key(field), dir.as_sql()),
                    None => self.parse_key(field),
                },
                OrderItem::Raw(e) => e.to_string(),
            })
            .collect();
        format!(" ORDER BY {}", items.join(","))
    }

    fn parse_limit(&self) -> String {
        match &self.options.limit {
            Some(limit) => format!(" {}", self.builder.dialect.parse_limit(limit)),
            None => String::new(),
        }
    }

    fn parse_union(&self, params: &mut ParamList) -> String {
        let mut out = String::new();
        for item in &self.options.union {
            out.push_str(if item.all { " UNION ALL " } else { " UNION " });
            match &item.body {
                UnionBody::Raw(e) => {
                    out.push('(');
                    out.push_str(&parse_sql_table(e.as_str(), &self.builder.prefix));
                    out.push(')');
                }
                UnionBody::Query(sub) => {
                    out.push('(');
                    out.push_str(&self.builder.select_sql(sub, params));
                    out.push(')');
                }
            }
        }
        out
    }

    fn parse_lock(&self) -> String {
        match &self.options.lock {
            Some(lock) if !lock.is_empty() => format!(" {lock}"),
            _ => String::new(),
        }
    }

    fn parse_comment(&self) -> String {
        match &self.options.comment {
            Some(comment) if !comment.is_empty() => {
                format!(" /* {} */", comment.replace("*/", "").trim())
            }
            _ => String::new(),
        }
    }

    fn parse_force(&self) -> String {
        if self.options.force.is_empty() {
            String::new()
        } else {
            format!(" FORCE INDEX ({})", self.options.force.join(","))
        }
    }
}
