//! Statement accumulator.
//!
//! A [`Query`] collects declarative calls and turns them into an [`Options`]
//! document with [`Query::normalize`]. It knows nothing about SQL syntax; that
//! is the [`Builder`]'s job.
//!
//! # Example
//! ```ignore
//! use thinkorm::{Query, QueryConfig};
//!
//! let mut q = Query::new(QueryConfig::new().with_prefix("think_"));
//! q.table("__USER__ u")
//!     .r#where("u.status", 1)
//!     .where_op("u.age", ">", 18)
//!     .where_op("u.age", "<", 65)
//!     .order("u.id desc")
//!     .page(2, 10);
//!
//! let stmt = q.select()?;
//! assert_eq!(
//!     stmt.sql(),
//!     "SELECT * FROM think_user u WHERE u.status = ? AND (u.age > ? AND u.age < ?) ORDER BY u.id DESC LIMIT 10,10"
//! );
//! # Ok::<(), thinkorm::OrmError>(())
//! ```

mod pk;
mod where_exp;


pub use pk::PkData;

use crate::builder::Builder;
use crate::condition::Condition;
use crate::config::{PrimaryKey, QueryConfig};
use crate::error::{OrmError, OrmResult};
use crate::expression::Expression;
use crate::ident::{parse_name, parse_sql_table, split_alias};
use crate::options::{
    FieldItem, FieldSpec, Join, JoinOn, JoinType, Limit, Logic, Options, OrderItem, Page,
    SoftDelete, SortDir, UnionBody, UnionItem,
};
use crate::param::{Param, ParamList};
use crate::statement::Statement;
use crate::value::{BindType, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Table declaration accepted by [`Query::table`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableSpec {
    /// Comma-joined `table[ alias]` fragments.
    Text(String),
    /// `(table, alias)` pairs.
    Map(Vec<(String, Option<String>)>),
}

impl From<&str> for TableSpec {
    fn from(s: &str) -> Self {
        TableSpec::Text(s.to_string())
    }
}

impl From<String> for TableSpec {
    fn from(s: String) -> Self {
        TableSpec::Text(s)
    }
}

impl From<Vec<(&str, &str)>> for TableSpec {
    fn from(pairs: Vec<(&str, &str)>) -> Self {
        TableSpec::Map(
            pairs
                .into_iter()
                .map(|(t, a)| (t.to_string(), Some(a.to_string())))
                .collect(),
        )
    }
}

impl<const N: usize> From<[(&str, &str); N]> for TableSpec {
    fn from(pairs: [(&str, &str); N]) -> Self {
        TableSpec::from(pairs.to_vec())
    }
}

/// Mutable accumulator for one statement at a time.
#[derive(Debug, Clone)]
pub struct Query {
    config: Arc<QueryConfig>,
    builder: Builder,
    name: String,
    options: Options,
    /// (logic, field) → every condition declared for the field.
    multi: HashMap<(Logic, String), Vec<Condition>>,
    /// Named binds; survive `normalize()` until `clear_bind()`.
    bind: ParamList,
    build_error: Option<String>,
}

impl Query {
    pub fn new(config: QueryConfig) -> Self {
        Self::with_config(Arc::new(config))
    }

    pub fn with_config(config: Arc<QueryConfig>) -> Self {
        Self {
            builder: Builder::from_config(&config),
            config,
            name: String::new(),
            options: Options::default(),
            multi: HashMap::new(),
            bind: ParamList::new(),
            build_error: None,
        }
    }

    /// A fresh query sharing only this query's configuration.
    pub fn child(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            builder: self.builder.clone(),
            name: String::new(),
            options: Options::default(),
            multi: HashMap::new(),
            bind: ParamList::new(),
            build_error: None,
        }
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    pub fn builder(&self) -> &Builder {
        &self.builder
    }

    /// Replace the renderer, e.g. with a custom [`crate::Dialect`].
    pub fn set_builder(&mut self, builder: Builder) -> &mut Self {
        self.builder = builder;
        self
    }

    /// Bind the query to a model name; its table defaults to
    /// `prefix + snake_case(name)`.
    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    /// Override the configured primary key for this query.
    pub fn pk(&mut self, pk: PrimaryKey) -> &mut Self {
        Arc::make_mut(&mut self.config).pk = pk;
        self
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// The table bound through [`Query::name`].
    pub fn get_table(&self) -> String {
        format!("{}{}", self.config.prefix, parse_name(&self.name))
    }

    /// Options accumulated so far.
    pub fn get_options(&self) -> &Options {
        &self.options
    }

    /// Build a raw SQL fragment.
    pub fn raw(sql: impl Into<String>) -> Expression {
        Expression::new(sql)
    }

    pub(crate) fn record_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(target: "thinkorm.sql", error = %message, "invalid statement declaration");
        if self.build_error.is_none() {
            self.build_error = Some(message);
        }
    }

    // ── tables ──────────────────────────────────────────────────────────

    /// Declare the table(s) to select from.
    ///
    /// `"think_user u, think_role r"` declares two aliased tables. A fragment
    /// containing `)` is subquery text and kept whole; a fragment of any other
    /// shape is kept as one unaliased table.
    pub fn table(&mut self, spec: impl Into<TableSpec>) -> &mut Self {
        let mut tables: Vec<String> = Vec::new();
        match spec.into() {
            TableSpec::Text(text) => {
                let text = text.trim();
                if text.contains(')') {
                    tables.push(text.to_string());
                } else {
                    for fragment in text.split(',').map(str::trim).filter(|f| !f.is_empty()) {
                        match split_alias(fragment) {
                            Some((name, alias)) => {
                                self.alias_table(name, alias);
                                tables.push(name.to_string());
                            }
                            None => {
                                if fragment.contains(char::is_whitespace) {
                                    tracing::debug!(
                                        target: "thinkorm.sql",
                                        fragment,
                                        "unrecognized table fragment kept as one table"
                                    );
                                }
                                tables.push(fragment.to_string());
                            }
                        }
                    }
                }
            }
            TableSpec::Map(entries) => {
                for (name, alias) in entries {
                    if let Some(alias) = alias {
                        self.alias_table(&name, &alias);
                    }
                    tables.push(name);
                }
            }
        }

        let mut unique: Vec<String> = Vec::with_capacity(tables.len());
        for t in tables {
            if !unique.contains(&t) {
                unique.push(t);
            }
        }
        self.options.table = unique;
        self
    }

    fn alias_table(&mut self, table: &str, alias: &str) {
        let resolved = parse_sql_table(table, &self.config.prefix).into_owned();
        self.options.alias.insert(resolved, alias.to_string());
    }

    /// Alias the first declared table (or the bound table).
    pub fn alias(&mut self, alias: &str) -> &mut Self {
        let table = match self.options.table.first() {
            Some(t) => t.clone(),
            None => self.get_table(),
        };
        self.alias_table(&table, alias);
        self
    }

    /// Register `(table, alias)` pairs; placeholder names are resolved first.
    pub fn alias_map<'a>(&mut self, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> &mut Self {
        for (table, alias) in pairs {
            self.alias_table(table, alias);
        }
        self
    }

    // ── fields ──────────────────────────────────────────────────────────

    /// Select comma-separated columns; `col AS alias` is recognized.
    ///
    /// Text with quotes, `<` or `(` is taken as a raw field expression.
    pub fn field(&mut self, fields: &str) -> &mut Self {
        let fields = fields.trim();
        if fields == "*" {
            self.options.field = FieldSpec::All;
            return self;
        }
        if fields.contains(['<', '\'', '"', '(']) {
            return self.field_raw(fields);
        }
        for item in fields.split(',').map(str::trim).filter(|f| !f.is_empty()) {
            let tokens: Vec<&str> = item.split_whitespace().collect();
            let entry = match tokens.as_slice() {
                [column, kw, alias] if kw.eq_ignore_ascii_case("as") => FieldItem::Aliased {
                    column: column.to_string(),
                    alias: alias.to_string(),
                },
                _ => FieldItem::Column(item.to_string()),
            };
            self.options.field.push(entry);
        }
        self
    }

    pub fn field_alias(&mut self, column: &str, alias: &str) -> &mut Self {
        self.options.field.push(FieldItem::Aliased {
            column: column.to_string(),
            alias: alias.to_string(),
        });
        self
    }

    pub fn field_raw(&mut self, sql: impl Into<Expression>) -> &mut Self {
        self.options.field.push(FieldItem::Raw(sql.into()));
        self
    }

    pub fn distinct(&mut self, distinct: bool) -> &mut Self {
        self.options.distinct = distinct;
        self
    }

    // ── joins ───────────────────────────────────────────────────────────

    /// `INNER JOIN table ON on`.
    pub fn join(&mut self, table: &str, on: &str) -> &mut Self {
        self.join_on(table, vec![JoinOn::parse(on)], JoinType::Inner)
    }

    pub fn left_join(&mut self, table: &str, on: &str) -> &mut Self {
        self.join_on(table, vec![JoinOn::parse(on)], JoinType::Left)
    }

    pub fn right_join(&mut self, table: &str, on: &str) -> &mut Self {
        self.join_on(table, vec![JoinOn::parse(on)], JoinType::Right)
    }

    pub fn full_join(&mut self, table: &str, on: &str) -> &mut Self {
        self.join_on(table, vec![JoinOn::parse(on)], JoinType::Full)
    }

    /// Join with a raw ON expression.
    pub fn join_raw(&mut self, table: &str, on: impl Into<Expression>, ty: JoinType) -> &mut Self {
        self.join_on(table, vec![JoinOn::Raw(on.into())], ty)
    }

    /// Join with several ON conditions, AND-ed together.
    pub fn join_on(&mut self, table: &str, on: Vec<JoinOn>, ty: JoinType) -> &mut Self {
        let table = table.trim();
        let name = match split_alias(table) {
            Some((name, alias)) if !table.contains(')') => {
                self.alias_table(name, alias);
                name.to_string()
            }
            _ => table.to_string(),
        };
        self.options.join.push(Join {
            table: name,
            ty,
            on,
        });
        self
    }

    // ── clauses ─────────────────────────────────────────────────────────

    pub fn group(&mut self, group: &str) -> &mut Self {
        self.options.group = Some(group.to_string());
        self
    }

    pub fn having(&mut self, having: impl Into<Expression>) -> &mut Self {
        self.options.having = Some(having.into());
        self
    }

    /// Parse `"id desc, name"` into order items.
    pub fn order(&mut self, spec: &str) -> &mut Self {
        for item in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let tokens: Vec<&str> = item.split_whitespace().collect();
            let entry = match tokens.as_slice() {
                [field] => OrderItem::Field {
                    field: field.to_string(),
                    dir: None,
                },
                [field, dir] if SortDir::parse(dir).is_some() => OrderItem::Field {
                    field: field.to_string(),
                    dir: SortDir::parse(dir),
                },
                _ => OrderItem::Raw(Expression::new(item)),
            };
            self.options.order.push(entry);
        }
        self
    }

    pub fn order_by(&mut self, field: &str, dir: SortDir) -> &mut Self {
        self.options.order.push(OrderItem::Field {
            field: field.to_string(),
            dir: Some(dir),
        });
        self
    }

    pub fn order_raw(&mut self, sql: impl Into<Expression>) -> &mut Self {
        self.options.order.push(OrderItem::Raw(sql.into()));
        self
    }

    pub fn limit(&mut self, count: u64) -> &mut Self {
        self.options.limit = Some(Limit::new(count));
        self
    }

    pub fn limit_offset(&mut self, offset: u64, count: u64) -> &mut Self {
        self.options.limit = Some(Limit::with_offset(offset, count));
        self
    }

    /// Request a page; lowered into `LIMIT offset,count` by `normalize()`.
    ///
    /// `page` is clamped to 1. A non-positive `size` falls back to the
    /// current limit, then to the configured default page size.
    pub fn page(&mut self, page: i64, size: i64) -> &mut Self {
        self.options.page = Some(Page { page, size });
        self
    }

    /// `UNION (SELECT ...)` built by `f` on a fresh query.
    pub fn union(&mut self, f: impl FnOnce(&mut Query)) -> &mut Self {
        self.push_union(f, false)
    }

    pub fn union_all(&mut self, f: impl FnOnce(&mut Query)) -> &mut Self {
        self.push_union(f, true)
    }

    pub fn union_raw(&mut self, sql: impl Into<Expression>, all: bool) -> &mut Self {
        self.options.union.push(UnionItem {
            all,
            body: UnionBody::Raw(sql.into()),
        });
        self
    }

    fn push_union(&mut self, f: impl FnOnce(&mut Query), all: bool) -> &mut Self {
        if let Some(sub) = self.subquery(f) {
            self.options.union.push(UnionItem {
                all,
                body: UnionBody::Query(Box::new(sub)),
            });
        }
        self
    }

    /// `FOR UPDATE` when true; clears the lock when false.
    pub fn lock(&mut self, lock: bool) -> &mut Self {
        self.options.lock = lock.then(|| "FOR UPDATE".to_string());
        self
    }

    /// A custom lock clause, e.g. `LOCK IN SHARE MODE`.
    pub fn lock_str(&mut self, lock: &str) -> &mut Self {
        self.options.lock = Some(lock.trim().to_string());
        self
    }

    pub fn comment(&mut self, comment: &str) -> &mut Self {
        self.options.comment = Some(comment.to_string());
        self
    }

    /// `FORCE INDEX (...)` with comma-separated index names.
    pub fn force(&mut self, index: &str) -> &mut Self {
        self.options.force = index
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        self
    }

    /// Mark the next statement as compile-only.
    pub fn fetch_sql(&mut self, fetch: bool) -> &mut Self {
        self.options.fetch_sql = fetch;
        self
    }

    /// AND `field <condition>` onto every rendered WHERE.
    pub fn soft_delete(&mut self, field: &str, condition: Condition) -> &mut Self {
        self.options.soft_delete = Some(SoftDelete {
            field: field.to_string(),
            condition,
        });
        self
    }

    /// Remap WHERE and ORDER field names through `map` during normalization.
    pub fn view<K, V>(&mut self, map: impl IntoIterator<Item = (K, V)>) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let map: BTreeMap<String, String> =
            map.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self.options.view = Some(map);
        self
    }

    // ── binds ───────────────────────────────────────────────────────────

    /// Bind a named value for a `:key` placeholder.
    pub fn bind(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.bind.push_param(Param::named(key, value));
        self
    }

    pub fn bind_typed(&mut self, key: &str, value: impl Into<Value>, ty: BindType) -> &mut Self {
        self.bind.push_param(Param::named(key, value).with_type(ty));
        self
    }

    pub fn bind_map<K, V>(&mut self, binds: impl IntoIterator<Item = (K, V)>) -> &mut Self
    where
        K: AsRef<str>,
        V: Into<Value>,
    {
        for (k, v) in binds {
            self.bind.push_param(Param::named(k.as_ref(), v));
        }
        self
    }

    pub fn get_bind(&self) -> &ParamList {
        &self.bind
    }

    pub fn clear_bind(&mut self) -> &mut Self {
        self.bind.clear();
        self
    }

    // ── normalization & rendering ───────────────────────────────────────

    /// Produce the [`Options`] document and reset the accumulator.
    ///
    /// The ledger is cleared too; named binds are kept. A declaration error
    /// recorded since the last call is returned instead, after the reset.
    pub fn normalize(&mut self) -> OrmResult<Options> {
        let mut options = std::mem::take(&mut self.options);
        self.multi.clear();
        if let Some(err) = self.build_error.take() {
            return Err(OrmError::validation(err));
        }

        if options.table.is_empty() {
            if self.name.is_empty() {
                return Err(OrmError::validation("No table specified"));
            }
            options.table.push(self.get_table());
        }

        if let Some(page) = options.page.take() {
            options.limit = Some(self.lower_page(page, options.limit)?);
        }

        if let Some(view) = &options.view {
            options.r#where.rename_fields(&|field: &str| remap_field(view, field));
            for item in &mut options.order {
                if let OrderItem::Field { field, .. } = item {
                    if let Some(target) = view.get(field.as_str()) {
                        *field = target.clone();
                    }
                }
            }
        }

        Ok(options)
    }

    /// Consuming variant of [`Query::normalize`].
    pub fn into_options(mut self) -> OrmResult<Options> {
        self.normalize()
    }

    fn lower_page(&self, page: Page, limit: Option<Limit>) -> OrmResult<Limit> {
        let number = u64::try_from(page.page.max(1)).unwrap_or(1);
        let size = match u64::try_from(page.size) {
            Ok(size) if size > 0 => size,
            _ => match limit {
                Some(Limit {
                    offset: None,
                    count,
                }) if count > 0 => count,
                _ => self.config.default_page_size,
            },
        };
        let offset = size.checked_mul(number - 1).ok_or_else(|| {
            OrmError::validation(format!("Page {} of size {size} overflows the offset", page.page))
        })?;
        Ok(Limit::with_offset(offset, size))
    }

    /// Render `options`, appending this query's named binds.
    pub fn build(&self, options: &Options) -> Statement {
        let mut params = ParamList::new();
        let sql = self.builder.select_sql(options, &mut params);
        params.extend(&self.bind);
        let stmt = Statement::new(sql, params, options.fetch_sql);
        tracing::debug!(
            target: "thinkorm.sql",
            sql = %stmt.sql(),
            params = stmt.params().len(),
            fetch_sql = stmt.fetch_sql(),
            "statement built"
        );
        stmt
    }

    /// Normalize and render a SELECT.
    pub fn select(&mut self) -> OrmResult<Statement> {
        let options = self.normalize()?;
        Ok(self.build(&options))
    }

    /// Normalize and render a single-row SELECT (`LIMIT 1`).
    pub fn find(&mut self) -> OrmResult<Statement> {
        let mut options = self.normalize()?;
        options.limit = Some(Limit::new(1));
        Ok(self.build(&options))
    }

    /// Like [`Query::find`], with a primary key condition derived from `data`.
    pub fn find_by_pk(&mut self, data: impl Into<PkData>) -> OrmResult<Statement> {
        let mut options = self.normalize()?;
        self.resolve_primary_key_condition(data.into(), &mut options)?;
        options.limit = Some(Limit::new(1));
        Ok(self.build(&options))
    }

    /// Run `f` on a fresh query and normalize it as a subquery.
    ///
    /// Errors are recorded on this query; named binds move to this query.
    fn subquery(&mut self, f: impl FnOnce(&mut Query)) -> Option<Options> {
        let mut child = self.child();
        f(&mut child);
        self.bind.extend(&child.bind);
        match child.normalize() {
            Ok(options) => Some(options),
            Err(err) => {
                self.record_error(format!("subquery: {}", err.into_message()));
                None
            }
        }
    }
}

fn remap_field(view: &BTreeMap<String, String>, field: &str) -> Option<String> {
    let sep = if field.contains('|') {
        '|'
    } else if field.contains('&') {
        '&'
    } else {
        return view.get(field).cloned();
    };
    let mut changed = false;
    let parts: Vec<String> = field
        .split(sep)
        .map(|part| match view.get(part.trim()) {
            Some(target) => {
                changed = true;
                target.clone()
            }
            None => part.to_string(),
        })
        .collect();
    changed.then(|| parts.join(&sep.to_string()))
}
