//! The normalized statement document handed to the renderer.
//!
//! [`Options`] is produced by [`crate::Query::normalize`] and consumed by
//! [`crate::Builder`]. It is plain data: it can be inspected, cloned, serialized
//! and rendered any number of times.

use crate::condition::Condition;
use crate::expression::Expression;
use crate::param::Param;
use serde::Serialize;
use std::collections::BTreeMap;

/// Top-level WHERE connective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Logic {
    And,
    Or,
    Xor,
}

impl Logic {
    pub fn as_sql(self) -> &'static str {
        match self {
            Logic::And => "AND",
            Logic::Or => "OR",
            Logic::Xor => "XOR",
        }
    }
}

/// One entry under a connective of the WHERE tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum WhereEntry {
    /// Conditions on one field; more than one means the field was declared
    /// repeatedly and all of them apply.
    Field {
        field: String,
        conditions: Vec<Condition>,
    },
    /// Raw boolean SQL and the values its placeholders bind.
    Raw { expr: Expression, binds: Vec<Param> },
    /// A nested, parenthesized group.
    Group(WhereTree),
    /// `[NOT] EXISTS (SELECT ...)`
    Exists { query: Box<Options>, negated: bool },
}

/// WHERE conditions keyed by connective, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct WhereTree {
    groups: Vec<(Logic, Vec<WhereEntry>)>,
}

impl WhereTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|(_, entries)| entries.is_empty())
    }

    /// Entries declared under `logic`.
    pub fn get(&self, logic: Logic) -> &[WhereEntry] {
        self.groups
            .iter()
            .find(|(l, _)| *l == logic)
            .map(|(_, entries)| entries.as_slice())
            .unwrap_or(&[])
    }

    /// Connectives with their entries, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Logic, &[WhereEntry])> {
        self.groups.iter().map(|(l, e)| (*l, e.as_slice()))
    }

    fn entries_mut(&mut self, logic: Logic) -> &mut Vec<WhereEntry> {
        let idx = match self.groups.iter().position(|(l, _)| *l == logic) {
            Some(idx) => idx,
            None => {
                self.groups.push((logic, Vec::new()));
                self.groups.len() - 1
            }
        };
        &mut self.groups[idx].1
    }

    /// Append an entry under `logic`.
    pub fn push(&mut self, logic: Logic, entry: WhereEntry) {
        self.entries_mut(logic).push(entry);
    }

    /// Set the conditions of `field` under `logic`.
    ///
    /// An existing entry for the field is replaced in place, so the field keeps
    /// the position of its first declaration.
    pub fn upsert_field(&mut self, logic: Logic, field: &str, conditions: Vec<Condition>) {
        let entries = self.entries_mut(logic);
        let existing = entries
            .iter_mut()
            .find(|e| matches!(e, WhereEntry::Field { field: f, .. } if f == field));
        match existing {
            Some(WhereEntry::Field { conditions: c, .. }) => *c = conditions,
            _ => entries.push(WhereEntry::Field {
                field: field.to_string(),
                conditions,
            }),
        }
    }

    /// Rename field entries (recursively) through `f`.
    pub(crate) fn rename_fields(&mut self, f: &impl Fn(&str) -> Option<String>) {
        for (_, entries) in &mut self.groups {
            for entry in entries.iter_mut() {
                match entry {
                    WhereEntry::Field { field, .. } => {
                        if let Some(renamed) = f(field) {
                            *field = renamed;
                        }
                    }
                    WhereEntry::Group(tree) => tree.rename_fields(f),
                    WhereEntry::Raw { .. } | WhereEntry::Exists { .. } => {}
                }
            }
        }
    }
}

/// An entry of the selected field list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FieldItem {
    Column(String),
    Aliased { column: String, alias: String },
    Raw(Expression),
}

/// The selected field list; `All` renders as `*`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub enum FieldSpec {
    #[default]
    All,
    List(Vec<FieldItem>),
}

impl FieldSpec {
    pub(crate) fn push(&mut self, item: FieldItem) {
        match self {
            FieldSpec::All => *self = FieldSpec::List(vec![item]),
            FieldSpec::List(items) => {
                if !items.contains(&item) {
                    items.push(item);
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
}

impl JoinType {
    pub fn as_sql(self) -> &'static str {
        match self {
            JoinType::Inner => "INNER",
            JoinType::Left => "LEFT",
            JoinType::Right => "RIGHT",
            JoinType::Full => "FULL",
        }
    }
}

/// One ON condition of a join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum JoinOn {
    /// `left=right`, both sides alias-qualified at render time.
    Eq { left: String, right: String },
    /// Any other condition text, emitted as written.
    Text(String),
    Raw(Expression),
}

impl JoinOn {
    /// Parse one ON condition. Only a plain `=` (not `>=`, `<=`, `!=`) is
    /// treated as a column equality.
    pub fn parse(on: &str) -> Self {
        if let Some((left, right)) = on.split_once('=') {
            let plain = !left.ends_with(['<', '>', '!']) && !right.starts_with('=');
            if plain && !left.trim().is_empty() && !right.trim().is_empty() {
                return JoinOn::Eq {
                    left: left.trim().to_string(),
                    right: right.trim().to_string(),
                };
            }
        }
        JoinOn::Text(on.trim().to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Join {
    pub table: String,
    pub ty: JoinType,
    pub on: Vec<JoinOn>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("asc") {
            Some(SortDir::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Some(SortDir::Desc)
        } else {
            None
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum OrderItem {
    Field { field: String, dir: Option<SortDir> },
    Raw(Expression),
}

/// `LIMIT count` or `LIMIT offset,count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Limit {
    pub offset: Option<u64>,
    pub count: u64,
}

impl Limit {
    pub fn new(count: u64) -> Self {
        Self {
            offset: None,
            count,
        }
    }

    pub fn with_offset(offset: u64, count: u64) -> Self {
        Self {
            offset: Some(offset),
            count,
        }
    }
}

/// Requested page, lowered into [`Limit`] during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    pub page: i64,
    pub size: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum UnionBody {
    Raw(Expression),
    Query(Box<Options>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnionItem {
    pub all: bool,
    pub body: UnionBody,
}

/// Soft-delete filter applied to every rendered WHERE.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SoftDelete {
    pub field: String,
    pub condition: Condition,
}

/// The normalized statement document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Options {
    /// Tables in declaration order, as written (placeholders unresolved).
    pub table: Vec<String>,
    /// Resolved table name → alias.
    pub alias: BTreeMap<String, String>,
    pub field: FieldSpec,
    pub distinct: bool,
    pub join: Vec<Join>,
    pub r#where: WhereTree,
    pub group: Option<String>,
    pub having: Option<Expression>,
    pub order: Vec<OrderItem>,
    pub limit: Option<Limit>,
    pub page: Option<Page>,
    pub union: Vec<UnionItem>,
    pub lock: Option<String>,
    pub comment: Option<String>,
    pub force: Vec<String>,
    pub fetch_sql: bool,
    pub soft_delete: Option<SoftDelete>,
    /// Source field → target field, applied to WHERE and ORDER keys.
    pub view: Option<BTreeMap<String, String>>,
}

impl Options {
    /// The first declared table, if any.
    pub fn main_table(&self) -> Option<&str> {
        self.table.first().map(String::as_str)
    }
}
