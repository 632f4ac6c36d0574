//! Identifier preprocessing.
//!
//! Table and field identifiers are plain strings in this crate. Before they
//! reach a renderer they go through a few textual passes:
//!
//! - `__NAME__` placeholders expand to `<prefix><name lowercased>`
//! - model names convert to snake_case table names
//! - `a|b` / `a&b` field names fan out to several columns
//!
//! # Example
//! ```ignore
//! use thinkorm::ident::parse_sql_table;
//!
//! assert_eq!(parse_sql_table("__USER__ u", "think_"), "think_user u");
//! ```

use crate::options::Logic;
use heck::ToSnakeCase;
use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

fn placeholder_re() -> &'static Regex {
    static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER_RE.get_or_init(|| {
        Regex::new(r"__([A-Z0-9_-]+?)__").expect("invalid built-in placeholder regex")
    })
}

/// Expand `__NAME__` placeholders to `<prefix><name lowercased>`.
///
/// The expansion is lowercase, so it never matches the placeholder pattern
/// again and rewriting twice yields the same text.
pub fn parse_sql_table<'a>(sql: &'a str, prefix: &str) -> Cow<'a, str> {
    if !sql.contains("__") {
        return Cow::Borrowed(sql);
    }
    placeholder_re().replace_all(sql, |caps: &regex::Captures<'_>| {
        format!("{prefix}{}", caps[1].to_lowercase())
    })
}

/// Convert a model name to its snake_case table name (`UserInfo` → `user_info`).
pub fn parse_name(name: &str) -> String {
    name.to_snake_case()
}

/// Whether a field string is really a SQL expression.
///
/// Commas, comparison signs, quotes, an opening parenthesis or whitespace mark
/// the string as raw SQL rather than a column name.
pub fn has_metachar(field: &str) -> bool {
    field
        .chars()
        .any(|c| matches!(c, ',' | '=' | '<' | '>' | '\'' | '"' | '(') || c.is_whitespace())
}

/// Split a fan-out field name.
///
/// `a|b` yields `(Or, ["a", "b"])`, `a&b` yields `(And, ["a", "b"])`, anything
/// else yields `None`.
pub fn split_fanout(field: &str) -> Option<(Logic, Vec<&str>)> {
    let (logic, sep) = if field.contains('|') {
        (Logic::Or, '|')
    } else if field.contains('&') {
        (Logic::And, '&')
    } else {
        return None;
    };
    let names: Vec<&str> = field
        .split(sep)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    Some((logic, names))
}

/// Split `name alias` or `name AS alias` into its parts.
///
/// Returns `None` when the fragment has some other shape.
pub fn split_alias(fragment: &str) -> Option<(&str, &str)> {
    let tokens: Vec<&str> = fragment.split_whitespace().collect();
    match tokens.as_slice() {
        [name, alias] => Some((name, alias)),
        [name, kw, alias] if kw.eq_ignore_ascii_case("as") => Some((name, alias)),
        _ => None,
    }
}
