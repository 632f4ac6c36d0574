use crate::ident::has_metachar;
use crate::options::Limit;
use std::fmt::Debug;

/// Dialect-specific lowering hooks used by [`super::Builder`].
///
/// The default methods produce generic SQL; a dialect overrides only what it
/// renders differently.
pub trait Dialect: Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Render a (possibly dotted) identifier.
    fn parse_key(&self, key: &str) -> String {
        key.to_string()
    }

    /// Render the body of a LIMIT clause, without leading space.
    fn parse_limit(&self, limit: &Limit) -> String {
        match limit.offset {
            Some(offset) => format!("LIMIT {offset},{}", limit.count),
            None => format!("LIMIT {}", limit.count),
        }
    }
}

/// Identifiers emitted as written.
#[derive(Debug, Clone, Copy, Default)]
pub struct Generic;

impl Dialect for Generic {
    fn name(&self) -> &'static str {
        "generic"
    }
}

/// MySQL: plain identifiers are wrapped in backticks.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mysql;

impl Dialect for Mysql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn parse_key(&self, key: &str) -> String {
        let key = key.trim();
        if key == "*" || key.contains('`') || has_metachar(key) || is_numeric(key) {
            return key.to_string();
        }
        key.split('.')
            .map(|part| {
                if part == "*" {
                    part.to_string()
                } else {
                    format!("`{part}`")
                }
            })
            .collect::<Vec<_>>()
            .join(".")
    }
}

fn is_numeric(key: &str) -> bool {
    !key.is_empty() && key.parse::<f64>().is_ok()
}
