use crate::builder::{Dialect, Generic, Mysql};
use crate::error::OrmResult;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Page size used when `page()` is given no positive size and no limit is set.
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Primary key layout of the bound table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrimaryKey {
    Single(String),
    Composite(Vec<String>),
}

impl Default for PrimaryKey {
    fn default() -> Self {
        PrimaryKey::Single("id".to_string())
    }
}

/// Which renderer dialect statements are lowered with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    /// Identifiers are emitted as written.
    #[default]
    Generic,
    /// Plain identifiers are wrapped in backticks.
    Mysql,
}

impl DialectKind {
    pub fn dialect(self) -> Arc<dyn Dialect> {
        match self {
            DialectKind::Generic => Arc::new(Generic),
            DialectKind::Mysql => Arc::new(Mysql),
        }
    }
}

/// Configuration shared by a [`crate::Query`] and its child queries.
///
/// The struct deserializes with serde so it can be read from whatever
/// configuration source the application already has:
///
/// ```ignore
/// let cfg = QueryConfig::from_json(r#"{"prefix":"think_","pk":["uid","role"]}"#)?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Table prefix used by `__NAME__` placeholders and default table names.
    pub prefix: String,
    /// Fallback page size for `page()`.
    pub default_page_size: u64,
    /// Primary key used by `find()`.
    pub pk: PrimaryKey,
    /// Renderer dialect.
    pub dialect: DialectKind,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            default_page_size: DEFAULT_PAGE_SIZE,
            pk: PrimaryKey::default(),
            dialect: DialectKind::default(),
        }
    }
}

impl QueryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON; missing keys take their defaults.
    pub fn from_json(json: &str) -> OrmResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the table prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the fallback page size. Zero keeps the built-in default.
    pub fn with_default_page_size(mut self, size: u64) -> Self {
        self.default_page_size = if size == 0 { DEFAULT_PAGE_SIZE } else { size };
        self
    }

    /// Use a single-column primary key.
    pub fn with_pk(mut self, pk: impl Into<String>) -> Self {
        self.pk = PrimaryKey::Single(pk.into());
        self
    }

    /// Use a composite primary key.
    pub fn with_composite_pk<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pk = PrimaryKey::Composite(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_dialect(mut self, dialect: DialectKind) -> Self {
        self.dialect = dialect;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = QueryConfig::new();
        assert_eq!(cfg.prefix, "");
        assert_eq!(cfg.default_page_size, 20);
        assert_eq!(cfg.pk, PrimaryKey::Single("id".into()));
        assert_eq!(cfg.dialect, DialectKind::Generic);
    }

    #[test]
    fn from_json_fills_missing_keys() {
        let cfg = QueryConfig::from_json(r#"{"prefix":"think_","pk":["a","b"],"dialect":"mysql"}"#)
            .unwrap();
        assert_eq!(cfg.prefix, "think_");
        assert_eq!(cfg.default_page_size, 20);
        assert_eq!(
            cfg.pk,
            PrimaryKey::Composite(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(cfg.dialect, DialectKind::Mysql);
    }

    #[test]
    fn from_json_rejects_garbage() {
        let err = QueryConfig::from_json("{").unwrap_err();
        assert!(matches!(err, crate::OrmError::Serialization(_)));
    }

    #[test]
    fn zero_page_size_keeps_default() {
        assert_eq!(QueryConfig::new().with_default_page_size(0).default_page_size, 20);
    }
}
