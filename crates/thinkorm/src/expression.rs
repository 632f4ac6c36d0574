//! Raw SQL fragments.

use serde::{Serialize, Serializer};
use std::sync::Arc;

/// An opaque SQL fragment inserted verbatim.
///
/// Its contents are never escaped or parameterized. Use it to step outside the
/// condition grammar, e.g. `COUNT(*) > 1`.
///
/// # Example
/// ```ignore
/// use thinkorm::{Expression, Query, QueryConfig};
///
/// let mut q = Query::new(QueryConfig::default());
/// q.table("user").field_raw("COUNT(*) AS total");
/// q.where_raw(Expression::new("score > 10"), Vec::<i32>::new());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Expression(Arc<str>);

impl Expression {
    pub fn new(sql: impl Into<String>) -> Self {
        Expression(Arc::from(sql.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Expression {
    fn from(sql: &str) -> Self {
        Expression::new(sql)
    }
}

impl From<String> for Expression {
    fn from(sql: String) -> Self {
        Expression::new(sql)
    }
}

impl Serialize for Expression {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
