//! # thinkorm
//!
//! A structured SQL statement builder.
//!
//! Fluent declarations are accumulated by a [`Query`], normalized into an
//! [`Options`] document and lowered to a parameterized [`Statement`] by a
//! [`Builder`]. Nothing is executed; the statement's SQL text and ordered
//! params are handed to whatever execution layer the application uses.
//!
//! ## Features
//!
//! - **Nested logic**: AND / OR / XOR connectives and closure-built groups
//! - **Field ledger**: repeated conditions on one field all apply
//! - **Fan-out**: `a|b` / `a&b` apply one condition to several columns
//! - **Raw escapes**: [`Expression`] fragments are inserted verbatim
//! - **Primary keys**: single and composite key lookups via [`Query::find_by_pk`]
//! - **Soft delete**: a filter AND-ed onto every WHERE
//! - **Dialects**: identifier quoting through the [`Dialect`] trait
//!
//! ## Example
//!
//! ```ignore
//! use thinkorm::prelude::*;
//!
//! let mut q = Query::new(QueryConfig::new().with_prefix("think_"));
//! q.table("__USER__")
//!     .where_op("name|nickname", "like", "think%")
//!     .where_group(|g| {
//!         g.r#where("status", 1).where_or("role", "admin");
//!     });
//!
//! let stmt = q.fetch_sql(true).find()?;
//! assert_eq!(
//!     stmt.sql(),
//!     "SELECT * FROM think_user WHERE (name LIKE ? OR nickname LIKE ?) AND ((status = ?) OR (role = ?)) LIMIT 1"
//! );
//! println!("{}", stmt.to_real_sql());
//! # Ok::<(), thinkorm::OrmError>(())
//! ```

pub mod builder;
pub mod condition;
pub mod config;
pub mod error;
pub mod expression;
pub mod ident;
pub mod options;
pub mod param;
pub mod prelude;
pub mod query;
pub mod statement;
pub mod value;

pub use builder::{Builder, Dialect, Generic, Mysql};
pub use condition::{CompareOp, Condition, Operand, Operator};
pub use config::{DialectKind, PrimaryKey, QueryConfig};
pub use error::{OrmError, OrmResult};
pub use expression::Expression;
pub use options::{
    FieldItem, FieldSpec, Join, JoinOn, JoinType, Limit, Logic, Options, OrderItem, Page,
    SoftDelete, SortDir, UnionBody, UnionItem, WhereEntry, WhereTree,
};
pub use param::{Param, ParamList};
pub use query::{PkData, Query, TableSpec};
pub use statement::Statement;
pub use value::{BindType, Value};
