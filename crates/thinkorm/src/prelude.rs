//! Convenient imports for typical `thinkorm` usage.
//!
//! ```ignore
//! use thinkorm::prelude::*;
//! ```

pub use crate::{
    Builder, Condition, Expression, Operand, OrmError, OrmResult, PkData, Query, QueryConfig,
    Statement, Value,
};
