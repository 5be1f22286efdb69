//! Query Object - SELECT compilation and execution for sqlweave
//!
//! This crate provides the expression nodes, filter data and compiler, the
//! SELECT builder, and the execution layer that runs rendered statements
//! through a [`Driver`] and maps rows into caller types.
//!
//! ```
//! use query_object::{Direction, Filter, QueryBuilder};
//!
//! let statement = QueryBuilder::new()
//!     .table("issue")
//!     .filter(Filter::new().eq("customer_id", 42).order_by("created_at", Direction::Descending).limit(10))
//!     .to_sql()
//!     .unwrap();
//!
//! assert_eq!(
//!     statement.sql,
//!     "SELECT * FROM `issue` WHERE `customer_id` = ? ORDER BY `created_at` DESC LIMIT 10"
//! );
//! assert_eq!(statement.params, vec![serde_json::json!(42)]);
//! ```

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod errors;
pub mod escape;
pub mod executor;
pub mod expression;
pub mod nameable;
pub mod prelude;
pub mod query_builder;
pub mod sql;

pub use errors::{DriverError, QueryError, QueryResult};
pub use escape::{escape, escape_id};
pub use executor::{
    Callback, CallbackDriver, CallbackError, Driver, MetricsSnapshot, MySqlDriver, Query,
    QueryMetrics, Row,
};
pub use expression::{
    AllColumns, Column, ColumnExpression, Expr, ScopedColumn, ScopedColumnExpression, TableRef,
    ToSql,
};
pub use nameable::Nameable;
pub use query_builder::{
    CompiledFilter, Condition, ConditionGroup, ConditionValue, Direction, Field, Filter,
    FilterAugmentation, GroupOperator, Limit, Operator, OrderSpec, QueryBuilder, QueryContext,
    Range, SqlGenerator, Statement,
};
