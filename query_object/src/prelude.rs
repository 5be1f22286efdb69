//! Convenience re-exports for common query-object usage

// Building
pub use crate::query_builder::{
    Condition, ConditionGroup, Direction, Filter, FilterAugmentation, GroupOperator, Operator,
    QueryBuilder, QueryContext, Statement,
};

// Expression helpers
pub use crate::expression::{Expr, ToSql};
pub use crate::nameable::Nameable;
pub use crate::sql;

// Execution
pub use crate::executor::{CallbackDriver, Driver, MySqlDriver, Query, QueryMetrics, Row};

// Error types
pub use crate::errors::{QueryError, QueryResult};

// Common external dependencies that are frequently used
pub use async_trait::async_trait;
pub use serde::{Deserialize, Serialize};
pub use serde_json::{Value, json};
