//! Query builder utilities
//!
//! Filter data, filter compilation and the SELECT builder.

pub mod builder;
pub mod context;
pub mod filter;
pub mod ordering;
pub mod pagination;
pub mod sql_generation;


#[cfg(test)]
mod integration_tests;

pub use builder::{QueryBuilder, Statement};
pub use context::{FilterAugmentation, QueryContext};
pub use filter::{Condition, ConditionGroup, ConditionValue, Field, Filter, GroupOperator, Operator};
pub use ordering::{Direction, OrderSpec};
pub use pagination::{Limit, Range};
pub use sql_generation::{CompiledFilter, SqlGenerator};
