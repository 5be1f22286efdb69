//! Convenience re-exports for common sqlweave usage
//!
//! This prelude module re-exports the most commonly used items from sqlweave,
//! making it easier to import everything you need with a single use statement.
//!
//! # Example
//!
//! ```rust
//! use sqlweave::prelude::*;
//!
//! let statement = QueryBuilder::new().table("issue").eq("id", 1).to_sql().unwrap();
//! assert_eq!(statement.sql, "SELECT * FROM `issue` WHERE `id` = ?");
//! ```

// Core sqlweave components
pub use crate::core::SqlWeave;
pub use crate::errors::SqlWeaveError;

// Re-export centralized config
pub use config::{AppConfig, MetricsConfig, QueryConfig};

// Re-export commonly used query-object types for convenience
pub use query_object::prelude::*;

// Common external dependencies
pub use anyhow;
pub use async_trait;
pub use sqlx;
pub use tokio;
