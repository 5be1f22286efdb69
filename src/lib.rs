//! # sqlweave
//!
//! Compile structured SELECT descriptions into parameterized MySQL statements,
//! run them through a driver and map result rows into typed records.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sqlweave::prelude::*;
//!
//! #[derive(Debug, Deserialize)]
//! struct Issue {
//!     id: i64,
//!     title: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let pool = sqlx::MySqlPool::connect("mysql://root@localhost/tracker").await?;
//!
//!     let weave = SqlWeave::new(MySqlDriver::new(pool), config).with_context(
//!         FilterAugmentation(|_entity: Option<&str>| Filter::new().eq("customer_id", 42)),
//!     );
//!
//!     let issues: Vec<Issue> = weave
//!         .fetch_all(
//!             weave
//!                 .select_from("issue")
//!                 .column("id")
//!                 .column("title")
//!                 .order_by("created_at", Direction::Descending)
//!                 .limit(10),
//!         )
//!         .await?;
//!
//!     for issue in issues {
//!         println!("{}: {}", issue.id, issue.title);
//!     }
//!
//!     Ok(())
//! }
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

pub mod core;
pub mod errors;
pub mod prelude;

// Re-export the main public types for convenience
pub use crate::core::SqlWeave;
pub use crate::errors::SqlWeaveError;

// Re-export centralized config
pub use config::{AppConfig, ConfigError, MetricsConfig, QueryConfig};

// Re-export internal crates used by the public API
pub use query_object;

// Re-export external dependencies used in public API
pub use sqlx;
pub use async_trait;
