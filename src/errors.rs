//! Error types for the sqlweave crate
//!
//! This module contains all error types that can be returned by sqlweave operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SqlWeaveError {
    #[error(transparent)]
    Query(#[from] query_object::QueryError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}
