use thiserror::Error;

/// Error type produced by database drivers.
///
/// Drivers report failures through this boxed error so the original error
/// reaches the caller unchanged.
pub type DriverError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Malformed range: {0}")]
    MalformedRange(String),

    #[error("Join column mismatch: {left} left columns, {right} right columns")]
    JoinColumnMismatch { left: usize, right: usize },

    #[error("Missing table: at least one FROM table is required")]
    MissingTable,

    #[error("Missing value for `{field}` with operator {operator}")]
    MissingValue { field: String, operator: String },

    #[error("{0}")]
    Driver(DriverError),

    #[error("Row mapping error: {0}")]
    RowMapping(String),
}

impl QueryError {
    pub(crate) fn missing_value(field: impl Into<String>, operator: impl std::fmt::Debug) -> Self {
        QueryError::MissingValue {
            field: field.into(),
            operator: format!("{:?}", operator),
        }
    }
}

impl From<serde_json::Error> for QueryError {
    fn from(err: serde_json::Error) -> Self {
        QueryError::RowMapping(err.to_string())
    }
}

pub type QueryResult<T> = Result<T, QueryError>;
