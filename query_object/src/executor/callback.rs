//! Callback-style drivers
//!
//! Wraps a driver that answers through a completion callback rather than a
//! future. The callback is bridged to the awaiting caller with a oneshot
//! channel.

use super::{Driver, Row};
use crate::errors::DriverError;
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::oneshot;

/// Completion handed to a callback driver; call it exactly once
pub type Callback = Box<dyn FnOnce(Result<Option<Vec<Row>>, DriverError>) + Send>;

#[derive(Error, Debug)]
pub enum CallbackError {
    #[error("Driver dropped the callback without answering")]
    CallbackDropped,
}

/// Adapts `Fn(sql, params, callback)` into a [`Driver`]
///
/// ```
/// use query_object::executor::{CallbackDriver, Driver};
/// use serde_json::json;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let driver = CallbackDriver::new(|_sql, _params, done| {
///     let row = json!({"id": 1}).as_object().cloned().unwrap_or_default();
///     done(Ok(Some(vec![row])));
/// });
/// let rows = driver.query("SELECT 1", &[]).await.unwrap();
/// assert_eq!(rows.map(|r| r.len()), Some(1));
/// # });
/// ```
pub struct CallbackDriver<F> {
    handler: F,
}

impl<F> CallbackDriver<F>
where
    F: Fn(&str, &[Value], Callback) + Send + Sync,
{
    pub fn new(handler: F) -> Self {
        Self { handler }
    }
}

impl<F> std::fmt::Debug for CallbackDriver<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackDriver").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F> Driver for CallbackDriver<F>
where
    F: Fn(&str, &[Value], Callback) + Send + Sync,
{
    async fn query(&self, sql: &str, params: &[Value]) -> Result<Option<Vec<Row>>, DriverError> {
        let (tx, rx) = oneshot::channel();
        let callback: Callback = Box::new(move |result| {
            // the caller may have given up waiting
            let _ = tx.send(result);
        });

        (self.handler)(sql, params, callback);

        match rx.await {
            Ok(result) => result,
            Err(_) => Err(CallbackError::CallbackDropped.into()),
        }
    }
}
