//! Core sqlweave functionality
//!
//! This module contains the main SqlWeave struct, which ties a driver, a
//! query context, configuration and metrics together.

use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::{Duration, Instant};

use config::AppConfig;
use query_object::{
    Driver, MetricsSnapshot, Nameable, Query, QueryBuilder, QueryContext, QueryMetrics, Row,
    Statement,
};

use crate::errors::SqlWeaveError;

/// Main sqlweave coordinator that owns the driver and the query context
pub struct SqlWeave<D> {
    driver: D,
    config: AppConfig,
    context: Arc<dyn QueryContext + Send + Sync>,
    metrics: Option<Arc<QueryMetrics>>,
}

impl<D: Driver> SqlWeave<D> {
    /// Create a new coordinator with an empty query context
    pub fn new(driver: D, config: AppConfig) -> Self {
        let metrics = config.metrics.enabled.then(|| Arc::new(QueryMetrics::new()));
        Self {
            driver,
            config,
            context: Arc::new(()),
            metrics,
        }
    }

    /// Replace the query context that seeds every builder
    pub fn with_context(mut self, context: impl QueryContext + Send + Sync + 'static) -> Self {
        self.context = Arc::new(context);
        self
    }

    /// Get driver reference
    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Shared metrics sink, `None` when metrics are disabled
    pub fn metrics(&self) -> Option<&Arc<QueryMetrics>> {
        self.metrics.as_ref()
    }

    /// Current metric totals, `None` when metrics are disabled
    pub fn metrics_snapshot(&self) -> Option<MetricsSnapshot> {
        self.metrics.as_ref().map(|metrics| metrics.snapshot())
    }

    /// A builder seeded with the context's baseline for no particular entity
    pub fn select(&self) -> QueryBuilder {
        QueryBuilder::contextual(&*self.context, None)
    }

    /// A builder for `entity`, seeded with the context's baseline for it
    pub fn select_from(&self, entity: &(impl Nameable + ?Sized)) -> QueryBuilder {
        QueryBuilder::with_context(&*self.context, entity)
    }

    /// Render `builder` and run it, returning the raw rows
    pub async fn fetch_rows(&self, builder: QueryBuilder) -> Result<Vec<Row>, SqlWeaveError> {
        let statement = builder.to_sql()?;
        self.run(statement, |query, driver| async move { query.fetch_rows(driver).await })
            .await
    }

    /// Render `builder` and run it, deserializing each row into `T`
    pub async fn fetch_all<T>(&self, builder: QueryBuilder) -> Result<Vec<T>, SqlWeaveError>
    where
        T: DeserializeOwned,
    {
        let statement = builder.to_sql()?;
        self.run(statement, |query, driver| async move { query.fetch_all(driver).await })
            .await
    }

    /// Run an already rendered statement
    pub async fn fetch_statement(&self, statement: Statement) -> Result<Vec<Row>, SqlWeaveError> {
        self.run(statement, |query, driver| async move { query.fetch_rows(driver).await })
            .await
    }

    async fn run<'a, T, F, Fut>(&'a self, statement: Statement, execute: F) -> Result<T, SqlWeaveError>
    where
        F: FnOnce(Query, &'a D) -> Fut,
        Fut: std::future::Future<Output = query_object::QueryResult<T>>,
    {
        let query_config = &self.config.query;
        if query_config.log_statements {
            tracing::debug!(
                sql = truncate_sql_bytes(&statement.sql, query_config.max_logged_sql_length),
                params = statement.params.len(),
                "Executing statement"
            );
        }

        let sql = statement.sql.clone();
        let mut query = Query::from(statement);
        if let Some(metrics) = &self.metrics {
            query = query.metrics(metrics.clone());
        }

        let started = Instant::now();
        let result = execute(query, &self.driver).await;
        let elapsed = started.elapsed();

        if query_config.warns_on_slow_queries()
            && elapsed >= Duration::from_millis(query_config.slow_query_threshold_ms)
        {
            tracing::warn!(
                sql = truncate_sql_bytes(&sql, query_config.max_logged_sql_length),
                elapsed_ms = elapsed.as_millis() as u64,
                threshold_ms = query_config.slow_query_threshold_ms,
                "Slow query"
            );
        }
        debug_log!("Statement finished in {:?}", elapsed);

        Ok(result?)
    }
}

/// Cut `sql` to at most `max_bytes`, backing off to a char boundary
pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
