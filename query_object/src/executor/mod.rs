//! Statement execution
//!
//! A [`Driver`] runs rendered SQL and hands back rows as JSON objects.
//! [`Query`] wraps a statement with an optional column projection and
//! metrics sink and maps the returned rows into caller types.

pub mod callback;
pub mod metrics;
pub mod mysql;

pub use callback::{Callback, CallbackDriver, CallbackError};
pub use metrics::{MetricsSnapshot, QueryMetrics};
pub use mysql::{MySqlDriver, expand_array_params};

use crate::errors::{DriverError, QueryError, QueryResult};
use crate::query_builder::Statement;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

/// A result row keyed by column name
pub type Row = serde_json::Map<String, Value>;

/// Runs one statement with positional parameters
///
/// `Ok(None)` means the driver produced no result set; callers treat it as
/// zero rows.
#[async_trait]
pub trait Driver: Send + Sync {
    async fn query(&self, sql: &str, params: &[Value]) -> Result<Option<Vec<Row>>, DriverError>;
}

#[async_trait]
impl<D: Driver + ?Sized> Driver for Arc<D> {
    async fn query(&self, sql: &str, params: &[Value]) -> Result<Option<Vec<Row>>, DriverError> {
        (**self).query(sql, params).await
    }
}

#[async_trait]
impl<D: Driver + ?Sized> Driver for &D {
    async fn query(&self, sql: &str, params: &[Value]) -> Result<Option<Vec<Row>>, DriverError> {
        (**self).query(sql, params).await
    }
}

/// A statement ready to run against a [`Driver`]
#[derive(Debug, Clone, Default)]
pub struct Query {
    sql: String,
    params: Vec<Value>,
    columns: Option<Vec<String>>,
    metrics: Option<Arc<QueryMetrics>>,
}

impl Query {
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
            ..Default::default()
        }
    }

    pub fn from_statement(statement: Statement) -> Self {
        Self::new(statement.sql, statement.params)
    }

    /// Keep only these columns in each row; absent columns read as null
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Record timing and row counts into a shared sink
    pub fn metrics(mut self, metrics: Arc<QueryMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Run the statement and return the raw rows
    pub async fn fetch_rows<D>(&self, driver: &D) -> QueryResult<Vec<Row>>
    where
        D: Driver + ?Sized,
    {
        debug_log!("Running query: {} ({} params)", self.sql, self.params.len());
        let started = Instant::now();

        let rows = driver
            .query(&self.sql, &self.params)
            .await
            .map_err(QueryError::Driver)?
            .unwrap_or_default();

        if let Some(metrics) = &self.metrics {
            metrics.record_query(started.elapsed(), rows.len());
        }
        debug_log!("Query returned {} rows in {:?}", rows.len(), started.elapsed());

        Ok(match &self.columns {
            Some(columns) => rows.into_iter().map(|row| project(row, columns)).collect(),
            None => rows,
        })
    }

    /// Run the statement and deserialize every row into `T`
    pub async fn fetch_all<T, D>(&self, driver: &D) -> QueryResult<Vec<T>>
    where
        T: DeserializeOwned,
        D: Driver + ?Sized,
    {
        self.fetch_rows(driver)
            .await?
            .into_iter()
            .map(|row| {
                serde_json::from_value(Value::Object(row))
                    .map_err(|e| QueryError::RowMapping(e.to_string()))
            })
            .collect()
    }

    /// Run the statement and map every row with `mapper`
    pub async fn fetch_all_with<T, D, F>(&self, driver: &D, mapper: F) -> QueryResult<Vec<T>>
    where
        D: Driver + ?Sized,
        F: FnMut(Row) -> T,
    {
        Ok(self.fetch_rows(driver).await?.into_iter().map(mapper).collect())
    }

    /// Deserialize every row, then let `hook` adjust each mapped value
    ///
    /// The hook sees the mapped value, all raw rows and the row index.
    pub async fn fetch_all_then<T, D, H>(&self, driver: &D, mut hook: H) -> QueryResult<Vec<T>>
    where
        T: DeserializeOwned,
        D: Driver + ?Sized,
        H: FnMut(&mut T, &[Row], usize),
    {
        let rows = self.fetch_rows(driver).await?;
        let mut mapped = Vec::with_capacity(rows.len());
        for row in &rows {
            let value = serde_json::from_value(Value::Object(row.clone()))
                .map_err(|e| QueryError::RowMapping(e.to_string()))?;
            mapped.push(value);
        }
        for (index, value) in mapped.iter_mut().enumerate() {
            hook(value, &rows, index);
        }
        Ok(mapped)
    }
}

impl From<Statement> for Query {
    fn from(statement: Statement) -> Self {
        Self::from_statement(statement)
    }
}

fn project(mut row: Row, columns: &[String]) -> Row {
    columns
        .iter()
        .map(|column| {
            let value = row.remove(column).unwrap_or(Value::Null);
            (column.clone(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_builder::QueryBuilder;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Issue {
        id: i64,
        title: String,
    }

    fn answering(rows: Value) -> impl Driver {
        CallbackDriver::new(move |_sql: &str, _params: &[Value], done: Callback| {
            let rows = serde_json::from_value::<Vec<Row>>(rows.clone()).unwrap();
            done(Ok(Some(rows)));
        })
    }

    #[tokio::test]
    async fn test_fetch_empty() {
        let issues: Vec<Issue> = Query::new("SELECT * FROM `issue`", vec![])
            .fetch_all(&answering(json!([])))
            .await
            .unwrap();
        assert!(issues.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_none_is_empty() {
        let driver = CallbackDriver::new(|_sql: &str, _params: &[Value], done: Callback| done(Ok(None)));
        let rows = Query::new("SELECT 1", vec![]).fetch_rows(&driver).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_simple() {
        let driver = answering(json!([{"id": 1, "title": "crash"}, {"id": 2, "title": "hang"}]));
        let issues: Vec<Issue> = Query::new("SELECT * FROM `issue`", vec![])
            .fetch_all(&driver)
            .await
            .unwrap();
        assert_eq!(
            issues,
            vec![
                Issue { id: 1, title: "crash".into() },
                Issue { id: 2, title: "hang".into() },
            ]
        );
    }

    #[tokio::test]
    async fn test_driver_receives_statement() {
        let driver = CallbackDriver::new(|sql: &str, params: &[Value], done: Callback| {
            let mut row = Row::new();
            row.insert("sql".into(), json!(sql));
            row.insert("params".into(), json!(params));
            done(Ok(Some(vec![row])));
        });
        let statement = QueryBuilder::new().table("issue").eq("id", 7).to_sql().unwrap();
        let rows = Query::from(statement).fetch_rows(&driver).await.unwrap();
        assert_eq!(rows[0]["sql"], json!("SELECT * FROM `issue` WHERE `id` = ?"));
        assert_eq!(rows[0]["params"], json!([7]));
    }

    #[tokio::test]
    async fn test_driver_error_passes_through() {
        let driver = CallbackDriver::new(|_sql: &str, _params: &[Value], done: Callback| {
            done(Err("error".into()));
        });
        let err = Query::new("SELECT 1", vec![]).fetch_rows(&driver).await.unwrap_err();
        assert!(matches!(err, QueryError::Driver(_)));
        assert_eq!(err.to_string(), "error");
    }

    #[tokio::test]
    async fn test_row_mapping_error() {
        let driver = answering(json!([{"id": "not a number", "title": "x"}]));
        let err = Query::new("SELECT 1", vec![])
            .fetch_all::<Issue, _>(&driver)
            .await
            .unwrap_err();
        assert!(matches!(err, QueryError::RowMapping(_)));
    }

    #[tokio::test]
    async fn test_columns_projection() {
        let driver = answering(json!([{"id": 1, "title": "crash", "extra": true}]));
        let rows = Query::new("SELECT 1", vec![])
            .columns(["title", "missing"])
            .fetch_rows(&driver)
            .await
            .unwrap();
        assert_eq!(Value::Object(rows[0].clone()), json!({"title": "crash", "missing": null}));
    }

    #[tokio::test]
    async fn test_fetch_all_with_mapper() {
        let driver = answering(json!([{"id": 1, "title": "crash"}, {"id": 2, "title": "hang"}]));
        let titles = Query::new("SELECT 1", vec![])
            .fetch_all_with(&driver, |row| row["title"].as_str().unwrap_or_default().to_uppercase())
            .await
            .unwrap();
        assert_eq!(titles, vec!["CRASH", "HANG"]);
    }

    #[tokio::test]
    async fn test_fetch_all_then_sees_rows_and_index() {
        #[derive(Debug, Deserialize)]
        struct Numbered {
            id: i64,
            #[serde(default)]
            position: usize,
            #[serde(default)]
            total: usize,
        }

        let driver = answering(json!([{"id": 10}, {"id": 20}, {"id": 30}]));
        let numbered: Vec<Numbered> = Query::new("SELECT 1", vec![])
            .fetch_all_then(&driver, |item: &mut Numbered, rows, index| {
                item.position = index;
                item.total = rows.len();
            })
            .await
            .unwrap();

        let seen: Vec<_> = numbered.iter().map(|n| (n.id, n.position, n.total)).collect();
        assert_eq!(seen, vec![(10, 0, 3), (20, 1, 3), (30, 2, 3)]);
    }

    #[tokio::test]
    async fn test_metrics_recorded() {
        let metrics = Arc::new(QueryMetrics::new());
        let driver = answering(json!([{"id": 1, "title": "a"}, {"id": 2, "title": "b"}]));
        let query = Query::new("SELECT 1", vec![]).metrics(metrics.clone());

        query.fetch_rows(&driver).await.unwrap();
        query.fetch_rows(&driver).await.unwrap();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.live_queries, 2);
        assert_eq!(snapshot.rows, 4);
        assert_eq!(snapshot.cache_hits, 0);
    }

    #[tokio::test]
    async fn test_arc_driver() {
        let driver = Arc::new(answering(json!([{"id": 1, "title": "a"}])));
        let rows = Query::new("SELECT 1", vec![]).fetch_rows(&driver).await.unwrap();
        assert_eq!(rows.len(), 1);
    }
}
