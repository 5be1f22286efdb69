//! MySQL driver over a caller-owned `sqlx` pool

use super::{Driver, Row};
use crate::errors::DriverError;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::mysql::{MySqlArguments, MySqlPool, MySqlRow};
use sqlx::query::Query;
use sqlx::{Column, MySql, Row as _, TypeInfo, ValueRef};

/// Runs statements on a [`MySqlPool`]
///
/// The pool is owned by the caller; this driver never opens or closes
/// connections itself.
#[derive(Debug, Clone)]
pub struct MySqlDriver {
    pool: MySqlPool,
}

impl MySqlDriver {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

#[async_trait]
impl Driver for MySqlDriver {
    async fn query(&self, sql: &str, params: &[Value]) -> Result<Option<Vec<Row>>, DriverError> {
        let (sql, params) = expand_array_params(sql, params);
        trace_log!("MySQL statement after expansion: {} ({} params)", sql, params.len());

        let mut query = sqlx::query(&sql);
        for value in &params {
            query = bind_value(query, value);
        }

        let rows = query.fetch_all(&self.pool).await?;
        let rows = rows
            .iter()
            .map(decode_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Some(rows))
    }
}

/// Expand array parameters into one placeholder per element.
///
/// `IN (?)` bound to `[1, 2]` becomes `IN (?, ?)`; an empty array becomes
/// `NULL` so `IN (NULL)` matches nothing. Question marks inside quoted
/// strings or backtick identifiers are left alone.
pub fn expand_array_params(sql: &str, params: &[Value]) -> (String, Vec<Value>) {
    if !params.iter().any(Value::is_array) {
        return (sql.to_string(), params.to_vec());
    }

    let mut out = String::with_capacity(sql.len() + params.len() * 3);
    let mut bound = Vec::with_capacity(params.len());
    let mut remaining = params.iter();
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in sql.chars() {
        if let Some(q) = quote {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' && q != '`' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '\'' | '"' | '`' => {
                quote = Some(c);
                out.push(c);
            }
            '?' => match remaining.next() {
                Some(Value::Array(items)) if items.is_empty() => out.push_str("NULL"),
                Some(Value::Array(items)) => {
                    out.push_str(&vec!["?"; items.len()].join(", "));
                    bound.extend(items.iter().cloned());
                }
                Some(value) => {
                    out.push('?');
                    bound.push(value.clone());
                }
                None => out.push('?'),
            },
            _ => out.push(c),
        }
    }

    bound.extend(remaining.cloned());
    (out, bound)
}

fn bind_value<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    value: &Value,
) -> Query<'q, MySql, MySqlArguments> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(b) => query.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                query.bind(i)
            } else if let Some(u) = n.as_u64() {
                query.bind(u)
            } else {
                query.bind(n.as_f64())
            }
        }
        Value::String(s) => query.bind(s.clone()),
        other => query.bind(sqlx::types::Json(other.clone())),
    }
}

fn decode_row(row: &MySqlRow) -> Result<Row, sqlx::Error> {
    let mut map = Row::new();

    for column in row.columns() {
        let index = column.ordinal();
        let (is_null, type_name) = {
            let raw = row.try_get_raw(index)?;
            (raw.is_null(), raw.type_info().name().to_string())
        };

        let value = if is_null {
            Value::Null
        } else {
            decode_column(row, index, &type_name)?
        };
        map.insert(column.name().to_string(), value);
    }

    Ok(map)
}

fn decode_column(row: &MySqlRow, index: usize, type_name: &str) -> Result<Value, sqlx::Error> {
    let value = match type_name {
        "BOOLEAN" => Value::from(row.try_get::<bool, _>(index)?),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
            Value::from(row.try_get::<i64, _>(index)?)
        }
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" => Value::from(row.try_get::<u64, _>(index)?),
        "YEAR" => Value::from(row.try_get_unchecked::<u16, _>(index)?),
        "FLOAT" => Value::from(f64::from(row.try_get::<f32, _>(index)?)),
        "DOUBLE" => Value::from(row.try_get::<f64, _>(index)?),
        "DATETIME" => Value::from(
            row.try_get::<chrono::NaiveDateTime, _>(index)?
                .format("%Y-%m-%d %H:%M:%S%.f")
                .to_string(),
        ),
        "TIMESTAMP" => Value::from(
            row.try_get::<chrono::DateTime<chrono::Utc>, _>(index)?
                .to_rfc3339(),
        ),
        "DATE" => Value::from(row.try_get::<chrono::NaiveDate, _>(index)?.to_string()),
        "TIME" => Value::from(row.try_get::<chrono::NaiveTime, _>(index)?.to_string()),
        "JSON" => row.try_get::<Value, _>(index)?,
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" => {
            let bytes = row.try_get::<Vec<u8>, _>(index)?;
            Value::from(String::from_utf8_lossy(&bytes).into_owned())
        }
        // DECIMAL, ENUM, SET and the text family arrive as strings
        _ => Value::from(row.try_get_unchecked::<String, _>(index)?),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_scalars_pass_through() {
        let (sql, params) = expand_array_params("SELECT * FROM `t` WHERE `a` = ?", &[json!(1)]);
        assert_eq!(sql, "SELECT * FROM `t` WHERE `a` = ?");
        assert_eq!(params, vec![json!(1)]);
    }

    #[test]
    fn test_array_expands_in_place() {
        let (sql, params) = expand_array_params(
            "WHERE `a` = ? AND `b` IN (?) AND `c` = ?",
            &[json!("x"), json!([1, 2, 3]), json!(true)],
        );
        assert_eq!(sql, "WHERE `a` = ? AND `b` IN (?, ?, ?) AND `c` = ?");
        assert_eq!(params, vec![json!("x"), json!(1), json!(2), json!(3), json!(true)]);
    }

    #[test]
    fn test_empty_array_matches_nothing() {
        let (sql, params) = expand_array_params("WHERE `b` NOT IN (?)", &[json!([])]);
        assert_eq!(sql, "WHERE `b` NOT IN (NULL)");
        assert!(params.is_empty());
    }

    #[test]
    fn test_quoted_question_marks_are_skipped() {
        let (sql, params) = expand_array_params(
            "WHERE `why?` = '?' AND `d` BETWEEN 'a\\'?' AND 'z' AND `e` IN (?)",
            &[json!(["p", "q"])],
        );
        assert_eq!(
            sql,
            "WHERE `why?` = '?' AND `d` BETWEEN 'a\\'?' AND 'z' AND `e` IN (?, ?)"
        );
        assert_eq!(params, vec![json!("p"), json!("q")]);
    }
}
