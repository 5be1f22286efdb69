//! Integration tests for JSON-described filters
//!
//! Filters arrive as JSON (for example from a request body), are merged into
//! builders from the facade and run through an in-memory callback driver.

use serde_json::{Value, json};
use sqlweave::prelude::*;
use sqlweave::query_object::Callback;
use std::sync::{Arc, Mutex};

type Seen = Arc<Mutex<Vec<(String, Vec<Value>)>>>;

#[derive(Debug, Deserialize, PartialEq)]
struct Issue {
    id: i64,
    state: String,
}

fn driver(seen: Seen, rows: Value) -> CallbackDriver<impl Fn(&str, &[Value], Callback) + Send + Sync> {
    CallbackDriver::new(move |sql: &str, params: &[Value], done: Callback| {
        seen.lock().unwrap().push((sql.to_string(), params.to_vec()));
        let rows: Vec<Row> = serde_json::from_value(rows.clone()).unwrap();
        std::thread::spawn(move || done(Ok(Some(rows))));
    })
}

fn tenant_weave(seen: Seen, rows: Value) -> SqlWeave<impl Driver> {
    SqlWeave::new(driver(seen, rows), AppConfig::default()).with_context(FilterAugmentation(
        |entity: Option<&str>| match entity {
            Some("issue") => Filter::new().table("issue").eq("customer_id", 42),
            _ => Filter::new(),
        },
    ))
}

#[tokio::test]
async fn test_request_filter_end_to_end() {
    let seen: Seen = Default::default();
    let weave = tenant_weave(seen.clone(), json!([{"id": 3, "state": "open"}]));

    let request: Filter = serde_json::from_value(json!({
        "condition": [
            {
                "conditions": [
                    {"field": "state", "operator": "EQ", "value": "open"},
                    {"field": "state_reason", "operator": "EQ", "value": "reopened"}
                ],
                "operator": "OR"
            },
            {"conditions": [{"field": "priority", "operator": "IN", "value": [1, 2]}]}
        ],
        "order": [{"field": "created_at", "direction": "DESCENDING"}],
        "range": {"offset": 20, "limit": 10}
    }))
    .unwrap();

    let issues: Vec<Issue> = weave
        .fetch_all(weave.select_from("issue").filter(request))
        .await
        .unwrap();
    assert_eq!(issues, vec![Issue { id: 3, state: "open".into() }]);

    let seen = seen.lock().unwrap();
    assert_eq!(
        seen[0].0,
        "SELECT * FROM `issue` WHERE (`issue`.`customer_id` = ?) \
         AND (`state` = ? OR `state_reason` = ?) AND (`priority` IN (?)) \
         ORDER BY `created_at` DESC LIMIT 20,10"
    );
    assert_eq!(seen[0].1, vec![json!(42), json!("open"), json!("reopened"), json!([1, 2])]);
}

#[tokio::test]
async fn test_context_ignores_other_entities() {
    let seen: Seen = Default::default();
    let weave = tenant_weave(seen.clone(), json!([]));

    let rows = weave
        .fetch_rows(weave.select_from("project").count_all())
        .await
        .unwrap();
    assert!(rows.is_empty());
    assert_eq!(seen.lock().unwrap()[0].0, "SELECT count(*) FROM `project`");
}

#[tokio::test]
async fn test_invalid_filter_never_reaches_driver() {
    let seen: Seen = Default::default();
    let weave = tenant_weave(seen.clone(), json!([]));

    let request: Filter = serde_json::from_value(json!({
        "condition": [{"conditions": [{"field": "state", "operator": "EQ"}]}]
    }))
    .unwrap();

    let err = weave
        .fetch_rows(weave.select_from("issue").filter(request))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SqlWeaveError::Query(QueryError::MissingValue { .. })
    ));
    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn test_config_drives_metrics() {
    let config = AppConfig::from_toml_str("[metrics]\nenabled = false\n").unwrap();
    let weave = SqlWeave::new(driver(Default::default(), json!([])), config);
    assert!(weave.metrics().is_none());
    assert!(!weave.config().metrics.enabled);
}
