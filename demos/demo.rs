use sqlweave::prelude::*;
use sqlweave::query_object::{Callback, MetricsSnapshot};

#[derive(Debug, Deserialize)]
struct IssueSummary {
    id: i64,
    title: String,
    age_days: i64,
}

/// Answers every statement from a fixed table of issues
fn in_memory_driver() -> CallbackDriver<impl Fn(&str, &[Value], Callback) + Send + Sync> {
    CallbackDriver::new(|sql: &str, params: &[Value], done: Callback| {
        println!("   ↳ driver got: {}", sql);
        println!("   ↳ params:     {}", Value::from(params.to_vec()));

        let rows = json!([
            {"id": 1, "title": "Crash on login", "age_days": 12},
            {"id": 2, "title": "Slow dashboard", "age_days": 3},
        ]);
        let rows = rows
            .as_array()
            .map(|rows| rows.iter().filter_map(|row| row.as_object().cloned()).collect())
            .unwrap_or_default();

        // answer from another thread like a real callback driver would
        std::thread::spawn(move || done(Ok(Some(rows))));
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("🚀 sqlweave demo\n");

    let config = AppConfig {
        query: QueryConfig::new(true, 250, 512),
        metrics: MetricsConfig::new(true),
    };

    // Every builder from this coordinator is scoped to one customer
    let weave = SqlWeave::new(in_memory_driver(), config).with_context(FilterAugmentation(
        |_entity: Option<&str>| Filter::new().eq("customer_id", 42),
    ));
    println!("✅ Coordinator ready");

    // Plain statement
    let builder = weave
        .select_from("issue")
        .column("id")
        .column("title")
        .select(sql::datediff(sql::now(), "created_at").alias("age_days"))
        .in_list("state", vec!["open", "reopened"])
        .order_by("created_at", Direction::Descending)
        .limit(10);

    println!("\n📝 Rendered:");
    let statement = builder.clone().to_sql()?;
    println!("   {}", statement.sql);

    println!("\n🔎 Running:");
    let issues: Vec<IssueSummary> = weave.fetch_all(builder).await?;
    for issue in &issues {
        println!("   #{} {} ({} days old)", issue.id, issue.title, issue.age_days);
    }

    // A join across two tables with an OR group
    let statement = weave
        .select_from("issue")
        .scoped_column("issue", "id")
        .scoped_column_as("project", "name", "project_name")
        .join("issue", "project_id", "project", "id")
        .filter(
            Filter::new().or().push_group(ConditionGroup::all(vec![
                Condition::new("priority", Operator::Equal, Some("high".into())),
                Condition::new("escalated", Operator::Equal, Some(true.into())),
            ])),
        )
        .to_sql()?;
    println!("\n🔗 Join:\n   {}", statement.sql);
    println!("   params: {}", Value::from(statement.params));

    let snapshot: MetricsSnapshot = weave.metrics_snapshot().unwrap_or_default();
    println!(
        "\n📊 {} live queries, {} rows, {:?} total",
        snapshot.live_queries, snapshot.rows, snapshot.query_time
    );

    Ok(())
}
