#[cfg(test)]
mod tests {
    use crate::nameable::Nameable;
    use crate::query_builder::{Direction, Filter, FilterAugmentation, QueryBuilder};
    use crate::sql;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::borrow::Cow;

    macro_rules! entity {
        ($name:ident, $table:literal) => {
            struct $name;

            impl Nameable for $name {
                fn table_name(&self) -> Cow<'_, str> {
                    Cow::Borrowed($table)
                }
            }
        };
    }

    entity!(Issue, "issue");
    entity!(IssueProject, "issue_project");
    entity!(JiraIssue, "jira_issue");
    entity!(JiraIssuePriority, "jira_issue_priority");
    entity!(JiraProjectStatus, "jira_project_status");

    const SELECT_HEAD: &str = "SELECT count(`issue`.`id`) as `total`, \
        avg(datediff(now(), from_unixtime(`issue`.`created_at`/1000))) as `daysOpen`, \
        `jira_issue_priority`.`name` as `priority`, `jira_project_status`.`name` as `status` \
        FROM `issue`, `jira_issue`, `jira_issue_priority`, `jira_project_status`";

    const JOINS: &str = "(`issue`.`ref_id` = `jira_issue`.`id`) \
        AND (`jira_issue`.`priority_id` = `jira_issue_priority`.`id`) \
        AND (`jira_issue`.`status_id` = `jira_project_status`.`id`)";

    fn report_columns(builder: QueryBuilder) -> QueryBuilder {
        builder
            .count_as(sql::scoped_column(&Issue, "id"), "total")
            .avg_as(
                sql::datediff(
                    sql::now(),
                    sql::from_unixtime(sql::div(sql::scoped_column(&Issue, "created_at"), 1000)),
                ),
                "daysOpen",
            )
            .scoped_column_as(&JiraIssuePriority, "name", "priority")
            .scoped_column_as(&JiraProjectStatus, "name", "status")
    }

    fn report_joins(builder: QueryBuilder) -> QueryBuilder {
        builder
            .join(&Issue, "ref_id", &JiraIssue, "id")
            .join(&JiraIssue, "priority_id", &JiraIssuePriority, "id")
            .join(&JiraIssue, "status_id", &JiraProjectStatus, "id")
    }

    // ========================================
    // Multi-table reports
    // ========================================

    #[test]
    fn test_report_from_filter_fragments() {
        let statement = report_columns(QueryBuilder::new())
            .table(&Issue)
            .table(&JiraIssue)
            .table(&JiraIssuePriority)
            .table(&JiraProjectStatus)
            .filters(vec![
                Filter::new().join(&Issue, "ref_id", &JiraIssue, "id"),
                Filter::new().scoped_eq(&Issue, "ref_type", "REF_TYPE_HERE"),
                Filter::new().join(&JiraIssue, "priority_id", &JiraIssuePriority, "id"),
                Filter::new().join(&JiraIssue, "status_id", &JiraProjectStatus, "id"),
                Filter::new().scoped_eq(&Issue, "state", "STATE_VALUE_HERE"),
                Filter::new().scoped_eq(&Issue, "customer_id", "CUSTOMER_ID_HERE"),
                Filter::new().scoped_eq(&JiraIssue, "issue_type_id", "ISSUE_TYPE_HERE"),
                Filter::new().group_by(["priority", "status"]),
            ])
            .to_sql()
            .unwrap();

        assert_eq!(
            statement.sql,
            format!(
                "{} WHERE (`issue`.`ref_id` = `jira_issue`.`id`) AND (`issue`.`ref_type` = ?) \
                 AND (`jira_issue`.`priority_id` = `jira_issue_priority`.`id`) \
                 AND (`jira_issue`.`status_id` = `jira_project_status`.`id`) \
                 AND (`issue`.`state` = ?) AND (`issue`.`customer_id` = ?) \
                 AND (`jira_issue`.`issue_type_id` = ?) GROUP BY priority, status",
                SELECT_HEAD
            )
        );
        assert_eq!(
            statement.params,
            vec![
                json!("REF_TYPE_HERE"),
                json!("STATE_VALUE_HERE"),
                json!("CUSTOMER_ID_HERE"),
                json!("ISSUE_TYPE_HERE")
            ]
        );
    }

    #[test]
    fn test_report_with_builder_helpers() {
        let statement = report_joins(report_columns(QueryBuilder::new()))
            .scoped_eq(&Issue, "ref_type", "REF_TYPE_HERE")
            .scoped_eq(&Issue, "state", "STATE_VALUE_HERE")
            .scoped_eq(&Issue, "customer_id", "CUSTOMER_ID_HERE")
            .scoped_eq(&JiraIssue, "issue_type_id", "ISSUE_TYPE_HERE")
            .group_by(["priority", "status"])
            .to_sql()
            .unwrap();

        assert_eq!(
            statement.sql,
            format!(
                "{} WHERE {} AND (`issue`.`ref_type` = ?) AND (`issue`.`state` = ?) \
                 AND (`issue`.`customer_id` = ?) AND (`jira_issue`.`issue_type_id` = ?) \
                 GROUP BY priority, status",
                SELECT_HEAD, JOINS
            )
        );
        assert_eq!(
            statement.params,
            vec![
                json!("REF_TYPE_HERE"),
                json!("STATE_VALUE_HERE"),
                json!("CUSTOMER_ID_HERE"),
                json!("ISSUE_TYPE_HERE")
            ]
        );
    }

    #[test]
    fn test_report_with_interleaved_filter() {
        let customer = Filter::new().scoped_eq(&Issue, "customer_id", "CUSTOMER_ID_HERE");
        let statement = report_joins(report_columns(QueryBuilder::new()))
            .filter(customer)
            .scoped_eq(&Issue, "ref_type", "REF_TYPE_HERE")
            .scoped_eq(&Issue, "state", "STATE_VALUE_HERE")
            .scoped_eq(&JiraIssue, "issue_type_id", "ISSUE_TYPE_HERE")
            .group_by(["priority", "status"])
            .to_sql()
            .unwrap();

        assert_eq!(
            statement.sql,
            format!(
                "{} WHERE {} AND (`issue`.`customer_id` = ?) AND (`issue`.`ref_type` = ?) \
                 AND (`issue`.`state` = ?) AND (`jira_issue`.`issue_type_id` = ?) \
                 GROUP BY priority, status",
                SELECT_HEAD, JOINS
            )
        );
        assert_eq!(
            statement.params,
            vec![
                json!("CUSTOMER_ID_HERE"),
                json!("REF_TYPE_HERE"),
                json!("STATE_VALUE_HERE"),
                json!("ISSUE_TYPE_HERE")
            ]
        );
    }

    #[test]
    fn test_context_conditions_lead_where_clause() {
        let context = FilterAugmentation(|entity: Option<&str>| {
            assert_eq!(entity, Some("issue"));
            Filter::new().scoped_eq("issue", "customer_id", "CUSTOMER_ID_HERE")
        });

        let statement = report_joins(report_columns(QueryBuilder::with_context(&context, &Issue)))
            .scoped_eq(&Issue, "ref_type", "REF_TYPE_HERE")
            .scoped_eq(&Issue, "state", "STATE_VALUE_HERE")
            .scoped_eq(&JiraIssue, "issue_type_id", "ISSUE_TYPE_HERE")
            .group_by(["priority", "status"])
            .to_sql()
            .unwrap();

        assert_eq!(
            statement.sql,
            format!(
                "{} WHERE (`issue`.`customer_id` = ?) AND {} AND (`issue`.`ref_type` = ?) \
                 AND (`issue`.`state` = ?) AND (`jira_issue`.`issue_type_id` = ?) \
                 GROUP BY priority, status",
                SELECT_HEAD, JOINS
            )
        );
        assert_eq!(statement.params[0], json!("CUSTOMER_ID_HERE"));
        assert_eq!(statement.params.len(), 4);
    }

    #[test]
    fn test_context_condition_cannot_be_displaced() {
        let context = FilterAugmentation(|_: Option<&str>| {
            Filter::new().scoped_eq("issue", "customer_id", 7)
        });
        let statement = QueryBuilder::with_context(&context, &Issue)
            .scoped_eq(&Issue, "customer_id", 8)
            .to_sql()
            .unwrap();
        assert_eq!(statement.sql, "SELECT * FROM `issue` WHERE `issue`.`customer_id` = ?");
        assert_eq!(statement.params, vec![json!(7)]);
    }

    #[test]
    fn test_unit_context_adds_nothing() {
        let statement = QueryBuilder::with_context(&(), &Issue).to_sql().unwrap();
        assert_eq!(statement.sql, "SELECT * FROM `issue`");
    }

    // ========================================
    // Implicit default table
    // ========================================

    #[test]
    fn test_implicit_table_from_entity() {
        let statement = QueryBuilder::for_entity(&Issue)
            .column("project_id")
            .datediff_as(
                sql::now(),
                sql::max(sql::from_unixtime(sql::div(sql::scoped_column(&Issue, "created_at"), 1000))),
                "days",
            )
            .group_by(["project_id"])
            .to_sql()
            .unwrap();
        assert_eq!(
            statement.sql,
            "SELECT `project_id`, datediff(now(), max(from_unixtime(`issue`.`created_at`/1000))) as `days` \
             FROM `issue` GROUP BY project_id"
        );
    }

    #[test]
    fn test_greater_than_field() {
        let statement = QueryBuilder::for_entity(&Issue)
            .gt("created_at", "1234")
            .to_sql()
            .unwrap();
        assert_eq!(statement.sql, "SELECT * FROM `issue` WHERE `created_at` > ?");
        assert_eq!(statement.params, vec![json!("1234")]);
    }

    #[test]
    fn test_greater_than_with_expressions() {
        let statement = QueryBuilder::for_entity(&Issue)
            .gt(sql::from_unixtime(sql::div("created_at", 1000)), sql::now())
            .to_sql()
            .unwrap();
        assert_eq!(
            statement.sql,
            "SELECT * FROM `issue` WHERE from_unixtime(`created_at`/1000) > now()"
        );
        assert!(statement.params.is_empty());
    }

    #[test]
    fn test_epoch_seconds() {
        let statement = QueryBuilder::for_entity(&Issue).epoch_seconds().to_sql().unwrap();
        assert_eq!(statement.sql, "SELECT UNIX_TIMESTAMP() FROM `issue`");
    }

    #[test]
    fn test_datediff_epoch() {
        let statement = QueryBuilder::for_entity(&Issue)
            .scoped_datediff_epoch(&Issue, "closed_at", "created_at")
            .to_sql()
            .unwrap();
        assert_eq!(
            statement.sql,
            "SELECT datediff(from_unixtime(`issue`.`closed_at`/1000), from_unixtime(`issue`.`created_at`/1000)) \
             FROM `issue`"
        );

        let statement = QueryBuilder::for_entity(&Issue)
            .scoped_datediff_epoch_as(&Issue, "closed_at", "created_at", "time")
            .to_sql()
            .unwrap();
        assert_eq!(
            statement.sql,
            "SELECT datediff(from_unixtime(`issue`.`closed_at`/1000), from_unixtime(`issue`.`created_at`/1000)) \
             as `time` FROM `issue`"
        );
    }

    #[test]
    fn test_date_interval_subtraction() {
        let mut builder = QueryBuilder::for_entity(&Issue)
            .count_as("project_id", "total")
            .scoped_column(&Issue, "project_id")
            .scoped_column(&Issue, "state")
            .avg_as(sql::scoped_datediff_epoch(&Issue, "created_at", "closed_at"), "time_to_close")
            .column("name")
            .join(&Issue, "project_id", &IssueProject, "id")
            .scoped_eq(&Issue, "ref_type", "github")
            .group_by(["project_id", "state", "name"]);
        builder = builder.gt(
            sql::from_unixtime(sql::div(sql::scoped_column(&Issue, "created_at"), 1000)),
            sql::sub(sql::now(), sql::raw("INTERVAL 7 day")),
        );

        let statement = builder.to_sql().unwrap();
        assert_eq!(
            statement.sql,
            "SELECT count(`project_id`) as `total`, `issue`.`project_id`, `issue`.`state`, \
             avg(datediff(from_unixtime(`issue`.`created_at`/1000), from_unixtime(`issue`.`closed_at`/1000))) \
             as `time_to_close`, `name` FROM `issue`, `issue_project` \
             WHERE (`issue`.`project_id` = `issue_project`.`id`) AND (`issue`.`ref_type` = ?) \
             AND (from_unixtime(`issue`.`created_at`/1000) > now()-INTERVAL 7 day) \
             GROUP BY project_id, state, name"
        );
        assert_eq!(statement.params, vec![json!("github")]);
    }

    #[test]
    fn test_recent_issues_for_customer() {
        let statement = QueryBuilder::new()
            .table("issue")
            .eq("customer_id", 42)
            .order_by("created_at", Direction::Descending)
            .limit(10)
            .to_sql()
            .unwrap();
        assert_eq!(
            statement.sql,
            "SELECT * FROM `issue` WHERE `customer_id` = ? ORDER BY `created_at` DESC LIMIT 10"
        );
        assert_eq!(statement.params, vec![json!(42)]);
    }
}
