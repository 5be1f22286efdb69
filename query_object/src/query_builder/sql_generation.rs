//! Filter compilation
//!
//! Turns a [`Filter`] into a `WHERE ... GROUP BY ... ORDER BY ... LIMIT ...`
//! tail with `?` placeholders and the ordered parameter list.

use crate::errors::{QueryError, QueryResult};
use crate::escape::{escape, escape_id};
use crate::expression::ToSql;
use crate::query_builder::filter::{
    Condition, ConditionGroup, ConditionValue, Field, Filter, Operator,
};
use crate::query_builder::pagination::{Limit, Range};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Clause text plus the values for its placeholders, in order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompiledFilter {
    pub query: String,
    pub params: Vec<Value>,
}

pub struct SqlGenerator;

impl SqlGenerator {
    pub fn compile(filter: &Filter) -> QueryResult<CompiledFilter> {
        let mut params = Vec::new();
        let mut clauses = Vec::new();

        let where_clause = Self::build_where_clause(filter, &mut params)?;
        if !where_clause.is_empty() {
            clauses.push(format!("WHERE {}", where_clause));
        }

        if let Some(group_by) = filter.group_by.as_deref().filter(|g| !g.is_empty()) {
            clauses.push(format!("GROUP BY {}", group_by));
        }

        if !filter.order.is_empty() {
            let order = filter
                .order
                .iter()
                .map(|o| o.to_sql())
                .collect::<Vec<_>>()
                .join(", ");
            clauses.push(format!("ORDER BY {}", order));
        }

        if let Some(limit) = Self::build_limit_clause(filter.limit, filter.range) {
            clauses.push(limit);
        }

        let query = clauses.join(" ").trim().to_string();
        trace_log!("Compiled filter: {} ({} params)", query, params.len());

        Ok(CompiledFilter { query, params })
    }

    /// Render every group, skipping conditions whose text was already
    /// emitted. A filter-level operator overrides each group's own. Groups
    /// are parenthesized only when there is more than one.
    fn build_where_clause(filter: &Filter, params: &mut Vec<Value>) -> QueryResult<String> {
        let mut seen = HashSet::new();
        let mut groups = Vec::new();

        for group in &filter.groups {
            let mut rendered = Vec::new();
            for condition in &group.conditions {
                let (text, param) = Self::build_condition_sql(condition, filter.table.as_deref())?;
                if text.is_empty() || !seen.insert(text.clone()) {
                    continue;
                }
                rendered.push(text);
                if let Some(param) = param {
                    params.push(param);
                }
            }
            if !rendered.is_empty() {
                let operator = filter.operator.unwrap_or(group.operator);
                groups.push(rendered.join(operator.to_sql()));
            }
        }

        Ok(match groups.len() {
            0 => String::new(),
            1 => groups.remove(0),
            _ => groups
                .iter()
                .map(|g| format!("({})", g))
                .collect::<Vec<_>>()
                .join(" AND "),
        })
    }

    fn build_condition_sql(
        condition: &Condition,
        default_table: Option<&str>,
    ) -> QueryResult<(String, Option<Value>)> {
        let operator = condition.operator;
        if operator == Operator::RawJoin {
            return Ok((condition.field.text(), None));
        }

        let field = Self::build_field_sql(
            &condition.field,
            condition.table.as_deref().or(default_table),
        );

        if !operator.requires_value() {
            return Ok((format!("{} {}", field, operator.to_sql()), None));
        }

        let value = condition
            .value
            .as_ref()
            .ok_or_else(|| QueryError::missing_value(condition.field.text(), operator))?;

        match operator {
            Operator::Between | Operator::NotBetween => {
                let range = match value {
                    ConditionValue::Bound(Value::String(text)) => text.clone(),
                    ConditionValue::Expression(expr) => expr.to_sql(),
                    ConditionValue::Bound(other) => {
                        return Err(QueryError::MalformedRange(other.to_string()));
                    }
                };
                let (low, high) = Self::split_range(&range)?;
                Ok((
                    format!("{} {} {} AND {}", field, operator.to_sql(), escape(low), escape(high)),
                    None,
                ))
            }
            Operator::In | Operator::NotIn => match value {
                ConditionValue::Bound(value) => {
                    Ok((format!("{} {} (?)", field, operator.to_sql()), Some(value.clone())))
                }
                ConditionValue::Expression(expr) => Ok((
                    format!("{} {} ({})", field, operator.to_sql(), expr.to_sql()),
                    None,
                )),
            },
            _ => match value {
                ConditionValue::Bound(value) => {
                    Ok((format!("{} {} ?", field, operator.to_sql()), Some(value.clone())))
                }
                ConditionValue::Expression(expr) => Ok((
                    format!("{} {} {}", field, operator.to_sql(), expr.to_sql()),
                    None,
                )),
            },
        }
    }

    fn build_field_sql(field: &Field, table: Option<&str>) -> String {
        match (field, table) {
            (Field::Name(name), Some(table)) => format!("{}.{}", escape_id(table), escape_id(name)),
            (Field::Name(name), None) => escape_id(name),
            (Field::Expression(expr), _) => expr.to_sql(),
        }
    }

    /// `"low AND high"` with exactly one separator
    fn split_range(range: &str) -> QueryResult<(&str, &str)> {
        match range.split_once(" AND ") {
            Some((low, high)) if !high.contains(" AND ") => Ok((low.trim(), high.trim())),
            _ => Err(QueryError::MalformedRange(range.to_string())),
        }
    }

    fn build_limit_clause(limit: Option<Limit>, range: Option<Range>) -> Option<String> {
        match (range, limit) {
            (Some(range), _) => Some(range.to_sql()),
            (None, Some(limit)) => limit.to_sql(),
            (None, None) => None,
        }
    }

    /// Compile `filter` with `key = value` placed in front of its groups
    pub fn prepend(
        mut filter: Filter,
        key: impl Into<Field>,
        value: impl Into<ConditionValue>,
    ) -> QueryResult<CompiledFilter> {
        let condition = Condition::new(key, Operator::Equal, Some(value.into()));
        filter.groups.insert(0, ConditionGroup::single(condition));
        Self::compile(&filter)
    }

    /// Compile `filter` with each fragment added as a verbatim predicate.
    /// A `group_by` replaces whatever the filter already groups by.
    pub fn from_raw_join_fragments<I, S>(
        mut filter: Filter,
        fragments: I,
        group_by: Option<&str>,
    ) -> QueryResult<CompiledFilter>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for fragment in fragments {
            filter
                .groups
                .push(ConditionGroup::single(Condition::raw(fragment)));
        }
        if let Some(group_by) = group_by {
            filter.group_by = Some(group_by.to_string());
        }
        Self::compile(&filter)
    }

    /// Pair comma-separated columns positionally and compile the pairs into
    /// the filter as one AND group of equi-join predicates.
    ///
    /// Each side is qualified by its table, falling back to the filter's
    /// table. With `params`, every pair also gets a bound equality on the
    /// right column, `right_table.r = params[r]`; a missing key fails with
    /// [`QueryError::MissingValue`].
    pub fn join_with_params(
        mut filter: Filter,
        left: &str,
        right: &str,
        left_table: Option<&str>,
        right_table: Option<&str>,
        params: Option<&Map<String, Value>>,
    ) -> QueryResult<CompiledFilter> {
        let left_columns = split_columns(left);
        let right_columns = split_columns(right);
        if left_columns.len() != right_columns.len() {
            return Err(QueryError::JoinColumnMismatch {
                left: left_columns.len(),
                right: right_columns.len(),
            });
        }

        let left_table = left_table.or(filter.table.as_deref()).map(str::to_string);
        let right_table = right_table.or(filter.table.as_deref()).map(str::to_string);

        let mut conditions = Vec::with_capacity(left_columns.len() * 2);
        for (l, r) in left_columns.iter().zip(right_columns.iter()) {
            conditions.push(Condition::raw(format!(
                "{} = {}",
                qualified(left_table.as_deref(), l),
                qualified(right_table.as_deref(), r)
            )));

            if let Some(params) = params {
                let value = params
                    .get(*r)
                    .ok_or_else(|| QueryError::missing_value(*r, Operator::Equal))?;
                let mut condition = Condition::new(
                    *r,
                    Operator::Equal,
                    Some(ConditionValue::Bound(value.clone())),
                );
                condition.table = right_table.clone();
                conditions.push(condition);
            }
        }
        filter.groups.push(ConditionGroup::all(conditions));

        Self::compile(&filter)
    }

    pub fn join(
        filter: Filter,
        left: &str,
        right: &str,
        left_table: Option<&str>,
        right_table: Option<&str>,
    ) -> QueryResult<CompiledFilter> {
        Self::join_with_params(filter, left, right, left_table, right_table, None)
    }
}

fn split_columns(columns: &str) -> Vec<&str> {
    columns
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect()
}

fn qualified(table: Option<&str>, column: &str) -> String {
    match table {
        Some(table) => format!("{}.{}", escape_id(table), escape_id(column)),
        None => escape_id(column),
    }
}
