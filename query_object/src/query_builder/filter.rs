//! Filter data model
//!
//! A [`Filter`] is plain data: groups of conditions plus grouping, ordering
//! and pagination. It can be built fluently, deserialized from JSON, merged
//! into a [`QueryBuilder`](super::QueryBuilder) or compiled on its own with
//! [`SqlGenerator`](super::SqlGenerator).

use super::ordering::{Direction, OrderSpec};
use super::pagination::{Limit, Range};
use super::sql_generation::{CompiledFilter, SqlGenerator};
use crate::errors::QueryResult;
use crate::escape::escape_id;
use crate::expression::{Column, ColumnExpression, Expr, ScopedColumn, ScopedColumnExpression, ToSql};
use crate::nameable::{resolve, Nameable};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Display;

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    #[serde(alias = "EQ")]
    Equal,
    #[serde(alias = "NOT_EQ")]
    NotEqual,
    Null,
    NotNull,
    Greater,
    #[serde(alias = "GREATER_EQ")]
    GreaterOrEqual,
    Less,
    #[serde(alias = "LESS_EQ")]
    LessOrEqual,
    In,
    NotIn,
    Between,
    NotBetween,
    Like,
    NotLike,
    /// The field is a complete preformatted predicate
    #[serde(alias = "JOIN")]
    RawJoin,
}

impl Operator {
    pub fn to_sql(&self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
            Operator::Null => "IS NULL",
            Operator::NotNull => "IS NOT NULL",
            Operator::Greater => ">",
            Operator::GreaterOrEqual => ">=",
            Operator::Less => "<",
            Operator::LessOrEqual => "<=",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
            Operator::Between => "BETWEEN",
            Operator::NotBetween => "NOT BETWEEN",
            Operator::Like => "LIKE",
            Operator::NotLike => "NOT LIKE",
            Operator::RawJoin => "",
        }
    }

    pub fn requires_value(&self) -> bool {
        !matches!(self, Operator::Null | Operator::NotNull | Operator::RawJoin)
    }
}

/// How the conditions of one group are joined
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupOperator {
    #[default]
    And,
    Or,
}

impl GroupOperator {
    pub fn to_sql(&self) -> &'static str {
        match self {
            GroupOperator::And => " AND ",
            GroupOperator::Or => " OR ",
        }
    }
}

/// Left-hand side of a condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Field {
    /// A column name, escaped and qualified on render
    Name(String),
    /// An expression node rendered as is
    Expression(Expr),
}

impl Field {
    /// Text of the field without escaping or qualification
    pub fn text(&self) -> String {
        match self {
            Field::Name(name) => name.clone(),
            Field::Expression(expr) => expr.to_sql(),
        }
    }
}

impl From<&str> for Field {
    fn from(name: &str) -> Self {
        Field::Name(name.to_string())
    }
}

impl From<String> for Field {
    fn from(name: String) -> Self {
        Field::Name(name)
    }
}

impl From<&String> for Field {
    fn from(name: &String) -> Self {
        Field::Name(name.clone())
    }
}

macro_rules! expression_field {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Field {
                fn from(expr: $t) -> Self {
                    Field::Expression(expr.into())
                }
            }
        )*
    };
}

expression_field!(Expr, Column, ColumnExpression, ScopedColumn, ScopedColumnExpression);

/// Right-hand side of a condition
///
/// Bound values become `?` placeholders; expression values are rendered
/// inline and contribute no parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Expression(Expr),
    Bound(Value),
}

macro_rules! bound_value {
    ($($t:ty),*) => {
        $(
            impl From<$t> for ConditionValue {
                fn from(value: $t) -> Self {
                    ConditionValue::Bound(Value::from(value))
                }
            }
        )*
    };
}

bound_value!(
    &str, String, bool, i32, i64, u32, u64, f64,
    Vec<Value>, Vec<&str>, Vec<String>, Vec<i32>, Vec<i64>, Vec<u64>
);

impl From<&String> for ConditionValue {
    fn from(value: &String) -> Self {
        ConditionValue::Bound(Value::String(value.clone()))
    }
}

impl From<Value> for ConditionValue {
    fn from(value: Value) -> Self {
        ConditionValue::Bound(value)
    }
}

macro_rules! expression_value {
    ($($t:ty),*) => {
        $(
            impl From<$t> for ConditionValue {
                fn from(expr: $t) -> Self {
                    ConditionValue::Expression(expr.into())
                }
            }
        )*
    };
}

expression_value!(Expr, Column, ColumnExpression, ScopedColumn, ScopedColumnExpression);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: Field,
    pub operator: Operator,
    #[serde(default)]
    pub value: Option<ConditionValue>,
    /// Qualifies a name field; falls back to the filter's table
    #[serde(default)]
    pub table: Option<String>,
}

impl Condition {
    pub fn new(field: impl Into<Field>, operator: Operator, value: Option<ConditionValue>) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
            table: None,
        }
    }

    /// A preformatted predicate placed into the WHERE clause verbatim
    pub fn raw(predicate: impl Into<String>) -> Self {
        Self::new(Field::Name(predicate.into()), Operator::RawJoin, None)
    }

    /// `` `a`.`x` = `b`.`y` ``
    pub fn join(
        left_table: &(impl Nameable + ?Sized),
        left_column: &str,
        right_table: &(impl Nameable + ?Sized),
        right_column: &str,
    ) -> Self {
        Self::raw(format!(
            "{}.{} = {}.{}",
            escape_id(&resolve(left_table)),
            escape_id(left_column),
            escape_id(&resolve(right_table)),
            escape_id(right_column)
        ))
    }

    pub fn table(mut self, table: &(impl Nameable + ?Sized)) -> Self {
        self.table = Some(resolve(table));
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionGroup {
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub operator: GroupOperator,
}

impl ConditionGroup {
    pub fn all(conditions: Vec<Condition>) -> Self {
        Self {
            conditions,
            operator: GroupOperator::And,
        }
    }

    pub fn any(conditions: Vec<Condition>) -> Self {
        Self {
            conditions,
            operator: GroupOperator::Or,
        }
    }

    pub fn single(condition: Condition) -> Self {
        Self::all(vec![condition])
    }
}

/// WHERE groups plus GROUP BY, ORDER BY and pagination
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(default, alias = "condition")]
    pub groups: Vec<ConditionGroup>,
    /// Default qualifier for name fields
    #[serde(default)]
    pub table: Option<String>,
    /// When set, overrides the operator inside every group of this filter
    #[serde(default)]
    pub operator: Option<GroupOperator>,
    #[serde(default, alias = "groupby")]
    pub group_by: Option<String>,
    #[serde(default)]
    pub order: Vec<OrderSpec>,
    #[serde(default)]
    pub limit: Option<Limit>,
    #[serde(default)]
    pub range: Option<Range>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the conditions inside each of this filter's groups with OR
    pub fn or(mut self) -> Self {
        self.operator = Some(GroupOperator::Or);
        self
    }

    /// Join the conditions inside each of this filter's groups with AND
    pub fn and(mut self) -> Self {
        self.operator = Some(GroupOperator::And);
        self
    }

    pub fn table(mut self, table: &(impl Nameable + ?Sized)) -> Self {
        self.table = Some(resolve(table));
        self
    }

    pub fn push_group(mut self, group: ConditionGroup) -> Self {
        self.groups.push(group);
        self
    }

    pub fn condition(self, condition: Condition) -> Self {
        self.push_group(ConditionGroup::single(condition))
    }

    fn compare(self, field: impl Into<Field>, operator: Operator, value: impl Into<ConditionValue>) -> Self {
        self.condition(Condition::new(field, operator, Some(value.into())))
    }

    fn scoped_compare(
        self,
        table: &(impl Nameable + ?Sized),
        field: impl Into<Field>,
        operator: Operator,
        value: impl Into<ConditionValue>,
    ) -> Self {
        self.condition(Condition::new(field, operator, Some(value.into())).table(table))
    }

    pub fn eq(self, field: impl Into<Field>, value: impl Into<ConditionValue>) -> Self {
        self.compare(field, Operator::Equal, value)
    }

    pub fn neq(self, field: impl Into<Field>, value: impl Into<ConditionValue>) -> Self {
        self.compare(field, Operator::NotEqual, value)
    }

    pub fn gt(self, field: impl Into<Field>, value: impl Into<ConditionValue>) -> Self {
        self.compare(field, Operator::Greater, value)
    }

    pub fn gte(self, field: impl Into<Field>, value: impl Into<ConditionValue>) -> Self {
        self.compare(field, Operator::GreaterOrEqual, value)
    }

    pub fn lt(self, field: impl Into<Field>, value: impl Into<ConditionValue>) -> Self {
        self.compare(field, Operator::Less, value)
    }

    pub fn lte(self, field: impl Into<Field>, value: impl Into<ConditionValue>) -> Self {
        self.compare(field, Operator::LessOrEqual, value)
    }

    /// `field IN (?)` with the whole list bound as one parameter
    pub fn in_list(self, field: impl Into<Field>, values: impl Into<ConditionValue>) -> Self {
        self.compare(field, Operator::In, values)
    }

    pub fn not_in(self, field: impl Into<Field>, values: impl Into<ConditionValue>) -> Self {
        self.compare(field, Operator::NotIn, values)
    }

    pub fn like(self, field: impl Into<Field>, pattern: impl Into<ConditionValue>) -> Self {
        self.compare(field, Operator::Like, pattern)
    }

    pub fn not_like(self, field: impl Into<Field>, pattern: impl Into<ConditionValue>) -> Self {
        self.compare(field, Operator::NotLike, pattern)
    }

    /// Bounds are inlined as escaped literals, not bound
    pub fn between(self, field: impl Into<Field>, low: impl Display, high: impl Display) -> Self {
        self.compare(field, Operator::Between, format!("{} AND {}", low, high))
    }

    pub fn not_between(self, field: impl Into<Field>, low: impl Display, high: impl Display) -> Self {
        self.compare(field, Operator::NotBetween, format!("{} AND {}", low, high))
    }

    pub fn is_null(self, field: impl Into<Field>) -> Self {
        self.condition(Condition::new(field, Operator::Null, None))
    }

    pub fn is_not_null(self, field: impl Into<Field>) -> Self {
        self.condition(Condition::new(field, Operator::NotNull, None))
    }

    pub fn scoped_eq(
        self,
        table: &(impl Nameable + ?Sized),
        field: impl Into<Field>,
        value: impl Into<ConditionValue>,
    ) -> Self {
        self.scoped_compare(table, field, Operator::Equal, value)
    }

    pub fn scoped_neq(
        self,
        table: &(impl Nameable + ?Sized),
        field: impl Into<Field>,
        value: impl Into<ConditionValue>,
    ) -> Self {
        self.scoped_compare(table, field, Operator::NotEqual, value)
    }

    pub fn scoped_gt(
        self,
        table: &(impl Nameable + ?Sized),
        field: impl Into<Field>,
        value: impl Into<ConditionValue>,
    ) -> Self {
        self.scoped_compare(table, field, Operator::Greater, value)
    }

    pub fn scoped_gte(
        self,
        table: &(impl Nameable + ?Sized),
        field: impl Into<Field>,
        value: impl Into<ConditionValue>,
    ) -> Self {
        self.scoped_compare(table, field, Operator::GreaterOrEqual, value)
    }

    pub fn scoped_lt(
        self,
        table: &(impl Nameable + ?Sized),
        field: impl Into<Field>,
        value: impl Into<ConditionValue>,
    ) -> Self {
        self.scoped_compare(table, field, Operator::Less, value)
    }

    pub fn scoped_lte(
        self,
        table: &(impl Nameable + ?Sized),
        field: impl Into<Field>,
        value: impl Into<ConditionValue>,
    ) -> Self {
        self.scoped_compare(table, field, Operator::LessOrEqual, value)
    }

    pub fn scoped_in_list(
        self,
        table: &(impl Nameable + ?Sized),
        field: impl Into<Field>,
        values: impl Into<ConditionValue>,
    ) -> Self {
        self.scoped_compare(table, field, Operator::In, values)
    }

    pub fn scoped_not_in(
        self,
        table: &(impl Nameable + ?Sized),
        field: impl Into<Field>,
        values: impl Into<ConditionValue>,
    ) -> Self {
        self.scoped_compare(table, field, Operator::NotIn, values)
    }

    pub fn scoped_like(
        self,
        table: &(impl Nameable + ?Sized),
        field: impl Into<Field>,
        pattern: impl Into<ConditionValue>,
    ) -> Self {
        self.scoped_compare(table, field, Operator::Like, pattern)
    }

    pub fn scoped_not_like(
        self,
        table: &(impl Nameable + ?Sized),
        field: impl Into<Field>,
        pattern: impl Into<ConditionValue>,
    ) -> Self {
        self.scoped_compare(table, field, Operator::NotLike, pattern)
    }

    pub fn scoped_between(
        self,
        table: &(impl Nameable + ?Sized),
        field: impl Into<Field>,
        low: impl Display,
        high: impl Display,
    ) -> Self {
        self.scoped_compare(table, field, Operator::Between, format!("{} AND {}", low, high))
    }

    pub fn scoped_not_between(
        self,
        table: &(impl Nameable + ?Sized),
        field: impl Into<Field>,
        low: impl Display,
        high: impl Display,
    ) -> Self {
        self.scoped_compare(table, field, Operator::NotBetween, format!("{} AND {}", low, high))
    }

    pub fn scoped_is_null(self, table: &(impl Nameable + ?Sized), field: impl Into<Field>) -> Self {
        self.condition(Condition::new(field, Operator::Null, None).table(table))
    }

    pub fn scoped_is_not_null(self, table: &(impl Nameable + ?Sized), field: impl Into<Field>) -> Self {
        self.condition(Condition::new(field, Operator::NotNull, None).table(table))
    }

    pub fn join(
        self,
        left_table: &(impl Nameable + ?Sized),
        left_column: &str,
        right_table: &(impl Nameable + ?Sized),
        right_column: &str,
    ) -> Self {
        self.condition(Condition::join(left_table, left_column, right_table, right_column))
    }

    /// Appends columns to GROUP BY; the text is used verbatim
    pub fn group_by<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let columns = columns
            .into_iter()
            .map(|c| c.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        if !columns.is_empty() {
            self.append_group_by(&columns);
        }
        self
    }

    fn append_group_by(&mut self, columns: &str) {
        self.group_by = match self.group_by.take() {
            Some(existing) if !existing.is_empty() => Some(format!("{}, {}", existing, columns)),
            _ => Some(columns.to_string()),
        };
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order.push(OrderSpec::new(field, direction));
        self
    }

    pub fn scoped_order_by(
        mut self,
        table: &(impl Nameable + ?Sized),
        field: impl Into<String>,
        direction: Direction,
    ) -> Self {
        self.order.push(OrderSpec::scoped(table, field, direction));
        self
    }

    pub fn limit(mut self, rows: u64) -> Self {
        self.limit = Some(Limit::Rows(rows));
        self
    }

    pub fn unlimited(mut self) -> Self {
        self.limit = Some(Limit::Unlimited);
        self
    }

    pub fn range(mut self, offset: u64, limit: u64) -> Self {
        self.range = Some(Range::new(offset, limit));
        self
    }

    /// Fold `fragment` into this filter.
    ///
    /// Groups are appended, retagged with the fragment's operator when it
    /// has one. The fragment's default table is pinned onto its conditions
    /// so it keeps qualifying them after the merge. GROUP BY text is
    /// appended, ORDER BY entries extend, and pagination replaces ours when
    /// the fragment sets any.
    pub fn merge(&mut self, fragment: Filter) {
        let Filter {
            groups,
            table,
            operator,
            group_by,
            order,
            limit,
            range,
        } = fragment;

        for mut group in groups {
            if let Some(operator) = operator {
                group.operator = operator;
            }
            if let Some(table) = &table {
                for condition in group.conditions.iter_mut() {
                    if condition.table.is_none() && condition.operator != Operator::RawJoin {
                        condition.table = Some(table.clone());
                    }
                }
            }
            self.groups.push(group);
        }

        if let Some(columns) = group_by.filter(|g| !g.is_empty()) {
            self.append_group_by(&columns);
        }
        self.order.extend(order);
        if limit.is_some() || range.is_some() {
            self.limit = limit;
            self.range = range;
        }
    }

    pub fn compile(&self) -> QueryResult<CompiledFilter> {
        SqlGenerator::compile(self)
    }
}
