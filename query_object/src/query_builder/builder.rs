//! SELECT statement builder
//!
//! Accumulates a select list, a FROM list and a [`Filter`], then renders a
//! parameterized statement once through [`QueryBuilder::to_sql`].

use crate::errors::{QueryError, QueryResult};
use crate::expression::{AllColumns, Expr, TableRef, ToSql};
use crate::nameable::{resolve, Nameable};
use crate::query_builder::context::QueryContext;
use crate::query_builder::filter::{ConditionValue, Field, Filter};
use crate::query_builder::ordering::Direction;
use crate::query_builder::sql_generation::{CompiledFilter, SqlGenerator};
use crate::sql;
use serde::Serialize;
use serde_json::Value;
use std::fmt::Display;

/// A rendered statement and its placeholder values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Query builder for SELECT statements
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    pub(crate) fields: Vec<Expr>,
    pub(crate) tables: Vec<TableRef>,
    pub(crate) filter: Filter,
    pub(crate) default_table: Option<String>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder whose FROM list falls back to `entity`'s table
    pub fn for_entity(entity: &(impl Nameable + ?Sized)) -> Self {
        Self {
            default_table: Some(resolve(entity)),
            ..Self::default()
        }
    }

    /// Builder scoped by `context`, with `entity` as the default table
    pub fn with_context(context: &(impl QueryContext + ?Sized), entity: &(impl Nameable + ?Sized)) -> Self {
        Self::contextual(context, Some(resolve(entity)))
    }

    /// Builder scoped by `context` with an optional default table
    pub fn contextual(context: &(impl QueryContext + ?Sized), default_table: Option<String>) -> Self {
        let mut builder = Self {
            default_table,
            ..Self::default()
        };
        if let Some(baseline) = context.filter_augmentation(builder.default_table.as_deref()) {
            debug_log!(
                "Applying context filter for {:?}: {} groups",
                builder.default_table,
                baseline.groups.len()
            );
            builder.filter.merge(baseline);
        }
        builder
    }

    // ========================================
    // Select list
    // ========================================

    /// Append any select-list node
    pub fn select(mut self, expr: impl Into<Expr>) -> Self {
        self.fields.push(expr.into());
        self
    }

    pub fn all(self) -> Self {
        self.select(sql::all())
    }

    pub fn all_of<I, T>(self, tables: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Nameable,
    {
        self.select(sql::all_of(tables))
    }

    pub fn column(self, name: impl Into<String>) -> Self {
        self.select(sql::column(name))
    }

    pub fn column_as(self, name: impl Into<String>, alias: impl Into<String>) -> Self {
        self.select(sql::column_as(name, alias))
    }

    pub fn scoped_column(self, table: &(impl Nameable + ?Sized), column: impl Into<String>) -> Self {
        self.select(sql::scoped_column(table, column))
    }

    pub fn scoped_column_as(
        self,
        table: &(impl Nameable + ?Sized),
        column: impl Into<String>,
        alias: impl Into<String>,
    ) -> Self {
        self.select(sql::scoped_column_as(table, column, alias))
    }

    /// Add a function call over argument nodes
    pub fn column_expr<I, E>(self, function: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Expr>,
    {
        self.select(sql::function(function, args))
    }

    /// Add a function call over columns of one table
    pub fn scoped_column_expr<I, S>(
        self,
        function: impl Into<String>,
        table: &(impl Nameable + ?Sized),
        columns: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select(sql::scoped_function(function, table, columns))
    }

    pub fn count(self, arg: impl Into<Expr>) -> Self {
        self.select(sql::count(arg))
    }

    pub fn count_as(self, arg: impl Into<Expr>, alias: impl Into<String>) -> Self {
        self.select(sql::count(arg).alias(alias))
    }

    pub fn count_all(self) -> Self {
        self.select(sql::count_all())
    }

    pub fn sum(self, arg: impl Into<Expr>) -> Self {
        self.select(sql::sum(arg))
    }

    pub fn sum_as(self, arg: impl Into<Expr>, alias: impl Into<String>) -> Self {
        self.select(sql::sum(arg).alias(alias))
    }

    pub fn avg(self, arg: impl Into<Expr>) -> Self {
        self.select(sql::avg(arg))
    }

    pub fn avg_as(self, arg: impl Into<Expr>, alias: impl Into<String>) -> Self {
        self.select(sql::avg(arg).alias(alias))
    }

    pub fn min(self, arg: impl Into<Expr>) -> Self {
        self.select(sql::min(arg))
    }

    pub fn min_as(self, arg: impl Into<Expr>, alias: impl Into<String>) -> Self {
        self.select(sql::min(arg).alias(alias))
    }

    pub fn max(self, arg: impl Into<Expr>) -> Self {
        self.select(sql::max(arg))
    }

    pub fn max_as(self, arg: impl Into<Expr>, alias: impl Into<String>) -> Self {
        self.select(sql::max(arg).alias(alias))
    }

    pub fn datediff(self, a: impl Into<Expr>, b: impl Into<Expr>) -> Self {
        self.select(sql::datediff(a, b))
    }

    pub fn datediff_as(self, a: impl Into<Expr>, b: impl Into<Expr>, alias: impl Into<String>) -> Self {
        self.select(sql::datediff(a, b).alias(alias))
    }

    /// Day difference between two epoch-millisecond values
    pub fn datediff_epoch(self, a: impl Into<Expr>, b: impl Into<Expr>) -> Self {
        self.select(sql::datediff_epoch(a, b))
    }

    pub fn datediff_epoch_as(
        self,
        a: impl Into<Expr>,
        b: impl Into<Expr>,
        alias: impl Into<String>,
    ) -> Self {
        self.select(sql::datediff_epoch(a, b).alias(alias))
    }

    pub fn scoped_datediff_epoch(
        self,
        table: &(impl Nameable + ?Sized),
        a: impl Into<String>,
        b: impl Into<String>,
    ) -> Self {
        self.select(sql::scoped_datediff_epoch(table, a, b))
    }

    pub fn scoped_datediff_epoch_as(
        self,
        table: &(impl Nameable + ?Sized),
        a: impl Into<String>,
        b: impl Into<String>,
        alias: impl Into<String>,
    ) -> Self {
        self.select(sql::scoped_datediff_epoch(table, a, b).alias(alias))
    }

    pub fn now(self) -> Self {
        self.select(sql::now())
    }

    pub fn epoch_seconds(self) -> Self {
        self.select(sql::epoch_seconds())
    }

    pub fn add(self, left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        self.select(sql::add(left, right))
    }

    pub fn sub(self, left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        self.select(sql::sub(left, right))
    }

    pub fn mul(self, left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        self.select(sql::mul(left, right))
    }

    pub fn div(self, left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        self.select(sql::div(left, right))
    }

    pub fn modulo(self, left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        self.select(sql::modulo(left, right))
    }

    // ========================================
    // FROM list
    // ========================================

    /// Add a table to the FROM list
    pub fn table(mut self, table: &(impl Nameable + ?Sized)) -> Self {
        self.register(TableRef::new(table));
        self
    }

    /// Add an aliased table to the FROM list
    pub fn table_as(mut self, table: &(impl Nameable + ?Sized), alias: impl Into<String>) -> Self {
        self.register(TableRef::aliased(table, alias));
        self
    }

    /// Register a FROM entry once.
    ///
    /// An aliased entry takes over the slot of an unaliased entry for the
    /// same table; an unaliased entry is dropped when the table is already
    /// present under an alias.
    fn register(&mut self, table: TableRef) {
        if self.tables.contains(&table) {
            return;
        }
        if table.alias.is_some() {
            let bare = self
                .tables
                .iter()
                .position(|t| t.name == table.name && t.alias.is_none());
            match bare {
                Some(pos) => self.tables[pos] = table,
                None => self.tables.push(table),
            }
        } else if !self.tables.iter().any(|t| t.name == table.name) {
            self.tables.push(table);
        }
    }

    // ========================================
    // Conditions
    // ========================================

    /// Merge a filter fragment
    pub fn filter(mut self, fragment: Filter) -> Self {
        self.filter.merge(fragment);
        self
    }

    /// Merge several filter fragments in order
    pub fn filters(mut self, fragments: impl IntoIterator<Item = Filter>) -> Self {
        for fragment in fragments {
            self.filter.merge(fragment);
        }
        self
    }

    fn scoped(mut self, table: &(impl Nameable + ?Sized), fragment: Filter) -> Self {
        self.register(TableRef::new(table));
        self.filter(fragment)
    }

    pub fn eq(self, field: impl Into<Field>, value: impl Into<ConditionValue>) -> Self {
        self.filter(Filter::new().eq(field, value))
    }

    pub fn neq(self, field: impl Into<Field>, value: impl Into<ConditionValue>) -> Self {
        self.filter(Filter::new().neq(field, value))
    }

    pub fn gt(self, field: impl Into<Field>, value: impl Into<ConditionValue>) -> Self {
        self.filter(Filter::new().gt(field, value))
    }

    pub fn gte(self, field: impl Into<Field>, value: impl Into<ConditionValue>) -> Self {
        self.filter(Filter::new().gte(field, value))
    }

    pub fn lt(self, field: impl Into<Field>, value: impl Into<ConditionValue>) -> Self {
        self.filter(Filter::new().lt(field, value))
    }

    pub fn lte(self, field: impl Into<Field>, value: impl Into<ConditionValue>) -> Self {
        self.filter(Filter::new().lte(field, value))
    }

    pub fn in_list(self, field: impl Into<Field>, values: impl Into<ConditionValue>) -> Self {
        self.filter(Filter::new().in_list(field, values))
    }

    pub fn not_in(self, field: impl Into<Field>, values: impl Into<ConditionValue>) -> Self {
        self.filter(Filter::new().not_in(field, values))
    }

    pub fn like(self, field: impl Into<Field>, pattern: impl Into<ConditionValue>) -> Self {
        self.filter(Filter::new().like(field, pattern))
    }

    pub fn not_like(self, field: impl Into<Field>, pattern: impl Into<ConditionValue>) -> Self {
        self.filter(Filter::new().not_like(field, pattern))
    }

    pub fn between(self, field: impl Into<Field>, low: impl Display, high: impl Display) -> Self {
        self.filter(Filter::new().between(field, low, high))
    }

    pub fn not_between(self, field: impl Into<Field>, low: impl Display, high: impl Display) -> Self {
        self.filter(Filter::new().not_between(field, low, high))
    }

    pub fn is_null(self, field: impl Into<Field>) -> Self {
        self.filter(Filter::new().is_null(field))
    }

    pub fn is_not_null(self, field: impl Into<Field>) -> Self {
        self.filter(Filter::new().is_not_null(field))
    }

    pub fn scoped_eq(
        self,
        table: &(impl Nameable + ?Sized),
        field: impl Into<Field>,
        value: impl Into<ConditionValue>,
    ) -> Self {
        self.scoped(table, Filter::new().scoped_eq(table, field, value))
    }

    pub fn scoped_neq(
        self,
        table: &(impl Nameable + ?Sized),
        field: impl Into<Field>,
        value: impl Into<ConditionValue>,
    ) -> Self {
        self.scoped(table, Filter::new().scoped_neq(table, field, value))
    }

    pub fn scoped_gt(
        self,
        table: &(impl Nameable + ?Sized),
        field: impl Into<Field>,
        value: impl Into<ConditionValue>,
    ) -> Self {
        self.scoped(table, Filter::new().scoped_gt(table, field, value))
    }

    pub fn scoped_gte(
        self,
        table: &(impl Nameable + ?Sized),
        field: impl Into<Field>,
        value: impl Into<ConditionValue>,
    ) -> Self {
        self.scoped(table, Filter::new().scoped_gte(table, field, value))
    }

    pub fn scoped_lt(
        self,
        table: &(impl Nameable + ?Sized),
        field: impl Into<Field>,
        value: impl Into<ConditionValue>,
    ) -> Self {
        self.scoped(table, Filter::new().scoped_lt(table, field, value))
    }

    pub fn scoped_lte(
        self,
        table: &(impl Nameable + ?Sized),
        field: impl Into<Field>,
        value: impl Into<ConditionValue>,
    ) -> Self {
        self.scoped(table, Filter::new().scoped_lte(table, field, value))
    }

    pub fn scoped_in_list(
        self,
        table: &(impl Nameable + ?Sized),
        field: impl Into<Field>,
        values: impl Into<ConditionValue>,
    ) -> Self {
        self.scoped(table, Filter::new().scoped_in_list(table, field, values))
    }

    pub fn scoped_not_in(
        self,
        table: &(impl Nameable + ?Sized),
        field: impl Into<Field>,
        values: impl Into<ConditionValue>,
    ) -> Self {
        self.scoped(table, Filter::new().scoped_not_in(table, field, values))
    }

    pub fn scoped_like(
        self,
        table: &(impl Nameable + ?Sized),
        field: impl Into<Field>,
        pattern: impl Into<ConditionValue>,
    ) -> Self {
        self.scoped(table, Filter::new().scoped_like(table, field, pattern))
    }

    pub fn scoped_not_like(
        self,
        table: &(impl Nameable + ?Sized),
        field: impl Into<Field>,
        pattern: impl Into<ConditionValue>,
    ) -> Self {
        self.scoped(table, Filter::new().scoped_not_like(table, field, pattern))
    }

    pub fn scoped_between(
        self,
        table: &(impl Nameable + ?Sized),
        field: impl Into<Field>,
        low: impl Display,
        high: impl Display,
    ) -> Self {
        self.scoped(table, Filter::new().scoped_between(table, field, low, high))
    }

    pub fn scoped_not_between(
        self,
        table: &(impl Nameable + ?Sized),
        field: impl Into<Field>,
        low: impl Display,
        high: impl Display,
    ) -> Self {
        self.scoped(table, Filter::new().scoped_not_between(table, field, low, high))
    }

    pub fn scoped_is_null(self, table: &(impl Nameable + ?Sized), field: impl Into<Field>) -> Self {
        self.scoped(table, Filter::new().scoped_is_null(table, field))
    }

    pub fn scoped_is_not_null(self, table: &(impl Nameable + ?Sized), field: impl Into<Field>) -> Self {
        self.scoped(table, Filter::new().scoped_is_not_null(table, field))
    }

    /// Equate two columns and add both tables to the FROM list
    pub fn join(
        mut self,
        left_table: &(impl Nameable + ?Sized),
        left_column: &str,
        right_table: &(impl Nameable + ?Sized),
        right_column: &str,
    ) -> Self {
        self.register(TableRef::new(left_table));
        self.register(TableRef::new(right_table));
        self.filter(Filter::new().join(left_table, left_column, right_table, right_column))
    }

    // ========================================
    // Grouping, ordering, pagination
    // ========================================

    pub fn group_by<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.filter = self.filter.group_by(columns);
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.filter = self.filter.order_by(field, direction);
        self
    }

    pub fn scoped_order_by(
        mut self,
        table: &(impl Nameable + ?Sized),
        field: impl Into<String>,
        direction: Direction,
    ) -> Self {
        self.filter = self.filter.scoped_order_by(table, field, direction);
        self
    }

    pub fn limit(mut self, rows: u64) -> Self {
        self.filter = self.filter.limit(rows);
        self
    }

    pub fn unlimited(mut self) -> Self {
        self.filter = self.filter.unlimited();
        self
    }

    /// `LIMIT offset,count`; takes precedence over [`limit`](Self::limit)
    pub fn range(mut self, offset: u64, count: u64) -> Self {
        self.filter = self.filter.range(offset, count);
        self
    }

    // ========================================
    // Rendering
    // ========================================

    /// Compile the accumulated filter without the SELECT head
    pub fn compile_filter(&self) -> QueryResult<CompiledFilter> {
        SqlGenerator::compile(&self.filter)
    }

    /// Render the statement.
    ///
    /// Consumes the builder; fails with [`QueryError::MissingTable`] when no
    /// table was added and no default table was given.
    pub fn to_sql(self) -> QueryResult<Statement> {
        let compiled = SqlGenerator::compile(&self.filter)?;

        let tables = if self.tables.is_empty() {
            match self.default_table {
                Some(name) => vec![TableRef::new(&name)],
                None => return Err(QueryError::MissingTable),
            }
        } else {
            self.tables
        };

        let fields = if self.fields.is_empty() {
            AllColumns {
                tables: tables.iter().map(|t| t.qualifier().to_string()).collect(),
            }
            .to_sql()
        } else {
            self.fields
                .iter()
                .map(ToSql::to_sql)
                .collect::<Vec<_>>()
                .join(", ")
        };

        let from = tables
            .iter()
            .map(ToSql::to_sql)
            .collect::<Vec<_>>()
            .join(", ");

        let sql = format!("SELECT {} FROM {} {}", fields, from, compiled.query)
            .trim()
            .to_string();
        debug_log!("Rendered statement: {} ({} params)", sql, compiled.params.len());

        Ok(Statement {
            sql,
            params: compiled.params,
        })
    }
}
