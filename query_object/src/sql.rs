//! Expression helpers
//!
//! Free functions that build [`Expr`] nodes for the select list, for
//! condition fields and for inline condition values.
//!
//! ```
//! use query_object::sql;
//! use query_object::ToSql;
//!
//! let days = sql::datediff(sql::now(), sql::from_unixtime(sql::div("created_at", 1000)));
//! assert_eq!(days.to_sql(), "datediff(now(), from_unixtime(`created_at`/1000))");
//! ```

use crate::expression::{AllColumns, Column, ColumnExpression, Expr, ScopedColumn, ScopedColumnExpression, ToSql};
use crate::nameable::Nameable;

pub fn column(name: impl Into<String>) -> Expr {
    Column::new(name).into()
}

pub fn column_as(name: impl Into<String>, alias: impl Into<String>) -> Expr {
    Column::new(name).alias(alias).into()
}

/// Text inserted verbatim, e.g. `INTERVAL 7 day`
pub fn raw(text: impl Into<String>) -> Expr {
    Column::raw(text).into()
}

pub fn scoped_column(table: &(impl Nameable + ?Sized), column: impl Into<String>) -> Expr {
    ScopedColumn::new(table, column).into()
}

pub fn scoped_column_as(
    table: &(impl Nameable + ?Sized),
    column: impl Into<String>,
    alias: impl Into<String>,
) -> Expr {
    ScopedColumn::new(table, column).alias(alias).into()
}

pub fn function<I, E>(name: impl Into<String>, args: I) -> Expr
where
    I: IntoIterator<Item = E>,
    E: Into<Expr>,
{
    ColumnExpression::new(name, args.into_iter().map(Into::into).collect()).into()
}

fn call(name: &str, args: Vec<Expr>) -> Expr {
    ColumnExpression::new(name, args).into()
}

/// A preformatted function fragment rendered without parentheses
pub fn literal_function(text: impl Into<String>) -> Expr {
    ColumnExpression::literal(text).into()
}

pub fn scoped_function<I, S>(name: impl Into<String>, table: &(impl Nameable + ?Sized), columns: I) -> Expr
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    ScopedColumnExpression::new(name, table, columns).into()
}

pub fn all() -> Expr {
    AllColumns::new().into()
}

pub fn all_of<I, T>(tables: I) -> Expr
where
    I: IntoIterator<Item = T>,
    T: Nameable,
{
    AllColumns::of(tables).into()
}

pub fn count(arg: impl Into<Expr>) -> Expr {
    call("count", vec![arg.into()])
}

pub fn count_all() -> Expr {
    count("*")
}

pub fn sum(arg: impl Into<Expr>) -> Expr {
    call("sum", vec![arg.into()])
}

pub fn avg(arg: impl Into<Expr>) -> Expr {
    call("avg", vec![arg.into()])
}

pub fn min(arg: impl Into<Expr>) -> Expr {
    call("min", vec![arg.into()])
}

pub fn max(arg: impl Into<Expr>) -> Expr {
    call("max", vec![arg.into()])
}

pub fn now() -> Expr {
    call("now", Vec::new())
}

pub fn from_unixtime(arg: impl Into<Expr>) -> Expr {
    call("from_unixtime", vec![arg.into()])
}

pub fn datediff(a: impl Into<Expr>, b: impl Into<Expr>) -> Expr {
    call("datediff", vec![a.into(), b.into()])
}

/// Current time in epoch seconds: `UNIX_TIMESTAMP()`
pub fn epoch_seconds() -> Expr {
    literal_function("UNIX_TIMESTAMP()")
}

/// Day difference between two epoch-millisecond columns
pub fn datediff_epoch(a: impl Into<Expr>, b: impl Into<Expr>) -> Expr {
    datediff(from_unixtime(div(a, 1000)), from_unixtime(div(b, 1000)))
}

pub fn scoped_datediff_epoch(
    table: &(impl Nameable + ?Sized),
    a: impl Into<String>,
    b: impl Into<String>,
) -> Expr {
    datediff_epoch(scoped_column(table, a), scoped_column(table, b))
}

fn arithmetic(left: impl Into<Expr>, op: char, right: impl Into<Expr>) -> Expr {
    let (left, right): (Expr, Expr) = (left.into(), right.into());
    raw(format!("{}{}{}", left.to_sql(), op, right.to_sql()))
}

pub fn add(left: impl Into<Expr>, right: impl Into<Expr>) -> Expr {
    arithmetic(left, '+', right)
}

pub fn sub(left: impl Into<Expr>, right: impl Into<Expr>) -> Expr {
    arithmetic(left, '-', right)
}

pub fn mul(left: impl Into<Expr>, right: impl Into<Expr>) -> Expr {
    arithmetic(left, '*', right)
}

pub fn div(left: impl Into<Expr>, right: impl Into<Expr>) -> Expr {
    arithmetic(left, '/', right)
}

pub fn modulo(left: impl Into<Expr>, right: impl Into<Expr>) -> Expr {
    arithmetic(left, '%', right)
}
