//! Per-request scoping hook
//!
//! A context is consulted once when a builder is created. Its baseline
//! filter is merged first, so its conditions lead the WHERE clause and
//! cannot be displaced by conditions added later.

use super::filter::Filter;

pub trait QueryContext {
    /// Baseline filter for statements whose default table is `entity`
    fn filter_augmentation(&self, _entity: Option<&str>) -> Option<Filter> {
        None
    }
}

/// No scoping
impl QueryContext for () {}

/// Adapts a closure into a [`QueryContext`]
///
/// ```
/// use query_object::{FilterAugmentation, Filter, QueryBuilder};
///
/// let tenant = FilterAugmentation(|_: Option<&str>| Filter::new().eq("customer_id", 7));
/// let statement = QueryBuilder::with_context(&tenant, "issue").to_sql().unwrap();
/// assert_eq!(statement.sql, "SELECT * FROM `issue` WHERE `customer_id` = ?");
/// ```
pub struct FilterAugmentation<F>(pub F);

impl<F> QueryContext for FilterAugmentation<F>
where
    F: Fn(Option<&str>) -> Filter,
{
    fn filter_augmentation(&self, entity: Option<&str>) -> Option<Filter> {
        Some((self.0)(entity))
    }
}
