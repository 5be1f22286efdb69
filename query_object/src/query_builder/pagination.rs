//! LIMIT and LIMIT offset,count

use serde::{Deserialize, Serialize};

/// Plain row limit
///
/// Deserializes from `{"rows": n}` or `"unlimited"`, and from a bare
/// integer where any negative number means no limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "LimitRepr")]
pub enum Limit {
    Rows(u64),
    /// Explicitly no limit; renders nothing
    Unlimited,
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum TaggedLimit {
    Rows(u64),
    Unlimited,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LimitRepr {
    Count(u64),
    Signed(i64),
    Tagged(TaggedLimit),
}

impl From<LimitRepr> for Limit {
    fn from(repr: LimitRepr) -> Self {
        match repr {
            LimitRepr::Count(rows) => Limit::Rows(rows),
            LimitRepr::Signed(rows) => u64::try_from(rows).map_or(Limit::Unlimited, Limit::Rows),
            LimitRepr::Tagged(TaggedLimit::Rows(rows)) => Limit::Rows(rows),
            LimitRepr::Tagged(TaggedLimit::Unlimited) => Limit::Unlimited,
        }
    }
}

impl Limit {
    pub fn to_sql(&self) -> Option<String> {
        match self {
            Limit::Rows(rows) => Some(format!("LIMIT {}", rows)),
            Limit::Unlimited => None,
        }
    }
}

/// Offset window, rendered as `LIMIT offset,count`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub offset: u64,
    pub limit: u64,
}

impl Range {
    pub fn new(offset: u64, limit: u64) -> Self {
        Self { offset, limit }
    }

    pub fn to_sql(&self) -> String {
        format!("LIMIT {},{}", self.offset, self.limit)
    }
}
