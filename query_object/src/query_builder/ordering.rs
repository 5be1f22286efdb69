//! ORDER BY entries

use crate::escape::escape_id;
use crate::nameable::{resolve, Nameable};
use serde::{Deserialize, Serialize};

/// Sort direction; ascending unless stated otherwise
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

impl Direction {
    pub fn to_sql(&self) -> &'static str {
        match self {
            Direction::Ascending => "ASC",
            Direction::Descending => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSpec {
    pub field: String,
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default)]
    pub direction: Direction,
}

impl OrderSpec {
    pub fn new(field: impl Into<String>, direction: Direction) -> Self {
        Self {
            field: field.into(),
            table: None,
            direction,
        }
    }

    pub fn scoped(table: &(impl Nameable + ?Sized), field: impl Into<String>, direction: Direction) -> Self {
        Self {
            field: field.into(),
            table: Some(resolve(table)),
            direction,
        }
    }

    pub fn to_sql(&self) -> String {
        match &self.table {
            Some(table) => format!(
                "{}.{} {}",
                escape_id(table),
                escape_id(&self.field),
                self.direction.to_sql()
            ),
            None => format!("{} {}", escape_id(&self.field), self.direction.to_sql()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_default_is_ascending() {
        assert_eq!(Direction::default(), Direction::Ascending);
        let order: OrderSpec = serde_json::from_value(serde_json::json!({"field": "foo"})).unwrap();
        assert_eq!(order.to_sql(), "`foo` ASC");
    }

    #[test]
    fn test_scoped_order() {
        assert_eq!(
            OrderSpec::scoped("issue", "created_at", Direction::Descending).to_sql(),
            "`issue`.`created_at` DESC"
        );
    }
}
