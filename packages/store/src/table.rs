//! # Table store: the remote relational API the client talks to
//!
//! [`TableStore`] is the narrow surface of a hosted table service: select with
//! equality filters and an optional ordering, insert returning the stored rows,
//! update and delete by filter, and upsert on a conflict column. Rows travel as
//! [`serde_json::Value`] objects; typed decoding happens one layer up in
//! [`crate::RemoteCollection`].
//!
//! Implementations: [`crate::MemoryTableStore`] here, and the REST client in the
//! `api` crate.

use serde_json::Value;

use crate::error::StoreError;

/// Conjunction of `column = value` conditions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality condition.
    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.conditions.push((column.to_string(), value.into()));
        self
    }

    pub fn conditions(&self) -> &[(String, Value)] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Whether a JSON row satisfies every condition.
    pub fn matches(&self, row: &Value) -> bool {
        self.conditions
            .iter()
            .all(|(column, expected)| row.get(column) == Some(expected))
    }
}

/// Sort instruction for [`TableStore::select`].
#[derive(Clone, Debug, PartialEq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

impl Order {
    pub fn asc(column: &str) -> Self {
        Self {
            column: column.to_string(),
            ascending: true,
        }
    }

    pub fn desc(column: &str) -> Self {
        Self {
            column: column.to_string(),
            ascending: false,
        }
    }
}

/// The operations a table store exposes; used for failure injection and logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    Select,
    Insert,
    Update,
    Delete,
    Upsert,
}

/// Async access to a remote table service.
pub trait TableStore {
    fn select(
        &self,
        table: &str,
        filter: &Filter,
        order: Option<&Order>,
    ) -> impl std::future::Future<Output = Result<Vec<Value>, StoreError>>;
    fn insert(
        &self,
        table: &str,
        rows: Vec<Value>,
    ) -> impl std::future::Future<Output = Result<Vec<Value>, StoreError>>;
    fn update(
        &self,
        table: &str,
        patch: Value,
        filter: &Filter,
    ) -> impl std::future::Future<Output = Result<(), StoreError>>;
    fn delete(
        &self,
        table: &str,
        filter: &Filter,
    ) -> impl std::future::Future<Output = Result<(), StoreError>>;
    fn upsert(
        &self,
        table: &str,
        rows: Vec<Value>,
        conflict_key: &str,
    ) -> impl std::future::Future<Output = Result<(), StoreError>>;
}

/// Render a filter value the way query-string based stores expect it.
pub fn value_to_query(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_matches_all_conditions() {
        let row = json!({ "list_id": 3, "user_id": "u1", "name": "Groceries" });

        assert!(Filter::new().matches(&row));
        assert!(Filter::new().eq("user_id", "u1").eq("list_id", 3).matches(&row));
        assert!(!Filter::new().eq("user_id", "u2").matches(&row));
        assert!(!Filter::new().eq("missing", "x").matches(&row));
    }

    #[test]
    fn test_value_to_query() {
        assert_eq!(value_to_query(&json!("Groceries")), "Groceries");
        assert_eq!(value_to_query(&json!(42)), "42");
        assert_eq!(value_to_query(&json!(true)), "true");
    }
}
