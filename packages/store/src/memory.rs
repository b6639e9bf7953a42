use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::{Map, Value};

use crate::error::StoreError;
use crate::table::{Filter, Operation, Order, TableStore};

/// In-memory TableStore for tests and for running the UI without a backend.
///
/// Behaves like the hosted store where the client can observe it: serial
/// primary keys are assigned on insert and never reused, equality filters,
/// ascending/descending ordering with nulls last, insertion order otherwise.
#[derive(Clone, Debug)]
pub struct MemoryTableStore {
    inner: Arc<Mutex<Tables>>,
}

#[derive(Debug, Default)]
struct Tables {
    rows: HashMap<String, Vec<Value>>,
    serial_keys: HashMap<String, String>,
    next_ids: HashMap<String, i64>,
    failures: Vec<(String, Operation)>,
    calls: Vec<(String, Operation)>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Default for MemoryTableStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTableStore {
    /// A store with the to-do schema's serial keys (`lists.list_id`, `tasks.task_id`).
    pub fn new() -> Self {
        Self::empty()
            .with_serial_key("lists", "list_id")
            .with_serial_key("tasks", "task_id")
    }

    /// A store without any serial keys registered.
    pub fn empty() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Tables::default())),
        }
    }

    /// Let the store assign `column` on insert when the row omits it.
    pub fn with_serial_key(self, table: &str, column: &str) -> Self {
        {
            let mut tables = lock(&self.inner);
            tables
                .serial_keys
                .insert(table.to_string(), column.to_string());
            tables.next_ids.entry(table.to_string()).or_insert(1);
        }
        self
    }

    /// Make the next `op` against `table` fail with a rejection.
    pub fn fail_next(&self, table: &str, op: Operation) {
        lock(&self.inner).failures.push((table.to_string(), op));
    }

    /// Total number of calls made against the store.
    pub fn calls(&self) -> usize {
        lock(&self.inner).calls.len()
    }

    /// Number of calls of a given kind against one table.
    pub fn calls_to(&self, table: &str, op: Operation) -> usize {
        lock(&self.inner)
            .calls
            .iter()
            .filter(|(t, o)| t == table && *o == op)
            .count()
    }

    /// Every call in the order it was made.
    pub fn call_log(&self) -> Vec<(String, Operation)> {
        lock(&self.inner).calls.clone()
    }

    /// Snapshot of a table's rows, bypassing call accounting.
    pub fn rows(&self, table: &str) -> Vec<Value> {
        lock(&self.inner)
            .rows
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Seed rows directly, assigning serial keys like an insert would.
    pub fn seed(&self, table: &str, rows: Vec<Value>) -> Vec<Value> {
        let mut tables = lock(&self.inner);
        rows.into_iter()
            .map(|row| tables.store_row(table, row))
            .collect()
    }
}

impl Tables {
    fn begin(&mut self, table: &str, op: Operation) -> Result<(), StoreError> {
        self.calls.push((table.to_string(), op));
        if let Some(pos) = self
            .failures
            .iter()
            .position(|(t, o)| t == table && *o == op)
        {
            self.failures.remove(pos);
            return Err(StoreError::Rejected {
                status: 500,
                message: format!("injected {op:?} failure on {table}"),
            });
        }
        Ok(())
    }

    fn store_row(&mut self, table: &str, mut row: Value) -> Value {
        if let (Some(column), Some(obj)) = (self.serial_keys.get(table), row.as_object_mut()) {
            let next = self.next_ids.entry(table.to_string()).or_insert(1);
            match obj.get(column).and_then(Value::as_i64) {
                Some(given) => *next = (*next).max(given + 1),
                None => {
                    obj.insert(column.clone(), Value::from(*next));
                    *next += 1;
                }
            }
        }
        self.rows
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        row
    }
}

fn merge(target: &mut Value, patch: &Value) {
    if let (Some(target), Some(patch)) = (target.as_object_mut(), patch.as_object()) {
        for (key, value) in patch {
            target.insert(key.clone(), value.clone());
        }
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or_default();
            let y = y.as_f64().unwrap_or_default();
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

impl TableStore for MemoryTableStore {
    async fn select(
        &self,
        table: &str,
        filter: &Filter,
        order: Option<&Order>,
    ) -> Result<Vec<Value>, StoreError> {
        let mut tables = lock(&self.inner);
        tables.begin(table, Operation::Select)?;
        let mut rows: Vec<Value> = tables
            .rows
            .get(table)
            .map(|rows| rows.iter().filter(|r| filter.matches(r)).cloned().collect())
            .unwrap_or_default();
        if let Some(order) = order {
            rows.sort_by(|a, b| {
                let ord = compare_values(a.get(&order.column), b.get(&order.column));
                let a_null = a.get(&order.column).map_or(true, Value::is_null);
                let b_null = b.get(&order.column).map_or(true, Value::is_null);
                if order.ascending || a_null || b_null {
                    ord
                } else {
                    ord.reverse()
                }
            });
        }
        Ok(rows)
    }

    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Value>, StoreError> {
        let mut tables = lock(&self.inner);
        tables.begin(table, Operation::Insert)?;
        if rows.iter().any(|r| !r.is_object()) {
            return Err(StoreError::Rejected {
                status: 400,
                message: "rows must be JSON objects".to_string(),
            });
        }
        Ok(rows
            .into_iter()
            .map(|row| tables.store_row(table, row))
            .collect())
    }

    async fn update(&self, table: &str, patch: Value, filter: &Filter) -> Result<(), StoreError> {
        let mut tables = lock(&self.inner);
        tables.begin(table, Operation::Update)?;
        if let Some(rows) = tables.rows.get_mut(table) {
            for row in rows.iter_mut().filter(|r| filter.matches(r)) {
                merge(row, &patch);
            }
        }
        Ok(())
    }

    async fn delete(&self, table: &str, filter: &Filter) -> Result<(), StoreError> {
        let mut tables = lock(&self.inner);
        tables.begin(table, Operation::Delete)?;
        if let Some(rows) = tables.rows.get_mut(table) {
            rows.retain(|r| !filter.matches(r));
        }
        Ok(())
    }

    async fn upsert(
        &self,
        table: &str,
        rows: Vec<Value>,
        conflict_key: &str,
    ) -> Result<(), StoreError> {
        let mut tables = lock(&self.inner);
        tables.begin(table, Operation::Upsert)?;
        for row in rows {
            let position = row.get(conflict_key).and_then(|key| {
                tables
                    .rows
                    .get(table)
                    .and_then(|rows| rows.iter().position(|r| r.get(conflict_key) == Some(key)))
            });
            match position {
                Some(index) => {
                    if let Some(existing) = tables.rows.get_mut(table).and_then(|r| r.get_mut(index)) {
                        merge(existing, &row);
                    }
                }
                None => {
                    let row = if row.is_object() {
                        row
                    } else {
                        Value::Object(Map::new())
                    };
                    tables.store_row(table, row);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_assigns_serial_ids() {
        let store = MemoryTableStore::new();

        let first = store
            .insert("lists", vec![json!({ "name": "A", "user_id": "u1" })])
            .await
            .unwrap();
        let second = store
            .insert("lists", vec![json!({ "name": "B", "user_id": "u1" })])
            .await
            .unwrap();

        assert_eq!(first[0]["list_id"], json!(1));
        assert_eq!(second[0]["list_id"], json!(2));
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let store = MemoryTableStore::new();
        store.seed("lists", vec![json!({ "name": "A" }), json!({ "name": "B" })]);

        store
            .delete("lists", &Filter::new().eq("list_id", 2))
            .await
            .unwrap();
        let rows = store
            .insert("lists", vec![json!({ "name": "C" })])
            .await
            .unwrap();

        assert_eq!(rows[0]["list_id"], json!(3));
    }

    #[tokio::test]
    async fn test_select_filters_and_orders() {
        let store = MemoryTableStore::new();
        store.seed(
            "tasks",
            vec![
                json!({ "task_name": "b", "list_id": 1, "priority": 2 }),
                json!({ "task_name": "a", "list_id": 1, "priority": 1 }),
                json!({ "task_name": "n", "list_id": 1, "priority": null }),
                json!({ "task_name": "x", "list_id": 2, "priority": 0 }),
            ],
        );

        let rows = store
            .select("tasks", &Filter::new().eq("list_id", 1), Some(&Order::asc("priority")))
            .await
            .unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r["task_name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["a", "b", "n"]);

        let rows = store
            .select("tasks", &Filter::new().eq("list_id", 1), Some(&Order::desc("priority")))
            .await
            .unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r["task_name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["b", "a", "n"]);
    }

    #[tokio::test]
    async fn test_update_merges_patch() {
        let store = MemoryTableStore::new();
        store.seed("lists", vec![json!({ "name": "A", "completed": false })]);

        store
            .update("lists", json!({ "completed": true }), &Filter::new().eq("list_id", 1))
            .await
            .unwrap();

        assert_eq!(store.rows("lists")[0]["completed"], json!(true));
        assert_eq!(store.rows("lists")[0]["name"], json!("A"));
    }

    #[tokio::test]
    async fn test_upsert_inserts_then_merges() {
        let store = MemoryTableStore::empty();

        store
            .upsert("profiles", vec![json!({ "id": "u1", "name": "Ada" })], "id")
            .await
            .unwrap();
        store
            .upsert("profiles", vec![json!({ "id": "u1", "email": "a@b.c" })], "id")
            .await
            .unwrap();

        let rows = store.rows("profiles");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], json!("Ada"));
        assert_eq!(rows[0]["email"], json!("a@b.c"));
    }

    #[tokio::test]
    async fn test_injected_failure_fires_once() {
        let store = MemoryTableStore::new();
        store.fail_next("lists", Operation::Select);

        assert!(store.select("lists", &Filter::new(), None).await.is_err());
        assert!(store.select("lists", &Filter::new(), None).await.is_ok());
        assert_eq!(store.calls_to("lists", Operation::Select), 2);
    }
}
