//! # Remote collection sync: user-scoped rows with a local cache
//!
//! [`RemoteCollection`] keeps a local, discardable copy of the rows of one
//! table that belong to a [`Scope`] (owner user id, plus a parent id for child
//! tables) and mirrors every mutation to a [`TableStore`]. The remote store is
//! authoritative: [`load`](RemoteCollection::load) replaces the whole cache.
//!
//! ## Record contract
//!
//! A row type opts in by implementing [`Record`]: table name, primary key,
//! owner and optional parent column, optional ordering column, dependent
//! tables that must be deleted first, and an insert [`Draft`] type whose
//! required text field is validated before anything is sent.
//!
//! ## Operations
//!
//! | Method | Remote calls | Local effect |
//! |--------|--------------|--------------|
//! | [`load`](RemoteCollection::load) | one select | replaces the cache, remembers the scope |
//! | [`create`](RemoteCollection::create) | one insert (none when validation fails) | inserts the returned row by ordering key |
//! | [`toggle_completion`](RemoteCollection::toggle_completion) | one update | flips first, rolls back if the update fails |
//! | [`remove`](RemoteCollection::remove) | one delete per dependent table, then one delete | drops exactly the removed row |
//! | [`reorder_adjacent`](RemoteCollection::reorder_adjacent) | none | swaps two neighbours |
//!
//! Every remote-touching operation takes the collection's in-flight lock, so
//! calls fired concurrently against the same collection run one after another
//! instead of interleaving. Nothing is retried.
//!
//! The handle is cheap to clone; clones share the cache, the lock and the
//! observers. It is meant for a single-threaded UI loop and is not `Send`.

use std::cell::RefCell;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tokio::sync::Mutex;

use crate::error::SyncError;
use crate::models::{NewList, NewTask, Task, TodoList, UserId};
use crate::table::{Filter, Order, TableStore};

/// A table whose rows are deleted before the parent row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dependent {
    pub table: &'static str,
    pub foreign_key: &'static str,
}

/// Insert payload of a [`Record`].
pub trait Draft: Serialize + Clone {
    /// The text field that must be non-empty after trimming.
    fn required_text(&self) -> &str;
    /// Copy with leading/trailing whitespace removed, as it will be sent.
    fn normalized(&self) -> Self;
    fn owner(&self) -> &UserId;
    fn parent(&self) -> Option<i64> {
        None
    }
}

/// A row type that can be synchronized by [`RemoteCollection`].
pub trait Record: Clone + Serialize + DeserializeOwned + 'static {
    type Draft: Draft;

    const TABLE: &'static str;
    const PRIMARY_KEY: &'static str;
    const OWNER_KEY: &'static str = "user_id";
    const PARENT_KEY: Option<&'static str> = None;
    const ORDER_BY: Option<&'static str> = None;
    /// Reject drafts whose name is already used within the scope.
    const UNIQUE_NAME: bool = false;
    const DEPENDENTS: &'static [Dependent] = &[];
    /// Human readable singular, used in validation messages.
    const NOUN: &'static str;

    fn id(&self) -> i64;
    fn owner(&self) -> &UserId;
    fn name(&self) -> &str;
    fn completed(&self) -> bool;
    fn set_completed(&mut self, completed: bool);
    /// Ordering key for [`Record::ORDER_BY`]. `None` sorts after every
    /// `Some`, matching the store's nulls-last ascending order.
    fn sort_key(&self) -> Option<i64> {
        None
    }
}

/// Ascending comparison with `None` last.
fn nulls_last(a: Option<i64>, b: Option<i64>) -> std::cmp::Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    }
}

/// The owner (and parent) a collection operation is restricted to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scope {
    pub user_id: UserId,
    pub parent: Option<i64>,
}

impl Scope {
    pub fn user(user_id: UserId) -> Self {
        Self {
            user_id,
            parent: None,
        }
    }

    pub fn child(user_id: UserId, parent: i64) -> Self {
        Self {
            user_id,
            parent: Some(parent),
        }
    }

    fn filter<R: Record>(&self) -> Filter {
        let filter = Filter::new().eq(R::OWNER_KEY, self.user_id.as_str());
        match (R::PARENT_KEY, self.parent) {
            (Some(column), Some(parent)) => filter.eq(column, parent),
            _ => filter,
        }
    }
}

/// Direction for [`RemoteCollection::reorder_adjacent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

type Observer<R> = Rc<dyn Fn(&[R])>;

struct CollectionState<R> {
    scope: Option<Scope>,
    rows: Vec<R>,
}

/// Local cache of one scoped collection, kept in sync with a [`TableStore`].
pub struct RemoteCollection<S, R: Record> {
    store: S,
    state: Rc<RefCell<CollectionState<R>>>,
    in_flight: Rc<Mutex<()>>,
    observers: Rc<RefCell<Vec<Observer<R>>>>,
}

impl<S: Clone, R: Record> Clone for RemoteCollection<S, R> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            state: self.state.clone(),
            in_flight: self.in_flight.clone(),
            observers: self.observers.clone(),
        }
    }
}

pub type ListCollection<S> = RemoteCollection<S, TodoList>;
pub type TaskCollection<S> = RemoteCollection<S, Task>;

impl<S: TableStore, R: Record> RemoteCollection<S, R> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            state: Rc::new(RefCell::new(CollectionState {
                scope: None,
                rows: Vec::new(),
            })),
            in_flight: Rc::new(Mutex::new(())),
            observers: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Snapshot of the cached rows, in display order.
    pub fn rows(&self) -> Vec<R> {
        self.state.borrow().rows.clone()
    }

    pub fn get(&self, id: i64) -> Option<R> {
        self.state.borrow().rows.iter().find(|r| r.id() == id).cloned()
    }

    /// Scope of the last successful [`load`](Self::load).
    pub fn scope(&self) -> Option<Scope> {
        self.state.borrow().scope.clone()
    }

    /// Forget the cached rows and the scope.
    pub fn clear(&self) {
        {
            let mut state = self.state.borrow_mut();
            state.rows.clear();
            state.scope = None;
        }
        self.notify();
    }

    /// Register a callback run after every change to the cached rows.
    pub fn observe(&self, observer: impl Fn(&[R]) + 'static) {
        self.observers.borrow_mut().push(Rc::new(observer));
    }

    fn notify(&self) {
        let rows = self.rows();
        let observers: Vec<Observer<R>> = self.observers.borrow().clone();
        for observer in observers {
            observer(&rows);
        }
    }

    /// Fetch every row in `scope` and replace the cache with them.
    pub async fn load(&self, scope: Scope) -> Result<Vec<R>, SyncError> {
        let _guard = self.in_flight.lock().await;

        let order = R::ORDER_BY.map(Order::asc);
        let raw = self
            .store
            .select(R::TABLE, &scope.filter::<R>(), order.as_ref())
            .await
            .map_err(|e| {
                tracing::error!(table = R::TABLE, "Error fetching rows: {e}");
                SyncError::from(e)
            })?;

        let mut rows = Vec::with_capacity(raw.len());
        for value in raw {
            let row: R = serde_json::from_value(value)?;
            if row.owner() != &scope.user_id {
                tracing::warn!(
                    table = R::TABLE,
                    id = row.id(),
                    "Dropping row owned by another user"
                );
                continue;
            }
            rows.push(row);
        }

        {
            let mut state = self.state.borrow_mut();
            state.scope = Some(scope);
            state.rows = rows.clone();
        }
        self.notify();
        Ok(rows)
    }

    /// Insert a new row built from `draft` and add the stored row to the cache.
    pub async fn create(&self, draft: R::Draft) -> Result<R, SyncError> {
        let draft = draft.normalized();
        if draft.required_text().is_empty() {
            return Err(SyncError::Validation(format!(
                "{} name must not be empty",
                R::NOUN
            )));
        }

        let _guard = self.in_flight.lock().await;

        let scope = self
            .scope()
            .ok_or_else(|| SyncError::Validation("missing scope".to_string()))?;
        if draft.owner() != &scope.user_id
            || (R::PARENT_KEY.is_some() && draft.parent() != scope.parent)
        {
            return Err(SyncError::Validation(format!(
                "{} does not belong to the loaded scope",
                R::NOUN
            )));
        }
        if R::UNIQUE_NAME {
            let taken = self
                .state
                .borrow()
                .rows
                .iter()
                .any(|r| r.name() == draft.required_text());
            if taken {
                return Err(SyncError::Validation(format!(
                    "a {} named \"{}\" already exists",
                    R::NOUN,
                    draft.required_text()
                )));
            }
        }

        let payload = serde_json::to_value(&draft)?;
        let inserted = self
            .store
            .insert(R::TABLE, vec![payload])
            .await
            .map_err(|e| {
                tracing::error!(table = R::TABLE, "Error adding row: {e}");
                SyncError::from(e)
            })?;
        let value = inserted
            .into_iter()
            .next()
            .ok_or_else(|| SyncError::Remote(format!("{} insert returned no row", R::TABLE)))?;
        let row: R = serde_json::from_value(value)?;

        {
            let mut state = self.state.borrow_mut();
            let position = if R::ORDER_BY.is_some() {
                state
                    .rows
                    .iter()
                    .position(|r| nulls_last(r.sort_key(), row.sort_key()).is_gt())
                    .unwrap_or(state.rows.len())
            } else {
                state.rows.len()
            };
            state.rows.insert(position, row.clone());
        }
        self.notify();
        Ok(row)
    }

    /// Flip the completed flag of a cached row and persist it.
    ///
    /// The flag changes locally before the update is sent and is restored if
    /// the store rejects it. Returns the new flag value.
    pub async fn toggle_completion(&self, id: i64) -> Result<bool, SyncError> {
        let _guard = self.in_flight.lock().await;

        let (completed, owner) = {
            let mut state = self.state.borrow_mut();
            let Some(row) = state.rows.iter_mut().find(|r| r.id() == id) else {
                return Err(SyncError::Validation(format!("unknown {} {id}", R::NOUN)));
            };
            let completed = !row.completed();
            row.set_completed(completed);
            (completed, row.owner().clone())
        };
        self.notify();

        let filter = Filter::new()
            .eq(R::PRIMARY_KEY, id)
            .eq(R::OWNER_KEY, owner.as_str());
        let result = self
            .store
            .update(R::TABLE, json!({ "completed": completed }), &filter)
            .await;

        match result {
            Ok(()) => Ok(completed),
            Err(e) => {
                tracing::error!(table = R::TABLE, id, "Error updating completion status: {e}");
                if let Some(row) = self
                    .state
                    .borrow_mut()
                    .rows
                    .iter_mut()
                    .find(|r| r.id() == id)
                {
                    row.set_completed(!completed);
                }
                self.notify();
                Err(e.into())
            }
        }
    }

    /// Delete a row and its dependents, then drop it from the cache.
    ///
    /// Dependent tables are cleared first; if any of those deletes fails the
    /// row itself is left in place.
    pub async fn remove(&self, id: i64) -> Result<(), SyncError> {
        let _guard = self.in_flight.lock().await;

        let scope = self
            .scope()
            .ok_or_else(|| SyncError::Validation("missing scope".to_string()))?;
        let owner = scope.user_id.as_str();

        for dependent in R::DEPENDENTS {
            let filter = Filter::new()
                .eq(dependent.foreign_key, id)
                .eq(R::OWNER_KEY, owner);
            self.store
                .delete(dependent.table, &filter)
                .await
                .map_err(|e| {
                    tracing::error!(table = dependent.table, parent = id, "Error deleting dependents: {e}");
                    SyncError::from(e)
                })?;
        }

        let filter = Filter::new().eq(R::PRIMARY_KEY, id).eq(R::OWNER_KEY, owner);
        self.store.delete(R::TABLE, &filter).await.map_err(|e| {
            tracing::error!(table = R::TABLE, id, "Error deleting row: {e}");
            SyncError::from(e)
        })?;

        self.state.borrow_mut().rows.retain(|r| r.id() != id);
        self.notify();
        Ok(())
    }

    /// Swap the row at `index` with its neighbour. Local only, never persisted.
    ///
    /// Returns `false` when there is no neighbour in that direction.
    pub fn reorder_adjacent(&self, index: usize, direction: Direction) -> bool {
        let swapped = {
            let mut state = self.state.borrow_mut();
            let other = match direction {
                Direction::Up => index.checked_sub(1),
                Direction::Down => index.checked_add(1),
            };
            match other {
                Some(other) if index < state.rows.len() && other < state.rows.len() => {
                    state.rows.swap(index, other);
                    true
                }
                _ => false,
            }
        };
        if swapped {
            self.notify();
        }
        swapped
    }
}

impl Draft for NewList {
    fn required_text(&self) -> &str {
        &self.name
    }

    fn normalized(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            user_id: self.user_id.clone(),
        }
    }

    fn owner(&self) -> &UserId {
        &self.user_id
    }
}

impl Record for TodoList {
    type Draft = NewList;

    const TABLE: &'static str = "lists";
    const PRIMARY_KEY: &'static str = "list_id";
    const UNIQUE_NAME: bool = true;
    const DEPENDENTS: &'static [Dependent] = &[Dependent {
        table: "tasks",
        foreign_key: "list_id",
    }];
    const NOUN: &'static str = "list";

    fn id(&self) -> i64 {
        self.list_id
    }

    fn owner(&self) -> &UserId {
        &self.user_id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn completed(&self) -> bool {
        self.completed
    }

    fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
    }
}

impl Draft for NewTask {
    fn required_text(&self) -> &str {
        &self.task_name
    }

    fn normalized(&self) -> Self {
        Self {
            task_name: self.task_name.trim().to_string(),
            description: self
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            list_id: self.list_id,
            user_id: self.user_id.clone(),
        }
    }

    fn owner(&self) -> &UserId {
        &self.user_id
    }

    fn parent(&self) -> Option<i64> {
        Some(self.list_id)
    }
}

impl Record for Task {
    type Draft = NewTask;

    const TABLE: &'static str = "tasks";
    const PRIMARY_KEY: &'static str = "task_id";
    const PARENT_KEY: Option<&'static str> = Some("list_id");
    const ORDER_BY: Option<&'static str> = Some("priority");
    const NOUN: &'static str = "task";

    fn id(&self) -> i64 {
        self.task_id
    }

    fn owner(&self) -> &UserId {
        &self.user_id
    }

    fn name(&self) -> &str {
        &self.task_name
    }

    fn completed(&self) -> bool {
        self.completed
    }

    fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
    }

    fn sort_key(&self) -> Option<i64> {
        self.priority
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::memory::MemoryTableStore;
    use crate::table::Operation;

    fn user(id: &str) -> UserId {
        UserId::from(id)
    }

    fn new_list(name: &str, owner: &str) -> NewList {
        NewList {
            name: name.to_string(),
            user_id: user(owner),
        }
    }

    async fn loaded_lists(store: &MemoryTableStore, owner: &str) -> ListCollection<MemoryTableStore> {
        let lists = ListCollection::new(store.clone());
        lists.load(Scope::user(user(owner))).await.unwrap();
        lists
    }

    #[tokio::test]
    async fn test_create_appends_one_row_with_fresh_id() {
        let store = MemoryTableStore::new();
        store.seed(
            "lists",
            vec![
                json!({ "name": "Work", "user_id": "u1" }),
                json!({ "name": "Home", "user_id": "u1" }),
            ],
        );
        let lists = loaded_lists(&store, "u1").await;

        let created = lists.create(new_list("  Groceries ", "u1")).await.unwrap();

        let rows = lists.rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows.last().unwrap(), &created);
        assert_eq!(created.name, "Groceries");
        assert!(!created.completed);
        assert!(rows[..2].iter().all(|r| r.list_id != created.list_id));
    }

    #[tokio::test]
    async fn test_create_blank_name_makes_no_call() {
        let store = MemoryTableStore::new();
        let lists = loaded_lists(&store, "u1").await;
        let calls_before = store.calls();

        for blank in ["", "   ", "\t\n"] {
            let result = lists.create(new_list(blank, "u1")).await;
            assert!(matches!(result, Err(SyncError::Validation(_))));
        }

        assert_eq!(store.calls(), calls_before);
        assert!(lists.rows().is_empty());
    }

    #[tokio::test]
    async fn test_create_without_scope_is_validation_error() {
        let store = MemoryTableStore::new();
        let lists: ListCollection<_> = RemoteCollection::new(store.clone());

        let result = lists.create(new_list("Groceries", "u1")).await;

        assert_eq!(result, Err(SyncError::Validation("missing scope".to_string())));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_list_name() {
        let store = MemoryTableStore::new();
        let lists = loaded_lists(&store, "u1").await;
        lists.create(new_list("Groceries", "u1")).await.unwrap();

        let result = lists.create(new_list(" Groceries", "u1")).await;

        assert!(matches!(result, Err(SyncError::Validation(_))));
        assert_eq!(store.calls_to("lists", Operation::Insert), 1);
        assert_eq!(lists.rows().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_creates_insert_once() {
        let store = MemoryTableStore::new();
        let lists = loaded_lists(&store, "u1").await;

        let (a, b) = tokio::join!(
            lists.create(new_list("Groceries", "u1")),
            lists.create(new_list("Groceries", "u1")),
        );

        assert!(a.is_ok() != b.is_ok());
        assert_eq!(store.rows("lists").len(), 1);
    }

    #[tokio::test]
    async fn test_create_failure_leaves_cache_unchanged() {
        let store = MemoryTableStore::new();
        let lists = loaded_lists(&store, "u1").await;
        store.fail_next("lists", Operation::Insert);

        let result = lists.create(new_list("Groceries", "u1")).await;

        assert!(matches!(result, Err(SyncError::Remote(_))));
        assert!(lists.rows().is_empty());
    }

    #[tokio::test]
    async fn test_load_never_returns_foreign_rows() {
        let store = MemoryTableStore::new();
        store.seed(
            "lists",
            vec![
                json!({ "name": "Mine", "user_id": "u1" }),
                json!({ "name": "Theirs", "user_id": "u2" }),
                json!({ "name": "Also mine", "user_id": "u1" }),
            ],
        );
        let lists = ListCollection::new(store.clone());

        let rows = lists.load(Scope::user(user("u1"))).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.user_id == user("u1")));
    }

    #[tokio::test]
    async fn test_load_failure_keeps_previous_cache() {
        let store = MemoryTableStore::new();
        store.seed("lists", vec![json!({ "name": "Mine", "user_id": "u1" })]);
        let lists = loaded_lists(&store, "u1").await;
        store.fail_next("lists", Operation::Select);

        let result = lists.load(Scope::user(user("u1"))).await;

        assert!(matches!(result, Err(SyncError::Remote(_))));
        assert_eq!(lists.rows().len(), 1);
    }

    #[tokio::test]
    async fn test_tasks_load_in_priority_order_and_insert_by_priority() {
        let store = MemoryTableStore::new();
        store.seed(
            "tasks",
            vec![
                json!({ "task_name": "Later", "list_id": 1, "user_id": "u1", "priority": 5 }),
                json!({ "task_name": "First", "list_id": 1, "user_id": "u1", "priority": 1 }),
                json!({ "task_name": "Elsewhere", "list_id": 2, "user_id": "u1", "priority": 0 }),
            ],
        );
        let tasks = TaskCollection::new(store.clone());

        let rows = tasks.load(Scope::child(user("u1"), 1)).await.unwrap();
        let names: Vec<_> = rows.iter().map(|t| t.task_name.as_str()).collect();
        assert_eq!(names, vec!["First", "Later"]);

        let milk = tasks
            .create(NewTask {
                task_name: "Milk".to_string(),
                description: Some(" 2% ".to_string()),
                list_id: 1,
                user_id: user("u1"),
            })
            .await
            .unwrap();
        assert_eq!(milk.description.as_deref(), Some("2%"));

        let names: Vec<_> = tasks.rows().into_iter().map(|t| t.task_name).collect();
        assert_eq!(names, vec!["First", "Later", "Milk"]);

        let reloaded = tasks.load(Scope::child(user("u1"), 1)).await.unwrap();
        let reloaded: Vec<_> = reloaded.into_iter().map(|t| t.task_name).collect();
        assert_eq!(reloaded, names);
    }

    #[tokio::test]
    async fn test_created_task_follows_unranked_tasks() {
        let store = MemoryTableStore::new();
        store.seed(
            "tasks",
            vec![
                json!({ "task_name": "Unranked", "list_id": 1, "user_id": "u1" }),
                json!({ "task_name": "First", "list_id": 1, "user_id": "u1", "priority": 1 }),
            ],
        );
        let tasks = TaskCollection::new(store.clone());
        tasks.load(Scope::child(user("u1"), 1)).await.unwrap();

        tasks
            .create(NewTask {
                task_name: "Milk".to_string(),
                description: None,
                list_id: 1,
                user_id: user("u1"),
            })
            .await
            .unwrap();

        let cached: Vec<_> = tasks.rows().into_iter().map(|t| t.task_name).collect();
        assert_eq!(cached, vec!["First", "Unranked", "Milk"]);
        let reloaded: Vec<_> = tasks
            .load(Scope::child(user("u1"), 1))
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.task_name)
            .collect();
        assert_eq!(reloaded, cached);
    }

    #[test]
    fn test_nulls_last() {
        use std::cmp::Ordering;
        assert_eq!(nulls_last(Some(1), Some(5)), Ordering::Less);
        assert_eq!(nulls_last(Some(9), None), Ordering::Less);
        assert_eq!(nulls_last(None, Some(0)), Ordering::Greater);
        assert_eq!(nulls_last(None, None), Ordering::Equal);
    }

    #[tokio::test]
    async fn test_task_draft_for_other_list_is_rejected() {
        let store = MemoryTableStore::new();
        let tasks = TaskCollection::new(store.clone());
        tasks.load(Scope::child(user("u1"), 1)).await.unwrap();

        let result = tasks
            .create(NewTask {
                task_name: "Milk".to_string(),
                description: None,
                list_id: 2,
                user_id: user("u1"),
            })
            .await;

        assert!(matches!(result, Err(SyncError::Validation(_))));
        assert_eq!(store.calls_to("tasks", Operation::Insert), 0);
    }

    #[tokio::test]
    async fn test_remove_drops_exactly_one_row() {
        let store = MemoryTableStore::new();
        store.seed(
            "lists",
            vec![
                json!({ "name": "A", "user_id": "u1" }),
                json!({ "name": "B", "user_id": "u1" }),
                json!({ "name": "C", "user_id": "u1" }),
            ],
        );
        let lists = loaded_lists(&store, "u1").await;

        lists.remove(2).await.unwrap();

        let names: Vec<_> = lists.rows().into_iter().map(|l| l.name).collect();
        assert_eq!(names, vec!["A", "C"]);
        assert_eq!(store.rows("lists").len(), 2);
    }

    #[tokio::test]
    async fn test_remove_list_deletes_tasks_first() {
        let store = MemoryTableStore::new();
        store.seed("lists", vec![json!({ "name": "Groceries", "user_id": "u1" })]);
        store.seed(
            "tasks",
            vec![
                json!({ "task_name": "Milk", "list_id": 1, "user_id": "u1" }),
                json!({ "task_name": "Other", "list_id": 9, "user_id": "u1" }),
            ],
        );
        let lists = loaded_lists(&store, "u1").await;

        lists.remove(1).await.unwrap();

        let deletes: Vec<_> = store
            .call_log()
            .into_iter()
            .filter(|(_, op)| *op == Operation::Delete)
            .map(|(table, _)| table)
            .collect();
        assert_eq!(deletes, vec!["tasks", "lists"]);
        assert!(store.rows("lists").is_empty());
        assert_eq!(store.rows("tasks").len(), 1);
    }

    #[tokio::test]
    async fn test_failed_task_cascade_keeps_list() {
        let store = MemoryTableStore::new();
        store.seed("lists", vec![json!({ "name": "Groceries", "user_id": "u1" })]);
        let lists = loaded_lists(&store, "u1").await;
        store.fail_next("tasks", Operation::Delete);

        let result = lists.remove(1).await;

        assert!(matches!(result, Err(SyncError::Remote(_))));
        assert_eq!(store.calls_to("lists", Operation::Delete), 0);
        assert_eq!(store.rows("lists").len(), 1);
        assert_eq!(lists.rows().len(), 1);
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_flag() {
        let store = MemoryTableStore::new();
        store.seed("lists", vec![json!({ "name": "A", "user_id": "u1", "completed": false })]);
        let lists = loaded_lists(&store, "u1").await;

        assert_eq!(lists.toggle_completion(1).await, Ok(true));
        assert!(lists.get(1).unwrap().completed);
        assert_eq!(store.rows("lists")[0]["completed"], json!(true));

        assert_eq!(lists.toggle_completion(1).await, Ok(false));
        assert!(!lists.get(1).unwrap().completed);
        assert_eq!(store.rows("lists")[0]["completed"], json!(false));
    }

    #[tokio::test]
    async fn test_toggle_rolls_back_on_failure() {
        let store = MemoryTableStore::new();
        store.seed("lists", vec![json!({ "name": "A", "user_id": "u1" })]);
        let lists = loaded_lists(&store, "u1").await;

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        lists.observe(move |rows: &[TodoList]| sink.borrow_mut().push(rows[0].completed));
        store.fail_next("lists", Operation::Update);

        let result = lists.toggle_completion(1).await;

        assert!(matches!(result, Err(SyncError::Remote(_))));
        assert!(!lists.get(1).unwrap().completed);
        assert_eq!(*seen.borrow(), vec![true, false]);
    }

    #[tokio::test]
    async fn test_toggle_unknown_id() {
        let store = MemoryTableStore::new();
        let lists = loaded_lists(&store, "u1").await;

        let result = lists.toggle_completion(42).await;

        assert!(matches!(result, Err(SyncError::Validation(_))));
        assert_eq!(store.calls_to("lists", Operation::Update), 0);
    }

    #[tokio::test]
    async fn test_reorder_adjacent_is_local_only() {
        let store = MemoryTableStore::new();
        store.seed(
            "lists",
            vec![
                json!({ "name": "A", "user_id": "u1" }),
                json!({ "name": "B", "user_id": "u1" }),
            ],
        );
        let lists = loaded_lists(&store, "u1").await;
        let calls_before = store.calls();

        assert!(lists.reorder_adjacent(1, Direction::Up));
        assert!(!lists.reorder_adjacent(0, Direction::Up));
        assert!(!lists.reorder_adjacent(1, Direction::Down));
        assert!(!lists.reorder_adjacent(7, Direction::Down));

        let names: Vec<_> = lists.rows().into_iter().map(|l| l.name).collect();
        assert_eq!(names, vec!["B", "A"]);
        assert_eq!(store.calls(), calls_before);
    }

    #[tokio::test]
    async fn test_observers_see_every_change() {
        let store = MemoryTableStore::new();
        let lists = ListCollection::new(store.clone());
        let count = Rc::new(Cell::new(0));
        let counter = count.clone();
        lists.observe(move |_: &[TodoList]| counter.set(counter.get() + 1));

        lists.load(Scope::user(user("u1"))).await.unwrap();
        lists.create(new_list("A", "u1")).await.unwrap();
        lists.clear();

        assert_eq!(count.get(), 3);
        assert!(lists.scope().is_none());
    }
}
