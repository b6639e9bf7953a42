use crate::error::SyncError;
use crate::models::{TodoList, UserId};
use crate::table::{Filter, TableStore};

/// Find the list called `name` owned by `user_id`.
///
/// List names are unique per user when created through
/// [`crate::RemoteCollection`], but rows written by other clients may still
/// collide; the first row in store order wins and the collision is logged.
pub async fn resolve_list_by_name<S: TableStore>(
    store: &S,
    user_id: &UserId,
    name: &str,
) -> Result<Option<TodoList>, SyncError> {
    let filter = Filter::new()
        .eq("name", name)
        .eq("user_id", user_id.as_str());
    let rows = store.select("lists", &filter, None).await.map_err(|e| {
        tracing::error!(list = name, "Error fetching list ID: {e}");
        SyncError::from(e)
    })?;

    if rows.len() > 1 {
        tracing::warn!(list = name, count = rows.len(), "List name is ambiguous, using the first match");
    }
    match rows.into_iter().next() {
        Some(row) => Ok(Some(serde_json::from_value(row)?)),
        None => Ok(None),
    }
}
