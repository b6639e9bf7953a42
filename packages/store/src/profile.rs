//! Profile lookups and updates against the `profiles` table.

use serde_json::json;

use crate::error::SyncError;
use crate::models::{Profile, UserId};
use crate::table::{Filter, TableStore};

const PROFILES: &str = "profiles";

/// Reads and writes the single profile row of a user.
#[derive(Clone, Debug)]
pub struct ProfileResolver<S> {
    store: S,
}

impl<S: TableStore> ProfileResolver<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Fetch the profile of `user_id`.
    ///
    /// `Ok(None)` means the user has no profile row; a failing store call is
    /// an error, so callers can tell the two apart.
    pub async fn fetch_profile(&self, user_id: &UserId) -> Result<Option<Profile>, SyncError> {
        let rows = self
            .store
            .select(PROFILES, &Filter::new().eq("id", user_id.as_str()), None)
            .await
            .map_err(|e| {
                tracing::warn!(user = %user_id, "Error fetching profile: {e}");
                SyncError::from(e)
            })?;

        if rows.len() > 1 {
            tracing::warn!(user = %user_id, count = rows.len(), "Multiple profiles found, using the first");
        }
        match rows.into_iter().next() {
            Some(row) => Ok(Some(serde_json::from_value(row)?)),
            None => Ok(None),
        }
    }

    pub async fn update_name(&self, user_id: &UserId, name: &str) -> Result<String, SyncError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SyncError::Validation("Username cannot be empty".to_string()));
        }
        self.write(user_id, json!({ "id": user_id.as_str(), "name": name }))
            .await?;
        Ok(name.to_string())
    }

    pub async fn update_avatar_url(&self, user_id: &UserId, url: &str) -> Result<(), SyncError> {
        self.write(user_id, json!({ "id": user_id.as_str(), "avatar_url": url }))
            .await
    }

    /// Create the profile row if missing, otherwise set its name.
    pub async fn ensure_profile(&self, user_id: &UserId, name: &str) -> Result<(), SyncError> {
        self.write(user_id, json!({ "id": user_id.as_str(), "name": name.trim() }))
            .await
    }

    /// Upsert on `id`: columns absent from `row` keep their stored value, and
    /// a missing profile row is created.
    async fn write(&self, user_id: &UserId, row: serde_json::Value) -> Result<(), SyncError> {
        self.store
            .upsert(PROFILES, vec![row], "id")
            .await
            .map_err(|e| {
                tracing::error!(user = %user_id, "Error upserting profile: {e}");
                SyncError::from(e)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryTableStore;
    use crate::table::Operation;

    #[tokio::test]
    async fn test_fetch_profile_distinguishes_missing_from_failure() {
        let store = MemoryTableStore::empty();
        let profiles = ProfileResolver::new(store.clone());
        let user = UserId::from("u1");

        assert_eq!(profiles.fetch_profile(&user).await, Ok(None));

        store.fail_next(PROFILES, Operation::Select);
        assert!(matches!(
            profiles.fetch_profile(&user).await,
            Err(SyncError::Remote(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_profile_returns_first_row() {
        let store = MemoryTableStore::empty();
        store.seed(
            PROFILES,
            vec![
                json!({ "id": "u1", "name": "Ada", "email": "ada@example.com" }),
                json!({ "id": "u2", "name": "Bob" }),
            ],
        );
        let profiles = ProfileResolver::new(store);

        let profile = profiles.fetch_profile(&UserId::from("u1")).await.unwrap().unwrap();

        assert_eq!(profile.name.as_deref(), Some("Ada"));
        assert!(profile.avatar_url.is_none());
    }

    #[tokio::test]
    async fn test_update_name_validates_and_trims() {
        let store = MemoryTableStore::empty();
        store.seed(PROFILES, vec![json!({ "id": "u1", "name": "Ada" })]);
        let profiles = ProfileResolver::new(store.clone());
        let user = UserId::from("u1");

        assert!(matches!(
            profiles.update_name(&user, "   ").await,
            Err(SyncError::Validation(_))
        ));
        assert_eq!(store.calls_to(PROFILES, Operation::Upsert), 0);

        assert_eq!(profiles.update_name(&user, " Grace ").await, Ok("Grace".to_string()));
        assert_eq!(store.rows(PROFILES)[0]["name"], json!("Grace"));
    }

    #[tokio::test]
    async fn test_updates_create_missing_profile_row() {
        let store = MemoryTableStore::empty();
        let profiles = ProfileResolver::new(store.clone());
        let user = UserId::from("u1");

        profiles.update_name(&user, "Ada").await.unwrap();
        profiles
            .update_avatar_url(&user, "memory://storage/avatars/a.png")
            .await
            .unwrap();

        let profile = profiles.fetch_profile(&user).await.unwrap().unwrap();
        assert_eq!(profile.name.as_deref(), Some("Ada"));
        assert_eq!(profile.avatar_url.as_deref(), Some("memory://storage/avatars/a.png"));
        assert_eq!(store.rows(PROFILES).len(), 1);
    }

    #[tokio::test]
    async fn test_ensure_profile_upserts_on_id() {
        let store = MemoryTableStore::empty();
        let profiles = ProfileResolver::new(store.clone());
        let user = UserId::from("u1");

        profiles.ensure_profile(&user, "Ada").await.unwrap();
        profiles.ensure_profile(&user, "Ada L").await.unwrap();
        profiles
            .update_avatar_url(&user, "memory://storage/avatars/a.png")
            .await
            .unwrap();

        let rows = store.rows(PROFILES);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], json!("Ada L"));
        assert_eq!(rows[0]["avatar_url"], json!("memory://storage/avatars/a.png"));
    }
}
