//! Everything a screen needs to talk to the backend, in one clonable bundle.

use store::{
    BlobStore, ListCollection, MemoryBlobStore, MemoryTableStore, ProfileResolver, RemoteCollection,
    TableStore, TaskCollection,
};

use crate::auth::{AuthProvider, MemoryAuth, SessionStorage};
use crate::client::SupabaseClient;
use crate::config::{BackendConfig, DEFAULT_AVATAR_BUCKET};
use crate::gateway::SessionGateway;

#[derive(Debug, Clone)]
pub struct Backend<A, T, B> {
    pub gateway: SessionGateway<A>,
    pub tables: T,
    pub blobs: B,
    pub avatar_bucket: String,
}

/// The hosted backend: one client serves auth, tables and storage.
pub type RemoteBackend = Backend<SupabaseClient, SupabaseClient, SupabaseClient>;

/// Fully in-memory backend.
pub type MemoryBackend = Backend<MemoryAuth, MemoryTableStore, MemoryBlobStore>;

impl<A: AuthProvider, T: TableStore + Clone, B: BlobStore> Backend<A, T, B> {
    pub fn lists(&self) -> ListCollection<T> {
        RemoteCollection::new(self.tables.clone())
    }

    pub fn tasks(&self) -> TaskCollection<T> {
        RemoteCollection::new(self.tables.clone())
    }

    pub fn profiles(&self) -> ProfileResolver<T> {
        ProfileResolver::new(self.tables.clone())
    }
}

impl RemoteBackend {
    pub fn connect(config: Option<BackendConfig>, storage: impl SessionStorage + 'static) -> Self {
        let avatar_bucket = config
            .as_ref()
            .map(|c| c.avatar_bucket.clone())
            .unwrap_or_else(|| DEFAULT_AVATAR_BUCKET.to_string());
        let client = SupabaseClient::with_session_storage(config, storage);
        Self {
            gateway: SessionGateway::new(client.clone()),
            tables: client.clone(),
            blobs: client,
            avatar_bucket,
        }
    }

    /// Connect using [`BackendConfig::from_env_optional`].
    pub fn connect_from_env(storage: impl SessionStorage + 'static) -> Self {
        Self::connect(BackendConfig::from_env_optional(), storage)
    }
}

impl MemoryBackend {
    pub fn in_memory() -> Self {
        Self::with_auth(MemoryAuth::new())
    }

    pub fn with_auth(auth: MemoryAuth) -> Self {
        Self {
            gateway: SessionGateway::new(auth),
            tables: MemoryTableStore::new(),
            blobs: MemoryBlobStore::new(),
            avatar_bucket: DEFAULT_AVATAR_BUCKET.to_string(),
        }
    }

    pub fn auth(&self) -> &MemoryAuth {
        self.gateway.provider()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::NoPersistence;
    use store::{NewList, Scope};

    #[tokio::test]
    async fn test_collections_share_the_backend_tables() {
        let backend = MemoryBackend::in_memory();
        let user = backend.auth().register("ada@example.com", "secret1");
        let lists = backend.lists();
        lists.load(Scope::user(user.clone())).await.unwrap();

        lists
            .create(NewList {
                name: "Groceries".to_string(),
                user_id: user,
            })
            .await
            .unwrap();

        assert_eq!(backend.tables.rows("lists").len(), 1);
    }

    #[test]
    fn test_unconfigured_remote_backend_uses_default_bucket() {
        let backend = RemoteBackend::connect(None, NoPersistence);

        assert_eq!(backend.avatar_bucket, DEFAULT_AVATAR_BUCKET);
        assert!(!backend.tables.is_configured());
    }
}
