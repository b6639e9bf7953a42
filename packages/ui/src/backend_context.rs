//! The backend handle shared by every view.

use api::{RemoteBackend, Session, SessionStorage};
use dioxus::prelude::*;

/// Backend type the views run against.
pub type AppBackend = RemoteBackend;

/// localStorage key holding the serialized session.
pub const SESSION_STORAGE_KEY: &str = "todo.session";

/// Keeps the session in the browser's localStorage; a no-op elsewhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserSessionStorage;

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

impl SessionStorage for BrowserSessionStorage {
    #[cfg(target_arch = "wasm32")]
    fn load(&self) -> Option<Session> {
        let raw = local_storage()?.get_item(SESSION_STORAGE_KEY).ok().flatten()?;
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!("Discarding stored session: {e}");
                self.clear();
                None
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn load(&self) -> Option<Session> {
        None
    }

    fn save(&self, session: &Session) {
        #[cfg(target_arch = "wasm32")]
        {
            let Some(storage) = local_storage() else {
                return;
            };
            match serde_json::to_string(session) {
                Ok(raw) => {
                    let _ = storage.set_item(SESSION_STORAGE_KEY, &raw);
                }
                Err(e) => tracing::warn!("Could not store session: {e}"),
            }
        }
        #[cfg(not(target_arch = "wasm32"))]
        let _ = session;
    }

    fn clear(&self) {
        #[cfg(target_arch = "wasm32")]
        if let Some(storage) = local_storage() {
            let _ = storage.remove_item(SESSION_STORAGE_KEY);
        }
    }
}

pub fn use_backend() -> AppBackend {
    use_context::<AppBackend>()
}

/// Connects to the hosted backend from the environment and provides it to
/// the tree. Without configuration every call fails with "not configured"
/// and the views show their signed-out state.
#[component]
pub fn BackendProvider(children: Element) -> Element {
    use_context_provider(|| {
        let backend = RemoteBackend::connect_from_env(BrowserSessionStorage);
        if !backend.tables.is_configured() {
            tracing::warn!("Backend is not configured; set SUPABASE_URL and SUPABASE_ANON_KEY");
        }
        backend
    });

    rsx! {
        {children}
    }
}
