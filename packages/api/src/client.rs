//! # Hosted backend client
//!
//! [`SupabaseClient`] is one cheap-to-clone handle to a hosted backend that
//! exposes three HTTP surfaces under the same base URL:
//!
//! | Surface | Prefix | Trait |
//! |---------|--------|-------|
//! | Tables (PostgREST) | `/rest/v1` | [`store::TableStore`] |
//! | Object storage | `/storage/v1` | [`store::BlobStore`] |
//! | Auth (GoTrue) | `/auth/v1` | [`crate::AuthProvider`] |
//!
//! Every request carries the `apikey` header and a bearer token: the access
//! token of the current session when there is one, the anonymous key
//! otherwise. Clones share the session, its listeners and its persistence.
//!
//! Without a [`BackendConfig`] the client is inert: every call fails with
//! `NotConfigured` before touching the network.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use reqwest::{Method, RequestBuilder, Response};
use serde_json::Value;
use store::StoreError;

use crate::auth::{NoPersistence, Session, SessionChange, SessionEvents, SessionStorage};
use crate::config::BackendConfig;

#[derive(Clone)]
pub struct SupabaseClient {
    inner: Rc<Inner>,
}

struct Inner {
    config: Option<BackendConfig>,
    http: reqwest::Client,
    session: RefCell<Option<Session>>,
    events: SessionEvents,
    storage: Box<dyn SessionStorage>,
}

impl fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("url", &self.inner.config.as_ref().map(|c| c.url.as_str()))
            .field("signed_in", &self.inner.session.borrow().is_some())
            .finish()
    }
}

impl SupabaseClient {
    pub fn new(config: Option<BackendConfig>) -> Self {
        Self::with_session_storage(config, NoPersistence)
    }

    /// Create a client that restores and persists its session through `storage`.
    pub fn with_session_storage(
        config: Option<BackendConfig>,
        storage: impl SessionStorage + 'static,
    ) -> Self {
        let session = if config.is_some() { storage.load() } else { None };
        if session.is_some() {
            tracing::info!("Restored persisted session");
        }
        Self {
            inner: Rc::new(Inner {
                config,
                http: reqwest::Client::new(),
                session: RefCell::new(session),
                events: SessionEvents::new(),
                storage: Box::new(storage),
            }),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.inner.config.is_some()
    }

    pub fn config(&self) -> Result<&BackendConfig, StoreError> {
        self.inner.config.as_ref().ok_or(StoreError::NotConfigured)
    }

    pub(crate) fn session_events(&self) -> &SessionEvents {
        &self.inner.events
    }

    pub(crate) fn cached_session(&self) -> Option<Session> {
        self.inner.session.borrow().clone()
    }

    /// Replace the cached session, persist it and notify listeners.
    pub(crate) fn set_session(&self, change: SessionChange) {
        match &change.session {
            Some(session) => self.inner.storage.save(session),
            None => self.inner.storage.clear(),
        }
        *self.inner.session.borrow_mut() = change.session.clone();
        self.inner.events.emit(&change);
    }

    pub(crate) fn url(&self, path: &str) -> Result<String, StoreError> {
        Ok(format!("{}{path}", self.config()?.url))
    }

    /// A request with the key and bearer headers set.
    pub(crate) fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, StoreError> {
        let config = self.config()?;
        let bearer = self
            .inner
            .session
            .borrow()
            .as_ref()
            .map(|s| s.access_token.clone())
            .unwrap_or_else(|| config.anon_key.clone());
        Ok(self
            .inner
            .http
            .request(method, self.url(path)?)
            .header("apikey", &config.anon_key)
            .bearer_auth(bearer))
    }
}

/// Send a request and turn non-2xx responses into [`StoreError::Rejected`].
pub(crate) async fn send(request: RequestBuilder) -> Result<Response, StoreError> {
    let response = request
        .send()
        .await
        .map_err(|e| StoreError::Transport(e.to_string()))?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Rejected {
        status: status.as_u16(),
        message: error_message(&body),
    })
}

pub(crate) async fn json_body<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, StoreError> {
    response
        .json()
        .await
        .map_err(|e| StoreError::Decode(e.to_string()))
}

/// Pull the human readable message out of an error body.
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "msg", "error_description", "error"]
                .iter()
                .find_map(|key| value.get(key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| body.trim().to_string())
}
