//! # API crate: hosted backend client for the to-do app
//!
//! Connects the platform-neutral data layer in `store` to a hosted
//! backend-as-a-service and owns everything about the signed-in user.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | [`BackendConfig`] from environment variables (`SUPABASE_URL`, `SUPABASE_ANON_KEY`, `AVATAR_BUCKET`) |
//! | [`auth`] | [`AuthProvider`] trait, sessions, session-change events, persistence hook, [`MemoryAuth`] |
//! | [`gateway`] | [`SessionGateway`]: fail-soft session lookup and subscriptions |
//! | [`backend`] | [`Backend`] bundle of gateway, table store, blob store and avatar bucket |
//!
//! [`SupabaseClient`] implements [`store::TableStore`], [`store::BlobStore`]
//! and [`AuthProvider`] over HTTP with `reqwest`; the REST and storage halves
//! live in private modules next to it.

pub mod auth;
pub mod backend;
mod client;
pub mod config;
mod error;
pub mod gateway;
mod rest;
mod storage;

pub use auth::{
    AuthEvent, AuthProvider, AuthUser, MemoryAuth, NoPersistence, Session, SessionChange,
    SessionEvents, SessionStorage, Subscription,
};
pub use backend::{Backend, MemoryBackend, RemoteBackend};
pub use client::SupabaseClient;
pub use config::{BackendConfig, ConfigError};
pub use error::AuthError;
pub use gateway::SessionGateway;
