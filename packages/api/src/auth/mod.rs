//! Password authentication and session tracking.
//!
//! [`AuthProvider`] is the seam between the app and whoever issues sessions:
//! [`crate::SupabaseClient`] talks to the hosted auth endpoints, [`MemoryAuth`]
//! keeps accounts in memory for tests and offline runs. Both report session
//! transitions through [`SessionEvents`].

mod events;
mod gotrue;
mod memory;
mod persist;
mod session;

use std::future::Future;

pub use events::{SessionEvents, Subscription};
pub use memory::MemoryAuth;
pub use persist::{NoPersistence, SessionStorage};
pub use session::{AuthEvent, AuthUser, Session, SessionChange};

use crate::error::AuthError;

/// Issues and tracks the session of the current user.
pub trait AuthProvider {
    /// The current session, refreshing an expired access token once.
    fn get_session(&self) -> impl Future<Output = Result<Option<Session>, AuthError>>;
    fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Session, AuthError>>;
    fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<AuthUser, AuthError>>;
    fn sign_out(&self) -> impl Future<Output = Result<(), AuthError>>;
    fn update_password(&self, password: &str) -> impl Future<Output = Result<(), AuthError>>;
    fn events(&self) -> SessionEvents;
}
