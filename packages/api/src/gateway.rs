//! # Session gateway
//!
//! The one place views and controllers ask "who is signed in?". Lookups are
//! fail-soft: a provider error is logged and reported as "no session", so
//! callers only ever branch on presence. [`require_session`] turns absence
//! into [`SyncError::NotAuthenticated`], which views answer with a redirect
//! to the login screen.
//!
//! [`require_session`]: SessionGateway::require_session

use store::SyncError;

use crate::auth::{AuthProvider, AuthUser, Session, SessionChange, Subscription};
use crate::error::AuthError;

#[derive(Debug, Clone)]
pub struct SessionGateway<A> {
    auth: A,
}

impl<A: AuthProvider> SessionGateway<A> {
    pub fn new(auth: A) -> Self {
        Self { auth }
    }

    pub fn provider(&self) -> &A {
        &self.auth
    }

    pub async fn current_session(&self) -> Option<Session> {
        match self.auth.get_session().await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Error getting session: {e}");
                None
            }
        }
    }

    pub async fn require_session(&self) -> Result<Session, SyncError> {
        self.current_session().await.ok_or(SyncError::NotAuthenticated)
    }

    /// Call `handler` on every session transition until the returned
    /// subscription is dropped or unsubscribed.
    pub fn on_session_change(&self, handler: impl Fn(&SessionChange) + 'static) -> Subscription {
        self.auth.events().subscribe(handler)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        self.auth.sign_in_with_password(email.trim(), password).await
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        self.auth.sign_up(email.trim(), password).await
    }

    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.auth.sign_out().await.inspect_err(|e| {
            tracing::warn!("Error signing out: {e}");
        })
    }

    pub async fn update_password(&self, password: &str) -> Result<(), AuthError> {
        self.auth.update_password(password).await
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::auth::{AuthEvent, MemoryAuth};

    #[tokio::test]
    async fn test_current_session_is_fail_soft() {
        let auth = MemoryAuth::new();
        let id = auth.register("ada@example.com", "secret1");
        auth.restore_session(&id);
        let gateway = SessionGateway::new(auth.clone());

        auth.fail_next(AuthError::Transport("offline".to_string()));
        assert_eq!(gateway.current_session().await, None);
        assert_eq!(gateway.current_session().await.unwrap().user.id, id);
    }

    #[tokio::test]
    async fn test_require_session_without_sign_in() {
        let gateway = SessionGateway::new(MemoryAuth::new());

        assert_eq!(
            gateway.require_session().await,
            Err(SyncError::NotAuthenticated)
        );
    }

    #[tokio::test]
    async fn test_subscription_stops_delivery_after_unsubscribe() {
        let auth = MemoryAuth::new();
        auth.register("ada@example.com", "secret1");
        let gateway = SessionGateway::new(auth);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();

        let subscription = gateway.on_session_change(move |c| sink.borrow_mut().push(c.event));
        gateway.sign_in(" ada@example.com ", "secret1").await.unwrap();
        subscription.unsubscribe();
        gateway.sign_out().await.unwrap();

        assert_eq!(*seen.borrow(), vec![AuthEvent::SignedIn]);
    }
}
