//! In-memory [`AuthProvider`] for tests and offline runs.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::Utc;
use store::UserId;

use super::events::SessionEvents;
use super::session::{AuthEvent, AuthUser, Session, SessionChange};
use super::AuthProvider;
use crate::error::AuthError;

const SESSION_LIFETIME_SECS: i64 = 3600;
const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone)]
struct Account {
    user: AuthUser,
    password: String,
}

#[derive(Debug, Default)]
struct AuthState {
    accounts: Vec<Account>,
    session: Option<Session>,
    next_token: u64,
    fail_next: Option<AuthError>,
    fail_refresh: bool,
}

impl AuthState {
    fn issue(&mut self, user: AuthUser) -> Session {
        self.next_token += 1;
        Session {
            access_token: format!("access-{}", self.next_token),
            refresh_token: format!("refresh-{}", self.next_token),
            expires_at: Some(Utc::now().timestamp() + SESSION_LIFETIME_SECS),
            user,
        }
    }

    fn take_failure(&mut self) -> Result<(), AuthError> {
        match self.fail_next.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Accounts and the current session kept in memory.
///
/// Emits the same session events as the hosted provider. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryAuth {
    state: Rc<RefCell<AuthState>>,
    events: SessionEvents,
}

impl MemoryAuth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account without signing in.
    pub fn register(&self, email: &str, password: &str) -> UserId {
        let mut state = self.state.borrow_mut();
        let id = UserId::new(format!("user-{}", state.accounts.len() + 1));
        state.accounts.push(Account {
            user: AuthUser {
                id: id.clone(),
                email: Some(email.to_string()),
            },
            password: password.to_string(),
        });
        id
    }

    /// Start a session for a registered account without emitting an event,
    /// as if it had been restored from storage.
    pub fn restore_session(&self, user_id: &UserId) -> Option<Session> {
        let mut state = self.state.borrow_mut();
        let user = state
            .accounts
            .iter()
            .find(|a| &a.user.id == user_id)
            .map(|a| a.user.clone())?;
        let session = state.issue(user);
        state.session = Some(session.clone());
        Some(session)
    }

    /// Make the next auth call fail with `error`.
    pub fn fail_next(&self, error: AuthError) {
        self.state.borrow_mut().fail_next = Some(error);
    }

    /// Make token refreshes fail until reset.
    pub fn set_fail_refresh(&self, fail: bool) {
        self.state.borrow_mut().fail_refresh = fail;
    }

    /// Push the current session's expiry into the past.
    pub fn expire_session(&self) {
        if let Some(session) = self.state.borrow_mut().session.as_mut() {
            session.expires_at = Some(Utc::now().timestamp() - 1);
        }
    }

    pub fn password_of(&self, email: &str) -> Option<String> {
        self.state
            .borrow()
            .accounts
            .iter()
            .find(|a| a.user.email.as_deref() == Some(email))
            .map(|a| a.password.clone())
    }

    fn change(&self, event: AuthEvent, session: Option<Session>) {
        self.state.borrow_mut().session = session.clone();
        self.events.emit(&SessionChange { event, session });
    }
}

fn rejected(message: &str) -> AuthError {
    AuthError::Rejected {
        status: 400,
        message: message.to_string(),
    }
}

impl AuthProvider for MemoryAuth {
    async fn get_session(&self) -> Result<Option<Session>, AuthError> {
        let (session, fail_refresh) = {
            let mut state = self.state.borrow_mut();
            state.take_failure()?;
            (state.session.clone(), state.fail_refresh)
        };
        let Some(session) = session else {
            return Ok(None);
        };
        if !session.is_expired(Utc::now()) {
            return Ok(Some(session));
        }

        if fail_refresh {
            self.change(AuthEvent::SignedOut, None);
            return Err(rejected("Invalid Refresh Token"));
        }
        let fresh = self.state.borrow_mut().issue(session.user);
        self.change(AuthEvent::TokenRefreshed, Some(fresh.clone()));
        Ok(Some(fresh))
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let session = {
            let mut state = self.state.borrow_mut();
            state.take_failure()?;
            let user = state
                .accounts
                .iter()
                .find(|a| a.user.email.as_deref() == Some(email) && a.password == password)
                .map(|a| a.user.clone())
                .ok_or_else(|| rejected("Invalid login credentials"))?;
            state.issue(user)
        };
        self.change(AuthEvent::SignedIn, Some(session.clone()));
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        {
            let mut state = self.state.borrow_mut();
            state.take_failure()?;
            if state.accounts.iter().any(|a| a.user.email.as_deref() == Some(email)) {
                return Err(AuthError::Rejected {
                    status: 422,
                    message: "User already registered".to_string(),
                });
            }
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::Rejected {
                status: 422,
                message: "Password should be at least 6 characters".to_string(),
            });
        }

        let id = self.register(email, password);
        let session = self.state.borrow_mut().issue(AuthUser {
            id,
            email: Some(email.to_string()),
        });
        let user = session.user.clone();
        self.change(AuthEvent::SignedIn, Some(session));
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let failure = self.state.borrow_mut().take_failure();
        if self.state.borrow().session.is_some() {
            self.change(AuthEvent::SignedOut, None);
        }
        failure
    }

    async fn update_password(&self, password: &str) -> Result<(), AuthError> {
        let session = {
            let mut state = self.state.borrow_mut();
            state.take_failure()?;
            let session = state.session.clone().ok_or(AuthError::NoSession)?;
            let account = state
                .accounts
                .iter_mut()
                .find(|a| a.user.id == session.user.id)
                .ok_or(AuthError::NoSession)?;
            account.password = password.to_string();
            session
        };
        self.change(AuthEvent::UserUpdated, Some(session));
        Ok(())
    }

    fn events(&self) -> SessionEvents {
        self.events.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder(auth: &MemoryAuth) -> (Rc<RefCell<Vec<AuthEvent>>>, crate::Subscription) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let subscription = auth.events().subscribe(move |c| sink.borrow_mut().push(c.event));
        (seen, subscription)
    }

    #[tokio::test]
    async fn test_sign_in_and_out_emit_events() {
        let auth = MemoryAuth::new();
        auth.register("ada@example.com", "secret1");
        let (seen, _subscription) = recorder(&auth);

        assert!(auth.sign_in_with_password("ada@example.com", "wrong").await.is_err());
        let session = auth
            .sign_in_with_password("ada@example.com", "secret1")
            .await
            .unwrap();
        assert_eq!(auth.get_session().await, Ok(Some(session)));

        auth.sign_out().await.unwrap();
        assert_eq!(auth.get_session().await, Ok(None));
        assert_eq!(*seen.borrow(), vec![AuthEvent::SignedIn, AuthEvent::SignedOut]);
    }

    #[tokio::test]
    async fn test_sign_up_rejects_short_password_and_duplicates() {
        let auth = MemoryAuth::new();

        assert!(matches!(
            auth.sign_up("ada@example.com", "12345").await,
            Err(AuthError::Rejected { status: 422, .. })
        ));
        let user = auth.sign_up("ada@example.com", "123456").await.unwrap();
        assert_eq!(user.email.as_deref(), Some("ada@example.com"));
        assert!(auth.get_session().await.unwrap().is_some());

        assert!(auth.sign_up("ada@example.com", "abcdef").await.is_err());
    }

    #[tokio::test]
    async fn test_expired_session_is_refreshed_once() {
        let auth = MemoryAuth::new();
        let id = auth.register("ada@example.com", "secret1");
        let original = auth.restore_session(&id).unwrap();
        let (seen, _subscription) = recorder(&auth);

        auth.expire_session();
        let fresh = auth.get_session().await.unwrap().unwrap();

        assert_ne!(fresh.access_token, original.access_token);
        assert_eq!(auth.get_session().await.unwrap(), Some(fresh));
        assert_eq!(*seen.borrow(), vec![AuthEvent::TokenRefreshed]);
    }

    #[tokio::test]
    async fn test_failed_refresh_signs_out() {
        let auth = MemoryAuth::new();
        let id = auth.register("ada@example.com", "secret1");
        auth.restore_session(&id);
        let (seen, _subscription) = recorder(&auth);

        auth.set_fail_refresh(true);
        auth.expire_session();

        assert!(auth.get_session().await.is_err());
        assert_eq!(auth.get_session().await, Ok(None));
        assert_eq!(*seen.borrow(), vec![AuthEvent::SignedOut]);
    }

    #[tokio::test]
    async fn test_update_password_needs_session() {
        let auth = MemoryAuth::new();
        let id = auth.register("ada@example.com", "secret1");

        assert_eq!(auth.update_password("newpass").await, Err(AuthError::NoSession));

        auth.restore_session(&id);
        auth.update_password("newpass").await.unwrap();
        assert_eq!(auth.password_of("ada@example.com").as_deref(), Some("newpass"));
    }
}
