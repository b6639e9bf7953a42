//! Password auth against the hosted `/auth/v1` endpoints.

use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};

use super::events::SessionEvents;
use super::session::{AuthEvent, AuthUser, Session, SessionChange, TokenResponse};
use super::AuthProvider;
use crate::client::{json_body, send, SupabaseClient};
use crate::error::AuthError;

impl SupabaseClient {
    async fn token(&self, grant_type: &str, body: Value) -> Result<Session, AuthError> {
        let request = self
            .request(Method::POST, "/auth/v1/token")?
            .query(&[("grant_type", grant_type)])
            .json(&body);
        let response: TokenResponse = json_body(send(request).await?).await?;
        Ok(response.into_session(Utc::now()))
    }

    async fn refresh(&self, session: &Session) -> Result<Session, AuthError> {
        self.token(
            "refresh_token",
            json!({ "refresh_token": session.refresh_token }),
        )
        .await
    }
}

impl AuthProvider for SupabaseClient {
    async fn get_session(&self) -> Result<Option<Session>, AuthError> {
        let Some(session) = self.cached_session() else {
            return Ok(None);
        };
        if !session.is_expired(Utc::now()) {
            return Ok(Some(session));
        }

        match self.refresh(&session).await {
            Ok(fresh) => {
                tracing::info!("Access token refreshed");
                self.set_session(SessionChange {
                    event: AuthEvent::TokenRefreshed,
                    session: Some(fresh.clone()),
                });
                Ok(Some(fresh))
            }
            Err(e) => {
                tracing::warn!("Session refresh failed, signing out: {e}");
                self.set_session(SessionChange::signed_out());
                Err(e)
            }
        }
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let session = self
            .token("password", json!({ "email": email, "password": password }))
            .await?;
        tracing::info!(user = %session.user.id, "Signed in");
        self.set_session(SessionChange {
            event: AuthEvent::SignedIn,
            session: Some(session.clone()),
        });
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let request = self
            .request(Method::POST, "/auth/v1/signup")?
            .json(&json!({ "email": email, "password": password }));
        let body: Value = json_body(send(request).await?).await?;

        // Projects with email confirmation return only the user, others a full session.
        if body.get("access_token").is_some() {
            let response: TokenResponse =
                serde_json::from_value(body).map_err(|e| AuthError::Decode(e.to_string()))?;
            let session = response.into_session(Utc::now());
            let user = session.user.clone();
            self.set_session(SessionChange {
                event: AuthEvent::SignedIn,
                session: Some(session),
            });
            Ok(user)
        } else {
            let user = body.get("user").cloned().unwrap_or(body);
            serde_json::from_value(user).map_err(|e| AuthError::Decode(e.to_string()))
        }
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        if self.cached_session().is_none() {
            return Ok(());
        }
        let result = match self.request(Method::POST, "/auth/v1/logout") {
            Ok(request) => send(request).await.map(|_| ()).map_err(AuthError::from),
            Err(e) => Err(e.into()),
        };
        // The local session is gone even when the server could not be told.
        self.set_session(SessionChange::signed_out());
        result
    }

    async fn update_password(&self, password: &str) -> Result<(), AuthError> {
        let Some(session) = self.get_session().await? else {
            return Err(AuthError::NoSession);
        };
        let request = self
            .request(Method::PUT, "/auth/v1/user")?
            .json(&json!({ "password": password }));
        send(request).await?;
        self.set_session(SessionChange {
            event: AuthEvent::UserUpdated,
            session: Some(session),
        });
        Ok(())
    }

    fn events(&self) -> SessionEvents {
        self.session_events().clone()
    }
}
