//! Login and sign-up submissions.
//!
//! Errors the user can fix (bad credentials, a taken email, a short
//! password) come back as [`SyncError::Validation`] so the form shows them
//! inline; anything else is a [`SyncError::Remote`] for the activity log.

use api::{AuthError, AuthProvider, AuthUser, Backend, Session};
use store::{BlobStore, SyncError, TableStore};

use super::MIN_PASSWORD_LEN;

fn form_error(e: AuthError) -> SyncError {
    match e {
        AuthError::Rejected { message, .. } => SyncError::Validation(message),
        other => SyncError::from(other),
    }
}

fn require_credentials(email: &str, password: &str) -> Result<(), SyncError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(SyncError::Validation(
            "Email and password are required".to_string(),
        ));
    }
    Ok(())
}

pub async fn sign_in<A, T, B>(
    backend: &Backend<A, T, B>,
    email: &str,
    password: &str,
) -> Result<Session, SyncError>
where
    A: AuthProvider,
{
    require_credentials(email, password)?;
    let session = backend
        .gateway
        .sign_in(email, password)
        .await
        .map_err(form_error)?;
    tracing::info!(user = %session.user.id, "Signed in");
    Ok(session)
}

/// Create an account and its profile row.
///
/// The account exists once the provider accepts it; a failed profile write
/// afterwards is only logged and repaired by the next username change.
pub async fn sign_up<A, T, B>(
    backend: &Backend<A, T, B>,
    name: &str,
    email: &str,
    password: &str,
) -> Result<AuthUser, SyncError>
where
    A: AuthProvider,
    T: TableStore + Clone,
    B: BlobStore,
{
    if name.trim().is_empty() {
        return Err(SyncError::Validation("Name cannot be empty".to_string()));
    }
    require_credentials(email, password)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(SyncError::Validation(format!(
            "Password should be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }

    let user = backend
        .gateway
        .sign_up(email, password)
        .await
        .map_err(form_error)?;
    if let Err(e) = backend.profiles().ensure_profile(&user.id, name).await {
        tracing::warn!(user = %user.id, "Profile not created at sign-up: {e}");
    }
    tracing::info!(user = %user.id, "Signed up");
    Ok(user)
}
