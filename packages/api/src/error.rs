use store::{StoreError, SyncError};
use thiserror::Error;

/// Failure of an authentication call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuthError {
    #[error("auth client is not configured")]
    NotConfigured,
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("could not decode auth response: {0}")]
    Decode(String),
    #[error("no active session")]
    NoSession,
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotConfigured => AuthError::NotConfigured,
            StoreError::Rejected { status, message } => AuthError::Rejected { status, message },
            StoreError::Transport(msg) => AuthError::Transport(msg),
            StoreError::Decode(msg) => AuthError::Decode(msg),
        }
    }
}

impl From<AuthError> for SyncError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::NoSession => SyncError::NotAuthenticated,
            other => SyncError::Remote(other.to_string()),
        }
    }
}
