//! Error types for the data layer.

use thiserror::Error;

/// Failure reported by a [`crate::TableStore`] or [`crate::BlobStore`] backend.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("store client is not configured")]
    NotConfigured,
    #[error("store rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("could not decode store response: {0}")]
    Decode(String),
}

/// Outcome taxonomy of every collection operation.
///
/// Views decide how each kind is presented: `Validation` inline next to the
/// control, `NotAuthenticated` as a redirect to the login screen, `Remote` in
/// the activity log.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyncError {
    #[error("{0}")]
    Validation(String),
    #[error("not authenticated")]
    NotAuthenticated,
    #[error("{0}")]
    Remote(String),
}

impl From<StoreError> for SyncError {
    fn from(e: StoreError) -> Self {
        SyncError::Remote(e.to_string())
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(e: serde_json::Error) -> Self {
        SyncError::Remote(StoreError::Decode(e.to_string()).to_string())
    }
}
