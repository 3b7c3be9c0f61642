//! Error types for the commit protocol.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors a backing store can report while persisting a batch.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store rejected the payload (validation, conflict, permission).
    #[error("store rejected the request: {0}")]
    Rejected(String),

    /// The store could not be reached.
    #[error("transport error: {0}")]
    Transport(String),
}

/// One failed step of a commit, kept in user-presentable form.
///
/// A commit keeps going after a partition fails; every failure is recorded
/// as one of these so the caller can show the full list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommitError {
    /// Short heading for the failed step.
    pub title: String,
    /// The store's own description of what went wrong.
    pub message: String,
}

impl CommitError {
    pub(crate) fn new(title: &str, error: &StoreError) -> Self {
        Self {
            title: title.to_owned(),
            message: error.to_string(),
        }
    }
}
