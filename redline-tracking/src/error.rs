//! Error types for the tracking engine.

use redline_types::EntityId;
use thiserror::Error;

/// Result type for tracking operations.
pub type TrackingResult<T> = Result<T, TrackingError>;

/// Errors that can occur in tracking operations.
///
/// Only usage errors surface as `Err`; reconciliation irregularities are
/// encoded in return values so batch operations degrade gracefully.
#[derive(Debug, Error)]
pub enum TrackingError {
    /// The entity has no tracking state. Indicates the embedding code
    /// forgot to call `start_tracking` first.
    #[error("entity {0} is not tracked; call start_tracking first")]
    NotTracked(EntityId),
}
