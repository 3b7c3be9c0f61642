//! Core type definitions for Redline.
//!
//! This crate defines the identifier types used throughout the change
//! tracking engine:
//! - [`EntityId`] — business identity of a domain entity (UUID v7)
//! - [`TrackId`] — per-instance identity used by the tracking registry (UUID v4)
//!
//! Domain entity types themselves belong to the embedding application; the
//! engine only requires that they expose these two identifiers.

mod ids;

pub use ids::{EntityId, TrackId};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),
}
