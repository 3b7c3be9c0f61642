//! Backing-store abstraction for the commit driver.

use crate::error::StoreResult;
use async_trait::async_trait;
use redline_tracking::Trackable;
use redline_types::EntityId;

/// A remote (or local) persistence boundary for one entity type.
///
/// The tracking model is single-threaded, so implementations are not
/// required to be `Send`; the commit driver runs on the tracking thread
/// under a current-thread runtime.
#[async_trait(?Send)]
pub trait EntityStore<T: Trackable> {
    /// Persists a batch of newly created entities.
    async fn create(&self, items: &[T]) -> StoreResult<()>;

    /// Persists a batch of modified entities.
    async fn update(&self, items: &[T]) -> StoreResult<()>;

    /// Removes one entity by its business identity.
    async fn delete(&self, id: EntityId) -> StoreResult<()>;
}
