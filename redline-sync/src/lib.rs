//! Synchronization protocol for tracked entity collections.
//!
//! Sits on top of `redline-tracking`: the tracker knows *what* changed,
//! this crate pushes those changes through a backing store and settles the
//! tracking state afterwards.
//!
//! ## Components
//!
//! - **[`ChangeSet`]**: partitions a tracked collection into additions,
//!   updates, and deletions
//! - **[`EntityStore`]**: the async persistence boundary a backend
//!   implements per entity type
//! - **[`commit`]**: drives the store calls, re-baselines accepted items,
//!   removes deleted ones, and aggregates per-partition failures into a
//!   [`CommitReport`]
//! - **[`cancel`]**: abandons all pending changes via undo
//!
//! The tracking model is single-threaded; run the commit future on a
//! current-thread runtime alongside the tracker.

mod changeset;
mod commit;
mod error;
mod store;

pub use changeset::ChangeSet;
pub use commit::{CommitReport, cancel, commit};
pub use error::{CommitError, StoreError, StoreResult};
pub use store::EntityStore;
