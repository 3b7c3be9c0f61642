//! Unit-of-work change tracking for entity graphs.
//!
//! Answers three questions per entity or entity graph edited client-side:
//! has it changed since it was last synchronized, is it newly created, and
//! is it marked for deletion — and supports reverting edits and reconciling
//! two independently-mutated copies of the same logical graph.
//!
//! - [`Trackable`] / [`TrackableList`] — the contract a domain type
//!   implements: identifiers plus an explicit member table
//! - [`Tracker`] — the per-session context owning all tracking state,
//!   with the graph walkers (track/untrack, change detection, undo,
//!   notification, merge/update)
//! - [`TrackingState`] — per-entity baseline snapshot, status flags, and
//!   change subscribers
//! - [`NotifyList`] — a list reporting its own structural mutations
//! - [`IdMap`] — stable id remapping for graph duplication
//!
//! The engine performs no I/O and defines no wire format; synchronization
//! is a collaborator concern built on top of the queries here. All access
//! is single-threaded by design.

mod entity;
mod error;
mod id_map;
mod merge;
mod notify_list;
mod schema;
mod state;
mod tracker;

pub use entity::{Member, MemberKind, MemberPolicy, Trackable, TrackableList};
pub use error::{TrackingError, TrackingResult};
pub use id_map::IdMap;
pub use notify_list::NotifyList;
pub use schema::SchemaCache;
pub use state::{ChangeHandler, TrackingState};
pub use tracker::Tracker;
