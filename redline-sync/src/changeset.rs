//! Partitioning of a tracked collection into pending store operations.

use redline_tracking::{Trackable, Tracker, TrackingResult};

/// Indices of a tracked collection, split by the store operation each item
/// needs. An item appears in at most one partition: deletion wins over
/// addition, and both win over update.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChangeSet {
    /// Items flagged added and not yet persisted.
    pub additions: Vec<usize>,
    /// Items with scalar or forced modifications.
    pub updates: Vec<usize>,
    /// Items staged for removal.
    pub deletions: Vec<usize>,
}

impl ChangeSet {
    /// Splits `items` by pending operation. Every item must be tracked.
    pub fn partition<T: Trackable>(tracker: &Tracker, items: &[T]) -> TrackingResult<Self> {
        let mut set = Self::default();
        for (index, item) in items.iter().enumerate() {
            if tracker.is_deleted(item)? {
                set.deletions.push(index);
            } else if tracker.is_new(item)? {
                set.additions.push(index);
            } else if tracker.is_modified(item, false)? {
                set.updates.push(index);
            }
        }
        Ok(set)
    }

    /// True when no partition has any members.
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.updates.is_empty() && self.deletions.is_empty()
    }
}
