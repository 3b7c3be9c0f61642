//! The commit driver: pushes a tracked collection's pending changes through
//! an [`EntityStore`] and re-baselines what the store accepted.

use crate::changeset::ChangeSet;
use crate::error::CommitError;
use crate::store::EntityStore;
use redline_tracking::{Trackable, Tracker, TrackingResult};
use tracing::{debug, warn};

/// Outcome of one [`commit`] run.
///
/// A commit never aborts early: a failed partition is recorded in `errors`
/// and the remaining partitions still run. The counters only cover what the
/// store actually accepted.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CommitReport {
    /// Entities the store created.
    pub created: usize,
    /// Entities the store updated.
    pub updated: usize,
    /// Entities the store deleted.
    pub deleted: usize,
    /// One record per failed store call.
    pub errors: Vec<CommitError>,
}

impl CommitReport {
    /// True when every store call succeeded.
    pub fn succeeded(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Pushes all pending changes in `items` through `store`.
///
/// Additions and updates go out as one batch each; deletions go out one id
/// at a time, expanded to cover deleted items nested below each flagged
/// entry. Items whose store call succeeds are re-tracked, making their live
/// state the new baseline; directly deleted items are removed from `items`
/// instead. Items whose store call fails keep their flags and baseline, so
/// a later commit retries them.
pub async fn commit<T, S>(
    tracker: &mut Tracker,
    items: &mut Vec<T>,
    store: &S,
) -> TrackingResult<CommitReport>
where
    T: Trackable + Clone,
    S: EntityStore<T>,
{
    let set = ChangeSet::partition(tracker, items)?;
    let mut report = CommitReport::default();

    if !set.additions.is_empty() {
        let batch: Vec<T> = set.additions.iter().map(|&i| items[i].clone()).collect();
        debug!(count = batch.len(), "committing additions");
        match store.create(&batch).await {
            Ok(()) => {
                for &index in &set.additions {
                    tracker.start_tracking(&mut items[index]);
                }
                report.created = set.additions.len();
            }
            Err(err) => {
                warn!(%err, "create batch failed");
                report.errors.push(CommitError::new("Failed to Create", &err));
            }
        }
    }

    if !set.updates.is_empty() {
        let batch: Vec<T> = set.updates.iter().map(|&i| items[i].clone()).collect();
        debug!(count = batch.len(), "committing updates");
        match store.update(&batch).await {
            Ok(()) => {
                for &index in &set.updates {
                    tracker.start_tracking(&mut items[index]);
                }
                report.updated = set.updates.len();
            }
            Err(err) => {
                warn!(%err, "update batch failed");
                report.errors.push(CommitError::new("Failed to Update", &err));
            }
        }
    }

    // Indices to drop from the live collection, gathered first so removal
    // can run back to front.
    let mut remove: Vec<usize> = Vec::new();
    for &index in &set.deletions {
        let (_, ids) = tracker.is_deleted_with_items(&items[index])?;
        let own_id = items[index].entity_id();
        let directly_deleted = ids.contains(&own_id);
        let mut all_ok = true;
        for id in ids {
            debug!(%id, "committing deletion");
            if let Err(err) = store.delete(id).await {
                warn!(%id, %err, "delete failed");
                all_ok = false;
                report.errors.push(CommitError::new("Failed to Delete", &err));
            } else {
                report.deleted += 1;
            }
        }
        if all_ok {
            if directly_deleted {
                remove.push(index);
            } else {
                // Only nested items were deleted; re-tracking prunes them
                // and re-baselines the survivor.
                tracker.start_tracking(&mut items[index]);
            }
        }
    }

    for &index in remove.iter().rev() {
        let item = items.remove(index);
        tracker.stop_tracking(&item);
    }

    Ok(report)
}

/// Abandons every pending change in `items`, restoring tracked baselines
/// and clearing flags.
pub fn cancel<T: Trackable>(tracker: &mut Tracker, items: &mut [T]) -> TrackingResult<()> {
    tracker.undo_all(items)
}
