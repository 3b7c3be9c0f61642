//! Reconciliation between two independently-mutated copies of a graph.
//!
//! Two distinct algorithms:
//!
//! - [`merge_tracking`](Tracker::merge_tracking) layers the *changes* held
//!   by a locally-edited source onto a freshly-fetched target, so in-flight
//!   edits survive a reload without losing concurrent server-side changes
//!   to untouched fields.
//! - [`update_tracking`](Tracker::update_tracking) refreshes the
//!   *unmodified* fields of a tracked target from a newer source without
//!   disturbing local edits or any entity's add/delete/modified status.
//!
//! Both match items by business [`EntityId`], never by instance identity;
//! an item with no id match is a candidate addition (merge) or is ignored
//! (update) — never an error.

use crate::entity::{MemberKind, Trackable, TrackableList};
use crate::error::{TrackingError, TrackingResult};
use crate::schema::SchemaCache;
use crate::state::TrackingState;
use crate::tracker::Tracker;
use redline_types::EntityId;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, trace};

impl Tracker {
    /// Rebuilds `target`'s tracking state from its current live values,
    /// then applies any changes present on `source` (relative to `source`'s
    /// own baseline) onto `target`.
    ///
    /// `source` must be tracked; `target` need not be. Afterwards `target`
    /// reads as "source's edits applied on top of target's committed state":
    /// copied source edits show up as changes against the new baseline.
    pub fn merge_tracking(
        &mut self,
        target: &mut dyn Trackable,
        source: &dyn Trackable,
    ) -> TrackingResult<()> {
        debug!(target = %target.entity_id(), source = %source.entity_id(), "merge tracking");
        let mut cache = SchemaCache::new();
        self.merge_entity(target, source, &mut cache)
    }

    /// List-level merge: items present in both are merged recursively,
    /// target-only items are freshly tracked, source items flagged deleted
    /// mark their target counterpart deleted, and source items flagged new
    /// with no target counterpart are appended (as clones sharing the
    /// source item's tracking state).
    pub fn merge_tracking_all(
        &mut self,
        target: &mut dyn TrackableList,
        source: &dyn TrackableList,
    ) -> TrackingResult<()> {
        let mut cache = SchemaCache::new();
        self.merge_list(target, Some(source), &mut cache)
    }

    fn merge_entity(
        &mut self,
        target: &mut dyn Trackable,
        source: &dyn Trackable,
        cache: &mut SchemaCache,
    ) -> TrackingResult<()> {
        let source_baseline: BTreeMap<&'static str, Value> = self
            .state(source)?
            .baseline()
            .map(|(name, value)| (name, value.clone()))
            .collect();

        let mut state = TrackingState::new(target.entity_id());

        for member in cache.resolve(target).iter() {
            match member.kind {
                MemberKind::Scalar => {
                    // Baseline first: a copied source edit must read as a
                    // change against target's pre-merge value.
                    state.snapshot(member.name, target.scalar(member.name));
                    if let Some(baseline) = source_baseline.get(member.name) {
                        let live = source.scalar(member.name);
                        if *baseline != live {
                            trace!(member = member.name, "merging source edit");
                            target.set_scalar(member.name, live);
                        }
                    }
                }
                MemberKind::Collection => {
                    if let Some(target_list) = target.collection_mut(member.name) {
                        self.merge_list(target_list, source.collection(member.name), cache)?;
                    }
                }
                MemberKind::Nested => {
                    if let Some(source_child) = source.nested(member.name) {
                        if self.is_new(source_child)? || self.is_deleted(source_child)? {
                            // Adopt wholesale; the copy shares the source
                            // child's tracking state.
                            target.adopt_nested(member.name, source_child);
                        } else if let Some(target_child) = target.nested_mut(member.name) {
                            self.merge_entity(target_child, source_child, cache)?;
                        }
                    }
                }
            }
        }

        self.states.insert(target.track_id(), state);
        Ok(())
    }

    fn merge_list(
        &mut self,
        target: &mut dyn TrackableList,
        source: Option<&dyn TrackableList>,
        cache: &mut SchemaCache,
    ) -> TrackingResult<()> {
        for i in 0..target.len() {
            let Some(target_item) = target.get_mut(i) else {
                continue;
            };
            let matched = source.and_then(|s| {
                s.position_of(target_item.entity_id())
                    .and_then(|j| s.get(j))
            });
            match matched {
                Some(source_item) => self.merge_entity(target_item, source_item, cache)?,
                None => self.track_graph(target_item, cache),
            }
        }

        let Some(source) = source else {
            return Ok(());
        };

        // Staged deletions on the source carry over to the matching target
        // item.
        for j in 0..source.len() {
            let Some(source_item) = source.get(j) else {
                continue;
            };
            if self.state(source_item)?.deleted()
                && let Some(i) = target.position_of(source_item.entity_id())
                && let Some(target_item) = target.get(i)
            {
                self.delete(target_item)?;
            }
        }

        // Locally added items with no target counterpart carry over as
        // clones sharing the source item's tracking state.
        for j in 0..source.len() {
            let Some(source_item) = source.get(j) else {
                continue;
            };
            if self.state(source_item)?.added()
                && target.position_of(source_item.entity_id()).is_none()
            {
                target.push_clone_of(source_item);
            }
        }
        Ok(())
    }

    /// Refreshes `target`'s unmodified scalar members — live value and
    /// baseline together — from `source`, leaving locally-edited members
    /// and every status flag untouched.
    ///
    /// `target` must be tracked; `source` need not be. Differences brought
    /// in this way are not considered changes.
    pub fn update_tracking(
        &mut self,
        target: &mut dyn Trackable,
        source: &dyn Trackable,
    ) -> TrackingResult<()> {
        debug!(target = %target.entity_id(), source = %source.entity_id(), "update tracking");
        let mut cache = SchemaCache::new();
        self.update_entity(target, source, &mut cache)
    }

    /// List-level update: items are matched by id and updated recursively.
    /// No items are ever added or removed.
    pub fn update_tracking_all(
        &mut self,
        target: &mut dyn TrackableList,
        source: &dyn TrackableList,
    ) -> TrackingResult<()> {
        let mut cache = SchemaCache::new();
        self.update_list(target, source, &mut cache)
    }

    fn update_entity(
        &mut self,
        target: &mut dyn Trackable,
        source: &dyn Trackable,
        cache: &mut SchemaCache,
    ) -> TrackingResult<()> {
        let track_id = target.track_id();
        if !self.states.contains_key(&track_id) {
            return Err(TrackingError::NotTracked(target.entity_id()));
        }

        for member in cache.resolve(target).iter() {
            match member.kind {
                MemberKind::Scalar => {
                    let unmodified = self.states.get(&track_id).is_some_and(|state| {
                        state
                            .baseline_value(member.name)
                            .is_some_and(|baseline| *baseline == target.scalar(member.name))
                    });
                    // Only refresh members with no local edit, so the
                    // update does not clear out unsaved modifications.
                    if unmodified {
                        let value = source.scalar(member.name);
                        target.set_scalar(member.name, value.clone());
                        if let Some(state) = self.states.get_mut(&track_id) {
                            state.snapshot(member.name, value);
                        }
                    }
                }
                MemberKind::Collection => {
                    if let Some(target_list) = target.collection_mut(member.name)
                        && let Some(source_list) = source.collection(member.name)
                    {
                        self.update_list(target_list, source_list, cache)?;
                    }
                }
                MemberKind::Nested => {
                    if let Some(target_child) = target.nested_mut(member.name)
                        && let Some(source_child) = source.nested(member.name)
                    {
                        self.update_entity(target_child, source_child, cache)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn update_list(
        &mut self,
        target: &mut dyn TrackableList,
        source: &dyn TrackableList,
        cache: &mut SchemaCache,
    ) -> TrackingResult<()> {
        for i in 0..target.len() {
            let Some(target_item) = target.get_mut(i) else {
                continue;
            };
            let id: EntityId = target_item.entity_id();
            if let Some(j) = source.position_of(id)
                && let Some(source_item) = source.get(j)
            {
                self.update_entity(target_item, source_item, cache)?;
            }
        }
        Ok(())
    }
}
