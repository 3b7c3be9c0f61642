//! The tracking context: identity registry plus the recursive graph walkers.

use crate::entity::{MemberKind, Trackable, TrackableList};
use crate::error::{TrackingError, TrackingResult};
use crate::schema::SchemaCache;
use crate::state::{ChangeHandler, TrackingState};
use redline_types::{EntityId, TrackId};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, trace};

/// Change-tracking context for one edit session.
///
/// Owns the mapping from instance identity ([`TrackId`]) to
/// [`TrackingState`]. Create one per edit session and discard it when the
/// session completes; nothing is persisted. All access is single-threaded —
/// the registry has no internal locking, and subscribers are `Rc` callbacks.
///
/// An entity either has no tracking state (untracked) or exactly one;
/// starting tracking twice replaces the prior state.
#[derive(Default)]
pub struct Tracker {
    pub(crate) states: HashMap<TrackId, TrackingState>,
}

impl Tracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn state(&self, entity: &dyn Trackable) -> TrackingResult<&TrackingState> {
        self.states
            .get(&entity.track_id())
            .ok_or(TrackingError::NotTracked(entity.entity_id()))
    }

    pub(crate) fn state_mut(
        &mut self,
        entity: &dyn Trackable,
    ) -> TrackingResult<&mut TrackingState> {
        self.states
            .get_mut(&entity.track_id())
            .ok_or(TrackingError::NotTracked(entity.entity_id()))
    }

    // ── Start / stop tracking ─────────────────────────────────────

    /// Takes a baseline snapshot of `entity` and every trackable entity
    /// reachable from it, registering (or replacing) tracking state for each.
    ///
    /// Collection items that are already tracked and flagged deleted are
    /// treated as staged deletions from a previous cycle: they are removed
    /// from the container and unregistered rather than re-tracked.
    pub fn start_tracking(&mut self, entity: &mut dyn Trackable) {
        debug!(entity = %entity.entity_id(), "start tracking");
        let mut cache = SchemaCache::new();
        self.track_graph(entity, &mut cache);
    }

    /// Whole-collection overload of [`start_tracking`](Self::start_tracking);
    /// the schema cache is shared across the walk.
    pub fn start_tracking_all<T: Trackable>(&mut self, items: &mut [T]) {
        let mut cache = SchemaCache::new();
        for item in items.iter_mut() {
            self.track_graph(item, &mut cache);
        }
    }

    pub(crate) fn track_graph(&mut self, entity: &mut dyn Trackable, cache: &mut SchemaCache) {
        let members = cache.resolve(entity);
        let mut state = TrackingState::new(entity.entity_id());

        for member in members.iter() {
            match member.kind {
                MemberKind::Scalar => {
                    state.snapshot(member.name, entity.scalar(member.name));
                }
                MemberKind::Nested => {
                    if let Some(child) = entity.nested_mut(member.name) {
                        self.track_graph(child, cache);
                    }
                }
                MemberKind::Collection => {
                    if let Some(list) = entity.collection_mut(member.name) {
                        self.track_list(list, cache);
                    }
                }
            }
        }

        self.states.insert(entity.track_id(), state);
    }

    fn track_list(&mut self, list: &mut dyn TrackableList, cache: &mut SchemaCache) {
        // A tracked item still flagged deleted is a staged delete from a
        // previous cycle; it is finalized here instead of re-tracked.
        let mut finalized: Vec<(usize, TrackId)> = Vec::new();
        for i in 0..list.len() {
            if let Some(item) = list.get(i) {
                let track_id = item.track_id();
                if self.states.get(&track_id).is_some_and(TrackingState::deleted) {
                    finalized.push((i, track_id));
                }
            }
        }

        for i in 0..list.len() {
            if finalized.iter().any(|&(index, _)| index == i) {
                continue;
            }
            if let Some(item) = list.get_mut(i) {
                self.track_graph(item, cache);
            }
        }

        for &(index, track_id) in finalized.iter().rev() {
            trace!(%track_id, "pruning staged delete");
            self.states.remove(&track_id);
            list.remove(index);
        }
    }

    /// Removes `entity`'s registry entry and drops its subscribers.
    ///
    /// Not recursive: children remain tracked independently.
    pub fn stop_tracking(&mut self, entity: &dyn Trackable) {
        self.states.remove(&entity.track_id());
    }

    /// Whole-collection overload of [`stop_tracking`](Self::stop_tracking).
    pub fn stop_tracking_all<T: Trackable>(&mut self, items: &[T]) {
        for item in items {
            self.stop_tracking(item);
        }
    }

    /// Whether `entity` currently has tracking state.
    #[must_use]
    pub fn is_tracking(&self, entity: &dyn Trackable) -> bool {
        self.states.contains_key(&entity.track_id())
    }

    /// Whether every item in the collection is tracked.
    #[must_use]
    pub fn is_tracking_all<T: Trackable>(&self, items: &[T]) -> bool {
        items.iter().all(|item| self.is_tracking(item))
    }

    // ── Change detection ──────────────────────────────────────────

    /// Whether `entity` is newly created, directly or anywhere beneath it.
    ///
    /// Propagates through both single nested members and collections; an
    /// added entity short-circuits its own subtree.
    pub fn is_new(&self, entity: &dyn Trackable) -> TrackingResult<bool> {
        let mut cache = SchemaCache::new();
        self.is_new_inner(entity, &mut cache)
    }

    fn is_new_inner(
        &self,
        entity: &dyn Trackable,
        cache: &mut SchemaCache,
    ) -> TrackingResult<bool> {
        let state = self.state(entity)?;
        if state.added() {
            return Ok(true);
        }

        for member in cache.resolve(entity).iter() {
            match member.kind {
                MemberKind::Scalar => {}
                MemberKind::Nested => {
                    if let Some(child) = entity.nested(member.name)
                        && self.is_new_inner(child, cache)?
                    {
                        return Ok(true);
                    }
                }
                MemberKind::Collection => {
                    if let Some(list) = entity.collection(member.name) {
                        for i in 0..list.len() {
                            if let Some(item) = list.get(i)
                                && self.is_new_inner(item, cache)?
                            {
                                return Ok(true);
                            }
                        }
                    }
                }
            }
        }
        Ok(false)
    }

    /// Whether `entity` is marked for removal, directly or via deleted items
    /// in its collections. A deleted parent supersedes its children.
    pub fn is_deleted(&self, entity: &dyn Trackable) -> TrackingResult<bool> {
        let mut cache = SchemaCache::new();
        self.is_deleted_inner(entity, &mut cache, None)
    }

    /// Like [`is_deleted`](Self::is_deleted), additionally collecting the
    /// business ids of every deleted entity found in the walk.
    pub fn is_deleted_with_items(
        &self,
        entity: &dyn Trackable,
    ) -> TrackingResult<(bool, Vec<EntityId>)> {
        let mut cache = SchemaCache::new();
        let mut items = Vec::new();
        let deleted = self.is_deleted_inner(entity, &mut cache, Some(&mut items))?;
        Ok((deleted, items))
    }

    fn is_deleted_inner(
        &self,
        entity: &dyn Trackable,
        cache: &mut SchemaCache,
        mut collector: Option<&mut Vec<EntityId>>,
    ) -> TrackingResult<bool> {
        let state = self.state(entity)?;
        // A deleted parent supersedes its children.
        if state.deleted() {
            if let Some(items) = collector.as_deref_mut() {
                items.push(state.entity_id());
            }
            return Ok(true);
        }

        let mut has_deletes = false;
        for member in cache.resolve(entity).iter() {
            if member.kind != MemberKind::Collection {
                continue;
            }
            if let Some(list) = entity.collection(member.name) {
                for i in 0..list.len() {
                    if let Some(item) = list.get(i)
                        && self.is_deleted_inner(item, cache, collector.as_deref_mut())?
                    {
                        if collector.is_none() {
                            return Ok(true);
                        }
                        has_deletes = true;
                    }
                }
            }
        }
        Ok(has_deletes)
    }

    /// Whether any tracked scalar diverges from its baseline, here or below.
    ///
    /// A force-flagged entity is always modified. A new or deleted entity
    /// reports `include_add_delete` instead of inspecting its members.
    pub fn is_modified(
        &self,
        entity: &dyn Trackable,
        include_add_delete: bool,
    ) -> TrackingResult<bool> {
        let mut cache = SchemaCache::new();
        self.is_modified_inner(entity, include_add_delete, &mut cache)
    }

    fn is_modified_inner(
        &self,
        entity: &dyn Trackable,
        include_add_delete: bool,
        cache: &mut SchemaCache,
    ) -> TrackingResult<bool> {
        let state = self.state(entity)?;
        if state.modified() {
            return Ok(true);
        }
        if state.added() || state.deleted() {
            return Ok(include_add_delete);
        }

        for member in cache.resolve(entity).iter() {
            match member.kind {
                MemberKind::Scalar => {
                    if let Some(baseline) = state.baseline_value(member.name)
                        && *baseline != entity.scalar(member.name)
                    {
                        return Ok(true);
                    }
                }
                MemberKind::Nested => {
                    if let Some(child) = entity.nested(member.name)
                        && self.is_modified_inner(child, include_add_delete, cache)?
                    {
                        return Ok(true);
                    }
                }
                MemberKind::Collection => {
                    if let Some(list) = entity.collection(member.name) {
                        for i in 0..list.len() {
                            if let Some(item) = list.get(i)
                                && self.is_modified_inner(item, include_add_delete, cache)?
                            {
                                return Ok(true);
                            }
                        }
                    }
                }
            }
        }
        Ok(false)
    }

    /// Whether `entity` is new, deleted, or modified.
    pub fn has_changes(&self, entity: &dyn Trackable) -> TrackingResult<bool> {
        let mut cache = SchemaCache::new();
        if self.is_new_inner(entity, &mut cache)? {
            return Ok(true);
        }
        if self.is_deleted_inner(entity, &mut cache, None)? {
            return Ok(true);
        }
        self.is_modified_inner(entity, false, &mut cache)
    }

    /// Whether any item in the collection has changes.
    pub fn has_changes_all<T: Trackable>(&self, items: &[T]) -> TrackingResult<bool> {
        let mut cache = SchemaCache::new();
        for item in items {
            if self.is_new_inner(item, &mut cache)?
                || self.is_deleted_inner(item, &mut cache, None)?
                || self.is_modified_inner(item, false, &mut cache)?
            {
                return Ok(true);
            }
        }
        Ok(false)
    }

    // ── Status flags ──────────────────────────────────────────────

    /// Marks `entity` for removal.
    pub fn delete(&mut self, entity: &dyn Trackable) -> TrackingResult<()> {
        self.state_mut(entity)?.set_deleted(true);
        Ok(())
    }

    /// Force-flags `entity` as modified even when no scalar diff is
    /// detectable.
    pub fn mark_modified(&mut self, entity: &dyn Trackable) -> TrackingResult<()> {
        self.state_mut(entity)?.set_modified(true);
        Ok(())
    }

    /// Starts tracking `entity` and flags it as newly created.
    ///
    /// When `parent` is supplied, the new entity inherits the parent's
    /// change subscribers, so edits to it reach the same listeners.
    pub fn mark_new(
        &mut self,
        entity: &mut dyn Trackable,
        parent: Option<&dyn Trackable>,
    ) -> TrackingResult<()> {
        let inherited: Vec<ChangeHandler> = match parent {
            Some(parent) => self.state(parent)?.subscribers().to_vec(),
            None => Vec::new(),
        };

        self.start_tracking(entity);
        let state = self.state_mut(entity)?;
        for handler in inherited {
            state.subscribe(handler);
        }
        state.set_added(true);
        Ok(())
    }

    // ── Undo ──────────────────────────────────────────────────────

    /// Restores `entity`'s scalar members from the baseline and clears all
    /// status flags.
    ///
    /// Not recursive: nested entities keep their own flags and baselines.
    /// Callers wanting a full-graph undo walk the graph themselves (or use
    /// [`undo_all`](Self::undo_all) for a flat collection).
    pub fn undo(&mut self, entity: &mut dyn Trackable) -> TrackingResult<()> {
        let track_id = entity.track_id();
        let state = self
            .states
            .get_mut(&track_id)
            .ok_or(TrackingError::NotTracked(entity.entity_id()))?;

        state.set_deleted(false);
        state.set_added(false);
        state.set_modified(false);
        state.set_selected(false);

        let restores: Vec<(&'static str, Value)> = state
            .baseline()
            .filter(|(name, baseline)| entity.scalar(name) != **baseline)
            .map(|(name, baseline)| (name, baseline.clone()))
            .collect();
        let reverted = !restores.is_empty();
        for (name, value) in restores {
            entity.set_scalar(name, value);
        }
        if reverted && let Some(state) = self.states.get(&track_id) {
            state.notify();
        }
        Ok(())
    }

    /// Whole-collection overload of [`undo`](Self::undo).
    pub fn undo_all<T: Trackable>(&mut self, items: &mut [T]) -> TrackingResult<()> {
        for item in items.iter_mut() {
            self.undo(item)?;
        }
        Ok(())
    }

    // ── Change notification ───────────────────────────────────────

    /// Registers `handler` on `entity` and on every entity reachable
    /// through its collection members.
    ///
    /// Handlers fire on status-flag transitions and on tracked writes made
    /// through [`edit_scalar`](Self::edit_scalar). Mutations applied
    /// directly to the entity are still detected by the queries, but only
    /// on the next explicit check.
    pub fn when_changed(
        &mut self,
        entity: &dyn Trackable,
        handler: ChangeHandler,
    ) -> TrackingResult<()> {
        let mut cache = SchemaCache::new();
        self.when_changed_inner(entity, &handler, &mut cache)
    }

    /// Whole-collection overload of [`when_changed`](Self::when_changed).
    pub fn when_changed_all<T: Trackable>(
        &mut self,
        items: &[T],
        handler: ChangeHandler,
    ) -> TrackingResult<()> {
        let mut cache = SchemaCache::new();
        for item in items {
            self.when_changed_inner(item, &handler, &mut cache)?;
        }
        Ok(())
    }

    fn when_changed_inner(
        &mut self,
        entity: &dyn Trackable,
        handler: &ChangeHandler,
        cache: &mut SchemaCache,
    ) -> TrackingResult<()> {
        self.state_mut(entity)?.subscribe(handler.clone());

        for member in cache.resolve(entity).iter() {
            if member.kind != MemberKind::Collection {
                continue;
            }
            if let Some(list) = entity.collection(member.name) {
                for i in 0..list.len() {
                    if let Some(item) = list.get(i) {
                        self.when_changed_inner(item, handler, cache)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Writes a scalar member through the tracker, notifying subscribers
    /// when the live value actually changes and the member is part of the
    /// tracked baseline set.
    pub fn edit_scalar(
        &mut self,
        entity: &mut dyn Trackable,
        member: &str,
        value: Value,
    ) -> TrackingResult<()> {
        let track_id = entity.track_id();
        let tracked = self
            .states
            .get(&track_id)
            .ok_or(TrackingError::NotTracked(entity.entity_id()))?
            .tracks_member(member);

        if entity.scalar(member) != value {
            entity.set_scalar(member, value);
            if tracked && let Some(state) = self.states.get(&track_id) {
                state.notify();
            }
        }
        Ok(())
    }

    // ── Batch-selection flag ──────────────────────────────────────

    /// Sets the batch-selection flag. Fires change notification but never
    /// affects `has_changes`/`is_modified`.
    pub fn select(&mut self, entity: &dyn Trackable) -> TrackingResult<()> {
        self.state_mut(entity)?.set_selected(true);
        Ok(())
    }

    /// Clears the batch-selection flag.
    pub fn deselect(&mut self, entity: &dyn Trackable) -> TrackingResult<()> {
        self.state_mut(entity)?.set_selected(false);
        Ok(())
    }

    /// Whether `entity` is selected for a batch action.
    pub fn is_selected(&self, entity: &dyn Trackable) -> TrackingResult<bool> {
        Ok(self.state(entity)?.selected())
    }

    /// Whether any item in the collection is selected.
    pub fn is_any_selected<T: Trackable>(&self, items: &[T]) -> TrackingResult<bool> {
        for item in items {
            if self.is_selected(item)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
