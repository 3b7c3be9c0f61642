//! Per-entity tracking record: baseline snapshot, status flags, subscribers.

use redline_types::EntityId;
use serde_json::Value;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Callback invoked when a tracked entity changes.
///
/// `Rc` rather than `Arc`: the whole engine runs on one logical thread
/// (a UI event loop), and the registry has no internal locking.
pub type ChangeHandler = Rc<dyn Fn()>;

/// The tracking record for one live entity instance.
///
/// The baseline covers only scalar members; nested entities and collection
/// items carry their own `TrackingState` and are reached by walking the
/// entity's member table.
pub struct TrackingState {
    entity_id: EntityId,
    baseline: BTreeMap<&'static str, Value>,
    added: bool,
    deleted: bool,
    modified: bool,
    selected: bool,
    subscribers: Vec<ChangeHandler>,
}

impl TrackingState {
    pub(crate) fn new(entity_id: EntityId) -> Self {
        Self {
            entity_id,
            baseline: BTreeMap::new(),
            added: false,
            deleted: false,
            modified: false,
            selected: false,
            subscribers: Vec::new(),
        }
    }

    /// Business identity of the tracked entity.
    #[must_use]
    pub fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    /// Last-known-synchronized value of a scalar member.
    #[must_use]
    pub fn baseline_value(&self, member: &str) -> Option<&Value> {
        self.baseline.get(member)
    }

    /// Whether a member is part of the tracked baseline set.
    #[must_use]
    pub fn tracks_member(&self, member: &str) -> bool {
        self.baseline.contains_key(member)
    }

    /// Ordered iteration over the baseline snapshot.
    pub fn baseline(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.baseline.iter().map(|(k, v)| (*k, v))
    }

    pub(crate) fn snapshot(&mut self, member: &'static str, value: Value) {
        self.baseline.insert(member, value);
    }

    #[must_use]
    pub fn added(&self) -> bool {
        self.added
    }

    #[must_use]
    pub fn deleted(&self) -> bool {
        self.deleted
    }

    /// Whether the entity was force-flagged as modified.
    #[must_use]
    pub fn modified(&self) -> bool {
        self.modified
    }

    /// The batch-selection flag, orthogonal to change state.
    #[must_use]
    pub fn selected(&self) -> bool {
        self.selected
    }

    pub(crate) fn set_added(&mut self, value: bool) {
        if self.added != value {
            self.added = value;
            self.notify();
        }
    }

    pub(crate) fn set_deleted(&mut self, value: bool) {
        if self.deleted != value {
            self.deleted = value;
            self.notify();
        }
    }

    pub(crate) fn set_modified(&mut self, value: bool) {
        if self.modified != value {
            self.modified = value;
            self.notify();
        }
    }

    pub(crate) fn set_selected(&mut self, value: bool) {
        if self.selected != value {
            self.selected = value;
            self.notify();
        }
    }

    pub(crate) fn subscribe(&mut self, handler: ChangeHandler) {
        self.subscribers.push(handler);
    }

    pub(crate) fn subscribers(&self) -> &[ChangeHandler] {
        &self.subscribers
    }

    /// Invokes every registered subscriber.
    pub(crate) fn notify(&self) {
        for handler in &self.subscribers {
            handler();
        }
    }
}
