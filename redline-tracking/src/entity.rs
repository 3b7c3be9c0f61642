//! The contract a domain type implements to participate in change tracking.
//!
//! Each entity type declares an explicit, compiler-checked member table
//! ([`Trackable::members`]) and exposes its members by name. Scalar values
//! travel as [`serde_json::Value`], which gives null-safe value equality for
//! baseline comparison without the engine knowing concrete field types.

use redline_types::{EntityId, TrackId};
use serde_json::Value;
use std::any::Any;

/// Classification of a trackable member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// A plain value compared against the baseline snapshot.
    Scalar,
    /// A single nested trackable entity.
    Nested,
    /// A plural container of trackable entities.
    Collection,
}

/// Per-member tracking policy.
///
/// `Default` defers to the not-persisted marker; an explicit `Track` or
/// `Ignore` overrides it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberPolicy {
    Default,
    Track,
    Ignore,
}

/// One entry in an entity type's member table.
#[derive(Debug, Clone, Copy)]
pub struct Member {
    pub name: &'static str,
    pub kind: MemberKind,
    pub policy: MemberPolicy,
    /// Marks a member that exists on the type but is never persisted
    /// (computed caches, display-only values).
    pub not_persisted: bool,
}

impl Member {
    const fn new(name: &'static str, kind: MemberKind) -> Self {
        Self {
            name,
            kind,
            policy: MemberPolicy::Default,
            not_persisted: false,
        }
    }

    /// Shorthand for a scalar member.
    #[must_use]
    pub const fn scalar(name: &'static str) -> Self {
        Self::new(name, MemberKind::Scalar)
    }

    /// Shorthand for a single nested entity member.
    #[must_use]
    pub const fn nested(name: &'static str) -> Self {
        Self::new(name, MemberKind::Nested)
    }

    /// Shorthand for a collection member.
    #[must_use]
    pub const fn collection(name: &'static str) -> Self {
        Self::new(name, MemberKind::Collection)
    }

    /// Forces tracking even when the member is marked not-persisted.
    #[must_use]
    pub const fn track(mut self) -> Self {
        self.policy = MemberPolicy::Track;
        self
    }

    /// Excludes the member from tracking unconditionally.
    #[must_use]
    pub const fn ignore(mut self) -> Self {
        self.policy = MemberPolicy::Ignore;
        self
    }

    /// Marks the member as not persisted; excluded unless `track()` is set.
    #[must_use]
    pub const fn not_persisted(mut self) -> Self {
        self.not_persisted = true;
        self
    }

    /// Whether the member participates in tracking.
    #[must_use]
    pub fn is_trackable(&self) -> bool {
        match self.policy {
            MemberPolicy::Track => true,
            MemberPolicy::Ignore => false,
            MemberPolicy::Default => !self.not_persisted,
        }
    }
}

/// A domain object participating in change tracking.
///
/// Implementations are plain data holders; all tracking state lives in the
/// [`Tracker`](crate::Tracker). The accessor methods address members by the
/// names declared in [`members`](Trackable::members); a name that does not
/// match a member of the requested kind returns `Value::Null` / `None`,
/// mirroring the resolver rule that non-conforming members are simply
/// excluded rather than failing.
pub trait Trackable: Any {
    /// Business identity, shared by all copies of the same logical entity.
    fn entity_id(&self) -> EntityId;

    /// Instance identity of this live copy; the registry key.
    fn track_id(&self) -> TrackId;

    /// The type's member table, in declaration order.
    fn members(&self) -> &'static [Member];

    /// Reads a scalar member.
    fn scalar(&self, member: &str) -> Value;

    /// Writes a scalar member.
    fn set_scalar(&mut self, member: &str, value: Value);

    /// Borrows a single nested entity member, if present.
    fn nested(&self, member: &str) -> Option<&dyn Trackable> {
        let _ = member;
        None
    }

    /// Mutably borrows a single nested entity member, if present.
    fn nested_mut(&mut self, member: &str) -> Option<&mut dyn Trackable> {
        let _ = member;
        None
    }

    /// Replaces a nested member with a deep copy of `source`.
    ///
    /// Returns false if `source` is not the member's concrete type. The copy
    /// keeps `source`'s [`TrackId`], so it adopts `source`'s tracking state.
    fn adopt_nested(&mut self, member: &str, source: &dyn Trackable) -> bool {
        let _ = (member, source);
        false
    }

    /// Borrows a collection member, if present.
    fn collection(&self, member: &str) -> Option<&dyn TrackableList> {
        let _ = member;
        None
    }

    /// Mutably borrows a collection member, if present.
    fn collection_mut(&mut self, member: &str) -> Option<&mut dyn TrackableList> {
        let _ = member;
        None
    }

    /// Upcast for concrete-type inspection (schema cache, adoption).
    fn as_any(&self) -> &dyn Any;
}

/// Object-safe view of a plural container of trackable entities.
pub trait TrackableList {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, index: usize) -> Option<&dyn Trackable>;

    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Trackable>;

    /// Removes the item at `index`.
    fn remove(&mut self, index: usize);

    /// Appends a clone of `item`; returns false if `item` is not the
    /// element type. The clone keeps `item`'s [`TrackId`].
    fn push_clone_of(&mut self, item: &dyn Trackable) -> bool;

    /// Index of the first item with the given business identity.
    fn position_of(&self, id: EntityId) -> Option<usize> {
        (0..self.len()).find(|&i| self.get(i).is_some_and(|e| e.entity_id() == id))
    }
}

impl<T: Trackable + Clone> TrackableList for Vec<T> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn get(&self, index: usize) -> Option<&dyn Trackable> {
        self.as_slice().get(index).map(|e| e as &dyn Trackable)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Trackable> {
        self.as_mut_slice()
            .get_mut(index)
            .map(|e| e as &mut dyn Trackable)
    }

    fn remove(&mut self, index: usize) {
        Vec::remove(self, index);
    }

    fn push_clone_of(&mut self, item: &dyn Trackable) -> bool {
        match item.as_any().downcast_ref::<T>() {
            Some(concrete) => {
                self.push(concrete.clone());
                true
            }
            None => false,
        }
    }
}
