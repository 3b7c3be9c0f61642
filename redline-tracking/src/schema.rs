//! Per-type resolution of trackable members.
//!
//! Each graph walker creates one `SchemaCache` for the duration of a single
//! top-level operation: repeated-type cost inside one walk is amortized,
//! while the cache itself never outlives the call, so there is no unbounded
//! process-wide growth.

use crate::entity::{Member, Trackable};
use std::any::TypeId;
use std::collections::HashMap;
use std::rc::Rc;

/// Caches the filtered member list per concrete entity type.
///
/// Resolution never fails: members excluded by policy simply do not appear
/// in the resolved list.
#[derive(Default)]
pub struct SchemaCache {
    members: HashMap<TypeId, Rc<[Member]>>,
}

impl SchemaCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the trackable members of `entity`'s concrete type, in
    /// declaration order.
    pub fn resolve(&mut self, entity: &dyn Trackable) -> Rc<[Member]> {
        let type_id = entity.as_any().type_id();
        if let Some(cached) = self.members.get(&type_id) {
            return Rc::clone(cached);
        }

        let resolved: Rc<[Member]> = entity
            .members()
            .iter()
            .filter(|m| m.is_trackable())
            .copied()
            .collect();
        self.members.insert(type_id, Rc::clone(&resolved));
        resolved
    }
}
