//! Stable remapping of entity ids when duplicating a graph.

use redline_types::EntityId;
use std::collections::HashMap;

/// Maps source [`EntityId`]s to freshly generated ones, stably.
///
/// When duplicating an entity graph, every copy needs a new business id,
/// but references between copied entities must stay consistent: asking for
/// the same source id twice returns the same fresh id.
#[derive(Debug, Default)]
pub struct IdMap {
    map: HashMap<EntityId, EntityId>,
}

impl IdMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the fresh id for `source`, generating one on first sight.
    pub fn map_id(&mut self, source: EntityId) -> EntityId {
        *self.map.entry(source).or_insert_with(EntityId::new)
    }

    /// Number of distinct source ids seen so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
