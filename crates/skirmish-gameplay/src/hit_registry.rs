//! Per-swing hit deduplication.

use ahash::AHashSet;
use skirmish_common::EntityId;

/// Set of targets already struck by the current swing.
///
/// Cleared at the start of every swing; a target present in the set is never
/// damaged again until the next clear.
#[derive(Debug, Clone, Default)]
pub struct HitRegistry {
    hits: AHashSet<EntityId>,
}

impl HitRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets every recorded hit.
    pub fn clear(&mut self) {
        self.hits.clear();
    }

    /// Records a hit. Returns false if the target was already registered.
    pub fn register(&mut self, target: EntityId) -> bool {
        self.hits.insert(target)
    }

    /// Checks whether the target was already hit this swing.
    #[must_use]
    pub fn contains(&self, target: EntityId) -> bool {
        self.hits.contains(&target)
    }

    /// Number of distinct targets hit this swing.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// Returns true if nothing was hit.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}
