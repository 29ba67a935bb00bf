//! Entity identifiers.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Next id handed out by [`EntityId::new`]. Zero is never allocated.
static NEXT_ENTITY: AtomicU64 = AtomicU64::new(1);

/// Identifies an actor, prop or collider.
///
/// Hierarchy roots are entity ids as well: a collider on a character's
/// weapon arm reports the character as its root, and hits are deduplicated
/// per root. Ids are allocated in increasing order, so sorting by id gives
/// spawn order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Allocates a fresh id.
    #[must_use]
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(NEXT_ENTITY.fetch_add(1, Ordering::Relaxed))
    }

    /// Wraps an id read from config or a log.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Numeric value, e.g. for seeding per-entity randomness.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl From<u64> for EntityId {
    fn from(raw: u64) -> Self {
        Self::from_raw(raw)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_and_display() {
        let id = EntityId::from(42);
        assert_eq!(id, EntityId::from_raw(42));
        assert_eq!(id.raw(), 42);
        assert_eq!(id.to_string(), "#42");
    }

    #[test]
    fn test_allocation_is_increasing_and_never_zero() {
        let a = EntityId::new();
        let b = EntityId::new();
        assert!(b > a);
        assert_ne!(a.raw(), 0);
    }

    #[test]
    fn test_serializes_as_plain_number() {
        let id = EntityId::from_raw(7);
        let text = toml::to_string(&Wrapper { id }).expect("serialize");
        assert_eq!(text.trim(), "id = 7");
    }

    #[derive(Serialize)]
    struct Wrapper {
        id: EntityId,
    }
}
