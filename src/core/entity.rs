//! Entity identification for cards in play.
//!
//! Every card instance created during a match has a unique `EntityId`.
//! Two copies of the same card number in one deck are different entities,
//! which is what lets the usage ledger and the trigger dispatcher tell them
//! apart.
//!
//! ## Usage
//!
//! ```
//! use holo_ccg::core::EntityId;
//!
//! let first = EntityId::new(1);
//! let second = first.next();
//!
//! assert_ne!(first, second);
//! assert_eq!(second.raw(), 2);
//! ```

use serde::{Deserialize, Serialize};

/// Unique identifier for a card instance within one match.
///
/// IDs are allocated by `GameState::alloc_entity` and never reused, so an
/// ID that was valid earlier in the match can only ever refer to that card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Create an entity ID from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// The ID allocated right after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}
