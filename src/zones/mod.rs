//! Zone system for card locations.
//!
//! Every player owns the same fixed set of zones. Ordered zones (deck, life,
//! yell deck, holopower) keep index 0 as the top card; stage zones hold the
//! holomems currently in play.
//!
//! ## Key Types
//!
//! - `Zone`: the ten per-player zones
//! - `Position`: where to insert a card (top, bottom, index)
//! - `ZoneManager`: card storage and lookup
//! - `GameStateView` / `GameStateMutator`: the narrow contracts effects use

pub mod manager;
pub mod view;

pub use manager::{Position, ZoneManager};
pub use view::{DamageKind, DamageOutcome, GameStateMutator, GameStateView};

use serde::{Deserialize, Serialize};

/// A per-player card zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Deck,
    Hand,
    /// The single center holomem.
    Center,
    /// The single collab holomem.
    Collab,
    /// Back row holomems.
    Back,
    Archive,
    Life,
    Holopower,
    YellDeck,
    Oshi,
}

impl Zone {
    pub const ALL: [Zone; 10] = [
        Zone::Deck,
        Zone::Hand,
        Zone::Center,
        Zone::Collab,
        Zone::Back,
        Zone::Archive,
        Zone::Life,
        Zone::Holopower,
        Zone::YellDeck,
        Zone::Oshi,
    ];

    /// Zones that count as "on stage" for listener eligibility.
    pub const STAGE: [Zone; 4] = [Zone::Center, Zone::Collab, Zone::Back, Zone::Oshi];

    /// Check if a card here is on the stage.
    #[must_use]
    pub fn is_stage(self) -> bool {
        Self::STAGE.contains(&self)
    }

    /// Holomem positions (the stage without the oshi).
    #[must_use]
    pub fn is_holomem_position(self) -> bool {
        matches!(self, Zone::Center | Zone::Collab | Zone::Back)
    }

    /// Zones that hold at most one card.
    #[must_use]
    pub fn is_single_slot(self) -> bool {
        matches!(self, Zone::Center | Zone::Collab | Zone::Oshi)
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Zone::Deck => "deck",
            Zone::Hand => "hand",
            Zone::Center => "center",
            Zone::Collab => "collab",
            Zone::Back => "back",
            Zone::Archive => "archive",
            Zone::Life => "life",
            Zone::Holopower => "holopower",
            Zone::YellDeck => "yell deck",
            Zone::Oshi => "oshi",
        };
        write!(f, "{label}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_zones() {
        assert!(Zone::Center.is_stage());
        assert!(Zone::Oshi.is_stage());
        assert!(!Zone::Oshi.is_holomem_position());
        assert!(!Zone::Hand.is_stage());
        assert!(!Zone::Archive.is_stage());
    }

    #[test]
    fn test_display() {
        assert_eq!(Zone::Hand.to_string(), "hand");
        assert_eq!(Zone::YellDeck.to_string(), "yell deck");
    }
}
