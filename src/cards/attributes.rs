//! Printed card attributes.
//!
//! - `CardCategory`: character (holomem), support, yell, oshi
//! - `Color`: card colors, a holomem may carry more than one
//! - `BloomLevel`: Debut, 1st, 2nd, Spot
//! - `AttachmentKind`: how a sub-card hangs off a holomem

use serde::{Deserialize, Serialize};

/// Card category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardCategory {
    /// A holomem. Only characters stand on the stage.
    Character,
    /// Support card (event, item, fan, mascot, tool, staff).
    Support,
    /// Yell (cheer) card, attached to holomems.
    Yell,
    /// Oshi card, sits in the oshi position for the whole game.
    Oshi,
}

impl std::fmt::Display for CardCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            CardCategory::Character => "character",
            CardCategory::Support => "support",
            CardCategory::Yell => "yell",
            CardCategory::Oshi => "oshi",
        };
        write!(f, "{label}")
    }
}

/// Card color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    White,
    Green,
    Red,
    Blue,
    Purple,
    Yellow,
    Colorless,
}

/// Bloom level of a holomem.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BloomLevel {
    Debut,
    First,
    Second,
    /// Spot holomems cannot bloom and are never bloomed into.
    Spot,
}

impl BloomLevel {
    /// The level a card of this level blooms into, if any.
    #[must_use]
    pub fn next(self) -> Option<BloomLevel> {
        match self {
            BloomLevel::Debut => Some(BloomLevel::First),
            BloomLevel::First => Some(BloomLevel::Second),
            BloomLevel::Second | BloomLevel::Spot => None,
        }
    }

    /// Check if a holomem at `self` may bloom into a card at `into`.
    ///
    /// A 1st may also bloom into another 1st.
    #[must_use]
    pub fn can_bloom_into(self, into: BloomLevel) -> bool {
        self.next() == Some(into) || (self == BloomLevel::First && into == BloomLevel::First)
    }
}

/// How a sub-card is attached to a holomem.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    Yell,
    Fan,
    Mascot,
    Tool,
    /// The lower-level holomem left underneath by a bloom.
    BloomStack,
}
