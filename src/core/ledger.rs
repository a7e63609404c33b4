//! Usage ledger for limited effects.
//!
//! Tracks how many times each limited effect slot has been used, per player
//! and per card instance. Per-turn counters are cleared at each turn
//! boundary, per-game counters only at game start.
//!
//! The ledger lives inside `GameState`, so it is only reachable through an
//! exclusive borrow during effect resolution. The limit check and the
//! increment for one execution therefore cannot interleave with another
//! execution.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::{EntityId, PlayerId};
use crate::effects::SlotKind;

/// How often an effect slot may be used.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UsageLimit {
    /// No limit.
    #[default]
    Unlimited,
    /// At most N uses per turn.
    PerTurn(u32),
    /// At most N uses per game.
    PerGame(u32),
}

impl UsageLimit {
    /// Check if this limit restricts usage at all.
    #[must_use]
    pub fn is_limited(self) -> bool {
        !matches!(self, UsageLimit::Unlimited)
    }

    /// Check if another use is allowed after `uses` so far.
    #[must_use]
    pub fn allows(self, uses: u32) -> bool {
        match self {
            UsageLimit::Unlimited => true,
            UsageLimit::PerTurn(max) | UsageLimit::PerGame(max) => uses < max,
        }
    }
}

/// Ledger key: one slot of one card instance, for one player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UsageKey {
    pub player: PlayerId,
    pub card: EntityId,
    pub slot: SlotKind,
}

impl UsageKey {
    #[must_use]
    pub fn new(player: PlayerId, card: EntityId, slot: SlotKind) -> Self {
        Self { player, card, slot }
    }
}

/// Per-turn and per-game usage counters.
#[derive(Clone, Debug, Default)]
pub struct UsageLedger {
    per_turn: FxHashMap<UsageKey, u32>,
    per_game: FxHashMap<UsageKey, u32>,
    /// Turn number of the last per-turn reset.
    reset_turn: Option<u32>,
}

impl UsageLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses counted against `limit` so far.
    #[must_use]
    pub fn uses(&self, key: &UsageKey, limit: UsageLimit) -> u32 {
        match limit {
            UsageLimit::Unlimited => 0,
            UsageLimit::PerTurn(_) => self.per_turn.get(key).copied().unwrap_or(0),
            UsageLimit::PerGame(_) => self.per_game.get(key).copied().unwrap_or(0),
        }
    }

    /// Check whether the quota for `key` is already consumed.
    #[must_use]
    pub fn is_exhausted(&self, key: &UsageKey, limit: UsageLimit) -> bool {
        !limit.allows(self.uses(key, limit))
    }

    /// Count one successful use. Unlimited slots are not tracked.
    pub fn record(&mut self, key: UsageKey, limit: UsageLimit) {
        let counters = match limit {
            UsageLimit::Unlimited => return,
            UsageLimit::PerTurn(_) => &mut self.per_turn,
            UsageLimit::PerGame(_) => &mut self.per_game,
        };
        *counters.entry(key).or_insert(0) += 1;
    }

    /// Total limited uses a player has made this turn.
    #[must_use]
    pub fn turn_uses_by(&self, player: PlayerId) -> u32 {
        self.per_turn
            .iter()
            .filter(|(key, _)| key.player == player)
            .map(|(_, &count)| count)
            .sum()
    }

    /// Clear everything. Called exactly once when a game starts.
    pub fn reset_for_game(&mut self) {
        self.per_turn.clear();
        self.per_game.clear();
        self.reset_turn = None;
    }

    /// Clear per-turn counters for the boundary into `turn`.
    ///
    /// Returns `false` without clearing if this turn was already reset, so a
    /// turn controller that announces the same boundary twice cannot wipe
    /// uses made in between.
    pub fn reset_for_turn(&mut self, turn: u32) -> bool {
        if self.reset_turn == Some(turn) {
            return false;
        }
        self.per_turn.clear();
        self.reset_turn = Some(turn);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(card: u32) -> UsageKey {
        UsageKey::new(PlayerId::new(0), EntityId(card), SlotKind::OshiSkill)
    }

    #[test]
    fn test_unlimited_never_exhausts() {
        let mut ledger = UsageLedger::new();
        for _ in 0..10 {
            ledger.record(key(1), UsageLimit::Unlimited);
        }
        assert!(!ledger.is_exhausted(&key(1), UsageLimit::Unlimited));
        assert_eq!(ledger.turn_uses_by(PlayerId::new(0)), 0);
    }

    #[test]
    fn test_per_turn_limit() {
        let mut ledger = UsageLedger::new();
        let limit = UsageLimit::PerTurn(1);

        assert!(!ledger.is_exhausted(&key(1), limit));
        ledger.record(key(1), limit);
        assert!(ledger.is_exhausted(&key(1), limit));

        // A different card instance has its own counter
        assert!(!ledger.is_exhausted(&key(2), limit));
    }

    #[test]
    fn test_turn_reset_once_per_boundary() {
        let mut ledger = UsageLedger::new();
        let limit = UsageLimit::PerTurn(1);

        assert!(ledger.reset_for_turn(2));
        ledger.record(key(1), limit);

        // Same boundary announced again: counters survive
        assert!(!ledger.reset_for_turn(2));
        assert!(ledger.is_exhausted(&key(1), limit));

        assert!(ledger.reset_for_turn(3));
        assert!(!ledger.is_exhausted(&key(1), limit));
    }

    #[test]
    fn test_per_game_survives_turns() {
        let mut ledger = UsageLedger::new();
        let limit = UsageLimit::PerGame(1);

        ledger.record(key(1), limit);
        ledger.reset_for_turn(2);
        assert!(ledger.is_exhausted(&key(1), limit));

        ledger.reset_for_game();
        assert!(!ledger.is_exhausted(&key(1), limit));
    }

    #[test]
    fn test_turn_uses_by_player() {
        let mut ledger = UsageLedger::new();
        ledger.record(key(1), UsageLimit::PerTurn(2));
        ledger.record(key(1), UsageLimit::PerTurn(2));
        ledger.record(
            UsageKey::new(PlayerId::new(1), EntityId(5), SlotKind::Support),
            UsageLimit::PerTurn(1),
        );

        assert_eq!(ledger.turn_uses_by(PlayerId::new(0)), 2);
        assert_eq!(ledger.turn_uses_by(PlayerId::new(1)), 1);
    }
}
