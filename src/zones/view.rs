//! Narrow state contracts consumed by effects.
//!
//! Effects never see `GameState` directly. Eligibility checks get a
//! read-only [`GameStateView`]; executors get a [`GameStateMutator`], which
//! adds the handful of mutations card text can ask for. `GameState` is the
//! production implementation.

use serde::{Deserialize, Serialize};

use super::{Position, Zone};
use crate::cards::{Attachment, AttachmentKind, CardInstance, Modifier};
use crate::core::{EntityId, PlayerId, UsageKey, UsageLimit};
use crate::effects::EffectError;

/// Read-only access to the match.
pub trait GameStateView: Send + Sync {
    fn player_count(&self) -> usize;

    fn turn_number(&self) -> u32;

    fn active_player(&self) -> PlayerId;

    /// Cards in a zone, top first.
    fn cards_in(&self, player: PlayerId, zone: Zone) -> Vec<&CardInstance>;

    fn zone_size(&self, player: PlayerId, zone: Zone) -> usize;

    /// Look up a card that is directly in a zone (not attached).
    fn find_card(&self, entity: EntityId) -> Option<&CardInstance>;

    /// Zone owner and zone of a card.
    fn locate_card(&self, entity: EntityId) -> Option<(PlayerId, Zone)>;

    /// Uses of a limited slot counted so far.
    fn usage_count(&self, key: &UsageKey, limit: UsageLimit) -> u32;

    /// Limited uses a player made this turn, across all cards.
    fn turn_uses_by(&self, player: PlayerId) -> u32;

    fn attachments(&self, entity: EntityId) -> &[Attachment] {
        self.find_card(entity)
            .map(|card| card.attachments.as_slice())
            .unwrap_or_default()
    }

    /// Remaining life cards.
    fn life(&self, player: PlayerId) -> usize {
        self.zone_size(player, Zone::Life)
    }

    fn holopower(&self, player: PlayerId) -> usize {
        self.zone_size(player, Zone::Holopower)
    }

    /// Check if `entity` is in one of `player`'s stage zones.
    fn is_on_stage(&self, entity: EntityId, player: PlayerId) -> bool {
        matches!(self.locate_card(entity), Some((owner, zone)) if owner == player && zone.is_stage())
    }

    fn center(&self, player: PlayerId) -> Option<&CardInstance> {
        self.cards_in(player, Zone::Center).into_iter().next()
    }
}

/// Damage class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageKind {
    /// Art damage. A knockout costs the owner a life card.
    Normal,
    /// Special damage. Knocks out without life loss.
    Special,
}

/// What a damage application did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageOutcome {
    pub dealt: u32,
    /// Damage on the target after this hit, read before any knockout.
    pub total: u32,
    pub knocked_out: bool,
    pub life_lost: usize,
}

/// Mutations available to effect executors.
///
/// Every method either applies fully or returns an error without touching
/// state.
pub trait GameStateMutator: GameStateView {
    /// The same state, read-only, for eligibility checks made mid-execution.
    fn as_view(&self) -> &dyn GameStateView;

    /// Move a card to a zone of its owner.
    ///
    /// Leaving the stage archives attachments and clears damage, rest and
    /// modifiers. Moving between stage zones keeps them.
    fn move_card(&mut self, entity: EntityId, to: Zone, position: Position) -> Result<(), EffectError>;

    /// Draw up to `count` cards from deck top into hand. Returns drawn IDs.
    fn draw(&mut self, player: PlayerId, count: usize) -> Result<Vec<EntityId>, EffectError>;

    /// Remove up to `count` cards from the top of a zone.
    fn take_top(&mut self, player: PlayerId, zone: Zone, count: usize) -> Vec<CardInstance>;

    /// Put a card that is currently out of every zone into one.
    ///
    /// Fails for a player that is not seated.
    fn put(&mut self, player: PlayerId, zone: Zone, card: CardInstance, position: Position) -> Result<(), EffectError>;

    fn shuffle(&mut self, player: PlayerId, zone: Zone);

    /// Roll a die through the match's random source.
    fn roll_die(&mut self, sides: u8) -> u8;

    /// Deal damage to a holomem, knocking it out if HP runs out.
    fn deal_damage(
        &mut self,
        target: EntityId,
        amount: u32,
        kind: DamageKind,
    ) -> Result<DamageOutcome, EffectError>;

    /// Remove life cards directly. Returns how many were removed.
    fn lose_life(&mut self, player: PlayerId, count: usize) -> Result<usize, EffectError>;

    /// Attach a card (from any zone) to a holomem.
    fn attach(&mut self, card: EntityId, holder: EntityId, kind: AttachmentKind) -> Result<(), EffectError>;

    /// Detach a sub-card and put it into a zone of its owner.
    fn detach(&mut self, holder: EntityId, card: EntityId, to: Zone) -> Result<(), EffectError>;

    fn add_modifier(&mut self, target: EntityId, modifier: Modifier) -> Result<(), EffectError>;

    /// Archive `count` holopower cards.
    fn pay_holopower(&mut self, player: PlayerId, count: usize) -> Result<(), EffectError>;
}
