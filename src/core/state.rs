//! Match state.
//!
//! `GameState` owns everything an effect may read or change: the zones of
//! every player, the usage ledger, the random source and the turn counter.
//! It implements `GameStateView` and `GameStateMutator`, which are the only
//! ways effect code reaches it.
//!
//! Zones use `im` persistent data structures, so `clone()` is O(1). The
//! effect manager relies on this to snapshot before an execution and restore
//! the snapshot when the execution fails or is cancelled.

use super::config::EngineConfig;
use super::entity::EntityId;
use super::error::{EngineError, Result};
use super::ledger::{UsageKey, UsageLedger, UsageLimit};
use super::player::PlayerId;
use super::rng::{GameRng, RandomSource};
use crate::cards::{AttachmentKind, CardInstance, CardTemplate, Modifier};
use crate::effects::EffectError;
use crate::zones::{
    DamageKind, DamageOutcome, GameStateMutator, GameStateView, Position, Zone, ZoneManager,
};

/// Complete state of one match.
///
/// ## Example
///
/// ```
/// use holo_ccg::cards::{BloomLevel, CardTemplate};
/// use holo_ccg::core::{EngineConfig, GameState, PlayerId};
/// use holo_ccg::zones::{GameStateMutator, GameStateView, Position, Zone};
///
/// let p0 = PlayerId::new(0);
/// let mut state = GameState::new(&EngineConfig::default());
/// let sora = CardTemplate::holomem("hSD01-003", "Tokino Sora", BloomLevel::Debut, 60);
///
/// state.add_card(&sora, p0, Zone::Deck, Position::Top);
/// let drawn = state.draw(p0, 1).unwrap();
///
/// assert_eq!(drawn.len(), 1);
/// assert_eq!(state.zone_size(p0, Zone::Hand), 1);
/// ```
#[derive(Clone, Debug)]
pub struct GameState {
    player_count: usize,
    turn_number: u32,
    active_player: PlayerId,
    zones: ZoneManager,
    ledger: UsageLedger,
    rng: Box<dyn RandomSource>,
    next_entity: EntityId,
    default_life: usize,
}

impl GameState {
    /// Create an empty match state.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            player_count: config.player_count,
            turn_number: 0,
            active_player: PlayerId::new(0),
            zones: ZoneManager::new(config.player_count),
            ledger: UsageLedger::new(),
            rng: Box::new(GameRng::new(config.seed)),
            next_entity: EntityId(1),
            default_life: config.default_life,
        }
    }

    /// Replace the random source (builder pattern).
    #[must_use]
    pub fn with_random_source(mut self, rng: impl RandomSource + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    #[must_use]
    pub fn zones(&self) -> &ZoneManager {
        &self.zones
    }

    pub fn zones_mut(&mut self) -> &mut ZoneManager {
        &mut self.zones
    }

    #[must_use]
    pub fn ledger(&self) -> &UsageLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut UsageLedger {
        &mut self.ledger
    }

    /// Check if a player is seated in this match.
    #[must_use]
    pub fn is_seated(&self, player: PlayerId) -> bool {
        player.index() < self.player_count
    }

    /// Error out for players that are not seated.
    pub fn check_player(&self, player: PlayerId) -> Result<()> {
        if self.is_seated(player) {
            Ok(())
        } else {
            Err(EngineError::UnknownPlayer { player })
        }
    }

    /// Allocate a fresh entity ID.
    pub fn alloc_entity(&mut self) -> EntityId {
        let id = self.next_entity;
        self.next_entity = id.next();
        id
    }

    /// Instantiate a template into a zone.
    pub fn add_card(
        &mut self,
        template: &CardTemplate,
        owner: PlayerId,
        zone: Zone,
        position: Position,
    ) -> EntityId {
        let entity = self.alloc_entity();
        self.zones
            .place(owner, zone, template.instantiate(entity, owner), position);
        entity
    }

    /// Instantiate a list of templates into a zone, keeping list order
    /// (the first template ends up on top).
    pub fn add_cards(&mut self, templates: &[CardTemplate], owner: PlayerId, zone: Zone) -> Vec<EntityId> {
        templates
            .iter()
            .map(|template| self.add_card(template, owner, zone, Position::Bottom))
            .collect()
    }

    /// Start the game: clear every usage counter, make `first` active on
    /// turn 1 and deal life cards from each yell deck.
    pub fn start_game(&mut self, first: PlayerId) -> Result<()> {
        self.check_player(first)?;

        self.ledger.reset_for_game();
        self.turn_number = 1;
        self.active_player = first;
        self.ledger.reset_for_turn(1);

        for player in PlayerId::all(self.player_count) {
            let life = self
                .zones
                .top_card(player, Zone::Oshi)
                .and_then(|oshi| oshi.life)
                .unwrap_or(self.default_life);
            for card in self.zones.take_top(player, Zone::YellDeck, life) {
                self.zones.place(player, Zone::Life, card, Position::Bottom);
            }
        }
        Ok(())
    }

    /// Enter `turn` with `player` active.
    ///
    /// The boundary resets per-turn usage and expires modifiers of the
    /// player whose turn ended. Returns `Ok(false)` and changes nothing when
    /// this turn was already entered.
    pub fn enter_turn(&mut self, turn: u32, player: PlayerId) -> Result<bool> {
        self.check_player(player)?;
        if !self.ledger.reset_for_turn(turn) {
            return Ok(false);
        }

        let ending = self.active_player;
        self.zones.for_each_on_stage(|card| card.expire_modifiers(ending));
        self.turn_number = turn;
        self.active_player = player;
        Ok(true)
    }

    /// Stand up every rested holomem of a player.
    pub fn unrest_all(&mut self, player: PlayerId) {
        let rested: Vec<EntityId> = self
            .zones
            .holomems(player)
            .filter(|card| card.resting)
            .map(|card| card.entity_id)
            .collect();
        for entity in rested {
            if let Some(card) = self.zones.find_mut(entity) {
                card.resting = false;
            }
        }
    }

    fn check_target_player(&self, player: PlayerId) -> std::result::Result<(), EffectError> {
        if self.is_seated(player) {
            Ok(())
        } else {
            Err(EffectError::InvalidTarget(format!("{player} is not seated")))
        }
    }

    fn archive_attachments(&mut self, card: &mut CardInstance) {
        for attachment in card.take_attachments() {
            let mut sub = attachment.card;
            sub.clear_stage_state();
            let owner = sub.owner;
            self.zones.place(owner, Zone::Archive, sub, Position::Top);
        }
    }

    fn center_entity(&self, player: PlayerId) -> Option<EntityId> {
        self.zones
            .cards(player, Zone::Center)
            .next()
            .map(|card| card.entity_id)
    }
}

impl GameStateView for GameState {
    fn player_count(&self) -> usize {
        self.player_count
    }

    fn turn_number(&self) -> u32 {
        self.turn_number
    }

    fn active_player(&self) -> PlayerId {
        self.active_player
    }

    fn cards_in(&self, player: PlayerId, zone: Zone) -> Vec<&CardInstance> {
        self.zones.cards(player, zone).collect()
    }

    fn zone_size(&self, player: PlayerId, zone: Zone) -> usize {
        self.zones.size(player, zone)
    }

    fn find_card(&self, entity: EntityId) -> Option<&CardInstance> {
        self.zones.find(entity)
    }

    fn locate_card(&self, entity: EntityId) -> Option<(PlayerId, Zone)> {
        self.zones.locate(entity).map(|(player, zone, _)| (player, zone))
    }

    fn usage_count(&self, key: &UsageKey, limit: UsageLimit) -> u32 {
        self.ledger.uses(key, limit)
    }

    fn turn_uses_by(&self, player: PlayerId) -> u32 {
        self.ledger.turn_uses_by(player)
    }
}

impl GameStateMutator for GameState {
    fn as_view(&self) -> &dyn GameStateView {
        self
    }

    fn move_card(
        &mut self,
        entity: EntityId,
        to: Zone,
        position: Position,
    ) -> std::result::Result<(), EffectError> {
        let owner = self
            .zones
            .find(entity)
            .map(|card| card.owner)
            .ok_or(EffectError::CardNotFound(entity))?;
        let (_, from, _) = self
            .zones
            .locate(entity)
            .ok_or(EffectError::CardNotFound(entity))?;
        if from != to && to.is_single_slot() && self.zones.size(owner, to) > 0 {
            return Err(EffectError::InvalidTarget(format!("{owner}'s {to} is occupied")));
        }

        let (_, from, mut card) = self
            .zones
            .take(entity)
            .ok_or(EffectError::CardNotFound(entity))?;
        if from.is_stage() && !to.is_stage() {
            self.archive_attachments(&mut card);
            card.clear_stage_state();
        }
        self.zones.place(owner, to, card, position);
        Ok(())
    }

    fn draw(&mut self, player: PlayerId, count: usize) -> std::result::Result<Vec<EntityId>, EffectError> {
        self.check_target_player(player)?;
        if count > 0 && self.zones.size(player, Zone::Deck) == 0 {
            return Err(EffectError::EmptyDeck { player });
        }

        let drawn = self.zones.take_top(player, Zone::Deck, count);
        let ids = drawn.iter().map(|card| card.entity_id).collect();
        for card in drawn {
            self.zones.place(player, Zone::Hand, card, Position::Bottom);
        }
        Ok(ids)
    }

    fn take_top(&mut self, player: PlayerId, zone: Zone, count: usize) -> Vec<CardInstance> {
        self.zones.take_top(player, zone, count)
    }

    fn put(
        &mut self,
        player: PlayerId,
        zone: Zone,
        card: CardInstance,
        position: Position,
    ) -> std::result::Result<(), EffectError> {
        self.check_target_player(player)?;
        self.zones.place(player, zone, card, position);
        Ok(())
    }

    fn shuffle(&mut self, player: PlayerId, zone: Zone) {
        self.zones.shuffle(player, zone, self.rng.as_mut());
    }

    fn roll_die(&mut self, sides: u8) -> u8 {
        self.rng.roll(sides)
    }

    fn deal_damage(
        &mut self,
        target: EntityId,
        amount: u32,
        kind: DamageKind,
    ) -> std::result::Result<DamageOutcome, EffectError> {
        match self.locate_card(target) {
            Some((_, zone)) if zone.is_holomem_position() => {}
            Some((_, zone)) => {
                return Err(EffectError::InvalidTarget(format!("{target} is in {zone}, not on stage")))
            }
            None => return Err(EffectError::CardNotFound(target)),
        }

        let card = self
            .zones
            .find_mut(target)
            .ok_or(EffectError::CardNotFound(target))?;
        card.damage = card.damage.saturating_add(amount);
        let owner = card.owner;
        let mut outcome = DamageOutcome {
            dealt: amount,
            total: card.damage,
            ..DamageOutcome::default()
        };

        if card.is_knocked_out() {
            self.move_card(target, Zone::Archive, Position::Top)?;
            outcome.knocked_out = true;
            if kind == DamageKind::Normal {
                outcome.life_lost = self.lose_life(owner, 1)?;
            }
        }
        Ok(outcome)
    }

    fn lose_life(&mut self, player: PlayerId, count: usize) -> std::result::Result<usize, EffectError> {
        self.check_target_player(player)?;

        let mut lost = 0;
        while lost < count {
            let Some(card) = self.zones.pop_top(player, Zone::Life) else {
                break;
            };
            let center = self
                .center_entity(player)
                .and_then(|entity| self.zones.find_mut(entity));
            match center {
                Some(holder) => holder.attach(AttachmentKind::Yell, card),
                None => self.zones.place(player, Zone::Archive, card, Position::Top),
            }
            lost += 1;
        }
        Ok(lost)
    }

    fn attach(
        &mut self,
        card: EntityId,
        holder: EntityId,
        kind: AttachmentKind,
    ) -> std::result::Result<(), EffectError> {
        if card == holder {
            return Err(EffectError::InvalidTarget(format!("{card} cannot attach to itself")));
        }
        match self.locate_card(holder) {
            Some((_, zone)) if zone.is_holomem_position() => {}
            Some(_) => return Err(EffectError::InvalidTarget(format!("{holder} is not on stage"))),
            None => return Err(EffectError::CardNotFound(holder)),
        }

        let (_, from, mut sub) = self
            .zones
            .take(card)
            .ok_or(EffectError::CardNotFound(card))?;
        if from.is_stage() {
            self.archive_attachments(&mut sub);
        }
        sub.clear_stage_state();

        match self.zones.find_mut(holder) {
            Some(target) => {
                target.attach(kind, sub);
                Ok(())
            }
            None => Err(EffectError::CardNotFound(holder)),
        }
    }

    fn detach(&mut self, holder: EntityId, card: EntityId, to: Zone) -> std::result::Result<(), EffectError> {
        let detached = self
            .zones
            .find_mut(holder)
            .ok_or(EffectError::CardNotFound(holder))?
            .detach(card)
            .ok_or(EffectError::CardNotFound(card))?;
        let owner = detached.card.owner;
        self.zones.place(owner, to, detached.card, Position::Top);
        Ok(())
    }

    fn add_modifier(&mut self, target: EntityId, modifier: Modifier) -> std::result::Result<(), EffectError> {
        self.zones
            .find_mut(target)
            .ok_or(EffectError::CardNotFound(target))?
            .modifiers
            .push(modifier);
        Ok(())
    }

    fn pay_holopower(&mut self, player: PlayerId, count: usize) -> std::result::Result<(), EffectError> {
        self.check_target_player(player)?;
        let available = self.zones.size(player, Zone::Holopower);
        if available < count {
            return Err(EffectError::CostUnpaid {
                needed: count,
                available,
            });
        }
        for card in self.zones.take_top(player, Zone::Holopower, count) {
            self.zones.place(player, Zone::Archive, card, Position::Top);
        }
        Ok(())
    }
}
