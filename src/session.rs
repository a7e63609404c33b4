//! Match session and turn controller.
//!
//! `MatchSession` owns the game state together with the effect manager and
//! the trigger dispatcher. Every board action it offers performs the move
//! first and then fires the matching trigger, so the trigger system never
//! has to hook into state mutation. Actions that fire several triggers fire
//! them in a fixed order, documented on each method.
//!
//! Cards are bound to the dispatcher when they enter the stage (or, for
//! support cards, for the duration of their play) and unbound when they
//! leave it.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::cards::{normalize_card_id, AttachmentKind, BloomLevel, CardCategory, CardInstance, CardTemplate};
use crate::catalog::{DefinitionLoader, EffectCatalog};
use crate::core::{EngineConfig, EngineError, EntityId, GameState, PlayerId, RandomSource, Result};
use crate::effects::{EffectManager, EffectResult, PlayerChoiceSource};
use crate::triggers::{EventContext, ListenerCondition, ListenerConfig, ListenerId, TriggerDispatcher, TriggerType};
use crate::zones::{DamageKind, GameStateMutator, GameStateView, Position, Zone};

/// Steps of a turn after the turn start.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Stand holomems up and return the collab holomem to the back.
    Reset,
    /// Draw one card.
    Draw,
    /// Attach the top yell to the center holomem.
    Cheer,
    Main,
    Performance,
    End,
}

impl Step {
    pub const ALL: [Step; 6] = [
        Step::Reset,
        Step::Draw,
        Step::Cheer,
        Step::Main,
        Step::Performance,
        Step::End,
    ];
}

/// One match: state, effects and listeners.
pub struct MatchSession {
    state: GameState,
    manager: EffectManager,
    dispatcher: TriggerDispatcher,
    catalog: Arc<EffectCatalog>,
}

impl std::fmt::Debug for MatchSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchSession")
            .field("turn", &self.state.turn_number())
            .field("active_player", &self.state.active_player())
            .field("listeners", &self.dispatcher.len())
            .field("definitions", &self.catalog.len())
            .finish()
    }
}

impl MatchSession {
    #[must_use]
    pub fn new(config: &EngineConfig, catalog: Arc<EffectCatalog>, choices: Arc<dyn PlayerChoiceSource>) -> Self {
        Self {
            state: GameState::new(config),
            manager: EffectManager::new(Arc::clone(&catalog), choices, config),
            dispatcher: TriggerDispatcher::new(),
            catalog,
        }
    }

    /// Replace the random source (builder pattern).
    #[must_use]
    pub fn with_random_source(self, rng: impl RandomSource + 'static) -> Self {
        Self {
            state: self.state.with_random_source(rng),
            ..self
        }
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct state access for setup and tests. Nothing fires.
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    #[must_use]
    pub fn manager(&self) -> &EffectManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut EffectManager {
        &mut self.manager
    }

    #[must_use]
    pub fn dispatcher(&self) -> &TriggerDispatcher {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut TriggerDispatcher {
        &mut self.dispatcher
    }

    #[must_use]
    pub fn catalog(&self) -> &Arc<EffectCatalog> {
        &self.catalog
    }

    /// Load the definitions a deck needs, then put the deck into `zone`.
    ///
    /// Each distinct card number is loaded at most once; numbers the catalog
    /// already answers for are not loaded again. Loaded definitions are
    /// registered under the normalized number.
    pub async fn prepare_deck(
        &mut self,
        loader: &dyn DefinitionLoader,
        player: PlayerId,
        templates: &[CardTemplate],
        zone: Zone,
    ) -> Result<Vec<EntityId>> {
        self.state.check_player(player)?;

        let mut seen = FxHashSet::default();
        let mut loaded = 0;
        for template in templates {
            let base = normalize_card_id(&template.card_number);
            if !seen.insert(base) || self.catalog.has(&template.card_number) {
                continue;
            }
            if let Some(definition) = loader.load_definition(&template.card_number).await? {
                self.catalog.register(base, definition);
                loaded += 1;
            }
        }

        let entities = self.state.add_cards(templates, player, zone);
        info!(%player, %zone, cards = entities.len(), loaded, "Prepared deck");
        Ok(entities)
    }

    /// Bind a card to the triggers its definition answers to.
    ///
    /// Holomems and oshi cards only react while on stage. The one exception
    /// is `on_holomem_leave`, which reaches them after they have left it.
    /// Returns `None` when the card has no effect.
    pub fn bind_card(&mut self, entity: EntityId) -> Option<ListenerId> {
        let card = self.state.find_card(entity)?.clone();
        let definition = self.catalog.get(&card.card_number)?;
        let triggers = definition.triggers();
        if triggers.is_empty() {
            return None;
        }

        let config = if card.category == CardCategory::Support {
            ListenerConfig::default()
        } else {
            ListenerConfig::on_stage().allow_off_stage(TriggerType::OnHolomemLeave)
        };
        Some(self.dispatcher.register_listener(
            &card,
            triggers,
            config.with_condition(ListenerCondition::OwnEvent),
        ))
    }

    /// Start the match with `first` active on turn 1.
    ///
    /// Clears every usage counter, deals life, binds every card already on
    /// stage and fires `on_turn_start` for turn 1.
    pub async fn start_game(&mut self, first: PlayerId) -> Result<Vec<EffectResult>> {
        self.state.start_game(first)?;

        let on_stage: Vec<EntityId> = PlayerId::all(self.state.player_count())
            .flat_map(|player| Zone::STAGE.into_iter().map(move |zone| (player, zone)))
            .flat_map(|(player, zone)| self.state.cards_in(player, zone))
            .map(|card| card.entity_id)
            .collect();
        let bound = on_stage
            .into_iter()
            .filter_map(|entity| self.bind_card(entity))
            .count();

        info!(%first, bound, "Game started");
        self.fire_turn_start(first).await
    }

    /// Enter `turn` with `player` active and fire `on_turn_start`.
    ///
    /// Entering the same turn twice is a no-op: the ledger is not reset
    /// again and nothing fires.
    pub async fn begin_turn(&mut self, turn: u32, player: PlayerId) -> Result<Vec<EffectResult>> {
        if !self.state.enter_turn(turn, player)? {
            debug!(turn, %player, "Turn already entered");
            return Ok(Vec::new());
        }
        info!(turn, %player, "Turn started");
        self.fire_turn_start(player).await
    }

    /// Hand the turn to the next player.
    pub async fn next_turn(&mut self) -> Result<Vec<EffectResult>> {
        let next = self.state.active_player().next(self.state.player_count());
        let turn = self.state.turn_number() + 1;
        self.begin_turn(turn, next).await
    }

    async fn fire_turn_start(&mut self, player: PlayerId) -> Result<Vec<EffectResult>> {
        let turn = i64::from(self.state.turn_number());
        self.fire(TriggerType::OnTurnStart, EventContext::new(player).with_value("turn", turn))
            .await
    }

    /// Run one step of the active player's turn.
    pub async fn advance_step(&mut self, step: Step) -> Result<Vec<EffectResult>> {
        let player = self.state.active_player();
        debug!(%player, ?step, "Advancing step");

        match step {
            Step::Reset => {
                self.state.unrest_all(player);
                let collab = self
                    .state
                    .cards_in(player, Zone::Collab)
                    .first()
                    .map(|card| card.entity_id);
                if let Some(collab) = collab {
                    self.state.move_card(collab, Zone::Back, Position::Bottom)?;
                    if let Some(card) = self.state.zones_mut().find_mut(collab) {
                        card.resting = true;
                    }
                }
                self.fire(TriggerType::OnResetStep, EventContext::new(player)).await
            }
            Step::Draw => {
                self.state.draw(player, 1)?;
                Ok(Vec::new())
            }
            Step::Cheer => {
                let Some(center) = self.state.center(player).map(|card| card.entity_id) else {
                    return Ok(Vec::new());
                };
                if self.state.zone_size(player, Zone::YellDeck) == 0 {
                    return Ok(Vec::new());
                }
                self.attach_yell(player, center).await
            }
            Step::Main => self.fire(TriggerType::OnMainStep, EventContext::new(player)).await,
            Step::Performance => {
                self.fire(TriggerType::OnPerformanceStep, EventContext::new(player))
                    .await
            }
            Step::End => self.fire(TriggerType::OnTurnEnd, EventContext::new(player)).await,
        }
    }

    /// Put a Debut or Spot holomem from hand onto the center or back.
    ///
    /// Fires `on_stage_enter`.
    pub async fn play_to_stage(&mut self, player: PlayerId, entity: EntityId, zone: Zone) -> Result<Vec<EffectResult>> {
        let card = self.require_in(player, entity, Zone::Hand)?;
        if !card.is_character() {
            return Err(illegal_play(format!("{} is not a holomem", card.card_number)));
        }
        if !matches!(card.bloom_level, Some(BloomLevel::Debut | BloomLevel::Spot)) {
            return Err(illegal_play(format!("{} must bloom onto the stage", card.card_number)));
        }
        if !matches!(zone, Zone::Center | Zone::Back) {
            return Err(illegal_play(format!("holomems cannot be played to {zone}")));
        }
        self.require_free(player, zone)?;

        self.state.move_card(entity, zone, Position::Bottom)?;
        self.bind_card(entity);
        info!(%player, card = %entity, %zone, "Holomem entered stage");
        self.fire(TriggerType::OnStageEnter, EventContext::zone_change(&card, Zone::Hand, zone))
            .await
    }

    /// Play a support card from hand.
    ///
    /// Fires `on_support_play`. The card goes to the archive afterwards,
    /// unless its effect ran and failed, in which case it stays in hand.
    pub async fn play_support(&mut self, player: PlayerId, entity: EntityId) -> Result<Vec<EffectResult>> {
        let card = self.require_in(player, entity, Zone::Hand)?;
        if card.category != CardCategory::Support {
            return Err(illegal_play(format!("{} is not a support card", card.card_number)));
        }

        self.bind_card(entity);
        let context = EventContext::new(player)
            .with_card(card.clone())
            .with_source(entity)
            .from_zone(Zone::Hand);
        let results = self.fire(TriggerType::OnSupportPlay, context).await;
        self.dispatcher.remove_for_card(entity);
        let results = results?;

        let spent = results.is_empty() || results.iter().any(|result| result.success);
        if spent && self.state.locate_card(entity) == Some((player, Zone::Hand)) {
            self.state.move_card(entity, Zone::Archive, Position::Top)?;
        }
        info!(%player, card = %entity, spent, "Support played");
        Ok(results)
    }

    /// Move a back holomem into the collab position.
    ///
    /// The top deck card goes to holopower, then `on_collab` fires.
    pub async fn collab(&mut self, player: PlayerId, entity: EntityId) -> Result<Vec<EffectResult>> {
        let card = self.require_in(player, entity, Zone::Back)?;
        if card.resting {
            return Err(illegal_play(format!("{entity} is resting")));
        }
        self.require_free(player, Zone::Collab)?;

        self.state.move_card(entity, Zone::Collab, Position::Top)?;
        for top in self.state.take_top(player, Zone::Deck, 1) {
            self.state.put(player, Zone::Holopower, top, Position::Top)?;
        }
        info!(%player, card = %entity, "Collab");
        self.fire(TriggerType::OnCollab, EventContext::zone_change(&card, Zone::Back, Zone::Collab))
            .await
    }

    /// Bloom a stage holomem with a card from hand.
    ///
    /// The bloom card takes the holomem's place and inherits its damage,
    /// rest state, modifiers and attachments; the old card goes under it as
    /// a bloom stack attachment. Fires `on_bloom` with the bloom card as
    /// source and the old card as target.
    pub async fn bloom(&mut self, player: PlayerId, target: EntityId, bloom_card: EntityId) -> Result<Vec<EffectResult>> {
        let top = self.require_in(player, bloom_card, Zone::Hand)?;
        let base = self
            .state
            .find_card(target)
            .filter(|card| card.owner == player)
            .cloned()
            .ok_or(EngineError::CardNotInZone {
                card: target,
                player,
                expected: Zone::Center,
            })?;
        let (_, zone, index) = self
            .state
            .zones()
            .locate(target)
            .filter(|(_, zone, _)| zone.is_holomem_position())
            .ok_or_else(|| illegal_bloom(format!("{target} is not on stage")))?;

        match (base.bloom_level, top.bloom_level) {
            (Some(from), Some(into)) if top.is_character() && from.can_bloom_into(into) => {}
            (from, into) => {
                return Err(illegal_bloom(format!(
                    "{} ({from:?}) cannot bloom into {} ({into:?})",
                    base.card_number, top.card_number
                )))
            }
        }
        if base.name != top.name {
            return Err(illegal_bloom(format!("{} is not {}", top.name, base.name)));
        }

        let zones = self.state.zones_mut();
        let (_, _, mut new_top) = zones.take(bloom_card).ok_or(EngineError::CardNotInZone {
            card: bloom_card,
            player,
            expected: Zone::Hand,
        })?;
        let (_, _, mut old) = zones.take(target).ok_or(EngineError::CardNotInZone {
            card: target,
            player,
            expected: zone,
        })?;
        new_top.damage = old.damage;
        new_top.resting = old.resting;
        new_top.modifiers = std::mem::take(&mut old.modifiers);
        new_top.attachments = old.take_attachments();
        old.clear_stage_state();
        new_top.attach(AttachmentKind::BloomStack, old);
        let bloomed = new_top.clone();
        zones.place(player, zone, new_top, Position::Index(index));

        self.dispatcher.remove_for_card(target);
        self.bind_card(bloom_card);
        info!(%player, from = %target, into = %bloom_card, %zone, "Bloom");
        let context = EventContext::zone_change(&bloomed, Zone::Hand, zone).with_target(target);
        self.fire(TriggerType::OnBloom, context).await
    }

    /// Swap the center holomem with a back holomem.
    ///
    /// Fires `on_baton_touch` with the new center as source and the old one
    /// as target.
    pub async fn baton_touch(&mut self, player: PlayerId, entity: EntityId) -> Result<Vec<EffectResult>> {
        let card = self.require_in(player, entity, Zone::Back)?;
        if card.resting {
            return Err(illegal_play(format!("{entity} is resting")));
        }
        let center = self
            .state
            .center(player)
            .map(|center| center.entity_id)
            .ok_or(EngineError::ZoneEmpty {
                player,
                zone: Zone::Center,
            })?;

        self.state.move_card(center, Zone::Back, Position::Bottom)?;
        self.state.move_card(entity, Zone::Center, Position::Top)?;
        info!(%player, card = %entity, replaced = %center, "Baton touch");
        let context = EventContext::zone_change(&card, Zone::Back, Zone::Center).with_target(center);
        self.fire(TriggerType::OnBatonTouch, context).await
    }

    /// Deal damage to a stage holomem outside of any effect.
    ///
    /// Fires `on_damage_receive`. A knockout then fires `on_holomem_leave`
    /// for the knocked out card and unbinds it.
    pub async fn damage_holomem(&mut self, target: EntityId, amount: u32, kind: DamageKind) -> Result<Vec<EffectResult>> {
        let (zone, mut damaged) = match (self.state.locate_card(target), self.state.find_card(target)) {
            (Some((_, zone)), Some(card)) if zone.is_holomem_position() => (zone, card.clone()),
            _ => {
                return Err(EngineError::CardNotInZone {
                    card: target,
                    player: self.state.active_player(),
                    expected: Zone::Center,
                })
            }
        };

        let outcome = self.state.deal_damage(target, amount, kind)?;
        damaged.damage = outcome.total;
        info!(card = %target, amount, ?kind, knocked_out = outcome.knocked_out, life_lost = outcome.life_lost, "Damage dealt");

        let context = EventContext::damage(&damaged, amount).with_tag(damage_tag(kind));
        let mut results = self.fire(TriggerType::OnDamageReceive, context).await?;
        if outcome.knocked_out {
            let context = EventContext::zone_change(&damaged, zone, Zone::Archive).with_tag("knocked_out");
            results.extend(self.fire(TriggerType::OnHolomemLeave, context).await?);
            self.dispatcher.remove_for_card(target);
        }
        Ok(results)
    }

    /// Attach the top card of `player`'s yell deck to a holomem.
    ///
    /// Fires `on_yell_attach` with the yell as source and the holomem as
    /// target.
    pub async fn attach_yell(&mut self, player: PlayerId, holder: EntityId) -> Result<Vec<EffectResult>> {
        let holder_card = match (self.state.locate_card(holder), self.state.find_card(holder)) {
            (Some((owner, zone)), Some(card)) if owner == player && zone.is_holomem_position() => card.clone(),
            _ => {
                return Err(EngineError::CardNotInZone {
                    card: holder,
                    player,
                    expected: Zone::Center,
                })
            }
        };
        let yell = self
            .state
            .cards_in(player, Zone::YellDeck)
            .first()
            .map(|card| card.entity_id)
            .ok_or(EngineError::ZoneEmpty {
                player,
                zone: Zone::YellDeck,
            })?;

        self.state.attach(yell, holder, AttachmentKind::Yell)?;
        debug!(%player, %yell, %holder, "Yell attached");
        let context = EventContext::new(player)
            .with_card(holder_card)
            .with_source(yell)
            .with_target(holder)
            .from_zone(Zone::YellDeck);
        self.fire(TriggerType::OnYellAttach, context).await
    }

    /// Use a card's manual trigger, such as an oshi skill.
    pub async fn manual_trigger(&mut self, card: EntityId, player: PlayerId) -> Result<Vec<EffectResult>> {
        self.dispatcher
            .manual_trigger(card, player, &self.manager, &mut self.state)
            .await
    }

    /// Use a card's `activate` effect, such as an SP oshi skill.
    pub async fn activate(&mut self, card: EntityId, player: PlayerId) -> Result<Vec<EffectResult>> {
        self.fire(TriggerType::Activate, EventContext::new(player).with_source(card))
            .await
    }

    /// Fire a trigger directly.
    pub async fn fire(&mut self, trigger: TriggerType, context: EventContext) -> Result<Vec<EffectResult>> {
        let results = self
            .dispatcher
            .fire(trigger, context, &self.manager, &mut self.state)
            .await?;
        for result in results.iter().filter(|result| !result.success) {
            debug!(%trigger, card = ?result.card, reason = ?result.reason, "Effect did not resolve");
        }
        Ok(results)
    }

    /// Drop listeners whose card no longer exists in any zone, or whose
    /// card has left the stage it needs to be on.
    pub fn prune_listeners(&mut self) -> usize {
        let state = &self.state;
        let removed = self.dispatcher.retain(|listener| {
            state.find_card(listener.card).is_some()
                && (!listener.config.require_on_stage || state.is_on_stage(listener.card, listener.owner))
        });
        if removed > 0 {
            warn!(removed, "Pruned stale listeners");
        }
        removed
    }

    fn require_in(&self, player: PlayerId, entity: EntityId, zone: Zone) -> Result<CardInstance> {
        self.state.check_player(player)?;
        match (self.state.locate_card(entity), self.state.find_card(entity)) {
            (Some((owner, at)), Some(card)) if owner == player && at == zone => Ok(card.clone()),
            _ => Err(EngineError::CardNotInZone {
                card: entity,
                player,
                expected: zone,
            }),
        }
    }

    fn require_free(&self, player: PlayerId, zone: Zone) -> Result<()> {
        if zone.is_single_slot() && self.state.zone_size(player, zone) > 0 {
            Err(EngineError::ZoneOccupied { player, zone })
        } else {
            Ok(())
        }
    }
}

fn illegal_play(reason: String) -> EngineError {
    EngineError::IllegalPlay { reason }
}

fn illegal_bloom(reason: String) -> EngineError {
    EngineError::IllegalBloom { reason }
}

fn damage_tag(kind: DamageKind) -> &'static str {
    match kind {
        DamageKind::Normal => "normal",
        DamageKind::Special => "special",
    }
}

/// Shared handle to a session.
///
/// Every action locks the whole session, so two actions (for example two
/// manual triggers from different tasks) are resolved one after the other
/// and a usage limit check always sees the previous increment.
#[derive(Clone, Debug)]
pub struct MatchHandle(Arc<Mutex<MatchSession>>);

impl MatchHandle {
    #[must_use]
    pub fn new(session: MatchSession) -> Self {
        Self(Arc::new(Mutex::new(session)))
    }

    /// Lock the session for a sequence of actions.
    pub async fn lock(&self) -> MutexGuard<'_, MatchSession> {
        self.0.lock().await
    }

    pub async fn manual_trigger(&self, card: EntityId, player: PlayerId) -> Result<Vec<EffectResult>> {
        self.0.lock().await.manual_trigger(card, player).await
    }

    pub async fn fire(&self, trigger: TriggerType, context: EventContext) -> Result<Vec<EffectResult>> {
        self.0.lock().await.fire(trigger, context).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::library;
    use crate::cards::Color;
    use crate::catalog::CatalogBuilder;
    use crate::effects::{AutoChoice, FailureReason};

    fn p0() -> PlayerId {
        PlayerId::new(0)
    }

    fn p1() -> PlayerId {
        PlayerId::new(1)
    }

    fn session() -> MatchSession {
        let mut builder = CatalogBuilder::new();
        builder.extend(library::standard_definitions());
        MatchSession::new(&EngineConfig::default(), Arc::new(builder.build()), Arc::new(AutoChoice))
    }

    fn sora_debut() -> CardTemplate {
        CardTemplate::holomem("hSD01-003", "Tokino Sora", BloomLevel::Debut, 60).with_color(Color::White)
    }

    #[tokio::test]
    async fn test_play_to_stage_binds() {
        let mut session = session();
        let ids = session.state_mut().add_cards(&[sora_debut()], p0(), Zone::Hand);

        let results = session.play_to_stage(p0(), ids[0], Zone::Center).await.unwrap();
        assert!(results.is_empty());
        assert!(session.dispatcher().is_bound(ids[0]));
        assert_eq!(session.state().zone_size(p0(), Zone::Center), 1);

        let more = session.state_mut().add_cards(&[sora_debut()], p0(), Zone::Hand);
        let err = session.play_to_stage(p0(), more[0], Zone::Center).await.unwrap_err();
        assert_eq!(
            err,
            EngineError::ZoneOccupied {
                player: p0(),
                zone: Zone::Center
            }
        );
    }

    #[tokio::test]
    async fn test_play_wrong_zone() {
        let mut session = session();
        let ids = session.state_mut().add_cards(&[sora_debut()], p0(), Zone::Deck);
        let err = session.play_to_stage(p0(), ids[0], Zone::Back).await.unwrap_err();
        assert!(matches!(err, EngineError::CardNotInZone { expected: Zone::Hand, .. }));
    }

    #[tokio::test]
    async fn test_collab_draws_and_feeds_holopower() {
        let mut session = session();
        session.state_mut().add_cards(&library::starter_deck(), p0(), Zone::Deck);
        let back = session.state_mut().add_cards(&[sora_debut()], p0(), Zone::Back);
        session.bind_card(back[0]);
        session.start_game(p0()).await.unwrap();

        let results = session.collab(p0(), back[0]).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].success);
        assert_eq!(session.state().zone_size(p0(), Zone::Holopower), 1);
        assert_eq!(session.state().zone_size(p0(), Zone::Hand), 1);
        assert_eq!(session.state().zone_size(p0(), Zone::Deck), 8);
    }

    #[tokio::test]
    async fn test_turn_entered_once() {
        let mut session = session();
        session.start_game(p0()).await.unwrap();
        session.next_turn().await.unwrap();
        assert_eq!(session.state().turn_number(), 2);
        assert_eq!(session.state().active_player(), p1());

        assert!(session.begin_turn(2, p1()).await.unwrap().is_empty());
        assert_eq!(session.state().turn_number(), 2);
    }

    #[tokio::test]
    async fn test_reset_returns_collab_rested() {
        let mut session = session();
        let ids = session.state_mut().add_cards(&[sora_debut()], p0(), Zone::Collab);
        session.start_game(p0()).await.unwrap();

        session.advance_step(Step::Reset).await.unwrap();
        let card = session.state().find_card(ids[0]).unwrap();
        assert!(card.resting);
        assert_eq!(session.state().locate_card(ids[0]), Some((p0(), Zone::Back)));
    }

    #[tokio::test]
    async fn test_failed_support_stays_in_hand() {
        let mut session = session();
        let ids = session
            .state_mut()
            .add_cards(&[library::template("hSD01-016").unwrap()], p0(), Zone::Hand);

        // Empty deck: nothing to draw
        let results = session.play_support(p0(), ids[0]).await.unwrap();
        assert!(results[0].failed_with(FailureReason::ConditionNotMet));
        assert_eq!(session.state().locate_card(ids[0]), Some((p0(), Zone::Hand)));
        assert!(!session.dispatcher().is_bound(ids[0]));
    }

    #[tokio::test]
    async fn test_handle_serializes_actions() {
        let handle = MatchHandle::new(session());
        handle.lock().await.start_game(p0()).await.unwrap();
        let results = handle
            .fire(TriggerType::OnMainStep, EventContext::new(p0()))
            .await
            .unwrap();
        assert!(results.is_empty());
    }
}
