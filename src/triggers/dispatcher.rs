//! Trigger dispatcher.
//!
//! The dispatcher maps trigger types to listening cards. The turn controller
//! calls [`TriggerDispatcher::fire`] at well-defined points; the dispatcher
//! filters listeners and hands each surviving one to the
//! [`EffectManager`], strictly one after the other.
//!
//! ## Filtering
//!
//! For each listener, in registration order:
//! 1. `require_on_stage`: the card must be in one of the acting player's
//!    stage zones, otherwise the listener is skipped. Triggers listed in
//!    `off_stage` are exempt, so a card can still answer its own departure.
//! 2. `condition`: evaluated against the event and the current state;
//!    false skips the listener
//!
//! Skipped listeners produce no result. Executed ones produce exactly one,
//! whatever happened inside the effect.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, error};

use super::condition::{ConditionContext, ConditionEvaluator, ListenerCondition};
use super::event::{EventContext, TriggerEvent};
use super::kind::TriggerType;
use crate::cards::CardInstance;
use crate::core::{EntityId, GameState, PlayerId, Result};
use crate::effects::{EffectManager, EffectResult};
use crate::zones::GameStateView;

/// Unique identifier for a listener registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ListenerId(pub u32);

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Listener({})", self.0)
    }
}

/// Eligibility options for a listener.
#[derive(Clone, Debug, Default)]
pub struct ListenerConfig {
    /// Skip unless the card is on the acting player's stage.
    pub require_on_stage: bool,
    /// Triggers that still reach the card while it is off stage.
    pub off_stage: SmallVec<[TriggerType; 2]>,
    pub condition: Option<ListenerCondition>,
}

impl ListenerConfig {
    /// Require the card on the acting player's stage.
    #[must_use]
    pub fn on_stage() -> Self {
        Self {
            require_on_stage: true,
            ..Self::default()
        }
    }

    /// Let `trigger` through even when the card is off stage.
    #[must_use]
    pub fn allow_off_stage(mut self, trigger: TriggerType) -> Self {
        if !self.off_stage.contains(&trigger) {
            self.off_stage.push(trigger);
        }
        self
    }

    /// Whether `trigger` needs the card on stage under this config.
    #[must_use]
    pub fn needs_stage(&self, trigger: TriggerType) -> bool {
        self.require_on_stage && !self.off_stage.contains(&trigger)
    }

    /// Set the condition (builder pattern).
    #[must_use]
    pub fn with_condition(mut self, condition: ListenerCondition) -> Self {
        self.condition = Some(condition);
        self
    }
}

/// A card bound to one or more trigger types.
#[derive(Clone, Debug)]
pub struct Listener {
    pub id: ListenerId,
    pub card: EntityId,
    pub owner: PlayerId,
    pub triggers: SmallVec<[TriggerType; 4]>,
    pub config: ListenerConfig,
}

/// Registry of listeners, indexed by trigger type.
#[derive(Clone, Debug, Default)]
pub struct TriggerDispatcher {
    listeners: FxHashMap<ListenerId, Listener>,

    /// Listener IDs per trigger type, in registration order.
    by_trigger: FxHashMap<TriggerType, Vec<ListenerId>>,

    /// The one live registration of each card.
    by_card: FxHashMap<EntityId, ListenerId>,

    next_id: u32,
}

impl TriggerDispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `card` to `triggers`.
    ///
    /// A card has at most one binding: registering it again replaces the
    /// previous binding, and the card moves to the end of the order.
    pub fn register_listener(
        &mut self,
        card: &CardInstance,
        triggers: impl IntoIterator<Item = TriggerType>,
        config: ListenerConfig,
    ) -> ListenerId {
        self.remove_for_card(card.entity_id);

        let id = ListenerId(self.next_id);
        self.next_id += 1;

        let mut bound: SmallVec<[TriggerType; 4]> = SmallVec::new();
        for trigger in triggers {
            if !bound.contains(&trigger) {
                bound.push(trigger);
            }
        }
        for trigger in &bound {
            self.by_trigger.entry(*trigger).or_default().push(id);
        }

        debug!(card = %card.entity_id, number = %card.card_number, triggers = ?bound, "Registered listener");
        self.by_card.insert(card.entity_id, id);
        self.listeners.insert(
            id,
            Listener {
                id,
                card: card.entity_id,
                owner: card.owner,
                triggers: bound,
                config,
            },
        );
        id
    }

    /// Remove a listener.
    pub fn unregister(&mut self, id: ListenerId) -> Option<Listener> {
        let listener = self.listeners.remove(&id)?;

        let mut empty = Vec::new();
        for trigger in &listener.triggers {
            if let Some(ids) = self.by_trigger.get_mut(trigger) {
                ids.retain(|&other| other != id);
                if ids.is_empty() {
                    empty.push(*trigger);
                }
            }
        }
        for trigger in empty {
            self.by_trigger.remove(&trigger);
        }
        if self.by_card.get(&listener.card) == Some(&id) {
            self.by_card.remove(&listener.card);
        }
        Some(listener)
    }

    /// Remove the binding of a card, if any.
    pub fn remove_for_card(&mut self, card: EntityId) -> Option<Listener> {
        let id = self.by_card.get(&card).copied()?;
        self.unregister(id)
    }

    /// Keep only listeners for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&Listener) -> bool) -> usize {
        let doomed: Vec<ListenerId> = self
            .listeners
            .values()
            .filter(|listener| !keep(listener))
            .map(|listener| listener.id)
            .collect();
        for id in &doomed {
            self.unregister(*id);
        }
        doomed.len()
    }

    #[must_use]
    pub fn get(&self, id: ListenerId) -> Option<&Listener> {
        self.listeners.get(&id)
    }

    #[must_use]
    pub fn listener_for(&self, card: EntityId) -> Option<&Listener> {
        self.by_card.get(&card).and_then(|id| self.listeners.get(id))
    }

    #[must_use]
    pub fn is_bound(&self, card: EntityId) -> bool {
        self.by_card.contains_key(&card)
    }

    /// Listeners for a trigger type, in registration order.
    #[must_use]
    pub fn listeners_for(&self, trigger: TriggerType) -> Vec<&Listener> {
        self.by_trigger
            .get(&trigger)
            .map(|ids| ids.iter().filter_map(|id| self.listeners.get(id)).collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Fire `trigger` and resolve every eligible listener in order.
    ///
    /// Returns one result per executed listener. Only an acting player that
    /// is not seated is an error.
    pub async fn fire(
        &self,
        trigger: TriggerType,
        context: EventContext,
        manager: &EffectManager,
        state: &mut GameState,
    ) -> Result<Vec<EffectResult>> {
        if let Err(e) = state.check_player(context.player) {
            error!(%trigger, error = %e, "Rejected trigger");
            return Err(e);
        }

        let Some(ids) = self.by_trigger.get(&trigger) else {
            return Ok(Vec::new());
        };
        let event = TriggerEvent::new(trigger, context);

        let mut results = Vec::new();
        for id in ids.clone() {
            if let Some(listener) = self.listeners.get(&id) {
                if let Some(result) = Self::resolve_listener(listener, &event, manager, state).await {
                    results.push(result);
                }
            }
        }
        Ok(results)
    }

    /// Fire the manual trigger for one card on behalf of `player`.
    ///
    /// Runs through the same filtering, limit and cost checks as
    /// [`TriggerDispatcher::fire`]. A card that is not bound to the manual
    /// trigger, or that `player` does not own, yields no results.
    pub async fn manual_trigger(
        &self,
        card: EntityId,
        player: PlayerId,
        manager: &EffectManager,
        state: &mut GameState,
    ) -> Result<Vec<EffectResult>> {
        if let Err(e) = state.check_player(player) {
            error!(%card, error = %e, "Rejected manual trigger");
            return Err(e);
        }

        let Some(listener) = self
            .listener_for(card)
            .filter(|listener| listener.triggers.contains(&TriggerType::ManualTrigger))
        else {
            debug!(%card, "Manual trigger on unbound card");
            return Ok(Vec::new());
        };
        if listener.owner != player {
            debug!(%card, %player, owner = %listener.owner, "Manual trigger by non-owner");
            return Ok(Vec::new());
        }

        let event = TriggerEvent::new(TriggerType::ManualTrigger, EventContext::new(player).with_source(card));
        Ok(Self::resolve_listener(listener, &event, manager, state)
            .await
            .into_iter()
            .collect())
    }

    async fn resolve_listener(
        listener: &Listener,
        event: &TriggerEvent,
        manager: &EffectManager,
        state: &mut GameState,
    ) -> Option<EffectResult> {
        let trigger = event.trigger;

        if listener.config.needs_stage(trigger) && !state.is_on_stage(listener.card, event.player()) {
            debug!(card = %listener.card, %trigger, "Listener skipped: not on stage");
            return None;
        }

        let Some(card) = state
            .find_card(listener.card)
            .or_else(|| event.context.card(listener.card))
            .cloned()
        else {
            debug!(card = %listener.card, %trigger, "Listener skipped: card not found");
            return None;
        };

        if let Some(condition) = &listener.config.condition {
            let ctx = ConditionContext::new(event, &card, &*state);
            if !ConditionEvaluator::evaluate(condition, &ctx) {
                debug!(card = %listener.card, %trigger, "Listener skipped: condition false");
                return None;
            }
        }

        Some(manager.execute_effect(&card, event, state).await)
    }
}
