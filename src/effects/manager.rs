//! Effect manager.
//!
//! The `EffectManager` is the only caller of executors. For one card and one
//! trigger event it:
//!
//! 1. finds the card's definition and the slot answering the trigger
//! 2. refuses if the slot's usage limit is consumed, without calling the
//!    executor
//! 3. checks the cost and the executor's `can_activate`
//! 4. asks for confirmation if the slot is optional
//! 5. pays the cost and runs the executor
//! 6. on success records the use in the ledger; on failure restores the
//!    snapshot taken before step 4
//!
//! Every outcome comes back as an `EffectResult`. Executor errors are logged
//! and converted, never propagated.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::choice::PlayerChoiceSource;
use super::definition::{EffectSlot, Timing};
use super::executor::EffectIo;
use super::result::{EffectError, EffectResult, FailureReason};
use crate::cards::CardInstance;
use crate::catalog::EffectCatalog;
use crate::core::{EngineConfig, GameState, UsageKey};
use crate::triggers::TriggerEvent;
use crate::zones::GameStateView;

/// Runs effects against a match with limit and cost bookkeeping.
pub struct EffectManager {
    catalog: Arc<EffectCatalog>,
    choices: Arc<dyn PlayerChoiceSource>,
    choice_timeout: Option<Duration>,
    rollback_on_failure: bool,
}

impl std::fmt::Debug for EffectManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectManager")
            .field("definitions", &self.catalog.len())
            .field("choice_timeout", &self.choice_timeout)
            .field("rollback_on_failure", &self.rollback_on_failure)
            .finish_non_exhaustive()
    }
}

impl EffectManager {
    pub fn new(catalog: Arc<EffectCatalog>, choices: Arc<dyn PlayerChoiceSource>, config: &EngineConfig) -> Self {
        Self {
            catalog,
            choices,
            choice_timeout: config.choice_timeout,
            rollback_on_failure: config.rollback_on_failure,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &Arc<EffectCatalog> {
        &self.catalog
    }

    /// Swap the decision source, e.g. when a CPU takes over a seat.
    pub fn set_choice_source(&mut self, choices: Arc<dyn PlayerChoiceSource>) {
        self.choices = choices;
    }

    fn slot_check(
        &self,
        slot: &EffectSlot,
        card: &CardInstance,
        event: &TriggerEvent,
        view: &dyn GameStateView,
    ) -> Result<(), FailureReason> {
        let key = UsageKey::new(card.owner, card.entity_id, slot.kind);
        if !slot.limit.allows(view.usage_count(&key, slot.limit)) {
            return Err(FailureReason::LimitReached);
        }
        if view.holopower(card.owner) < slot.cost.holopower {
            return Err(FailureReason::ConditionNotMet);
        }
        if !slot.executor().can_activate(card, event, view) {
            return Err(FailureReason::ConditionNotMet);
        }
        Ok(())
    }

    /// Check whether `card` could resolve an effect for `event` right now.
    ///
    /// Same gate `execute_effect` applies: a slot exists, its limit has room,
    /// its cost is affordable and its executor agrees.
    #[must_use]
    pub fn can_activate_effect(&self, card: &CardInstance, event: &TriggerEvent, view: &dyn GameStateView) -> bool {
        self.catalog
            .get(&card.card_number)
            .and_then(|definition| {
                definition
                    .slot_for(event.trigger)
                    .map(|slot| self.slot_check(slot, card, event, view).is_ok())
            })
            .unwrap_or(false)
    }

    /// Resolve the effect of `card` for `event`.
    pub async fn execute_effect(&self, card: &CardInstance, event: &TriggerEvent, state: &mut GameState) -> EffectResult {
        let trigger = event.trigger;
        let Some(definition) = self.catalog.get(&card.card_number) else {
            debug!(card = %card.card_number, %trigger, "No effect definition");
            return EffectResult::failed(FailureReason::NotImplemented, format!("{} has no effects", card.name))
                .for_card(card.entity_id, trigger);
        };
        let Some(slot) = definition.slot_for(trigger) else {
            debug!(card = %card.card_number, %trigger, "No slot for trigger");
            return EffectResult::failed(
                FailureReason::NotImplemented,
                format!("{} has no {trigger} effect", card.name),
            )
            .for_card(card.entity_id, trigger);
        };

        if let Err(reason) = self.slot_check(slot, card, event, &*state) {
            debug!(card = %card.card_number, slot = %slot.kind, %reason, "Effect not eligible");
            return EffectResult::failed(reason, format!("{}: {reason}", slot.name)).for_card(card.entity_id, trigger);
        }

        let snapshot = self.rollback_on_failure.then(|| state.clone());
        let outcome = self.run_slot(slot, card, event, state).await;

        match outcome {
            Ok(result) if result.success => {
                state
                    .ledger_mut()
                    .record(UsageKey::new(card.owner, card.entity_id, slot.kind), slot.limit);
                info!(card = %card.card_number, slot = %slot.kind, %trigger, outcome = %result.message, "Effect resolved");
                result.for_card(card.entity_id, trigger)
            }
            Ok(result) => {
                debug!(card = %card.card_number, slot = %slot.kind, outcome = %result.message, "Effect reported failure");
                if let Some(snapshot) = snapshot {
                    *state = snapshot;
                }
                result.for_card(card.entity_id, trigger)
            }
            Err(error) => {
                let reason = error.reason();
                if reason == FailureReason::ExecutionError {
                    warn!(card = %card.card_number, slot = %slot.kind, %trigger, error = %error, "Effect execution failed");
                } else {
                    debug!(card = %card.card_number, slot = %slot.kind, error = %error, "Effect not completed");
                }
                if let Some(snapshot) = snapshot {
                    *state = snapshot;
                }
                EffectResult::failed(reason, error.to_string()).for_card(card.entity_id, trigger)
            }
        }
    }

    async fn run_slot(
        &self,
        slot: &EffectSlot,
        card: &CardInstance,
        event: &TriggerEvent,
        state: &mut GameState,
    ) -> Result<EffectResult, EffectError> {
        let mut io = EffectIo::new(state, self.choices.as_ref(), self.choice_timeout);

        if slot.timing == Timing::Optional && !io.confirm(card.owner, &slot.name).await? {
            return Err(EffectError::Cancelled);
        }
        if !slot.cost.is_free() {
            io.state.pay_holopower(card.owner, slot.cost.holopower)?;
        }
        slot.executor().execute(card, event, &mut io).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::cards::{BloomLevel, CardTemplate};
    use crate::core::{PlayerId, UsageLimit};
    use crate::effects::{
        AutoChoice, DeclineAll, DrawCards, EffectCost, EffectDefinition, FnEffect, SlotKind,
    };
    use crate::triggers::{EventContext, TriggerType};
    use crate::zones::{Position, Zone};

    fn p0() -> PlayerId {
        PlayerId::new(0)
    }

    fn setup(slot: EffectSlot, choices: Arc<dyn PlayerChoiceSource>) -> (EffectManager, GameState, CardInstance) {
        let catalog = EffectCatalog::new();
        catalog.register("hSD01-003", EffectDefinition::new("hSD01-003", "Tokino Sora").with_slot(slot));
        let config = EngineConfig::default();
        let manager = EffectManager::new(Arc::new(catalog), choices, &config);

        let mut state = GameState::new(&config);
        let entity = state.add_card(
            &CardTemplate::holomem("hSD01-003_RR", "Tokino Sora", BloomLevel::Debut, 60),
            p0(),
            Zone::Center,
            Position::Top,
        );
        state.add_cards(
            &[
                CardTemplate::support("hSD01-016", "Harusaki Nodoka"),
                CardTemplate::support("hSD01-016", "Harusaki Nodoka"),
            ],
            p0(),
            Zone::Deck,
        );
        let card = state.find_card(entity).cloned().unwrap();
        (manager, state, card)
    }

    fn collab() -> TriggerEvent {
        TriggerEvent::new(TriggerType::OnCollab, EventContext::new(p0()))
    }

    #[tokio::test]
    async fn test_not_implemented() {
        let slot = EffectSlot::new(SlotKind::Bloom, TriggerType::OnBloom, DrawCards::new(1));
        let (manager, mut state, card) = setup(slot, Arc::new(AutoChoice));

        let result = manager.execute_effect(&card, &collab(), &mut state).await;
        assert!(result.failed_with(FailureReason::NotImplemented));
        assert_eq!(result.card, Some(card.entity_id));
    }

    #[tokio::test]
    async fn test_limit_checked_before_execute() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let slot = EffectSlot::new(
            SlotKind::Collab,
            TriggerType::OnCollab,
            FnEffect::new(move |_, _, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(EffectResult::ok("ran"))
            }),
        )
        .with_limit(UsageLimit::PerTurn(1));
        let (manager, mut state, card) = setup(slot, Arc::new(AutoChoice));

        assert!(manager.execute_effect(&card, &collab(), &mut state).await.success);
        let second = manager.execute_effect(&card, &collab(), &mut state).await;
        assert!(second.failed_with(FailureReason::LimitReached));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!manager.can_activate_effect(&card, &collab(), &state));
    }

    #[tokio::test]
    async fn test_optional_decline_rolls_back() {
        let slot = EffectSlot::new(SlotKind::Collab, TriggerType::OnCollab, DrawCards::new(1))
            .with_timing(Timing::Optional)
            .with_limit(UsageLimit::PerTurn(1));
        let (manager, mut state, card) = setup(slot, Arc::new(DeclineAll));

        let result = manager.execute_effect(&card, &collab(), &mut state).await;
        assert!(result.failed_with(FailureReason::Cancelled));
        assert_eq!(state.zone_size(p0(), Zone::Deck), 2);
        assert_eq!(state.zone_size(p0(), Zone::Hand), 0);
        // Declined uses are not counted
        assert!(manager.can_activate_effect(&card, &collab(), &state));
    }

    #[tokio::test]
    async fn test_error_rolls_back_partial_work() {
        let slot = EffectSlot::new(
            SlotKind::Collab,
            TriggerType::OnCollab,
            FnEffect::new(|card, _, state| {
                state.draw(card.owner, 1)?;
                Err(EffectError::Custom("boom".into()))
            }),
        );
        let (manager, mut state, card) = setup(slot, Arc::new(AutoChoice));

        let result = manager.execute_effect(&card, &collab(), &mut state).await;
        assert!(result.failed_with(FailureReason::ExecutionError));
        assert_eq!(result.message, "boom");
        assert_eq!(state.zone_size(p0(), Zone::Hand), 0);
    }

    #[tokio::test]
    async fn test_cost_paid_and_checked() {
        let slot = EffectSlot::new(SlotKind::Collab, TriggerType::OnCollab, DrawCards::new(1))
            .with_cost(EffectCost::holopower(1));
        let (manager, mut state, card) = setup(slot, Arc::new(AutoChoice));

        let result = manager.execute_effect(&card, &collab(), &mut state).await;
        assert!(result.failed_with(FailureReason::ConditionNotMet));

        state.add_card(&CardTemplate::support("hSD01-017", "Mane-chan"), p0(), Zone::Holopower, Position::Top);
        let result = manager.execute_effect(&card, &collab(), &mut state).await;
        assert!(result.success);
        assert_eq!(state.holopower(p0()), 0);
        assert_eq!(state.zone_size(p0(), Zone::Archive), 1);
    }

    #[tokio::test]
    async fn test_condition_not_met() {
        let slot = EffectSlot::new(
            SlotKind::Collab,
            TriggerType::OnCollab,
            FnEffect::new(|_, _, _| Ok(EffectResult::ok("ran"))).when(|_, _, _| false),
        );
        let (manager, mut state, card) = setup(slot, Arc::new(AutoChoice));

        let result = manager.execute_effect(&card, &collab(), &mut state).await;
        assert!(result.failed_with(FailureReason::ConditionNotMet));
    }
}
