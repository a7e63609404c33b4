//! The condition/execute contract every effect implements.
//!
//! `can_activate` is a pure check against a read-only view. `execute` gets an
//! [`EffectIo`]: mutable access to the match through `GameStateMutator`, plus
//! the choice source for decisions. Decisions go through `EffectIo` so the
//! configured timeout applies to every suspension point.
//!
//! Executors do not guard against being run twice. The effect manager runs
//! each eligible firing at most once and does the usage bookkeeping.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use super::choice::PlayerChoiceSource;
use super::result::{EffectError, EffectResult};
use crate::cards::CardInstance;
use crate::core::{EntityId, PlayerId};
use crate::triggers::TriggerEvent;
use crate::zones::{GameStateMutator, GameStateView};

/// An effect implementation.
#[async_trait]
pub trait EffectExecutor: Send + Sync {
    /// Eligibility check. Must not mutate anything. Defaults to eligible.
    fn can_activate(&self, _card: &CardInstance, _event: &TriggerEvent, _view: &dyn GameStateView) -> bool {
        true
    }

    /// Apply the effect.
    async fn execute(
        &self,
        card: &CardInstance,
        event: &TriggerEvent,
        io: &mut EffectIo<'_>,
    ) -> Result<EffectResult, EffectError>;
}

/// What an executor may touch while it runs.
pub struct EffectIo<'a> {
    /// The match.
    pub state: &'a mut dyn GameStateMutator,
    choices: &'a dyn PlayerChoiceSource,
    timeout: Option<Duration>,
}

impl<'a> EffectIo<'a> {
    pub fn new(
        state: &'a mut dyn GameStateMutator,
        choices: &'a dyn PlayerChoiceSource,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            state,
            choices,
            timeout,
        }
    }

    async fn bounded<T>(&self, decision: impl Future<Output = T> + Send) -> Result<T, EffectError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, decision)
                .await
                .map_err(|_| EffectError::ChoiceTimedOut(limit)),
            None => Ok(decision.await),
        }
    }

    /// Ask the player to confirm. A refusal is `Ok(false)`.
    pub async fn confirm(&self, player: PlayerId, prompt: &str) -> Result<bool, EffectError> {
        self.bounded(self.choices.confirm(player, prompt)).await
    }

    /// Ask the player to pick between `min` and `max` candidates.
    ///
    /// A cancelled pick is `EffectError::Cancelled`. Picks outside the
    /// candidate list, repeats and counts outside `min..=max` are rejected
    /// as invalid targets.
    pub async fn choose(
        &self,
        player: PlayerId,
        prompt: &str,
        candidates: &[CardInstance],
        min: usize,
        max: usize,
    ) -> Result<Vec<EntityId>, EffectError> {
        let max = max.min(candidates.len());
        let min = min.min(max);
        if max == 0 {
            return Ok(Vec::new());
        }

        let picked = self
            .bounded(self.choices.choose_cards(player, prompt, candidates, min, max))
            .await?
            .ok_or(EffectError::Cancelled)?;

        if picked.len() < min || picked.len() > max {
            return Err(EffectError::InvalidTarget(format!(
                "picked {} cards, expected {min} to {max}",
                picked.len()
            )));
        }
        for (i, entity) in picked.iter().enumerate() {
            if !candidates.iter().any(|card| card.entity_id == *entity) || picked[..i].contains(entity) {
                return Err(EffectError::InvalidTarget(format!("{entity} is not a candidate")));
            }
        }
        Ok(picked)
    }

    /// Ask the player to order `cards`. The answer must be a permutation.
    pub async fn order(&self, player: PlayerId, cards: &[CardInstance]) -> Result<Vec<EntityId>, EffectError> {
        if cards.len() < 2 {
            return Ok(cards.iter().map(|card| card.entity_id).collect());
        }

        let order = self.bounded(self.choices.order_cards(player, cards)).await?;
        let mut expected: Vec<EntityId> = cards.iter().map(|card| card.entity_id).collect();
        let mut given = order.clone();
        expected.sort_unstable();
        given.sort_unstable();
        if expected != given {
            return Err(EffectError::InvalidTarget("order is not a permutation".to_string()));
        }
        Ok(order)
    }
}
