//! Player decisions.
//!
//! Effects that need a decision (confirm an optional effect, pick cards from
//! a search, order cards returned to the deck) suspend on a
//! [`PlayerChoiceSource`]. The engine never talks to a UI: a front end, a CPU
//! player or a test script implements this trait.
//!
//! - [`AutoChoice`]: confirms everything, picks the first candidates
//! - [`ScriptedChoices`]: replays a queue of answers, then falls back to auto
//! - [`DeclineAll`]: declines every confirmation and cancels every pick

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::cards::CardInstance;
use crate::core::{EntityId, PlayerId};

/// Source of interactive decisions.
#[async_trait]
pub trait PlayerChoiceSource: Send + Sync {
    /// Ask whether to go ahead with an optional effect.
    async fn confirm(&self, player: PlayerId, prompt: &str) -> bool;

    /// Pick between `min` and `max` of `candidates`. `None` cancels.
    async fn choose_cards(
        &self,
        player: PlayerId,
        prompt: &str,
        candidates: &[CardInstance],
        min: usize,
        max: usize,
    ) -> Option<Vec<EntityId>>;

    /// Order cards, first = placed first. Defaults to the given order.
    async fn order_cards(&self, _player: PlayerId, cards: &[CardInstance]) -> Vec<EntityId> {
        cards.iter().map(|card| card.entity_id).collect()
    }
}

/// Confirms everything and picks the first `max` candidates.
#[derive(Clone, Copy, Debug, Default)]
pub struct AutoChoice;

#[async_trait]
impl PlayerChoiceSource for AutoChoice {
    async fn confirm(&self, _player: PlayerId, _prompt: &str) -> bool {
        true
    }

    async fn choose_cards(
        &self,
        _player: PlayerId,
        _prompt: &str,
        candidates: &[CardInstance],
        _min: usize,
        max: usize,
    ) -> Option<Vec<EntityId>> {
        Some(candidates.iter().take(max).map(|card| card.entity_id).collect())
    }
}

/// Declines every confirmation and cancels every pick.
#[derive(Clone, Copy, Debug, Default)]
pub struct DeclineAll;

#[async_trait]
impl PlayerChoiceSource for DeclineAll {
    async fn confirm(&self, _player: PlayerId, _prompt: &str) -> bool {
        false
    }

    async fn choose_cards(
        &self,
        _player: PlayerId,
        _prompt: &str,
        _candidates: &[CardInstance],
        _min: usize,
        _max: usize,
    ) -> Option<Vec<EntityId>> {
        None
    }
}

/// One queued answer for [`ScriptedChoices`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScriptedAnswer {
    Confirm(bool),
    Pick(Vec<EntityId>),
    Order(Vec<EntityId>),
    Cancel,
}

/// Replays queued answers in order.
///
/// An answer of the wrong kind for the question is consumed and treated as
/// a refusal. Once the queue runs dry, questions are answered like
/// [`AutoChoice`].
#[derive(Debug, Default)]
pub struct ScriptedChoices {
    answers: Mutex<VecDeque<ScriptedAnswer>>,
}

impl ScriptedChoices {
    pub fn new(answers: impl IntoIterator<Item = ScriptedAnswer>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
        }
    }

    /// Answers not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.answers.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn next_answer(&self) -> Option<ScriptedAnswer> {
        self.answers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }
}

#[async_trait]
impl PlayerChoiceSource for ScriptedChoices {
    async fn confirm(&self, player: PlayerId, prompt: &str) -> bool {
        match self.next_answer() {
            Some(ScriptedAnswer::Confirm(answer)) => answer,
            Some(_) => false,
            None => AutoChoice.confirm(player, prompt).await,
        }
    }

    async fn choose_cards(
        &self,
        player: PlayerId,
        prompt: &str,
        candidates: &[CardInstance],
        min: usize,
        max: usize,
    ) -> Option<Vec<EntityId>> {
        match self.next_answer() {
            Some(ScriptedAnswer::Pick(picked)) => Some(picked),
            Some(_) => None,
            None => AutoChoice.choose_cards(player, prompt, candidates, min, max).await,
        }
    }

    async fn order_cards(&self, player: PlayerId, cards: &[CardInstance]) -> Vec<EntityId> {
        match self.next_answer() {
            Some(ScriptedAnswer::Order(order)) => order,
            _ => AutoChoice.order_cards(player, cards).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardTemplate;

    fn cards(n: u32) -> Vec<CardInstance> {
        (1..=n)
            .map(|id| CardTemplate::support("hSD01-016", "Support").instantiate(EntityId(id), PlayerId::new(0)))
            .collect()
    }

    #[tokio::test]
    async fn test_auto_choice() {
        let picked = AutoChoice
            .choose_cards(PlayerId::new(0), "pick", &cards(3), 0, 2)
            .await;
        assert_eq!(picked, Some(vec![EntityId(1), EntityId(2)]));
        assert!(AutoChoice.confirm(PlayerId::new(0), "ok?").await);
    }

    #[tokio::test]
    async fn test_decline_all() {
        assert!(!DeclineAll.confirm(PlayerId::new(0), "ok?").await);
        assert_eq!(DeclineAll.choose_cards(PlayerId::new(0), "pick", &cards(2), 0, 1).await, None);
    }

    #[tokio::test]
    async fn test_scripted_then_auto() {
        let script = ScriptedChoices::new([
            ScriptedAnswer::Confirm(false),
            ScriptedAnswer::Pick(vec![EntityId(3)]),
            ScriptedAnswer::Cancel,
        ]);
        let p0 = PlayerId::new(0);

        assert!(!script.confirm(p0, "ok?").await);
        assert_eq!(script.choose_cards(p0, "pick", &cards(3), 0, 1).await, Some(vec![EntityId(3)]));
        // Wrong kind of answer refuses
        assert!(!script.confirm(p0, "ok?").await);
        assert_eq!(script.remaining(), 0);
        // Dry queue behaves like AutoChoice
        assert!(script.confirm(p0, "ok?").await);
        assert_eq!(
            script.order_cards(p0, &cards(2)).await,
            vec![EntityId(1), EntityId(2)]
        );
    }
}
