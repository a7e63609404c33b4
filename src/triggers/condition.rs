//! Listener conditions.
//!
//! A condition is the custom eligibility predicate of a listener. It is
//! checked after the on-stage requirement and before any execution; a
//! condition that evaluates to false skips the listener silently.
//!
//! Common shapes are plain variants. Card-specific logic goes through
//! `ListenerCondition::predicate`, which wraps a closure.

use std::sync::Arc;

use crate::cards::CardInstance;
use crate::core::PlayerId;
use crate::zones::{GameStateView, Zone};

use super::event::TriggerEvent;
use super::kind::TriggerType;

/// Closure form of a condition.
pub type Predicate = Arc<dyn Fn(&ConditionContext<'_>) -> bool + Send + Sync>;

/// An eligibility condition attached to a listener.
#[derive(Clone)]
pub enum ListenerCondition {
    Always,

    Never,

    /// The acting player must be this player.
    ForPlayer(PlayerId),

    /// The listening card's owner must be the acting player.
    OwnerActing,

    /// The listening card must be the event source.
    IsSource,

    /// The listening card must be the event target.
    IsTarget,

    /// The listening card must be involved in the event at all.
    Involved,

    /// The event is about the listening card: its owner's turn for turn
    /// structure triggers, the card itself being involved for everything
    /// else. `condition_met` and `while_present` always pass.
    OwnEvent,

    FromZone(Zone),

    ToZone(Zone),

    HasTag(String),

    NotTag(String),

    /// A named event value must be at least `min`.
    ValueAtLeast { key: String, min: i64 },

    All(Vec<ListenerCondition>),

    Any(Vec<ListenerCondition>),

    Not(Box<ListenerCondition>),

    Predicate(Predicate),
}

impl std::fmt::Debug for ListenerCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Always => write!(f, "Always"),
            Self::Never => write!(f, "Never"),
            Self::ForPlayer(player) => f.debug_tuple("ForPlayer").field(player).finish(),
            Self::OwnerActing => write!(f, "OwnerActing"),
            Self::IsSource => write!(f, "IsSource"),
            Self::IsTarget => write!(f, "IsTarget"),
            Self::Involved => write!(f, "Involved"),
            Self::OwnEvent => write!(f, "OwnEvent"),
            Self::FromZone(zone) => f.debug_tuple("FromZone").field(zone).finish(),
            Self::ToZone(zone) => f.debug_tuple("ToZone").field(zone).finish(),
            Self::HasTag(tag) => f.debug_tuple("HasTag").field(tag).finish(),
            Self::NotTag(tag) => f.debug_tuple("NotTag").field(tag).finish(),
            Self::ValueAtLeast { key, min } => f
                .debug_struct("ValueAtLeast")
                .field("key", key)
                .field("min", min)
                .finish(),
            Self::All(conditions) => f.debug_tuple("All").field(conditions).finish(),
            Self::Any(conditions) => f.debug_tuple("Any").field(conditions).finish(),
            Self::Not(condition) => f.debug_tuple("Not").field(condition).finish(),
            Self::Predicate(_) => write!(f, "Predicate(..)"),
        }
    }
}

impl ListenerCondition {
    /// Wrap a closure.
    pub fn predicate(f: impl Fn(&ConditionContext<'_>) -> bool + Send + Sync + 'static) -> Self {
        Self::Predicate(Arc::new(f))
    }

    pub fn value_at_least(key: impl Into<String>, min: i64) -> Self {
        Self::ValueAtLeast {
            key: key.into(),
            min,
        }
    }

    pub fn all(conditions: impl IntoIterator<Item = ListenerCondition>) -> Self {
        Self::All(conditions.into_iter().collect())
    }

    pub fn any(conditions: impl IntoIterator<Item = ListenerCondition>) -> Self {
        Self::Any(conditions.into_iter().collect())
    }

    /// Negate (builder pattern).
    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Combine with AND, flattening nested `All`.
    #[must_use]
    pub fn and(self, other: ListenerCondition) -> Self {
        match self {
            Self::All(mut conditions) => {
                conditions.push(other);
                Self::All(conditions)
            }
            _ => Self::All(vec![self, other]),
        }
    }

    /// Combine with OR, flattening nested `Any`.
    #[must_use]
    pub fn or(self, other: ListenerCondition) -> Self {
        match self {
            Self::Any(mut conditions) => {
                conditions.push(other);
                Self::Any(conditions)
            }
            _ => Self::Any(vec![self, other]),
        }
    }
}

/// Everything a condition may look at.
pub struct ConditionContext<'a> {
    pub event: &'a TriggerEvent,
    /// The listening card.
    pub card: &'a CardInstance,
    /// Read-only match state.
    pub view: &'a dyn GameStateView,
}

impl<'a> ConditionContext<'a> {
    pub fn new(event: &'a TriggerEvent, card: &'a CardInstance, view: &'a dyn GameStateView) -> Self {
        Self { event, card, view }
    }
}

/// Evaluator for listener conditions.
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// Check if a condition is satisfied.
    pub fn evaluate(condition: &ListenerCondition, ctx: &ConditionContext<'_>) -> bool {
        let event = &ctx.event.context;
        let card = ctx.card.entity_id;

        match condition {
            ListenerCondition::Always => true,

            ListenerCondition::Never => false,

            ListenerCondition::ForPlayer(player) => event.player == *player,

            ListenerCondition::OwnerActing => ctx.card.owner == event.player,

            ListenerCondition::IsSource => event.source == Some(card),

            ListenerCondition::IsTarget => event.target == Some(card),

            ListenerCondition::Involved => event.involves(card),

            ListenerCondition::OwnEvent => match ctx.event.trigger {
                trigger if trigger.is_turn_structure() => ctx.card.owner == event.player,
                TriggerType::ConditionMet | TriggerType::WhilePresent => true,
                _ => event.involves(card),
            },

            ListenerCondition::FromZone(zone) => event.from_zone == Some(*zone),

            ListenerCondition::ToZone(zone) => event.to_zone == Some(*zone),

            ListenerCondition::HasTag(tag) => event.has_tag(tag),

            ListenerCondition::NotTag(tag) => !event.has_tag(tag),

            ListenerCondition::ValueAtLeast { key, min } => {
                event.value(key).is_some_and(|value| value >= *min)
            }

            ListenerCondition::All(conditions) => conditions.iter().all(|c| Self::evaluate(c, ctx)),

            ListenerCondition::Any(conditions) => conditions.iter().any(|c| Self::evaluate(c, ctx)),

            ListenerCondition::Not(inner) => !Self::evaluate(inner, ctx),

            ListenerCondition::Predicate(f) => f(ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{BloomLevel, CardTemplate};
    use crate::core::{EngineConfig, EntityId, GameState};
    use crate::triggers::{EventContext, TriggerType};
    use crate::zones::{GameStateView, Position};

    fn setup() -> (GameState, CardInstance) {
        let mut state = GameState::new(&EngineConfig::default());
        let template = CardTemplate::holomem("hSD01-003", "Tokino Sora", BloomLevel::Debut, 60);
        let entity = state.add_card(&template, PlayerId::new(0), Zone::Collab, Position::Top);
        let card = state.find_card(entity).cloned().unwrap();
        (state, card)
    }

    fn collab_event(card: &CardInstance) -> TriggerEvent {
        TriggerEvent::new(
            TriggerType::OnCollab,
            EventContext::zone_change(card, Zone::Back, Zone::Collab).with_value("yells", 2),
        )
    }

    #[test]
    fn test_basic_conditions() {
        let (state, card) = setup();
        let event = collab_event(&card);
        let ctx = ConditionContext::new(&event, &card, &state);

        assert!(ConditionEvaluator::evaluate(&ListenerCondition::Always, &ctx));
        assert!(!ConditionEvaluator::evaluate(&ListenerCondition::Never, &ctx));
        assert!(ConditionEvaluator::evaluate(&ListenerCondition::OwnerActing, &ctx));
        assert!(ConditionEvaluator::evaluate(&ListenerCondition::IsSource, &ctx));
        assert!(!ConditionEvaluator::evaluate(&ListenerCondition::IsTarget, &ctx));
        assert!(ConditionEvaluator::evaluate(&ListenerCondition::ToZone(Zone::Collab), &ctx));
        assert!(!ConditionEvaluator::evaluate(
            &ListenerCondition::ForPlayer(PlayerId::new(1)),
            &ctx
        ));
    }

    #[test]
    fn test_own_event() {
        let (state, card) = setup();
        let other = CardTemplate::holomem("hSD01-004", "AZKi", BloomLevel::Debut, 50)
            .instantiate(EntityId(50), PlayerId::new(0));

        let collab = collab_event(&card);
        assert!(ConditionEvaluator::evaluate(
            &ListenerCondition::OwnEvent,
            &ConditionContext::new(&collab, &card, &state)
        ));
        assert!(!ConditionEvaluator::evaluate(
            &ListenerCondition::OwnEvent,
            &ConditionContext::new(&collab, &other, &state)
        ));

        let turn_start = TriggerEvent::new(TriggerType::OnTurnStart, EventContext::new(PlayerId::new(1)));
        assert!(!ConditionEvaluator::evaluate(
            &ListenerCondition::OwnEvent,
            &ConditionContext::new(&turn_start, &card, &state)
        ));
    }

    #[test]
    fn test_value_conditions() {
        let (state, card) = setup();
        let event = collab_event(&card);
        let ctx = ConditionContext::new(&event, &card, &state);

        assert!(ConditionEvaluator::evaluate(&ListenerCondition::value_at_least("yells", 2), &ctx));
        assert!(!ConditionEvaluator::evaluate(&ListenerCondition::value_at_least("yells", 3), &ctx));
        // Missing values never pass
        assert!(!ConditionEvaluator::evaluate(&ListenerCondition::value_at_least("damage", 0), &ctx));
    }

    #[test]
    fn test_combinators() {
        let (state, card) = setup();
        let event = collab_event(&card);
        let ctx = ConditionContext::new(&event, &card, &state);

        let both = ListenerCondition::OwnerActing.and(ListenerCondition::HasTag("art".into()));
        assert!(!ConditionEvaluator::evaluate(&both, &ctx));

        let either = ListenerCondition::Never.or(ListenerCondition::Involved);
        assert!(ConditionEvaluator::evaluate(&either, &ctx));

        assert!(ConditionEvaluator::evaluate(&ListenerCondition::Never.negate(), &ctx));
    }

    #[test]
    fn test_predicate_reads_state() {
        let (state, card) = setup();
        let event = collab_event(&card);
        let ctx = ConditionContext::new(&event, &card, &state);

        let on_collab = ListenerCondition::predicate(|ctx| {
            ctx.view.locate_card(ctx.card.entity_id).map(|(_, zone)| zone) == Some(Zone::Collab)
        });
        assert!(ConditionEvaluator::evaluate(&on_collab, &ctx));

        let missing = ListenerCondition::predicate(|ctx| ctx.view.find_card(EntityId(99)).is_some());
        assert!(!ConditionEvaluator::evaluate(&missing, &ctx));
        assert_eq!(format!("{missing:?}"), "Predicate(..)");
    }
}
