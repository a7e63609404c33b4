//! Card filters and target specs.
//!
//! - `CardFilter`: a predicate over printed card data (category, color,
//!   bloom level, name, number), used by searches and deck looks
//! - `TargetSpec`: which holomems an effect may hit, relative to the card
//!   whose effect is resolving
//! - `TargetSelector`: resolves a spec to candidate cards against a view

use serde::{Deserialize, Serialize};

use crate::cards::{normalize_card_id, BloomLevel, CardCategory, CardInstance, Color};
use crate::core::PlayerId;
use crate::triggers::TriggerEvent;
use crate::zones::{GameStateView, Zone};

/// Filter over printed card data.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardFilter {
    /// Matches every card.
    #[default]
    Any,
    Category(CardCategory),
    NotCategory(CardCategory),
    Color(Color),
    Bloom(BloomLevel),
    /// Exact display name.
    Named(String),
    /// Card number, compared after normalization.
    Number(String),
    All(Vec<CardFilter>),
    AnyOf(Vec<CardFilter>),
    Not(Box<CardFilter>),
}

impl CardFilter {
    /// Holomems.
    #[must_use]
    pub fn character() -> Self {
        Self::Category(CardCategory::Character)
    }

    /// Support cards.
    #[must_use]
    pub fn support() -> Self {
        Self::Category(CardCategory::Support)
    }

    /// Holomems of one bloom level.
    #[must_use]
    pub fn holomem_at(level: BloomLevel) -> Self {
        Self::character().and(Self::Bloom(level))
    }

    /// Combine with AND (builder pattern).
    #[must_use]
    pub fn and(self, other: CardFilter) -> Self {
        match self {
            Self::Any => other,
            Self::All(mut filters) => {
                filters.push(other);
                Self::All(filters)
            }
            _ => Self::All(vec![self, other]),
        }
    }

    #[must_use]
    pub fn matches(&self, card: &CardInstance) -> bool {
        match self {
            CardFilter::Any => true,
            CardFilter::Category(category) => card.category == *category,
            CardFilter::NotCategory(category) => card.category != *category,
            CardFilter::Color(color) => card.has_color(*color),
            CardFilter::Bloom(level) => card.bloom_level == Some(*level),
            CardFilter::Named(name) => card.name == *name,
            CardFilter::Number(number) => card.base_number() == normalize_card_id(number),
            CardFilter::All(filters) => filters.iter().all(|f| f.matches(card)),
            CardFilter::AnyOf(filters) => filters.iter().any(|f| f.matches(card)),
            CardFilter::Not(inner) => !inner.matches(card),
        }
    }
}

/// Whose stage, relative to the card's owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Own,
    Opponent,
}

/// Which holomems an effect may target.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetSpec {
    /// The card whose effect is resolving.
    ThisCard,
    /// The event's target entity.
    EventTarget,
    Center(Side),
    Collab(Side),
    /// Any holomem on that side matching the filter.
    Holomem { side: Side, filter: CardFilter },
}

impl TargetSpec {
    /// Check if the owner picks one candidate instead of hitting all.
    #[must_use]
    pub fn is_choice(&self) -> bool {
        matches!(self, TargetSpec::Holomem { .. })
    }
}

/// Resolves a `TargetSpec` for one resolving card.
pub struct TargetSelector<'a> {
    card: &'a CardInstance,
    event: &'a TriggerEvent,
}

impl<'a> TargetSelector<'a> {
    pub fn new(card: &'a CardInstance, event: &'a TriggerEvent) -> Self {
        Self { card, event }
    }

    fn players<V: GameStateView + ?Sized>(&self, side: Side, view: &V) -> Vec<PlayerId> {
        let owner = self.card.owner;
        match side {
            Side::Own => vec![owner],
            Side::Opponent => PlayerId::all(view.player_count())
                .filter(|&player| player != owner)
                .collect(),
        }
    }

    /// Every valid target, in stage order.
    pub fn candidates<V: GameStateView + ?Sized>(&self, spec: &TargetSpec, view: &V) -> Vec<CardInstance> {
        let on_stage = |entity| {
            view.locate_card(entity)
                .is_some_and(|(_, zone)| zone.is_holomem_position())
        };

        match spec {
            TargetSpec::ThisCard => view
                .find_card(self.card.entity_id)
                .filter(|_| on_stage(self.card.entity_id))
                .into_iter()
                .cloned()
                .collect(),
            TargetSpec::EventTarget => self
                .event
                .context
                .target
                .filter(|&entity| on_stage(entity))
                .and_then(|entity| view.find_card(entity))
                .into_iter()
                .cloned()
                .collect(),
            TargetSpec::Center(side) => self.in_zone(*side, Zone::Center, &CardFilter::Any, view),
            TargetSpec::Collab(side) => self.in_zone(*side, Zone::Collab, &CardFilter::Any, view),
            TargetSpec::Holomem { side, filter } => [Zone::Center, Zone::Collab, Zone::Back]
                .into_iter()
                .flat_map(|zone| self.in_zone(*side, zone, filter, view))
                .collect(),
        }
    }

    fn in_zone<V: GameStateView + ?Sized>(
        &self,
        side: Side,
        zone: Zone,
        filter: &CardFilter,
        view: &V,
    ) -> Vec<CardInstance> {
        self.players(side, view)
            .into_iter()
            .flat_map(|player| view.cards_in(player, zone))
            .filter(|card| filter.matches(card))
            .cloned()
            .collect()
    }
}
