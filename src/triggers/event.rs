//! Trigger events.
//!
//! A `TriggerEvent` records what just happened: the trigger type, the acting
//! player, the cards involved and free-form context (source and target
//! position, numeric values, tags). It is built at the moment of firing,
//! read by every matching listener, and then dropped.
//!
//! ## Event Data
//!
//! - `player`: the acting player; eligibility checks look in their zones
//! - `cards`: snapshots of the cards involved
//! - `source` / `target`: entities that caused or received the event
//! - `from_zone` / `to_zone`: positions for zone transitions
//! - `values`: named numbers (damage amount, die face, ...)
//! - `tags`: string keys for card-specific filtering

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::kind::TriggerType;
use crate::cards::CardInstance;
use crate::core::{EntityId, PlayerId};
use crate::zones::Zone;

/// Context fields of a trigger event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventContext {
    /// The acting player.
    pub player: PlayerId,

    /// Cards involved in the event.
    #[serde(default)]
    pub cards: Vec<CardInstance>,

    /// The entity that caused the event.
    pub source: Option<EntityId>,

    /// The entity affected by the event.
    pub target: Option<EntityId>,

    pub from_zone: Option<Zone>,

    pub to_zone: Option<Zone>,

    #[serde(default)]
    pub values: FxHashMap<String, i64>,

    #[serde(default)]
    pub tags: Vec<String>,
}

impl EventContext {
    /// Create a context for `player` with nothing else set.
    #[must_use]
    pub fn new(player: PlayerId) -> Self {
        Self {
            player,
            cards: Vec::new(),
            source: None,
            target: None,
            from_zone: None,
            to_zone: None,
            values: FxHashMap::default(),
            tags: Vec::new(),
        }
    }

    /// Add an involved card (builder pattern).
    #[must_use]
    pub fn with_card(mut self, card: CardInstance) -> Self {
        self.cards.push(card);
        self
    }

    /// Set the source entity (builder pattern).
    #[must_use]
    pub fn with_source(mut self, source: EntityId) -> Self {
        self.source = Some(source);
        self
    }

    /// Set the target entity (builder pattern).
    #[must_use]
    pub fn with_target(mut self, target: EntityId) -> Self {
        self.target = Some(target);
        self
    }

    /// Set the zone a card came from (builder pattern).
    #[must_use]
    pub fn from_zone(mut self, zone: Zone) -> Self {
        self.from_zone = Some(zone);
        self
    }

    /// Set the zone a card went to (builder pattern).
    #[must_use]
    pub fn to_zone(mut self, zone: Zone) -> Self {
        self.to_zone = Some(zone);
        self
    }

    /// Set a named value (builder pattern).
    #[must_use]
    pub fn with_value(mut self, key: impl Into<String>, value: i64) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    /// Add a tag (builder pattern).
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    #[must_use]
    pub fn value(&self, key: &str) -> Option<i64> {
        self.values.get(key).copied()
    }

    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Check if an entity is the source, the target or one of the cards.
    #[must_use]
    pub fn involves(&self, entity: EntityId) -> bool {
        self.source == Some(entity)
            || self.target == Some(entity)
            || self.cards.iter().any(|card| card.entity_id == entity)
    }

    /// The involved card snapshot for an entity, if present.
    #[must_use]
    pub fn card(&self, entity: EntityId) -> Option<&CardInstance> {
        self.cards.iter().find(|card| card.entity_id == entity)
    }
}

/// An immutable record of one firing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerEvent {
    pub trigger: TriggerType,
    pub context: EventContext,
}

impl TriggerEvent {
    #[must_use]
    pub fn new(trigger: TriggerType, context: EventContext) -> Self {
        Self { trigger, context }
    }

    /// The acting player.
    #[must_use]
    pub fn player(&self) -> PlayerId {
        self.context.player
    }
}

/// Shorthands for common event shapes.
impl EventContext {
    /// A card moving between zones. The card is both source and involved.
    #[must_use]
    pub fn zone_change(card: &CardInstance, from: Zone, to: Zone) -> Self {
        Self::new(card.owner)
            .with_card(card.clone())
            .with_source(card.entity_id)
            .from_zone(from)
            .to_zone(to)
    }

    /// Damage dealt to a card. `values["damage"]` holds the amount.
    #[must_use]
    pub fn damage(target: &CardInstance, amount: u32) -> Self {
        Self::new(target.owner)
            .with_card(target.clone())
            .with_target(target.entity_id)
            .with_value("damage", i64::from(amount))
    }
}
