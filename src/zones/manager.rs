//! Zone manager for card storage and movement.
//!
//! The `ZoneManager` owns every card instance that is not attached to another
//! card. It supports:
//! - Ordered zones with explicit position control (index 0 = top)
//! - Card lookup by entity ID across all players
//! - Deterministic shuffling through a `RandomSource`
//!
//! Storage uses `im` persistent vectors, so cloning the manager for a
//! rollback snapshot is O(1).

use im::{HashMap as ImHashMap, Vector};
use serde::{Deserialize, Serialize};

use super::Zone;
use crate::cards::CardInstance;
use crate::core::{EntityId, PlayerId, PlayerMap, RandomSource};

/// Position for inserting a card into a zone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Position {
    /// Add on top (index 0).
    #[default]
    Top,
    /// Add at the bottom (last index).
    Bottom,
    /// Insert at a specific index, counted from the top.
    Index(usize),
}

type PlayerZones = ImHashMap<Zone, Vector<CardInstance>>;

/// Manages card locations across all players' zones.
///
/// ## Usage
///
/// ```
/// use holo_ccg::cards::CardTemplate;
/// use holo_ccg::core::{EntityId, PlayerId};
/// use holo_ccg::zones::{Position, Zone, ZoneManager};
///
/// let p0 = PlayerId::new(0);
/// let mut manager = ZoneManager::new(2);
/// let support = CardTemplate::support("hSD01-016", "Harusaki Nodoka");
///
/// manager.place(p0, Zone::Deck, support.instantiate(EntityId(1), p0), Position::Top);
/// manager.place(p0, Zone::Deck, support.instantiate(EntityId(2), p0), Position::Top);
///
/// assert_eq!(manager.top_card(p0, Zone::Deck).map(|c| c.entity_id), Some(EntityId(2)));
/// assert_eq!(manager.locate(EntityId(1)), Some((p0, Zone::Deck, 1)));
/// ```
#[derive(Clone, Debug)]
pub struct ZoneManager {
    zones: PlayerMap<PlayerZones>,
}

impl ZoneManager {
    /// Create empty zones for `player_count` players.
    #[must_use]
    pub fn new(player_count: usize) -> Self {
        Self {
            zones: PlayerMap::new(player_count, |_| PlayerZones::new()),
        }
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.zones.player_count()
    }

    /// Insert a card into a zone.
    ///
    /// Ignored for players that are not seated.
    pub fn place(&mut self, player: PlayerId, zone: Zone, card: CardInstance, position: Position) {
        if !self.zones.contains(player) {
            return;
        }
        let cards = self.zones[player].entry(zone).or_insert_with(Vector::new);
        match position {
            Position::Top => cards.push_front(card),
            Position::Bottom => cards.push_back(card),
            Position::Index(i) => {
                let idx = i.min(cards.len());
                cards.insert(idx, card);
            }
        }
    }

    /// Find where a card is: owner of the zone, zone, index from the top.
    #[must_use]
    pub fn locate(&self, entity: EntityId) -> Option<(PlayerId, Zone, usize)> {
        self.zones.iter().find_map(|(player, zones)| {
            zones.iter().find_map(|(&zone, cards)| {
                cards
                    .iter()
                    .position(|c| c.entity_id == entity)
                    .map(|idx| (player, zone, idx))
            })
        })
    }

    /// Get a card by entity.
    #[must_use]
    pub fn find(&self, entity: EntityId) -> Option<&CardInstance> {
        let (player, zone, idx) = self.locate(entity)?;
        self.zones[player].get(&zone)?.get(idx)
    }

    /// Get a card by entity, mutably.
    pub fn find_mut(&mut self, entity: EntityId) -> Option<&mut CardInstance> {
        let (player, zone, idx) = self.locate(entity)?;
        self.zones[player].get_mut(&zone)?.get_mut(idx)
    }

    /// Remove a card from wherever it is.
    pub fn take(&mut self, entity: EntityId) -> Option<(PlayerId, Zone, CardInstance)> {
        let (player, zone, idx) = self.locate(entity)?;
        let card = self.zones[player].get_mut(&zone)?.remove(idx);
        Some((player, zone, card))
    }

    /// Cards in a zone, top first.
    pub fn cards(&self, player: PlayerId, zone: Zone) -> impl Iterator<Item = &CardInstance> {
        self.zones
            .try_get(player)
            .and_then(|zones| zones.get(&zone))
            .into_iter()
            .flat_map(|cards| cards.iter())
    }

    /// Number of cards in a zone.
    #[must_use]
    pub fn size(&self, player: PlayerId, zone: Zone) -> usize {
        self.zones
            .try_get(player)
            .and_then(|zones| zones.get(&zone))
            .map_or(0, Vector::len)
    }

    #[must_use]
    pub fn top_card(&self, player: PlayerId, zone: Zone) -> Option<&CardInstance> {
        self.zones.try_get(player)?.get(&zone)?.front()
    }

    /// The first `count` cards of a zone (fewer if the zone is shorter).
    #[must_use]
    pub fn peek_top(&self, player: PlayerId, zone: Zone, count: usize) -> Vec<&CardInstance> {
        self.cards(player, zone).take(count).collect()
    }

    /// Remove and return the top card.
    pub fn pop_top(&mut self, player: PlayerId, zone: Zone) -> Option<CardInstance> {
        if !self.zones.contains(player) {
            return None;
        }
        self.zones[player].get_mut(&zone)?.pop_front()
    }

    /// Remove and return up to `count` cards from the top, top first.
    pub fn take_top(&mut self, player: PlayerId, zone: Zone, count: usize) -> Vec<CardInstance> {
        let mut taken = Vec::with_capacity(count);
        while taken.len() < count {
            match self.pop_top(player, zone) {
                Some(card) => taken.push(card),
                None => break,
            }
        }
        taken
    }

    /// Shuffle a zone.
    pub fn shuffle(&mut self, player: PlayerId, zone: Zone, rng: &mut dyn RandomSource) {
        if !self.zones.contains(player) {
            return;
        }
        if let Some(cards) = self.zones[player].get_mut(&zone) {
            let order = rng.shuffle_indices(cards.len());
            let shuffled: Vector<CardInstance> =
                order.iter().filter_map(|&i| cards.get(i).cloned()).collect();
            *cards = shuffled;
        }
    }

    /// Holomems on a player's stage: center, collab, then back row.
    pub fn holomems(&self, player: PlayerId) -> impl Iterator<Item = &CardInstance> {
        [Zone::Center, Zone::Collab, Zone::Back]
            .into_iter()
            .flat_map(move |zone| self.cards(player, zone))
    }

    /// Apply `f` to every card on every stage.
    pub fn for_each_on_stage(&mut self, mut f: impl FnMut(&mut CardInstance)) {
        for (_, zones) in self.zones.iter_mut() {
            for zone in Zone::STAGE {
                if let Some(cards) = zones.get_mut(&zone) {
                    cards.iter_mut().for_each(&mut f);
                }
            }
        }
    }

    /// Total cards tracked, attachments excluded.
    #[must_use]
    pub fn total_cards(&self) -> usize {
        self.zones
            .iter()
            .map(|(_, zones)| zones.values().map(Vector::len).sum::<usize>())
            .sum()
    }

    #[must_use]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.locate(entity).is_some()
    }
}
