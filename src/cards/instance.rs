//! Card instances - runtime card state.
//!
//! `CardInstance` represents one physical copy of a card during a match. It
//! carries the printed data it was created from plus everything that changes
//! while it is on the stage: damage, rest state, attached sub-cards and
//! temporary modifiers.
//!
//! ## Attachments
//!
//! Yells, fans, mascots and tools hang off a holomem as [`Attachment`]s. When
//! a holomem blooms, the lower-level card is kept underneath as a
//! `BloomStack` attachment, so the whole pile moves as one unit.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::attributes::{AttachmentKind, BloomLevel, CardCategory, Color};
use super::definition::{normalize_card_id, CardTemplate};
use crate::core::{EntityId, PlayerId};

/// When a modifier stops applying.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expiry {
    /// Removed when the current turn ends.
    EndOfTurn,
    /// Removed when the next turn of the opponent ends.
    EndOfOpponentTurn,
    /// Never removed while the card stays on the stage.
    Permanent,
}

/// A temporary numeric adjustment on a card (art damage, HP, etc.)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifier {
    /// What is modified, e.g. `"art_damage"`.
    pub key: String,
    pub amount: i32,
    pub expiry: Expiry,
    /// Player whose turn started the modifier.
    pub granted_on: PlayerId,
}

/// A sub-card hanging off a holomem.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub kind: AttachmentKind,
    pub card: CardInstance,
}

/// A card instance in a match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInstance {
    /// Unique entity ID for this instance.
    pub entity_id: EntityId,

    /// Raw card number as printed in the deck list.
    pub card_number: String,

    pub name: String,

    pub category: CardCategory,

    pub colors: SmallVec<[Color; 2]>,

    pub bloom_level: Option<BloomLevel>,

    /// Printed HP.
    pub hp: u32,

    /// Printed life, oshi cards only.
    #[serde(default)]
    pub life: Option<usize>,

    /// Damage taken since the card entered the stage.
    #[serde(default)]
    pub damage: u32,

    /// Owner (who started with this card).
    pub owner: PlayerId,

    /// Rested holomems cannot use arts.
    #[serde(default)]
    pub resting: bool,

    #[serde(default)]
    pub attachments: Vec<Attachment>,

    #[serde(default)]
    pub modifiers: Vec<Modifier>,
}

impl CardInstance {
    /// Create an instance from printed card data.
    #[must_use]
    pub fn from_template(template: &CardTemplate, entity_id: EntityId, owner: PlayerId) -> Self {
        Self {
            entity_id,
            card_number: template.card_number.clone(),
            name: template.name.clone(),
            category: template.category,
            colors: template.colors.clone(),
            bloom_level: template.bloom_level,
            hp: template.hp,
            life: template.life,
            damage: 0,
            owner,
            resting: false,
            attachments: Vec::new(),
            modifiers: Vec::new(),
        }
    }

    /// Card number with print suffixes stripped.
    #[must_use]
    pub fn base_number(&self) -> &str {
        normalize_card_id(&self.card_number)
    }

    #[must_use]
    pub fn is_character(&self) -> bool {
        self.category == CardCategory::Character
    }

    #[must_use]
    pub fn has_color(&self, color: Color) -> bool {
        self.colors.contains(&color)
    }

    /// HP after damage and HP modifiers.
    #[must_use]
    pub fn max_hp(&self) -> u32 {
        let bonus = self.modifier_total("hp");
        u32::try_from((i64::from(self.hp) + i64::from(bonus)).max(0)).unwrap_or(u32::MAX)
    }

    /// HP left before the card is knocked out.
    #[must_use]
    pub fn remaining_hp(&self) -> u32 {
        self.max_hp().saturating_sub(self.damage)
    }

    /// A holomem with HP printed is knocked out once damage reaches it.
    #[must_use]
    pub fn is_knocked_out(&self) -> bool {
        self.is_character() && self.max_hp() > 0 && self.damage >= self.max_hp()
    }

    /// Attachments of one kind, in attach order.
    pub fn attached(&self, kind: AttachmentKind) -> impl Iterator<Item = &CardInstance> {
        self.attachments
            .iter()
            .filter(move |a| a.kind == kind)
            .map(|a| &a.card)
    }

    /// Number of yells attached.
    #[must_use]
    pub fn yell_count(&self) -> usize {
        self.attached(AttachmentKind::Yell).count()
    }

    /// Attach a sub-card.
    pub fn attach(&mut self, kind: AttachmentKind, card: CardInstance) {
        self.attachments.push(Attachment { kind, card });
    }

    /// Detach a sub-card by entity.
    pub fn detach(&mut self, entity: EntityId) -> Option<Attachment> {
        let pos = self
            .attachments
            .iter()
            .position(|a| a.card.entity_id == entity)?;
        Some(self.attachments.remove(pos))
    }

    /// Remove and return every attachment, bloom stack included.
    pub fn take_attachments(&mut self) -> Vec<Attachment> {
        std::mem::take(&mut self.attachments)
    }

    /// Sum of active modifiers for `key`.
    #[must_use]
    pub fn modifier_total(&self, key: &str) -> i32 {
        self.modifiers
            .iter()
            .filter(|m| m.key == key)
            .map(|m| m.amount)
            .sum()
    }

    /// Drop modifiers that expire when `ending` finishes their turn.
    pub fn expire_modifiers(&mut self, ending: PlayerId) {
        self.modifiers.retain(|m| match m.expiry {
            Expiry::EndOfTurn => false,
            Expiry::EndOfOpponentTurn => m.granted_on == ending,
            Expiry::Permanent => true,
        });
    }

    /// Reset stage-only state. Called when the card leaves the stage.
    pub fn clear_stage_state(&mut self) {
        self.damage = 0;
        self.resting = false;
        self.modifiers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holomem(id: u32) -> CardInstance {
        CardTemplate::holomem("hSD01-003", "Tokino Sora", BloomLevel::Debut, 60)
            .with_color(Color::White)
            .instantiate(EntityId(id), PlayerId::new(0))
    }

    fn yell(id: u32) -> CardInstance {
        CardTemplate::yell("hY01-001", Color::White).instantiate(EntityId(id), PlayerId::new(0))
    }

    #[test]
    fn test_damage_and_knockout() {
        let mut card = holomem(1);
        assert_eq!(card.remaining_hp(), 60);
        assert!(!card.is_knocked_out());

        card.damage = 60;
        assert_eq!(card.remaining_hp(), 0);
        assert!(card.is_knocked_out());
    }

    #[test]
    fn test_hp_modifier() {
        let mut card = holomem(1);
        card.modifiers.push(Modifier {
            key: "hp".to_string(),
            amount: 20,
            expiry: Expiry::Permanent,
            granted_on: PlayerId::new(0),
        });
        card.damage = 60;
        assert!(!card.is_knocked_out());
        assert_eq!(card.remaining_hp(), 20);
    }

    #[test]
    fn test_attachments() {
        let mut card = holomem(1);
        card.attach(AttachmentKind::Yell, yell(2));
        card.attach(AttachmentKind::Yell, yell(3));
        assert_eq!(card.yell_count(), 2);

        let detached = card.detach(EntityId(2)).unwrap();
        assert_eq!(detached.card.entity_id, EntityId(2));
        assert_eq!(card.yell_count(), 1);
        assert!(card.detach(EntityId(2)).is_none());

        let rest = card.take_attachments();
        assert_eq!(rest.len(), 1);
        assert!(card.attachments.is_empty());
    }

    #[test]
    fn test_modifier_expiry() {
        let p0 = PlayerId::new(0);
        let p1 = PlayerId::new(1);
        let mut card = holomem(1);
        for (expiry, granted_on) in [
            (Expiry::EndOfTurn, p0),
            (Expiry::EndOfOpponentTurn, p0),
            (Expiry::Permanent, p0),
        ] {
            card.modifiers.push(Modifier {
                key: "art_damage".to_string(),
                amount: 10,
                expiry,
                granted_on,
            });
        }

        // Granting player's own turn ends: only the end-of-turn one goes
        card.expire_modifiers(p0);
        assert_eq!(card.modifier_total("art_damage"), 20);

        // Opponent's turn ends
        card.expire_modifiers(p1);
        assert_eq!(card.modifier_total("art_damage"), 10);
    }

    #[test]
    fn test_base_number() {
        let card = CardTemplate::support("hBP01-104_U", "Mannen Sacchan")
            .instantiate(EntityId(9), PlayerId::new(1));
        assert_eq!(card.base_number(), "hBP01-104");
        assert!(!card.is_character());
        assert!(!card.is_knocked_out());
    }
}
