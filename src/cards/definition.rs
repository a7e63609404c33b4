//! Card templates and card numbers.
//!
//! A `CardTemplate` holds the printed data of a card: its number, name,
//! category, colors, bloom level and HP. Decks are lists of templates; every
//! copy drawn into play becomes its own `CardInstance`.
//!
//! Card numbers may carry print suffixes (`hSD01-003_RR`, `hBP01-009_2`).
//! Effect lookups go through [`normalize_card_id`], which strips those
//! suffixes down to the canonical number.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::attributes::{BloomLevel, CardCategory, Color};
use super::instance::CardInstance;
use crate::core::{EntityId, PlayerId};

/// Strip rarity and sequence suffixes from a raw card identifier.
///
/// Given `BASE[_RARITY][_SEQ]`, a trailing `_<UPPERCASE>` rarity is removed,
/// then a trailing `_<digits>` sequence. The two steps repeat until neither
/// applies, so `BASE_RARITY_SEQ` also comes back as `BASE` and the result is
/// always a fixed point. A suffix is never stripped when it would leave an
/// empty base.
///
/// ```
/// use holo_ccg::cards::normalize_card_id;
///
/// assert_eq!(normalize_card_id("hSD01-003_RR"), "hSD01-003");
/// assert_eq!(normalize_card_id("hBP01-009_2"), "hBP01-009");
/// assert_eq!(normalize_card_id("hBP01-009_SEC_2"), "hBP01-009");
/// assert_eq!(normalize_card_id("hSD01-003"), "hSD01-003");
/// ```
#[must_use]
pub fn normalize_card_id(raw: &str) -> &str {
    let mut id = raw;
    loop {
        let stripped = strip_suffix_where(strip_suffix_where(id, |b| b.is_ascii_uppercase()), |b| {
            b.is_ascii_digit()
        });
        if stripped.len() == id.len() {
            return id;
        }
        id = stripped;
    }
}

fn strip_suffix_where(id: &str, class: impl Fn(u8) -> bool) -> &str {
    match id.rsplit_once('_') {
        Some((base, suffix))
            if !base.is_empty() && !suffix.is_empty() && suffix.bytes().all(&class) =>
        {
            base
        }
        _ => id,
    }
}

/// Printed card data.
///
/// ## Example
///
/// ```
/// use holo_ccg::cards::{BloomLevel, CardCategory, CardTemplate, Color};
///
/// let sora = CardTemplate::holomem("hSD01-003", "Tokino Sora", BloomLevel::Debut, 60)
///     .with_color(Color::White);
///
/// assert_eq!(sora.category, CardCategory::Character);
/// assert_eq!(sora.base_number(), "hSD01-003");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardTemplate {
    /// Raw card number, possibly with print suffixes.
    pub card_number: String,

    /// Display name.
    pub name: String,

    pub category: CardCategory,

    pub colors: SmallVec<[Color; 2]>,

    /// Bloom level, for characters only.
    pub bloom_level: Option<BloomLevel>,

    /// Printed HP, zero for non-characters.
    pub hp: u32,

    /// Life count printed on an oshi card.
    pub life: Option<usize>,
}

impl CardTemplate {
    /// Create a template with no colors, level or HP.
    pub fn new(card_number: impl Into<String>, name: impl Into<String>, category: CardCategory) -> Self {
        Self {
            card_number: card_number.into(),
            name: name.into(),
            category,
            colors: SmallVec::new(),
            bloom_level: None,
            hp: 0,
            life: None,
        }
    }

    /// Create a holomem (character) template.
    pub fn holomem(
        card_number: impl Into<String>,
        name: impl Into<String>,
        level: BloomLevel,
        hp: u32,
    ) -> Self {
        let mut template = Self::new(card_number, name, CardCategory::Character);
        template.bloom_level = Some(level);
        template.hp = hp;
        template
    }

    /// Create a support template.
    pub fn support(card_number: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(card_number, name, CardCategory::Support)
    }

    /// Create a yell template of a single color.
    pub fn yell(card_number: impl Into<String>, color: Color) -> Self {
        Self::new(card_number, format!("{color:?} Yell"), CardCategory::Yell).with_color(color)
    }

    /// Create an oshi template.
    pub fn oshi(card_number: impl Into<String>, name: impl Into<String>, life: usize) -> Self {
        let mut template = Self::new(card_number, name, CardCategory::Oshi);
        template.life = Some(life);
        template
    }

    /// Add a color (builder pattern).
    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        if !self.colors.contains(&color) {
            self.colors.push(color);
        }
        self
    }

    /// The normalized card number used for effect lookups.
    #[must_use]
    pub fn base_number(&self) -> &str {
        normalize_card_id(&self.card_number)
    }

    /// Create a runtime instance of this card.
    #[must_use]
    pub fn instantiate(&self, entity_id: EntityId, owner: PlayerId) -> CardInstance {
        CardInstance::from_template(self, entity_id, owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_suffixes() {
        assert_eq!(normalize_card_id("hSD01-003_RR"), "hSD01-003");
        assert_eq!(normalize_card_id("hSD01-003_C"), "hSD01-003");
        assert_eq!(normalize_card_id("hSD01-003_12"), "hSD01-003");
        assert_eq!(normalize_card_id("hSD01-003_RR_2"), "hSD01-003");
        assert_eq!(normalize_card_id("hSD01-003_2_RR"), "hSD01-003");
    }

    #[test]
    fn test_normalize_leaves_plain_ids() {
        assert_eq!(normalize_card_id("hSD01-003"), "hSD01-003");
        assert_eq!(normalize_card_id("hY01-001"), "hY01-001");
        // Mixed-case suffix is not a rarity
        assert_eq!(normalize_card_id("hSD01-003_Rr"), "hSD01-003_Rr");
    }

    #[test]
    fn test_normalize_never_empties() {
        assert_eq!(normalize_card_id("_RR"), "_RR");
        assert_eq!(normalize_card_id("_12"), "_12");
        assert_eq!(normalize_card_id(""), "");
    }

    #[test]
    fn test_holomem_template() {
        let card = CardTemplate::holomem("hSD01-006_RR", "Tokino Sora", BloomLevel::First, 150)
            .with_color(Color::White)
            .with_color(Color::White);

        assert_eq!(card.category, CardCategory::Character);
        assert_eq!(card.bloom_level, Some(BloomLevel::First));
        assert_eq!(card.colors.len(), 1);
        assert_eq!(card.base_number(), "hSD01-006");
    }

    #[test]
    fn test_instantiate() {
        let card = CardTemplate::support("hSD01-016", "Harusaki Nodoka");
        let instance = card.instantiate(EntityId(4), PlayerId::new(1));

        assert_eq!(instance.entity_id, EntityId(4));
        assert_eq!(instance.owner, PlayerId::new(1));
        assert_eq!(instance.card_number, "hSD01-016");
        assert_eq!(instance.category, CardCategory::Support);
    }

    #[test]
    fn test_template_serialization() {
        let card = CardTemplate::oshi("hSD01-001", "Tokino Sora", 5);
        let json = serde_json::to_string(&card).unwrap();
        let deserialized: CardTemplate = serde_json::from_str(&json).unwrap();
        assert_eq!(card, deserialized);
    }
}
