//! Sample card definitions.
//!
//! A handful of cards from the first start deck, written as data against the
//! built-in executors. They cover every execution pattern the engine
//! supports and back the integration tests.
//!
//! | Number | Card | Effect |
//! |---|---|---|
//! | hSD01-001 | Tokino Sora (oshi) | oshi skill: 20 special damage to the opposing center; SP skill: draw 2 |
//! | hSD01-003 | Tokino Sora (Debut) | collab: draw 1 |
//! | hSD01-006 | Tokino Sora (1st) | bloom: die roll, 3/5/6 search a Debut holomem, 2/4 draw 1 |
//! | hSD01-009 | AZKi (Debut) | collab (optional): attach the top yell to this holomem |
//! | hSD01-016 | Harusaki Nodoka | support: draw 2 |
//! | hSD01-017 | Mane-chan | support: look at 4, take a holomem and a support |

use super::attributes::{BloomLevel, Color};
use super::definition::{normalize_card_id, CardTemplate};
use crate::catalog::{DefinitionManifest, StaticLoader};
use crate::core::UsageLimit;
use crate::effects::{
    AttachFromTop, CardFilter, DealDamage, DieRoll, DrawCards, EffectCost, EffectDefinition, EffectSlot,
    LookTopAndTake, SearchDeck, Side, SlotKind, TargetSpec, Timing,
};
use crate::triggers::TriggerType;

/// Module key of the start deck definitions.
pub const STARTER_MODULE: &str = "hSD01";

/// Card numbers with effects in the start deck module.
pub const STARTER_CARDS: [&str; 6] = [
    "hSD01-001", "hSD01-003", "hSD01-006", "hSD01-009", "hSD01-016", "hSD01-017",
];

/// Build the definition for a start deck card number.
#[must_use]
pub fn starter(number: &str) -> Option<EffectDefinition> {
    let definition = match number {
        "hSD01-001" => EffectDefinition::new(number, "Tokino Sora")
            .with_slot(
                EffectSlot::new(
                    SlotKind::OshiSkill,
                    TriggerType::ManualTrigger,
                    DealDamage::special(TargetSpec::Center(Side::Opponent), 20),
                )
                .named("Replacement")
                .with_timing(Timing::Activated)
                .with_limit(UsageLimit::PerTurn(1))
                .with_cost(EffectCost::holopower(1)),
            )
            .with_slot(
                EffectSlot::new(SlotKind::SpOshiSkill, TriggerType::Activate, DrawCards::new(2))
                    .named("So You're the Enemy?")
                    .with_timing(Timing::Activated)
                    .with_limit(UsageLimit::PerGame(1))
                    .with_cost(EffectCost::holopower(2)),
            ),
        "hSD01-003" => EffectDefinition::new(number, "Tokino Sora").with_slot(
            EffectSlot::new(SlotKind::Collab, TriggerType::OnCollab, DrawCards::new(1)).named("Let's Sing!"),
        ),
        "hSD01-006" => EffectDefinition::new(number, "Tokino Sora").with_slot(
            EffectSlot::new(
                SlotKind::Bloom,
                TriggerType::OnBloom,
                DieRoll::new()
                    .on(
                        &[3, 5, 6],
                        SearchDeck::new(CardFilter::holomem_at(BloomLevel::Debut), 1),
                    )
                    .on(&[2, 4], DrawCards::new(1)),
            )
            .named("Dream Stage"),
        ),
        "hSD01-009" => EffectDefinition::new(number, "AZKi").with_slot(
            EffectSlot::new(
                SlotKind::Collab,
                TriggerType::OnCollab,
                AttachFromTop::yells(1, TargetSpec::ThisCard),
            )
            .named("Map of the Future")
            .with_timing(Timing::Optional)
            .with_limit(UsageLimit::PerTurn(1)),
        ),
        "hSD01-016" => EffectDefinition::new(number, "Harusaki Nodoka").with_slot(
            EffectSlot::new(SlotKind::Support, TriggerType::OnSupportPlay, DrawCards::new(2)).named("Staff"),
        ),
        "hSD01-017" => EffectDefinition::new(number, "Mane-chan").with_slot(
            EffectSlot::new(
                SlotKind::Support,
                TriggerType::OnSupportPlay,
                LookTopAndTake::new(4)
                    .take(CardFilter::character(), 1)
                    .take(CardFilter::support(), 1),
            )
            .named("Manager"),
        ),
        _ => return None,
    };
    Some(definition)
}

/// Manifest pointing every start deck card at the start deck module.
#[must_use]
pub fn standard_manifest() -> DefinitionManifest {
    STARTER_CARDS
        .into_iter()
        .fold(DefinitionManifest::new(), |manifest, number| {
            manifest.with_entry(number, STARTER_MODULE)
        })
}

/// Loader for the start deck.
#[must_use]
pub fn standard_loader() -> StaticLoader {
    StaticLoader::new(standard_manifest()).with_module(STARTER_MODULE, starter)
}

/// Every start deck definition, ready for a `CatalogBuilder`.
#[must_use]
pub fn standard_definitions() -> Vec<(String, EffectDefinition)> {
    STARTER_CARDS
        .into_iter()
        .filter_map(|number| starter(number).map(|definition| (number.to_string(), definition)))
        .collect()
}

/// The start deck oshi.
#[must_use]
pub fn oshi() -> CardTemplate {
    CardTemplate::oshi("hSD01-001", "Tokino Sora", 5).with_color(Color::White)
}

/// Printed data for a start deck card number, suffixes allowed.
#[must_use]
pub fn template(number: &str) -> Option<CardTemplate> {
    let template = match normalize_card_id(number) {
        "hSD01-001" => oshi(),
        "hSD01-003" => CardTemplate::holomem(number, "Tokino Sora", BloomLevel::Debut, 60).with_color(Color::White),
        "hSD01-004" => CardTemplate::holomem(number, "Tokino Sora", BloomLevel::Debut, 60).with_color(Color::White),
        "hSD01-006" => CardTemplate::holomem(number, "Tokino Sora", BloomLevel::First, 150).with_color(Color::White),
        "hSD01-009" => CardTemplate::holomem(number, "AZKi", BloomLevel::Debut, 50).with_color(Color::Green),
        "hSD01-016" => CardTemplate::support(number, "Harusaki Nodoka"),
        "hSD01-017" => CardTemplate::support(number, "Mane-chan"),
        "hY01-001" => CardTemplate::yell(number, Color::White),
        _ => return None,
    };
    Some(template)
}

/// A small main deck, top card first.
#[must_use]
pub fn starter_deck() -> Vec<CardTemplate> {
    [
        "hSD01-003", "hSD01-006", "hSD01-016", "hSD01-004", "hSD01-017", "hSD01-009", "hSD01-003_RR",
        "hSD01-006_2", "hSD01-016", "hSD01-004",
    ]
    .into_iter()
    .filter_map(template)
    .collect()
}

/// A yell deck of `count` white yells.
#[must_use]
pub fn yell_deck(count: usize) -> Vec<CardTemplate> {
    (0..count).filter_map(|_| template("hY01-001")).collect()
}
