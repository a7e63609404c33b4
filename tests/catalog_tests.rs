//! Catalog integration tests.
//!
//! These tests verify card id normalization, exact-then-base lookup and lazy
//! definition loading into a match.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use holo_ccg::cards::library;
use holo_ccg::cards::normalize_card_id;
use holo_ccg::catalog::{CatalogBuilder, DefinitionLoader, DefinitionManifest, EffectCatalog, StaticLoader};
use holo_ccg::core::{EngineConfig, EngineError, PlayerId, Result};
use holo_ccg::effects::{AutoChoice, DrawCards, EffectDefinition, EffectSlot, SlotKind};
use holo_ccg::session::MatchSession;
use holo_ccg::triggers::TriggerType;
use holo_ccg::zones::{GameStateView, Zone};
use proptest::prelude::*;

fn named(number: &str, name: &str) -> EffectDefinition {
    EffectDefinition::new(number, name)
}

// =============================================================================
// Lookup
// =============================================================================

/// A full-id registration only answers that exact id.
#[test]
fn test_full_id_registration_is_exact() {
    let catalog = EffectCatalog::new();
    catalog.register("hSD01-003_RR", named("hSD01-003_RR", "Sora RR"));

    assert!(catalog.get("hSD01-003_RR").is_some());
    assert!(catalog.get("hSD01-003_C").is_none());
    assert!(catalog.get("hSD01-003").is_none());

    catalog.register("hSD01-003", named("hSD01-003", "Sora"));
    assert_eq!(catalog.get("hSD01-003_C").map(|d| d.name.clone()), Some("Sora".to_string()));
    assert_eq!(catalog.get("hSD01-003_RR").map(|d| d.name.clone()), Some("Sora RR".to_string()));
}

/// A miss is not remembered: registering afterwards makes the id visible.
#[test]
fn test_no_negative_caching() {
    let catalog = EffectCatalog::new();
    assert!(catalog.get("hBP01-009_2").is_none());

    catalog.register("hBP01-009", named("hBP01-009", "AZKi"));
    assert!(catalog.get("hBP01-009_2").is_some());
    assert!(catalog.has("hBP01-009_SEC_2"));
}

/// Registering the same id twice replaces the definition.
#[test]
fn test_register_replaces() {
    let catalog = EffectCatalog::new();
    catalog.register("hSD01-016", named("hSD01-016", "old"));
    catalog.register("hSD01-016", named("hSD01-016", "new"));

    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog.get("hSD01-016").map(|d| d.name.clone()), Some("new".to_string()));
}

/// Queued definitions become visible only when drained.
#[test]
fn test_builder_two_phase() {
    let catalog = EffectCatalog::new();
    let mut builder = CatalogBuilder::new();
    builder
        .queue("hSD01-003", named("hSD01-003", "Sora"))
        .queue("hSD01-009", named("hSD01-009", "AZKi"));

    assert_eq!(builder.pending_len(), 2);
    assert!(catalog.is_empty());

    assert_eq!(builder.drain_into(&catalog), 2);
    assert_eq!(builder.pending_len(), 0);
    assert_eq!(catalog.ids(), vec!["hSD01-003".to_string(), "hSD01-009".to_string()]);
}

/// The catalog is shared across tasks and stays readable.
#[tokio::test]
async fn test_shared_across_tasks() {
    let catalog = Arc::new(EffectCatalog::new());

    let mut tasks = Vec::new();
    for i in 0..8 {
        let catalog = Arc::clone(&catalog);
        tasks.push(tokio::spawn(async move {
            let number = format!("hBP01-{:03}", i);
            catalog.register(number.clone(), named(&number, "card"));
            catalog.has(&format!("{number}_RR"))
        }));
    }
    for task in tasks {
        assert!(task.await.unwrap());
    }
    assert_eq!(catalog.len(), 8);
}

// =============================================================================
// Normalization
// =============================================================================

proptest! {
    /// Normalizing twice is the same as normalizing once.
    #[test]
    fn prop_normalize_idempotent(raw in "[a-zA-Z0-9_-]{0,24}") {
        let once = normalize_card_id(&raw);
        prop_assert_eq!(normalize_card_id(once), once);
    }

    /// Print suffixes always come off and the base number survives.
    #[test]
    fn prop_suffixes_stripped(
        set in "h[A-Z]{2}[0-9]{2}",
        number in 1u32..200,
        rarity in proptest::option::of("[A-Z]{1,3}"),
        seq in proptest::option::of(0u32..10),
    ) {
        let base = format!("{set}-{number:03}");
        let mut raw = base.clone();
        if let Some(rarity) = rarity {
            raw.push('_');
            raw.push_str(&rarity);
        }
        if let Some(seq) = seq {
            raw.push_str(&format!("_{seq}"));
        }
        prop_assert_eq!(normalize_card_id(&raw), base.as_str());
    }
}

// =============================================================================
// Lazy loading
// =============================================================================

/// Counts loads so repeated card numbers can be checked.
#[derive(Default)]
struct CountingLoader {
    inner: Option<StaticLoader>,
    loads: AtomicUsize,
}

#[async_trait]
impl DefinitionLoader for CountingLoader {
    async fn load_definition(&self, card_id: &str) -> Result<Option<EffectDefinition>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        match &self.inner {
            Some(loader) => loader.load_definition(card_id).await,
            None => Ok(None),
        }
    }
}

/// Preparing a deck loads each distinct card number once.
#[tokio::test]
async fn test_prepare_deck_loads_once_per_number() {
    let loader = CountingLoader {
        inner: Some(library::standard_loader()),
        ..CountingLoader::default()
    };
    let mut session = MatchSession::new(&EngineConfig::default(), Arc::new(EffectCatalog::new()), Arc::new(AutoChoice));
    let deck = library::starter_deck();

    let ids = session
        .prepare_deck(&loader, PlayerId::new(0), &deck, Zone::Deck)
        .await
        .unwrap();

    assert_eq!(ids.len(), deck.len());
    assert_eq!(session.state().zone_size(PlayerId::new(0), Zone::Deck), deck.len());
    // 003, 006, 016, 004, 017, 009: 004 has no entry and is asked for once
    assert_eq!(loader.loads.load(Ordering::SeqCst), 6);
    assert_eq!(session.catalog().len(), 5);
    assert!(session.catalog().has("hSD01-006_2"));
    assert!(!session.catalog().has("hSD01-004"));

    // Only the number without a definition is asked for again
    session
        .prepare_deck(&loader, PlayerId::new(1), &deck, Zone::Deck)
        .await
        .unwrap();
    assert_eq!(loader.loads.load(Ordering::SeqCst), 7);
}

/// A manifest entry pointing at a module the loader lacks is fatal.
#[tokio::test]
async fn test_missing_module_is_fatal() {
    let manifest = DefinitionManifest::new().with_entry("hSD01-003", "booster");
    let loader = StaticLoader::new(manifest);
    let mut session = MatchSession::new(&EngineConfig::default(), Arc::new(EffectCatalog::new()), Arc::new(AutoChoice));

    let err = session
        .prepare_deck(&loader, PlayerId::new(0), &library::starter_deck(), Zone::Deck)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ModuleMissing { ref module, .. } if module == "booster"));
    assert_eq!(session.state().zone_size(PlayerId::new(0), Zone::Deck), 0);
}

/// Definitions registered after the session was built still bind cards.
#[tokio::test]
async fn test_late_registration_binds() {
    let catalog = Arc::new(EffectCatalog::new());
    let mut session = MatchSession::new(&EngineConfig::default(), Arc::clone(&catalog), Arc::new(AutoChoice));

    catalog.register(
        "hSD01-004",
        EffectDefinition::new("hSD01-004", "Tokino Sora")
            .with_slot(EffectSlot::new(SlotKind::Collab, TriggerType::OnCollab, DrawCards::new(1))),
    );
    let template = library::template("hSD01-004").unwrap();
    let ids = session.state_mut().add_cards(&[template], PlayerId::new(0), Zone::Back);
    assert!(session.bind_card(ids[0]).is_some());
}
