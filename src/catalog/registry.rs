//! Effect catalog for definition lookup.
//!
//! The `EffectCatalog` maps card identifiers to effect definitions. Lookups
//! try the identifier exactly as given first, then its normalized base
//! number, so a definition registered under a full print id only answers
//! that id while a base registration covers every print.
//!
//! Registration takes `&self`: the catalog is shared behind an `Arc` and new
//! definitions become visible to the next lookup. Misses are never cached.

use std::sync::{Arc, PoisonError, RwLock};

use rustc_hash::FxHashMap;

use crate::cards::normalize_card_id;
use crate::effects::EffectDefinition;

/// Registry of effect definitions.
///
/// ## Example
///
/// ```
/// use holo_ccg::catalog::EffectCatalog;
/// use holo_ccg::effects::EffectDefinition;
///
/// let catalog = EffectCatalog::new();
/// catalog.register("hSD01-003", EffectDefinition::new("hSD01-003", "Tokino Sora"));
///
/// assert!(catalog.has("hSD01-003_RR"));
/// assert_eq!(catalog.get("hSD01-003_2").map(|d| d.name.clone()), Some("Tokino Sora".to_string()));
/// assert!(catalog.get("hSD01-004").is_none());
/// ```
#[derive(Debug, Default)]
pub struct EffectCatalog {
    definitions: RwLock<FxHashMap<String, Arc<EffectDefinition>>>,
}

impl EffectCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the definition for `card_id`.
    pub fn register(&self, card_id: impl Into<String>, definition: EffectDefinition) {
        let card_id = card_id.into();
        tracing::debug!(card_id = %card_id, slots = definition.slots().len(), "Registered effect definition");
        self.definitions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(card_id, Arc::new(definition));
    }

    /// Look up a definition: exact id first, then the normalized base.
    #[must_use]
    pub fn get(&self, card_id: &str) -> Option<Arc<EffectDefinition>> {
        let definitions = self.definitions.read().unwrap_or_else(PoisonError::into_inner);
        definitions
            .get(card_id)
            .or_else(|| definitions.get(normalize_card_id(card_id)))
            .cloned()
    }

    #[must_use]
    pub fn has(&self, card_id: &str) -> bool {
        self.get(card_id).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered ids, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .definitions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        ids.sort_unstable();
        ids
    }
}

/// Two-phase catalog construction.
///
/// Definition sources queue `(id, definition)` pairs in any order; nothing is
/// visible until [`CatalogBuilder::build`] or [`CatalogBuilder::drain_into`]
/// registers the whole queue at once.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    pending: Vec<(String, EffectDefinition)>,
}

impl CatalogBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one definition.
    pub fn queue(&mut self, card_id: impl Into<String>, definition: EffectDefinition) -> &mut Self {
        self.pending.push((card_id.into(), definition));
        self
    }

    /// Queue many definitions.
    pub fn extend(&mut self, definitions: impl IntoIterator<Item = (String, EffectDefinition)>) -> &mut Self {
        self.pending.extend(definitions);
        self
    }

    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Register everything queued into an existing catalog. Later entries for
    /// the same id replace earlier ones.
    pub fn drain_into(&mut self, catalog: &EffectCatalog) -> usize {
        let count = self.pending.len();
        for (card_id, definition) in self.pending.drain(..) {
            catalog.register(card_id, definition);
        }
        count
    }

    /// Register everything queued into a fresh catalog.
    #[must_use]
    pub fn build(mut self) -> EffectCatalog {
        let catalog = EffectCatalog::new();
        let count = self.drain_into(&catalog);
        tracing::info!(count, "Built effect catalog");
        catalog
    }
}
