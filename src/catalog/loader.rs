//! Lazy definition loading.
//!
//! A match only needs definitions for the cards in its decks. The
//! `DefinitionManifest` maps card numbers to a module key, and a
//! `DefinitionLoader` resolves a card id to its definition on demand during
//! deck preparation.

use std::collections::BTreeMap;

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::cards::normalize_card_id;
use crate::core::{EngineError, Result};
use crate::effects::EffectDefinition;

/// Card id to module key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionManifest {
    entries: BTreeMap<String, String>,
}

impl DefinitionManifest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a card id to a module key (builder pattern).
    #[must_use]
    pub fn with_entry(mut self, card_id: impl Into<String>, module: impl Into<String>) -> Self {
        self.insert(card_id, module);
        self
    }

    pub fn insert(&mut self, card_id: impl Into<String>, module: impl Into<String>) {
        self.entries.insert(card_id.into(), module.into());
    }

    /// Module key for a card id: exact id first, then the normalized base.
    #[must_use]
    pub fn module_for(&self, card_id: &str) -> Option<&str> {
        self.entries
            .get(card_id)
            .or_else(|| self.entries.get(normalize_card_id(card_id)))
            .map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolves definitions on demand.
#[async_trait]
pub trait DefinitionLoader: Send + Sync {
    /// Load the definition for `card_id`.
    ///
    /// `Ok(None)` means the card has no effects. Errors mean the manifest and
    /// the available modules disagree.
    async fn load_definition(&self, card_id: &str) -> Result<Option<EffectDefinition>>;
}

/// A module: builds the definition for one card number.
pub type DefinitionFactory = fn(&str) -> Option<EffectDefinition>;

/// Loader backed by in-process factory functions.
#[derive(Clone, Debug, Default)]
pub struct StaticLoader {
    manifest: DefinitionManifest,
    modules: FxHashMap<String, DefinitionFactory>,
}

impl StaticLoader {
    pub fn new(manifest: DefinitionManifest) -> Self {
        Self {
            manifest,
            modules: FxHashMap::default(),
        }
    }

    /// Provide a module (builder pattern).
    #[must_use]
    pub fn with_module(mut self, key: impl Into<String>, factory: DefinitionFactory) -> Self {
        self.modules.insert(key.into(), factory);
        self
    }

    #[must_use]
    pub fn manifest(&self) -> &DefinitionManifest {
        &self.manifest
    }
}

#[async_trait]
impl DefinitionLoader for StaticLoader {
    async fn load_definition(&self, card_id: &str) -> Result<Option<EffectDefinition>> {
        let Some(module) = self.manifest.module_for(card_id) else {
            return Ok(None);
        };
        let factory = self.modules.get(module).ok_or_else(|| EngineError::ModuleMissing {
            card: card_id.to_string(),
            module: module.to_string(),
        })?;

        factory(normalize_card_id(card_id))
            .map(Some)
            .ok_or_else(|| EngineError::LoadFailed {
                card: card_id.to_string(),
                reason: format!("module {module} has no definition for it"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sora(number: &str) -> Option<EffectDefinition> {
        (number == "hSD01-003").then(|| EffectDefinition::new(number, "Tokino Sora"))
    }

    fn loader() -> StaticLoader {
        let manifest = DefinitionManifest::new()
            .with_entry("hSD01-003", "starter")
            .with_entry("hSD01-004", "starter")
            .with_entry("hSD01-005", "booster");
        StaticLoader::new(manifest).with_module("starter", sora)
    }

    #[test]
    fn test_manifest_lookup() {
        let manifest = loader().manifest().clone();
        assert_eq!(manifest.module_for("hSD01-003_RR"), Some("starter"));
        assert_eq!(manifest.module_for("hSD01-099"), None);
        assert_eq!(manifest.len(), 3);
    }

    #[test]
    fn test_manifest_serde() {
        let manifest = loader().manifest().clone();
        let json = serde_json::to_string(&manifest).unwrap();
        let deserialized: DefinitionManifest = serde_json::from_str(&json).unwrap();
        assert_eq!(manifest, deserialized);
    }

    #[tokio::test]
    async fn test_load_outcomes() {
        let loader = loader();

        let found = loader.load_definition("hSD01-003_RR").await.unwrap();
        assert_eq!(found.map(|d| d.card_number), Some("hSD01-003".to_string()));

        assert!(loader.load_definition("hSD01-099").await.unwrap().is_none());

        assert!(matches!(
            loader.load_definition("hSD01-005").await,
            Err(EngineError::ModuleMissing { .. })
        ));
        assert!(matches!(
            loader.load_definition("hSD01-004").await,
            Err(EngineError::LoadFailed { .. })
        ));
    }
}
