//! Effect catalog and definition loading.
//!
//! - [`EffectCatalog`]: card id to effect definition, exact-then-base lookup
//! - [`CatalogBuilder`]: collect definitions first, register them in one go
//! - [`DefinitionManifest`] / [`DefinitionLoader`]: load definitions for the
//!   cards a deck actually contains

mod loader;
mod registry;

pub use loader::{DefinitionFactory, DefinitionLoader, DefinitionManifest, StaticLoader};
pub use registry::{CatalogBuilder, EffectCatalog};
