//! # holo-ccg
//!
//! Card-effect trigger and resolution engine for a hololive-style trading
//! card game battle simulator.
//!
//! ## Design Principles
//!
//! 1. **Explicit Events**: The turn controller fires triggers at well-defined
//!    points of its own state machine. Nothing hooks into state mutation.
//!
//! 2. **Effects as Data**: Card effects are declarative definitions built
//!    from a catalogue of composable executors, looked up by normalized card
//!    number.
//!
//! 3. **Failures as Values**: A card effect that cannot run, runs out of
//!    cards, or is declined produces an `EffectResult`. Only caller mistakes
//!    surface as `EngineError`.
//!
//! ## Architecture
//!
//! - **Narrow State Contracts**: Effects read through `GameStateView` and
//!   write through `GameStateMutator`. Interactive decisions suspend on an
//!   injected `PlayerChoiceSource`.
//!
//! - **Persistent Data Structures**: O(1) cloning via `im-rs` lets every
//!   execution snapshot the state and roll back when it fails.
//!
//! - **Injected Randomness**: Shuffles and die rolls go through a
//!   `RandomSource`, seeded per match or scripted in tests.
//!
//! ## Modules
//!
//! - `core`: Entity IDs, players, state, usage ledger, RNG, configuration
//! - `zones`: Per-player zones and the state contracts effects consume
//! - `cards`: Printed card data, runtime instances, sample definitions
//! - `catalog`: Effect definitions by card number, lazy loading
//! - `effects`: Executors, the execution pipeline and player choices
//! - `triggers`: Trigger vocabulary, listeners and the dispatcher
//! - `session`: Match session and turn controller

pub mod cards;
pub mod catalog;
pub mod core;
pub mod effects;
pub mod session;
pub mod triggers;
pub mod zones;

// Re-export commonly used types
pub use crate::core::{
    EngineConfig, EngineError, EntityId, FixedRolls, GameRng, GameState, PlayerId, PlayerMap, RandomSource, Result,
    UsageKey, UsageLedger, UsageLimit,
};

pub use crate::zones::{DamageKind, GameStateMutator, GameStateView, Position, Zone, ZoneManager};

pub use crate::cards::{normalize_card_id, AttachmentKind, BloomLevel, CardCategory, CardInstance, CardTemplate, Color};

pub use crate::catalog::{CatalogBuilder, DefinitionLoader, DefinitionManifest, EffectCatalog, StaticLoader};

pub use crate::effects::{
    EffectDefinition, EffectError, EffectExecutor, EffectManager, EffectResult, EffectSlot, FailureReason,
    PlayerChoiceSource,
};

pub use crate::triggers::{EventContext, ListenerConfig, TriggerDispatcher, TriggerEvent, TriggerType};

pub use crate::session::{MatchHandle, MatchSession, Step};
