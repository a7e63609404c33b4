//! Core engine types: entities, players, state, RNG, configuration, errors.
//!
//! Everything here is independent of individual card effects. Effects reach
//! the match only through the `zones::GameStateView` and
//! `zones::GameStateMutator` traits that `GameState` implements.

pub mod config;
pub mod entity;
pub mod error;
pub mod ledger;
pub mod player;
pub mod rng;
pub mod state;

pub use config::EngineConfig;
pub use entity::EntityId;
pub use error::{EngineError, Result};
pub use ledger::{UsageKey, UsageLedger, UsageLimit};
pub use player::{PlayerId, PlayerMap};
pub use rng::{FixedRolls, GameRng, RandomSource};
pub use state::GameState;
