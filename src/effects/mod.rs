//! Effect system for card abilities.
//!
//! - `EffectDefinition` / `EffectSlot`: the effect template of a card number
//! - `EffectExecutor`: the `can_activate` / `execute` contract
//! - `EffectManager`: runs executors with limit, cost and rollback handling
//! - `PlayerChoiceSource`: where interactive decisions come from
//! - `ops` and the built-in executors: draw, search, deck looks, damage,
//!   attachments, modifiers, die rolls
//!
//! ## Design Philosophy
//!
//! Effects never see the full game state. They read through
//! `GameStateView`, write through `GameStateMutator`, and suspend on a
//! `PlayerChoiceSource` for decisions. Everything they produce comes back as
//! an `EffectResult`, including failures.

mod builtin;
mod choice;
mod definition;
mod executor;
mod manager;
pub mod ops;
mod result;
mod targeting;

pub use builtin::{
    AttachFromTop, DealDamage, DieRoll, DrawCards, FnEffect, GrantModifier, LookTopAndTake, SearchDeck, Sequence,
};
pub use choice::{AutoChoice, DeclineAll, PlayerChoiceSource, ScriptedAnswer, ScriptedChoices};
pub use definition::{EffectCost, EffectDefinition, EffectSlot, SlotKind, Timing};
pub use executor::{EffectExecutor, EffectIo};
pub use manager::EffectManager;
pub use ops::{LookOutcome, Pick, ReturnOrder, Selection};
pub use result::{EffectError, EffectPayload, EffectResult, FailureReason};
pub use targeting::{CardFilter, Side, TargetSelector, TargetSpec};
