//! Errors surfaced to the caller of the engine.
//!
//! Per-card effect failures never show up here: they are captured as
//! `EffectResult` values with a `FailureReason`. `EngineError` is reserved for
//! conditions the caller has to deal with, such as firing an event for a
//! player that is not seated or asking the session for a move the board does
//! not allow.

use thiserror::Error;

use super::{EntityId, PlayerId};
use crate::effects::EffectError;
use crate::zones::Zone;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("{player} is not seated in this match")]
    UnknownPlayer { player: PlayerId },

    #[error("{card} is not in {player}'s {expected}")]
    CardNotInZone {
        card: EntityId,
        player: PlayerId,
        expected: Zone,
    },

    #[error("{player}'s {zone} is occupied")]
    ZoneOccupied { player: PlayerId, zone: Zone },

    #[error("{player}'s {zone} is empty")]
    ZoneEmpty { player: PlayerId, zone: Zone },

    #[error("illegal bloom: {reason}")]
    IllegalBloom { reason: String },

    #[error("illegal play: {reason}")]
    IllegalPlay { reason: String },

    /// A board move the session asked for was refused by the state.
    #[error(transparent)]
    Rejected(#[from] EffectError),

    #[error("manifest entry for {card} points at unknown module {module}")]
    ModuleMissing { card: String, module: String },

    #[error("definition load for {card} failed: {reason}")]
    LoadFailed { card: String, reason: String },
}
