//! Trigger type vocabulary.
//!
//! The set is closed: card definitions and the turn controller can only
//! name these eighteen triggers. Wire names are the snake_case tags used by
//! deck data (`on_collab`, `manual_trigger`, ...).

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A named category of game event that effects subscribe to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    OnPlay,
    OnSupportPlay,
    OnStageEnter,
    OnCollab,
    OnBloom,
    OnBatonTouch,
    OnTurnStart,
    OnTurnEnd,
    OnMainStep,
    OnPerformanceStep,
    OnResetStep,
    Activate,
    /// Player-initiated activation of a single card.
    ManualTrigger,
    OnDamageReceive,
    OnHolomemLeave,
    OnYellAttach,
    ConditionMet,
    WhilePresent,
}

impl TriggerType {
    pub const ALL: [TriggerType; 18] = [
        TriggerType::OnPlay,
        TriggerType::OnSupportPlay,
        TriggerType::OnStageEnter,
        TriggerType::OnCollab,
        TriggerType::OnBloom,
        TriggerType::OnBatonTouch,
        TriggerType::OnTurnStart,
        TriggerType::OnTurnEnd,
        TriggerType::OnMainStep,
        TriggerType::OnPerformanceStep,
        TriggerType::OnResetStep,
        TriggerType::Activate,
        TriggerType::ManualTrigger,
        TriggerType::OnDamageReceive,
        TriggerType::OnHolomemLeave,
        TriggerType::OnYellAttach,
        TriggerType::ConditionMet,
        TriggerType::WhilePresent,
    ];

    /// The wire tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            TriggerType::OnPlay => "on_play",
            TriggerType::OnSupportPlay => "on_support_play",
            TriggerType::OnStageEnter => "on_stage_enter",
            TriggerType::OnCollab => "on_collab",
            TriggerType::OnBloom => "on_bloom",
            TriggerType::OnBatonTouch => "on_baton_touch",
            TriggerType::OnTurnStart => "on_turn_start",
            TriggerType::OnTurnEnd => "on_turn_end",
            TriggerType::OnMainStep => "on_main_step",
            TriggerType::OnPerformanceStep => "on_performance_step",
            TriggerType::OnResetStep => "on_reset_step",
            TriggerType::Activate => "activate",
            TriggerType::ManualTrigger => "manual_trigger",
            TriggerType::OnDamageReceive => "on_damage_receive",
            TriggerType::OnHolomemLeave => "on_holomem_leave",
            TriggerType::OnYellAttach => "on_yell_attach",
            TriggerType::ConditionMet => "condition_met",
            TriggerType::WhilePresent => "while_present",
        }
    }

    /// Triggers a player starts on purpose rather than the game firing them.
    #[must_use]
    pub const fn is_player_initiated(self) -> bool {
        matches!(self, TriggerType::Activate | TriggerType::ManualTrigger)
    }

    /// Turn and step boundaries, fired for the active player as a whole
    /// rather than for a particular card.
    #[must_use]
    pub const fn is_turn_structure(self) -> bool {
        matches!(
            self,
            TriggerType::OnTurnStart
                | TriggerType::OnTurnEnd
                | TriggerType::OnMainStep
                | TriggerType::OnPerformanceStep
                | TriggerType::OnResetStep
        )
    }
}

impl std::fmt::Display for TriggerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tag outside the trigger vocabulary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown trigger type: {0}")]
pub struct UnknownTrigger(pub String);

impl FromStr for TriggerType {
    type Err = UnknownTrigger;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        TriggerType::ALL
            .into_iter()
            .find(|trigger| trigger.as_str() == tag)
            .ok_or_else(|| UnknownTrigger(tag.to_string()))
    }
}
