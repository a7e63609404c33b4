//! Effect outcomes.
//!
//! Every execution attempt produces an `EffectResult`, including attempts
//! that never reached the executor. Failures carry a `FailureReason` whose
//! string form is stable, so a front end can branch on it.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{EntityId, PlayerId};
use crate::triggers::TriggerType;

/// Why an execution did not succeed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureReason {
    /// No definition for the card, or no slot for the trigger.
    #[serde(rename = "not implemented")]
    NotImplemented,
    /// The eligibility predicate or the cost check said no.
    #[serde(rename = "condition not met")]
    ConditionNotMet,
    /// The usage quota is already consumed.
    #[serde(rename = "limit reached")]
    LimitReached,
    /// The executor returned an error.
    #[serde(rename = "execution error")]
    ExecutionError,
    /// The player declined.
    #[serde(rename = "cancelled")]
    Cancelled,
    /// A player decision took longer than the configured cap.
    #[serde(rename = "timed out")]
    TimedOut,
}

impl FailureReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            FailureReason::NotImplemented => "not implemented",
            FailureReason::ConditionNotMet => "condition not met",
            FailureReason::LimitReached => "limit reached",
            FailureReason::ExecutionError => "execution error",
            FailureReason::Cancelled => "cancelled",
            FailureReason::TimedOut => "timed out",
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors an executor may raise.
///
/// These never leave the effect manager: they are logged and turned into a
/// failed `EffectResult`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EffectError {
    #[error("{player}'s deck is empty")]
    EmptyDeck { player: PlayerId },

    #[error("{0} was not found")]
    CardNotFound(EntityId),

    #[error("invalid target: {0}")]
    InvalidTarget(String),

    #[error("cost unpaid: need {needed}, have {available}")]
    CostUnpaid { needed: usize, available: usize },

    #[error("cancelled by player")]
    Cancelled,

    #[error("no choice within {0:?}")]
    ChoiceTimedOut(Duration),

    #[error("{0}")]
    Custom(String),
}

impl EffectError {
    /// The failure reason this error is reported under.
    #[must_use]
    pub fn reason(&self) -> FailureReason {
        match self {
            EffectError::Cancelled => FailureReason::Cancelled,
            EffectError::ChoiceTimedOut(_) => FailureReason::TimedOut,
            _ => FailureReason::ExecutionError,
        }
    }
}

/// Structured data about what an execution did.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectPayload {
    /// Cards drawn into hand.
    #[serde(default)]
    pub drawn: Vec<EntityId>,
    /// Cards moved by searches, looks and plain moves.
    #[serde(default)]
    pub moved: Vec<EntityId>,
    /// Total damage dealt.
    #[serde(default)]
    pub damage: u32,
    #[serde(default)]
    pub knocked_out: Vec<EntityId>,
    #[serde(default)]
    pub life_lost: usize,
    /// Die faces rolled, in order.
    #[serde(default)]
    pub rolls: Vec<u8>,
}

impl EffectPayload {
    /// Fold another payload into this one.
    pub fn merge(&mut self, other: EffectPayload) {
        self.drawn.extend(other.drawn);
        self.moved.extend(other.moved);
        self.damage += other.damage;
        self.knocked_out.extend(other.knocked_out);
        self.life_lost += other.life_lost;
        self.rolls.extend(other.rolls);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Outcome of one execution attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectResult {
    pub success: bool,

    /// Human-readable summary.
    pub message: String,

    /// The card whose effect ran.
    pub card: Option<EntityId>,

    pub trigger: Option<TriggerType>,

    pub payload: Option<EffectPayload>,

    pub reason: Option<FailureReason>,
}

impl EffectResult {
    /// A successful result.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            card: None,
            trigger: None,
            payload: None,
            reason: None,
        }
    }

    /// A failed result.
    pub fn failed(reason: FailureReason, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            card: None,
            trigger: None,
            payload: None,
            reason: Some(reason),
        }
    }

    /// Attach a payload (builder pattern). Empty payloads are dropped.
    #[must_use]
    pub fn with_payload(mut self, payload: EffectPayload) -> Self {
        self.payload = (!payload.is_empty()).then_some(payload);
        self
    }

    /// Stamp the card and trigger (builder pattern).
    #[must_use]
    pub fn for_card(mut self, card: EntityId, trigger: TriggerType) -> Self {
        self.card = Some(card);
        self.trigger = Some(trigger);
        self
    }

    /// Check if this failed for `reason`.
    #[must_use]
    pub fn failed_with(&self, reason: FailureReason) -> bool {
        !self.success && self.reason == Some(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_strings() {
        assert_eq!(FailureReason::NotImplemented.as_str(), "not implemented");
        assert_eq!(FailureReason::LimitReached.to_string(), "limit reached");
        let json = serde_json::to_string(&FailureReason::ConditionNotMet).unwrap();
        assert_eq!(json, "\"condition not met\"");
    }

    #[test]
    fn test_error_reasons() {
        assert_eq!(EffectError::Cancelled.reason(), FailureReason::Cancelled);
        assert_eq!(
            EffectError::ChoiceTimedOut(Duration::from_millis(5)).reason(),
            FailureReason::TimedOut
        );
        assert_eq!(
            EffectError::CardNotFound(EntityId(1)).reason(),
            FailureReason::ExecutionError
        );
    }

    #[test]
    fn test_result_builders() {
        let result = EffectResult::ok("drew 2")
            .with_payload(EffectPayload {
                drawn: vec![EntityId(1), EntityId(2)],
                ..EffectPayload::default()
            })
            .for_card(EntityId(9), TriggerType::OnCollab);

        assert!(result.success);
        assert_eq!(result.card, Some(EntityId(9)));
        assert_eq!(result.payload.as_ref().map(|p| p.drawn.len()), Some(2));

        let failed = EffectResult::failed(FailureReason::LimitReached, "once per turn");
        assert!(failed.failed_with(FailureReason::LimitReached));
        assert!(!failed.failed_with(FailureReason::Cancelled));
    }

    #[test]
    fn test_empty_payload_dropped() {
        let result = EffectResult::ok("nothing").with_payload(EffectPayload::default());
        assert!(result.payload.is_none());
    }

    #[test]
    fn test_payload_merge() {
        let mut a = EffectPayload {
            damage: 20,
            rolls: vec![3],
            ..EffectPayload::default()
        };
        a.merge(EffectPayload {
            damage: 10,
            drawn: vec![EntityId(4)],
            ..EffectPayload::default()
        });
        assert_eq!(a.damage, 30);
        assert_eq!(a.drawn, vec![EntityId(4)]);
        assert_eq!(a.rolls, vec![3]);
    }
}
