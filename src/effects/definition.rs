//! Effect definitions.
//!
//! An `EffectDefinition` is the immutable effect template of one card
//! number. It holds one or more named slots (oshi skill, bloom effect,
//! collab effect, arts, support effect). Each slot names the triggers it
//! answers, its timing class, usage limit and cost, and the executor that
//! implements it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::executor::EffectExecutor;
use crate::core::UsageLimit;
use crate::triggers::TriggerType;

/// Which printed effect a slot represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    OshiSkill,
    SpOshiSkill,
    Bloom,
    Collab,
    Gift,
    /// Art by printed index, starting at 1.
    Art(u8),
    Support,
}

impl std::fmt::Display for SlotKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlotKind::OshiSkill => write!(f, "oshi skill"),
            SlotKind::SpOshiSkill => write!(f, "SP oshi skill"),
            SlotKind::Bloom => write!(f, "bloom effect"),
            SlotKind::Collab => write!(f, "collab effect"),
            SlotKind::Gift => write!(f, "gift"),
            SlotKind::Art(index) => write!(f, "art-{index}"),
            SlotKind::Support => write!(f, "support effect"),
        }
    }
}

/// How a slot is started.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timing {
    /// Resolves whenever its trigger fires.
    #[default]
    Automatic,
    /// "You may": the owner confirms before anything changes.
    Optional,
    /// Started by the player through a manual trigger.
    Activated,
}

/// Resources paid after confirmation and before execution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectCost {
    /// Holopower cards archived.
    pub holopower: usize,
}

impl EffectCost {
    #[must_use]
    pub const fn holopower(count: usize) -> Self {
        Self { holopower: count }
    }

    #[must_use]
    pub const fn is_free(self) -> bool {
        self.holopower == 0
    }
}

/// One named effect of a card.
#[derive(Clone)]
pub struct EffectSlot {
    pub kind: SlotKind,
    /// Printed name, used in prompts and logs.
    pub name: String,
    pub triggers: SmallVec<[TriggerType; 2]>,
    pub timing: Timing,
    pub limit: UsageLimit,
    pub cost: EffectCost,
    executor: Arc<dyn EffectExecutor>,
}

impl std::fmt::Debug for EffectSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectSlot")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("triggers", &self.triggers)
            .field("timing", &self.timing)
            .field("limit", &self.limit)
            .field("cost", &self.cost)
            .finish_non_exhaustive()
    }
}

impl EffectSlot {
    /// Create an automatic, unlimited, free slot.
    pub fn new(kind: SlotKind, trigger: TriggerType, executor: impl EffectExecutor + 'static) -> Self {
        Self::from_arc(kind, trigger, Arc::new(executor))
    }

    /// Create a slot sharing an existing executor.
    pub fn from_arc(kind: SlotKind, trigger: TriggerType, executor: Arc<dyn EffectExecutor>) -> Self {
        let mut triggers = SmallVec::new();
        triggers.push(trigger);
        Self {
            kind,
            name: kind.to_string(),
            triggers,
            timing: Timing::default(),
            limit: UsageLimit::default(),
            cost: EffectCost::default(),
            executor,
        }
    }

    /// Also answer another trigger (builder pattern).
    #[must_use]
    pub fn also_on(mut self, trigger: TriggerType) -> Self {
        if !self.triggers.contains(&trigger) {
            self.triggers.push(trigger);
        }
        self
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: UsageLimit) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub fn with_cost(mut self, cost: EffectCost) -> Self {
        self.cost = cost;
        self
    }

    #[must_use]
    pub fn responds_to(&self, trigger: TriggerType) -> bool {
        self.triggers.contains(&trigger)
    }

    #[must_use]
    pub fn executor(&self) -> &dyn EffectExecutor {
        self.executor.as_ref()
    }
}

/// The effect template of one card number.
///
/// ## Example
///
/// ```
/// use holo_ccg::core::UsageLimit;
/// use holo_ccg::effects::{DrawCards, EffectDefinition, EffectSlot, SlotKind};
/// use holo_ccg::triggers::TriggerType;
///
/// let definition = EffectDefinition::new("hSD01-003", "Tokino Sora").with_slot(
///     EffectSlot::new(SlotKind::Collab, TriggerType::OnCollab, DrawCards::new(1))
///         .with_limit(UsageLimit::PerTurn(1)),
/// );
///
/// assert!(definition.slot_for(TriggerType::OnCollab).is_some());
/// assert!(definition.slot_for(TriggerType::OnBloom).is_none());
/// ```
#[derive(Clone, Debug)]
pub struct EffectDefinition {
    pub card_number: String,
    pub name: String,
    slots: Vec<EffectSlot>,
}

impl EffectDefinition {
    pub fn new(card_number: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            card_number: card_number.into(),
            name: name.into(),
            slots: Vec::new(),
        }
    }

    /// Add a slot (builder pattern).
    #[must_use]
    pub fn with_slot(mut self, slot: EffectSlot) -> Self {
        self.slots.push(slot);
        self
    }

    #[must_use]
    pub fn slots(&self) -> &[EffectSlot] {
        &self.slots
    }

    /// The first slot answering `trigger`.
    #[must_use]
    pub fn slot_for(&self, trigger: TriggerType) -> Option<&EffectSlot> {
        self.slots.iter().find(|slot| slot.responds_to(trigger))
    }

    /// Every trigger some slot answers, in slot order, without repeats.
    #[must_use]
    pub fn triggers(&self) -> SmallVec<[TriggerType; 4]> {
        let mut triggers = SmallVec::new();
        for trigger in self.slots.iter().flat_map(|slot| slot.triggers.iter().copied()) {
            if !triggers.contains(&trigger) {
                triggers.push(trigger);
            }
        }
        triggers
    }
}
