//! Ready-made executors for common card text.
//!
//! Card definitions are data: most slots are one of these executors, or a
//! [`Sequence`] / [`DieRoll`] composing several of them. Anything more
//! unusual implements [`EffectExecutor`] directly or wraps a closure in
//! [`FnEffect`].

use std::sync::Arc;

use async_trait::async_trait;
use smallvec::SmallVec;

use super::executor::{EffectExecutor, EffectIo};
use super::ops::{self, Pick, ReturnOrder, Selection};
use super::result::{EffectError, EffectPayload, EffectResult, FailureReason};
use super::targeting::{CardFilter, TargetSelector, TargetSpec};
use crate::cards::{AttachmentKind, CardInstance, Expiry, Modifier};
use crate::core::EntityId;
use crate::triggers::TriggerEvent;
use crate::zones::{DamageKind, GameStateMutator, GameStateView, Zone};

/// Draw cards for the card's owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawCards {
    pub count: usize,
}

impl DrawCards {
    #[must_use]
    pub fn new(count: usize) -> Self {
        Self { count }
    }
}

#[async_trait]
impl EffectExecutor for DrawCards {
    fn can_activate(&self, card: &CardInstance, _event: &TriggerEvent, view: &dyn GameStateView) -> bool {
        view.zone_size(card.owner, Zone::Deck) > 0
    }

    async fn execute(
        &self,
        card: &CardInstance,
        _event: &TriggerEvent,
        io: &mut EffectIo<'_>,
    ) -> Result<EffectResult, EffectError> {
        let payload = ops::draw(io, card.owner, self.count)?;
        Ok(EffectResult::ok(format!("drew {}", payload.drawn.len())).with_payload(payload))
    }
}

/// Search the owner's deck, move the finds, shuffle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchDeck {
    pub filter: CardFilter,
    pub max: usize,
    pub dest: Zone,
    pub selection: Selection,
}

impl SearchDeck {
    /// Search for up to `max` cards into hand, first matches taken.
    pub fn new(filter: CardFilter, max: usize) -> Self {
        Self {
            filter,
            max,
            dest: Zone::Hand,
            selection: Selection::FirstMatch,
        }
    }

    #[must_use]
    pub fn into_zone(mut self, dest: Zone) -> Self {
        self.dest = dest;
        self
    }

    /// Let the owner pick among the matches.
    #[must_use]
    pub fn chosen(mut self) -> Self {
        self.selection = Selection::PlayerChoice;
        self
    }
}

#[async_trait]
impl EffectExecutor for SearchDeck {
    async fn execute(
        &self,
        card: &CardInstance,
        _event: &TriggerEvent,
        io: &mut EffectIo<'_>,
    ) -> Result<EffectResult, EffectError> {
        let payload = ops::search_deck(io, card.owner, &self.filter, self.max, self.dest, self.selection).await?;
        Ok(EffectResult::ok(format!("found {}", payload.moved.len())).with_payload(payload))
    }
}

/// Look at the top of the owner's deck, take some, return the rest under it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LookTopAndTake {
    pub look: usize,
    pub picks: Vec<Pick>,
    pub dest: Zone,
    pub selection: Selection,
    pub return_order: ReturnOrder,
}

impl LookTopAndTake {
    pub fn new(look: usize) -> Self {
        Self {
            look,
            picks: Vec::new(),
            dest: Zone::Hand,
            selection: Selection::FirstMatch,
            return_order: ReturnOrder::Original,
        }
    }

    /// Add a "take up to `max` matching" clause (builder pattern).
    #[must_use]
    pub fn take(mut self, filter: CardFilter, max: usize) -> Self {
        self.picks.push(Pick::new(filter, max));
        self
    }

    #[must_use]
    pub fn into_zone(mut self, dest: Zone) -> Self {
        self.dest = dest;
        self
    }

    #[must_use]
    pub fn chosen(mut self) -> Self {
        self.selection = Selection::PlayerChoice;
        self
    }

    #[must_use]
    pub fn ordered_return(mut self) -> Self {
        self.return_order = ReturnOrder::Chosen;
        self
    }
}

#[async_trait]
impl EffectExecutor for LookTopAndTake {
    fn can_activate(&self, card: &CardInstance, _event: &TriggerEvent, view: &dyn GameStateView) -> bool {
        view.zone_size(card.owner, Zone::Deck) > 0
    }

    async fn execute(
        &self,
        card: &CardInstance,
        _event: &TriggerEvent,
        io: &mut EffectIo<'_>,
    ) -> Result<EffectResult, EffectError> {
        let outcome = ops::look_top_and_take(
            io,
            card.owner,
            self.look,
            &self.picks,
            self.dest,
            self.selection,
            self.return_order,
        )
        .await?;
        let message = format!(
            "took {}, returned {} to the bottom",
            outcome.taken.len(),
            outcome.returned.len()
        );
        Ok(EffectResult::ok(message).with_payload(EffectPayload {
            moved: outcome.taken,
            ..EffectPayload::default()
        }))
    }
}

/// Deal damage to holomems.
///
/// Fixed targets (center, collab, this card, the event target) are all hit.
/// A [`TargetSpec::Holomem`] target lets the owner pick one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DealDamage {
    pub target: TargetSpec,
    pub amount: u32,
    pub kind: DamageKind,
}

impl DealDamage {
    pub fn new(target: TargetSpec, amount: u32) -> Self {
        Self {
            target,
            amount,
            kind: DamageKind::Normal,
        }
    }

    pub fn special(target: TargetSpec, amount: u32) -> Self {
        Self {
            target,
            amount,
            kind: DamageKind::Special,
        }
    }
}

#[async_trait]
impl EffectExecutor for DealDamage {
    fn can_activate(&self, card: &CardInstance, event: &TriggerEvent, view: &dyn GameStateView) -> bool {
        !TargetSelector::new(card, event)
            .candidates(&self.target, view)
            .is_empty()
    }

    async fn execute(
        &self,
        card: &CardInstance,
        event: &TriggerEvent,
        io: &mut EffectIo<'_>,
    ) -> Result<EffectResult, EffectError> {
        let candidates = TargetSelector::new(card, event).candidates(&self.target, &*io.state);
        if candidates.is_empty() {
            return Err(EffectError::InvalidTarget("no holomem to damage".to_string()));
        }

        let targets: Vec<EntityId> = if self.target.is_choice() {
            io.choose(card.owner, "choose a holomem to damage", &candidates, 1, 1)
                .await?
        } else {
            candidates.iter().map(|target| target.entity_id).collect()
        };

        let payload = ops::damage(io, &targets, self.amount, self.kind)?;
        Ok(EffectResult::ok(format!("dealt {} damage", payload.damage)).with_payload(payload))
    }
}

/// Attach cards from the top of one of the owner's zones to a holomem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttachFromTop {
    pub from: Zone,
    pub count: usize,
    pub target: TargetSpec,
    pub kind: AttachmentKind,
}

impl AttachFromTop {
    /// Yells from the top of the yell deck.
    pub fn yells(count: usize, target: TargetSpec) -> Self {
        Self {
            from: Zone::YellDeck,
            count,
            target,
            kind: AttachmentKind::Yell,
        }
    }
}

#[async_trait]
impl EffectExecutor for AttachFromTop {
    fn can_activate(&self, card: &CardInstance, event: &TriggerEvent, view: &dyn GameStateView) -> bool {
        view.zone_size(card.owner, self.from) > 0
            && !TargetSelector::new(card, event)
                .candidates(&self.target, view)
                .is_empty()
    }

    async fn execute(
        &self,
        card: &CardInstance,
        event: &TriggerEvent,
        io: &mut EffectIo<'_>,
    ) -> Result<EffectResult, EffectError> {
        let candidates = TargetSelector::new(card, event).candidates(&self.target, &*io.state);
        let holder = match candidates.as_slice() {
            [] => return Err(EffectError::InvalidTarget("no holomem to attach to".to_string())),
            [only] => only.entity_id,
            _ => {
                let picked = io.choose(card.owner, "choose a holomem", &candidates, 1, 1).await?;
                picked
                    .first()
                    .copied()
                    .ok_or_else(|| EffectError::InvalidTarget("no holomem chosen".to_string()))?
            }
        };

        let payload = ops::attach_from_top(io, card.owner, self.from, self.count, holder, self.kind)?;
        Ok(EffectResult::ok(format!("attached {}", payload.moved.len())).with_payload(payload))
    }
}

/// Put a modifier on every target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrantModifier {
    pub target: TargetSpec,
    pub key: String,
    pub amount: i32,
    pub expiry: Expiry,
}

impl GrantModifier {
    pub fn new(target: TargetSpec, key: impl Into<String>, amount: i32, expiry: Expiry) -> Self {
        Self {
            target,
            key: key.into(),
            amount,
            expiry,
        }
    }
}

#[async_trait]
impl EffectExecutor for GrantModifier {
    fn can_activate(&self, card: &CardInstance, event: &TriggerEvent, view: &dyn GameStateView) -> bool {
        !TargetSelector::new(card, event)
            .candidates(&self.target, view)
            .is_empty()
    }

    async fn execute(
        &self,
        card: &CardInstance,
        event: &TriggerEvent,
        io: &mut EffectIo<'_>,
    ) -> Result<EffectResult, EffectError> {
        let granted_on = io.state.active_player();
        let targets = TargetSelector::new(card, event).candidates(&self.target, &*io.state);
        for target in &targets {
            io.state.add_modifier(
                target.entity_id,
                Modifier {
                    key: self.key.clone(),
                    amount: self.amount,
                    expiry: self.expiry,
                    granted_on,
                },
            )?;
        }
        Ok(EffectResult::ok(format!("{} {:+} on {}", self.key, self.amount, targets.len())))
    }
}

/// Roll a die and run the branch listing the face.
///
/// A face no branch lists resolves as a successful "no effect". A branch
/// whose own `can_activate` refuses reports `condition not met`.
#[derive(Clone)]
pub struct DieRoll {
    pub sides: u8,
    branches: Vec<(SmallVec<[u8; 6]>, Arc<dyn EffectExecutor>)>,
}

impl std::fmt::Debug for DieRoll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let faces: Vec<&[u8]> = self.branches.iter().map(|(faces, _)| faces.as_slice()).collect();
        f.debug_struct("DieRoll")
            .field("sides", &self.sides)
            .field("branches", &faces)
            .finish()
    }
}

impl Default for DieRoll {
    fn default() -> Self {
        Self::new()
    }
}

impl DieRoll {
    /// A six-sided roll with no branches yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sides: 6,
            branches: Vec::new(),
        }
    }

    /// Run `executor` on any of `faces` (builder pattern).
    #[must_use]
    pub fn on(mut self, faces: &[u8], executor: impl EffectExecutor + 'static) -> Self {
        self.branches.push((SmallVec::from_slice(faces), Arc::new(executor)));
        self
    }

    /// The branch index for a face.
    #[must_use]
    pub fn branch_for(&self, face: u8) -> Option<usize> {
        self.branches.iter().position(|(faces, _)| faces.contains(&face))
    }
}

#[async_trait]
impl EffectExecutor for DieRoll {
    async fn execute(
        &self,
        card: &CardInstance,
        event: &TriggerEvent,
        io: &mut EffectIo<'_>,
    ) -> Result<EffectResult, EffectError> {
        let face = ops::roll_die(io, self.sides);
        let rolled = EffectPayload {
            rolls: vec![face],
            ..EffectPayload::default()
        };

        let Some(index) = self.branch_for(face) else {
            return Ok(EffectResult::ok(format!("rolled {face}: no effect")).with_payload(rolled));
        };
        let (_, branch) = &self.branches[index];
        if !branch.can_activate(card, event, io.state.as_view()) {
            return Ok(EffectResult::failed(
                FailureReason::ConditionNotMet,
                format!("rolled {face}: condition not met"),
            )
            .with_payload(rolled));
        }
        let mut result = branch.execute(card, event, io).await?;

        let mut payload = rolled;
        if let Some(inner) = result.payload.take() {
            payload.merge(inner);
        }
        result.message = format!("rolled {face}: {}", result.message);
        Ok(result.with_payload(payload))
    }
}

/// Run executors in order, stopping at the first failure.
#[derive(Clone, Default)]
pub struct Sequence {
    steps: Vec<Arc<dyn EffectExecutor>>,
}

impl std::fmt::Debug for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sequence").field("steps", &self.steps.len()).finish()
    }
}

impl Sequence {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step (builder pattern).
    #[must_use]
    pub fn then(mut self, step: impl EffectExecutor + 'static) -> Self {
        self.steps.push(Arc::new(step));
        self
    }
}

#[async_trait]
impl EffectExecutor for Sequence {
    /// Only the first step gates activation; later steps resolve against
    /// whatever the earlier ones left.
    fn can_activate(&self, card: &CardInstance, event: &TriggerEvent, view: &dyn GameStateView) -> bool {
        self.steps
            .first()
            .map_or(true, |step| step.can_activate(card, event, view))
    }

    async fn execute(
        &self,
        card: &CardInstance,
        event: &TriggerEvent,
        io: &mut EffectIo<'_>,
    ) -> Result<EffectResult, EffectError> {
        let mut payload = EffectPayload::default();
        let mut messages = Vec::with_capacity(self.steps.len());

        for step in &self.steps {
            let mut result = step.execute(card, event, io).await?;
            if let Some(inner) = result.payload.take() {
                payload.merge(inner);
            }
            if !result.success {
                return Ok(result.with_payload(payload));
            }
            messages.push(result.message);
        }
        Ok(EffectResult::ok(messages.join(", ")).with_payload(payload))
    }
}

type RunFn = dyn Fn(&CardInstance, &TriggerEvent, &mut dyn GameStateMutator) -> Result<EffectResult, EffectError>
    + Send
    + Sync;
type ConditionFn = dyn Fn(&CardInstance, &TriggerEvent, &dyn GameStateView) -> bool + Send + Sync;

/// An executor built from closures. No player decisions.
#[derive(Clone)]
pub struct FnEffect {
    run: Arc<RunFn>,
    condition: Option<Arc<ConditionFn>>,
}

impl std::fmt::Debug for FnEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnEffect")
            .field("conditional", &self.condition.is_some())
            .finish_non_exhaustive()
    }
}

impl FnEffect {
    pub fn new(
        run: impl Fn(&CardInstance, &TriggerEvent, &mut dyn GameStateMutator) -> Result<EffectResult, EffectError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            run: Arc::new(run),
            condition: None,
        }
    }

    /// Gate activation on a predicate (builder pattern).
    #[must_use]
    pub fn when(
        mut self,
        condition: impl Fn(&CardInstance, &TriggerEvent, &dyn GameStateView) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.condition = Some(Arc::new(condition));
        self
    }
}

#[async_trait]
impl EffectExecutor for FnEffect {
    fn can_activate(&self, card: &CardInstance, event: &TriggerEvent, view: &dyn GameStateView) -> bool {
        self.condition
            .as_ref()
            .map_or(true, |condition| condition(card, event, view))
    }

    async fn execute(
        &self,
        card: &CardInstance,
        event: &TriggerEvent,
        io: &mut EffectIo<'_>,
    ) -> Result<EffectResult, EffectError> {
        (self.run)(card, event, &mut *io.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{BloomLevel, CardTemplate};
    use crate::core::{EngineConfig, FixedRolls, GameState, PlayerId};
    use crate::effects::{AutoChoice, ScriptedAnswer, ScriptedChoices};
    use crate::effects::targeting::Side;
    use crate::triggers::{EventContext, TriggerType};
    use crate::zones::Position;

    fn p0() -> PlayerId {
        PlayerId::new(0)
    }

    fn event() -> TriggerEvent {
        TriggerEvent::new(TriggerType::OnBloom, EventContext::new(p0()))
    }

    fn setup(rolls: &[u8]) -> (GameState, CardInstance) {
        let mut state = GameState::new(&EngineConfig::default()).with_random_source(FixedRolls::new(rolls.to_vec()));
        let sora = state.add_card(
            &CardTemplate::holomem("hSD01-006", "Tokino Sora", BloomLevel::First, 150),
            p0(),
            Zone::Center,
            Position::Top,
        );
        state.add_cards(
            &[
                CardTemplate::support("hSD01-016", "Harusaki Nodoka"),
                CardTemplate::holomem("hSD01-003", "Tokino Sora", BloomLevel::Debut, 60),
                CardTemplate::support("hSD01-017", "Mane-chan"),
            ],
            p0(),
            Zone::Deck,
        );
        let card = state.find_card(sora).cloned().unwrap();
        (state, card)
    }

    fn roll_effect() -> DieRoll {
        DieRoll::new()
            .on(&[3, 5, 6], SearchDeck::new(CardFilter::holomem_at(BloomLevel::Debut), 1))
            .on(&[2, 4], DrawCards::new(1))
    }

    #[tokio::test]
    async fn test_die_roll_branches() {
        for (face, drawn, moved) in [(3u8, 0usize, 1usize), (4, 1, 0), (1, 0, 0)] {
            let (mut state, card) = setup(&[face]);
            let mut io = EffectIo::new(&mut state, &AutoChoice, None);
            let result = roll_effect().execute(&card, &event(), &mut io).await.unwrap();

            assert!(result.success, "face {face}");
            let payload = result.payload.unwrap();
            assert_eq!(payload.rolls, vec![face]);
            assert_eq!(payload.drawn.len(), drawn, "face {face}");
            assert_eq!(payload.moved.len(), moved, "face {face}");
        }
    }

    #[tokio::test]
    async fn test_die_roll_branch_not_eligible() {
        let (mut state, card) = setup(&[2]);
        state.take_top(p0(), Zone::Deck, 3);
        let mut io = EffectIo::new(&mut state, &AutoChoice, None);

        let result = roll_effect().execute(&card, &event(), &mut io).await.unwrap();
        assert!(result.failed_with(FailureReason::ConditionNotMet));
        assert_eq!(result.payload.map(|p| p.rolls), Some(vec![2]));
    }

    #[test]
    fn test_branch_lookup() {
        let roll = roll_effect();
        assert_eq!(roll.branch_for(6), Some(0));
        assert_eq!(roll.branch_for(2), Some(1));
        assert_eq!(roll.branch_for(1), None);
    }

    #[tokio::test]
    async fn test_sequence_merges_payloads() {
        let (mut state, card) = setup(&[]);
        let mut io = EffectIo::new(&mut state, &AutoChoice, None);
        let effect = Sequence::new().then(DrawCards::new(1)).then(DrawCards::new(1));

        let result = effect.execute(&card, &event(), &mut io).await.unwrap();
        assert_eq!(result.payload.unwrap().drawn.len(), 2);
        assert_eq!(state.zone_size(p0(), Zone::Hand), 2);
    }

    #[tokio::test]
    async fn test_sequence_stops_on_error() {
        let (mut state, card) = setup(&[]);
        let mut io = EffectIo::new(&mut state, &AutoChoice, None);
        let effect = Sequence::new()
            .then(DrawCards::new(3))
            .then(DrawCards::new(1))
            .then(DrawCards::new(1));

        let result = effect.execute(&card, &event(), &mut io).await;
        assert_eq!(result, Err(EffectError::EmptyDeck { player: p0() }));
    }

    #[tokio::test]
    async fn test_deal_damage_chosen_target() {
        let (mut state, card) = setup(&[]);
        let p1 = PlayerId::new(1);
        let debut = CardTemplate::holomem("hSD01-003", "Tokino Sora", BloomLevel::Debut, 60);
        state.add_card(&debut, p1, Zone::Center, Position::Top);
        let back = state.add_card(&debut, p1, Zone::Back, Position::Top);
        let script = ScriptedChoices::new([ScriptedAnswer::Pick(vec![back])]);
        let effect = DealDamage::special(
            TargetSpec::Holomem {
                side: Side::Opponent,
                filter: CardFilter::Any,
            },
            20,
        );

        assert!(effect.can_activate(&card, &event(), &state));
        let mut io = EffectIo::new(&mut state, &script, None);
        let result = effect.execute(&card, &event(), &mut io).await.unwrap();
        assert_eq!(result.payload.unwrap().damage, 20);
        assert_eq!(state.find_card(back).map(|c| c.damage), Some(20));
    }

    #[tokio::test]
    async fn test_attach_yells() {
        let (mut state, card) = setup(&[]);
        state.add_cards(
            &[CardTemplate::yell("hY01-001", crate::cards::Color::White)],
            p0(),
            Zone::YellDeck,
        );
        let effect = AttachFromTop::yells(1, TargetSpec::ThisCard);
        let mut io = EffectIo::new(&mut state, &AutoChoice, None);

        effect.execute(&card, &event(), &mut io).await.unwrap();
        assert_eq!(state.find_card(card.entity_id).map(CardInstance::yell_count), Some(1));
        assert_eq!(state.zone_size(p0(), Zone::YellDeck), 0);
    }

    #[tokio::test]
    async fn test_fn_effect_condition() {
        let (mut state, card) = setup(&[]);
        let effect = FnEffect::new(|card, _, state| {
            let drawn = state.draw(card.owner, 1)?;
            Ok(EffectResult::ok(format!("drew {}", drawn.len())))
        })
        .when(|card, _, view| view.zone_size(card.owner, Zone::Hand) == 0);

        assert!(effect.can_activate(&card, &event(), &state));
        let mut io = EffectIo::new(&mut state, &AutoChoice, None);
        effect.execute(&card, &event(), &mut io).await.unwrap();
        assert!(!effect.can_activate(&card, &event(), &state));
    }
}
