//! Effect building blocks.
//!
//! Card text chains a small set of operations: draw, search the deck, look at
//! the top cards and take some, shuffle, move, damage, attach and roll a die.
//! Executors compose these instead of touching zones by hand, so every
//! operation reads the deck the same way (index 0 is the top).
//!
//! Operations that need a decision make every decision before the first
//! mutation. A cancelled or timed-out choice leaves the board untouched.

use serde::{Deserialize, Serialize};

use super::executor::EffectIo;
use super::result::{EffectError, EffectPayload};
use super::targeting::CardFilter;
use crate::cards::{AttachmentKind, CardInstance};
use crate::core::{EntityId, PlayerId};
use crate::zones::{DamageKind, DamageOutcome, Position, Zone};

/// How cards are picked out of a candidate list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    /// First matches in top-to-bottom order. Deterministic, no decision.
    #[default]
    FirstMatch,
    /// The player picks, up to the cap.
    PlayerChoice,
}

/// Order for cards put back under the deck.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnOrder {
    /// Same relative order as they were looked at.
    #[default]
    Original,
    /// The player orders them.
    Chosen,
}

/// One "take up to N matching" clause of a deck look.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pick {
    pub filter: CardFilter,
    pub max: usize,
}

impl Pick {
    pub fn new(filter: CardFilter, max: usize) -> Self {
        Self { filter, max }
    }
}

/// What a deck look did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LookOutcome {
    /// Cards moved to the destination, top-to-bottom scan order.
    pub taken: Vec<EntityId>,
    /// Cards put under the deck, in the order they went.
    pub returned: Vec<EntityId>,
}

/// Draw `count` cards for `player`.
pub fn draw(io: &mut EffectIo<'_>, player: PlayerId, count: usize) -> Result<EffectPayload, EffectError> {
    let drawn = io.state.draw(player, count)?;
    Ok(EffectPayload {
        drawn,
        ..EffectPayload::default()
    })
}

async fn select(
    io: &EffectIo<'_>,
    player: PlayerId,
    prompt: &str,
    candidates: &[CardInstance],
    max: usize,
    selection: Selection,
) -> Result<Vec<EntityId>, EffectError> {
    match selection {
        Selection::FirstMatch => Ok(candidates.iter().take(max).map(|card| card.entity_id).collect()),
        Selection::PlayerChoice => io.choose(player, prompt, candidates, 0, max).await,
    }
}

/// Search the whole deck for up to `max` matching cards, move them to
/// `dest`, then shuffle the deck.
///
/// Finding nothing is not an error; the deck is shuffled either way.
pub async fn search_deck(
    io: &mut EffectIo<'_>,
    player: PlayerId,
    filter: &CardFilter,
    max: usize,
    dest: Zone,
    selection: Selection,
) -> Result<EffectPayload, EffectError> {
    let candidates: Vec<CardInstance> = io
        .state
        .cards_in(player, Zone::Deck)
        .into_iter()
        .filter(|card| filter.matches(card))
        .cloned()
        .collect();
    let picked = select(io, player, "search your deck", &candidates, max, selection).await?;

    for &entity in &picked {
        io.state.move_card(entity, dest, Position::Bottom)?;
    }
    io.state.shuffle(player, Zone::Deck);

    Ok(EffectPayload {
        moved: picked,
        ..EffectPayload::default()
    })
}

/// Look at the top `look` cards of the deck, take cards per `picks`, put the
/// rest on the bottom.
///
/// Each pick scans the looked-at cards top to bottom and never sees a card an
/// earlier pick took. The deck size changes only by the number of cards
/// taken.
pub async fn look_top_and_take(
    io: &mut EffectIo<'_>,
    player: PlayerId,
    look: usize,
    picks: &[Pick],
    dest: Zone,
    selection: Selection,
    return_order: ReturnOrder,
) -> Result<LookOutcome, EffectError> {
    let top: Vec<CardInstance> = io
        .state
        .cards_in(player, Zone::Deck)
        .into_iter()
        .take(look)
        .cloned()
        .collect();

    let mut chosen: Vec<EntityId> = Vec::new();
    for pick in picks {
        let candidates: Vec<CardInstance> = top
            .iter()
            .filter(|card| !chosen.contains(&card.entity_id) && pick.filter.matches(card))
            .cloned()
            .collect();
        chosen.extend(select(io, player, "take from the top of your deck", &candidates, pick.max, selection).await?);
    }

    let rest: Vec<CardInstance> = top
        .iter()
        .filter(|card| !chosen.contains(&card.entity_id))
        .cloned()
        .collect();
    let returned = match return_order {
        ReturnOrder::Original => rest.iter().map(|card| card.entity_id).collect(),
        ReturnOrder::Chosen => io.order(player, &rest).await?,
    };

    // Decisions are done; from here on nothing can be declined.
    let mut looked = io.state.take_top(player, Zone::Deck, top.len());
    let mut taken = Vec::with_capacity(chosen.len());
    let mut remaining = Vec::with_capacity(looked.len());
    for card in looked.drain(..) {
        if chosen.contains(&card.entity_id) {
            taken.push(card.entity_id);
            io.state.put(player, dest, card, Position::Bottom)?;
        } else {
            remaining.push(card);
        }
    }
    for entity in &returned {
        if let Some(i) = remaining.iter().position(|card| card.entity_id == *entity) {
            let card = remaining.swap_remove(i);
            io.state.put(player, Zone::Deck, card, Position::Bottom)?;
        }
    }

    Ok(LookOutcome { taken, returned })
}

/// Move a card to a zone of its owner.
pub fn move_card(io: &mut EffectIo<'_>, entity: EntityId, to: Zone, position: Position) -> Result<EffectPayload, EffectError> {
    io.state.move_card(entity, to, position)?;
    Ok(EffectPayload {
        moved: vec![entity],
        ..EffectPayload::default()
    })
}

pub fn shuffle_deck(io: &mut EffectIo<'_>, player: PlayerId) {
    io.state.shuffle(player, Zone::Deck);
}

/// Damage each target in turn and fold the outcomes into a payload.
pub fn damage(
    io: &mut EffectIo<'_>,
    targets: &[EntityId],
    amount: u32,
    kind: DamageKind,
) -> Result<EffectPayload, EffectError> {
    let mut payload = EffectPayload::default();
    for &target in targets {
        let DamageOutcome {
            dealt,
            knocked_out,
            life_lost,
            ..
        } = io.state.deal_damage(target, amount, kind)?;
        payload.damage += dealt;
        payload.life_lost += life_lost;
        if knocked_out {
            payload.knocked_out.push(target);
        }
    }
    Ok(payload)
}

/// Attach up to `count` cards from the top of `from` to `holder`.
pub fn attach_from_top(
    io: &mut EffectIo<'_>,
    player: PlayerId,
    from: Zone,
    count: usize,
    holder: EntityId,
    kind: AttachmentKind,
) -> Result<EffectPayload, EffectError> {
    let cards: Vec<EntityId> = io
        .state
        .cards_in(player, from)
        .into_iter()
        .take(count)
        .map(|card| card.entity_id)
        .collect();
    for &card in &cards {
        io.state.attach(card, holder, kind)?;
    }
    Ok(EffectPayload {
        moved: cards,
        ..EffectPayload::default()
    })
}

/// Detach a sub-card into a zone of its owner.
pub fn detach(io: &mut EffectIo<'_>, holder: EntityId, card: EntityId, to: Zone) -> Result<EffectPayload, EffectError> {
    io.state.detach(holder, card, to)?;
    Ok(EffectPayload {
        moved: vec![card],
        ..EffectPayload::default()
    })
}

/// Roll one die through the match's random source.
pub fn roll_die(io: &mut EffectIo<'_>, sides: u8) -> u8 {
    io.state.roll_die(sides)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{BloomLevel, CardTemplate};
    use crate::core::{EngineConfig, GameState};
    use crate::effects::{AutoChoice, DeclineAll, ScriptedAnswer, ScriptedChoices};
    use crate::zones::GameStateView;

    fn p0() -> PlayerId {
        PlayerId::new(0)
    }

    fn deck(state: &mut GameState) -> Vec<EntityId> {
        state.add_cards(
            &[
                CardTemplate::holomem("hSD01-006", "Tokino Sora", BloomLevel::First, 150),
                CardTemplate::support("hSD01-016", "Harusaki Nodoka"),
                CardTemplate::holomem("hSD01-003", "Tokino Sora", BloomLevel::Debut, 60),
                CardTemplate::holomem("hSD01-007", "IRyS", BloomLevel::First, 130),
                CardTemplate::support("hSD01-017", "Mane-chan"),
            ],
            p0(),
            Zone::Deck,
        )
    }

    fn deck_ids(state: &GameState) -> Vec<EntityId> {
        state.cards_in(p0(), Zone::Deck).iter().map(|c| c.entity_id).collect()
    }

    #[tokio::test]
    async fn test_look_top_first_match() {
        let mut state = GameState::new(&EngineConfig::default());
        let ids = deck(&mut state);
        let mut io = EffectIo::new(&mut state, &AutoChoice, None);

        let outcome = look_top_and_take(
            &mut io,
            p0(),
            4,
            &[Pick::new(CardFilter::character(), 1), Pick::new(CardFilter::support(), 1)],
            Zone::Hand,
            Selection::FirstMatch,
            ReturnOrder::Original,
        )
        .await
        .unwrap();

        assert_eq!(outcome.taken, vec![ids[0], ids[1]]);
        assert_eq!(outcome.returned, vec![ids[2], ids[3]]);
        // Unlooked card is now on top, returned cards under it
        assert_eq!(deck_ids(&state), vec![ids[4], ids[2], ids[3]]);
        assert_eq!(state.zone_size(p0(), Zone::Hand), 2);
    }

    #[tokio::test]
    async fn test_look_top_chosen_order() {
        let mut state = GameState::new(&EngineConfig::default());
        let ids = deck(&mut state);
        let script = ScriptedChoices::new([
            ScriptedAnswer::Pick(vec![ids[2]]),
            ScriptedAnswer::Order(vec![ids[1], ids[0]]),
        ]);
        let mut io = EffectIo::new(&mut state, &script, None);

        let outcome = look_top_and_take(
            &mut io,
            p0(),
            3,
            &[Pick::new(CardFilter::holomem_at(BloomLevel::Debut), 1)],
            Zone::Hand,
            Selection::PlayerChoice,
            ReturnOrder::Chosen,
        )
        .await
        .unwrap();

        assert_eq!(outcome.taken, vec![ids[2]]);
        assert_eq!(deck_ids(&state), vec![ids[3], ids[4], ids[1], ids[0]]);
    }

    #[tokio::test]
    async fn test_look_top_cancel_leaves_deck() {
        let mut state = GameState::new(&EngineConfig::default());
        let ids = deck(&mut state);
        let mut io = EffectIo::new(&mut state, &DeclineAll, None);

        let result = look_top_and_take(
            &mut io,
            p0(),
            4,
            &[Pick::new(CardFilter::character(), 1)],
            Zone::Hand,
            Selection::PlayerChoice,
            ReturnOrder::Original,
        )
        .await;

        assert_eq!(result, Err(EffectError::Cancelled));
        assert_eq!(deck_ids(&state), ids);
    }

    #[tokio::test]
    async fn test_search_deck_moves_and_shuffles() {
        let mut state = GameState::new(&EngineConfig::default());
        let ids = deck(&mut state);
        let mut io = EffectIo::new(&mut state, &AutoChoice, None);

        let payload = search_deck(
            &mut io,
            p0(),
            &CardFilter::holomem_at(BloomLevel::Debut),
            1,
            Zone::Hand,
            Selection::FirstMatch,
        )
        .await
        .unwrap();

        assert_eq!(payload.moved, vec![ids[2]]);
        assert_eq!(state.zone_size(p0(), Zone::Deck), 4);
        assert_eq!(state.locate_card(ids[2]), Some((p0(), Zone::Hand)));
    }

    #[tokio::test]
    async fn test_search_without_match() {
        let mut state = GameState::new(&EngineConfig::default());
        deck(&mut state);
        let mut io = EffectIo::new(&mut state, &AutoChoice, None);

        let payload = search_deck(
            &mut io,
            p0(),
            &CardFilter::Named("AZKi".into()),
            1,
            Zone::Hand,
            Selection::FirstMatch,
        )
        .await
        .unwrap();
        assert!(payload.moved.is_empty());
        assert_eq!(state.zone_size(p0(), Zone::Deck), 5);
    }

    #[test]
    fn test_damage_payload() {
        let mut state = GameState::new(&EngineConfig::default());
        let p1 = PlayerId::new(1);
        let target = state.add_card(
            &CardTemplate::holomem("hSD01-003", "Tokino Sora", BloomLevel::Debut, 30),
            p1,
            Zone::Center,
            Position::Top,
        );
        let mut io = EffectIo::new(&mut state, &AutoChoice, None);

        let payload = damage(&mut io, &[target], 30, DamageKind::Special).unwrap();
        assert_eq!(payload.damage, 30);
        assert_eq!(payload.knocked_out, vec![target]);
        assert_eq!(payload.life_lost, 0);
    }
}
