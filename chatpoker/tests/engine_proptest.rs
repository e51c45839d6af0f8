//! Property-based tests for the betting engine using proptest
//!
//! These tests drive whole hands with arbitrary stacks, decks and action
//! sequences and check that:
//! - no chip is created or destroyed, during a hand or at settlement
//! - a rejected action leaves the engine untouched
//! - raise legality follows the minimum-raise rule
//! - split pots hand out odd chips one at a time

use chatpoker::game::{
    Engine, EngineSettings,
    entities::{Action, Blinds, Card, Chips, Deck, Street, Suit, Value},
};
use proptest::prelude::*;

fn full_deck() -> Vec<Card> {
    Value::ALL
        .into_iter()
        .flat_map(|value| Suit::ALL.into_iter().map(move |suit| Card(value, suit)))
        .collect()
}

// Strategy to generate a shuffled 52-card deck
fn deck_strategy() -> impl Strategy<Value = Vec<Card>> {
    Just(full_deck()).prop_shuffle()
}

// Strategy to generate 2-6 starting stacks, some of them short
fn stacks_strategy() -> impl Strategy<Value = Vec<Chips>> {
    prop::collection::vec(3u32..=300, 2..=6)
}

// Actions as indices into a fixed menu, resolved against the live state
fn moves_strategy() -> impl Strategy<Value = Vec<(u8, u32)>> {
    prop::collection::vec((0u8..6, 0u32..200), 0..80)
}

fn engine_with(stacks: &[Chips], ante: Chips) -> Engine {
    let blinds = Blinds {
        small: 1,
        big: 2,
        ante,
    };
    let mut engine = Engine::new(EngineSettings::new(blinds, stacks.len()));
    for (seat, &stack) in stacks.iter().enumerate() {
        engine.buy_in(seat, stack).unwrap();
        engine.sit_in(seat).unwrap();
    }
    engine
}

fn resolve(engine: &Engine, kind: u8, extra: u32) -> Action {
    let seat = engine.acting_seat().unwrap_or_default();
    match kind {
        0 => Action::Fold,
        1 => Action::Check,
        2 => Action::Call,
        3 => Action::Bet(engine.min_raise_to()),
        4 => Action::Bet(engine.current_bet_level() + extra),
        _ => Action::Bet(engine.current_bet(seat) + engine.stack(seat)),
    }
}

fn apply(engine: &mut Engine, action: Action) -> bool {
    let result = match action {
        Action::Bet(chips) => engine.bet(chips),
        Action::Call => engine.call(),
        Action::Check => engine.check(),
        Action::Fold => engine.fold(),
        Action::AllIn => unreachable!("resolved into a bet"),
    };
    result.is_ok()
}

/// Snapshot of everything a rejected action must leave alone
fn snapshot(engine: &Engine) -> (Vec<Chips>, Chips, Option<usize>, Chips, Street, Vec<usize>) {
    (
        engine.stacks().to_vec(),
        engine.pot(),
        engine.acting_seat(),
        engine.current_bet_level(),
        engine.street(),
        engine.action_permissions(),
    )
}

fn finish(engine: &mut Engine) {
    while engine.is_hand_in_progress() {
        if engine.may_check() {
            engine.check().unwrap();
        } else {
            engine.fold().unwrap();
        }
    }
}

proptest! {
    #[test]
    fn test_chips_conserved_through_any_hand(
        stacks in stacks_strategy(),
        deck in deck_strategy(),
        moves in moves_strategy(),
        ante in 0u32..=2,
    ) {
        let mut engine = engine_with(&stacks, ante);
        let total: Chips = stacks.iter().sum();
        if engine.deal_with_deck(Deck::stacked(&deck)).is_err() {
            // Only a big blind too short for the ante may refuse to deal.
            prop_assert!(ante > 0);
            prop_assert_eq!(engine.total_chips(), total);
            return Ok(());
        }
        prop_assert_eq!(engine.total_chips(), total);

        for (kind, extra) in moves {
            if !engine.is_hand_in_progress() {
                break;
            }
            let action = resolve(&engine, kind, extra);
            let before = snapshot(&engine);
            if !apply(&mut engine, action) {
                prop_assert_eq!(snapshot(&engine), before, "{} changed state", action);
            }
            prop_assert_eq!(engine.total_chips(), total);
        }
        finish(&mut engine);

        prop_assert_eq!(engine.street(), Street::End);
        prop_assert_eq!(engine.pot(), 0);
        prop_assert_eq!(engine.stacks().iter().sum::<Chips>(), total);
        let result = engine.last_result().unwrap();
        let returned = result.returned.map_or(0, |(_, chips)| chips);
        prop_assert!(result.total_awarded() + returned <= total);
        prop_assert!(!result.winners().is_empty());
    }

    #[test]
    fn test_all_in_side_pots_settle_exactly(
        stacks in stacks_strategy(),
        deck in deck_strategy(),
    ) {
        let mut engine = engine_with(&stacks, 0);
        engine.deal_with_deck(Deck::stacked(&deck)).unwrap();
        while let Some(seat) = engine.acting_seat() {
            let all_in = engine.current_bet(seat) + engine.stack(seat);
            if all_in > engine.current_bet_level() && engine.may_bet() {
                engine.bet(all_in).unwrap();
            } else {
                engine.call().unwrap();
            }
        }

        prop_assert_eq!(engine.street(), Street::End);
        let result = engine.last_result().unwrap().clone();
        prop_assert!(result.showdown);
        prop_assert_eq!(result.board.len(), 5);

        let total: Chips = stacks.iter().sum();
        let returned = result.returned.map_or(0, |(_, chips)| chips);
        prop_assert_eq!(result.total_awarded() + returned, total);
        prop_assert_eq!(engine.stacks().iter().sum::<Chips>(), total);

        for (seat, &stack) in stacks.iter().enumerate() {
            // Nobody wins more than they could have matched from each opponent.
            let reachable: Chips = stacks.iter().map(|&other| other.min(stack)).sum();
            prop_assert!(result.winnings(seat) <= reachable);
        }

        for pot in &result.pots {
            let shares: Vec<Chips> = pot.winners.iter().map(|&(_, chips)| chips).collect();
            prop_assert_eq!(shares.iter().sum::<Chips>(), pot.amount);
            let (min, max) = (shares.iter().min().unwrap(), shares.iter().max().unwrap());
            prop_assert!(max - min <= 1);
            for (seat, _) in &pot.winners {
                prop_assert!(pot.contenders.contains(seat));
            }
        }
    }

    #[test]
    fn test_raise_legality(
        stacks in stacks_strategy(),
        deck in deck_strategy(),
        opening in 0u32..=40,
        chips in 0u32..=400,
    ) {
        let mut engine = engine_with(&stacks, 0);
        engine.deal_with_deck(Deck::stacked(&deck)).unwrap();
        // Give the street a non-trivial level first when the opener can afford it.
        let _ = engine.bet(engine.min_raise_to() + opening);
        let Some(seat) = engine.acting_seat() else {
            return Ok(());
        };

        let level = engine.current_bet_level();
        let committed = engine.current_bet(seat);
        let stack = engine.stack(seat);
        let expected = engine.may_bet()
            && chips > level
            && (chips >= level + engine.previous_raise() || chips - committed >= stack);
        prop_assert_eq!(engine.bet(chips).is_ok(), expected);
    }
}

#[test]
fn test_three_handed_trace() {
    let mut engine = engine_with(&[200, 250, 180], 0);
    engine.set_dealer(0).unwrap();
    engine.deal_with_deck(Deck::stacked(&full_deck())).unwrap();
    assert_eq!(engine.pot(), 0);
    assert_eq!(engine.current_bet(1), 1);
    assert_eq!(engine.current_bet(2), 2);

    assert_eq!(engine.acting_seat(), Some(0));
    engine.bet(5).unwrap();
    assert_eq!(engine.current_bet_level(), 5);
    engine.fold().unwrap();
    assert!(!engine.remaining_hands().contains(&1));
    engine.call().unwrap();

    assert_eq!(engine.street(), Street::Flop);
    assert_eq!(engine.pot(), 11);
    assert_eq!(engine.stacks(), &[195, 249, 175]);
}
