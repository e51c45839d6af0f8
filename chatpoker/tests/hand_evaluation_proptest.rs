/// Property-based tests for hand evaluation using proptest
///
/// These tests verify that the evaluator gives a consistent total order
/// across a wide range of randomly generated card combinations.
use chatpoker::game::{
    HandEvaluator, StandardEvaluator,
    entities::{Card, HandRank, Suit, Value},
    eval::eval,
};
use proptest::prelude::*;
use std::collections::BTreeSet;

// Strategy to generate a valid card
fn card_strategy() -> impl Strategy<Value = Card> {
    (0usize..13, 0usize..4).prop_map(|(value, suit)| Card(Value::ALL[value], Suit::ALL[suit]))
}

// Strategy to generate a vec of unique cards (no duplicates)
fn unique_cards_strategy(min: usize, max: usize) -> impl Strategy<Value = Vec<Card>> {
    prop::collection::vec(card_strategy(), min..=max).prop_filter("Cards must be unique", |cards| {
        let set: BTreeSet<_> = cards.iter().collect();
        set.len() == cards.len()
    })
}

proptest! {
    #[test]
    fn test_eval_deterministic(cards in unique_cards_strategy(7, 7)) {
        prop_assert_eq!(eval(&cards), eval(&cards));
    }

    #[test]
    fn test_eval_ignores_card_order(cards in unique_cards_strategy(2, 7)) {
        let mut reversed = cards.clone();
        reversed.reverse();
        prop_assert_eq!(eval(&cards), eval(&reversed));
    }

    #[test]
    fn test_more_cards_never_weaken_a_hand(cards in unique_cards_strategy(6, 7)) {
        let (fewer, _) = cards.split_at(5);
        prop_assert!(eval(&cards) >= eval(fewer));
    }

    #[test]
    fn test_evaluator_matches_eval(cards in unique_cards_strategy(7, 7)) {
        let hole = [cards[0], cards[1]];
        prop_assert_eq!(StandardEvaluator.score(&hole, &cards[2..]), eval(&cards));
    }

    #[test]
    fn test_five_of_a_suit_is_at_least_a_flush(values in prop::sample::subsequence(Value::ALL.to_vec(), 5)) {
        let cards: Vec<Card> = values.into_iter().map(|value| Card(value, Suit::Heart)).collect();
        prop_assert!(eval(&cards).rank >= HandRank::Flush);
    }

    #[test]
    fn test_pairs_beat_high_cards(cards in unique_cards_strategy(5, 5)) {
        let values: BTreeSet<_> = cards.iter().map(|card| card.0).collect();
        let suits: BTreeSet<_> = cards.iter().map(|card| card.1).collect();
        let score = eval(&cards);
        if values.len() < 5 {
            prop_assert!(score.rank >= HandRank::OnePair);
        } else if suits.len() > 1 {
            prop_assert!(score.rank == HandRank::HighCard || score.rank == HandRank::Straight);
        }
    }
}
