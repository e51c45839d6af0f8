//! Built-in bots that keep tables busy when no chat front end is attached.
//!
//! A bot only ever picks among the legal choices the table offers it, so a
//! decision can never be rejected for being illegal.

use chatpoker::{
    game::{
        HandEvaluator, StandardEvaluator,
        entities::{Action, ActionChoice, Card, HandRank, PlayerId},
    },
    table::TableView,
};
use rand::{Rng, SeedableRng, rngs::StdRng};

const STRENGTH_HIGH_CARD: f32 = 0.1;
const STRENGTH_ONE_PAIR: f32 = 0.25;
const STRENGTH_TWO_PAIR: f32 = 0.40;
const STRENGTH_THREE_OF_A_KIND: f32 = 0.55;
const STRENGTH_STRAIGHT: f32 = 0.70;
const STRENGTH_FLUSH: f32 = 0.75;
const STRENGTH_FULL_HOUSE: f32 = 0.85;
const STRENGTH_FOUR_OF_A_KIND: f32 = 0.95;
const STRENGTH_STRAIGHT_FLUSH: f32 = 0.99;

/// How loose and how aggressive a bot plays.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BotStyle {
    /// Calls a lot, rarely raises
    Passive,
    Standard,
    /// Folds weak hands, raises strong ones
    Aggressive,
}

impl BotStyle {
    pub const ALL: [Self; 3] = [Self::Passive, Self::Standard, Self::Aggressive];

    /// (fold below, raise from, raise probability)
    fn thresholds(self) -> (f32, f32, f64) {
        match self {
            Self::Passive => (0.20, 0.60, 0.2),
            Self::Standard => (0.22, 0.45, 0.5),
            Self::Aggressive => (0.28, 0.38, 0.8),
        }
    }
}

pub struct Bot {
    pub player: PlayerId,
    style: BotStyle,
    rng: StdRng,
}

impl Bot {
    pub fn new(player: PlayerId, style: BotStyle) -> Self {
        Self {
            player,
            style,
            rng: StdRng::from_rng(&mut rand::rng()),
        }
    }

    /// Deterministic bot for tests.
    pub fn with_seed(player: PlayerId, style: BotStyle, seed: u64) -> Self {
        Self {
            player,
            style,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Pick an action from the bot's own view of the table. `None` when it
    /// is not the bot's turn.
    pub fn decide(&mut self, view: &TableView) -> Option<Action> {
        let seat = view.seat_of(self.player)?;
        let choices = &view.action_choices.as_ref()?.0;
        let strength = seat
            .cards
            .map_or(0.0, |hole| estimate_strength(&hole, &view.board));

        let mut can_check = false;
        let mut call = None;
        let mut bet = None;
        let mut all_in = false;
        for choice in choices {
            match *choice {
                ActionChoice::Check => can_check = true,
                ActionChoice::Call(amount) => call = Some(amount),
                ActionChoice::Bet(min) => bet = Some(min),
                ActionChoice::AllIn(_) => all_in = true,
                ActionChoice::Fold => {}
            }
        }
        let passive = if can_check { Action::Check } else { Action::Call };
        let (fold_threshold, raise_threshold, raise_probability) = self.style.thresholds();

        if strength < fold_threshold {
            return Some(if can_check { Action::Check } else { Action::Fold });
        }

        if strength < raise_threshold {
            if can_check {
                return Some(Action::Check);
            }
            // Cheap calls relative to the pot are worth seeing.
            let cheap = call.is_some_and(|amount| amount.saturating_mul(3) <= view.pot.max(1));
            let call_probability = if cheap { 0.9 } else { 0.45 };
            return Some(if self.rng.random_bool(call_probability) {
                Action::Call
            } else {
                Action::Fold
            });
        }

        if !self.rng.random_bool(raise_probability) {
            return Some(passive);
        }
        match bet {
            Some(min) => {
                let sizing = self.rng.random_range(0..=view.pot / 2);
                Some(Action::Bet(min + sizing))
            }
            None if all_in => Some(Action::AllIn),
            None => Some(passive),
        }
    }
}

/// Estimate hand strength (0.0 to 1.0) from the made hand and its top card.
#[must_use]
pub fn estimate_strength(hole: &[Card; 2], board: &[Card]) -> f32 {
    let score = StandardEvaluator.score(hole, board);
    let base_strength = match score.rank {
        HandRank::HighCard => STRENGTH_HIGH_CARD,
        HandRank::OnePair => STRENGTH_ONE_PAIR,
        HandRank::TwoPair => STRENGTH_TWO_PAIR,
        HandRank::ThreeOfAKind => STRENGTH_THREE_OF_A_KIND,
        HandRank::Straight => STRENGTH_STRAIGHT,
        HandRank::Flush => STRENGTH_FLUSH,
        HandRank::FullHouse => STRENGTH_FULL_HOUSE,
        HandRank::FourOfAKind => STRENGTH_FOUR_OF_A_KIND,
        HandRank::StraightFlush => STRENGTH_STRAIGHT_FLUSH,
    };
    let kicker_bonus = f32::from(score.values[0]) / 14.0 * 0.1;
    (base_strength + kicker_bonus).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatpoker::{
        game::entities::{ActionChoices, Blinds, Street, parse_cards},
        table::SeatView,
    };

    fn hole(cards: &str) -> [Card; 2] {
        let cards = parse_cards(cards).unwrap();
        [cards[0], cards[1]]
    }

    fn view_for(
        player: PlayerId,
        cards: &str,
        board: &str,
        choices: Vec<ActionChoice>,
    ) -> TableView {
        TableView {
            name: "t".to_string(),
            street: Street::Flop,
            blinds: Blinds {
                small: 1,
                big: 2,
                ante: 0,
            },
            board: parse_cards(board).unwrap(),
            pot: 20,
            dealer: Some(0),
            acting_seat: Some(0),
            seats: vec![SeatView {
                seat: 0,
                player: Some(player),
                stack: 100,
                current_bet: 0,
                sitting_in: true,
                in_hand: true,
                cards: Some(hole(cards)),
            }],
            action_choices: Some(ActionChoices(choices)),
            last_result: None,
            recent_hands: Vec::new(),
        }
    }

    #[test]
    fn test_strength_orders_made_hands() {
        let board = parse_cards("Ks7d2c").unwrap();
        let air = estimate_strength(&hole("9h4s"), &board);
        let pair = estimate_strength(&hole("KhQh"), &board);
        let set = estimate_strength(&hole("7h7s"), &board);
        assert!(air < pair);
        assert!(pair < set);
    }

    #[test]
    fn test_weak_hand_checks_or_folds() {
        for style in BotStyle::ALL {
            let mut bot = Bot::with_seed(1, style, 7);
            let view = view_for(
                1,
                "9h4s",
                "Ks7d2c",
                vec![ActionChoice::Check, ActionChoice::Fold],
            );
            assert_eq!(bot.decide(&view), Some(Action::Check));

            let view = view_for(
                1,
                "9h4s",
                "Ks7d2c",
                vec![ActionChoice::Call(10), ActionChoice::Fold],
            );
            assert_eq!(bot.decide(&view), Some(Action::Fold));
        }
    }

    #[test]
    fn test_decisions_are_always_offered() {
        let choices = vec![
            ActionChoice::Call(4),
            ActionChoice::Bet(8),
            ActionChoice::AllIn(100),
            ActionChoice::Fold,
        ];
        for seed in 0..50 {
            let mut bot = Bot::with_seed(1, BotStyle::Aggressive, seed);
            let view = view_for(1, "7h7s", "Ks7d2c", choices.clone());
            match bot.decide(&view).unwrap() {
                Action::Bet(chips) => assert!((8..=18).contains(&chips)),
                action => assert!(matches!(action, Action::Call)),
            }
        }
    }

    #[test]
    fn test_not_my_turn() {
        let mut bot = Bot::new(2, BotStyle::Standard);
        let view = view_for(1, "AhAs", "Ks7d2c", vec![ActionChoice::Check]);
        assert_eq!(bot.decide(&view), None);
    }
}
