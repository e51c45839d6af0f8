//! Hand settlement.
//!
//! The pot is split into layers by each seat's total investment. Every layer
//! is contested by the seats that funded it and are still holding cards;
//! folded seats fund layers but never win them. Chips that no other seat
//! matched go back to whoever put them in.

use log::debug;
use serde::{Deserialize, Serialize};
use std::{collections::VecDeque, fmt};

use super::{
    engine::{Engine, EngineError},
    entities::{Card, Chips, HandScore, SeatIndex, Street},
};

/// One layer of the pot and how it was split.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PotAward {
    pub amount: Chips,
    pub contenders: Vec<SeatIndex>,
    /// Winning seats and their share, in odd-chip order.
    pub winners: Vec<(SeatIndex, Chips)>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RevealedHand {
    pub seat: SeatIndex,
    pub cards: [Card; 2],
    pub score: HandScore,
}

/// Outcome of a finished hand.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct HandResult {
    /// False when everyone else folded.
    pub showdown: bool,
    pub pots: Vec<PotAward>,
    /// Uncalled chips handed back to the seat that bet them.
    pub returned: Option<(SeatIndex, Chips)>,
    pub revealed: Vec<RevealedHand>,
    pub board: Vec<Card>,
}

impl HandResult {
    #[must_use]
    pub fn walkover(winner: SeatIndex, amount: Chips) -> Self {
        Self {
            showdown: false,
            pots: vec![PotAward {
                amount,
                contenders: vec![winner],
                winners: vec![(winner, amount)],
            }],
            returned: None,
            revealed: Vec::new(),
            board: Vec::new(),
        }
    }

    /// Seats that won at least one layer, ascending.
    #[must_use]
    pub fn winners(&self) -> Vec<SeatIndex> {
        let mut seats: Vec<SeatIndex> = self
            .pots
            .iter()
            .flat_map(|pot| pot.winners.iter().map(|&(seat, _)| seat))
            .collect();
        seats.sort_unstable();
        seats.dedup();
        seats
    }

    /// Total won by `seat` across all layers, not counting returned chips.
    #[must_use]
    pub fn winnings(&self, seat: SeatIndex) -> Chips {
        self.pots
            .iter()
            .flat_map(|pot| pot.winners.iter())
            .filter(|(s, _)| *s == seat)
            .map(|(_, amount)| amount)
            .sum()
    }

    #[must_use]
    pub fn total_awarded(&self) -> Chips {
        self.pots.iter().map(|pot| pot.amount).sum()
    }
}

impl fmt::Display for HandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = self
            .winners()
            .iter()
            .map(|&seat| format!("seat {seat} wins {}", self.winnings(seat)))
            .collect::<Vec<_>>()
            .join(", ");
        if self.showdown {
            write!(f, "{repr} at showdown")
        } else {
            write!(f, "{repr} uncontested")
        }
    }
}

impl Engine {
    /// Settle the hand on the river. Normally the engine does this on its
    /// own once the river betting closes.
    pub fn showdown(&mut self) -> Result<&HandResult, EngineError> {
        if self.street != Street::River {
            return Err(EngineError::InvalidShowdown);
        }
        self.settle_showdown();
        self.last_result.as_ref().ok_or(EngineError::NoHandInProgress)
    }

    pub(super) fn settle_showdown(&mut self) {
        self.collect_bets();

        let scores: Vec<(SeatIndex, [Card; 2], HandScore)> = self
            .remaining_hands
            .iter()
            .filter_map(|&seat| {
                let cards = self.hands[seat]?;
                Some((seat, cards, self.evaluator.score(&cards, &self.board)))
            })
            .collect();
        let score_of = |seat: SeatIndex| {
            scores
                .iter()
                .find(|(s, _, _)| *s == seat)
                .map(|(_, _, score)| *score)
        };

        // (seat, chips still unassigned), smallest investment first.
        let mut entries: Vec<(SeatIndex, Chips)> = (0..self.settings.seats)
            .filter(|&seat| self.invested[seat] > 0 || self.remaining_hands.contains(&seat))
            .map(|seat| (seat, self.invested[seat]))
            .collect();
        entries.sort_by_key(|&(seat, invested)| (invested, seat));
        let mut entries: VecDeque<(SeatIndex, Chips)> = entries.into();

        let mut ante = self.settings.blinds.ante;
        let mut pots = Vec::new();
        loop {
            while entries.len() > 1 && entries.front().is_some_and(|&(_, left)| left == 0) {
                entries.pop_front();
            }
            if entries.len() < 2 {
                break;
            }
            let level = entries[0].1;
            let amount = level * entries.len() as Chips + std::mem::take(&mut ante);
            for entry in entries.iter_mut() {
                entry.1 -= level;
            }

            let mut contenders: Vec<SeatIndex> = entries
                .iter()
                .map(|&(seat, _)| seat)
                .filter(|seat| self.remaining_hands.contains(seat))
                .collect();
            if contenders.is_empty() {
                contenders = self.remaining_hands.clone();
            }
            let best = contenders.iter().filter_map(|&seat| score_of(seat)).max();
            let mut winners: Vec<SeatIndex> = contenders
                .iter()
                .copied()
                .filter(|&seat| score_of(seat) == best)
                .collect();
            winners.sort_by_key(|&seat| self.distance_from_button(seat));
            let shares = self.split(amount, &winners);
            contenders.sort_unstable();
            debug!("pot layer of {amount} among {contenders:?} goes to {shares:?}");
            pots.push(PotAward {
                amount,
                contenders,
                winners: shares,
            });
        }

        let returned = entries
            .pop_front()
            .map(|(seat, excess)| (seat, excess + ante))
            .filter(|&(_, chips)| chips > 0);
        if let Some((seat, chips)) = returned {
            self.stacks[seat] += chips;
        }
        self.pot = 0;

        let mut revealed: Vec<RevealedHand> = scores
            .into_iter()
            .map(|(seat, cards, score)| RevealedHand { seat, cards, score })
            .collect();
        revealed.sort_by_key(|hand| self.distance_from_button(hand.seat));

        let result = HandResult {
            showdown: true,
            pots,
            returned,
            revealed,
            board: self.board.clone(),
        };
        self.finish_hand(result);
    }

    /// Pay `amount` to `winners` evenly. Leftover chips go one at a time in
    /// the order given.
    fn split(&mut self, amount: Chips, winners: &[SeatIndex]) -> Vec<(SeatIndex, Chips)> {
        if winners.is_empty() {
            return Vec::new();
        }
        let count = winners.len() as Chips;
        let share = amount / count;
        let mut odd = amount % count;
        winners
            .iter()
            .map(|&seat| {
                let extra = if odd > 0 {
                    odd -= 1;
                    1
                } else {
                    0
                };
                self.stacks[seat] += share + extra;
                (seat, share + extra)
            })
            .collect()
    }
}
