//! Hand strength evaluation.
//!
//! The engine only needs a total order over hands, so evaluation is a
//! capability behind [`HandEvaluator`]. [`StandardEvaluator`] ranks the best
//! five-card holding out of two hole cards plus up to five board cards.

use super::entities::{Card, HandRank, HandScore, Suit};

/// Scores two hole cards against a shared board. Higher scores win and
/// equal scores tie.
pub trait HandEvaluator: Send + Sync {
    fn score(&self, hole: &[Card; 2], board: &[Card]) -> HandScore;
}

impl<F> HandEvaluator for F
where
    F: Fn(&[Card; 2], &[Card]) -> HandScore + Send + Sync,
{
    fn score(&self, hole: &[Card; 2], board: &[Card]) -> HandScore {
        self(hole, board)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct StandardEvaluator;

impl HandEvaluator for StandardEvaluator {
    fn score(&self, hole: &[Card; 2], board: &[Card]) -> HandScore {
        let mut cards = Vec::with_capacity(2 + board.len());
        cards.extend_from_slice(hole);
        cards.extend_from_slice(board);
        eval(&cards)
    }
}

/// Best-hand score of any number of cards (two to seven in practice).
#[must_use]
pub fn eval(cards: &[Card]) -> HandScore {
    // counts[r] for r in 2..=14
    let mut counts = [0u8; 15];
    for card in cards {
        counts[card.0.rank() as usize] += 1;
    }

    if let Some(flush) = flush_ranks(cards) {
        if let Some(high) = straight_high(&flush) {
            return HandScore::new(HandRank::StraightFlush, [high, 0, 0, 0, 0]);
        }
    }

    // Ranks grouped by multiplicity, highest rank first within a group.
    let by_count = |n: u8| -> Vec<u8> {
        (2..=14u8)
            .rev()
            .filter(|&r| counts[r as usize] == n)
            .collect()
    };
    let quads = by_count(4);
    let trips = by_count(3);
    let pairs = by_count(2);

    if let Some(&quad) = quads.first() {
        let kickers = top_kickers(&counts, &[quad], 1);
        return HandScore::new(HandRank::FourOfAKind, pad(&[&[quad], &kickers[..]]));
    }

    if let Some(&trip) = trips.first() {
        // A second set of trips plays as the pair.
        let pair = trips
            .iter()
            .skip(1)
            .chain(pairs.iter())
            .copied()
            .max();
        if let Some(pair) = pair {
            return HandScore::new(HandRank::FullHouse, [trip, pair, 0, 0, 0]);
        }
    }

    if let Some(flush) = flush_ranks(cards) {
        return HandScore::new(HandRank::Flush, pad(&[&flush[..flush.len().min(5)]]));
    }

    let distinct: Vec<u8> = (2..=14u8).rev().filter(|&r| counts[r as usize] > 0).collect();
    if let Some(high) = straight_high(&distinct) {
        return HandScore::new(HandRank::Straight, [high, 0, 0, 0, 0]);
    }

    if let Some(&trip) = trips.first() {
        let kickers = top_kickers(&counts, &[trip], 2);
        return HandScore::new(HandRank::ThreeOfAKind, pad(&[&[trip], &kickers[..]]));
    }

    if pairs.len() >= 2 {
        let (high, low) = (pairs[0], pairs[1]);
        let kickers = top_kickers(&counts, &[high, low], 1);
        return HandScore::new(HandRank::TwoPair, pad(&[&[high, low], &kickers[..]]));
    }

    if let Some(&pair) = pairs.first() {
        let kickers = top_kickers(&counts, &[pair], 3);
        return HandScore::new(HandRank::OnePair, pad(&[&[pair], &kickers[..]]));
    }

    HandScore::new(HandRank::HighCard, pad(&[&distinct[..distinct.len().min(5)]]))
}

/// Descending ranks of the flush suit, if any suit has five or more cards.
fn flush_ranks(cards: &[Card]) -> Option<Vec<u8>> {
    Suit::ALL.into_iter().find_map(|suit| {
        let mut ranks: Vec<u8> = cards
            .iter()
            .filter(|card| card.1 == suit)
            .map(|card| card.0.rank())
            .collect();
        if ranks.len() < 5 {
            return None;
        }
        ranks.sort_unstable_by(|a, b| b.cmp(a));
        Some(ranks)
    })
}

/// High card of the best straight in a set of descending, distinct ranks.
/// The ace also plays low for the wheel.
fn straight_high(ranks: &[u8]) -> Option<u8> {
    let mut present = [false; 15];
    for &r in ranks {
        present[r as usize] = true;
    }
    present[1] = present[14];
    (5..=14u8)
        .rev()
        .find(|&high| (high - 4..=high).all(|r| present[r as usize]))
}

/// Highest `n` ranks not in `exclude`, counting each rank once.
fn top_kickers(counts: &[u8; 15], exclude: &[u8], n: usize) -> Vec<u8> {
    (2..=14u8)
        .rev()
        .filter(|r| counts[*r as usize] > 0 && !exclude.contains(r))
        .take(n)
        .collect()
}

fn pad(parts: &[&[u8]]) -> [u8; 5] {
    let mut values = [0u8; 5];
    for (slot, value) in values.iter_mut().zip(parts.iter().flat_map(|p| p.iter())) {
        *slot = *value;
    }
    values
}
