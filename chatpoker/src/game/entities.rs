use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    Club,
    Diamond,
    Heart,
    Spade,
}

impl Suit {
    pub const ALL: [Self; 4] = [Self::Club, Self::Diamond, Self::Heart, Self::Spade];
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Club => "♣",
            Self::Diamond => "♦",
            Self::Heart => "♥",
            Self::Spade => "♠",
        };
        write!(f, "{repr}")
    }
}

/// Card values, deuce through ace. Aces only play low inside a wheel
/// straight, which the evaluator handles on its own.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[repr(u8)]
pub enum Value {
    Two = 2,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Value {
    pub const ALL: [Self; 13] = [
        Self::Two,
        Self::Three,
        Self::Four,
        Self::Five,
        Self::Six,
        Self::Seven,
        Self::Eight,
        Self::Nine,
        Self::Ten,
        Self::Jack,
        Self::Queen,
        Self::King,
        Self::Ace,
    ];

    /// Numeric strength of the value (2..=14).
    #[must_use]
    pub const fn rank(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Two => "2",
            Self::Three => "3",
            Self::Four => "4",
            Self::Five => "5",
            Self::Six => "6",
            Self::Seven => "7",
            Self::Eight => "8",
            Self::Nine => "9",
            Self::Ten => "T",
            Self::Jack => "J",
            Self::Queen => "Q",
            Self::King => "K",
            Self::Ace => "A",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card(pub Value, pub Suit);

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.0, self.1)
    }
}

#[derive(Debug, Error, Eq, PartialEq)]
pub enum CardParseError {
    #[error("expected two characters per card, got {0:?}")]
    Length(String),
    #[error("unknown card value {0:?}")]
    Value(char),
    #[error("unknown card suit {0:?}")]
    Suit(char),
}

impl FromStr for Card {
    type Err = CardParseError;

    /// Parses the two-character notation, e.g. `As`, `Td`, `7c`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (Some(value), Some(suit), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(CardParseError::Length(s.to_string()));
        };
        let value = match value.to_ascii_uppercase() {
            '2' => Value::Two,
            '3' => Value::Three,
            '4' => Value::Four,
            '5' => Value::Five,
            '6' => Value::Six,
            '7' => Value::Seven,
            '8' => Value::Eight,
            '9' => Value::Nine,
            'T' => Value::Ten,
            'J' => Value::Jack,
            'Q' => Value::Queen,
            'K' => Value::King,
            'A' => Value::Ace,
            other => return Err(CardParseError::Value(other)),
        };
        let suit = match suit.to_ascii_lowercase() {
            'c' => Suit::Club,
            'd' => Suit::Diamond,
            'h' => Suit::Heart,
            's' => Suit::Spade,
            other => return Err(CardParseError::Suit(other)),
        };
        Ok(Self(value, suit))
    }
}

/// Parse a run of concatenated cards such as `AsTd5c`.
pub fn parse_cards(names: &str) -> Result<Vec<Card>, CardParseError> {
    let chars: Vec<char> = names.chars().collect();
    if chars.len() % 2 != 0 {
        return Err(CardParseError::Length(names.to_string()));
    }
    chars
        .chunks(2)
        .map(|pair| pair.iter().collect::<String>().parse())
        .collect()
}

/// A 52-card deck. A fresh one is built for every hand.
#[derive(Clone, Debug)]
pub struct Deck {
    cards: Vec<Card>,
    pub deck_idx: usize,
}

impl Deck {
    /// Deck in a fixed, sorted order.
    #[must_use]
    pub fn ordered() -> Self {
        let cards = Value::ALL
            .into_iter()
            .flat_map(|value| Suit::ALL.into_iter().map(move |suit| Card(value, suit)))
            .collect();
        Self { cards, deck_idx: 0 }
    }

    #[must_use]
    pub fn shuffled() -> Self {
        let mut deck = Self::ordered();
        deck.shuffle();
        deck
    }

    /// Deck whose first cards are `top`, followed by every other card in
    /// sorted order. Duplicates in `top` are dropped.
    #[must_use]
    pub fn stacked(top: &[Card]) -> Self {
        let mut cards: Vec<Card> = Vec::with_capacity(52);
        for card in top {
            if !cards.contains(card) {
                cards.push(*card);
            }
        }
        for card in Self::ordered().cards {
            if !cards.contains(&card) {
                cards.push(card);
            }
        }
        Self { cards, deck_idx: 0 }
    }

    pub fn deal_card(&mut self) -> Option<Card> {
        let card = self.cards.get(self.deck_idx).copied()?;
        self.deck_idx += 1;
        Some(card)
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.cards.len() - self.deck_idx
    }

    pub fn shuffle(&mut self) {
        self.cards.shuffle(&mut rand::rng());
        self.deck_idx = 0;
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::ordered()
    }
}

/// Type alias for whole chips. Stacks, bets and pots are all counted in
/// whole chips.
pub type Chips = u32;

/// Type alias for seat positions at a table.
pub type SeatIndex = usize;

/// External identity of a player (chat user id).
pub type PlayerId = u64;

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Street {
    Preflop,
    Flop,
    Turn,
    River,
    /// No hand in progress.
    #[default]
    End,
}

impl fmt::Display for Street {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Preflop => "preflop",
            Self::Flop => "flop",
            Self::Turn => "turn",
            Self::River => "river",
            Self::End => "end",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Blinds {
    pub small: Chips,
    pub big: Chips,
    pub ante: Chips,
}

impl fmt::Display for Blinds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ante > 0 {
            write!(f, "{}/{} ante {}", self.small, self.big, self.ante)
        } else {
            write!(f, "{}/{}", self.small, self.big)
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Action {
    AllIn,
    /// Bet or raise to a total of this many chips for the street.
    Bet(Chips),
    Call,
    Check,
    Fold,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::AllIn => "goes all-in".to_string(),
            Self::Bet(amount) => format!("bets {amount}"),
            Self::Call => "calls".to_string(),
            Self::Check => "checks".to_string(),
            Self::Fold => "folds".to_string(),
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ActionChoice {
    /// All-in for a street total of this many chips.
    AllIn(Chips),
    /// Bet to a street total of at least this many chips.
    Bet(Chips),
    /// Call this many additional chips.
    Call(Chips),
    Check,
    Fold,
}

impl fmt::Display for ActionChoice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::AllIn(amount) => format!("all-in ({amount})"),
            Self::Bet(amount) => format!("bet (>= {amount})"),
            Self::Call(amount) => format!("call ({amount})"),
            Self::Check => "check".to_string(),
            Self::Fold => "fold".to_string(),
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ActionChoices(pub Vec<ActionChoice>);

impl ActionChoices {
    /// Whether `action` is one of the offered choices. Bet sizes are only
    /// checked against the minimum; the engine does the full validation.
    #[must_use]
    pub fn contains(&self, action: &Action) -> bool {
        self.0.iter().any(|choice| match (choice, action) {
            (ActionChoice::AllIn(_), Action::AllIn)
            | (ActionChoice::Call(_), Action::Call)
            | (ActionChoice::Check, Action::Check)
            | (ActionChoice::Fold, Action::Fold) => true,
            (ActionChoice::Bet(min), Action::Bet(amount)) => amount >= min,
            (ActionChoice::AllIn(total), Action::Bet(amount)) => amount >= total,
            _ => false,
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ActionChoices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let num_options = self.0.len();
        let repr = self
            .0
            .iter()
            .enumerate()
            .map(|(i, action_choice)| {
                let repr = action_choice.to_string();
                match i {
                    0 if num_options == 1 => repr,
                    0 if num_options == 2 => format!("{repr} "),
                    0 if num_options >= 3 => format!("{repr}, "),
                    i if i == num_options - 1 && num_options != 1 => format!("or {repr}"),
                    _ => format!("{repr}, "),
                }
            })
            .collect::<String>();
        write!(f, "{repr}")
    }
}

impl<I> From<I> for ActionChoices
where
    I: IntoIterator<Item = ActionChoice>,
{
    fn from(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Hand categories, weakest first.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum HandRank {
    HighCard,
    OnePair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
}

impl fmt::Display for HandRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::HighCard => "high card",
            Self::OnePair => "one pair",
            Self::TwoPair => "two pair",
            Self::ThreeOfAKind => "three of a kind",
            Self::Straight => "straight",
            Self::Flush => "flush",
            Self::FullHouse => "full house",
            Self::FourOfAKind => "four of a kind",
            Self::StraightFlush => "straight flush",
        };
        write!(f, "{repr}")
    }
}

/// Totally ordered hand strength. Higher wins, equal scores tie.
///
/// `values` holds the tie-break card ranks in significance order, padded
/// with zeros when fewer than five cards are known.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct HandScore {
    pub rank: HandRank,
    pub values: [u8; 5],
}

impl HandScore {
    #[must_use]
    pub const fn new(rank: HandRank, values: [u8; 5]) -> Self {
        Self { rank, values }
    }
}

impl fmt::Display for HandScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.rank.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_card_display() {
        assert_eq!(Card(Value::Ace, Suit::Spade).to_string(), "A♠");
        assert_eq!(Card(Value::Ten, Suit::Heart).to_string(), "T♥");
        assert_eq!(Card(Value::Two, Suit::Club).to_string(), "2♣");
    }

    #[test]
    fn test_card_from_str() {
        assert_eq!("As".parse::<Card>(), Ok(Card(Value::Ace, Suit::Spade)));
        assert_eq!("td".parse::<Card>(), Ok(Card(Value::Ten, Suit::Diamond)));
        assert_eq!("1s".parse::<Card>(), Err(CardParseError::Value('1')));
        assert_eq!("Ax".parse::<Card>(), Err(CardParseError::Suit('x')));
        assert!("Asd".parse::<Card>().is_err());
    }

    #[test]
    fn test_parse_cards_sequence() {
        let cards = parse_cards("AsTd5c").unwrap();
        assert_eq!(
            cards,
            vec![
                Card(Value::Ace, Suit::Spade),
                Card(Value::Ten, Suit::Diamond),
                Card(Value::Five, Suit::Club),
            ]
        );
        assert!(parse_cards("AsT").is_err());
    }

    #[test]
    fn test_value_ordering() {
        assert!(Value::Ace > Value::King);
        assert!(Value::Two < Value::Three);
        assert_eq!(Value::Ace.rank(), 14);
        assert_eq!(Value::Two.rank(), 2);
    }

    #[test]
    fn test_deck_has_52_unique_cards() {
        let mut deck = Deck::shuffled();
        let mut seen = HashSet::new();
        while let Some(card) = deck.deal_card() {
            assert!(seen.insert(card));
        }
        assert_eq!(seen.len(), 52);
        assert_eq!(deck.remaining(), 0);
    }

    #[test]
    fn test_deck_stacked_puts_top_cards_first() {
        let top = parse_cards("AsAhKd").unwrap();
        let mut deck = Deck::stacked(&top);
        assert_eq!(deck.remaining(), 52);
        assert_eq!(deck.deal_card(), Some(top[0]));
        assert_eq!(deck.deal_card(), Some(top[1]));
        assert_eq!(deck.deal_card(), Some(top[2]));
        let rest: HashSet<Card> = std::iter::from_fn(|| deck.deal_card()).collect();
        assert_eq!(rest.len(), 49);
        assert!(!rest.contains(&top[0]));
    }

    #[test]
    fn test_deck_shuffle_resets_index() {
        let mut deck = Deck::ordered();
        deck.deal_card();
        deck.deal_card();
        deck.shuffle();
        assert_eq!(deck.deck_idx, 0);
        assert_eq!(deck.remaining(), 52);
    }

    #[test]
    fn test_blinds_display() {
        let blinds = Blinds {
            small: 1,
            big: 2,
            ante: 0,
        };
        assert_eq!(blinds.to_string(), "1/2");
        let blinds = Blinds {
            small: 5,
            big: 10,
            ante: 1,
        };
        assert_eq!(blinds.to_string(), "5/10 ante 1");
    }

    #[test]
    fn test_action_choices_contains() {
        let choices = ActionChoices::from([
            ActionChoice::Call(4),
            ActionChoice::Bet(8),
            ActionChoice::AllIn(100),
            ActionChoice::Fold,
        ]);
        assert!(choices.contains(&Action::Call));
        assert!(choices.contains(&Action::Bet(8)));
        assert!(choices.contains(&Action::Bet(100)));
        assert!(!choices.contains(&Action::Bet(7)));
        assert!(!choices.contains(&Action::Check));
        assert!(choices.contains(&Action::AllIn));
    }

    #[test]
    fn test_action_choices_display() {
        let choices = ActionChoices::from([ActionChoice::Check]);
        assert_eq!(choices.to_string(), "check");
        let choices = ActionChoices::from([ActionChoice::Check, ActionChoice::Fold]);
        assert_eq!(choices.to_string(), "check or fold");
        let choices = ActionChoices::from([
            ActionChoice::Call(2),
            ActionChoice::Bet(4),
            ActionChoice::Fold,
        ]);
        assert_eq!(choices.to_string(), "call (2), bet (>= 4), or fold");
    }

    #[test]
    fn test_hand_score_ordering() {
        let pair = HandScore::new(HandRank::OnePair, [14, 13, 12, 11, 0]);
        let lower_pair = HandScore::new(HandRank::OnePair, [13, 14, 12, 11, 0]);
        let two_pair = HandScore::new(HandRank::TwoPair, [3, 2, 4, 0, 0]);
        assert!(two_pair > pair);
        assert!(pair > lower_pair);
        assert_eq!(pair, HandScore::new(HandRank::OnePair, [14, 13, 12, 11, 0]));
    }

    #[test]
    fn test_street_display() {
        assert_eq!(Street::Preflop.to_string(), "preflop");
        assert_eq!(Street::default(), Street::End);
    }
}
