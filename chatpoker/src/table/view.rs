//! Read-only snapshots of a table for the messaging layer.

use serde::{Deserialize, Serialize};

use crate::game::{
    HandResult,
    entities::{ActionChoices, Blinds, Card, Chips, PlayerId, SeatIndex, Street},
};

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SeatView {
    pub seat: SeatIndex,
    pub player: Option<PlayerId>,
    pub stack: Chips,
    pub current_bet: Chips,
    pub sitting_in: bool,
    pub in_hand: bool,
    /// Only filled for the viewer's own seat.
    pub cards: Option<[Card; 2]>,
}

/// A winning seat of a finished hand.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Winner {
    pub seat: SeatIndex,
    pub player: Option<PlayerId>,
    pub amount: Chips,
}

/// Summary of a finished hand, kept in the table's recent history.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RecentHand {
    pub hand: u64,
    pub winners: Vec<Winner>,
    pub showdown: bool,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TableView {
    pub name: String,
    pub street: Street,
    pub blinds: Blinds,
    pub board: Vec<Card>,
    pub pot: Chips,
    pub dealer: Option<SeatIndex>,
    pub acting_seat: Option<SeatIndex>,
    pub seats: Vec<SeatView>,
    /// The viewer's legal choices, when it is the viewer's turn.
    pub action_choices: Option<ActionChoices>,
    pub last_result: Option<HandResult>,
    pub recent_hands: Vec<RecentHand>,
}

impl TableView {
    #[must_use]
    pub fn seat_of(&self, player: PlayerId) -> Option<&SeatView> {
        self.seats.iter().find(|seat| seat.player == Some(player))
    }
}
