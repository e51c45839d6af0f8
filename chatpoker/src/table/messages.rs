//! Table actor message types.

use tokio::sync::{mpsc, oneshot};

use super::{session::SessionError, view::TableView};
use crate::game::{
    HandResult,
    entities::{Action, Chips, PlayerId, SeatIndex},
};

pub type Reply<T> = oneshot::Sender<Result<T, SessionError>>;

/// Messages that can be sent to a TableActor
#[derive(Debug)]
pub enum TableMessage {
    BuyIn {
        player: PlayerId,
        seat: SeatIndex,
        chips: Chips,
        response: Reply<()>,
    },

    AddOn {
        player: PlayerId,
        chips: Chips,
        response: Reply<()>,
    },

    SitIn {
        player: PlayerId,
        response: Reply<()>,
    },

    /// Deferred until the hand ends if the seat is still in it
    SitOut {
        player: PlayerId,
        response: Reply<()>,
    },

    CashOut {
        player: PlayerId,
        response: Reply<Chips>,
    },

    StartHand {
        response: Reply<()>,
    },

    TakeAction {
        player: PlayerId,
        action: Action,
        response: Reply<()>,
    },

    /// Table snapshot as seen by `viewer`
    GetView {
        viewer: Option<PlayerId>,
        response: oneshot::Sender<TableView>,
    },

    Subscribe {
        subscriber: PlayerId,
        sender: mpsc::Sender<TableEvent>,
    },

    Unsubscribe {
        subscriber: PlayerId,
    },

    /// Internal: the time bank of the turn numbered `sequence` ran out
    Timeout { sequence: u64 },

    /// Cash everybody out and stop the actor
    Close {
        response: Reply<Vec<(PlayerId, Chips)>>,
    },
}

/// Notification pushed to subscribers when the table changes
#[derive(Clone, Debug, PartialEq)]
pub enum TableEvent {
    /// Someone bought in, added on, sat in or out, or left
    SeatsChanged,
    HandStarted { hand: u64 },
    ActionTaken { seat: SeatIndex, action: Action },
    /// The acting seat ran out of time and was acted for
    TimedOut { seat: SeatIndex, action: Action },
    HandFinished(HandResult),
    Closed,
}
