//! Table actor implementation with async message handling.

use log::{debug, info, warn};
use std::collections::HashMap;
use tokio::{
    sync::{mpsc, oneshot},
    time::sleep,
};

use super::{
    manager::ManagerError,
    messages::{TableEvent, TableMessage},
    session::TableSession,
    view::TableView,
};
use crate::{
    game::entities::{Action, Chips, PlayerId, SeatIndex},
    ledger::TableKey,
};

/// Inbox capacity of a table actor.
pub const INBOX_CAPACITY: usize = 100;

/// Table actor handle for sending messages
#[derive(Clone, Debug)]
pub struct TableHandle {
    sender: mpsc::Sender<TableMessage>,
    key: TableKey,
}

impl TableHandle {
    pub fn new(sender: mpsc::Sender<TableMessage>, key: TableKey) -> Self {
        Self { sender, key }
    }

    #[must_use]
    pub fn key(&self) -> &TableKey {
        &self.key
    }

    /// Whether the actor behind this handle has stopped.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    pub async fn send(&self, message: TableMessage) -> Result<(), ManagerError> {
        self.sender
            .send(message)
            .await
            .map_err(|_| ManagerError::TableClosed(self.key.clone()))
    }

    /// Send a message built around a fresh response channel and wait for
    /// the actor's answer.
    pub async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> TableMessage,
    ) -> Result<T, ManagerError> {
        let (tx, rx) = oneshot::channel();
        self.send(build(tx)).await?;
        rx.await
            .map_err(|_| ManagerError::TableClosed(self.key.clone()))
    }

    pub async fn buy_in(
        &self,
        player: PlayerId,
        seat: SeatIndex,
        chips: Chips,
    ) -> Result<(), ManagerError> {
        self.request(|response| TableMessage::BuyIn {
            player,
            seat,
            chips,
            response,
        })
        .await??;
        Ok(())
    }

    pub async fn add_on(&self, player: PlayerId, chips: Chips) -> Result<(), ManagerError> {
        self.request(|response| TableMessage::AddOn {
            player,
            chips,
            response,
        })
        .await??;
        Ok(())
    }

    pub async fn sit_in(&self, player: PlayerId) -> Result<(), ManagerError> {
        self.request(|response| TableMessage::SitIn { player, response })
            .await??;
        Ok(())
    }

    pub async fn sit_out(&self, player: PlayerId) -> Result<(), ManagerError> {
        self.request(|response| TableMessage::SitOut { player, response })
            .await??;
        Ok(())
    }

    pub async fn cash_out(&self, player: PlayerId) -> Result<Chips, ManagerError> {
        Ok(self
            .request(|response| TableMessage::CashOut { player, response })
            .await??)
    }

    pub async fn start_hand(&self) -> Result<(), ManagerError> {
        self.request(|response| TableMessage::StartHand { response })
            .await??;
        Ok(())
    }

    pub async fn act(&self, player: PlayerId, action: Action) -> Result<(), ManagerError> {
        self.request(|response| TableMessage::TakeAction {
            player,
            action,
            response,
        })
        .await??;
        Ok(())
    }

    pub async fn view(&self, viewer: Option<PlayerId>) -> Result<TableView, ManagerError> {
        self.request(|response| TableMessage::GetView { viewer, response })
            .await
    }

    /// Register for table events. Capacity bounds how many undelivered
    /// events are buffered before new ones are dropped.
    pub async fn subscribe(
        &self,
        subscriber: PlayerId,
        capacity: usize,
    ) -> Result<mpsc::Receiver<TableEvent>, ManagerError> {
        let (sender, receiver) = mpsc::channel(capacity);
        self.send(TableMessage::Subscribe { subscriber, sender })
            .await?;
        Ok(receiver)
    }

    pub async fn unsubscribe(&self, subscriber: PlayerId) -> Result<(), ManagerError> {
        self.send(TableMessage::Unsubscribe { subscriber }).await
    }

    pub async fn close(&self) -> Result<Vec<(PlayerId, Chips)>, ManagerError> {
        Ok(self
            .request(|response| TableMessage::Close { response })
            .await??)
    }
}

/// Actor owning a single table session. Every mutation of the table goes
/// through its inbox, one message at a time.
pub struct TableActor {
    key: TableKey,
    session: TableSession,
    inbox: mpsc::Receiver<TableMessage>,
    /// Timers hold a weak sender so pending timeouts never keep the inbox open.
    timer_sender: mpsc::WeakSender<TableMessage>,
    /// Bumped whenever the turn changes; a timeout for an older turn is stale.
    sequence: u64,
    subscribers: HashMap<PlayerId, mpsc::Sender<TableEvent>>,
    is_closed: bool,
}

impl TableActor {
    /// Create a new table actor
    ///
    /// # Arguments
    ///
    /// * `key` - Owner and name of the table
    /// * `session` - Session the actor drives
    ///
    /// # Returns
    ///
    /// * `(TableActor, TableHandle)` - Actor and handle for sending messages
    pub fn new(key: TableKey, session: TableSession) -> (Self, TableHandle) {
        let (sender, inbox) = mpsc::channel(INBOX_CAPACITY);
        let actor = Self {
            key: key.clone(),
            session,
            inbox,
            timer_sender: sender.downgrade(),
            sequence: 0,
            subscribers: HashMap::new(),
            is_closed: false,
        };
        (actor, TableHandle::new(sender, key))
    }

    /// Run the table actor event loop
    pub async fn run(mut self) {
        info!("table {} open ({})", self.key, self.session.options());

        while let Some(message) = self.inbox.recv().await {
            self.handle_message(message).await;
            if self.is_closed {
                break;
            }
        }

        let seated = self.session.seated_players().len();
        if !self.is_closed && seated > 0 {
            warn!("table {} dropped with {seated} players still seated", self.key);
        }
        info!("table {} closed", self.key);
    }

    async fn handle_message(&mut self, message: TableMessage) {
        match message {
            TableMessage::BuyIn {
                player,
                seat,
                chips,
                response,
            } => {
                let result = self.session.buy_in(player, seat, chips).await;
                if result.is_ok() {
                    self.notify(TableEvent::SeatsChanged);
                }
                let _ = response.send(result);
            }

            TableMessage::AddOn {
                player,
                chips,
                response,
            } => {
                let result = self.session.add_on(player, chips).await;
                if result.is_ok() {
                    self.notify(TableEvent::SeatsChanged);
                }
                let _ = response.send(result);
            }

            TableMessage::SitIn { player, response } => {
                let result = self.session.sit_in(player);
                if result.is_ok() {
                    self.notify(TableEvent::SeatsChanged);
                }
                let _ = response.send(result);
            }

            TableMessage::SitOut { player, response } => {
                let result = self.session.sit_out(player);
                if result.is_ok() {
                    self.notify(TableEvent::SeatsChanged);
                }
                let _ = response.send(result);
            }

            TableMessage::CashOut { player, response } => {
                let result = self.session.cash_out(player).await;
                if result.is_ok() {
                    self.notify(TableEvent::SeatsChanged);
                }
                let _ = response.send(result);
            }

            TableMessage::StartHand { response } => {
                let hands_before = self.session.hands_played();
                let result = self.session.start_hand();
                if result.is_ok() {
                    self.notify(TableEvent::HandStarted {
                        hand: hands_before + 1,
                    });
                    self.turn_changed(hands_before);
                }
                let _ = response.send(result);
            }

            TableMessage::TakeAction {
                player,
                action,
                response,
            } => {
                let hands_before = self.session.hands_played();
                let seat = self.session.seat_of(player);
                let result = self.session.act(player, action);
                if result.is_ok()
                    && let Some(seat) = seat
                {
                    self.notify(TableEvent::ActionTaken { seat, action });
                    self.turn_changed(hands_before);
                }
                let _ = response.send(result);
            }

            TableMessage::GetView { viewer, response } => {
                let _ = response.send(self.session.view(viewer));
            }

            TableMessage::Subscribe { subscriber, sender } => {
                self.subscribers.insert(subscriber, sender);
                debug!("{subscriber} subscribed to table {}", self.key);
            }

            TableMessage::Unsubscribe { subscriber } => {
                self.subscribers.remove(&subscriber);
                debug!("{subscriber} unsubscribed from table {}", self.key);
            }

            TableMessage::Timeout { sequence } => self.handle_timeout(sequence),

            TableMessage::Close { response } => {
                let result = self.session.close().await;
                if result.is_ok() {
                    self.is_closed = true;
                    self.notify(TableEvent::Closed);
                }
                let _ = response.send(result);
            }
        }
    }

    fn handle_timeout(&mut self, sequence: u64) {
        if sequence != self.sequence {
            warn!(
                "table {}: ignoring stale timeout {sequence} (current {})",
                self.key, self.sequence
            );
            return;
        }
        let hands_before = self.session.hands_played();
        match self.session.auto_act() {
            Ok(Some((seat, action))) => {
                debug!("table {}: seat {seat} timed out, {action}", self.key);
                self.notify(TableEvent::TimedOut { seat, action });
                self.turn_changed(hands_before);
            }
            Ok(None) => debug!("table {}: timeout with nobody to act", self.key),
            Err(err) => warn!("table {}: timeout action failed: {err}", self.key),
        }
    }

    /// Report a finished hand and arm the time bank for whoever acts next.
    fn turn_changed(&mut self, hands_before: u64) {
        if self.session.hands_played() > hands_before
            && let Some(result) = self.session.engine().last_result()
        {
            let event = TableEvent::HandFinished(result.clone());
            self.notify(event);
        }

        self.sequence += 1;
        let Some(duration) = self.session.options().time_bank.duration() else {
            return;
        };
        if self.session.engine().acting_seat().is_none() {
            return;
        }

        let sequence = self.sequence;
        let timer_sender = self.timer_sender.clone();
        tokio::spawn(async move {
            sleep(duration).await;
            if let Some(sender) = timer_sender.upgrade() {
                let _ = sender.send(TableMessage::Timeout { sequence }).await;
            }
        });
    }

    /// Broadcast an event, dropping subscribers that went away.
    fn notify(&mut self, event: TableEvent) {
        let key = &self.key;
        self.subscribers
            .retain(|subscriber, sender| match sender.try_send(event.clone()) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!("table {key}: subscriber {subscriber} lagging, event dropped");
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    debug!("table {key}: subscriber {subscriber} gone");
                    false
                }
            });
    }
}
