//! Table session: binds an engine to players and the chip ledger.
//!
//! The engine only knows seat indices. The session maps seats to players,
//! enforces buy-in limits against the ledger, defers sit-outs requested in
//! the middle of a hand and keeps a short history of finished hands.

use log::{debug, error, info, warn};
use std::{
    collections::{BTreeSet, VecDeque},
    sync::Arc,
};
use thiserror::Error;

use super::{
    config::{OptionsError, TableOptions},
    view::{RecentHand, SeatView, TableView, Winner},
};
use crate::{
    game::{
        Engine, EngineError, HandEvaluator,
        entities::{Action, Chips, Deck, PlayerId, SeatIndex},
    },
    ledger::{Ledger, LedgerError},
};

/// Number of finished hands kept for the view.
pub const RECENT_HANDS: usize = 5;

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum SessionError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("buy-in must be between {min} and {max} chips")]
    BuyInOutOfRange { min: Chips, max: Chips },
    #[error("stack can't exceed {max} chips")]
    StackLimit { max: Chips },
    #[error("need {required} chips, have {available}")]
    InsufficientChips { required: Chips, available: Chips },
    #[error("already seated at this table")]
    AlreadySeated,
    #[error("not seated at this table")]
    NotSeated,
    #[error("not your turn")]
    NotYourTurn,
    #[error("not while playing a hand")]
    SeatInHand,
}

pub struct TableSession {
    name: String,
    options: TableOptions,
    engine: Engine,
    ledger: Arc<dyn Ledger>,
    players: Vec<Option<PlayerId>>,
    pending_sit_outs: BTreeSet<SeatIndex>,
    hand_running: bool,
    hands_played: u64,
    recent_hands: VecDeque<RecentHand>,
}

impl TableSession {
    pub fn new(
        name: impl Into<String>,
        options: TableOptions,
        ledger: Arc<dyn Ledger>,
    ) -> Result<Self, OptionsError> {
        options.validate()?;
        let engine = Engine::new(options.engine_settings());
        Ok(Self::with_engine(name.into(), options, engine, ledger))
    }

    pub fn with_evaluator(
        name: impl Into<String>,
        options: TableOptions,
        ledger: Arc<dyn Ledger>,
        evaluator: Arc<dyn HandEvaluator>,
    ) -> Result<Self, OptionsError> {
        options.validate()?;
        let engine = Engine::with_evaluator(options.engine_settings(), evaluator);
        Ok(Self::with_engine(name.into(), options, engine, ledger))
    }

    fn with_engine(
        name: String,
        options: TableOptions,
        engine: Engine,
        ledger: Arc<dyn Ledger>,
    ) -> Self {
        let seats = options.seats;
        Self {
            name,
            options,
            engine,
            ledger,
            players: vec![None; seats],
            pending_sit_outs: BTreeSet::new(),
            hand_running: false,
            hands_played: 0,
            recent_hands: VecDeque::with_capacity(RECENT_HANDS),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    #[must_use]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    #[must_use]
    pub fn hands_played(&self) -> u64 {
        self.hands_played
    }

    pub fn recent_hands(&self) -> impl Iterator<Item = &RecentHand> {
        self.recent_hands.iter()
    }

    #[must_use]
    pub fn seat_of(&self, player: PlayerId) -> Option<SeatIndex> {
        self.players.iter().position(|p| *p == Some(player))
    }

    #[must_use]
    pub fn player_at(&self, seat: SeatIndex) -> Option<PlayerId> {
        self.players.get(seat).copied().flatten()
    }

    #[must_use]
    pub fn seated_players(&self) -> Vec<(SeatIndex, PlayerId)> {
        self.players
            .iter()
            .enumerate()
            .filter_map(|(seat, player)| player.map(|p| (seat, p)))
            .collect()
    }

    /// Player whose turn it is.
    #[must_use]
    pub fn acting_player(&self) -> Option<PlayerId> {
        self.engine.acting_seat().and_then(|seat| self.player_at(seat))
    }

    fn seat_for(&self, player: PlayerId) -> Result<SeatIndex, SessionError> {
        self.seat_of(player).ok_or(SessionError::NotSeated)
    }

    fn max_stack(&self) -> Chips {
        let largest = self.engine.stacks().iter().copied().max().unwrap_or(0);
        self.options.max_buy_in_chips(largest)
    }

    async fn debit(&self, player: PlayerId, chips: Chips) -> Result<(), SessionError> {
        let available = self.ledger.get_chips(player).await?;
        if available < chips {
            return Err(SessionError::InsufficientChips {
                required: chips,
                available,
            });
        }
        self.ledger.remove_chips(player, chips).await?;
        Ok(())
    }

    async fn refund(&self, player: PlayerId, chips: Chips) {
        if let Err(err) = self.ledger.add_chips(player, chips).await {
            error!("{}: failed to refund {chips} chips to {player}: {err}", self.name);
        }
    }

    // === Seats ===

    /// Take `seat` with `chips` from the player's ledger balance.
    pub async fn buy_in(
        &mut self,
        player: PlayerId,
        seat: SeatIndex,
        chips: Chips,
    ) -> Result<(), SessionError> {
        if self.seat_of(player).is_some() {
            return Err(SessionError::AlreadySeated);
        }
        if seat >= self.options.seats {
            return Err(EngineError::InvalidSeat(seat).into());
        }
        if self.engine.is_occupied(seat) {
            return Err(EngineError::SeatOccupied(seat).into());
        }
        let min = self.options.min_buy_in_chips();
        let max = self.max_stack();
        if !(min..=max).contains(&chips) {
            return Err(SessionError::BuyInOutOfRange { min, max });
        }

        self.debit(player, chips).await?;
        if let Err(err) = self.engine.buy_in(seat, chips) {
            self.refund(player, chips).await;
            return Err(err.into());
        }
        self.players[seat] = Some(player);
        info!("{}: player {player} bought in for {chips} at seat {seat}", self.name);
        Ok(())
    }

    /// Top up a seat's stack from the ledger.
    pub async fn add_on(&mut self, player: PlayerId, chips: Chips) -> Result<(), SessionError> {
        let seat = self.seat_for(player)?;
        if self.engine.is_in_hand(seat) {
            return Err(SessionError::SeatInHand);
        }
        if chips == 0 {
            return Err(LedgerError::InvalidAmount.into());
        }
        let max = self.max_stack();
        if self.engine.stack(seat).saturating_add(chips) > max {
            return Err(SessionError::StackLimit { max });
        }

        self.debit(player, chips).await?;
        if let Err(err) = self.engine.add_on(seat, chips) {
            self.refund(player, chips).await;
            return Err(err.into());
        }
        info!("{}: player {player} added {chips}", self.name);
        Ok(())
    }

    pub fn sit_in(&mut self, player: PlayerId) -> Result<(), SessionError> {
        let seat = self.seat_for(player)?;
        self.engine.sit_in(seat)?;
        self.pending_sit_outs.remove(&seat);
        Ok(())
    }

    /// Sit out now, or once the current hand ends if the seat is still in it.
    pub fn sit_out(&mut self, player: PlayerId) -> Result<(), SessionError> {
        let seat = self.seat_for(player)?;
        if self.engine.is_in_hand(seat) {
            debug!("{}: seat {seat} sits out after this hand", self.name);
            self.pending_sit_outs.insert(seat);
        } else {
            self.engine.sit_out(seat)?;
        }
        Ok(())
    }

    /// Leave the table, crediting the stack back to the ledger.
    pub async fn cash_out(&mut self, player: PlayerId) -> Result<Chips, SessionError> {
        let seat = self.seat_for(player)?;
        if self.engine.is_in_hand(seat) {
            return Err(SessionError::SeatInHand);
        }
        let stack = self.engine.stack(seat);
        if stack > 0 {
            self.ledger.add_chips(player, stack).await.inspect_err(|err| {
                error!("{}: cash-out of {stack} for {player} failed: {err}", self.name);
            })?;
        }
        self.engine.cash_out(seat)?;
        self.players[seat] = None;
        self.pending_sit_outs.remove(&seat);
        info!("{}: player {player} cashed out {stack}", self.name);
        Ok(stack)
    }

    /// Cash everybody out. Only possible between hands.
    pub async fn close(&mut self) -> Result<Vec<(PlayerId, Chips)>, SessionError> {
        if self.engine.is_hand_in_progress() {
            return Err(EngineError::HandInProgress.into());
        }
        let mut cashed = Vec::new();
        for (_, player) in self.seated_players() {
            let chips = self.cash_out(player).await?;
            cashed.push((player, chips));
        }
        Ok(cashed)
    }

    // === Hands ===

    pub fn start_hand(&mut self) -> Result<(), SessionError> {
        self.start_hand_with_deck(Deck::shuffled())
    }

    pub fn start_hand_with_deck(&mut self, deck: Deck) -> Result<(), SessionError> {
        self.engine.deal_with_deck(deck)?;
        self.hand_running = true;
        debug!("{}: hand {} dealt", self.name, self.hands_played + 1);
        self.after_action();
        Ok(())
    }

    pub fn act(&mut self, player: PlayerId, action: Action) -> Result<(), SessionError> {
        let seat = self.seat_for(player)?;
        if self.engine.acting_seat() != Some(seat) {
            return Err(SessionError::NotYourTurn);
        }
        self.apply(seat, action)?;
        self.after_action();
        Ok(())
    }

    /// Act for the seat whose time ran out: check if free, fold otherwise.
    pub fn auto_act(&mut self) -> Result<Option<(SeatIndex, Action)>, SessionError> {
        let Some(seat) = self.engine.acting_seat() else {
            return Ok(None);
        };
        let action = if self.engine.may_check() {
            Action::Check
        } else {
            Action::Fold
        };
        self.apply(seat, action)?;
        self.after_action();
        Ok(Some((seat, action)))
    }

    fn apply(&mut self, seat: SeatIndex, action: Action) -> Result<(), EngineError> {
        match action {
            Action::Bet(chips) => self.engine.bet(chips),
            Action::Call => self.engine.call(),
            Action::Check => self.engine.check(),
            Action::Fold => self.engine.fold(),
            Action::AllIn => {
                let total = self.engine.current_bet(seat) + self.engine.stack(seat);
                if total > self.engine.current_bet_level() && self.engine.may_bet() {
                    self.engine.bet(total)
                } else {
                    self.engine.call()
                }
            }
        }?;
        debug!("{}: seat {seat} {action}", self.name);
        Ok(())
    }

    fn after_action(&mut self) {
        if !self.hand_running || self.engine.is_hand_in_progress() {
            return;
        }
        self.hand_running = false;
        self.hands_played += 1;

        if let Some(result) = self.engine.last_result() {
            info!("{}: hand {} finished, {result}", self.name, self.hands_played);
            let winners = result
                .winners()
                .into_iter()
                .map(|seat| Winner {
                    seat,
                    player: self.player_at(seat),
                    amount: result.winnings(seat),
                })
                .collect();
            self.recent_hands.push_back(RecentHand {
                hand: self.hands_played,
                winners,
                showdown: result.showdown,
            });
            while self.recent_hands.len() > RECENT_HANDS {
                self.recent_hands.pop_front();
            }
        }

        for seat in std::mem::take(&mut self.pending_sit_outs) {
            if let Err(err) = self.engine.sit_out(seat) {
                warn!("{}: deferred sit-out of seat {seat} failed: {err}", self.name);
            }
        }
        match self.engine.advance_button() {
            Ok(Some(dealer)) => debug!("{}: button moves to seat {dealer}", self.name),
            Ok(None) => {}
            Err(err) => warn!("{}: button did not move: {err}", self.name),
        }
    }

    // === Rendering ===

    /// Snapshot of the table as `viewer` may see it.
    #[must_use]
    pub fn view(&self, viewer: Option<PlayerId>) -> TableView {
        let viewer_seat = viewer.and_then(|player| self.seat_of(player));
        let seats = (0..self.options.seats)
            .map(|seat| SeatView {
                seat,
                player: self.player_at(seat),
                stack: self.engine.stack(seat),
                current_bet: self.engine.current_bet(seat),
                sitting_in: self.engine.is_active(seat),
                in_hand: self.engine.is_in_hand(seat),
                cards: if viewer_seat == Some(seat) {
                    self.engine.hand(seat)
                } else {
                    None
                },
            })
            .collect();
        let acting_seat = self.engine.acting_seat();
        TableView {
            name: self.name.clone(),
            street: self.engine.street(),
            blinds: self.options.blinds(),
            board: self.engine.board().to_vec(),
            pot: self.engine.pot(),
            dealer: self.engine.dealer(),
            acting_seat,
            seats,
            action_choices: viewer_seat
                .filter(|&seat| acting_seat == Some(seat))
                .map(|_| self.engine.action_choices()),
            last_result: self.engine.last_result().cloned(),
            recent_hands: self.recent_hands.iter().cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{game::entities::Street, ledger::MemoryLedger};

    async fn session_with(players: &[(PlayerId, Chips)]) -> (TableSession, Arc<MemoryLedger>) {
        let ledger = Arc::new(MemoryLedger::default());
        let mut session = TableSession::new("test", TableOptions::default(), ledger.clone()).unwrap();
        for (seat, &(player, chips)) in players.iter().enumerate() {
            ledger.add_chips(player, chips).await.unwrap();
            session.buy_in(player, seat, chips).await.unwrap();
            session.sit_in(player).unwrap();
        }
        (session, ledger)
    }

    fn play_out(session: &mut TableSession) {
        while session.engine().is_hand_in_progress() {
            session.auto_act().unwrap();
        }
    }

    #[tokio::test]
    async fn test_buy_in_limits_and_ledger_debit() {
        let ledger = Arc::new(MemoryLedger::default());
        ledger.add_chips(1, 150).await.unwrap();
        let mut session = TableSession::new("t", TableOptions::default(), ledger.clone()).unwrap();

        assert_eq!(
            session.buy_in(1, 0, 30).await,
            Err(SessionError::BuyInOutOfRange { min: 40, max: 200 })
        );
        assert_eq!(
            session.buy_in(1, 0, 201).await,
            Err(SessionError::BuyInOutOfRange { min: 40, max: 200 })
        );
        assert_eq!(
            session.buy_in(1, 0, 160).await,
            Err(SessionError::InsufficientChips {
                required: 160,
                available: 150
            })
        );
        assert_eq!(
            session.buy_in(1, 6, 100).await,
            Err(SessionError::Engine(EngineError::InvalidSeat(6)))
        );

        session.buy_in(1, 0, 100).await.unwrap();
        assert_eq!(ledger.get_chips(1).await, Ok(50));
        assert_eq!(session.seat_of(1), Some(0));
        assert_eq!(session.buy_in(1, 1, 40).await, Err(SessionError::AlreadySeated));

        ledger.add_chips(2, 100).await.unwrap();
        assert_eq!(
            session.buy_in(2, 0, 100).await,
            Err(SessionError::Engine(EngineError::SeatOccupied(0)))
        );
        assert_eq!(ledger.get_chips(2).await, Ok(100));
    }

    #[tokio::test]
    async fn test_add_on_capped_at_max_stack() {
        let ledger = Arc::new(MemoryLedger::default());
        let mut session = TableSession::new("t", TableOptions::default(), ledger.clone()).unwrap();
        ledger.add_chips(1, 1000).await.unwrap();
        session.buy_in(1, 0, 150).await.unwrap();
        assert_eq!(
            session.add_on(1, 51).await,
            Err(SessionError::StackLimit { max: 200 })
        );
        session.add_on(1, 50).await.unwrap();
        assert_eq!(session.engine().stack(0), 200);
        assert_eq!(ledger.get_chips(1).await, Ok(800));
        assert_eq!(session.add_on(2, 10).await, Err(SessionError::NotSeated));
    }

    #[tokio::test]
    async fn test_add_on_rejected_in_hand() {
        let (mut session, ledger) = session_with(&[(1, 100), (2, 100)]).await;
        ledger.add_chips(1, 50).await.unwrap();
        session.add_on(1, 50).await.unwrap();
        assert_eq!(session.engine().stack(0), 150);
        assert_eq!(ledger.get_chips(1).await, Ok(0));

        session.start_hand().unwrap();
        assert_eq!(session.add_on(2, 10).await, Err(SessionError::SeatInHand));
    }

    #[tokio::test]
    async fn test_turn_checks() {
        let (mut session, _) = session_with(&[(1, 100), (2, 100), (3, 100)]).await;
        session.start_hand().unwrap();
        let acting = session.acting_player().unwrap();
        let waiting = [1, 2, 3].into_iter().find(|&p| p != acting).unwrap();
        assert_eq!(session.act(waiting, Action::Call), Err(SessionError::NotYourTurn));
        assert_eq!(session.act(99, Action::Call), Err(SessionError::NotSeated));
        assert_eq!(
            session.act(acting, Action::Check),
            Err(SessionError::Engine(EngineError::InvalidCheck))
        );
        session.act(acting, Action::Call).unwrap();
        assert_ne!(session.acting_player(), Some(acting));
    }

    #[tokio::test]
    async fn test_all_in_resolves_to_bet_then_call() {
        let (mut session, _) = session_with(&[(1, 100), (2, 60)]).await;
        session.start_hand().unwrap();
        let first = session.acting_player().unwrap();
        session.act(first, Action::AllIn).unwrap();
        let second = session.acting_player().unwrap();
        session.act(second, Action::AllIn).unwrap();

        assert_eq!(session.engine().street(), Street::End);
        assert_eq!(session.engine().total_chips(), 160);
        assert_eq!(session.hands_played(), 1);
        assert!(session.engine().last_result().unwrap().showdown);
    }

    #[tokio::test]
    async fn test_sit_out_mid_hand_is_deferred() {
        let (mut session, _) = session_with(&[(1, 100), (2, 100), (3, 100)]).await;
        session.start_hand().unwrap();
        let player = session.acting_player().unwrap();
        let seat = session.seat_of(player).unwrap();
        session.sit_out(player).unwrap();
        assert!(session.engine().is_active(seat));
        assert!(session.engine().is_in_hand(seat));

        play_out(&mut session);
        assert!(!session.engine().is_active(seat));
        assert!(session.engine().is_occupied(seat));
    }

    #[tokio::test]
    async fn test_cash_out_waits_for_fold() {
        let (mut session, ledger) = session_with(&[(1, 100), (2, 100), (3, 100)]).await;
        session.start_hand().unwrap();
        let player = session.acting_player().unwrap();
        assert_eq!(session.cash_out(player).await, Err(SessionError::SeatInHand));

        session.act(player, Action::Fold).unwrap();
        let chips = session.cash_out(player).await.unwrap();
        assert_eq!(ledger.get_chips(player).await, Ok(chips));
        assert_eq!(session.seat_of(player), None);
    }

    #[tokio::test]
    async fn test_newcomer_does_not_see_mucked_cards() {
        let (mut session, ledger) = session_with(&[(1, 100), (2, 100), (3, 100)]).await;
        session.start_hand().unwrap();
        let player = session.acting_player().unwrap();
        let seat = session.seat_of(player).unwrap();
        session.act(player, Action::Fold).unwrap();
        session.cash_out(player).await.unwrap();

        ledger.add_chips(99, 100).await.unwrap();
        session.buy_in(99, seat, 100).await.unwrap();
        assert!(session.engine().is_hand_in_progress());
        let view = session.view(Some(99));
        assert_eq!(view.seat_of(99).unwrap().cards, None);
        assert!(!view.seat_of(99).unwrap().in_hand);
    }

    #[tokio::test]
    async fn test_history_and_button_rotation() {
        let (mut session, _) = session_with(&[(1, 100), (2, 100), (3, 100)]).await;
        for hand in 1..=7 {
            session.start_hand().unwrap();
            let dealer = session.engine().dealer().unwrap();
            play_out(&mut session);
            assert_eq!(session.hands_played(), hand);
            assert_eq!(session.engine().dealer(), Some((dealer + 1) % 3));
        }
        let hands: Vec<u64> = session.recent_hands().map(|h| h.hand).collect();
        assert_eq!(hands, vec![3, 4, 5, 6, 7]);
        assert_eq!(session.engine().total_chips(), 300);
    }

    #[tokio::test]
    async fn test_view_hides_other_hands() {
        let (mut session, _) = session_with(&[(1, 100), (2, 100)]).await;
        session.start_hand().unwrap();
        let acting = session.acting_player().unwrap();
        let other = if acting == 1 { 2 } else { 1 };

        let view = session.view(Some(acting));
        assert!(view.seat_of(acting).unwrap().cards.is_some());
        assert!(view.seat_of(other).unwrap().cards.is_none());
        assert!(view.action_choices.is_some());
        assert_eq!(view.street, Street::Preflop);

        let view = session.view(Some(other));
        assert!(view.action_choices.is_none());
        let view = session.view(None);
        assert!(view.seats.iter().all(|seat| seat.cards.is_none()));
        let json = serde_json::to_string(&view).unwrap();
        assert!(json.contains("\"street\":\"Preflop\""));
    }

    #[tokio::test]
    async fn test_close_cashes_everyone_out() {
        let (mut session, ledger) = session_with(&[(1, 100), (2, 100)]).await;
        session.start_hand().unwrap();
        assert_eq!(
            session.close().await,
            Err(SessionError::Engine(EngineError::HandInProgress))
        );
        play_out(&mut session);
        let cashed = session.close().await.unwrap();
        assert_eq!(cashed.iter().map(|(_, chips)| chips).sum::<Chips>(), 200);
        assert_eq!(ledger.total_balance().await, 200);
        assert!(session.seated_players().is_empty());
    }
}
