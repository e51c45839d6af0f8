//! No-Limit Hold'em betting state machine.
//!
//! One [`Engine`] runs one table and has at most one hand in flight. It owns
//! stacks, per-street bets, the pot, the turn-order queue and street
//! progression. Who sits in which seat is the table session's business; the
//! engine only knows seat indices.
//!
//! Every mutating call either succeeds or returns an [`EngineError`] with the
//! engine left exactly as it was.

use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeSet, VecDeque},
    fmt,
    sync::Arc,
};
use thiserror::Error;

use super::{
    entities::{
        ActionChoice, ActionChoices, Blinds, Card, Chips, Deck, SeatIndex, Street,
    },
    eval::{HandEvaluator, StandardEvaluator},
    showdown::HandResult,
};

#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum EngineError {
    #[error("seat {0} is already taken")]
    SeatOccupied(SeatIndex),
    #[error("seat {0} is empty")]
    SeatNotOccupied(SeatIndex),
    #[error("seat {0} has no chips")]
    NoChips(SeatIndex),
    #[error("seat {0} does not exist")]
    InvalidSeat(SeatIndex),
    #[error("table can't hold more than {} chips", Chips::MAX)]
    ChipLimit,
    #[error("need 2+ players sitting in")]
    InsufficientPlayers,
    #[error("big blind can't cover the ante and blind")]
    ShortStack,
    #[error("not enough cards left in the deck")]
    DeckExhausted,
    #[error("a hand is already in progress")]
    HandInProgress,
    #[error("no hand in progress")]
    NoHandInProgress,
    #[error("illegal bet")]
    InvalidBet,
    #[error("nothing to call")]
    InvalidCall,
    #[error("can't check facing a bet")]
    InvalidCheck,
    #[error("showdown only happens on the river")]
    InvalidShowdown,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct EngineSettings {
    pub blinds: Blinds,
    pub seats: usize,
}

impl EngineSettings {
    #[must_use]
    pub const fn new(blinds: Blinds, seats: usize) -> Self {
        Self { blinds, seats }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::new(
            Blinds {
                small: 1,
                big: 2,
                ante: 0,
            },
            6,
        )
    }
}

/// Forced bets posted at the deal, kept for the blinds' preflop option.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct BlindPosts {
    pub small_seat: SeatIndex,
    pub small: Chips,
    pub big_seat: SeatIndex,
    pub big: Chips,
}

pub struct Engine {
    pub(super) settings: EngineSettings,
    pub(super) evaluator: Arc<dyn HandEvaluator>,
    deck: Deck,
    pub(super) stacks: Vec<Chips>,
    /// Chips committed by each seat on the current street.
    pub(super) current_bets: Vec<Chips>,
    /// Chips committed by each seat over the whole hand.
    pub(super) invested: Vec<Chips>,
    pub(super) hands: Vec<Option<[Card; 2]>>,
    pub(super) board: Vec<Card>,
    pub(super) pot: Chips,
    occupied_seats: BTreeSet<SeatIndex>,
    active_seats: BTreeSet<SeatIndex>,
    /// Seats still contesting the hand, ascending.
    pub(super) remaining_hands: Vec<SeatIndex>,
    /// Seats still owed a turn this lap, front acts next.
    action_permissions: VecDeque<SeatIndex>,
    pub(super) dealer: Option<SeatIndex>,
    bet_level: Chips,
    previous_raise: Chips,
    initial_bet: bool,
    pub(super) street: Street,
    blind_posts: Option<BlindPosts>,
    pub(super) last_result: Option<HandResult>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("settings", &self.settings)
            .field("street", &self.street)
            .field("stacks", &self.stacks)
            .field("current_bets", &self.current_bets)
            .field("pot", &self.pot)
            .field("board", &self.board)
            .field("remaining_hands", &self.remaining_hands)
            .field("action_permissions", &self.action_permissions)
            .field("dealer", &self.dealer)
            .finish_non_exhaustive()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineSettings::default())
    }
}

impl Engine {
    #[must_use]
    pub fn new(settings: EngineSettings) -> Self {
        Self::with_evaluator(settings, Arc::new(StandardEvaluator))
    }

    #[must_use]
    pub fn with_evaluator(settings: EngineSettings, evaluator: Arc<dyn HandEvaluator>) -> Self {
        let seats = settings.seats;
        Self {
            settings,
            evaluator,
            deck: Deck::default(),
            stacks: vec![0; seats],
            current_bets: vec![0; seats],
            invested: vec![0; seats],
            hands: vec![None; seats],
            board: Vec::with_capacity(5),
            pot: 0,
            occupied_seats: BTreeSet::new(),
            active_seats: BTreeSet::new(),
            remaining_hands: Vec::with_capacity(seats),
            action_permissions: VecDeque::with_capacity(seats),
            dealer: None,
            bet_level: 0,
            previous_raise: 0,
            initial_bet: true,
            street: Street::End,
            blind_posts: None,
            last_result: None,
        }
    }

    fn check_seat(&self, seat: SeatIndex) -> Result<(), EngineError> {
        if seat < self.settings.seats {
            Ok(())
        } else {
            Err(EngineError::InvalidSeat(seat))
        }
    }

    fn check_occupied(&self, seat: SeatIndex) -> Result<(), EngineError> {
        self.check_seat(seat)?;
        if self.occupied_seats.contains(&seat) {
            Ok(())
        } else {
            Err(EngineError::SeatNotOccupied(seat))
        }
    }

    // === Seat lifecycle ===

    pub fn buy_in(&mut self, seat: SeatIndex, stack: Chips) -> Result<(), EngineError> {
        self.check_seat(seat)?;
        if self.occupied_seats.contains(&seat) {
            return Err(EngineError::SeatOccupied(seat));
        }
        self.check_chip_limit(stack)?;
        self.stacks[seat] = stack;
        self.occupied_seats.insert(seat);
        debug!("seat {seat} bought in for {stack}");
        Ok(())
    }

    pub fn add_on(&mut self, seat: SeatIndex, amount: Chips) -> Result<(), EngineError> {
        self.check_occupied(seat)?;
        self.check_chip_limit(amount)?;
        self.stacks[seat] += amount;
        debug!("seat {seat} added {amount}");
        Ok(())
    }

    pub fn sit_in(&mut self, seat: SeatIndex) -> Result<(), EngineError> {
        self.check_occupied(seat)?;
        if self.stacks[seat] == 0 {
            return Err(EngineError::NoChips(seat));
        }
        self.active_seats.insert(seat);
        Ok(())
    }

    /// Stop dealing this seat in. A seat still contesting the current hand
    /// keeps playing it; callers fold it first if they want it out now.
    pub fn sit_out(&mut self, seat: SeatIndex) -> Result<(), EngineError> {
        self.check_seat(seat)?;
        self.active_seats.remove(&seat);
        Ok(())
    }

    /// Unbind a seat and hand back its stack.
    pub fn cash_out(&mut self, seat: SeatIndex) -> Result<Chips, EngineError> {
        self.check_occupied(seat)?;
        if self.is_in_hand(seat) {
            return Err(EngineError::HandInProgress);
        }
        let stack = std::mem::take(&mut self.stacks[seat]);
        self.hands[seat] = None;
        self.occupied_seats.remove(&seat);
        self.active_seats.remove(&seat);
        debug!("seat {seat} cashed out {stack}");
        Ok(stack)
    }

    /// Put the button on `seat`. Only allowed between hands.
    pub fn set_dealer(&mut self, seat: SeatIndex) -> Result<(), EngineError> {
        self.check_occupied(seat)?;
        if self.is_hand_in_progress() {
            return Err(EngineError::HandInProgress);
        }
        self.dealer = Some(seat);
        Ok(())
    }

    /// Move the button to the next active seat clockwise. Returns the new
    /// dealer, or `None` when no button has been assigned yet.
    pub fn advance_button(&mut self) -> Result<Option<SeatIndex>, EngineError> {
        if self.is_hand_in_progress() {
            return Err(EngineError::HandInProgress);
        }
        if let Some(dealer) = self.dealer {
            self.dealer = Some(self.next_active_after(dealer).unwrap_or(dealer));
        }
        Ok(self.dealer)
    }

    fn next_active_after(&self, seat: SeatIndex) -> Option<SeatIndex> {
        self.active_seats
            .range(seat + 1..)
            .chain(self.active_seats.range(..=seat))
            .next()
            .copied()
    }

    // === Dealing ===

    pub fn deal(&mut self) -> Result<(), EngineError> {
        self.deal_with_deck(Deck::shuffled())
    }

    /// Start a hand using `deck` as dealt, top card first. Hole cards go two
    /// at a time to each active seat in ascending order, then the board.
    pub fn deal_with_deck(&mut self, mut deck: Deck) -> Result<(), EngineError> {
        if self.is_hand_in_progress() {
            return Err(EngineError::HandInProgress);
        }
        let players: Vec<SeatIndex> = self.active_seats.iter().copied().collect();
        let num_players = players.len();
        if num_players < 2 {
            return Err(EngineError::InsufficientPlayers);
        }
        if deck.remaining() < 2 * num_players + 5 {
            return Err(EngineError::DeckExhausted);
        }

        // Everything up to the commit point below only reads state.
        let dealer = match self.dealer {
            Some(seat) if self.active_seats.contains(&seat) => seat,
            Some(seat) => self
                .next_active_after(seat)
                .ok_or(EngineError::InsufficientPlayers)?,
            None => players[rand::rng().random_range(0..num_players)],
        };
        let dealer_idx = players
            .iter()
            .position(|&seat| seat == dealer)
            .ok_or(EngineError::InsufficientPlayers)?;
        let (sb_idx, bb_idx, first_idx) = if num_players == 2 {
            (dealer_idx, (dealer_idx + 1) % 2, dealer_idx)
        } else {
            (
                (dealer_idx + 1) % num_players,
                (dealer_idx + 2) % num_players,
                (dealer_idx + 3) % num_players,
            )
        };
        let (sb_seat, bb_seat) = (players[sb_idx], players[bb_idx]);
        let Blinds { small, big, ante } = self.settings.blinds;
        let bb_after_ante = self.stacks[bb_seat]
            .checked_sub(ante)
            .filter(|&left| left >= 1)
            .ok_or(EngineError::ShortStack)?;
        let small_post = small.min(self.stacks[sb_seat]);
        let big_post = big.min(bb_after_ante);

        // Commit.
        self.dealer = Some(dealer);
        self.hands.fill(None);
        for &seat in &players {
            if let (Some(first), Some(second)) = (deck.deal_card(), deck.deal_card()) {
                self.hands[seat] = Some([first, second]);
            }
        }
        self.deck = deck;
        self.board.clear();
        self.pot = 0;
        self.current_bets.fill(0);
        self.invested.fill(0);
        self.remaining_hands = players;
        self.action_permissions.clear();
        self.street = Street::Preflop;
        self.initial_bet = true;
        self.bet_level = big;
        self.previous_raise = big;
        self.last_result = None;

        self.stacks[bb_seat] -= ante;
        self.pot += ante;
        self.invest(sb_seat, small_post);
        self.invest(bb_seat, big_post);
        self.blind_posts = Some(BlindPosts {
            small_seat: sb_seat,
            small: small_post,
            big_seat: bb_seat,
            big: big_post,
        });

        info!(
            "dealt {num_players} players, button on seat {dealer}, blinds {sb_seat}/{bb_seat}"
        );
        self.open_action(first_idx, true);
        if self.skip_exhausted() {
            self.next_street();
        }
        Ok(())
    }

    // === Turn order ===

    /// Queue every remaining seat not already owed a turn, clockwise from
    /// the seat at `reference` in `remaining_hands`. The reference seat is
    /// queued only when `include_reference` is set.
    fn open_action(&mut self, reference: usize, include_reference: bool) {
        let n = self.remaining_hands.len();
        if n == 0 {
            return;
        }
        let (start, count) = if include_reference {
            (reference, n)
        } else {
            (reference + 1, n - 1)
        };
        for offset in 0..count {
            let seat = self.remaining_hands[(start + offset) % n];
            if !self.action_permissions.contains(&seat) {
                self.action_permissions.push_back(seat);
            }
        }
    }

    /// Drop all-in seats from the front of the queue. Returns whether the
    /// street is over.
    fn skip_exhausted(&mut self) -> bool {
        while let Some(&seat) = self.action_permissions.front() {
            if self.stacks[seat] > 0 {
                break;
            }
            self.action_permissions.pop_front();
        }
        self.action_permissions.is_empty() || self.players_all_in()
    }

    fn action_forward(&mut self, reopen: bool) {
        if self.remaining_hands.len() == 1 {
            self.award_walkover();
            return;
        }
        let Some(actor) = self.action_permissions.pop_front() else {
            return;
        };
        if reopen {
            if let Some(idx) = self.remaining_hands.iter().position(|&seat| seat == actor) {
                self.open_action(idx, false);
            }
        }
        if self.skip_exhausted() {
            self.next_street();
        }
    }

    /// True once no further betting is possible: at most one contesting seat
    /// has chips behind, and that seat has already matched the largest
    /// commitment in the hand.
    #[must_use]
    pub fn players_all_in(&self) -> bool {
        let mut live = self
            .remaining_hands
            .iter()
            .copied()
            .filter(|&seat| self.stacks[seat] > 0);
        match (live.next(), live.next()) {
            (None, _) => true,
            (Some(seat), None) => {
                let max = self
                    .remaining_hands
                    .iter()
                    .map(|&s| self.invested[s])
                    .max()
                    .unwrap_or(0);
                self.invested[seat] >= max
            }
            _ => false,
        }
    }

    // === Streets ===

    fn next_street(&mut self) {
        loop {
            self.collect_bets();
            self.action_permissions.clear();
            match self.street {
                Street::Preflop => {
                    self.reveal(3);
                    self.street = Street::Flop;
                }
                Street::Flop => {
                    self.reveal(1);
                    self.street = Street::Turn;
                }
                Street::Turn => {
                    self.reveal(1);
                    self.street = Street::River;
                }
                Street::River => {
                    self.settle_showdown();
                    return;
                }
                Street::End => return,
            }
            debug!("{} dealt, pot {}", self.street, self.pot);

            let Some(first_idx) = self.first_to_act_idx() else {
                return;
            };
            self.open_action(first_idx, true);
            if !self.skip_exhausted() {
                return;
            }
        }
    }

    /// Move street bets into the pot and reset the betting round.
    pub(super) fn collect_bets(&mut self) {
        self.pot += self.current_bets.iter().sum::<Chips>();
        self.current_bets.fill(0);
        self.bet_level = 0;
        self.previous_raise = self.settings.blinds.big;
        self.initial_bet = true;
    }

    fn reveal(&mut self, count: usize) {
        for _ in 0..count {
            if let Some(card) = self.deck.deal_card() {
                self.board.push(card);
            }
        }
    }

    /// Clockwise distance from the button: the seat just left of the
    /// button is 0, the button itself is last.
    pub(super) fn distance_from_button(&self, seat: SeatIndex) -> usize {
        let n = self.settings.seats;
        let dealer = self.dealer.unwrap_or(n - 1);
        (seat + n - dealer - 1) % n
    }

    /// Index in `remaining_hands` of the first seat to act after the flop.
    fn first_to_act_idx(&self) -> Option<usize> {
        self.remaining_hands
            .iter()
            .enumerate()
            .min_by_key(|&(_, &seat)| self.distance_from_button(seat))
            .map(|(idx, _)| idx)
    }

    fn award_walkover(&mut self) {
        let winner = self.remaining_hands[0];
        let amount = self.pot + self.current_bets.iter().sum::<Chips>();
        self.stacks[winner] += amount;
        self.pot = 0;
        self.current_bets.fill(0);
        self.finish_hand(HandResult::walkover(winner, amount));
    }

    pub(super) fn finish_hand(&mut self, result: HandResult) {
        info!("hand over: {result}");
        self.street = Street::End;
        self.action_permissions.clear();
        self.blind_posts = None;
        let stacks = &self.stacks;
        self.active_seats.retain(|&seat| stacks[seat] > 0);
        self.last_result = Some(result);
    }

    fn invest(&mut self, seat: SeatIndex, amount: Chips) {
        self.stacks[seat] -= amount;
        self.current_bets[seat] += amount;
        self.invested[seat] += amount;
    }

    // === Betting ===

    /// Whether the acting seat may bet or raise.
    #[must_use]
    pub fn may_bet(&self) -> bool {
        let Some(actor) = self.acting_seat() else {
            return false;
        };
        self.initial_bet
            || self.has_blind_option(actor)
            || self.bet_level.saturating_sub(self.current_bets[actor]) >= self.previous_raise
    }

    /// A blind that has not acted voluntarily keeps the right to raise, even
    /// after a limp or a short all-in left it a small gap to close.
    fn has_blind_option(&self, seat: SeatIndex) -> bool {
        self.street == Street::Preflop
            && self.blind_posts.is_some_and(|posts| {
                (posts.small_seat == seat && self.current_bets[seat] == posts.small)
                    || (posts.big_seat == seat && self.current_bets[seat] == posts.big)
            })
    }

    /// Whether the acting seat has nothing to call.
    #[must_use]
    pub fn may_check(&self) -> bool {
        self.acting_seat()
            .is_some_and(|actor| self.current_bets[actor] == self.bet_level)
    }

    /// Bet or raise to a street total of `chips`. Amounts beyond the
    /// actor's stack are treated as all-in.
    pub fn bet(&mut self, chips: Chips) -> Result<(), EngineError> {
        let actor = self.acting_seat().ok_or(EngineError::InvalidBet)?;
        if !self.may_bet() || chips == 0 || chips <= self.bet_level {
            return Err(EngineError::InvalidBet);
        }
        let committed = self.current_bets[actor];
        let stack = self.stacks[actor];
        let wanted = chips - committed;
        let all_in = wanted >= stack;
        let min_raise_to = self.bet_level + self.previous_raise;
        if chips < min_raise_to && !all_in {
            return Err(EngineError::InvalidBet);
        }

        let additional = wanted.min(stack);
        let total = committed + additional;
        if total >= min_raise_to {
            self.previous_raise = total - self.bet_level;
        }
        let reopen = total > self.bet_level;
        self.bet_level = self.bet_level.max(total);
        self.initial_bet = false;
        self.invest(actor, additional);
        debug!("seat {actor} bets to {total}{}", if all_in { " (all-in)" } else { "" });
        self.action_forward(reopen);
        Ok(())
    }

    pub fn call(&mut self) -> Result<(), EngineError> {
        let actor = self.acting_seat().ok_or(EngineError::InvalidCall)?;
        if self.may_check() {
            return Err(EngineError::InvalidCall);
        }
        let amount = self.stacks[actor].min(self.bet_level - self.current_bets[actor]);
        self.invest(actor, amount);
        debug!("seat {actor} calls {amount}");
        self.action_forward(false);
        Ok(())
    }

    pub fn check(&mut self) -> Result<(), EngineError> {
        let actor = self.acting_seat().ok_or(EngineError::InvalidCheck)?;
        if self.current_bets[actor] != self.bet_level {
            return Err(EngineError::InvalidCheck);
        }
        debug!("seat {actor} checks");
        self.action_forward(false);
        Ok(())
    }

    pub fn fold(&mut self) -> Result<(), EngineError> {
        let actor = self.acting_seat().ok_or(EngineError::NoHandInProgress)?;
        self.pot += std::mem::take(&mut self.current_bets[actor]);
        self.remaining_hands.retain(|&seat| seat != actor);
        debug!("seat {actor} folds");
        self.action_forward(false);
        Ok(())
    }

    /// Legal choices for the acting seat; empty when nobody is to act.
    #[must_use]
    pub fn action_choices(&self) -> ActionChoices {
        let Some(actor) = self.acting_seat() else {
            return ActionChoices::default();
        };
        let committed = self.current_bets[actor];
        let stack = self.stacks[actor];
        let to_call = self.bet_level - committed;
        let mut choices = Vec::with_capacity(4);
        if to_call == 0 {
            choices.push(ActionChoice::Check);
        } else {
            choices.push(ActionChoice::Call(to_call.min(stack)));
        }
        let all_in_total = committed + stack;
        if self.may_bet() && all_in_total > self.bet_level {
            let min_raise_to = self.min_raise_to();
            if all_in_total > min_raise_to {
                choices.push(ActionChoice::Bet(min_raise_to));
            }
            choices.push(ActionChoice::AllIn(all_in_total));
        }
        choices.push(ActionChoice::Fold);
        ActionChoices(choices)
    }

    // === Queries ===

    #[must_use]
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    #[must_use]
    pub fn street(&self) -> Street {
        self.street
    }

    #[must_use]
    pub fn is_hand_in_progress(&self) -> bool {
        self.street != Street::End
    }

    /// Whether `seat` is still contesting the hand in progress.
    #[must_use]
    pub fn is_in_hand(&self, seat: SeatIndex) -> bool {
        self.is_hand_in_progress() && self.remaining_hands.contains(&seat)
    }

    #[must_use]
    pub fn acting_seat(&self) -> Option<SeatIndex> {
        if self.is_hand_in_progress() {
            self.action_permissions.front().copied()
        } else {
            None
        }
    }

    #[must_use]
    pub fn action_permissions(&self) -> Vec<SeatIndex> {
        self.action_permissions.iter().copied().collect()
    }

    #[must_use]
    pub fn remaining_hands(&self) -> &[SeatIndex] {
        &self.remaining_hands
    }

    #[must_use]
    pub fn occupied_seats(&self) -> Vec<SeatIndex> {
        self.occupied_seats.iter().copied().collect()
    }

    #[must_use]
    pub fn active_seats(&self) -> Vec<SeatIndex> {
        self.active_seats.iter().copied().collect()
    }

    #[must_use]
    pub fn is_occupied(&self, seat: SeatIndex) -> bool {
        self.occupied_seats.contains(&seat)
    }

    #[must_use]
    pub fn is_active(&self, seat: SeatIndex) -> bool {
        self.active_seats.contains(&seat)
    }

    #[must_use]
    pub fn dealer(&self) -> Option<SeatIndex> {
        self.dealer
    }

    #[must_use]
    pub fn blind_posts(&self) -> Option<BlindPosts> {
        self.blind_posts
    }

    #[must_use]
    pub fn board(&self) -> &[Card] {
        &self.board
    }

    #[must_use]
    pub fn pot(&self) -> Chips {
        self.pot
    }

    #[must_use]
    pub fn stack(&self, seat: SeatIndex) -> Chips {
        self.stacks.get(seat).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn stacks(&self) -> &[Chips] {
        &self.stacks
    }

    /// Chips `seat` has committed on the current street.
    #[must_use]
    pub fn current_bet(&self, seat: SeatIndex) -> Chips {
        self.current_bets.get(seat).copied().unwrap_or(0)
    }

    /// Chips `seat` has committed over the whole hand.
    #[must_use]
    pub fn invested(&self, seat: SeatIndex) -> Chips {
        self.invested.get(seat).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn hand(&self, seat: SeatIndex) -> Option<[Card; 2]> {
        self.hands.get(seat).copied().flatten()
    }

    #[must_use]
    pub fn current_bet_level(&self) -> Chips {
        self.bet_level
    }

    #[must_use]
    pub fn previous_raise(&self) -> Chips {
        self.previous_raise
    }

    #[must_use]
    pub fn is_initial_bet(&self) -> bool {
        self.initial_bet
    }

    /// Smallest street total that counts as a full raise.
    #[must_use]
    pub fn min_raise_to(&self) -> Chips {
        self.bet_level + self.previous_raise
    }

    #[must_use]
    pub fn to_call(&self, seat: SeatIndex) -> Chips {
        self.bet_level
            .saturating_sub(self.current_bet(seat))
            .min(self.stack(seat))
    }

    /// Stacks plus pot plus street bets. Constant through a hand.
    #[must_use]
    pub fn total_chips(&self) -> Chips {
        self.stacks.iter().sum::<Chips>() + self.pot + self.current_bets.iter().sum::<Chips>()
    }

    /// Chips at the table must fit in `Chips`, so every pot and stack sum does.
    fn check_chip_limit(&self, incoming: Chips) -> Result<(), EngineError> {
        let total = self
            .stacks
            .iter()
            .chain(&self.current_bets)
            .map(|&chips| u64::from(chips))
            .sum::<u64>()
            + u64::from(self.pot)
            + u64::from(incoming);
        if total > u64::from(Chips::MAX) {
            return Err(EngineError::ChipLimit);
        }
        Ok(())
    }

    #[must_use]
    pub fn last_result(&self) -> Option<&HandResult> {
        self.last_result.as_ref()
    }
}
