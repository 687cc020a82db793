//! Room worker driving one room through its rounds.
//!
//! A worker owns the connections of every session seated in its room and
//! processes seats strictly in ascending order. The only state it shares
//! with other tasks is the [`Directory`].

use std::{fmt, sync::Arc, task::Poll};
use tokio::sync::mpsc;

use super::{
    config::RoomConfig,
    directory::{Directory, DirectoryError, SessionId},
    messages::RoomMessage,
};
use crate::{
    game::{
        entities::{Card, Hand, SeatIndex, Shoe, Usd},
        functional,
    },
    net::{
        connection::Connection,
        errors::ConnectionError,
        messages::{Action, decode_amount},
        snapshot::{SeatView, Snapshot},
    },
};

/// Room worker handle for sending messages
#[derive(Clone, Debug)]
pub struct RoomHandle {
    sender: mpsc::Sender<RoomMessage>,
    name: String,
}

impl RoomHandle {
    pub fn new(sender: mpsc::Sender<RoomMessage>, name: String) -> Self {
        Self { sender, name }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Send a message to the room worker
    pub async fn send(&self, message: RoomMessage) -> Result<(), DirectoryError> {
        self.sender
            .send(message)
            .await
            .map_err(|_| DirectoryError::RoomGone(self.name.clone()))
    }
}

/// Round state machine.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RoomState {
    WaitingForSeats,
    Betting,
    Dealing,
    PlayerTurn(SeatIndex),
    DealerTurn,
    Payout,
    Discard,
    Closed,
}

impl fmt::Display for RoomState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WaitingForSeats => write!(f, "waiting for seats"),
            Self::Betting => write!(f, "betting"),
            Self::Dealing => write!(f, "dealing"),
            Self::PlayerTurn(seat) => write!(f, "seat {seat}'s turn"),
            Self::DealerTurn => write!(f, "dealer's turn"),
            Self::Payout => write!(f, "payout"),
            Self::Discard => write!(f, "discard"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// A seated session.
#[derive(Debug)]
struct Session {
    id: SessionId,
    connection: Connection,
    money: Usd,
    bet: Usd,
    hand: Hand,
    hidden: Option<Card>,
    stood: bool,
    busted: bool,
}

impl Session {
    fn new(id: SessionId, connection: Connection, money: Usd) -> Self {
        Self {
            id,
            connection,
            money,
            bet: 0,
            hand: Hand::new(),
            hidden: None,
            stood: false,
            busted: false,
        }
    }

    fn view(&self) -> SeatView {
        SeatView {
            money: Some(self.money),
            bet: Some(self.bet),
            hand: self.hand.clone(),
        }
    }

    fn clear_round(&mut self) {
        self.bet = 0;
        self.hand.clear();
        self.hidden = None;
        self.stood = false;
        self.busted = false;
    }
}

enum WaitEvent {
    Inbox(Option<RoomMessage>),
    Seated(SeatIndex, Result<Action, ConnectionError>),
}

/// Read from whichever seated session sends first. Never resolves while
/// every seat is empty.
///
/// Pending reads are dropped when another branch wins. Seated clients stay
/// silent until their first snapshot, so no frame is split that way.
async fn recv_any(seats: &mut [Option<Session>]) -> (SeatIndex, Result<Action, ConnectionError>) {
    let mut reads: Vec<_> = seats
        .iter_mut()
        .enumerate()
        .filter_map(|(seat, slot)| {
            slot.as_mut()
                .map(|session| (seat, Box::pin(session.connection.recv_action())))
        })
        .collect();
    if reads.is_empty() {
        return std::future::pending().await;
    }
    std::future::poll_fn(|cx| {
        for (seat, read) in &mut reads {
            if let Poll::Ready(result) = read.as_mut().poll(cx) {
                return Poll::Ready((*seat, result));
            }
        }
        Poll::Pending
    })
    .await
}

/// Room worker managing a single blackjack room
pub struct RoomWorker {
    name: String,
    config: RoomConfig,
    directory: Arc<Directory>,
    inbox: mpsc::Receiver<RoomMessage>,
    seats: Vec<Option<Session>>,
    shoe: Shoe,
    dealer: Hand,
    dealer_hidden: Option<Card>,
    dealer_stood: bool,
    dealer_busted: bool,
    state: RoomState,
    rounds: u64,
}

impl RoomWorker {
    /// Create a room worker and the handle used to seat sessions in it.
    ///
    /// Without a prepared `shoe`, a freshly shuffled one is built from the
    /// config's deck count and seed.
    pub fn new(
        name: String,
        config: RoomConfig,
        directory: Arc<Directory>,
        shoe: Option<Shoe>,
    ) -> (Self, RoomHandle) {
        let (sender, inbox) = mpsc::channel(config.seats.max(1));
        let shoe = shoe.unwrap_or_else(|| Shoe::new(config.decks, config.shuffle_seed));
        let seats = std::iter::repeat_with(|| None).take(config.seats).collect();
        let handle = RoomHandle::new(sender, name.clone());
        let worker = Self {
            name,
            config,
            directory,
            inbox,
            seats,
            shoe,
            dealer: Hand::new(),
            dealer_hidden: None,
            dealer_stood: false,
            dealer_busted: false,
            state: RoomState::WaitingForSeats,
            rounds: 0,
        };
        (worker, handle)
    }

    /// Run the room until no seat is occupied, then remove it from the
    /// directory.
    pub async fn run(mut self) {
        log::info!(
            "Room '{}' waiting for {} seats",
            self.name,
            self.config.seats
        );

        while self.state != RoomState::Closed {
            let next = self.step().await;
            log::debug!("Room '{}': {} -> {next}", self.name, self.state);
            self.state = next;
        }

        for seat in 0..self.seats.len() {
            self.vacate(seat, None).await;
        }
        self.directory.remove_room(&self.name).await;
        log::info!("Room '{}' closed after {} rounds", self.name, self.rounds);
    }

    async fn step(&mut self) -> RoomState {
        match self.state {
            RoomState::WaitingForSeats => self.wait_for_seats().await,
            RoomState::Betting => self.take_bets().await,
            RoomState::Dealing => self.deal().await,
            RoomState::PlayerTurn(seat) => self.play_turn(seat).await,
            RoomState::DealerTurn => self.play_dealer().await,
            RoomState::Payout => self.payout().await,
            RoomState::Discard => self.discard(),
            RoomState::Closed => RoomState::Closed,
        }
    }

    fn occupied(&self) -> usize {
        self.seats.iter().flatten().count()
    }

    /// The next occupied seat at or after `from`, or the dealer.
    fn next_turn(&self, from: SeatIndex) -> RoomState {
        if self.occupied() == 0 {
            return RoomState::Closed;
        }
        (from..self.seats.len())
            .find(|&seat| self.seats[seat].is_some())
            .map_or(RoomState::DealerTurn, RoomState::PlayerTurn)
    }

    /// Seat sessions until every seat is taken. Sessions already seated are
    /// watched meanwhile, so one that leaves or disconnects frees its seat
    /// before play starts.
    async fn wait_for_seats(&mut self) -> RoomState {
        while self.seats.iter().any(Option::is_none) {
            let event = tokio::select! {
                message = self.inbox.recv() => WaitEvent::Inbox(message),
                (seat, result) = recv_any(&mut self.seats) => WaitEvent::Seated(seat, result),
            };
            match event {
                WaitEvent::Inbox(Some(RoomMessage::Seat {
                    seat,
                    session,
                    connection,
                })) => self.seat(seat, session, connection).await,
                WaitEvent::Inbox(None) => return RoomState::Closed,
                WaitEvent::Seated(seat, Ok(Action::Exit | Action::Unregister)) => {
                    self.vacate(seat, None).await;
                }
                WaitEvent::Seated(seat, Ok(other)) => {
                    log::debug!("Room '{}': seat {seat} sent {other} before play", self.name);
                }
                WaitEvent::Seated(_, Err(ConnectionError::TimedOut)) => {}
                WaitEvent::Seated(seat, Err(error)) => self.vacate(seat, Some(error)).await,
            }
        }
        self.directory.close_room(&self.name).await;
        log::info!("Room '{}' is full, starting play", self.name);
        RoomState::Betting
    }

    async fn seat(&mut self, seat: SeatIndex, id: SessionId, mut connection: Connection) {
        let free = self.seats.get(seat).is_some_and(Option::is_none);
        if !free {
            log::warn!(
                "Room '{}': {id} was handed seat {seat}, which is not free",
                self.name
            );
            self.directory.unregister(id).await;
            connection.close().await;
            return;
        }
        connection.set_timeout(self.config.action_timeout);
        log::info!(
            "Room '{}': {id} ({}) took seat {seat}",
            self.name,
            connection.peer()
        );
        self.seats[seat] = Some(Session::new(id, connection, self.config.starting_money));
    }

    /// Drop a seated session from the room and the directory. `error` is
    /// the transport failure that caused it, if any.
    async fn vacate(&mut self, seat: SeatIndex, error: Option<ConnectionError>) {
        let Some(session) = self.seats.get_mut(seat).and_then(Option::take) else {
            return;
        };
        match error {
            Some(error) => log::warn!(
                "Room '{}': dropping {} from seat {seat}: {error}",
                self.name,
                session.id
            ),
            None => log::info!("Room '{}': {} left seat {seat}", self.name, session.id),
        }
        self.directory.unregister(session.id).await;
        session.connection.close().await;
    }

    fn snapshot(&self, own: SeatIndex, new_round: bool, turn: Option<SeatIndex>) -> Snapshot {
        Snapshot {
            own: Some(own),
            turn,
            new_round,
            seats: self
                .seats
                .iter()
                .map(|seat| seat.as_ref().map(Session::view).unwrap_or_default())
                .collect(),
            dealer: self.dealer.clone(),
        }
    }

    /// Send one seat its view and wait for the acknowledgement. Returns
    /// whether the seat is still occupied afterwards.
    async fn send_snapshot(
        &mut self,
        seat: SeatIndex,
        new_round: bool,
        turn: Option<SeatIndex>,
    ) -> bool {
        if self.seats[seat].is_none() {
            return false;
        }
        let snapshot = self.snapshot(seat, new_round, turn);
        let Some(session) = self.seats[seat].as_mut() else {
            return false;
        };
        match session.connection.send_snapshot(&snapshot).await {
            Ok(()) => true,
            Err(error) => {
                self.vacate(seat, Some(error)).await;
                false
            }
        }
    }

    async fn broadcast(&mut self, new_round: bool, turn: Option<SeatIndex>) {
        for seat in 0..self.seats.len() {
            self.send_snapshot(seat, new_round, turn).await;
        }
    }

    async fn take_bets(&mut self) -> RoomState {
        if self.occupied() == 0 {
            return RoomState::Closed;
        }
        if self.shoe.reshuffle_if_needed() {
            log::info!("Room '{}' reshuffled the shoe", self.name);
        }

        self.broadcast(true, None).await;
        for seat in 0..self.seats.len() {
            self.take_bet(seat).await;
        }

        if self.occupied() == 0 {
            RoomState::Closed
        } else {
            RoomState::Dealing
        }
    }

    /// Wait for a positive bet from one seat, re-prompting it after
    /// anything else.
    async fn take_bet(&mut self, seat: SeatIndex) {
        loop {
            let Some(session) = self.seats[seat].as_mut() else {
                return;
            };
            let action = match session.connection.recv_action().await {
                Ok(action) => action,
                Err(error) => {
                    self.vacate(seat, Some(error)).await;
                    return;
                }
            };
            match action {
                Action::Bet => {
                    let amount = match session.connection.recv().await {
                        Ok(frame) => decode_amount(&frame),
                        Err(error) => {
                            self.vacate(seat, Some(error)).await;
                            return;
                        }
                    };
                    if amount > 0 {
                        session.bet = amount.min(session.money);
                        log::debug!(
                            "Room '{}': seat {seat} bet {} of {}",
                            self.name,
                            session.bet,
                            session.money
                        );
                        return;
                    }
                    log::debug!("Room '{}': seat {seat} bet {amount}, re-prompting", self.name);
                }
                Action::Exit | Action::Unregister => {
                    self.vacate(seat, None).await;
                    return;
                }
                other => {
                    log::debug!("Room '{}': seat {seat} sent {other} while betting", self.name);
                }
            }
            if !self.send_snapshot(seat, true, Some(seat)).await {
                return;
            }
        }
    }

    async fn deal(&mut self) -> RoomState {
        for session in self.seats.iter_mut().flatten() {
            session.hidden = Some(self.shoe.deal());
            session.hand.push(self.shoe.deal());
        }
        self.dealer_hidden = Some(self.shoe.deal());
        self.dealer.push(self.shoe.deal());

        self.broadcast(false, None).await;
        self.next_turn(0)
    }

    async fn play_turn(&mut self, seat: SeatIndex) -> RoomState {
        self.broadcast(false, Some(seat)).await;
        if let Some(session) = self.seats[seat].as_mut() {
            session.stood = false;
            session.busted = false;
            if let Some(card) = session.hidden.take() {
                session.hand.push(card);
            }
        }

        loop {
            let Some(session) = self.seats[seat].as_mut() else {
                break;
            };
            if functional::is_bust(&session.hand) {
                session.busted = true;
                log::debug!(
                    "Room '{}': seat {seat} busted with {}",
                    self.name,
                    functional::score(&session.hand)
                );
                break;
            }

            if !self.send_turn(seat).await {
                break;
            }
            let Some(session) = self.seats[seat].as_mut() else {
                break;
            };
            match session.connection.recv_action().await {
                Ok(Action::Hit) => session.hand.push(self.shoe.deal()),
                Ok(Action::Stand) => {
                    session.stood = true;
                    break;
                }
                Ok(Action::Exit | Action::Unregister) => {
                    self.vacate(seat, None).await;
                    break;
                }
                Ok(other) => {
                    log::debug!("Room '{}': seat {seat} sent {other} on its turn", self.name);
                }
                Err(ConnectionError::TimedOut) => {
                    log::info!("Room '{}': seat {seat} timed out, standing", self.name);
                    session.stood = true;
                    break;
                }
                Err(error) => {
                    self.vacate(seat, Some(error)).await;
                    break;
                }
            }
        }

        self.next_turn(seat + 1)
    }

    /// Broadcast the turn snapshot for `seat`. Returns whether `seat` is
    /// still occupied afterwards.
    async fn send_turn(&mut self, seat: SeatIndex) -> bool {
        self.broadcast(false, Some(seat)).await;
        self.seats[seat].is_some()
    }

    async fn play_dealer(&mut self) -> RoomState {
        if self.occupied() == 0 {
            return RoomState::Closed;
        }
        self.broadcast(false, None).await;

        if let Some(card) = self.dealer_hidden.take() {
            self.dealer.push(card);
        }
        while functional::dealer_should_hit(&self.dealer) {
            let card = self.shoe.deal();
            self.dealer.push(card);
        }
        self.dealer_busted = functional::is_bust(&self.dealer);
        self.dealer_stood = !self.dealer_busted;
        log::debug!(
            "Room '{}': dealer {} on {}",
            self.name,
            if self.dealer_stood { "stood" } else { "busted" },
            functional::score(&self.dealer)
        );
        RoomState::Payout
    }

    async fn payout(&mut self) -> RoomState {
        for (seat, slot) in self.seats.iter_mut().enumerate() {
            let Some(session) = slot else {
                continue;
            };
            let outcome =
                functional::settle(&session.hand, session.busted, &self.dealer, self.dealer_busted);
            let delta = outcome.payout(session.bet);
            session.money += delta;
            log::debug!(
                "Room '{}': seat {seat} {} on {}, {outcome:?}, {delta:+} to {}",
                self.name,
                if session.stood { "stood" } else { "busted" },
                functional::score(&session.hand),
                session.money
            );
        }
        self.broadcast(true, None).await;

        for session in self.seats.iter_mut().flatten() {
            session.money = functional::pity_floor(session.money, self.config.pity_money);
            session.clear_round();
        }
        self.dealer.clear();
        self.dealer_hidden = None;
        self.dealer_stood = false;
        self.dealer_busted = false;
        RoomState::Discard
    }

    fn discard(&mut self) -> RoomState {
        self.rounds += 1;
        if self.occupied() == 0 {
            return RoomState::Closed;
        }
        log::info!(
            "Room '{}' finished round {} with {} seated",
            self.name,
            self.rounds,
            self.occupied()
        );
        RoomState::Betting
    }
}
