//! # Private Blackjack
//!
//! A multi-room blackjack server and client library.
//!
//! Clients find a server over UDP, connect over TCP, and then create or
//! join named rooms from a lobby. Each room seats a fixed number of
//! players and loops through rounds until everybody leaves:
//!
//! - **Betting**: every seat places a positive bet
//! - **Dealing**: one concealed and one visible card per seat and dealer
//! - **Player turns**: seats hit or stand in ascending order
//! - **Dealer turn**: the dealer hits below 17
//! - **Payout**: bets are settled and broke seats get pity money
//!
//! After every step the room sends each seat a [`net::snapshot::Snapshot`]
//! of the table and waits for it to be acknowledged.
//!
//! ## Core Modules
//!
//! - [`game`]: Cards, the shoe, scoring, and payouts
//! - [`net`]: Wire protocol, lobby server, client, and discovery
//! - [`room`]: Session directory and round state machine

/// Networking components for client-server communication.
pub mod net;
pub use net::{client::Client, connection::Connection, messages::Action, snapshot::Snapshot};

/// Core game logic and entities.
pub mod game;
pub use game::{
    constants,
    entities::{self, Card, Shoe, Usd},
    functional,
};

/// Rooms and the shared session directory.
pub mod room;
pub use room::{Directory, RoomConfig};
