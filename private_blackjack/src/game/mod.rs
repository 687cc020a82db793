//! Blackjack engine: cards, the shoe, scoring, and payouts.
//!
//! Everything here is pure logic with no I/O. The room worker is the only
//! caller that mutates a [`entities::Shoe`] during play.

pub mod constants;
pub mod entities;
pub mod functional;

pub use entities::{Card, Hand, SeatIndex, Shoe, Usd};
pub use functional::Outcome;
