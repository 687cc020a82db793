//! Fixed blackjack rules and room defaults.

use super::entities::Usd;

/// Highest score a hand can have without busting.
pub const MAX_SAFE_SCORE: u32 = 21;

/// The dealer stands on any score at or above this value.
pub const DEALER_STAND_ON: u32 = 17;

/// Extra value an ace adds when promoted from 1 to 11.
pub const ACE_PROMOTION: u32 = 10;

/// Number of cards in one standard deck.
pub const CARDS_IN_STANDARD_DECK: usize = 52;

/// Default number of decks concatenated into a room's shoe.
pub const DEFAULT_NUM_DECKS: usize = 8;

/// Default number of seats per room.
pub const DEFAULT_SEATS: usize = 2;

/// Upper bound on seats per room. Seven seats keep a full round well inside
/// half of a single-deck shoe.
pub const MAX_SEATS: usize = 7;

/// Upper bound on decks per shoe.
pub const MAX_NUM_DECKS: usize = 16;

/// Balance a session receives when it is seated in a room.
pub const DEFAULT_STARTING_MONEY: Usd = 100;

/// Balance a seat is reset to when it ends a round at or below zero.
pub const DEFAULT_PITY_MONEY: Usd = 10;
