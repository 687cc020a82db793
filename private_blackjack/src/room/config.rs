//! Room configuration models.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::game::{
    constants::{
        DEFAULT_NUM_DECKS, DEFAULT_PITY_MONEY, DEFAULT_SEATS, DEFAULT_STARTING_MONEY, MAX_NUM_DECKS,
        MAX_SEATS,
    },
    entities::Usd,
};

/// Room configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Number of seats; the first round starts once all are taken (default: 2)
    pub seats: usize,

    /// Standard decks in the shoe (default: 8)
    pub decks: usize,

    /// Balance given to a session when it is seated
    pub starting_money: Usd,

    /// Balance a broke seat is reset to after payout
    pub pity_money: Usd,

    /// Bound on every read from a seated session. `None` waits forever.
    /// A seat waiting for the room to fill is never timed out.
    pub action_timeout: Option<Duration>,

    /// Seed for reproducible shoes
    pub shuffle_seed: Option<u64>,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            seats: DEFAULT_SEATS,
            decks: DEFAULT_NUM_DECKS,
            starting_money: DEFAULT_STARTING_MONEY,
            pity_money: DEFAULT_PITY_MONEY,
            action_timeout: None,
            shuffle_seed: None,
        }
    }
}

impl RoomConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.seats == 0 || self.seats > MAX_SEATS {
            return Err(format!("Seats must be between 1 and {MAX_SEATS}"));
        }

        if self.decks == 0 || self.decks > MAX_NUM_DECKS {
            return Err(format!("Decks must be between 1 and {MAX_NUM_DECKS}"));
        }

        if self.starting_money <= 0 {
            return Err("Starting money must be positive".to_string());
        }

        if self.pity_money <= 0 {
            return Err("Pity money must be positive".to_string());
        }

        if self.action_timeout.is_some_and(|timeout| timeout.is_zero()) {
            return Err("Action timeout must be non-zero when set".to_string());
        }

        Ok(())
    }
}
