//! Per-recipient room state and its text encoding.
//!
//! A snapshot is written as `_`-terminated fields in this order:
//!
//! 1. number of slots (seats plus the dealer)
//! 2. recipient's own seat, `-1` for a dealer view
//! 3. seat whose turn it is, `-1` when no turn is active
//! 4. new-round flag, `1` or `0`
//! 5. money per slot, `-1` for empty seats and the dealer
//! 6. bet per slot, `-1` for empty seats and the dealer
//! 7. hand per slot, as a card count followed by that many card codes
//!
//! The dealer is always the last slot.

use serde::{Deserialize, Serialize};
use std::{fmt::Write, str::Split};
use thiserror::Error;

use crate::game::entities::{Card, Hand, ParseCardError, SeatIndex, Usd};

/// Terminator after every field.
pub const SEPARATOR: char = '_';

const SENTINEL: i64 = -1;

#[derive(Debug, Error, Eq, PartialEq)]
pub enum SnapshotError {
    #[error("snapshot is not valid UTF-8")]
    Utf8,
    #[error("snapshot is missing its final separator")]
    Unterminated,
    #[error("snapshot ended before {0}")]
    Truncated(&'static str),
    #[error("invalid {field}: {value:?}")]
    InvalidField { field: &'static str, value: String },
    #[error("seat {index} is out of range for {seats} seats")]
    SeatOutOfRange { index: usize, seats: usize },
    #[error("snapshot has trailing fields")]
    Trailing,
    #[error(transparent)]
    Card(#[from] ParseCardError),
}

/// One seat as seen by a recipient. Empty seats have no money or bet and
/// an empty hand.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct SeatView {
    pub money: Option<Usd>,
    pub bet: Option<Usd>,
    pub hand: Hand,
}

impl SeatView {
    #[must_use]
    pub fn is_occupied(&self) -> bool {
        self.money.is_some()
    }
}

/// Room state as seen by one recipient.
///
/// Concealed cards are never part of a snapshot; hands only hold cards
/// that are face up.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Snapshot {
    pub own: Option<SeatIndex>,
    pub turn: Option<SeatIndex>,
    pub new_round: bool,
    pub seats: Vec<SeatView>,
    pub dealer: Hand,
}

impl Snapshot {
    #[must_use]
    pub fn is_my_turn(&self) -> bool {
        self.own.is_some() && self.own == self.turn
    }

    /// A new-round snapshot addressed at the recipient's own seat. The
    /// server sends this when it wants the bet again.
    #[must_use]
    pub fn is_bet_prompt(&self) -> bool {
        self.new_round && self.is_my_turn()
    }

    #[must_use]
    pub fn own_seat(&self) -> Option<&SeatView> {
        self.own.and_then(|own| self.seats.get(own))
    }

    #[must_use]
    pub fn own_money(&self) -> Option<Usd> {
        self.own_seat().and_then(|seat| seat.money)
    }

    #[must_use]
    pub fn encode(&self) -> String {
        let mut out = String::new();
        let mut field = |value: &dyn std::fmt::Display| {
            let _ = write!(out, "{value}{SEPARATOR}");
        };

        field(&(self.seats.len() + 1));
        field(&index_field(self.own));
        field(&index_field(self.turn));
        field(&u8::from(self.new_round));
        for seat in &self.seats {
            field(&seat.money.unwrap_or(SENTINEL));
        }
        field(&SENTINEL);
        for seat in &self.seats {
            field(&seat.bet.unwrap_or(SENTINEL));
        }
        field(&SENTINEL);
        for hand in self.seats.iter().map(|seat| &seat.hand).chain([&self.dealer]) {
            field(&hand.len());
            for card in hand {
                field(card);
            }
        }
        out
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let text = std::str::from_utf8(bytes).map_err(|_| SnapshotError::Utf8)?;
        let body = text
            .strip_suffix(SEPARATOR)
            .ok_or(SnapshotError::Unterminated)?;
        let mut fields = Fields(body.split(SEPARATOR));

        let slots: usize = fields.parse("slot count")?;
        // Every slot takes at least four fields, so a count past the payload
        // length can't be honest.
        if slots == 0 || slots > bytes.len() {
            return Err(SnapshotError::InvalidField {
                field: "slot count",
                value: slots.to_string(),
            });
        }
        let num_seats = slots - 1;
        let own = fields.index("own seat", num_seats)?;
        let turn = fields.index("turn", num_seats)?;
        let new_round = match fields.next("new round flag")? {
            "1" => true,
            "0" => false,
            value => {
                return Err(SnapshotError::InvalidField {
                    field: "new round flag",
                    value: value.to_string(),
                });
            }
        };

        let mut seats = vec![SeatView::default(); num_seats];
        for seat in &mut seats {
            seat.money = fields.amount("money")?;
        }
        fields.amount("dealer money")?;
        for seat in &mut seats {
            seat.bet = fields.amount("bet")?;
        }
        fields.amount("dealer bet")?;
        for seat in &mut seats {
            seat.hand = fields.hand()?;
        }
        let dealer = fields.hand()?;

        if fields.0.next().is_some() {
            return Err(SnapshotError::Trailing);
        }
        Ok(Self {
            own,
            turn,
            new_round,
            seats,
            dealer,
        })
    }
}

fn index_field(index: Option<SeatIndex>) -> i64 {
    index.map_or(SENTINEL, |i| i as i64)
}

struct Fields<'a>(Split<'a, char>);

impl<'a> Fields<'a> {
    fn next(&mut self, field: &'static str) -> Result<&'a str, SnapshotError> {
        self.0.next().ok_or(SnapshotError::Truncated(field))
    }

    fn parse<T: std::str::FromStr>(&mut self, field: &'static str) -> Result<T, SnapshotError> {
        let value = self.next(field)?;
        value.parse().map_err(|_| SnapshotError::InvalidField {
            field,
            value: value.to_string(),
        })
    }

    fn amount(&mut self, field: &'static str) -> Result<Option<Usd>, SnapshotError> {
        let value: Usd = self.parse(field)?;
        Ok((value != SENTINEL).then_some(value))
    }

    fn index(&mut self, field: &'static str, seats: usize) -> Result<Option<SeatIndex>, SnapshotError> {
        let value: i64 = self.parse(field)?;
        if value == SENTINEL {
            return Ok(None);
        }
        let index = usize::try_from(value).map_err(|_| SnapshotError::InvalidField {
            field,
            value: value.to_string(),
        })?;
        if index >= seats {
            return Err(SnapshotError::SeatOutOfRange { index, seats });
        }
        Ok(Some(index))
    }

    fn hand(&mut self) -> Result<Hand, SnapshotError> {
        let count: usize = self.parse("card count")?;
        let mut hand = Hand::new();
        for _ in 0..count {
            hand.push(self.next("card")?.parse::<Card>()?);
        }
        Ok(hand)
    }
}
