use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use thiserror::Error;

use super::constants::CARDS_IN_STANDARD_DECK;

/// Type alias for whole dollars. Balances and bets are signed so the
/// wire sentinel (`-1`) and the pity floor check share one type.
pub type Usd = i64;

/// Type alias for seat positions in a room.
pub type SeatIndex = usize;

/// Cards held by a seat or the dealer, in the order they were dealt.
pub type Hand = Vec<Card>;

/// A suit-less playing card. Only the rank matters for blackjack.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Card {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Card {
    /// One standard deck's worth of ranks, in deck order.
    pub const RANKS: [Card; 13] = [
        Card::Two,
        Card::Three,
        Card::Four,
        Card::Five,
        Card::Six,
        Card::Seven,
        Card::Eight,
        Card::Nine,
        Card::Ten,
        Card::Jack,
        Card::Queen,
        Card::King,
        Card::Ace,
    ];

    /// Base value of the card. Aces count 1 here; promotion to 11 is
    /// decided when a whole hand is scored.
    #[must_use]
    pub const fn value(self) -> u32 {
        match self {
            Self::Two => 2,
            Self::Three => 3,
            Self::Four => 4,
            Self::Five => 5,
            Self::Six => 6,
            Self::Seven => 7,
            Self::Eight => 8,
            Self::Nine => 9,
            Self::Ten | Self::Jack | Self::Queen | Self::King => 10,
            Self::Ace => 1,
        }
    }

    /// The wire code for this card.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Two => "2",
            Self::Three => "3",
            Self::Four => "4",
            Self::Five => "5",
            Self::Six => "6",
            Self::Seven => "7",
            Self::Eight => "8",
            Self::Nine => "9",
            Self::Ten => "10",
            Self::Jack => "J",
            Self::Queen => "Q",
            Self::King => "K",
            Self::Ace => "A",
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Eq, Error, PartialEq)]
#[error("unknown card code {0:?}")]
pub struct ParseCardError(pub String);

impl FromStr for Card {
    type Err = ParseCardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Card::RANKS
            .into_iter()
            .find(|card| card.code() == s)
            .ok_or_else(|| ParseCardError(s.to_string()))
    }
}

impl Serialize for Card {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for Card {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The combined decks a room deals from.
///
/// Dealing advances a cursor instead of removing cards, so the same card
/// order persists across rounds until the shoe is reshuffled.
#[derive(Debug)]
pub struct Shoe {
    cards: Vec<Card>,
    cursor: usize,
    rng: StdRng,
}

impl Shoe {
    /// Create a shuffled shoe of `num_decks` standard decks. A seed makes
    /// the card order reproducible.
    #[must_use]
    pub fn new(num_decks: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let mut shoe = Self {
            cards: Self::fill(num_decks),
            cursor: 0,
            rng,
        };
        shoe.shuffle();
        shoe
    }

    /// Create a shoe that deals `top` first, followed by `num_decks`
    /// unshuffled decks.
    #[must_use]
    pub fn stacked(top: Vec<Card>, num_decks: usize) -> Self {
        let mut cards = top;
        cards.extend(Self::fill(num_decks));
        Self {
            cards,
            cursor: 0,
            rng: StdRng::seed_from_u64(0),
        }
    }

    fn fill(num_decks: usize) -> Vec<Card> {
        let mut cards = Vec::with_capacity(num_decks * CARDS_IN_STANDARD_DECK);
        for _ in 0..num_decks * (CARDS_IN_STANDARD_DECK / Card::RANKS.len()) {
            cards.extend_from_slice(&Card::RANKS);
        }
        cards
    }

    /// Uniformly permute the entire shoe and rewind the cursor.
    pub fn shuffle(&mut self) {
        self.cards.shuffle(&mut self.rng);
        self.cursor = 0;
    }

    /// Whether the cursor has reached at least half of the shoe.
    #[must_use]
    pub fn needs_reshuffle(&self) -> bool {
        self.cursor >= self.cards.len() / 2
    }

    /// Reshuffle if at least half of the shoe has been dealt. Returns
    /// whether a reshuffle happened.
    pub fn reshuffle_if_needed(&mut self) -> bool {
        let needed = self.needs_reshuffle();
        if needed {
            self.shuffle();
        }
        needed
    }

    pub fn deal(&mut self) -> Card {
        if self.cursor >= self.cards.len() {
            log::warn!("shoe exhausted mid-round, reshuffling");
            self.shuffle();
        }
        let card = self.cards[self.cursor];
        self.cursor += 1;
        card
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}
