//! Pure blackjack rules: scoring, dealer policy, and payouts.

use super::{
    constants::{ACE_PROMOTION, DEALER_STAND_ON, MAX_SAFE_SCORE},
    entities::{Card, Usd},
};

/// Score a hand.
///
/// Every card is summed at its base value with aces counting 1. Aces are
/// then promoted one at a time, in hand order, for as long as the running
/// total plus nine stays at or under 21. The guard is evaluated on the
/// pre-promotion total, so a pair of aces scores 22.
#[must_use]
pub fn score(cards: &[Card]) -> u32 {
    let mut total: u32 = cards.iter().map(|card| card.value()).sum();
    let aces = cards.iter().filter(|&&card| card == Card::Ace).count();
    for _ in 0..aces {
        if total + ACE_PROMOTION - 1 > MAX_SAFE_SCORE {
            break;
        }
        total += ACE_PROMOTION;
    }
    total
}

#[must_use]
pub fn is_bust(cards: &[Card]) -> bool {
    score(cards) > MAX_SAFE_SCORE
}

/// A two-card hand totaling exactly 21.
#[must_use]
pub fn is_natural(cards: &[Card]) -> bool {
    cards.len() == 2 && score(cards) == MAX_SAFE_SCORE
}

#[must_use]
pub fn dealer_should_hit(cards: &[Card]) -> bool {
    score(cards) < DEALER_STAND_ON
}

/// Result of one seat's hand against the dealer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    Lose,
    Push,
    Win { natural: bool },
}

impl Outcome {
    /// Money movement for a seat that wagered `bet`. Naturals add an
    /// integer half of the bet on top of the win.
    #[must_use]
    pub fn payout(self, bet: Usd) -> Usd {
        match self {
            Self::Lose => -bet,
            Self::Push => 0,
            Self::Win { natural: false } => bet,
            Self::Win { natural: true } => bet + bet / 2,
        }
    }
}

/// Decide how a seat fares against the dealer once both are done acting.
#[must_use]
pub fn settle(player: &[Card], player_busted: bool, dealer: &[Card], dealer_busted: bool) -> Outcome {
    let win = Outcome::Win {
        natural: is_natural(player),
    };
    if player_busted {
        return Outcome::Lose;
    }
    if dealer_busted {
        return win;
    }
    let (player_score, dealer_score) = (score(player), score(dealer));
    match player_score.cmp(&dealer_score) {
        std::cmp::Ordering::Less => Outcome::Lose,
        std::cmp::Ordering::Equal => Outcome::Push,
        std::cmp::Ordering::Greater => win,
    }
}

/// Balance after the pity rule: anything at or below zero is topped up to
/// `pity`.
#[must_use]
pub fn pity_floor(money: Usd, pity: Usd) -> Usd {
    if money <= 0 { pity } else { money }
}
