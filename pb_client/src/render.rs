//! Plain-text and JSON rendering of room snapshots.

use private_blackjack::{
    Card, Snapshot, Usd, functional,
    net::snapshot::SeatView,
};
use std::fmt::Write;

fn hand_text(hand: &[Card]) -> String {
    if hand.is_empty() {
        return "-".to_string();
    }
    let cards: Vec<String> = hand.iter().map(Card::to_string).collect();
    format!("{} ({})", cards.join(" "), functional::score(hand))
}

fn amount_text(amount: Option<Usd>) -> String {
    amount.map_or_else(|| "-".to_string(), |amount| format!("${amount}"))
}

fn seat_line(snapshot: &Snapshot, index: usize, seat: &SeatView) -> String {
    let mut line = format!("Player {index}");
    if snapshot.own == Some(index) {
        line.push_str(" (You)");
    }
    if !seat.is_occupied() {
        line.push_str(": empty");
        return line;
    }
    let _ = write!(
        line,
        ": money {}, bet {}, hand {}",
        amount_text(seat.money),
        amount_text(seat.bet),
        hand_text(&seat.hand)
    );
    if snapshot.turn == Some(index) && !snapshot.new_round {
        line.push_str("  <- turn");
    }
    line
}

/// Render one block per seat followed by the dealer's visible hand.
pub fn render(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    for (index, seat) in snapshot.seats.iter().enumerate() {
        out.push_str(&seat_line(snapshot, index, seat));
        out.push('\n');
    }
    let _ = writeln!(out, "Dealer: {}", hand_text(&snapshot.dealer));
    out
}

/// One JSON object per snapshot, for scripting.
pub fn render_json(snapshot: &Snapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string(snapshot)
}
