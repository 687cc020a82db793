/// Property-based tests for the snapshot codec and hand scoring.
///
/// Snapshots are generated with arbitrary seat counts, sentinel seats,
/// and hands, and must decode back to exactly what was encoded.
use private_blackjack::{
    entities::Card,
    functional::{dealer_should_hit, is_natural, score},
    net::snapshot::{SeatView, Snapshot},
};
use proptest::prelude::*;

fn card_strategy() -> impl Strategy<Value = Card> {
    prop::sample::select(Card::RANKS.to_vec())
}

fn hand_strategy() -> impl Strategy<Value = Vec<Card>> {
    prop::collection::vec(card_strategy(), 0..8)
}

// Occupied seats carry money and a bet; empty seats carry the sentinel
// and an empty hand.
fn seat_strategy() -> impl Strategy<Value = SeatView> {
    prop_oneof![
        Just(SeatView::default()),
        (0i64..100_000, 0i64..100_000, hand_strategy()).prop_map(|(money, bet, hand)| SeatView {
            money: Some(money),
            bet: Some(bet),
            hand,
        }),
    ]
}

fn snapshot_strategy() -> impl Strategy<Value = Snapshot> {
    prop::collection::vec(seat_strategy(), 1..8).prop_flat_map(|seats| {
        let n = seats.len();
        (
            prop::option::of(0..n),
            prop::option::of(0..n),
            any::<bool>(),
            Just(seats),
            hand_strategy(),
        )
            .prop_map(|(own, turn, new_round, seats, dealer)| Snapshot {
                own,
                turn,
                new_round,
                seats,
                dealer,
            })
    })
}

proptest! {
    #[test]
    fn test_snapshot_round_trip(snapshot in snapshot_strategy()) {
        let encoded = snapshot.encode();
        prop_assert_eq!(Snapshot::decode(encoded.as_bytes()), Ok(snapshot));
    }

    #[test]
    fn test_snapshot_truncation_never_decodes_silently(snapshot in snapshot_strategy(), cut in 1usize..16) {
        let encoded = snapshot.encode();
        let cut = cut.min(encoded.len());
        let truncated = &encoded[..encoded.len() - cut];
        // A strict prefix either loses its final separator or whole fields.
        prop_assert_ne!(Snapshot::decode(truncated.as_bytes()), Ok(snapshot));
    }

    #[test]
    fn test_score_bounds(hand in hand_strategy()) {
        let base: u32 = hand.iter().map(|card| card.value()).sum();
        let aces = hand.iter().filter(|&&card| card == Card::Ace).count() as u32;
        let total = score(&hand);
        prop_assert!(total >= base);
        prop_assert!(total <= base + 10 * aces);
        prop_assert_eq!((total - base) % 10, 0);
    }

    #[test]
    fn test_score_without_aces_is_plain_sum(hand in prop::collection::vec(
        prop::sample::select(Card::RANKS[..12].to_vec()), 0..8)) {
        let base: u32 = hand.iter().map(|card| card.value()).sum();
        prop_assert_eq!(score(&hand), base);
    }

    #[test]
    fn test_promotion_never_exceeds_twenty_two(hand in hand_strategy()) {
        let base: u32 = hand.iter().map(|card| card.value()).sum();
        if base <= 21 {
            prop_assert!(score(&hand) <= 22);
        }
    }

    #[test]
    fn test_naturals_are_two_card_twenty_ones(hand in hand_strategy()) {
        if is_natural(&hand) {
            prop_assert_eq!(hand.len(), 2);
            prop_assert_eq!(score(&hand), 21);
            prop_assert!(!dealer_should_hit(&hand));
        }
    }
}
