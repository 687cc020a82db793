use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use private_blackjack::{
    Shoe,
    entities::Card,
    functional::{score, settle},
    net::snapshot::{SeatView, Snapshot},
};
use std::hint::black_box;

/// Snapshot for a room with every seat occupied mid-round.
fn full_room_snapshot(seats: usize) -> Snapshot {
    Snapshot {
        own: Some(0),
        turn: Some(seats - 1),
        new_round: false,
        seats: (0..seats)
            .map(|i| SeatView {
                money: Some(100 + i as i64),
                bet: Some(10),
                hand: vec![Card::Ten, Card::Six, Card::Ace],
            })
            .collect(),
        dealer: vec![Card::King],
    }
}

/// Benchmark scoring hands of increasing size
fn bench_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("score");
    for hand in [
        vec![Card::Ace, Card::King],
        vec![Card::Ace, Card::Ace, Card::Nine],
        vec![Card::Two, Card::Three, Card::Ace, Card::Four, Card::Ace, Card::Two],
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(hand.len()), &hand, |b, hand| {
            b.iter(|| score(black_box(hand)));
        });
    }
    group.finish();
}

fn bench_settle(c: &mut Criterion) {
    let player = vec![Card::Ace, Card::King];
    let dealer = vec![Card::Ten, Card::Six, Card::Nine];
    c.bench_function("settle_natural_vs_bust", |b| {
        b.iter(|| settle(black_box(&player), false, black_box(&dealer), true));
    });
}

/// Benchmark snapshot encoding and decoding for various room sizes
fn bench_snapshot_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot");
    for seats in [1, 2, 7] {
        let snapshot = full_room_snapshot(seats);
        let encoded = snapshot.encode();
        group.bench_with_input(BenchmarkId::new("encode", seats), &snapshot, |b, s| {
            b.iter(|| s.encode());
        });
        group.bench_with_input(BenchmarkId::new("decode", seats), &encoded, |b, e| {
            b.iter(|| Snapshot::decode(black_box(e.as_bytes())));
        });
    }
    group.finish();
}

fn bench_shoe(c: &mut Criterion) {
    let mut shoe = Shoe::new(8, Some(1));
    c.bench_function("shoe_shuffle_8_decks", |b| {
        b.iter(|| shoe.shuffle());
    });
    c.bench_function("shoe_deal", |b| {
        b.iter(|| black_box(shoe.deal()));
    });
}

criterion_group!(benches, bench_score, bench_settle, bench_snapshot_codec, bench_shoe);
criterion_main!(benches);
