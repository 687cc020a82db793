//! End-to-end tests against a real TCP listener.
//!
//! Each test starts the accept loop on an ephemeral port and talks to it
//! through the public [`Client`].

use anyhow::Error;
use private_blackjack::{
    Client, Directory, RoomConfig, Snapshot, Usd,
    net::server,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;

async fn start(config: RoomConfig) -> (SocketAddr, Arc<Directory>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let directory = Arc::new(Directory::new(config));
    tokio::spawn(server::run(listener, Arc::clone(&directory)));
    (addr, directory)
}

fn seeded() -> RoomConfig {
    RoomConfig {
        shuffle_seed: Some(2928),
        ..Default::default()
    }
}

async fn connect(addr: SocketAddr) -> Client {
    let mut client = Client::connect(addr).await.unwrap();
    client.set_timeout(Some(Duration::from_secs(10)));
    client
}

/// Bet, stand as soon as the turn comes, and return the payout snapshot
/// and the following betting snapshot.
async fn bet_and_stand(client: &mut Client, bet: Usd) -> Result<(Snapshot, Snapshot), Error> {
    let betting = client.recv_snapshot().await?;
    assert!(betting.new_round);
    client.bet(bet).await?;

    loop {
        let snapshot = client.recv_snapshot().await?;
        if snapshot.is_my_turn() && !snapshot.new_round {
            break;
        }
    }
    // Announced turn; the concealed card is revealed in the next one unless
    // it already busted the hand.
    if client.recv_snapshot().await?.is_my_turn() {
        client.stand().await?;
    }

    let payout = loop {
        let snapshot = client.recv_snapshot().await?;
        if snapshot.new_round {
            break snapshot;
        }
    };
    let next = client.recv_snapshot().await?;
    Ok((payout, next))
}

// ============================================================================
// Lobby
// ============================================================================

#[tokio::test]
async fn test_create_list_and_duplicate() {
    let (addr, directory) = start(seeded()).await;
    let mut alice = connect(addr).await;
    let mut bob = connect(addr).await;

    assert!(alice.list_rooms().await.unwrap().is_empty());
    assert!(alice.create_room("Felt").await.unwrap());
    assert!(alice.join_room("felt").await.unwrap());
    let seats = directory.seats("felt").await;

    assert!(!bob.create_room("FELT").await.unwrap());
    assert_eq!(directory.seats("felt").await, seats);
    assert_eq!(bob.list_rooms().await.unwrap(), vec!["felt"]);
}

#[tokio::test]
async fn test_full_room_disappears_from_listing() {
    let (addr, _directory) = start(seeded()).await;
    let mut alice = connect(addr).await;
    let mut bob = connect(addr).await;
    let mut carol = connect(addr).await;

    assert!(alice.create_room("duo").await.unwrap());
    assert!(alice.join_room("duo").await.unwrap());
    assert!(bob.join_room("duo").await.unwrap());

    // Both seats are taken; the worker starts betting right away.
    alice.recv_snapshot().await.unwrap();
    bob.recv_snapshot().await.unwrap();
    assert!(carol.list_rooms().await.unwrap().is_empty());
    assert!(!carol.join_room("duo").await.unwrap());
}

// ============================================================================
// Rounds
// ============================================================================

#[tokio::test]
async fn test_two_players_play_a_round_and_keep_their_seats() {
    let (addr, directory) = start(seeded()).await;
    let mut alice = connect(addr).await;
    let mut bob = connect(addr).await;

    assert!(alice.create_room("pair").await.unwrap());
    assert!(alice.join_room("pair").await.unwrap());
    assert!(bob.join_room("pair").await.unwrap());

    let alice = tokio::spawn(async move { bet_and_stand(&mut alice, 10).await });
    let bob = tokio::spawn(async move { bet_and_stand(&mut bob, 10).await });
    let (alice_payout, alice_next) = alice.await.unwrap().unwrap();
    let (bob_payout, bob_next) = bob.await.unwrap().unwrap();

    for payout in [&alice_payout, &bob_payout] {
        let money = payout.own_money().unwrap();
        assert!([90, 100, 110, 115].contains(&money));
        assert!(payout.dealer.len() >= 2);
    }
    for next in [&alice_next, &bob_next] {
        assert!(next.new_round);
        assert!(next.turn.is_none());
        assert!(next.seats.iter().all(|seat| seat.is_occupied()));
        assert!(next.dealer.is_empty());
    }
    assert!(directory.contains_room("pair").await);
}

#[tokio::test]
async fn test_last_player_exiting_removes_room() {
    let config = RoomConfig {
        seats: 1,
        ..seeded()
    };
    let (addr, directory) = start(config).await;
    let mut alice = connect(addr).await;

    assert!(alice.create_room("solo").await.unwrap());
    assert!(alice.join_room("solo").await.unwrap());
    alice.recv_snapshot().await.unwrap();
    alice.exit().await.unwrap();

    for _ in 0..200 {
        if !directory.contains_room("solo").await {
            assert_eq!(directory.stats().await.sessions, 0);
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("room was never removed");
}
