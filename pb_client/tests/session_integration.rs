//! Scripted sessions driven against an in-process lobby and room.

use pb_client::driver::{Driver, RoundResult, ScriptedLines};
use private_blackjack::{
    Card::{self, *},
    Client, Connection, Directory, RoomConfig, Shoe,
    net::server,
};
use std::{sync::Arc, time::Duration};
use tokio::io::duplex;

const ROOM: &str = "solo";

async fn solo_room(top: Vec<Card>) -> Arc<Directory> {
    let config = RoomConfig {
        seats: 1,
        decks: 1,
        ..Default::default()
    };
    let directory = Arc::new(Directory::new(config.clone()));
    directory
        .create_custom_room(ROOM, config, Some(Shoe::stacked(top, 1)))
        .await
        .unwrap();
    directory
}

fn connect(directory: &Arc<Directory>) -> Client {
    let (server, client) = duplex(4096);
    tokio::spawn(server::serve_connection(
        Arc::clone(directory),
        Connection::new(server, "player"),
    ));
    Client::from_stream(client, "server")
}

async fn run_script(
    directory: &Arc<Directory>,
    script: &[&str],
    json: bool,
) -> (Vec<RoundResult>, String) {
    let mut output = Vec::new();
    let results = Driver::new(
        connect(directory),
        ScriptedLines::new(script.iter().copied()),
        &mut output,
    )
    .json(json)
    .run()
    .await
    .unwrap();
    (results, String::from_utf8(output).unwrap())
}

async fn wait_until_empty(directory: &Directory) {
    for _ in 0..200 {
        let stats = directory.stats().await;
        if stats.sessions == 0 && stats.rooms == 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("directory never emptied");
}

#[tokio::test]
async fn test_stand_and_lose_then_quit() {
    // Player: 7 + 10. Dealer: 8 + 10.
    let directory = solo_room(vec![Ten, Seven, Ten, Eight]).await;

    let (results, output) = run_script(&directory, &["join solo", "10", "stand", "quit"], false).await;

    assert_eq!(results, vec![RoundResult::Loss(10)]);
    assert!(output.contains("Joined 'solo'"));
    assert!(output.contains("Player 0 (You): money $100, bet $10, hand 7 10 (17)"));
    assert!(output.contains("You lose $10, now $90"));
    wait_until_empty(&directory).await;
}

#[tokio::test]
async fn test_natural_win_as_json() {
    // Player: K + A. Dealer: 6 + 10, then hits a 9.
    let directory = solo_room(vec![Ace, King, Ten, Six, Nine]).await;

    // Input runs out at the second betting prompt.
    let (results, output) = run_script(&directory, &["join solo", "10", "stand"], true).await;

    assert_eq!(results, vec![RoundResult::Win(15)]);
    let result_line = output
        .lines()
        .find(|line| line.contains("\"result\""))
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(result_line).unwrap();
    assert_eq!(value["result"], "win");
    assert_eq!(value["change"], 15);
    assert_eq!(value["money"], 115);
    assert!(!output.contains("bet> "));
    assert!(output.lines().any(|line| line.starts_with("{\"own\":0")));
    wait_until_empty(&directory).await;
}

#[tokio::test]
async fn test_rejected_bet_and_bust() {
    // Player: 7 + 10, hits a 9. Dealer: 8 + 10.
    let directory = solo_room(vec![Ten, Seven, Ten, Eight, Nine]).await;

    let script = ["join solo", "lots", "0", "10", "double", "hit", "quit"];
    let (results, output) = run_script(&directory, &script, false).await;

    assert_eq!(results, vec![RoundResult::Loss(10)]);
    assert!(output.contains("Invalid bet 'lots'"));
    assert_eq!(output.matches("Bet rejected").count(), 1);
    assert!(output.contains("Unrecognized command 'double'"));
    assert!(output.contains("hand 7 10 9 (26)"));
    // Busting ends the turn without another prompt.
    assert_eq!(output.matches("hit or stand> ").count(), 2);
    wait_until_empty(&directory).await;
}

#[tokio::test]
async fn test_create_seats_the_creator() {
    let config = RoomConfig {
        seats: 1,
        decks: 1,
        shuffle_seed: Some(7),
        ..Default::default()
    };
    let directory = Arc::new(Directory::new(config));

    // "stand" is read as a bet if the dealt hand busts without a prompt.
    let (results, output) =
        run_script(&directory, &["create solo", "10", "stand", "quit"], false).await;

    assert_eq!(results.len(), 1);
    assert!(output.contains("Created room 'solo'"));
    assert!(output.contains("Joined 'solo'"));
    assert!(output.contains("Player 0 (You): money $100, bet $10"));
    wait_until_empty(&directory).await;
}

#[tokio::test]
async fn test_bare_name_joins_listed_room() {
    // Player: 7 + 10. Dealer: 8 + 10.
    let directory = solo_room(vec![Ten, Seven, Ten, Eight]).await;

    let script = ["list", "SOLO", "10", "stand", "quit"];
    let (results, output) = run_script(&directory, &script, false).await;

    assert_eq!(results, vec![RoundResult::Loss(10)]);
    assert!(output.contains("Open rooms: solo"));
    assert!(output.contains("Joined 'SOLO'"));
    assert!(!output.contains("Created room"));
    wait_until_empty(&directory).await;
}

#[tokio::test]
async fn test_bare_name_creates_unlisted_room() {
    let config = RoomConfig {
        seats: 1,
        decks: 1,
        ..Default::default()
    };
    let directory = Arc::new(Directory::new(config));

    let (results, output) = run_script(&directory, &["Fresh", "quit"], false).await;

    assert!(results.is_empty());
    assert!(output.contains("Created room 'Fresh'"));
    assert!(output.contains("Joined 'Fresh', waiting for the other players"));
    assert!(output.contains("bet> "));
    wait_until_empty(&directory).await;
}

#[tokio::test]
async fn test_lobby_commands() {
    let directory = Arc::new(Directory::new(RoomConfig::default()));
    directory.create_room("lucky").await.unwrap();

    let script = [
        "join nowhere",
        "create",
        "join two words",
        "create Lucky",
        "list",
        "quit",
    ];
    let (results, output) = run_script(&directory, &script, false).await;

    assert!(results.is_empty());
    assert!(output.contains("Couldn't join 'nowhere'"));
    assert!(output.contains("'create' requires a room name"));
    assert!(output.contains("Unrecognized command 'join two words'"));
    assert!(output.contains("Couldn't create room 'Lucky'"));
    assert!(output.contains("Open rooms: lucky"));
    assert!(!output.contains("Joined"));
    assert_eq!(directory.seats("lucky").await, Some(vec![None, None]));

    for _ in 0..200 {
        if directory.stats().await.sessions == 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("session was never unregistered");
}
