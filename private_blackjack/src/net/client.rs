//! An async blackjack client.
//!
//! This is the inverse of the server's lobby and room workers: it sends
//! request tokens and acknowledges every snapshot it receives. It holds no
//! game logic, so it doubles as a testing utility.

use anyhow::{Context, Error, bail};
use std::time::Duration;
use tokio::net::{TcpStream, ToSocketAddrs};

use super::{
    connection::{Connection, Stream},
    messages::{Action, decode_room_list},
    snapshot::Snapshot,
};
use crate::game::entities::Usd;

/// Per-attempt connect timeouts, tried in order.
const CONNECT_TIMEOUTS: [Duration; 3] = [
    Duration::from_millis(100),
    Duration::from_millis(500),
    Duration::from_secs(1),
];

/// A client connected to a blackjack server.
#[derive(Debug)]
pub struct Client {
    connection: Connection,
    last_snapshot: Option<Snapshot>,
}

impl Client {
    /// Connect to a blackjack server.
    ///
    /// Tries three times with increasing timeouts (100ms, 500ms, 1s),
    /// sleeping for the same duration after each failed attempt.
    ///
    /// # Errors
    ///
    /// Returns an error if every attempt fails.
    pub async fn connect<A: ToSocketAddrs + Clone + std::fmt::Debug>(addr: A) -> Result<Self, Error> {
        for connect_timeout in CONNECT_TIMEOUTS {
            match tokio::time::timeout(connect_timeout, TcpStream::connect(addr.clone())).await {
                Ok(Ok(stream)) => {
                    let peer = stream
                        .peer_addr()
                        .map_or_else(|_| format!("{addr:?}"), |peer| peer.to_string());
                    return Ok(Self::from_stream(stream, peer));
                }
                _ => tokio::time::sleep(connect_timeout).await,
            }
        }
        bail!("couldn't connect to {addr:?}")
    }

    /// Wrap an already connected stream.
    pub fn from_stream<S: Stream + 'static>(stream: S, peer: impl Into<String>) -> Self {
        Self {
            connection: Connection::new(stream, peer),
            last_snapshot: None,
        }
    }

    /// Bound every read from the server. `None` waits forever.
    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.connection.set_timeout(timeout);
    }

    /// Names of rooms accepting joins.
    pub async fn list_rooms(&mut self) -> Result<Vec<String>, Error> {
        self.connection.send_action(Action::List).await?;
        let listing = self.connection.recv_text().await?;
        Ok(decode_room_list(&listing))
    }

    /// Ask the server to create a room. The client stays in the lobby
    /// either way.
    pub async fn create_room(&mut self, name: &str) -> Result<bool, Error> {
        self.connection.send_action(Action::Create).await?;
        self.connection.send_text(name).await?;
        Ok(self.connection.recv_bool().await?)
    }

    /// Ask for a seat in a room. On `true` the client is seated and the
    /// next message is the room's first snapshot.
    pub async fn join_room(&mut self, name: &str) -> Result<bool, Error> {
        self.connection.send_action(Action::Join).await?;
        self.connection.send_text(name).await?;
        Ok(self.connection.recv_bool().await?)
    }

    pub async fn bet(&mut self, amount: Usd) -> Result<(), Error> {
        self.connection.send_action(Action::Bet).await?;
        self.connection.send_text(&amount.to_string()).await?;
        Ok(())
    }

    pub async fn hit(&mut self) -> Result<(), Error> {
        Ok(self.connection.send_action(Action::Hit).await?)
    }

    pub async fn stand(&mut self) -> Result<(), Error> {
        Ok(self.connection.send_action(Action::Stand).await?)
    }

    /// Leave the room (or the lobby). The server drops the session.
    pub async fn exit(&mut self) -> Result<(), Error> {
        Ok(self.connection.send_action(Action::Exit).await?)
    }

    pub async fn unregister(&mut self) -> Result<(), Error> {
        Ok(self.connection.send_action(Action::Unregister).await?)
    }

    /// Receive the next snapshot and acknowledge it.
    pub async fn recv_snapshot(&mut self) -> Result<Snapshot, Error> {
        let snapshot = self
            .connection
            .recv_snapshot()
            .await
            .context("failed to receive room state")?;
        self.last_snapshot = Some(snapshot.clone());
        Ok(snapshot)
    }

    #[must_use]
    pub fn last_snapshot(&self) -> Option<&Snapshot> {
        self.last_snapshot.as_ref()
    }

    /// Own balance as of the last snapshot.
    #[must_use]
    pub fn last_money(&self) -> Option<Usd> {
        self.last_snapshot.as_ref().and_then(Snapshot::own_money)
    }

    pub async fn close(self) {
        self.connection.close().await;
    }
}
