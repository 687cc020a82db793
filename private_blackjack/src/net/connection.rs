//! Typed message exchange over one framed byte stream.
//!
//! Both the server and the client speak through a [`Connection`]: the
//! server side sends snapshots and waits for the acknowledgement, the client
//! side receives them and acknowledges.

use std::{fmt, time::Duration};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use super::{
    errors::ConnectionError,
    messages::{Action, TRUE_ACK, decode_bool, encode_bool},
    snapshot::Snapshot,
    utils,
};

/// Any bidirectional byte stream a connection can run over.
pub trait Stream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> Stream for T {}

pub struct Connection {
    stream: Box<dyn Stream>,
    peer: String,
    timeout: Option<Duration>,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("peer", &self.peer)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Connection {
    /// Wrap a stream. `peer` is only used for logging.
    pub fn new<S: Stream + 'static>(stream: S, peer: impl Into<String>) -> Self {
        Self {
            stream: Box::new(stream),
            peer: peer.into(),
            timeout: None,
        }
    }

    #[must_use]
    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Bound every subsequent read. `None` waits forever.
    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    pub async fn send(&mut self, payload: &[u8]) -> Result<(), ConnectionError> {
        utils::write_frame(&mut self.stream, payload).await?;
        Ok(())
    }

    pub async fn recv(&mut self) -> Result<Vec<u8>, ConnectionError> {
        let read = utils::read_frame(&mut self.stream);
        let frame = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, read)
                .await
                .map_err(|_| ConnectionError::TimedOut)??,
            None => read.await?,
        };
        Ok(frame)
    }

    pub async fn send_action(&mut self, action: Action) -> Result<(), ConnectionError> {
        let token = action
            .token()
            .ok_or_else(|| ConnectionError::Unexpected(format!("{action} has no token")))?;
        self.send(token).await
    }

    /// Receive a request token. Unrecognized tokens decode to
    /// [`Action::None`]; only transport problems are errors.
    pub async fn recv_action(&mut self) -> Result<Action, ConnectionError> {
        let frame = self.recv().await?;
        let action = Action::decode(&frame);
        log::debug!("{} sent {action}", self.peer);
        Ok(action)
    }

    pub async fn send_text(&mut self, text: &str) -> Result<(), ConnectionError> {
        self.send(text.as_bytes()).await
    }

    /// Receive a text payload. Invalid UTF-8 is replaced rather than
    /// rejected; callers validate the contents.
    pub async fn recv_text(&mut self) -> Result<String, ConnectionError> {
        let frame = self.recv().await?;
        Ok(String::from_utf8_lossy(&frame).into_owned())
    }

    pub async fn send_bool(&mut self, value: bool) -> Result<(), ConnectionError> {
        self.send(encode_bool(value)).await
    }

    pub async fn recv_bool(&mut self) -> Result<bool, ConnectionError> {
        let frame = self.recv().await?;
        Ok(decode_bool(&frame))
    }

    /// Send a snapshot and block until the peer acknowledges it.
    pub async fn send_snapshot(&mut self, snapshot: &Snapshot) -> Result<(), ConnectionError> {
        self.send_text(&snapshot.encode()).await?;
        let ack = self.recv().await?;
        if ack != TRUE_ACK {
            log::debug!("{} acknowledged a snapshot with {ack:?}", self.peer);
        }
        Ok(())
    }

    /// Receive a snapshot and acknowledge it.
    pub async fn recv_snapshot(&mut self) -> Result<Snapshot, ConnectionError> {
        let frame = self.recv().await?;
        let snapshot = Snapshot::decode(&frame)?;
        self.send(TRUE_ACK).await?;
        Ok(snapshot)
    }

    /// Flush and close the write half. Errors are ignored because the
    /// peer may already be gone.
    pub async fn close(mut self) {
        let _ = self.stream.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::snapshot::SeatView;
    use tokio::io::duplex;

    fn pair() -> (Connection, Connection) {
        let (a, b) = duplex(4096);
        (Connection::new(a, "server"), Connection::new(b, "client"))
    }

    fn snapshot() -> Snapshot {
        Snapshot {
            own: Some(0),
            turn: None,
            new_round: true,
            seats: vec![SeatView {
                money: Some(100),
                bet: Some(0),
                hand: vec![],
            }],
            dealer: vec![],
        }
    }

    #[tokio::test]
    async fn test_action_exchange() {
        let (mut server, mut client) = pair();
        client.send_action(Action::Hit).await.unwrap();
        assert_eq!(server.recv_action().await.unwrap(), Action::Hit);
    }

    #[tokio::test]
    async fn test_unknown_action_is_none() {
        let (mut server, mut client) = pair();
        client.send(b"DANCE000").await.unwrap();
        assert_eq!(server.recv_action().await.unwrap(), Action::None);
    }

    #[tokio::test]
    async fn test_none_action_cannot_be_sent() {
        let (_server, mut client) = pair();
        assert!(matches!(
            client.send_action(Action::None).await,
            Err(ConnectionError::Unexpected(_))
        ));
    }

    #[tokio::test]
    async fn test_snapshot_waits_for_ack() {
        let (mut server, mut client) = pair();
        let expected = snapshot();
        let sent = expected.clone();
        let sender = tokio::spawn(async move {
            server.send_snapshot(&sent).await.unwrap();
            server
        });
        assert_eq!(client.recv_snapshot().await.unwrap(), expected);
        sender.await.unwrap();
    }

    #[tokio::test]
    async fn test_snapshot_without_ack_fails_when_peer_leaves() {
        let (mut server, client) = pair();
        drop(client);
        assert!(server.send_snapshot(&snapshot()).await.is_err());
    }

    #[tokio::test]
    async fn test_malformed_snapshot_is_an_error() {
        let (mut server, mut client) = pair();
        server.send_text("garbage").await.unwrap();
        assert!(matches!(
            client.recv_snapshot().await,
            Err(ConnectionError::Snapshot(_))
        ));
    }

    #[tokio::test]
    async fn test_closed_peer() {
        let (mut server, client) = pair();
        drop(client);
        assert!(matches!(server.recv().await, Err(ConnectionError::Closed)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_timeout() {
        let (mut server, _client) = pair();
        server.set_timeout(Some(Duration::from_secs(5)));
        assert!(matches!(server.recv().await, Err(ConnectionError::TimedOut)));
    }

    #[tokio::test]
    async fn test_bool_and_text() {
        let (mut server, mut client) = pair();
        server.send_bool(true).await.unwrap();
        server.send_bool(false).await.unwrap();
        client.send_text("table").await.unwrap();
        assert!(client.recv_bool().await.unwrap());
        assert!(!client.recv_bool().await.unwrap());
        assert_eq!(server.recv_text().await.unwrap(), "table");
    }
}
