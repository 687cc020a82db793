//! UDP discovery of a server on the local network.
//!
//! Clients broadcast [`PROBE`] and the server replies from its discovery
//! socket with the decimal TCP game port. The client then connects to the
//! replying address at that port.

use std::{
    io,
    net::{Ipv4Addr, SocketAddr},
    time::Duration,
};
use tokio::net::UdpSocket;

/// Datagram a client broadcasts to find a server.
pub const PROBE: &[u8; 8] = b"BJPROBE0";

/// Default UDP port the server answers probes on.
pub const DEFAULT_DISCOVERY_PORT: u16 = 2927;

/// Default TCP port the server accepts game connections on.
pub const DEFAULT_GAME_PORT: u16 = 2928;

/// Answer probes on `socket` forever, advertising `game_port`.
pub async fn serve(socket: UdpSocket, game_port: u16) -> io::Result<()> {
    let reply = game_port.to_string();
    let mut buf = [0; 64];
    loop {
        let (len, from) = socket.recv_from(&mut buf).await?;
        if &buf[..len] != PROBE {
            log::debug!("ignoring {len} byte datagram from {from}");
            continue;
        }
        log::debug!("discovery probe from {from}");
        if let Err(error) = socket.send_to(reply.as_bytes(), from).await {
            log::warn!("couldn't answer discovery probe from {from}: {error}");
        }
    }
}

/// Broadcast a probe on `port` and return the first server's game address.
pub async fn discover(port: u16, timeout: Duration) -> io::Result<SocketAddr> {
    discover_at(SocketAddr::from((Ipv4Addr::BROADCAST, port)), timeout).await
}

/// Send a probe to `target` and return the game address of the first valid
/// reply.
///
/// # Errors
///
/// Returns [`io::ErrorKind::TimedOut`] if no valid reply arrives in time.
pub async fn discover_at(target: SocketAddr, timeout: Duration) -> io::Result<SocketAddr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await?;
    socket.set_broadcast(true)?;
    socket.send_to(PROBE, target).await?;

    let wait = async {
        let mut buf = [0; 64];
        loop {
            let (len, from) = socket.recv_from(&mut buf).await?;
            let port = std::str::from_utf8(&buf[..len])
                .ok()
                .and_then(|text| text.trim().parse::<u16>().ok());
            match port {
                Some(port) => return Ok::<_, io::Error>(SocketAddr::new(from.ip(), port)),
                None => log::debug!("ignoring malformed discovery reply from {from}"),
            }
        }
    };
    tokio::time::timeout(timeout, wait)
        .await
        .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "no server answered the discovery probe"))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_probe_gets_game_port() {
        let responder = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = responder.local_addr().unwrap();
        tokio::spawn(serve(responder, 4321));

        let found = discover_at(addr, Duration::from_secs(2)).await.unwrap();
        assert_eq!(found, SocketAddr::from(([127, 0, 0, 1], 4321)));
    }

    #[tokio::test]
    async fn test_no_responder_times_out() {
        let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = silent.local_addr().unwrap();

        let error = discover_at(addr, Duration::from_millis(100)).await.unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::TimedOut);
    }

    #[tokio::test]
    async fn test_other_datagrams_are_ignored() {
        let responder = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = responder.local_addr().unwrap();
        tokio::spawn(serve(responder, 4321));

        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client.send_to(b"HELLO000", addr).await.unwrap();
        let mut buf = [0; 16];
        let silent = tokio::time::timeout(Duration::from_millis(100), client.recv_from(&mut buf)).await;
        assert!(silent.is_err());
    }
}
