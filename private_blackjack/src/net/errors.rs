//! Errors raised while talking to a peer over a [`super::connection::Connection`].

use std::io;
use thiserror::Error;

use super::snapshot::SnapshotError;

/// Any of these means the peer is gone for the purposes of the game.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("connection closed by peer")]
    Closed,
    #[error("timed out waiting for peer")]
    TimedOut,
    #[error("unexpected reply: {0}")]
    Unexpected(String),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Io(io::Error),
}

impl From<io::Error> for ConnectionError {
    fn from(error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::UnexpectedEof
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe => Self::Closed,
            _ => Self::Io(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eof_maps_to_closed() {
        let error = ConnectionError::from(io::Error::from(io::ErrorKind::UnexpectedEof));
        assert!(matches!(error, ConnectionError::Closed));
    }

    #[test]
    fn test_other_io_errors_are_kept() {
        let error = ConnectionError::from(io::Error::from(io::ErrorKind::InvalidData));
        assert!(matches!(error, ConnectionError::Io(_)));
    }

    #[test]
    fn test_display() {
        assert_eq!(ConnectionError::Closed.to_string(), "connection closed by peer");
        assert_eq!(ConnectionError::TimedOut.to_string(), "timed out waiting for peer");
    }
}
