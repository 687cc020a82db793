//! Networking layer for the blackjack protocol.
//!
//! Every message is a length-prefixed frame carrying either a fixed-width
//! request token, a short text payload, or a room snapshot. The server
//! side runs on tokio: one lobby task per connection and one worker task
//! per room.

/// Async client for connecting to a blackjack server.
pub mod client;

/// Typed send/receive over a framed stream.
pub mod connection;

/// UDP server discovery.
pub mod discovery;

/// Transport error types.
pub mod errors;

/// Request tokens, acknowledgements, and room listings.
pub mod messages;

/// Connection acceptor and lobby worker.
pub mod server;

/// Per-recipient room state encoding.
pub mod snapshot;

/// Length-prefixed framing.
pub mod utils;
