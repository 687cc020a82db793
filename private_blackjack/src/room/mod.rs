//! Rooms: the shared session directory and the per-room workers.
//!
//! ## Architecture
//!
//! The [`Directory`] is shared by every task and guards all room and
//! session bookkeeping behind one lock. Each room runs a [`RoomWorker`] in
//! its own Tokio task with an mpsc inbox. Lobby tasks reserve a seat in the
//! directory and then move the session's connection into the worker with a
//! [`RoomMessage::Seat`], so a seated connection only ever has one owner.
//!
//! ## Example
//!
//! ```no_run
//! use private_blackjack::room::{Directory, RoomConfig};
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let directory = Arc::new(Directory::new(RoomConfig::default()));
//! let name = directory.create_room("Lucky").await.unwrap();
//! assert_eq!(name, "lucky");
//! # }
//! ```

pub mod config;
pub mod directory;
pub mod messages;
pub mod worker;

pub use config::RoomConfig;
pub use directory::{Directory, DirectoryError, DirectoryStats, SessionId, SessionInfo};
pub use messages::RoomMessage;
pub use worker::{RoomHandle, RoomState, RoomWorker};
