//! Internal modules for the blackjack client.
//!
//! This library provides command parsing, snapshot rendering, and the
//! session driver used by the pb_client binary.

pub mod commands;
pub mod driver;
pub mod render;
