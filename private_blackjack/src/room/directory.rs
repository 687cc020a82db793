//! Shared directory of connected sessions and live rooms.

use std::{collections::HashMap, fmt, sync::Arc};
use thiserror::Error;
use tokio::sync::RwLock;

use super::{
    config::RoomConfig,
    worker::{RoomHandle, RoomWorker},
};
use crate::{
    game::entities::{SeatIndex, Shoe},
    net::messages::normalize_room_name,
};

/// Stable handle for a connected session. Seats refer to sessions through
/// this id and never hold the session itself.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SessionId(u64);

impl SessionId {
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session #{}", self.0)
    }
}

/// Rejected directory requests. None of these are fatal to the caller's
/// connection.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum DirectoryError {
    #[error("invalid room name {0:?}")]
    InvalidName(String),
    #[error("invalid room config: {0}")]
    InvalidConfig(String),
    #[error("room {0} already exists")]
    RoomExists(String),
    #[error("room {0} does not exist")]
    NoSuchRoom(String),
    #[error("room {0} is closed")]
    RoomClosed(String),
    #[error("room {0} is full")]
    RoomFull(String),
    #[error("{0} is not registered")]
    UnknownSession(SessionId),
    #[error("{0} is already seated")]
    AlreadySeated(SessionId),
    #[error("room {0} stopped accepting sessions")]
    RoomGone(String),
}

/// What the directory knows about a session.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SessionInfo {
    pub peer: String,
    pub room: Option<String>,
}

/// Point-in-time directory counts.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DirectoryStats {
    pub rooms: usize,
    pub sessions: usize,
    pub sessions_registered: u64,
}

struct RoomEntry {
    seats: Vec<Option<SessionId>>,
    open: bool,
    handle: RoomHandle,
}

#[derive(Default)]
struct State {
    rooms: HashMap<String, RoomEntry>,
    sessions: HashMap<SessionId, SessionInfo>,
    sessions_registered: u64,
}

/// Directory of sessions and rooms shared by every lobby and room worker.
///
/// All state sits behind one lock so seat reservation, session removal,
/// and room teardown each apply to both maps atomically.
pub struct Directory {
    config: RoomConfig,
    state: RwLock<State>,
}

impl Directory {
    /// Create an empty directory. Rooms created through
    /// [`Directory::create_room`] use `config`.
    #[must_use]
    pub fn new(config: RoomConfig) -> Self {
        Self {
            config,
            state: RwLock::new(State::default()),
        }
    }

    #[must_use]
    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Register a newly accepted connection.
    pub async fn register(&self, peer: impl Into<String>) -> SessionId {
        let mut state = self.state.write().await;
        state.sessions_registered += 1;
        let id = SessionId(state.sessions_registered);
        state.sessions.insert(
            id,
            SessionInfo {
                peer: peer.into(),
                room: None,
            },
        );
        id
    }

    pub async fn session(&self, id: SessionId) -> Option<SessionInfo> {
        self.state.read().await.sessions.get(&id).cloned()
    }

    /// Names of rooms still accepting joins, sorted.
    pub async fn list_open_rooms(&self) -> Vec<String> {
        let state = self.state.read().await;
        let mut names: Vec<String> = state
            .rooms
            .iter()
            .filter(|(_, room)| room.open)
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// Create a room with the directory's default config and spawn its
    /// worker. Returns the stored (lowercased) name.
    pub async fn create_room(self: &Arc<Self>, name: &str) -> Result<String, DirectoryError> {
        self.create_custom_room(name, self.config.clone(), None).await
    }

    /// Create a room with its own config and, optionally, a prepared shoe.
    ///
    /// # Errors
    ///
    /// Fails without touching existing rooms when the name is invalid or
    /// already taken, or when `config` does not validate.
    pub async fn create_custom_room(
        self: &Arc<Self>,
        name: &str,
        config: RoomConfig,
        shoe: Option<Shoe>,
    ) -> Result<String, DirectoryError> {
        config.validate().map_err(DirectoryError::InvalidConfig)?;
        let name =
            normalize_room_name(name).ok_or_else(|| DirectoryError::InvalidName(name.to_string()))?;

        let mut state = self.state.write().await;
        if state.rooms.contains_key(&name) {
            return Err(DirectoryError::RoomExists(name));
        }
        let seats = config.seats;
        let (worker, handle) = RoomWorker::new(name.clone(), config, Arc::clone(self), shoe);
        state.rooms.insert(
            name.clone(),
            RoomEntry {
                seats: vec![None; seats],
                open: true,
                handle,
            },
        );
        drop(state);

        tokio::spawn(worker.run());
        log::info!("Room '{name}' created with {seats} seats");
        Ok(name)
    }

    /// Reserve the lowest empty seat of an open room for `session`.
    ///
    /// The caller must hand the session's connection to the returned
    /// handle, or unregister the session if it cannot.
    pub async fn reserve_seat(
        &self,
        session: SessionId,
        name: &str,
    ) -> Result<(SeatIndex, RoomHandle), DirectoryError> {
        let name =
            normalize_room_name(name).ok_or_else(|| DirectoryError::NoSuchRoom(name.to_string()))?;

        let mut state = self.state.write().await;
        let State {
            rooms, sessions, ..
        } = &mut *state;
        let info = sessions
            .get_mut(&session)
            .ok_or(DirectoryError::UnknownSession(session))?;
        if info.room.is_some() {
            return Err(DirectoryError::AlreadySeated(session));
        }
        let room = rooms
            .get_mut(&name)
            .ok_or_else(|| DirectoryError::NoSuchRoom(name.clone()))?;
        if !room.open {
            return Err(DirectoryError::RoomClosed(name));
        }
        let seat = room
            .seats
            .iter()
            .position(Option::is_none)
            .ok_or_else(|| DirectoryError::RoomFull(name.clone()))?;

        room.seats[seat] = Some(session);
        info.room = Some(name.clone());
        log::debug!("{session} reserved seat {seat} in room '{name}'");
        Ok((seat, room.handle.clone()))
    }

    /// Stop a room from accepting joins.
    pub async fn close_room(&self, name: &str) {
        if let Some(room) = self.state.write().await.rooms.get_mut(name) {
            room.open = false;
        }
    }

    /// Remove a session, vacating its seat if it has one.
    pub async fn unregister(&self, session: SessionId) -> Option<SessionInfo> {
        let mut state = self.state.write().await;
        let info = state.sessions.remove(&session)?;
        if let Some(room) = info.room.as_ref().and_then(|name| state.rooms.get_mut(name)) {
            for seat in room.seats.iter_mut().filter(|seat| **seat == Some(session)) {
                *seat = None;
            }
        }
        Some(info)
    }

    /// Remove a room and any sessions still seated in it. Returns the
    /// removed sessions.
    pub async fn remove_room(&self, name: &str) -> Vec<SessionId> {
        let mut state = self.state.write().await;
        let Some(room) = state.rooms.remove(name) else {
            return Vec::new();
        };
        let occupants: Vec<SessionId> = room.seats.into_iter().flatten().collect();
        for session in &occupants {
            state.sessions.remove(session);
        }
        log::info!("Room '{name}' removed");
        occupants
    }

    pub async fn contains_room(&self, name: &str) -> bool {
        self.state.read().await.rooms.contains_key(name)
    }

    /// Seat table of a room, or `None` if it does not exist.
    pub async fn seats(&self, name: &str) -> Option<Vec<Option<SessionId>>> {
        self.state
            .read()
            .await
            .rooms
            .get(name)
            .map(|room| room.seats.clone())
    }

    pub async fn stats(&self) -> DirectoryStats {
        let state = self.state.read().await;
        DirectoryStats {
            rooms: state.rooms.len(),
            sessions: state.sessions.len(),
            sessions_registered: state.sessions_registered,
        }
    }
}
