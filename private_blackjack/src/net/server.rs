//! Connection acceptor and lobby worker.
//!
//! Every accepted connection gets its own lobby task. The lobby serves
//! listing, creation, and join requests until the session is seated, at
//! which point the connection is handed to the room's worker.

use std::sync::Arc;
use tokio::net::TcpListener;

use super::{
    connection::Connection,
    messages::{Action, encode_room_list},
};
use crate::room::{directory::Directory, messages::RoomMessage};

/// Accept connections forever, spawning a lobby task for each.
pub async fn run(listener: TcpListener, directory: Arc<Directory>) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                if let Err(error) = stream.set_nodelay(true) {
                    log::debug!("couldn't disable Nagle for {addr}: {error}");
                }
                let connection = Connection::new(stream, addr.to_string());
                tokio::spawn(serve_connection(Arc::clone(&directory), connection));
            }
            // Accept errors (e.g. running out of descriptors) are transient
            // for the listener as a whole.
            Err(error) => log::warn!("accept failed: {error}"),
        }
    }
}

/// Drive one connection through the lobby.
///
/// Returns once the session is seated in a room or has been unregistered.
pub async fn serve_connection(directory: Arc<Directory>, mut connection: Connection) {
    let id = directory.register(connection.peer()).await;
    log::info!("{id} connected from {}", connection.peer());

    loop {
        let action = match connection.recv_action().await {
            Ok(action) => action,
            Err(error) => {
                log::info!("{id} left the lobby: {error}");
                break;
            }
        };

        match action {
            Action::List => {
                let rooms = directory.list_open_rooms().await;
                if let Err(error) = connection.send_text(&encode_room_list(&rooms)).await {
                    log::info!("{id} left the lobby: {error}");
                    break;
                }
            }
            Action::Create => {
                let created = match connection.recv_text().await {
                    Ok(name) => directory.create_room(&name).await,
                    Err(error) => {
                        log::info!("{id} left the lobby: {error}");
                        break;
                    }
                };
                if let Err(error) = &created {
                    log::debug!("{id} couldn't create a room: {error}");
                }
                if connection.send_bool(created.is_ok()).await.is_err() {
                    break;
                }
            }
            Action::Join => {
                let name = match connection.recv_text().await {
                    Ok(name) => name,
                    Err(error) => {
                        log::info!("{id} left the lobby: {error}");
                        break;
                    }
                };
                let (seat, handle) = match directory.reserve_seat(id, &name).await {
                    Ok(reserved) => reserved,
                    Err(error) => {
                        log::debug!("{id} couldn't join: {error}");
                        if connection.send_bool(false).await.is_err() {
                            break;
                        }
                        continue;
                    }
                };
                if connection.send_bool(true).await.is_err() {
                    break;
                }
                let message = RoomMessage::Seat {
                    seat,
                    session: id,
                    connection,
                };
                if let Err(error) = handle.send(message).await {
                    log::warn!("{id} couldn't be seated: {error}");
                    directory.unregister(id).await;
                }
                return;
            }
            Action::Exit | Action::Unregister => {
                log::info!("{id} left the lobby");
                break;
            }
            other => log::debug!("{id} sent {other} in the lobby, ignoring"),
        }
    }

    directory.unregister(id).await;
}
