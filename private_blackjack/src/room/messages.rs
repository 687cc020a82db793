//! Room worker message types.

use super::directory::SessionId;
use crate::{game::entities::SeatIndex, net::connection::Connection};

/// Messages that can be sent to a RoomWorker
#[derive(Debug)]
pub enum RoomMessage {
    /// A lobby reserved `seat` for `session` and hands its connection over.
    /// The room worker owns the connection from here on.
    Seat {
        seat: SeatIndex,
        session: SessionId,
        connection: Connection,
    },
}
