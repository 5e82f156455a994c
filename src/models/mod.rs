pub mod connection;
pub mod room;

pub use connection::ConnectionId;
pub use room::{IceConfig, Room, RoomId, RoomListEntry};
