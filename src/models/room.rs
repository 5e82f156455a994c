use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

use crate::models::ConnectionId;

/// Registry-allocated room identifier. Rendered as a decimal string on the
/// wire, where it doubles as the connection group name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RoomId(u64);

impl RoomId {
    pub const FIRST: RoomId = RoomId(1);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid room id: {0:?}")]
pub struct InvalidRoomId(String);

/// Only the canonical decimal form is accepted, so a parsed id always names
/// the same group as the string it came from.
impl FromStr for RoomId {
    type Err = InvalidRoomId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<u64>() {
            Ok(value) if value.to_string() == s => Ok(RoomId(value)),
            _ => Err(InvalidRoomId(s.to_string())),
        }
    }
}

impl Serialize for RoomId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// ICE server credentials handed out to peers. Never interpreted here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceConfig {
    pub address: String,
    pub username: String,
    pub password: String,
}

/// A pending signaling session waiting for its second participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub ice: IceConfig,
    pub host: ConnectionId,
}

/// One row of the public room list.
///
/// Field names and the `Button` affordance match what browser clients render
/// directly into their room table. ICE credentials are intentionally part of
/// the public listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RoomListEntry {
    pub room_id: String,
    pub name: String,
    pub stun_address: String,
    pub stun_username: String,
    pub stun_password: String,
    pub button: String,
}

impl RoomListEntry {
    pub fn from_room(room: &Room, action_html: &str) -> Self {
        Self {
            room_id: room.id.to_string(),
            name: room.name.clone(),
            stun_address: room.ice.address.clone(),
            stun_username: room.ice.username.clone(),
            stun_password: room.ice.password.clone(),
            button: action_html.to_string(),
        }
    }
}
