use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::{IceConfig, Room, RoomListEntry};

/// Wrapper for all WebSocket messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalingMessage {
    #[serde(rename = "type")]
    pub msg_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl SignalingMessage {
    pub fn new(msg_type: &str, payload: serde_json::Value) -> Self {
        Self {
            msg_type: msg_type.to_string(),
            request_id: None,
            payload,
        }
    }

    pub fn with_request_id(mut self, request_id: Option<String>) -> Self {
        self.request_id = request_id;
        self
    }

    pub fn error(message: &str, request_id: Option<String>) -> Self {
        Self::new(msg_types::ERROR, serde_json::Value::String(message.to_string()))
            .with_request_id(request_id)
    }

    /// `updateRoom` event carrying the room list as a JSON-encoded string.
    pub fn room_list(rooms: &[Room], action_html: &str) -> Self {
        let entries: Vec<RoomListEntry> = rooms
            .iter()
            .map(|room| RoomListEntry::from_room(room, action_html))
            .collect();
        let data = match serde_json::to_string(&entries) {
            Ok(data) => data,
            Err(e) => {
                tracing::error!(error = %e, rooms = rooms.len(), "Failed to encode room list");
                "[]".to_string()
            }
        };

        Self::new(msg_types::UPDATE_ROOM, serde_json::Value::String(data))
    }
}

/// Negotiation payload relayed between peers. Never inspected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpaquePayload(serde_json::Value);

impl OpaquePayload {
    pub fn into_value(self) -> serde_json::Value {
        self.0
    }
}

// ==================== Client -> Server Messages ====================

/// create_room message payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomPayload {
    pub name: String,
    #[serde(default, alias = "iceAddress")]
    pub stun_address: String,
    #[serde(default, alias = "iceUsername", alias = "username")]
    pub stun_username: String,
    #[serde(default, alias = "icePassword", alias = "password")]
    pub stun_password: String,
}

impl CreateRoomPayload {
    /// Browser clients send the room description either as an object or as
    /// a string holding the JSON-encoded object.
    pub fn parse(payload: serde_json::Value) -> Result<Self, AppError> {
        let parsed = match payload {
            serde_json::Value::String(data) => serde_json::from_str(&data)?,
            other => serde_json::from_value(other)?,
        };
        Ok(parsed)
    }

    pub fn ice_config(&self) -> IceConfig {
        IceConfig {
            address: self.stun_address.clone(),
            username: self.stun_username.clone(),
            password: self.stun_password.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RoomRefPayload {
    #[serde(alias = "roomId")]
    room_id: serde_json::Value,
}

/// Extract the room id targeted by join / leave_room.
///
/// Accepts a bare string or number, or an object with `room_id`.
pub fn room_ref(payload: serde_json::Value) -> Result<String, AppError> {
    match payload {
        serde_json::Value::String(id) => Ok(id),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Object(_) => {
            let room: RoomRefPayload = serde_json::from_value(payload)?;
            room_ref(room.room_id)
        }
        _ => Err(AppError::BadRequest("room_id is required".to_string())),
    }
}

/// send_message message payload
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessagePayload {
    #[serde(alias = "roomId")]
    pub room_id: serde_json::Value,
    pub message: OpaquePayload,
}

impl SendMessagePayload {
    pub fn parse(payload: serde_json::Value) -> Result<(String, OpaquePayload), AppError> {
        let parsed: SendMessagePayload = serde_json::from_value(payload)?;
        Ok((room_ref(parsed.room_id)?, parsed.message))
    }
}

/// Message types enum for matching
pub mod msg_types {
    pub const CREATE_ROOM: &str = "create_room";
    pub const JOIN: &str = "join";
    pub const LEAVE_ROOM: &str = "leave_room";
    pub const GET_ROOM_INFO: &str = "get_room_info";
    pub const SEND_MESSAGE: &str = "send_message";
    pub const PING: &str = "ping";

    // Server -> Client
    pub const UPDATE_ROOM: &str = "updateRoom";
    pub const CREATED: &str = "created";
    pub const JOINED: &str = "joined";
    pub const READY: &str = "ready";
    pub const MESSAGE: &str = "message";
    pub const BYE: &str = "bye";
    pub const ERROR: &str = "error";
    pub const PONG: &str = "pong";
}
