use crate::models::{ConnectionId, RoomId};

/// Where one connection stands in the pairing flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// Connected, nothing created or joined yet.
    Idle,
    /// Created a room. Stays here after a peer joins; the room itself is
    /// gone from the registry by then.
    Hosting(RoomId),
    /// Joined the group with this name.
    Joined(String),
    Disconnected,
}

/// WebSocket session state
#[derive(Debug)]
pub struct WsSessionState {
    pub conn_id: ConnectionId,
    state: ConnectionState,
}

impl WsSessionState {
    pub fn new(conn_id: ConnectionId) -> Self {
        Self {
            conn_id,
            state: ConnectionState::Idle,
        }
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn host(&mut self, room_id: RoomId) {
        self.transition(ConnectionState::Hosting(room_id));
    }

    pub fn join(&mut self, group: String) {
        self.transition(ConnectionState::Joined(group));
    }

    /// Leaving only ends a joined session; a host keeps its hosting state.
    pub fn leave(&mut self) {
        if matches!(self.state, ConnectionState::Joined(_)) {
            self.transition(ConnectionState::Idle);
        }
    }

    pub fn disconnect(&mut self) {
        self.transition(ConnectionState::Disconnected);
    }

    pub fn is_in_group(&self, group: &str) -> bool {
        match &self.state {
            ConnectionState::Hosting(id) => id.to_string() == group,
            ConnectionState::Joined(joined) => joined == group,
            _ => false,
        }
    }

    pub fn is_disconnected(&self) -> bool {
        self.state == ConnectionState::Disconnected
    }

    fn transition(&mut self, next: ConnectionState) {
        if self.is_disconnected() {
            tracing::warn!(conn_id = %self.conn_id, next = ?next, "Ignoring transition after disconnect");
            return;
        }
        tracing::trace!(conn_id = %self.conn_id, from = ?self.state, to = ?next, "Session state change");
        self.state = next;
    }
}
