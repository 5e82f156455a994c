use dashmap::DashMap;
use tokio::sync::mpsc;

use crate::models::ConnectionId;
use crate::ws::SignalingMessage;

/// Client connection handle for sending messages
#[derive(Clone)]
pub struct ClientHandle {
    pub conn_id: ConnectionId,
    sender: mpsc::UnboundedSender<SignalingMessage>,
}

impl ClientHandle {
    pub fn new(conn_id: ConnectionId, sender: mpsc::UnboundedSender<SignalingMessage>) -> Self {
        Self { conn_id, sender }
    }

    pub fn send(
        &self,
        msg: SignalingMessage,
    ) -> Result<(), mpsc::error::SendError<SignalingMessage>> {
        self.sender.send(msg)
    }

    /// Best-effort delivery; a closed connection only gets a debug log.
    fn deliver(&self, msg: SignalingMessage) {
        if let Err(e) = self.send(msg) {
            tracing::debug!(
                conn_id = %self.conn_id,
                msg_type = %e.0.msg_type,
                "Dropping message for closed connection"
            );
        }
    }
}

/// Connections addressed together under one group name
pub struct ConnectionGroup {
    clients: DashMap<ConnectionId, ClientHandle>,
}

impl ConnectionGroup {
    pub fn new() -> Self {
        Self {
            clients: DashMap::new(),
        }
    }

    pub fn add_client(&self, handle: ClientHandle) {
        self.clients.insert(handle.conn_id.clone(), handle);
    }

    pub fn remove_client(&self, conn_id: &ConnectionId) -> Option<ClientHandle> {
        self.clients.remove(conn_id).map(|(_, v)| v)
    }

    pub fn broadcast(&self, msg: &SignalingMessage, exclude_conn_id: Option<&ConnectionId>) {
        for client in self.clients.iter() {
            if exclude_conn_id == Some(&client.conn_id) {
                continue;
            }
            client.deliver(msg.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn client_ids(&self) -> Vec<ConnectionId> {
        self.clients.iter().map(|r| r.conn_id.clone()).collect()
    }
}

impl Default for ConnectionGroup {
    fn default() -> Self {
        Self::new()
    }
}

/// Every live connection plus the named groups they belong to.
///
/// Groups are created on first use and dropped once their last member
/// disconnects. Membership does not depend on the room registry.
pub struct ConnectionHub {
    connections: DashMap<ConnectionId, ClientHandle>,
    groups: DashMap<String, ConnectionGroup>,
}

impl ConnectionHub {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            groups: DashMap::new(),
        }
    }

    pub fn register(&self, handle: ClientHandle) {
        self.connections.insert(handle.conn_id.clone(), handle);
    }

    /// Forget a connection and drop it from every group.
    pub fn unregister(&self, conn_id: &ConnectionId) -> Option<ClientHandle> {
        let handle = self.connections.remove(conn_id).map(|(_, v)| v);

        self.groups.retain(|_, group| {
            group.remove_client(conn_id);
            !group.is_empty()
        });

        handle
    }

    /// Returns false if the connection is not registered.
    pub fn add_to_group(&self, group: &str, conn_id: &ConnectionId) -> bool {
        let Some(handle) = self.connections.get(conn_id).map(|r| r.clone()) else {
            tracing::warn!(conn_id = %conn_id, group = %group, "Unknown connection, not grouped");
            return false;
        };

        self.groups
            .entry(group.to_string())
            .or_default()
            .add_client(handle);

        tracing::debug!(conn_id = %conn_id, group = %group, "Added to group");
        true
    }

    pub fn send_to(&self, conn_id: &ConnectionId, msg: SignalingMessage) {
        match self.connections.get(conn_id) {
            Some(client) => client.deliver(msg),
            None => tracing::debug!(conn_id = %conn_id, "Send to unknown connection dropped"),
        }
    }

    pub fn broadcast_to_group(
        &self,
        group: &str,
        msg: SignalingMessage,
        exclude_conn_id: Option<&ConnectionId>,
    ) {
        if let Some(group) = self.groups.get(group) {
            group.broadcast(&msg, exclude_conn_id);
        }
    }

    pub fn broadcast_all(&self, msg: SignalingMessage) {
        for client in self.connections.iter() {
            client.deliver(msg.clone());
        }
    }

    pub fn group_members(&self, group: &str) -> Vec<ConnectionId> {
        self.groups
            .get(group)
            .map(|g| g.client_ids())
            .unwrap_or_default()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}

impl Default for ConnectionHub {
    fn default() -> Self {
        Self::new()
    }
}
