use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use tokio::sync::RwLock;

use crate::models::{ConnectionId, IceConfig, Room, RoomId};

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("room {0} already exists")]
    Conflict(RoomId),
}

struct Rooms {
    next_id: RoomId,
    by_id: BTreeMap<RoomId, Room>,
}

/// In-memory registry of pending rooms.
///
/// All operations go through a single reader/writer lock, so concurrent
/// calls behave as if they ran in some total order.
pub struct RoomRegistry {
    inner: RwLock<Rooms>,
    evict_stale_slot: bool,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Rooms {
                next_id: RoomId::FIRST,
                by_id: BTreeMap::new(),
            }),
            evict_stale_slot: false,
        }
    }

    /// Before each insertion, drop any room already sitting in the slot about
    /// to be allocated. Off by default: it can silently remove a live room.
    pub fn with_stale_slot_eviction(mut self, enabled: bool) -> Self {
        self.evict_stale_slot = enabled;
        self
    }

    // ==================== Room Operations ====================

    /// Allocate the next id and register a room under it.
    ///
    /// The id is consumed even when insertion fails, so it is never handed
    /// out twice.
    pub async fn create_room(
        &self,
        host: &ConnectionId,
        name: impl Into<String>,
        ice: IceConfig,
    ) -> Result<Room, RegistryError> {
        let mut guard = self.inner.write().await;
        let rooms = &mut *guard;

        let id = rooms.next_id;
        rooms.next_id = id.next();

        if self.evict_stale_slot {
            if let Some(stale) = rooms.by_id.remove(&id) {
                tracing::warn!(
                    room_id = %id,
                    host = %stale.host,
                    "Evicted room occupying the next id slot"
                );
            }
        }

        match rooms.by_id.entry(id) {
            Entry::Occupied(_) => {
                tracing::error!(room_id = %id, host = %host, "Room id already in use");
                Err(RegistryError::Conflict(id))
            }
            Entry::Vacant(slot) => {
                let room = Room {
                    id,
                    name: name.into(),
                    ice,
                    host: host.clone(),
                };
                slot.insert(room.clone());

                tracing::info!(room_id = %id, host = %host, name = %room.name, "Room created");
                Ok(room)
            }
        }
    }

    /// Get room by ID
    pub async fn get_room(&self, id: RoomId) -> Option<Room> {
        self.inner.read().await.by_id.get(&id).cloned()
    }

    /// Delete a room. Deleting an absent room is a no-op.
    pub async fn delete_room(&self, id: RoomId) -> Option<Room> {
        let removed = self.inner.write().await.by_id.remove(&id);

        if removed.is_some() {
            tracing::info!(room_id = %id, "Room deleted");
        }
        removed
    }

    // ==================== Host Operations ====================

    /// Room currently hosted by `host`, lowest id first if there are several.
    pub async fn hosted_by(&self, host: &ConnectionId) -> Option<Room> {
        self.inner
            .read()
            .await
            .by_id
            .values()
            .find(|room| &room.host == host)
            .cloned()
    }

    /// Remove at most one room hosted by `host`.
    pub async fn delete_room_by_host(&self, host: &ConnectionId) -> Option<Room> {
        let mut guard = self.inner.write().await;

        let id = guard
            .by_id
            .values()
            .find(|room| &room.host == host)
            .map(|room| room.id)?;
        let removed = guard.by_id.remove(&id);

        tracing::info!(room_id = %id, host = %host, "Room deleted with its host");
        removed
    }

    // ==================== Listing ====================

    /// Snapshot of all live rooms, ordered by id.
    pub async fn list_rooms(&self) -> Vec<Room> {
        self.inner.read().await.by_id.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.by_id.is_empty()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}
