use std::sync::Arc;

use crate::config::Config;
use crate::registry::RoomRegistry;
use crate::ws::ConnectionHub;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: Arc<RoomRegistry>,
    pub hub: Arc<ConnectionHub>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let registry = RoomRegistry::new().with_stale_slot_eviction(config.evict_stale_room_slot);

        Self {
            config: Arc::new(config),
            registry: Arc::new(registry),
            hub: Arc::new(ConnectionHub::new()),
        }
    }
}
