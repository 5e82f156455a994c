pub mod health;
pub mod rooms;

use axum::Router;

use crate::state::AppState;
use crate::ws::ws_routes;

/// Create the router with the HTTP API and the signaling socket
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes())
        .merge(health::health_routes())
        .merge(ws_routes())
        .with_state(state)
}

/// API v1 routes
fn api_routes() -> Router<AppState> {
    Router::new().nest("/rooms", rooms::room_routes())
}
