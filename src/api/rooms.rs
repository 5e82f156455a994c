use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::error::{AppError, Result};
use crate::models::{RoomId, RoomListEntry};
use crate::state::AppState;

/// Room routes
pub fn room_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_rooms))
        .route("/{room_id}", get(get_room))
}

/// GET /api/v1/rooms - Pending rooms, same rows as the `updateRoom` event
async fn list_rooms(State(state): State<AppState>) -> Json<Vec<RoomListEntry>> {
    let rooms = state.registry.list_rooms().await;
    Json(
        rooms
            .iter()
            .map(|room| RoomListEntry::from_room(room, &state.config.room_action_html))
            .collect(),
    )
}

/// GET /api/v1/rooms/:room_id - Get room information
async fn get_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomListEntry>> {
    let id: RoomId = room_id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid room ID format".to_string()))?;

    let room = state
        .registry
        .get_room(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Room {} not found", room_id)))?;

    Ok(Json(RoomListEntry::from_room(
        &room,
        &state.config.room_action_html,
    )))
}
