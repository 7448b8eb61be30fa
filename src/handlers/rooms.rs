use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::{failed, RoomFilter};
use crate::app::AppState;
use crate::error::ApiError;
use crate::models::{Room, RoomDevices};

/// GET /rooms - rooms matching the filters
pub async fn room_list(
    State(state): State<AppState>,
    Query(filter): Query<RoomFilter>,
) -> Result<Json<Vec<Room>>, ApiError> {
    state
        .services
        .rooms(filter.room_number.as_deref(), filter.building_abbreviation.as_deref())
        .await
        .map(Json)
        .map_err(|e| failed("list rooms", "", e))
}

/// GET /rooms/:room_id
pub async fn room_get(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<Room>, ApiError> {
    state
        .services
        .room(&room_id)
        .await
        .map(Json)
        .map_err(|e| failed("get room", &room_id, e))
}

/// GET /rooms/:room_id/devices - logical device IDs in the room
pub async fn room_devices(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDevices>, ApiError> {
    state
        .services
        .room_devices(&room_id)
        .await
        .map(Json)
        .map_err(|e| failed("get room devices", &room_id, e))
}
