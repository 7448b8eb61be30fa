use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::{failed, RoomFilter};
use crate::app::AppState;
use crate::error::ApiError;
use crate::models::{Display, DisplayConfig, DisplayState};

/// GET /displays - one display per preset of every matching room
pub async fn display_list(
    State(state): State<AppState>,
    Query(filter): Query<RoomFilter>,
) -> Result<Json<Vec<Display>>, ApiError> {
    state
        .services
        .displays(filter.room_number.as_deref(), filter.building_abbreviation.as_deref())
        .await
        .map(Json)
        .map_err(|e| failed("list displays", "", e))
}

/// GET /displays/:display_id
pub async fn display_get(
    State(state): State<AppState>,
    Path(display_id): Path<String>,
) -> Result<Json<Display>, ApiError> {
    state
        .services
        .display(&display_id)
        .await
        .map(Json)
        .map_err(|e| failed("get display", &display_id, e))
}

/// GET /displays/:display_id/config
pub async fn display_config(
    State(state): State<AppState>,
    Path(display_id): Path<String>,
) -> Result<Json<DisplayConfig>, ApiError> {
    state
        .services
        .display_config(&display_id)
        .await
        .map(Json)
        .map_err(|e| failed("get display config", &display_id, e))
}

/// GET /displays/:display_id/state
pub async fn display_state(
    State(state): State<AppState>,
    Path(display_id): Path<String>,
) -> Result<Json<DisplayState>, ApiError> {
    state
        .services
        .display_state(&display_id)
        .await
        .map(Json)
        .map_err(|e| failed("get display state", &display_id, e))
}
