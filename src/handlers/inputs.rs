use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::{failed, RoomFilter};
use crate::app::AppState;
use crate::error::ApiError;
use crate::models::Input;

/// GET /inputs
pub async fn input_list(
    State(state): State<AppState>,
    Query(filter): Query<RoomFilter>,
) -> Result<Json<Vec<Input>>, ApiError> {
    state
        .services
        .inputs(filter.room_number.as_deref(), filter.building_abbreviation.as_deref())
        .await
        .map(Json)
        .map_err(|e| failed("list inputs", "", e))
}

/// GET /inputs/:input_id
pub async fn input_get(
    State(state): State<AppState>,
    Path(input_id): Path<String>,
) -> Result<Json<Input>, ApiError> {
    state
        .services
        .input(&input_id)
        .await
        .map(Json)
        .map_err(|e| failed("get input", &input_id, e))
}
