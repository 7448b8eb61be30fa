use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::{failed, RoomFilter};
use crate::app::AppState;
use crate::error::ApiError;
use crate::models::{AudioOutput, AudioOutputState};

/// GET /audio_outputs
pub async fn audio_output_list(
    State(state): State<AppState>,
    Query(filter): Query<RoomFilter>,
) -> Result<Json<Vec<AudioOutput>>, ApiError> {
    state
        .services
        .audio_outputs(filter.room_number.as_deref(), filter.building_abbreviation.as_deref())
        .await
        .map(Json)
        .map_err(|e| failed("list audio outputs", "", e))
}

/// GET /audio_outputs/:output_id
pub async fn audio_output_get(
    State(state): State<AppState>,
    Path(output_id): Path<String>,
) -> Result<Json<AudioOutput>, ApiError> {
    state
        .services
        .audio_output(&output_id)
        .await
        .map(Json)
        .map_err(|e| failed("get audio output", &output_id, e))
}

/// GET /audio_outputs/:output_id/state
pub async fn audio_output_state(
    State(state): State<AppState>,
    Path(output_id): Path<String>,
) -> Result<Json<AudioOutputState>, ApiError> {
    state
        .services
        .audio_output_state(&output_id)
        .await
        .map(Json)
        .map_err(|e| failed("get audio output state", &output_id, e))
}
