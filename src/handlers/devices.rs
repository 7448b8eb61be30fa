use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::{failed, DeviceFilter};
use crate::app::AppState;
use crate::error::ApiError;
use crate::models::{Device, DeviceProperty, DeviceStateAttribute};

/// GET /devices - devices matching the room and type filters
pub async fn device_list(
    State(state): State<AppState>,
    Query(filter): Query<DeviceFilter>,
) -> Result<Json<Vec<Device>>, ApiError> {
    state
        .services
        .devices(
            filter.room_number.as_deref(),
            filter.building_abbreviation.as_deref(),
            filter.av_device_type.as_deref(),
        )
        .await
        .map(Json)
        .map_err(|e| failed("list devices", "", e))
}

/// GET /devices/:device_id
pub async fn device_get(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> Result<Json<Device>, ApiError> {
    state
        .services
        .device(&device_id)
        .await
        .map(Json)
        .map_err(|e| failed("get device", &device_id, e))
}

/// GET /devices/:device_id/properties
pub async fn device_properties(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> Result<Json<Vec<DeviceProperty>>, ApiError> {
    state
        .services
        .device_properties(&device_id)
        .await
        .map(Json)
        .map_err(|e| failed("get device properties", &device_id, e))
}

/// GET /devices/:device_id/state
pub async fn device_state(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> Result<Json<Vec<DeviceStateAttribute>>, ApiError> {
    state
        .services
        .device_state(&device_id)
        .await
        .map(Json)
        .map_err(|e| failed("get device state", &device_id, e))
}
