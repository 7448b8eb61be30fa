use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::app::AppState;
use crate::error::ApiError;
use crate::logging::LogLevel;

/// GET / - service description
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "UAPI translator",
        "version": version,
        "description": "AV rooms and devices in University API resource shape",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "rooms": "/rooms[/:room_id[/devices]]",
            "devices": "/devices[/:device_id[/properties|/state]]",
            "inputs": "/inputs[/:input_id]",
            "displays": "/displays[/:display_id[/config|/state]]",
            "audio_outputs": "/audio_outputs[/:output_id[/state]]",
            "uapi": "/:room_id[/av_state|/av_config]?field_sets=basic,av_state,av_config",
            "log": "/log/:level (1 debug .. 5 off)",
        }
    }))
}

/// GET /health - reports whether the document store answers
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.services.ping_store().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            warn!("health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                })),
            )
        }
    }
}

/// GET|PUT /log/:level
pub async fn log_level(
    State(state): State<AppState>,
    Path(level): Path<String>,
) -> Result<String, ApiError> {
    let level = level
        .parse::<u8>()
        .ok()
        .and_then(LogLevel::from_number)
        .ok_or_else(|| ApiError::bad_request("invalid log level: must be [1-5]"))?;

    let control = state.log_control.as_ref().ok_or_else(|| {
        error!("log level change requested but logging is not reloadable");
        ApiError::internal_server_error("log level cannot be changed")
    })?;

    control.set_level(level).map_err(|e| {
        error!("{}", e);
        ApiError::internal_server_error(e.to_string())
    })?;

    info!(%level, "log level changed");
    Ok(format!("Set log level to {}", level))
}
