// handlers/mod.rs - HTTP handlers, one module per resource family
//
// Handlers stay thin: pull parameters out of the request, call `Services`
// and turn `ServiceError` into `ApiError`. Every failure is logged with the
// operation and identifier before it leaves the handler.
//
//   rooms.rs          GET /rooms[/:room_id[/devices]]
//   devices.rs        GET /devices[/:device_id[/properties|/state]]
//   inputs.rs         GET /inputs[/:input_id]
//   displays.rs       GET /displays[/:display_id[/config|/state]]
//   audio_outputs.rs  GET /audio_outputs[/:output_id[/state]]
//   uapi.rs           GET|PUT /:room_id, /:room_id/av_state, GET /:room_id/av_config
//   system.rs         GET /, GET /health, GET|PUT /log/:level

pub mod audio_outputs;
pub mod devices;
pub mod displays;
pub mod inputs;
pub mod rooms;
pub mod system;
pub mod uapi;

use serde::Deserialize;
use tracing::{error, info};

use crate::error::ApiError;
use crate::services::ServiceError;

/// `?room_number=&building_abbreviation=`
#[derive(Debug, Default, Deserialize)]
pub struct RoomFilter {
    pub room_number: Option<String>,
    pub building_abbreviation: Option<String>,
}

/// Room filters plus `?av_device_type=`
#[derive(Debug, Default, Deserialize)]
pub struct DeviceFilter {
    pub room_number: Option<String>,
    pub building_abbreviation: Option<String>,
    pub av_device_type: Option<String>,
}

/// Log a failed operation and convert it for the response.
pub(crate) fn failed(operation: &'static str, id: &str, err: ServiceError) -> ApiError {
    if err.is_upstream() {
        error!(operation, id, "{}", err);
    } else {
        info!(operation, id, "{}", err);
    }
    err.into()
}
