// Response bodies of the flat resource endpoints. Field names are the
// public wire names and must not change.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub av_room_id: String,
    pub room_number: String,
    pub building_abbreviation: String,
    pub av_room_description: String,
    pub av_resources: Vec<RoomResource>,
}

/// Devices in a room grouped by their description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomResource {
    pub quantity: usize,
    pub resource: String,
    pub locations: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomDevices {
    pub av_displays: Vec<String>,
    pub av_audio_outputs: Vec<String>,
    pub av_inputs: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub av_device_id: String,
    pub av_device_name: String,
    pub av_device_type: String,
    pub building_abbreviation: String,
    pub room_number: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceProperty {
    pub av_device_property_name: String,
    pub av_device_property_value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceStateAttribute {
    pub av_device_state_attribute_name: String,
    pub av_device_state_attribute_value: String,
}

impl DeviceStateAttribute {
    pub fn new(name: &str, value: impl ToString) -> Self {
        Self {
            av_device_state_attribute_name: name.to_string(),
            av_device_state_attribute_value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Input {
    pub av_device_id: String,
    pub room_number: String,
    pub building_abbreviation: String,
    pub av_device_type: String,
    pub av_outputs: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Display {
    pub av_display_id: String,
    pub room_number: String,
    pub building_abbreviation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub av_devices: Vec<String>,
    pub av_inputs: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayState {
    pub av_display_powered: bool,
    pub av_display_blanked: bool,
    pub av_display_input: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioOutput {
    pub av_audio_output_id: String,
    pub room_number: String,
    pub building_abbreviation: String,
    pub av_device_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioOutputState {
    pub av_audio_output_volume_level: i32,
    pub av_audio_output_muted: bool,
}
