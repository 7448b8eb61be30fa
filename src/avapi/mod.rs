pub mod client;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::identifier::RoomId;

pub use client::AvApiClient;

/// Device roles that mark a device as part of the audio path.
pub const AUDIO_ROLES: &[&str] = &["AudioOut", "AudioIn", "Microphone"];

pub const POWER_ON: &str = "on";

#[derive(Debug, Error)]
pub enum AvApiError {
    #[error("AV API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid AV API url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("AV API request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Live state of one display as reported by the AV API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateDisplay {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub power: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub input: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blanked: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateAudioDevice {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub power: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub input: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<i32>,
}

/// Room state in the AV API's own shape. Also accepted as the body of a
/// state change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomState {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub building: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub room: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_video_input: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_audio_input: Option<String>,
    #[serde(default)]
    pub displays: Vec<StateDisplay>,
    #[serde(default)]
    pub audio_devices: Vec<StateAudioDevice>,
}

impl RoomState {
    pub fn display(&self, name: &str) -> Option<&StateDisplay> {
        self.displays.iter().find(|d| d.name == name)
    }

    pub fn audio_device(&self, name: &str) -> Option<&StateAudioDevice> {
        self.audio_devices.iter().find(|d| d.name == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceRole {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigDevice {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub roles: Vec<DeviceRole>,
}

impl ConfigDevice {
    pub fn is_audio_capable(&self) -> bool {
        self.roles
            .iter()
            .any(|r| AUDIO_ROLES.iter().any(|a| a.eq_ignore_ascii_case(&r.id)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomConfig {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub designation: String,
    #[serde(default)]
    pub devices: Vec<ConfigDevice>,
}

/// Room configuration plus which outputs every input can reach.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReachableRoomConfig {
    pub room: RoomConfig,
    #[serde(default)]
    pub input_reachability: HashMap<String, Vec<String>>,
}

impl ReachableRoomConfig {
    fn is_reachable(&self, device: &ConfigDevice) -> bool {
        let matches = |s: &String| *s == device.name || *s == device.id;
        self.input_reachability
            .iter()
            .any(|(input, outputs)| matches(input) || outputs.iter().any(matches))
    }

    /// Devices worth exposing: audio-capable ones and anything that appears
    /// in the reachability graph.
    pub fn reachable_devices(&self) -> Vec<&ConfigDevice> {
        self.room
            .devices
            .iter()
            .filter(|d| d.is_audio_capable() || self.is_reachable(d))
            .collect()
    }
}

/// The sibling AV control API.
#[async_trait]
pub trait AvControl: Send + Sync {
    async fn get_state(&self, room: &RoomId) -> Result<RoomState, AvApiError>;

    async fn set_state(&self, room: &RoomId, body: &RoomState) -> Result<RoomState, AvApiError>;

    async fn get_config(&self, room: &RoomId) -> Result<ReachableRoomConfig, AvApiError>;
}
