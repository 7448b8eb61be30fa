// Document shapes as stored in CouchDB. Only the fields the gateway reads
// are modelled; everything else in a document is ignored.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub const DESCRIPTION_TAG: &str = "description";
pub const LOCATION_TAG: &str = "location";

/// Envelope returned by `_find`.
#[derive(Debug, Clone, Deserialize)]
pub struct FindResponse<T> {
    #[serde(default = "Vec::new")]
    pub docs: Vec<T>,
    #[serde(default)]
    pub bookmark: Option<String>,
    #[serde(default)]
    pub warning: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomDoc {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

impl RoomDoc {
    pub fn description(&self) -> String {
        self.description
            .clone()
            .filter(|d| !d.is_empty())
            .or_else(|| self.tags.get(DESCRIPTION_TAG).cloned())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceDoc {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(rename = "typeID", default)]
    pub type_id: String,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

impl DeviceDoc {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceTypeDoc {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub displays: Vec<String>,
    #[serde(default)]
    pub audio_devices: Vec<String>,
    #[serde(default)]
    pub independent_audio_devices: Vec<String>,
    #[serde(default)]
    pub inputs: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    pub name: String,
}

/// Per-room UI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiConfigDoc {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub presets: Vec<Preset>,
    #[serde(default)]
    pub input_configuration: Vec<InputConfig>,
}

impl UiConfigDoc {
    /// Preset addressed by a 1-based index.
    pub fn preset(&self, n: usize) -> Option<&Preset> {
        n.checked_sub(1).and_then(|i| self.presets.get(i))
    }

    /// 1-based indices of every preset that routes `input`.
    pub fn presets_routing(&self, input: &str) -> Vec<usize> {
        self.presets
            .iter()
            .enumerate()
            .filter(|(_, p)| p.inputs.iter().any(|i| i == input))
            .map(|(i, _)| i + 1)
            .collect()
    }

    pub fn is_independent_audio(&self, name: &str) -> bool {
        self.presets
            .iter()
            .any(|p| p.independent_audio_devices.iter().any(|d| d == name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ui_config_parses_camel_case_document() {
        let doc: UiConfigDoc = serde_json::from_value(json!({
            "_id": "ITB-1101",
            "_rev": "4-abc",
            "presets": [{
                "name": "Front",
                "displays": ["D1", "D2"],
                "audioDevices": ["D1"],
                "independentAudioDevices": ["MIC1"],
                "inputs": ["HDMI1", "PC1"]
            }],
            "inputConfiguration": [{ "name": "HDMI1", "type": "hdmi" }]
        }))
        .unwrap();

        assert_eq!(doc.presets[0].audio_devices, vec!["D1"]);
        assert_eq!(doc.input_configuration[0].name, "HDMI1");
        assert!(doc.preset(0).is_none());
        assert_eq!(doc.preset(1).map(|p| p.name.as_str()), Some("Front"));
        assert!(doc.preset(2).is_none());
        assert_eq!(doc.presets_routing("PC1"), vec![1]);
        assert!(doc.is_independent_audio("MIC1"));
    }

    #[test]
    fn find_response_tolerates_missing_docs() {
        let resp: FindResponse<DeviceDoc> =
            serde_json::from_value(json!({ "warning": "no matching index found" })).unwrap();
        assert!(resp.docs.is_empty());
        assert_eq!(resp.warning.as_deref(), Some("no matching index found"));
    }
}
