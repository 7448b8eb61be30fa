// Displays are synthesized: preset N of a room's UI configuration is
// exposed as `BLDG-ROOM-DisplayN` and stands for every display in it.

use tracing::info;

use super::state::aggregate_display_state;
use super::{doc_room, ServiceError, Services};
use crate::identifier::{build_display_id, DeviceId};
use crate::models::{Display, DisplayConfig, DisplayState};
use crate::store::{Preset, UiConfigDoc};

impl Services {
    pub async fn displays(
        &self,
        room_num: Option<&str>,
        bldg_abbr: Option<&str>,
    ) -> Result<Vec<Display>, ServiceError> {
        info!(room_num, bldg_abbr, "searching displays");
        let configs = self.ui_configs(room_num, bldg_abbr, "displays").await?;

        let mut displays = Vec::new();
        for config in &configs {
            let Some(room) = doc_room(&config.id) else {
                continue;
            };
            for n in 1..=config.presets.len() {
                displays.push(Display {
                    av_display_id: build_display_id(&room, n),
                    room_number: room.room.clone(),
                    building_abbreviation: room.building.clone(),
                });
            }
        }
        Ok(displays)
    }

    pub async fn display(&self, id: &str) -> Result<Display, ServiceError> {
        info!(id, "getting display");
        let (device_id, _, _) = self.resolve_display(id).await?;
        Ok(Display {
            av_display_id: device_id.to_string(),
            room_number: device_id.room_number().to_string(),
            building_abbreviation: device_id.building().to_string(),
        })
    }

    /// Member devices and routable inputs of the display's preset.
    pub async fn display_config(&self, id: &str) -> Result<DisplayConfig, ServiceError> {
        info!(id, "getting display config");
        let (device_id, config, index) = self.resolve_display(id).await?;
        let preset = preset_at(&config, index, id)?;
        Ok(DisplayConfig {
            av_devices: preset.displays.iter().map(|d| device_id.room.device(d)).collect(),
            av_inputs: preset.inputs.iter().map(|i| device_id.room.device(i)).collect(),
        })
    }

    pub async fn display_state(&self, id: &str) -> Result<DisplayState, ServiceError> {
        info!(id, "getting display state");
        let (device_id, config, index) = self.resolve_display(id).await?;
        let preset = preset_at(&config, index, id)?;
        let state = self.room_state(&device_id.room).await?;

        aggregate_display_state(&preset.displays, &state)
            .ok_or_else(|| ServiceError::NotFound(format!("no state found for display {}", id)))
    }

    /// Parse the ID, load the room's UI configuration and check the preset
    /// exists. A malformed ID fails before any lookup.
    async fn resolve_display(&self, id: &str) -> Result<(DeviceId, UiConfigDoc, usize), ServiceError> {
        let device_id = DeviceId::parse(id)?;
        let index = device_id.display_index()?;
        let config = self.ui_config(&device_id.room).await?;
        preset_at(&config, index, id)?;
        Ok((device_id, config, index))
    }
}

fn preset_at<'a>(config: &'a UiConfigDoc, index: usize, id: &str) -> Result<&'a Preset, ServiceError> {
    config
        .preset(index)
        .ok_or_else(|| ServiceError::NotFound(format!("display {} does not exist", id)))
}
