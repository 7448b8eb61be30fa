use tracing::info;

use super::{doc_room, ServiceError, Services};
use crate::identifier::{build_display_id, DeviceId, RoomId};
use crate::models::Input;
use crate::store::UiConfigDoc;

impl Services {
    pub async fn inputs(
        &self,
        room_num: Option<&str>,
        bldg_abbr: Option<&str>,
    ) -> Result<Vec<Input>, ServiceError> {
        info!(room_num, bldg_abbr, "searching inputs");
        let configs = self.ui_configs(room_num, bldg_abbr, "inputs").await?;

        let mut inputs = Vec::new();
        for config in &configs {
            let Some(room) = doc_room(&config.id) else {
                continue;
            };
            for input in &config.input_configuration {
                let id = room.device(&input.name);
                let device_type = self.device_type_of(&id).await?;
                inputs.push(Input {
                    av_device_id: id,
                    room_number: room.room.clone(),
                    building_abbreviation: room.building.clone(),
                    av_device_type: device_type,
                    av_outputs: routed_displays(&room, config, &input.name),
                });
            }
        }
        Ok(inputs)
    }

    pub async fn input(&self, id: &str) -> Result<Input, ServiceError> {
        info!(id, "getting input");
        let device_id = DeviceId::parse(id)?;
        let config = self.ui_config(&device_id.room).await?;

        if !config.input_configuration.iter().any(|i| i.name == device_id.suffix) {
            return Err(ServiceError::NotFound(format!("input {} does not exist", id)));
        }

        Ok(Input {
            av_device_id: device_id.to_string(),
            room_number: device_id.room_number().to_string(),
            building_abbreviation: device_id.building().to_string(),
            av_device_type: self.device_type_of(id).await?,
            av_outputs: routed_displays(&device_id.room, &config, &device_id.suffix),
        })
    }
}

/// Display IDs of every preset that can route `input`.
fn routed_displays(room: &RoomId, config: &UiConfigDoc, input: &str) -> Vec<String> {
    config
        .presets_routing(input)
        .into_iter()
        .map(|n| build_display_id(room, n))
        .collect()
}
