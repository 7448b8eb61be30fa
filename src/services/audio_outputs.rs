// Audio outputs come in two kinds. Preset N's grouped audio devices are
// exposed together as `BLDG-ROOM-MasterAudioN`; independent audio devices
// (microphones and the like) are exposed under their own device ID.

use std::collections::HashSet;

use tracing::info;

use super::state::{aggregate_audio_state, audio_device_state};
use super::{doc_room, ServiceError, Services};
use crate::identifier::{build_master_audio_id, parse_indexed_suffix, DeviceId, RoomId, MASTER_AUDIO_PREFIX};
use crate::models::{AudioOutput, AudioOutputState};
use crate::store::UiConfigDoc;

/// Device type reported for grouped outputs.
pub const MASTER_AUDIO_TYPE: &str = "MasterAudio";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutputKind {
    /// Grouped audio of the preset at this 1-based index.
    Master(usize),
    Independent,
}

/// Every audio output ID in a room in preset order: a preset's master
/// output first, then its independent devices. Independent devices shared
/// by several presets are listed once.
pub(crate) fn audio_output_ids(room: &RoomId, config: &UiConfigDoc) -> Vec<(String, OutputKind)> {
    let mut seen = HashSet::new();
    let mut outputs = Vec::new();

    for (i, preset) in config.presets.iter().enumerate() {
        if !preset.audio_devices.is_empty() {
            outputs.push((build_master_audio_id(room, i + 1), OutputKind::Master(i + 1)));
        }
        for device in &preset.independent_audio_devices {
            let id = room.device(device);
            if seen.insert(id.clone()) {
                outputs.push((id, OutputKind::Independent));
            }
        }
    }
    outputs
}

impl Services {
    pub async fn audio_outputs(
        &self,
        room_num: Option<&str>,
        bldg_abbr: Option<&str>,
    ) -> Result<Vec<AudioOutput>, ServiceError> {
        info!(room_num, bldg_abbr, "searching audio outputs");
        let configs = self.ui_configs(room_num, bldg_abbr, "audio outputs").await?;

        let mut outputs = Vec::new();
        for config in &configs {
            let Some(room) = doc_room(&config.id) else {
                continue;
            };
            for (id, kind) in audio_output_ids(&room, config) {
                let device_type = match kind {
                    OutputKind::Master(_) => MASTER_AUDIO_TYPE.to_string(),
                    OutputKind::Independent => self.device_type_of(&id).await?,
                };
                outputs.push(AudioOutput {
                    av_audio_output_id: id,
                    room_number: room.room.clone(),
                    building_abbreviation: room.building.clone(),
                    av_device_type: device_type,
                });
            }
        }
        Ok(outputs)
    }

    pub async fn audio_output(&self, id: &str) -> Result<AudioOutput, ServiceError> {
        info!(id, "getting audio output");
        let (device_id, _, kind) = self.resolve_audio_output(id).await?;

        let device_type = match kind {
            OutputKind::Master(_) => MASTER_AUDIO_TYPE.to_string(),
            OutputKind::Independent => self.device(id).await?.av_device_type,
        };

        Ok(AudioOutput {
            av_audio_output_id: device_id.to_string(),
            room_number: device_id.room_number().to_string(),
            building_abbreviation: device_id.building().to_string(),
            av_device_type: device_type,
        })
    }

    pub async fn audio_output_state(&self, id: &str) -> Result<AudioOutputState, ServiceError> {
        info!(id, "getting audio output state");
        let (device_id, config, kind) = self.resolve_audio_output(id).await?;
        let state = self.room_state(&device_id.room).await?;

        let result = match kind {
            OutputKind::Master(n) => config
                .preset(n)
                .and_then(|preset| aggregate_audio_state(&preset.audio_devices, &state)),
            OutputKind::Independent => state.audio_device(&device_id.suffix).map(audio_device_state),
        };
        result.ok_or_else(|| {
            ServiceError::NotFound(format!("no state found for audio output device {}", id))
        })
    }

    /// Parse the ID and confirm the room's UI configuration defines it.
    async fn resolve_audio_output(
        &self,
        id: &str,
    ) -> Result<(DeviceId, UiConfigDoc, OutputKind), ServiceError> {
        let device_id = DeviceId::parse(id)?;
        let kind = if device_id.is_master_audio() {
            OutputKind::Master(parse_indexed_suffix(&device_id.suffix, MASTER_AUDIO_PREFIX)?)
        } else {
            OutputKind::Independent
        };

        let config = self.ui_config(&device_id.room).await?;
        let defined = match kind {
            OutputKind::Master(n) => config.preset(n).is_some_and(|p| !p.audio_devices.is_empty()),
            OutputKind::Independent => config.is_independent_audio(&device_id.suffix),
        };
        if !defined {
            return Err(ServiceError::NotFound(format!("audio output {} does not exist", id)));
        }

        Ok((device_id, config, kind))
    }
}
