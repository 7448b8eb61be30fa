// Live state aggregation for synthesized devices.
//
// A Display<N> or MasterAudio<N> stands for every member device in its
// preset. These functions fold the members' AV API state into one value and
// return `None` when no member has any state at all.

use tracing::warn;

use crate::avapi::{RoomState, StateAudioDevice, POWER_ON};
use crate::models::{AudioOutputState, DisplayState};

pub fn aggregate_display_state(members: &[String], state: &RoomState) -> Option<DisplayState> {
    let mut found = members.iter().filter_map(|name| state.display(name));
    let first = found.next()?;

    let first_blanked = first.blanked.unwrap_or(false);
    let mut powered = first.power == POWER_ON;
    let mut blanked_agree = true;
    let mut input = first.input.clone();

    for member in found {
        powered &= member.power == POWER_ON;
        if member.blanked.unwrap_or(false) != first_blanked {
            blanked_agree = false;
        }
        if member.input.is_empty() {
            continue;
        }
        if input.is_empty() {
            input = member.input.clone();
        } else if member.input != input {
            warn!(
                member = member.name.as_str(),
                kept = input.as_str(),
                ignored = member.input.as_str(),
                "displays in one group report different inputs"
            );
        }
    }

    Some(DisplayState {
        av_display_powered: powered,
        av_display_blanked: first_blanked && blanked_agree,
        av_display_input: input,
    })
}

/// Average volume (truncating) and muted-if-any over the grouped members.
pub fn aggregate_audio_state(members: &[String], state: &RoomState) -> Option<AudioOutputState> {
    let found: Vec<&StateAudioDevice> = members
        .iter()
        .filter_map(|name| state.audio_device(name))
        .collect();
    if found.is_empty() {
        return None;
    }

    let total: i64 = found.iter().map(|d| i64::from(d.volume.unwrap_or(0))).sum();
    let average = total / found.len() as i64;

    Some(AudioOutputState {
        av_audio_output_volume_level: i32::try_from(average).unwrap_or(i32::MAX),
        av_audio_output_muted: found.iter().any(|d| d.muted.unwrap_or(false)),
    })
}

pub fn audio_device_state(device: &StateAudioDevice) -> AudioOutputState {
    AudioOutputState {
        av_audio_output_volume_level: device.volume.unwrap_or(0),
        av_audio_output_muted: device.muted.unwrap_or(false),
    }
}
