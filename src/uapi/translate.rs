// AV state and configuration to UAPI envelope.
//
// The translator does no I/O. The handler collects one `Outcome` per
// field-set and the translator turns each into a sub-resource whose
// validation response says how that field-set went.

use std::collections::BTreeMap;

use super::envelope::{
    ApiType, Link, Metadata, Property, PropertyMap, Resource, SubResource, ValidationResponse,
    CODE_FAILED, CODE_FORBIDDEN, CODE_NOT_FOUND, CODE_OK,
};
use super::{FieldSet, Outcome};
use crate::avapi::{ConfigDevice, ReachableRoomConfig, RoomState, StateAudioDevice, StateDisplay};
use crate::identifier::RoomId;

const GET: &str = "GET";
const PUT: &str = "PUT";

pub struct Translator {
    base_url: String,
}

impl Translator {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn href(&self, room: &RoomId, tail: Option<&str>) -> String {
        match tail {
            Some(tail) => format!("{}/{}/{}", self.base_url, room, tail),
            None => format!("{}/{}", self.base_url, room),
        }
    }

    /// Build the envelope for `field_sets`. Names that are not field-sets are
    /// echoed in the metadata and otherwise ignored.
    pub fn translate(
        &self,
        room: &RoomId,
        field_sets: &[String],
        state: &Outcome<RoomState>,
        config: &Outcome<ReachableRoomConfig>,
    ) -> Resource {
        let mut links = BTreeMap::new();
        links.insert(
            "self".to_string(),
            Link::new(
                "self",
                format!("{}?field_sets={}", self.href(room, None), field_sets.join(",")),
                GET,
            ),
        );

        let mut resource = Resource {
            links,
            metadata: Metadata {
                field_sets_returned: field_sets.to_vec(),
                field_sets_available: FieldSet::AVAILABLE.iter().map(|f| f.as_str().to_string()).collect(),
                field_sets_default: FieldSet::DEFAULT.iter().map(|f| f.as_str().to_string()).collect(),
                validation_response: ValidationResponse::success(),
            },
            ..Default::default()
        };

        for field_set in field_sets.iter().filter_map(|name| FieldSet::parse(name)) {
            match field_set {
                FieldSet::Basic => resource.basic = Some(self.basic(room)),
                FieldSet::AvState => resource.av_state = Some(self.av_state(room, state)),
                FieldSet::AvConfig => resource.av_config = Some(self.av_config(room, config)),
            }
        }

        resource
    }

    pub fn basic(&self, room: &RoomId) -> SubResource {
        if !room.is_complete() {
            return SubResource::status(CODE_NOT_FOUND, "resource not found, invalid room information");
        }

        SubResource::status(CODE_OK, "success")
            .link("basics__info", Link::new("self", self.href(room, None), GET))
            .property("building", Property::key(room.building.as_str()))
            .property("room", Property::key(room.to_string()))
    }

    pub fn av_state(&self, room: &RoomId, outcome: &Outcome<RoomState>) -> SubResource {
        let state = match outcome {
            Outcome::Ok(state) => state,
            other => return not_ok(other, "av_state"),
        };

        if !room.is_complete() {
            return SubResource::status(CODE_NOT_FOUND, "resource not found, invalid room information");
        }
        if state.displays.is_empty() || state.audio_devices.is_empty() {
            return SubResource::status(CODE_NOT_FOUND, "unable to get state of the room");
        }

        let href = self.href(room, Some(FieldSet::AvState.as_str()));
        SubResource::status(CODE_OK, "success")
            .link("get_state", Link::new(FieldSet::AvState.as_str(), href.clone(), GET))
            .link("set_state", Link::new(FieldSet::AvState.as_str(), href, PUT))
            .property("building", Property::key(room.building.as_str()))
            .property("room", Property::key(room.to_string()))
            .property(
                "displays",
                Property::array(ApiType::Modifiable, state.displays.iter().map(display_properties).collect()),
            )
            .property(
                "audio_devices",
                Property::array(
                    ApiType::Modifiable,
                    state.audio_devices.iter().map(audio_properties).collect(),
                ),
            )
    }

    pub fn av_config(&self, room: &RoomId, outcome: &Outcome<ReachableRoomConfig>) -> SubResource {
        let config = match outcome {
            Outcome::Ok(config) => config,
            other => return not_ok(other, "av_config"),
        };

        SubResource::status(CODE_OK, "success")
            .link(
                FieldSet::AvConfig.as_str(),
                Link::new("self", self.href(room, Some(FieldSet::AvConfig.as_str())), GET),
            )
            .property(
                "devices",
                Property::array(
                    ApiType::ReadOnly,
                    config.reachable_devices().into_iter().map(config_device_properties).collect(),
                ),
            )
    }
}

fn not_ok<T>(outcome: &Outcome<T>, field_set: &str) -> SubResource {
    match outcome {
        Outcome::Denied => SubResource::status(
            CODE_FORBIDDEN,
            format!("not authorized for {}", field_set),
        ),
        Outcome::Failed(reason) => SubResource::status(CODE_FAILED, reason.clone()),
        Outcome::NotApplicable | Outcome::Ok(_) => {
            SubResource::status(CODE_NOT_FOUND, format!("{} not available", field_set))
        }
    }
}

fn display_properties(display: &StateDisplay) -> PropertyMap {
    let mut map = PropertyMap::new();
    map.insert("name".into(), Property::key(display.name.as_str()));
    map.insert("power".into(), Property::modifiable(display.power.as_str()));
    map.insert("input".into(), Property::modifiable(display.input.as_str()));
    map.insert("blanked".into(), Property::modifiable(display.blanked.unwrap_or(false)));
    map
}

fn audio_properties(audio: &StateAudioDevice) -> PropertyMap {
    let mut map = PropertyMap::new();
    map.insert("name".into(), Property::key(audio.name.as_str()));
    map.insert("power".into(), Property::modifiable(audio.power.as_str()));
    map.insert("input".into(), Property::modifiable(audio.input.as_str()));
    map.insert("muted".into(), Property::modifiable(audio.muted.unwrap_or(false)));
    map.insert("volume".into(), Property::modifiable(audio.volume.unwrap_or(0)));
    map
}

fn config_device_properties(device: &ConfigDevice) -> PropertyMap {
    let roles: Vec<&str> = device.roles.iter().map(|r| r.id.as_str()).collect();
    let mut map = PropertyMap::new();
    map.insert("id".into(), Property::key(device.id.as_str()));
    map.insert("name".into(), Property::read_only(device.name.as_str()));
    map.insert("roles".into(), Property::read_only(roles.join(",")));
    map
}
