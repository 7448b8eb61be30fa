use std::collections::HashMap;

use tracing::info;

use super::audio_outputs::audio_output_ids;
use super::{doc_room, ServiceError, Services};
use crate::identifier::{build_display_id, RoomId};
use crate::models::{Room, RoomDevices, RoomResource};
use crate::store::documents::{DESCRIPTION_TAG, LOCATION_TAG};
use crate::store::selector::devices_in_room_query;
use crate::store::{
    build_room_search_query, find_docs, get_doc, Collection, DeviceDoc, DeviceTypeDoc, RoomDoc,
    StoreError,
};

impl Services {
    /// Rooms matching the filters, each with its aggregated resources.
    pub async fn rooms(
        &self,
        room_num: Option<&str>,
        bldg_abbr: Option<&str>,
    ) -> Result<Vec<Room>, ServiceError> {
        info!(room_num, bldg_abbr, "searching rooms");
        let query = build_room_search_query(room_num, bldg_abbr);
        let docs: Vec<RoomDoc> = find_docs(self.store(), Collection::Rooms, &query).await?;
        if docs.is_empty() {
            return Err(ServiceError::EmptyResult("no rooms found".to_string()));
        }

        let mut rooms = Vec::with_capacity(docs.len());
        for doc in docs {
            if let Some(room) = doc_room(&doc.id) {
                rooms.push(self.room_from_doc(&room, &doc).await?);
            }
        }
        Ok(rooms)
    }

    pub async fn room(&self, id: &str) -> Result<Room, ServiceError> {
        info!(id, "getting room");
        let room = RoomId::parse(id)?;
        let doc: RoomDoc = get_doc(self.store(), Collection::Rooms, &room.to_string()).await?;
        self.room_from_doc(&room, &doc).await
    }

    /// IDs of every logical device in the room, synthesized from its UI
    /// configuration.
    pub async fn room_devices(&self, id: &str) -> Result<RoomDevices, ServiceError> {
        info!(id, "getting room devices");
        let room = RoomId::parse(id)?;
        let config = self.ui_config(&room).await?;

        Ok(RoomDevices {
            av_displays: (1..=config.presets.len())
                .map(|n| build_display_id(&room, n))
                .collect(),
            av_audio_outputs: audio_output_ids(&room, &config)
                .into_iter()
                .map(|(id, _)| id)
                .collect(),
            av_inputs: config
                .input_configuration
                .iter()
                .map(|input| room.device(&input.name))
                .collect(),
        })
    }

    async fn room_from_doc(&self, room: &RoomId, doc: &RoomDoc) -> Result<Room, ServiceError> {
        Ok(Room {
            av_room_id: room.to_string(),
            room_number: room.room.clone(),
            building_abbreviation: room.building.clone(),
            av_room_description: doc.description(),
            av_resources: self.room_resources(room).await?,
        })
    }

    async fn room_resources(&self, room: &RoomId) -> Result<Vec<RoomResource>, ServiceError> {
        let query = devices_in_room_query(&room.to_string());
        let devices: Vec<DeviceDoc> = find_docs(self.store(), Collection::Devices, &query).await?;

        // Device types are shared by many devices; look each up once.
        let mut type_descriptions: HashMap<String, Option<String>> = HashMap::new();
        let mut described = Vec::with_capacity(devices.len());

        for device in &devices {
            let description = match device.tag(DESCRIPTION_TAG) {
                Some(description) => Some(description.to_string()),
                None => {
                    self.type_description(&device.type_id, &mut type_descriptions)
                        .await?
                }
            };
            if let Some(description) = description {
                described.push((description, device.tag(LOCATION_TAG).map(str::to_string)));
            }
        }

        Ok(aggregate_resources(described))
    }

    async fn type_description(
        &self,
        type_id: &str,
        cache: &mut HashMap<String, Option<String>>,
    ) -> Result<Option<String>, ServiceError> {
        if type_id.is_empty() {
            return Ok(None);
        }
        if let Some(description) = cache.get(type_id) {
            return Ok(description.clone());
        }

        let description = match get_doc::<DeviceTypeDoc>(self.store(), Collection::DeviceTypes, type_id).await {
            Ok(doc) => doc.tags.get(DESCRIPTION_TAG).filter(|d| !d.is_empty()).cloned(),
            Err(StoreError::NotFound { .. }) => None,
            Err(e) => return Err(e.into()),
        };
        cache.insert(type_id.to_string(), description.clone());
        Ok(description)
    }
}

/// Group `(description, location)` pairs by description. Groups and their
/// locations keep first-appearance order; locations are not repeated.
pub fn aggregate_resources(
    devices: impl IntoIterator<Item = (String, Option<String>)>,
) -> Vec<RoomResource> {
    let mut resources: Vec<RoomResource> = Vec::new();

    for (description, location) in devices {
        let index = match resources.iter().position(|r| r.resource == description) {
            Some(index) => index,
            None => {
                resources.push(RoomResource {
                    quantity: 0,
                    resource: description,
                    locations: Vec::new(),
                });
                resources.len() - 1
            }
        };

        let resource = &mut resources[index];
        resource.quantity += 1;
        if let Some(location) = location.filter(|l| !l.is_empty()) {
            if !resource.locations.contains(&location) {
                resource.locations.push(location);
            }
        }
    }

    resources
}
