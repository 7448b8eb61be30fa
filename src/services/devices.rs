use std::collections::BTreeMap;

use tracing::info;

use super::{ServiceError, Services};
use crate::identifier::DeviceId;
use crate::models::{Device, DeviceProperty, DeviceStateAttribute};
use crate::store::{build_search_query, find_docs, get_doc, Collection, DeviceDoc, StoreError};

impl Services {
    pub async fn devices(
        &self,
        room_num: Option<&str>,
        bldg_abbr: Option<&str>,
        device_type: Option<&str>,
    ) -> Result<Vec<Device>, ServiceError> {
        info!(room_num, bldg_abbr, device_type, "searching devices");
        let query = build_search_query(room_num, bldg_abbr, device_type);
        let docs: Vec<DeviceDoc> = find_docs(self.store(), Collection::Devices, &query).await?;
        if docs.is_empty() {
            return Err(ServiceError::EmptyResult("no devices found".to_string()));
        }

        Ok(docs
            .into_iter()
            .filter_map(|doc| match DeviceId::parse(&doc.id) {
                Ok(id) => Some(device_from_doc(&id, doc)),
                Err(e) => {
                    tracing::warn!(id = doc.id.as_str(), "skipping device: {}", e);
                    None
                }
            })
            .collect())
    }

    pub async fn device(&self, id: &str) -> Result<Device, ServiceError> {
        info!(id, "getting device");
        let (device_id, doc) = self.device_doc(id).await?;
        Ok(device_from_doc(&device_id, doc))
    }

    /// Device tags plus its network address, sorted by name.
    pub async fn device_properties(&self, id: &str) -> Result<Vec<DeviceProperty>, ServiceError> {
        info!(id, "getting device properties");
        let (_, doc) = self.device_doc(id).await?;

        let mut properties: BTreeMap<String, String> = doc.tags.into_iter().collect();
        if let Some(address) = doc.address.filter(|a| !a.is_empty()) {
            properties.insert("address".to_string(), address);
        }

        Ok(properties
            .into_iter()
            .map(|(name, value)| DeviceProperty {
                av_device_property_name: name,
                av_device_property_value: value,
            })
            .collect())
    }

    /// Live attributes of one physical device, read from its room's state.
    pub async fn device_state(&self, id: &str) -> Result<Vec<DeviceStateAttribute>, ServiceError> {
        info!(id, "getting device state");
        let (device_id, doc) = self.device_doc(id).await?;
        let name = doc.name.as_deref().filter(|n| !n.is_empty()).unwrap_or(&device_id.suffix);
        let state = self.room_state(&device_id.room).await?;

        let mut attributes = Vec::new();
        if let Some(display) = state.display(name) {
            attributes.push(DeviceStateAttribute::new("power", &display.power));
            attributes.push(DeviceStateAttribute::new("input", &display.input));
            if let Some(blanked) = display.blanked {
                attributes.push(DeviceStateAttribute::new("blanked", blanked));
            }
        }
        if let Some(audio) = state.audio_device(name) {
            if state.display(name).is_none() {
                attributes.push(DeviceStateAttribute::new("power", &audio.power));
                attributes.push(DeviceStateAttribute::new("input", &audio.input));
            }
            if let Some(muted) = audio.muted {
                attributes.push(DeviceStateAttribute::new("muted", muted));
            }
            if let Some(volume) = audio.volume {
                attributes.push(DeviceStateAttribute::new("volume", volume));
            }
        }

        if attributes.is_empty() {
            return Err(ServiceError::NotFound(format!("no state found for device {}", id)));
        }
        Ok(attributes)
    }

    /// Type ID of a stored device, or empty when there is no such document.
    pub(crate) async fn device_type_of(&self, id: &str) -> Result<String, ServiceError> {
        match get_doc::<DeviceDoc>(self.store(), Collection::Devices, id).await {
            Ok(doc) => Ok(doc.type_id),
            Err(StoreError::NotFound { .. }) => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn device_doc(&self, id: &str) -> Result<(DeviceId, DeviceDoc), ServiceError> {
        let device_id = DeviceId::parse(id)?;
        let doc: DeviceDoc = get_doc(self.store(), Collection::Devices, id).await?;
        Ok((device_id, doc))
    }
}

fn device_from_doc(id: &DeviceId, doc: DeviceDoc) -> Device {
    Device {
        av_device_id: doc.id,
        av_device_name: doc.name.unwrap_or_else(|| id.suffix.clone()),
        av_device_type: doc.type_id,
        building_abbreviation: id.building().to_string(),
        room_number: id.room_number().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{itb_1101_state, itb_1101_store, services, FakeAvControl, MemoryStore};

    #[tokio::test]
    async fn devices_by_room_and_type() {
        let svc = services(itb_1101_store(), FakeAvControl::new());

        let all = svc.devices(Some("1101"), Some("ITB"), None).await.unwrap();
        assert_eq!(all.len(), 5);

        let panels = svc.devices(Some("1101"), Some("ITB"), Some("SonyXBR")).await.unwrap();
        let ids: Vec<&str> = panels.iter().map(|d| d.av_device_id.as_str()).collect();
        assert_eq!(ids, vec!["ITB-1101-D1", "ITB-1101-D2", "ITB-1101-D3"]);
        assert_eq!(panels[0].building_abbreviation, "ITB");
        assert_eq!(panels[0].room_number, "1101");
    }

    #[tokio::test]
    async fn device_search_without_matches_is_empty_result() {
        let svc = services(itb_1101_store(), FakeAvControl::new());
        let err = svc.devices(None, Some("JFSB"), None).await.unwrap_err();
        assert!(matches!(err, ServiceError::EmptyResult(_)));
    }

    #[tokio::test]
    async fn device_properties_include_address_sorted() {
        let svc = services(itb_1101_store(), FakeAvControl::new());
        let props = svc.device_properties("ITB-1101-D1").await.unwrap();
        let names: Vec<&str> = props.iter().map(|p| p.av_device_property_name.as_str()).collect();
        assert_eq!(names, vec!["address", "description", "location"]);
        assert_eq!(props[0].av_device_property_value, "itb-1101-d1.av");
    }

    #[tokio::test]
    async fn device_state_reads_display_and_audio_attributes() {
        let av = FakeAvControl::new().with_state("ITB-1101", itb_1101_state());
        let svc = services(itb_1101_store(), av);

        let attrs = svc.device_state("ITB-1101-D2").await.unwrap();
        let pairs: Vec<(&str, &str)> = attrs
            .iter()
            .map(|a| {
                (
                    a.av_device_state_attribute_name.as_str(),
                    a.av_device_state_attribute_value.as_str(),
                )
            })
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("power", "on"),
                ("input", "HDMI1"),
                ("blanked", "false"),
                ("muted", "true"),
                ("volume", "45"),
            ]
        );

        let err = svc.device_state("ITB-1101-HDMI1").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn store_failure_is_upstream() {
        let svc = services(MemoryStore::failing(500), FakeAvControl::new());
        let err = svc.device("ITB-1101-D1").await.unwrap_err();
        assert!(err.is_upstream());
    }
}
