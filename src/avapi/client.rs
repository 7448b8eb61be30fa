use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::{AvApiError, AvControl, ReachableRoomConfig, RoomState};
use crate::identifier::RoomId;

/// HTTP client for the AV control API.
pub struct AvApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl AvApiClient {
    pub fn new(http: reqwest::Client, address: &str) -> Result<Self, AvApiError> {
        Ok(Self {
            http,
            base_url: Url::parse(address)?,
        })
    }

    /// `{base}/buildings/{building}/rooms/{room}[/extra]`
    fn room_url(&self, room: &RoomId, extra: Option<&str>) -> Result<Url, AvApiError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?;
            segments
                .pop_if_empty()
                .extend(["buildings", room.building.as_str(), "rooms", room.room.as_str()]);
            if let Some(extra) = extra {
                segments.push(extra);
            }
        }
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(&self, builder: reqwest::RequestBuilder) -> Result<T, AvApiError> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AvApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl AvControl for AvApiClient {
    async fn get_state(&self, room: &RoomId) -> Result<RoomState, AvApiError> {
        let url = self.room_url(room, None)?;
        debug!(room = %room, "AV API get state {}", url);
        self.send(self.http.request(Method::GET, url)).await
    }

    async fn set_state(&self, room: &RoomId, body: &RoomState) -> Result<RoomState, AvApiError> {
        let url = self.room_url(room, None)?;
        debug!(room = %room, "AV API set state {}", url);
        self.send(self.http.request(Method::PUT, url).json(body)).await
    }

    async fn get_config(&self, room: &RoomId) -> Result<ReachableRoomConfig, AvApiError> {
        let url = self.room_url(room, Some("configuration"))?;
        debug!(room = %room, "AV API get configuration {}", url);
        self.send(self.http.request(Method::GET, url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_urls_follow_building_room_layout() {
        let client = AvApiClient::new(reqwest::Client::new(), "http://av-api:8000/").unwrap();
        let room = RoomId::new("ITB", "1101");

        assert_eq!(
            client.room_url(&room, None).unwrap().as_str(),
            "http://av-api:8000/buildings/ITB/rooms/1101"
        );
        assert_eq!(
            client.room_url(&room, Some("configuration")).unwrap().as_str(),
            "http://av-api:8000/buildings/ITB/rooms/1101/configuration"
        );
    }
}
