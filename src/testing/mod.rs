use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::auth::{AuthError, Permissions, PermissionsClient};
use crate::avapi::{AvApiError, AvControl, ReachableRoomConfig, RoomState};
use crate::identifier::RoomId;
use crate::services::Services;
use crate::store::selector::Condition;
use crate::store::{Collection, DocumentStore, FindResponse, SearchQuery, StoreError};

/// Document store backed by a map. Evaluates the selector shapes the query
/// builder produces, so tests exercise the real queries.
#[derive(Default)]
pub struct MemoryStore {
    docs: HashMap<Collection, Vec<Value>>,
    failure: Option<u16>,
    queries: Mutex<Vec<(Collection, SearchQuery)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, collection: Collection, doc: Value) -> Self {
        self.docs.entry(collection).or_default().push(doc);
        self
    }

    /// Every call fails with this status.
    pub fn failing(status: u16) -> Self {
        Self {
            failure: Some(status),
            ..Default::default()
        }
    }

    pub fn queries(&self) -> Vec<(Collection, SearchQuery)> {
        self.queries.lock().unwrap().clone()
    }

    fn check_failure(&self) -> Result<(), StoreError> {
        match self.failure {
            Some(status) => Err(StoreError::Status {
                status,
                body: "injected failure".into(),
            }),
            None => Ok(()),
        }
    }
}

fn unescape(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn condition_matches(condition: &Condition, value: &str) -> bool {
    if let Some(gt) = &condition.gt {
        if value <= gt.as_str() {
            return false;
        }
    }
    if let Some(lt) = &condition.lt {
        if value >= lt.as_str() {
            return false;
        }
    }
    if let Some(regex) = &condition.regex {
        let start = regex.starts_with('^');
        let end = regex.ends_with('$') && !regex.ends_with("\\$");
        let body = regex.trim_start_matches('^');
        let body = if end { &body[..body.len() - 1] } else { body };
        let literal = unescape(body);
        let hit = match (start, end) {
            (true, true) => value == literal,
            (true, false) => value.starts_with(&literal),
            (false, true) => value.ends_with(&literal),
            (false, false) => value.contains(&literal),
        };
        if !hit {
            return false;
        }
    }
    true
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(
        &self,
        collection: Collection,
        query: &SearchQuery,
    ) -> Result<FindResponse<Value>, StoreError> {
        self.queries.lock().unwrap().push((collection, query.clone()));
        self.check_failure()?;

        let docs = self
            .docs
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| {
                        let id = doc["_id"].as_str().unwrap_or_default();
                        let type_id = doc["typeID"].as_str().unwrap_or_default();
                        condition_matches(&query.selector.id, id)
                            && query
                                .selector
                                .type_id
                                .as_ref()
                                .map_or(true, |c| condition_matches(c, type_id))
                    })
                    .take(query.limit as usize)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        Ok(FindResponse {
            docs,
            bookmark: None,
            warning: None,
        })
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Value, StoreError> {
        self.check_failure()?;
        self.docs
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| d["_id"] == id))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.as_str(),
                id: id.to_string(),
            })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_failure()
    }
}

/// AV API stand-in keyed by room ID.
#[derive(Default)]
pub struct FakeAvControl {
    states: HashMap<String, RoomState>,
    configs: HashMap<String, ReachableRoomConfig>,
    writes: Mutex<Vec<RoomState>>,
}

impl FakeAvControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(mut self, room: &str, state: Value) -> Self {
        self.states
            .insert(room.to_string(), serde_json::from_value(state).unwrap());
        self
    }

    pub fn with_config(mut self, room: &str, config: Value) -> Self {
        self.configs
            .insert(room.to_string(), serde_json::from_value(config).unwrap());
        self
    }

    pub fn writes(&self) -> Vec<RoomState> {
        self.writes.lock().unwrap().clone()
    }
}

fn missing(room: &RoomId) -> AvApiError {
    AvApiError::Status {
        status: 404,
        body: format!("no such room {}", room),
    }
}

#[async_trait]
impl AvControl for FakeAvControl {
    async fn get_state(&self, room: &RoomId) -> Result<RoomState, AvApiError> {
        self.states
            .get(&room.to_string())
            .cloned()
            .ok_or_else(|| missing(room))
    }

    async fn set_state(&self, _room: &RoomId, body: &RoomState) -> Result<RoomState, AvApiError> {
        self.writes.lock().unwrap().push(body.clone());
        Ok(body.clone())
    }

    async fn get_config(&self, room: &RoomId) -> Result<ReachableRoomConfig, AvApiError> {
        self.configs
            .get(&room.to_string())
            .cloned()
            .ok_or_else(|| missing(room))
    }
}

/// Permission service stand-in: grants per token.
#[derive(Default)]
pub struct FakePermissions {
    grants: HashMap<String, Permissions>,
    fail: bool,
    calls: AtomicUsize,
}

impl FakePermissions {
    pub fn grant(mut self, token: &str, resource: &str, roles: &[&str]) -> Self {
        self.grants
            .entry(token.to_string())
            .or_default()
            .permissions
            .insert(resource.to_string(), roles.iter().map(|r| r.to_string()).collect());
        self
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PermissionsClient for FakePermissions {
    async fn permissions(
        &self,
        token: &str,
        _resource_id: &str,
        _resource_type: &str,
    ) -> Result<Permissions, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AuthError::Status {
                status: 502,
                body: "injected failure".into(),
            });
        }
        Ok(self.grants.get(token).cloned().unwrap_or_default())
    }
}

pub fn services(store: MemoryStore, av: FakeAvControl) -> Services {
    Services::new(Arc::new(store), Arc::new(av))
}

/// ITB-1101: two presets, a projector pair, a microphone and two inputs.
pub fn itb_1101_store() -> MemoryStore {
    MemoryStore::new()
        .with(
            Collection::Rooms,
            json!({ "_id": "ITB-1101", "name": "ITB-1101", "description": "Lecture hall" }),
        )
        .with(
            Collection::UiConfiguration,
            json!({
                "_id": "ITB-1101",
                "presets": [
                    {
                        "name": "Front",
                        "displays": ["D1", "D2"],
                        "audioDevices": ["D1", "D2"],
                        "independentAudioDevices": ["MIC1"],
                        "inputs": ["HDMI1", "PC1"]
                    },
                    {
                        "name": "Back",
                        "displays": ["D3"],
                        "audioDevices": [],
                        "independentAudioDevices": ["MIC1"],
                        "inputs": ["HDMI1"]
                    }
                ],
                "inputConfiguration": [
                    { "name": "HDMI1", "type": "hdmi" },
                    { "name": "PC1", "type": "computer" }
                ]
            }),
        )
        .with(
            Collection::Devices,
            json!({
                "_id": "ITB-1101-D1", "name": "D1", "typeID": "SonyXBR",
                "address": "itb-1101-d1.av", "roles": ["VideoOut", "AudioOut"],
                "tags": { "description": "Flat Panel", "location": "Front" }
            }),
        )
        .with(
            Collection::Devices,
            json!({
                "_id": "ITB-1101-D2", "name": "D2", "typeID": "SonyXBR",
                "roles": ["VideoOut", "AudioOut"],
                "tags": { "location": "Front" }
            }),
        )
        .with(
            Collection::Devices,
            json!({
                "_id": "ITB-1101-D3", "name": "D3", "typeID": "SonyXBR",
                "roles": ["VideoOut"],
                "tags": { "description": "Flat Panel", "location": "Back" }
            }),
        )
        .with(
            Collection::Devices,
            json!({
                "_id": "ITB-1101-MIC1", "name": "MIC1", "typeID": "ShureULXD",
                "roles": ["Microphone"], "tags": {}
            }),
        )
        .with(
            Collection::Devices,
            json!({ "_id": "ITB-1101-HDMI1", "name": "HDMI1", "typeID": "non-controllable" }),
        )
        .with(
            Collection::Devices,
            json!({ "_id": "ITB-1102-D1", "name": "D1", "typeID": "SonyXBR" }),
        )
        .with(
            Collection::DeviceTypes,
            json!({ "_id": "SonyXBR", "tags": { "description": "Flat Panel" } }),
        )
        .with(
            Collection::DeviceTypes,
            json!({ "_id": "ShureULXD", "tags": { "description": "Wireless Microphone" } }),
        )
}

pub fn itb_1101_state() -> Value {
    json!({
        "displays": [
            { "name": "D1", "power": "on", "input": "HDMI1", "blanked": false },
            { "name": "D2", "power": "on", "input": "HDMI1", "blanked": false },
            { "name": "D3", "power": "standby", "input": "", "blanked": true }
        ],
        "audioDevices": [
            { "name": "D1", "power": "on", "muted": false, "volume": 30 },
            { "name": "D2", "power": "on", "muted": true, "volume": 45 },
            { "name": "MIC1", "muted": false, "volume": 70 }
        ]
    })
}
