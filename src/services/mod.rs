pub mod audio_outputs;
pub mod devices;
pub mod displays;
pub mod inputs;
pub mod rooms;
pub mod state;

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::avapi::{AvApiError, AvControl, ReachableRoomConfig, RoomState};
use crate::identifier::{IdentifierError, RoomId};
use crate::store::selector::build_room_search_query;
use crate::store::{find_docs, get_doc, Collection, DocumentStore, StoreError, UiConfigDoc};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    InvalidIdentifier(#[from] IdentifierError),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    EmptyResult(String),

    #[error(transparent)]
    Store(StoreError),

    #[error(transparent)]
    AvApi(#[from] AvApiError),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { collection, id } => {
                ServiceError::NotFound(format!("{} not found in {}", id, collection))
            }
            other => ServiceError::Store(other),
        }
    }
}

impl ServiceError {
    /// Failure of a backing service rather than of the request.
    pub fn is_upstream(&self) -> bool {
        matches!(self, ServiceError::Store(_) | ServiceError::AvApi(_))
    }
}

/// Backing services shared by every request.
#[derive(Clone)]
pub struct Services {
    store: Arc<dyn DocumentStore>,
    av: Arc<dyn AvControl>,
}

impl Services {
    pub fn new(store: Arc<dyn DocumentStore>, av: Arc<dyn AvControl>) -> Self {
        Self { store, av }
    }

    pub(crate) fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    pub async fn ping_store(&self) -> Result<(), ServiceError> {
        Ok(self.store.ping().await?)
    }

    pub async fn room_state(&self, room: &RoomId) -> Result<RoomState, ServiceError> {
        debug!(room = %room, "fetching room state");
        Ok(self.av.get_state(room).await?)
    }

    /// Forward a state change. The path's room always wins over whatever the
    /// body names.
    pub async fn set_room_state(
        &self,
        room: &RoomId,
        mut body: RoomState,
    ) -> Result<RoomState, ServiceError> {
        body.building = room.building.clone();
        body.room = room.room.clone();
        debug!(room = %room, "setting room state");
        Ok(self.av.set_state(room, &body).await?)
    }

    pub async fn room_config(&self, room: &RoomId) -> Result<ReachableRoomConfig, ServiceError> {
        debug!(room = %room, "fetching room configuration");
        Ok(self.av.get_config(room).await?)
    }

    pub(crate) async fn ui_config(&self, room: &RoomId) -> Result<UiConfigDoc, ServiceError> {
        Ok(get_doc(self.store(), Collection::UiConfiguration, &room.to_string()).await?)
    }

    /// UI configurations matching the room filters. Zero matches is an error.
    pub(crate) async fn ui_configs(
        &self,
        room_num: Option<&str>,
        bldg_abbr: Option<&str>,
        what: &str,
    ) -> Result<Vec<UiConfigDoc>, ServiceError> {
        let query = build_room_search_query(room_num, bldg_abbr);
        let docs: Vec<UiConfigDoc> =
            find_docs(self.store(), Collection::UiConfiguration, &query).await?;
        if docs.is_empty() {
            return Err(ServiceError::EmptyResult(format!("no {} found", what)));
        }
        Ok(docs)
    }
}

/// Room ID of a stored document, or `None` (logged) when the ID is unusable.
pub(crate) fn doc_room(doc_id: &str) -> Option<RoomId> {
    match RoomId::parse(doc_id) {
        Ok(room) if room.is_complete() => Some(room),
        _ => {
            tracing::warn!(id = doc_id, "skipping document with malformed id");
            None
        }
    }
}
