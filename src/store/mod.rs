pub mod couch;
pub mod documents;
pub mod selector;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

pub use couch::CouchClient;
pub use documents::{
    DeviceDoc, DeviceTypeDoc, FindResponse, InputConfig, Preset, RoomDoc, UiConfigDoc,
};
pub use selector::{build_room_search_query, build_search_query, SearchQuery};

/// Errors from the document store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document not found: {collection}/{id}")]
    NotFound { collection: &'static str, id: String },

    #[error("document store returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid document store url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("document store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed document: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Collections the gateway reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Rooms,
    Devices,
    DeviceTypes,
    UiConfiguration,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Rooms => "rooms",
            Collection::Devices => "devices",
            Collection::DeviceTypes => "device-types",
            Collection::UiConfiguration => "ui-configuration",
        }
    }
}

/// Read-only access to the document database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find(
        &self,
        collection: Collection,
        query: &SearchQuery,
    ) -> Result<FindResponse<Value>, StoreError>;

    async fn get(&self, collection: Collection, id: &str) -> Result<Value, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

/// Run a `_find` and decode every returned document.
pub async fn find_docs<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: Collection,
    query: &SearchQuery,
) -> Result<Vec<T>, StoreError> {
    let response = store.find(collection, query).await?;
    if let Some(warning) = response.warning.as_deref().filter(|w| !w.is_empty()) {
        tracing::warn!(collection = collection.as_str(), "document store warning: {}", warning);
    }
    if query.is_truncating() && response.docs.len() as u32 >= query.limit {
        tracing::debug!(
            collection = collection.as_str(),
            limit = query.limit,
            "search hit its row limit, results may be truncated"
        );
    }

    response
        .docs
        .into_iter()
        .map(|doc| serde_json::from_value(doc).map_err(StoreError::from))
        .collect()
}

/// Fetch and decode one document by ID.
pub async fn get_doc<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: Collection,
    id: &str,
) -> Result<T, StoreError> {
    let doc = store.get(collection, id).await?;
    Ok(serde_json::from_value(doc)?)
}
