// CouchDB client
//
// Wraps a shared `reqwest::Client` with basic auth, URL construction and
// status mapping. 404 becomes `StoreError::NotFound`; any other non-2xx
// response is surfaced with its status and body.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::{Collection, DocumentStore, FindResponse, SearchQuery, StoreError};

pub struct CouchClient {
    http: reqwest::Client,
    base_url: Url,
    username: Option<String>,
    password: Option<String>,
}

impl CouchClient {
    pub fn new(
        http: reqwest::Client,
        address: &str,
        username: Option<String>,
        password: Option<String>,
    ) -> Result<Self, StoreError> {
        Ok(Self {
            http,
            base_url: Url::parse(address)?,
            username: username.filter(|u| !u.is_empty()),
            password,
        })
    }

    fn url(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.username {
            Some(user) => builder.basic_auth(user, self.password.as_deref()),
            None => builder,
        }
    }

    async fn send(
        &self,
        builder: reqwest::RequestBuilder,
        collection: Collection,
        id: &str,
    ) -> Result<Value, StoreError> {
        let response = builder.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound {
                collection: collection.as_str(),
                id: id.to_string(),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl DocumentStore for CouchClient {
    async fn find(
        &self,
        collection: Collection,
        query: &SearchQuery,
    ) -> Result<FindResponse<Value>, StoreError> {
        let url = self.url(&[collection.as_str(), "_find"])?;
        debug!(collection = collection.as_str(), limit = query.limit, "couch _find {}", url);

        let builder = self.request(Method::POST, url).json(query);
        let body = self.send(builder, collection, "_find").await?;
        Ok(serde_json::from_value(body)?)
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Value, StoreError> {
        let url = self.url(&[collection.as_str(), id])?;
        debug!(collection = collection.as_str(), id, "couch get {}", url);

        let builder = self.request(Method::GET, url);
        self.send(builder, collection, id).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let response = self.request(Method::GET, self.base_url.clone()).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(StoreError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            })
        }
    }
}
