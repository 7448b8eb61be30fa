// Permissions service client
//
// Asks the authorization service which roles the caller's token holds on a
// resource. The token is forwarded untouched in `X-jwt-assertion`; a 401 or
// 403 from the service means the token carries no permissions at all.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::{AuthError, TOKEN_HEADER};

/// Roles granted per resource ID.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Permissions {
    #[serde(default)]
    pub permissions: HashMap<String, Vec<String>>,
}

impl Permissions {
    pub fn grants(&self, resource_id: &str, role: &str) -> bool {
        self.permissions
            .get(resource_id)
            .is_some_and(|roles| roles.iter().any(|r| r == role))
    }
}

#[async_trait]
pub trait PermissionsClient: Send + Sync {
    async fn permissions(
        &self,
        token: &str,
        resource_id: &str,
        resource_type: &str,
    ) -> Result<Permissions, AuthError>;
}

pub struct HttpPermissionsClient {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpPermissionsClient {
    pub fn new(http: reqwest::Client, address: &str) -> Result<Self, AuthError> {
        Ok(Self {
            http,
            base_url: Url::parse(address)?,
        })
    }

    fn permissions_url(&self, resource_id: &str, resource_type: &str) -> Result<Url, AuthError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .push("permissions");
        url.query_pairs_mut()
            .append_pair("resource_id", resource_id)
            .append_pair("resource_type", resource_type);
        Ok(url)
    }
}

#[async_trait]
impl PermissionsClient for HttpPermissionsClient {
    async fn permissions(
        &self,
        token: &str,
        resource_id: &str,
        resource_type: &str,
    ) -> Result<Permissions, AuthError> {
        let url = self.permissions_url(resource_id, resource_type)?;
        debug!(resource_id, resource_type, "permissions lookup {}", url);

        let response = self.http.get(url).header(TOKEN_HEADER, token).send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Ok(Permissions::default());
        }
        if !status.is_success() {
            return Err(AuthError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        Ok(response.json::<Permissions>().await?)
    }
}
