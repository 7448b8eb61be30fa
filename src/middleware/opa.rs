use std::sync::Arc;

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

use crate::auth::extract_token;
use crate::error::ApiError;

#[derive(Debug, Error)]
pub enum OpaError {
    #[error("policy service returned {0}")]
    Status(u16),

    #[error("invalid policy service url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("policy request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Serialize)]
struct OpaInput<'a> {
    path: &'a str,
    method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct OpaRequest<'a> {
    input: OpaInput<'a>,
}

#[derive(Debug, Default, Deserialize)]
struct OpaResult {
    #[serde(default)]
    allow: bool,
}

/// A missing `result` means the policy made no decision.
#[derive(Debug, Deserialize)]
struct OpaResponse {
    #[serde(default)]
    result: Option<OpaResult>,
}

/// Client for the route-level policy check.
pub struct OpaClient {
    http: reqwest::Client,
    decision_url: Url,
    token: Option<String>,
}

impl OpaClient {
    pub fn new(http: reqwest::Client, address: &str, token: Option<String>) -> Result<Self, OpaError> {
        let mut decision_url = Url::parse(address)?;
        decision_url
            .path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(["v1", "data", "uapi"]);

        Ok(Self {
            http,
            decision_url,
            token,
        })
    }

    pub async fn allow(&self, path: &str, method: &str, token: Option<&str>) -> Result<bool, OpaError> {
        let body = OpaRequest {
            input: OpaInput { path, method, token },
        };

        let mut request = self.http.post(self.decision_url.clone()).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(OpaError::Status(status.as_u16()));
        }

        let decision: OpaResponse = response.json().await?;
        Ok(decision.result.is_some_and(|r| r.allow))
    }
}

/// Policy check middleware: 403 when denied, 500 when the policy service
/// can't be asked.
pub async fn opa_authorize(
    State(opa): State<Arc<OpaClient>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let method = request.method().to_string();
    let token = extract_token(request.headers());

    match opa.allow(&path, &method, token.as_deref()).await {
        Ok(true) => Ok(next.run(request).await),
        Ok(false) => {
            debug!(path, method, "policy denied request");
            Err(ApiError::forbidden("Unauthorized"))
        }
        Err(e) => {
            error!(path, method, "policy check failed: {}", e);
            Err(ApiError::internal_server_error(
                "Error while contacting authorization server",
            ))
        }
    }
}
