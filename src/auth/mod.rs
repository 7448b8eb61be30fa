//! Per-field-set authorization.
//!
//! Every field-set maps to the role a caller needs for it. The gate decides
//! allow or deny for one field-set at a time so that a denied field-set
//! never blocks its siblings.

pub mod permissions;
pub mod token;

use std::sync::Arc;

use axum::http::{HeaderMap, Method};
use thiserror::Error;
use tracing::{debug, warn};

use crate::identifier::RoomId;
use crate::uapi::FieldSet;

pub use permissions::{HttpPermissionsClient, Permissions, PermissionsClient};
pub use token::{Claims, TokenError, TokenValidator};

/// Header carrying the caller's token from the API gateway.
pub const TOKEN_HEADER: &str = "X-jwt-assertion";

pub const RESOURCE_TYPE_ROOM: &str = "room";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authorization service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid authorization service url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("authorization request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    None,
    ReadState,
    WriteState,
    ReadConfig,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::None => "none",
            Role::ReadState => "read-state",
            Role::WriteState => "write-state",
            Role::ReadConfig => "read-config",
        }
    }

    /// Role needed to run `method` against `field_set`.
    pub fn required(field_set: FieldSet, method: &Method) -> Self {
        match field_set {
            FieldSet::Basic => Role::None,
            FieldSet::AvConfig => Role::ReadConfig,
            FieldSet::AvState if is_write(method) => Role::WriteState,
            FieldSet::AvState => Role::ReadState,
        }
    }
}

fn is_write(method: &Method) -> bool {
    matches!(*method, Method::PUT | Method::POST | Method::PATCH)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

pub struct AuthorizationGate {
    permissions: Option<Arc<dyn PermissionsClient>>,
    validator: Option<TokenValidator>,
}

impl AuthorizationGate {
    pub fn new(permissions: Arc<dyn PermissionsClient>, validator: Option<TokenValidator>) -> Self {
        Self {
            permissions: Some(permissions),
            validator,
        }
    }

    /// A gate that allows everything.
    pub fn disabled() -> Self {
        Self {
            permissions: None,
            validator: None,
        }
    }

    pub async fn authorize(
        &self,
        field_set: FieldSet,
        method: &Method,
        room: &RoomId,
        token: Option<&str>,
    ) -> Result<Decision, AuthError> {
        let Some(permissions) = &self.permissions else {
            return Ok(Decision::Allow);
        };

        let role = Role::required(field_set, method);
        if role == Role::None {
            return Ok(Decision::Allow);
        }

        let Some(token) = token.filter(|t| !t.is_empty()) else {
            debug!(room = %room, field_set = field_set.as_str(), "no token presented");
            return Ok(Decision::Deny);
        };

        if let Some(validator) = &self.validator {
            if let Err(e) = validator.validate(token) {
                warn!(room = %room, field_set = field_set.as_str(), "rejected token: {}", e);
                return Ok(Decision::Deny);
            }
        }

        let resource_id = room.to_string();
        let granted = permissions
            .permissions(token, &resource_id, RESOURCE_TYPE_ROOM)
            .await?
            .grants(&resource_id, role.as_str());

        debug!(
            room = %room,
            field_set = field_set.as_str(),
            role = role.as_str(),
            granted,
            "authorization decision"
        );
        Ok(if granted { Decision::Allow } else { Decision::Deny })
    }
}

/// Token from `X-jwt-assertion`, falling back to `Authorization: Bearer`.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let assertion = headers
        .get(TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty());

    let bearer = || {
        headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().split_once(' '))
            .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
            .map(|(_, token)| token.trim())
            .filter(|t| !t.is_empty())
    };

    assertion.or_else(bearer).map(str::to_string)
}
