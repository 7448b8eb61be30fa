// app.rs - shared request state and the router
//
// Public:     GET /, GET /health
// Protected:  everything else, behind the policy check when auth is enabled

use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::auth::{AuthorizationGate, HttpPermissionsClient, TokenValidator};
use crate::avapi::AvApiClient;
use crate::config::{AppConfig, ConfigError};
use crate::handlers;
use crate::logging::LogControl;
use crate::middleware::{opa_authorize, OpaClient};
use crate::services::Services;
use crate::store::CouchClient;
use crate::uapi::Translator;

#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    pub gate: Arc<AuthorizationGate>,
    pub translator: Arc<Translator>,
    pub log_control: Option<LogControl>,
}

impl AppState {
    /// Wire the backend clients from configuration. All of them share `http`.
    pub fn from_config(
        config: &AppConfig,
        http: reqwest::Client,
        log_control: Option<LogControl>,
    ) -> Result<Self, ConfigError> {
        let store = CouchClient::new(
            http.clone(),
            &config.store.address,
            config.store.username.clone(),
            config.store.password.clone(),
        )?;
        let av = AvApiClient::new(http.clone(), &config.av_api.address)?;

        let gate = match (config.auth.disabled, config.auth.permissions_url.as_deref()) {
            (true, _) => {
                warn!("authorization is disabled; every field-set is allowed");
                AuthorizationGate::disabled()
            }
            (false, Some(url)) => {
                let validator = config
                    .auth
                    .jwt_secret
                    .as_deref()
                    .map(TokenValidator::from_secret)
                    .transpose()?;
                AuthorizationGate::new(Arc::new(HttpPermissionsClient::new(http, url)?), validator)
            }
            (false, None) => return Err(ConfigError::MissingAuthUrl),
        };

        Ok(Self {
            services: Services::new(Arc::new(store), Arc::new(av)),
            gate: Arc::new(gate),
            translator: Arc::new(Translator::new(config.api.base_url.clone())),
            log_control,
        })
    }
}

/// The policy client, or `None` when auth is disabled.
pub fn opa_client(config: &AppConfig, http: reqwest::Client) -> Result<Option<Arc<OpaClient>>, ConfigError> {
    if config.auth.disabled {
        return Ok(None);
    }
    let url = config.auth.opa_url.as_deref().ok_or(ConfigError::MissingOpaUrl)?;
    info!(url, "policy checks enabled");
    Ok(Some(Arc::new(OpaClient::new(http, url, config.auth.opa_token.clone())?)))
}

pub fn app(state: AppState, opa: Option<Arc<OpaClient>>) -> Router {
    let mut protected = Router::new()
        .merge(room_routes())
        .merge(device_routes())
        .merge(input_routes())
        .merge(display_routes())
        .merge(audio_output_routes())
        .merge(log_routes())
        .merge(uapi_routes());

    if let Some(opa) = opa {
        protected = protected.route_layer(from_fn_with_state(opa, opa_authorize));
    }

    Router::new()
        .route("/", get(handlers::system::root))
        .route("/health", get(handlers::system::health))
        .merge(protected)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn room_routes() -> Router<AppState> {
    use handlers::rooms;

    Router::new()
        .route("/rooms", get(rooms::room_list))
        .route("/rooms/:room_id", get(rooms::room_get))
        .route("/rooms/:room_id/devices", get(rooms::room_devices))
}

fn device_routes() -> Router<AppState> {
    use handlers::devices;

    Router::new()
        .route("/devices", get(devices::device_list))
        .route("/devices/:device_id", get(devices::device_get))
        .route("/devices/:device_id/properties", get(devices::device_properties))
        .route("/devices/:device_id/state", get(devices::device_state))
}

fn input_routes() -> Router<AppState> {
    use handlers::inputs;

    Router::new()
        .route("/inputs", get(inputs::input_list))
        .route("/inputs/:input_id", get(inputs::input_get))
}

fn display_routes() -> Router<AppState> {
    use handlers::displays;

    Router::new()
        .route("/displays", get(displays::display_list))
        .route("/displays/:display_id", get(displays::display_get))
        .route("/displays/:display_id/config", get(displays::display_config))
        .route("/displays/:display_id/state", get(displays::display_state))
}

fn audio_output_routes() -> Router<AppState> {
    use handlers::audio_outputs;

    Router::new()
        .route("/audio_outputs", get(audio_outputs::audio_output_list))
        .route("/audio_outputs/:output_id", get(audio_outputs::audio_output_get))
        .route("/audio_outputs/:output_id/state", get(audio_outputs::audio_output_state))
}

fn log_routes() -> Router<AppState> {
    use handlers::system;

    Router::new().route("/log/:level", get(system::log_level).put(system::log_level))
}

fn uapi_routes() -> Router<AppState> {
    use handlers::uapi;

    Router::new()
        .route("/:room_id", get(uapi::room_resource).put(uapi::room_resource))
        .route("/:room_id/av_state", get(uapi::room_state).put(uapi::room_state))
        .route("/:room_id/av_config", get(uapi::room_config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::testing::{itb_1101_store, services, FakeAvControl};

    fn state() -> AppState {
        AppState {
            services: services(itb_1101_store(), FakeAvControl::new()),
            gate: Arc::new(AuthorizationGate::disabled()),
            translator: Arc::new(Translator::new("http://localhost")),
            log_control: None,
        }
    }

    async fn call(router: Router, uri: &str) -> (StatusCode, Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn static_routes_win_over_room_resource() {
        let (status, body) = call(app(state(), None), "/rooms/ITB-1101").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["av_room_id"], "ITB-1101");

        let (status, body) = call(app(state(), None), "/ITB-1101").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["metadata"]["field_sets_returned"][0], "basic");
    }

    #[tokio::test]
    async fn policy_check_skips_public_routes() {
        // nothing listens on the discard port
        let opa = Arc::new(OpaClient::new(reqwest::Client::new(), "http://127.0.0.1:9", None).unwrap());

        let (status, _) = call(app(state(), Some(opa.clone())), "/health").await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(app(state(), Some(opa)), "/rooms/ITB-1101").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Error while contacting authorization server");
    }
}
