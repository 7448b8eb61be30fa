// handlers/uapi.rs - combined UAPI room resource
//
// One request may ask for several field-sets. Each one is authorized and
// fetched on its own; a denial or backend failure only shows up in that
// field-set's validation response. The request as a whole fails only for a
// malformed room ID or an unreadable PUT body.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, Method},
    Json,
};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::app::AppState;
use crate::auth::{extract_token, Decision};
use crate::avapi::{ReachableRoomConfig, RoomState};
use crate::error::ApiError;
use crate::identifier::RoomId;
use crate::uapi::{requested_field_sets, FieldSet, Outcome, Resource};

#[derive(Debug, Default, Deserialize)]
pub struct FieldSetQuery {
    pub field_sets: Option<String>,
}

/// GET|PUT /:room_id - defaults to the basic field-set
pub async fn room_resource(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    Path(room_id): Path<String>,
    Query(query): Query<FieldSetQuery>,
    body: Bytes,
) -> Result<Json<Resource>, ApiError> {
    let field_sets = requested_field_sets(FieldSet::Basic, query.field_sets.as_deref());
    handle(&state, &method, &headers, &room_id, field_sets, &body).await.map(Json)
}

/// GET|PUT /:room_id/av_state
pub async fn room_state(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    Path(room_id): Path<String>,
    Query(query): Query<FieldSetQuery>,
    body: Bytes,
) -> Result<Json<Resource>, ApiError> {
    let field_sets = requested_field_sets(FieldSet::AvState, query.field_sets.as_deref());
    handle(&state, &method, &headers, &room_id, field_sets, &body).await.map(Json)
}

/// GET /:room_id/av_config
pub async fn room_config(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    Path(room_id): Path<String>,
    Query(query): Query<FieldSetQuery>,
) -> Result<Json<Resource>, ApiError> {
    let field_sets = requested_field_sets(FieldSet::AvConfig, query.field_sets.as_deref());
    handle(&state, &method, &headers, &room_id, field_sets, &Bytes::new()).await.map(Json)
}

async fn handle(
    state: &AppState,
    method: &Method,
    headers: &HeaderMap,
    room_id: &str,
    field_sets: Vec<String>,
    body: &Bytes,
) -> Result<Resource, ApiError> {
    let room = RoomId::parse(room_id).map_err(|e| {
        info!(room_id, "rejected room resource request: {}", e);
        ApiError::from(e)
    })?;
    let token = extract_token(headers);
    info!(room = %room, method = %method, field_sets = ?field_sets, "room resource request");

    let mut av_state: Outcome<RoomState> = Outcome::NotApplicable;
    let mut av_config: Outcome<ReachableRoomConfig> = Outcome::NotApplicable;

    for field_set in field_sets.iter().filter_map(|name| FieldSet::parse(name)) {
        let decision = match state
            .gate
            .authorize(field_set, method, &room, token.as_deref())
            .await
        {
            Ok(decision) => decision,
            Err(e) => {
                error!(room = %room, field_set = field_set.as_str(), "authorization failed: {}", e);
                let reason = "authorization check failed".to_string();
                match field_set {
                    FieldSet::AvState => av_state = Outcome::Failed(reason),
                    FieldSet::AvConfig => av_config = Outcome::Failed(reason),
                    FieldSet::Basic => {}
                }
                continue;
            }
        };

        if decision == Decision::Deny {
            warn!(room = %room, field_set = field_set.as_str(), method = %method, "field-set denied");
        }

        match (field_set, decision) {
            (FieldSet::Basic, _) => {}
            (FieldSet::AvState, Decision::Deny) => av_state = Outcome::Denied,
            (FieldSet::AvConfig, Decision::Deny) => av_config = Outcome::Denied,
            (FieldSet::AvState, Decision::Allow) => {
                av_state = fetch_state(state, method, &room, body).await?;
            }
            (FieldSet::AvConfig, Decision::Allow) => {
                av_config = match state.services.room_config(&room).await {
                    Ok(config) => Outcome::Ok(config),
                    Err(e) => {
                        error!(room = %room, "get room configuration failed: {}", e);
                        Outcome::Failed("unable to get configuration of the room".to_string())
                    }
                };
            }
        }
    }

    Ok(state.translator.translate(&room, &field_sets, &av_state, &av_config))
}

/// Read the room state, or write it first on PUT. A body that is not a room
/// state fails the whole request.
async fn fetch_state(
    state: &AppState,
    method: &Method,
    room: &RoomId,
    body: &Bytes,
) -> Result<Outcome<RoomState>, ApiError> {
    let result = if *method == Method::PUT {
        let requested: RoomState = serde_json::from_slice(body).map_err(|e| {
            info!(room = %room, "rejected room state body: {}", e);
            ApiError::invalid_json(format!("invalid room state body: {}", e))
        })?;
        state.services.set_room_state(room, requested).await
    } else {
        state.services.room_state(room).await
    };

    Ok(match result {
        Ok(room_state) => Outcome::Ok(room_state),
        Err(e) => {
            error!(room = %room, method = %method, "room state request failed: {}", e);
            Outcome::Failed("unable to reach the AV API for the room state".to_string())
        }
    })
}
