mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use common::{room_state, spawn};

fn code(body: &Value, field_set: &str) -> Option<u64> {
    body[field_set]["metadata"]["validation_response"]["code"].as_u64()
}

#[tokio::test]
async fn put_without_token_denies_state_only() -> Result<()> {
    let server = spawn(true).await?;

    let resp = server
        .client
        .put(server.url("/ITB-1101?field_sets=av_state"))
        .json(&room_state())
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await?;

    assert_eq!(code(&body, "basic"), Some(201));
    assert_eq!(code(&body, "av_state"), Some(403));
    assert_eq!(
        body["metadata"]["field_sets_returned"],
        json!(["basic", "av_state"])
    );
    assert!(server.backends.av_api.received_requests().await.unwrap_or_default().is_empty());
    Ok(())
}

#[tokio::test]
async fn granted_token_reads_state() -> Result<()> {
    let server = spawn(true).await?;

    Mock::given(method("GET"))
        .and(path("/permissions"))
        .and(query_param("resource_id", "ITB-1101"))
        .and(query_param("resource_type", "room"))
        .and(header("X-jwt-assertion", "good-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "permissions": { "ITB-1101": ["read-state"] }
        })))
        .mount(&server.backends.auth)
        .await;
    Mock::given(method("GET"))
        .and(path("/buildings/ITB/rooms/1101"))
        .respond_with(ResponseTemplate::new(200).set_body_json(room_state()))
        .mount(&server.backends.av_api)
        .await;

    let resp = server
        .client
        .get(server.url("/ITB-1101/av_state"))
        .header("X-jwt-assertion", "good-token")
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await?;

    assert_eq!(code(&body, "av_state"), Some(201));
    assert_eq!(body["basic"], Value::Null);
    assert!(body["av_state"]["displays"].is_object());
    Ok(())
}

#[tokio::test]
async fn missing_config_role_is_forbidden_per_field_set() -> Result<()> {
    let server = spawn(true).await?;

    Mock::given(method("GET"))
        .and(path("/permissions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "permissions": { "ITB-1101": ["read-state"] }
        })))
        .mount(&server.backends.auth)
        .await;

    let (status, body) = {
        let resp = server
            .client
            .get(server.url("/ITB-1101/av_config"))
            .bearer_auth("some-token")
            .send()
            .await?;
        let status = resp.status();
        (status, resp.json::<Value>().await?)
    };

    assert_eq!(status, StatusCode::OK);
    assert_eq!(code(&body, "av_config"), Some(403));
    Ok(())
}

#[tokio::test]
async fn granted_config_role_lists_reachable_devices() -> Result<()> {
    let server = spawn(true).await?;

    Mock::given(method("GET"))
        .and(path("/permissions"))
        .and(header("X-jwt-assertion", "config-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "permissions": { "ITB-1101": ["read-config"] }
        })))
        .mount(&server.backends.auth)
        .await;
    Mock::given(method("GET"))
        .and(path("/buildings/ITB/rooms/1101/configuration"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "room": {
                "_id": "ITB-1101",
                "devices": [
                    { "_id": "ITB-1101-D1", "name": "D1", "roles": [{ "_id": "VideoOut" }] },
                    { "_id": "ITB-1101-MIC1", "name": "MIC1", "roles": [{ "_id": "Microphone" }] },
                    { "_id": "ITB-1101-SW1", "name": "SW1", "roles": [{ "_id": "VideoSwitcher" }] }
                ]
            },
            "inputReachability": { "HDMI1": ["D1"] }
        })))
        .expect(1)
        .mount(&server.backends.av_api)
        .await;

    let resp = server
        .client
        .get(server.url("/ITB-1101/av_config"))
        .header("X-jwt-assertion", "config-token")
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await?;

    assert_eq!(code(&body, "av_config"), Some(201));
    let ids: Vec<&str> = body["av_config"]["devices"]["object_array"]
        .as_array()
        .map(|devices| devices.iter().filter_map(|d| d["id"]["value"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(ids, vec!["ITB-1101-D1", "ITB-1101-MIC1"]);
    Ok(())
}

#[tokio::test]
async fn policy_denial_rejects_whole_request() -> Result<()> {
    let server = spawn(true).await?;
    server.backends.opa.reset().await;
    Mock::given(method("POST"))
        .and(path("/v1/data/uapi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": { "allow": false } })))
        .mount(&server.backends.opa)
        .await;

    let (status, body) = server.get("/ITB-1101").await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Unauthorized");

    let resp = server.client.get(server.url("/health")).send().await?;
    assert_ne!(resp.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn malformed_room_is_bad_request() -> Result<()> {
    let server = spawn(false).await?;
    let (status, _) = server.get("/ITB?field_sets=basic").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}
