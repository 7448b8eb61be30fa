#![allow(dead_code)]

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use reqwest::StatusCode;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use uapi_translator::app::{app, opa_client, AppState};
use uapi_translator::config::{AppConfig, Args};

/// Mocked backends the server under test talks to.
pub struct Backends {
    pub couch: MockServer,
    pub av_api: MockServer,
    pub auth: MockServer,
    pub opa: MockServer,
}

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub backends: Backends,
    pub client: reqwest::Client,
}

impl TestServer {
    pub fn url(&self, route: &str) -> String {
        format!("{}{}", self.base_url, route)
    }

    pub async fn get(&self, route: &str) -> Result<(StatusCode, Value)> {
        let resp = self.client.get(self.url(route)).send().await?;
        let status = resp.status();
        Ok((status, resp.json().await.context("response is not JSON")?))
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = self.client.get(self.url("/")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

/// Start the router in-process on a free port. With `auth` set, the policy
/// service allows everything and field-set checks go to the permissions mock.
pub async fn spawn(auth: bool) -> Result<TestServer> {
    let backends = Backends {
        couch: MockServer::start().await,
        av_api: MockServer::start().await,
        auth: MockServer::start().await,
        opa: MockServer::start().await,
    };

    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let port_arg = port.to_string();
    let couch_uri = backends.couch.uri();
    let av_uri = backends.av_api.uri();
    let auth_uri = backends.auth.uri();
    let opa_uri = backends.opa.uri();

    let mut argv = vec![
        "uapi-translator",
        "--port",
        port_arg.as_str(),
        "--db-address",
        couch_uri.as_str(),
        "--av-api-url",
        av_uri.as_str(),
    ];
    if auth {
        argv.extend(["--opa-url", opa_uri.as_str(), "--auth-url", auth_uri.as_str()]);
        Mock::given(method("POST"))
            .and(path("/v1/data/uapi"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": { "allow": true } })))
            .mount(&backends.opa)
            .await;
    } else {
        argv.push("--disable-auth");
    }

    let config = AppConfig::from_args(Args::try_parse_from(argv)?)?;
    let http = config.http_client()?;
    let state = AppState::from_config(&config, http.clone(), None)?;
    let router = app(state, opa_client(&config, http)?);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test port")?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    let server = TestServer {
        port,
        base_url: format!("http://127.0.0.1:{}", port),
        backends,
        client: reqwest::Client::new(),
    };
    server.wait_ready(Duration::from_secs(5)).await?;
    Ok(server)
}

/// Answer `POST /{db}/_find` with `docs`.
pub async fn mock_find(server: &MockServer, db: &str, docs: Value) {
    Mock::given(method("POST"))
        .and(path(format!("/{}/_find", db)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "docs": docs })))
        .mount(server)
        .await;
}

/// Answer `GET /{db}/{id}` with `doc`.
pub async fn mock_doc(server: &MockServer, db: &str, id: &str, doc: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/{}/{}", db, id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(doc))
        .mount(server)
        .await;
}

pub fn ui_config() -> Value {
    json!({
        "_id": "ITB-1101",
        "presets": [
            {
                "name": "Front",
                "displays": ["D1", "D2"],
                "audioDevices": ["D1", "D2"],
                "independentAudioDevices": ["MIC1"],
                "inputs": ["HDMI1"]
            }
        ],
        "inputConfiguration": [{ "name": "HDMI1", "type": "hdmi" }]
    })
}

pub fn room_state() -> Value {
    json!({
        "displays": [
            { "name": "D1", "power": "on", "input": "HDMI1", "blanked": false },
            { "name": "D2", "power": "on", "input": "HDMI1", "blanked": false }
        ],
        "audioDevices": [
            { "name": "D1", "power": "on", "muted": false, "volume": 30 },
            { "name": "D2", "power": "on", "muted": true, "volume": 45 },
            { "name": "MIC1", "muted": false, "volume": 70 }
        ]
    })
}
