use anyhow::Context;
use clap::Parser;
use tracing::info;

use uapi_translator::app::{app, opa_client, AppState};
use uapi_translator::config::{AppConfig, Args};
use uapi_translator::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so local runs pick up DB_ADDRESS, AV_API_URL, etc.
    let _ = dotenvy::dotenv();

    let config = AppConfig::from_args(Args::parse()).context("invalid configuration")?;
    let log_control = logging::init(config.server.log_level);

    let http = config.http_client()?;
    let state = AppState::from_config(&config, http.clone(), Some(log_control))?;
    let opa = opa_client(&config, http)?;

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!(
        addr = %bind_addr,
        auth = !config.auth.disabled,
        "UAPI translator listening"
    );

    axum::serve(listener, app(state, opa)).await.context("server")?;
    Ok(())
}
