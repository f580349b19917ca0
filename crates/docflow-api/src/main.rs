//! # docflow-api entry point
//!
//! Reads configuration from the environment, wires the application state,
//! and serves the API over the configured listen address.

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use docflow_api::state::AppState;
use docflow_core::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let bind_addr = config.bind_addr;

    tracing::info!(
        %bind_addr,
        genai_configured = config.genai.api_url.is_some(),
        workflow_configured = config.workflow.binding.is_some(),
        "starting docflow-api"
    );

    let state = AppState::new(config);
    let app = docflow_api::app(state);

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    axum::serve(listener, app)
        .await
        .context("server terminated")?;

    Ok(())
}
