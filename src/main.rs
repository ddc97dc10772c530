use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use gemini_relay::{
    config::Config, routes, services::gemini::GeminiClient, state::AppState,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Arc::new(Config::from_env().context("failed to load configuration")?);
    let model = GeminiClient::new(config.clone()).context("failed to build Gemini client")?;
    let state = Arc::new(AppState::new(Arc::new(model)));

    let app = routes::create_router().with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(%addr, model = %config.model, "gemini relay listening");
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
