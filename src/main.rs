mod analyzer;
mod api;
mod artifacts;
mod classifier;
mod config;
mod inference;
mod normalize;
mod presentation;
mod render;
mod scaler;
mod vectorizer;

use anyhow::Context;
use dotenv::dotenv;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = config::Settings::from_env()?;
    info!("🧠 Label policy: {}", settings.policy);

    let artifacts = artifacts::load(&settings.artifacts, settings.policy)
        .context("could not load model artifacts")?;

    let state = Arc::new(api::AppState {
        artifacts,
        policy: settings.policy,
        max_input_bytes: settings.max_input_bytes,
    });
    let app = api::router(state, &settings.static_dir);

    let listener = tokio::net::TcpListener::bind(settings.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.bind_addr))?;
    info!("🚀 Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
