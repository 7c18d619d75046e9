//! Newsdeck — Binary Entrypoint
//! Boots the Axum HTTP server, wiring routes, shared state, and middleware.

use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use newsdeck::api::{self, AppState};
use newsdeck::config::Config;
use newsdeck::metrics::Metrics;

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("newsdeck=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = Config::load().context("loading configuration")?;
    let metrics = Metrics::init();

    let state = AppState::from_config(&config);
    let app = api::router(state).merge(metrics.router());

    let addr = std::env::var("NEWSDECK_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "newsdeck listening");
    axum::serve(listener, app).await.context("serving http")?;
    Ok(())
}
