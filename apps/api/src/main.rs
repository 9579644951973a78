mod classification;
mod config;
mod errors;
mod extraction;
mod model;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::model::ArtifactStore;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Classifier v{}", env!("CARGO_PKG_VERSION"));

    // Load both artifacts before binding so a missing model stops startup.
    let artifacts = Arc::new(ArtifactStore::new(config.artifact_paths()));
    let store = Arc::clone(&artifacts);
    let loaded = tokio::task::spawn_blocking(move || store.get_or_load())
        .await?
        .context("Failed to load model artifacts")?;
    info!(
        "Model ready: {} classes, {} features",
        loaded.classifier.classes().len(),
        loaded.classifier.n_features()
    );

    let state = AppState {
        artifacts,
        config: config.clone(),
    };

    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
