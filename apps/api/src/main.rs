mod brief;
mod config;
mod errors;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::brief::resolver::KeywordResolver;
use crate::brief::script::OutlineScriptGenerator;
use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first so RUST_LOG from .env is honoured
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Atelier API v{}", env!("CARGO_PKG_VERSION"));

    // Load and compile the rule catalog once; it is immutable from here on
    let catalog = config.load_catalog()?;
    info!(
        "Rule catalog loaded from {}: {} groups, {} rules, {} defaults",
        config.catalog_source(),
        catalog.groups.len(),
        catalog.rules.len(),
        catalog.defaults.len()
    );
    let resolver = KeywordResolver::new(catalog).context("Rule catalog is invalid")?;

    let state = AppState {
        config: config.clone(),
        resolver: Arc::new(resolver),
        script_generator: Arc::new(OutlineScriptGenerator),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
