use axum::{extract::Request, ServiceExt};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use api_versioning::{app, shared::state::SharedState, system::config::AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = AppConfig::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.level)),
        )
        .init();

    info!(environment = %config.environment, log_level = %config.log.level, "configuration loaded");

    let state = Arc::new(SharedState::new(config));
    let registry = Arc::clone(&state.version_registry);
    info!(
        supported = ?registry.supported_versions(),
        latest = ?registry.latest_version(),
        emit_header = registry.emits_header(),
        "API versioning enabled"
    );

    let app = app::with_versioning(app::build_router(Arc::clone(&state)), registry);

    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "server listening");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app)).await?;

    Ok(())
}
