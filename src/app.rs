use axum::{
    extract::{Request, State},
    response::{Json, Response},
    routing::get,
    Router,
};
use serde_json::json;
use std::{convert::Infallible, sync::Arc};
use tower::{Layer, Service};
use tower_http::cors::CorsLayer;

use crate::shared::state::SharedState;
use crate::system::versioning::{version_middleware, Version, VersionRegistry, VersionedResponse};

pub fn build_router(state: Arc<SharedState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config", get(config_handler))
        .route("/versions", get(versions_handler))
        .route("/whoami", get(whoami_handler))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

/// Wraps the whole router so the version segment is stripped before routing.
pub fn with_versioning(
    router: Router,
    registry: Arc<VersionRegistry>,
) -> impl Service<Request, Response = Response, Error = Infallible, Future: Send + 'static>
       + Clone
       + Send
       + 'static {
    axum::middleware::from_fn_with_state(registry, version_middleware).layer(router)
}

// Health check handler
async fn health_handler(State(state): State<Arc<SharedState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "environment": state.config.environment,
    }))
}

// Config handler
async fn config_handler(State(state): State<Arc<SharedState>>) -> Json<serde_json::Value> {
    Json(json!({
        "environment": state.config.environment,
        "server": {
            "host": state.config.server.host,
            "port": state.config.server.port
        },
        "versioning": state.config.versioning,
    }))
}

async fn versions_handler(State(state): State<Arc<SharedState>>) -> Json<serde_json::Value> {
    let registry = &state.version_registry;
    Json(json!({
        "supported": registry.supported_versions(),
        "latest": registry.latest_version(),
        "emit_header": registry.emits_header(),
    }))
}

async fn whoami_handler(version: Version) -> VersionedResponse<serde_json::Value> {
    let message = if version.is_explicit() {
        format!("Requested API {}", version.uri())
    } else {
        format!("Defaulted to API version {}", version.version)
    };
    VersionedResponse::new(json!({ "message": message }), &version)
}
