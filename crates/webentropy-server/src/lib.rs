//! HTTP freshness-token server.
//!
//! A thin shell over [`webentropy_core::harvest_and_hash`]: one GET route
//! that runs a full harvest per request and returns the JSON result with
//! fixed headers (no-store caching, permissive cross-origin access). Every
//! other route and method is rejected.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};

use webentropy_core::{HarvestConfig, LogSink, harvest_and_hash};

/// Shared server state: the immutable harvest configuration.
struct AppState {
    config: HarvestConfig,
}

/// Fixed headers attached to every response.
const RESPONSE_HEADERS: [(header::HeaderName, &str); 2] = [
    (header::CACHE_CONTROL, "no-store"),
    (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
];

async fn handle_harvest(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (status, body) = harvest_and_hash(&state.config, &LogSink).await;
    (http_status(status), RESPONSE_HEADERS, Json(body))
}

async fn handle_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        RESPONSE_HEADERS,
        Json(serde_json::json!({ "error": "not found" })),
    )
}

fn http_status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Build the axum router.
fn build_router(config: HarvestConfig) -> Router {
    let state = Arc::new(AppState { config });

    Router::new()
        .route("/", get(handle_harvest))
        .route("/entropy", get(handle_harvest))
        .fallback(handle_not_found)
        .with_state(state)
}

/// Run the HTTP server.
pub async fn run_server(config: HarvestConfig, host: &str, port: u16) {
    let app = build_router(config);
    let addr = format!("{host}:{port}");
    log::info!("serving freshness tokens on http://{addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
