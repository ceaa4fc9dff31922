//! HTTP API surface: router, shared state and the listener loop.

use std::sync::Arc;

use axum::http::Method;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Serialize;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use hookd_store::Database;

use crate::error::ApiError;
use crate::{endpoints, messages, subscribers};

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// The store handle. The connection is not shareable across threads,
    /// so handlers serialize access through the mutex; every operation is
    /// a short-lived query and never holds the lock across I/O.
    pub db: Arc<Mutex<Database>>,
}

/// Parse a path segment as a UUID.
///
/// Malformed identifiers are indistinguishable from unknown ones: both
/// produce a missing-resource response.
pub(crate) fn uuid_param(value: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(value).map_err(|_| ApiError::NotFound)
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/subscribers", post(subscribers::create))
        .route("/api/v1/subscribers/:id", get(subscribers::detail))
        .route("/api/v1/subscribers/:id", delete(subscribers::remove))
        .route(
            "/api/v1/subscribers/:id/endpoints",
            get(subscribers::endpoint_list),
        )
        .route("/api/v1/endpoints", post(endpoints::create))
        .route("/api/v1/endpoints/:id", get(endpoints::detail))
        .route("/api/v1/endpoints/:id", delete(endpoints::remove))
        .route("/api/v1/messages", post(messages::create))
        .route("/api/v1/messages/:id", get(messages::detail))
        .route("/api/v1/messages/:id", delete(messages::remove))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
