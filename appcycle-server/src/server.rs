//! Axum server setup and router configuration.

use crate::error::ApiError;
use crate::state::AppState;
use appcycle_core::error::AppError;
use appcycle_sdk::context::{CORRELATION_ID_HEADER, RequestContext};
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, header},
    response::IntoResponse,
    routing::{get, post},
};
use serde::Serialize;
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Build the main application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Lifecycle endpoint
        .route("/", post(lifecycle))
        // Health check endpoint
        .route("/health", get(health_check))
        .with_state(state)
}

/// Run one lifecycle request through the current dispatcher.
async fn lifecycle(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let body = String::from_utf8(body.to_vec()).map_err(|e| {
        let correlation_id = headers
            .get(CORRELATION_ID_HEADER)
            .and_then(|value| value.to_str().ok());
        ApiError(AppError::bad_request(
            format!("request body is not valid UTF-8: {e}"),
            correlation_id,
        ))
    })?;

    let headers = headers.iter().filter_map(|(name, value)| {
        value
            .to_str()
            .ok()
            .map(|value| (name.as_str(), value.to_string()))
    });
    let context = RequestContext::new(headers, body);

    let response = state.dispatcher().await.dispatch(&context).await?;
    Ok(([(header::CONTENT_TYPE, "application/json")], response))
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Simple health check - returns OK if the server is running.
async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Run the server until `shutdown` completes.
pub async fn run_server(
    router: Router,
    addr: SocketAddr,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}
