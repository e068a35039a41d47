//! Internal configuration API served by the authority.
//!
//! # Endpoints
//! - `GET /.internal/configuration/{category}/raw`: raw document text
//! - `GET /healthz`: liveness

use std::io;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::Category;
use crate::lifecycle::ShutdownSignal;
use crate::server::ConfigServer;

/// Build the internal API router.
pub fn router(server: Arc<ConfigServer>) -> Router {
    Router::new()
        .route("/.internal/configuration/{category}/raw", get(raw_document))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(server)
}

/// Serve the internal API until shutdown is signalled.
pub async fn serve(
    listener: TcpListener,
    server: Arc<ConfigServer>,
    mut shutdown: ShutdownSignal,
) -> Result<(), io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "Internal configuration API listening");

    axum::serve(listener, router(server))
        .with_graceful_shutdown(async move { shutdown.recv().await })
        .await?;

    tracing::info!("Internal configuration API stopped");
    Ok(())
}

async fn raw_document(
    State(server): State<Arc<ConfigServer>>,
    Path(category): Path<String>,
) -> Response {
    match category.parse::<Category>() {
        Ok(category) => (StatusCode::OK, server.raw(category)).into_response(),
        Err(e) => (StatusCode::NOT_FOUND, e.to_string()).into_response(),
    }
}

async fn healthz(State(server): State<Arc<ConfigServer>>) -> impl IntoResponse {
    if server.is_serving() {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "starting")
    }
}
