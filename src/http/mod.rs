//! HTTP transport (spec §6). Routes requests onto `Supervisor` operations.
//! The teacher has no HTTP surface; grounded on
//! `remotemedia_http::server::HttpServer` (router-plus-state shape, the
//! `tower`/`tower-http` tracing+CORS layer stack) from the pack's enrichment
//! repo.

mod handlers;

use crate::supervisor::Supervisor;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct ApiState {
    pub supervisor: Arc<Supervisor>,
}

pub fn build_router(supervisor: Arc<Supervisor>) -> Router {
    let state = ApiState { supervisor };

    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/nodes", get(handlers::list_nodes))
        .route("/nodes/launch", post(handlers::launch_node))
        .route("/nodes/terminate", post(handlers::terminate_node))
        .route("/nodes/:name/status", get(handlers::node_status))
        .with_state(state)
        .layer(
            tower::ServiceBuilder::new().layer(tower_http::trace::TraceLayer::new_for_http()),
        )
}

/// Binds and serves until the process receives a shutdown signal; the
/// returned future resolves once `axum::serve` exits.
pub async fn serve(
    bind_address: &str,
    supervisor: Arc<Supervisor>,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let addr: SocketAddr = bind_address
        .parse()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let router = build_router(supervisor);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}
