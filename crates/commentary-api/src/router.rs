//! Axum router construction for the commentary API.
//!
//! Commentary routes are scoped under `/matches/{id}/commentary`; the match
//! identifier is validated by each handler.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /health` -- liveness probe
/// - `GET /matches/{id}/commentary` -- list entries
/// - `POST /matches/{id}/commentary` -- create an entry
/// - `GET /matches/{id}/commentary/ws` -- live `WebSocket` stream
///
/// CORS allows any origin so browser scoreboards can call the API directly.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/matches/{id}/commentary",
            get(handlers::list_commentary).post(handlers::create_commentary),
        )
        .route("/matches/{id}/commentary/ws", get(ws::commentary_stream))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
