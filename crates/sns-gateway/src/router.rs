//! Axum router construction.
//!
//! Assembles the REST and `WebSocket` routes into a single [`Router`]
//! with CORS and request tracing enabled.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /health` -- liveness probe
/// - `POST /api/login` -- register a username
/// - `GET /api/list` -- all users and one user's followers
/// - `POST /api/follow` -- add a follow edge
/// - `POST /api/unfollow` -- remove a follow edge
/// - `GET /ws/timeline` -- `WebSocket` timeline stream
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        // WebSocket
        .route("/ws/timeline", get(ws::timeline))
        // REST API
        .route("/api/login", post(handlers::login))
        .route("/api/list", get(handlers::list))
        .route("/api/follow", post(handlers::follow))
        .route("/api/unfollow", post(handlers::unfollow))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
