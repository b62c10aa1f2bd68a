//! REST endpoint handlers.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/health` | Liveness probe |
//! | `POST` | `/api/login` | Register a username |
//! | `GET` | `/api/list?username=` | All users and the caller's followers |
//! | `POST` | `/api/follow` | Follow another user |
//! | `POST` | `/api/unfollow` | Stop following another user |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use sns_types::{FollowRequest, ListQuery, ListReply, LoginRequest, Reply};

use crate::error::GatewayError;
use crate::state::AppState;

/// Report that the server is up.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Register a new user.
///
/// # Route
///
/// `POST /api/login`
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Reply>, GatewayError> {
    Ok(Json(state.service.login(&request.username).await?))
}

/// List every user and the followers of `username`.
///
/// # Route
///
/// `GET /api/list?username=`
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListReply>, GatewayError> {
    Ok(Json(state.service.list(&query.username).await?))
}

/// Make `username` follow `target`.
///
/// # Route
///
/// `POST /api/follow`
pub async fn follow(
    State(state): State<Arc<AppState>>,
    Json(request): Json<FollowRequest>,
) -> Result<Json<Reply>, GatewayError> {
    let reply = state
        .service
        .follow(&request.username, &request.target)
        .await?;
    Ok(Json(reply))
}

/// Make `username` stop following `target`.
///
/// # Route
///
/// `POST /api/unfollow`
pub async fn unfollow(
    State(state): State<Arc<AppState>>,
    Json(request): Json<FollowRequest>,
) -> Result<Json<Reply>, GatewayError> {
    let reply = state
        .service
        .unfollow(&request.username, &request.target)
        .await?;
    Ok(Json(reply))
}
