//! Integration tests for the gateway REST endpoints.
//!
//! Tests drive the Axum `Router` directly via `tower::ServiceExt` without
//! starting a TCP server.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::Value;
use sns_gateway::build_router;
use sns_gateway::state::AppState;
use tower::ServiceExt;

fn make_router() -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::in_memory());
    (build_router(Arc::clone(&state)), state)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn call(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

async fn login(router: &Router, username: &str) {
    let (status, _) = call(
        router,
        post_json("/api/login", &serde_json::json!({ "username": username })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_health() {
    let (router, _) = make_router();
    let (status, json) = call(&router, Request::get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_login_succeeds_once() {
    let (router, _) = make_router();
    let body = serde_json::json!({ "username": "alice" });

    let (status, json) = call(&router, post_json("/api/login", &body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ok"], true);
    assert_eq!(json["msg"], "Login Success for alice");

    let (status, json) = call(&router, post_json("/api/login", &body)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "already_exists");
    assert_eq!(json["reason"], "already_logged_in");
    assert_eq!(json["status"], 409);
}

#[tokio::test]
async fn test_login_rejects_bad_name() {
    let (router, _) = make_router();
    let (status, json) = call(
        &router,
        post_json("/api/login", &serde_json::json!({ "username": "a,b" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "invalid");
}

#[tokio::test]
async fn test_list_returns_users_and_followers() {
    let (router, _) = make_router();
    login(&router, "alice").await;
    login(&router, "bob").await;
    let (status, _) = call(
        &router,
        post_json(
            "/api/follow",
            &serde_json::json!({ "username": "bob", "target": "alice" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = call(
        &router,
        Request::get("/api/list?username=alice")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["all_users"], serde_json::json!(["alice", "bob"]));
    assert_eq!(json["followers"], serde_json::json!(["bob"]));
}

#[tokio::test]
async fn test_list_unknown_user_is_404() {
    let (router, _) = make_router();
    let (status, json) = call(
        &router,
        Request::get("/api/list?username=ghost")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "not_found");
    assert_eq!(json["reason"], "not_found");
}

#[tokio::test]
async fn test_conflicts_carry_distinct_reasons() {
    let (router, _) = make_router();
    login(&router, "alice").await;
    login(&router, "bob").await;
    let edge = serde_json::json!({ "username": "bob", "target": "alice" });
    let own = serde_json::json!({ "username": "bob", "target": "bob" });

    let (status, json) = call(&router, post_json("/api/follow", &own)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["reason"], "self_follow");

    let (status, json) = call(&router, post_json("/api/unfollow", &edge)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["reason"], "not_following");

    call(&router, post_json("/api/follow", &edge)).await;
    let (status, json) = call(&router, post_json("/api/follow", &edge)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "already_exists");
    assert_eq!(json["reason"], "already_following");
}

#[tokio::test]
async fn test_unfollow_removes_edge() {
    let (router, state) = make_router();
    login(&router, "alice").await;
    login(&router, "bob").await;
    let edge = serde_json::json!({ "username": "bob", "target": "alice" });

    call(&router, post_json("/api/follow", &edge)).await;
    let (status, json) = call(&router, post_json("/api/unfollow", &edge)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ok"], true);

    let list = state.service.list("alice").await.unwrap();
    assert!(list.followers.is_empty());
}

#[tokio::test]
async fn test_follow_unknown_target_is_404() {
    let (router, _) = make_router();
    login(&router, "bob").await;
    let (status, json) = call(
        &router,
        post_json(
            "/api/follow",
            &serde_json::json!({ "username": "bob", "target": "ghost" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["status"], 404);
}

#[tokio::test]
async fn test_timeline_route_requires_upgrade() {
    let (router, _) = make_router();
    let response = router
        .oneshot(Request::get("/ws/timeline").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}
