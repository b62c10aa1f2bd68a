//! HTTP and `WebSocket` gateway for the SNS timeline service.
//!
//! This crate provides an Axum server that exposes:
//!
//! - **REST endpoints** for login, listing, follow, and unfollow
//! - **`WebSocket` endpoint** (`/ws/timeline`) carrying JSON-encoded
//!   [`Message`](sns_types::Message) frames in both directions
//! - **Health probe** (`GET /health`)
//!
//! # Architecture
//!
//! Every handler is a thin adapter over [`TimelineService`]. Errors are
//! rendered by [`GatewayError`] as JSON bodies that carry both the coarse
//! transport code and the precise reason, so clients can tell a
//! self-follow from a repeated follow even though both are `409`.
//!
//! [`TimelineService`]: sns_core::TimelineService
//! [`GatewayError`]: error::GatewayError

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::AppState;
