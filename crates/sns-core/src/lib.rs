//! Timeline core for the SNS service.
//!
//! This crate owns everything between the transport and the logs: who
//! exists, who follows whom, who is online, and where each post goes.
//!
//! # Modules
//!
//! - [`registry`] -- Client registry keyed by username.
//! - [`user`] -- Per-user record: edge sets and the live session slot.
//! - [`graph`] -- Follow, unfollow, and graph listing on the registry.
//! - [`session`] -- Timeline session state machine and stream driver.
//! - [`fanout`] -- Post distribution to live and offline followers.
//! - [`service`] -- [`TimelineService`], the facade the transport calls.
//! - [`config`] -- Configuration loading from `sns-config.yaml`.
//! - [`error`] -- [`TimelineError`] and its coarse [`ErrorKind`].
//!
//! # Locking
//!
//! The registry map has its own lock, taken for writing only when a user
//! is inserted. Each user carries a lock for its edge sets and a lock for
//! its session slot. Follow and unfollow take both users' edge locks in
//! username order. Fanout takes one follower's session slot at a time and
//! holds it across the deliver-or-enqueue decision.
//!
//! [`TimelineService`]: service::TimelineService
//! [`TimelineError`]: error::TimelineError
//! [`ErrorKind`]: error::ErrorKind

pub mod config;
pub mod error;
pub mod fanout;
pub mod graph;
pub mod registry;
pub mod service;
pub mod session;
pub mod user;

// Re-export primary types for convenience.
pub use config::{ConfigError, ServiceConfig};
pub use error::{ErrorKind, TimelineError};
pub use fanout::{FanoutEngine, FanoutReport};
pub use registry::ClientRegistry;
pub use service::TimelineService;
pub use session::{ActiveSession, SessionManager};
pub use user::{DeliveryError, Edges, SessionHandle, UserRecord};
