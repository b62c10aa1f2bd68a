//! Shared type definitions for the SNS timeline service.
//!
//! These are the values that cross the boundary between the transport and
//! the timeline core: the streamed [`Message`], the unary request/reply
//! bodies, and the [`Post`] the fanout engine distributes.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrapper for session identifiers
//! - [`messages`] -- Request, reply, and timeline message bodies
//! - [`post`] -- The immutable post value and its wire conversion

pub mod ids;
pub mod messages;
pub mod post;

// Re-export all public types at crate root for convenience.
pub use ids::SessionId;
pub use messages::{FollowRequest, ListQuery, ListReply, LoginRequest, Message, Reply};
pub use post::{Post, strip_line_breaks};
