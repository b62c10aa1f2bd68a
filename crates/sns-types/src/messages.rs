//! Request, reply, and timeline message bodies.
//!
//! These mirror the service's RPC surface: three unary calls that take a
//! username (plus a target for graph mutations) and one bidirectional
//! stream of [`Message`] values.

use serde::{Deserialize, Serialize};

/// One frame on the timeline stream, in either direction.
///
/// The first frame a client sends carries only `username` and binds the
/// session. Every later client frame is a post. Frames pushed to the
/// client always carry the author in `username` and a timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Author of the post, or the identifying user on the first frame.
    pub username: String,
    /// Post body. Empty on the identifying frame.
    #[serde(default)]
    pub msg: String,
    /// Unix seconds. Left unset by clients that want receipt time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl Message {
    /// The identifying first frame of a timeline stream.
    pub fn identify(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            msg: String::new(),
            timestamp: None,
        }
    }

    /// A post frame without a timestamp; the server stamps receipt time.
    pub fn post(username: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            msg: msg.into(),
            timestamp: None,
        }
    }
}

/// Reply to the unary calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    /// Whether the call succeeded.
    pub ok: bool,
    /// Human-readable status line.
    pub msg: String,
}

impl Reply {
    /// A successful reply carrying a status line.
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            ok: true,
            msg: msg.into(),
        }
    }
}

/// Reply to `List`: the whole registry plus the caller's followers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListReply {
    /// Every known username, in registration order.
    pub all_users: Vec<String>,
    /// Users following the caller, in the order they followed.
    pub followers: Vec<String>,
}

/// Body of a login call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Name to register.
    pub username: String,
}

/// Body of a follow or unfollow call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowRequest {
    /// The acting user.
    pub username: String,
    /// The user to follow or unfollow.
    pub target: String,
}

/// Query parameters of a list call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    /// The user whose followers are listed.
    pub username: String,
}
