//! Error types for the timeline core.
//!
//! Every registry, graph, and session failure is a [`TimelineError`]
//! variant of its own. The transport only has a handful of status codes,
//! so [`ErrorKind`] groups the variants the way the wire reports them;
//! [`TimelineError::reason`] keeps the distinct kind visible.

use sns_store::StoreError;

/// Errors returned by timeline operations.
#[derive(Debug, thiserror::Error)]
pub enum TimelineError {
    /// The named user is not registered.
    #[error("user {username} not found")]
    NotFound {
        /// The name that failed to resolve.
        username: String,
    },

    /// The name is already registered. Existing names are never reused.
    #[error("user {username} already logged in")]
    AlreadyLoggedIn {
        /// The duplicate name.
        username: String,
    },

    /// A user tried to follow or unfollow themselves.
    #[error("{username} cannot follow or unfollow themselves")]
    SelfFollow {
        /// The acting user.
        username: String,
    },

    /// The follow edge already exists.
    #[error("{follower} already follows {target}")]
    AlreadyFollowing {
        /// The acting user.
        follower: String,
        /// The user already followed.
        target: String,
    },

    /// The follow edge does not exist.
    #[error("{follower} does not follow {target}")]
    NotFollowing {
        /// The acting user.
        follower: String,
        /// The user not followed.
        target: String,
    },

    /// The user already holds a live timeline session.
    #[error("user {username} already has an open timeline")]
    AlreadyConnected {
        /// The connected user.
        username: String,
    },

    /// The request is malformed.
    #[error("invalid request: {0}")]
    Invalid(String),

    /// The stream ended before a session could be bound.
    #[error("timeline stream closed")]
    Disconnected,

    /// The persistence log failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Coarse error classes reported by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unknown username.
    NotFound,
    /// Duplicate login, edge already in the requested state, self-target,
    /// or a second live session.
    AlreadyExists,
    /// Malformed request.
    Invalid,
    /// The stream was terminated.
    Cancelled,
    /// Storage or other server-side failure.
    Internal,
}

impl ErrorKind {
    /// Snake-case code used in error bodies.
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::AlreadyExists => "already_exists",
            Self::Invalid => "invalid",
            Self::Cancelled => "cancelled",
            Self::Internal => "internal",
        }
    }
}

impl TimelineError {
    /// The coarse class this error is reported as.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::AlreadyLoggedIn { .. }
            | Self::SelfFollow { .. }
            | Self::AlreadyFollowing { .. }
            | Self::NotFollowing { .. }
            | Self::AlreadyConnected { .. } => ErrorKind::AlreadyExists,
            Self::Invalid(_) => ErrorKind::Invalid,
            Self::Disconnected => ErrorKind::Cancelled,
            Self::Store(_) => ErrorKind::Internal,
        }
    }

    /// The distinct semantic kind, stable for clients to match on.
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::AlreadyLoggedIn { .. } => "already_logged_in",
            Self::SelfFollow { .. } => "self_follow",
            Self::AlreadyFollowing { .. } => "already_following",
            Self::NotFollowing { .. } => "not_following",
            Self::AlreadyConnected { .. } => "already_connected",
            Self::Invalid(_) => "invalid",
            Self::Disconnected => "disconnected",
            Self::Store(_) => "store",
        }
    }

    pub(crate) fn not_found(username: &str) -> Self {
        Self::NotFound {
            username: username.to_owned(),
        }
    }
}
