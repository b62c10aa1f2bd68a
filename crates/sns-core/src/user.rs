//! Per-user record held by the registry.
//!
//! A [`UserRecord`] is created once per username and lives for the rest
//! of the process. Its two locks are independent: edge mutations never
//! wait on session binding and vice versa.

use sns_types::{Message, SessionId};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{Mutex, mpsc};

/// Follow edges of one user, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Edges {
    following: Vec<String>,
    followers: Vec<String>,
}

impl Edges {
    /// Users this user follows.
    pub fn following(&self) -> &[String] {
        &self.following
    }

    /// Users following this user.
    pub fn followers(&self) -> &[String] {
        &self.followers
    }

    /// Whether this user follows `username`.
    pub fn is_following(&self, username: &str) -> bool {
        self.following.iter().any(|name| name == username)
    }

    /// Whether `username` follows this user.
    pub fn is_followed_by(&self, username: &str) -> bool {
        self.followers.iter().any(|name| name == username)
    }

    pub(crate) fn add_following(&mut self, username: &str) {
        self.following.push(username.to_owned());
    }

    pub(crate) fn add_follower(&mut self, username: &str) {
        self.followers.push(username.to_owned());
    }

    pub(crate) fn remove_following(&mut self, username: &str) {
        self.following.retain(|name| name != username);
    }

    pub(crate) fn remove_follower(&mut self, username: &str) {
        self.followers.retain(|name| name != username);
    }
}

/// Why a live push was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// The session's outbound queue is full.
    #[error("outbound queue full")]
    Full,
    /// The session's outbound forwarder has stopped.
    #[error("outbound queue closed")]
    Closed,
}

/// The push side of a live session.
///
/// Only the session's outbound forwarder reads the other end, so every
/// write to the client goes through this queue in order.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: SessionId,
    outbound: mpsc::Sender<Message>,
}

impl SessionHandle {
    pub(crate) const fn new(id: SessionId, outbound: mpsc::Sender<Message>) -> Self {
        Self { id, outbound }
    }

    /// The session this handle belongs to.
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Queue a frame without waiting.
    pub fn push(&self, message: Message) -> Result<(), DeliveryError> {
        self.outbound.try_send(message).map_err(|e| match e {
            TrySendError::Full(_) => DeliveryError::Full,
            TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }
}

/// A registered user.
#[derive(Debug)]
pub struct UserRecord {
    username: String,
    edges: Mutex<Edges>,
    session: Mutex<Option<SessionHandle>>,
}

impl UserRecord {
    pub(crate) fn new(username: &str) -> Self {
        Self {
            username: username.to_owned(),
            edges: Mutex::new(Edges::default()),
            session: Mutex::new(None),
        }
    }

    /// The user's immutable name.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Snapshot of the user's edges.
    pub async fn edges(&self) -> Edges {
        self.edges.lock().await.clone()
    }

    /// Snapshot of the user's followers.
    pub async fn followers(&self) -> Vec<String> {
        self.edges.lock().await.followers.clone()
    }

    /// Whether the user holds a live session.
    pub async fn is_connected(&self) -> bool {
        self.session.lock().await.is_some()
    }

    /// The id of the live session, if any.
    pub async fn session_id(&self) -> Option<SessionId> {
        self.session.lock().await.as_ref().map(SessionHandle::id)
    }

    pub(crate) const fn edges_lock(&self) -> &Mutex<Edges> {
        &self.edges
    }

    pub(crate) const fn session_slot(&self) -> &Mutex<Option<SessionHandle>> {
        &self.session
    }
}
