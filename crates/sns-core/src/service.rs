//! The facade the transport layer calls.

use std::fmt::Display;
use std::sync::Arc;

use futures::{Sink, Stream};
use sns_store::{MemoryStore, TimelineStore};
use sns_types::{ListReply, Message, Reply};

use crate::config::TimelineConfig;
use crate::error::TimelineError;
use crate::fanout::FanoutReport;
use crate::registry::ClientRegistry;
use crate::session::{ActiveSession, SessionManager};

/// Login, graph operations, and timeline sessions over one registry and
/// one log store.
#[derive(Debug)]
pub struct TimelineService {
    registry: Arc<ClientRegistry>,
    sessions: SessionManager,
}

impl TimelineService {
    /// Build a service over `store`.
    pub fn new(store: Arc<dyn TimelineStore>, config: &TimelineConfig, clear_on_start: bool) -> Self {
        let registry = Arc::new(ClientRegistry::new());
        let sessions = SessionManager::new(Arc::clone(&registry), store, config, clear_on_start);
        Self { registry, sessions }
    }

    /// Build a service backed by a fresh [`MemoryStore`] with default
    /// timeline settings.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), &TimelineConfig::default(), false)
    }

    /// The shared client registry.
    pub const fn registry(&self) -> &Arc<ClientRegistry> {
        &self.registry
    }

    /// Register `username`.
    pub async fn login(&self, username: &str) -> Result<Reply, TimelineError> {
        self.registry.authenticate(username).await?;
        Ok(Reply::success(format!("Login Success for {username}")))
    }

    /// Every registered user, and the users following `username`.
    pub async fn list(&self, username: &str) -> Result<ListReply, TimelineError> {
        self.registry.list_graph(username).await
    }

    /// Make `username` follow `target`.
    pub async fn follow(&self, username: &str, target: &str) -> Result<Reply, TimelineError> {
        self.registry.follow(username, target).await?;
        Ok(Reply::success(format!("{username} now follows {target}")))
    }

    /// Make `username` stop following `target`.
    pub async fn unfollow(&self, username: &str, target: &str) -> Result<Reply, TimelineError> {
        self.registry.unfollow(username, target).await?;
        Ok(Reply::success(format!("{username} unfollowed {target}")))
    }

    /// Run one timeline stream to completion. See [`SessionManager::run`].
    pub async fn run_timeline<I, O, E>(&self, inbound: I, outbound: O) -> Result<(), TimelineError>
    where
        I: Stream<Item = Result<Message, E>> + Unpin,
        O: Sink<Message> + Send + Unpin + 'static,
        E: Display,
    {
        self.sessions.run(inbound, outbound).await
    }

    /// Bind a session without a transport, for embedding and tests.
    pub async fn open_session(&self, username: &str) -> Result<ActiveSession, TimelineError> {
        self.sessions.open(username).await
    }

    /// Post from an open session.
    pub async fn post(
        &self,
        session: &ActiveSession,
        message: &Message,
    ) -> Result<FanoutReport, TimelineError> {
        self.sessions.post(session, message).await
    }

    /// Close a session opened with [`open_session`](Self::open_session).
    pub async fn close_session(&self, session: ActiveSession) {
        self.sessions.close(session).await;
    }
}
