//! Timeline session state machine.
//!
//! A connection starts `Idle`. Its first frame names the user; if that
//! user exists and is not already online, the connection becomes `Active`:
//! a [`SessionHandle`] is bound into the user's slot and the pending
//! backlog is queued ahead of any live push. Every later frame is a post.
//! When the inbound stream ends or fails the session is `Closed` and the
//! slot is cleared.
//!
//! Each active session runs as two tasks. The caller's task reads inbound
//! frames and runs fanout; a spawned forwarder drains the session's
//! outbound queue into the transport sink. Nothing else writes to the sink.

use std::fmt::Display;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use futures::{Sink, SinkExt, Stream, StreamExt};
use sns_store::TimelineStore;
use sns_types::{Message, Post, SessionId};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::TimelineConfig;
use crate::error::TimelineError;
use crate::fanout::{FanoutEngine, FanoutReport};
use crate::registry::ClientRegistry;
use crate::user::{SessionHandle, UserRecord};

/// A bound session: the user it belongs to and the receiving end of its
/// outbound queue.
#[derive(Debug)]
pub struct ActiveSession {
    id: SessionId,
    user: Arc<UserRecord>,
    outbound: mpsc::Receiver<Message>,
}

impl ActiveSession {
    /// This session's id.
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// The bound user's name.
    pub fn username(&self) -> &str {
        self.user.username()
    }

    /// Wait for the next frame queued for the client.
    pub async fn recv(&mut self) -> Option<Message> {
        self.outbound.recv().await
    }

    /// Take a queued frame if one is ready.
    pub fn try_recv(&mut self) -> Option<Message> {
        self.outbound.try_recv().ok()
    }
}

/// Binds, drives, and unbinds timeline sessions.
pub struct SessionManager {
    registry: Arc<ClientRegistry>,
    store: Arc<dyn TimelineStore>,
    fanout: FanoutEngine,
    replay_limit: usize,
    queue_capacity: usize,
    clear_pending: AtomicBool,
}

impl SessionManager {
    /// Create a manager. With `clear_on_start`, every log is deleted once,
    /// when the first timeline stream is run.
    pub fn new(
        registry: Arc<ClientRegistry>,
        store: Arc<dyn TimelineStore>,
        config: &TimelineConfig,
        clear_on_start: bool,
    ) -> Self {
        // The backlog is queued before the forwarder starts, so it must fit.
        let queue_capacity = config
            .outbound_capacity
            .max(config.replay_limit)
            .max(1);
        Self {
            fanout: FanoutEngine::new(Arc::clone(&registry), Arc::clone(&store)),
            registry,
            store,
            replay_limit: config.replay_limit,
            queue_capacity,
            clear_pending: AtomicBool::new(clear_on_start),
        }
    }

    /// Bind a session for `username` and queue its backlog.
    ///
    /// The user's slot stays locked from the online check through the
    /// backlog read, so no live post can be queued ahead of the backlog
    /// and no post can fall between the pending-log and the live queue.
    pub async fn open(&self, username: &str) -> Result<ActiveSession, TimelineError> {
        let user = self.registry.lookup(username).await?;
        let id = SessionId::new();
        let (tx, rx) = mpsc::channel(self.queue_capacity);

        let mut slot = user.session_slot().lock().await;
        if slot.is_some() {
            return Err(TimelineError::AlreadyConnected {
                username: username.to_owned(),
            });
        }

        let backlog = self.store.recent_pending(username, self.replay_limit).await?;
        let replayed = backlog.len();
        for record in backlog {
            if tx.try_send(record.to_message()).is_err() {
                warn!(username, "Backlog exceeded session queue");
                break;
            }
        }
        *slot = Some(SessionHandle::new(id, tx));
        drop(slot);

        info!(username, session_id = %id, replayed, "Timeline session opened");
        Ok(ActiveSession {
            id,
            user,
            outbound: rx,
        })
    }

    /// Fan out one inbound post frame from an active session.
    pub async fn post(
        &self,
        session: &ActiveSession,
        message: &Message,
    ) -> Result<FanoutReport, TimelineError> {
        self.publish(&session.user, message).await
    }

    /// Close a session opened with [`open`](Self::open).
    pub async fn close(&self, session: ActiveSession) {
        unbind(&session.user, session.id).await;
    }

    /// Drive one timeline stream from `Idle` to `Closed`.
    ///
    /// `inbound` yields the client's frames; `outbound` receives backlog
    /// and live pushes. Returns once the inbound stream ends. Fails before
    /// binding if the stream ends without a first frame, the user is
    /// unknown, or the user is already online. An `Err` item from
    /// `inbound` closes the session and is returned as
    /// [`TimelineError::Invalid`]; transports should end the stream
    /// instead for a plain disconnect.
    pub async fn run<I, O, E>(&self, mut inbound: I, outbound: O) -> Result<(), TimelineError>
    where
        I: Stream<Item = Result<Message, E>> + Unpin,
        O: Sink<Message> + Send + Unpin + 'static,
        E: Display,
    {
        self.clear_history_once().await;

        let first = match inbound.next().await {
            Some(Ok(message)) => message,
            Some(Err(e)) => return Err(TimelineError::Invalid(e.to_string())),
            None => return Err(TimelineError::Disconnected),
        };

        let ActiveSession {
            id,
            user,
            outbound: mut queue,
        } = self.open(&first.username).await?;

        let forwarder = tokio::spawn(async move {
            let mut sink = outbound;
            while let Some(message) = queue.recv().await {
                if sink.send(message).await.is_err() {
                    break;
                }
            }
        });

        let mut outcome = Ok(());
        loop {
            match inbound.next().await {
                Some(Ok(message)) => {
                    match self.publish(&user, &message).await {
                        Ok(report) => debug!(
                            username = user.username(),
                            delivered = report.delivered,
                            queued = report.queued,
                            dropped = report.dropped,
                            "Post fanned out"
                        ),
                        Err(e) => warn!(username = user.username(), error = %e, "Post failed"),
                    }
                }
                Some(Err(e)) => {
                    debug!(username = user.username(), error = %e, "Bad inbound frame");
                    outcome = Err(TimelineError::Invalid(e.to_string()));
                    break;
                }
                None => break,
            }
        }

        unbind(&user, id).await;
        // Unbinding dropped the last sender; the forwarder drains and exits.
        if let Err(e) = forwarder.await {
            debug!(error = %e, "Outbound forwarder ended abnormally");
        }
        outcome
    }

    async fn publish(
        &self,
        user: &UserRecord,
        message: &Message,
    ) -> Result<FanoutReport, TimelineError> {
        let post = Post::from_message(user.username(), message, Utc::now());
        self.fanout.publish(user, &post).await
    }

    async fn clear_history_once(&self) {
        if !self.clear_pending.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "Failed to clear previous timeline history");
        }
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("replay_limit", &self.replay_limit)
            .field("queue_capacity", &self.queue_capacity)
            .finish_non_exhaustive()
    }
}

/// Clear `user`'s slot if it still holds session `id`.
async fn unbind(user: &UserRecord, id: SessionId) {
    let mut slot = user.session_slot().lock().await;
    if slot.as_ref().is_some_and(|handle| handle.id() == id) {
        *slot = None;
        drop(slot);
        info!(username = user.username(), session_id = %id, "Timeline session closed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use sns_store::{MemoryStore, Record};

    use super::*;

    async fn setup(names: &[&str]) -> (SessionManager, Arc<MemoryStore>) {
        let registry = Arc::new(ClientRegistry::new());
        for name in names {
            registry.authenticate(name).await.unwrap();
        }
        let store = Arc::new(MemoryStore::new());
        let manager = SessionManager::new(registry, store.clone(), &TimelineConfig::default(), false);
        (manager, store)
    }

    #[tokio::test]
    async fn open_unknown_user_is_not_found() {
        let (manager, _) = setup(&[]).await;
        let err = manager.open("ghost").await.unwrap_err();
        assert!(matches!(err, TimelineError::NotFound { .. }));
    }

    #[tokio::test]
    async fn second_open_is_rejected_until_close() {
        let (manager, _) = setup(&["alice"]).await;
        let first = manager.open("alice").await.unwrap();

        let err = manager.open("alice").await.unwrap_err();
        assert!(matches!(err, TimelineError::AlreadyConnected { .. }));

        manager.close(first).await;
        let again = manager.open("alice").await.unwrap();
        assert_eq!(again.username(), "alice");
    }

    #[tokio::test]
    async fn stale_unbind_leaves_new_session_alone() {
        let (manager, _) = setup(&["alice"]).await;
        let first = manager.open("alice").await.unwrap();
        let (user, old_id) = (Arc::clone(&first.user), first.id());
        manager.close(first).await;

        let second = manager.open("alice").await.unwrap();
        unbind(&user, old_id).await;
        assert_eq!(user.session_id().await, Some(second.id()));
    }

    #[tokio::test]
    async fn open_queues_backlog_before_live_posts() {
        let (manager, store) = setup(&["alice", "bob"]).await;
        manager.registry.follow("bob", "alice").await.unwrap();

        let ts = chrono::DateTime::from_timestamp(1_726_376_143, 0).unwrap();
        let record = Record {
            username: "alice".to_owned(),
            message: "while you were out".to_owned(),
            timestamp: ts,
        };
        store.append_pending("bob", &record).await.unwrap();

        let alice = manager.open("alice").await.unwrap();
        let mut bob = manager.open("bob").await.unwrap();
        manager
            .post(&alice, &Message::post("alice", "live"))
            .await
            .unwrap();

        assert_eq!(bob.recv().await.unwrap().msg, "while you were out");
        assert_eq!(bob.recv().await.unwrap().msg, "live");
        assert!(bob.try_recv().is_none());
    }

    #[tokio::test]
    async fn run_without_first_frame_is_disconnected() {
        let (manager, _) = setup(&["alice"]).await;
        let inbound = futures::stream::empty::<Result<Message, std::io::Error>>();
        let err = manager
            .run(inbound, futures::sink::drain::<Message>())
            .await
            .unwrap_err();
        assert!(matches!(err, TimelineError::Disconnected));
    }

    #[tokio::test]
    async fn bad_frame_closes_session_as_invalid() {
        let (manager, _) = setup(&["alice"]).await;
        let inbound = futures::stream::iter(vec![
            Ok(Message::identify("alice")),
            Err("expected a JSON message"),
        ]);
        let err = manager
            .run(inbound, futures::sink::drain::<Message>())
            .await
            .unwrap_err();
        assert!(matches!(err, TimelineError::Invalid(_)));

        let user = manager.registry.lookup("alice").await.unwrap();
        assert!(!user.is_connected().await);
    }
}
