//! Post distribution to followers.
//!
//! A post is first written to its author's authored-log. Each follower
//! then gets it either pushed onto their live session or appended to their
//! pending-log, decided while holding that follower's session slot so a
//! session opening concurrently either sees the pending record in its
//! backlog or receives the live push, never neither.

use std::sync::Arc;

use sns_store::{Record, TimelineStore};
use sns_types::Post;
use tracing::{debug, warn};

use crate::error::TimelineError;
use crate::registry::ClientRegistry;
use crate::user::UserRecord;

/// Outcome counts for one post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanoutReport {
    /// Followers that received a live push.
    pub delivered: usize,
    /// Offline followers whose pending-log got the post.
    pub queued: usize,
    /// Followers that got nothing: full or closed queue, or a failed append.
    pub dropped: usize,
}

/// Distributes posts from one author to that author's followers.
#[derive(Clone)]
pub struct FanoutEngine {
    registry: Arc<ClientRegistry>,
    store: Arc<dyn TimelineStore>,
}

impl FanoutEngine {
    /// Create an engine over a registry and a log store.
    pub fn new(registry: Arc<ClientRegistry>, store: Arc<dyn TimelineStore>) -> Self {
        Self { registry, store }
    }

    /// Record `post` for `author` and hand it to every follower.
    ///
    /// Only the authored-log append can fail the call. Per-follower
    /// failures are counted in the report and never stop the loop.
    pub async fn publish(
        &self,
        author: &UserRecord,
        post: &Post,
    ) -> Result<FanoutReport, TimelineError> {
        let record = Record::from_post(post);
        self.store
            .append_authored(author.username(), &record)
            .await?;

        let frame = post.to_message();
        let mut report = FanoutReport::default();

        for name in author.followers().await {
            let Ok(follower) = self.registry.lookup(&name).await else {
                report.dropped = report.dropped.saturating_add(1);
                continue;
            };

            let slot = follower.session_slot().lock().await;
            if let Some(handle) = slot.as_ref() {
                match handle.push(frame.clone()) {
                    Ok(()) => report.delivered = report.delivered.saturating_add(1),
                    Err(e) => {
                        debug!(follower = %name, error = %e, "Live delivery dropped");
                        report.dropped = report.dropped.saturating_add(1);
                    }
                }
                continue;
            }

            match self.store.append_pending(&name, &record).await {
                Ok(()) => report.queued = report.queued.saturating_add(1),
                Err(e) => {
                    warn!(follower = %name, error = %e, "Failed to queue post for offline follower");
                    report.dropped = report.dropped.saturating_add(1);
                }
            }
        }

        debug!(
            author = author.username(),
            delivered = report.delivered,
            queued = report.queued,
            dropped = report.dropped,
            "Post fanned out"
        );
        Ok(report)
    }
}

impl std::fmt::Debug for FanoutEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanoutEngine").finish_non_exhaustive()
    }
}
