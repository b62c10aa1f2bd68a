//! Follow graph operations on the registry.
//!
//! Each edge lives in two places: the follower's `following` set and the
//! target's `followers` set. Both sets are changed while holding both
//! users' edge locks, taken in username order so two opposite follows
//! can never deadlock.

use std::sync::Arc;

use sns_types::ListReply;
use tokio::sync::MutexGuard;
use tracing::info;

use crate::error::TimelineError;
use crate::registry::ClientRegistry;
use crate::user::{Edges, UserRecord};

impl ClientRegistry {
    /// Make `follower` follow `target`.
    pub async fn follow(&self, follower: &str, target: &str) -> Result<(), TimelineError> {
        let (source, dest) = self.resolve_pair(follower, target).await?;
        let (mut source_edges, mut dest_edges) = lock_pair(&source, &dest).await;

        if source_edges.is_following(target) {
            return Err(TimelineError::AlreadyFollowing {
                follower: follower.to_owned(),
                target: target.to_owned(),
            });
        }
        source_edges.add_following(target);
        dest_edges.add_follower(follower);
        drop((source_edges, dest_edges));

        info!(follower, target, "Follow edge added");
        Ok(())
    }

    /// Make `follower` stop following `target`.
    pub async fn unfollow(&self, follower: &str, target: &str) -> Result<(), TimelineError> {
        let (source, dest) = self.resolve_pair(follower, target).await?;
        let (mut source_edges, mut dest_edges) = lock_pair(&source, &dest).await;

        if !source_edges.is_following(target) {
            return Err(TimelineError::NotFollowing {
                follower: follower.to_owned(),
                target: target.to_owned(),
            });
        }
        source_edges.remove_following(target);
        dest_edges.remove_follower(follower);
        drop((source_edges, dest_edges));

        info!(follower, target, "Follow edge removed");
        Ok(())
    }

    /// Every registered name plus `username`'s followers.
    pub async fn list_graph(&self, username: &str) -> Result<ListReply, TimelineError> {
        let user = self.lookup(username).await?;
        let followers = user.followers().await;
        Ok(ListReply {
            all_users: self.usernames().await,
            followers,
        })
    }

    /// Users `username` follows, in the order they were followed.
    pub async fn following(&self, username: &str) -> Result<Vec<String>, TimelineError> {
        let user = self.lookup(username).await?;
        Ok(user.edges().await.following().to_vec())
    }

    async fn resolve_pair(
        &self,
        follower: &str,
        target: &str,
    ) -> Result<(Arc<UserRecord>, Arc<UserRecord>), TimelineError> {
        let source = self.lookup(follower).await?;
        let dest = self.lookup(target).await?;
        if follower == target {
            return Err(TimelineError::SelfFollow {
                username: follower.to_owned(),
            });
        }
        Ok((source, dest))
    }
}

/// Lock two distinct users' edges in username order, returning the guards
/// in argument order.
async fn lock_pair<'a>(
    first: &'a UserRecord,
    second: &'a UserRecord,
) -> (MutexGuard<'a, Edges>, MutexGuard<'a, Edges>) {
    if first.username() < second.username() {
        let a = first.edges_lock().lock().await;
        let b = second.edges_lock().lock().await;
        (a, b)
    } else {
        let b = second.edges_lock().lock().await;
        let a = first.edges_lock().lock().await;
        (a, b)
    }
}
