//! Client registry keyed by username.
//!
//! Names are registered once and never removed. Lookups go through a
//! hash map; a parallel vector keeps registration order for listing.

use std::collections::HashMap;
use std::sync::Arc;

use sns_store::PENDING_SUFFIX;
use tokio::sync::RwLock;
use tracing::info;

use crate::error::TimelineError;
use crate::user::UserRecord;

#[derive(Debug, Default)]
struct RegistryInner {
    users: HashMap<String, Arc<UserRecord>>,
    order: Vec<String>,
}

/// Directory of every user the service has seen.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    inner: RwLock<RegistryInner>,
}

impl ClientRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new user.
    ///
    /// Fails with [`TimelineError::AlreadyLoggedIn`] if the name is
    /// already registered, whether or not that user is online.
    pub async fn authenticate(&self, username: &str) -> Result<Arc<UserRecord>, TimelineError> {
        validate_username(username)?;

        let mut inner = self.inner.write().await;
        if inner.users.contains_key(username) {
            return Err(TimelineError::AlreadyLoggedIn {
                username: username.to_owned(),
            });
        }
        let user = Arc::new(UserRecord::new(username));
        inner.users.insert(username.to_owned(), Arc::clone(&user));
        inner.order.push(username.to_owned());
        drop(inner);

        info!(username, "User registered");
        Ok(user)
    }

    /// Resolve a username.
    pub async fn lookup(&self, username: &str) -> Result<Arc<UserRecord>, TimelineError> {
        self.inner
            .read()
            .await
            .users
            .get(username)
            .cloned()
            .ok_or_else(|| TimelineError::not_found(username))
    }

    /// Every registered name, in registration order.
    pub async fn usernames(&self) -> Vec<String> {
        self.inner.read().await.order.clone()
    }

    /// Number of registered users.
    pub async fn len(&self) -> usize {
        self.inner.read().await.order.len()
    }

    /// Whether no user has registered yet.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Names address log files and are written into comma-separated records,
/// so path separators, delimiters, and line breaks are refused. A name
/// ending in the pending-log suffix would share a file with another
/// user's backlog.
fn validate_username(username: &str) -> Result<(), TimelineError> {
    if username.trim().is_empty() {
        return Err(TimelineError::Invalid(String::from("username must not be empty")));
    }
    if username == "." || username == ".." {
        return Err(TimelineError::Invalid(format!("username {username:?} is reserved")));
    }
    if let Some(c) = username
        .chars()
        .find(|c| matches!(c, ',' | '/' | '\\' | '\r' | '\n' | '\0'))
    {
        return Err(TimelineError::Invalid(format!(
            "username must not contain {c:?}"
        )));
    }
    if username.ends_with(PENDING_SUFFIX) {
        return Err(TimelineError::Invalid(format!(
            "username must not end with {PENDING_SUFFIX:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn authenticate_creates_offline_user() {
        let registry = ClientRegistry::new();
        let user = registry.authenticate("alice").await.unwrap();
        assert_eq!(user.username(), "alice");
        assert!(!user.is_connected().await);
        assert!(user.edges().await.followers().is_empty());
    }

    #[tokio::test]
    async fn second_authenticate_is_rejected() {
        let registry = ClientRegistry::new();
        registry.authenticate("alice").await.unwrap();
        let err = registry.authenticate("alice").await.unwrap_err();
        assert!(matches!(err, TimelineError::AlreadyLoggedIn { ref username } if username == "alice"));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn lookup_unknown_user_fails() {
        let registry = ClientRegistry::new();
        let err = registry.lookup("ghost").await.unwrap_err();
        assert!(matches!(err, TimelineError::NotFound { ref username } if username == "ghost"));
    }

    #[tokio::test]
    async fn lookup_returns_the_same_record() {
        let registry = ClientRegistry::new();
        let created = registry.authenticate("alice").await.unwrap();
        let found = registry.lookup("alice").await.unwrap();
        assert!(Arc::ptr_eq(&created, &found));
    }

    #[tokio::test]
    async fn usernames_keep_registration_order() {
        let registry = ClientRegistry::new();
        for name in ["zed", "amy", "mo"] {
            registry.authenticate(name).await.unwrap();
        }
        assert_eq!(registry.usernames().await, vec!["zed", "amy", "mo"]);
    }

    #[tokio::test]
    async fn malformed_names_are_invalid() {
        let registry = ClientRegistry::new();
        for name in ["", "   ", "..", "a,b", "a/b", "a\nb", "bob_following"] {
            let err = registry.authenticate(name).await.unwrap_err();
            assert!(matches!(err, TimelineError::Invalid(_)), "accepted {name:?}");
        }
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn concurrent_logins_of_one_name_admit_exactly_one() {
        let registry = Arc::new(ClientRegistry::new());
        let mut handles = Vec::new();
        for _ in 0..16 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move {
                registry.authenticate("alice").await.is_ok()
            }));
        }
        let mut admitted = 0_usize;
        for handle in handles {
            if handle.await.unwrap() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 1);
    }
}
