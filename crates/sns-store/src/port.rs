//! The persistence port the fanout engine writes through.
//!
//! Implementations only provide raw append/read/clear for a named log;
//! backlog selection lives here so every backend replays the same way.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::record::Record;

/// Number of pending records replayed when a session opens.
pub const DEFAULT_REPLAY_LIMIT: usize = 20;

/// Suffix that turns an owner name into its pending-log name.
///
/// No owner may end with it, or that owner's authored-log would share a
/// file with another owner's pending-log.
pub const PENDING_SUFFIX: &str = "_following";

/// Which of a user's two logs an operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogKind {
    /// Posts the user authored.
    Authored,
    /// Posts queued for the user while offline.
    Pending,
}

impl LogKind {
    /// File name of this log for `owner`.
    pub fn file_name(self, owner: &str) -> String {
        match self {
            Self::Authored => format!("{owner}.txt"),
            Self::Pending => format!("{owner}{PENDING_SUFFIX}.txt"),
        }
    }
}

/// Append-only per-user log storage.
///
/// Appends to the same log must never interleave. Reads must tolerate
/// malformed lines by skipping them.
#[async_trait]
pub trait TimelineStore: Send + Sync {
    /// Append one record to `owner`'s log of the given kind.
    async fn append(&self, kind: LogKind, owner: &str, record: &Record) -> Result<(), StoreError>;

    /// Read every well-formed record of a log, oldest first. A log that
    /// was never written reads as empty.
    async fn read_all(&self, kind: LogKind, owner: &str) -> Result<Vec<Record>, StoreError>;

    /// Remove every log.
    async fn clear(&self) -> Result<(), StoreError>;

    /// Append to `owner`'s authored-log.
    async fn append_authored(&self, owner: &str, record: &Record) -> Result<(), StoreError> {
        self.append(LogKind::Authored, owner, record).await
    }

    /// Append to `owner`'s pending-log.
    async fn append_pending(&self, owner: &str, record: &Record) -> Result<(), StoreError> {
        self.append(LogKind::Pending, owner, record).await
    }

    /// The last `limit` pending records, oldest first. The log itself is
    /// left untouched.
    async fn recent_pending(&self, owner: &str, limit: usize) -> Result<Vec<Record>, StoreError> {
        let records = self.read_all(LogKind::Pending, owner).await?;
        Ok(most_recent(records, limit))
    }

    /// Everything `owner` has posted, for audit.
    async fn authored(&self, owner: &str) -> Result<Vec<Record>, StoreError> {
        self.read_all(LogKind::Authored, owner).await
    }
}

/// Keep the last `limit` records of a chronological sequence.
pub fn most_recent(records: Vec<Record>, limit: usize) -> Vec<Record> {
    let skip = records.len().saturating_sub(limit);
    records.into_iter().skip(skip).collect()
}

/// Reject owners that would escape the data directory or break file naming.
pub(crate) fn validate_owner(owner: &str) -> Result<(), StoreError> {
    let bad = owner.is_empty()
        || owner == "."
        || owner == ".."
        || owner.contains(['/', '\\', '\0'])
        || owner.ends_with(PENDING_SUFFIX);
    if bad {
        return Err(StoreError::InvalidOwner(owner.to_owned()));
    }
    Ok(())
}
