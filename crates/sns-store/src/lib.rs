//! Persistence log for the SNS timeline service.
//!
//! Every user owns two append-only logs:
//!
//! ```text
//! <user>.txt            authored-log: posts the user sent
//! <user>_following.txt  pending-log:  posts queued while the user was offline
//! ```
//!
//! The fanout engine only talks to the [`TimelineStore`] port, so the
//! file-backed [`FileStore`] and the in-process [`MemoryStore`] are
//! interchangeable.
//!
//! # Modules
//!
//! - [`record`] -- `username,message,timestamp` line codec
//! - [`port`] -- The [`TimelineStore`] trait and backlog selection
//! - [`file_store`] -- One file per log in a data directory
//! - [`memory_store`] -- In-memory logs for tests and embedding
//! - [`error`] -- Shared error types

pub mod error;
pub mod file_store;
pub mod memory_store;
pub mod port;
pub mod record;

// Re-export primary types for convenience.
pub use error::StoreError;
pub use file_store::FileStore;
pub use memory_store::MemoryStore;
pub use port::{DEFAULT_REPLAY_LIMIT, LogKind, PENDING_SUFFIX, TimelineStore, most_recent};
pub use record::Record;
