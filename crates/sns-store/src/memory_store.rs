//! In-memory logs.
//!
//! Lines go through the same [`Record`] codec as the file store, so
//! sanitizing and malformed-line handling behave identically.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::port::{LogKind, TimelineStore, validate_owner};
use crate::record::Record;

/// Logs held in a process-local map of encoded lines.
#[derive(Debug, Default)]
pub struct MemoryStore {
    logs: Mutex<HashMap<(LogKind, String), Vec<String>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw line, bypassing the encoder.
    pub async fn push_line(&self, kind: LogKind, owner: &str, line: impl Into<String>) {
        let mut logs = self.logs.lock().await;
        logs.entry((kind, owner.to_owned()))
            .or_default()
            .push(line.into());
    }

    /// Raw lines of one log, oldest first.
    pub async fn lines(&self, kind: LogKind, owner: &str) -> Vec<String> {
        let logs = self.logs.lock().await;
        logs.get(&(kind, owner.to_owned()))
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl TimelineStore for MemoryStore {
    async fn append(&self, kind: LogKind, owner: &str, record: &Record) -> Result<(), StoreError> {
        validate_owner(owner)?;
        self.push_line(kind, owner, record.encode()).await;
        Ok(())
    }

    async fn read_all(&self, kind: LogKind, owner: &str) -> Result<Vec<Record>, StoreError> {
        validate_owner(owner)?;
        let logs = self.logs.lock().await;
        Ok(logs
            .get(&(kind, owner.to_owned()))
            .map(|lines| lines.iter().filter_map(|l| Record::decode(l)).collect())
            .unwrap_or_default())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.logs.lock().await.clear();
        Ok(())
    }
}
