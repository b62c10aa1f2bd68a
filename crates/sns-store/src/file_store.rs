//! File-backed logs, one file per log in a single data directory.
//!
//! Appends and reads of the same file are serialized through a per-path
//! async mutex so records never interleave and a reader never sees a
//! half-written line. Different files proceed in parallel.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::port::{LogKind, TimelineStore, validate_owner};
use crate::record::Record;

/// Logs stored as `<owner>.txt` and `<owner>_following.txt` under `root`.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl FileStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| StoreError::io(&root, e))?;
        tracing::debug!(root = %root.display(), "File store opened");
        Ok(Self {
            root,
            locks: Mutex::new(HashMap::new()),
        })
    }

    /// The data directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of `owner`'s log of the given kind.
    pub fn log_path(&self, kind: LogKind, owner: &str) -> Result<PathBuf, StoreError> {
        validate_owner(owner)?;
        Ok(self.root.join(kind.file_name(owner)))
    }

    async fn file_lock(&self, path: &Path) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        Arc::clone(locks.entry(path.to_path_buf()).or_default())
    }
}

#[async_trait]
impl TimelineStore for FileStore {
    async fn append(&self, kind: LogKind, owner: &str, record: &Record) -> Result<(), StoreError> {
        let path = self.log_path(kind, owner)?;
        let lock = self.file_lock(&path).await;
        let _guard = lock.lock().await;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| StoreError::io(&path, e))?;
        let mut line = record.encode();
        line.push('\n');
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| StoreError::io(&path, e))?;
        file.flush().await.map_err(|e| StoreError::io(&path, e))?;
        Ok(())
    }

    async fn read_all(&self, kind: LogKind, owner: &str) -> Result<Vec<Record>, StoreError> {
        let path = self.log_path(kind, owner)?;
        let lock = self.file_lock(&path).await;
        let _guard = lock.lock().await;

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&path, e)),
        };
        let contents = String::from_utf8_lossy(&bytes);

        let mut records = Vec::new();
        for line in contents.lines() {
            match Record::decode(line) {
                Some(record) => records.push(record),
                None => tracing::trace!(path = %path.display(), line, "Discarding malformed record"),
            }
        }
        Ok(records)
    }

    async fn clear(&self) -> Result<(), StoreError> {
        // Holding the map blocks new appends from acquiring a file lock.
        let locks = self.locks.lock().await;

        let mut entries = tokio::fs::read_dir(&self.root)
            .await
            .map_err(|e| StoreError::io(&self.root, e))?;
        let mut removed: usize = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::io(&self.root, e))?
        {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "txt") {
                continue;
            }
            let is_file = entry
                .file_type()
                .await
                .map_err(|e| StoreError::io(&path, e))?
                .is_file();
            if !is_file {
                continue;
            }
            let _file_guard = match locks.get(&path) {
                Some(lock) => Some(lock.lock().await),
                None => None,
            };
            tokio::fs::remove_file(&path)
                .await
                .map_err(|e| StoreError::io(&path, e))?;
            removed = removed.saturating_add(1);
        }

        tracing::info!(root = %self.root.display(), removed, "Cleared timeline logs");
        Ok(())
    }
}
