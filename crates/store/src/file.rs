//! Filesystem implementation of StateStore.
//!
//! One JSON file per key. Writes go to a uniquely named temporary file in
//! the same directory and are renamed into place, so readers never observe
//! a partially written file. TTLs are stored as an absolute deadline in the
//! file and checked on read.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use arkaios_core::{
    traits::StateStore,
    types::{now_millis, BackendKind},
    Error, Result,
};

/// On-disk layout of one entry.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileEntry {
    value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<i64>,
}

impl FileEntry {
    fn is_expired(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Local-file backend.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    dir: PathBuf,
    prefix: String,
}

impl FileStateStore {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    /// Path of the file backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!("{}{}.json", self.prefix, sanitize_key(key)))
    }

    /// Whether `dir` exists (or can be created) and accepts writes.
    pub async fn is_writable(dir: &Path) -> bool {
        if tokio::fs::create_dir_all(dir).await.is_err() {
            return false;
        }
        let probe = dir.join(format!(".arkaios-probe-{}", uuid::Uuid::new_v4()));
        match tokio::fs::write(&probe, b"").await {
            Ok(()) => {
                let _ = tokio::fs::remove_file(&probe).await;
                true
            }
            Err(_) => false,
        }
    }

    async fn read_entry(&self, path: &Path) -> Result<Option<FileEntry>> {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::backend_unavailable(
                    BackendKind::Filesystem,
                    format!("read {}: {}", path.display(), e),
                ))
            }
        };
        let entry = serde_json::from_str(&raw).map_err(|e| {
            Error::malformed(BackendKind::Filesystem, format!("{}: {}", path.display(), e))
        })?;
        Ok(Some(entry))
    }
}

/// Map a key onto a safe file name fragment.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Absolute expiry for `ttl` from `now`. `None` when it does not fit in an
/// `i64`, which leaves the entry without expiry.
fn deadline_millis(now: i64, ttl: Duration) -> Option<i64> {
    i64::try_from(ttl.as_millis())
        .ok()
        .and_then(|ms| now.checked_add(ms))
}

fn io_error(path: &Path, op: &str, e: std::io::Error) -> Error {
    Error::backend_unavailable(
        BackendKind::Filesystem,
        format!("{} {}: {}", op, path.display(), e),
    )
}

#[async_trait]
impl StateStore for FileStateStore {
    fn kind(&self) -> BackendKind {
        BackendKind::Filesystem
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match self.read_entry(&path).await? {
            Some(entry) if entry.is_expired(now_millis()) => {
                tracing::debug!(key = key, "Filesystem entry expired, removing");
                let _ = tokio::fs::remove_file(&path).await;
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_error(&self.dir, "create", e))?;

        let entry = FileEntry {
            value: value.to_string(),
            expires_at: ttl.and_then(|t| deadline_millis(now_millis(), t)),
        };
        let content = serde_json::to_vec(&entry)?;

        let path = self.path_for(key);
        let tmp = self.dir.join(format!(
            ".{}{}.{}.tmp",
            self.prefix,
            sanitize_key(key),
            uuid::Uuid::new_v4()
        ));

        if let Err(e) = tokio::fs::write(&tmp, &content).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(io_error(&tmp, "write", e));
        }
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(io_error(&path, "rename", e));
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error(&path, "remove", e)),
        }
    }
}
