//! In-memory state store implementation using DashMap.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use arkaios_core::{traits::StateStore, types::BackendKind, Error, Result};

/// Stored value with its optional deadline.
#[derive(Debug, Clone)]
struct StoredValue {
    value: String,
    expires_at: Option<Instant>,
}

impl StoredValue {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

/// In-memory state store using DashMap for concurrent access.
///
/// It can stand in for any backend kind, which lets tests assemble a
/// tiered store and observe exactly which tier a write landed in. Taking it
/// offline makes every call fail with `Error::BackendUnavailable`.
#[derive(Debug)]
pub struct InMemoryStateStore {
    kind: BackendKind,
    data: DashMap<String, StoredValue>,
    online: AtomicBool,
}

impl InMemoryStateStore {
    /// Create a new in-memory store posing as `kind`.
    pub fn new(kind: BackendKind) -> Self {
        Self {
            kind,
            data: DashMap::new(),
            online: AtomicBool::new(true),
        }
    }

    /// Simulate an outage (or recovery).
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Raw stored value, ignoring expiry and availability.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.data.get(key).map(|r| r.value.clone())
    }

    /// Keys currently held, ignoring expiry.
    pub fn keys(&self) -> Vec<String> {
        self.data.iter().map(|r| r.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn ensure_online(&self) -> Result<()> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Error::backend_unavailable(self.kind, "offline"))
        }
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.ensure_online()?;
        let expired = match self.data.get(key) {
            Some(entry) if !entry.is_expired() => return Ok(Some(entry.value.clone())),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.data.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        self.ensure_online()?;
        tracing::trace!(key = key, backend = %self.kind, "Storing value in memory");
        self.data.insert(
            key.to_string(),
            StoredValue {
                value: value.to_string(),
                expires_at: ttl.and_then(|t| Instant::now().checked_add(t)),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        self.ensure_online()?;
        Ok(self
            .data
            .remove(key)
            .is_some_and(|(_, stored)| !stored.is_expired()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let store = InMemoryStateStore::new(BackendKind::Redis);
        store.set("k", "v", None).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
        assert!(store.exists("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_reports_existence() {
        let store = InMemoryStateStore::new(BackendKind::Redis);
        store.set("k", "v", None).await.unwrap();
        assert!(store.delete("k").await.unwrap());
        assert!(!store.delete("k").await.unwrap());
        assert!(store.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ttl_expiry() {
        let store = InMemoryStateStore::new(BackendKind::RestKv);
        store
            .set("k", "v", Some(Duration::from_millis(10)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(store.get("k").await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_unrepresentable_ttl_keeps_value() {
        let store = InMemoryStateStore::new(BackendKind::Redis);
        store
            .set("k", "v", Some(Duration::from_secs(u64::MAX)))
            .await
            .unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_offline_fails() {
        let store = InMemoryStateStore::new(BackendKind::RestKv);
        store.set_online(false);
        let err = store.get("k").await.unwrap_err();
        assert!(err.is_recoverable());
        store.set_online(true);
        assert!(store.get("k").await.unwrap().is_none());
    }
}
