//! Storage port for externalized state.
//!
//! Request handlers keep no state in process memory; everything that must
//! outlive a request goes through a `StateStore` adapter.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;
use crate::types::BackendKind;

/// Key-value adapter over one persistence backend.
///
/// Values are opaque strings. Adapters report transport failures as
/// `Error::BackendUnavailable` and unparseable replies as
/// `Error::MalformedResponse` so callers can fall through to another tier.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Which backend this adapter talks to.
    fn kind(&self) -> BackendKind;

    /// Get a value by key.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Set a value with optional TTL.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()>;

    /// Delete a key. Returns whether the key existed.
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Check if a key exists.
    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }
}
