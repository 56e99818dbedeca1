//! Per-user API key vault.
//!
//! User ids are never persisted; every storage key is derived from the
//! SHA-256 of the id.

use sha2::{Digest, Sha256};

use arkaios_core::{
    types::{now_millis, UserApiKeyRecord, USER_API_KEY_PREFIX},
    Error, Result,
};
use arkaios_store::TieredStore;

/// Longest accepted key lifetime: ten years.
pub const MAX_TTL_SECONDS: u64 = 10 * 365 * 24 * 60 * 60;

/// Storage key for `user_id`: the namespace prefix plus a 64-char hex digest.
pub fn storage_key(user_id: &str) -> String {
    let digest = Sha256::digest(user_id.as_bytes());
    format!("{}{}", USER_API_KEY_PREFIX, hex::encode(digest))
}

fn require<'a>(value: &'a str, field: &str) -> Result<&'a str> {
    if value.trim().is_empty() {
        Err(Error::validation(format!("Missing {}", field)))
    } else {
        Ok(value)
    }
}

pub struct ApiKeyVault {
    store: TieredStore,
}

impl ApiKeyVault {
    pub fn new(store: TieredStore) -> Self {
        Self { store }
    }

    /// Store (or overwrite) the key for `user_id`.
    ///
    /// The TTL is handed to the backends' own expiry; the filesystem tier
    /// enforces it on read.
    pub async fn store(
        &self,
        user_id: &str,
        api_key: &str,
        ttl_seconds: Option<u64>,
    ) -> Result<UserApiKeyRecord> {
        let user_id = require(user_id, "userId")?;
        let api_key = require(api_key, "apiKey")?;
        if let Some(ttl) = ttl_seconds.filter(|t| *t > MAX_TTL_SECONDS) {
            return Err(Error::validation(format!(
                "ttlSeconds must not exceed {} (got {})",
                MAX_TTL_SECONDS, ttl
            )));
        }

        let record = UserApiKeyRecord {
            api_key: api_key.to_string(),
            ts: now_millis(),
        };
        let key = storage_key(user_id);
        self.store
            .set(&key, serde_json::to_value(&record)?, ttl_seconds)
            .await?;
        tracing::info!(key = %key, ttl_seconds = ?ttl_seconds, "Stored user API key");
        Ok(record)
    }

    pub async fn fetch(&self, user_id: &str) -> Result<Option<UserApiKeyRecord>> {
        let key = storage_key(require(user_id, "userId")?);
        let Some(record) = self.store.get(&key).await else {
            return Ok(None);
        };
        match serde_json::from_value::<UserApiKeyRecord>(record.value) {
            Ok(found) => Ok(Some(found)),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Stored API key record is malformed");
                Ok(None)
            }
        }
    }

    /// Delete the key for `user_id`. Returns whether one was stored.
    pub async fn remove(&self, user_id: &str) -> Result<bool> {
        let key = storage_key(require(user_id, "userId")?);
        let removed = self.store.delete(&key).await?;
        tracing::info!(key = %key, removed, "Removed user API key");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arkaios_core::types::BackendKind;
    use arkaios_store::InMemoryStateStore;
    use std::sync::Arc;

    fn vault() -> (Arc<InMemoryStateStore>, ApiKeyVault) {
        let remote = Arc::new(InMemoryStateStore::new(BackendKind::Redis));
        (remote.clone(), ApiKeyVault::new(TieredStore::new(vec![remote])))
    }

    #[test]
    fn test_storage_key_is_fixed_length_hex() {
        for user_id in ["u1", "alice@example.com", "", "ünïcødé"] {
            let key = storage_key(user_id);
            let digest = key.strip_prefix(USER_API_KEY_PREFIX).unwrap();
            assert_eq!(digest.len(), 64);
            assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
            if !user_id.is_empty() {
                assert!(!key.contains(user_id));
            }
        }
        assert_eq!(storage_key("u1"), storage_key("u1"));
        assert_ne!(storage_key("u1"), storage_key("u2"));
    }

    #[tokio::test]
    async fn test_store_fetch_remove() {
        let (remote, vault) = vault();
        vault.store("u1", "k1", None).await.unwrap();

        assert_eq!(vault.fetch("u1").await.unwrap().unwrap().api_key, "k1");
        assert!(vault.fetch("unknown").await.unwrap().is_none());
        assert!(remote.keys().iter().all(|k| !k.contains("u1")));

        assert!(vault.remove("u1").await.unwrap());
        assert!(!vault.remove("u1").await.unwrap());
        assert!(vault.fetch("u1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_validation() {
        let (_, vault) = vault();
        assert!(matches!(
            vault.store("", "k", None).await,
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            vault.store("u", "  ", None).await,
            Err(Error::Validation(_))
        ));
        assert!(matches!(vault.fetch("").await, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_oversized_ttl_rejected() {
        let (remote, vault) = vault();
        assert!(matches!(
            vault.store("u1", "k1", Some(9_223_372_036_854_775)).await,
            Err(Error::Validation(_))
        ));
        assert!(remote.is_empty());

        vault.store("u1", "k1", Some(MAX_TTL_SECONDS)).await.unwrap();
        assert_eq!(vault.fetch("u1").await.unwrap().unwrap().api_key, "k1");
    }

    #[tokio::test]
    async fn test_ttl_expires() {
        let (_, vault) = vault();
        vault.store("u1", "k1", Some(1)).await.unwrap();
        assert!(vault.fetch("u1").await.unwrap().is_some());
        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
        assert!(vault.fetch("u1").await.unwrap().is_none());
    }
}
