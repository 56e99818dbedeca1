//! Redis implementation of StateStore.

use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client};
use std::time::Duration;

use arkaios_core::{traits::StateStore, types::BackendKind, Error, Result};

/// Redis-protocol backend.
///
/// A multiplexed connection is opened per operation; nothing is pooled
/// across requests.
pub struct RedisStateStore {
    client: Client,
}

impl RedisStateStore {
    /// Create a new Redis state store. Does not connect yet.
    pub fn new(url: &str) -> Result<Self> {
        let client = Client::open(url).map_err(|e| {
            Error::backend_unavailable(BackendKind::Redis, format!("invalid Redis URL: {}", e))
        })?;
        Ok(Self { client })
    }

    async fn connection(&self) -> Result<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| {
                Error::backend_unavailable(BackendKind::Redis, format!("connection error: {}", e))
            })
    }
}

fn command_error(op: &str, e: redis::RedisError) -> Error {
    Error::backend_unavailable(BackendKind::Redis, format!("{} error: {}", op, e))
}

#[async_trait]
impl StateStore for RedisStateStore {
    fn kind(&self) -> BackendKind {
        BackendKind::Redis
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection().await?;
        let data: Option<String> = conn.get(key).await.map_err(|e| command_error("GET", e))?;
        Ok(data)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        let mut conn = self.connection().await?;
        match ttl {
            Some(ttl) => {
                let _: () = conn
                    .set_ex(key, value, ttl.as_secs().max(1))
                    .await
                    .map_err(|e| command_error("SET EX", e))?;
            }
            None => {
                let _: () = conn
                    .set(key, value)
                    .await
                    .map_err(|e| command_error("SET", e))?;
            }
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection().await?;
        let removed: i64 = conn.del(key).await.map_err(|e| command_error("DEL", e))?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url_is_recoverable() {
        let err = RedisStateStore::new("not a url").err().unwrap();
        assert!(err.is_recoverable());
    }

    #[tokio::test]
    async fn test_roundtrip_against_live_redis() {
        let url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
        let store = match RedisStateStore::new(&url) {
            Ok(store) => store,
            Err(_) => return,
        };
        if store.connection().await.is_err() {
            println!("Skipping Redis roundtrip: Redis not available at {}", url);
            return;
        }

        let key = format!("arkaios-test:{}", uuid::Uuid::new_v4());
        store.set(&key, "v1", Some(Duration::from_secs(30))).await.unwrap();
        assert_eq!(store.get(&key).await.unwrap().as_deref(), Some("v1"));
        assert!(store.delete(&key).await.unwrap());
        assert!(store.get(&key).await.unwrap().is_none());
    }
}
