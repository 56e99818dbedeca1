//! Backend selection from ambient configuration.
//!
//! Availability is derived per request and never cached: configuration and
//! filesystem writability may differ between invocations.

use serde::Serialize;
use std::sync::Arc;

use arkaios_core::{
    config::StoreConfig, traits::StateStore, types::BackendKind, Error, Result,
};

use crate::{FileStateStore, RedisStateStore, RestKvStore, TieredStore};

/// Which backends the current configuration makes usable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendAvailability {
    pub has_rest_kv: bool,
    pub has_redis: bool,
    pub has_filesystem: bool,
}

impl BackendAvailability {
    /// Availability from configuration presence alone.
    pub fn from_config(config: &StoreConfig, filesystem_writable: bool) -> Self {
        Self {
            has_rest_kv: config.rest_kv_credentials().is_some(),
            has_redis: config.redis_connection().is_some(),
            has_filesystem: config.filesystem_enabled && filesystem_writable,
        }
    }

    /// Availability including a live writability check of the file directory.
    pub async fn detect(config: &StoreConfig) -> Self {
        let writable =
            config.filesystem_enabled && FileStateStore::is_writable(&config.file_dir).await;
        Self::from_config(config, writable)
    }
}

/// Ordered tiers chosen for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendPlan {
    /// Shared remote backend; REST-KV wins over Redis.
    pub remote: Option<BackendKind>,
    /// Local file backstop.
    pub filesystem: bool,
}

impl BackendPlan {
    /// Tiers in priority order: the remote first, the filesystem last.
    ///
    /// Reads stop at the first tier holding a parseable value; writes go to
    /// every tier in this order.
    pub fn tiers(&self) -> Vec<BackendKind> {
        self.remote
            .into_iter()
            .chain(self.filesystem.then_some(BackendKind::Filesystem))
            .collect()
    }

    /// The highest-priority tier, if any.
    pub fn primary(&self) -> Option<BackendKind> {
        self.tiers().first().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.remote.is_none() && !self.filesystem
    }
}

/// Pure mapping from availability to the tiers to use.
pub fn select_backends(availability: &BackendAvailability) -> BackendPlan {
    let remote = if availability.has_rest_kv {
        Some(BackendKind::RestKv)
    } else if availability.has_redis {
        Some(BackendKind::Redis)
    } else {
        None
    };
    BackendPlan {
        remote,
        filesystem: availability.has_filesystem,
    }
}

/// Builds adapters for backend kinds.
pub trait BackendFactory: Send + Sync {
    fn create(&self, kind: BackendKind) -> Result<Arc<dyn StateStore>>;
}

/// Factory building real adapters from the store configuration.
#[derive(Clone)]
pub struct ConfiguredBackends {
    config: StoreConfig,
    http: reqwest::Client,
}

impl ConfiguredBackends {
    pub fn new(config: StoreConfig) -> Self {
        Self::with_http_client(config, reqwest::Client::new())
    }

    pub fn with_http_client(config: StoreConfig, http: reqwest::Client) -> Self {
        Self { config, http }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Detect, select and assemble the tiered store for one request.
    pub async fn resolve(&self) -> (BackendAvailability, BackendPlan, TieredStore) {
        let availability = BackendAvailability::detect(&self.config).await;
        let plan = select_backends(&availability);
        tracing::debug!(?availability, tiers = ?plan.tiers(), "Resolved storage backends");
        let store = TieredStore::from_plan(&plan, self);
        (availability, plan, store)
    }
}

impl BackendFactory for ConfiguredBackends {
    fn create(&self, kind: BackendKind) -> Result<Arc<dyn StateStore>> {
        match kind {
            BackendKind::RestKv => {
                let (url, token) = self.config.rest_kv_credentials().ok_or_else(|| {
                    Error::backend_unavailable(kind, "KV_REST_API_URL or KV_REST_API_TOKEN missing")
                })?;
                Ok(Arc::new(RestKvStore::new(
                    self.http.clone(),
                    url,
                    token.clone(),
                )?))
            }
            BackendKind::Redis => {
                let url = self
                    .config
                    .redis_connection()
                    .ok_or_else(|| Error::backend_unavailable(kind, "REDIS_URL missing"))?;
                Ok(Arc::new(RedisStateStore::new(url)?))
            }
            BackendKind::Filesystem => Ok(Arc::new(FileStateStore::new(
                self.config.file_dir.clone(),
                self.config.file_prefix.clone(),
            ))),
        }
    }
}
