#![deny(unused)]
//! Tiered state storage for Arkaios.
//!
//! This crate provides the backend adapters (REST-KV, Redis, filesystem,
//! in-memory), the capability-driven backend selector, and a tiered store
//! that reads from the first healthy tier and writes to all of them.

pub mod file;
pub mod health;
pub mod memory;
pub mod redis;
pub mod rest_kv;
pub mod selector;

use std::sync::Arc;
use std::time::Duration;

use arkaios_core::{
    traits::StateStore,
    types::{BackendKind, StateRecord},
    Error, Result,
};

pub use file::FileStateStore;
pub use health::{probe, ProbeReport, PROBE_KEY};
pub use memory::InMemoryStateStore;
pub use redis::RedisStateStore;
pub use rest_kv::RestKvStore;
pub use selector::{
    select_backends, BackendAvailability, BackendFactory, BackendPlan, ConfiguredBackends,
};

/// Count a backend operation by outcome.
pub(crate) fn record_op(backend: BackendKind, op: &'static str, ok: bool) {
    metrics::counter!(
        "arkaios_backend_ops_total",
        "backend" => backend.as_str(),
        "op" => op,
        "outcome" => if ok { "ok" } else { "error" }
    )
    .increment(1);
}

/// Per-backend result of a tiered write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    pub outcomes: Vec<(BackendKind, bool)>,
}

impl WriteReport {
    /// Whether the write was accepted by `kind`.
    pub fn landed_in(&self, kind: BackendKind) -> bool {
        self.outcomes.iter().any(|(k, ok)| *k == kind && *ok)
    }

    /// Whether any tier accepted the write.
    pub fn any_ok(&self) -> bool {
        self.outcomes.iter().any(|(_, ok)| *ok)
    }
}

/// State store over an ordered list of backends.
///
/// Reads walk the tiers in order and return the first parseable record;
/// failures and misses fall through to the next tier. Writes go to every
/// tier sequentially, remote first and filesystem last, and succeed when
/// at least one tier accepted them. Concurrent writers race; the last
/// write wins.
#[derive(Clone, Default)]
pub struct TieredStore {
    tiers: Vec<Arc<dyn StateStore>>,
}

impl TieredStore {
    /// Create a tiered store from adapters already in priority order.
    pub fn new(tiers: Vec<Arc<dyn StateStore>>) -> Self {
        Self { tiers }
    }

    /// Build the adapters named by `plan`. Adapters that cannot be built
    /// are logged and left out.
    pub fn from_plan(plan: &BackendPlan, factory: &dyn BackendFactory) -> Self {
        let tiers = plan
            .tiers()
            .into_iter()
            .filter_map(|kind| match factory.create(kind) {
                Ok(store) => Some(store),
                Err(e) => {
                    tracing::warn!(backend = %kind, error = %e, "Skipping unusable backend");
                    None
                }
            })
            .collect();
        Self { tiers }
    }

    /// Backend kinds in priority order.
    pub fn kinds(&self) -> Vec<BackendKind> {
        self.tiers.iter().map(|t| t.kind()).collect()
    }

    /// Highest-priority adapter.
    pub fn primary(&self) -> Option<&Arc<dyn StateStore>> {
        self.tiers.first()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Read `key`. `None` when no tier holds a parseable record.
    pub async fn get(&self, key: &str) -> Option<StateRecord> {
        for tier in &self.tiers {
            let kind = tier.kind();
            match tier.get(key).await {
                Ok(Some(raw)) => match serde_json::from_str::<StateRecord>(&raw) {
                    Ok(record) => {
                        record_op(kind, "get", true);
                        tracing::debug!(backend = %kind, key = key, "Read record");
                        return Some(record);
                    }
                    Err(e) => {
                        record_op(kind, "get", false);
                        tracing::warn!(
                            backend = %kind,
                            key = key,
                            error = %Error::malformed(kind, e),
                            "Unparseable record, trying next backend"
                        );
                    }
                },
                Ok(None) => {
                    record_op(kind, "get", true);
                    tracing::debug!(backend = %kind, key = key, "Key absent, trying next backend");
                }
                Err(e) => {
                    record_op(kind, "get", false);
                    tracing::warn!(backend = %kind, key = key, error = %e, "Read failed, trying next backend");
                }
            }
        }
        None
    }

    /// Write `value` under `key` to every tier.
    ///
    /// `ttl_seconds` of zero means no expiry.
    pub async fn set(
        &self,
        key: &str,
        value: serde_json::Value,
        ttl_seconds: Option<u64>,
    ) -> Result<WriteReport> {
        let record = StateRecord::new(value, ttl_seconds);
        let payload = serde_json::to_string(&record)?;
        let ttl = record.ttl_seconds.map(Duration::from_secs);

        let mut report = WriteReport::default();
        for tier in &self.tiers {
            let kind = tier.kind();
            let ok = match tier.set(key, &payload, ttl).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(backend = %kind, key = key, error = %e, "Write failed");
                    false
                }
            };
            record_op(kind, "set", ok);
            report.outcomes.push((kind, ok));
        }

        if report.any_ok() {
            Ok(report)
        } else {
            Err(Error::AllBackendsFailed(format!("set {}", key)))
        }
    }

    /// Remove `key` from every tier. Returns whether any tier held it.
    pub async fn delete(&self, key: &str) -> Result<bool> {
        let mut existed = false;
        let mut any_ok = false;
        for tier in &self.tiers {
            let kind = tier.kind();
            match tier.delete(key).await {
                Ok(found) => {
                    record_op(kind, "delete", true);
                    any_ok = true;
                    existed |= found;
                }
                Err(e) => {
                    record_op(kind, "delete", false);
                    tracing::warn!(backend = %kind, key = key, error = %e, "Delete failed");
                }
            }
        }

        if any_ok || self.tiers.is_empty() {
            Ok(existed)
        } else {
            Err(Error::AllBackendsFailed(format!("delete {}", key)))
        }
    }
}
