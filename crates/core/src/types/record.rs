//! The envelope persisted by the tiered store.

use serde::{Deserialize, Serialize};

use super::now_iso;

/// A value as written to every backend.
///
/// The `value` is opaque to the store; callers decide its shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateRecord {
    pub value: serde_json::Value,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl_seconds: Option<u64>,
}

impl StateRecord {
    /// Wrap a value, stamping it with the current time.
    pub fn new(value: serde_json::Value, ttl_seconds: Option<u64>) -> Self {
        Self {
            value,
            timestamp: now_iso(),
            ttl_seconds: ttl_seconds.filter(|t| *t > 0),
        }
    }
}
