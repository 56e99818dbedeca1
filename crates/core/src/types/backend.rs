//! Backend identification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kinds of persistence backend a tiered store can be assembled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// HTTP key-value service with bearer-token auth.
    RestKv,
    /// Redis-protocol service.
    Redis,
    /// Local files, always attempted on writes.
    Filesystem,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RestKv => "rest-kv",
            Self::Redis => "redis",
            Self::Filesystem => "filesystem",
        }
    }

    pub fn is_remote(&self) -> bool {
        !matches!(self, Self::Filesystem)
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
