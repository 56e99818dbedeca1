//! Per-user API key record.

use serde::{Deserialize, Serialize};

/// Namespace prefix of vault keys; followed by the hex SHA-256 of the user id.
pub const USER_API_KEY_PREFIX: &str = "user:apikey:";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserApiKeyRecord {
    pub api_key: String,
    /// Epoch milliseconds of the last store.
    pub ts: i64,
}
