//! Core type definitions for Arkaios.
//!
//! Broken down into submodules: the generic persisted envelope, the
//! autopilot flag and the per-user key record.

pub mod autopilot;
pub mod backend;
pub mod record;
pub mod vault;

pub use autopilot::*;
pub use backend::*;
pub use record::*;
pub use vault::*;

/// Current wall-clock time as epoch milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Current wall-clock time as an ISO-8601 string with millisecond precision.
pub fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
