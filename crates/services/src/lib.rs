#![deny(unused)]
//! Arkaios services built on the tiered store.
//!
//! - `autopilot`: the global autopilot flag with its emergency stop
//! - `marker`: out-of-band signals for local processes (stop marker, policy file)
//! - `vault`: per-user API keys stored under a hashed user id

pub mod autopilot;
pub mod marker;
pub mod vault;

pub use autopilot::AutopilotService;
pub use marker::{EmergencyMarker, PolicyMirror, EMERGENCY_MESSAGE};
pub use vault::{storage_key, ApiKeyVault, MAX_TTL_SECONDS};
