#![deny(unused)]
//! Governance for Arkaios: logging, metrics and caller identity checks.

pub mod identity;
pub mod metrics;
pub mod tracing_layer;

pub use identity::{ClaimChecks, GoogleIdVerifier, IdentityClaims, Verification};
pub use self::metrics::{setup_metrics_recorder, track_request};
pub use tracing_layer::configure_tracing;
