#![deny(unused)]
//! HTTP surface for Arkaios.
//!
//! This crate wires the tiered store and the services built on it into an
//! axum router, and carries the client used by the `kv-health-check` tool.

pub mod autopilot;
pub mod health_check;
pub mod identity;
pub mod kv_health;
pub mod response;
pub mod server;
pub mod user_key;

pub use health_check::{endpoints_for_base, evaluate, fetch_check, CheckResult, Verdict};
pub use kv_health::KvHealthResponse;
pub use server::{AppState, GatewayConfig, GatewayServer};
