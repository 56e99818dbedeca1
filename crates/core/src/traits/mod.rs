//! Core traits for Arkaios.
//!
//! - `state_store`: the storage port every backend adapter implements

pub mod state_store;

pub use state_store::*;
