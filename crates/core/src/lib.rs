#![deny(unused)]
//! Core types, traits, and error definitions for Arkaios.
//!
//! This crate provides the building blocks shared by the storage layer,
//! the flag/vault services and the HTTP gateway.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use traits::*;
pub use types::*;
