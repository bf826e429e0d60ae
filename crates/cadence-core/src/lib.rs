//! Cadence Core - Foundational types for the Cadence engine
//!
//! This crate provides the core types that all other Cadence crates depend on:
//! - `EntityId`, `ComponentId` - Stable identifiers
//! - `Fingerprint` - SHA-256 content hash of a component's state
//! - Error types and Result alias

mod error;
mod hash;
mod id;

pub use error::{CadenceError, Result};
pub use hash::Fingerprint;
pub use id::{ComponentId, EntityId};
