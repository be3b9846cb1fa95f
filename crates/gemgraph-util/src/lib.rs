//! Shared utilities for gemgraph.
//!
//! This crate provides cross-cutting concerns used by the other gemgraph
//! crates: error types, filesystem helpers, SHA-256 hashing, process
//! spawning, and terminal progress indicators.

pub mod errors;
pub mod fs;
pub mod hash;
pub mod process;
pub mod progress;
