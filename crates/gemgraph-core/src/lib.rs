//! Core data types for gemgraph.
//!
//! This crate defines the records that flow through a resolution: the raw
//! [`spec::Spec`] parsed from a gemspec, the ecosystem-agnostic
//! [`module::Module`] handed to SBOM serializers, and the
//! [`config::ResolverConfig`] that tunes the resolver.
//!
//! This crate is intentionally free of async code, subprocesses and I/O
//! beyond reading configuration files.

/// Number of dependency layers expanded below the root by default.
pub const DEFAULT_MAX_DEPTH: usize = 3;

/// Sentinel stored in a checksum when no digest could be computed.
pub const CHECKSUM_NONE: &str = "NONE";

pub mod config;
pub mod module;
pub mod spec;
