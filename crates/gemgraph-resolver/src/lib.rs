//! Ruby dependency resolution.
//!
//! Reconstructs a module graph for a Ruby project without executing Ruby:
//! gemspecs are tokenized line by line, every gem installed on the system
//! is indexed into a [`cache::DependencyCache`], and the root's runtime
//! requirements are expanded to a bounded depth by [`builder::GraphBuilder`].
//! The [`resolver::Resolver`] ties the phases together.

pub mod builder;
pub mod cache;
pub mod checksum;
pub mod env;
pub mod gemspec;
pub mod graph;
pub mod license;
pub mod lockfile;
pub mod manifest;
pub mod requirement;
pub mod resolver;
pub mod version;
