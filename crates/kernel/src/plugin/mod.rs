//! Plugin system for Siv.
//!
//! This module handles:
//! - Resolving plugin requirements into a load order
//! - Running each plugin body exactly once, isolating failures
//! - Parsing plugin metadata from `.info.toml` files

pub mod cli;
mod dependency;
mod error;
mod manifest;
mod registry;

pub use dependency::{DependencyGraph, GraphError};
pub use error::PluginError;
pub use manifest::{
    DiscoveredPlugin, PluginManifest, discover, manifest_path, registry_from_manifests,
};
pub use registry::{
    FailurePolicy, LoadPhase, PluginDefinition, PluginInit, PluginOutcome, PluginRegistry,
    RunReport,
};
