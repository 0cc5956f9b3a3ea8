//! Parser for plugin `.info.toml` manifest files.
//!
//! A manifest describes a plugin for offline tooling: its name, version and
//! the plugins it requires. Each plugin lives in its own directory holding
//! exactly one `{name}.info.toml`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::registry::{PluginDefinition, PluginRegistry};

/// Plugin metadata parsed from `.info.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Plugin name, as used in other plugins' `requires`.
    pub name: String,

    /// Human-readable description.
    #[serde(default)]
    pub description: String,

    /// Semantic version (e.g., "1.0.0").
    pub version: String,

    /// Plugins that must initialize first.
    #[serde(default, alias = "dependencies")]
    pub requires: Vec<String>,
}

impl PluginManifest {
    /// Parse a manifest file from the given path.
    pub fn parse(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read plugin manifest: {}", path.display()))?;
        Self::parse_str(&content, path)
    }

    /// Parse a manifest from a TOML string; `path` is only used in errors.
    pub fn parse_str(content: &str, path: &Path) -> Result<Self> {
        let manifest: PluginManifest = toml::from_str(content)
            .with_context(|| format!("failed to parse plugin manifest TOML at {}", path.display()))?;
        manifest.validate(path)?;
        Ok(manifest)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("plugin manifest at {} has empty 'name' field", path.display());
        }

        if self.version.trim().is_empty() {
            anyhow::bail!(
                "plugin '{}' at {} has empty 'version' field",
                self.name,
                path.display()
            );
        }

        if let Some(dep) = self.requires.iter().find(|dep| dep.trim().is_empty()) {
            anyhow::bail!(
                "plugin '{}' at {} lists an empty name in 'requires' ({dep:?})",
                self.name,
                path.display()
            );
        }

        Ok(())
    }

    /// A definition with a no-op body, for resolving load order offline.
    pub fn to_definition(&self) -> PluginDefinition {
        PluginDefinition::new(self.name.clone(), |_| Ok(())).requires(self.requires.iter().cloned())
    }
}

/// A manifest found on disk.
#[derive(Debug, Clone)]
pub struct DiscoveredPlugin {
    pub manifest: PluginManifest,
    pub path: PathBuf,
}

/// Find the single `.info.toml` in a plugin directory.
pub fn manifest_path(plugin_dir: &Path) -> Result<PathBuf> {
    let mut found: Vec<PathBuf> = std::fs::read_dir(plugin_dir)
        .with_context(|| format!("failed to read plugin directory: {}", plugin_dir.display()))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(".info.toml"))
        })
        .collect();

    match found.len() {
        0 => anyhow::bail!("no .info.toml file found in {}", plugin_dir.display()),
        1 => Ok(found.remove(0)),
        _ => anyhow::bail!("multiple .info.toml files found in {}", plugin_dir.display()),
    }
}

/// Discover every plugin manifest under `plugins_dir`.
///
/// Subdirectories are visited in name order. A directory whose manifest is
/// missing or invalid is logged and skipped. A missing `plugins_dir` yields
/// nothing.
pub fn discover(plugins_dir: &Path) -> Result<Vec<DiscoveredPlugin>> {
    if !plugins_dir.exists() {
        info!(plugins_dir = %plugins_dir.display(), "plugins directory does not exist, skipping");
        return Ok(Vec::new());
    }

    let mut entries: Vec<_> = std::fs::read_dir(plugins_dir)
        .with_context(|| format!("failed to read plugins directory: {}", plugins_dir.display()))?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .collect();

    // Sort for deterministic output
    entries.sort_by_key(|e| e.file_name());

    let mut plugins = Vec::new();
    for entry in entries {
        let plugin_dir = entry.path();
        match manifest_path(&plugin_dir).and_then(|path| {
            PluginManifest::parse(&path).map(|manifest| DiscoveredPlugin { manifest, path })
        }) {
            Ok(plugin) => plugins.push(plugin),
            Err(e) => {
                warn!(
                    plugin_dir = %plugin_dir.display(),
                    error = %e,
                    "failed to load plugin manifest, skipping"
                );
            }
        }
    }
    Ok(plugins)
}

/// Register every manifest, in discovery order, with no-op bodies.
///
/// Definitions the registry rejects are logged by the registry and left out.
pub fn registry_from_manifests<'a, I>(manifests: I) -> PluginRegistry
where
    I: IntoIterator<Item = &'a PluginManifest>,
{
    let mut registry = PluginRegistry::default();
    for manifest in manifests {
        // Rejections are already logged by `define`.
        let _ = registry.define(manifest.to_definition());
    }
    registry
}
