//! CLI command implementations for plugin manifests.
//!
//! These commands only read manifests; no plugin body is executed.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};

use super::manifest::{self, DiscoveredPlugin};

/// List all discovered plugins.
pub fn cmd_plugins_list(plugins_dir: &Path) -> Result<()> {
    let discovered = manifest::discover(plugins_dir)?;

    if discovered.is_empty() {
        println!("No plugins found in {}.", plugins_dir.display());
        return Ok(());
    }

    print!("{}", format_plugin_table(&discovered));
    Ok(())
}

/// Print the order in which the discovered plugins would initialize.
pub fn cmd_plugins_order(plugins_dir: &Path) -> Result<()> {
    let discovered = manifest::discover(plugins_dir)?;
    let registry = manifest::registry_from_manifests(discovered.iter().map(|p| &p.manifest));

    let order = registry
        .load_order()
        .with_context(|| format!("cannot order plugins in {}", plugins_dir.display()))?;

    if order.is_empty() {
        println!("No plugins found in {}.", plugins_dir.display());
        return Ok(());
    }

    for (position, name) in order.iter().enumerate() {
        println!("{:>3}. {name}", position + 1);
    }
    Ok(())
}

/// Render discovered plugins as a fixed-width table.
pub fn format_plugin_table(plugins: &[DiscoveredPlugin]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<24} {:<10} {:<30}", "PLUGIN", "VERSION", "REQUIRES");
    let _ = writeln!(out, "{}", "-".repeat(64));
    for plugin in plugins {
        let requires = if plugin.manifest.requires.is_empty() {
            "-".to_string()
        } else {
            plugin.manifest.requires.join(", ")
        };
        let _ = writeln!(
            out,
            "{:<24} {:<10} {}",
            plugin.manifest.name, plugin.manifest.version, requires
        );
    }
    out
}
