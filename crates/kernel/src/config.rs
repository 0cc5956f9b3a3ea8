//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::plugin::FailurePolicy;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding the exported JSON database (default: ./data).
    pub data_dir: PathBuf,

    /// Directory scanned for `*.info.toml` plugin manifests (default: ./plugins).
    pub plugins_dir: PathBuf,

    /// What a failing plugin body does to the rest of the run (default: continue).
    pub plugin_failure: FailurePolicy,

    /// Default tracing directive when `RUST_LOG` is unset (default: info).
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            plugins_dir: PathBuf::from("./plugins"),
            plugin_failure: FailurePolicy::default(),
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let data_dir = lookup("SIV_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let plugins_dir = lookup("SIV_PLUGINS_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.plugins_dir);

        let plugin_failure = match lookup("SIV_PLUGIN_FAILURE") {
            Some(value) => value
                .parse::<FailurePolicy>()
                .map_err(anyhow::Error::msg)
                .context("SIV_PLUGIN_FAILURE must be 'continue' or 'abort'")?,
            None => defaults.plugin_failure,
        };

        let log_filter = lookup("SIV_LOG")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.log_filter);

        Ok(Self {
            data_dir,
            plugins_dir,
            plugin_failure,
            log_filter,
        })
    }
}
