//! Plugin system error types with clear, actionable messages.
//!
//! All errors include the plugin name and relevant context to help
//! developers quickly identify and fix their `requires` lists or bodies.

use thiserror::Error;

use super::dependency::GraphError;

/// Errors that can occur during plugin registration and initialization.
#[derive(Debug, Error)]
pub enum PluginError {
    /// The definition was rejected; the plugin is not registered.
    #[error("plugin '{plugin}': invalid definition: {reason}")]
    Registration { plugin: String, reason: String },

    /// Plugin requires another plugin that was never defined.
    #[error("plugin '{plugin}': requires '{dependency}' which was never defined")]
    MissingDependency { plugin: String, dependency: String },

    /// Circular dependency detected.
    #[error("circular dependency detected: {cycle}")]
    CircularDependency { cycle: String },

    /// Plugin init body returned an error.
    #[error("plugin '{plugin}': init failed: {source}")]
    Runtime {
        plugin: String,
        #[source]
        source: anyhow::Error,
    },

    /// Plugin init body panicked.
    #[error("plugin '{plugin}': init panicked: {message}")]
    Panic { plugin: String, message: String },
}

impl PluginError {
    /// Create a registration error.
    pub fn registration(plugin: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Registration {
            plugin: plugin.into(),
            reason: reason.into(),
        }
    }

    /// Create a plugin panic error from a caught panic payload.
    pub fn panic(plugin: impl Into<String>, payload: &(dyn std::any::Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Self::Panic {
            plugin: plugin.into(),
            message,
        }
    }

    /// Name of the plugin the error belongs to, if it is about a single plugin.
    pub fn plugin(&self) -> Option<&str> {
        match self {
            Self::Registration { plugin, .. }
            | Self::MissingDependency { plugin, .. }
            | Self::Runtime { plugin, .. }
            | Self::Panic { plugin, .. } => Some(plugin),
            Self::CircularDependency { .. } => None,
        }
    }
}

impl From<GraphError> for PluginError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::UnknownNode {
                dependent,
                dependency,
                ..
            } => Self::MissingDependency {
                plugin: dependent,
                dependency,
            },
            GraphError::Cycle { path } => Self::CircularDependency {
                cycle: path.join(" -> "),
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_actionable() {
        let err = PluginError::registration("", "name must not be empty");
        assert!(err.to_string().contains("name must not be empty"));

        let err = PluginError::MissingDependency {
            plugin: "time_chest".into(),
            dependency: "time_core".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("time_chest"));
        assert!(msg.contains("time_core"));
    }

    #[test]
    fn graph_cycle_converts_with_path() {
        let err: PluginError = GraphError::Cycle {
            path: vec!["a".into(), "b".into(), "a".into()],
        }
        .into();
        assert_eq!(err.to_string(), "circular dependency detected: a -> b -> a");
        assert!(err.plugin().is_none());
    }

    #[test]
    fn unknown_node_converts_to_missing_dependency() {
        let err: PluginError = GraphError::UnknownNode {
            dependent: "clock".into(),
            dependency: "tiem_core".into(),
            missing: "tiem_core".into(),
        }
        .into();
        assert_eq!(err.plugin(), Some("clock"));
        assert!(err.to_string().contains("tiem_core"));
    }

    #[test]
    fn panic_payload_is_captured() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        let err = PluginError::panic("loot", payload.as_ref());
        assert_eq!(err.to_string(), "plugin 'loot': init panicked: boom");

        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("owned boom"));
        let err = PluginError::panic("loot", payload.as_ref());
        assert!(err.to_string().ends_with("owned boom"));
    }
}
