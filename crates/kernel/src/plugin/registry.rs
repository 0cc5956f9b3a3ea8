//! Plugin registry and the ordered, run-once initialization pass.
//!
//! Plugins are defined at startup in any order. When the host signals that
//! game data is ready, [`PluginRegistry::run_all`] resolves the declared
//! requirements into a load order and runs every init body exactly once,
//! each with mutable access to the shared [`Scope`].

use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, error, info, warn};

use super::dependency::DependencyGraph;
use super::error::PluginError;
use crate::scope::Scope;

/// One-shot plugin body.
pub type PluginInit = Box<dyn FnOnce(&mut Scope) -> anyhow::Result<()>>;

/// A named plugin body with its declared requirements.
pub struct PluginDefinition {
    name: String,
    requires: Vec<String>,
    init: PluginInit,
}

impl PluginDefinition {
    /// Create a definition with no requirements.
    pub fn new<F>(name: impl Into<String>, init: F) -> Self
    where
        F: FnOnce(&mut Scope) -> anyhow::Result<()> + 'static,
    {
        Self {
            name: name.into(),
            requires: Vec::new(),
            init: Box::new(init),
        }
    }

    /// Declare plugins that must be initialized before this one.
    pub fn requires<I, S>(mut self, plugins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requires.extend(plugins.into_iter().map(Into::into));
        self
    }

    /// Plugin name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared requirements, in declaration order.
    pub fn requirements(&self) -> &[String] {
        &self.requires
    }

    fn validate(&self) -> Result<(), PluginError> {
        if self.name.trim().is_empty() {
            return Err(PluginError::registration(
                &self.name,
                "name must not be empty",
            ));
        }
        for dep in &self.requires {
            if dep.trim().is_empty() {
                return Err(PluginError::registration(
                    &self.name,
                    "requires contains an empty plugin name",
                ));
            }
            if dep == &self.name {
                return Err(PluginError::registration(
                    &self.name,
                    "a plugin cannot require itself",
                ));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for PluginDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginDefinition")
            .field("name", &self.name)
            .field("requires", &self.requires)
            .finish_non_exhaustive()
    }
}

/// Where the registry is in its one-way lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    /// Accepting definitions.
    Registered,
    /// Load order is being resolved.
    Ordered,
    /// Init bodies are executing.
    Running,
    /// Terminal. No further definitions or runs.
    Complete,
}

/// What to do when a plugin's init body fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Log the failure and keep initializing the remaining plugins.
    #[default]
    Continue,
    /// Stop at the first failure; the rest are reported as skipped.
    Abort,
}

impl std::str::FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "continue" => Ok(Self::Continue),
            "abort" => Ok(Self::Abort),
            other => Err(format!(
                "unknown plugin failure policy '{other}', expected 'continue' or 'abort'"
            )),
        }
    }
}

/// Result of one plugin's init during a run.
#[derive(Debug)]
pub enum PluginOutcome {
    Completed,
    Failed(PluginError),
    /// Not executed because an earlier plugin failed under [`FailurePolicy::Abort`].
    Skipped,
}

/// Per-plugin outcomes of a run, in execution order.
#[derive(Debug, Default)]
pub struct RunReport {
    entries: Vec<(String, PluginOutcome)>,
}

impl RunReport {
    /// Plugin names in the order they were considered.
    pub fn order(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Outcome for a plugin, if it was part of the run.
    pub fn outcome(&self, plugin: &str) -> Option<&PluginOutcome> {
        self.entries
            .iter()
            .find(|(name, _)| name == plugin)
            .map(|(_, outcome)| outcome)
    }

    /// Names of plugins whose init completed.
    pub fn completed(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, o)| matches!(o, PluginOutcome::Completed))
            .map(|(name, _)| name.as_str())
    }

    /// Errors from plugins whose init failed.
    pub fn failures(&self) -> impl Iterator<Item = &PluginError> {
        self.entries.iter().filter_map(|(_, o)| match o {
            PluginOutcome::Failed(e) => Some(e),
            _ => None,
        })
    }

    /// True when nothing ran (empty registry or a repeated run).
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of plugins considered.
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

struct StoredPlugin {
    name: String,
    requires: Vec<String>,
    init: Option<PluginInit>,
}

/// Registry of plugin definitions keyed by name.
///
/// Redefining a name replaces the earlier definition (including its
/// requirements) but keeps its original position for tie-breaking.
pub struct PluginRegistry {
    plugins: Vec<StoredPlugin>,
    index: HashMap<String, usize>,
    phase: LoadPhase,
    policy: FailurePolicy,
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.names().collect::<Vec<_>>())
            .field("phase", &self.phase)
            .field("policy", &self.policy)
            .finish()
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new(FailurePolicy::default())
    }
}

impl PluginRegistry {
    /// Create an empty registry.
    pub fn new(policy: FailurePolicy) -> Self {
        Self {
            plugins: Vec::new(),
            index: HashMap::new(),
            phase: LoadPhase::Registered,
            policy,
        }
    }

    /// Register a plugin definition.
    ///
    /// An invalid definition is logged and rejected without affecting
    /// previously registered plugins.
    pub fn define(&mut self, definition: PluginDefinition) -> Result<(), PluginError> {
        if self.phase != LoadPhase::Registered {
            let err = PluginError::registration(
                &definition.name,
                "plugins have already been initialized",
            );
            warn!(plugin = %definition.name, error = %err, "plugin definition rejected");
            return Err(err);
        }

        if let Err(err) = definition.validate() {
            warn!(plugin = %definition.name, error = %err, "plugin definition rejected");
            return Err(err);
        }

        let PluginDefinition {
            name,
            requires,
            init,
        } = definition;

        match self.index.get(&name) {
            Some(&slot) => {
                debug!(plugin = %name, "plugin redefined, replacing earlier definition");
                self.plugins[slot] = StoredPlugin {
                    name,
                    requires,
                    init: Some(init),
                };
            }
            None => {
                debug!(plugin = %name, requires = ?requires, "plugin defined");
                self.index.insert(name.clone(), self.plugins.len());
                self.plugins.push(StoredPlugin {
                    name,
                    requires,
                    init: Some(init),
                });
            }
        }

        Ok(())
    }

    /// Build the dependency graph for the current definitions.
    pub fn graph(&self) -> Result<DependencyGraph, PluginError> {
        let mut graph = DependencyGraph::new();
        for plugin in &self.plugins {
            graph.add_node(&plugin.name);
        }
        for plugin in &self.plugins {
            for dep in &plugin.requires {
                graph.add_dependency(&plugin.name, dep)?;
            }
        }
        Ok(graph)
    }

    /// Resolve the load order without running anything.
    pub fn load_order(&self) -> Result<Vec<String>, PluginError> {
        Ok(self.graph()?.topological_order()?)
    }

    /// Initialize every plugin once, in dependency order.
    ///
    /// Only the first call does anything; later calls return an empty
    /// report. A missing requirement or a cycle fails the whole run before
    /// any body executes.
    pub fn run_all(&mut self, scope: &mut Scope) -> Result<RunReport, PluginError> {
        if self.phase != LoadPhase::Registered {
            debug!(phase = ?self.phase, "plugins already initialized, skipping run");
            return Ok(RunReport::default());
        }

        self.phase = LoadPhase::Ordered;
        let order = match self.load_order() {
            Ok(order) => order,
            Err(e) => {
                self.phase = LoadPhase::Complete;
                error!(error = %e, "failed to resolve plugin load order");
                return Err(e);
            }
        };
        debug!(order = ?order, "resolved plugin load order");

        self.phase = LoadPhase::Running;
        let mut report = RunReport::default();
        let mut aborted = false;

        for name in order {
            let Some(init) = self
                .index
                .get(&name)
                .and_then(|&slot| self.plugins[slot].init.take())
            else {
                continue;
            };

            if aborted {
                report.entries.push((name, PluginOutcome::Skipped));
                continue;
            }

            debug!(plugin = %name, "initializing plugin");
            let outcome = match panic::catch_unwind(AssertUnwindSafe(|| init(scope))) {
                Ok(Ok(())) => PluginOutcome::Completed,
                Ok(Err(source)) => PluginOutcome::Failed(PluginError::Runtime {
                    plugin: name.clone(),
                    source,
                }),
                Err(payload) => PluginOutcome::Failed(PluginError::panic(&name, payload.as_ref())),
            };

            if let PluginOutcome::Failed(e) = &outcome {
                error!(plugin = %name, error = %e, "plugin init failed");
                if self.policy == FailurePolicy::Abort {
                    aborted = true;
                }
            }
            report.entries.push((name, outcome));
        }

        self.phase = LoadPhase::Complete;
        info!(
            plugins = report.len(),
            failed = report.failures().count(),
            "plugin initialization complete"
        );
        Ok(report)
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    /// Failure policy used by [`run_all`](Self::run_all).
    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Check if a plugin is defined.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Defined plugin names in definition order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.plugins.iter().map(|p| p.name.as_str())
    }

    /// Declared requirements of a plugin.
    pub fn requirements(&self, name: &str) -> Option<&[String]> {
        self.index
            .get(name)
            .map(|&slot| self.plugins[slot].requires.as_slice())
    }

    /// Number of defined plugins.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// True when no plugins are defined.
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
