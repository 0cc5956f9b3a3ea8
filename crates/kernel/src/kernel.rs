//! The host-facing facade.
//!
//! A [`Kernel`] owns the plugin [`Scope`] and the [`PluginRegistry`]. The
//! host engine drives it through a handful of explicit extension points:
//!
//! - [`database_ready`](Kernel::database_ready) once game data is loaded
//! - [`frame`](Kernel::frame) every tick
//! - [`scene_event`](Kernel::scene_event) on scene lifecycle phases
//! - [`map_setup`](Kernel::map_setup) on every map load
//! - [`set_variable`](Kernel::set_variable) on game-variable writes
//! - [`plugin_command`](Kernel::plugin_command) when an event runs a command

use serde_json::Value;
use tracing::{debug, info};

use crate::command::CommandError;
use crate::config::Config;
use crate::data::{Database, Map};
use crate::event::{SceneEvent, SceneKind, VariableChange, VariableSlot};
use crate::notetag::{NotetagQuery, NotetagRecord};
use crate::plugin::{PluginDefinition, PluginError, PluginRegistry, RunReport};
use crate::scope::Scope;

/// Plugin host state for one game session.
#[derive(Debug)]
pub struct Kernel {
    config: Config,
    scope: Scope,
    plugins: PluginRegistry,
    database_ready: bool,
    initialized: bool,
}

impl Default for Kernel {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Kernel {
    pub fn new(config: Config) -> Self {
        Self {
            plugins: PluginRegistry::new(config.plugin_failure),
            config,
            scope: Scope::new(),
            database_ready: false,
            initialized: false,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn scope_mut(&mut self) -> &mut Scope {
        &mut self.scope
    }

    pub fn plugins(&self) -> &PluginRegistry {
        &self.plugins
    }

    /// True once [`database_ready`](Self::database_ready) has been called.
    pub fn is_database_ready(&self) -> bool {
        self.database_ready
    }

    /// True once init callbacks have fired; frames are delivered from then on.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Define a plugin. Must happen before the database is ready.
    pub fn define_plugin(&mut self, definition: PluginDefinition) -> Result<(), PluginError> {
        self.plugins.define(definition)
    }

    // -------------------------------------------------------------------------
    // Host extension points
    // -------------------------------------------------------------------------

    /// Game data finished loading.
    ///
    /// The first call indexes every table's notetags, runs all plugin
    /// bodies in dependency order and then fires the init callbacks. Later
    /// calls are ignored and return an empty report.
    pub fn database_ready(&mut self, database: &Database) -> Result<RunReport, PluginError> {
        if self.database_ready {
            debug!("database already ready, ignoring");
            return Ok(RunReport::default());
        }
        self.database_ready = true;

        let notetags = self.scope.notetags_mut();
        for (kind, table) in database.tables() {
            notetags.build(kind, table);
        }
        info!("notetags indexed");

        let result = self.plugins.run_all(&mut self.scope);

        let fired = self.scope.fire_init();
        self.initialized = true;
        info!(callbacks = fired, "kernel initialized");

        result
    }

    /// One host tick. Ignored until the kernel is initialized.
    pub fn frame(&mut self) -> usize {
        if !self.initialized {
            return 0;
        }
        self.scope.fire_frame()
    }

    /// A scene reached a lifecycle phase.
    pub fn scene_event(&mut self, kind: &SceneKind, event: SceneEvent) -> usize {
        debug!(scene = %kind, phase = %event, "scene event");
        self.scope.fire_scene_event(kind, event)
    }

    /// A map was loaded. Its notetags are indexed (once per map id) before
    /// map-setup callbacks run.
    pub fn map_setup(&mut self, map_id: u32, map: &Map) -> usize {
        self.scope.notetags_mut().index_map(map_id, map);
        self.scope.fire_map_setup(map_id)
    }

    /// A game variable was written.
    pub fn set_variable(&mut self, slot: VariableSlot, value: i64) -> usize {
        self.scope.set_variable(slot, value)
    }

    /// Current value of a game variable.
    pub fn variable(&self, slot: VariableSlot) -> i64 {
        self.scope.variable(slot)
    }

    /// An event ran a plugin command.
    pub fn plugin_command(&mut self, command: &str, args: &[String]) -> Result<bool, CommandError> {
        self.scope.dispatch_command(command, args)
    }

    /// Fire a custom `(namespace, event)` pair.
    pub fn fire_custom_event(&mut self, namespace: &str, event: &str, args: &[Value]) -> usize {
        self.scope.fire_custom_event(namespace, event, args)
    }

    /// Notetags for one entity.
    pub fn notetags(&self, query: &NotetagQuery) -> Vec<&NotetagRecord> {
        self.scope.notetags().lookup(query)
    }

    // -------------------------------------------------------------------------
    // Subscriptions
    // -------------------------------------------------------------------------

    pub fn on_init<F>(&mut self, callback: F)
    where
        F: Fn(&mut Scope) + 'static,
    {
        self.scope.on_init(callback);
    }

    pub fn on_frame<F>(&mut self, callback: F)
    where
        F: Fn(&mut Scope) + 'static,
    {
        self.scope.on_frame(callback);
    }

    pub fn on_map_setup<F>(&mut self, callback: F)
    where
        F: Fn(&mut Scope, u32) + 'static,
    {
        self.scope.on_map_setup(callback);
    }

    pub fn on_variable_change<F>(&mut self, slot: VariableSlot, callback: F)
    where
        F: Fn(&mut Scope, VariableChange) + 'static,
    {
        self.scope.on_variable_change(slot, callback);
    }

    pub fn on_scene_event<F>(&mut self, kind: &SceneKind, event: SceneEvent, callback: F)
    where
        F: Fn(&mut Scope) + 'static,
    {
        self.scope.on_scene_event(kind, event, callback);
    }

    pub fn on_event<F>(&mut self, namespace: &str, event: &str, callback: F)
    where
        F: Fn(&mut Scope, &[Value]) + 'static,
    {
        self.scope.on_event(namespace, event, callback);
    }

    pub fn register_plugin_command<F>(&mut self, command: &str, handler: F)
    where
        F: Fn(&mut Scope, &str, &[String]) -> anyhow::Result<()> + 'static,
    {
        self.scope.register_plugin_command(command, handler);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::data::{DataRecord, MapEvent};
    use crate::notetag::EntityKind;
    use crate::plugin::{FailurePolicy, LoadPhase};

    #[derive(Default)]
    struct Trace(Vec<String>);

    fn trace(scope: &mut Scope, entry: impl Into<String>) {
        scope.resources_mut().get_or_insert_with(Trace::default).0.push(entry.into());
    }

    fn traced(kernel: &Kernel) -> Vec<String> {
        kernel
            .scope()
            .resources()
            .get::<Trace>()
            .map(|t| t.0.clone())
            .unwrap_or_default()
    }

    fn database() -> Database {
        Database::new().with_table(
            EntityKind::Weapons,
            vec![
                None,
                Some(DataRecord {
                    id: 1,
                    name: "Sword".into(),
                    note: "<Bonus atk 5 />".into(),
                    ..Default::default()
                }),
            ],
        )
    }

    #[test]
    fn plugins_see_notetags_and_init_runs_after_them() {
        let mut kernel = Kernel::default();
        kernel
            .define_plugin(PluginDefinition::new("bonus", |scope| {
                let bonus = scope
                    .notetags()
                    .lookup(&NotetagQuery::new(EntityKind::Weapons, 1).named("Bonus"))
                    .len();
                trace(scope, format!("bonus plugin sees {bonus}"));
                scope.on_init(|scope| trace(scope, "init"));
                Ok(())
            }))
            .unwrap();

        let report = kernel.database_ready(&database()).unwrap();
        assert_eq!(report.order(), vec!["bonus"]);
        assert_eq!(traced(&kernel), vec!["bonus plugin sees 1", "init"]);
        assert!(kernel.is_initialized());
        assert_eq!(kernel.plugins().phase(), LoadPhase::Complete);
    }

    #[test]
    fn database_ready_runs_once() {
        let mut kernel = Kernel::default();
        kernel
            .define_plugin(PluginDefinition::new("counter", |scope| {
                trace(scope, "body");
                scope.on_init(|scope| trace(scope, "init"));
                Ok(())
            }))
            .unwrap();

        kernel.database_ready(&database()).unwrap();
        let second = kernel.database_ready(&database()).unwrap();

        assert!(second.is_empty());
        assert_eq!(traced(&kernel), vec!["body", "init"]);
    }

    #[test]
    fn frames_are_gated_on_init() {
        let mut kernel = Kernel::default();
        kernel.on_frame(|scope| trace(scope, "tick"));

        assert_eq!(kernel.frame(), 0);
        kernel.database_ready(&Database::new()).unwrap();
        assert_eq!(kernel.frame(), 1);
        kernel.frame();
        assert_eq!(traced(&kernel), vec!["tick", "tick"]);
    }

    #[test]
    fn map_setup_indexes_before_callbacks() {
        let mut kernel = Kernel::default();
        kernel.on_map_setup(|scope, map_id| {
            let loot = scope.notetags().has(&NotetagQuery::map_event(map_id, 2).named("Loot"));
            trace(scope, format!("map {map_id} loot={loot}"));
        });

        let map = Map {
            note: String::new(),
            events: vec![
                None,
                None,
                Some(MapEvent {
                    id: 2,
                    name: "Chest".into(),
                    note: "<Loot potion />".into(),
                }),
            ],
        };
        kernel.map_setup(5, &map);
        kernel.map_setup(5, &Map::default());

        assert_eq!(traced(&kernel), vec!["map 5 loot=true", "map 5 loot=true"]);
    }

    #[test]
    fn ordering_failure_still_initializes() {
        let mut kernel = Kernel::default();
        kernel
            .define_plugin(PluginDefinition::new("a", |_| Ok(())).requires(["missing"]))
            .unwrap();
        kernel.on_init(|scope| trace(scope, "init"));

        let err = kernel.database_ready(&Database::new()).unwrap_err();
        assert!(matches!(err, PluginError::MissingDependency { .. }));
        assert!(kernel.is_initialized());
        assert_eq!(traced(&kernel), vec!["init"]);
    }

    #[test]
    fn failure_policy_comes_from_config() {
        let kernel = Kernel::new(Config {
            plugin_failure: FailurePolicy::Abort,
            ..Config::default()
        });
        assert_eq!(kernel.plugins().policy(), FailurePolicy::Abort);
    }

    #[test]
    fn commands_variables_and_scene_events() {
        let mut kernel = Kernel::default();
        kernel.register_plugin_command("heal", |scope, _, args| {
            let amount: i64 = args.first().map(|a| a.parse()).transpose()?.unwrap_or(1);
            let hp = scope.variable(1);
            scope.set_variable(1, hp + amount);
            Ok(())
        });
        kernel.on_variable_change(1, |scope, change| trace(scope, format!("hp={}", change.value)));
        kernel.on_scene_event(&SceneKind::Battle, SceneEvent::Terminate, |scope| {
            trace(scope, "battle over");
        });

        assert!(kernel.plugin_command("heal", &["10".to_string()]).unwrap());
        assert!(kernel.plugin_command("heal", &["lots".to_string()]).is_err());
        assert_eq!(kernel.scene_event(&SceneKind::Battle, SceneEvent::Terminate), 1);
        assert_eq!(kernel.variable(1), 10);
        assert_eq!(traced(&kernel), vec!["hp=10", "battle over"]);
    }
}
