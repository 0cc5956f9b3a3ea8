//! The plugin-facing context.
//!
//! A [`Scope`] owns every queue and registry plugins interact with. Plugin
//! bodies and callbacks receive `&mut Scope`; there is no global state.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use serde_json::Value;
use tracing::debug;

use crate::command::{CommandError, CommandRegistry};
use crate::event::{
    EventKey, EventQueue, LifecycleQueues, SceneEvent, SceneKind, VariableChange, VariableSlot,
    fire_snapshot,
};
use crate::notetag::NotetagIndex;

/// Typed storage for plugin state, one value per type.
#[derive(Default)]
pub struct Resources {
    values: HashMap<TypeId, Box<dyn Any>>,
}

impl fmt::Debug for Resources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resources")
            .field("len", &self.values.len())
            .finish()
    }
}

impl Resources {
    /// Store `value`, returning the previous value of the same type.
    pub fn insert<T: 'static>(&mut self, value: T) -> Option<T> {
        self.values
            .insert(TypeId::of::<T>(), Box::new(value))
            .and_then(|old| old.downcast::<T>().ok())
            .map(|old| *old)
    }

    pub fn get<T: 'static>(&self) -> Option<&T> {
        self.values
            .get(&TypeId::of::<T>())
            .and_then(|value| value.downcast_ref::<T>())
    }

    pub fn get_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.values
            .get_mut(&TypeId::of::<T>())
            .and_then(|value| value.downcast_mut::<T>())
    }

    /// The stored `T`, inserting `init()` first if absent.
    ///
    /// # Panics
    ///
    /// Never in practice: values are keyed by their own `TypeId`.
    #[allow(clippy::expect_used)]
    pub fn get_or_insert_with<T: 'static>(&mut self, init: impl FnOnce() -> T) -> &mut T {
        self.values
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(init()))
            .downcast_mut::<T>()
            .expect("resource stored under its own TypeId")
    }

    pub fn remove<T: 'static>(&mut self) -> Option<T> {
        self.values
            .remove(&TypeId::of::<T>())
            .and_then(|old| old.downcast::<T>().ok())
            .map(|old| *old)
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.values.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Everything a plugin can reach.
#[derive(Default)]
pub struct Scope {
    events: EventQueue<Scope>,
    lifecycle: LifecycleQueues<Scope>,
    commands: CommandRegistry,
    notetags: NotetagIndex,
    resources: Resources,
    variables: HashMap<VariableSlot, i64>,
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("events", &self.events)
            .field("lifecycle", &self.lifecycle)
            .field("commands", &self.commands)
            .field("resources", &self.resources)
            .field("variables", &self.variables.len())
            .finish_non_exhaustive()
    }
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn events(&self) -> &EventQueue<Scope> {
        &self.events
    }

    pub fn lifecycle(&self) -> &LifecycleQueues<Scope> {
        &self.lifecycle
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    pub fn commands_mut(&mut self) -> &mut CommandRegistry {
        &mut self.commands
    }

    pub fn notetags(&self) -> &NotetagIndex {
        &self.notetags
    }

    pub fn notetags_mut(&mut self) -> &mut NotetagIndex {
        &mut self.notetags
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut Resources {
        &mut self.resources
    }

    // -------------------------------------------------------------------------
    // Subscriptions
    // -------------------------------------------------------------------------

    /// Run `callback` once, after the database is ready and plugins ran.
    pub fn on_init<F>(&mut self, callback: F)
    where
        F: Fn(&mut Scope) + 'static,
    {
        self.lifecycle.init.push(move |scope: &mut Scope, _: &()| callback(scope));
    }

    /// Run `callback` on every frame after init.
    pub fn on_frame<F>(&mut self, callback: F)
    where
        F: Fn(&mut Scope) + 'static,
    {
        self.lifecycle.frame.push(move |scope: &mut Scope, _: &()| callback(scope));
    }

    /// Run `callback` with the map id each time a map is set up.
    pub fn on_map_setup<F>(&mut self, callback: F)
    where
        F: Fn(&mut Scope, u32) + 'static,
    {
        self.lifecycle
            .map_setup
            .push(move |scope: &mut Scope, map_id: &u32| callback(scope, *map_id));
    }

    /// Run `callback` whenever game variable `slot` is written.
    pub fn on_variable_change<F>(&mut self, slot: VariableSlot, callback: F)
    where
        F: Fn(&mut Scope, VariableChange) + 'static,
    {
        self.lifecycle
            .variables
            .entry(slot)
            .or_default()
            .push(move |scope: &mut Scope, change: &VariableChange| callback(scope, *change));
    }

    /// Subscribe to a scene's lifecycle phase.
    pub fn on_scene_event<F>(&mut self, kind: &SceneKind, event: SceneEvent, callback: F)
    where
        F: Fn(&mut Scope) + 'static,
    {
        self.events
            .register(&kind.namespace(), event.as_str(), move |scope: &mut Scope, _: &[Value]| {
                callback(scope);
            });
    }

    /// Subscribe to a custom `(namespace, event)` pair.
    pub fn on_event<F>(&mut self, namespace: &str, event: &str, callback: F)
    where
        F: Fn(&mut Scope, &[Value]) + 'static,
    {
        self.events.register(namespace, event, callback);
    }

    /// Register the handler for a plugin command; replaces any existing one.
    pub fn register_plugin_command<F>(&mut self, command: &str, handler: F)
    where
        F: Fn(&mut Scope, &str, &[String]) -> anyhow::Result<()> + 'static,
    {
        self.commands.register(command, handler);
    }

    // -------------------------------------------------------------------------
    // Dispatch
    // -------------------------------------------------------------------------

    /// Fire a custom event. Returns the number of callbacks run.
    pub fn fire_custom_event(&mut self, namespace: &str, event: &str, args: &[Value]) -> usize {
        let key = EventKey::new(namespace, event);
        let Some(callbacks) = self.events.callbacks(&key).cloned() else {
            return 0;
        };
        debug!(event = %key, callbacks = callbacks.len(), "firing event");
        callbacks.fire(self, args)
    }

    /// Fire a scene lifecycle phase.
    pub fn fire_scene_event(&mut self, kind: &SceneKind, event: SceneEvent) -> usize {
        self.fire_custom_event(&kind.namespace(), event.as_str(), &[])
    }

    /// Run the handler for a plugin command, if one is registered.
    pub fn dispatch_command(&mut self, command: &str, args: &[String]) -> Result<bool, CommandError> {
        CommandRegistry::dispatch(self, command, args)
    }

    pub(crate) fn fire_init(&mut self) -> usize {
        fire_snapshot(self, |scope| Some(&scope.lifecycle.init), &())
    }

    pub(crate) fn fire_frame(&mut self) -> usize {
        fire_snapshot(self, |scope| Some(&scope.lifecycle.frame), &())
    }

    pub(crate) fn fire_map_setup(&mut self, map_id: u32) -> usize {
        fire_snapshot(self, |scope| Some(&scope.lifecycle.map_setup), &map_id)
    }

    // -------------------------------------------------------------------------
    // Game variables
    // -------------------------------------------------------------------------

    /// Current value of a game variable; unset slots read as 0.
    pub fn variable(&self, slot: VariableSlot) -> i64 {
        self.variables.get(&slot).copied().unwrap_or(0)
    }

    /// Write a game variable and notify its watchers synchronously.
    pub fn set_variable(&mut self, slot: VariableSlot, value: i64) -> usize {
        self.variables.insert(slot, value);
        let change = VariableChange { slot, value };
        fire_snapshot(self, |scope| scope.lifecycle.variables.get(&slot), &change)
    }
}
