//! Event queue - indexes callbacks by namespace and event name.
//!
//! The queue maps a case-folded `(namespace, event)` key to an ordered list
//! of callbacks. Firing a key calls every callback in registration order;
//! firing a key nobody registered is a silent no-op.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;
use tracing::debug;

use super::callback::CallbackList;

/// Case-folded `(namespace, event)` key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventKey {
    namespace: String,
    event: String,
}

impl EventKey {
    /// Build a key; both parts are lowercased.
    pub fn new(namespace: &str, event: &str) -> Self {
        Self {
            namespace: namespace.to_lowercase(),
            event: event.to_lowercase(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn event(&self) -> &str {
        &self.event
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.event)
    }
}

/// Callbacks for custom events: context plus the fired argument list.
pub type EventCallbacks<C> = CallbackList<C, [Value]>;

/// Registry mapping event keys to ordered callbacks.
pub struct EventQueue<C> {
    queues: HashMap<EventKey, EventCallbacks<C>>,
}

impl<C> Default for EventQueue<C> {
    fn default() -> Self {
        Self {
            queues: HashMap::new(),
        }
    }
}

impl<C> fmt::Debug for EventQueue<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.queues.iter().map(|(k, v)| (k.to_string(), v.len())))
            .finish()
    }
}

impl<C> EventQueue<C> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a callback to the list for `(namespace, event)`.
    pub fn register<F>(&mut self, namespace: &str, event: &str, callback: F)
    where
        F: Fn(&mut C, &[Value]) + 'static,
    {
        let key = EventKey::new(namespace, event);
        debug!(event = %key, "registered event callback");
        self.queues.entry(key).or_default().push(callback);
    }

    /// Call every callback for `(namespace, event)` with `args`.
    ///
    /// Returns the number of callbacks invoked; zero for unknown keys.
    pub fn fire(&self, ctx: &mut C, namespace: &str, event: &str, args: &[Value]) -> usize {
        match self.callbacks(&EventKey::new(namespace, event)) {
            Some(callbacks) => callbacks.fire(ctx, args),
            None => 0,
        }
    }

    /// The callbacks registered under `key`, if any.
    ///
    /// A context that owns this queue clones the list before running it.
    pub fn callbacks(&self, key: &EventKey) -> Option<&EventCallbacks<C>> {
        self.queues.get(key)
    }

    /// Check if any callback is registered for `(namespace, event)`.
    pub fn has_event(&self, namespace: &str, event: &str) -> bool {
        self.queues
            .get(&EventKey::new(namespace, event))
            .is_some_and(|callbacks| !callbacks.is_empty())
    }

    /// Number of callbacks registered for `(namespace, event)`.
    pub fn handler_count(&self, namespace: &str, event: &str) -> usize {
        self.queues
            .get(&EventKey::new(namespace, event))
            .map(|callbacks| callbacks.len())
            .unwrap_or(0)
    }

    /// All keys with at least one callback.
    pub fn keys(&self) -> impl Iterator<Item = &EventKey> {
        self.queues.keys()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.queues.len()
    }

    /// True when nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use serde_json::json;

    use super::*;

    type Log = Vec<String>;

    #[test]
    fn empty_queue_fires_nothing() {
        let queue: EventQueue<Log> = EventQueue::new();
        let mut log = Log::new();

        assert_eq!(queue.fire(&mut log, "Chest", "opened", &[]), 0);
        assert!(log.is_empty());
        assert!(!queue.has_event("chest", "opened"));
        assert_eq!(queue.handler_count("chest", "opened"), 0);
    }

    #[test]
    fn fires_in_registration_order_with_shared_args() {
        let mut queue: EventQueue<Log> = EventQueue::new();
        queue.register("loot", "roll", |log: &mut Log, args: &[Value]| {
            log.push(format!("b:{}", args[0]));
        });
        queue.register("loot", "roll", |log: &mut Log, args: &[Value]| {
            log.push(format!("a:{}", args[0]));
        });

        let mut log = Log::new();
        assert_eq!(queue.fire(&mut log, "loot", "roll", &[json!(7)]), 2);
        assert_eq!(log, vec!["b:7", "a:7"]);
    }

    #[test]
    fn keys_are_case_folded() {
        let mut queue: EventQueue<Log> = EventQueue::new();
        queue.register("Scene_Map", "START", |log: &mut Log, _: &[Value]| {
            log.push("hit".into());
        });

        let mut log = Log::new();
        queue.fire(&mut log, "scene_map", "start", &[]);
        queue.fire(&mut log, "SCENE_MAP", "Start", &[]);
        assert_eq!(log.len(), 2);
        assert_eq!(queue.handler_count("scene_map", "start"), 1);
        assert_eq!(queue.keys().next().unwrap().to_string(), "scene_map.start");
    }

    #[test]
    fn duplicate_registration_runs_twice() {
        let mut queue: EventQueue<u32> = EventQueue::new();
        for _ in 0..2 {
            queue.register("ns", "ev", |count: &mut u32, _: &[Value]| *count += 1);
        }

        let mut count = 0;
        queue.fire(&mut count, "ns", "ev", &[]);
        assert_eq!(count, 2);
    }

    #[test]
    fn fire_only_reaches_matching_key() {
        let mut queue: EventQueue<Log> = EventQueue::new();
        queue.register("a", "x", |log: &mut Log, _: &[Value]| log.push("a.x".into()));
        queue.register("a", "y", |log: &mut Log, _: &[Value]| log.push("a.y".into()));
        queue.register("b", "x", |log: &mut Log, _: &[Value]| log.push("b.x".into()));

        let mut log = Log::new();
        queue.fire(&mut log, "a", "y", &[]);
        assert_eq!(log, vec!["a.y"]);
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn cloned_callbacks_ignore_later_registrations() {
        let mut queue: EventQueue<Log> = EventQueue::new();
        queue.register("ns", "ev", |log: &mut Log, _: &[Value]| log.push("old".into()));

        let snapshot = queue.callbacks(&EventKey::new("NS", "EV")).cloned().unwrap();
        queue.register("ns", "ev", |log: &mut Log, _: &[Value]| log.push("new".into()));

        let mut log = Log::new();
        assert_eq!(snapshot.fire(&mut log, &[]), 1);
        assert_eq!(queue.fire(&mut log, "ns", "ev", &[]), 2);
        assert_eq!(log, vec!["old", "old", "new"]);
    }
}
