//! Event system for plugin extension points.
//!
//! Plugins subscribe callbacks to named events; when an event fires, every
//! callback registered for it runs in registration order. Lifecycle events
//! (init, frame, map setup, variable writes) use dedicated single-key queues.

mod callback;
mod lifecycle;
mod queue;
mod scene;

pub use callback::{CallbackList, fire_snapshot};
pub use lifecycle::{LifecycleQueues, VariableChange, VariableSlot};
pub use queue::{EventCallbacks, EventKey, EventQueue};
pub use scene::{SceneEvent, SceneKind};
