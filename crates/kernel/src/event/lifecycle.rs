//! Specialised single-key queues driven by the host's lifecycle.

use std::collections::HashMap;

use super::callback::CallbackList;

/// Numeric game-variable slot.
pub type VariableSlot = u32;

/// Payload for variable-change callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableChange {
    pub slot: VariableSlot,
    pub value: i64,
}

/// The init, frame, map-setup and per-variable queues.
///
/// Gating (init fires once, frame only after init) is enforced by the
/// owner, not here.
pub struct LifecycleQueues<C> {
    pub(crate) init: CallbackList<C, ()>,
    pub(crate) frame: CallbackList<C, ()>,
    pub(crate) map_setup: CallbackList<C, u32>,
    pub(crate) variables: HashMap<VariableSlot, CallbackList<C, VariableChange>>,
}

impl<C> Default for LifecycleQueues<C> {
    fn default() -> Self {
        Self {
            init: CallbackList::new(),
            frame: CallbackList::new(),
            map_setup: CallbackList::new(),
            variables: HashMap::new(),
        }
    }
}

impl<C> std::fmt::Debug for LifecycleQueues<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleQueues")
            .field("init", &self.init.len())
            .field("frame", &self.frame.len())
            .field("map_setup", &self.map_setup.len())
            .field("variables", &self.variables.len())
            .finish()
    }
}

impl<C> LifecycleQueues<C> {
    /// Number of init callbacks.
    pub fn init_count(&self) -> usize {
        self.init.len()
    }

    /// Number of frame callbacks.
    pub fn frame_count(&self) -> usize {
        self.frame.len()
    }

    /// Number of map-setup callbacks.
    pub fn map_setup_count(&self) -> usize {
        self.map_setup.len()
    }

    /// Number of callbacks watching a variable slot.
    pub fn variable_count(&self, slot: VariableSlot) -> usize {
        self.variables.get(&slot).map(|l| l.len()).unwrap_or(0)
    }

    /// True if at least one callback watches `slot`.
    pub fn watches(&self, slot: VariableSlot) -> bool {
        self.variable_count(slot) > 0
    }
}
