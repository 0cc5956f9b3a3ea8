//! Plugin commands: named handlers invoked from game events.
//!
//! One handler per command name; registering a name again replaces the
//! previous handler.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, error};

use crate::scope::Scope;

/// Handles one plugin command.
///
/// Handlers take `&self` because a command may be dispatched again while it
/// is still running; keep mutable state in a `Cell` or in the scope's
/// resources.
pub trait CommandHandler {
    fn handle(&self, scope: &mut Scope, command: &str, args: &[String]) -> anyhow::Result<()>;
}

impl<F> CommandHandler for F
where
    F: Fn(&mut Scope, &str, &[String]) -> anyhow::Result<()>,
{
    fn handle(&self, scope: &mut Scope, command: &str, args: &[String]) -> anyhow::Result<()> {
        self(scope, command, args)
    }
}

/// A command handler returned an error.
#[derive(Debug, thiserror::Error)]
#[error("plugin command '{command}' failed: {source}")]
pub struct CommandError {
    pub command: String,
    #[source]
    pub source: anyhow::Error,
}

/// Command name to handler map.
#[derive(Default)]
pub struct CommandRegistry {
    handlers: HashMap<String, Rc<dyn CommandHandler>>,
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("CommandRegistry")
            .field("commands", &names)
            .finish()
    }
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `command`, replacing any existing handler.
    pub fn register<H>(&mut self, command: &str, handler: H)
    where
        H: CommandHandler + 'static,
    {
        if self
            .handlers
            .insert(command.to_string(), Rc::new(handler))
            .is_some()
        {
            debug!(command, "replaced plugin command handler");
        } else {
            debug!(command, "registered plugin command");
        }
    }

    /// Run the handler for `command` against `scope`.
    ///
    /// The handler stays registered while it runs, so it may dispatch
    /// commands (itself included) or replace itself. Returns `Ok(false)`
    /// when no handler is registered.
    pub fn dispatch(scope: &mut Scope, command: &str, args: &[String]) -> Result<bool, CommandError> {
        let Some(handler) = scope.commands().handlers.get(command).cloned() else {
            debug!(command, "ignoring unknown plugin command");
            return Ok(false);
        };

        handler.handle(scope, command, args).map(|()| true).map_err(|source| {
            error!(command, error = %source, "plugin command failed");
            CommandError {
                command: command.to_string(),
                source,
            }
        })
    }

    /// True if a handler is registered for `command`.
    pub fn contains(&self, command: &str) -> bool {
        self.handlers.contains_key(command)
    }

    /// Registered command names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
