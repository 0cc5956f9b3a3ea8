//! Siv plugin kernel.
//!
//! Hosts game plugins: orders and runs their one-shot bodies, indexes
//! notetags from game data, and dispatches lifecycle events, scene events
//! and plugin commands to the callbacks plugins register on the [`Scope`].
//! The `siv` binary exposes offline tooling over the same library.

pub mod command;
pub mod config;
pub mod data;
pub mod event;
pub mod kernel;
pub mod notetag;
pub mod plugin;
pub mod scope;

pub use command::{CommandError, CommandHandler, CommandRegistry};
pub use config::Config;
pub use kernel::Kernel;
pub use scope::{Resources, Scope};
