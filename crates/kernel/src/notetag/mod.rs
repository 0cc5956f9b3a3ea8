//! Notetags: structured annotations embedded in game-data notes.

pub mod cli;
mod index;
mod kind;
mod parser;

pub use index::{NotetagIndex, NotetagQuery};
pub use kind::{EntityKind, UnknownKind};
pub use parser::{NotetagRecord, parse_notetags};
