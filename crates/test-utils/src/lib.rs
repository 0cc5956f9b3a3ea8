//! Siv test utilities.
//!
//! Helpers for integration testing: game-data builders, a populated sample
//! database, and a shared call recorder for asserting callback order.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;
use siv_kernel::data::{
    COMMENT_CODE, COMMENT_CONTINUATION_CODE, DataRecord, Database, EventCommand, Map, MapEvent,
    Table,
};
use siv_kernel::notetag::EntityKind;

/// Create a test record with default values.
pub fn test_record(id: u32, name: &str) -> TestRecord {
    TestRecord {
        id,
        name: name.to_string(),
        note: String::new(),
        list: Vec::new(),
    }
}

/// A record builder for database table fixtures.
#[derive(Debug, Clone)]
pub struct TestRecord {
    pub id: u32,
    pub name: String,
    pub note: String,
    pub list: Vec<EventCommand>,
}

impl TestRecord {
    /// Set the note text.
    pub fn with_note(mut self, note: &str) -> Self {
        self.note = note.to_string();
        self
    }

    /// Append a comment block (one 108 command, then 408 continuations).
    pub fn with_comment(mut self, lines: &[&str]) -> Self {
        self.list.extend(comment_commands(lines));
        self
    }

    /// Append an arbitrary event command.
    pub fn with_command(mut self, code: u32, text: &str) -> Self {
        self.list.push(EventCommand {
            code,
            indent: 0,
            parameters: vec![json!(text)],
        });
        self
    }

    /// Convert to the kernel's record type.
    pub fn build(self) -> DataRecord {
        DataRecord {
            id: self.id,
            name: self.name,
            note: self.note,
            list: self.list,
        }
    }
}

/// Comment commands for `lines`: the first uses code 108, the rest 408.
pub fn comment_commands(lines: &[&str]) -> Vec<EventCommand> {
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| EventCommand {
            code: if i == 0 {
                COMMENT_CODE
            } else {
                COMMENT_CONTINUATION_CODE
            },
            indent: 0,
            parameters: vec![json!(line)],
        })
        .collect()
}

/// Lay records out as a table: slot `n` holds the record with id `n`,
/// every other slot (including 0) is empty.
pub fn table(records: impl IntoIterator<Item = TestRecord>) -> Table {
    let mut table: Table = vec![None];
    for record in records {
        let slot = record.id as usize;
        if table.len() <= slot {
            table.resize(slot + 1, None);
        }
        table[slot] = Some(record.build());
    }
    table
}

/// Create a test map with the given note.
pub fn test_map(note: &str) -> TestMap {
    TestMap {
        note: note.to_string(),
        events: Vec::new(),
    }
}

/// A map builder.
#[derive(Debug, Clone)]
pub struct TestMap {
    pub note: String,
    pub events: Vec<MapEvent>,
}

impl TestMap {
    /// Place an event on the map.
    pub fn with_event(mut self, id: u32, name: &str, note: &str) -> Self {
        self.events.push(MapEvent {
            id,
            name: name.to_string(),
            note: note.to_string(),
        });
        self
    }

    /// Convert to the kernel's map type, events laid out by id.
    pub fn build(self) -> Map {
        let mut events: Vec<Option<MapEvent>> = vec![None];
        for event in self.events {
            let slot = event.id as usize;
            if events.len() <= slot {
                events.resize(slot + 1, None);
            }
            events[slot] = Some(event);
        }
        Map {
            note: self.note,
            events,
        }
    }
}

/// A small database covering plain and composite tables.
///
/// - weapons 1 "Sword": two `Bonus` tags and a `Rare` tag
/// - weapons 2 "Club": no tags
/// - actors 1 "Harold": a multi-line `Portrait` tag
/// - commonEvents 1 "Chest": a `Trigger` block written as comments
pub fn sample_database() -> Database {
    Database::new()
        .with_table(
            EntityKind::Weapons,
            table([
                test_record(1, "Sword").with_note("<Bonus atk 5 />\n<Rare />\n<Bonus def 2 />"),
                test_record(2, "Club").with_note("A heavy stick."),
            ]),
        )
        .with_table(
            EntityKind::Actors,
            table([test_record(1, "Harold")
                .with_note("<Portrait hero>\nface: Actor1\nindex: 0\n/>")]),
        )
        .with_table(
            EntityKind::CommonEvents,
            table([test_record(1, "Chest")
                .with_command(101, "<Ignored />")
                .with_comment(&["<Trigger touch>", "switch 4", "/>"])]),
        )
}

/// Shared, cloneable log of calls made by callbacks.
#[derive(Debug, Clone, Default)]
pub struct CallRecorder {
    calls: Rc<RefCell<Vec<String>>>,
}

impl CallRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one call.
    pub fn record(&self, call: impl Into<String>) {
        self.calls.borrow_mut().push(call.into());
    }

    /// Everything recorded so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Forget recorded calls.
    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }
}
