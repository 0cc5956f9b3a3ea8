//! Game database model.
//!
//! Only the fields the kernel reads are modelled; every other key in the
//! JSON files is ignored. Tables are 1-indexed arrays whose slot 0 (and any
//! deleted entry) is `null`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::notetag::EntityKind;

/// Event command code for the first line of a comment.
pub const COMMENT_CODE: u32 = 108;
/// Event command code for continuation lines of a comment.
pub const COMMENT_CONTINUATION_CODE: u32 = 408;

/// Errors loading the database from disk.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// One entry of a database table.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DataRecord {
    pub id: u32,
    pub name: String,
    pub note: String,
    /// Command list; only common events carry one.
    pub list: Vec<EventCommand>,
}

/// A single event command.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EventCommand {
    pub code: u32,
    pub indent: i32,
    pub parameters: Vec<Value>,
}

impl EventCommand {
    /// Comment text carried by this command, if it is a comment line.
    pub fn comment_text(&self) -> Option<&str> {
        match self.code {
            COMMENT_CODE | COMMENT_CONTINUATION_CODE => {
                self.parameters.first().and_then(Value::as_str)
            }
            _ => None,
        }
    }
}

/// A table: slot `n` holds the entity with id `n`.
pub type Table = Vec<Option<DataRecord>>;

/// One map file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Map {
    pub note: String,
    pub events: Vec<Option<MapEvent>>,
}

/// An event placed on a map.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MapEvent {
    pub id: u32,
    pub name: String,
    pub note: String,
}

/// Loaded database tables.
#[derive(Debug, Clone, Default)]
pub struct Database {
    tables: HashMap<EntityKind, Table>,
}

impl Database {
    /// Create an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every known table file found in `dir`.
    ///
    /// Missing files are skipped; unreadable or malformed ones are errors.
    pub fn load_dir(dir: &Path) -> Result<Self, DataError> {
        let mut db = Self::new();
        for kind in EntityKind::TABLES {
            let Some(file_name) = kind.file_name() else {
                continue;
            };
            let path = dir.join(file_name);
            if !path.exists() {
                debug!(path = %path.display(), "database file not present");
                continue;
            }
            let table: Table = read_json(&path)?;
            debug!(kind = %kind, entries = table.len(), "loaded table");
            db.insert(kind, table);
        }
        info!(dir = %dir.display(), tables = db.tables.len(), "database loaded");
        Ok(db)
    }

    /// Replace the table for `kind`.
    pub fn insert(&mut self, kind: EntityKind, table: Table) {
        self.tables.insert(kind, table);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_table(mut self, kind: EntityKind, table: Table) -> Self {
        self.insert(kind, table);
        self
    }

    /// The table for `kind`, if loaded.
    pub fn table(&self, kind: EntityKind) -> Option<&Table> {
        self.tables.get(&kind)
    }

    /// Look up one entity by id.
    pub fn record(&self, kind: EntityKind, id: u32) -> Option<&DataRecord> {
        self.table(kind)?.get(id as usize)?.as_ref()
    }

    /// Loaded tables in a stable order.
    pub fn tables(&self) -> impl Iterator<Item = (EntityKind, &Table)> {
        EntityKind::TABLES
            .into_iter()
            .filter_map(|kind| self.tables.get(&kind).map(|table| (kind, table)))
    }
}

/// File name of map `map_id`, e.g. `Map007.json`.
pub fn map_file_name(map_id: u32) -> String {
    format!("Map{map_id:03}.json")
}

/// Load map `map_id` from `dir`.
pub fn load_map(dir: &Path, map_id: u32) -> Result<Map, DataError> {
    read_json(&dir.join(map_file_name(map_id)))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, DataError> {
    let content = std::fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| DataError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
