//! Per-entity notetag index.

use std::collections::{HashMap, HashSet};

use regex::Regex;
use tracing::{debug, warn};

use super::kind::EntityKind;
use super::parser::{NotetagRecord, parse_notetags};
use crate::data::{DataRecord, Map};

/// Point query against the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotetagQuery {
    pub kind: EntityKind,
    pub id: u32,
    /// Required for [`EntityKind::MapEvents`], ignored otherwise.
    pub map_id: Option<u32>,
    /// Only records with exactly this tag name.
    pub name: Option<String>,
}

impl NotetagQuery {
    pub fn new(kind: EntityKind, id: u32) -> Self {
        Self {
            kind,
            id,
            map_id: None,
            name: None,
        }
    }

    /// Query an event placed on a map.
    pub fn map_event(map_id: u32, event_id: u32) -> Self {
        Self {
            map_id: Some(map_id),
            ..Self::new(EntityKind::MapEvents, event_id)
        }
    }

    /// Restrict results to one tag name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

type Entries = HashMap<u32, Vec<NotetagRecord>>;

/// Parsed notetags for every indexed entity.
#[derive(Debug, Default)]
pub struct NotetagIndex {
    tables: HashMap<EntityKind, Entries>,
    map_events: HashMap<(u32, u32), Vec<NotetagRecord>>,
    indexed_maps: HashSet<u32>,
}

impl NotetagIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a table, replacing whatever was indexed for `kind` before.
    ///
    /// Slot `n` is entity id `n`; slot 0 and empty slots are skipped. Every
    /// present entity gets an entry, even when it has no notetags. Returns
    /// the number of entities indexed.
    pub fn build(&mut self, kind: EntityKind, entities: &[Option<DataRecord>]) -> usize {
        if kind == EntityKind::MapEvents {
            warn!(kind = %kind, "map events are indexed per map, ignoring table build");
            return 0;
        }

        let entries: Entries = entities
            .iter()
            .enumerate()
            .skip(1)
            .filter_map(|(slot, entity)| {
                let entity = entity.as_ref()?;
                let id = u32::try_from(slot).ok()?;
                Some((id, parse_notetags(&note_text(kind, entity))))
            })
            .collect();

        let count = entries.len();
        debug!(kind = %kind, entities = count, "indexed notetags");
        self.tables.insert(kind, entries);
        count
    }

    /// Index a map's own note and its events' notes.
    ///
    /// Each map id is indexed once; returns `false` when `map_id` was
    /// already cached.
    pub fn index_map(&mut self, map_id: u32, map: &Map) -> bool {
        if !self.indexed_maps.insert(map_id) {
            return false;
        }

        self.tables
            .entry(EntityKind::Maps)
            .or_default()
            .insert(map_id, parse_notetags(&map.note));

        let mut events = 0;
        for event in map.events.iter().flatten() {
            self.map_events
                .insert((map_id, event.id), parse_notetags(&event.note));
            events += 1;
        }
        debug!(map_id, events, "indexed map notetags");
        true
    }

    /// True once `map_id` has been indexed.
    pub fn is_map_indexed(&self, map_id: u32) -> bool {
        self.indexed_maps.contains(&map_id)
    }

    /// Records for one entity, optionally filtered by tag name.
    ///
    /// Unknown entities (and map-event queries without a map id) yield an
    /// empty list.
    pub fn lookup(&self, query: &NotetagQuery) -> Vec<&NotetagRecord> {
        self.records(query)
            .iter()
            .filter(|record| query.name.as_deref().is_none_or(|name| record.tag == name))
            .collect()
    }

    /// Records for one entity whose tag name matches `pattern`.
    pub fn matching(&self, kind: EntityKind, id: u32, pattern: &Regex) -> Vec<&NotetagRecord> {
        self.entity(kind, id)
            .iter()
            .filter(|record| pattern.is_match(&record.tag))
            .collect()
    }

    /// True if `lookup` would return anything.
    pub fn has(&self, query: &NotetagQuery) -> bool {
        !self.lookup(query).is_empty()
    }

    /// Number of indexed entities of `kind`.
    pub fn entity_count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::MapEvents => self.map_events.len(),
            _ => self.tables.get(&kind).map_or(0, HashMap::len),
        }
    }

    fn records(&self, query: &NotetagQuery) -> &[NotetagRecord] {
        match (query.kind, query.map_id) {
            (EntityKind::MapEvents, Some(map_id)) => self
                .map_events
                .get(&(map_id, query.id))
                .map(Vec::as_slice)
                .unwrap_or_default(),
            (EntityKind::MapEvents, None) => &[],
            (kind, _) => self.entity(kind, query.id),
        }
    }

    fn entity(&self, kind: EntityKind, id: u32) -> &[NotetagRecord] {
        self.tables
            .get(&kind)
            .and_then(|entries| entries.get(&id))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

fn note_text(kind: EntityKind, entity: &DataRecord) -> String {
    if kind.is_composite() {
        entity
            .list
            .iter()
            .filter_map(|command| command.comment_text())
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        entity.note.clone()
    }
}
