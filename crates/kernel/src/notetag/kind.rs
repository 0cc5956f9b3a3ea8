//! Game-data tables that carry notetags.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A kind of game-data entity whose annotations are indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Actors,
    Classes,
    Skills,
    Items,
    Weapons,
    Armors,
    Enemies,
    States,
    Tilesets,
    /// Notes live in comment commands of each common event's list.
    CommonEvents,
    /// One map's own note, keyed by map id.
    Maps,
    /// Events placed on a map, keyed by (map id, event id).
    MapEvents,
}

impl EntityKind {
    /// Kinds loaded from a single database file each.
    pub const TABLES: [EntityKind; 10] = [
        EntityKind::Actors,
        EntityKind::Classes,
        EntityKind::Skills,
        EntityKind::Items,
        EntityKind::Weapons,
        EntityKind::Armors,
        EntityKind::Enemies,
        EntityKind::States,
        EntityKind::Tilesets,
        EntityKind::CommonEvents,
    ];

    /// Identifier used in queries and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Actors => "actors",
            Self::Classes => "classes",
            Self::Skills => "skills",
            Self::Items => "items",
            Self::Weapons => "weapons",
            Self::Armors => "armors",
            Self::Enemies => "enemies",
            Self::States => "states",
            Self::Tilesets => "tilesets",
            Self::CommonEvents => "commonEvents",
            Self::Maps => "maps",
            Self::MapEvents => "mapEvents",
        }
    }

    /// Database file holding this table, for kinds in [`TABLES`](Self::TABLES).
    pub fn file_name(self) -> Option<&'static str> {
        match self {
            Self::Actors => Some("Actors.json"),
            Self::Classes => Some("Classes.json"),
            Self::Skills => Some("Skills.json"),
            Self::Items => Some("Items.json"),
            Self::Weapons => Some("Weapons.json"),
            Self::Armors => Some("Armors.json"),
            Self::Enemies => Some("Enemies.json"),
            Self::States => Some("States.json"),
            Self::Tilesets => Some("Tilesets.json"),
            Self::CommonEvents => Some("CommonEvents.json"),
            Self::Maps | Self::MapEvents => None,
        }
    }

    /// Whether notes are gathered from event command payloads instead of a
    /// single note field.
    pub fn is_composite(self) -> bool {
        matches!(self, Self::CommonEvents)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognised entity kind name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown entity kind '{0}'")]
pub struct UnknownKind(pub String);

impl FromStr for EntityKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::TABLES
            .iter()
            .chain([Self::Maps, Self::MapEvents].iter())
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}
