//! CLI command implementations for inspecting notetags.

use std::path::Path;

use anyhow::{Context, Result};

use super::{EntityKind, NotetagQuery, NotetagRecord, parse_notetags};
use crate::config::Config;
use crate::data::{self, Database};
use crate::kernel::Kernel;

/// Parse a text file and print its notetags as JSON.
pub fn cmd_notetags_parse(file: &Path) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    print_json(&parse_notetags(&text))
}

/// Load the game database and print one entity's notetags as JSON.
pub fn cmd_notetags_dump(config: Config, query: &NotetagQuery) -> Result<()> {
    let records = dump(config, query)?;
    print_json(&records)
}

/// Index the database the way a running game would and run `query`.
///
/// Map queries load the relevant map file first.
pub fn dump(config: Config, query: &NotetagQuery) -> Result<Vec<NotetagRecord>> {
    let data_dir = config.data_dir.clone();
    let database = Database::load_dir(&data_dir)
        .with_context(|| format!("failed to load game data from {}", data_dir.display()))?;

    let mut kernel = Kernel::new(config);
    kernel.database_ready(&database)?;

    let map_id = match query.kind {
        EntityKind::Maps => Some(query.id),
        EntityKind::MapEvents => Some(
            query
                .map_id
                .context("--map-id is required for mapEvents")?,
        ),
        _ => None,
    };
    if let Some(map_id) = map_id {
        let map = data::load_map(&data_dir, map_id)?;
        kernel.map_setup(map_id, &map);
    }

    Ok(kernel.notetags(query).into_iter().cloned().collect())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize notetags")?;
    println!("{json}");
    Ok(())
}
