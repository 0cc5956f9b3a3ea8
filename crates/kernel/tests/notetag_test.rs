//! Integration tests for notetag indexing over on-disk game data.
//!
//! Fixtures under `tests/fixtures/data` mirror an exported game database:
//! 1-indexed JSON arrays with extra fields the kernel ignores.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::{Path, PathBuf};

use regex::Regex;
use siv_kernel::config::Config;
use siv_kernel::data::{self, Database};
use siv_kernel::notetag::{
    EntityKind, NotetagIndex, NotetagQuery, NotetagRecord, cli, parse_notetags,
};
use siv_test_utils::{sample_database, table, test_record};

fn data_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/data")
}

fn fixture_index() -> NotetagIndex {
    let database = Database::load_dir(&data_dir()).unwrap();
    let mut index = NotetagIndex::new();
    for (kind, table) in database.tables() {
        index.build(kind, table);
    }
    index
}

#[test]
fn loads_only_present_tables() {
    let database = Database::load_dir(&data_dir()).unwrap();
    let kinds: Vec<EntityKind> = database.tables().map(|(kind, _)| kind).collect();

    assert_eq!(
        kinds,
        vec![EntityKind::Actors, EntityKind::Weapons, EntityKind::CommonEvents]
    );
    assert_eq!(database.record(EntityKind::Weapons, 1).unwrap().name, "Sword");
}

#[test]
fn weapon_bonus_lookup() {
    let index = fixture_index();

    let bonus = index.lookup(&NotetagQuery::new(EntityKind::Weapons, 1).named("Bonus"));
    assert_eq!(
        bonus,
        vec![
            &NotetagRecord::new("Bonus", ["atk", "5"]),
            &NotetagRecord::new("Bonus", ["def", "2"]),
        ]
    );
    assert!(index.lookup(&NotetagQuery::new(EntityKind::Weapons, 2)).is_empty());
    assert!(index.lookup(&NotetagQuery::new(EntityKind::Weapons, 3)).is_empty());
    assert_eq!(index.entity_count(EntityKind::Weapons), 2);
}

#[test]
fn windows_line_endings_in_notes() {
    let index = fixture_index();

    let portrait = index.lookup(&NotetagQuery::new(EntityKind::Actors, 1).named("Portrait"));
    assert_eq!(
        portrait,
        vec![&NotetagRecord::new("Portrait", ["hero"]).with_children(["face: Actor1", "index: 0"])]
    );
}

#[test]
fn common_events_read_comment_commands_only() {
    let index = fixture_index();

    let tags = index.lookup(&NotetagQuery::new(EntityKind::CommonEvents, 1));
    assert_eq!(
        tags,
        vec![&NotetagRecord::new("Trigger", ["touch"]).with_children(["switch 4"])]
    );
}

#[test]
fn maps_are_indexed_from_their_files() {
    let map = data::load_map(&data_dir(), 1).unwrap();
    let mut index = NotetagIndex::new();
    assert!(index.index_map(1, &map));

    assert!(index.has(&NotetagQuery::new(EntityKind::Maps, 1).named("Weather")));
    assert_eq!(
        index.lookup(&NotetagQuery::map_event(1, 1)),
        vec![&NotetagRecord::new("Loot", ["potion", "3"])]
    );
    assert!(index.lookup(&NotetagQuery::map_event(1, 3)).is_empty());
    assert_eq!(index.entity_count(EntityKind::MapEvents), 2);
}

#[test]
fn missing_map_file_is_an_io_error() {
    let err = data::load_map(&data_dir(), 42).unwrap_err();
    assert!(err.to_string().contains("Map042.json"));
}

#[test]
fn pattern_matching_over_sample_database() {
    let database = sample_database();
    let mut index = NotetagIndex::new();
    for (kind, table) in database.tables() {
        index.build(kind, table);
    }

    let pattern = Regex::new("^B").unwrap();
    let tags: Vec<&str> = index
        .matching(EntityKind::Weapons, 1, &pattern)
        .iter()
        .map(|t| t.tag.as_str())
        .collect();
    assert_eq!(tags, vec!["Bonus", "Bonus"]);

    assert!(index.has(&NotetagQuery::new(EntityKind::CommonEvents, 1).named("Trigger")));
    assert!(!index.has(&NotetagQuery::new(EntityKind::CommonEvents, 1).named("Ignored")));
}

#[test]
fn sparse_tables_keep_ids_aligned() {
    let mut index = NotetagIndex::new();
    index.build(
        EntityKind::States,
        &table([
            test_record(2, "Poison").with_note("<Tick 5 />"),
            test_record(5, "Sleep").with_note("<WakeOnHit />"),
        ]),
    );

    assert_eq!(index.entity_count(EntityKind::States), 2);
    assert!(index.has(&NotetagQuery::new(EntityKind::States, 5).named("WakeOnHit")));
    assert!(!index.has(&NotetagQuery::new(EntityKind::States, 3)));
}

#[test]
fn dump_runs_the_full_pipeline() {
    let config = Config {
        data_dir: data_dir(),
        ..Config::default()
    };

    let weapons = cli::dump(
        config.clone(),
        &NotetagQuery::new(EntityKind::Weapons, 1).named("Rare"),
    )
    .unwrap();
    assert_eq!(weapons, vec![NotetagRecord::new("Rare", Vec::<String>::new())]);

    let loot = cli::dump(config.clone(), &NotetagQuery::map_event(1, 1)).unwrap();
    assert_eq!(loot[0].tag, "Loot");

    let missing_map_id = cli::dump(config, &NotetagQuery::new(EntityKind::MapEvents, 1));
    assert!(missing_map_id.is_err());
}

#[test]
fn free_text_file_parses_in_order() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/notes.txt");
    let text = std::fs::read_to_string(path).unwrap();

    assert_eq!(
        parse_notetags(&text),
        vec![
            NotetagRecord::new("Price", ["120"]),
            NotetagRecord::new("Dialogue", ["greet"])
                .with_children(["Welcome, traveller!", "Take a look around."]),
        ]
    );
}
