//! Integration tests for plugin manifest discovery.
//!
//! Fixtures under `tests/fixtures/plugins` hold one directory per plugin,
//! including a plugin with an invalid manifest and a directory with none.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::{Path, PathBuf};

use siv_kernel::plugin::{PluginError, discover, manifest_path, registry_from_manifests};

fn fixtures(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

#[test]
fn discovers_valid_manifests_in_directory_order() {
    let plugins = discover(&fixtures("plugins")).unwrap();
    let names: Vec<&str> = plugins.iter().map(|p| p.manifest.name.as_str()).collect();

    // `broken` has an empty version and `empty` has no manifest.
    assert_eq!(names, vec!["core", "hud", "loot_tables"]);
    assert_eq!(plugins[2].manifest.requires, vec!["core"]);
    assert!(plugins[1].path.ends_with("hud/hud.info.toml"));
}

#[test]
fn manifest_path_requires_exactly_one_file() {
    assert!(manifest_path(&fixtures("plugins/core")).is_ok());

    let err = manifest_path(&fixtures("plugins/empty")).unwrap_err();
    assert!(err.to_string().contains("no .info.toml"));
}

#[test]
fn manifests_resolve_to_dependency_order() {
    let plugins = discover(&fixtures("plugins")).unwrap();
    let registry = registry_from_manifests(plugins.iter().map(|p| &p.manifest));

    assert_eq!(
        registry.load_order().unwrap(),
        vec!["core", "loot_tables", "hud"]
    );
}

#[test]
fn cyclic_manifests_report_the_cycle() {
    let plugins = discover(&fixtures("plugins_cycle")).unwrap();
    let registry = registry_from_manifests(plugins.iter().map(|p| &p.manifest));

    match registry.load_order() {
        Err(PluginError::CircularDependency { cycle }) => assert_eq!(cycle, "a -> b -> a"),
        other => panic!("expected a cycle, got {other:?}"),
    }
}
