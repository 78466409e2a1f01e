// fataar-rs: Android library archive merger
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::Path;
use std::sync::Arc;

use super::{BuildContext, VariantStore};
use crate::archive::{ArchiveRecord, ArtifactDescriptor};
use crate::config::Config;
use crate::error::{ArchiveError, StoreError};
use crate::rtable::RenameTable;

fn record(root: &Path, name: &str) -> ArchiveRecord {
    let descriptor = ArtifactDescriptor::aar("com.lib", name, "1.0").with_root(root.join(name));
    ArchiveRecord::new(descriptor, root, "release").unwrap()
}

fn write_manifest(root: &Path, name: &str, package: &str) {
    let dir = root.join(name);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("AndroidManifest.xml"),
        format!(r#"<manifest package="{package}"/>"#),
    )
    .unwrap();
}

#[test]
fn test_publish_once() {
    let temp = tempfile::tempdir().unwrap();
    let store = VariantStore::new();

    store
        .publish("release", vec![record(temp.path(), "a")])
        .unwrap();
    let err = store
        .publish("release", vec![record(temp.path(), "b"), record(temp.path(), "c")])
        .unwrap_err();

    assert!(matches!(err, StoreError::AlreadyPublished(ref v) if v == "release"));
    assert_eq!(store.libraries("release").unwrap().len(), 1);
}

#[test]
fn test_unknown_variant() {
    let store = VariantStore::new();
    assert!(store.libraries("debug").is_none());
    assert!(store.namespaces("debug").is_none());
    assert!(matches!(
        store.require("debug"),
        Err(StoreError::UnknownVariant(_))
    ));
}

#[test]
fn test_namespaces_in_dependency_order() {
    let temp = tempfile::tempdir().unwrap();
    write_manifest(temp.path(), "b", "com.lib.b");
    write_manifest(temp.path(), "a", "com.lib.a");

    let store = VariantStore::new();
    store
        .publish(
            "release",
            vec![record(temp.path(), "b"), record(temp.path(), "a")],
        )
        .unwrap();

    assert_eq!(
        store.namespaces("release").unwrap().unwrap(),
        vec!["com.lib.b", "com.lib.a"]
    );
    assert_eq!(store.variants(), vec!["release"]);
}

#[test]
fn test_table_for_variant_missing_manifest_is_fatal() {
    let temp = tempfile::tempdir().unwrap();
    let store = VariantStore::new();
    store
        .publish("release", vec![record(temp.path(), "gone")])
        .unwrap();

    let result = RenameTable::for_variant(&store, "release", Some("com.sdk"));
    assert!(matches!(result, Err(ArchiveError::ManifestMissing { .. })));
}

#[test]
fn test_table_for_unpublished_variant_is_absent() {
    let store = VariantStore::new();
    let table = RenameTable::for_variant(&store, "release", Some("com.sdk")).unwrap();
    assert!(table.is_none());
}

#[test]
fn test_context_from_config() {
    let config = Config::parse(
        r#"
[project]
namespace = "com.sdk"
exploded_root = "/tmp/exploded"

[variants.release]
namespace = "com.sdk.release"
dependencies = [
    { group = "com.lib", name = "core", version = "1.0" },
]

[variants.debug]
dependencies = []
"#,
    )
    .unwrap();

    let context = BuildContext::from_config(config).unwrap();
    assert_eq!(context.store().variants(), vec!["debug", "release"]);
    assert_eq!(context.target_namespace("release"), Some("com.sdk.release"));
    assert_eq!(context.target_namespace("debug"), Some("com.sdk"));

    let libraries = context.store().libraries("release").unwrap();
    assert_eq!(
        libraries[0].root(),
        Path::new("/tmp/exploded/com.lib/core/1.0/release")
    );
    assert!(!context.cancel_token().is_cancelled());
    let _shared: Arc<VariantStore> = Arc::clone(context.store());
}

#[test]
fn test_from_config_rejects_jar() {
    let config = Config::parse(
        r#"
[variants.release]
dependencies = [
    { group = "com.lib", name = "util", version = "1.0", kind = "jar" },
]
"#,
    )
    .unwrap();

    assert!(VariantStore::from_config(&config).is_err());
}
