// fataar-rs: Android library archive merger
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::atomic::{clear_dir, remove_file_if_exists, write_atomic};
use super::walk::{WalkOptions, find_files, parallel_walk};
use tempfile::TempDir;

fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}

fn relative_names(root: &std::path::Path, paths: &[std::path::PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| {
            p.strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect()
}

#[test]
fn test_parallel_walk() {
    let temp = temp_dir();

    std::fs::create_dir(temp.path().join("subdir")).unwrap();
    std::fs::write(temp.path().join("file1.txt"), "").unwrap();
    std::fs::write(temp.path().join("subdir/file2.txt"), "").unwrap();

    let result = parallel_walk(temp.path(), &WalkOptions::default()).unwrap();

    insta::assert_debug_snapshot!(relative_names(temp.path(), result.files()), @r#"
    [
        "file1.txt",
        "subdir/file2.txt",
    ]
    "#);
    // The root itself is reported alongside `subdir`.
    assert_eq!(result.directories().len(), 2);
    assert_eq!(result.error_count(), 0);
}

#[test]
fn test_build_output_options_include_hidden() {
    let temp = temp_dir();

    std::fs::create_dir(temp.path().join(".hidden")).unwrap();
    std::fs::write(temp.path().join(".hidden/A.class"), "").unwrap();
    std::fs::write(temp.path().join("B.class"), "").unwrap();

    let default_walk = find_files(temp.path(), "**/*.class", &WalkOptions::default()).unwrap();
    assert_eq!(relative_names(temp.path(), &default_walk), vec!["B.class"]);

    let build_walk =
        find_files(temp.path(), "**/*.class", &WalkOptions::for_build_outputs()).unwrap();
    assert_eq!(
        relative_names(temp.path(), &build_walk),
        vec![".hidden/A.class", "B.class"]
    );
}

#[test]
fn test_find_files_sorted() {
    let temp = temp_dir();

    std::fs::write(temp.path().join("b.rs"), "").unwrap();
    std::fs::write(temp.path().join("a.rs"), "").unwrap();
    std::fs::write(temp.path().join("file2.txt"), "").unwrap();
    std::fs::create_dir(temp.path().join("subdir")).unwrap();
    std::fs::write(temp.path().join("subdir/c.rs"), "").unwrap();

    let rust_files = find_files(temp.path(), "**/*.rs", &WalkOptions::default()).unwrap();
    assert_eq!(
        relative_names(temp.path(), &rust_files),
        vec!["a.rs", "b.rs", "subdir/c.rs"]
    );
}

#[test]
fn test_find_files_missing_root() {
    let temp = temp_dir();
    let missing = temp.path().join("nope");
    assert!(find_files(&missing, "**/*", &WalkOptions::default()).is_err());
}

#[test]
fn test_write_atomic_creates_parents_and_replaces() {
    let temp = temp_dir();
    let target = temp.path().join("out/values/values.xml");

    write_atomic(&target, b"first").unwrap();
    write_atomic(&target, b"second").unwrap();

    assert_eq!(std::fs::read(&target).unwrap(), b"second");
    let leftovers = std::fs::read_dir(target.parent().unwrap()).unwrap().count();
    assert_eq!(leftovers, 1);
}

#[test]
fn test_clear_dir_keeps_directory() {
    let temp = temp_dir();
    let dir = temp.path().join("classes");
    std::fs::create_dir_all(dir.join("com/lib")).unwrap();
    std::fs::write(dir.join("com/lib/A.class"), "").unwrap();
    std::fs::write(dir.join("top.txt"), "").unwrap();

    clear_dir(&dir).unwrap();

    assert!(dir.is_dir());
    assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);
    clear_dir(&temp.path().join("missing")).unwrap();
}

#[test]
fn test_remove_file_if_exists() {
    let temp = temp_dir();
    let file = temp.path().join("A.class");
    std::fs::write(&file, "").unwrap();

    assert!(remove_file_if_exists(&file).unwrap());
    assert!(!remove_file_if_exists(&file).unwrap());
}
