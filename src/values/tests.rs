// fataar-rs: Android library archive merger
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::Path;

use super::{DedupePolicy, StyleAttribute, dedupe_values_file, try_dedupe_values_file};
use crate::xml::{Document, Element};

const THREE_GROUPS: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<resources>
    <declare-styleable name="Toolbar">
        <attr name="colorPrimary" format="color"/>
    </declare-styleable>
    <declare-styleable name="Chip">
        <attr name="colorPrimary" format="color"/>
        <attr name="chipIcon" format="reference"/>
    </declare-styleable>
    <declare-styleable name="Banner">
        <attr name="colorPrimary" format="color"/>
    </declare-styleable>
    <declare-styleable name="Plain">
        <attr name="plainText" format="string"/>
    </declare-styleable>
</resources>
"#;

fn write_values(dir: &Path, text: &str) -> std::path::PathBuf {
    let path = dir.join("values.xml");
    std::fs::write(&path, text).unwrap();
    path
}

fn count_declarations(path: &Path, name: &str) -> usize {
    let doc = Document::load(path).unwrap();
    doc.root()
        .elements()
        .flat_map(Element::elements)
        .filter(|attr| attr.attr("name").as_deref() == Some(name))
        .count()
}

#[test]
fn test_style_attribute_equality_is_name_only() {
    let color = StyleAttribute {
        name: "accent".to_string(),
        format: "color".to_string(),
    };
    let reference = StyleAttribute {
        name: "accent".to_string(),
        format: "reference".to_string(),
    };
    assert_eq!(color, reference);

    let mut attr = Element::new("attr");
    attr.set_attr("name", "accent");
    assert!(StyleAttribute::from_element(&attr).is_none());
    attr.set_attr("format", "color");
    assert_eq!(StyleAttribute::from_element(&attr), Some(color));
}

#[test]
fn test_split_three_way_repeat() {
    let temp = tempfile::tempdir().unwrap();
    let path = write_values(temp.path(), THREE_GROUPS);

    let report = try_dedupe_values_file(&path, DedupePolicy::Split).unwrap();
    assert_eq!(report.repeated, vec!["colorPrimary".to_string()]);
    assert_eq!(report.moved_groups, 3);
    assert_eq!(report.auxiliary.len(), 3);

    assert_eq!(count_declarations(&path, "colorPrimary"), 0);
    insta::assert_snapshot!(std::fs::read_to_string(&path).unwrap(), @r#"
    <?xml version="1.0" encoding="utf-8"?>
    <resources>
        <declare-styleable name="Plain">
            <attr name="plainText" format="string"/>
        </declare-styleable>
    </resources>
    "#);

    let mut total = 0;
    for aux in &report.auxiliary {
        let here = count_declarations(aux, "colorPrimary");
        assert_eq!(here, 1, "{}", aux.display());
        total += here;
    }
    assert_eq!(total, 3);
    assert_eq!(report.auxiliary[0], temp.path().join("values0.xml"));

    insta::assert_snapshot!(std::fs::read_to_string(&report.auxiliary[1]).unwrap(), @r#"
    <?xml version="1.0" encoding="utf-8"?>
    <resources>
        <declare-styleable name="Chip">
            <attr name="colorPrimary" format="color"/>
            <attr name="chipIcon" format="reference"/>
        </declare-styleable>
    </resources>
    "#);
}

#[test]
fn test_split_groups_by_name_in_each_auxiliary() {
    let temp = tempfile::tempdir().unwrap();
    let path = write_values(
        temp.path(),
        r#"<resources>
    <declare-styleable name="A"><attr name="x" format="color"/></declare-styleable>
    <declare-styleable name="B"><attr name="y" format="color"/></declare-styleable>
    <declare-styleable name="C"><attr name="x" format="color"/></declare-styleable>
    <declare-styleable name="D"><attr name="y" format="color"/></declare-styleable>
</resources>
"#,
    );

    let report = try_dedupe_values_file(&path, DedupePolicy::Split).unwrap();
    assert_eq!(report.repeated, vec!["x".to_string(), "y".to_string()]);
    assert_eq!(report.auxiliary.len(), 2);

    let names = |p: &Path| -> Vec<String> {
        Document::load(p)
            .unwrap()
            .root()
            .elements()
            .filter_map(|e| e.attr("name").map(|n| n.into_owned()))
            .collect()
    };
    assert_eq!(names(&report.auxiliary[0]), vec!["A", "B"]);
    assert_eq!(names(&report.auxiliary[1]), vec!["C", "D"]);
}

#[test]
fn test_split_overlapping_groups_can_share_an_auxiliary() {
    let temp = tempfile::tempdir().unwrap();
    let path = write_values(
        temp.path(),
        r#"<resources>
    <declare-styleable name="G1"><attr name="a" format="color"/><attr name="b" format="color"/></declare-styleable>
    <declare-styleable name="G2"><attr name="b" format="color"/></declare-styleable>
    <declare-styleable name="G3"><attr name="a" format="color"/></declare-styleable>
</resources>
"#,
    );

    let report = try_dedupe_values_file(&path, DedupePolicy::Split).unwrap();
    assert_eq!(report.repeated, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(report.moved_groups, 3);
    assert_eq!(report.auxiliary.len(), 2);

    // G1 is listed under "a" only, so it lands next to G2 and "b" is
    // declared twice in the first auxiliary file.
    let first = &report.auxiliary[0];
    assert_eq!(count_declarations(first, "a"), 1);
    assert_eq!(count_declarations(first, "b"), 2);
    let second = &report.auxiliary[1];
    assert_eq!(count_declarations(second, "a"), 1);
    assert_eq!(count_declarations(second, "b"), 0);
}

#[test]
fn test_split_without_repeats_leaves_file_untouched() {
    let temp = tempfile::tempdir().unwrap();
    let text = r#"<resources><declare-styleable name="A"><attr name="x" format="color"/><attr name="x"/></declare-styleable></resources>"#;
    let path = write_values(temp.path(), text);

    let report = try_dedupe_values_file(&path, DedupePolicy::Split).unwrap();
    assert!(!report.changed());
    assert!(!temp.path().join("values0.xml").exists());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), text);
}

#[test]
fn test_split_twice_is_stable() {
    let temp = tempfile::tempdir().unwrap();
    let path = write_values(temp.path(), THREE_GROUPS);

    try_dedupe_values_file(&path, DedupePolicy::Split).unwrap();
    let after_first = std::fs::read_to_string(&path).unwrap();
    let second = try_dedupe_values_file(&path, DedupePolicy::Split).unwrap();
    assert!(!second.changed());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), after_first);
}

#[test]
fn test_strip_format_keeps_first_declaration() {
    let temp = tempfile::tempdir().unwrap();
    let path = write_values(
        temp.path(),
        r#"<resources>
    <attr name="colorPrimary" format="color"/>
    <declare-styleable name="Chip">
        <attr name="colorPrimary" format="color|reference"/>
        <attr name="chipIcon" format="reference"/>
    </declare-styleable>
    <declare-styleable name="Banner">
        <attr name="colorPrimary" format="color"/>
    </declare-styleable>
</resources>
"#,
    );

    let report = try_dedupe_values_file(&path, DedupePolicy::StripFormat).unwrap();
    assert_eq!(report.stripped, 2);
    assert_eq!(report.repeated, vec!["colorPrimary".to_string()]);
    assert!(report.auxiliary.is_empty());

    insta::assert_snapshot!(std::fs::read_to_string(&path).unwrap(), @r#"
    <resources>
        <attr name="colorPrimary" format="color"/>
        <declare-styleable name="Chip">
            <attr name="colorPrimary"/>
            <attr name="chipIcon" format="reference"/>
        </declare-styleable>
        <declare-styleable name="Banner">
            <attr name="colorPrimary"/>
        </declare-styleable>
    </resources>
    "#);

    let again = try_dedupe_values_file(&path, DedupePolicy::StripFormat).unwrap();
    assert!(!again.changed());
}

#[test]
fn test_missing_and_malformed_files_are_no_ops() {
    let temp = tempfile::tempdir().unwrap();
    let missing = temp.path().join("values.xml");
    assert_eq!(dedupe_values_file(&missing, DedupePolicy::Split), super::DedupeReport::default());
    assert!(!missing.exists());

    let path = write_values(temp.path(), "<resources><declare-styleable>");
    assert!(try_dedupe_values_file(&path, DedupePolicy::Split).is_err());
    assert!(!dedupe_values_file(&path, DedupePolicy::Split).changed());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "<resources><declare-styleable>");
}
