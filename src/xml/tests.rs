// fataar-rs: Android library archive merger
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::Path;

use super::{Document, Element, split_qname};

const VALUES: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!-- merged -->
<resources xmlns:tools="http://schemas.android.com/tools">
    <string name="greeting">Tom &amp; Jerry</string>
    <declare-styleable name="Chip">
        <attr name="chipColor" format="color"/>
    </declare-styleable>
    <declare-styleable name="Card"></declare-styleable>
</resources>
"#;

fn parse(text: &str) -> Document {
    Document::parse(text.as_bytes(), Path::new("values.xml")).unwrap()
}

#[test]
fn test_unmodified_document_round_trips() {
    let doc = parse(VALUES);
    assert_eq!(doc.to_xml_string().unwrap(), VALUES);
}

#[test]
fn test_attribute_lookup_unescapes() {
    let doc = parse(r#"<a label="x &amp; y" tools:ignore="All"/>"#);
    let root = doc.root();
    assert_eq!(root.attr("label").as_deref(), Some("x & y"));
    assert_eq!(root.raw_attr("label"), Some("x &amp; y"));
    assert_eq!(root.attr("tools:ignore").as_deref(), Some("All"));
    assert!(root.attr("ignore").is_none());
}

#[test]
fn test_remove_elements_drops_leading_whitespace() {
    let mut doc = parse(VALUES);
    let removed = doc
        .root_mut()
        .remove_elements_where(|_, e| e.name() == "declare-styleable");

    assert_eq!(removed.len(), 2);
    insta::assert_snapshot!(doc.to_xml_string().unwrap(), @r#"
    <?xml version="1.0" encoding="utf-8"?>
    <!-- merged -->
    <resources xmlns:tools="http://schemas.android.com/tools">
        <string name="greeting">Tom &amp; Jerry</string>
    </resources>
    "#);
}

#[test]
fn test_push_element_into_new_document() {
    let mut doc = Document::with_root("resources");
    let mut group = Element::new("declare-styleable");
    group.set_attr("name", "Chip");
    doc.root_mut().push_element(group.clone(), "    ");
    group.set_attr("name", "Card");
    doc.root_mut().push_element(group, "    ");

    insta::assert_snapshot!(doc.to_xml_string().unwrap(), @r#"
    <?xml version="1.0" encoding="utf-8"?>
    <resources>
        <declare-styleable name="Chip"/>
        <declare-styleable name="Card"/>
    </resources>
    "#);
}

#[test]
fn test_remove_attr_and_set_attr() {
    let mut element = Element::new("application");
    element.set_attr("android:label", "A<B");
    assert_eq!(element.raw_attr("android:label"), Some("A&lt;B"));
    assert!(element.remove_attr("android:label"));
    assert!(!element.remove_attr("android:label"));
}

#[test]
fn test_parse_errors() {
    assert!(Document::parse(b"<a><b></a>", Path::new("x.xml")).is_err());
    assert!(Document::parse(b"<!-- only a comment -->", Path::new("x.xml")).is_err());
    assert!(Document::parse(b"<a/><b/>", Path::new("x.xml")).is_err());
}

#[test]
fn test_utf16_document_saved_in_same_encoding() {
    let text = "<?xml version=\"1.0\" encoding=\"utf-16\"?><resources><string name=\"x\">é</string></resources>";
    let mut bytes = vec![0xFF, 0xFE];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }

    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("values.xml");
    std::fs::write(&path, &bytes).unwrap();

    let doc = Document::load(&path).unwrap();
    assert_eq!(doc.root().find("string").and_then(|e| e.attr("name")).as_deref(), Some("x"));
    doc.save(&path).unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), bytes);
}

#[test]
fn test_split_qname() {
    assert_eq!(split_qname("android:name"), (Some("android"), "name"));
    assert_eq!(split_qname("name"), (None, "name"));
}
