// fataar-rs: Android library archive merger
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{TextEncoding, decode_document};

#[test]
fn test_plain_utf8_defaults() {
    let (text, encoding) = decode_document(b"<resources/>");
    assert_eq!(text, "<resources/>");
    assert_eq!(encoding.name(), "UTF-8");
    assert!(!encoding.has_bom());
}

#[test]
fn test_utf8_bom_is_stripped_and_restored() {
    let bytes = b"\xEF\xBB\xBF<manifest/>";
    let (text, encoding) = decode_document(bytes);
    assert_eq!(text, "<manifest/>");
    assert!(encoding.has_bom());
    assert_eq!(encoding.encode(&text), bytes.to_vec());
}

#[test]
fn test_utf16le_round_trip() {
    let source = "<resources>\u{e9}</resources>";
    let mut bytes = vec![0xFF, 0xFE];
    for unit in source.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }

    let (text, encoding) = decode_document(&bytes);
    assert_eq!(text, source);
    assert_eq!(encoding.name(), "UTF-16LE");
    assert_eq!(encoding.encode(&text), bytes);
}

#[test]
fn test_declared_latin1_encoding() {
    let bytes = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><a>caf\xe9</a>";
    let (text, encoding) = decode_document(bytes);
    assert!(text.ends_with("<a>caf\u{e9}</a>"));
    // WHATWG maps ISO-8859-1 to windows-1252.
    assert_eq!(encoding.name(), "windows-1252");
    assert_eq!(encoding.encode(&text), bytes.to_vec());
}

#[test]
fn test_default_is_utf8_without_bom() {
    let encoding = TextEncoding::default();
    assert_eq!(encoding.encode("x"), b"x".to_vec());
}
