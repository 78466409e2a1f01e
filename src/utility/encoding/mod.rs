// fataar-rs: Android library archive merger
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Document encoding detection and round-tripping.
//!
//! ```text
//! bytes --sniff BOM / <?xml encoding=".."?>--> TextEncoding
//!       --decode--> UTF-8 String --edit--> encode back in the same encoding
//! ```
//!
//! Uses `encoding_rs`. Invalid sequences → U+FFFD. Characters that the
//! target encoding cannot represent are written as numeric character
//! references, which XML parsers accept.

use encoding_rs::{Encoding, UTF_8, UTF_16BE, UTF_16LE};
use regex::bytes::Regex;
use std::sync::OnceLock;

/// Pattern for the `encoding` pseudo-attribute of an XML declaration.
fn declared_encoding() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r#"^<\?xml[^>]*encoding[ \t\r\n]*=[ \t\r\n]*["']([A-Za-z0-9._:-]+)["']"#).ok()
        })
        .as_ref()
}

/// Encoding a document was read with, so it can be written back unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextEncoding {
    encoding: &'static Encoding,
    bom: bool,
}

impl Default for TextEncoding {
    fn default() -> Self {
        Self {
            encoding: UTF_8,
            bom: false,
        }
    }
}

impl TextEncoding {
    /// Detects the encoding of a document from its byte-order mark or its
    /// XML declaration. Falls back to UTF-8.
    #[must_use]
    pub fn sniff(bytes: &[u8]) -> Self {
        if let Some((encoding, _)) = Encoding::for_bom(bytes) {
            return Self {
                encoding,
                bom: true,
            };
        }

        let head = &bytes[..bytes.len().min(256)];
        let encoding = declared_encoding()
            .and_then(|pattern| pattern.captures(head))
            .and_then(|caps| caps.get(1))
            .and_then(|label| Encoding::for_label(label.as_bytes()))
            // A declaration readable as ASCII cannot be UTF-16 without a BOM.
            .filter(|enc| *enc != UTF_16LE && *enc != UTF_16BE)
            .unwrap_or(UTF_8);

        Self {
            encoding,
            bom: false,
        }
    }

    /// Returns the encoding name as registered with WHATWG.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }

    /// Whether the document started with a byte-order mark.
    #[must_use]
    pub const fn has_bom(&self) -> bool {
        self.bom
    }

    /// Decodes `bytes` into UTF-8, skipping the byte-order mark if present.
    #[must_use]
    pub fn decode(&self, bytes: &[u8]) -> String {
        let body = if self.bom {
            Encoding::for_bom(bytes).map_or(bytes, |(_, len)| &bytes[len..])
        } else {
            bytes
        };
        let (text, _had_errors) = self.encoding.decode_without_bom_handling(body);
        text.into_owned()
    }

    /// Encodes `text` back into this encoding, restoring the byte-order mark.
    #[must_use]
    pub fn encode(&self, text: &str) -> Vec<u8> {
        let mut out = Vec::with_capacity(text.len() + 3);
        if self.encoding == UTF_16LE || self.encoding == UTF_16BE {
            let little = self.encoding == UTF_16LE;
            if self.bom {
                out.extend_from_slice(if little { &[0xFF, 0xFE] } else { &[0xFE, 0xFF] });
            }
            for unit in text.encode_utf16() {
                let bytes = if little {
                    unit.to_le_bytes()
                } else {
                    unit.to_be_bytes()
                };
                out.extend_from_slice(&bytes);
            }
            return out;
        }

        if self.bom && self.encoding == UTF_8 {
            out.extend_from_slice(&[0xEF, 0xBB, 0xBF]);
        }
        let (bytes, _, _had_unmappable) = self.encoding.encode(text);
        out.extend_from_slice(&bytes);
        out
    }
}

/// Decodes a document, returning the text and the encoding it used.
#[must_use]
pub fn decode_document(bytes: &[u8]) -> (String, TextEncoding) {
    let encoding = TextEncoding::sniff(bytes);
    (encoding.decode(bytes), encoding)
}

#[cfg(test)]
mod tests;
