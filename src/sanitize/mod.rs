// fataar-rs: Android library archive merger
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Removes declarations that would break the merged archive.
//!
//! Both operations load the document, edit it in memory and replace the
//! file only when something was removed. A missing file or an empty list
//! does nothing.


use std::collections::BTreeMap;
use std::path::Path;

use crate::error::Result;
use crate::xml::{Document, Element, split_qname};

/// Result of one sanitizer call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SanitizeOutcome {
    /// Nothing to do: file absent, list empty or nothing matched.
    #[default]
    Unchanged,
    /// The listed items were removed and the file rewritten.
    Removed(Vec<String>),
    /// The document could not be read or written; it was left as it was.
    Failed(String),
}

impl SanitizeOutcome {
    /// Number of removed items.
    #[must_use]
    pub fn removed(&self) -> usize {
        match self {
            Self::Removed(items) => items.len(),
            _ => 0,
        }
    }

    fn from_result(path: &Path, what: &str, result: Result<Vec<String>>) -> Self {
        match result {
            Ok(removed) if removed.is_empty() => Self::Unchanged,
            Ok(removed) => {
                tracing::info!(file = %path.display(), removed = ?removed, "removed {what}");
                Self::Removed(removed)
            }
            Err(e) => {
                let message = format!("{e:#}");
                tracing::warn!(file = %path.display(), error = %message, "failed to remove {what}");
                Self::Failed(message)
            }
        }
    }
}

/// Drops top-level `declare-styleable` groups whose name is listed.
pub fn exclude_declare_styleables(file: &Path, names: &[String]) -> SanitizeOutcome {
    if names.is_empty() || !file.is_file() {
        return SanitizeOutcome::Unchanged;
    }
    SanitizeOutcome::from_result(file, "declare-styleable groups", try_exclude_styleables(file, names))
}

fn try_exclude_styleables(file: &Path, names: &[String]) -> Result<Vec<String>> {
    let mut document = Document::load(file)?;
    let removed = document.root_mut().remove_elements_where(|_, element| {
        element.local_name() == "declare-styleable"
            && element
                .attr("name")
                .is_some_and(|name| names.iter().any(|n| *n == name))
    });
    if removed.is_empty() {
        return Ok(Vec::new());
    }
    document.save(file)?;
    Ok(removed
        .iter()
        .filter_map(|group| group.attr("name").map(|n| n.into_owned()))
        .collect())
}

/// Drops attributes of the manifest's `<application>` element.
///
/// Entries are `prefix:local` or plain names. A prefix found in
/// `namespaces` matches any attribute whose own prefix is bound to the
/// same URI in the document; other prefixes match the literal name.
pub fn exclude_application_attrs(
    manifest: &Path,
    attrs: &[String],
    namespaces: &BTreeMap<String, String>,
) -> SanitizeOutcome {
    if attrs.is_empty() || !manifest.is_file() {
        return SanitizeOutcome::Unchanged;
    }
    SanitizeOutcome::from_result(
        manifest,
        "application attributes",
        try_exclude_application_attrs(manifest, attrs, namespaces),
    )
}

fn try_exclude_application_attrs(
    manifest: &Path,
    attrs: &[String],
    namespaces: &BTreeMap<String, String>,
) -> Result<Vec<String>> {
    let mut document = Document::load(manifest)?;
    let root = document.root_mut();
    let mut scope = declared_namespaces(root);
    let Some(application) = root.find_mut("application") else {
        return Ok(Vec::new());
    };
    scope.extend(declared_namespaces(application));

    let mut removed = Vec::new();
    for wanted in attrs {
        let target = match split_qname(wanted) {
            (Some(prefix), local) => namespaces
                .get(prefix)
                .map(|uri| (uri.as_str(), local)),
            (None, _) => None,
        };
        application.remove_attrs_where(|name| {
            let hit = match (target, split_qname(name)) {
                (Some((uri, local)), (Some(prefix), own_local)) => {
                    own_local == local && scope.get(prefix).is_some_and(|bound| bound == uri)
                }
                (Some(_), (None, _)) => false,
                (None, _) => name == wanted.as_str(),
            };
            if hit {
                removed.push(name.to_string());
            }
            hit
        });
    }

    if removed.is_empty() {
        return Ok(Vec::new());
    }
    document.save(manifest)?;
    Ok(removed)
}

/// `xmlns:prefix` bindings declared on `element`.
fn declared_namespaces(element: &Element) -> BTreeMap<String, String> {
    element
        .attributes()
        .filter_map(|(key, _)| {
            let prefix = key.strip_prefix("xmlns:")?;
            let uri = element.attr(key)?;
            Some((prefix.to_string(), uri.into_owned()))
        })
        .collect()
}
