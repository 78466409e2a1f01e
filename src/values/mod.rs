// fataar-rs: Android library archive merger
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Resolves attribute declarations that collide after resource trees are
//! merged into one `values.xml`.
//!
//! ```text
//! Split (default)
//!   values.xml  --find repeated <attr name format>-->  groups to move
//!       |                                                |
//!       v                                                v
//!   values.xml (groups removed)        values0.xml  values1.xml  ...
//!                                      one group per repeated name per file
//!
//! StripFormat
//!   2nd+ <attr name="x" format=".."> --> <attr name="x">
//! ```

#[cfg(test)]
mod tests;

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::archive::ArchiveRecord;
use crate::error::Result;
use crate::xml::{Document, Element};

const DECLARE_STYLEABLE: &str = "declare-styleable";
const ATTR: &str = "attr";
const AUXILIARY_INDENT: &str = "    ";

/// How repeated attribute declarations are resolved.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum DedupePolicy {
    /// Move every group declaring a repeated attribute into indexed
    /// sibling documents.
    #[default]
    Split,
    /// Keep all groups and drop `format` from later declarations.
    StripFormat,
}

impl fmt::Display for DedupePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Split => f.write_str("split"),
            Self::StripFormat => f.write_str("strip-format"),
        }
    }
}

/// One declared `<attr name=".." format="..">`.
///
/// Two declarations are the same attribute when their names match; the
/// format is carried along but does not take part in equality.
#[derive(Debug, Clone, Eq)]
pub struct StyleAttribute {
    pub name: String,
    pub format: String,
}

impl StyleAttribute {
    /// Reads an `<attr>` element; `None` unless it has both a name and a format.
    #[must_use]
    pub fn from_element(element: &Element) -> Option<Self> {
        if element.local_name() != ATTR {
            return None;
        }
        Some(Self {
            name: element.attr("name")?.into_owned(),
            format: element.attr("format")?.into_owned(),
        })
    }
}

impl PartialEq for StyleAttribute {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Hash for StyleAttribute {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

/// What a deduplication pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DedupeReport {
    /// Repeated attribute names, in first-seen order.
    pub repeated: Vec<String>,
    /// Groups moved out of the main document.
    pub moved_groups: usize,
    /// Indexed sibling documents written.
    pub auxiliary: Vec<PathBuf>,
    /// `format` attributes stripped.
    pub stripped: usize,
}

impl DedupeReport {
    /// Whether any file was modified.
    #[must_use]
    pub const fn changed(&self) -> bool {
        self.moved_groups > 0 || self.stripped > 0
    }
}

/// Deduplicates `res/values/values.xml` of an exploded archive.
pub fn dedupe_archive(record: &ArchiveRecord, policy: DedupePolicy) -> DedupeReport {
    dedupe_values_file(&record.values_file(), policy)
}

/// Deduplicates the values document at `path`.
///
/// Never fails: a missing file is a no-op, and read or write errors are
/// logged and leave the document as it was.
pub fn dedupe_values_file(path: &Path, policy: DedupePolicy) -> DedupeReport {
    match try_dedupe_values_file(path, policy) {
        Ok(report) => report,
        Err(e) => {
            tracing::warn!(file = %path.display(), error = %format!("{e:#}"), "failed to deduplicate attributes");
            DedupeReport::default()
        }
    }
}

/// Fallible core of [`dedupe_values_file`].
///
/// # Errors
///
/// Returns an error if the document cannot be parsed or written.
pub fn try_dedupe_values_file(path: &Path, policy: DedupePolicy) -> Result<DedupeReport> {
    if !path.is_file() {
        tracing::debug!(file = %path.display(), "values document does not exist");
        return Ok(DedupeReport::default());
    }

    let mut document = Document::load(path)?;
    let report = match policy {
        DedupePolicy::Split => split_repeated(&mut document, path)?,
        DedupePolicy::StripFormat => strip_repeated_formats(&mut document),
    };

    if policy == DedupePolicy::StripFormat && report.changed() {
        document.save(path)?;
    }

    if report.changed() {
        tracing::info!(
            file = %path.display(),
            %policy,
            repeated = report.repeated.len(),
            moved = report.moved_groups,
            stripped = report.stripped,
            "deduplicated attribute declarations"
        );
    }
    Ok(report)
}

fn is_group(element: &Element) -> bool {
    element.local_name() == DECLARE_STYLEABLE
}

fn split_repeated(document: &mut Document, path: &Path) -> Result<DedupeReport> {
    let root = document.root_mut();

    // Attributes declared more than once across all groups.
    let mut seen: HashSet<StyleAttribute> = HashSet::new();
    let mut repeated: HashSet<String> = HashSet::new();
    for group in root.elements().filter(|e| is_group(e)) {
        for attribute in group.elements().filter_map(StyleAttribute::from_element) {
            if !seen.insert(attribute.clone()) {
                repeated.insert(attribute.name);
            }
        }
    }
    if repeated.is_empty() {
        return Ok(DedupeReport::default());
    }

    // Positions of the groups to move, listed under the first repeated
    // name each group declares. A group is collected once, so a group that
    // also declares a later repeated name can share an auxiliary file with
    // another declaration of that name.
    let mut lists: Vec<(String, Vec<usize>)> = Vec::new();
    let mut moved: HashSet<usize> = HashSet::new();
    for (position, group) in root.elements().enumerate() {
        if !is_group(group) || moved.contains(&position) {
            continue;
        }
        let first_repeated = group
            .elements()
            .filter_map(StyleAttribute::from_element)
            .find(|attribute| repeated.contains(&attribute.name));
        let Some(attribute) = first_repeated else {
            continue;
        };
        moved.insert(position);
        match lists.iter_mut().find(|(name, _)| *name == attribute.name) {
            Some((_, positions)) => positions.push(position),
            None => {
                tracing::debug!(attr = %attribute.name, "splitting repeated attribute");
                lists.push((attribute.name, vec![position]));
            }
        }
    }

    let removed = root.remove_elements_where(|position, _| moved.contains(&position));
    let mut sorted: Vec<usize> = moved.iter().copied().collect();
    sorted.sort_unstable();
    let groups: HashMap<usize, Element> = sorted.into_iter().zip(removed).collect();

    document.save(path)?;

    let directory = path.parent().unwrap_or_else(|| Path::new("."));
    let max_len = lists.iter().map(|(_, p)| p.len()).max().unwrap_or(0);
    let mut auxiliary = Vec::with_capacity(max_len);
    for index in 0..max_len {
        let mut aux = Document::with_root("resources");
        for (_, positions) in &lists {
            if let Some(group) = positions.get(index).and_then(|p| groups.get(p)) {
                aux.root_mut().push_element(group.clone(), AUXILIARY_INDENT);
            }
        }
        let aux_path = directory.join(format!("values{index}.xml"));
        aux.save(&aux_path)?;
        tracing::debug!(file = %aux_path.display(), "wrote split attribute groups");
        auxiliary.push(aux_path);
    }

    Ok(DedupeReport {
        repeated: lists.into_iter().map(|(name, _)| name).collect(),
        moved_groups: groups.len(),
        auxiliary,
        stripped: 0,
    })
}

fn strip_repeated_formats(document: &mut Document) -> DedupeReport {
    let mut seen: HashSet<StyleAttribute> = HashSet::new();
    let mut repeated: Vec<String> = Vec::new();
    let mut stripped = 0;

    let mut visit = |attr: &mut Element| {
        let Some(attribute) = StyleAttribute::from_element(attr) else {
            return;
        };
        if seen.contains(&attribute) {
            attr.remove_attr("format");
            stripped += 1;
            if !repeated.contains(&attribute.name) {
                repeated.push(attribute.name);
            }
        } else {
            seen.insert(attribute);
        }
    };

    let root = document.root_mut();
    for attr in root.elements_mut().filter(|e| e.local_name() == ATTR) {
        visit(attr);
    }
    for group in root.elements_mut().filter(|e| is_group(e)) {
        for attr in group.elements_mut() {
            visit(attr);
        }
    }

    DedupeReport {
        repeated,
        moved_groups: 0,
        auxiliary: Vec::new(),
        stripped,
    }
}
