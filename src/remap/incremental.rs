// fataar-rs: Android library archive merger
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Decides which compiled units a run must touch.
//!
//! ```text
//! no change set / non-incremental      change set
//!   clear output dir                     Removed   -> delete previous output
//!   every regular file under inputs      Added     -> remap
//!                                        Changed   -> remap
//!                                        Unchanged -> leave output alone
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::utility::fs::walk::{WalkOptions, parallel_walk};

/// Extension of the units the remapper rewrites.
pub const CLASS_EXTENSION: &str = "class";

/// Per-unit status reported by the host's incremental tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    Added,
    Changed,
    Removed,
    Unchanged,
}

/// Input path to change status.
///
/// Serialized as a JSON object: `{"com/lib/A.class": "changed"}`. Paths may
/// be absolute or relative to one of the input directories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeSet {
    entries: BTreeMap<PathBuf, ChangeStatus>,
}

impl ChangeSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `status` for `path`, replacing any earlier status.
    pub fn insert(&mut self, path: impl Into<PathBuf>, status: ChangeStatus) {
        self.entries.insert(path.into(), status);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, ChangeStatus)> {
        self.entries.iter().map(|(p, s)| (p.as_path(), *s))
    }

    /// Parses a JSON change set.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed JSON or unknown statuses.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid change set")
    }

    /// Reads a JSON change set from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read change set {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("in {}", path.display()))
    }
}

/// One compiled unit to rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemapUnit {
    pub source: PathBuf,
    pub output: PathBuf,
}

/// What a run will do.
#[derive(Debug, Default)]
pub struct RemapPlan {
    /// Units to rewrite, sorted by source path.
    pub units: Vec<RemapUnit>,
    /// Previous outputs to delete.
    pub removed: Vec<PathBuf>,
    /// Units whose previous output stays valid.
    pub unchanged: usize,
    /// Inputs that are not compiled units.
    pub skipped: usize,
    /// Whether the output directory is cleared first.
    pub full: bool,
}

/// Builds the plan for one run.
///
/// A full pass happens when `changes` is `None` or empty.
///
/// # Errors
///
/// Returns an error if an input directory cannot be walked.
pub fn plan(input_dirs: &[PathBuf], output_dir: &Path, changes: Option<&ChangeSet>) -> Result<RemapPlan> {
    match changes.filter(|c| !c.is_empty()) {
        None => plan_full(input_dirs, output_dir),
        Some(changes) => Ok(plan_incremental(input_dirs, output_dir, changes)),
    }
}

fn is_class_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == CLASS_EXTENSION)
}

fn plan_full(input_dirs: &[PathBuf], output_dir: &Path) -> Result<RemapPlan> {
    let mut plan = RemapPlan {
        full: true,
        ..RemapPlan::default()
    };

    for input_dir in input_dirs {
        if !input_dir.is_dir() {
            tracing::debug!(dir = %input_dir.display(), "input directory does not exist");
            continue;
        }
        let walk = parallel_walk(input_dir, &WalkOptions::for_build_outputs())
            .with_context(|| format!("failed to scan {}", input_dir.display()))?;

        for source in walk.into_files() {
            if !is_class_file(&source) {
                plan.skipped += 1;
                continue;
            }
            let Ok(relative) = source.strip_prefix(input_dir) else {
                continue;
            };
            let output = output_dir.join(relative);
            plan.units.push(RemapUnit { source, output });
        }
    }

    plan.units.sort_by(|a, b| a.source.cmp(&b.source));
    Ok(plan)
}

/// Splits `path` into an input directory and the path relative to it.
fn locate<'a>(input_dirs: &'a [PathBuf], path: &Path) -> Option<(&'a Path, PathBuf)> {
    if path.is_absolute() {
        return input_dirs.iter().find_map(|dir| {
            path.strip_prefix(dir)
                .ok()
                .map(|relative| (dir.as_path(), relative.to_path_buf()))
        });
    }

    // Relative paths that already name an input directory.
    if let Some(found) = input_dirs.iter().find_map(|dir| {
        path.strip_prefix(dir)
            .ok()
            .map(|relative| (dir.as_path(), relative.to_path_buf()))
    }) {
        return Some(found);
    }

    let existing = input_dirs.iter().find(|dir| dir.join(path).exists());
    existing
        .or_else(|| input_dirs.first())
        .map(|dir| (dir.as_path(), path.to_path_buf()))
}

fn plan_incremental(input_dirs: &[PathBuf], output_dir: &Path, changes: &ChangeSet) -> RemapPlan {
    let mut plan = RemapPlan::default();

    for (path, status) in changes.iter() {
        let Some((input_dir, relative)) = locate(input_dirs, path) else {
            tracing::warn!(path = %path.display(), "changed file is outside every input directory");
            continue;
        };

        match status {
            ChangeStatus::Unchanged => plan.unchanged += 1,
            ChangeStatus::Removed => plan.removed.push(output_dir.join(&relative)),
            ChangeStatus::Added | ChangeStatus::Changed => {
                let source = input_dir.join(&relative);
                if !is_class_file(&source) {
                    plan.skipped += 1;
                } else if source.is_file() {
                    plan.units.push(RemapUnit {
                        source,
                        output: output_dir.join(&relative),
                    });
                } else {
                    tracing::warn!(path = %source.display(), "changed unit no longer exists");
                }
            }
        }
    }

    plan.units.sort_by(|a, b| a.source.cmp(&b.source));
    plan
}
