// fataar-rs: Android library archive merger
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Drives an external manifest merger over the consumer manifest and the
//! manifests of every merged library.
//!
//! ```text
//! primary + secondaries --ManifestMerger::merge--> MergeReport
//!                                                   |        |
//!                                               Merged    Error(report)
//!                                                   |        |
//!                                        write_atomic(out)  fatal, verbatim
//! ```


use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::Context;
use tokio::process::Command;

use crate::archive::ArchiveRecord;
use crate::config::types::ManifestConfig;
use crate::error::{ManifestMergeError, Result};
use crate::logging::PhaseTimer;
use crate::utility::fs::atomic::write_atomic;

/// Outcome reported by a merger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeReport {
    /// The merged document.
    Merged(String),
    /// The merger's own error report.
    Error(String),
}

/// Something that can merge manifests.
pub trait ManifestMerger {
    /// Merges `secondaries` into `primary`.
    ///
    /// # Errors
    ///
    /// Returns an error only when the merger could not be run at all; a
    /// merge that ran and failed is a [`MergeReport::Error`].
    fn merge(
        &self,
        primary: &Path,
        secondaries: &[PathBuf],
    ) -> impl Future<Output = Result<MergeReport>> + Send;
}

/// Runs a merger executable as
/// `<program> [args] --main <primary> --libs <a:b:..> --out <file>`.
#[derive(Debug, Clone)]
pub struct CommandMerger {
    program: String,
    args: Vec<String>,
}

impl CommandMerger {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Builds the merger from `[manifest]`, if one is configured.
    #[must_use]
    pub fn from_config(config: &ManifestConfig) -> Option<Self> {
        config
            .merger
            .as_ref()
            .map(|program| Self::new(program.clone(), config.args.clone()))
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Locates the executable on `PATH`, or takes it as given when it is
    /// an existing path.
    ///
    /// # Errors
    ///
    /// Returns `ManifestMergeError::MergerNotFound` otherwise.
    pub fn resolve(&self) -> std::result::Result<PathBuf, ManifestMergeError> {
        let direct = Path::new(&self.program);
        if direct.components().count() > 1 && direct.is_file() {
            return Ok(direct.to_path_buf());
        }
        which::which(&self.program).map_err(|_| ManifestMergeError::MergerNotFound {
            program: self.program.clone(),
        })
    }
}

impl ManifestMerger for CommandMerger {
    async fn merge(&self, primary: &Path, secondaries: &[PathBuf]) -> Result<MergeReport> {
        let program = self.resolve()?;
        let scratch = tempfile::tempdir().context("failed to create merge directory")?;
        let output = scratch.path().join("AndroidManifest.xml");
        let libs = std::env::join_paths(secondaries).context("invalid library manifest path")?;

        let mut command = Command::new(&program);
        command
            .args(&self.args)
            .arg("--main")
            .arg(primary)
            .arg("--libs")
            .arg(&libs)
            .arg("--out")
            .arg(&output)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        tracing::debug!(
            program = %program.display(),
            main = %primary.display(),
            libs = secondaries.len(),
            "exec"
        );
        let result = command
            .output()
            .await
            .with_context(|| format!("failed to run {}", program.display()))?;

        if result.status.success() && output.is_file() {
            let merged = std::fs::read_to_string(&output)
                .with_context(|| format!("failed to read {}", output.display()))?;
            return Ok(MergeReport::Merged(merged));
        }

        let mut report = String::from_utf8_lossy(&result.stderr).trim_end().to_string();
        let stdout = String::from_utf8_lossy(&result.stdout);
        if report.is_empty() {
            report = stdout.trim_end().to_string();
        }
        if report.is_empty() {
            report = format!("{} exited with {}", self.program, result.status);
        }
        Ok(MergeReport::Error(report))
    }
}

/// Manifests of `libraries` that exist on disk, in dependency order.
#[must_use]
pub fn library_manifests(libraries: &[ArchiveRecord]) -> Vec<PathBuf> {
    libraries
        .iter()
        .map(ArchiveRecord::manifest_path)
        .filter(|path| {
            let exists = path.is_file();
            if !exists {
                tracing::debug!(manifest = %path.display(), "library has no manifest");
            }
            exists
        })
        .collect()
}

/// Merges the library manifests into `primary` and writes `output`.
///
/// # Errors
///
/// Returns `ManifestMergeError::MainManifestMissing` if `primary` does not
/// exist and `ManifestMergeError::MergeFailed` with the merger's report
/// when the merge fails.
pub async fn merge_library_manifests<M: ManifestMerger>(
    merger: &M,
    primary: &Path,
    secondaries: &[PathBuf],
    output: &Path,
) -> Result<()> {
    if !primary.is_file() {
        return Err(ManifestMergeError::MainManifestMissing(primary.display().to_string()).into());
    }

    let timer = PhaseTimer::start("manifest", primary.display().to_string());
    match merger.merge(primary, secondaries).await? {
        MergeReport::Merged(document) => {
            write_atomic(output, document.as_bytes())?;
            tracing::info!(
                output = %output.display(),
                libraries = secondaries.len(),
                "merged library manifests"
            );
            timer.finish();
            Ok(())
        }
        MergeReport::Error(report) => {
            tracing::error!("{report}");
            Err(ManifestMergeError::MergeFailed { report }.into())
        }
    }
}
