// fataar-rs: Android library archive merger
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::Result;
use bon::Builder;
use flume::bounded;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::warn;

/// Options for parallel directory traversal.
#[derive(Debug, Clone, Builder)]
pub struct WalkOptions {
    /// Maximum depth to traverse (None = unlimited)
    #[builder(setters(name = with_max_depth))]
    max_depth: Option<usize>,
    /// Include hidden files/directories
    #[builder(setters(name = with_include_hidden), default = false)]
    include_hidden: bool,
    /// Respect .gitignore files
    #[builder(setters(name = with_respect_gitignore), default = true)]
    respect_gitignore: bool,
    /// Number of threads (None = auto-detect based on CPU count)
    #[builder(setters(name = with_threads))]
    threads: Option<usize>,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl WalkOptions {
    /// Returns the maximum depth to traverse.
    #[must_use]
    pub const fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Returns whether to include hidden files/directories.
    #[must_use]
    pub const fn include_hidden(&self) -> bool {
        self.include_hidden
    }

    /// Returns whether to respect .gitignore files.
    #[must_use]
    pub const fn respect_gitignore(&self) -> bool {
        self.respect_gitignore
    }

    /// Returns the number of threads (None = auto-detect).
    #[must_use]
    pub const fn threads(&self) -> Option<usize> {
        self.threads
    }

    /// Options for scanning build intermediates.
    ///
    /// Build output directories are usually gitignored and may contain
    /// dot-prefixed entries, so neither filter applies.
    #[must_use]
    pub fn for_build_outputs() -> Self {
        Self::builder()
            .with_include_hidden(true)
            .with_respect_gitignore(false)
            .build()
    }
}

/// Result of a parallel walk operation.
#[derive(Debug)]
pub struct WalkResult {
    files: Vec<PathBuf>,
    directories: Vec<PathBuf>,
    error_count: usize,
}

impl WalkResult {
    /// Returns the files found during traversal, sorted.
    #[must_use]
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Returns the directories found during traversal, sorted.
    #[must_use]
    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }

    /// Returns the number of errors encountered.
    #[must_use]
    pub const fn error_count(&self) -> usize {
        self.error_count
    }

    /// Consumes the result, returning only the files.
    #[must_use]
    pub fn into_files(self) -> Vec<PathBuf> {
        self.files
    }
}

enum Found {
    File(PathBuf),
    Dir(PathBuf),
}

fn build_walker(root: &Path, options: &WalkOptions) -> WalkBuilder {
    let mut builder = WalkBuilder::new(root);

    if let Some(depth) = options.max_depth() {
        builder.max_depth(Some(depth));
    }

    builder.follow_links(false);
    builder.hidden(!options.include_hidden());

    builder.git_ignore(options.respect_gitignore());
    builder.git_global(options.respect_gitignore());
    builder.git_exclude(options.respect_gitignore());
    builder.ignore(options.respect_gitignore());
    builder.parents(options.respect_gitignore());

    if let Some(threads) = options.threads() {
        builder.threads(threads);
    }

    builder
}

/// Performs parallel directory traversal using `ignore::WalkParallel`.
///
/// Results are collected through bounded flume channels and sorted, so the
/// output order does not depend on thread scheduling.
///
/// # Errors
///
/// Returns an error if the root directory does not exist.
///
/// # Example
/// ```no_run
/// use fataar_rs::utility::fs::walk::{parallel_walk, WalkOptions};
///
/// let result = parallel_walk("build/intermediates", &WalkOptions::for_build_outputs())?;
/// println!("Found {} files", result.files().len());
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn parallel_walk<P: AsRef<Path>>(root: P, options: &WalkOptions) -> Result<WalkResult> {
    let root = root.as_ref();

    if !root.exists() {
        anyhow::bail!("root directory does not exist: {}", root.display());
    }

    let (tx, rx) = bounded::<Found>(1000);
    let error_count = Arc::new(AtomicUsize::new(0));

    // Drain on a separate thread so the bounded channel never stalls the walkers.
    let collector = std::thread::spawn(move || {
        let mut files = Vec::new();
        let mut directories = Vec::new();
        for found in rx {
            match found {
                Found::File(path) => files.push(path),
                Found::Dir(path) => directories.push(path),
            }
        }
        (files, directories)
    });

    build_walker(root, options).build_parallel().run(|| {
        let tx = tx.clone();
        let error_count = Arc::clone(&error_count);

        Box::new(move |entry_result| {
            match entry_result {
                Ok(entry) => {
                    let path = entry.path();
                    if entry.file_type().is_some_and(|ft| ft.is_dir()) {
                        let _ = tx.send(Found::Dir(path.to_path_buf()));
                    } else if entry.file_type().is_some_and(|ft| ft.is_file()) {
                        let _ = tx.send(Found::File(path.to_path_buf()));
                    }
                }
                Err(e) => {
                    warn!(error = %e, "walk error");
                    error_count.fetch_add(1, Ordering::Relaxed);
                }
            }
            ignore::WalkState::Continue
        })
    });

    drop(tx);

    let (mut files, mut directories) = collector
        .join()
        .map_err(|_| anyhow::anyhow!("walk collector thread panicked"))?;
    files.sort();
    directories.sort();

    Ok(WalkResult {
        files,
        directories,
        error_count: error_count.load(Ordering::Relaxed),
    })
}

/// Finds files whose path relative to `root` matches a glob pattern.
///
/// Uses `wax` for glob matching combined with `ignore::WalkParallel`.
/// The returned paths are sorted.
///
/// # Errors
///
/// Returns an error if:
/// - The root directory does not exist.
/// - The glob pattern is invalid.
///
/// # Example
/// ```no_run
/// use fataar_rs::utility::fs::walk::{find_files, WalkOptions};
///
/// let classes = find_files("build/classes", "**/*.class", &WalkOptions::for_build_outputs())?;
/// for file in classes {
///     println!("{}", file.display());
/// }
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn find_files<P: AsRef<Path>>(
    root: P,
    pattern: &str,
    options: &WalkOptions,
) -> Result<Vec<PathBuf>> {
    use wax::{Glob, Program};

    let root = root.as_ref();

    if !root.exists() {
        anyhow::bail!("root directory does not exist: {}", root.display());
    }

    let glob =
        Glob::new(pattern).map_err(|e| anyhow::anyhow!("invalid glob pattern '{pattern}': {e}"))?;

    let (tx, rx) = bounded::<PathBuf>(1000);
    let collector = std::thread::spawn(move || rx.iter().collect::<Vec<PathBuf>>());

    let glob = Arc::new(glob);
    let root_path = root.to_path_buf();

    build_walker(root, options).build_parallel().run(|| {
        let tx = tx.clone();
        let glob = Arc::clone(&glob);
        let root_path = root_path.clone();

        Box::new(move |entry_result| {
            if let Ok(entry) = entry_result
                && entry.file_type().is_some_and(|ft| ft.is_file())
                && let Ok(rel_path) = entry.path().strip_prefix(&root_path)
                && glob.is_match(rel_path)
            {
                let _ = tx.send(entry.path().to_path_buf());
            }
            ignore::WalkState::Continue
        })
    });

    drop(tx);
    let mut files = collector
        .join()
        .map_err(|_| anyhow::anyhow!("walk collector thread panicked"))?;
    files.sort();
    Ok(files)
}
