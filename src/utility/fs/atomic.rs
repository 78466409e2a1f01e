// fataar-rs: Android library archive merger
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::io::Write;
use std::path::Path;

use crate::error::{FsError, FatAarResult};

/// Writes `contents` to `path` so readers never observe a partial file.
///
/// The data goes to a temporary file in the destination directory, which is
/// then renamed over `path`. Parent directories are created as needed.
///
/// # Errors
///
/// Returns an `FsError` if the directory cannot be created, or the temporary
/// file cannot be written or persisted.
pub fn write_atomic(path: &Path, contents: &[u8]) -> FatAarResult<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(|e| FsError::io(parent, e))?;

    let mut temp = tempfile::NamedTempFile::new_in(parent).map_err(|e| FsError::io(parent, e))?;
    temp.write_all(contents)
        .and_then(|()| temp.flush())
        .map_err(|e| FsError::io(temp.path(), e))?;
    temp.persist(path).map_err(|e| FsError::io(path, e.error))?;
    Ok(())
}

/// Removes everything inside `dir`, leaving the directory itself in place.
///
/// A missing directory is not an error.
///
/// # Errors
///
/// Returns an `FsError` if an entry cannot be removed.
pub fn clear_dir(dir: &Path) -> FatAarResult<()> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(FsError::io(dir, e).into()),
    };

    for entry in entries {
        let entry = entry.map_err(|e| FsError::io(dir, e))?;
        let path = entry.path();
        let is_dir = entry.file_type().is_ok_and(|ft| ft.is_dir());
        let result = if is_dir {
            std::fs::remove_dir_all(&path)
        } else {
            std::fs::remove_file(&path)
        };
        result.map_err(|e| FsError::io(&path, e))?;
    }
    Ok(())
}

/// Removes a file, treating "already gone" as success.
///
/// Returns whether a file was actually removed.
///
/// # Errors
///
/// Returns an `FsError` for any failure other than `NotFound`.
pub fn remove_file_if_exists(path: &Path) -> FatAarResult<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(FsError::io(path, e).into()),
    }
}
