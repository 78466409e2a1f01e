// fataar-rs: Android library archive merger
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Filesystem utilities with parallel traversal and atomic replacement.
//!
//! ```text
//! walk:    parallel_walk()   ignore::WalkParallel (multi-core)
//!          find_files()      glob pattern matching
//!          WalkOptions       max_depth, hidden, gitignore
//! atomic:  write_atomic()    temp file in target dir + rename
//!          clear_dir()       empty a directory, keep the directory
//! ```

pub mod atomic;
pub mod walk;

#[cfg(test)]
mod tests;
