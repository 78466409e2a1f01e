// fataar-rs: Android library archive merger
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Utility modules.
//!
//! ```text
//! encoding
//!   TextEncoding     BOM / XML declaration sniffing, round-trip encode
//! fs
//!   walk:   parallel_walk(), find_files(), WalkOptions
//!   atomic: write_atomic(), clear_dir()
//! ```

pub mod encoding;
pub mod fs;
