// fataar-rs: Android library archive merger
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Command implementations.
//!
//! ```text
//! CLI args --> cmd::run_* handlers --> BuildContext
//!   options, inis, table, remap, values, sanitize, manifest, merge
//! ```

pub mod config;
pub mod manifest;
pub mod merge;
pub mod remap;
pub mod resources;
pub mod table;
