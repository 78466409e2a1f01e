// fataar-rs: Android library archive merger
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Arguments for the `table` and `remap` commands.
//!
//! ```text
//! table  <VARIANT> [--json]
//! remap  <VARIANT> -i DIR... -o DIR [--changes FILE] [--full]
//!        [--threads N] [--strategy table|structural]
//! ```

use clap::Args;
use std::path::PathBuf;

use crate::remap::RemapStrategy;

/// Arguments for the `table` command.
#[derive(Debug, Clone, Args)]
pub struct TableArgs {
    /// Variant whose rename table is printed.
    #[arg(value_name = "VARIANT")]
    pub variant: String,

    /// Prints the table as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `remap` command.
#[derive(Debug, Clone, Args)]
pub struct RemapArgs {
    /// Variant being assembled.
    #[arg(value_name = "VARIANT")]
    pub variant: String,

    /// Directory of compiled units. Can be specified multiple times.
    #[arg(short = 'i', long = "input", value_name = "DIR", required = true, action = clap::ArgAction::Append)]
    pub inputs: Vec<PathBuf>,

    /// Output directory for rewritten units.
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output: PathBuf,

    /// JSON change set (path -> added|changed|removed|unchanged).
    #[arg(long = "changes", value_name = "FILE", conflicts_with = "full")]
    pub changes: Option<PathBuf>,

    /// Discards previous outputs and rewrites every unit.
    #[arg(long)]
    pub full: bool,

    /// Worker count, overrides remap.threads.
    #[arg(short = 'j', long = "threads", value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub threads: Option<u16>,

    /// Remapper, overrides remap.strategy.
    #[arg(long = "strategy", value_enum)]
    pub strategy: Option<RemapStrategy>,
}
