// fataar-rs: Android library archive merger
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Arguments for the `manifest` command.

use clap::Args;
use std::path::PathBuf;

/// Arguments for the `manifest` command.
#[derive(Debug, Clone, Args)]
pub struct ManifestArgs {
    /// Variant whose library manifests are merged.
    #[arg(value_name = "VARIANT")]
    pub variant: String,

    /// Consumer manifest.
    #[arg(short = 'm', long = "main", value_name = "FILE")]
    pub main: PathBuf,

    /// Where the merged manifest is written.
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: PathBuf,

    /// Merger executable, overrides manifest.merger.
    #[arg(long = "merger", value_name = "PROGRAM")]
    pub merger: Option<String>,
}
