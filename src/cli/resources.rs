// fataar-rs: Android library archive merger
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Arguments for the resource commands.
//!
//! ```text
//! values   <VARIANT> [--policy split|strip-format] [--file FILE]
//! sanitize styleables <VARIANT> [--file FILE] [--name NAME...]
//! sanitize manifest   <VARIANT> [--file FILE] [--name ATTR...]
//! ```
//!
//! Without `--file` every library published for the variant is processed.

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::values::DedupePolicy;

/// Arguments for the `values` command.
#[derive(Debug, Clone, Args)]
pub struct ValuesArgs {
    /// Variant whose libraries are processed.
    #[arg(value_name = "VARIANT")]
    pub variant: String,

    /// Policy, overrides values.policy.
    #[arg(long = "policy", value_enum)]
    pub policy: Option<DedupePolicy>,

    /// Processes this document instead of the variant's libraries.
    #[arg(long = "file", value_name = "FILE")]
    pub file: Option<PathBuf>,
}

/// Arguments for the `sanitize` command.
#[derive(Debug, Clone, Args)]
pub struct SanitizeArgs {
    #[command(subcommand)]
    pub command: SanitizeCommand,
}

/// What to strip.
#[derive(Debug, Clone, Subcommand)]
pub enum SanitizeCommand {
    /// Removes listed declare-styleable groups from values documents.
    Styleables(SanitizeTargetArgs),

    /// Removes listed attributes from the <application> element.
    Manifest(SanitizeTargetArgs),
}

/// Target selection shared by the sanitize subcommands.
#[derive(Debug, Clone, Args)]
pub struct SanitizeTargetArgs {
    /// Variant whose libraries are processed.
    #[arg(value_name = "VARIANT")]
    pub variant: String,

    /// Processes this document instead of the variant's libraries.
    #[arg(long = "file", value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Names to remove, replacing the configured list.
    /// Can be specified multiple times.
    #[arg(long = "name", value_name = "NAME", action = clap::ArgAction::Append)]
    pub names: Vec<String>,
}
