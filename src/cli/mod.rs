// fataar-rs: Android library archive merger
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI module for fataar-rs using clap derive.
//!
//! # Command Structure
//!
//! ```text
//! fataar [global options] <command>
//! version | options | inis
//! table <variant>
//! remap <variant> -i DIR -o DIR
//! values <variant>
//! sanitize {styleables|manifest} <variant>
//! manifest <variant> --main FILE -o FILE
//! merge <variant>
//! ```

pub mod global;
pub mod manifest;
pub mod merge;
pub mod remap;
pub mod resources;

#[cfg(test)]
mod tests;

use crate::cli::global::GlobalOptions;
use crate::cli::manifest::ManifestArgs;
use crate::cli::merge::MergeArgs;
use crate::cli::remap::{RemapArgs, TableArgs};
use crate::cli::resources::{SanitizeArgs, ValuesArgs};
use clap::{Parser, Subcommand};

/// Android library archive merger.
#[derive(Debug, Parser)]
#[command(
    name = "fataar",
    author,
    version,
    about = "Merges Android library archives into a single fat AAR",
    long_about = "fataar-rs Copyright (C) 2026 Romeo Ahmed\n\
                  This program comes with ABSOLUTELY NO WARRANTY\n\
                  This is free software, and you are welcome to redistribute it\n\
                  under certain conditions; see LICENSE for details.\n\n\
                  Merges the exploded dependency archives of a variant into the\n\
                  consumer library: resource symbol references in compiled code are\n\
                  redirected to the consumer's R classes, colliding attribute\n\
                  declarations are split out, and manifests are merged.\n\n\
                  Invoking `fataar merge release -i classes -o out` runs every step.\n\
                  See `fataar <command> --help` for more information about a command.",
    after_help = "CONFIG FILES:\n\n\
                  fataar reads `fataar.toml` from the current directory unless\n\
                  --no-default-config is given. Additional files can be passed with\n\
                  --config and are loaded in order, later files overriding earlier\n\
                  ones. FATAAR_SECTION__KEY environment variables and --set\n\
                  overrides are applied last."
)]
pub struct Cli {
    /// Global options shared by all commands
    #[command(flatten)]
    pub global: GlobalOptions,

    /// Command to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shows the version.
    #[command(visible_alias = "-v")]
    Version,

    /// Lists all options and their values.
    Options,

    /// Lists the configuration files used.
    Inis,

    /// Prints the rename table of a variant.
    Table(TableArgs),

    /// Rewrites resource symbol references in compiled units.
    Remap(RemapArgs),

    /// Resolves colliding attribute declarations.
    Values(ValuesArgs),

    /// Strips known-colliding declarations.
    Sanitize(SanitizeArgs),

    /// Merges library manifests into the consumer manifest.
    Manifest(ManifestArgs),

    /// Runs every step for a variant.
    Merge(MergeArgs),
}

/// Parses command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

/// Parses command-line arguments from an iterator.
pub fn parse_from<I, T>(iter: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::parse_from(iter)
}

/// Tries to parse command-line arguments, returning an error on failure.
///
/// # Errors
///
/// Returns a `clap::Error` if the arguments are invalid or if help/version information
/// was requested.
pub fn try_parse() -> Result<Cli, clap::Error> {
    Cli::try_parse()
}
