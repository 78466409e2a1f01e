// fataar-rs: Android library archive merger
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Arguments for the `merge` command, which runs every step for a variant.
//!
//! ```text
//! merge <VARIANT> -i DIR... -o DIR [--main FILE --manifest-out FILE]
//!       [--skip remap|values|styleables|application-attrs|manifest]...
//!
//! order: styleables -> values -> application-attrs -> remap -> manifest
//! ```

use bitflags::bitflags;
use clap::{Args, ValueEnum};
use std::path::PathBuf;

bitflags! {
    /// Steps run by `merge`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MergeSteps: u8 {
        const STYLEABLES = 0x01;
        const VALUES = 0x02;
        const APPLICATION_ATTRS = 0x04;
        const REMAP = 0x08;
        const MANIFEST = 0x10;
    }
}

impl Default for MergeSteps {
    fn default() -> Self {
        Self::all()
    }
}

/// One step name as accepted by `--skip`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MergeStep {
    Styleables,
    Values,
    ApplicationAttrs,
    Remap,
    Manifest,
}

impl From<MergeStep> for MergeSteps {
    fn from(step: MergeStep) -> Self {
        match step {
            MergeStep::Styleables => Self::STYLEABLES,
            MergeStep::Values => Self::VALUES,
            MergeStep::ApplicationAttrs => Self::APPLICATION_ATTRS,
            MergeStep::Remap => Self::REMAP,
            MergeStep::Manifest => Self::MANIFEST,
        }
    }
}

/// Arguments for the `merge` command.
#[derive(Debug, Clone, Args)]
pub struct MergeArgs {
    /// Variant being assembled.
    #[arg(value_name = "VARIANT")]
    pub variant: String,

    /// Directory of compiled units. Can be specified multiple times.
    #[arg(short = 'i', long = "input", value_name = "DIR", action = clap::ArgAction::Append)]
    pub inputs: Vec<PathBuf>,

    /// Output directory for rewritten units.
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// JSON change set for an incremental remap.
    #[arg(long = "changes", value_name = "FILE")]
    pub changes: Option<PathBuf>,

    /// Consumer manifest; without it the manifest step is skipped with a warning.
    #[arg(short = 'm', long = "main", value_name = "FILE", requires = "manifest_out")]
    pub main: Option<PathBuf>,

    /// Where the merged manifest is written.
    #[arg(long = "manifest-out", value_name = "FILE", requires = "main")]
    pub manifest_out: Option<PathBuf>,

    /// Steps to leave out. Can be specified multiple times.
    #[arg(long = "skip", value_enum, value_name = "STEP", action = clap::ArgAction::Append)]
    pub skip: Vec<MergeStep>,
}

impl MergeArgs {
    /// Steps left after `--skip`.
    #[must_use]
    pub fn requested(&self) -> MergeSteps {
        let mut steps = MergeSteps::all();
        for step in &self.skip {
            steps.remove(MergeSteps::from(*step));
        }
        steps
    }

    /// Requested steps whose paths were not given on the command line.
    #[must_use]
    pub fn unrunnable(&self) -> MergeSteps {
        let mut missing = MergeSteps::empty();
        if self.inputs.is_empty() || self.output.is_none() {
            missing |= MergeSteps::REMAP;
        }
        if self.main.is_none() || self.manifest_out.is_none() {
            missing |= MergeSteps::MANIFEST;
        }
        self.requested() & missing
    }

    /// Steps that will run, after `--skip` and missing inputs are applied.
    #[must_use]
    pub fn steps(&self) -> MergeSteps {
        self.requested() - self.unrunnable()
    }
}
