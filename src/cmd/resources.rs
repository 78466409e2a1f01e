// fataar-rs: Android library archive merger
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `values` and `sanitize` command implementations.
//!
//! Library mode walks every archive published for the variant and never
//! stops on a bad document. With `--file` the single document is the
//! whole job, so its failure fails the command.

use std::path::{Path, PathBuf};

use anyhow::bail;

use crate::archive::ArchiveRecord;
use crate::cli::resources::{SanitizeArgs, SanitizeCommand, SanitizeTargetArgs, ValuesArgs};
use crate::error::Result;
use crate::logging::PhaseTimer;
use crate::sanitize::{SanitizeOutcome, exclude_application_attrs, exclude_declare_styleables};
use crate::store::BuildContext;
use crate::values::{DedupePolicy, dedupe_archive, try_dedupe_values_file};

/// Deduplicates the values document of every library of `variant`.
///
/// Returns the number of documents that changed.
///
/// # Errors
///
/// Returns an error if the variant is unknown.
pub(crate) fn dedupe_variant(ctx: &BuildContext, variant: &str, policy: DedupePolicy) -> Result<usize> {
    let libraries = ctx.store().require(variant)?;
    let timer = PhaseTimer::start("values", variant);
    let mut changed = 0;
    for record in libraries.iter() {
        let report = dedupe_archive(record, policy);
        if report.changed() {
            tracing::info!(
                library = %record.coordinate(),
                repeated = ?report.repeated,
                moved = report.moved_groups,
                stripped = report.stripped,
                "resolved repeated attributes"
            );
            changed += 1;
        }
    }
    timer.finish();
    Ok(changed)
}

/// Main handler for the `values` command.
///
/// # Errors
///
/// Returns an error if the variant is unknown or the `--file` document
/// cannot be processed.
pub fn run_values_command(args: &ValuesArgs, ctx: &BuildContext) -> Result<()> {
    let policy = args.policy.unwrap_or(ctx.config().values.policy);

    if let Some(file) = &args.file {
        let report = try_dedupe_values_file(file, policy)?;
        println!(
            "{}: {} repeated, {} groups moved, {} formats stripped",
            file.display(),
            report.repeated.len(),
            report.moved_groups,
            report.stripped
        );
        for auxiliary in &report.auxiliary {
            println!("  wrote {}", auxiliary.display());
        }
        return Ok(());
    }

    let changed = dedupe_variant(ctx, &args.variant, policy)?;
    println!("{changed} values documents changed ({policy})");
    Ok(())
}

/// Which sanitizer to run over a library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SanitizeTarget {
    Styleables,
    ApplicationAttrs,
}

impl SanitizeTarget {
    fn document(self, record: &ArchiveRecord) -> PathBuf {
        match self {
            Self::Styleables => record.values_file(),
            Self::ApplicationAttrs => record.manifest_path(),
        }
    }

    fn configured(self, ctx: &BuildContext) -> &[String] {
        let sanitize = &ctx.config().sanitize;
        match self {
            Self::Styleables => &sanitize.styleables,
            Self::ApplicationAttrs => &sanitize.application_attrs,
        }
    }

    fn run(self, ctx: &BuildContext, file: &Path, names: &[String]) -> SanitizeOutcome {
        match self {
            Self::Styleables => exclude_declare_styleables(file, names),
            Self::ApplicationAttrs => {
                exclude_application_attrs(file, names, &ctx.config().sanitize.namespaces)
            }
        }
    }
}

/// Runs one sanitizer over every library of `variant`.
///
/// Returns the number of removed items.
///
/// # Errors
///
/// Returns an error if the variant is unknown.
pub(crate) fn sanitize_variant(
    ctx: &BuildContext,
    variant: &str,
    target: SanitizeTarget,
    names: &[String],
) -> Result<usize> {
    let libraries = ctx.store().require(variant)?;
    if names.is_empty() {
        tracing::debug!(variant = %variant, ?target, "nothing configured to remove");
        return Ok(0);
    }
    Ok(libraries
        .iter()
        .map(|record| target.run(ctx, &target.document(record), names).removed())
        .sum())
}

fn run_target(ctx: &BuildContext, target: SanitizeTarget, args: &SanitizeTargetArgs) -> Result<()> {
    let names = if args.names.is_empty() {
        target.configured(ctx)
    } else {
        args.names.as_slice()
    };

    let Some(file) = &args.file else {
        let removed = sanitize_variant(ctx, &args.variant, target, names)?;
        println!("{removed} declarations removed");
        return Ok(());
    };

    match target.run(ctx, file, names) {
        SanitizeOutcome::Unchanged => println!("{}: nothing to remove", file.display()),
        SanitizeOutcome::Removed(items) => {
            println!("{}: removed {}", file.display(), items.join(", "));
        }
        SanitizeOutcome::Failed(message) => bail!("{}: {message}", file.display()),
    }
    Ok(())
}

/// Main handler for the `sanitize` command.
///
/// # Errors
///
/// Returns an error if the variant is unknown or the `--file` document
/// cannot be processed.
pub fn run_sanitize_command(args: &SanitizeArgs, ctx: &BuildContext) -> Result<()> {
    match &args.command {
        SanitizeCommand::Styleables(target) => run_target(ctx, SanitizeTarget::Styleables, target),
        SanitizeCommand::Manifest(target) => {
            run_target(ctx, SanitizeTarget::ApplicationAttrs, target)
        }
    }
}
