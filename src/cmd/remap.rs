// fataar-rs: Android library archive merger
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `remap` command implementation.

use std::path::{Path, PathBuf};

use anyhow::bail;

use crate::cli::remap::RemapArgs;
use crate::error::Result;
use crate::remap::incremental::ChangeSet;
use crate::remap::{
    FieldPrefixRename, RemapReport, RemapRequest, RemapStrategy, mapper_for_variant, run_remap,
};
use crate::store::BuildContext;

/// Command-line view of one remap run, shared by `remap` and `merge`.
#[derive(Debug, Clone)]
pub(crate) struct RemapInvocation<'a> {
    pub(crate) variant: &'a str,
    pub(crate) inputs: &'a [PathBuf],
    pub(crate) output: &'a Path,
    pub(crate) changes: Option<&'a Path>,
    pub(crate) full: bool,
    pub(crate) threads: Option<usize>,
    pub(crate) strategy: Option<RemapStrategy>,
}

/// Runs the remap phase with config defaults filled in.
///
/// # Errors
///
/// Returns an error if the variant is unknown, the change set cannot be
/// read, or any unit fails to remap.
pub(crate) async fn remap_variant(
    ctx: &BuildContext,
    invocation: RemapInvocation<'_>,
) -> Result<RemapReport> {
    let config = ctx.config();
    let variant = invocation.variant;
    config.variant(variant)?;

    let target = ctx.target_namespace(variant);
    let strategy = invocation.strategy.unwrap_or(config.remap.strategy);
    let mapper = mapper_for_variant(strategy, ctx.store(), variant, target)?;

    let changes = invocation.changes.map(ChangeSet::load).transpose()?;
    let fields = config
        .remap
        .field_prefix
        .as_deref()
        .zip(target)
        .map(|(prefix, target)| {
            FieldPrefixRename::new(target, prefix, config.remap.renamed_fields.iter().cloned())
        });

    let request = RemapRequest::builder()
        .variant(variant)
        .input_dirs(invocation.inputs.to_vec())
        .output_dir(invocation.output)
        .maybe_changes(changes)
        .incremental(!invocation.full)
        .maybe_threads(invocation.threads.or(config.remap.threads))
        .maybe_fields(fields)
        .build();

    let report = run_remap(request, mapper, ctx.cancel_token().clone()).await?;

    tracing::info!(
        variant = %variant,
        written = report.written,
        rewritten = report.rewritten,
        removed = report.removed,
        unchanged = report.unchanged,
        skipped = report.skipped,
        "remap finished"
    );

    if report.not_started > 0 {
        bail!(
            "remap of '{variant}' interrupted, {} units not started",
            report.not_started
        );
    }
    if !report.failed.is_empty() {
        for unit in &report.failed {
            eprintln!("failed to remap {}", unit.display());
        }
        bail!("{} units of '{variant}' could not be remapped", report.failed.len());
    }
    Ok(report)
}

/// Main handler for the `remap` command.
///
/// # Errors
///
/// Returns the errors of [`remap_variant`].
pub async fn run_remap_command(args: &RemapArgs, ctx: &BuildContext) -> Result<()> {
    let invocation = RemapInvocation {
        variant: &args.variant,
        inputs: &args.inputs,
        output: &args.output,
        changes: args.changes.as_deref(),
        full: args.full,
        threads: args.threads.map(usize::from),
        strategy: args.strategy,
    };
    let report = remap_variant(ctx, invocation).await?;
    println!(
        "{} units written, {} rewritten, {} removed",
        report.written, report.rewritten, report.removed
    );
    Ok(())
}
