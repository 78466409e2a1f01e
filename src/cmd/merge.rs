// fataar-rs: Android library archive merger
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `merge` command: every step for one variant, in order.
//!
//! ```text
//! styleables --> values --> application-attrs --> remap --> manifest
//!  (resources are settled before any unit or manifest is written)
//! ```

use anyhow::bail;

use crate::cli::merge::{MergeArgs, MergeSteps};
use crate::cmd::manifest::merge_variant_manifests;
use crate::cmd::remap::{RemapInvocation, remap_variant};
use crate::cmd::resources::{SanitizeTarget, dedupe_variant, sanitize_variant};
use crate::error::Result;
use crate::logging::PhaseTimer;
use crate::store::BuildContext;

/// Main handler for the `merge` command.
///
/// # Errors
///
/// Returns the first failing step's error. Steps after it do not run.
pub async fn run_merge_command(args: &MergeArgs, ctx: &BuildContext) -> Result<()> {
    let variant = args.variant.as_str();
    ctx.config().variant(variant)?;
    let steps = args.steps();
    let timer = PhaseTimer::start("merge", variant);
    tracing::info!(variant = %variant, ?steps, "merging variant");

    let unrunnable = args.unrunnable();
    if unrunnable.contains(MergeSteps::REMAP) {
        tracing::warn!(variant = %variant, "skipping remap: pass --input and --output, or --skip remap");
    }
    if unrunnable.contains(MergeSteps::MANIFEST) {
        tracing::warn!(
            variant = %variant,
            "skipping manifest: pass --main and --manifest-out, or --skip manifest"
        );
    }

    let sanitize = &ctx.config().sanitize;
    if steps.contains(MergeSteps::STYLEABLES) {
        sanitize_variant(ctx, variant, SanitizeTarget::Styleables, &sanitize.styleables)?;
    }
    if steps.contains(MergeSteps::VALUES) {
        dedupe_variant(ctx, variant, ctx.config().values.policy)?;
    }
    if steps.contains(MergeSteps::APPLICATION_ATTRS) {
        sanitize_variant(
            ctx,
            variant,
            SanitizeTarget::ApplicationAttrs,
            &sanitize.application_attrs,
        )?;
    }

    if ctx.cancel_token().is_cancelled() {
        bail!("merge of '{variant}' interrupted");
    }

    if steps.contains(MergeSteps::REMAP)
        && let Some(output) = args.output.as_deref()
    {
        remap_variant(
            ctx,
            RemapInvocation {
                variant,
                inputs: &args.inputs,
                output,
                changes: args.changes.as_deref(),
                full: false,
                threads: None,
                strategy: None,
            },
        )
        .await?;
    }

    if steps.contains(MergeSteps::MANIFEST)
        && let (Some(main), Some(output)) = (args.main.as_deref(), args.manifest_out.as_deref())
    {
        merge_variant_manifests(ctx, variant, main, output, None).await?;
    }

    timer.finish();
    Ok(())
}
