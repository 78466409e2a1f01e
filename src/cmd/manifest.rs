// fataar-rs: Android library archive merger
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `manifest` command implementation.

use std::path::Path;

use crate::cli::manifest::ManifestArgs;
use crate::error::{ConfigError, Result};
use crate::manifest::{CommandMerger, library_manifests, merge_library_manifests};
use crate::store::BuildContext;

/// Merges the manifests of `variant`'s libraries into `main`.
///
/// # Errors
///
/// Returns an error if the variant is unknown, no merger is configured,
/// or the merge fails.
pub(crate) async fn merge_variant_manifests(
    ctx: &BuildContext,
    variant: &str,
    main: &Path,
    output: &Path,
    merger: Option<&str>,
) -> Result<()> {
    let libraries = ctx.store().require(variant)?;
    let config = &ctx.config().manifest;
    let merger = match merger {
        Some(program) => CommandMerger::new(program, config.args.clone()),
        None => CommandMerger::from_config(config).ok_or_else(|| ConfigError::MissingKey {
            section: "manifest".to_string(),
            key: "merger".to_string(),
        })?,
    };

    let secondaries = library_manifests(&libraries);
    tracing::info!(
        variant = %variant,
        merger = merger.program(),
        libraries = secondaries.len(),
        "merging manifests"
    );
    merge_library_manifests(&merger, main, &secondaries, output).await
}

/// Main handler for the `manifest` command.
///
/// # Errors
///
/// Returns the errors of [`merge_variant_manifests`].
pub async fn run_manifest_command(args: &ManifestArgs, ctx: &BuildContext) -> Result<()> {
    merge_variant_manifests(
        ctx,
        &args.variant,
        &args.main,
        &args.output,
        args.merger.as_deref(),
    )
    .await?;
    println!("{}", args.output.display());
    Ok(())
}
