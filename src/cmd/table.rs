// fataar-rs: Android library archive merger
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `table` command: prints the rename table of a variant.

use serde_json::json;

use crate::cli::remap::TableArgs;
use crate::error::{ConfigError, Result};
use crate::rtable::{RenameTable, to_dotted};
use crate::store::BuildContext;

/// Builds the variant's rename table, failing when it cannot exist yet.
///
/// # Errors
///
/// Returns an error if the variant is unknown, no consumer namespace is
/// configured, or a dependency manifest cannot be read.
pub fn rename_table(ctx: &BuildContext, variant: &str) -> Result<RenameTable> {
    ctx.store().require(variant)?;
    let table = RenameTable::for_variant(ctx.store(), variant, ctx.target_namespace(variant))?;
    table.ok_or_else(|| {
        ConfigError::MissingKey {
            section: "project".to_string(),
            key: "namespace".to_string(),
        }
        .into()
    })
}

/// Main handler for the `table` command.
///
/// # Errors
///
/// Returns the errors of [`rename_table`].
pub fn run_table_command(args: &TableArgs, ctx: &BuildContext) -> Result<()> {
    let table = rename_table(ctx, &args.variant)?;

    if args.json {
        let entries: Vec<_> = table
            .entries()
            .map(|entry| {
                json!({
                    "namespace": entry.source_namespace,
                    "category": entry.category.to_string(),
                    "source": entry.source,
                    "target": entry.target,
                })
            })
            .collect();
        let document = json!({
            "variant": args.variant,
            "target": table.target_namespace(),
            "sources": table.source_namespaces(),
            "entries": entries,
        });
        println!("{}", serde_json::to_string_pretty(&document)?);
        return Ok(());
    }

    if table.is_empty() {
        println!("No dependency namespaces differ from {}", table.target_namespace());
        return Ok(());
    }
    for (source, target) in table.iter() {
        println!("{} -> {}", to_dotted(source), to_dotted(target));
    }
    Ok(())
}
