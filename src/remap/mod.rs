// fataar-rs: Android library archive merger
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Redirects references to merged-away symbol classes in compiled units.
//!
//! ```text
//!            ClassNameMapper
//!            /             \
//!     RenameTable     StructuralRemapper
//!   (exact lookup)   (root exact, R$ prefix)
//!            \             /
//!   remap_class(bytes, mapper, field_prefix)
//!     Class entries, array names, NameAndType / MethodType descriptors
//!     optional: Fieldref -> NameAndType(prefix + name)
//!
//! run_remap: plan (incremental) --> RemapPool (bounded, join all) --> report
//! ```

pub mod incremental;
pub mod pool;


use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use bon::Builder;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::classfile::{ClassFile, Constant, MemberKind};
use crate::error::{ClassFileError, ConfigError, Result};
use crate::logging::PhaseTimer;
use crate::rtable::{RenameTable, ResourceCategory, symbol_root};
use crate::store::VariantStore;
use crate::utility::fs::atomic::{clear_dir, remove_file_if_exists, write_atomic};

use incremental::{ChangeSet, RemapUnit, plan};
use pool::{PoolOutcome, RemapPool, UnitJob};

/// Maps internal class names (`com/lib/R$string`) to replacements.
pub trait ClassNameMapper: Send + Sync + fmt::Debug {
    /// Replacement for `internal_name`, or `None` to keep it.
    fn map(&self, internal_name: &str) -> Option<String>;
}

impl ClassNameMapper for RenameTable {
    fn map(&self, internal_name: &str) -> Option<String> {
        self.get(internal_name).map(str::to_string)
    }
}

/// Rule-based remapper for instrumentation pipelines.
///
/// `lib/R` maps to `target/R`; any `lib/R$<suffix>` maps to
/// `target/R$<suffix>`; everything else is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuralRemapper {
    target_root: String,
    library_roots: Vec<String>,
}

impl StructuralRemapper {
    pub fn new<I, S>(target_namespace: &str, library_namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let target_root = symbol_root(target_namespace);
        let mut library_roots: Vec<String> = Vec::new();
        for namespace in library_namespaces {
            let root = symbol_root(namespace.as_ref());
            if root != target_root && !library_roots.contains(&root) {
                library_roots.push(root);
            }
        }
        Self {
            target_root,
            library_roots,
        }
    }
}

impl ClassNameMapper for StructuralRemapper {
    fn map(&self, internal_name: &str) -> Option<String> {
        self.library_roots.iter().find_map(|root| {
            let rest = internal_name.strip_prefix(root.as_str())?;
            if rest.is_empty() {
                Some(self.target_root.clone())
            } else if rest.starts_with('$') {
                Some(format!("{}{rest}", self.target_root))
            } else {
                None
            }
        })
    }
}

/// Which remapper a run uses.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum RemapStrategy {
    /// Exact lookups in the rename table.
    #[default]
    Table,
    /// Root and prefix rules.
    Structural,
}

impl fmt::Display for RemapStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table => f.write_str("table"),
            Self::Structural => f.write_str("structural"),
        }
    }
}

impl FromStr for RemapStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "structural" => Ok(Self::Structural),
            _ => Err(ConfigError::InvalidValue {
                section: "remap".to_string(),
                key: "strategy".to_string(),
                message: format!("expected 'table' or 'structural', got '{s}'"),
            }),
        }
    }
}

/// Builds the mapper for `variant`, or `None` while namespaces are unknown.
///
/// # Errors
///
/// Returns an error if a dependency manifest cannot be read.
pub fn mapper_for_variant(
    strategy: RemapStrategy,
    store: &VariantStore,
    variant: &str,
    target: Option<&str>,
) -> Result<Option<Arc<dyn ClassNameMapper>>> {
    let mapper: Option<Arc<dyn ClassNameMapper>> = match strategy {
        RemapStrategy::Table => RenameTable::for_variant(store, variant, target)?
            .map(|table| Arc::new(table) as Arc<dyn ClassNameMapper>),
        RemapStrategy::Structural => {
            let namespaces = store.namespaces(variant).transpose()?;
            target.zip(namespaces).map(|(target, namespaces)| {
                Arc::new(StructuralRemapper::new(target, namespaces)) as Arc<dyn ClassNameMapper>
            })
        }
    };
    Ok(mapper)
}

/// Renames resource fields on consumer symbol classes.
///
/// Applies to fields of `target/R$<category>` for every category except
/// `attr`, and only to names in the allow-set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPrefixRename {
    target_root: String,
    prefix: String,
    renamed: BTreeSet<String>,
}

impl FieldPrefixRename {
    pub fn new<I>(target_namespace: &str, prefix: impl Into<String>, renamed: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            target_root: symbol_root(target_namespace),
            prefix: prefix.into(),
            renamed: renamed.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// New name for field `name` of class `owner`, if it must change.
    #[must_use]
    pub fn rename(&self, owner: &str, name: &str) -> Option<String> {
        let (package, category) = ResourceCategory::split_symbol_class(owner)?;
        let owner_root = format!("{package}/R");
        if owner_root != self.target_root
            || category == ResourceCategory::Attr
            || self.prefix.is_empty()
            || name.starts_with(self.prefix.as_str())
            || !self.renamed.contains(name)
        {
            return None;
        }
        Some(format!("{}{name}", self.prefix))
    }
}

/// Result of rewriting one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remapped {
    pub bytes: Vec<u8>,
    pub classes: usize,
    pub descriptors: usize,
    pub fields: usize,
}

impl Remapped {
    /// Whether anything was rewritten.
    #[must_use]
    pub const fn changed(&self) -> bool {
        self.classes + self.descriptors + self.fields > 0
    }
}

/// Rewrites every class name in `descriptor` through `mapper`.
///
/// Returns `None` if nothing changed.
#[must_use]
pub fn map_descriptor(descriptor: &str, mapper: &dyn ClassNameMapper) -> Option<String> {
    let mut out = String::with_capacity(descriptor.len());
    let mut changed = false;
    let mut rest = descriptor;

    while let Some(start) = rest.find('L') {
        out.push_str(&rest[..=start]);
        let after = &rest[start + 1..];
        let Some(end) = after.find(';') else {
            out.push_str(after);
            rest = "";
            break;
        };
        let name = &after[..end];
        match mapper.map(name) {
            Some(mapped) => {
                out.push_str(&mapped);
                changed = true;
            }
            None => out.push_str(name),
        }
        out.push(';');
        rest = &after[end + 1..];
    }
    out.push_str(rest);

    changed.then_some(out)
}

/// Rewrites the symbolic references of one compiled unit.
///
/// Entries unrelated to a mapped class are preserved byte-for-byte; when
/// nothing matches, `bytes` is returned unchanged. Running the result
/// through the same mapper again changes nothing.
///
/// # Errors
///
/// Returns a `ClassFileError` for malformed units or pool overflow.
pub fn remap_class(
    bytes: &[u8],
    mapper: &dyn ClassNameMapper,
    fields: Option<&FieldPrefixRename>,
) -> std::result::Result<Remapped, ClassFileError> {
    let mut class = ClassFile::parse(bytes)?;
    let mut classes = 0;
    let mut descriptors = 0;
    let mut renamed_fields = 0;

    for index in class.class_indices() {
        let Ok(name) = class.class_name(index) else {
            continue;
        };
        let mapped = if name.starts_with('[') {
            map_descriptor(&name, mapper)
        } else {
            mapper.map(&name)
        };
        if let Some(mapped) = mapped {
            class.rename_class_entry(index, &mapped)?;
            classes += 1;
        }
    }

    let typed = class.indices_where(|c| {
        matches!(c, Constant::NameAndType { .. } | Constant::MethodType { .. })
    });
    for index in typed {
        let descriptor_index = match *class.entry(index)? {
            Constant::NameAndType {
                descriptor_index, ..
            }
            | Constant::MethodType { descriptor_index } => descriptor_index,
            _ => continue,
        };
        let Ok(descriptor) = class.utf8(descriptor_index) else {
            continue;
        };
        if let Some(mapped) = map_descriptor(&descriptor, mapper) {
            class.set_descriptor(index, &mapped)?;
            descriptors += 1;
        }
    }

    if let Some(fields) = fields {
        let field_refs = class.indices_where(|c| {
            matches!(
                c,
                Constant::MemberRef {
                    kind: MemberKind::Field,
                    ..
                }
            )
        });
        for index in field_refs {
            let Ok((owner, name, _)) = class.member_ref(index) else {
                continue;
            };
            if let Some(new_name) = fields.rename(&owner, &name) {
                class.rename_member_entry(index, &new_name)?;
                renamed_fields += 1;
            }
        }
    }

    let bytes = if classes + descriptors + renamed_fields == 0 {
        bytes.to_vec()
    } else {
        class.to_bytes()?
    };

    Ok(Remapped {
        bytes,
        classes,
        descriptors,
        fields: renamed_fields,
    })
}

/// Reads, rewrites and writes one unit.
#[derive(Debug)]
struct RewriteJob {
    mapper: Option<Arc<dyn ClassNameMapper>>,
    fields: Option<FieldPrefixRename>,
}

impl UnitJob for RewriteJob {
    fn process(&self, unit: &RemapUnit) -> Result<bool> {
        let input = std::fs::read(&unit.source)
            .with_context(|| format!("failed to read {}", unit.source.display()))?;

        let (output, changed) = match &self.mapper {
            Some(mapper) => {
                let remapped = remap_class(&input, mapper.as_ref(), self.fields.as_ref())
                    .with_context(|| format!("failed to remap {}", unit.source.display()))?;
                let changed = remapped.changed();
                (remapped.bytes, changed)
            }
            None => (input, false),
        };

        write_atomic(&unit.output, &output)
            .with_context(|| format!("failed to write {}", unit.output.display()))?;
        tracing::trace!(unit = %unit.source.display(), changed, "remapped unit");
        Ok(changed)
    }
}

/// Inputs of one remap phase.
#[derive(Debug, Clone, Builder)]
pub struct RemapRequest {
    #[builder(into)]
    variant: String,
    input_dirs: Vec<PathBuf>,
    #[builder(into)]
    output_dir: PathBuf,
    /// Host change set; `None` or empty means a full pass.
    changes: Option<ChangeSet>,
    /// `false` discards previous outputs and ignores `changes`.
    #[builder(default = true)]
    incremental: bool,
    threads: Option<usize>,
    fields: Option<FieldPrefixRename>,
}

impl RemapRequest {
    #[must_use]
    pub fn variant(&self) -> &str {
        &self.variant
    }

    #[must_use]
    pub fn output_dir(&self) -> &std::path::Path {
        &self.output_dir
    }
}

/// Summary of one remap phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemapReport {
    /// Whether previous outputs were discarded first.
    pub full: bool,
    pub written: usize,
    pub rewritten: usize,
    pub removed: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failed: Vec<PathBuf>,
    pub not_started: usize,
    pub elapsed: Duration,
}

/// Runs the remap phase for one variant.
///
/// With `mapper` set to `None` units are copied through unchanged. The
/// mapper is fully built before the first unit is submitted and shared
/// read-only by every worker.
///
/// # Errors
///
/// Returns an error if the output directory cannot be prepared or the
/// inputs cannot be scanned. Per-unit failures are reported in
/// [`RemapReport::failed`] instead.
pub async fn run_remap(
    request: RemapRequest,
    mapper: Option<Arc<dyn ClassNameMapper>>,
    cancel_token: CancellationToken,
) -> Result<RemapReport> {
    let timer = PhaseTimer::start("remap", request.variant.as_str());

    let changes = if request.incremental {
        request.changes.as_ref()
    } else {
        None
    };
    let plan = plan(&request.input_dirs, &request.output_dir, changes)?;

    if plan.full {
        clear_dir(&request.output_dir)
            .with_context(|| format!("failed to clear {}", request.output_dir.display()))?;
    }
    std::fs::create_dir_all(&request.output_dir)
        .with_context(|| format!("failed to create {}", request.output_dir.display()))?;

    let mut removed = 0;
    for output in &plan.removed {
        if remove_file_if_exists(output)? {
            removed += 1;
        }
    }

    if mapper.is_none() {
        tracing::info!(variant = %request.variant, "namespaces not resolved yet, copying units unchanged");
    }

    tracing::info!(
        variant = %request.variant,
        units = plan.units.len(),
        full = plan.full,
        "remapping compiled units"
    );

    let job = Arc::new(RewriteJob {
        mapper,
        fields: request.fields.clone(),
    });
    let PoolOutcome {
        written,
        rewritten,
        failed,
        not_started,
    } = RemapPool::new(request.threads)
        .with_cancel_token(cancel_token)
        .run(plan.units, job)
        .await;

    if !failed.is_empty() {
        tracing::warn!(variant = %request.variant, failed = failed.len(), "some units could not be remapped");
    }

    Ok(RemapReport {
        full: plan.full,
        written,
        rewritten,
        removed,
        unchanged: plan.unchanged,
        skipped: plan.skipped,
        failed,
        not_started,
        elapsed: timer.finish(),
    })
}
