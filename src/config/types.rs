// fataar-rs: Android library archive merger
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration section types.
//!
//! ```text
//! Config
//!   global     GlobalConfig     log levels, log file
//!   project    ProjectConfig    consumer namespace, exploded root
//!   remap      RemapConfig      strategy, threads, field prefix
//!   values     ValuesConfig     dedupe policy
//!   sanitize   SanitizeConfig   excluded styleables / application attrs
//!   manifest   ManifestConfig   external merger command
//!   variants   name -> VariantConfig (dependencies, namespace override)
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::archive::ArtifactDescriptor;
use crate::logging::LogLevel;
use crate::remap::RemapStrategy;
use crate::values::DedupePolicy;

/// Namespace URI bound to the `android:` prefix.
pub const ANDROID_NAMESPACE_URI: &str = "http://schemas.android.com/apk/res/android";

/// Global configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Log level for console output (0-6).
    pub output_log_level: LogLevel,
    /// Log level for file output (0-6).
    pub file_log_level: LogLevel,
    /// Path to log file; no file logging when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    /// Write the log file as JSON lines.
    pub json_log: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            output_log_level: LogLevel::INFO,
            file_log_level: LogLevel::TRACE,
            log_file: None,
            json_log: false,
        }
    }
}

/// The consumer library being assembled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Consumer namespace, e.g. `com.sdk`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Where dependency archives are exploded.
    pub exploded_root: PathBuf,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            namespace: None,
            exploded_root: PathBuf::from("build/intermediates/exploded-aar"),
        }
    }
}

/// Bytecode remapping options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RemapConfig {
    /// Which remapper rewrites the compiled units.
    pub strategy: RemapStrategy,
    /// Worker count; available parallelism + 1 when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threads: Option<usize>,
    /// Prefix for renamed resource fields; field renaming is off when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_prefix: Option<String>,
    /// Field names that were renamed with `field_prefix` in the resources.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub renamed_fields: Vec<String>,
}

/// Resource declaration dedupe options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValuesConfig {
    pub policy: DedupePolicy,
}

/// Known-colliding declarations to strip from merged archives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SanitizeConfig {
    /// `declare-styleable` names removed from the values document.
    pub styleables: Vec<String>,
    /// `prefix:name` attributes removed from `<application>`.
    pub application_attrs: Vec<String>,
    /// Prefix to namespace URI table used to resolve `application_attrs`.
    pub namespaces: BTreeMap<String, String>,
}

impl Default for SanitizeConfig {
    fn default() -> Self {
        Self {
            styleables: Vec::new(),
            application_attrs: Vec::new(),
            namespaces: BTreeMap::from([(
                "android".to_string(),
                ANDROID_NAMESPACE_URI.to_string(),
            )]),
        }
    }
}

/// External manifest merger invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManifestConfig {
    /// Merger executable name or path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merger: Option<String>,
    /// Extra arguments passed before the generated ones.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

/// One build variant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VariantConfig {
    /// Overrides `project.namespace` for this variant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Resolved dependencies to embed, in order.
    pub dependencies: Vec<ArtifactDescriptor>,
}
