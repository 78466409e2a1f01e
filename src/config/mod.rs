// fataar-rs: Android library archive merger
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration management for fataar-rs.
//!
//! # Configuration Hierarchy
//!
//! ```text
//! Priority (low → high)
//! 1. defaults
//! 2. fataar.toml (cwd, optional)
//! 3. --config files
//! 4. FATAAR_* env vars
//! 5. --set overrides
//! ```
//!
//! # Environment Variable Mapping
//!
//! ```text
//! FATAAR_PROJECT__NAMESPACE=com.sdk  → project.namespace = "com.sdk"
//! FATAAR_REMAP__THREADS=8            → remap.threads = 8
//! FATAAR_VALUES__POLICY=strip-format → values.policy = "strip-format"
//! ```
//!
//! # Variants
//!
//! ```toml
//! [project]
//! namespace = "com.sdk"
//!
//! [variants.release]
//! dependencies = [
//!     { group = "com.lib", name = "core", version = "1.0" },
//! ]
//! ```

pub mod loader;
pub mod types;


use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::archive::is_dotted_identifier;
use crate::error::{ConfigError, Result, StoreError};

use loader::ConfigLoader;
use types::{
    GlobalConfig, ManifestConfig, ProjectConfig, RemapConfig, SanitizeConfig, ValuesConfig,
    VariantConfig,
};

/// Name of the configuration file picked up from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "fataar.toml";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "FATAAR";

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Global options.
    pub global: GlobalConfig,
    /// Consumer library.
    pub project: ProjectConfig,
    /// Bytecode remapping.
    pub remap: RemapConfig,
    /// Attribute deduplication.
    pub values: ValuesConfig,
    /// Declarations stripped from merged archives.
    pub sanitize: SanitizeConfig,
    /// External manifest merger.
    pub manifest: ManifestConfig,
    /// Build variants and their dependencies.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub variants: BTreeMap<String, VariantConfig>,
}

impl Config {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use fataar_rs::config::Config;
    ///
    /// let config = Config::builder()
    ///     .add_toml_file("fataar.toml")
    ///     .add_toml_file_optional("fataar.local.toml")
    ///     .with_env_prefix("FATAAR")
    ///     .build()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    #[must_use]
    pub fn builder() -> ConfigLoader {
        ConfigLoader::new()
    }

    /// Load configuration from a single TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML, or
    /// does not match the `Config` structure.
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        Self::builder().add_toml_file(path).build()
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML or does not match the
    /// `Config` structure.
    pub fn parse(content: &str) -> Result<Self> {
        Self::builder().add_toml_str(content).build()
    }

    /// Configuration of `variant`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::UnknownVariant` if the variant is not configured.
    pub fn variant(&self, variant: &str) -> std::result::Result<&VariantConfig, StoreError> {
        self.variants
            .get(variant)
            .ok_or_else(|| StoreError::UnknownVariant(variant.to_string()))
    }

    /// Validate values serde cannot check on its own.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for malformed namespaces, a zero
    /// thread count or an empty field prefix.
    pub fn resolve_and_validate(&mut self) -> Result<()> {
        if let Some(namespace) = &self.project.namespace {
            check_namespace("project", namespace)?;
        }
        for (name, variant) in &self.variants {
            if let Some(namespace) = &variant.namespace {
                check_namespace(&format!("variants.{name}"), namespace)?;
            }
        }
        if self.remap.threads == Some(0) {
            return Err(ConfigError::InvalidValue {
                section: "remap".to_string(),
                key: "threads".to_string(),
                message: "must be at least 1".to_string(),
            }
            .into());
        }
        if self.remap.field_prefix.as_deref() == Some("") {
            return Err(ConfigError::InvalidValue {
                section: "remap".to_string(),
                key: "field_prefix".to_string(),
                message: "must not be empty".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Format configuration options for display.
    ///
    /// Output is deterministically ordered using `BTreeMap`.
    #[must_use]
    pub fn format_options(&self) -> Vec<String> {
        let mut options = BTreeMap::new();
        self.format_global_options(&mut options);
        self.format_project_options(&mut options);
        self.format_remap_options(&mut options);
        self.format_sanitize_options(&mut options);
        self.format_variant_options(&mut options);
        options.insert("values.policy".into(), self.values.policy.to_string());
        options.insert(
            "manifest.merger".into(),
            self.manifest.merger.clone().unwrap_or_default(),
        );
        if !self.manifest.args.is_empty() {
            options.insert("manifest.args".into(), self.manifest.args.join(" "));
        }

        let max_key_len = options.keys().map(String::len).max().unwrap_or(0);

        options
            .into_iter()
            .map(|(key, value)| format!("{key:<max_key_len$} = {value}"))
            .collect()
    }

    fn format_global_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert(
            "global.output_log_level".into(),
            self.global.output_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.file_log_level".into(),
            self.global.file_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.log_file".into(),
            self.global
                .log_file
                .as_ref()
                .map_or_else(String::new, |p| p.display().to_string()),
        );
        options.insert("global.json_log".into(), self.global.json_log.to_string());
    }

    fn format_project_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert(
            "project.namespace".into(),
            self.project.namespace.clone().unwrap_or_default(),
        );
        options.insert(
            "project.exploded_root".into(),
            self.project.exploded_root.display().to_string(),
        );
    }

    fn format_remap_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert("remap.strategy".into(), self.remap.strategy.to_string());
        options.insert(
            "remap.threads".into(),
            self.remap
                .threads
                .map_or_else(|| "auto".to_string(), |t| t.to_string()),
        );
        if let Some(prefix) = &self.remap.field_prefix {
            options.insert("remap.field_prefix".into(), prefix.clone());
            options.insert(
                "remap.renamed_fields".into(),
                self.remap.renamed_fields.join(", "),
            );
        }
    }

    fn format_sanitize_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert(
            "sanitize.styleables".into(),
            self.sanitize.styleables.join(", "),
        );
        options.insert(
            "sanitize.application_attrs".into(),
            self.sanitize.application_attrs.join(", "),
        );
        for (prefix, uri) in &self.sanitize.namespaces {
            options.insert(format!("sanitize.namespaces.{prefix}"), uri.clone());
        }
    }

    fn format_variant_options(&self, options: &mut BTreeMap<String, String>) {
        for (name, variant) in &self.variants {
            if let Some(namespace) = &variant.namespace {
                options.insert(format!("variants.{name}.namespace"), namespace.clone());
            }
            let dependencies: Vec<String> = variant
                .dependencies
                .iter()
                .map(ToString::to_string)
                .collect();
            options.insert(
                format!("variants.{name}.dependencies"),
                dependencies.join(", "),
            );
        }
    }
}

fn check_namespace(section: &str, namespace: &str) -> std::result::Result<(), ConfigError> {
    if is_dotted_identifier(namespace) {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            section: section.to_string(),
            key: "namespace".to_string(),
            message: format!("'{namespace}' is not a dotted identifier"),
        })
    }
}
