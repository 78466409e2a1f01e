// fataar-rs: Android library archive merger
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Read-only view of one exploded library archive.
//!
//! ```text
//! <exploded_root>/<group>/<name>/<version>/<variant>/
//!   AndroidManifest.xml    manifest_path()  -> namespace()
//!   res/                   resource_root()
//!     values/values.xml    values_file()
//!   classes/               code_root()
//!   classes.jar            classes_jar()
//!   jni/                   native_root()
//!   libs/*.jar             local_jars()
//!   aidl/ assets/ lint.jar R.txt proguard-rules.pro ...
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ArchiveError;
use crate::utility::fs::walk::{WalkOptions, find_files};
use crate::xml::Document;

/// Artifact kind that can be exploded into an [`ArchiveRecord`].
pub const ARCHIVE_KIND: &str = "aar";

/// A resolved dependency as reported by the host build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactDescriptor {
    pub group: String,
    pub name: String,
    pub version: String,
    /// Artifact type, `aar` or `jar`.
    #[serde(default = "default_kind")]
    pub kind: String,
    /// Explicit exploded location, overriding the computed layout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
}

fn default_kind() -> String {
    ARCHIVE_KIND.to_string()
}

impl ArtifactDescriptor {
    /// Creates an `aar` descriptor.
    pub fn aar(
        group: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            version: version.into(),
            kind: ARCHIVE_KIND.to_string(),
            root: None,
        }
    }

    /// Sets an explicit exploded root.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// `group:name:version`.
    #[must_use]
    pub fn coordinate(&self) -> String {
        format!("{}:{}:{}", self.group, self.name, self.version)
    }

    /// Whether this artifact is an Android library archive.
    #[must_use]
    pub fn is_archive(&self) -> bool {
        self.kind.eq_ignore_ascii_case(ARCHIVE_KIND)
    }
}

impl fmt::Display for ArtifactDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}@{}", self.group, self.name, self.version, self.kind)
    }
}

/// One dependency archive exploded on disk for a specific variant.
///
/// Paths are computed, never checked; only [`ArchiveRecord::namespace`]
/// and [`ArchiveRecord::local_jars`] touch the filesystem.
#[derive(Debug)]
pub struct ArchiveRecord {
    descriptor: ArtifactDescriptor,
    variant: String,
    root: PathBuf,
    namespace: Mutex<Option<String>>,
}

impl Clone for ArchiveRecord {
    fn clone(&self) -> Self {
        Self {
            descriptor: self.descriptor.clone(),
            variant: self.variant.clone(),
            root: self.root.clone(),
            namespace: Mutex::new(lock_cache(&self.namespace).clone()),
        }
    }
}

impl ArchiveRecord {
    /// Creates the record for `descriptor` exploded under `exploded_root`.
    ///
    /// # Errors
    ///
    /// Returns `ArchiveError::NotAnArchive` if the descriptor is not an `aar`.
    pub fn new(
        descriptor: ArtifactDescriptor,
        exploded_root: &Path,
        variant: &str,
    ) -> Result<Self, ArchiveError> {
        if !descriptor.is_archive() {
            return Err(ArchiveError::NotAnArchive {
                coordinate: descriptor.coordinate(),
                kind: descriptor.kind,
            });
        }

        let root = descriptor.root.clone().unwrap_or_else(|| {
            exploded_root
                .join(&descriptor.group)
                .join(&descriptor.name)
                .join(&descriptor.version)
                .join(variant)
        });

        Ok(Self {
            descriptor,
            variant: variant.to_string(),
            root,
            namespace: Mutex::new(None),
        })
    }

    #[must_use]
    pub const fn descriptor(&self) -> &ArtifactDescriptor {
        &self.descriptor
    }

    #[must_use]
    pub fn coordinate(&self) -> String {
        self.descriptor.coordinate()
    }

    #[must_use]
    pub fn variant(&self) -> &str {
        &self.variant
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join("AndroidManifest.xml")
    }

    #[must_use]
    pub fn resource_root(&self) -> PathBuf {
        self.root.join("res")
    }

    /// The merged values document, `res/values/values.xml`.
    #[must_use]
    pub fn values_file(&self) -> PathBuf {
        self.resource_root().join("values").join("values.xml")
    }

    #[must_use]
    pub fn code_root(&self) -> PathBuf {
        self.root.join("classes")
    }

    #[must_use]
    pub fn classes_jar(&self) -> PathBuf {
        self.root.join("classes.jar")
    }

    #[must_use]
    pub fn native_root(&self) -> PathBuf {
        self.root.join("jni")
    }

    #[must_use]
    pub fn libs_root(&self) -> PathBuf {
        self.root.join("libs")
    }

    #[must_use]
    pub fn aidl_root(&self) -> PathBuf {
        self.root.join("aidl")
    }

    #[must_use]
    pub fn assets_root(&self) -> PathBuf {
        self.root.join("assets")
    }

    #[must_use]
    pub fn lint_jar(&self) -> PathBuf {
        self.root.join("lint.jar")
    }

    /// Consumer keep rules shipped with the archive, in lookup order.
    #[must_use]
    pub fn proguard_rules(&self) -> Vec<PathBuf> {
        vec![
            self.root.join("proguard-rules.pro"),
            self.root.join("proguard-project.txt"),
        ]
    }

    /// Text symbol list, `R.txt`.
    #[must_use]
    pub fn symbol_file(&self) -> PathBuf {
        self.root.join("R.txt")
    }

    #[must_use]
    pub fn data_binding_root(&self) -> PathBuf {
        self.root.join("data-binding")
    }

    #[must_use]
    pub fn data_binding_log_root(&self) -> PathBuf {
        self.root.join("data-binding-base-class-log")
    }

    /// Regular `*.jar` files directly inside `libs/`, sorted.
    ///
    /// A missing `libs/` directory yields an empty list.
    #[must_use]
    pub fn local_jars(&self) -> Vec<PathBuf> {
        let libs = self.libs_root();
        if !libs.is_dir() {
            return Vec::new();
        }

        let options = WalkOptions::builder()
            .with_max_depth(1)
            .with_include_hidden(true)
            .with_respect_gitignore(false)
            .build();
        match find_files(&libs, "*.jar", &options) {
            Ok(jars) => jars,
            Err(e) => {
                tracing::warn!(archive = %self.coordinate(), error = %e, "failed to list local jars");
                Vec::new()
            }
        }
    }

    /// Package declared by the manifest's root element.
    ///
    /// Parsed on first call and cached; concurrent first callers parse once.
    ///
    /// # Errors
    ///
    /// - `ArchiveError::ManifestMissing` if the manifest does not exist.
    /// - `ArchiveError::InvalidManifest` if it cannot be parsed or does not
    ///   declare a dotted `package`.
    pub fn namespace(&self) -> Result<String, ArchiveError> {
        let mut cached = lock_cache(&self.namespace);
        if let Some(namespace) = cached.as_ref() {
            return Ok(namespace.clone());
        }

        let namespace = self.read_namespace()?;
        tracing::debug!(archive = %self.coordinate(), namespace = %namespace, "resolved namespace");
        *cached = Some(namespace.clone());
        Ok(namespace)
    }

    fn read_namespace(&self) -> Result<String, ArchiveError> {
        let path = self.manifest_path();
        if !path.is_file() {
            return Err(ArchiveError::ManifestMissing {
                coordinate: self.coordinate(),
                path: path.display().to_string(),
            });
        }

        let invalid = |message: String| ArchiveError::InvalidManifest {
            coordinate: self.coordinate(),
            path: path.display().to_string(),
            message,
        };

        let document = Document::load(&path).map_err(|e| invalid(e.to_string()))?;
        let package = document
            .root()
            .attr("package")
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .ok_or_else(|| invalid("root element has no 'package' attribute".to_string()))?;

        if !is_dotted_identifier(&package) {
            return Err(invalid(format!("'{package}' is not a valid package name")));
        }
        Ok(package)
    }
}

fn lock_cache(cache: &Mutex<Option<String>>) -> std::sync::MutexGuard<'_, Option<String>> {
    cache
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

fn package_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*(\.[A-Za-z_$][A-Za-z0-9_$]*)*$").ok())
        .as_ref()
}

/// Whether `name` is a dotted identifier such as `com.example.lib`.
#[must_use]
pub fn is_dotted_identifier(name: &str) -> bool {
    package_pattern().is_some_and(|re| re.is_match(name))
}
