// fataar-rs: Android library archive merger
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Cross-library rename table for generated resource symbol classes.
//!
//! ```text
//! target  com.sdk          deps  [com.lib1, com.lib2]
//!
//!   com/lib1/R$string  --> com/sdk/R$string
//!   com/lib2/R$string  --> com/sdk/R$string
//!   com/lib1/R$attr    --> com/sdk/R$attr
//!   ...                    (one row per dependency x category)
//! ```
//!
//! Keys and values are class names in internal form (`/` separated) so
//! lookups during remapping need no conversion.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{ArchiveError, ConfigError};
use crate::store::VariantStore;

/// Category of a generated resource symbol class (`R$<category>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceCategory {
    Anim,
    Animator,
    Array,
    Attr,
    Bool,
    Color,
    Dimen,
    Drawable,
    Font,
    Fraction,
    Id,
    Integer,
    Interpolator,
    Layout,
    Menu,
    Mipmap,
    Navigation,
    Plurals,
    Raw,
    String,
    Style,
    Styleable,
    Transition,
    Xml,
}

impl ResourceCategory {
    /// Every category, in declaration order.
    pub const ALL: [Self; 24] = [
        Self::Anim,
        Self::Animator,
        Self::Array,
        Self::Attr,
        Self::Bool,
        Self::Color,
        Self::Dimen,
        Self::Drawable,
        Self::Font,
        Self::Fraction,
        Self::Id,
        Self::Integer,
        Self::Interpolator,
        Self::Layout,
        Self::Menu,
        Self::Mipmap,
        Self::Navigation,
        Self::Plurals,
        Self::Raw,
        Self::String,
        Self::Style,
        Self::Styleable,
        Self::Transition,
        Self::Xml,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Anim => "anim",
            Self::Animator => "animator",
            Self::Array => "array",
            Self::Attr => "attr",
            Self::Bool => "bool",
            Self::Color => "color",
            Self::Dimen => "dimen",
            Self::Drawable => "drawable",
            Self::Font => "font",
            Self::Fraction => "fraction",
            Self::Id => "id",
            Self::Integer => "integer",
            Self::Interpolator => "interpolator",
            Self::Layout => "layout",
            Self::Menu => "menu",
            Self::Mipmap => "mipmap",
            Self::Navigation => "navigation",
            Self::Plurals => "plurals",
            Self::Raw => "raw",
            Self::String => "string",
            Self::Style => "style",
            Self::Styleable => "styleable",
            Self::Transition => "transition",
            Self::Xml => "xml",
        }
    }

    /// Splits an internal symbol class name such as `com/lib/R$string`
    /// into its package (`com/lib`) and category.
    #[must_use]
    pub fn split_symbol_class(internal_name: &str) -> Option<(&str, Self)> {
        let (package, category) = internal_name.rsplit_once("/R$")?;
        Some((package, category.parse().ok()?))
    }
}

impl fmt::Display for ResourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceCategory {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| ConfigError::InvalidValue {
                section: "remap".to_string(),
                key: "category".to_string(),
                message: format!("unknown resource category '{s}'"),
            })
    }
}

/// Internal name of the root symbol class of `namespace`, e.g. `com/lib/R`.
#[must_use]
pub fn symbol_root(namespace: &str) -> String {
    format!("{}/R", namespace.replace('.', "/"))
}

/// Internal name of the `category` symbol class of `namespace`.
#[must_use]
pub fn symbol_class(namespace: &str, category: ResourceCategory) -> String {
    format!("{}${category}", symbol_root(namespace))
}

/// Converts an internal class name to dotted form.
#[must_use]
pub fn to_dotted(internal_name: &str) -> String {
    internal_name.replace('/', ".")
}

/// One row of a [`RenameTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameEntry<'a> {
    pub source_namespace: &'a str,
    pub category: ResourceCategory,
    pub source: &'a str,
    pub target: &'a str,
}

/// Mapping from dependency symbol classes to consumer symbol classes.
///
/// Built once per variant and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameTable {
    target_namespace: String,
    source_namespaces: Vec<String>,
    /// source internal name -> (source namespace index, category, target internal name)
    map: BTreeMap<String, (usize, ResourceCategory, String)>,
}

impl RenameTable {
    /// Builds the table for `target` from the dependency namespaces.
    ///
    /// Returns `None` while either input is unknown, which leaves compiled
    /// units untouched. Dependencies equal to `target` are skipped and
    /// duplicates collapse, so no class ever maps to itself.
    #[must_use]
    pub fn build(target: Option<&str>, dependencies: Option<&[String]>) -> Option<Self> {
        let target = target?;
        let dependencies = dependencies?;

        let mut source_namespaces: Vec<String> = Vec::new();
        for namespace in dependencies {
            if namespace != target && !source_namespaces.contains(namespace) {
                source_namespaces.push(namespace.clone());
            }
        }

        let mut map = BTreeMap::new();
        for category in ResourceCategory::ALL {
            let target_class = symbol_class(target, category);
            for (index, namespace) in source_namespaces.iter().enumerate() {
                map.insert(
                    symbol_class(namespace, category),
                    (index, category, target_class.clone()),
                );
            }
        }

        tracing::debug!(
            target = %target,
            dependencies = source_namespaces.len(),
            entries = map.len(),
            "built rename table"
        );

        Some(Self {
            target_namespace: target.to_string(),
            source_namespaces,
            map,
        })
    }

    /// Builds the table for `variant` from the namespaces published in `store`.
    ///
    /// Returns `Ok(None)` if the variant has not been published yet.
    ///
    /// # Errors
    ///
    /// Returns the archive error of the first dependency whose namespace
    /// cannot be read, e.g. `ArchiveError::ManifestMissing`.
    pub fn for_variant(
        store: &VariantStore,
        variant: &str,
        target: Option<&str>,
    ) -> Result<Option<Self>, ArchiveError> {
        let namespaces = store.namespaces(variant).transpose()?;
        Ok(Self::build(target, namespaces.as_deref()))
    }

    /// Consumer symbol class for the dependency symbol class `internal_name`.
    #[must_use]
    pub fn get(&self, internal_name: &str) -> Option<&str> {
        self.map.get(internal_name).map(|(_, _, target)| target.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    #[must_use]
    pub fn target_namespace(&self) -> &str {
        &self.target_namespace
    }

    #[must_use]
    pub fn source_namespaces(&self) -> &[String] {
        &self.source_namespaces
    }

    /// `(source, target)` pairs in internal form, sorted by source.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map
            .iter()
            .map(|(source, (_, _, target))| (source.as_str(), target.as_str()))
    }

    /// Rows with their namespace and category, sorted by source.
    pub fn entries(&self) -> impl Iterator<Item = RenameEntry<'_>> {
        self.map
            .iter()
            .map(|(source, (index, category, target))| RenameEntry {
                source_namespace: &self.source_namespaces[*index],
                category: *category,
                source,
                target,
            })
    }
}

#[cfg(test)]
mod tests;
