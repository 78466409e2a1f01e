// fataar-rs: Android library archive merger
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Per-variant dependency registry and the context handed to every phase.
//!
//! ```text
//! resolve (once per variant)         consume (many readers)
//!   publish("release", records) -->  libraries("release")
//!   publish("release", ..) ---X      namespaces("release")
//!        AlreadyPublished            RenameTable::for_variant
//! ```

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use tokio_util::sync::CancellationToken;

use crate::archive::ArchiveRecord;
use crate::config::Config;
use crate::error::{ArchiveError, Result, StoreError};

/// Variant name to the ordered archive records resolved for it.
///
/// Each variant is published exactly once; its list is frozen afterwards.
#[derive(Debug, Default)]
pub struct VariantStore {
    variants: RwLock<BTreeMap<String, Arc<[ArchiveRecord]>>>,
}

impl VariantStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves every configured variant's dependencies into archive records.
    ///
    /// # Errors
    ///
    /// Returns an error if a dependency is not an `aar` artifact.
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = Self::new();
        for (variant, variant_config) in &config.variants {
            let records = variant_config
                .dependencies
                .iter()
                .cloned()
                .map(|descriptor| {
                    ArchiveRecord::new(descriptor, &config.project.exploded_root, variant)
                })
                .collect::<std::result::Result<Vec<_>, ArchiveError>>()?;
            store.publish(variant, records)?;
        }
        Ok(store)
    }

    /// Publishes the dependency list for `variant`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AlreadyPublished` on a second publish for the
    /// same variant; the first list is kept.
    pub fn publish(
        &self,
        variant: &str,
        records: Vec<ArchiveRecord>,
    ) -> std::result::Result<(), StoreError> {
        let mut variants = self
            .variants
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if variants.contains_key(variant) {
            return Err(StoreError::AlreadyPublished(variant.to_string()));
        }
        tracing::debug!(variant = %variant, libraries = records.len(), "published dependencies");
        variants.insert(variant.to_string(), records.into());
        Ok(())
    }

    /// Archive records of `variant`, or `None` if not yet published.
    #[must_use]
    pub fn libraries(&self, variant: &str) -> Option<Arc<[ArchiveRecord]>> {
        self.variants
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(variant)
            .cloned()
    }

    /// Like [`VariantStore::libraries`] but unknown variants are an error.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::UnknownVariant` if nothing was published.
    pub fn require(&self, variant: &str) -> std::result::Result<Arc<[ArchiveRecord]>, StoreError> {
        self.libraries(variant)
            .ok_or_else(|| StoreError::UnknownVariant(variant.to_string()))
    }

    /// Namespaces of every dependency of `variant`, in dependency order.
    ///
    /// `None` if the variant is unknown. The inner error is the first
    /// archive whose manifest could not be read.
    #[must_use]
    pub fn namespaces(
        &self,
        variant: &str,
    ) -> Option<std::result::Result<Vec<String>, ArchiveError>> {
        let libraries = self.libraries(variant)?;
        Some(libraries.iter().map(ArchiveRecord::namespace).collect())
    }

    /// Published variant names, sorted.
    #[must_use]
    pub fn variants(&self) -> Vec<String> {
        self.variants
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }
}

/// Everything a phase needs, passed explicitly instead of living in globals.
#[derive(Debug, Clone)]
pub struct BuildContext {
    config: Arc<Config>,
    store: Arc<VariantStore>,
    cancel: CancellationToken,
}

impl BuildContext {
    #[must_use]
    pub const fn new(config: Arc<Config>, store: Arc<VariantStore>, cancel: CancellationToken) -> Self {
        Self {
            config,
            store,
            cancel,
        }
    }

    /// Builds the store from `config` and wraps both.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`VariantStore::from_config`].
    pub fn from_config(config: Config) -> Result<Self> {
        let store = VariantStore::from_config(&config)?;
        Ok(Self::new(
            Arc::new(config),
            Arc::new(store),
            CancellationToken::new(),
        ))
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &Arc<VariantStore> {
        &self.store
    }

    #[must_use]
    pub const fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Consumer namespace for `variant`: the variant override, else the
    /// project namespace.
    #[must_use]
    pub fn target_namespace(&self, variant: &str) -> Option<&str> {
        self.config
            .variants
            .get(variant)
            .and_then(|v| v.namespace.as_deref())
            .or(self.config.project.namespace.as_deref())
    }
}

#[cfg(test)]
mod tests;
