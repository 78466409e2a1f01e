// fataar-rs: Android library archive merger
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error handling module.
//!
//! ```text
//!                FatAarError (~24 bytes)
//!                       |
//!   +-------+------+----+----+------+------+-----+
//!   |       |      |    |    |      |      |     |
//!   v       v      v    v    v      v      v     v
//! Bail  Archive Class  Xml Store Manifest Cfg  Fs/Io/Other
//!         Box    Box   Box  Box    Box    Box   Box<str>
//!
//! Sub-errors (unboxed internally):
//!   Archive   NotAnArchive, ManifestMissing, InvalidManifest
//!   ClassFile InvalidMagic, UnexpectedEof, UnsupportedConstant
//!   Xml       Parse, Write, NoRoot
//!   Store     AlreadyPublished, UnknownVariant
//!   Manifest  MergeFailed, MergerNotFound
//!   Config    ParseError, MissingKey, InvalidValue
//!   Fs        NotFound, IoError
//! ```

use std::path::Path;

use thiserror::Error;

/// Convenience alias for `anyhow::Result`.
pub type Result<T> = anyhow::Result<T>;

/// Result type using [`FatAarError`].
pub type FatAarResult<T> = std::result::Result<T, FatAarError>;

/// Top-level application error type.
///
/// All sub-errors are boxed to keep this enum at ~24 bytes on the stack.
#[derive(Debug, Error)]
pub enum FatAarError {
    /// Fatal error that should terminate the application.
    #[error("fatal error: {0}")]
    Bailed(Box<str>),

    /// Archive layout or manifest error.
    #[error("archive error: {0}")]
    Archive(#[from] Box<ArchiveError>),

    /// Compiled unit could not be decoded or encoded.
    #[error("class file error: {0}")]
    ClassFile(#[from] Box<ClassFileError>),

    /// Resource or manifest document error.
    #[error("xml error: {0}")]
    Xml(#[from] Box<XmlError>),

    /// Variant dependency store error.
    #[error("store error: {0}")]
    Store(#[from] Box<StoreError>),

    /// Manifest merge error.
    #[error("manifest error: {0}")]
    Manifest(#[from] Box<ManifestMergeError>),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] Box<ConfigError>),

    /// Filesystem error.
    #[error("filesystem error: {0}")]
    Fs(#[from] Box<FsError>),

    /// I/O error.
    #[error("io error: {0}")]
    Io(Box<std::io::Error>),

    /// Generic error with message.
    #[error("{0}")]
    Other(Box<str>),
}

/// Create a fatal [`FatAarError::Bailed`] that terminates the application.
pub fn bail_out(message: impl Into<String>) -> FatAarError {
    FatAarError::Bailed(message.into().into_boxed_str())
}

// --- From implementations for boxing ---

/// Macro to generate `From` implementations that box the source error.
macro_rules! impl_from_boxed {
    ($($error:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$error> for FatAarError {
                fn from(err: $error) -> Self {
                    FatAarError::$variant(Box::new(err))
                }
            }
        )+
    };
}

impl_from_boxed! {
    ArchiveError => Archive,
    ClassFileError => ClassFile,
    XmlError => Xml,
    StoreError => Store,
    ManifestMergeError => Manifest,
    ConfigError => Config,
    FsError => Fs,
    std::io::Error => Io,
}

// --- Archive Errors ---

/// Errors raised by the archive model.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The resolved dependency is not an Android library archive.
    #[error("artifact '{coordinate}' has type '{kind}', expected 'aar'")]
    NotAnArchive { coordinate: String, kind: String },

    /// The archive has no manifest where one was expected.
    #[error("{coordinate}: AndroidManifest.xml not found at {path}")]
    ManifestMissing { coordinate: String, path: String },

    /// The manifest exists but does not declare a usable namespace.
    #[error("{coordinate}: invalid manifest {path}: {message}")]
    InvalidManifest {
        coordinate: String,
        path: String,
        message: String,
    },
}

// --- Class File Errors ---

/// Errors raised while decoding or encoding a compiled unit.
#[derive(Debug, Error)]
pub enum ClassFileError {
    /// Input ended before the structure was complete.
    #[error("unexpected end of class file")]
    UnexpectedEof,

    /// The `0xCAFEBABE` header is missing.
    #[error("invalid class file magic header")]
    InvalidMagic,

    /// The constant pool contains a tag this tool does not know.
    #[error("unsupported constant pool tag {tag} at index {index}")]
    UnsupportedConstant { tag: u8, index: u16 },

    /// An index does not point at an entry of the expected kind.
    #[error("invalid constant pool index {index}")]
    InvalidConstantIndex { index: u16 },

    /// Appending entries would exceed the 65535 entry limit.
    #[error("constant pool overflow: {count} entries")]
    PoolOverflow { count: usize },

    /// A Utf8 entry is longer than the format allows.
    #[error("constant pool string too long: {len} bytes")]
    StringTooLong { len: usize },
}

// --- XML Errors ---

/// Resource and manifest document errors.
#[derive(Debug, Error)]
pub enum XmlError {
    /// Document could not be parsed.
    #[error("failed to parse '{path}': {message}")]
    Parse { path: String, message: String },

    /// Document could not be serialized.
    #[error("failed to write '{path}': {message}")]
    Write { path: String, message: String },

    /// Document has no root element.
    #[error("document '{path}' has no root element")]
    NoRoot { path: String },
}

impl XmlError {
    /// Creates a parse error for the document at `path`.
    pub fn parse(path: &Path, message: impl std::fmt::Display) -> Self {
        Self::Parse {
            path: path.display().to_string(),
            message: message.to_string(),
        }
    }

    /// Creates a write error for the document at `path`.
    pub fn write(path: &Path, message: impl std::fmt::Display) -> Self {
        Self::Write {
            path: path.display().to_string(),
            message: message.to_string(),
        }
    }
}

// --- Store Errors ---

/// Variant dependency store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A variant's dependency list was published twice.
    #[error("dependencies for variant '{0}' were already published")]
    AlreadyPublished(String),

    /// No dependencies were published for the variant.
    #[error("unknown variant '{0}'")]
    UnknownVariant(String),
}

// --- Manifest Merge Errors ---

/// Errors from the external manifest merger.
#[derive(Debug, Error)]
pub enum ManifestMergeError {
    /// The merger reported an error; the report is kept verbatim.
    #[error("manifest merge failed:\n{report}")]
    MergeFailed { report: String },

    /// The merger executable could not be located.
    #[error("manifest merger '{program}' not found")]
    MergerNotFound { program: String },

    /// The main manifest does not exist.
    #[error("main manifest not found: {0}")]
    MainManifestMissing(String),
}

// --- Config Errors ---

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },

    /// Missing required configuration key.
    #[error("missing required config key '{key}' in section '[{section}]'")]
    MissingKey { section: String, key: String },

    /// Invalid configuration value.
    #[error("invalid value for '{key}' in section '[{section}]': {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },
}

// --- Filesystem Errors ---

/// Filesystem operation errors.
#[derive(Debug, Error)]
pub enum FsError {
    /// Path not found.
    #[error("path not found: {0}")]
    NotFound(String),

    /// General I/O error.
    #[error("I/O error on '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl FsError {
    /// Wraps an I/O error with the path it happened on.
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.display().to_string(),
            source,
        }
    }
}
