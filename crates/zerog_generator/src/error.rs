//! Error types for override generation.
//!
//! All fallible functions in this crate return [`Result<T>`], which uses [`Error`]
//! as the error type. Filesystem and parse errors carry the path they occurred on so
//! the CLI can point the user at the offending file.

use crate::document::ParseError;
use crate::store::FileKind;
use camino::Utf8PathBuf;
use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while generating overrides.
#[derive(Error, Debug)]
pub enum Error {
    /// Filesystem I/O failed (reading a mod file, clearing a container, writing output).
    #[error("IO error at {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file that must be a JSON document could not be parsed.
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: Utf8PathBuf,
        #[source]
        source: ParseError,
    },

    /// A document did not have the expected shape, or failed to serialize.
    #[error("JSON error in {path}: {source}")]
    Json {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A `.modinfo` manifest could not be read.
    #[error("Manifest error: {0}")]
    ModInfo(#[from] zerog_modinfo::Error),

    /// The content store only accepts absolute paths.
    #[error("Path is not absolute: {0}")]
    RelativePath(Utf8PathBuf),

    /// Paths are handled as UTF-8 throughout.
    #[error("Non-UTF-8 path: {}", .0.display())]
    NonUtf8Path(PathBuf),

    /// A path was requested as a different kind of file than it was first loaded as.
    #[error("{path} was already loaded as a {existing} file")]
    KindMismatch { path: Utf8PathBuf, existing: FileKind },

    /// A mod directory contains more than one `.modinfo` file at its root.
    #[error("Multiple .modinfo files found in {dir}: {count}")]
    MultipleManifests { dir: Utf8PathBuf, count: usize },

    /// A mod directory has no `.modinfo` file and manifest synthesis is disabled.
    #[error("No .modinfo file found in {0}")]
    MissingManifest(Utf8PathBuf),

    /// A document lacks a field the generator cannot do without.
    #[error("{path} is missing required field `{field}`")]
    MissingField { path: Utf8PathBuf, field: String },

    /// An asset referenced by a plant does not exist.
    #[error("Referenced asset not found: {0}")]
    MissingAsset(Utf8PathBuf),

    /// An orientation's image reference could not be interpreted.
    #[error("Invalid image reference {reference:?} in {path}")]
    InvalidImageReference { path: Utf8PathBuf, reference: String },

    /// Decoding, rotating or re-encoding a sprite sheet failed.
    #[error("Failed to rotate image {path}: {source}")]
    Image {
        path: Utf8PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Walking a mod directory failed.
    #[error("Failed to walk {path}: {source}")]
    Walk {
        path: Utf8PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// Listing manifests with a glob pattern failed.
    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

impl Error {
    pub(crate) fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<Utf8PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn missing_field(path: impl Into<Utf8PathBuf>, field: &str) -> Self {
        Self::MissingField {
            path: path.into(),
            field: field.to_string(),
        }
    }

    /// Whether the error is a user configuration problem rather than a data or IO failure.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::MultipleManifests { .. } | Error::MissingManifest(_) | Error::ModInfo(_)
        )
    }
}
