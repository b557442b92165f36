//! Error types for crate construction, load/save and entity lifecycle.

use std::path::PathBuf;

use thiserror::Error;

/// Error raised by crate lifecycle and persistence operations.
///
/// Structural errors (parse, schema, duplicate id, reference) fail fast
/// and abort the operation. Profile-level problems are reported through
/// [`Error::Validation`], which carries the full violation list produced
/// by [`crate::validate::validate`]. The validator itself never errors.
#[derive(Debug, Error)]
pub enum Error {
    /// A file or directory could not be read, written or created.
    #[error("file access failed for {path}: {source}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The metadata document is not valid JSON.
    #[error("invalid JSON in metadata: {0}")]
    Parse(#[from] serde_json::Error),

    /// The document or one of its graph nodes is missing a mandatory
    /// keyword.
    #[error("missing {keyword} keyword{}", display_id(.id))]
    Schema {
        /// The missing JSON-LD keyword (`@graph`, `@id` or `@type`).
        keyword: &'static str,
        /// The node id, when it had one.
        id: Option<String>,
    },

    /// An entity with the same id is already registered.
    #[error("entity with id {0} already exists")]
    DuplicateId(String),

    /// An operation referred to an id no entity resolves to.
    #[error("entity not found: {0}")]
    Reference(String),

    /// A publication was constructed with a disallowed semantic type.
    #[error("the given type is not valid for a publication entity: {0}")]
    PublicationType(String),

    /// Validation before saving failed; the document was not written.
    #[error("validation before saving failed ({} violation(s))", .0.len())]
    Validation(Vec<String>),

    /// A detached package was saved without a file-name prefix.
    #[error("the prefix cannot be empty for a detached RO-Crate package")]
    DetachedPrefix,

    /// A remote entity could not be fetched.
    #[cfg(feature = "remote")]
    #[error("remote entity fetch failed for {url}: {source}")]
    RemoteFetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

fn display_id(id: &Option<String>) -> String {
    match id {
        Some(id) => format!(": {id}"),
        None => String::new(),
    }
}

impl Error {
    /// Returns the violation list when this is a validation failure.
    pub fn violations(&self) -> Option<&[String]> {
        match self {
            Error::Validation(list) => Some(list),
            _ => None,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
