//! # Error Types — Failure Taxonomy
//!
//! Two families of errors exist in docmeta:
//!
//! - **Failures** describe problems found *in the catalog*. They are
//!   collected, never propagated: a run keeps going after any of them and
//!   reports them all. [`FailureKind`] classifies them.
//! - **Errors** describe problems that prevent interpreting data at all.
//!   [`ModelError`] is raised when a document cannot be read into the typed
//!   data model.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification of a problem found while checking the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The file could not be read or is not valid YAML.
    ParseError,
    /// The file is matched by no schema binding; it is not checked further.
    UnknownSchema,
    /// A field violates a type, enumeration, pattern, or presence constraint.
    SchemaViolation,
    /// A record key is defined by more than one file.
    DuplicateRecord,
}

impl FailureKind {
    /// Short label used in line-oriented reports.
    pub fn label(self) -> &'static str {
        match self {
            Self::ParseError => "parse",
            Self::UnknownSchema => "unknown-schema",
            Self::SchemaViolation => "schema",
            Self::DuplicateRecord => "duplicate",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error interpreting a document as the typed data model.
#[derive(Error, Debug)]
pub enum ModelError {
    /// The document root is not a mapping of keys to entries.
    #[error("expected a mapping at the document root, found {found}")]
    NotAMapping {
        /// JSON type name of what was found instead.
        found: &'static str,
    },

    /// An entry could not be deserialized.
    #[error("entry '{key}' does not match the data model: {source}")]
    Entry {
        /// Top-level key of the offending entry.
        key: String,
        /// Underlying deserialization error.
        #[source]
        source: serde_json::Error,
    },
}
