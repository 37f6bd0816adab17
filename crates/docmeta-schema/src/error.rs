//! # Operational Errors
//!
//! Errors that stop a validation run before it can produce a report:
//! an unreadable schema directory, a schema that does not compile, or an
//! invalid configuration. Problems *in the catalog* are not errors; they are
//! [`Failure`](crate::Failure)s collected into the report.

use thiserror::Error;

/// Error raised while setting up or running the validator.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// A schema document could not be read or parsed.
    #[error("schema load error for '{name}': {reason}")]
    SchemaLoad {
        /// Schema filename or directory.
        name: String,
        /// Reason the schema could not be loaded.
        reason: String,
    },

    /// A binding or caller named a schema the registry does not hold.
    #[error("schema not found: {0}")]
    SchemaNotFound(String),

    /// The schema document is not a valid JSON Schema.
    #[error("validator build error for schema '{name}': {reason}")]
    SchemaCompile {
        /// Schema filename.
        name: String,
        /// Reason the validator could not be built.
        reason: String,
    },

    /// The configuration file or an override is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error reading configuration or schemas.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
