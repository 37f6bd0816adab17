#![deny(missing_docs)]

//! # docmeta-schema — Schema Registry & Catalog Validation
//!
//! Validates a documentation metadata catalog: YAML files describing code
//! examples, SDKs, and services, checked against JSON Schema documents
//! (Draft 2020-12) authored in YAML.
//!
//! ## Pipeline
//!
//! 1. [`config`] resolves the catalog layout and the glob bindings that map
//!    each file to its schema.
//! 2. [`registry`] loads the schema documents, registers the SDK and
//!    service vocabularies, and compiles validators with the custom
//!    `entity` and `block-content` formats.
//! 3. [`discover`] walks the catalog for YAML files.
//! 4. [`validate::Validator`] checks each file against its schema, then
//!    [`checks`] applies the cross-record rules.
//! 5. Everything found lands in a [`ValidationReport`].
//!
//! [`Catalog`] loads typed records from a catalog that passed.
//!
//! ## Crate Policy
//!
//! - Depends only on `docmeta-core` internally.
//! - Problems in the catalog are [`Failure`]s in the report; only problems
//!   that prevent a run (schemas, configuration) are [`SchemaError`]s.
//! - Schema `$id` and `$ref` URIs resolve locally. Nothing is fetched over
//!   the network.

pub mod catalog;
pub mod checks;
pub mod config;
pub mod discover;
pub mod document;
pub mod error;
pub mod registry;
pub mod report;
pub mod validate;

pub use catalog::{Catalog, CatalogError};
pub use checks::{CatalogChecks, ExampleDocument};
pub use config::{DocumentKind, ResolvedConfig, SchemaBinding, ValidationConfig};
pub use document::{load_document, DocumentError};
pub use error::SchemaError;
pub use registry::{FormatContext, SchemaRegistry};
pub use report::{Failure, ValidationReport};
pub use validate::Validator;
