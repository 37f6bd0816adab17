#![deny(missing_docs)]

//! # docmeta-core — Foundational Types for docmeta
//!
//! The data model shared by every other crate in the workspace: typed views
//! of catalog documents, the failure taxonomy used in validation reports, and
//! entity reference primitives. It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Lenient types, strict schemas.** The [`model`] structs accept any
//!    document the schema accepts and more; schemas decide what is valid.
//!
//! 2. **Failures are data.** [`FailureKind`] classifies problems found in
//!    the catalog. They are collected and reported, never raised.
//!
//! 3. **One entity grammar.** [`entity::ENTITY_PATTERN`] is the single
//!    definition of a well-formed entity reference; schemas embed the same
//!    pattern.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `docmeta-*` crates.
//! - No `unsafe` code.
//! - No `.unwrap()` outside tests. The only `expect` calls compile constant
//!   regexes.

pub mod entity;
pub mod error;
pub mod model;

pub use entity::{is_entity, StyleIssue, ENTITY_PATTERN};
pub use error::{FailureKind, ModelError};
pub use model::{
    parse_each, parse_entries, Excerpt, ExpandedName, Language, MetadataRecord, OperationSet,
    SdkEntry, ServiceEntry, ServiceGuide, VersionBlock,
};
