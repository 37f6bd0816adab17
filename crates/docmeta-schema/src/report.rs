//! # Validation Report
//!
//! Every problem found in a run becomes a [`Failure`]. The report keeps them
//! all, in a stable order, so that re-running on unchanged input produces an
//! identical report.

use std::collections::BTreeSet;
use std::fmt;

use docmeta_core::model::unescape_pointer;
use docmeta_core::FailureKind;
use serde::{Deserialize, Serialize};

/// One problem found in the catalog.
///
/// Field order matters: the derived ordering sorts by file, then record
/// key, then field.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Failure {
    /// Path relative to the metadata root, `/`-separated.
    pub file: String,
    /// Top-level key of the offending entry, if the failure is inside one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// JSON Pointer to the offending field, relative to the entry.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub field: String,
    /// What kind of problem this is.
    pub kind: FailureKind,
    /// Human-readable description of the problem.
    pub message: String,
    /// JSON Pointer into the schema for schema violations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_path: Option<String>,
}

impl Failure {
    /// The file could not be read or parsed.
    pub fn parse_error(file: &str, message: impl Into<String>) -> Self {
        Self::file_level(file, FailureKind::ParseError, message.into())
    }

    /// No binding matches the file.
    pub fn unknown_schema(file: &str) -> Self {
        Self::file_level(
            file,
            FailureKind::UnknownSchema,
            "no schema is bound to this file".to_string(),
        )
    }

    /// A schema violation located by a JSON Pointer into the document.
    ///
    /// The first pointer segment is the record key; the rest is the field.
    pub fn from_instance_path(
        file: &str,
        instance_path: &str,
        message: impl Into<String>,
        schema_path: Option<String>,
    ) -> Self {
        let trimmed = instance_path.strip_prefix('/').unwrap_or(instance_path);
        let (key, field) = if trimmed.is_empty() {
            (None, String::new())
        } else {
            match trimmed.split_once('/') {
                Some((key, rest)) => (Some(unescape_pointer(key)), format!("/{rest}")),
                None => (Some(unescape_pointer(trimmed)), String::new()),
            }
        };
        Self {
            file: file.to_string(),
            key,
            field,
            kind: FailureKind::SchemaViolation,
            message: message.into(),
            schema_path,
        }
    }

    /// A rule violation in a known entry and field.
    pub fn violation(file: &str, key: &str, field: &str, message: impl Into<String>) -> Self {
        Self {
            file: file.to_string(),
            key: Some(key.to_string()),
            field: field.to_string(),
            kind: FailureKind::SchemaViolation,
            message: message.into(),
            schema_path: None,
        }
    }

    /// `key` is already defined in `first_file`.
    pub fn duplicate_record(file: &str, key: &str, first_file: &str) -> Self {
        Self {
            file: file.to_string(),
            key: Some(key.to_string()),
            field: String::new(),
            kind: FailureKind::DuplicateRecord,
            message: format!("record key is already defined in {first_file}"),
            schema_path: None,
        }
    }

    fn file_level(file: &str, kind: FailureKind, message: String) -> Self {
        Self {
            file: file.to_string(),
            key: None,
            field: String::new(),
            kind,
            message,
            schema_path: None,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.file)?;
        if let Some(key) = &self.key {
            write!(f, "{key}: ")?;
        }
        if !self.field.is_empty() {
            write!(f, "{}: ", self.field)?;
        }
        f.write_str(&self.message)
    }
}

/// The outcome of one validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Number of catalog files discovered.
    pub files_checked: usize,
    /// Number of those files with no failures.
    pub files_passed: usize,
    /// All failures, sorted.
    pub failures: Vec<Failure>,
}

impl ValidationReport {
    /// Assemble a report, sorting and de-duplicating failures.
    pub fn new(files_checked: usize, mut failures: Vec<Failure>) -> Self {
        failures.sort();
        failures.dedup();
        let failing_files: BTreeSet<&str> = failures.iter().map(|f| f.file.as_str()).collect();
        let files_passed = files_checked.saturating_sub(failing_files.len());
        Self {
            files_checked,
            files_passed,
            failures,
        }
    }

    /// True when no failures were found.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Failures reported against `file`.
    pub fn failures_for<'a>(&'a self, file: &'a str) -> impl Iterator<Item = &'a Failure> + 'a {
        self.failures.iter().filter(move |f| f.file == file)
    }

    /// Number of failures of `kind`.
    pub fn count_of(&self, kind: FailureKind) -> usize {
        self.failures.iter().filter(|f| f.kind == kind).count()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for failure in &self.failures {
            writeln!(f, "{failure}")?;
        }
        write!(
            f,
            "{}/{} files passed, {} failure(s)",
            self.files_passed,
            self.files_checked,
            self.failures.len()
        )
    }
}
