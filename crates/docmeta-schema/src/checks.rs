//! # Cross-Record Checks
//!
//! Rules a single schema cannot express, applied to the typed records of
//! every example file after schema validation:
//!
//! - a record key is defined in exactly one file;
//! - each `sdk_version` exists for its SDK in `sdks.yaml`;
//! - a snippet tag appears at most once per version block;
//! - every `&` in prose opens a well-formed entity reference;
//! - in strict mode, titles, synopses, and descriptions follow the prose
//!   style rules.
//!
//! Records that already failed their schema are only checked for what the
//! schema could not catch; their deserialization errors are not reported a
//! second time.

use std::collections::{BTreeMap, BTreeSet};

use docmeta_core::entity::{check_sentence, check_synopsis, check_title, malformed_entities};
use docmeta_core::model::escape_pointer;
use docmeta_core::{parse_each, MetadataRecord, SdkEntry};
use serde_json::Value;

use crate::report::Failure;

/// An example metadata document that parsed as YAML.
#[derive(Debug, Clone)]
pub struct ExampleDocument {
    /// Path relative to the metadata root.
    pub file: String,
    /// Parsed document content.
    pub value: Value,
    /// Whether the document passed its schema with no violations.
    pub schema_clean: bool,
}

/// Cross-record rules over a set of example documents.
#[derive(Debug, Clone, Copy)]
pub struct CatalogChecks<'a> {
    sdks: Option<&'a BTreeMap<String, SdkEntry>>,
    strict: bool,
}

impl<'a> CatalogChecks<'a> {
    /// `sdks` is `None` when `sdks.yaml` could not be read; version checks
    /// are then skipped.
    pub fn new(sdks: Option<&'a BTreeMap<String, SdkEntry>>, strict: bool) -> Self {
        Self { sdks, strict }
    }

    /// Run every rule. `documents` must be in a stable order; the first
    /// definition of a duplicated key is the one that is kept.
    pub fn run(&self, documents: &[ExampleDocument]) -> Vec<Failure> {
        let mut failures = Vec::new();
        let mut first_seen: BTreeMap<String, &str> = BTreeMap::new();

        for document in documents {
            let entries = match parse_each::<MetadataRecord>(&document.value) {
                Ok(entries) => entries,
                Err(e) => {
                    if document.schema_clean {
                        failures.push(Failure::from_instance_path(
                            &document.file,
                            "",
                            e.to_string(),
                            None,
                        ));
                    }
                    continue;
                }
            };

            for (key, parsed) in entries {
                match first_seen.get(&key) {
                    Some(first_file) => failures.push(Failure::duplicate_record(
                        &document.file,
                        &key,
                        first_file,
                    )),
                    None => {
                        first_seen.insert(key.clone(), &document.file);
                    }
                }

                let record = match parsed {
                    Ok(record) => record,
                    Err(e) => {
                        if document.schema_clean {
                            failures.push(Failure::violation(&document.file, &key, "", e.to_string()));
                        }
                        continue;
                    }
                };

                let mut ctx = RecordContext {
                    file: &document.file,
                    key: &key,
                    failures: &mut failures,
                };
                self.check_versions(&record, &mut ctx);
                check_snippet_tags(&record, &mut ctx);
                check_entities(&record, &mut ctx);
                if self.strict {
                    check_style(&record, &mut ctx);
                }
            }
        }

        tracing::debug!(
            documents = documents.len(),
            records = first_seen.len(),
            failures = failures.len(),
            "cross-record checks complete"
        );
        failures
    }

    fn check_versions(&self, record: &MetadataRecord, ctx: &mut RecordContext<'_>) {
        let Some(sdks) = self.sdks else {
            return;
        };
        for (sdk, language) in &record.languages {
            // Unknown SDK names are the schema's to report.
            let Some(entry) = sdks.get(sdk) else {
                continue;
            };
            for (i, version) in language.versions.iter().enumerate() {
                if entry.has_version(version.sdk_version) {
                    continue;
                }
                let known: Vec<String> = entry.sdk.keys().map(u32::to_string).collect();
                ctx.push(
                    &format!("/languages/{}/versions/{i}/sdk_version", escape_pointer(sdk)),
                    format!(
                        "sdk_version {} is not a known version of {sdk} (known: {})",
                        version.sdk_version,
                        known.join(", ")
                    ),
                );
            }
        }
    }
}

struct RecordContext<'r> {
    file: &'r str,
    key: &'r str,
    failures: &'r mut Vec<Failure>,
}

impl RecordContext<'_> {
    fn push(&mut self, field: &str, message: String) {
        self.failures
            .push(Failure::violation(self.file, self.key, field, message));
    }
}

fn check_snippet_tags(record: &MetadataRecord, ctx: &mut RecordContext<'_>) {
    for (sdk, language) in &record.languages {
        for (v, version) in language.versions.iter().enumerate() {
            let mut seen = BTreeSet::new();
            for (e, excerpt) in version.excerpts.iter().enumerate() {
                for tag in &excerpt.snippet_tags {
                    if !seen.insert(tag.as_str()) {
                        ctx.push(
                            &format!(
                                "/languages/{}/versions/{v}/excerpts/{e}/snippet_tags",
                                escape_pointer(sdk)
                            ),
                            format!("snippet tag '{tag}' appears more than once in this version"),
                        );
                    }
                }
            }
        }
    }
}

fn check_entities(record: &MetadataRecord, ctx: &mut RecordContext<'_>) {
    for (field, text) in record.text_fields() {
        for fragment in malformed_entities(text) {
            ctx.push(
                &field,
                format!("malformed entity reference '{fragment}'; expected the form &Name;"),
            );
        }
    }
}

fn check_style(record: &MetadataRecord, ctx: &mut RecordContext<'_>) {
    for (field, text) in record.text_fields() {
        let issues = match field.as_str() {
            "/title" | "/title_abbrev" => check_title(text),
            "/synopsis" => check_synopsis(text),
            _ => check_sentence(text),
        };
        for issue in issues {
            ctx.push(&field, format!("{} (\"{text}\")", issue.describe()));
        }
    }
}
