//! # Typed Catalog
//!
//! The rendering step only consumes a catalog that validated cleanly.
//! [`Catalog::load`] runs the validator and hands back typed records only
//! when the report is empty.

use std::collections::BTreeMap;

use docmeta_core::{parse_entries, MetadataRecord, SdkEntry, ServiceEntry};
use thiserror::Error;

use crate::config::DocumentKind;
use crate::discover::discover;
use crate::document::load_document;
use crate::report::ValidationReport;
use crate::validate::Validator;

/// Why a typed catalog could not be produced.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The validator reported failures; the report is attached.
    #[error("catalog failed validation with {} failure(s)", .0.failures.len())]
    Invalid(ValidationReport),

    /// A file changed between validation and loading, or the typed model
    /// rejected something the schema accepted.
    #[error("cannot load {file}: {reason}")]
    Load {
        /// Path relative to the metadata root.
        file: String,
        /// What went wrong.
        reason: String,
    },
}

/// A validated catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// Example records by key.
    pub records: BTreeMap<String, MetadataRecord>,
    /// SDKs by name.
    pub sdks: BTreeMap<String, SdkEntry>,
    /// Services by name.
    pub services: BTreeMap<String, ServiceEntry>,
}

impl Catalog {
    /// Validate the catalog and, if it passes, load it.
    ///
    /// # Errors
    ///
    /// [`CatalogError::Invalid`] carries the full report when anything
    /// failed validation.
    pub fn load(validator: &Validator) -> Result<Self, CatalogError> {
        let report = validator.run();
        if !report.is_success() {
            return Err(CatalogError::Invalid(report));
        }

        let config = validator.config();
        let mut catalog = Catalog::default();
        for path in discover(config) {
            let Some(binding) = config.binding_for(&path) else {
                continue;
            };
            let file = config.relative(&path);
            let load_error = |reason: String| CatalogError::Load {
                file: file.clone(),
                reason,
            };
            let value = load_document(&path).map_err(|e| load_error(e.to_string()))?;
            match binding.kind {
                DocumentKind::Examples => {
                    let records = parse_entries::<MetadataRecord>(&value)
                        .map_err(|e| load_error(e.to_string()))?;
                    catalog.records.extend(records);
                }
                DocumentKind::Sdks => {
                    catalog.sdks = parse_entries(&value).map_err(|e| load_error(e.to_string()))?;
                }
                DocumentKind::Services => {
                    catalog.services =
                        parse_entries(&value).map_err(|e| load_error(e.to_string()))?;
                }
                DocumentKind::Other => {}
            }
        }

        tracing::info!(
            records = catalog.records.len(),
            sdks = catalog.sdks.len(),
            services = catalog.services.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Record keys that document `service`, sorted.
    pub fn records_for_service<'a>(&'a self, service: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.records
            .iter()
            .filter(move |(_, record)| record.all_services().contains(service))
            .map(|(key, _)| key.as_str())
    }

    /// Number of records with an example for each SDK.
    pub fn sdk_coverage(&self) -> BTreeMap<&str, usize> {
        let mut coverage: BTreeMap<&str, usize> =
            self.sdks.keys().map(|sdk| (sdk.as_str(), 0)).collect();
        for record in self.records.values() {
            for sdk in record.languages.keys() {
                *coverage.entry(sdk.as_str()).or_default() += 1;
            }
        }
        coverage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidationConfig;
    use std::path::Path;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn catalog_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "validation/example.schema.yaml", "type: object\n");
        write(root, "validation/sdks.schema.yaml", "type: object\n");
        write(root, "validation/services.schema.yaml", "type: object\n");
        write(
            root,
            "sdks.yaml",
            "Java:\n  property: java\n  sdk:\n    2:\n      long: \"&JavaV2long;\"\n      short: \"&JavaV2;\"\nGo:\n  property: go\n  sdk:\n    2:\n      long: \"&GoV2long;\"\n      short: \"&GoV2;\"\n",
        );
        write(
            root,
            "services.yaml",
            "sqs:\n  long: \"&SQSlong;\"\n  short: \"&SQS;\"\n  sort: SQS\n  version: sqs-2012-11-05\n",
        );
        write(
            root,
            "metadata/sqs_metadata.yaml",
            "sqs_ReceiveMessage:\n  languages:\n    Java:\n      versions:\n        - sdk_version: 2\n  services:\n    sqs: {ReceiveMessage}\n",
        );
        dir
    }

    #[test]
    fn loads_typed_catalog_when_valid() {
        let dir = catalog_dir();
        let validator = Validator::new(dir.path(), &ValidationConfig::default()).unwrap();
        let catalog = Catalog::load(&validator).unwrap();
        assert_eq!(catalog.records.len(), 1);
        assert_eq!(catalog.services["sqs"].short, "&SQS;");
        assert_eq!(
            catalog.records_for_service("sqs").collect::<Vec<_>>(),
            vec!["sqs_ReceiveMessage"]
        );
        assert!(catalog.records_for_service("s3").next().is_none());
        let coverage = catalog.sdk_coverage();
        assert_eq!(coverage["Java"], 1);
        assert_eq!(coverage["Go"], 0);
    }

    #[test]
    fn refuses_invalid_catalog() {
        let dir = catalog_dir();
        write(dir.path(), "metadata/notes.yaml", "a: 1\n");
        let validator = Validator::new(dir.path(), &ValidationConfig::default()).unwrap();
        match Catalog::load(&validator) {
            Err(CatalogError::Invalid(report)) => assert_eq!(report.failures.len(), 1),
            other => panic!("expected invalid catalog, got {other:?}"),
        }
    }
}
