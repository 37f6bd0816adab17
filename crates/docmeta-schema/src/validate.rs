//! # Catalog Validation
//!
//! Checks every YAML file under a metadata root against the schema bound to
//! it, then runs the cross-record checks over the example records. Nothing
//! short-circuits: a file that fails to parse is reported and the run moves
//! on to the next one.
//!
//! ## Setup
//!
//! [`Validator::new`] does all the fallible work up front. The schema
//! directory is loaded, the SDK and service vocabularies are read from the
//! catalog, and every bound schema is compiled once. An error here is
//! operational (the run cannot proceed); everything found afterwards is a
//! [`Failure`] in the report.
//!
//! ## Vocabulary files
//!
//! `sdks.yaml` and `services.yaml` are also catalog files with schemas of
//! their own. If one of them cannot be read, its vocabulary is left
//! unregistered so that the problem surfaces once, as that file's parse
//! error, rather than as an enum violation in every record.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use docmeta_core::{parse_entries, SdkEntry};
use serde_json::Value;

use crate::checks::{CatalogChecks, ExampleDocument};
use crate::config::{DocumentKind, ResolvedConfig, ValidationConfig};
use crate::discover::discover;
use crate::document::{load_document, top_level_keys};
use crate::error::SchemaError;
use crate::registry::{FormatContext, SchemaRegistry};
use crate::report::{Failure, ValidationReport};

/// Vocabulary name for the keys of `sdks.yaml`.
pub const SDKS_VOCABULARY: &str = "sdks";

/// Vocabulary name for the keys of `services.yaml`.
pub const SERVICES_VOCABULARY: &str = "services";

/// Validates a metadata catalog.
///
/// Holds compiled validators, so one instance can check the same catalog
/// repeatedly; every run re-reads the files from disk.
pub struct Validator {
    config: ResolvedConfig,
    registry: SchemaRegistry,
    /// Schema filename to compiled validator, one per bound schema.
    compiled: HashMap<String, jsonschema::Validator>,
    sdks: Option<BTreeMap<String, SdkEntry>>,
}

/// What checking a single file produced.
struct FileOutcome {
    failures: Vec<Failure>,
    example: Option<ExampleDocument>,
}

impl Validator {
    /// Prepare to validate the catalog under `root`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Config`] if `root` is not a directory or the
    /// configuration is invalid, and any registry error from loading or
    /// compiling the bound schemas.
    pub fn new(root: impl AsRef<Path>, config: &ValidationConfig) -> Result<Self, SchemaError> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(SchemaError::Config(format!(
                "metadata root {} is not a directory",
                root.display()
            )));
        }

        let config = config.resolve(root)?;
        let mut registry = SchemaRegistry::load(&config.schema_dir)?;

        let sdks_document = load_vocabulary(&config.sdks_file);
        if let Some(document) = &sdks_document {
            registry.with_vocabulary(SDKS_VOCABULARY, top_level_keys(document));
        }
        if let Some(document) = load_vocabulary(&config.services_file) {
            registry.with_vocabulary(SERVICES_VOCABULARY, top_level_keys(&document));
        }

        let sdks = sdks_document.and_then(|document| {
            parse_entries::<SdkEntry>(&document)
                .map_err(|e| {
                    tracing::warn!(
                        file = %config.sdks_file.display(),
                        error = %e,
                        "sdks file is not well-typed; sdk_version checks disabled"
                    );
                })
                .ok()
        });

        let formats = FormatContext {
            cross_content_dir: config.cross_content_dir.clone(),
        };
        let mut compiled = HashMap::new();
        for binding in config.bindings() {
            if compiled.contains_key(&binding.schema) {
                continue;
            }
            let validator = registry.compile(&binding.schema, &formats)?;
            tracing::debug!(schema = %binding.schema, pattern = %binding.pattern, "compiled schema");
            compiled.insert(binding.schema.clone(), validator);
        }

        tracing::info!(
            root = %config.root.display(),
            schemas = registry.schema_count(),
            bound = compiled.len(),
            "validator ready"
        );

        Ok(Self {
            config,
            registry,
            compiled,
            sdks,
        })
    }

    /// The resolved configuration.
    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// The loaded schema registry.
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Validate the whole catalog.
    pub fn run(&self) -> ValidationReport {
        let files = discover(&self.config);
        tracing::info!(files = files.len(), "validating catalog");

        let mut failures = Vec::new();
        let mut examples = Vec::new();
        for path in &files {
            let outcome = self.check_file(path);
            failures.extend(outcome.failures);
            examples.extend(outcome.example);
        }

        failures.extend(self.checks().run(&examples));

        let report = ValidationReport::new(files.len(), failures);
        tracing::info!(
            checked = report.files_checked,
            passed = report.files_passed,
            failures = report.failures.len(),
            "validation complete"
        );
        report
    }

    /// Validate one file, including the record checks that need no other
    /// file. Duplicate keys across files are only found by [`run`](Self::run).
    pub fn validate_file(&self, path: impl AsRef<Path>) -> Vec<Failure> {
        let outcome = self.check_file(path.as_ref());
        let mut failures = outcome.failures;
        if let Some(example) = outcome.example {
            failures.extend(self.checks().run(std::slice::from_ref(&example)));
        }
        failures.sort();
        failures
    }

    /// Validate an in-memory document against a schema by filename,
    /// attributing failures to `file`.
    ///
    /// # Errors
    ///
    /// Returns a registry error if the schema is not bound and cannot be
    /// compiled.
    pub fn validate_value(
        &self,
        value: &Value,
        schema_name: &str,
        file: &str,
    ) -> Result<Vec<Failure>, SchemaError> {
        if let Some(validator) = self.compiled.get(schema_name) {
            return Ok(collect_violations(validator, value, file));
        }
        let formats = FormatContext {
            cross_content_dir: self.config.cross_content_dir.clone(),
        };
        let validator = self.registry.compile(schema_name, &formats)?;
        Ok(collect_violations(&validator, value, file))
    }

    fn checks(&self) -> CatalogChecks<'_> {
        CatalogChecks::new(self.sdks.as_ref(), self.config.strict)
    }

    fn check_file(&self, path: &Path) -> FileOutcome {
        let file = self.config.relative(path);

        let Some(binding) = self.config.binding_for(path) else {
            tracing::debug!(file = %file, "no schema bound");
            return FileOutcome::failed(Failure::unknown_schema(&file));
        };

        let value = match load_document(path) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(file = %file, error = %e, "failed to parse");
                return FileOutcome::failed(Failure::parse_error(&file, e.to_string()));
            }
        };

        let failures = match self.compiled.get(&binding.schema) {
            Some(validator) => collect_violations(validator, &value, &file),
            // Every bound schema is compiled in `new`.
            None => Vec::new(),
        };
        tracing::debug!(
            file = %file,
            schema = %binding.schema,
            violations = failures.len(),
            "checked file"
        );

        let example = (binding.kind == DocumentKind::Examples).then(|| ExampleDocument {
            schema_clean: failures.is_empty(),
            file,
            value,
        });
        FileOutcome { failures, example }
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut bound: Vec<&str> = self.compiled.keys().map(String::as_str).collect();
        bound.sort_unstable();
        f.debug_struct("Validator")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("bound", &bound)
            .field("sdks", &self.sdks.as_ref().map(BTreeMap::len))
            .finish()
    }
}

impl FileOutcome {
    fn failed(failure: Failure) -> Self {
        Self {
            failures: vec![failure],
            example: None,
        }
    }
}

fn collect_violations(validator: &jsonschema::Validator, value: &Value, file: &str) -> Vec<Failure> {
    validator
        .iter_errors(value)
        .map(|e| {
            Failure::from_instance_path(
                file,
                &e.instance_path.to_string(),
                e.to_string(),
                Some(e.schema_path.to_string()),
            )
        })
        .collect()
}

fn load_vocabulary(path: &Path) -> Option<Value> {
    match load_document(path) {
        Ok(document) if document.is_object() => Some(document),
        Ok(_) => {
            tracing::warn!(file = %path.display(), "vocabulary file is not a mapping");
            None
        }
        Err(e) => {
            tracing::warn!(file = %path.display(), error = %e, "vocabulary file unavailable");
            None
        }
    }
}
