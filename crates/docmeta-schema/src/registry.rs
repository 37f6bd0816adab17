//! # Schema Registry
//!
//! Loads schema documents (JSON Schema Draft 2020-12, written in YAML or
//! JSON) and compiles them into validators.
//!
//! ## Schema Resolution
//!
//! Every schema is registered under `https://schemas.docmeta.dev/<filename>`,
//! under its own `$id` if it declares one, and under its bare filename, so
//! cross-schema `$ref`s resolve locally. Nothing is fetched over the network.
//!
//! ## Vocabularies
//!
//! Enumerations that live in the catalog itself (SDK names, service names)
//! are registered as vocabularies and referenced from schemas as
//! `$ref: "urn:docmeta:vocabulary:<name>"`. The reference resolves to
//! `{ "enum": [...] }`; an unregistered vocabulary resolves to `{}` and
//! accepts anything, so a broken `sdks.yaml` is reported once (as its own
//! parse error) instead of once per record.
//!
//! ## Formats
//!
//! Format assertion is enabled, with two custom formats:
//!
//! - `entity`: exactly one entity reference, e.g. `&AWS;`;
//! - `block-content`: the name of an existing file in the cross-content
//!   directory.

use std::collections::{BTreeMap, HashMap};
use std::path::{Component, Path, PathBuf};

use jsonschema::{Retrieve, Uri, Validator};
use serde_json::{json, Value};

use crate::document::load_document;
use crate::error::SchemaError;

/// URI prefix under which every schema is registered.
pub const SCHEMA_URI_PREFIX: &str = "https://schemas.docmeta.dev/";

/// URI prefix of vocabulary references.
pub const VOCABULARY_URN_PREFIX: &str = "urn:docmeta:vocabulary:";

const SCHEMA_SUFFIXES: [&str; 3] = [".schema.yaml", ".schema.yml", ".schema.json"];

/// Resolves `$ref` URIs against schemas and vocabularies held in memory.
struct LocalSchemaRetriever {
    schemas_by_uri: HashMap<String, Value>,
    vocabularies: BTreeMap<String, Vec<String>>,
}

impl Retrieve for LocalSchemaRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();

        if let Some(name) = uri_str.strip_prefix(VOCABULARY_URN_PREFIX) {
            return Ok(match self.vocabularies.get(name) {
                Some(values) => json!({ "enum": values }),
                None => json!({}),
            });
        }

        if let Some(value) = self.schemas_by_uri.get(uri_str) {
            return Ok(value.clone());
        }

        let filename = uri_str.rsplit('/').next().unwrap_or(uri_str);
        self.schemas_by_uri
            .get(filename)
            .cloned()
            .ok_or_else(|| format!("schema not found for URI: {uri_str}").into())
    }
}

/// Runtime inputs to the custom formats.
#[derive(Debug, Clone, Default)]
pub struct FormatContext {
    /// Directory `block-content` values must name a file in. `None` accepts
    /// any value.
    pub cross_content_dir: Option<PathBuf>,
}

/// The loaded schema documents plus registered vocabularies.
#[derive(Debug)]
pub struct SchemaRegistry {
    schema_dir: PathBuf,
    /// Schema filename (e.g. `example.schema.yaml`) to parsed document.
    schemas: HashMap<String, Value>,
    vocabularies: BTreeMap<String, Vec<String>>,
}

impl SchemaRegistry {
    /// Load every schema document under `schema_dir`, recursively.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::SchemaLoad`] if the directory cannot be read,
    /// a schema cannot be parsed, or two schemas share a filename.
    pub fn load(schema_dir: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let schema_dir = schema_dir.as_ref().to_path_buf();
        if !schema_dir.is_dir() {
            return Err(SchemaError::SchemaLoad {
                name: schema_dir.display().to_string(),
                reason: "schema directory does not exist".to_string(),
            });
        }

        let mut paths = Vec::new();
        walk_for_schemas(&schema_dir, &mut paths)?;
        paths.sort();

        let mut schemas = HashMap::new();
        for path in paths {
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string();
            let value = load_document(&path).map_err(|e| SchemaError::SchemaLoad {
                name: name.clone(),
                reason: e.to_string(),
            })?;
            if !value.is_object() {
                return Err(SchemaError::SchemaLoad {
                    name,
                    reason: "schema document must be a mapping".to_string(),
                });
            }
            if schemas.insert(name.clone(), value).is_some() {
                return Err(SchemaError::SchemaLoad {
                    name,
                    reason: "more than one schema has this filename".to_string(),
                });
            }
            tracing::debug!(schema = %path.display(), "loaded schema");
        }

        Ok(Self {
            schema_dir,
            schemas,
            vocabularies: BTreeMap::new(),
        })
    }

    /// Register (or replace) a named enumeration.
    pub fn with_vocabulary(&mut self, name: &str, values: Vec<String>) -> &mut Self {
        tracing::debug!(vocabulary = name, size = values.len(), "registered vocabulary");
        self.vocabularies.insert(name.to_string(), values);
        self
    }

    /// Values registered for the vocabulary `name`.
    pub fn vocabulary(&self, name: &str) -> Option<&[String]> {
        self.vocabularies.get(name).map(Vec::as_slice)
    }

    /// Directory the schemas were loaded from.
    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// Number of loaded schema documents.
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }

    /// Names of all loaded schemas, sorted alphabetically.
    pub fn schema_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Raw schema document by filename.
    pub fn get_schema(&self, name: &str) -> Option<&Value> {
        self.schemas.get(name)
    }

    /// Compile the named schema.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::SchemaNotFound`] for an unknown name and
    /// [`SchemaError::SchemaCompile`] if the schema is not valid JSON Schema.
    pub fn compile(
        &self,
        schema_name: &str,
        formats: &FormatContext,
    ) -> Result<Validator, SchemaError> {
        let schema = self
            .schemas
            .get(schema_name)
            .ok_or_else(|| SchemaError::SchemaNotFound(schema_name.to_string()))?;

        let cross_content_dir = formats.cross_content_dir.clone();

        jsonschema::options()
            .with_draft(jsonschema::Draft::Draft202012)
            .with_retriever(self.retriever())
            .should_validate_formats(true)
            .with_format("entity", |value: &str| docmeta_core::is_entity(value))
            .with_format("block-content", move |value: &str| {
                block_content_exists(cross_content_dir.as_deref(), value)
            })
            .build(schema)
            .map_err(|e| SchemaError::SchemaCompile {
                name: schema_name.to_string(),
                reason: e.to_string(),
            })
    }

    fn retriever(&self) -> LocalSchemaRetriever {
        let mut schemas_by_uri = HashMap::new();
        for (filename, value) in &self.schemas {
            schemas_by_uri.insert(format!("{SCHEMA_URI_PREFIX}{filename}"), value.clone());
            if let Some(id) = value.get("$id").and_then(Value::as_str) {
                schemas_by_uri.insert(id.to_string(), value.clone());
            }
            schemas_by_uri.insert(filename.clone(), value.clone());
        }
        LocalSchemaRetriever {
            schemas_by_uri,
            vocabularies: self.vocabularies.clone(),
        }
    }
}

fn walk_for_schemas(dir: &Path, acc: &mut Vec<PathBuf>) -> Result<(), SchemaError> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            walk_for_schemas(&path, acc)?;
        } else if path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| SCHEMA_SUFFIXES.iter().any(|s| n.ends_with(s)))
        {
            acc.push(path);
        }
    }
    Ok(())
}

/// A `block_content` value must be a plain relative path naming a file in
/// the cross-content directory.
fn block_content_exists(cross_content_dir: Option<&Path>, value: &str) -> bool {
    let Some(dir) = cross_content_dir else {
        return true;
    };
    let relative = Path::new(value);
    let plain = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    plain && !value.is_empty() && dir.join(relative).is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    fn registry_with(schemas: &[(&str, &str)]) -> (tempfile::TempDir, SchemaRegistry) {
        let dir = tempfile::tempdir().unwrap();
        for (name, content) in schemas {
            write(dir.path(), name, content);
        }
        let registry = SchemaRegistry::load(dir.path()).unwrap();
        (dir, registry)
    }

    #[test]
    fn loads_yaml_and_json_schemas() {
        let (_dir, registry) = registry_with(&[
            ("a.schema.yaml", "type: object\n"),
            ("b.schema.json", r#"{"type": "string"}"#),
            ("notes.yaml", "not: a schema\n"),
        ]);
        assert_eq!(registry.schema_names(), vec!["a.schema.yaml", "b.schema.json"]);
    }

    #[test]
    fn missing_dir_is_load_error() {
        let err = SchemaRegistry::load("/nonexistent/docmeta/schemas").unwrap_err();
        assert!(matches!(err, SchemaError::SchemaLoad { .. }));
    }

    #[test]
    fn unparsable_schema_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "bad.schema.yaml", "type: [unclosed\n");
        let err = SchemaRegistry::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("bad.schema.yaml"));
    }

    #[test]
    fn unknown_schema_name_is_not_found() {
        let (_dir, registry) = registry_with(&[("a.schema.yaml", "type: object\n")]);
        let err = registry
            .compile("missing.schema.yaml", &FormatContext::default())
            .unwrap_err();
        assert!(matches!(err, SchemaError::SchemaNotFound(_)));
    }

    #[test]
    fn vocabulary_ref_resolves_to_enum() {
        let (_dir, mut registry) = registry_with(&[(
            "langs.schema.yaml",
            "type: object\npropertyNames:\n  $ref: \"urn:docmeta:vocabulary:sdks\"\n",
        )]);
        registry.with_vocabulary("sdks", vec!["Java".to_string(), "Rust".to_string()]);
        let validator = registry
            .compile("langs.schema.yaml", &FormatContext::default())
            .unwrap();
        assert!(validator.is_valid(&json!({ "Java": 1, "Rust": 2 })));
        assert!(!validator.is_valid(&json!({ "Elixir": 1 })));
    }

    #[test]
    fn unregistered_vocabulary_accepts_anything() {
        let (_dir, registry) = registry_with(&[(
            "langs.schema.yaml",
            "type: object\npropertyNames:\n  $ref: \"urn:docmeta:vocabulary:sdks\"\n",
        )]);
        let validator = registry
            .compile("langs.schema.yaml", &FormatContext::default())
            .unwrap();
        assert!(validator.is_valid(&json!({ "Elixir": 1 })));
    }

    #[test]
    fn cross_schema_ref_resolves_locally() {
        let (_dir, registry) = registry_with(&[
            ("entity.schema.yaml", "type: string\nformat: entity\n"),
            (
                "service.schema.yaml",
                "type: object\nproperties:\n  short:\n    $ref: \"https://schemas.docmeta.dev/entity.schema.yaml\"\n",
            ),
        ]);
        let validator = registry
            .compile("service.schema.yaml", &FormatContext::default())
            .unwrap();
        assert!(validator.is_valid(&json!({ "short": "&COG;" })));
        assert!(!validator.is_valid(&json!({ "short": "COG" })));
    }

    #[test]
    fn block_content_format_checks_cross_content_dir() {
        let (dir, registry) = registry_with(&[(
            "block.schema.yaml",
            "type: string\nformat: block-content\n",
        )]);
        let cross_content = dir.path().join("cross-content");
        std::fs::create_dir_all(&cross_content).unwrap();
        write(&cross_content, "intro.xml", "<para/>");

        let formats = FormatContext {
            cross_content_dir: Some(cross_content),
        };
        let validator = registry.compile("block.schema.yaml", &formats).unwrap();
        assert!(validator.is_valid(&json!("intro.xml")));
        assert!(!validator.is_valid(&json!("missing.xml")));
        assert!(!validator.is_valid(&json!("../block.schema.yaml")));
    }

    #[test]
    fn block_content_without_dir_accepts_anything() {
        assert!(block_content_exists(None, "anything.xml"));
    }

    #[test]
    fn invalid_schema_fails_to_compile() {
        let (_dir, registry) = registry_with(&[("bad.schema.yaml", "type: 12\n")]);
        let err = registry
            .compile("bad.schema.yaml", &FormatContext::default())
            .unwrap_err();
        assert!(matches!(err, SchemaError::SchemaCompile { .. }));
    }
}
