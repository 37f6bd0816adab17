//! # Document Loading
//!
//! Reads YAML (or JSON) files into `serde_json::Value` trees so that every
//! document, schema or catalog, is validated in the same representation.

use std::path::Path;

use serde_json::Value;
use thiserror::Error;

/// Error loading a single document.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The file could not be read.
    #[error("cannot read file: {0}")]
    Read(#[from] std::io::Error),

    /// The YAML could not be parsed.
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The JSON could not be parsed.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The YAML holds a value JSON cannot represent.
    #[error("YAML-to-JSON conversion failed: {0}")]
    Conversion(String),
}

/// Load a document, choosing the parser from the file extension.
///
/// `.json` files are parsed as JSON; everything else as YAML.
pub fn load_document(path: &Path) -> Result<Value, DocumentError> {
    let content = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if is_json {
        Ok(serde_json::from_str(&content)?)
    } else {
        parse_yaml(&content)
    }
}

/// Parse YAML text into a JSON value tree.
pub fn parse_yaml(content: &str) -> Result<Value, DocumentError> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(content)?;
    yaml_to_json_value(&yaml).map_err(DocumentError::Conversion)
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// Catalog files use only the JSON-compatible subset of YAML, except that
/// mapping keys may be numbers (`sdk: { 2: ... }`) or booleans; those keys
/// are stringified. Tags are dropped.
pub fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(serde_json::Number::from(i)))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Number(serde_json::Number::from(u)))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => {
            let items: Result<Vec<Value>, String> = seq.iter().map(yaml_to_json_value).collect();
            Ok(Value::Array(items?))
        }
        serde_yaml::Value::Mapping(map) => {
            let mut json_map = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported YAML map key type: {other:?}")),
                };
                json_map.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(json_map))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}

/// Top-level keys of a mapping document, in sorted order.
///
/// Returns an empty list for non-mapping documents.
pub fn top_level_keys(document: &Value) -> Vec<String> {
    let mut keys: Vec<String> = document
        .as_object()
        .map(|map| map.keys().cloned().collect())
        .unwrap_or_default();
    keys.sort();
    keys
}
