//! # Validation Configuration
//!
//! Describes where the schemas live and which schema each catalog file is
//! checked against. The defaults match the curated catalog layout:
//!
//! ```text
//! <root>/
//!   sdks.yaml                  -> sdks.schema.yaml
//!   services.yaml              -> services.schema.yaml
//!   metadata/*_metadata.yaml   -> example.schema.yaml
//!   cross-content/             block_content targets
//!   validation/                schema documents
//! ```
//!
//! A YAML configuration file may override any of it. Relative paths resolve
//! against the metadata root.

use std::path::{Component, Path, PathBuf};

use glob::{MatchOptions, Pattern};
use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// What a bound document contains, which decides the cross-record checks
/// applied to it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Code-example metadata records.
    Examples,
    /// The SDK vocabulary file.
    Sdks,
    /// The service vocabulary file.
    Services,
    /// Anything else: schema validation only.
    #[default]
    Other,
}

/// Maps catalog files matching `pattern` to the schema named `schema`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaBinding {
    /// Glob relative to the metadata root, with `/` separators.
    pub pattern: String,
    /// Schema filename in the schema directory.
    pub schema: String,
    /// Which cross-record checks apply.
    #[serde(default)]
    pub kind: DocumentKind,
}

impl SchemaBinding {
    /// A binding from `pattern` to `schema` for documents of `kind`.
    pub fn new(pattern: &str, schema: &str, kind: DocumentKind) -> Self {
        Self {
            pattern: pattern.to_string(),
            schema: schema.to_string(),
            kind,
        }
    }
}

/// Files whose top-level keys form the enumerations schemas refer to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VocabularyFiles {
    /// The SDK vocabulary file.
    pub sdks: PathBuf,
    /// The service vocabulary file.
    pub services: PathBuf,
}

impl Default for VocabularyFiles {
    fn default() -> Self {
        Self {
            sdks: PathBuf::from("sdks.yaml"),
            services: PathBuf::from("services.yaml"),
        }
    }
}

/// User-facing configuration, as written in a configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationConfig {
    /// Directory holding the schema documents.
    pub schema_dir: PathBuf,
    /// Directory `block_content` names resolve in. `None` accepts any name.
    pub cross_content_dir: Option<PathBuf>,
    /// Where the SDK and service vocabularies are read from.
    pub vocabularies: VocabularyFiles,
    /// Ordered; the first matching binding wins.
    pub bindings: Vec<SchemaBinding>,
    /// Globs of files and directories to skip entirely.
    pub exclude: Vec<String>,
    /// Enforce prose style rules on titles, synopses, and descriptions.
    pub strict: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            schema_dir: PathBuf::from("validation"),
            cross_content_dir: Some(PathBuf::from("cross-content")),
            vocabularies: VocabularyFiles::default(),
            bindings: vec![
                SchemaBinding::new(
                    "metadata/*_metadata.yaml",
                    "example.schema.yaml",
                    DocumentKind::Examples,
                ),
                SchemaBinding::new("sdks.yaml", "sdks.schema.yaml", DocumentKind::Sdks),
                SchemaBinding::new(
                    "services.yaml",
                    "services.schema.yaml",
                    DocumentKind::Services,
                ),
            ],
            exclude: Vec::new(),
            strict: false,
        }
    }
}

impl ValidationConfig {
    /// Load a configuration file. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Config`] if the file cannot be read or is not
    /// a valid configuration.
    pub fn from_file(path: &Path) -> Result<Self, SchemaError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SchemaError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        serde_yaml::from_str(&content)
            .map_err(|e| SchemaError::Config(format!("invalid config {}: {e}", path.display())))
    }

    /// Skip one file, given by its path relative to the root.
    pub fn exclude_file(&mut self, relative: &str) {
        self.exclude.push(Pattern::escape(relative));
    }

    /// Resolve paths against `root` and compile the globs. A relative
    /// `root` is taken from the current directory.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Config`] for an invalid glob, an empty
    /// binding list, or a relative root when the current directory is
    /// unavailable.
    pub fn resolve(&self, root: &Path) -> Result<ResolvedConfig, SchemaError> {
        let root = absolutize(root)?;
        let root = root.as_path();
        if self.bindings.is_empty() {
            return Err(SchemaError::Config(
                "at least one schema binding is required".to_string(),
            ));
        }

        let bindings = self
            .bindings
            .iter()
            .map(|binding| Ok((compile_glob(&binding.pattern)?, binding.clone())))
            .collect::<Result<Vec<_>, SchemaError>>()?;

        let exclude = self
            .exclude
            .iter()
            .map(|pattern| compile_glob(pattern))
            .collect::<Result<Vec<_>, SchemaError>>()?;

        Ok(ResolvedConfig {
            root: root.to_path_buf(),
            schema_dir: root.join(&self.schema_dir),
            cross_content_dir: self.cross_content_dir.as_ref().map(|d| root.join(d)),
            sdks_file: root.join(&self.vocabularies.sdks),
            services_file: root.join(&self.vocabularies.services),
            bindings,
            exclude,
            strict: self.strict,
        })
    }
}

/// Configuration with paths made absolute and globs compiled.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Absolute metadata root.
    pub root: PathBuf,
    /// Absolute schema directory.
    pub schema_dir: PathBuf,
    /// Absolute cross-content directory, if any.
    pub cross_content_dir: Option<PathBuf>,
    /// Absolute path of the SDK vocabulary file.
    pub sdks_file: PathBuf,
    /// Absolute path of the service vocabulary file.
    pub services_file: PathBuf,
    bindings: Vec<(Pattern, SchemaBinding)>,
    exclude: Vec<Pattern>,
    /// Whether prose style rules apply.
    pub strict: bool,
}

impl ResolvedConfig {
    /// The bindings, in match order.
    pub fn bindings(&self) -> impl Iterator<Item = &SchemaBinding> {
        self.bindings.iter().map(|(_, binding)| binding)
    }

    /// The first binding whose pattern matches `path`.
    pub fn binding_for(&self, path: &Path) -> Option<&SchemaBinding> {
        let relative = self.relative(path);
        self.bindings
            .iter()
            .find(|(pattern, _)| pattern.matches_with(&relative, match_options()))
            .map(|(_, binding)| binding)
    }

    /// Whether `path` matches an exclude glob.
    pub fn is_excluded(&self, path: &Path) -> bool {
        let relative = self.relative(path);
        self.exclude
            .iter()
            .any(|pattern| pattern.matches_with(&relative, match_options()))
    }

    /// `path` relative to the root with `/` separators, as shown in reports.
    /// A relative `path` is taken from the current directory.
    pub fn relative(&self, path: &Path) -> String {
        let absolute = absolutize(path).unwrap_or_else(|_| path.to_path_buf());
        let relative = absolute.strip_prefix(&self.root).unwrap_or(path);
        relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}

fn absolutize(path: &Path) -> Result<PathBuf, SchemaError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir()
        .map_err(|e| SchemaError::Config(format!("cannot determine current directory: {e}")))?;
    Ok(cwd.join(path))
}

fn compile_glob(pattern: &str) -> Result<Pattern, SchemaError> {
    Pattern::new(pattern)
        .map_err(|e| SchemaError::Config(format!("invalid glob '{pattern}': {e}")))
}

fn match_options() -> MatchOptions {
    MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved() -> ResolvedConfig {
        ValidationConfig::default()
            .resolve(Path::new("/catalog"))
            .unwrap()
    }

    #[test]
    fn default_bindings_match_curated_layout() {
        let config = resolved();
        let binding = config
            .binding_for(Path::new("/catalog/metadata/sqs_metadata.yaml"))
            .unwrap();
        assert_eq!(binding.schema, "example.schema.yaml");
        assert_eq!(binding.kind, DocumentKind::Examples);

        let sdks = config.binding_for(Path::new("/catalog/sdks.yaml")).unwrap();
        assert_eq!(sdks.kind, DocumentKind::Sdks);
    }

    #[test]
    fn star_does_not_cross_directories() {
        let config = resolved();
        assert!(config
            .binding_for(Path::new("/catalog/metadata/nested/sqs_metadata.yaml"))
            .is_none());
    }

    #[test]
    fn unbound_files_have_no_binding() {
        let config = resolved();
        assert!(config
            .binding_for(Path::new("/catalog/metadata/notes.yaml"))
            .is_none());
    }

    #[test]
    fn first_matching_binding_wins() {
        let mut config = ValidationConfig::default();
        config.bindings.insert(
            0,
            SchemaBinding::new("metadata/s3_*.yaml", "s3.schema.yaml", DocumentKind::Other),
        );
        let resolved = config.resolve(Path::new("/catalog")).unwrap();
        let binding = resolved
            .binding_for(Path::new("/catalog/metadata/s3_metadata.yaml"))
            .unwrap();
        assert_eq!(binding.schema, "s3.schema.yaml");
    }

    #[test]
    fn paths_resolve_against_root() {
        let config = resolved();
        assert_eq!(config.schema_dir, PathBuf::from("/catalog/validation"));
        assert_eq!(
            config.cross_content_dir,
            Some(PathBuf::from("/catalog/cross-content"))
        );
        assert_eq!(config.relative(Path::new("/catalog/a/b.yaml")), "a/b.yaml");
    }

    #[test]
    fn relative_root_is_made_absolute() {
        let config = ValidationConfig {
            schema_dir: PathBuf::from("/schemas"),
            ..ValidationConfig::default()
        };
        let resolved = config.resolve(Path::new("catalog")).unwrap();
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(resolved.root, cwd.join("catalog"));
        assert_eq!(resolved.sdks_file, cwd.join("catalog").join("sdks.yaml"));
        assert_eq!(resolved.schema_dir, PathBuf::from("/schemas"));
        assert_eq!(
            resolved.relative(&cwd.join("catalog/metadata/s3_metadata.yaml")),
            "metadata/s3_metadata.yaml"
        );
        assert_eq!(
            resolved.relative(Path::new("catalog/metadata/s3_metadata.yaml")),
            "metadata/s3_metadata.yaml"
        );
    }

    #[test]
    fn exclude_globs_apply() {
        let mut config = ValidationConfig::default();
        config.exclude = vec!["drafts/**".to_string()];
        let resolved = config.resolve(Path::new("/catalog")).unwrap();
        assert!(resolved.is_excluded(Path::new("/catalog/drafts/x/y.yaml")));
        assert!(!resolved.is_excluded(Path::new("/catalog/metadata/y.yaml")));
    }

    #[test]
    fn excluded_file_name_is_matched_literally() {
        let mut config = ValidationConfig::default();
        config.exclude_file("conf/[local].yaml");
        let resolved = config.resolve(Path::new("/catalog")).unwrap();
        assert!(resolved.is_excluded(Path::new("/catalog/conf/[local].yaml")));
        assert!(!resolved.is_excluded(Path::new("/catalog/conf/l.yaml")));
    }

    #[test]
    fn invalid_glob_is_config_error() {
        let mut config = ValidationConfig::default();
        config.exclude = vec!["[unclosed".to_string()];
        let err = config.resolve(Path::new("/catalog")).unwrap_err();
        assert!(matches!(err, SchemaError::Config(_)));
    }

    #[test]
    fn empty_bindings_rejected() {
        let config = ValidationConfig {
            bindings: Vec::new(),
            ..ValidationConfig::default()
        };
        assert!(config.resolve(Path::new("/catalog")).is_err());
    }

    #[test]
    fn config_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docmeta.yaml");
        std::fs::write(
            &path,
            "schema_dir: schemas\nstrict: true\ncross_content_dir: null\n",
        )
        .unwrap();
        let config = ValidationConfig::from_file(&path).unwrap();
        assert_eq!(config.schema_dir, PathBuf::from("schemas"));
        assert!(config.strict);
        assert!(config.cross_content_dir.is_none());
        assert_eq!(config.bindings.len(), 3);
    }

    #[test]
    fn unknown_config_keys_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docmeta.yaml");
        std::fs::write(&path, "schema_directory: schemas\n").unwrap();
        assert!(matches!(
            ValidationConfig::from_file(&path),
            Err(SchemaError::Config(_))
        ));
    }
}
