//! # Catalog Discovery
//!
//! Finds every YAML file under the metadata root. Hidden directories, the
//! schema directory, and excluded paths are skipped. Results are sorted so
//! that reports are stable from run to run.

use std::path::{Path, PathBuf};

use crate::config::ResolvedConfig;

/// Recursively collect the catalog's YAML files.
pub fn discover(config: &ResolvedConfig) -> Vec<PathBuf> {
    let mut results = Vec::new();
    walk(&config.root, config, &mut results);
    results.sort();
    results
}

fn walk(dir: &Path, config: &ResolvedConfig, acc: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            tracing::warn!(
                dir = %dir.display(),
                error = %e,
                "failed to read directory during catalog walk"
            );
            return;
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "failed to read directory entry");
                continue;
            }
        };
        let path = entry.path();

        if is_hidden(&path) || config.is_excluded(&path) {
            tracing::trace!(path = %path.display(), "skipping");
            continue;
        }

        if path.is_dir() {
            if path == config.schema_dir {
                continue;
            }
            walk(&path, config, acc);
        } else if is_yaml(&path) {
            acc.push(path);
        }
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidationConfig;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"key: value\n").unwrap();
    }

    #[test]
    fn finds_yaml_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("metadata/s3_metadata.yaml"));
        touch(&dir.path().join("metadata/a_metadata.yml"));
        touch(&dir.path().join("sdks.yaml"));
        touch(&dir.path().join("README.md"));

        let config = ValidationConfig::default().resolve(dir.path()).unwrap();
        let files = discover(&config);
        let relative: Vec<String> = files.iter().map(|p| config.relative(p)).collect();
        assert_eq!(
            relative,
            vec![
                "metadata/a_metadata.yml",
                "metadata/s3_metadata.yaml",
                "sdks.yaml"
            ]
        );
    }

    #[test]
    fn skips_schema_dir_and_hidden_dirs() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("validation/example.schema.yaml"));
        touch(&dir.path().join(".github/workflows/ci.yaml"));
        touch(&dir.path().join("services.yaml"));

        let config = ValidationConfig::default().resolve(dir.path()).unwrap();
        let files = discover(&config);
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("services.yaml"));
    }

    #[test]
    fn skips_excluded_paths() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("drafts/wip.yaml"));
        touch(&dir.path().join("sdks.yaml"));

        let config = ValidationConfig {
            exclude: vec!["drafts".to_string()],
            ..ValidationConfig::default()
        }
        .resolve(dir.path())
        .unwrap();
        let files = discover(&config);
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn missing_root_yields_nothing() {
        let config = ValidationConfig::default()
            .resolve(Path::new("/nonexistent/docmeta-root"))
            .unwrap();
        assert!(discover(&config).is_empty());
    }
}
