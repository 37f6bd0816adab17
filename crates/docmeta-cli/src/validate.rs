//! # Validate Subcommand
//!
//! Checks the whole catalog and prints every failure, one per line, followed
//! by a summary. With `--format json` the report is printed as a single JSON
//! document instead.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use docmeta_schema::{ValidationReport, Validator};

use crate::CatalogSource;

/// Report rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Arguments for the `docmeta validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub source: CatalogSource,

    /// Also enforce prose style on titles, synopses, and descriptions.
    #[arg(long)]
    pub strict: bool,

    /// Output format for the report.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 when the catalog is clean, 1 when anything failed.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let mut config = args.source.load_config()?;
    config.strict |= args.strict;

    let validator = Validator::new(&args.source.doc_gen, &config).with_context(|| {
        format!(
            "cannot validate catalog at {}",
            args.source.doc_gen.display()
        )
    })?;

    let report = validator.run();
    println!("{}", render(&report, args.format)?);

    Ok(if report.is_success() { 0 } else { 1 })
}

/// Render a report in the requested format.
pub fn render(report: &ValidationReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(report).context("failed to serialize report")
        }
        OutputFormat::Text => {
            let mut out = String::new();
            for failure in &report.failures {
                out.push_str(&format!("FAIL [{}] {failure}\n", failure.kind));
            }
            out.push_str(&format!(
                "{}/{} files passed, {} failure(s)",
                report.files_passed,
                report.files_checked,
                report.failures.len()
            ));
            Ok(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    fn repo_root() -> PathBuf {
        let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        dir.pop(); // crates
        dir.pop(); // repo root
        dir
    }

    fn args(doc_gen: &Path) -> ValidateArgs {
        ValidateArgs {
            source: CatalogSource {
                doc_gen: doc_gen.to_path_buf(),
                schema_dir: Some(repo_root().join("schemas")),
                config: None,
            },
            strict: false,
            format: OutputFormat::Text,
        }
    }

    fn copy_fixture(to: &Path) {
        fn copy(from: &Path, to: &Path) {
            std::fs::create_dir_all(to).unwrap();
            for entry in std::fs::read_dir(from).unwrap() {
                let path = entry.unwrap().path();
                let target = to.join(path.file_name().unwrap());
                if path.is_dir() {
                    copy(&path, &target);
                } else {
                    std::fs::copy(&path, &target).unwrap();
                }
            }
        }
        copy(&repo_root().join("fixtures/doc_gen"), to);
    }

    #[test]
    fn fixture_catalog_exits_zero() {
        let code = run_validate(&args(&repo_root().join("fixtures/doc_gen"))).unwrap();
        assert_eq!(code, 0);
    }

    #[test]
    fn relative_doc_gen_with_nested_schema_dir_exits_zero() {
        let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        let dir = tempfile::Builder::new()
            .prefix("catalog")
            .tempdir_in(&manifest_dir)
            .unwrap();
        copy_fixture(dir.path());
        std::fs::create_dir_all(dir.path().join("validation")).unwrap();
        for entry in std::fs::read_dir(repo_root().join("schemas")).unwrap() {
            let path = entry.unwrap().path();
            std::fs::copy(&path, dir.path().join("validation").join(path.file_name().unwrap()))
                .unwrap();
        }

        // Tests run from the manifest directory.
        let relative = dir.path().strip_prefix(&manifest_dir).unwrap().to_path_buf();
        let args = ValidateArgs {
            source: CatalogSource {
                doc_gen: relative.clone(),
                schema_dir: Some(relative.join("validation")),
                config: None,
            },
            strict: false,
            format: OutputFormat::Text,
        };
        assert_eq!(run_validate(&args).unwrap(), 0);
    }

    #[test]
    fn failures_exit_one() {
        let dir = tempfile::tempdir().unwrap();
        copy_fixture(dir.path());
        std::fs::write(dir.path().join("metadata/broken_metadata.yaml"), "a: [\n").unwrap();
        assert_eq!(run_validate(&args(dir.path())).unwrap(), 1);
    }

    #[test]
    fn strict_flag_enables_style_rules() {
        let dir = tempfile::tempdir().unwrap();
        copy_fixture(dir.path());
        let path = dir.path().join("metadata/s3_metadata.yaml");
        let content = std::fs::read_to_string(&path).unwrap();
        std::fs::write(&path, content.replace("title_abbrev: List buckets", "title_abbrev: list buckets")).unwrap();

        let mut lenient = args(dir.path());
        assert_eq!(run_validate(&lenient).unwrap(), 0);
        lenient.strict = true;
        assert_eq!(run_validate(&lenient).unwrap(), 1);
    }

    #[test]
    fn strict_from_default_config_file() {
        let dir = tempfile::tempdir().unwrap();
        copy_fixture(dir.path());
        std::fs::write(dir.path().join(".docmeta.yaml"), "strict: true\n").unwrap();
        let path = dir.path().join("metadata/s3_metadata.yaml");
        let content = std::fs::read_to_string(&path).unwrap();
        std::fs::write(&path, content.replace("title_abbrev: List buckets", "title_abbrev: List buckets!")).unwrap();
        assert_eq!(run_validate(&args(dir.path())).unwrap(), 1);
    }

    #[test]
    fn missing_schema_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = args(dir.path());
        a.source.schema_dir = Some(dir.path().join("no-schemas"));
        let err = run_validate(&a).unwrap_err();
        assert!(format!("{err:#}").contains("schema directory does not exist"));
    }

    #[test]
    fn missing_doc_gen_is_an_error() {
        let a = args(Path::new("/nonexistent/docmeta/doc_gen"));
        assert!(run_validate(&a).is_err());
    }

    #[test]
    fn text_rendering_lists_failures_then_summary() {
        let report = ValidationReport::new(
            2,
            vec![docmeta_schema::Failure::unknown_schema("notes.yaml")],
        );
        let text = render(&report, OutputFormat::Text).unwrap();
        assert_eq!(
            text,
            "FAIL [unknown-schema] notes.yaml: no schema is bound to this file\n1/2 files passed, 1 failure(s)"
        );
    }

    #[test]
    fn json_rendering_round_trips() {
        let report = ValidationReport::new(
            1,
            vec![docmeta_schema::Failure::parse_error("a.yaml", "invalid YAML")],
        );
        let json = render(&report, OutputFormat::Json).unwrap();
        let parsed: ValidationReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
    }
}
