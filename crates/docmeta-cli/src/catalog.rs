//! # Catalog Subcommand
//!
//! Summarizes a catalog that passes validation: how many examples each SDK
//! has and how many records document each service. A catalog with failures
//! is not summarized; its report is printed instead.

use anyhow::{Context, Result};
use clap::Args;

use docmeta_schema::{Catalog, CatalogError, Validator};

use crate::validate::{render, OutputFormat};
use crate::CatalogSource;

/// Arguments for the `docmeta catalog` subcommand.
#[derive(Args, Debug)]
pub struct CatalogArgs {
    #[command(flatten)]
    pub source: CatalogSource,
}

/// Execute the catalog subcommand.
///
/// Returns exit code: 0 when the catalog loaded, 1 when it failed validation.
pub fn run_catalog(args: &CatalogArgs) -> Result<u8> {
    let config = args.source.load_config()?;
    let validator = Validator::new(&args.source.doc_gen, &config).with_context(|| {
        format!("cannot load catalog at {}", args.source.doc_gen.display())
    })?;

    let catalog = match Catalog::load(&validator) {
        Ok(catalog) => catalog,
        Err(CatalogError::Invalid(report)) => {
            println!("{}", render(&report, OutputFormat::Text)?);
            return Ok(1);
        }
        Err(e) => return Err(e).context("catalog changed while loading"),
    };

    println!("{}", summarize(&catalog));
    Ok(0)
}

/// Plain-text coverage summary.
pub fn summarize(catalog: &Catalog) -> String {
    let mut lines = vec![format!(
        "{} record(s), {} SDK(s), {} service(s)",
        catalog.records.len(),
        catalog.sdks.len(),
        catalog.services.len()
    )];

    lines.push("SDKs:".to_string());
    for (sdk, count) in catalog.sdk_coverage() {
        lines.push(format!("  {sdk:<12} {count}"));
    }

    lines.push("Services:".to_string());
    for service in catalog.services.keys() {
        let count = catalog.records_for_service(service).count();
        lines.push(format!("  {service:<20} {count}"));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn repo_root() -> PathBuf {
        let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        dir.pop();
        dir.pop();
        dir
    }

    #[test]
    fn fixture_summary() {
        let config = docmeta_schema::ValidationConfig {
            schema_dir: repo_root().join("schemas"),
            ..Default::default()
        };
        let validator = Validator::new(repo_root().join("fixtures/doc_gen"), &config).unwrap();
        let catalog = Catalog::load(&validator).unwrap();
        let summary = summarize(&catalog);
        assert!(summary.starts_with("4 record(s), 4 SDK(s), 3 service(s)"));
        assert!(summary.contains(&format!("  {:<12} 2", "Python")));
        assert!(summary.contains(&format!("  {:<20} 3", "sqs")));
        assert!(summary.contains(&format!("  {:<20} 0", "cognito-identity")));
    }

    #[test]
    fn invalid_catalog_exits_one() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("validation")).unwrap();
        for name in ["example", "sdks", "services"] {
            std::fs::write(
                dir.path().join(format!("validation/{name}.schema.yaml")),
                "type: object\n",
            )
            .unwrap();
        }
        std::fs::write(dir.path().join("notes.yaml"), "a: 1\n").unwrap();
        let args = CatalogArgs {
            source: CatalogSource {
                doc_gen: dir.path().to_path_buf(),
                schema_dir: None,
                config: None,
            },
        };
        assert_eq!(run_catalog(&args).unwrap(), 1);
    }
}
