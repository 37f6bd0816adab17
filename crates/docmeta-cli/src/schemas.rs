//! # Schemas Subcommand
//!
//! Loads every schema document in a directory and compiles each one, so a
//! broken schema is caught before it is bound to catalog files.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use docmeta_schema::{FormatContext, SchemaRegistry};

/// Arguments for the `docmeta schemas` subcommand.
#[derive(Args, Debug)]
pub struct SchemasArgs {
    /// Directory holding the schema documents.
    #[arg(long, value_name = "DIR")]
    pub schema_dir: PathBuf,
}

/// Execute the schemas subcommand.
///
/// Returns exit code: 0 when every schema compiles, 1 otherwise.
pub fn run_schemas(args: &SchemasArgs) -> Result<u8> {
    let registry = SchemaRegistry::load(&args.schema_dir).with_context(|| {
        format!("failed to load schemas from {}", args.schema_dir.display())
    })?;

    let formats = FormatContext::default();
    let mut failed = 0usize;
    for name in registry.schema_names() {
        match registry.compile(name, &formats) {
            Ok(_) => println!("  OK: {name}"),
            Err(e) => {
                failed += 1;
                println!("  FAIL: {name}: {e}");
            }
        }
    }

    println!(
        "Schemas: {}/{} compiled",
        registry.schema_count() - failed,
        registry.schema_count()
    );
    Ok(if failed == 0 { 0 } else { 1 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_schemas_compile() {
        let mut schema_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        schema_dir.pop();
        schema_dir.pop();
        schema_dir.push("schemas");
        assert_eq!(run_schemas(&SchemasArgs { schema_dir }).unwrap(), 0);
    }

    #[test]
    fn invalid_schema_exits_one() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ok.schema.yaml"), "type: object\n").unwrap();
        std::fs::write(dir.path().join("bad.schema.yaml"), "type: 12\n").unwrap();
        let args = SchemasArgs {
            schema_dir: dir.path().to_path_buf(),
        };
        assert_eq!(run_schemas(&args).unwrap(), 1);
    }

    #[test]
    fn missing_dir_is_an_error() {
        let args = SchemasArgs {
            schema_dir: PathBuf::from("/nonexistent/docmeta/schemas"),
        };
        assert!(run_schemas(&args).is_err());
    }
}
