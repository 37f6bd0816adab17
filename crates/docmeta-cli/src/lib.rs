//! # docmeta-cli — Catalog Validation from the Command Line
//!
//! Argument parsing and report rendering for the `docmeta` binary. The
//! validation itself lives in `docmeta-schema`; handlers here only resolve
//! paths, build the configuration, and print.
//!
//! ## Subcommands
//!
//! - `validate`: check every catalog file and print all failures
//! - `schemas`: load and compile every schema document
//! - `catalog`: summarize a catalog that validates cleanly
//!
//! ```bash
//! docmeta validate --doc-gen .doc_gen --schema-dir .doc_gen/validation
//! docmeta validate --doc-gen .doc_gen --strict --format json
//! docmeta schemas --schema-dir .doc_gen/validation
//! ```
//!
//! ## Exit Codes
//!
//! Handlers return `0` when nothing failed and `1` when the catalog has
//! failures. An `Err` from a handler means the run could not proceed; the
//! binary maps it to `2`.

pub mod catalog;
pub mod schemas;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use docmeta_schema::ValidationConfig;

/// Configuration file picked up from the catalog root when `--config` is
/// not given.
pub const DEFAULT_CONFIG_FILE: &str = ".docmeta.yaml";

/// Where the catalog is and how to read it. Shared by every subcommand that
/// runs the validator.
#[derive(Args, Debug, Clone)]
pub struct CatalogSource {
    /// Root directory of the metadata catalog.
    #[arg(long, value_name = "DIR")]
    pub doc_gen: PathBuf,

    /// Directory holding the schema documents. Overrides the config file.
    #[arg(long, value_name = "DIR")]
    pub schema_dir: Option<PathBuf>,

    /// Configuration file. Defaults to `<doc-gen>/.docmeta.yaml` if present.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl CatalogSource {
    /// Build the validation configuration: defaults, then the config file,
    /// then command-line overrides.
    pub fn load_config(&self) -> Result<ValidationConfig> {
        let config_path = match &self.config {
            Some(path) => Some(absolute(path)?),
            None => {
                let candidate = self.doc_gen.join(DEFAULT_CONFIG_FILE);
                candidate.is_file().then_some(candidate)
            }
        };

        let mut config = match &config_path {
            Some(path) => {
                tracing::info!(config = %path.display(), "loading configuration");
                ValidationConfig::from_file(path)
                    .with_context(|| format!("failed to load {}", path.display()))?
            }
            None => ValidationConfig::default(),
        };

        if let Some(path) = &config_path {
            let root = absolute(&self.doc_gen)?;
            if let Ok(relative) = path.strip_prefix(&root) {
                config.exclude_file(&relative.to_string_lossy().replace('\\', "/"));
            }
        }

        if let Some(schema_dir) = &self.schema_dir {
            config.schema_dir = absolute(schema_dir)?;
        }

        Ok(config)
    }
}

/// Resolve `path` against the current directory.
fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("cannot determine current directory")?;
    Ok(cwd.join(path))
}
