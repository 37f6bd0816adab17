//! # docmeta CLI entry point
//!
//! Parses command-line arguments, sets up logging, and dispatches to the
//! subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use docmeta_cli::catalog::{run_catalog, CatalogArgs};
use docmeta_cli::schemas::{run_schemas, SchemasArgs};
use docmeta_cli::validate::{run_validate, ValidateArgs};

/// Exit code for a run that could not proceed.
const EXIT_OPERATIONAL_ERROR: u8 = 2;

/// docmeta: validates code-example metadata catalogs.
///
/// Checks every YAML file in a catalog against its JSON Schema document,
/// applies cross-record rules, and reports every failure found.
#[derive(Parser, Debug)]
#[command(name = "docmeta", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Write logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a metadata catalog against its schemas.
    Validate(ValidateArgs),

    /// Load and compile every schema document in a directory.
    Schemas(SchemasArgs),

    /// Summarize SDK and service coverage of a valid catalog.
    Catalog(CatalogArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level. Logs go to stderr so
    // reports on stdout stay machine-readable.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "docmeta starting");

    let result = match cli.command {
        Commands::Validate(args) => run_validate(&args),
        Commands::Schemas(args) => run_schemas(&args),
        Commands::Catalog(args) => run_catalog(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_OPERATIONAL_ERROR)
        }
    }
}
