//! Command-line interface for the outlet locator.
#![forbid(unsafe_code)]

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use outlet_core::{OutletStore, SqliteOutletStore};
use outlet_data::{IngestReport, JsonFileSource};
use serde::{Deserialize, Serialize};

mod error;
mod geocode;
mod serve;

pub use error::CliError;
use geocode::GeocodeArgs;
use serve::ServeArgs;

pub(crate) const ARG_SOURCE: &str = "source";
pub(crate) const ARG_DATABASE: &str = "database";
pub(crate) const ENV_SOURCE: &str = "OUTLETS_CMDS_INGEST_SOURCE";

/// Database used when none is configured.
pub const DEFAULT_DATABASE: &str = "outlets.db";

/// Run the outlets CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Ingest(args) => {
            let config = resolve_ingest_config(args)?;
            let report = execute_ingest(&config)?;
            write_summary(format_args!(
                "stored {} of {} outlet records in {} ({} discarded)",
                report.inserted, report.received, config.database, report.discarded
            ))?;
        }
        Command::Geocode(args) => {
            let config = geocode::resolve_geocode_config(args)?;
            let report = geocode::execute_geocode(&config)?;
            write_summary(format_args!(
                "located {} of {} outlets ({} without match, {} exhausted, {} write failures)",
                report.located,
                report.pending,
                report.no_match,
                report.exhausted,
                report.write_failures
            ))?;
        }
        Command::Serve(args) => {
            let config = serve::resolve_serve_config(args)?;
            serve::execute_serve(&config)?;
        }
    }
    Ok(())
}

fn write_summary(line: std::fmt::Arguments<'_>) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{line}").map_err(CliError::WriteOutput)
}

#[derive(Debug, Parser)]
#[command(
    name = "outlets",
    about = "Load, geocode and serve restaurant outlet records",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load a JSON export of outlet records into the database.
    Ingest(IngestArgs),
    /// Resolve coordinates for outlets that lack them.
    Geocode(GeocodeArgs),
    /// Serve the outlet query API over HTTP.
    Serve(ServeArgs),
}

/// CLI arguments for the `ingest` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Load outlet records from a JSON array of objects with \
                 name, address, operating_hours and waze_link fields. \
                 Records with a blank name or address are skipped.",
    about = "Load outlet records into the database"
)]
#[ortho_config(prefix = "OUTLETS")]
struct IngestArgs {
    /// Path to the JSON export.
    #[arg(value_name = "path")]
    #[serde(default)]
    source: Option<Utf8PathBuf>,
    /// SQLite database to write (default `outlets.db`).
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    database: Option<Utf8PathBuf>,
}

/// Resolved `ingest` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
struct IngestConfig {
    source: Utf8PathBuf,
    database: Utf8PathBuf,
}

fn resolve_ingest_config(args: IngestArgs) -> Result<IngestConfig, CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config = IngestConfig::try_from(merged)?;
    config.validate_sources()?;
    Ok(config)
}

fn execute_ingest(config: &IngestConfig) -> Result<IngestReport, CliError> {
    let store = open_store(&config.database)?;
    let source = JsonFileSource::new(config.source.clone());
    info!("ingesting outlets from {}", config.source);
    Ok(outlet_data::ingest(&source, &store)?)
}

impl IngestConfig {
    fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.source, ARG_SOURCE)
    }
}

impl TryFrom<IngestArgs> for IngestConfig {
    type Error = CliError;

    fn try_from(args: IngestArgs) -> Result<Self, Self::Error> {
        let source = args.source.ok_or(CliError::MissingArgument {
            field: ARG_SOURCE,
            env: ENV_SOURCE,
        })?;
        Ok(Self {
            source,
            database: args.database.unwrap_or_else(default_database),
        })
    }
}

pub(crate) fn default_database() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_DATABASE)
}

/// Open the database at `path` and make sure the outlet table exists.
pub(crate) fn open_store(path: &Utf8Path) -> Result<SqliteOutletStore, CliError> {
    let open_error = |source| CliError::OpenStore {
        path: path.to_path_buf(),
        source,
    };
    let store = SqliteOutletStore::open(path).map_err(open_error)?;
    store.create_schema().map_err(open_error)?;
    Ok(store)
}

pub(crate) fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match outlet_fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests;
