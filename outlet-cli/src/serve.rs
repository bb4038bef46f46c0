//! Serve command implementation for the outlets CLI.

use std::net::SocketAddr;
use std::sync::Arc;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use outlet_core::QueryService;
use serde::{Deserialize, Serialize};

use crate::{ARG_DATABASE, CliError, default_database, open_store};

pub(crate) const ARG_BIND: &str = "bind";

/// Address used when none is configured.
pub(crate) const DEFAULT_BIND: &str = "0.0.0.0:8000";

/// CLI arguments for the `serve` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Serve read-only JSON endpoints for listing, fetching, \
                 searching and radius queries over the outlet database. \
                 The outlet table is created on startup if it is missing.",
    about = "Serve the outlet query API"
)]
#[ortho_config(prefix = "OUTLETS")]
pub(crate) struct ServeArgs {
    /// SQLite database to serve (default `outlets.db`).
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Socket address to listen on (default `0.0.0.0:8000`).
    #[arg(long = ARG_BIND, value_name = "addr")]
    #[serde(default)]
    pub(crate) bind: Option<String>,
}

/// Resolved `serve` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ServeConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) bind: SocketAddr,
}

impl TryFrom<ServeArgs> for ServeConfig {
    type Error = CliError;

    fn try_from(args: ServeArgs) -> Result<Self, Self::Error> {
        let raw_bind = args.bind.unwrap_or_else(|| DEFAULT_BIND.to_owned());
        let bind = raw_bind
            .parse()
            .map_err(|err: std::net::AddrParseError| CliError::InvalidArgument {
                field: ARG_BIND,
                value: raw_bind.clone(),
                reason: err.to_string(),
            })?;
        Ok(Self {
            database: args.database.unwrap_or_else(default_database),
            bind,
        })
    }
}

pub(crate) fn resolve_serve_config(args: ServeArgs) -> Result<ServeConfig, CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    ServeConfig::try_from(merged)
}

pub(crate) fn execute_serve(config: &ServeConfig) -> Result<(), CliError> {
    let store = open_store(&config.database)?;
    let service = QueryService::new(Arc::new(store));
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    runtime.block_on(outlet_server::run(config.bind, service))?;
    Ok(())
}
