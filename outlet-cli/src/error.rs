//! Error types emitted by the outlets CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use outlet_core::OutletStoreError;
use outlet_data::geocoding::ProviderBuildError;
use outlet_data::{EnrichError, IngestError};
use outlet_server::ServerError;
use thiserror::Error;

/// Errors emitted by the outlets CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// An option was present but could not be used.
    #[error("invalid {field} value {value:?}: {reason}")]
    InvalidArgument {
        field: &'static str,
        value: String,
        reason: String,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Opening or preparing the outlet database failed.
    #[error("failed to open outlet database {path:?}: {source}")]
    OpenStore {
        path: Utf8PathBuf,
        #[source]
        source: OutletStoreError,
    },
    /// Loading outlet records failed.
    #[error(transparent)]
    Ingest(#[from] IngestError),
    /// Constructing the geocoding client failed.
    #[error("failed to build geocoder for {base_url:?}: {source}")]
    BuildGeocoder {
        base_url: String,
        #[source]
        source: ProviderBuildError,
    },
    /// The enrichment run stopped.
    #[error(transparent)]
    Enrich(#[from] EnrichError),
    /// Building the server runtime failed.
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// The HTTP server stopped with an error.
    #[error(transparent)]
    Serve(#[from] ServerError),
    /// Writing the command summary failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
