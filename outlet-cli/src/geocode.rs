//! Geocode command implementation for the outlets CLI.

use std::time::Duration;

use camino::Utf8PathBuf;
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use outlet_core::GeocodeResolver;
use outlet_data::enrich::{DEFAULT_ATTEMPTS, DEFAULT_RETRY_DELAY};
use outlet_data::geocoding::DEFAULT_BASE_URL;
use outlet_data::{
    EnrichError, EnrichReport, Enricher, GoogleGeocoder, GoogleGeocoderConfig, NoMatchPolicy,
    RetryPolicy,
};
use serde::{Deserialize, Serialize};

use crate::{ARG_DATABASE, CliError, default_database, open_store};

pub(crate) const ARG_ATTEMPTS: &str = "attempts";
pub(crate) const ARG_API_KEY: &str = "api-key";

/// Fallback variable holding the geocoding API key, usually set in `.env`.
pub(crate) const ENV_API_KEY_FALLBACK: &str = "GEOCODING_API_KEY";

/// CLI arguments for the `geocode` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Look up coordinates for every stored outlet that lacks \
                 them. Transient lookup failures are retried with a fixed \
                 delay; outlets that still fail are left for the next run. \
                 The API key falls back to GEOCODING_API_KEY, which may be \
                 set in a .env file.",
    about = "Resolve coordinates for unlocated outlets"
)]
#[ortho_config(prefix = "OUTLETS")]
pub(crate) struct GeocodeArgs {
    /// SQLite database to update (default `outlets.db`).
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Google Geocoding API key.
    #[arg(long = ARG_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) api_key: Option<String>,
    /// Lookups per outlet before giving up (default 3).
    #[arg(long = ARG_ATTEMPTS, value_name = "count")]
    #[serde(default)]
    pub(crate) attempts: Option<u32>,
    /// Seconds to wait between lookups of the same outlet (default 2).
    #[arg(long = "retry-delay-secs", value_name = "secs")]
    #[serde(default)]
    pub(crate) retry_delay_secs: Option<u64>,
    /// Retry addresses the provider reports as unknown.
    #[arg(long = "retry-on-no-match")]
    #[serde(default)]
    pub(crate) retry_on_no_match: bool,
    /// Override the geocoding API host (e.g. a local stub).
    #[arg(long = "geocoder-base-url", value_name = "url")]
    #[serde(default)]
    pub(crate) geocoder_base_url: Option<String>,
}

/// Resolved `geocode` command configuration.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct GeocodeConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) api_key: Option<String>,
    pub(crate) retry: RetryPolicy,
    pub(crate) no_match: NoMatchPolicy,
    pub(crate) base_url: String,
}

impl std::fmt::Debug for GeocodeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeocodeConfig")
            .field("database", &self.database)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("retry", &self.retry)
            .field("no_match", &self.no_match)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GeocodeConfig {
    /// Fill a missing API key from `lookup(ENV_API_KEY_FALLBACK)`.
    pub(crate) fn with_fallback_key(
        mut self,
        lookup: impl FnOnce(&str) -> Option<String>,
    ) -> Self {
        if self.api_key.is_none() {
            self.api_key = lookup(ENV_API_KEY_FALLBACK);
        }
        self
    }
}

impl TryFrom<GeocodeArgs> for GeocodeConfig {
    type Error = CliError;

    fn try_from(args: GeocodeArgs) -> Result<Self, Self::Error> {
        let attempts = args.attempts.unwrap_or(DEFAULT_ATTEMPTS);
        if attempts == 0 {
            return Err(CliError::InvalidArgument {
                field: ARG_ATTEMPTS,
                value: attempts.to_string(),
                reason: "at least one attempt is required".to_owned(),
            });
        }
        let delay = args
            .retry_delay_secs
            .map_or(DEFAULT_RETRY_DELAY, Duration::from_secs);
        let no_match = if args.retry_on_no_match {
            NoMatchPolicy::Retry
        } else {
            NoMatchPolicy::Stop
        };
        Ok(Self {
            database: args.database.unwrap_or_else(default_database),
            api_key: args.api_key,
            retry: RetryPolicy::new(attempts, delay),
            no_match,
            base_url: args
                .geocoder_base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
        })
    }
}

pub(crate) fn resolve_geocode_config(args: GeocodeArgs) -> Result<GeocodeConfig, CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config = GeocodeConfig::try_from(merged)?;
    Ok(config.with_fallback_key(|name| std::env::var(name).ok()))
}

pub(crate) fn execute_geocode(config: &GeocodeConfig) -> Result<EnrichReport, CliError> {
    let geocoder_config = GoogleGeocoderConfig::default()
        .with_api_key(config.api_key.clone())
        .with_base_url(config.base_url.clone());
    let geocoder =
        GoogleGeocoder::with_config(geocoder_config).map_err(|source| CliError::BuildGeocoder {
            base_url: config.base_url.clone(),
            source,
        })?;
    geocoder
        .ensure_credentials()
        .map_err(EnrichError::MissingCredential)?;
    let store = open_store(&config.database)?;
    info!("geocoding outlets in {}", config.database);
    let report = Enricher::new(geocoder)
        .with_retry_policy(config.retry)
        .with_no_match_policy(config.no_match)
        .run(&store)?;
    Ok(report)
}
