//! HTTP geocoding resolver.
//!
//! [`GoogleGeocoder`] implements [`outlet_core::GeocodeResolver`] over the
//! Google Geocoding API. Request URLs carry the API key, so errors report
//! only the endpoint.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use outlet_data::geocoding::{GoogleGeocoder, GoogleGeocoderConfig};
//!
//! let config = GoogleGeocoderConfig::new("my-key")
//!     .with_timeout(Duration::from_secs(10))
//!     .with_user_agent("outlet-locator-batch/1.0");
//! let geocoder = GoogleGeocoder::with_config(config)?;
//! # Ok::<(), outlet_data::geocoding::ProviderBuildError>(())
//! ```

mod google;
mod provider;

pub use provider::{
    DEFAULT_BASE_URL, DEFAULT_USER_AGENT, GoogleGeocoder, GoogleGeocoderConfig,
    ProviderBuildError,
};
