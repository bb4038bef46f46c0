//! Data acquisition for the outlet locator.
//!
//! Responsibilities:
//! - Load raw outlet records from a producer and persist the usable ones.
//! - Enrich stored outlets with coordinates from a geocoding resolver.
//! - Provide the HTTP geocoding adapter.
//!
//! Boundaries:
//! - Domain types, the store trait and the resolver trait live in
//!   `outlet-core`.
//! - Keep blocking I/O off async executors; the geocoder owns its runtime.

pub mod enrich;
pub mod geocoding;
pub mod ingest;

pub use enrich::{EnrichError, EnrichReport, Enricher, NoMatchPolicy, RetryPolicy};
pub use geocoding::{GoogleGeocoder, GoogleGeocoderConfig};
pub use ingest::{IngestError, IngestReport, JsonFileSource, RawOutletSource, ingest};
