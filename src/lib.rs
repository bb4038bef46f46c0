//! Facade crate for the outlet locator.
//!
//! This crate re-exports the core domain types and, behind the `data`
//! feature, the ingestion and geocoding pipeline.

#![forbid(unsafe_code)]

pub use outlet_core::{
    Coordinates, GeocodeError, GeocodeOutcome, GeocodeResolver, NearbyOutlet, Outlet, OutletId,
    OutletStore, OutletStoreError, QueryError, QueryService, RawOutlet,
};

#[cfg(feature = "store-sqlite")]
pub use outlet_core::SqliteOutletStore;

#[cfg(feature = "data")]
pub use outlet_data::{
    EnrichReport, Enricher, GoogleGeocoder, IngestReport, JsonFileSource, NoMatchPolicy,
    RetryPolicy, ingest,
};
