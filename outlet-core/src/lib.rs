//! Core domain types for the outlet locator.
//!
//! Outlets are persisted through [`OutletStore`], enriched with coordinates
//! by a [`GeocodeResolver`], and queried through [`QueryService`]. Radius
//! search lives in [`proximity`].

pub mod geocode;
pub mod outlet;
pub mod proximity;
pub mod service;
pub mod store;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use geocode::{GeocodeError, GeocodeOutcome, GeocodeResolver, MissingCredentialError};
pub use outlet::{Coordinates, CoordinatesError, Outlet, OutletId, RawOutlet, UnlocatedOutlet};
pub use proximity::{NearbyOutlet, ProximityError};
pub use service::{QueryError, QueryService};
#[cfg(feature = "store-sqlite")]
pub use store::SqliteOutletStore;
pub use store::{OutletStore, OutletStoreError};
