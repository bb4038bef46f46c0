//! Persistence interface for outlet records.
//!
//! [`OutletStore`] is the only writer of outlet data. The enricher issues
//! one targeted [`OutletStore::set_coordinates`] call per resolved record;
//! the proximity engine and the query facade only read.

use thiserror::Error;

use crate::{Coordinates, Outlet, OutletId, RawOutlet, UnlocatedOutlet};

#[cfg(feature = "store-sqlite")]
mod sqlite;

#[cfg(feature = "store-sqlite")]
pub use sqlite::SqliteOutletStore;

/// Boxed source error carried by [`OutletStoreError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised by [`OutletStore`] implementations.
#[derive(Debug, Error)]
pub enum OutletStoreError {
    /// The backing storage could not be opened, created or written.
    #[error("failed to initialise outlet storage at {location}: {source}")]
    StorageInit {
        /// Path or description of the storage location.
        location: String,
        /// Underlying failure.
        #[source]
        source: BoxError,
    },
    /// No outlet exists with the requested identifier.
    #[error("outlet {id} not found")]
    NotFound {
        /// Identifier that was looked up.
        id: OutletId,
    },
    /// An insert failed part way through a bulk insert.
    ///
    /// Records before the failing one remain stored unless the failure
    /// aborted the whole transaction, in which case `inserted` is zero.
    #[error("bulk insert stopped after {inserted} of {attempted} records: {source}")]
    BulkInsert {
        /// Records stored before the failure.
        inserted: usize,
        /// Records passed to the call.
        attempted: usize,
        /// Error from the failing insert.
        #[source]
        source: BoxError,
    },
    /// A read or update statement failed.
    #[error("outlet storage failed to {operation}: {source}")]
    Query {
        /// What the store was doing, e.g. `list outlets`.
        operation: &'static str,
        /// Underlying failure.
        #[source]
        source: BoxError,
    },
}

/// Durable table of outlet records.
///
/// Identifiers are assigned by the store in insertion order and never
/// change. Listing operations return records in identifier order.
///
/// # Examples
///
/// ```
/// use outlet_core::{OutletStore, RawOutlet, SqliteOutletStore};
///
/// let store = SqliteOutletStore::open_in_memory()?;
/// store.create_schema()?;
/// store.bulk_insert(&[RawOutlet::new("Subway KLCC", "Jalan Ampang", "", "")])?;
///
/// let outlets = store.get_all()?;
/// assert_eq!(outlets.len(), 1);
/// assert!(store.get_by_id(outlets[0].id)?.location.is_none());
/// # Ok::<(), outlet_core::OutletStoreError>(())
/// ```
pub trait OutletStore: Send + Sync {
    /// Ensure the record table exists. Safe to call repeatedly.
    fn create_schema(&self) -> Result<(), OutletStoreError>;

    /// Insert `records` in order and return how many were stored.
    ///
    /// Callers filter blank records first; the store does not validate.
    /// When one insert fails the earlier rows are kept and
    /// [`OutletStoreError::BulkInsert`] reports the number stored.
    fn bulk_insert(&self, records: &[RawOutlet]) -> Result<usize, OutletStoreError>;

    /// Every outlet in identifier order.
    fn get_all(&self) -> Result<Vec<Outlet>, OutletStoreError>;

    /// Fetch one outlet or fail with [`OutletStoreError::NotFound`].
    fn get_by_id(&self, id: OutletId) -> Result<Outlet, OutletStoreError>;

    /// Case-insensitive substring match against outlet names.
    fn search_by_name(&self, fragment: &str) -> Result<Vec<Outlet>, OutletStoreError>;

    /// Outlets still missing a latitude or longitude.
    fn get_unlocated(&self) -> Result<Vec<UnlocatedOutlet>, OutletStoreError>;

    /// Overwrite both coordinate fields of one outlet in a single write.
    fn set_coordinates(
        &self,
        id: OutletId,
        coordinates: Coordinates,
    ) -> Result<(), OutletStoreError>;
}
