//! Read-only query facade over the outlet store and proximity engine.

use std::sync::Arc;

use thiserror::Error;

use crate::proximity::{self, NearbyOutlet, ProximityError};
use crate::{Coordinates, Outlet, OutletId, OutletStore, OutletStoreError};

/// Errors surfaced by [`QueryService`].
#[derive(Debug, Error)]
pub enum QueryError {
    /// The requested outlet does not exist.
    #[error("outlet {id} not found")]
    NotFound {
        /// Identifier that was looked up.
        id: OutletId,
    },
    /// A query parameter was malformed.
    #[error("{0}")]
    InvalidArgument(String),
    /// The store failed while answering the query.
    #[error(transparent)]
    Store(OutletStoreError),
}

impl From<OutletStoreError> for QueryError {
    fn from(error: OutletStoreError) -> Self {
        match error {
            OutletStoreError::NotFound { id } => Self::NotFound { id },
            other => Self::Store(other),
        }
    }
}

impl From<ProximityError> for QueryError {
    fn from(error: ProximityError) -> Self {
        match error {
            ProximityError::Store(store) => store.into(),
            invalid @ (ProximityError::InvalidRadius { .. } | ProximityError::InvalidOrigin(_)) => {
                Self::InvalidArgument(invalid.to_string())
            }
        }
    }
}

/// List, fetch, search and radius queries over a shared store.
///
/// Holds no state besides the store handle and never writes.
#[derive(Clone)]
pub struct QueryService {
    store: Arc<dyn OutletStore>,
}

impl std::fmt::Debug for QueryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryService").finish_non_exhaustive()
    }
}

impl QueryService {
    /// Wrap a shared store.
    pub fn new(store: Arc<dyn OutletStore>) -> Self {
        Self { store }
    }

    /// Every outlet in identifier order.
    pub fn list_all(&self) -> Result<Vec<Outlet>, QueryError> {
        Ok(self.store.get_all()?)
    }

    /// One outlet, or [`QueryError::NotFound`].
    pub fn get_one(&self, id: OutletId) -> Result<Outlet, QueryError> {
        Ok(self.store.get_by_id(id)?)
    }

    /// Outlets whose name contains `query`, ignoring case.
    pub fn search_by_name(&self, query: &str) -> Result<Vec<Outlet>, QueryError> {
        Ok(self.store.search_by_name(query)?)
    }

    /// Outlets within `radius_km` of the given point, in listing order.
    pub fn nearby(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: f64,
    ) -> Result<Vec<Outlet>, QueryError> {
        let origin = Coordinates::new(latitude, longitude);
        Ok(proximity::find_within(
            self.store.as_ref(),
            origin,
            radius_km,
        )?)
    }

    /// Outlets within `radius_km`, nearest first, with their distances.
    pub fn nearby_by_distance(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: f64,
    ) -> Result<Vec<NearbyOutlet>, QueryError> {
        let origin = Coordinates::new(latitude, longitude);
        Ok(proximity::find_within_by_distance(
            self.store.as_ref(),
            origin,
            radius_km,
        )?)
    }
}
