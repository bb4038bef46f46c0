//! Radius search over stored outlets.
//!
//! Distances are ellipsoidal geodesics on WGS84 computed with
//! [`geo::Geodesic`] (Karney's algorithm), so results stay accurate at city
//! scale regardless of latitude. Every stored outlet is visited; outlets
//! without coordinates never match.

use geo::{Distance, Geodesic};
use thiserror::Error;

use crate::{Coordinates, CoordinatesError, Outlet, OutletStore, OutletStoreError};

const METRES_PER_KILOMETRE: f64 = 1_000.0;

/// Errors returned by [`find_within`] and [`find_within_by_distance`].
#[derive(Debug, Error)]
pub enum ProximityError {
    /// The radius was negative, NaN or infinite.
    #[error("radius must be a finite, non-negative number of kilometres, got {radius_km}")]
    InvalidRadius {
        /// Rejected radius.
        radius_km: f64,
    },
    /// The query origin was not a valid WGS84 position.
    #[error("invalid query origin: {0}")]
    InvalidOrigin(#[from] CoordinatesError),
    /// Reading outlets from the store failed.
    #[error(transparent)]
    Store(#[from] OutletStoreError),
}

/// An outlet matched by a radius query together with its distance.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NearbyOutlet {
    /// Matched outlet; flattened into the serialised record.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub outlet: Outlet,
    /// Geodesic distance from the query origin.
    pub distance_km: f64,
}

/// Geodesic distance between two positions in kilometres.
///
/// # Examples
/// ```
/// use outlet_core::{Coordinates, proximity::geodesic_distance_km};
///
/// let a = Coordinates::new(0.0, 0.0);
/// let b = Coordinates::new(0.0, 1.0);
/// let km = geodesic_distance_km(a, b);
/// assert!((km - 111.319).abs() < 0.01);
/// ```
pub fn geodesic_distance_km(from: Coordinates, to: Coordinates) -> f64 {
    Geodesic.distance(from.to_point(), to.to_point()) / METRES_PER_KILOMETRE
}

/// Return every located outlet within `radius_km` of `origin`.
///
/// Results keep the store's listing order. The boundary is inclusive.
pub fn find_within(
    store: &dyn OutletStore,
    origin: Coordinates,
    radius_km: f64,
) -> Result<Vec<Outlet>, ProximityError> {
    let matches = collect_within(store, origin, radius_km)?;
    Ok(matches.into_iter().map(|nearby| nearby.outlet).collect())
}

/// Like [`find_within`] but ordered by ascending distance, ties by id.
pub fn find_within_by_distance(
    store: &dyn OutletStore,
    origin: Coordinates,
    radius_km: f64,
) -> Result<Vec<NearbyOutlet>, ProximityError> {
    let mut matches = collect_within(store, origin, radius_km)?;
    matches.sort_by(|a, b| {
        a.distance_km
            .total_cmp(&b.distance_km)
            .then(a.outlet.id.cmp(&b.outlet.id))
    });
    Ok(matches)
}

fn collect_within(
    store: &dyn OutletStore,
    origin: Coordinates,
    radius_km: f64,
) -> Result<Vec<NearbyOutlet>, ProximityError> {
    if !radius_km.is_finite() || radius_km < 0.0 {
        return Err(ProximityError::InvalidRadius { radius_km });
    }
    origin.validate()?;

    let outlets = store.get_all()?;
    Ok(outlets
        .into_iter()
        .filter_map(|outlet| {
            let location = outlet.location?;
            let distance_km = geodesic_distance_km(origin, location);
            // NaN distances from corrupt rows compare false and drop out.
            (distance_km <= radius_km).then_some(NearbyOutlet {
                outlet,
                distance_km,
            })
        })
        .collect())
}
