//! Outlet listing, lookup, search and radius routes.
//!
//! Store access is synchronous, so each handler runs its query on the
//! blocking pool.

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
    routing::get,
};
use outlet_core::{NearbyOutlet, Outlet, OutletId, QueryError, QueryService};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Routes under `/outlets`.
pub fn router() -> Router<QueryService> {
    Router::new()
        .route("/outlets", get(list_outlets))
        .route("/outlets/{id}", get(get_outlet))
        .route("/outlets/search", get(search_outlets))
        .route("/outlets/search/", get(search_outlets))
        .route("/outlets/nearby", get(nearby_outlets))
        .route("/outlets/nearby/", get(nearby_outlets))
}

/// `{"outlets": [...]}` body for listings and searches.
#[derive(Serialize)]
pub struct OutletsResponse {
    outlets: Vec<Outlet>,
}

/// `{"outlet": {...}}` body for a single lookup.
#[derive(Serialize)]
pub struct OutletResponse {
    outlet: Outlet,
}

/// Radius matches, with distances when ordered by distance.
#[derive(Serialize)]
#[serde(untagged)]
pub enum NearbyItems {
    /// Listing order, without distances.
    Listed(Vec<Outlet>),
    /// Nearest first, each with `distance_km`.
    ByDistance(Vec<NearbyOutlet>),
}

/// `{"nearby_outlets": [...]}` body for radius queries.
#[derive(Serialize)]
pub struct NearbyResponse {
    nearby_outlets: NearbyItems,
}

/// Query string of `/outlets/search`.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    name: String,
}

/// Result ordering for `/outlets/nearby`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NearbyOrder {
    /// Store listing order.
    #[default]
    Listing,
    /// Ascending distance, ties by id.
    Distance,
}

/// Query string of `/outlets/nearby`.
#[derive(Debug, Deserialize)]
pub struct NearbyParams {
    latitude: f64,
    longitude: f64,
    radius: f64,
    #[serde(default)]
    order: NearbyOrder,
}

/// Run a synchronous query on the blocking pool.
async fn blocking<T, F>(service: QueryService, query: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&QueryService) -> Result<T, QueryError> + Send + 'static,
{
    let result = tokio::task::spawn_blocking(move || query(&service)).await?;
    Ok(result?)
}

async fn list_outlets(
    State(service): State<QueryService>,
) -> Result<Json<OutletsResponse>, ApiError> {
    let outlets = blocking(service, QueryService::list_all).await?;
    Ok(Json(OutletsResponse { outlets }))
}

async fn get_outlet(
    State(service): State<QueryService>,
    id: Result<Path<OutletId>, PathRejection>,
) -> Result<Json<OutletResponse>, ApiError> {
    let Path(id) = id.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let outlet = blocking(service, move |service| service.get_one(id)).await?;
    Ok(Json(OutletResponse { outlet }))
}

async fn search_outlets(
    State(service): State<QueryService>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<OutletsResponse>, ApiError> {
    let Query(SearchParams { name }) =
        params.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let outlets = blocking(service, move |service| service.search_by_name(&name)).await?;
    Ok(Json(OutletsResponse { outlets }))
}

async fn nearby_outlets(
    State(service): State<QueryService>,
    params: Result<Query<NearbyParams>, QueryRejection>,
) -> Result<Json<NearbyResponse>, ApiError> {
    let Query(params) = params.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let NearbyParams {
        latitude,
        longitude,
        radius,
        order,
    } = params;
    let nearby_outlets = match order {
        NearbyOrder::Listing => NearbyItems::Listed(
            blocking(service, move |service| {
                service.nearby(latitude, longitude, radius)
            })
            .await?,
        ),
        NearbyOrder::Distance => NearbyItems::ByDistance(
            blocking(service, move |service| {
                service.nearby_by_distance(latitude, longitude, radius)
            })
            .await?,
        ),
    };
    Ok(Json(NearbyResponse { nearby_outlets }))
}
