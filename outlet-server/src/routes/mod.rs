//! Route table and application assembly.

use axum::Router;
use outlet_core::QueryService;
use tower_http::cors::CorsLayer;

pub mod outlets;
pub mod welcome;

/// Build a router with all routes registered and no middleware.
pub fn build_router() -> Router<QueryService> {
    Router::new()
        .merge(welcome::router())
        .merge(outlets::router())
}

/// Build the application served over HTTP.
///
/// CORS is permissive: any origin, method and header.
pub fn build_app(service: QueryService) -> Router {
    build_router()
        .layer(CorsLayer::permissive())
        .with_state(service)
}
