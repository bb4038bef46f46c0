//! Root route.

use axum::{Json, Router, routing::get};
use outlet_core::QueryService;
use serde::Serialize;

/// Body of the `GET /` greeting.
pub const WELCOME_MESSAGE: &str = "Welcome to the Subway Outlets API!";

/// `{"message": ...}` returned by `GET /`.
#[derive(Serialize)]
pub struct WelcomeResponse {
    message: &'static str,
}

/// Routes for `/`.
pub fn router() -> Router<QueryService> {
    Router::new().route("/", get(welcome))
}

async fn welcome() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: WELCOME_MESSAGE,
    })
}
