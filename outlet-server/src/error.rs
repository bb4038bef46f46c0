//! HTTP error mapping.
//!
//! Every failure is rendered as `{"detail": "..."}` with a status derived
//! from the query error kind. Storage failures are logged and reported
//! without internal detail.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::error;
use outlet_core::QueryError;
use serde::Serialize;

/// Errors returned by route handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 404 with the given detail.
    #[error("{0}")]
    NotFound(String),
    /// 400 with the given detail.
    #[error("{0}")]
    BadRequest(String),
    /// 500; the detail is logged, not returned.
    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    detail: &'a str,
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> &str {
        match self {
            Self::NotFound(detail) | Self::BadRequest(detail) | Self::Internal(detail) => detail,
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::NotFound { .. } => Self::NotFound("Outlet not found".to_owned()),
            QueryError::InvalidArgument(message) => Self::BadRequest(message),
            QueryError::Store(source) => {
                error!("outlet query failed: {source}");
                Self::Internal("Internal server error".to_owned())
            }
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        error!("outlet query task failed: {err}");
        Self::Internal("Internal server error".to_owned())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            detail: self.detail(),
        });
        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use outlet_core::OutletStoreError;
    use rstest::rstest;

    #[rstest]
    fn not_found_uses_fixed_detail() {
        let err = ApiError::from(QueryError::NotFound { id: 7 });
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.detail(), "Outlet not found");
    }

    #[rstest]
    fn invalid_argument_keeps_message() {
        let err = ApiError::from(QueryError::InvalidArgument("radius must be positive".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.detail(), "radius must be positive");
    }

    #[rstest]
    fn storage_failures_hide_internal_detail() {
        let err = ApiError::from(QueryError::Store(OutletStoreError::Query {
            operation: "list outlets",
            source: "disk I/O error".into(),
        }));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.detail().contains("disk"));
    }
}
