//! # API error handling
//!
//! Maps monitor and store failures onto HTTP status codes and a JSON body.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use folio_core::settings::error::StoreError;
use folio_monitor::error::MonitorError;
use thiserror::Error;

use crate::types::ApiErrorResponse;

#[derive(Error, Debug)]
pub enum ApiError {
    /// 404
    #[error("Not found: {0}")]
    NotFound(String),

    /// 400
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 503, the monitor loop is not running
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// 500
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            ApiError::Internal(msg) => {
                // Details stay in the log.
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(ApiErrorResponse::from_msg(message));
        (status, body).into_response()
    }
}

impl From<MonitorError> for ApiError {
    fn from(err: MonitorError) -> Self {
        match err {
            MonitorError::Store(StoreError::Invalid(msg)) => ApiError::BadRequest(msg),
            MonitorError::Store(e) => ApiError::Internal(e.to_string()),
            MonitorError::Stopped => ApiError::Unavailable("Monitor loop is not running".to_string()),
        }
    }
}
