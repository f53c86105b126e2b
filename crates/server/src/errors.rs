use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use service::errors::{EntityError, ServiceError};

/// Problem-style JSON error body.
#[derive(Debug, Serialize)]
pub struct JsonApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, title: impl Into<String>, detail: Option<String>) -> Self {
        Self { status, title: title.into(), detail }
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not Found", Some(detail.into()))
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let status = self.status;
        let body = serde_json::json!({
            "status": status.as_u16(),
            "title": self.title,
            "detail": self.detail,
        });
        (status, Json(body)).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        error!(err = %e, "catalog operation failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", Some(e.to_string()))
    }
}

/// Error list returned by a validation or mutation failure.
#[derive(Debug)]
pub struct ErrorList(pub Vec<EntityError>);

impl ErrorList {
    pub fn status(&self) -> StatusCode {
        if self.0.iter().any(EntityError::is_not_found) { StatusCode::NOT_FOUND } else { StatusCode::BAD_REQUEST }
    }
}

impl IntoResponse for ErrorList {
    fn into_response(self) -> Response {
        (self.status(), Json(self.0)).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("database unavailable: {0}")]
    Database(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
