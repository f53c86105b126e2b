use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::errors::StoreError;

/// Failures that abort an operation instead of being reported in an error list.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("database error: {0}")]
    Db(String),
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Unavailable(msg) => Self::Unavailable(msg),
            StoreError::Query(msg) => Self::Db(msg),
            StoreError::Commit { kind, message } => Self::Db(format!("{kind}: {message}")),
        }
    }
}

/// One entry of the error list a failed validation or mutation returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityError {
    /// Classification tag; empty for input validation failures.
    pub error_type: String,
    pub message: String,
}

impl EntityError {
    pub const MOVIE_NOT_FOUND: &'static str = "MovieNotFound";

    pub fn new(error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self { error_type: error_type.into(), message: message.into() }
    }

    pub fn validation(message: impl Into<String>) -> Self { Self::new("", message) }

    pub fn movie_not_found(id: i32) -> Self {
        Self::new(Self::MOVIE_NOT_FOUND, format!("movie {id} not found"))
    }

    pub fn is_not_found(&self) -> bool { self.error_type == Self::MOVIE_NOT_FOUND }
}
