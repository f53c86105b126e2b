use serde::{Deserialize, Serialize};

use crate::errors::EntityError;

/// Outcome of a validated or mutating operation: a value or an error list,
/// never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceResponse<T, E = Vec<EntityError>> {
    ResponseOk(T),
    ResponseError(E),
}

impl<T, E> ServiceResponse<T, E> {
    pub fn is_ok(&self) -> bool { matches!(self, Self::ResponseOk(_)) }

    pub fn ok(self) -> Option<T> {
        match self {
            Self::ResponseOk(v) => Some(v),
            Self::ResponseError(_) => None,
        }
    }

    pub fn error(self) -> Option<E> {
        match self {
            Self::ResponseOk(_) => None,
            Self::ResponseError(e) => Some(e),
        }
    }

    pub fn into_result(self) -> Result<T, E> {
        match self {
            Self::ResponseOk(v) => Ok(v),
            Self::ResponseError(e) => Err(e),
        }
    }
}

impl<T> ServiceResponse<T> {
    /// Single-entry error list.
    pub fn failure(error: EntityError) -> Self { Self::ResponseError(vec![error]) }
}

/// Result of a single-record read.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    pub fn is_found(&self) -> bool { matches!(self, Self::Found(_)) }

    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Found(v) => Some(v),
            Self::NotFound => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Self::Found(v) => Lookup::Found(f(v)),
            Self::NotFound => Lookup::NotFound,
        }
    }
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => Self::Found(v),
            None => Self::NotFound,
        }
    }
}
