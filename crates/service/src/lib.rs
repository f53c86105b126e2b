//! Service layer for the movie catalog.
//! - `catalog` holds the business operations, the store seam and the mapper.
//! - `pagination` and `response` are the shapes every listing/mutation returns.
//! - Fatal failures surface as `errors::ServiceError`; recoverable ones as
//!   `errors::EntityError` lists inside a `ServiceResponse`.

pub mod errors;
pub mod pagination;
pub mod response;
pub mod catalog;
#[cfg(test)]
pub mod test_support;
