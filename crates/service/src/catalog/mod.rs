//! Movie catalog: domain, mapper, store seam and the business service.
//!
//! The service only talks to `repository::MovieStore`; `repo::seaorm`
//! provides the database-backed store and `repository::mock` an in-memory
//! one for tests.

pub mod domain;
pub mod errors;
pub mod mapper;
pub mod repository;
pub mod repo;
pub mod service;

pub use service::MovieCatalogService;
