//! SeaORM entities for the movie catalog and connection helpers.
//!
//! `movie` owns its `review` rows; the foreign key cascades on delete.

pub mod db;
pub mod movie;
pub mod review;
