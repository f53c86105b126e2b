//! Cross-cutting helpers shared by the catalog crates: logging setup and
//! small wire types that do not belong to any one layer.

pub mod types;
pub mod utils;
