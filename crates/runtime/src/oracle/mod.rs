//! Runtime implementations of the core's read-only data oracles.
//!
//! The card catalog is immutable once loaded; dynamic state lives in
//! repositories.
mod cards;

pub use cards::{CardOracleImpl, CatalogError};
