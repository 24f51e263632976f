//! Traits describing read-only game data.
//!
//! The card catalog is loaded once and never mutated. The core only reads it
//! through [`CardOracle`] so the runtime is free to back it with JSON files,
//! an embedded table or a test fixture.
mod cards;
mod error;

pub use cards::CardOracle;
pub use error::OracleError;
