//! Repository layer for mutable game data
//!
//! Repositories hold the state that changes during play: games (parameters,
//! board, deck, phase) and their players. Static card data is served by the
//! card oracle, not by repositories.

mod error;
mod memory;
mod traits;

pub use error::{RepositoryError, Result};
pub use memory::{InMemoryGameRepository, InMemoryPlayerRepository};
pub use traits::{GameRepository, PlayerRepository};
