//! In-memory repository implementations for tests and local runs.

mod game;
mod player;

pub use game::InMemoryGameRepository;
pub use player::InMemoryPlayerRepository;
