//! Error types raised by repository implementations.

use terraform_core::{GameId, PlayerId, TileError};
use thiserror::Error;

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("repository lock was poisoned")]
    LockPoisoned,

    #[error("game {0} not found")]
    GameNotFound(GameId),

    #[error("game {0} already exists")]
    GameExists(GameId),

    #[error("player {player} not found in game {game}")]
    PlayerNotFound { game: GameId, player: PlayerId },

    #[error(transparent)]
    Tile(#[from] TileError),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
