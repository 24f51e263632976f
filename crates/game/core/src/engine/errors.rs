//! Error types for the turn and generation state machine.

use crate::error::{ErrorSeverity, GameError};
use crate::ids::{CardId, PlayerId};
use crate::state::Phase;

/// Errors raised while validating or advancing turns.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TurnError {
    #[error("it is not {player}'s turn")]
    NotPlayerTurn { player: PlayerId },

    #[error("operation requires phase {expected}, game is in {actual}")]
    WrongPhase { expected: Phase, actual: Phase },

    #[error("player {player} has no actions remaining")]
    NoActionsRemaining { player: PlayerId },

    #[error("player {player} has already passed this generation")]
    AlreadyPassed { player: PlayerId },

    #[error("player {player} is not part of this game")]
    PlayerNotFound { player: PlayerId },

    #[error("game has no players")]
    NoPlayers,

    #[error("player {player} has no pending card selection")]
    NoPendingSelection { player: PlayerId },

    #[error("card {card} was not offered to the player")]
    CardNotOffered { card: CardId },

    #[error("buying {count} cards costs {required} credits, player has {available}")]
    CannotAffordSelection {
        count: usize,
        required: i32,
        available: i32,
    },
}

impl GameError for TurnError {
    fn severity(&self) -> ErrorSeverity {
        use TurnError::*;
        match self {
            NotPlayerTurn { .. } | WrongPhase { .. } => ErrorSeverity::Recoverable,
            NoActionsRemaining { .. }
            | AlreadyPassed { .. }
            | NoPendingSelection { .. }
            | CardNotOffered { .. }
            | CannotAffordSelection { .. } => ErrorSeverity::Validation,
            PlayerNotFound { .. } | NoPlayers => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        use TurnError::*;
        match self {
            NotPlayerTurn { .. } => "TURN_NOT_PLAYER_TURN",
            WrongPhase { .. } => "TURN_WRONG_PHASE",
            NoActionsRemaining { .. } => "TURN_NO_ACTIONS_REMAINING",
            AlreadyPassed { .. } => "TURN_ALREADY_PASSED",
            PlayerNotFound { .. } => "TURN_PLAYER_NOT_FOUND",
            NoPlayers => "TURN_NO_PLAYERS",
            NoPendingSelection { .. } => "TURN_NO_PENDING_SELECTION",
            CardNotOffered { .. } => "TURN_CARD_NOT_OFFERED",
            CannotAffordSelection { .. } => "TURN_CANNOT_AFFORD_SELECTION",
        }
    }
}
