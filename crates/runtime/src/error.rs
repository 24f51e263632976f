//! Caller-facing error of every game operation.
//!
//! Wraps the rule errors of `terraform-core` and the runtime's own failures
//! so a transport can report them with one [`GameError`] code. An operation
//! that returns an error has consumed no action and broadcast nothing.

use terraform_core::{
    BehaviorError, CardId, ErrorSeverity, GameError, OracleError, PaymentError, PlayerId,
    RequirementError, StandardProject, TileError, TurnError,
};
use thiserror::Error;

use crate::effects::EffectError;
use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, ActionError>;

#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Turn(#[from] TurnError),

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error("{} requirement(s) not met", .0.len())]
    Requirements(Vec<RequirementError>),

    #[error(transparent)]
    Behavior(#[from] BehaviorError),

    #[error(transparent)]
    Effect(#[from] EffectError),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error(transparent)]
    Tile(#[from] TileError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("card {card} is not in {player}'s hand")]
    CardNotInHand { player: PlayerId, card: CardId },

    #[error("card {card} has no action at behavior {behavior_index}")]
    ActionNotFound { card: CardId, behavior_index: usize },

    #[error("action {behavior_index} of card {card} was already played this generation")]
    ActionAlreadyPlayed { card: CardId, behavior_index: usize },

    #[error("corporation {card} was not offered to {player}")]
    CorporationNotOffered { player: PlayerId, card: CardId },

    #[error("player {player} already joined")]
    PlayerExists { player: PlayerId },

    #[error("{player} must place {remaining} queued tile(s) first")]
    TilePlacementPending { player: PlayerId, remaining: usize },

    #[error("not enough plants: need {required}, have {available}")]
    NotEnoughPlants { required: i32, available: i32 },

    #[error("not enough heat: need {required}, have {available}")]
    NotEnoughHeat { required: i32, available: i32 },

    #[error("{0} is a conversion, not a standard project")]
    NotAProject(StandardProject),
}

impl GameError for ActionError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Turn(err) => err.severity(),
            Self::Payment(err) => err.severity(),
            Self::Behavior(err) => err.severity(),
            Self::Effect(err) => err.severity(),
            Self::Oracle(err) => err.severity(),
            Self::Tile(err) | Self::Repository(RepositoryError::Tile(err)) => err.severity(),
            Self::Repository(_) => ErrorSeverity::Internal,
            Self::TilePlacementPending { .. } => ErrorSeverity::Recoverable,
            Self::Requirements(_)
            | Self::CardNotInHand { .. }
            | Self::ActionNotFound { .. }
            | Self::ActionAlreadyPlayed { .. }
            | Self::CorporationNotOffered { .. }
            | Self::PlayerExists { .. }
            | Self::NotEnoughPlants { .. }
            | Self::NotEnoughHeat { .. }
            | Self::NotAProject(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Turn(err) => err.error_code(),
            Self::Payment(err) => err.error_code(),
            Self::Requirements(_) => "ACTION_REQUIREMENTS_NOT_MET",
            Self::Behavior(err) => err.error_code(),
            Self::Effect(err) => err.error_code(),
            Self::Oracle(err) => err.error_code(),
            Self::Tile(err) | Self::Repository(RepositoryError::Tile(err)) => err.error_code(),
            Self::Repository(_) => "ACTION_REPOSITORY",
            Self::CardNotInHand { .. } => "ACTION_CARD_NOT_IN_HAND",
            Self::ActionNotFound { .. } => "ACTION_NOT_FOUND",
            Self::ActionAlreadyPlayed { .. } => "ACTION_ALREADY_PLAYED",
            Self::CorporationNotOffered { .. } => "ACTION_CORPORATION_NOT_OFFERED",
            Self::PlayerExists { .. } => "ACTION_PLAYER_EXISTS",
            Self::TilePlacementPending { .. } => "ACTION_TILE_PLACEMENT_PENDING",
            Self::NotEnoughPlants { .. } => "ACTION_NOT_ENOUGH_PLANTS",
            Self::NotEnoughHeat { .. } => "ACTION_NOT_ENOUGH_HEAT",
            Self::NotAProject(_) => "ACTION_NOT_A_PROJECT",
        }
    }
}

#[cfg(test)]
mod tests {
    use terraform_core::{HexCoordinate, RequirementKind};

    use super::*;

    #[test]
    fn wrapped_errors_keep_their_codes() {
        let err = ActionError::from(TurnError::NoPlayers);
        assert_eq!(err.error_code(), "TURN_NO_PLAYERS");
        assert_eq!(err.severity(), ErrorSeverity::Internal);

        let occupied = TileError::Occupied(HexCoordinate::new(0, 0));
        let err = ActionError::from(RepositoryError::Tile(occupied));
        assert_eq!(err.error_code(), "TILE_OCCUPIED");
        assert_eq!(err.severity(), ErrorSeverity::Validation);
    }

    #[test]
    fn requirement_failures_are_counted() {
        let err = ActionError::Requirements(vec![RequirementError {
            kind: RequirementKind::Oxygen,
            message: "oxygen too low".into(),
            required: 5,
            current: 2,
        }]);
        assert_eq!(err.to_string(), "1 requirement(s) not met");
    }
}
