use terraform_core::{BasicResource, CardId, ErrorSeverity, GameError, ResourceKind};
use thiserror::Error;

use crate::repository::RepositoryError;

/// Errors raised while applying behavior inputs and outputs.
#[derive(Debug, Error)]
pub enum EffectError {
    #[error("cannot apply {kind}: no player context")]
    MissingPlayerContext { kind: ResourceKind },

    #[error("cannot apply {kind}: no game context")]
    MissingGameContext { kind: ResourceKind },

    #[error("cannot apply {kind}: no target card selected")]
    MissingTargetCard { kind: ResourceKind },

    #[error("insufficient {resource}: need {required}, have {available}")]
    InsufficientResources {
        resource: BasicResource,
        required: i32,
        available: i32,
    },

    #[error("{resource} production cannot drop from {current} by {required} (floor {floor})")]
    ProductionFloor {
        resource: BasicResource,
        required: i32,
        current: i32,
        floor: i32,
    },

    #[error("card {card} holds {available} resources, {required} required")]
    InsufficientStorage {
        card: CardId,
        required: i32,
        available: i32,
    },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl GameError for EffectError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::MissingPlayerContext { .. } | Self::MissingGameContext { .. } => {
                ErrorSeverity::Internal
            }
            Self::MissingTargetCard { .. }
            | Self::InsufficientResources { .. }
            | Self::ProductionFloor { .. }
            | Self::InsufficientStorage { .. } => ErrorSeverity::Validation,
            Self::Repository(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingPlayerContext { .. } => "EFFECT_MISSING_PLAYER_CONTEXT",
            Self::MissingGameContext { .. } => "EFFECT_MISSING_GAME_CONTEXT",
            Self::MissingTargetCard { .. } => "EFFECT_MISSING_TARGET_CARD",
            Self::InsufficientResources { .. } => "EFFECT_INSUFFICIENT_RESOURCES",
            Self::ProductionFloor { .. } => "EFFECT_PRODUCTION_FLOOR",
            Self::InsufficientStorage { .. } => "EFFECT_INSUFFICIENT_STORAGE",
            Self::Repository(_) => "EFFECT_REPOSITORY",
        }
    }
}
