//! Oracle access errors.

use crate::error::{ErrorSeverity, GameError};
use crate::ids::CardId;

/// Errors that occur when reading catalog data.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OracleError {
    /// Card id is not in the catalog.
    #[error("card {0} not found in catalog")]
    CardNotFound(CardId),

    /// Card exists but is not a corporation.
    #[error("card {0} is not a corporation")]
    NotACorporation(CardId),
}

impl GameError for OracleError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::CardNotFound(_) => "ORACLE_CARD_NOT_FOUND",
            Self::NotACorporation(_) => "ORACLE_NOT_A_CORPORATION",
        }
    }
}
