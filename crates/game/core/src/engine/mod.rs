//! Turn, phase and generation state machine.
//!
//! The [`TurnEngine`] is the authoritative reducer for turn bookkeeping. It
//! borrows the game and its players for the duration of one operation and
//! never performs I/O, so the runtime can run it inside its per-game critical
//! section and persist the result afterwards.
//!
//! # Phases
//!
//! ```text
//! waiting-for-game-start -> starting-card-selection -> action
//!                                                       ^   |
//!                                                       |   v
//!                                          production-and-card-draw -> complete
//! ```
//!
//! # Actions
//!
//! Every player holds an action counter. A turn starts with
//! [`GameConfig::max_actions_per_turn`] actions, and
//! [`GameConfig::UNLIMITED_ACTIONS`] marks the last non-passed player (and
//! solo players), whose counter never decreases.

mod errors;
mod production;
mod turns;

pub use errors::TurnError;
pub use production::{production_income, unselected_cards};
pub use turns::consume_action;

use crate::config::GameConfig;
use crate::ids::PlayerId;
use crate::state::{GameState, Phase, PlayerState, ResourceSet};

/// Whether a skip request marked the player passed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SkipKind {
    /// No action taken this turn: the player is out for the generation.
    Passed,
    /// At least one action taken: the turn moves on, the player stays in.
    Skipped,
}

/// Result of [`TurnEngine::skip_action`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkipOutcome {
    pub kind: SkipKind,
    /// Player granted unlimited actions because everyone else has passed.
    pub unlimited_granted: Option<PlayerId>,
    /// Production ran and a new generation started.
    pub generation_over: bool,
    /// Player whose turn it is now; `None` when the generation ended.
    pub next_player: Option<PlayerId>,
    /// Set when the generation ended.
    pub production: Option<ProductionSummary>,
}

/// Result of [`TurnEngine::consume_action`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsumeOutcome {
    /// False when the player has unlimited actions.
    pub consumed: bool,
    pub remaining: i32,
    /// Set when the turn moved to another player.
    pub next_player: Option<PlayerId>,
}

/// Result of [`TurnEngine::run_production`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductionSummary {
    /// Generation that starts after this production phase.
    pub generation: u32,
    /// Every global parameter is maxed and the game is over.
    pub game_complete: bool,
    /// Resource delta owed to each player. The engine leaves held resources
    /// untouched; the caller applies these.
    pub income: Vec<(PlayerId, ResourceSet)>,
}

/// Result of [`TurnEngine::confirm_production_cards`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProductionConfirmation {
    /// Credits owed for the bought cards, not yet deducted.
    pub cost: i32,
    /// This was the last player to confirm and the action phase has begun.
    pub action_phase_started: bool,
}

/// Turn bookkeeping over one game and its players.
///
/// `players` may be in any order; seating order comes from
/// [`GameState::player_order`].
pub struct TurnEngine<'a> {
    game: &'a mut GameState,
    players: &'a mut [PlayerState],
    config: &'a GameConfig,
}

impl<'a> TurnEngine<'a> {
    pub fn new(
        game: &'a mut GameState,
        players: &'a mut [PlayerState],
        config: &'a GameConfig,
    ) -> Self {
        Self {
            game,
            players,
            config,
        }
    }

    pub fn phase(&self) -> Phase {
        self.game.phase
    }

    pub fn ensure_phase(&self, expected: Phase) -> Result<(), TurnError> {
        if self.game.phase != expected {
            return Err(TurnError::WrongPhase {
                expected,
                actual: self.game.phase,
            });
        }
        Ok(())
    }

    fn player_index(&self, id: &PlayerId) -> Result<usize, TurnError> {
        self.players
            .iter()
            .position(|player| &player.id == id)
            .ok_or_else(|| TurnError::PlayerNotFound { player: id.clone() })
    }

    fn player(&self, id: &PlayerId) -> Result<&PlayerState, TurnError> {
        let index = self.player_index(id)?;
        Ok(&self.players[index])
    }

    fn player_mut(&mut self, id: &PlayerId) -> Result<&mut PlayerState, TurnError> {
        let index = self.player_index(id)?;
        Ok(&mut self.players[index])
    }

    /// Counter value a fresh turn starts with.
    fn turn_allowance(&self) -> i32 {
        if self.game.is_solo() {
            GameConfig::UNLIMITED_ACTIONS
        } else {
            self.config.max_actions_per_turn
        }
    }

    fn active_player_count(&self) -> usize {
        self.players.iter().filter(|player| !player.passed).count()
    }
}
