//! Load, run and store the turn engine over repository state.

use terraform_core::{
    GameConfig, GameId, GameState, PlayerId, PlayerState, TurnEngine, TurnError,
};

use crate::repository::{GameRepository, PlayerRepository};

/// A snapshot of one game and its players, taken under the game's lock.
pub(crate) struct TurnSession {
    pub game: GameState,
    pub players: Vec<PlayerState>,
}

impl TurnSession {
    pub fn load(
        games: &dyn GameRepository,
        players: &dyn PlayerRepository,
        id: &GameId,
    ) -> crate::repository::Result<Self> {
        Ok(Self {
            game: games.get(id)?,
            players: players.list(id)?,
        })
    }

    pub fn engine<'a>(&'a mut self, config: &'a GameConfig) -> TurnEngine<'a> {
        TurnEngine::new(&mut self.game, &mut self.players, config)
    }

    pub fn player(&self, id: &PlayerId) -> Result<&PlayerState, TurnError> {
        self.players
            .iter()
            .find(|player| &player.id == id)
            .ok_or_else(|| TurnError::PlayerNotFound { player: id.clone() })
    }

    /// Writes the game and every player back.
    pub fn store(
        &self,
        games: &dyn GameRepository,
        players: &dyn PlayerRepository,
    ) -> crate::repository::Result<()> {
        games.save(&self.game)?;
        for player in &self.players {
            players.save(&self.game.id, player)?;
        }
        Ok(())
    }
}
