//! In-memory GameRepository implementation.

use std::collections::HashMap;
use std::sync::RwLock;

use terraform_core::{
    CardId, GameId, GameState, GlobalParameter, ParameterChange, PlacedTile, TileBonus,
};

use crate::repository::{GameRepository, RepositoryError, Result};

/// In-memory implementation of GameRepository.
pub struct InMemoryGameRepository {
    games: RwLock<HashMap<GameId, GameState>>,
}

impl InMemoryGameRepository {
    pub fn new() -> Self {
        Self {
            games: RwLock::new(HashMap::new()),
        }
    }

    fn modify<T>(&self, game: &GameId, apply: impl FnOnce(&mut GameState) -> T) -> Result<T> {
        let mut games = self
            .games
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let state = games
            .get_mut(game)
            .ok_or_else(|| RepositoryError::GameNotFound(game.clone()))?;
        Ok(apply(state))
    }
}

impl Default for InMemoryGameRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl GameRepository for InMemoryGameRepository {
    fn create(&self, game: GameState) -> Result<()> {
        let mut games = self
            .games
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        if games.contains_key(&game.id) {
            return Err(RepositoryError::GameExists(game.id));
        }
        games.insert(game.id.clone(), game);
        Ok(())
    }

    fn get(&self, game: &GameId) -> Result<GameState> {
        let games = self
            .games
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        games
            .get(game)
            .cloned()
            .ok_or_else(|| RepositoryError::GameNotFound(game.clone()))
    }

    fn save(&self, game: &GameState) -> Result<()> {
        self.modify(&game.id, |state| *state = game.clone())
    }

    fn list_ids(&self) -> Result<Vec<GameId>> {
        let games = self
            .games
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let mut ids: Vec<GameId> = games.keys().cloned().collect();
        ids.sort_unstable();
        Ok(ids)
    }

    fn increase_global_parameter(
        &self,
        game: &GameId,
        parameter: GlobalParameter,
        steps: i32,
    ) -> Result<ParameterChange> {
        self.modify(game, |state| state.global_parameters.increase(parameter, steps))
    }

    fn place_tile(&self, game: &GameId, tile: PlacedTile) -> Result<Vec<TileBonus>> {
        let bonuses = self.modify(game, |state| state.board.place(tile))??;
        Ok(bonuses)
    }

    fn draw_cards(&self, game: &GameId, count: usize) -> Result<Vec<CardId>> {
        self.modify(game, |state| state.draw_cards(count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terraform_core::{GameConfig, HexCoordinate, TileKind};

    #[test]
    fn parameter_increase_reports_clamped_steps() {
        let repo = InMemoryGameRepository::new();
        let mut game = GameState::new("g1");
        game.global_parameters.oxygen = GameConfig::MAX_OXYGEN - 2;
        repo.create(game).unwrap();

        let change = repo
            .increase_global_parameter(&GameId::from("g1"), GlobalParameter::Oxygen, 5)
            .unwrap();

        assert_eq!(change.steps, 2);
        assert_eq!(change.new, GameConfig::MAX_OXYGEN);
    }

    #[test]
    fn duplicate_game_is_rejected() {
        let repo = InMemoryGameRepository::new();
        repo.create(GameState::new("g1")).unwrap();
        assert!(matches!(
            repo.create(GameState::new("g1")),
            Err(RepositoryError::GameExists(_))
        ));
    }

    #[test]
    fn occupied_hex_is_rejected() {
        let repo = InMemoryGameRepository::new();
        repo.create(GameState::new("g1")).unwrap();
        let game = GameId::from("g1");
        let tile = PlacedTile {
            kind: TileKind::City,
            coordinate: HexCoordinate::new(0, 0),
            owner: Some("p1".into()),
        };

        repo.place_tile(&game, tile.clone()).unwrap();
        assert!(matches!(
            repo.place_tile(&game, tile),
            Err(RepositoryError::Tile(_))
        ));
    }
}
