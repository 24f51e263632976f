//! In-memory PlayerRepository implementation.

use std::collections::HashMap;
use std::sync::RwLock;

use terraform_core::{
    CardId, ForcedFirstAction, GameId, PaymentSubstitute, PlayerAction, PlayerEffect, PlayerId,
    PlayerState, QueuedTile, ResourceSet, TileKind,
};

use crate::repository::{PlayerRepository, RepositoryError, Result};

/// In-memory implementation of PlayerRepository.
///
/// Players are kept per game in join order.
pub struct InMemoryPlayerRepository {
    players: RwLock<HashMap<GameId, Vec<PlayerState>>>,
}

impl InMemoryPlayerRepository {
    pub fn new() -> Self {
        Self {
            players: RwLock::new(HashMap::new()),
        }
    }

    fn modify<T>(
        &self,
        game: &GameId,
        player: &PlayerId,
        apply: impl FnOnce(&mut PlayerState) -> T,
    ) -> Result<T> {
        let mut players = self
            .players
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let state = players
            .get_mut(game)
            .and_then(|players| players.iter_mut().find(|p| &p.id == player))
            .ok_or_else(|| RepositoryError::PlayerNotFound {
                game: game.clone(),
                player: player.clone(),
            })?;
        Ok(apply(state))
    }
}

impl Default for InMemoryPlayerRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerRepository for InMemoryPlayerRepository {
    fn get(&self, game: &GameId, player: &PlayerId) -> Result<PlayerState> {
        let players = self
            .players
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        players
            .get(game)
            .and_then(|players| players.iter().find(|p| &p.id == player))
            .cloned()
            .ok_or_else(|| RepositoryError::PlayerNotFound {
                game: game.clone(),
                player: player.clone(),
            })
    }

    fn list(&self, game: &GameId) -> Result<Vec<PlayerState>> {
        let players = self
            .players
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(players.get(game).cloned().unwrap_or_default())
    }

    fn save(&self, game: &GameId, player: &PlayerState) -> Result<()> {
        let mut players = self
            .players
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let entries = players.entry(game.clone()).or_default();
        match entries.iter_mut().find(|p| p.id == player.id) {
            Some(existing) => *existing = player.clone(),
            None => entries.push(player.clone()),
        }
        Ok(())
    }

    fn update_resources(
        &self,
        game: &GameId,
        player: &PlayerId,
        resources: ResourceSet,
    ) -> Result<()> {
        self.modify(game, player, |p| p.resources = resources)
    }

    fn update_production(
        &self,
        game: &GameId,
        player: &PlayerId,
        production: ResourceSet,
    ) -> Result<()> {
        self.modify(game, player, |p| p.production = production)
    }

    fn update_terraform_rating(&self, game: &GameId, player: &PlayerId, rating: i32) -> Result<()> {
        self.modify(game, player, |p| p.terraform_rating = rating)
    }

    fn append_to_tile_queue(
        &self,
        game: &GameId,
        player: &PlayerId,
        tiles: &[TileKind],
        source: &str,
    ) -> Result<usize> {
        self.modify(game, player, |p| {
            p.tile_queue.append(tiles.iter().copied(), source);
            p.tile_queue.len()
        })
    }

    fn pop_tile_queue(&self, game: &GameId, player: &PlayerId) -> Result<Option<QueuedTile>> {
        self.modify(game, player, |p| p.tile_queue.pop())
    }

    fn set_forced_first_action(
        &self,
        game: &GameId,
        player: &PlayerId,
        action: Option<ForcedFirstAction>,
    ) -> Result<()> {
        self.modify(game, player, |p| p.forced_first_action = action)
    }

    fn update_effects(
        &self,
        game: &GameId,
        player: &PlayerId,
        effects: Vec<PlayerEffect>,
    ) -> Result<()> {
        self.modify(game, player, |p| p.effects = effects)
    }

    fn update_actions(
        &self,
        game: &GameId,
        player: &PlayerId,
        actions: Vec<PlayerAction>,
    ) -> Result<()> {
        self.modify(game, player, |p| p.actions = actions)
    }

    fn update_payment_substitutes(
        &self,
        game: &GameId,
        player: &PlayerId,
        substitutes: Vec<PaymentSubstitute>,
    ) -> Result<()> {
        self.modify(game, player, |p| p.payment_substitutes = substitutes)
    }

    fn update_card_storage(
        &self,
        game: &GameId,
        player: &PlayerId,
        card: &CardId,
        amount: i32,
    ) -> Result<()> {
        self.modify(game, player, |p| {
            p.card_storage.insert(card.clone(), amount);
        })
    }

    fn update_hand(&self, game: &GameId, player: &PlayerId, hand: Vec<CardId>) -> Result<()> {
        self.modify(game, player, |p| p.hand = hand)
    }

    fn move_to_played(&self, game: &GameId, player: &PlayerId, card: &CardId) -> Result<bool> {
        self.modify(game, player, |p| {
            let moved = p.remove_from_hand(card);
            if moved {
                p.played_cards.push(card.clone());
            }
            moved
        })
    }
}
