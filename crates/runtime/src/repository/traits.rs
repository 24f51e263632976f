//! Repository contracts for loading and updating mutable game state.

use terraform_core::{
    CardId, ForcedFirstAction, GameId, GameState, GlobalParameter, ParameterChange,
    PaymentSubstitute, PlacedTile, PlayerAction, PlayerEffect, PlayerId, PlayerState, QueuedTile,
    ResourceSet, TileBonus, TileKind,
};

use super::Result;

/// Per-player state of every game.
///
/// Narrow update methods exist so each mutation touches exactly one field;
/// callers never write a whole player back while holding a stale copy.
pub trait PlayerRepository: Send + Sync {
    fn get(&self, game: &GameId, player: &PlayerId) -> Result<PlayerState>;

    /// Players of a game in join order.
    fn list(&self, game: &GameId) -> Result<Vec<PlayerState>>;

    /// Inserts or replaces a player.
    fn save(&self, game: &GameId, player: &PlayerState) -> Result<()>;

    fn update_resources(
        &self,
        game: &GameId,
        player: &PlayerId,
        resources: ResourceSet,
    ) -> Result<()>;

    fn update_production(
        &self,
        game: &GameId,
        player: &PlayerId,
        production: ResourceSet,
    ) -> Result<()>;

    fn update_terraform_rating(&self, game: &GameId, player: &PlayerId, rating: i32) -> Result<()>;

    /// Appends tiles to the player's placement queue in one step. Returns the
    /// queue length afterwards.
    fn append_to_tile_queue(
        &self,
        game: &GameId,
        player: &PlayerId,
        tiles: &[TileKind],
        source: &str,
    ) -> Result<usize>;

    fn pop_tile_queue(&self, game: &GameId, player: &PlayerId) -> Result<Option<QueuedTile>>;

    fn set_forced_first_action(
        &self,
        game: &GameId,
        player: &PlayerId,
        action: Option<ForcedFirstAction>,
    ) -> Result<()>;

    fn update_effects(
        &self,
        game: &GameId,
        player: &PlayerId,
        effects: Vec<PlayerEffect>,
    ) -> Result<()>;

    fn update_actions(
        &self,
        game: &GameId,
        player: &PlayerId,
        actions: Vec<PlayerAction>,
    ) -> Result<()>;

    fn update_payment_substitutes(
        &self,
        game: &GameId,
        player: &PlayerId,
        substitutes: Vec<PaymentSubstitute>,
    ) -> Result<()>;

    fn update_card_storage(
        &self,
        game: &GameId,
        player: &PlayerId,
        card: &CardId,
        amount: i32,
    ) -> Result<()>;

    fn update_hand(&self, game: &GameId, player: &PlayerId, hand: Vec<CardId>) -> Result<()>;

    /// Moves one copy of `card` from the hand to the played cards. Returns
    /// false, changing nothing, when the card is not in hand.
    fn move_to_played(&self, game: &GameId, player: &PlayerId, card: &CardId) -> Result<bool>;
}

/// Game-wide state.
pub trait GameRepository: Send + Sync {
    /// Stores a new game; fails if the id is taken.
    fn create(&self, game: GameState) -> Result<()>;

    fn get(&self, game: &GameId) -> Result<GameState>;

    /// Replaces an existing game.
    fn save(&self, game: &GameState) -> Result<()>;

    fn list_ids(&self) -> Result<Vec<GameId>>;

    /// Raises a global parameter, clamped at its ceiling, and reports the
    /// steps actually applied.
    fn increase_global_parameter(
        &self,
        game: &GameId,
        parameter: GlobalParameter,
        steps: i32,
    ) -> Result<ParameterChange>;

    /// Places a tile on the board and returns the bonuses printed on its hex.
    fn place_tile(&self, game: &GameId, tile: PlacedTile) -> Result<Vec<TileBonus>>;

    fn draw_cards(&self, game: &GameId, count: usize) -> Result<Vec<CardId>>;
}
