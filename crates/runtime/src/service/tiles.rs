use chrono::Utc;
use terraform_core::{
    GameId, GlobalParameter, HexCoordinate, PlacedTile, PlayerId, ResourceEffect, TileError,
    TileKind,
};
use tracing::info;

use super::{GameService, TurnSession};
use crate::effects::EffectContext;
use crate::error::Result;
use crate::events::{PlacementBonusGained, TilePlaced};

/// Source recorded for resources granted by a hex.
const PLACEMENT_BONUS_SOURCE: &str = "placement-bonus";

/// Tile placement.
impl GameService {
    /// Places the head of the player's tile queue at `coordinate`.
    ///
    /// Oceans raise the ocean count and greeneries the oxygen level, each by
    /// one step with terraform rating for the player. Oceans have no owner.
    /// The turn moves on once the player is out of actions and tiles.
    pub async fn select_tile(
        &self,
        game: &GameId,
        player: &PlayerId,
        coordinate: HexCoordinate,
    ) -> Result<PlacedTile> {
        let _guard = self.lock_game(game).await;
        let mut session = TurnSession::load(self.games.as_ref(), self.players.as_ref(), game)?;
        session.engine(&self.config.game).ensure_player_turn(player)?;
        let queued = session
            .player(player)?
            .tile_queue
            .peek()
            .cloned()
            .ok_or(TileError::NothingPending)?;

        let tile = PlacedTile {
            kind: queued.kind,
            coordinate,
            owner: (queued.kind != TileKind::Ocean).then(|| player.clone()),
        };
        let bonuses = self.games.place_tile(game, tile.clone())?;
        self.players.pop_tile_queue(game, player)?;

        match tile.kind {
            TileKind::Ocean => {
                self.applier
                    .raise_parameter(game, Some(player), GlobalParameter::Oceans, 1)?;
            }
            TileKind::Greenery => {
                self.applier
                    .raise_parameter(game, Some(player), GlobalParameter::Oxygen, 1)?;
            }
            TileKind::City => {}
        }

        if !bonuses.is_empty() {
            let outputs: Vec<ResourceEffect> = bonuses
                .iter()
                .map(|bonus| ResourceEffect::new(bonus.resource, bonus.amount))
                .collect();
            let ctx = EffectContext::for_player(game, player, PLACEMENT_BONUS_SOURCE);
            self.applier.apply_outputs(&ctx, &outputs)?;
            self.publish(PlacementBonusGained {
                game_id: game.clone(),
                player_id: player.clone(),
                bonuses,
                coordinate,
                timestamp: Utc::now(),
            });
        }
        self.publish(TilePlaced {
            game_id: game.clone(),
            player_id: player.clone(),
            tile: tile.kind,
            coordinate,
            timestamp: Utc::now(),
        });

        let mut session = TurnSession::load(self.games.as_ref(), self.players.as_ref(), game)?;
        let next = session
            .engine(&self.config.game)
            .advance_if_exhausted(player)?;
        session.store(self.games.as_ref(), self.players.as_ref())?;

        info!(
            target: "runtime::service",
            game = %game,
            player = %player,
            tile = %tile.kind,
            q = coordinate.q,
            r = coordinate.r,
            source = %queued.source,
            next = ?next,
            "tile placed"
        );
        self.broadcast(game, Some(player));
        Ok(tile)
    }
}
