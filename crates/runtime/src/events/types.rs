//! Domain event payloads.
//!
//! Every event names the game it belongs to and when it happened. Player
//! scoped events name the player who caused them, which is what passive
//! effects compare against their owner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use terraform_core::{
    BasicResource, CardId, CardKind, GameId, HexCoordinate, Phase, PlayerId, StandardProject, Tag,
    TileBonus, TileKind, VictoryPoints,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcesChanged {
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub resource: BasicResource,
    pub old_amount: i32,
    pub new_amount: i32,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionChanged {
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub resource: BasicResource,
    pub old_production: i32,
    pub new_production: i32,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerraformRatingChanged {
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub old_rating: i32,
    pub new_rating: i32,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemperatureChanged {
    pub game_id: GameId,
    pub old_value: i32,
    pub new_value: i32,
    pub changed_by: Option<PlayerId>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OxygenChanged {
    pub game_id: GameId,
    pub old_value: i32,
    pub new_value: i32,
    pub changed_by: Option<PlayerId>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OceansChanged {
    pub game_id: GameId,
    pub old_value: i32,
    pub new_value: i32,
    pub changed_by: Option<PlayerId>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilePlaced {
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub tile: TileKind,
    pub coordinate: HexCoordinate,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementBonusGained {
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub bonuses: Vec<TileBonus>,
    pub coordinate: HexCoordinate,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardPlayed {
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub card_id: CardId,
    pub card_name: String,
    pub card_kind: CardKind,
    pub tags: Vec<Tag>,
    /// Printed cost before discounts.
    pub cost: i32,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardProjectPlayed {
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub project: StandardProject,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorporationSelected {
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub corporation_id: CardId,
    pub corporation_name: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceStorageChanged {
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub card_id: CardId,
    pub old_amount: i32,
    pub new_amount: i32,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GamePhaseChanged {
    pub game_id: GameId,
    pub old_phase: Phase,
    pub new_phase: Phase,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationAdvanced {
    pub game_id: GameId,
    pub old_generation: u32,
    pub new_generation: u32,
    pub timestamp: DateTime<Utc>,
}

/// Something visible changed; clients should refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStateChanged {
    pub game_id: GameId,
    pub player_id: Option<PlayerId>,
    pub timestamp: DateTime<Utc>,
}

/// The game is complete. Standings are best first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEnded {
    pub game_id: GameId,
    pub standings: Vec<(PlayerId, VictoryPoints)>,
    pub timestamp: DateTime<Utc>,
}
