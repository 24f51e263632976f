//! Mutable game and player state.
//!
//! These are plain data types. The runtime owns them through repositories and
//! only changes them through the effect applier and the turn machine.
mod game;
mod parameters;
mod player;
mod resources;
mod tiles;

pub use game::{GameState, Phase};
pub use parameters::{GlobalParameter, GlobalParameters, ParameterChange};
pub use player::{
    CardSelectionKind, ForcedFirstAction, PaymentSubstitute, PendingCardSelection, PlayerAction,
    PlayerEffect, PlayerState, default_payment_substitutes,
};
pub use resources::ResourceSet;
pub use tiles::{
    Board, BoardHex, HexCoordinate, PendingTileSelectionQueue, PlacedTile, QueuedTile, TileBonus,
    TileError, TileKind,
};
