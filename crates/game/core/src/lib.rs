//! Deterministic rules and data types of the terraforming card game.
//!
//! `terraform-core` defines the canonical rules (card and behavior schema,
//! requirement and payment validation, discounts, global parameters, turn and
//! generation bookkeeping, victory points) as pure APIs without I/O or
//! locking. The runtime crate orchestrates them behind repositories and an
//! event bus; every type it needs is re-exported here.
pub mod behavior;
pub mod card;
pub mod config;
pub mod discount;
pub mod engine;
pub mod env;
pub mod error;
pub mod ids;
pub mod project;
pub mod scoring;
pub mod state;
pub mod validation;

pub use behavior::{
    BasicResource, Behavior, BehaviorError, Choice, ConditionKind, CostRange, EffectCategory,
    Location, Per, ResourceEffect, ResourceKind, Selector, Target, Trigger, TriggerCondition,
    TriggerKind,
};
pub use card::{
    Card, CardKind, Requirement, RequirementKind, ResourceStorage, Tag, VictoryPointCondition,
    VictoryPointKind,
};
pub use config::GameConfig;
pub use discount::{card_discount, effective_cost, matches_any_selector, project_discount};
pub use engine::{
    ConsumeOutcome, ProductionConfirmation, ProductionSummary, SkipKind, SkipOutcome, TurnEngine,
    TurnError, consume_action, production_income, unselected_cards,
};
pub use env::{CardOracle, OracleError};
pub use error::{ErrorSeverity, GameError};
pub use ids::{CardId, GameId, PlayerId};
pub use project::StandardProject;
pub use scoring::{
    CardScore, VictoryPoints, condition_points, count_per, final_standings, score_player,
};
pub use state::{
    Board, BoardHex, CardSelectionKind, ForcedFirstAction, GameState, GlobalParameter,
    GlobalParameters, HexCoordinate, PaymentSubstitute, PendingCardSelection,
    PendingTileSelectionQueue, Phase, PlacedTile, PlayerAction, PlayerEffect, PlayerState,
    ParameterChange, QueuedTile, ResourceSet, TileBonus, TileError, TileKind,
    default_payment_substitutes,
};
pub use validation::{
    CardPayment, PaymentError, RequirementError, TagCounts, validate_requirements,
};
