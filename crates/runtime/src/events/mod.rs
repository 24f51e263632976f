//! Typed domain events and the synchronous bus that dispatches them.
//!
//! Publishing an event runs every handler subscribed to its topic before
//! returning, including handlers triggered by events those handlers publish.
//! Passive card effects and corporation listeners are built on this.

mod bus;
mod types;

pub use bus::{DomainEvent, Event, EventBus, SubscriptionId, Topic};
pub use types::{
    CardPlayed, CorporationSelected, GameEnded, GamePhaseChanged, GameStateChanged,
    GenerationAdvanced,
    OceansChanged, OxygenChanged, PlacementBonusGained, ProductionChanged, ResourceStorageChanged,
    ResourcesChanged, StandardProjectPlayed, TemperatureChanged, TerraformRatingChanged,
    TilePlaced,
};
