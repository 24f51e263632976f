//! Runtime orchestration for the terraforming rules engine.
//!
//! This crate wires the pure rules of `terraform-core` to mutable state,
//! card data and event delivery. Consumers embed a [`GameService`] and call
//! its operations; everything else is reachable for tests and tooling.
//!
//! Modules are organized by responsibility:
//! - [`service`] runs game operations under a per-game lock
//! - [`effects`] applies behavior inputs and outputs to state
//! - [`events`] provides the typed, synchronous event bus
//! - [`subscriber`] turns passive card behaviors into bus handlers
//! - [`corporation`] applies corporation setup and forced first actions
//! - [`oracle`] and [`repository`] provide data adapters
//! - [`broadcast`] notifies transports of state changes
pub mod broadcast;
pub mod config;
pub mod corporation;
pub mod effects;
pub mod error;
pub mod events;
pub mod oracle;
pub mod repository;
pub mod service;
pub mod subscriber;

pub use broadcast::{
    BroadcastError, Broadcaster, ChannelBroadcaster, NoopBroadcaster, StateUpdate,
};
pub use config::{ConfigError, RuntimeConfig};
pub use corporation::{CorporationProcessor, FORCED_ACTION_SOURCE};
pub use effects::{EffectApplier, EffectContext, EffectError};
pub use error::{ActionError, Result};
pub use events::{DomainEvent, Event, EventBus, SubscriptionId, Topic};
pub use oracle::{CardOracleImpl, CatalogError};
pub use repository::{
    GameRepository, InMemoryGameRepository, InMemoryPlayerRepository, PlayerRepository,
    RepositoryError,
};
pub use service::{CardActionRequest, GameService, PlayCardRequest, ProjectRequest};
pub use subscriber::PassiveEffectSubscriber;
