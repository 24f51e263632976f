//! Behavior interpreter.
//!
//! The [`EffectApplier`] executes resolved input and output lists against the
//! repositories and announces every change on the event bus. It is the only
//! component that writes player resources, production, terraform rating,
//! card storage and global parameters.
//!
//! # Atomicity
//!
//! Inputs are all-or-nothing: every cost is checked against a working copy of
//! the player before anything is written, and the paid copy is stored in a
//! single save. Outputs are applied one by one and
//! are not rolled back when a later output fails.

mod context;
mod counting;
mod error;
mod outputs;

pub use context::EffectContext;
pub use error::EffectError;

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use strum::IntoEnumIterator;
use terraform_core::{
    BasicResource, CardId, CardOracle, EffectCategory, GameId, PlayerId, PlayerState,
    ResourceEffect, ResourceSet, TagCounts,
};

use crate::events::{
    DomainEvent, EventBus, ProductionChanged, ResourceStorageChanged, ResourcesChanged,
    TerraformRatingChanged,
};
use crate::repository::{GameRepository, PlayerRepository};

/// Applies behavior inputs and outputs.
///
/// Cheap to clone; clones share repositories and the bus.
#[derive(Clone)]
pub struct EffectApplier {
    players: Arc<dyn PlayerRepository>,
    games: Arc<dyn GameRepository>,
    cards: Arc<dyn CardOracle>,
    bus: EventBus,
}

impl EffectApplier {
    pub fn new(
        players: Arc<dyn PlayerRepository>,
        games: Arc<dyn GameRepository>,
        cards: Arc<dyn CardOracle>,
        bus: EventBus,
    ) -> Self {
        Self {
            players,
            games,
            cards,
            bus,
        }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Deducts every input, or nothing.
    ///
    /// Basic resources are checked against the player's holdings, production
    /// against its floor, and card resources against the source card's
    /// storage. Inputs of other kinds are skipped with a warning.
    pub fn apply_inputs(
        &self,
        ctx: &EffectContext,
        inputs: &[ResourceEffect],
    ) -> Result<(), EffectError> {
        let Some(first) = inputs.first() else {
            return Ok(());
        };
        let (game, player_id) = ctx.require_player(first.kind)?;
        let player = self.players.get(game, player_id)?;

        let plan = plan_inputs(ctx, &player, inputs)?;

        let mut paid = player.clone();
        paid.resources = plan.resources;
        paid.production = plan.production;
        for (card, amount) in &plan.storage {
            paid.card_storage.insert(card.clone(), *amount);
        }
        if paid == player {
            return Ok(());
        }
        self.players.save(game, &paid)?;

        self.announce_resources(game, &player, plan.resources);
        self.announce_production(game, &player, plan.production);
        for (card, amount) in &plan.storage {
            self.announce_storage(game, &player, card, *amount);
        }

        tracing::debug!(
            target: "runtime::effects",
            game = %game,
            player = %player_id,
            source = %ctx.source,
            inputs = inputs.len(),
            "inputs deducted"
        );
        Ok(())
    }

    /// Checks that `player` could pay every input without writing anything.
    ///
    /// The state may be a projection, e.g. the player after a card payment.
    pub fn check_inputs(
        &self,
        ctx: &EffectContext,
        player: &PlayerState,
        inputs: &[ResourceEffect],
    ) -> Result<(), EffectError> {
        plan_inputs(ctx, player, inputs).map(|_| ())
    }

    /// Adds a signed delta to the player's resources.
    ///
    /// Fails without writing when any resource would go negative.
    pub fn adjust_resources(
        &self,
        game: &GameId,
        player: &PlayerId,
        delta: &ResourceSet,
    ) -> Result<ResourceSet, EffectError> {
        let state = self.players.get(game, player)?;
        let mut resources = state.resources;
        resources.add_all(delta);

        if let Some(resource) = BasicResource::iter().find(|r| resources.get(*r) < 0) {
            return Err(EffectError::InsufficientResources {
                resource,
                required: -delta.get(resource),
                available: state.resources.get(resource),
            });
        }

        self.commit_resources(game, &state, resources)?;
        Ok(resources)
    }

    /// Adds a signed delta to every production rate, clamping at floors.
    pub fn adjust_production(
        &self,
        game: &GameId,
        player: &PlayerId,
        delta: &ResourceSet,
    ) -> Result<ResourceSet, EffectError> {
        let state = self.players.get(game, player)?;
        let mut production = state.production;
        for resource in BasicResource::iter() {
            production.add_production(resource, delta.get(resource));
        }
        self.commit_production(game, &state, production)?;
        Ok(production)
    }

    pub fn adjust_terraform_rating(
        &self,
        game: &GameId,
        player: &PlayerId,
        delta: i32,
    ) -> Result<i32, EffectError> {
        if delta == 0 {
            return Ok(self.players.get(game, player)?.terraform_rating);
        }
        let state = self.players.get(game, player)?;
        let rating = state.terraform_rating + delta;
        self.players.update_terraform_rating(game, player, rating)?;
        self.publish(TerraformRatingChanged {
            game_id: game.clone(),
            player_id: player.clone(),
            old_rating: state.terraform_rating,
            new_rating: rating,
            timestamp: Utc::now(),
        });
        Ok(rating)
    }

    /// Tags on the player's tableau.
    pub fn tag_counts(&self, player: &PlayerState) -> TagCounts {
        TagCounts::for_tableau(player, self.cards.as_ref())
    }

    fn publish<E: DomainEvent>(&self, event: E) {
        self.bus.publish(event);
    }

    fn commit_resources(
        &self,
        game: &GameId,
        before: &PlayerState,
        after: ResourceSet,
    ) -> Result<(), EffectError> {
        if after == before.resources {
            return Ok(());
        }
        self.players.update_resources(game, &before.id, after)?;
        self.announce_resources(game, before, after);
        Ok(())
    }

    fn announce_resources(&self, game: &GameId, before: &PlayerState, after: ResourceSet) {
        for resource in BasicResource::iter() {
            let old_amount = before.resources.get(resource);
            let new_amount = after.get(resource);
            if old_amount != new_amount {
                self.publish(ResourcesChanged {
                    game_id: game.clone(),
                    player_id: before.id.clone(),
                    resource,
                    old_amount,
                    new_amount,
                    timestamp: Utc::now(),
                });
            }
        }
    }

    fn commit_production(
        &self,
        game: &GameId,
        before: &PlayerState,
        after: ResourceSet,
    ) -> Result<(), EffectError> {
        if after == before.production {
            return Ok(());
        }
        self.players.update_production(game, &before.id, after)?;
        self.announce_production(game, before, after);
        Ok(())
    }

    fn announce_production(&self, game: &GameId, before: &PlayerState, after: ResourceSet) {
        for resource in BasicResource::iter() {
            let old_production = before.production.get(resource);
            let new_production = after.get(resource);
            if old_production != new_production {
                self.publish(ProductionChanged {
                    game_id: game.clone(),
                    player_id: before.id.clone(),
                    resource,
                    old_production,
                    new_production,
                    timestamp: Utc::now(),
                });
            }
        }
    }

    fn commit_storage(
        &self,
        game: &GameId,
        owner: &PlayerState,
        card: &CardId,
        amount: i32,
    ) -> Result<(), EffectError> {
        let old_amount = owner.storage(card);
        if old_amount == amount {
            return Ok(());
        }
        self.players.update_card_storage(game, &owner.id, card, amount)?;
        self.announce_storage(game, owner, card, amount);
        Ok(())
    }

    fn announce_storage(&self, game: &GameId, owner: &PlayerState, card: &CardId, amount: i32) {
        let old_amount = owner.storage(card);
        if old_amount == amount {
            return;
        }
        self.publish(ResourceStorageChanged {
            game_id: game.clone(),
            player_id: owner.id.clone(),
            card_id: card.clone(),
            old_amount,
            new_amount: amount,
            timestamp: Utc::now(),
        });
    }
}

struct InputPlan {
    resources: ResourceSet,
    production: ResourceSet,
    storage: BTreeMap<CardId, i32>,
}

fn plan_inputs(
    ctx: &EffectContext,
    player: &PlayerState,
    inputs: &[ResourceEffect],
) -> Result<InputPlan, EffectError> {
    let mut plan = InputPlan {
        resources: player.resources,
        production: player.production,
        storage: BTreeMap::new(),
    };

    for input in inputs {
        let amount = input.amount.max(0);
        match input.kind.category() {
            EffectCategory::Resource(resource) => {
                let available = plan.resources.get(resource);
                if available < amount {
                    return Err(EffectError::InsufficientResources {
                        resource,
                        required: amount,
                        available,
                    });
                }
                plan.resources.add(resource, -amount);
            }
            EffectCategory::Production(resource) => {
                let current = plan.production.get(resource);
                let floor = resource.production_floor();
                if current - amount < floor {
                    return Err(EffectError::ProductionFloor {
                        resource,
                        required: amount,
                        current,
                        floor,
                    });
                }
                plan.production.add(resource, -amount);
            }
            EffectCategory::CardStorage => {
                let card = ctx
                    .source_card
                    .as_ref()
                    .ok_or(EffectError::MissingTargetCard { kind: input.kind })?;
                let held = plan
                    .storage
                    .entry(card.clone())
                    .or_insert_with(|| player.storage(card));
                if *held < amount {
                    return Err(EffectError::InsufficientStorage {
                        card: card.clone(),
                        required: amount,
                        available: *held,
                    });
                }
                *held -= amount;
            }
            _ => {
                tracing::warn!(
                    target: "runtime::effects",
                    kind = %input.kind,
                    source = %ctx.source,
                    "unsupported input kind skipped"
                );
            }
        }
    }
    Ok(plan)
}
