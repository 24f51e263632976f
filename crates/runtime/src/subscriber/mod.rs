//! Passive card effects.
//!
//! When a card enters a player's tableau its behaviors are sorted into three
//! buckets:
//! - static `auto` behaviors become [`PlayerEffect`]s consulted by the
//!   discount calculator
//! - conditioned `auto` behaviors become [`PlayerEffect`]s *and* event bus
//!   handlers that apply the behavior's outputs for the owner
//! - `manual` behaviors become [`PlayerAction`]s, playable once per generation
//!
//! Corporation start and first-action behaviors are left to
//! [`crate::corporation::CorporationProcessor`].
//!
//! Bus handlers are owned by the subscriber, keyed by game and card, so a
//! card's subscriptions can be listed and removed without a global registry.

mod reactive;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use terraform_core::{
    Card, CardId, ConditionKind, GameId, PlayerAction, PlayerEffect, PlayerId,
};
use tracing::{debug, warn};

use crate::effects::{EffectApplier, EffectError};
use crate::events::{
    CardPlayed, DomainEvent, OceansChanged, OxygenChanged, PlacementBonusGained,
    StandardProjectPlayed, SubscriptionId, TemperatureChanged, TilePlaced,
};
use crate::repository::PlayerRepository;

use reactive::{Firing, ReactiveEffect};

type SubscriptionMap = HashMap<(GameId, CardId), Vec<SubscriptionId>>;

/// Registers card behaviors as player effects, actions and bus handlers.
#[derive(Clone)]
pub struct PassiveEffectSubscriber {
    applier: EffectApplier,
    players: Arc<dyn PlayerRepository>,
    subscriptions: Arc<Mutex<SubscriptionMap>>,
}

impl PassiveEffectSubscriber {
    pub fn new(applier: EffectApplier, players: Arc<dyn PlayerRepository>) -> Self {
        Self {
            applier,
            players,
            subscriptions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Registers every behavior of `card` for `player`.
    ///
    /// Returns the number of event handlers registered.
    pub fn subscribe_card_effects(
        &self,
        game: &GameId,
        player: &PlayerId,
        card: &Card,
    ) -> Result<usize, EffectError> {
        let state = self.players.get(game, player)?;
        let mut effects = state.effects;
        let mut actions = state.actions;
        let (effects_before, actions_before) = (effects.len(), actions.len());
        let mut handlers = Vec::new();

        for (index, behavior) in card.behaviors.iter().enumerate() {
            if behavior.is_static_passive() {
                effects.push(PlayerEffect {
                    card_id: card.id.clone(),
                    card_name: card.name.clone(),
                    behavior_index: index,
                    behavior: behavior.clone(),
                });
            } else if let Some(condition) = behavior.reactive_condition() {
                effects.push(PlayerEffect {
                    card_id: card.id.clone(),
                    card_name: card.name.clone(),
                    behavior_index: index,
                    behavior: behavior.clone(),
                });

                if !behavior.choices.is_empty() {
                    warn!(
                        target: "runtime::subscriber",
                        card = %card.id,
                        behavior = index,
                        "reactive behavior choices ignored, base outputs only"
                    );
                }
                let effect = Arc::new(ReactiveEffect {
                    game: game.clone(),
                    owner: player.clone(),
                    card_id: card.id.clone(),
                    card_name: card.name.clone(),
                    behavior_index: index,
                    condition: condition.clone(),
                    outputs: behavior.outputs.clone(),
                });
                if let Some(id) = self.register(effect) {
                    handlers.push(id);
                }
            } else if behavior.is_manual() {
                actions.push(PlayerAction {
                    card_id: card.id.clone(),
                    card_name: card.name.clone(),
                    behavior_index: index,
                    behavior: behavior.clone(),
                    play_count: 0,
                });
            }
        }

        if effects.len() != effects_before {
            self.players.update_effects(game, player, effects)?;
        }
        if actions.len() != actions_before {
            self.players.update_actions(game, player, actions)?;
        }

        let registered = handlers.len();
        if registered > 0 {
            self.lock()
                .entry((game.clone(), card.id.clone()))
                .or_default()
                .extend(handlers);
        }

        debug!(
            target: "runtime::subscriber",
            game = %game,
            player = %player,
            card = %card.id,
            handlers = registered,
            "card effects subscribed"
        );
        Ok(registered)
    }

    /// Removes every bus handler registered for `card` in `game`.
    pub fn unsubscribe_card_effects(&self, game: &GameId, card: &CardId) -> usize {
        let Some(ids) = self.lock().remove(&(game.clone(), card.clone())) else {
            return 0;
        };
        let bus = self.applier.bus();
        let removed = ids.into_iter().filter(|id| bus.unsubscribe(*id)).count();
        debug!(
            target: "runtime::subscriber",
            game = %game,
            card = %card,
            removed,
            "card effects unsubscribed"
        );
        removed
    }

    pub fn subscription_count(&self, game: &GameId, card: &CardId) -> usize {
        self.lock()
            .get(&(game.clone(), card.clone()))
            .map_or(0, Vec::len)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SubscriptionMap> {
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn register(&self, effect: Arc<ReactiveEffect>) -> Option<SubscriptionId> {
        let id = match effect.condition.kind {
            ConditionKind::TemperatureRaise => {
                self.listen(effect, |_, event: &TemperatureChanged| {
                    raised(event.old_value, event.new_value, &event.changed_by)
                })
            }
            ConditionKind::OxygenRaise => self.listen(effect, |_, event: &OxygenChanged| {
                raised(event.old_value, event.new_value, &event.changed_by)
            }),
            ConditionKind::OceanPlaced => self.listen(effect, |_, event: &OceansChanged| {
                raised(event.old_value, event.new_value, &event.changed_by)
            }),
            ConditionKind::CityPlaced
            | ConditionKind::GreeneryPlaced
            | ConditionKind::TilePlaced => self.listen(effect, ReactiveEffect::match_tile),
            ConditionKind::PlacementBonusGained => {
                self.listen(effect, |effect, event: &PlacementBonusGained| {
                    effect.match_bonus(event)
                })
            }
            ConditionKind::CardPlayed => {
                self.listen(effect, |effect, event: &CardPlayed| effect.match_card(event))
            }
            ConditionKind::TagPlayed => {
                self.listen(effect, |effect, event: &CardPlayed| effect.match_tags(event))
            }
            ConditionKind::StandardProjectPlayed => {
                self.listen(effect, |_, event: &StandardProjectPlayed| {
                    Some(Firing::once(Some(event.player_id.clone())))
                })
            }
            ConditionKind::Unknown => {
                warn!(
                    target: "runtime::subscriber",
                    card = %effect.card_id,
                    behavior = effect.behavior_index,
                    "unknown trigger condition, no handler registered"
                );
                return None;
            }
        };
        Some(id)
    }

    /// Subscribes `effect` to events of type `E` from its own game.
    fn listen<E, M>(&self, effect: Arc<ReactiveEffect>, matcher: M) -> SubscriptionId
    where
        E: DomainEvent,
        M: Fn(&ReactiveEffect, &E) -> Option<Firing> + Send + Sync + 'static,
    {
        let applier = self.applier.clone();
        self.applier.bus().subscribe(move |event: &E| {
            if event.game_id() != &effect.game {
                return;
            }
            if let Some(firing) = matcher(&*effect, event) {
                effect.fire(&applier, firing);
            }
        })
    }
}

fn raised(old: i32, new: i32, changed_by: &Option<PlayerId>) -> Option<Firing> {
    (new > old).then(|| Firing::once(changed_by.clone()))
}
