//! Corporation setup.
//!
//! A corporation's behaviors are split by trigger:
//! - `auto-corporation-start` outputs apply once, together with the printed
//!   starting resources and production
//! - unconditioned `auto` outputs apply once when the corporation is taken
//! - `auto-corporation-first-action` placement outputs become a forced first
//!   action that the player resolves by placing the queued tile
//!
//! Conditioned and manual behaviors are registered like any other card by
//! [`crate::subscriber::PassiveEffectSubscriber`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use chrono::Utc;
use terraform_core::{
    Behavior, Card, EffectCategory, ForcedFirstAction, GameConfig, GameId, PlayerAction,
    PlayerEffect, PlayerId, TileKind, TriggerKind,
};
use tracing::{debug, info, warn};

use crate::effects::{EffectApplier, EffectContext, EffectError};
use crate::events::{GameStateChanged, SubscriptionId, TilePlaced};
use crate::repository::{GameRepository, PlayerRepository};
use crate::service::TurnSession;

/// Source recorded on forced first actions and their queued tiles.
pub const FORCED_ACTION_SOURCE: &str = "corporation-starting-action";

#[derive(Clone)]
pub struct CorporationProcessor {
    applier: EffectApplier,
    players: Arc<dyn PlayerRepository>,
    games: Arc<dyn GameRepository>,
    config: GameConfig,
}

impl CorporationProcessor {
    pub fn new(
        applier: EffectApplier,
        players: Arc<dyn PlayerRepository>,
        games: Arc<dyn GameRepository>,
        config: GameConfig,
    ) -> Self {
        Self {
            applier,
            players,
            games,
            config,
        }
    }

    /// Grants starting resources and production and applies the outputs of
    /// `auto-corporation-start` behaviors.
    pub fn apply_starting_effects(
        &self,
        game: &GameId,
        player: &PlayerId,
        corporation: &Card,
    ) -> Result<(), EffectError> {
        if let Some(resources) = &corporation.starting_resources {
            self.applier.adjust_resources(game, player, resources)?;
        }
        if let Some(production) = &corporation.starting_production {
            self.applier.adjust_production(game, player, production)?;
        }

        let ctx = Self::context(game, player, corporation);
        for behavior in behaviors_with(corporation, |b| {
            b.has_trigger_kind(TriggerKind::AutoCorporationStart)
        }) {
            self.applier.apply_outputs(&ctx, &behavior.outputs)?;
        }

        info!(
            target: "runtime::corporation",
            game = %game,
            player = %player,
            corporation = %corporation.id,
            "corporation starting effects applied"
        );
        Ok(())
    }

    /// Applies the outputs of unconditioned `auto` behaviors, such as payment
    /// substitutes.
    pub fn apply_auto_effects(
        &self,
        game: &GameId,
        player: &PlayerId,
        corporation: &Card,
    ) -> Result<(), EffectError> {
        let ctx = Self::context(game, player, corporation);
        for behavior in behaviors_with(corporation, Behavior::is_static_passive) {
            self.applier.apply_outputs(&ctx, &behavior.outputs)?;
        }
        Ok(())
    }

    /// Turns placement outputs of `auto-corporation-first-action` behaviors
    /// into a forced first action.
    ///
    /// The first placement names the action; every placement queues one
    /// tile. A listener completes the action once the owner has placed the
    /// last queued tile.
    pub fn setup_forced_first_action(
        &self,
        game: &GameId,
        player: &PlayerId,
        corporation: &Card,
    ) -> Result<Option<ForcedFirstAction>, EffectError> {
        let mut tiles = Vec::new();
        for behavior in behaviors_with(corporation, |b| {
            b.has_trigger_kind(TriggerKind::AutoCorporationFirstAction)
        }) {
            for output in &behavior.outputs {
                match output.kind.category() {
                    EffectCategory::TilePlacement(tile) => tiles.push(tile),
                    _ => warn!(
                        target: "runtime::corporation",
                        corporation = %corporation.id,
                        kind = %output.kind,
                        "unsupported forced action output"
                    ),
                }
            }
        }
        let Some(&first) = tiles.first() else {
            return Ok(None);
        };

        let action = ForcedFirstAction {
            action_type: first,
            corporation_id: corporation.id.clone(),
            source: FORCED_ACTION_SOURCE.to_owned(),
            completed: false,
            description: describe(first, &corporation.name),
        };
        self.players
            .set_forced_first_action(game, player, Some(action.clone()))?;
        self.players
            .append_to_tile_queue(game, player, &tiles, FORCED_ACTION_SOURCE)?;
        self.watch_forced_action(game, player);

        info!(
            target: "runtime::corporation",
            game = %game,
            player = %player,
            corporation = %corporation.id,
            description = %action.description,
            "forced first action set"
        );
        Ok(Some(action))
    }

    /// Conditioned behaviors of `corporation` as player effects.
    pub fn trigger_effects(corporation: &Card) -> Vec<PlayerEffect> {
        indexed_behaviors(corporation, Behavior::is_reactive)
            .map(|(index, behavior)| PlayerEffect {
                card_id: corporation.id.clone(),
                card_name: corporation.name.clone(),
                behavior_index: index,
                behavior: behavior.clone(),
            })
            .collect()
    }

    /// Manual behaviors of `corporation` as unplayed actions.
    pub fn manual_actions(corporation: &Card) -> Vec<PlayerAction> {
        indexed_behaviors(corporation, Behavior::is_manual)
            .map(|(index, behavior)| PlayerAction {
                card_id: corporation.id.clone(),
                card_name: corporation.name.clone(),
                behavior_index: index,
                behavior: behavior.clone(),
                play_count: 0,
            })
            .collect()
    }

    fn context(game: &GameId, player: &PlayerId, corporation: &Card) -> EffectContext {
        EffectContext::for_player(game, player, corporation.name.clone())
            .with_source_card(corporation.id.clone())
    }

    fn watch_forced_action(&self, game: &GameId, player: &PlayerId) {
        let watch = ForcedActionWatch {
            game: game.clone(),
            owner: player.clone(),
            processor: self.clone(),
            done: AtomicBool::new(false),
            id: OnceLock::new(),
        };
        let watch = Arc::new(watch);
        let handler = Arc::clone(&watch);
        let id = self
            .applier
            .bus()
            .subscribe(move |event: &TilePlaced| handler.on_tile_placed(event));
        if let Err(id) = watch.id.set(id) {
            warn!(
                target: "runtime::corporation",
                game = %game,
                player = %player,
                subscription = ?id,
                "forced action watch registered twice"
            );
        }
    }
}

/// One-shot listener completing a forced first action.
struct ForcedActionWatch {
    game: GameId,
    owner: PlayerId,
    processor: CorporationProcessor,
    done: AtomicBool,
    id: OnceLock<SubscriptionId>,
}

impl ForcedActionWatch {
    fn on_tile_placed(&self, event: &TilePlaced) {
        if event.game_id != self.game
            || event.player_id != self.owner
            || self.done.load(Ordering::SeqCst)
        {
            return;
        }

        match self.try_complete() {
            Ok(false) => {}
            Ok(true) => {
                self.done.store(true, Ordering::SeqCst);
                if let Some(id) = self.id.get() {
                    self.processor.applier.bus().unsubscribe(*id);
                }
            }
            Err(err) => {
                tracing::error!(
                    target: "runtime::corporation",
                    game = %self.game,
                    player = %self.owner,
                    error = %err,
                    "forced action completion failed"
                );
            }
        }
    }

    /// Returns true once the forced action is resolved.
    fn try_complete(&self) -> Result<bool, EffectError> {
        let processor = &self.processor;
        let player = processor.players.get(&self.game, &self.owner)?;
        let Some(action) = player.forced_first_action else {
            return Ok(true);
        };
        if !player.tile_queue.is_empty() {
            debug!(
                target: "runtime::corporation",
                player = %self.owner,
                remaining = player.tile_queue.len(),
                "forced action waiting for more tiles"
            );
            return Ok(false);
        }

        let mut session = TurnSession::load(
            processor.games.as_ref(),
            processor.players.as_ref(),
            &self.game,
        )?;
        if session.game.is_current_turn(&self.owner) {
            match session.engine(&processor.config).consume_action(&self.owner) {
                Ok(outcome) => {
                    session.store(processor.games.as_ref(), processor.players.as_ref())?;
                    info!(
                        target: "runtime::corporation",
                        player = %self.owner,
                        remaining = outcome.remaining,
                        "action consumed for forced first action"
                    );
                }
                Err(err) => warn!(
                    target: "runtime::corporation",
                    player = %self.owner,
                    error = %err,
                    "forced first action consumed no action"
                ),
            }
        }

        processor
            .players
            .set_forced_first_action(&self.game, &self.owner, None)?;
        processor.applier.bus().publish(GameStateChanged {
            game_id: self.game.clone(),
            player_id: Some(self.owner.clone()),
            timestamp: Utc::now(),
        });

        info!(
            target: "runtime::corporation",
            game = %self.game,
            player = %self.owner,
            corporation = %action.corporation_id,
            tile = %action.action_type,
            "forced first action completed"
        );
        Ok(true)
    }
}

fn behaviors_with(card: &Card, keep: impl Fn(&Behavior) -> bool) -> impl Iterator<Item = &Behavior> {
    card.behaviors.iter().filter(move |behavior| keep(*behavior))
}

fn indexed_behaviors(
    card: &Card,
    keep: impl Fn(&Behavior) -> bool,
) -> impl Iterator<Item = (usize, &Behavior)> {
    card.behaviors
        .iter()
        .enumerate()
        .filter(move |(_, behavior)| keep(*behavior))
}

fn describe(tile: TileKind, corporation: &str) -> String {
    let article = if tile == TileKind::Ocean { "an" } else { "a" };
    format!("Place {article} {tile} tile ({corporation} starting action)")
}

#[cfg(test)]
mod tests {
    use terraform_core::{
        BasicResource, CardKind, ConditionKind, HexCoordinate, Phase, ResourceEffect, ResourceKind,
        ResourceSet, Selector, Trigger, TriggerCondition,
    };

    use super::*;
    use crate::effects::tests::{Fixture, create_test_fixture};
    use crate::events::{DomainEvent, Topic};
    use crate::oracle::CardOracleImpl;

    fn create_test_processor(fixture: &Fixture) -> CorporationProcessor {
        CorporationProcessor::new(
            fixture.applier.clone(),
            fixture.players.clone(),
            fixture.games.clone(),
            GameConfig::default(),
        )
    }

    fn create_test_corporation() -> Card {
        Card::new("tharsis", "Tharsis", CardKind::Corporation, 0)
            .with_starting_resources(ResourceSet::credits(40))
            .with_starting_production(ResourceSet::new(1, 0, 0, 0, 0, 0))
            .with_behavior(
                Behavior::new(Trigger::of(TriggerKind::AutoCorporationStart))
                    .with_output(ResourceEffect::new(ResourceKind::Steel, 5)),
            )
            .with_behavior(
                Behavior::new(Trigger::of(TriggerKind::AutoCorporationFirstAction))
                    .with_output(ResourceEffect::new(ResourceKind::CityPlacement, 1)),
            )
            .with_behavior(
                Behavior::new(Trigger::on(TriggerCondition::new(ConditionKind::CityPlaced)))
                    .with_output(ResourceEffect::new(ResourceKind::CreditsProduction, 1)),
            )
    }

    fn start_action_phase(fixture: &Fixture) {
        let mut game = fixture.games.get(&fixture.game).unwrap();
        game.phase = Phase::Action;
        game.generation = 1;
        game.current_turn = game.player_order.first().cloned();
        fixture.games.save(&game).unwrap();
        for mut player in fixture.players.list(&fixture.game).unwrap() {
            player.available_actions = 2;
            fixture.players.save(&fixture.game, &player).unwrap();
        }
    }

    fn place_city(fixture: &Fixture, player: &str, q: i32) {
        fixture.players.pop_tile_queue(&fixture.game, &player.into()).unwrap();
        fixture.applier.bus().publish(TilePlaced {
            game_id: fixture.game.clone(),
            player_id: player.into(),
            tile: TileKind::City,
            coordinate: HexCoordinate::new(q, 0),
            timestamp: Utc::now(),
        });
    }

    #[test]
    fn starting_effects_skip_other_triggers() {
        let fixture = create_test_fixture(CardOracleImpl::new(), &["p1"]);
        let processor = create_test_processor(&fixture);
        let player = PlayerId::from("p1");

        processor
            .apply_starting_effects(&fixture.game, &player, &create_test_corporation())
            .unwrap();

        let state = fixture.players.get(&fixture.game, &player).unwrap();
        assert_eq!(state.resources.credits, 40);
        assert_eq!(state.resources.steel, 5);
        assert_eq!(state.production.credits, 1);
        assert!(state.tile_queue.is_empty());
    }

    #[test]
    fn auto_effects_register_substitutes() {
        let fixture = create_test_fixture(CardOracleImpl::new(), &["p1"]);
        let processor = create_test_processor(&fixture);
        let helion = Card::new("helion", "Helion", CardKind::Corporation, 0).with_behavior(
            Behavior::new(Trigger::auto()).with_output(
                ResourceEffect::new(ResourceKind::PaymentSubstitute, 1)
                    .with_selector(Selector::resources([ResourceKind::Heat])),
            ),
        );

        processor
            .apply_auto_effects(&fixture.game, &PlayerId::from("p1"), &helion)
            .unwrap();

        let state = fixture.players.get(&fixture.game, &PlayerId::from("p1")).unwrap();
        assert_eq!(state.substitute_rate(BasicResource::Heat), Some(1));
    }

    #[test]
    fn forced_action_completes_when_queue_empties() {
        let fixture = create_test_fixture(CardOracleImpl::new(), &["p1", "p2"]);
        let processor = create_test_processor(&fixture);
        start_action_phase(&fixture);
        let mut tap = fixture.applier.bus().tap();

        let action = processor
            .setup_forced_first_action(&fixture.game, &"p1".into(), &create_test_corporation())
            .unwrap()
            .unwrap();
        assert_eq!(action.action_type, TileKind::City);
        assert_eq!(action.description, "Place a city tile (Tharsis starting action)");

        place_city(&fixture, "p1", 0);

        let state = fixture.players.get(&fixture.game, &"p1".into()).unwrap();
        assert!(state.forced_first_action.is_none());
        assert_eq!(state.available_actions, 1);
        let published = std::iter::from_fn(|| tap.try_recv().ok())
            .any(|event| GameStateChanged::from_event(&event).is_some());
        assert!(published);
    }

    #[test]
    fn forced_action_ignores_other_players_tiles() {
        let fixture = create_test_fixture(CardOracleImpl::new(), &["p1", "p2"]);
        let processor = create_test_processor(&fixture);
        start_action_phase(&fixture);
        processor
            .setup_forced_first_action(&fixture.game, &"p1".into(), &create_test_corporation())
            .unwrap();

        fixture.applier.bus().publish(TilePlaced {
            game_id: fixture.game.clone(),
            player_id: "p2".into(),
            tile: TileKind::City,
            coordinate: HexCoordinate::new(3, 0),
            timestamp: Utc::now(),
        });

        let state = fixture.players.get(&fixture.game, &"p1".into()).unwrap();
        assert!(state.forced_first_action.is_some());
        assert_eq!(state.tile_queue.len(), 1);
        assert_eq!(state.available_actions, 2);
    }

    #[test]
    fn forced_action_listener_is_one_shot() {
        let fixture = create_test_fixture(CardOracleImpl::new(), &["p1"]);
        let processor = create_test_processor(&fixture);
        start_action_phase(&fixture);
        processor
            .setup_forced_first_action(&fixture.game, &"p1".into(), &create_test_corporation())
            .unwrap();
        let before = fixture.applier.bus().subscriber_count(Topic::TilePlaced);

        place_city(&fixture, "p1", 0);

        let after = fixture.applier.bus().subscriber_count(Topic::TilePlaced);
        assert_eq!(after, before - 1);
    }

    #[test]
    fn helpers_list_triggers_and_actions() {
        let corporation = create_test_corporation().with_behavior(
            Behavior::new(Trigger::manual()).with_output(ResourceEffect::new(ResourceKind::Heat, 2)),
        );

        let triggers = CorporationProcessor::trigger_effects(&corporation);
        let actions = CorporationProcessor::manual_actions(&corporation);

        assert_eq!(triggers.len(), 1);
        assert_eq!(triggers[0].behavior_index, 2);
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].behavior_index, 3);
        assert_eq!(actions[0].play_count, 0);
        assert_eq!(describe(TileKind::Ocean, "Aqua"), "Place an ocean tile (Aqua starting action)");
    }
}
