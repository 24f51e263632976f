//! Output dispatch, one arm per [`EffectCategory`].

use chrono::Utc;
use terraform_core::{
    BasicResource, EffectCategory, GameId, GlobalParameter, ParameterChange, PlayerId,
    ResourceEffect, ResourceKind, ResourceSet, Target, TileKind,
};

use super::{EffectApplier, EffectContext, EffectError};
use crate::events::{OceansChanged, OxygenChanged, TemperatureChanged};

impl EffectApplier {
    /// Applies outputs in order.
    ///
    /// Each output is applied independently. When one fails, the error is
    /// returned and the outputs before it stay applied.
    pub fn apply_outputs(
        &self,
        ctx: &EffectContext,
        outputs: &[ResourceEffect],
    ) -> Result<(), EffectError> {
        for output in outputs {
            let amount = self.resolve_amount(ctx, output)?;
            self.apply_output(ctx, output, amount)?;
        }
        if !outputs.is_empty() {
            tracing::debug!(
                target: "runtime::effects",
                source = %ctx.source,
                outputs = outputs.len(),
                "outputs applied"
            );
        }
        Ok(())
    }

    fn apply_output(
        &self,
        ctx: &EffectContext,
        output: &ResourceEffect,
        amount: i32,
    ) -> Result<(), EffectError> {
        let kind = output.kind;
        match kind.category() {
            EffectCategory::Resource(resource) => match output.target {
                Target::StealAnyPlayer => self.steal_resource(ctx, kind, resource, amount),
                Target::AnyPlayer | Target::Opponent => {
                    self.remove_from_target(ctx, kind, resource, amount)
                }
                _ => {
                    let (game, player) = ctx.require_player(kind)?;
                    let mut state = self.players.get(game, player)?;
                    let before = state.clone();
                    state.resources.add(resource, amount);
                    self.commit_resources(game, &before, state.resources)
                }
            },
            EffectCategory::Production(resource) => {
                let target = match output.target {
                    Target::AnyPlayer | Target::Opponent => match &ctx.target_player {
                        Some(target) => target,
                        None => {
                            tracing::debug!(
                                target: "runtime::effects",
                                %kind,
                                "no target player, production change skipped"
                            );
                            return Ok(());
                        }
                    },
                    _ => ctx.require_player(kind)?.1,
                };
                let game = ctx.require_game(kind)?;
                self.adjust_production(game, target, &ResourceSet::default().with(resource, amount))?;
                Ok(())
            }
            EffectCategory::TerraformRating => {
                let (game, player) = ctx.require_player(kind)?;
                self.adjust_terraform_rating(game, player, amount)?;
                Ok(())
            }
            EffectCategory::GlobalParameter(parameter) => {
                let game = ctx.require_game(kind)?;
                self.raise_parameter(game, ctx.player_id.as_ref(), parameter, amount)?;
                Ok(())
            }
            EffectCategory::TilePlacement(tile) => {
                let (game, player) = ctx.require_player(kind)?;
                self.queue_tiles(game, player, tile, amount, &ctx.source)
            }
            EffectCategory::PaymentSubstitute => {
                let (game, player) = ctx.require_player(kind)?;
                let Some(resource) = output.selector_resources().find_map(ResourceKind::basic) else {
                    tracing::warn!(
                        target: "runtime::effects",
                        source = %ctx.source,
                        "payment substitute without a selector resource"
                    );
                    return Ok(());
                };
                let mut state = self.players.get(game, player)?;
                state.register_substitute(resource, amount);
                self.players
                    .update_payment_substitutes(game, player, state.payment_substitutes)?;
                tracing::info!(
                    target: "runtime::effects",
                    player = %player,
                    %resource,
                    rate = amount,
                    "payment substitute registered"
                );
                Ok(())
            }
            EffectCategory::ValueModifier => {
                let (game, player) = ctx.require_player(kind)?;
                let mut state = self.players.get(game, player)?;
                for resource in output.selector_resources().filter_map(ResourceKind::basic) {
                    if !state.modify_substitute_rate(resource, amount) {
                        tracing::warn!(
                            target: "runtime::effects",
                            %resource,
                            "value modifier for a resource that is not a substitute"
                        );
                    }
                }
                self.players
                    .update_payment_substitutes(game, player, state.payment_substitutes)?;
                Ok(())
            }
            EffectCategory::Discount => {
                tracing::debug!(target: "runtime::effects", amount, "discount recorded as passive effect");
                Ok(())
            }
            EffectCategory::CardStorage => self.apply_storage_output(ctx, output, amount),
            EffectCategory::CardDraw => {
                let (game, player) = ctx.require_player(kind)?;
                let drawn = self.games.draw_cards(game, amount.max(0) as usize)?;
                if drawn.is_empty() {
                    return Ok(());
                }
                let mut hand = self.players.get(game, player)?.hand;
                hand.extend(drawn);
                self.players.update_hand(game, player, hand)?;
                Ok(())
            }
            EffectCategory::CardSelection
            | EffectCategory::TileCount(_)
            | EffectCategory::TagCount
            | EffectCategory::Unknown => {
                tracing::warn!(
                    target: "runtime::effects",
                    %kind,
                    source = %ctx.source,
                    "unsupported output kind skipped"
                );
                Ok(())
            }
        }
    }

    /// Raises a global parameter and credits the raising player with one
    /// terraform rating per step actually applied.
    pub fn raise_parameter(
        &self,
        game: &GameId,
        changed_by: Option<&PlayerId>,
        parameter: GlobalParameter,
        steps: i32,
    ) -> Result<ParameterChange, EffectError> {
        let change = self.games.increase_global_parameter(game, parameter, steps)?;
        if change.steps <= 0 {
            tracing::debug!(target: "runtime::effects", %parameter, "parameter already maxed");
            return Ok(change);
        }

        if let Some(player) = changed_by {
            self.adjust_terraform_rating(game, player, change.steps)?;
        }

        let game_id = game.clone();
        let changed_by = changed_by.cloned();
        let timestamp = Utc::now();
        match parameter {
            GlobalParameter::Temperature => self.publish(TemperatureChanged {
                game_id,
                old_value: change.old,
                new_value: change.new,
                changed_by,
                timestamp,
            }),
            GlobalParameter::Oxygen => self.publish(OxygenChanged {
                game_id,
                old_value: change.old,
                new_value: change.new,
                changed_by,
                timestamp,
            }),
            GlobalParameter::Oceans => self.publish(OceansChanged {
                game_id,
                old_value: change.old,
                new_value: change.new,
                changed_by,
                timestamp,
            }),
        }

        tracing::info!(
            target: "runtime::effects",
            game = %game,
            %parameter,
            old = change.old,
            new = change.new,
            steps = change.steps,
            "global parameter raised"
        );
        Ok(change)
    }

    /// Appends `count` tiles of one kind to the player's placement queue.
    pub fn queue_tiles(
        &self,
        game: &GameId,
        player: &PlayerId,
        tile: TileKind,
        count: i32,
        source: &str,
    ) -> Result<(), EffectError> {
        if count <= 0 {
            return Ok(());
        }
        let tiles = vec![tile; count as usize];
        let queued = self.players.append_to_tile_queue(game, player, &tiles, source)?;
        tracing::info!(
            target: "runtime::effects",
            player = %player,
            %tile,
            count,
            queued,
            source,
            "tile placements queued"
        );
        Ok(())
    }

    fn steal_resource(
        &self,
        ctx: &EffectContext,
        kind: ResourceKind,
        resource: BasicResource,
        amount: i32,
    ) -> Result<(), EffectError> {
        let Some(target) = &ctx.target_player else {
            tracing::debug!(target: "runtime::effects", %kind, "no target player, steal skipped");
            return Ok(());
        };
        let (game, player) = ctx.require_player(kind)?;

        let victim = self.players.get(game, target)?;
        let stolen = amount.min(victim.resources.get(resource)).max(0);
        if stolen == 0 {
            return Ok(());
        }

        let mut victim_resources = victim.resources;
        victim_resources.add(resource, -stolen);
        self.commit_resources(game, &victim, victim_resources)?;

        let thief = self.players.get(game, player)?;
        let mut thief_resources = thief.resources;
        thief_resources.add(resource, stolen);
        self.commit_resources(game, &thief, thief_resources)?;

        tracing::info!(
            target: "runtime::effects",
            player = %player,
            victim = %target,
            %resource,
            requested = amount,
            stolen,
            "resource stolen"
        );
        Ok(())
    }

    /// Removes up to `amount` from the chosen player, never below zero.
    fn remove_from_target(
        &self,
        ctx: &EffectContext,
        kind: ResourceKind,
        resource: BasicResource,
        amount: i32,
    ) -> Result<(), EffectError> {
        let Some(target) = &ctx.target_player else {
            tracing::debug!(target: "runtime::effects", %kind, "no target player, removal skipped");
            return Ok(());
        };
        let game = ctx.require_game(kind)?;

        let victim = self.players.get(game, target)?;
        let removed = amount.abs().min(victim.resources.get(resource));
        if removed <= 0 {
            return Ok(());
        }
        let mut resources = victim.resources;
        resources.add(resource, -removed);
        self.commit_resources(game, &victim, resources)
    }

    fn apply_storage_output(
        &self,
        ctx: &EffectContext,
        output: &ResourceEffect,
        amount: i32,
    ) -> Result<(), EffectError> {
        let kind = output.kind;
        let (game, player) = ctx.require_player(kind)?;

        match output.target {
            Target::AnyCard => {
                let card = ctx
                    .target_card
                    .as_ref()
                    .ok_or(EffectError::MissingTargetCard { kind })?;
                let state = self.players.get(game, player)?;
                let total = state.storage(card) + amount;
                self.commit_storage(game, &state, card, total)
            }
            Target::StealFromAnyCard => {
                let Some(source) = &ctx.target_card else {
                    tracing::debug!(target: "runtime::effects", %kind, "no source card, steal skipped");
                    return Ok(());
                };
                let Some(victim) = self
                    .players
                    .list(game)?
                    .into_iter()
                    .find(|p| p.storage(source) > 0)
                else {
                    return Ok(());
                };
                let stolen = amount.min(victim.storage(source));
                self.commit_storage(game, &victim, source, victim.storage(source) - stolen)?;

                if let Some(own) = &ctx.source_card {
                    let state = self.players.get(game, player)?;
                    let total = state.storage(own) + stolen;
                    self.commit_storage(game, &state, own, total)?;
                }
                Ok(())
            }
            _ => {
                let Some(card) = &ctx.source_card else {
                    tracing::warn!(
                        target: "runtime::effects",
                        %kind,
                        source = %ctx.source,
                        "card resource output without a source card"
                    );
                    return Ok(());
                };
                let state = self.players.get(game, player)?;
                let total = (state.storage(card) + amount).max(0);
                self.commit_storage(game, &state, card, total)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::super::tests::create_test_fixture;
    use super::*;
    use crate::oracle::CardOracleImpl;
    use crate::repository::{GameRepository, PlayerRepository};
    use terraform_core::{CardId, GameConfig, Selector};

    fn ctx_for(game: &GameId, player: &str) -> EffectContext {
        EffectContext::for_player(game, &PlayerId::from(player), "test-card")
    }

    #[test]
    fn oxygen_raise_is_clamped_and_awards_rating_per_step() {
        let fixture = create_test_fixture(CardOracleImpl::new(), &["p1"]);
        let mut game = fixture.games.get(&fixture.game).unwrap();
        game.global_parameters.oxygen = GameConfig::MAX_OXYGEN - 2;
        fixture.games.save(&game).unwrap();

        let change = fixture
            .applier
            .raise_parameter(
                &fixture.game,
                Some(&PlayerId::from("p1")),
                GlobalParameter::Oxygen,
                5,
            )
            .unwrap();

        assert_eq!(change.steps, 2);
        let player = fixture.players.get(&fixture.game, &PlayerId::from("p1")).unwrap();
        assert_eq!(player.terraform_rating, 22);
    }

    #[test]
    fn temperature_event_names_the_raising_player() {
        let fixture = create_test_fixture(CardOracleImpl::new(), &["p1"]);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        fixture.applier.bus().subscribe(move |event: &TemperatureChanged| {
            sink.lock().unwrap().push((event.old_value, event.new_value, event.changed_by.clone()));
        });

        fixture
            .applier
            .apply_outputs(
                &ctx_for(&fixture.game, "p1"),
                &[ResourceEffect::new(ResourceKind::Temperature, 1)],
            )
            .unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![(-30, -28, Some(PlayerId::from("p1")))]
        );
    }

    #[test]
    fn maxed_parameter_publishes_nothing() {
        let fixture = create_test_fixture(CardOracleImpl::new(), &["p1"]);
        let mut game = fixture.games.get(&fixture.game).unwrap();
        game.global_parameters.oceans = GameConfig::MAX_OCEANS;
        fixture.games.save(&game).unwrap();
        let mut tap = fixture.applier.bus().tap();

        fixture
            .applier
            .apply_outputs(
                &ctx_for(&fixture.game, "p1"),
                &[ResourceEffect::new(ResourceKind::Oceans, 1)],
            )
            .unwrap();

        assert!(tap.try_recv().is_err());
    }

    #[test]
    fn tile_outputs_queue_in_declaration_order() {
        let fixture = create_test_fixture(CardOracleImpl::new(), &["p1"]);
        let player = PlayerId::from("p1");

        fixture
            .applier
            .apply_outputs(
                &ctx_for(&fixture.game, "p1"),
                &[
                    ResourceEffect::new(ResourceKind::CityPlacement, 1),
                    ResourceEffect::new(ResourceKind::GreeneryPlacement, 1),
                ],
            )
            .unwrap();

        let first = fixture.players.pop_tile_queue(&fixture.game, &player).unwrap().unwrap();
        let second = fixture.players.pop_tile_queue(&fixture.game, &player).unwrap().unwrap();
        assert_eq!(first.kind, TileKind::City);
        assert_eq!(second.kind, TileKind::Greenery);
        assert_eq!(first.source, "test-card");
    }

    #[test]
    fn production_output_clamps_at_floor() {
        let fixture = create_test_fixture(CardOracleImpl::new(), &["p1"]);

        fixture
            .applier
            .apply_outputs(
                &ctx_for(&fixture.game, "p1"),
                &[
                    ResourceEffect::new(ResourceKind::CreditsProduction, -7),
                    ResourceEffect::new(ResourceKind::HeatProduction, 2),
                ],
            )
            .unwrap();

        let player = fixture.players.get(&fixture.game, &PlayerId::from("p1")).unwrap();
        assert_eq!(player.production.credits, -5);
        assert_eq!(player.production.heat, 2);
    }

    #[test]
    fn later_failure_keeps_earlier_outputs() {
        let fixture = create_test_fixture(CardOracleImpl::new(), &["p1"]);
        let ctx = ctx_for(&fixture.game, "p1");

        let err = fixture
            .applier
            .apply_outputs(
                &ctx,
                &[
                    ResourceEffect::new(ResourceKind::Plants, 3),
                    ResourceEffect::new(ResourceKind::Animals, 1).with_target(Target::AnyCard),
                ],
            )
            .unwrap_err();

        assert!(matches!(err, EffectError::MissingTargetCard { .. }));
        let player = fixture.players.get(&fixture.game, &PlayerId::from("p1")).unwrap();
        assert_eq!(player.resources.plants, 3);
    }

    #[test]
    fn steal_moves_at_most_what_the_victim_holds() {
        let fixture = create_test_fixture(CardOracleImpl::new(), &["p1", "p2"]);
        fixture
            .players
            .update_resources(&fixture.game, &PlayerId::from("p2"), ResourceSet::new(0, 1, 0, 0, 0, 0))
            .unwrap();
        let ctx = ctx_for(&fixture.game, "p1").with_target_player(Some(PlayerId::from("p2")));

        fixture
            .applier
            .apply_outputs(
                &ctx,
                &[ResourceEffect::new(ResourceKind::Steel, 2).with_target(Target::StealAnyPlayer)],
            )
            .unwrap();

        let thief = fixture.players.get(&fixture.game, &PlayerId::from("p1")).unwrap();
        let victim = fixture.players.get(&fixture.game, &PlayerId::from("p2")).unwrap();
        assert_eq!(thief.resources.steel, 1);
        assert_eq!(victim.resources.steel, 0);
    }

    #[test]
    fn any_player_removal_without_target_is_skipped() {
        let fixture = create_test_fixture(CardOracleImpl::new(), &["p1"]);
        fixture
            .applier
            .apply_outputs(
                &ctx_for(&fixture.game, "p1"),
                &[ResourceEffect::new(ResourceKind::Plants, -3).with_target(Target::AnyPlayer)],
            )
            .unwrap();
    }

    #[test]
    fn substitute_and_value_modifier_update_rates() {
        let fixture = create_test_fixture(CardOracleImpl::new(), &["p1"]);
        let ctx = ctx_for(&fixture.game, "p1");

        fixture
            .applier
            .apply_outputs(
                &ctx,
                &[
                    ResourceEffect::new(ResourceKind::PaymentSubstitute, 1)
                        .with_selector(Selector::resources([ResourceKind::Heat])),
                    ResourceEffect::new(ResourceKind::ValueModifier, 1)
                        .with_selector(Selector::resources([ResourceKind::Titanium])),
                ],
            )
            .unwrap();

        let player = fixture.players.get(&fixture.game, &PlayerId::from("p1")).unwrap();
        assert_eq!(player.substitute_rate(BasicResource::Heat), Some(1));
        assert_eq!(player.substitute_rate(BasicResource::Titanium), Some(4));
    }

    #[test]
    fn self_card_output_adds_to_source_card_storage() {
        let fixture = create_test_fixture(CardOracleImpl::new(), &["p1"]);
        let ctx = ctx_for(&fixture.game, "p1").with_source_card(CardId::from("pets"));

        fixture
            .applier
            .apply_outputs(
                &ctx,
                &[ResourceEffect::new(ResourceKind::Animals, 2).with_target(Target::SelfCard)],
            )
            .unwrap();

        let player = fixture.players.get(&fixture.game, &PlayerId::from("p1")).unwrap();
        assert_eq!(player.storage(&CardId::from("pets")), 2);
    }

    #[test]
    fn card_draw_moves_cards_into_hand() {
        let fixture = create_test_fixture(CardOracleImpl::new(), &["p1"]);
        let mut game = fixture.games.get(&fixture.game).unwrap();
        game.deck = vec![CardId::from("x"), CardId::from("y")];
        fixture.games.save(&game).unwrap();

        fixture
            .applier
            .apply_outputs(
                &ctx_for(&fixture.game, "p1"),
                &[ResourceEffect::new(ResourceKind::CardDraw, 1)],
            )
            .unwrap();

        let player = fixture.players.get(&fixture.game, &PlayerId::from("p1")).unwrap();
        assert_eq!(player.hand, vec![CardId::from("y")]);
    }

    #[test]
    fn parameter_output_without_game_context_is_an_error() {
        let fixture = create_test_fixture(CardOracleImpl::new(), &["p1"]);
        let err = fixture
            .applier
            .apply_outputs(
                &EffectContext::new("test"),
                &[ResourceEffect::new(ResourceKind::Oxygen, 1)],
            )
            .unwrap_err();
        assert!(matches!(
            err,
            EffectError::MissingGameContext {
                kind: ResourceKind::Oxygen
            }
        ));
    }
}
