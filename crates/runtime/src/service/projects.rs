use chrono::Utc;
use terraform_core::{
    BasicResource, CardId, CardPayment, GameConfig, GameId, GlobalParameter, PlayerId,
    ResourceSet, StandardProject, TileKind, effective_cost, project_discount,
};
use tracing::{debug, info};

use super::GameService;
use crate::error::{ActionError, Result};
use crate::events::StandardProjectPlayed;

/// A standard project with its payment. Sold cards are only read by
/// [`StandardProject::SellPatents`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectRequest {
    pub project: StandardProject,
    pub payment: CardPayment,
    pub sold_cards: Vec<CardId>,
}

impl ProjectRequest {
    pub fn new(project: StandardProject) -> Self {
        Self {
            project,
            payment: CardPayment::default(),
            sold_cards: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_payment(mut self, payment: CardPayment) -> Self {
        self.payment = payment;
        self
    }

    #[must_use]
    pub fn with_sold_cards(mut self, cards: impl IntoIterator<Item = CardId>) -> Self {
        self.sold_cards = cards.into_iter().collect();
        self
    }
}

/// Standard projects and resource conversions.
impl GameService {
    /// Runs one of the fixed projects every player may fund.
    ///
    /// Projects are paid in credits plus any non-metal substitute the player
    /// has registered; discounts on the project lower its cost first.
    pub async fn play_standard_project(
        &self,
        game: &GameId,
        player: &PlayerId,
        request: ProjectRequest,
    ) -> Result<()> {
        let project = request.project;
        if matches!(
            project,
            StandardProject::ConvertPlantsToGreenery | StandardProject::ConvertHeatToTemperature
        ) {
            return Err(ActionError::NotAProject(project));
        }

        let _guard = self.lock_game(game).await;
        let session = self.action_session(game, player)?;
        let state = session.player(player)?;

        if project == StandardProject::SellPatents {
            let mut hand = state.hand.clone();
            for card in &request.sold_cards {
                if !remove_one(&mut hand, card) {
                    return Err(ActionError::CardNotInHand {
                        player: player.clone(),
                        card: card.clone(),
                    });
                }
            }
            let sold = request.sold_cards.len() as i32;
            self.players.update_hand(game, player, hand)?;
            self.applier.adjust_resources(
                game,
                player,
                &ResourceSet::credits(sold * GameConfig::SELL_PATENT_VALUE),
            )?;

            let mut game_state = self.games.get(game)?;
            game_state.discard.extend(request.sold_cards.iter().cloned());
            self.games.save(&game_state)?;
        } else {
            let discounts = project_discount(&state.effects, project);
            let discount = discounts.get(&BasicResource::Credits).copied().unwrap_or(0);
            let cost = effective_cost(project.base_cost(), discount);
            request
                .payment
                .covers_cost(cost, false, false, &state.payment_substitutes)?;
            request.payment.can_afford(&state.resources)?;

            let spent = request.payment.as_resource_set();
            if !spent.is_empty() {
                self.applier
                    .adjust_resources(game, player, &spent.negated())?;
            }
            self.resolve_project(game, player, project)?;
            debug!(
                target: "runtime::service",
                %project,
                base_cost = project.base_cost(),
                cost,
                "standard project paid"
            );
        }

        self.publish(StandardProjectPlayed {
            game_id: game.clone(),
            player_id: player.clone(),
            project,
            timestamp: Utc::now(),
        });
        let outcome = self.consume_action(game, player)?;
        info!(
            target: "runtime::service",
            game = %game,
            player = %player,
            %project,
            remaining = outcome.remaining,
            "standard project played"
        );
        self.broadcast(game, Some(player));
        Ok(())
    }

    /// Spends plants to queue a greenery tile.
    pub async fn convert_plants_to_greenery(&self, game: &GameId, player: &PlayerId) -> Result<()> {
        let _guard = self.lock_game(game).await;
        let session = self.action_session(game, player)?;
        let state = session.player(player)?;

        let discount = project_discount(&state.effects, StandardProject::ConvertPlantsToGreenery)
            .get(&BasicResource::Plants)
            .copied()
            .unwrap_or(0);
        let required = effective_cost(GameConfig::PLANTS_PER_GREENERY, discount);
        if state.resources.plants < required {
            return Err(ActionError::NotEnoughPlants {
                required,
                available: state.resources.plants,
            });
        }

        self.applier.adjust_resources(
            game,
            player,
            &ResourceSet::default().with(BasicResource::Plants, -required),
        )?;
        self.applier.queue_tiles(
            game,
            player,
            TileKind::Greenery,
            1,
            StandardProject::ConvertPlantsToGreenery.as_ref(),
        )?;

        let outcome = self.consume_action(game, player)?;
        info!(
            target: "runtime::service",
            game = %game,
            player = %player,
            plants = required,
            remaining = outcome.remaining,
            "plants converted"
        );
        self.broadcast(game, Some(player));
        Ok(())
    }

    /// Spends heat to raise the temperature one step.
    pub async fn convert_heat_to_temperature(
        &self,
        game: &GameId,
        player: &PlayerId,
    ) -> Result<()> {
        let _guard = self.lock_game(game).await;
        let session = self.action_session(game, player)?;
        let state = session.player(player)?;

        let discount = project_discount(&state.effects, StandardProject::ConvertHeatToTemperature)
            .get(&BasicResource::Heat)
            .copied()
            .unwrap_or(0);
        let required = effective_cost(GameConfig::HEAT_PER_TEMPERATURE, discount);
        if state.resources.heat < required {
            return Err(ActionError::NotEnoughHeat {
                required,
                available: state.resources.heat,
            });
        }

        self.applier.adjust_resources(
            game,
            player,
            &ResourceSet::default().with(BasicResource::Heat, -required),
        )?;
        let change =
            self.applier
                .raise_parameter(game, Some(player), GlobalParameter::Temperature, 1)?;

        let outcome = self.consume_action(game, player)?;
        info!(
            target: "runtime::service",
            game = %game,
            player = %player,
            heat = required,
            temperature = change.new,
            remaining = outcome.remaining,
            "heat converted"
        );
        self.broadcast(game, Some(player));
        Ok(())
    }

    fn resolve_project(
        &self,
        game: &GameId,
        player: &PlayerId,
        project: StandardProject,
    ) -> Result<()> {
        let source = project.as_ref();
        match project {
            StandardProject::PowerPlant => {
                self.applier.adjust_production(
                    game,
                    player,
                    &ResourceSet::default().with(BasicResource::Energy, 1),
                )?;
            }
            StandardProject::Asteroid => {
                self.applier
                    .raise_parameter(game, Some(player), GlobalParameter::Temperature, 1)?;
            }
            StandardProject::Aquifer => {
                self.applier
                    .queue_tiles(game, player, TileKind::Ocean, 1, source)?;
            }
            StandardProject::Greenery => {
                self.applier
                    .queue_tiles(game, player, TileKind::Greenery, 1, source)?;
            }
            StandardProject::City => {
                self.applier
                    .queue_tiles(game, player, TileKind::City, 1, source)?;
                self.applier.adjust_production(
                    game,
                    player,
                    &ResourceSet::credits(1),
                )?;
            }
            StandardProject::SellPatents
            | StandardProject::ConvertPlantsToGreenery
            | StandardProject::ConvertHeatToTemperature => {
                return Err(ActionError::NotAProject(project));
            }
        }
        Ok(())
    }
}

fn remove_one(hand: &mut Vec<CardId>, card: &CardId) -> bool {
    match hand.iter().position(|held| held == card) {
        Some(index) => {
            hand.remove(index);
            true
        }
        None => false,
    }
}
