//! Scripted two-player play through the game service.
//!
//! The driver plays greedily: it places queued tiles, converts heat and
//! plants, runs card actions, plays the cheapest affordable card, builds a
//! power plant and finally passes. Rejected moves are logged and the next
//! option is tried.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use terraform_core::{
    Board, CardId, CardOracle, CardPayment, GameConfig, GameError, GameId, HexCoordinate, Phase,
    PlayerId, PlayerState, StandardProject, TileKind, card_discount, effective_cost,
};
use terraform_runtime::{
    ActionError, CardActionRequest, CardOracleImpl, CorporationProcessor, Event, GameService,
    PlayCardRequest, ProjectRequest,
};
use tokio::sync::broadcast::{Receiver, error::TryRecvError};
use tracing::{debug, info, warn};

/// Upper bound on moves per action phase.
const MAX_STEPS: usize = 500;

/// Rings searched for a free hex on an open board.
const SEARCH_RADIUS: i32 = 8;

pub struct Driver {
    service: GameService,
    catalog: Arc<CardOracleImpl>,
    game: GameId,
    players: Vec<PlayerId>,
    events: Receiver<Event>,
}

impl Driver {
    pub fn new(service: GameService, catalog: Arc<CardOracleImpl>, game: impl Into<GameId>) -> Self {
        let events = service.bus().tap();
        Self {
            service,
            catalog,
            game: game.into(),
            players: Vec::new(),
            events,
        }
    }

    /// Creates the game, seats `names` and deals the starting selection.
    pub async fn setup(&mut self, names: &[&str]) -> Result<()> {
        self.service
            .create_game(self.game.clone(), Board::default())
            .await
            .context("failed to create game")?;
        for (seat, name) in names.iter().enumerate() {
            let player = self
                .service
                .add_player(&self.game, format!("p{}", seat + 1), *name)
                .await
                .with_context(|| format!("failed to seat {name}"))?;
            self.players.push(player.id);
        }
        self.service
            .start_game(&self.game)
            .await
            .context("failed to start game")?;
        self.drain_events();
        Ok(())
    }

    /// Takes the first offered corporation and buys the two cheapest cards
    /// the player can afford.
    pub async fn choose_starting_cards(&mut self) -> Result<()> {
        for player in self.players.clone() {
            let state = self.player(&player)?;
            let selection = state
                .pending_card_selection
                .with_context(|| format!("{player} has no starting deal"))?;
            let corporation = selection
                .corporations
                .first()
                .cloned()
                .with_context(|| format!("{player} was offered no corporation"))?;
            let budget = self
                .catalog
                .card(&corporation)
                .and_then(|card| card.starting_resources)
                .map_or(0, |resources| resources.credits);

            let mut offered = selection.cards.clone();
            offered.sort_by_key(|id| self.catalog.card(id).map_or(i32::MAX, |card| card.cost));
            let affordable = usize::try_from(budget / self.service.config().game.card_buy_cost)
                .unwrap_or_default();
            let bought: Vec<CardId> = offered.into_iter().take(affordable.min(2)).collect();

            self.service
                .select_starting_cards(&self.game, &player, &corporation, &bought)
                .await
                .with_context(|| format!("{player} could not take {corporation}"))?;
            info!(
                target: "sim::driver",
                player = %player,
                corporation = %corporation,
                bought = bought.len(),
                "starting selection made"
            );
            self.drain_events();
        }
        Ok(())
    }

    /// Plays until the action phase ends.
    pub async fn play_action_phase(&mut self) -> Result<()> {
        for _ in 0..MAX_STEPS {
            let game = self.service.games().get(&self.game)?;
            if game.phase != Phase::Action {
                return Ok(());
            }
            let player = game
                .current_turn
                .clone()
                .context("action phase without a current player")?;
            self.take_turn(&player, &game.board).await?;
            self.drain_events();
        }
        bail!("action phase did not finish within {MAX_STEPS} moves")
    }

    /// Buys nothing from the production deal, starting the next generation.
    pub async fn finish_production(&mut self) -> Result<()> {
        for player in self.players.clone() {
            self.service
                .confirm_production_cards(&self.game, &player, &[])
                .await
                .with_context(|| format!("{player} could not confirm the deal"))?;
        }
        self.drain_events();
        Ok(())
    }

    /// Logs every player's standing and current score.
    pub fn report(&self) -> Result<()> {
        let game = self.service.games().get(&self.game)?;
        info!(
            target: "sim::report",
            generation = game.generation,
            phase = %game.phase,
            temperature = game.global_parameters.temperature,
            oxygen = game.global_parameters.oxygen,
            oceans = game.global_parameters.oceans,
            tiles = game.board.tiles.len(),
            "game standing"
        );

        for player in &self.players {
            let state = self.player(player)?;
            let corporation = state
                .corporation
                .as_ref()
                .and_then(|id| self.catalog.card(id));
            let (triggers, actions) = corporation.as_ref().map_or((0, 0), |card| {
                (
                    CorporationProcessor::trigger_effects(card).len(),
                    CorporationProcessor::manual_actions(card).len(),
                )
            });
            info!(
                target: "sim::report",
                player = %state.id,
                name = %state.name,
                corporation = ?state.corporation,
                corporation_triggers = triggers,
                corporation_actions = actions,
                tr = state.terraform_rating,
                resources = ?state.resources,
                production = ?state.production,
                played = state.played_cards.len(),
                hand = state.hand.len(),
                "player standing"
            );
        }

        for (rank, (player, points)) in self.service.scores(&self.game)?.iter().enumerate() {
            info!(
                target: "sim::report",
                rank = rank + 1,
                player = %player,
                total = points.total(),
                tr = points.terraform_rating,
                cards = points.card_points(),
                greenery = points.greenery,
                city = points.city,
                "score"
            );
        }
        Ok(())
    }

    async fn take_turn(&self, player: &PlayerId, board: &Board) -> Result<()> {
        let state = self.player(player)?;

        if let Some(queued) = state.tile_queue.peek() {
            let coordinate = free_hex(board, queued.kind)
                .with_context(|| format!("no room left for a {} tile", queued.kind))?;
            self.service
                .select_tile(&self.game, player, coordinate)
                .await
                .with_context(|| format!("{player} could not place a {} tile", queued.kind))?;
            return Ok(());
        }

        if state.resources.heat >= GameConfig::HEAT_PER_TEMPERATURE {
            let outcome = self.service.convert_heat_to_temperature(&self.game, player).await;
            if self.attempt("heat conversion", player, outcome) {
                return Ok(());
            }
        }
        if state.resources.plants >= GameConfig::PLANTS_PER_GREENERY {
            let outcome = self.service.convert_plants_to_greenery(&self.game, player).await;
            if self.attempt("plant conversion", player, outcome) {
                return Ok(());
            }
        }

        for action in state.actions.iter().filter(|action| action.is_available()) {
            let mut request = CardActionRequest::new(action.card_id.clone(), action.behavior_index);
            if !action.behavior.choices.is_empty() {
                request = request.with_choice(0);
            }
            let outcome = self.service.play_card_action(&self.game, player, request).await;
            if self.attempt("card action", player, outcome) {
                return Ok(());
            }
        }

        for (card, cost) in self.affordable_cards(&state) {
            let outcome = self
                .service
                .play_card(&self.game, player, PlayCardRequest::new(card, CardPayment::credits(cost)))
                .await;
            if self.attempt("card", player, outcome) {
                return Ok(());
            }
        }

        let power_plant = StandardProject::PowerPlant.base_cost();
        if state.resources.credits >= power_plant {
            let request = ProjectRequest::new(StandardProject::PowerPlant)
                .with_payment(CardPayment::credits(power_plant));
            let outcome = self.service.play_standard_project(&self.game, player, request).await;
            if self.attempt("power plant", player, outcome) {
                return Ok(());
            }
        }

        let outcome = self
            .service
            .skip_action(&self.game, player)
            .await
            .with_context(|| format!("{player} could not end the turn"))?;
        debug!(
            target: "sim::driver",
            player = %player,
            kind = ?outcome.kind,
            "turn ended"
        );
        Ok(())
    }

    /// Hand cards the player can pay for in credits, cheapest first.
    fn affordable_cards(&self, state: &PlayerState) -> Vec<(CardId, i32)> {
        let mut cards: Vec<(CardId, i32)> = state
            .hand
            .iter()
            .filter_map(|id| self.catalog.card(id))
            .map(|card| {
                let cost = effective_cost(card.cost, card_discount(&state.effects, &card));
                (card.id, cost)
            })
            .filter(|(_, cost)| *cost <= state.resources.credits)
            .collect();
        cards.sort_by_key(|(_, cost)| *cost);
        cards
    }

    /// Returns true when the move was accepted.
    fn attempt<T>(&self, what: &str, player: &PlayerId, outcome: Result<T, ActionError>) -> bool {
        match outcome {
            Ok(_) => {
                info!(target: "sim::driver", player = %player, action = what, "move played");
                true
            }
            Err(err) => {
                let severity = err.severity();
                if severity.is_internal() {
                    warn!(
                        target: "sim::driver",
                        player = %player,
                        action = what,
                        severity = severity.as_str(),
                        code = err.error_code(),
                        error = %err,
                        "move failed"
                    );
                } else {
                    debug!(
                        target: "sim::driver",
                        player = %player,
                        action = what,
                        severity = severity.as_str(),
                        retry_later = severity.is_recoverable(),
                        error = %err,
                        "move rejected"
                    );
                }
                false
            }
        }
    }

    fn player(&self, player: &PlayerId) -> Result<PlayerState> {
        Ok(self.service.players().get(&self.game, player)?)
    }

    fn drain_events(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(event) => info!(
                    target: "sim::events",
                    topic = ?event.topic(),
                    game = %event.game_id(),
                    detail = ?event,
                    "event"
                ),
                Err(TryRecvError::Lagged(missed)) => warn!(
                    target: "sim::events",
                    missed,
                    "event log fell behind"
                ),
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
    }
}

/// First hex, spiraling out from the center, that accepts `kind`.
fn free_hex(board: &Board, kind: TileKind) -> Option<HexCoordinate> {
    if !board.hexes.is_empty() {
        return board
            .hexes
            .iter()
            .map(|hex| hex.coordinate)
            .find(|coordinate| board.can_place(kind, *coordinate).is_ok());
    }
    (0..=SEARCH_RADIUS)
        .flat_map(|radius| {
            (-radius..=radius).flat_map(move |q| {
                (-radius..=radius).map(move |r| HexCoordinate::new(q, r))
            })
        })
        .find(|coordinate| board.can_place(kind, *coordinate).is_ok())
}

#[cfg(test)]
mod tests {
    use terraform_core::{BoardHex, PlacedTile};

    use super::*;

    #[test]
    fn free_hex_skips_occupied_spaces() {
        let mut board = Board::default();
        board
            .place(PlacedTile {
                kind: TileKind::City,
                coordinate: HexCoordinate::new(0, 0),
                owner: None,
            })
            .unwrap();

        let coordinate = free_hex(&board, TileKind::City).unwrap();
        assert_ne!(coordinate, HexCoordinate::new(0, 0));
    }

    #[test]
    fn free_hex_respects_ocean_spaces() {
        let board = Board::with_layout(vec![
            BoardHex {
                coordinate: HexCoordinate::new(0, 0),
                ocean_space: false,
                bonuses: Vec::new(),
            },
            BoardHex {
                coordinate: HexCoordinate::new(1, 0),
                ocean_space: true,
                bonuses: Vec::new(),
            },
        ]);

        assert_eq!(free_hex(&board, TileKind::Ocean), Some(HexCoordinate::new(1, 0)));
        assert_eq!(free_hex(&board, TileKind::City), Some(HexCoordinate::new(0, 0)));
    }
}
