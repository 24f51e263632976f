use strum::IntoEnumIterator;

use super::{ProductionConfirmation, ProductionSummary, TurnEngine, TurnError};
use crate::behavior::BasicResource;
use crate::ids::{CardId, PlayerId};
use crate::state::{CardSelectionKind, PendingCardSelection, Phase, PlayerState, ResourceSet};

/// Checks `selected` against `offered` and returns the offered cards that
/// were not selected. Each offered card can be selected once.
pub fn unselected_cards(offered: &[CardId], selected: &[CardId]) -> Result<Vec<CardId>, TurnError> {
    let mut remaining = offered.to_vec();
    for card in selected {
        let index = remaining
            .iter()
            .position(|offered| offered == card)
            .ok_or_else(|| TurnError::CardNotOffered { card: card.clone() })?;
        remaining.remove(index);
    }
    Ok(remaining)
}

/// Resource delta a player earns in the production phase.
///
/// Held energy turns into heat, every production rate is added, and credits
/// additionally gain the terraform rating. No resource is taken below zero.
pub fn production_income(player: &PlayerState) -> ResourceSet {
    let mut income = player.production;
    let energy = player.resources.energy;
    income.energy -= energy;
    income.heat += energy;
    income.credits += player.terraform_rating;

    for resource in BasicResource::iter() {
        let floor = -player.resources.get(resource);
        if income.get(resource) < floor {
            income = income.with(resource, floor);
        }
    }
    income
}

/// Production phase methods for TurnEngine.
impl TurnEngine<'_> {
    /// Ends the generation.
    ///
    /// For every player: income is computed (see [`production_income`]),
    /// pass flags and action counters reset, card actions become playable
    /// again, and cards are dealt for selection. The game completes instead
    /// of dealing when every global parameter is maxed.
    pub fn run_production(&mut self) -> ProductionSummary {
        self.game.phase = Phase::ProductionAndCardDraw;
        let allowance = self.turn_allowance();
        let game_complete = self.game.global_parameters.all_maxed();
        let mut income = Vec::with_capacity(self.players.len());

        for player in self.players.iter_mut() {
            income.push((player.id.clone(), production_income(player)));

            player.passed = false;
            player.available_actions = allowance;
            for action in &mut player.actions {
                action.play_count = 0;
            }

            if game_complete {
                player.pending_card_selection = None;
                player.production_ready = true;
            } else {
                let cards = self.game.draw_cards(self.config.production_cards_dealt);
                player.pending_card_selection = Some(PendingCardSelection {
                    kind: CardSelectionKind::Production,
                    cards,
                    corporations: Vec::new(),
                });
                player.production_ready = false;
            }
        }

        self.game.generation += 1;
        if game_complete {
            self.game.phase = Phase::Complete;
            self.game.current_turn = None;
        } else {
            self.game.current_turn = self.game.player_order.first().cloned();
        }

        ProductionSummary {
            generation: self.game.generation,
            game_complete,
            income,
        }
    }

    /// Moves `selected` from the player's production deal into their hand
    /// and discards the rest. The player must hold the card buy cost for
    /// every selected card; the returned cost is left for the caller to
    /// deduct.
    pub fn confirm_production_cards(
        &mut self,
        player: &PlayerId,
        selected: &[CardId],
    ) -> Result<ProductionConfirmation, TurnError> {
        self.ensure_phase(Phase::ProductionAndCardDraw)?;
        let card_buy_cost = self.config.card_buy_cost;
        let state = self.player_mut(player)?;

        let offered = match &state.pending_card_selection {
            Some(selection) if selection.kind == CardSelectionKind::Production => {
                selection.cards.clone()
            }
            _ => {
                return Err(TurnError::NoPendingSelection {
                    player: player.clone(),
                });
            }
        };
        let discarded = unselected_cards(&offered, selected)?;

        let required = selected.len() as i32 * card_buy_cost;
        if state.resources.credits < required {
            return Err(TurnError::CannotAffordSelection {
                count: selected.len(),
                required,
                available: state.resources.credits,
            });
        }

        state.hand.extend(selected.iter().cloned());
        state.pending_card_selection = None;
        state.production_ready = true;
        self.game.discard.extend(discarded);

        let action_phase_started = self.players.iter().all(|player| player.production_ready);
        if action_phase_started {
            self.begin_action_phase()?;
        }
        Ok(ProductionConfirmation {
            cost: required,
            action_phase_started,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::{Behavior, Trigger};
    use crate::config::GameConfig;
    use crate::state::{GameState, PlayerAction, PlayerState, ResourceSet};

    fn create_test_game() -> (GameState, Vec<PlayerState>, GameConfig) {
        let config = GameConfig::default();
        let mut game = GameState::new("g1");
        game.phase = Phase::Action;
        game.generation = 1;
        game.player_order = vec![PlayerId::from("a"), PlayerId::from("b")];
        game.deck = (0..10).map(|i| CardId::new(format!("card-{i}"))).collect();
        let players = vec![
            PlayerState::new("a", "A", &config),
            PlayerState::new("b", "B", &config),
        ];
        (game, players, config)
    }

    #[test]
    fn production_converts_energy_and_pays_income() {
        let (mut game, mut players, config) = create_test_game();
        players[0].resources = ResourceSet::new(5, 0, 0, 0, 3, 1);
        players[0].production = ResourceSet::new(2, 1, 0, 0, 2, 0);

        let summary = TurnEngine::new(&mut game, &mut players, &config).run_production();

        let (player, income) = &summary.income[0];
        assert_eq!(player, &PlayerId::from("a"));
        assert_eq!(*income, ResourceSet::new(2 + 20, 1, 0, 0, 2 - 3, 3));
        assert_eq!(players[0].resources, ResourceSet::new(5, 0, 0, 0, 3, 1));
    }

    #[test]
    fn negative_income_stops_at_zero() {
        let (_, mut players, _) = create_test_game();
        let player = &mut players[0];
        player.terraform_rating = 2;
        player.production = ResourceSet::credits(-5);
        player.resources = ResourceSet::credits(1);

        assert_eq!(production_income(player).credits, -1);
    }

    #[test]
    fn production_resets_play_counts_and_deals_cards() {
        let (mut game, mut players, config) = create_test_game();
        players[0].passed = true;
        players[0].actions.push(PlayerAction {
            card_id: "x".into(),
            card_name: "X".to_owned(),
            behavior_index: 0,
            behavior: Behavior::new(Trigger::manual()),
            play_count: 1,
        });

        let summary = TurnEngine::new(&mut game, &mut players, &config).run_production();

        assert_eq!(summary.generation, 2);
        assert!(!summary.game_complete);
        assert!(players.iter().all(|p| !p.passed && p.available_actions == 2));
        assert!(players.iter().flat_map(|p| &p.actions).all(|a| a.play_count == 0));
        let dealt = players[1].pending_card_selection.as_ref().unwrap();
        assert_eq!(dealt.cards.len(), 4);
        assert_eq!(game.deck.len(), 2);
    }

    #[test]
    fn confirming_all_selections_starts_action_phase() {
        let (mut game, mut players, config) = create_test_game();
        let mut engine = TurnEngine::new(&mut game, &mut players, &config);
        engine.run_production();

        let offered_a = players[0].pending_card_selection.clone().unwrap().cards;
        players[0].resources.credits = 20;
        let mut engine = TurnEngine::new(&mut game, &mut players, &config);
        assert_eq!(
            engine.confirm_production_cards(&PlayerId::from("a"), &offered_a[..2]),
            Ok(ProductionConfirmation {
                cost: 6,
                action_phase_started: false,
            })
        );
        assert_eq!(
            engine.confirm_production_cards(&PlayerId::from("b"), &[]),
            Ok(ProductionConfirmation {
                cost: 0,
                action_phase_started: true,
            })
        );

        assert_eq!(game.phase, Phase::Action);
        assert_eq!(players[0].hand.len(), 2);
        assert_eq!(players[0].resources.credits, 20);
        assert_eq!(game.discard.len(), 6);
    }

    #[test]
    fn selection_rejects_unoffered_and_unaffordable_cards() {
        let (mut game, mut players, config) = create_test_game();
        TurnEngine::new(&mut game, &mut players, &config).run_production();
        players[0].resources.credits = 2;
        let offered = players[0].pending_card_selection.clone().unwrap().cards;

        let mut engine = TurnEngine::new(&mut game, &mut players, &config);
        assert_eq!(
            engine.confirm_production_cards(&PlayerId::from("a"), &[CardId::from("nope")]),
            Err(TurnError::CardNotOffered {
                card: CardId::from("nope")
            })
        );
        assert!(matches!(
            engine.confirm_production_cards(&PlayerId::from("a"), &offered[..1]),
            Err(TurnError::CannotAffordSelection { required: 3, .. })
        ));
        assert!(players[0].pending_card_selection.is_some());
    }

    #[test]
    fn duplicate_selection_is_rejected() {
        let offered = vec![CardId::from("a"), CardId::from("b")];
        let selected = vec![CardId::from("a"), CardId::from("a")];
        assert!(unselected_cards(&offered, &selected).is_err());
        assert_eq!(
            unselected_cards(&offered, &selected[..1]),
            Ok(vec![CardId::from("b")])
        );
    }

    #[test]
    fn maxed_parameters_complete_the_game() {
        let (mut game, mut players, config) = create_test_game();
        game.global_parameters.temperature = GameConfig::MAX_TEMPERATURE;
        game.global_parameters.oxygen = GameConfig::MAX_OXYGEN;
        game.global_parameters.oceans = GameConfig::MAX_OCEANS;

        let summary = TurnEngine::new(&mut game, &mut players, &config).run_production();

        assert!(summary.game_complete);
        assert_eq!(game.phase, Phase::Complete);
        assert!(players.iter().all(|p| p.pending_card_selection.is_none()));
    }
}
