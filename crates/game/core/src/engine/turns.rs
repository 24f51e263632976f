use super::{ConsumeOutcome, SkipKind, SkipOutcome, TurnEngine, TurnError};
use crate::config::GameConfig;
use crate::ids::PlayerId;
use crate::state::{Phase, PlayerState};

/// Takes one action from `player`.
///
/// Returns `Ok(false)` for unlimited players, whose counter is left alone.
pub fn consume_action(player: &mut PlayerState) -> Result<bool, TurnError> {
    match player.available_actions {
        GameConfig::UNLIMITED_ACTIONS => Ok(false),
        remaining if remaining > 0 => {
            player.available_actions -= 1;
            Ok(true)
        }
        _ => Err(TurnError::NoActionsRemaining {
            player: player.id.clone(),
        }),
    }
}

/// Turn scheduling methods for TurnEngine.
impl TurnEngine<'_> {
    /// Checks that `player` may act right now: action phase, their turn, not
    /// passed.
    pub fn ensure_player_turn(&self, player: &PlayerId) -> Result<(), TurnError> {
        self.ensure_phase(Phase::Action)?;
        let state = self.player(player)?;
        if !self.game.is_current_turn(player) {
            return Err(TurnError::NotPlayerTurn {
                player: player.clone(),
            });
        }
        if state.passed {
            return Err(TurnError::AlreadyPassed {
                player: player.clone(),
            });
        }
        Ok(())
    }

    /// [`Self::ensure_player_turn`] plus at least one action left.
    pub fn ensure_can_act(&self, player: &PlayerId) -> Result<(), TurnError> {
        self.ensure_player_turn(player)?;
        if !self.player(player)?.can_act() {
            return Err(TurnError::NoActionsRemaining {
                player: player.clone(),
            });
        }
        Ok(())
    }

    /// First non-passed player after `after` in seating order, wrapping
    /// around. May return `after` itself.
    pub fn next_active_player(&self, after: &PlayerId) -> Option<PlayerId> {
        let order = &self.game.player_order;
        if order.is_empty() {
            return None;
        }
        let start = order
            .iter()
            .position(|id| id == after)
            .map_or(0, |index| index + 1);

        (0..order.len())
            .map(|offset| &order[(start + offset) % order.len()])
            .find(|id| self.player(id).is_ok_and(|player| !player.passed))
            .cloned()
    }

    /// Every player has either passed or has no actions left.
    pub fn is_generation_over(&self) -> bool {
        self.players
            .iter()
            .all(|player| player.passed || player.available_actions == 0)
    }

    /// Hands the turn to `player` with a fresh action allowance. Unlimited
    /// players keep their sentinel.
    pub fn start_turn(&mut self, player: &PlayerId) -> Result<(), TurnError> {
        let allowance = if self.active_player_count() == 1 {
            GameConfig::UNLIMITED_ACTIONS
        } else {
            self.turn_allowance()
        };
        let state = self.player_mut(player)?;
        if !state.has_unlimited_actions() {
            state.available_actions = allowance;
        }
        self.game.current_turn = Some(player.clone());
        Ok(())
    }

    /// Enters the action phase with every player active. The first player in
    /// seating order takes the first turn.
    pub fn begin_action_phase(&mut self) -> Result<PlayerId, TurnError> {
        let first = self
            .game
            .player_order
            .first()
            .cloned()
            .ok_or(TurnError::NoPlayers)?;

        let allowance = self.turn_allowance();
        for player in self.players.iter_mut() {
            player.passed = false;
            player.available_actions = allowance;
        }
        self.game.generation = self.game.generation.max(1);
        self.game.phase = Phase::Action;
        self.game.current_turn = Some(first.clone());
        Ok(first)
    }

    /// Consumes one action of the current player. When the counter reaches
    /// zero and no tile placement is pending, the turn moves on.
    ///
    /// Call only after every effect of the action applied successfully.
    pub fn consume_action(&mut self, player: &PlayerId) -> Result<ConsumeOutcome, TurnError> {
        self.ensure_player_turn(player)?;
        let state = self.player_mut(player)?;
        let consumed = consume_action(state)?;
        let remaining = state.available_actions;

        let next_player = if remaining == 0 {
            self.advance_if_exhausted(player)?
        } else {
            None
        };

        Ok(ConsumeOutcome {
            consumed,
            remaining,
            next_player,
        })
    }

    /// Moves the turn on once `player` is out of actions and has no tiles
    /// left to place. A player who is the only one still in the generation
    /// gets unlimited actions instead.
    pub fn advance_if_exhausted(&mut self, player: &PlayerId) -> Result<Option<PlayerId>, TurnError> {
        if !self.game.is_current_turn(player) {
            return Ok(None);
        }
        let state = self.player(player)?;
        if state.available_actions != 0 || !state.tile_queue.is_empty() {
            return Ok(None);
        }

        if self.active_player_count() == 1 && !state.passed {
            self.player_mut(player)?.available_actions = GameConfig::UNLIMITED_ACTIONS;
            return Ok(None);
        }

        match self.next_active_player(player) {
            Some(next) if &next != player => {
                self.start_turn(&next)?;
                Ok(Some(next))
            }
            _ => Ok(None),
        }
    }

    /// Ends the current player's turn.
    ///
    /// A player who has not acted yet this turn (or has unlimited actions, or
    /// plays solo) passes for the rest of the generation; otherwise the turn
    /// is merely skipped. When a pass leaves a single player in the
    /// generation, that player gets unlimited actions. Production runs as
    /// soon as every player is done.
    pub fn skip_action(&mut self, player: &PlayerId) -> Result<SkipOutcome, TurnError> {
        self.ensure_player_turn(player)?;

        let active_before = self.active_player_count();
        let available = self.player(player)?.available_actions;
        let passing = available == self.config.max_actions_per_turn
            || available == GameConfig::UNLIMITED_ACTIONS
            || self.game.is_solo();

        let mut unlimited_granted = None;
        let kind = if passing {
            self.player_mut(player)?.passed = true;
            if active_before == 2
                && let Some(last) = self
                    .players
                    .iter_mut()
                    .find(|other| !other.passed && &other.id != player)
            {
                last.available_actions = GameConfig::UNLIMITED_ACTIONS;
                unlimited_granted = Some(last.id.clone());
            }
            SkipKind::Passed
        } else {
            SkipKind::Skipped
        };

        if self.is_generation_over() {
            let production = self.run_production();
            return Ok(SkipOutcome {
                kind,
                unlimited_granted,
                generation_over: true,
                next_player: None,
                production: Some(production),
            });
        }

        let next_player = self.next_active_player(player);
        if let Some(next) = &next_player {
            self.start_turn(next)?;
        }

        Ok(SkipOutcome {
            kind,
            unlimited_granted,
            generation_over: false,
            production: None,
            next_player,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::GameState;

    fn create_test_game(names: &[&str]) -> (GameState, Vec<PlayerState>, GameConfig) {
        let config = GameConfig::default();
        let mut game = GameState::new("g1");
        game.player_order = names.iter().map(|name| PlayerId::from(*name)).collect();
        let players = names
            .iter()
            .map(|name| PlayerState::new(*name, *name, &config))
            .collect();
        (game, players, config)
    }

    fn id(name: &str) -> PlayerId {
        PlayerId::from(name)
    }

    #[test]
    fn consume_action_respects_unlimited_and_zero() {
        let mut player = PlayerState::new("p1", "Ada", &GameConfig::default());
        player.available_actions = 1;
        assert_eq!(consume_action(&mut player), Ok(true));
        assert_eq!(player.available_actions, 0);
        assert!(consume_action(&mut player).is_err());

        player.available_actions = GameConfig::UNLIMITED_ACTIONS;
        assert_eq!(consume_action(&mut player), Ok(false));
        assert_eq!(player.available_actions, GameConfig::UNLIMITED_ACTIONS);
    }

    #[test]
    fn begin_action_phase_gives_first_player_the_turn() {
        let (mut game, mut players, config) = create_test_game(&["a", "b"]);
        let mut engine = TurnEngine::new(&mut game, &mut players, &config);

        assert_eq!(engine.begin_action_phase(), Ok(id("a")));
        assert_eq!(game.generation, 1);
        assert_eq!(game.phase, Phase::Action);
        assert!(players.iter().all(|p| p.available_actions == 2));
    }

    #[test]
    fn first_pass_of_two_grants_unlimited_actions() {
        let (mut game, mut players, config) = create_test_game(&["a", "b"]);
        let mut engine = TurnEngine::new(&mut game, &mut players, &config);
        engine.begin_action_phase().unwrap();

        let outcome = engine.skip_action(&id("a")).unwrap();

        assert_eq!(outcome.kind, SkipKind::Passed);
        assert_eq!(outcome.unlimited_granted, Some(id("b")));
        assert_eq!(outcome.next_player, Some(id("b")));
        assert!(!outcome.generation_over);
        assert_eq!(players[1].available_actions, GameConfig::UNLIMITED_ACTIONS);
        assert!(players[0].passed);
    }

    #[test]
    fn skip_after_acting_does_not_pass() {
        let (mut game, mut players, config) = create_test_game(&["a", "b", "c"]);
        let mut engine = TurnEngine::new(&mut game, &mut players, &config);
        engine.begin_action_phase().unwrap();

        let consumed = engine.consume_action(&id("a")).unwrap();
        assert_eq!(consumed.remaining, 1);
        assert_eq!(consumed.next_player, None);

        let outcome = engine.skip_action(&id("a")).unwrap();
        assert_eq!(outcome.kind, SkipKind::Skipped);
        assert_eq!(outcome.next_player, Some(id("b")));
        assert!(!players[0].passed);
    }

    #[test]
    fn exhausting_actions_advances_turn() {
        let (mut game, mut players, config) = create_test_game(&["a", "b"]);
        let mut engine = TurnEngine::new(&mut game, &mut players, &config);
        engine.begin_action_phase().unwrap();

        engine.consume_action(&id("a")).unwrap();
        let outcome = engine.consume_action(&id("a")).unwrap();

        assert_eq!(outcome.next_player, Some(id("b")));
        assert!(game.is_current_turn(&id("b")));
    }

    #[test]
    fn pending_tile_blocks_turn_advance() {
        use crate::state::TileKind;

        let (mut game, mut players, config) = create_test_game(&["a", "b"]);
        players[0].tile_queue.append([TileKind::City], "test");
        let mut engine = TurnEngine::new(&mut game, &mut players, &config);
        engine.begin_action_phase().unwrap();

        engine.consume_action(&id("a")).unwrap();
        let outcome = engine.consume_action(&id("a")).unwrap();
        assert_eq!(outcome.next_player, None);
        assert!(game.is_current_turn(&id("a")));
    }

    #[test]
    fn wrong_player_cannot_skip() {
        let (mut game, mut players, config) = create_test_game(&["a", "b"]);
        let mut engine = TurnEngine::new(&mut game, &mut players, &config);
        engine.begin_action_phase().unwrap();

        assert_eq!(
            engine.skip_action(&id("b")),
            Err(TurnError::NotPlayerTurn { player: id("b") })
        );
    }

    #[test]
    fn everyone_passing_runs_production() {
        let (mut game, mut players, config) = create_test_game(&["a", "b"]);
        let mut engine = TurnEngine::new(&mut game, &mut players, &config);
        engine.begin_action_phase().unwrap();

        engine.skip_action(&id("a")).unwrap();
        let outcome = engine.skip_action(&id("b")).unwrap();

        assert!(outcome.generation_over);
        let production = outcome.production.expect("production should run");
        assert_eq!(production.income.len(), 2);
        assert_eq!(game.generation, 2);
        assert_eq!(game.phase, Phase::ProductionAndCardDraw);
        assert!(players.iter().all(|p| !p.passed));
    }

    #[test]
    fn solo_skip_always_passes() {
        let (mut game, mut players, config) = create_test_game(&["solo"]);
        let mut engine = TurnEngine::new(&mut game, &mut players, &config);
        engine.begin_action_phase().unwrap();
        assert_eq!(players[0].available_actions, GameConfig::UNLIMITED_ACTIONS);

        let mut engine = TurnEngine::new(&mut game, &mut players, &config);
        let outcome = engine.skip_action(&id("solo")).unwrap();
        assert_eq!(outcome.kind, SkipKind::Passed);
        assert!(outcome.generation_over);
    }
}
