use terraform_core::{
    CardId, GameId, PlayerId, ProductionSummary, ResourceSet, SkipKind, SkipOutcome,
};
use chrono::Utc;
use tracing::{debug, info};

use super::{GameService, TurnSession, ensure_no_pending_tiles};
use crate::error::Result;
use crate::events::GameEnded;

/// Ending turns and the production card draw.
impl GameService {
    /// Ends the player's turn, passing for the generation if they have not
    /// acted yet. When everyone is done, production runs and the next
    /// generation's cards are dealt.
    pub async fn skip_action(&self, game: &GameId, player: &PlayerId) -> Result<SkipOutcome> {
        let _guard = self.lock_game(game).await;
        let mut session = TurnSession::load(self.games.as_ref(), self.players.as_ref(), game)?;
        session.engine(&self.config.game).ensure_player_turn(player)?;
        ensure_no_pending_tiles(session.player(player)?)?;

        let (old_phase, old_generation) = (session.game.phase, session.game.generation);
        let outcome = session.engine(&self.config.game).skip_action(player)?;
        session.store(self.games.as_ref(), self.players.as_ref())?;

        if let Some(production) = &outcome.production {
            self.publish_phase_change(game, old_phase, session.game.phase);
            self.pay_income(game, production)?;
            self.publish_generation(game, old_generation, session.game.generation);
            if production.game_complete {
                self.end_game(game)?;
            }
        }

        info!(
            target: "runtime::service",
            game = %game,
            player = %player,
            passed = outcome.kind == SkipKind::Passed,
            unlimited = ?outcome.unlimited_granted,
            next = ?outcome.next_player,
            generation_over = outcome.generation_over,
            "turn ended"
        );
        self.broadcast(game, Some(player));
        Ok(outcome)
    }

    /// Buys `selected` from the production deal. Returns true when this was
    /// the last player and the next action phase has begun.
    pub async fn confirm_production_cards(
        &self,
        game: &GameId,
        player: &PlayerId,
        selected: &[CardId],
    ) -> Result<bool> {
        let _guard = self.lock_game(game).await;
        let mut session = TurnSession::load(self.games.as_ref(), self.players.as_ref(), game)?;
        let old_phase = session.game.phase;
        let confirmation = session
            .engine(&self.config.game)
            .confirm_production_cards(player, selected)?;
        session.store(self.games.as_ref(), self.players.as_ref())?;
        if confirmation.cost > 0 {
            self.applier
                .adjust_resources(game, player, &ResourceSet::credits(-confirmation.cost))?;
        }

        let started = confirmation.action_phase_started;
        if started {
            self.publish_phase_change(game, old_phase, session.game.phase);
        }
        info!(
            target: "runtime::service",
            game = %game,
            player = %player,
            bought = selected.len(),
            action_phase = started,
            "production cards confirmed"
        );
        self.broadcast(game, Some(player));
        Ok(started)
    }

    fn end_game(&self, game: &GameId) -> Result<()> {
        let standings = self.scores(game)?;
        info!(
            target: "runtime::service",
            game = %game,
            winner = ?standings.first().map(|(player, _)| player),
            top_score = standings.first().map(|(_, points)| points.total()),
            "game complete"
        );
        self.publish(GameEnded {
            game_id: game.clone(),
            standings,
            timestamp: Utc::now(),
        });
        Ok(())
    }

    fn pay_income(&self, game: &GameId, production: &ProductionSummary) -> Result<()> {
        for (player, income) in &production.income {
            let resources = self.applier.adjust_resources(game, player, income)?;
            debug!(
                target: "runtime::service",
                game = %game,
                player = %player,
                income = ?income,
                resources = ?resources,
                "production paid"
            );
        }
        Ok(())
    }
}
