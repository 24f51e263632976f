//! Game operations.
//!
//! [`GameService`] is the entry point a transport calls into. Every
//! operation runs under its game's lock, so operations on one game are
//! serialized while independent games proceed concurrently. An operation
//! validates first, then applies inputs and outputs through the
//! [`EffectApplier`], consumes the action and finally broadcasts the new
//! state. A failed operation consumes nothing and broadcasts nothing, though
//! outputs applied before a failing output stay applied.
//!
//! Operations are grouped by concern:
//! - `setup`: game creation, joining, dealing and starting selection
//! - `cards`: project cards and card actions
//! - `projects`: standard projects and resource conversions
//! - `tiles`: resolving queued tile placements
//! - `turns`: skipping, passing and production card selection

mod cards;
mod projects;
mod session;
mod setup;
mod tiles;
mod turns;

pub use cards::{CardActionRequest, PlayCardRequest};
pub use projects::ProjectRequest;

pub(crate) use session::TurnSession;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use terraform_core::{
    Card, CardId, CardOracle, ConsumeOutcome, GameId, OracleError, Phase, PlayerId, PlayerState,
    VictoryPoints, final_standings,
};
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, warn};

use crate::broadcast::Broadcaster;
use crate::config::RuntimeConfig;
use crate::corporation::CorporationProcessor;
use crate::effects::EffectApplier;
use crate::error::{ActionError, Result};
use crate::events::{DomainEvent, EventBus, GamePhaseChanged, GenerationAdvanced};
use crate::repository::{
    GameRepository, InMemoryGameRepository, InMemoryPlayerRepository, PlayerRepository,
};
use crate::subscriber::PassiveEffectSubscriber;

type GameLocks = HashMap<GameId, Arc<tokio::sync::Mutex<()>>>;

/// Orchestrates game operations over repositories, the card oracle and the
/// event bus.
///
/// Cheap to clone; clones share state, locks and subscriptions.
#[derive(Clone)]
pub struct GameService {
    players: Arc<dyn PlayerRepository>,
    games: Arc<dyn GameRepository>,
    cards: Arc<dyn CardOracle>,
    applier: EffectApplier,
    subscriber: PassiveEffectSubscriber,
    corporations: CorporationProcessor,
    broadcaster: Arc<dyn Broadcaster>,
    config: RuntimeConfig,
    locks: Arc<Mutex<GameLocks>>,
}

impl GameService {
    pub fn new(
        config: RuntimeConfig,
        players: Arc<dyn PlayerRepository>,
        games: Arc<dyn GameRepository>,
        cards: Arc<dyn CardOracle>,
        broadcaster: Arc<dyn Broadcaster>,
    ) -> Self {
        let bus = EventBus::with_tap_capacity(config.event_tap_buffer);
        let applier = EffectApplier::new(players.clone(), games.clone(), cards.clone(), bus);
        let subscriber = PassiveEffectSubscriber::new(applier.clone(), players.clone());
        let corporations = CorporationProcessor::new(
            applier.clone(),
            players.clone(),
            games.clone(),
            config.game.clone(),
        );

        Self {
            players,
            games,
            cards,
            applier,
            subscriber,
            corporations,
            broadcaster,
            config,
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Service over fresh in-memory repositories.
    pub fn in_memory(
        config: RuntimeConfig,
        cards: impl CardOracle + 'static,
        broadcaster: Arc<dyn Broadcaster>,
    ) -> Self {
        Self::new(
            config,
            Arc::new(InMemoryPlayerRepository::new()),
            Arc::new(InMemoryGameRepository::new()),
            Arc::new(cards),
            broadcaster,
        )
    }

    pub fn bus(&self) -> &EventBus {
        self.applier.bus()
    }

    pub fn players(&self) -> &Arc<dyn PlayerRepository> {
        &self.players
    }

    pub fn games(&self) -> &Arc<dyn GameRepository> {
        &self.games
    }

    pub fn subscriber(&self) -> &PassiveEffectSubscriber {
        &self.subscriber
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Current standings, best first. Final once the game is complete.
    pub fn scores(&self, game: &GameId) -> Result<Vec<(PlayerId, VictoryPoints)>> {
        let state = self.games.get(game)?;
        let players = self.players.list(game)?;
        Ok(final_standings(&state, &players, self.cards.as_ref()))
    }

    /// Waits for exclusive access to `game`.
    async fn lock_game(&self, game: &GameId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.entry(game.clone()).or_default().clone()
        };
        lock.lock_owned().await
    }

    fn card(&self, id: &CardId) -> std::result::Result<Card, OracleError> {
        self.cards
            .card(id)
            .ok_or_else(|| OracleError::CardNotFound(id.clone()))
    }

    /// Loads the game and checks that `player` may take an action now.
    fn action_session(&self, game: &GameId, player: &PlayerId) -> Result<TurnSession> {
        let mut session = TurnSession::load(self.games.as_ref(), self.players.as_ref(), game)?;
        session.engine(&self.config.game).ensure_can_act(player)?;
        ensure_no_pending_tiles(session.player(player)?)?;
        Ok(session)
    }

    fn consume_action(&self, game: &GameId, player: &PlayerId) -> Result<ConsumeOutcome> {
        let mut session = TurnSession::load(self.games.as_ref(), self.players.as_ref(), game)?;
        let outcome = session.engine(&self.config.game).consume_action(player)?;
        session.store(self.games.as_ref(), self.players.as_ref())?;

        debug!(
            target: "runtime::service",
            game = %game,
            player = %player,
            remaining = outcome.remaining,
            next = ?outcome.next_player,
            "action consumed"
        );
        Ok(outcome)
    }

    fn publish<E: DomainEvent>(&self, event: E) {
        self.applier.bus().publish(event);
    }

    fn publish_phase_change(&self, game: &GameId, old_phase: Phase, new_phase: Phase) {
        if old_phase == new_phase {
            return;
        }
        self.publish(GamePhaseChanged {
            game_id: game.clone(),
            old_phase,
            new_phase,
            timestamp: Utc::now(),
        });
    }

    fn publish_generation(&self, game: &GameId, old_generation: u32, new_generation: u32) {
        if old_generation == new_generation {
            return;
        }
        self.publish(GenerationAdvanced {
            game_id: game.clone(),
            old_generation,
            new_generation,
            timestamp: Utc::now(),
        });
    }

    fn broadcast(&self, game: &GameId, player: Option<&PlayerId>) {
        if let Err(err) = self.broadcaster.broadcast_game_state(game, player) {
            warn!(
                target: "runtime::service",
                game = %game,
                error = %err,
                "state broadcast failed"
            );
        }
    }
}

/// Tiles queued by an earlier action must be placed before anything else.
fn ensure_no_pending_tiles(player: &PlayerState) -> Result<()> {
    if player.tile_queue.is_empty() {
        return Ok(());
    }
    Err(ActionError::TilePlacementPending {
        player: player.id.clone(),
        remaining: player.tile_queue.len(),
    })
}
