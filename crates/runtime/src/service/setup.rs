use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use terraform_core::{
    Board, CardId, CardSelectionKind, GameId, GameState, OracleError, PendingCardSelection, Phase,
    PlayerId, PlayerState, ResourceSet, TurnError, unselected_cards,
};
use tracing::info;

use super::{GameService, TurnSession};
use crate::error::{ActionError, Result};
use crate::events::CorporationSelected;

/// Game creation and the starting selection.
impl GameService {
    /// Creates a game whose draw piles hold every project card and every
    /// corporation of the catalog.
    pub async fn create_game(&self, id: impl Into<GameId>, board: Board) -> Result<GameState> {
        let id = id.into();
        let _guard = self.lock_game(&id).await;

        let mut game = GameState::new(id.clone()).with_board(board);
        game.deck = self.cards.project_card_ids();
        game.corporation_deck = self.cards.corporation_ids();
        self.games.create(game.clone())?;

        info!(
            target: "runtime::service",
            game = %id,
            deck = game.deck.len(),
            corporations = game.corporation_deck.len(),
            "game created"
        );
        Ok(game)
    }

    /// Seats a new player. Only possible before the game starts.
    pub async fn add_player(
        &self,
        game: &GameId,
        id: impl Into<PlayerId>,
        name: impl Into<String>,
    ) -> Result<PlayerState> {
        let _guard = self.lock_game(game).await;
        let mut state = self.games.get(game)?;
        if state.phase != Phase::WaitingForGameStart {
            return Err(TurnError::WrongPhase {
                expected: Phase::WaitingForGameStart,
                actual: state.phase,
            }
            .into());
        }

        let player = PlayerState::new(id, name, &self.config.game);
        if state.player_order.contains(&player.id) {
            return Err(ActionError::PlayerExists { player: player.id });
        }
        self.players.save(game, &player)?;
        state.player_order.push(player.id.clone());
        self.games.save(&state)?;

        info!(
            target: "runtime::service",
            game = %game,
            player = %player.id,
            seats = state.player_order.len(),
            "player joined"
        );
        self.broadcast(game, Some(&player.id));
        Ok(player)
    }

    /// Shuffles the draw piles and deals every player a choice of
    /// corporations and a starting hand.
    pub async fn start_game(&self, game: &GameId) -> Result<()> {
        let _guard = self.lock_game(game).await;
        let mut session = TurnSession::load(self.games.as_ref(), self.players.as_ref(), game)?;
        session
            .engine(&self.config.game)
            .ensure_phase(Phase::WaitingForGameStart)?;
        if session.game.player_order.is_empty() {
            return Err(TurnError::NoPlayers.into());
        }

        let mut rng = match self.config.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        session.game.deck.shuffle(&mut rng);
        session.game.corporation_deck.shuffle(&mut rng);

        let order = session.game.player_order.clone();
        for id in &order {
            let corporations = session
                .game
                .draw_corporations(self.config.game.corporations_offered);
            let cards = session.game.draw_cards(self.config.game.starting_hand_size);
            let player = session
                .players
                .iter_mut()
                .find(|player| &player.id == id)
                .ok_or_else(|| TurnError::PlayerNotFound { player: id.clone() })?;
            player.pending_card_selection = Some(PendingCardSelection {
                kind: CardSelectionKind::Starting,
                cards,
                corporations,
            });
        }

        session.game.phase = Phase::StartingCardSelection;
        session.store(self.games.as_ref(), self.players.as_ref())?;
        self.publish_phase_change(
            game,
            Phase::WaitingForGameStart,
            Phase::StartingCardSelection,
        );

        info!(
            target: "runtime::service",
            game = %game,
            players = order.len(),
            seeded = self.config.shuffle_seed.is_some(),
            "game started"
        );
        self.broadcast(game, None);
        Ok(())
    }

    /// Takes one offered corporation and buys `cards` from the starting deal.
    ///
    /// The corporation's starting resources are granted before the cards are
    /// paid for. Once every player has chosen, the first generation begins.
    pub async fn select_starting_cards(
        &self,
        game: &GameId,
        player: &PlayerId,
        corporation: &CardId,
        cards: &[CardId],
    ) -> Result<()> {
        let _guard = self.lock_game(game).await;
        let mut session = TurnSession::load(self.games.as_ref(), self.players.as_ref(), game)?;
        session
            .engine(&self.config.game)
            .ensure_phase(Phase::StartingCardSelection)?;

        let mut state = session.player(player)?.clone();
        let offered = match &state.pending_card_selection {
            Some(selection) if selection.kind == CardSelectionKind::Starting => selection.clone(),
            _ => {
                return Err(TurnError::NoPendingSelection {
                    player: player.clone(),
                }
                .into());
            }
        };
        if !offered.corporations.contains(corporation) {
            return Err(ActionError::CorporationNotOffered {
                player: player.clone(),
                card: corporation.clone(),
            });
        }
        let corp = self.card(corporation)?;
        if !corp.is_corporation() {
            return Err(OracleError::NotACorporation(corporation.clone()).into());
        }
        let discarded = unselected_cards(&offered.cards, cards)?;

        let required = cards.len() as i32 * self.config.game.card_buy_cost;
        let starting_credits = corp
            .starting_resources
            .as_ref()
            .map_or(0, |resources| resources.credits);
        let available = state.resources.credits + starting_credits;
        if available < required {
            return Err(TurnError::CannotAffordSelection {
                count: cards.len(),
                required,
                available,
            }
            .into());
        }

        state.corporation = Some(corporation.clone());
        state.hand.extend(cards.iter().cloned());
        state.pending_card_selection = None;
        self.players.save(game, &state)?;
        session.game.discard.extend(discarded);
        self.games.save(&session.game)?;

        self.corporations
            .apply_starting_effects(game, player, &corp)?;
        self.corporations.apply_auto_effects(game, player, &corp)?;
        if required > 0 {
            self.applier
                .adjust_resources(game, player, &ResourceSet::credits(-required))?;
        }
        self.subscriber.subscribe_card_effects(game, player, &corp)?;
        self.publish(CorporationSelected {
            game_id: game.clone(),
            player_id: player.clone(),
            corporation_id: corp.id.clone(),
            corporation_name: corp.name.clone(),
            timestamp: Utc::now(),
        });
        self.corporations
            .setup_forced_first_action(game, player, &corp)?;

        info!(
            target: "runtime::service",
            game = %game,
            player = %player,
            corporation = %corp.id,
            cards = cards.len(),
            "starting selection confirmed"
        );

        let mut session = TurnSession::load(self.games.as_ref(), self.players.as_ref(), game)?;
        let everyone_ready = session
            .players
            .iter()
            .all(|player| player.corporation.is_some() && player.pending_card_selection.is_none());
        if everyone_ready {
            let old_generation = session.game.generation;
            let first = session.engine(&self.config.game).begin_action_phase()?;
            session.store(self.games.as_ref(), self.players.as_ref())?;
            self.publish_phase_change(game, Phase::StartingCardSelection, Phase::Action);
            self.publish_generation(game, old_generation, session.game.generation);
            info!(
                target: "runtime::service",
                game = %game,
                first_player = %first,
                "action phase started"
            );
        }

        self.broadcast(game, Some(player));
        Ok(())
    }
}
