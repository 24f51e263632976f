use terraform_core::{CardId, GameId, PlayerId, ResourceKind};

use super::EffectError;

/// Who and what an effect list is applied for.
///
/// Player-scoped effects need both a game and a player; game-scoped effects
/// (global parameters) need only the game. Target fields are filled in by the
/// caller when the card lets the player pick another player or card.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EffectContext {
    pub game_id: Option<GameId>,
    pub player_id: Option<PlayerId>,
    /// Human readable origin, stored on queued tiles and logged.
    pub source: String,
    pub source_card: Option<CardId>,
    pub target_player: Option<PlayerId>,
    pub target_card: Option<CardId>,
}

impl EffectContext {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    /// Context for effects owned by `player` in `game`.
    pub fn for_player(game: &GameId, player: &PlayerId, source: impl Into<String>) -> Self {
        Self::new(source).with_game(game.clone()).with_player(player.clone())
    }

    #[must_use]
    pub fn with_game(mut self, game: GameId) -> Self {
        self.game_id = Some(game);
        self
    }

    #[must_use]
    pub fn with_player(mut self, player: PlayerId) -> Self {
        self.player_id = Some(player);
        self
    }

    #[must_use]
    pub fn with_source_card(mut self, card: CardId) -> Self {
        self.source_card = Some(card);
        self
    }

    #[must_use]
    pub fn with_target_player(mut self, player: Option<PlayerId>) -> Self {
        self.target_player = player;
        self
    }

    #[must_use]
    pub fn with_target_card(mut self, card: Option<CardId>) -> Self {
        self.target_card = card;
        self
    }

    pub(super) fn require_game(&self, kind: ResourceKind) -> Result<&GameId, EffectError> {
        self.game_id
            .as_ref()
            .ok_or(EffectError::MissingGameContext { kind })
    }

    pub(super) fn require_player(
        &self,
        kind: ResourceKind,
    ) -> Result<(&GameId, &PlayerId), EffectError> {
        let player = self
            .player_id
            .as_ref()
            .ok_or(EffectError::MissingPlayerContext { kind })?;
        Ok((self.require_game(kind)?, player))
    }
}
