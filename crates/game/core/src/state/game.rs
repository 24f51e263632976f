//! Game-wide state.

use strum::{AsRefStr, Display, EnumString};

use super::{Board, GlobalParameters};
use crate::ids::{CardId, GameId, PlayerId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Phase {
    WaitingForGameStart,
    StartingCardSelection,
    Action,
    ProductionAndCardDraw,
    Complete,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameState {
    pub id: GameId,
    pub phase: Phase,
    /// Zero before the first action phase.
    pub generation: u32,
    pub global_parameters: GlobalParameters,
    /// Seating order; turns rotate through it.
    pub player_order: Vec<PlayerId>,
    pub current_turn: Option<PlayerId>,
    pub board: Board,
    /// Draw pile, top of the deck at the end.
    pub deck: Vec<CardId>,
    pub discard: Vec<CardId>,
    /// Corporations not yet offered.
    pub corporation_deck: Vec<CardId>,
}

impl GameState {
    pub fn new(id: impl Into<GameId>) -> Self {
        Self {
            id: id.into(),
            phase: Phase::WaitingForGameStart,
            generation: 0,
            global_parameters: GlobalParameters::new(),
            player_order: Vec::new(),
            current_turn: None,
            board: Board::default(),
            deck: Vec::new(),
            discard: Vec::new(),
            corporation_deck: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_board(mut self, board: Board) -> Self {
        self.board = board;
        self
    }

    pub fn is_solo(&self) -> bool {
        self.player_order.len() == 1
    }

    pub fn is_current_turn(&self, player: &PlayerId) -> bool {
        self.current_turn.as_ref() == Some(player)
    }

    /// Takes up to `count` cards from the top of the deck, reshuffling the
    /// discard pile back in (in order) when the deck runs out.
    pub fn draw_cards(&mut self, count: usize) -> Vec<CardId> {
        let mut drawn = Vec::with_capacity(count);
        while drawn.len() < count {
            if self.deck.is_empty() {
                if self.discard.is_empty() {
                    break;
                }
                self.deck.append(&mut self.discard);
                self.deck.reverse();
            }
            if let Some(card) = self.deck.pop() {
                drawn.push(card);
            }
        }
        drawn
    }

    pub fn draw_corporations(&mut self, count: usize) -> Vec<CardId> {
        let split = self.corporation_deck.len().saturating_sub(count);
        self.corporation_deck.split_off(split)
    }
}
