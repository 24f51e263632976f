//! [`terraform_core::CardOracle`] backed by an in-memory catalog.
use std::collections::BTreeMap;
use std::path::Path;

use terraform_core::{Card, CardId, CardOracle};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read card catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid card catalog: {0}")]
    Json(#[from] serde_json::Error),
}

/// CardOracle implementation with static card definitions.
///
/// Cards are kept sorted by id so catalog order, and with it the initial
/// deck order, is stable across runs.
pub struct CardOracleImpl {
    cards: BTreeMap<CardId, Card>,
}

impl CardOracleImpl {
    pub fn new() -> Self {
        Self {
            cards: BTreeMap::new(),
        }
    }

    /// Parses a JSON array of cards.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let cards: Vec<Card> = serde_json::from_str(json)?;
        let mut oracle = Self::new();
        for card in cards {
            oracle.add_card(card);
        }
        tracing::info!(target: "runtime::oracle", cards = oracle.len(), "card catalog loaded");
        Ok(oracle)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Add a card, replacing any card with the same id
    pub fn add_card(&mut self, card: Card) {
        self.cards.insert(card.id.clone(), card);
    }

    #[must_use]
    pub fn with_card(mut self, card: Card) -> Self {
        self.add_card(card);
        self
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl Default for CardOracleImpl {
    fn default() -> Self {
        Self::new()
    }
}

impl CardOracle for CardOracleImpl {
    fn card(&self, id: &CardId) -> Option<Card> {
        self.cards.get(id).cloned()
    }

    fn all_cards(&self) -> Vec<Card> {
        self.cards.values().cloned().collect()
    }
}
