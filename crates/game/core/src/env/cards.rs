use crate::card::{Card, CardKind};
use crate::ids::CardId;

/// Read-only access to the card catalog.
pub trait CardOracle: Send + Sync {
    fn card(&self, id: &CardId) -> Option<Card>;

    /// Returns every card in the catalog.
    fn all_cards(&self) -> Vec<Card>;

    /// Ids of every project card, the draw pile before shuffling.
    fn project_card_ids(&self) -> Vec<CardId> {
        self.all_cards()
            .into_iter()
            .filter(|card| !matches!(card.kind, CardKind::Corporation | CardKind::Prelude))
            .map(|card| card.id)
            .collect()
    }

    fn corporation_ids(&self) -> Vec<CardId> {
        self.all_cards()
            .into_iter()
            .filter(Card::is_corporation)
            .map(|card| card.id)
            .collect()
    }
}
