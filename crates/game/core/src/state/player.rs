//! Per-player state.

use std::collections::BTreeMap;

use super::{PendingTileSelectionQueue, ResourceSet, TileKind};
use crate::behavior::{BasicResource, Behavior};
use crate::config::GameConfig;
use crate::ids::{CardId, PlayerId};

/// A behavior kept on the player after its card was played: either a live
/// event subscription or a static modifier read by the discount calculator.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerEffect {
    pub card_id: CardId,
    pub card_name: String,
    pub behavior_index: usize,
    pub behavior: Behavior,
}

/// A manual card action. Playable only while `play_count` is zero.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerAction {
    pub card_id: CardId,
    pub card_name: String,
    pub behavior_index: usize,
    pub behavior: Behavior,
    pub play_count: u32,
}

impl PlayerAction {
    pub const fn is_available(&self) -> bool {
        self.play_count == 0
    }
}

/// Mandatory opening action imposed by a corporation.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ForcedFirstAction {
    pub action_type: TileKind,
    pub corporation_id: CardId,
    pub source: String,
    pub completed: bool,
    pub description: String,
}

/// A resource that may be spent toward card costs at `rate` credits each.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PaymentSubstitute {
    pub resource: BasicResource,
    pub rate: i32,
}

/// Default substitutes every player starts with.
pub fn default_payment_substitutes() -> Vec<PaymentSubstitute> {
    vec![
        PaymentSubstitute {
            resource: BasicResource::Steel,
            rate: GameConfig::STEEL_VALUE,
        },
        PaymentSubstitute {
            resource: BasicResource::Titanium,
            rate: GameConfig::TITANIUM_VALUE,
        },
    ]
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum CardSelectionKind {
    /// Corporation and starting hand at game start.
    Starting,
    /// Cards dealt during the production phase.
    Production,
}

/// Cards offered to a player and awaiting a keep/buy decision.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PendingCardSelection {
    pub kind: CardSelectionKind,
    pub cards: Vec<CardId>,
    pub corporations: Vec<CardId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerState {
    pub id: PlayerId,
    pub name: String,
    pub corporation: Option<CardId>,
    pub resources: ResourceSet,
    pub production: ResourceSet,
    pub terraform_rating: i32,
    pub hand: Vec<CardId>,
    pub played_cards: Vec<CardId>,
    pub passed: bool,
    /// Remaining actions this turn; [`GameConfig::UNLIMITED_ACTIONS`] means
    /// no limit.
    pub available_actions: i32,
    pub effects: Vec<PlayerEffect>,
    pub actions: Vec<PlayerAction>,
    pub payment_substitutes: Vec<PaymentSubstitute>,
    /// Resources stored on played cards.
    pub card_storage: BTreeMap<CardId, i32>,
    pub forced_first_action: Option<ForcedFirstAction>,
    pub tile_queue: PendingTileSelectionQueue,
    pub pending_card_selection: Option<PendingCardSelection>,
    pub production_ready: bool,
}

impl PlayerState {
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>, config: &GameConfig) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            corporation: None,
            resources: ResourceSet::default(),
            production: ResourceSet::default(),
            terraform_rating: config.starting_terraform_rating,
            hand: Vec::new(),
            played_cards: Vec::new(),
            passed: false,
            available_actions: 0,
            effects: Vec::new(),
            actions: Vec::new(),
            payment_substitutes: default_payment_substitutes(),
            card_storage: BTreeMap::new(),
            forced_first_action: None,
            tile_queue: PendingTileSelectionQueue::new(),
            pending_card_selection: None,
            production_ready: false,
        }
    }

    pub const fn has_unlimited_actions(&self) -> bool {
        self.available_actions == GameConfig::UNLIMITED_ACTIONS
    }

    pub const fn can_act(&self) -> bool {
        !self.passed && (self.available_actions > 0 || self.has_unlimited_actions())
    }

    pub fn substitute_rate(&self, resource: BasicResource) -> Option<i32> {
        self.payment_substitutes
            .iter()
            .find(|sub| sub.resource == resource)
            .map(|sub| sub.rate)
    }

    /// Registers `resource` as a payment substitute, replacing any previous
    /// rate for it.
    pub fn register_substitute(&mut self, resource: BasicResource, rate: i32) {
        match self
            .payment_substitutes
            .iter_mut()
            .find(|sub| sub.resource == resource)
        {
            Some(existing) => existing.rate = rate,
            None => self
                .payment_substitutes
                .push(PaymentSubstitute { resource, rate }),
        }
    }

    /// Raises the conversion rate of an already registered substitute.
    pub fn modify_substitute_rate(&mut self, resource: BasicResource, delta: i32) -> bool {
        match self
            .payment_substitutes
            .iter_mut()
            .find(|sub| sub.resource == resource)
        {
            Some(existing) => {
                existing.rate += delta;
                true
            }
            None => false,
        }
    }

    pub fn storage(&self, card: &CardId) -> i32 {
        self.card_storage.get(card).copied().unwrap_or(0)
    }

    pub fn action(&self, card: &CardId, behavior_index: usize) -> Option<&PlayerAction> {
        self.actions
            .iter()
            .find(|a| &a.card_id == card && a.behavior_index == behavior_index)
    }

    pub fn action_mut(&mut self, card: &CardId, behavior_index: usize) -> Option<&mut PlayerAction> {
        self.actions
            .iter_mut()
            .find(|a| &a.card_id == card && a.behavior_index == behavior_index)
    }

    pub fn has_in_hand(&self, card: &CardId) -> bool {
        self.hand.contains(card)
    }

    pub fn remove_from_hand(&mut self, card: &CardId) -> bool {
        match self.hand.iter().position(|c| c == card) {
            Some(index) => {
                self.hand.remove(index);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn players_start_with_steel_and_titanium_rates() {
        let player = PlayerState::new("p1", "Ada", &GameConfig::default());

        assert_eq!(player.substitute_rate(BasicResource::Steel), Some(2));
        assert_eq!(player.substitute_rate(BasicResource::Titanium), Some(3));
        assert_eq!(player.substitute_rate(BasicResource::Heat), None);
        assert_eq!(player.terraform_rating, 20);
    }

    #[test]
    fn substitutes_can_be_registered_and_raised() {
        let mut player = PlayerState::new("p1", "Ada", &GameConfig::default());

        player.register_substitute(BasicResource::Heat, 1);
        assert!(player.modify_substitute_rate(BasicResource::Titanium, 1));
        assert!(!player.modify_substitute_rate(BasicResource::Plants, 1));

        assert_eq!(player.substitute_rate(BasicResource::Heat), Some(1));
        assert_eq!(player.substitute_rate(BasicResource::Titanium), Some(4));
    }

    #[test]
    fn unlimited_sentinel_allows_acting() {
        let mut player = PlayerState::new("p1", "Ada", &GameConfig::default());
        assert!(!player.can_act());

        player.available_actions = GameConfig::UNLIMITED_ACTIONS;
        assert!(player.can_act());

        player.passed = true;
        assert!(!player.can_act());
    }
}
