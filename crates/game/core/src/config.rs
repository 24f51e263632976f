/// Rule constants and tunable parameters of a game.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameConfig {
    /// Actions a player may take per turn before the turn passes on.
    pub max_actions_per_turn: i32,
    /// Cards dealt to each player during the production phase.
    pub production_cards_dealt: usize,
    /// Project cards dealt to each player at game start.
    pub starting_hand_size: usize,
    /// Corporations offered to each player at game start.
    pub corporations_offered: usize,
    /// Terraform rating every player starts with.
    pub starting_terraform_rating: i32,
    /// Credits paid per kept card during starting and production selection.
    pub card_buy_cost: i32,
}

impl GameConfig {
    // ===== rule constants =====
    /// Sentinel for "no action limit" granted to the last active player.
    pub const UNLIMITED_ACTIONS: i32 = -1;

    pub const STEEL_VALUE: i32 = 2;
    pub const TITANIUM_VALUE: i32 = 3;

    pub const MIN_TEMPERATURE: i32 = -30;
    pub const MAX_TEMPERATURE: i32 = 8;
    /// Degrees per temperature step.
    pub const TEMPERATURE_STEP: i32 = 2;
    pub const MIN_OXYGEN: i32 = 0;
    pub const MAX_OXYGEN: i32 = 14;
    pub const MIN_OCEANS: i32 = 0;
    pub const MAX_OCEANS: i32 = 9;

    pub const CREDITS_PRODUCTION_FLOOR: i32 = -5;
    pub const PRODUCTION_FLOOR: i32 = 0;

    pub const PLANTS_PER_GREENERY: i32 = 8;
    pub const HEAT_PER_TEMPERATURE: i32 = 8;
    /// Credits received per card sold through the sell-patents project.
    pub const SELL_PATENT_VALUE: i32 = 1;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_MAX_ACTIONS_PER_TURN: i32 = 2;
    pub const DEFAULT_PRODUCTION_CARDS_DEALT: usize = 4;
    pub const DEFAULT_STARTING_HAND_SIZE: usize = 10;
    pub const DEFAULT_CORPORATIONS_OFFERED: usize = 2;
    pub const DEFAULT_STARTING_TERRAFORM_RATING: i32 = 20;
    pub const DEFAULT_CARD_BUY_COST: i32 = 3;

    pub fn new() -> Self {
        Self {
            max_actions_per_turn: Self::DEFAULT_MAX_ACTIONS_PER_TURN,
            production_cards_dealt: Self::DEFAULT_PRODUCTION_CARDS_DEALT,
            starting_hand_size: Self::DEFAULT_STARTING_HAND_SIZE,
            corporations_offered: Self::DEFAULT_CORPORATIONS_OFFERED,
            starting_terraform_rating: Self::DEFAULT_STARTING_TERRAFORM_RATING,
            card_buy_cost: Self::DEFAULT_CARD_BUY_COST,
        }
    }

    #[must_use]
    pub fn with_max_actions_per_turn(mut self, max_actions: i32) -> Self {
        self.max_actions_per_turn = max_actions.max(1);
        self
    }

    #[must_use]
    pub fn with_production_cards_dealt(mut self, count: usize) -> Self {
        self.production_cards_dealt = count;
        self
    }

    #[must_use]
    pub fn with_starting_hand_size(mut self, count: usize) -> Self {
        self.starting_hand_size = count;
        self
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}
