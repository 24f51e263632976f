//! Triggers decide when a behavior runs.

use strum::{AsRefStr, Display, EnumString};

use super::{ResourceKind, Target};
use crate::card::{CardKind, Tag};

/// Trigger kind declared on a behavior.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum TriggerKind {
    /// Player-invoked card action, once per generation.
    Manual,
    /// Fires at play time, or on every matching event when a condition is set.
    Auto,
    /// Mandatory first action imposed by a corporation.
    AutoCorporationFirstAction,
    /// Applied once when the corporation is chosen.
    AutoCorporationStart,
}

/// Domain event a reactive behavior listens for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ConditionKind {
    OceanPlaced,
    TemperatureRaise,
    OxygenRaise,
    CityPlaced,
    GreeneryPlaced,
    TilePlaced,
    CardPlayed,
    TagPlayed,
    StandardProjectPlayed,
    PlacementBonusGained,
    #[cfg_attr(feature = "serde", serde(other))]
    Unknown,
}

/// Where a placement-related condition or `per` counter looks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Location {
    #[default]
    Anywhere,
    Mars,
}

/// Inclusive cost window; a missing bound is open.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CostRange {
    #[cfg_attr(feature = "serde", serde(default))]
    pub min: Option<i32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub max: Option<i32>,
}

impl CostRange {
    pub const fn new(min: Option<i32>, max: Option<i32>) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, cost: i32) -> bool {
        self.min.is_none_or(|min| cost >= min) && self.max.is_none_or(|max| cost <= max)
    }
}

/// Filter attached to an auto trigger that turns it into a standing
/// subscription.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TriggerCondition {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: ConditionKind,
    #[cfg_attr(feature = "serde", serde(default))]
    pub location: Option<Location>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub affected_tags: Vec<Tag>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub affected_resources: Vec<ResourceKind>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub affected_card_types: Vec<CardKind>,
    /// Whose events fire the behavior; `None` means the owner only.
    #[cfg_attr(feature = "serde", serde(default))]
    pub target: Option<Target>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub required_original_cost: Option<CostRange>,
}

impl TriggerCondition {
    pub fn new(kind: ConditionKind) -> Self {
        Self {
            kind,
            location: None,
            affected_tags: Vec::new(),
            affected_resources: Vec::new(),
            affected_card_types: Vec::new(),
            target: None,
            required_original_cost: None,
        }
    }

    #[must_use]
    pub fn with_target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }

    #[must_use]
    pub fn with_affected_resources(mut self, resources: Vec<ResourceKind>) -> Self {
        self.affected_resources = resources;
        self
    }

    #[must_use]
    pub fn with_affected_tags(mut self, tags: Vec<Tag>) -> Self {
        self.affected_tags = tags;
        self
    }

    #[must_use]
    pub fn with_affected_card_types(mut self, kinds: Vec<CardKind>) -> Self {
        self.affected_card_types = kinds;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trigger {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: TriggerKind,
    #[cfg_attr(feature = "serde", serde(default))]
    pub condition: Option<TriggerCondition>,
}

impl Trigger {
    pub const fn manual() -> Self {
        Self {
            kind: TriggerKind::Manual,
            condition: None,
        }
    }

    pub const fn auto() -> Self {
        Self {
            kind: TriggerKind::Auto,
            condition: None,
        }
    }

    pub const fn of(kind: TriggerKind) -> Self {
        Self {
            kind,
            condition: None,
        }
    }

    pub fn on(condition: TriggerCondition) -> Self {
        Self {
            kind: TriggerKind::Auto,
            condition: Some(condition),
        }
    }
}
