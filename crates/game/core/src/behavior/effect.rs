//! Input and output effects of a behavior.

use super::{CostRange, Location, ResourceKind, Target};
use crate::card::{CardKind, Tag};
use crate::project::StandardProject;

/// A single resource delta declared by a behavior.
///
/// As an input the amount is a cost; as an output it is a gain (or, for
/// discounts and substitutes, a modifier value).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ResourceEffect {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: ResourceKind,
    pub amount: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub target: Target,
    #[cfg_attr(feature = "serde", serde(default))]
    pub selectors: Vec<Selector>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_trigger: Option<i32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub per: Option<Per>,
}

impl ResourceEffect {
    pub fn new(kind: ResourceKind, amount: i32) -> Self {
        Self {
            kind,
            amount,
            target: Target::SelfPlayer,
            selectors: Vec::new(),
            max_trigger: None,
            per: None,
        }
    }

    #[must_use]
    pub fn with_target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    #[must_use]
    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.selectors.push(selector);
        self
    }

    #[must_use]
    pub fn with_per(mut self, per: Per) -> Self {
        self.per = Some(per);
        self
    }

    #[must_use]
    pub fn with_max_trigger(mut self, max_trigger: i32) -> Self {
        self.max_trigger = Some(max_trigger);
        self
    }

    /// Amount after applying the `per` multiplier to `count`.
    ///
    /// Without a `per` clause the declared amount is returned unchanged.
    pub fn scaled_amount(&self, count: i32) -> i32 {
        let Some(per) = &self.per else {
            return self.amount;
        };
        if per.amount <= 0 {
            return 0;
        }
        let mut multiplier = count.max(0) / per.amount;
        if let Some(cap) = self.max_trigger {
            multiplier = multiplier.min(cap.max(0));
        }
        self.amount * multiplier
    }

    /// Resources named by this effect's selectors, in declaration order.
    pub fn selector_resources(&self) -> impl Iterator<Item = ResourceKind> + '_ {
        self.selectors
            .iter()
            .flat_map(|selector| selector.resources.iter().copied())
    }
}

/// One matching rule. All specified criteria must hold for a selector to
/// match; an effect matches when any of its selectors does.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct Selector {
    pub tags: Vec<Tag>,
    pub card_types: Vec<CardKind>,
    pub resources: Vec<ResourceKind>,
    pub standard_projects: Vec<StandardProject>,
    pub required_original_cost: Option<CostRange>,
}

impl Selector {
    pub fn tags(tags: impl IntoIterator<Item = Tag>) -> Self {
        Self {
            tags: tags.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn card_types(kinds: impl IntoIterator<Item = CardKind>) -> Self {
        Self {
            card_types: kinds.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn resources(resources: impl IntoIterator<Item = ResourceKind>) -> Self {
        Self {
            resources: resources.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn standard_projects(projects: impl IntoIterator<Item = StandardProject>) -> Self {
        Self {
            standard_projects: projects.into_iter().collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_cost(mut self, range: CostRange) -> Self {
        self.required_original_cost = Some(range);
        self
    }

    /// Whether the selector carries any criterion that can match a card.
    pub fn has_card_criteria(&self) -> bool {
        !self.tags.is_empty() || !self.card_types.is_empty() || self.required_original_cost.is_some()
    }
}

/// "per N of X" multiplier.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Per {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: ResourceKind,
    pub amount: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub location: Option<Location>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub target: Option<Target>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tag: Option<Tag>,
}

impl Per {
    pub const fn new(kind: ResourceKind, amount: i32) -> Self {
        Self {
            kind,
            amount,
            location: None,
            target: None,
            tag: None,
        }
    }

    pub const fn tag(tag: Tag, amount: i32) -> Self {
        Self {
            kind: ResourceKind::Tag,
            amount,
            location: None,
            target: None,
            tag: Some(tag),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaled_amount_uses_whole_multiples() {
        let effect = ResourceEffect::new(ResourceKind::Credits, 2).with_per(Per::tag(Tag::Earth, 2));
        assert_eq!(effect.scaled_amount(5), 4);
        assert_eq!(effect.scaled_amount(1), 0);
    }

    #[test]
    fn scaled_amount_respects_max_trigger() {
        let effect = ResourceEffect::new(ResourceKind::Plants, 1)
            .with_per(Per::new(ResourceKind::CityTile, 1))
            .with_max_trigger(3);
        assert_eq!(effect.scaled_amount(7), 3);
    }

    #[test]
    fn plain_effect_ignores_count() {
        let effect = ResourceEffect::new(ResourceKind::Heat, 3);
        assert_eq!(effect.scaled_amount(100), 3);
    }
}
