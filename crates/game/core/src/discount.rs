//! Discount and selector evaluation.
//!
//! Discounts are `discount` outputs on static passive effects. Each output's
//! selectors decide what it applies to:
//! - no selectors: every card
//! - card selectors: the card must match at least one selector, and within a
//!   selector every specified criterion (tags, card types, cost range)
//! - standard-project selectors: only the named projects, never cards
//!
//! Amounts for the same target are summed, so the result does not depend on
//! the order of the player's effects.

use std::collections::BTreeMap;

use crate::behavior::{BasicResource, Selector};
use crate::card::Card;
use crate::project::StandardProject;
use crate::state::PlayerEffect;

impl Selector {
    /// AND of every criterion this selector specifies.
    ///
    /// A selector without card criteria never matches a card.
    pub fn matches_card(&self, card: &Card) -> bool {
        if !self.has_card_criteria() {
            return false;
        }
        let tags_match = self.tags.iter().all(|tag| card.has_tag(*tag));
        let kind_match = self.card_types.is_empty() || self.card_types.contains(&card.kind);
        let cost_match = self
            .required_original_cost
            .is_none_or(|range| range.contains(card.cost));
        tags_match && kind_match && cost_match
    }

    pub fn matches_project(&self, project: StandardProject) -> bool {
        self.standard_projects.contains(&project)
    }
}

/// OR across selectors.
pub fn matches_any_selector(selectors: &[Selector], card: &Card) -> bool {
    selectors.iter().any(|selector| selector.matches_card(card))
}

/// Total credit discount granted to `card` by the player's passive effects.
pub fn card_discount(effects: &[PlayerEffect], card: &Card) -> i32 {
    effects
        .iter()
        .filter(|effect| effect.behavior.is_static_passive())
        .flat_map(|effect| effect.behavior.discount_outputs())
        .filter(|output| output.selectors.is_empty() || matches_any_selector(&output.selectors, card))
        .map(|output| output.amount)
        .sum()
}

/// Discounts granted to a standard project, per paying resource.
///
/// The paying resource comes from the selector's `resources` list and
/// defaults to credits.
pub fn project_discount(
    effects: &[PlayerEffect],
    project: StandardProject,
) -> BTreeMap<BasicResource, i32> {
    let mut discounts = BTreeMap::new();

    let outputs = effects
        .iter()
        .filter(|effect| effect.behavior.is_static_passive())
        .flat_map(|effect| effect.behavior.discount_outputs());

    for output in outputs {
        for selector in output
            .selectors
            .iter()
            .filter(|selector| selector.matches_project(project))
        {
            let resource = selector
                .resources
                .iter()
                .find_map(|kind| kind.basic())
                .unwrap_or(BasicResource::Credits);
            *discounts.entry(resource).or_insert(0) += output.amount;
        }
    }

    discounts
}

/// Cost after discounts; never negative.
pub const fn effective_cost(cost: i32, discount: i32) -> i32 {
    let cost = cost - discount;
    if cost < 0 { 0 } else { cost }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::{Behavior, CostRange, ResourceEffect, ResourceKind, Trigger};
    use crate::card::{CardKind, Tag};

    fn create_test_effect(card: &str, output: ResourceEffect) -> PlayerEffect {
        PlayerEffect {
            card_id: card.into(),
            card_name: card.to_owned(),
            behavior_index: 0,
            behavior: Behavior::new(Trigger::auto()).with_output(output),
        }
    }

    fn discount(amount: i32) -> ResourceEffect {
        ResourceEffect::new(ResourceKind::Discount, amount)
    }

    fn create_test_card(tags: &[Tag], cost: i32) -> Card {
        Card::new("target", "Target", CardKind::Automated, cost).with_tags(tags.iter().copied())
    }

    #[test]
    fn selector_requires_all_tags() {
        let selector = Selector::tags([Tag::Space, Tag::Jovian]);

        assert!(selector.matches_card(&create_test_card(&[Tag::Space, Tag::Jovian], 10)));
        assert!(!selector.matches_card(&create_test_card(&[Tag::Space], 10)));
    }

    #[test]
    fn selector_combines_tag_and_cost_with_and() {
        let selector = Selector::tags([Tag::Building]).with_cost(CostRange::new(Some(20), None));

        assert!(selector.matches_card(&create_test_card(&[Tag::Building], 25)));
        assert!(!selector.matches_card(&create_test_card(&[Tag::Building], 12)));
        assert!(!selector.matches_card(&create_test_card(&[Tag::Space], 25)));
    }

    #[test]
    fn empty_selector_never_matches_cards() {
        assert!(!Selector::default().matches_card(&create_test_card(&[Tag::Space], 5)));
        assert!(
            !Selector::standard_projects([StandardProject::City])
                .matches_card(&create_test_card(&[Tag::City], 5))
        );
    }

    #[test]
    fn card_discount_sums_global_and_matching_effects() {
        let effects = vec![
            create_test_effect("earth-office", discount(3).with_selector(Selector::tags([Tag::Earth]))),
            create_test_effect("global", discount(1)),
            create_test_effect("space", discount(2).with_selector(Selector::tags([Tag::Space]))),
            create_test_effect(
                "projects",
                discount(5).with_selector(Selector::standard_projects([StandardProject::City])),
            ),
        ];

        let card = create_test_card(&[Tag::Earth, Tag::Space], 20);
        assert_eq!(card_discount(&effects, &card), 6);

        let other = create_test_card(&[Tag::Plant], 20);
        assert_eq!(card_discount(&effects, &other), 1);
    }

    #[test]
    fn card_discount_is_order_independent() {
        let mut effects = vec![
            create_test_effect("a", discount(2).with_selector(Selector::tags([Tag::Science]))),
            create_test_effect("b", discount(1)),
            create_test_effect(
                "c",
                discount(4).with_selector(Selector::card_types([CardKind::Automated])),
            ),
        ];
        let card = create_test_card(&[Tag::Science], 15);
        let forward = card_discount(&effects, &card);

        effects.reverse();
        assert_eq!(card_discount(&effects, &card), forward);
        effects.rotate_left(1);
        assert_eq!(card_discount(&effects, &card), forward);
        assert_eq!(forward, 7);
    }

    #[test]
    fn reactive_effects_do_not_discount() {
        use crate::behavior::{ConditionKind, TriggerCondition};

        let effect = PlayerEffect {
            card_id: "r".into(),
            card_name: "r".to_owned(),
            behavior_index: 0,
            behavior: Behavior::new(Trigger::on(TriggerCondition::new(ConditionKind::CardPlayed)))
                .with_output(discount(9)),
        };
        assert_eq!(card_discount(&[effect], &create_test_card(&[], 10)), 0);
    }

    #[test]
    fn project_discount_defaults_to_credits() {
        let effects = vec![
            create_test_effect(
                "a",
                discount(4).with_selector(Selector::standard_projects([StandardProject::City])),
            ),
            create_test_effect(
                "b",
                discount(2).with_selector(Selector {
                    standard_projects: vec![StandardProject::City, StandardProject::Greenery],
                    resources: vec![ResourceKind::Plants],
                    ..Selector::default()
                }),
            ),
        ];

        let city = project_discount(&effects, StandardProject::City);
        assert_eq!(city.get(&BasicResource::Credits), Some(&4));
        assert_eq!(city.get(&BasicResource::Plants), Some(&2));

        let greenery = project_discount(&effects, StandardProject::Greenery);
        assert_eq!(greenery.get(&BasicResource::Credits), None);
        assert!(project_discount(&effects, StandardProject::Aquifer).is_empty());
    }

    #[test]
    fn effective_cost_never_negative() {
        assert_eq!(effective_cost(10, 3), 7);
        assert_eq!(effective_cost(2, 5), 0);
    }
}
