//! A single card behavior bound to a domain event.

use terraform_core::{
    CardId, ConditionKind, GameId, PlayerId, ResourceEffect, Target, TileKind, TriggerCondition,
};
use tracing::{debug, error, info};

use crate::effects::{EffectApplier, EffectContext};
use crate::events::{CardPlayed, PlacementBonusGained, TilePlaced};

/// Outcome of matching an event against a condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Firing {
    /// Player who caused the event, if the event names one.
    pub player: Option<PlayerId>,
    /// How many times the outputs apply.
    pub times: usize,
}

impl Firing {
    pub(super) fn once(player: Option<PlayerId>) -> Self {
        Self { player, times: 1 }
    }
}

/// Everything a handler needs, captured at subscription time.
pub(super) struct ReactiveEffect {
    pub game: GameId,
    pub owner: PlayerId,
    pub card_id: CardId,
    pub card_name: String,
    pub behavior_index: usize,
    pub condition: TriggerCondition,
    pub outputs: Vec<ResourceEffect>,
}

impl ReactiveEffect {
    /// Whose events the condition listens for. Only an explicit condition
    /// target narrows it; events without a player always pass.
    pub(super) fn accepts(&self, player: Option<&PlayerId>) -> bool {
        let (Some(player), Some(target)) = (player, self.condition.target) else {
            return true;
        };
        match target {
            Target::SelfPlayer => player == &self.owner,
            Target::Opponent => player != &self.owner,
            _ => true,
        }
    }

    /// Outputs that apply for an event caused by `player`. A `self-player`
    /// output needs the owner to be the cause; every other output applies.
    pub(super) fn outputs_for(&self, player: Option<&PlayerId>) -> Vec<ResourceEffect> {
        self.outputs
            .iter()
            .filter(|output| {
                output.target != Target::SelfPlayer
                    || player.is_none_or(|player| player == &self.owner)
            })
            .cloned()
            .collect()
    }

    pub(super) fn fire(&self, applier: &EffectApplier, firing: Firing) {
        if !self.accepts(firing.player.as_ref()) {
            return;
        }
        let outputs = self.outputs_for(firing.player.as_ref());
        if outputs.is_empty() {
            debug!(
                target: "runtime::subscriber",
                game = %self.game,
                player = %self.owner,
                card = %self.card_id,
                caused_by = ?firing.player,
                "passive effect skipped, outputs are owner-only"
            );
            return;
        }

        let ctx = EffectContext::for_player(&self.game, &self.owner, self.card_name.clone())
            .with_source_card(self.card_id.clone());
        for _ in 0..firing.times {
            if let Err(err) = applier.apply_outputs(&ctx, &outputs) {
                error!(
                    target: "runtime::subscriber",
                    game = %self.game,
                    player = %self.owner,
                    card = %self.card_id,
                    behavior = self.behavior_index,
                    error = %err,
                    "passive effect failed"
                );
                return;
            }
        }

        info!(
            target: "runtime::subscriber",
            game = %self.game,
            player = %self.owner,
            card = %self.card_id,
            condition = %self.condition.kind,
            times = firing.times,
            "passive effect triggered"
        );
    }

    pub(super) fn match_tile(&self, event: &TilePlaced) -> Option<Firing> {
        let wanted = match self.condition.kind {
            ConditionKind::CityPlaced => Some(TileKind::City),
            ConditionKind::GreeneryPlaced => Some(TileKind::Greenery),
            _ => None,
        };
        if wanted.is_some_and(|tile| tile != event.tile) {
            return None;
        }
        Some(Firing::once(Some(event.player_id.clone())))
    }

    /// Fires when any gained bonus is one of the affected resources. An
    /// empty filter accepts every bonus.
    pub(super) fn match_bonus(&self, event: &PlacementBonusGained) -> Option<Firing> {
        let affected = &self.condition.affected_resources;
        let hit = event
            .bonuses
            .iter()
            .any(|bonus| affected.is_empty() || affected.contains(&bonus.resource));
        hit.then(|| Firing::once(Some(event.player_id.clone())))
    }

    pub(super) fn match_card(&self, event: &CardPlayed) -> Option<Firing> {
        let condition = &self.condition;
        if !condition.affected_card_types.is_empty()
            && !condition.affected_card_types.contains(&event.card_kind)
        {
            return None;
        }
        if !condition.affected_tags.is_empty()
            && !event.tags.iter().any(|tag| condition.affected_tags.contains(tag))
        {
            return None;
        }
        if let Some(range) = condition.required_original_cost
            && !range.contains(event.cost)
        {
            return None;
        }
        Some(Firing::once(Some(event.player_id.clone())))
    }

    /// Fires once per printed tag in the affected set.
    pub(super) fn match_tags(&self, event: &CardPlayed) -> Option<Firing> {
        let times = event
            .tags
            .iter()
            .filter(|tag| self.condition.affected_tags.contains(*tag))
            .count();
        (times > 0).then(|| Firing {
            player: Some(event.player_id.clone()),
            times,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use terraform_core::{CardKind, CostRange, HexCoordinate, ResourceKind, Tag, TileBonus};

    use super::*;

    fn create_test_effect(condition: TriggerCondition) -> ReactiveEffect {
        ReactiveEffect {
            game: "g1".into(),
            owner: "owner".into(),
            card_id: "card".into(),
            card_name: "Card".into(),
            behavior_index: 0,
            condition,
            outputs: Vec::new(),
        }
    }

    fn card_event(kind: CardKind, tags: Vec<Tag>, cost: i32) -> CardPlayed {
        CardPlayed {
            game_id: "g1".into(),
            player_id: "owner".into(),
            card_id: "played".into(),
            card_name: "Played".into(),
            card_kind: kind,
            tags,
            cost,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn condition_target_narrows_only_when_set() {
        let open = create_test_effect(TriggerCondition::new(ConditionKind::TemperatureRaise));
        assert!(open.accepts(Some(&"owner".into())));
        assert!(open.accepts(Some(&"rival".into())));
        assert!(open.accepts(None));

        let owner_only = create_test_effect(
            TriggerCondition::new(ConditionKind::TemperatureRaise).with_target(Target::SelfPlayer),
        );
        assert!(owner_only.accepts(Some(&"owner".into())));
        assert!(!owner_only.accepts(Some(&"rival".into())));

        let opponent = create_test_effect(
            TriggerCondition::new(ConditionKind::CityPlaced).with_target(Target::Opponent),
        );
        assert!(!opponent.accepts(Some(&"owner".into())));
        assert!(opponent.accepts(Some(&"rival".into())));
    }

    #[test]
    fn self_player_outputs_need_the_owner_as_cause() {
        let mut effect = create_test_effect(
            TriggerCondition::new(ConditionKind::CityPlaced).with_target(Target::AnyPlayer),
        );
        effect.outputs = vec![
            ResourceEffect::new(ResourceKind::Credits, 2),
            ResourceEffect::new(ResourceKind::CreditsProduction, 1).with_target(Target::None),
        ];

        assert_eq!(effect.outputs_for(Some(&"owner".into())).len(), 2);
        assert_eq!(effect.outputs_for(None).len(), 2);
        let rival = effect.outputs_for(Some(&"rival".into()));
        assert_eq!(rival.len(), 1);
        assert_eq!(rival[0].kind, ResourceKind::CreditsProduction);
    }

    #[test]
    fn city_condition_ignores_other_tiles() {
        let effect = create_test_effect(TriggerCondition::new(ConditionKind::CityPlaced));
        let mut event = TilePlaced {
            game_id: "g1".into(),
            player_id: "owner".into(),
            tile: TileKind::Greenery,
            coordinate: HexCoordinate::new(0, 0),
            timestamp: Utc::now(),
        };
        assert!(effect.match_tile(&event).is_none());
        event.tile = TileKind::City;
        assert!(effect.match_tile(&event).is_some());
    }

    #[test]
    fn bonus_condition_checks_affected_resources() {
        let effect = create_test_effect(
            TriggerCondition::new(ConditionKind::PlacementBonusGained)
                .with_affected_resources(vec![ResourceKind::Steel, ResourceKind::Titanium]),
        );
        let event = |resource: ResourceKind| PlacementBonusGained {
            game_id: "g1".into(),
            player_id: "owner".into(),
            bonuses: vec![TileBonus {
                resource,
                amount: 2,
            }],
            coordinate: HexCoordinate::new(0, 0),
            timestamp: Utc::now(),
        };
        assert!(effect.match_bonus(&event(ResourceKind::Plants)).is_none());
        assert!(effect.match_bonus(&event(ResourceKind::Titanium)).is_some());
    }

    #[test]
    fn card_condition_applies_type_tag_and_cost_filters() {
        let mut condition = TriggerCondition::new(ConditionKind::CardPlayed)
            .with_affected_card_types(vec![CardKind::Event]);
        condition.required_original_cost = Some(CostRange::new(Some(20), None));
        let effect = create_test_effect(condition);

        assert!(effect.match_card(&card_event(CardKind::Event, vec![], 25)).is_some());
        assert!(effect.match_card(&card_event(CardKind::Event, vec![], 10)).is_none());
        assert!(effect.match_card(&card_event(CardKind::Automated, vec![], 25)).is_none());
    }

    #[test]
    fn tag_condition_fires_per_matching_tag() {
        let effect = create_test_effect(
            TriggerCondition::new(ConditionKind::TagPlayed).with_affected_tags(vec![Tag::Science]),
        );
        let firing = effect
            .match_tags(&card_event(CardKind::Automated, vec![Tag::Science, Tag::Science], 5))
            .unwrap();
        assert_eq!(firing.times, 2);
        assert!(effect
            .match_tags(&card_event(CardKind::Automated, vec![Tag::Earth], 5))
            .is_none());
    }
}
