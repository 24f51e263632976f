//! Card play requirements.

use std::collections::BTreeMap;

use crate::card::{Card, CardKind, Requirement, RequirementKind, Tag};
use crate::env::CardOracle;
use crate::error::{ErrorSeverity, GameError};
use crate::state::{GameState, GlobalParameter, PlayerState, TileKind};

/// Tags on a player's tableau (played cards plus corporation).
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct TagCounts {
    counts: BTreeMap<Tag, i32>,
}

impl TagCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cards<'a>(cards: impl IntoIterator<Item = &'a Card>) -> Self {
        let mut counts = Self::new();
        for card in cards {
            counts.add_card(card);
        }
        counts
    }

    /// Tags of the player's corporation and played cards. A played event
    /// only keeps its event tag.
    pub fn for_tableau(player: &PlayerState, cards: &dyn CardOracle) -> Self {
        let mut counts = Self::new();
        let tableau = player.corporation.iter().chain(player.played_cards.iter());
        for card in tableau.filter_map(|id| cards.card(id)) {
            if card.kind == CardKind::Event {
                let events = card.tags.iter().filter(|tag| **tag == Tag::Event).count() as i32;
                if events > 0 {
                    *counts.counts.entry(Tag::Event).or_insert(0) += events;
                }
            } else {
                counts.add_card(&card);
            }
        }
        counts
    }

    pub fn add_card(&mut self, card: &Card) {
        for tag in &card.tags {
            *self.counts.entry(*tag).or_insert(0) += 1;
        }
    }

    /// Printed tags only.
    pub fn exact(&self, tag: Tag) -> i32 {
        self.counts.get(&tag).copied().unwrap_or(0)
    }

    /// Printed tags plus wild tags, which count toward every tag.
    pub fn count(&self, tag: Tag) -> i32 {
        if tag == Tag::Wild {
            return self.exact(Tag::Wild);
        }
        self.exact(tag) + self.exact(Tag::Wild)
    }
}

/// One failed requirement.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RequirementError {
    pub kind: RequirementKind,
    pub message: String,
    pub required: i32,
    pub current: i32,
}

impl GameError for RequirementError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        "REQUIREMENT_NOT_MET"
    }
}

impl Requirement {
    /// Whether [`validate_requirements`] can evaluate this requirement.
    ///
    /// Venus requirements, unknown kinds, and tag/resource requirements
    /// missing their subject are skipped.
    pub fn is_evaluable(&self) -> bool {
        match self.kind {
            RequirementKind::Venus | RequirementKind::Unknown => false,
            RequirementKind::Tags => self.tag.is_some(),
            RequirementKind::Production => self
                .resource
                .is_some_and(|kind| kind.production().or(kind.basic()).is_some()),
            RequirementKind::Resource => self.resource.is_some_and(|kind| kind.basic().is_some()),
            _ => true,
        }
    }

    fn current_value(&self, game: &GameState, player: &PlayerState, tags: &TagCounts) -> Option<i32> {
        let params = &game.global_parameters;
        let value = match self.kind {
            RequirementKind::Temperature => params.get(GlobalParameter::Temperature),
            RequirementKind::Oxygen => params.get(GlobalParameter::Oxygen),
            RequirementKind::Oceans => params.get(GlobalParameter::Oceans),
            RequirementKind::TerraformRating => player.terraform_rating,
            RequirementKind::Tags => tags.count(self.tag?),
            RequirementKind::Production => {
                let kind = self.resource?;
                player.production.get(kind.production().or(kind.basic())?)
            }
            RequirementKind::Resource => player.resources.get(self.resource?.basic()?),
            RequirementKind::Cities => game.board.count(TileKind::City, Some(&player.id)),
            RequirementKind::Greeneries => game.board.count(TileKind::Greenery, Some(&player.id)),
            RequirementKind::Venus | RequirementKind::Unknown => return None,
        };
        Some(value)
    }

    fn subject(&self) -> String {
        match (self.kind, self.tag, self.resource) {
            (RequirementKind::Tags, Some(tag), _) => format!("{tag} tags"),
            (RequirementKind::Production, _, Some(kind)) => format!("{kind} production"),
            (RequirementKind::Resource, _, Some(kind)) => kind.to_string(),
            (kind, _, _) => kind.to_string(),
        }
    }
}

/// Evaluates every requirement of `card` and returns all failures.
///
/// An empty result means the card is playable as far as requirements go.
/// Requirements with neither bound are no-ops.
pub fn validate_requirements(
    card: &Card,
    game: &GameState,
    player: &PlayerState,
    tags: &TagCounts,
) -> Vec<RequirementError> {
    let mut errors = Vec::new();

    for requirement in &card.requirements {
        if requirement.min.is_none() && requirement.max.is_none() {
            continue;
        }
        let Some(current) = requirement.current_value(game, player, tags) else {
            continue;
        };

        if let Some(min) = requirement.min
            && current < min
        {
            errors.push(RequirementError {
                kind: requirement.kind,
                message: format!(
                    "{} too low: need at least {min}, current {current}",
                    requirement.subject()
                ),
                required: min,
                current,
            });
        }
        if let Some(max) = requirement.max
            && current > max
        {
            errors.push(RequirementError {
                kind: requirement.kind,
                message: format!(
                    "{} too high: at most {max} allowed, current {current}",
                    requirement.subject()
                ),
                required: max,
                current,
            });
        }
    }

    errors
}
