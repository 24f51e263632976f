//! Victory points.
//!
//! A player's score is their terraform rating, plus the points printed on
//! their played cards, one point per owned greenery, and one point per
//! greenery next to each city they own.

use crate::behavior::{EffectCategory, Per, Target};
use crate::card::{VictoryPointCondition, VictoryPointKind};
use crate::env::CardOracle;
use crate::ids::{CardId, PlayerId};
use crate::state::{GameState, PlayerState, TileKind};
use crate::validation::TagCounts;

/// Counts what a "per N of X" multiplier refers to.
///
/// `tags` are the tag counts in scope and `card` is the card the multiplier
/// is printed on. Returns `None` for kinds that cannot be counted.
pub fn count_per(
    per: &Per,
    game: &GameState,
    player: &PlayerState,
    tags: &TagCounts,
    card: Option<&CardId>,
) -> Option<i32> {
    let stored = || card.map_or(0, |card| player.storage(card));
    if per.target == Some(Target::SelfCard) {
        return Some(stored());
    }
    if let Some(tag) = per.tag {
        return Some(tags.exact(tag));
    }

    match per.kind.category() {
        EffectCategory::TileCount(TileKind::Ocean) => Some(game.board.count(TileKind::Ocean, None)),
        EffectCategory::TileCount(kind) => {
            let owner = (per.target == Some(Target::SelfPlayer)).then_some(&player.id);
            Some(game.board.count(kind, owner))
        }
        EffectCategory::Resource(resource) => Some(player.resources.get(resource)),
        EffectCategory::Production(resource) => Some(player.production.get(resource)),
        EffectCategory::CardStorage => Some(stored()),
        _ => None,
    }
}

/// Points one condition is worth given the counted amount.
///
/// `count` is only read by `per` conditions.
pub fn condition_points(condition: &VictoryPointCondition, count: i32) -> i32 {
    match condition.condition {
        VictoryPointKind::Fixed | VictoryPointKind::Once => condition.amount,
        VictoryPointKind::Per => {
            let Some(per) = &condition.per else {
                return 0;
            };
            if per.amount <= 0 {
                return 0;
            }
            let mut triggers = count.max(0) / per.amount;
            if let Some(cap) = condition.max_trigger.filter(|cap| *cap >= 0) {
                triggers = triggers.min(cap);
            }
            condition.amount * triggers
        }
    }
}

/// Points earned by one played card.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CardScore {
    pub card_id: CardId,
    pub card_name: String,
    pub points: i32,
}

/// Score breakdown of one player.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VictoryPoints {
    pub terraform_rating: i32,
    pub cards: Vec<CardScore>,
    pub greenery: i32,
    pub city: i32,
}

impl VictoryPoints {
    pub fn card_points(&self) -> i32 {
        self.cards.iter().map(|card| card.points).sum()
    }

    pub fn total(&self) -> i32 {
        self.terraform_rating + self.card_points() + self.greenery + self.city
    }
}

/// Scores `player` on the current board.
pub fn score_player(game: &GameState, player: &PlayerState, cards: &dyn CardOracle) -> VictoryPoints {
    let tags = TagCounts::for_tableau(player, cards);
    let scored = player
        .played_cards
        .iter()
        .filter_map(|id| cards.card(id))
        .filter(|card| !card.vp_conditions.is_empty())
        .map(|card| {
            let points = card
                .vp_conditions
                .iter()
                .map(|condition| {
                    let count = condition
                        .per
                        .as_ref()
                        .and_then(|per| count_per(per, game, player, &tags, Some(&card.id)))
                        .unwrap_or(0);
                    condition_points(condition, count)
                })
                .sum();
            CardScore {
                card_id: card.id,
                card_name: card.name,
                points,
            }
        })
        .collect();

    let owned = |kind: TileKind| {
        game.board
            .tiles
            .iter()
            .filter(move |tile| tile.kind == kind && tile.owner.as_ref() == Some(&player.id))
    };
    let city = owned(TileKind::City)
        .map(|city| {
            game.board
                .tiles
                .iter()
                .filter(|tile| tile.kind == TileKind::Greenery)
                .filter(|tile| tile.coordinate.is_adjacent(&city.coordinate))
                .count() as i32
        })
        .sum();

    VictoryPoints {
        terraform_rating: player.terraform_rating,
        cards: scored,
        greenery: owned(TileKind::Greenery).count() as i32,
        city,
    }
}

/// Scores every player, highest total first. Ties go to the player holding
/// more credits, then to seating order.
pub fn final_standings(
    game: &GameState,
    players: &[PlayerState],
    cards: &dyn CardOracle,
) -> Vec<(PlayerId, VictoryPoints)> {
    let seat = |id: &PlayerId| {
        game.player_order
            .iter()
            .position(|seated| seated == id)
            .unwrap_or(usize::MAX)
    };
    let mut scored: Vec<_> = players
        .iter()
        .map(|player| (player, score_player(game, player, cards)))
        .collect();
    scored.sort_by(|(a, a_points), (b, b_points)| {
        b_points
            .total()
            .cmp(&a_points.total())
            .then(b.resources.credits.cmp(&a.resources.credits))
            .then(seat(&a.id).cmp(&seat(&b.id)))
    });
    scored
        .into_iter()
        .map(|(player, points)| (player.id.clone(), points))
        .collect()
}
