//! Immutable card catalog entries.

use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::behavior::{Behavior, Per, ResourceKind};
use crate::ids::CardId;
use crate::state::ResourceSet;

/// Card colour / lifecycle class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum CardKind {
    Automated,
    Active,
    Event,
    Corporation,
    Prelude,
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, EnumIter, AsRefStr,
)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Tag {
    Space,
    Earth,
    Science,
    Power,
    Building,
    Microbe,
    Animal,
    Plant,
    Event,
    City,
    Venus,
    Jovian,
    Wild,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum RequirementKind {
    Temperature,
    Oxygen,
    Oceans,
    Venus,
    Cities,
    Greeneries,
    Tags,
    Production,
    #[strum(serialize = "tr")]
    #[cfg_attr(feature = "serde", serde(rename = "tr"))]
    TerraformRating,
    Resource,
    #[cfg_attr(feature = "serde", serde(other))]
    Unknown,
}

/// A play condition with optional inclusive bounds.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Requirement {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: RequirementKind,
    #[cfg_attr(feature = "serde", serde(default))]
    pub min: Option<i32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub max: Option<i32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tag: Option<Tag>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub resource: Option<ResourceKind>,
}

impl Requirement {
    pub const fn new(kind: RequirementKind) -> Self {
        Self {
            kind,
            min: None,
            max: None,
            tag: None,
            resource: None,
        }
    }

    pub const fn min(kind: RequirementKind, min: i32) -> Self {
        Self {
            min: Some(min),
            ..Self::new(kind)
        }
    }

    pub const fn max(kind: RequirementKind, max: i32) -> Self {
        Self {
            max: Some(max),
            ..Self::new(kind)
        }
    }

    #[must_use]
    pub const fn with_tag(mut self, tag: Tag) -> Self {
        self.tag = Some(tag);
        self
    }

    #[must_use]
    pub const fn with_resource(mut self, resource: ResourceKind) -> Self {
        self.resource = Some(resource);
        self
    }
}

/// Resource slot on cards that hold animals, microbes, floaters, ...
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceStorage {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub resource: ResourceKind,
    #[cfg_attr(feature = "serde", serde(default))]
    pub starting: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum VictoryPointKind {
    Fixed,
    Per,
    Once,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct VictoryPointCondition {
    pub amount: i32,
    pub condition: VictoryPointKind,
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_trigger: Option<i32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub per: Option<Per>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Card {
    pub id: CardId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: CardKind,
    #[cfg_attr(feature = "serde", serde(default))]
    pub cost: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tags: Vec<Tag>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub requirements: Vec<Requirement>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub behaviors: Vec<Behavior>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub resource_storage: Option<ResourceStorage>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub vp_conditions: Vec<VictoryPointCondition>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub starting_resources: Option<ResourceSet>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub starting_production: Option<ResourceSet>,
}

impl Card {
    pub fn new(id: impl Into<CardId>, name: impl Into<String>, kind: CardKind, cost: i32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            cost,
            tags: Vec::new(),
            requirements: Vec::new(),
            behaviors: Vec::new(),
            resource_storage: None,
            vp_conditions: Vec::new(),
            starting_resources: None,
            starting_production: None,
        }
    }

    #[must_use]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = Tag>) -> Self {
        self.tags.extend(tags);
        self
    }

    #[must_use]
    pub fn with_requirement(mut self, requirement: Requirement) -> Self {
        self.requirements.push(requirement);
        self
    }

    #[must_use]
    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behaviors.push(behavior);
        self
    }

    #[must_use]
    pub fn with_storage(mut self, resource: ResourceKind, starting: i32) -> Self {
        self.resource_storage = Some(ResourceStorage { resource, starting });
        self
    }

    #[must_use]
    pub fn with_starting_resources(mut self, resources: ResourceSet) -> Self {
        self.starting_resources = Some(resources);
        self
    }

    #[must_use]
    pub fn with_starting_production(mut self, production: ResourceSet) -> Self {
        self.starting_production = Some(production);
        self
    }

    pub fn has_tag(&self, tag: Tag) -> bool {
        self.tags.contains(&tag)
    }

    /// Number of printed occurrences of `tag` (wild tags not included).
    pub fn tag_count(&self, tag: Tag) -> i32 {
        self.tags.iter().filter(|t| **t == tag).count() as i32
    }

    pub fn is_corporation(&self) -> bool {
        self.kind == CardKind::Corporation
    }
}
