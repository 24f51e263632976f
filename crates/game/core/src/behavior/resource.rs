//! Resource kinds referenced by behavior inputs and outputs.
//!
//! [`ResourceKind`] is the wire-level vocabulary of the card data. Every kind is
//! mapped to an [`EffectCategory`] by [`ResourceKind::category`], which is the
//! single dispatch table used by the effect applier and the `per` counter.

use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::state::{GlobalParameter, TileKind};

/// The six basic player resources.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, EnumIter, AsRefStr,
)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum BasicResource {
    Credits,
    Steel,
    Titanium,
    Plants,
    Energy,
    Heat,
}

impl BasicResource {
    /// Lowest production value allowed for this resource.
    pub const fn production_floor(self) -> i32 {
        match self {
            Self::Credits => crate::GameConfig::CREDITS_PRODUCTION_FLOOR,
            _ => crate::GameConfig::PRODUCTION_FLOOR,
        }
    }

    pub const fn as_resource_kind(self) -> ResourceKind {
        match self {
            Self::Credits => ResourceKind::Credits,
            Self::Steel => ResourceKind::Steel,
            Self::Titanium => ResourceKind::Titanium,
            Self::Plants => ResourceKind::Plants,
            Self::Energy => ResourceKind::Energy,
            Self::Heat => ResourceKind::Heat,
        }
    }
}

/// Every resource kind that can appear in a behavior, requirement or `per`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ResourceKind {
    Credits,
    Steel,
    Titanium,
    Plants,
    Energy,
    Heat,

    CreditsProduction,
    SteelProduction,
    TitaniumProduction,
    PlantsProduction,
    EnergyProduction,
    HeatProduction,

    #[strum(serialize = "tr")]
    #[cfg_attr(feature = "serde", serde(rename = "tr"))]
    TerraformRating,

    Temperature,
    Oxygen,
    Oceans,

    CityPlacement,
    GreeneryPlacement,
    OceanPlacement,

    CityTile,
    GreeneryTile,
    OceanTile,

    PaymentSubstitute,
    ValueModifier,
    Discount,

    Animals,
    Microbes,
    Floaters,
    Science,

    CardDraw,
    CardPeek,
    CardTake,
    CardBuy,

    /// Tag count, used by `per` clauses together with `Per::tag`.
    Tag,

    /// Any kind this build does not understand. Effects of this kind are
    /// logged and skipped.
    #[cfg_attr(feature = "serde", serde(other))]
    Unknown,
}

/// How an effect of a given [`ResourceKind`] is applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectCategory {
    Resource(BasicResource),
    Production(BasicResource),
    TerraformRating,
    GlobalParameter(GlobalParameter),
    TilePlacement(TileKind),
    TileCount(TileKind),
    PaymentSubstitute,
    ValueModifier,
    Discount,
    CardStorage,
    CardDraw,
    CardSelection,
    TagCount,
    Unknown,
}

impl ResourceKind {
    pub const fn category(self) -> EffectCategory {
        use BasicResource as B;
        use EffectCategory as C;

        match self {
            Self::Credits => C::Resource(B::Credits),
            Self::Steel => C::Resource(B::Steel),
            Self::Titanium => C::Resource(B::Titanium),
            Self::Plants => C::Resource(B::Plants),
            Self::Energy => C::Resource(B::Energy),
            Self::Heat => C::Resource(B::Heat),
            Self::CreditsProduction => C::Production(B::Credits),
            Self::SteelProduction => C::Production(B::Steel),
            Self::TitaniumProduction => C::Production(B::Titanium),
            Self::PlantsProduction => C::Production(B::Plants),
            Self::EnergyProduction => C::Production(B::Energy),
            Self::HeatProduction => C::Production(B::Heat),
            Self::TerraformRating => C::TerraformRating,
            Self::Temperature => C::GlobalParameter(GlobalParameter::Temperature),
            Self::Oxygen => C::GlobalParameter(GlobalParameter::Oxygen),
            Self::Oceans => C::GlobalParameter(GlobalParameter::Oceans),
            Self::CityPlacement => C::TilePlacement(TileKind::City),
            Self::GreeneryPlacement => C::TilePlacement(TileKind::Greenery),
            Self::OceanPlacement => C::TilePlacement(TileKind::Ocean),
            Self::CityTile => C::TileCount(TileKind::City),
            Self::GreeneryTile => C::TileCount(TileKind::Greenery),
            Self::OceanTile => C::TileCount(TileKind::Ocean),
            Self::PaymentSubstitute => C::PaymentSubstitute,
            Self::ValueModifier => C::ValueModifier,
            Self::Discount => C::Discount,
            Self::Animals | Self::Microbes | Self::Floaters | Self::Science => C::CardStorage,
            Self::CardDraw => C::CardDraw,
            Self::CardPeek | Self::CardTake | Self::CardBuy => C::CardSelection,
            Self::Tag => C::TagCount,
            Self::Unknown => C::Unknown,
        }
    }

    /// Parses a wire name, falling back to [`ResourceKind::Unknown`].
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or(Self::Unknown)
    }

    /// Returns the basic resource for plain resource kinds.
    pub const fn basic(self) -> Option<BasicResource> {
        match self.category() {
            EffectCategory::Resource(resource) => Some(resource),
            _ => None,
        }
    }

    /// Returns the basic resource for production kinds.
    pub const fn production(self) -> Option<BasicResource> {
        match self.category() {
            EffectCategory::Production(resource) => Some(resource),
            _ => None,
        }
    }
}

/// Who an effect applies to, or which players a reactive condition listens for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Target {
    #[default]
    SelfPlayer,
    SelfCard,
    AnyPlayer,
    Opponent,
    AnyCard,
    StealAnyPlayer,
    StealFromAnyCard,
    None,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_kinds_map_to_basic_resource() {
        assert_eq!(
            ResourceKind::HeatProduction.production(),
            Some(BasicResource::Heat)
        );
        assert_eq!(ResourceKind::HeatProduction.basic(), None);
        assert_eq!(ResourceKind::Steel.basic(), Some(BasicResource::Steel));
    }

    #[test]
    fn placement_and_tile_kinds_are_distinct_categories() {
        assert_eq!(
            ResourceKind::CityPlacement.category(),
            EffectCategory::TilePlacement(TileKind::City)
        );
        assert_eq!(
            ResourceKind::CityTile.category(),
            EffectCategory::TileCount(TileKind::City)
        );
    }

    #[test]
    fn unrecognized_names_parse_as_unknown() {
        assert_eq!(
            ResourceKind::from_name("global-parameter-lenience"),
            ResourceKind::Unknown
        );
        assert_eq!("tr".parse::<ResourceKind>().ok(), Some(ResourceKind::TerraformRating));
    }

    #[test]
    fn credits_production_floor_is_below_zero() {
        assert_eq!(BasicResource::Credits.production_floor(), -5);
        assert_eq!(BasicResource::Plants.production_floor(), 0);
    }
}
