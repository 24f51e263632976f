//! Standard projects: the fixed menu of actions available to every player.

use strum::{AsRefStr, Display, EnumIter, EnumString};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum StandardProject {
    SellPatents,
    PowerPlant,
    Asteroid,
    Aquifer,
    Greenery,
    City,
    /// Plant conversion, offered next to the projects.
    ConvertPlantsToGreenery,
    /// Heat conversion, offered next to the projects.
    ConvertHeatToTemperature,
}

impl StandardProject {
    /// Base credit cost before discounts.
    pub const fn base_cost(self) -> i32 {
        match self {
            Self::SellPatents => 0,
            Self::PowerPlant => 11,
            Self::Asteroid => 14,
            Self::Aquifer => 18,
            Self::Greenery => 23,
            Self::City => 25,
            Self::ConvertPlantsToGreenery | Self::ConvertHeatToTemperature => 0,
        }
    }
}
