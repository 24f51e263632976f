//! Global terraforming parameters.

use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::config::GameConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum GlobalParameter {
    Temperature,
    Oxygen,
    Oceans,
}

impl GlobalParameter {
    /// Raw units moved by a single step.
    pub const fn step_size(self) -> i32 {
        match self {
            Self::Temperature => GameConfig::TEMPERATURE_STEP,
            Self::Oxygen | Self::Oceans => 1,
        }
    }

    pub const fn min(self) -> i32 {
        match self {
            Self::Temperature => GameConfig::MIN_TEMPERATURE,
            Self::Oxygen => GameConfig::MIN_OXYGEN,
            Self::Oceans => GameConfig::MIN_OCEANS,
        }
    }

    pub const fn max(self) -> i32 {
        match self {
            Self::Temperature => GameConfig::MAX_TEMPERATURE,
            Self::Oxygen => GameConfig::MAX_OXYGEN,
            Self::Oceans => GameConfig::MAX_OCEANS,
        }
    }
}

/// Result of raising a parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParameterChange {
    pub parameter: GlobalParameter,
    pub old: i32,
    pub new: i32,
    /// Steps actually applied after clamping at the ceiling.
    pub steps: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GlobalParameters {
    pub temperature: i32,
    pub oxygen: i32,
    pub oceans: i32,
}

impl GlobalParameters {
    pub const fn new() -> Self {
        Self {
            temperature: GameConfig::MIN_TEMPERATURE,
            oxygen: GameConfig::MIN_OXYGEN,
            oceans: GameConfig::MIN_OCEANS,
        }
    }

    pub const fn get(&self, parameter: GlobalParameter) -> i32 {
        match parameter {
            GlobalParameter::Temperature => self.temperature,
            GlobalParameter::Oxygen => self.oxygen,
            GlobalParameter::Oceans => self.oceans,
        }
    }

    fn slot(&mut self, parameter: GlobalParameter) -> &mut i32 {
        match parameter {
            GlobalParameter::Temperature => &mut self.temperature,
            GlobalParameter::Oxygen => &mut self.oxygen,
            GlobalParameter::Oceans => &mut self.oceans,
        }
    }

    /// Raises `parameter` by up to `steps` steps.
    ///
    /// The value never exceeds the parameter's ceiling; the returned change
    /// reports how many steps were actually applied. Non-positive requests
    /// are no-ops.
    pub fn increase(&mut self, parameter: GlobalParameter, steps: i32) -> ParameterChange {
        let step = parameter.step_size();
        let slot = self.slot(parameter);
        let old = *slot;
        let new = (old + steps.max(0) * step).min(parameter.max());
        *slot = new;

        ParameterChange {
            parameter,
            old,
            new,
            steps: (new - old) / step,
        }
    }

    pub const fn is_maxed(&self, parameter: GlobalParameter) -> bool {
        self.get(parameter) >= parameter.max()
    }

    /// True once every parameter reached its ceiling, which ends the game.
    pub const fn all_maxed(&self) -> bool {
        self.is_maxed(GlobalParameter::Temperature)
            && self.is_maxed(GlobalParameter::Oxygen)
            && self.is_maxed(GlobalParameter::Oceans)
    }
}

impl Default for GlobalParameters {
    fn default() -> Self {
        Self::new()
    }
}
