//! Declarative card behaviors.
//!
//! A [`Behavior`] is one rule printed on a card: zero or more [`Trigger`]s,
//! the inputs it costs, the outputs it grants, and optional mutually exclusive
//! [`Choice`]s. Behaviors carry no logic of their own; the runtime decides how
//! to execute them based on the classification helpers defined here.
//!
//! # Classification
//!
//! Only the first trigger decides how a behavior is wired:
//! - `auto` without condition: applied once at play time and kept as a static
//!   passive effect (discounts, substitutes)
//! - `auto` with condition: a standing event subscription
//! - `manual`: a repeatable card action, once per generation
//! - `auto-corporation-*`: handled by the corporation processor

mod effect;
mod resource;
mod trigger;

pub use effect::{Per, ResourceEffect, Selector};
pub use resource::{BasicResource, EffectCategory, ResourceKind, Target};
pub use trigger::{ConditionKind, CostRange, Location, Trigger, TriggerCondition, TriggerKind};

use crate::error::{ErrorSeverity, GameError};

/// A mutually exclusive option bundling extra inputs and outputs.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Choice {
    pub inputs: Vec<ResourceEffect>,
    pub outputs: Vec<ResourceEffect>,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Behavior {
    pub triggers: Vec<Trigger>,
    pub inputs: Vec<ResourceEffect>,
    pub outputs: Vec<ResourceEffect>,
    pub choices: Vec<Choice>,
}

/// Errors raised while resolving a behavior's effect lists.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BehaviorError {
    #[error("behavior requires a choice between {available} options")]
    ChoiceRequired { available: usize },

    #[error("choice {index} is out of range ({available} options)")]
    InvalidChoice { index: usize, available: usize },

    #[error("behavior index {index} is out of range for card with {available} behaviors")]
    InvalidBehaviorIndex { index: usize, available: usize },
}

impl GameError for BehaviorError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::ChoiceRequired { .. } => "BEHAVIOR_CHOICE_REQUIRED",
            Self::InvalidChoice { .. } => "BEHAVIOR_INVALID_CHOICE",
            Self::InvalidBehaviorIndex { .. } => "BEHAVIOR_INVALID_INDEX",
        }
    }
}

impl Behavior {
    pub fn new(trigger: Trigger) -> Self {
        Self {
            triggers: vec![trigger],
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_input(mut self, input: ResourceEffect) -> Self {
        self.inputs.push(input);
        self
    }

    #[must_use]
    pub fn with_output(mut self, output: ResourceEffect) -> Self {
        self.outputs.push(output);
        self
    }

    #[must_use]
    pub fn with_choice(mut self, choice: Choice) -> Self {
        self.choices.push(choice);
        self
    }

    pub fn primary_trigger(&self) -> Option<&Trigger> {
        self.triggers.first()
    }

    pub fn has_trigger_kind(&self, kind: TriggerKind) -> bool {
        self.triggers.iter().any(|trigger| trigger.kind == kind)
    }

    /// Auto trigger without a condition.
    pub fn is_static_passive(&self) -> bool {
        self.primary_trigger()
            .is_some_and(|t| t.kind == TriggerKind::Auto && t.condition.is_none())
    }

    /// Auto trigger bound to a domain event.
    pub fn is_reactive(&self) -> bool {
        self.reactive_condition().is_some()
    }

    pub fn reactive_condition(&self) -> Option<&TriggerCondition> {
        self.primary_trigger()
            .filter(|t| t.kind == TriggerKind::Auto)
            .and_then(|t| t.condition.as_ref())
    }

    pub fn is_manual(&self) -> bool {
        self.primary_trigger()
            .is_some_and(|t| t.kind == TriggerKind::Manual)
    }

    /// Resolves the effect lists for execution.
    ///
    /// The chosen option's inputs and outputs are appended to the base lists.
    /// A behavior with choices requires a valid index; a behavior without
    /// choices ignores the argument.
    pub fn extract_inputs_outputs(
        &self,
        choice: Option<usize>,
    ) -> Result<(Vec<ResourceEffect>, Vec<ResourceEffect>), BehaviorError> {
        let mut inputs = self.inputs.clone();
        let mut outputs = self.outputs.clone();

        if self.choices.is_empty() {
            return Ok((inputs, outputs));
        }

        let available = self.choices.len();
        let index = choice.ok_or(BehaviorError::ChoiceRequired { available })?;
        let selected = self
            .choices
            .get(index)
            .ok_or(BehaviorError::InvalidChoice { index, available })?;

        inputs.extend(selected.inputs.iter().cloned());
        outputs.extend(selected.outputs.iter().cloned());
        Ok((inputs, outputs))
    }

    /// Outputs with the discount kind, consulted by the discount calculator.
    pub fn discount_outputs(&self) -> impl Iterator<Item = &ResourceEffect> {
        self.outputs
            .iter()
            .filter(|output| output.kind == ResourceKind::Discount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_choice_behavior() -> Behavior {
        Behavior::new(Trigger::manual())
            .with_input(ResourceEffect::new(ResourceKind::Energy, 1))
            .with_choice(Choice {
                inputs: vec![],
                outputs: vec![ResourceEffect::new(ResourceKind::Credits, 2)],
            })
            .with_choice(Choice {
                inputs: vec![ResourceEffect::new(ResourceKind::Heat, 2)],
                outputs: vec![ResourceEffect::new(ResourceKind::Temperature, 1)],
            })
    }

    #[test]
    fn chosen_option_is_appended_to_base_lists() {
        let behavior = create_test_choice_behavior();
        let (inputs, outputs) = behavior.extract_inputs_outputs(Some(1)).unwrap();

        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs[0].kind, ResourceKind::Energy);
        assert_eq!(inputs[1].kind, ResourceKind::Heat);
        assert_eq!(outputs, vec![ResourceEffect::new(ResourceKind::Temperature, 1)]);
    }

    #[test]
    fn missing_or_invalid_choice_is_rejected() {
        let behavior = create_test_choice_behavior();
        assert_eq!(
            behavior.extract_inputs_outputs(None),
            Err(BehaviorError::ChoiceRequired { available: 2 })
        );
        assert_eq!(
            behavior.extract_inputs_outputs(Some(5)),
            Err(BehaviorError::InvalidChoice {
                index: 5,
                available: 2
            })
        );
    }

    #[test]
    fn classification_uses_first_trigger() {
        let passive = Behavior::new(Trigger::auto());
        assert!(passive.is_static_passive());
        assert!(!passive.is_reactive());

        let reactive = Behavior::new(Trigger::on(TriggerCondition::new(
            ConditionKind::TemperatureRaise,
        )));
        assert!(reactive.is_reactive());
        assert!(!reactive.is_static_passive());

        let manual = Behavior::new(Trigger::manual());
        assert!(manual.is_manual());

        let start = Behavior::new(Trigger::of(TriggerKind::AutoCorporationStart));
        assert!(!start.is_static_passive());
        assert!(start.has_trigger_kind(TriggerKind::AutoCorporationStart));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn behavior_deserializes_from_card_data() {
        let json = r#"{
            "triggers": [{
                "type": "auto",
                "condition": {"type": "placement-bonus-gained", "affectedResources": ["steel", "titanium"]}
            }],
            "outputs": [{"type": "steel-production", "amount": 1, "target": "self-player"},
                        {"type": "venus-lenience", "amount": 2}]
        }"#;
        let behavior: Behavior = serde_json::from_str(json).unwrap();
        let condition = behavior.reactive_condition().unwrap();

        assert_eq!(condition.kind, ConditionKind::PlacementBonusGained);
        assert_eq!(
            condition.affected_resources,
            vec![ResourceKind::Steel, ResourceKind::Titanium]
        );
        assert_eq!(behavior.outputs[0].kind, ResourceKind::SteelProduction);
        assert_eq!(behavior.outputs[1].kind, ResourceKind::Unknown);
    }
}
