//! Card payment and affordability.

use std::collections::BTreeMap;

use strum::IntoEnumIterator;

use crate::behavior::BasicResource;
use crate::error::{ErrorSeverity, GameError};
use crate::state::{PaymentSubstitute, ResourceSet};

/// How a player splits a card cost across credits and substitutes.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CardPayment {
    pub credits: i32,
    pub steel: i32,
    pub titanium: i32,
    /// Other substitutes, e.g. heat for a corporation that allows it.
    pub substitutes: BTreeMap<BasicResource, i32>,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PaymentError {
    #[error("payment amount for {resource} cannot be negative")]
    Negative { resource: BasicResource },

    #[error("steel can only pay for building cards")]
    SteelNotAllowed,

    #[error("titanium can only pay for space cards")]
    TitaniumNotAllowed,

    #[error("{resource} is not a registered payment substitute")]
    UnknownSubstitute { resource: BasicResource },

    #[error("payment worth {value} does not cover cost {cost}")]
    Insufficient { value: i32, cost: i32 },

    #[error("insufficient {resource}: need {required}, have {available}")]
    CannotAfford {
        resource: BasicResource,
        required: i32,
        available: i32,
    },
}

impl GameError for PaymentError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Negative { .. } => "PAYMENT_NEGATIVE",
            Self::SteelNotAllowed => "PAYMENT_STEEL_NOT_ALLOWED",
            Self::TitaniumNotAllowed => "PAYMENT_TITANIUM_NOT_ALLOWED",
            Self::UnknownSubstitute { .. } => "PAYMENT_UNKNOWN_SUBSTITUTE",
            Self::Insufficient { .. } => "PAYMENT_INSUFFICIENT",
            Self::CannotAfford { .. } => "PAYMENT_CANNOT_AFFORD",
        }
    }
}

fn rate_of(substitutes: &[PaymentSubstitute], resource: BasicResource) -> Option<i32> {
    substitutes
        .iter()
        .find(|sub| sub.resource == resource)
        .map(|sub| sub.rate)
}

impl CardPayment {
    pub fn credits(credits: i32) -> Self {
        Self {
            credits,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_steel(mut self, steel: i32) -> Self {
        self.steel = steel;
        self
    }

    #[must_use]
    pub fn with_titanium(mut self, titanium: i32) -> Self {
        self.titanium = titanium;
        self
    }

    #[must_use]
    pub fn with_substitute(mut self, resource: BasicResource, amount: i32) -> Self {
        self.substitutes.insert(resource, amount);
        self
    }

    /// Rejects negative amounts and substitute entries that duplicate the
    /// dedicated credit, steel and titanium fields.
    pub fn validate(&self) -> Result<(), PaymentError> {
        for (resource, amount) in [
            (BasicResource::Credits, self.credits),
            (BasicResource::Steel, self.steel),
            (BasicResource::Titanium, self.titanium),
        ] {
            if amount < 0 {
                return Err(PaymentError::Negative { resource });
            }
        }
        for (resource, amount) in &self.substitutes {
            if *amount < 0 {
                return Err(PaymentError::Negative {
                    resource: *resource,
                });
            }
            if matches!(
                resource,
                BasicResource::Credits | BasicResource::Steel | BasicResource::Titanium
            ) {
                return Err(PaymentError::UnknownSubstitute {
                    resource: *resource,
                });
            }
        }
        Ok(())
    }

    /// Credit value of this payment under the given substitute rates.
    /// Unregistered substitutes contribute nothing.
    pub fn total_value(&self, substitutes: &[PaymentSubstitute]) -> i32 {
        let steel_rate = rate_of(substitutes, BasicResource::Steel).unwrap_or(0);
        let titanium_rate = rate_of(substitutes, BasicResource::Titanium).unwrap_or(0);
        let others: i32 = self
            .substitutes
            .iter()
            .map(|(resource, amount)| amount * rate_of(substitutes, *resource).unwrap_or(0))
            .sum();

        self.credits + self.steel * steel_rate + self.titanium * titanium_rate + others
    }

    /// Checks that this payment is well-formed and worth at least `cost`.
    pub fn covers_cost(
        &self,
        cost: i32,
        allow_steel: bool,
        allow_titanium: bool,
        substitutes: &[PaymentSubstitute],
    ) -> Result<(), PaymentError> {
        self.validate()?;

        if self.steel > 0 && !allow_steel {
            return Err(PaymentError::SteelNotAllowed);
        }
        if self.titanium > 0 && !allow_titanium {
            return Err(PaymentError::TitaniumNotAllowed);
        }
        for (resource, amount) in &self.substitutes {
            if *amount > 0 && rate_of(substitutes, *resource).is_none() {
                return Err(PaymentError::UnknownSubstitute {
                    resource: *resource,
                });
            }
        }

        let value = self.total_value(substitutes);
        let cost = cost.max(0);
        if value < cost {
            return Err(PaymentError::Insufficient { value, cost });
        }
        Ok(())
    }

    /// Checks that the player actually holds what this payment spends.
    pub fn can_afford(&self, held: &ResourceSet) -> Result<(), PaymentError> {
        let spent = self.as_resource_set();
        for resource in BasicResource::iter() {
            let required = spent.get(resource);
            let available = held.get(resource);
            if required > available {
                return Err(PaymentError::CannotAfford {
                    resource,
                    required,
                    available,
                });
            }
        }
        Ok(())
    }

    /// Resources this payment removes from the player.
    pub fn as_resource_set(&self) -> ResourceSet {
        let mut spent = ResourceSet::new(self.credits, self.steel, self.titanium, 0, 0, 0);
        for (resource, amount) in &self.substitutes {
            spent.add(*resource, *amount);
        }
        spent
    }
}
