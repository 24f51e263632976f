//! Scalar resource counters.

use crate::behavior::BasicResource;

/// Amount of each basic resource.
///
/// Used both for held resources and for production rates. Production values
/// are clamped through [`ResourceSet::add_production`]; held resources are
/// only ever reduced after an explicit sufficiency check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ResourceSet {
    pub credits: i32,
    pub steel: i32,
    pub titanium: i32,
    pub plants: i32,
    pub energy: i32,
    pub heat: i32,
}

impl ResourceSet {
    pub const fn new(
        credits: i32,
        steel: i32,
        titanium: i32,
        plants: i32,
        energy: i32,
        heat: i32,
    ) -> Self {
        Self {
            credits,
            steel,
            titanium,
            plants,
            energy,
            heat,
        }
    }

    pub const fn credits(credits: i32) -> Self {
        Self::new(credits, 0, 0, 0, 0, 0)
    }

    #[must_use]
    pub fn with(mut self, resource: BasicResource, amount: i32) -> Self {
        *self.get_mut(resource) = amount;
        self
    }

    pub const fn get(&self, resource: BasicResource) -> i32 {
        match resource {
            BasicResource::Credits => self.credits,
            BasicResource::Steel => self.steel,
            BasicResource::Titanium => self.titanium,
            BasicResource::Plants => self.plants,
            BasicResource::Energy => self.energy,
            BasicResource::Heat => self.heat,
        }
    }

    pub fn get_mut(&mut self, resource: BasicResource) -> &mut i32 {
        match resource {
            BasicResource::Credits => &mut self.credits,
            BasicResource::Steel => &mut self.steel,
            BasicResource::Titanium => &mut self.titanium,
            BasicResource::Plants => &mut self.plants,
            BasicResource::Energy => &mut self.energy,
            BasicResource::Heat => &mut self.heat,
        }
    }

    /// Applies a signed delta to a held resource.
    pub fn add(&mut self, resource: BasicResource, delta: i32) {
        *self.get_mut(resource) += delta;
    }

    /// Applies a signed delta to a production rate, clamping at the
    /// resource's floor. Returns the delta actually applied.
    pub fn add_production(&mut self, resource: BasicResource, delta: i32) -> i32 {
        let slot = self.get_mut(resource);
        let before = *slot;
        *slot = (before + delta).max(resource.production_floor());
        *slot - before
    }

    /// Adds every field of `other` to `self`.
    pub fn add_all(&mut self, other: &ResourceSet) {
        self.credits += other.credits;
        self.steel += other.steel;
        self.titanium += other.titanium;
        self.plants += other.plants;
        self.energy += other.energy;
        self.heat += other.heat;
    }

    /// Every field with its sign flipped, for turning a cost into a delta.
    pub const fn negated(&self) -> Self {
        Self::new(
            -self.credits,
            -self.steel,
            -self.titanium,
            -self.plants,
            -self.energy,
            -self.heat,
        )
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
