//! Status effects - single modifiers targeting one quantity.

use crate::stats::{EffectTotal, Quantity};

/// How a status effect manipulates its quantity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Manipulation {
    /// Additive constant (e.g., +10 armor).
    Fixed,
    /// Additive percentage, summed with other percentages and applied once
    /// (e.g., +5% armor).
    Percental,
}

/// A single modifier: (target quantity, manipulation kind, magnitude).
///
/// Effects are value objects. Talents regenerate them on every refresh rather
/// than mutating magnitudes in place, so a changed magnitude always travels
/// through the aura list and invalidates the aggregator.
///
/// Magnitudes may be negative (debuffs, penalties).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffect {
    quantity: Quantity,
    kind: Manipulation,
    magnitude: f64,
}

impl StatusEffect {
    pub const fn new(quantity: Quantity, kind: Manipulation, magnitude: f64) -> Self {
        Self {
            quantity,
            kind,
            magnitude,
        }
    }

    /// Create a fixed (additive) effect
    pub const fn fixed(quantity: Quantity, magnitude: f64) -> Self {
        Self::new(quantity, Manipulation::Fixed, magnitude)
    }

    /// Create a percental effect (20.0 = +20%)
    pub const fn percental(quantity: Quantity, magnitude: f64) -> Self {
        Self::new(quantity, Manipulation::Percental, magnitude)
    }

    pub const fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub const fn kind(&self) -> Manipulation {
        self.kind
    }

    pub const fn magnitude(&self) -> f64 {
        self.magnitude
    }

    /// Same target and kind with a different magnitude.
    pub const fn with_magnitude(self, magnitude: f64) -> Self {
        Self { magnitude, ..self }
    }

    /// Fold this effect into the running total of its quantity.
    pub fn apply(&self, total: &mut EffectTotal) {
        match self.kind {
            Manipulation::Fixed => total.add_fixed(self.magnitude),
            Manipulation::Percental => total.add_percent(self.magnitude),
        }
    }
}
