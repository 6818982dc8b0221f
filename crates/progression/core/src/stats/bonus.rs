//! Effect accumulation following the layered stack architecture.
//!
//! Every layer resolves a value with the same order:
//! `Base → Σ Fixed → × (1 + Σ Percental / 100) → Clamp`
//!
//! Fixed effects are summed, percental effects are summed, and the percental
//! sum is applied once against the fixed-adjusted base. Within each group the
//! order of effects does not matter.

use super::quantity::{QUANTITY_COUNT, Quantity};
use crate::aura::StatusEffect;

/// Running total of the effects touching one quantity.
///
/// # Example
/// ```
/// # use progression_core::stats::bonus::{EffectTotal, StatBounds};
/// let mut total = EffectTotal::default();
/// total.add_fixed(10.0);
/// total.add_percent(5.0);
/// total.add_percent(10.0);
///
/// // (100 + 10) × (1 + 15 / 100)
/// assert_eq!(total.resolve(100.0, StatBounds::UNCLAMPED), 126.5);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EffectTotal {
    /// Sum of all fixed (additive) magnitudes.
    pub fixed: f64,
    /// Sum of all percental magnitudes, in percent.
    pub percent: f64,
}

impl EffectTotal {
    pub fn add_fixed(&mut self, magnitude: f64) {
        self.fixed += magnitude;
    }

    pub fn add_percent(&mut self, magnitude: f64) {
        self.percent += magnitude;
    }

    /// Apply the total to a base value and clamp into `bounds`.
    ///
    /// # Formula
    /// ```text
    /// result = clamp((base + fixed) × (100 + percent) / 100, min, max)
    /// ```
    pub fn resolve(&self, base: f64, bounds: StatBounds) -> f64 {
        let adjusted = base + self.fixed;
        let scaled = if self.percent == 0.0 {
            adjusted
        } else {
            adjusted * (100.0 + self.percent) / 100.0
        };
        bounds.clamp(scaled)
    }

    pub fn is_empty(&self) -> bool {
        self.fixed == 0.0 && self.percent == 0.0
    }
}

/// Per-quantity running totals gathered from every active effect source.
#[derive(Clone, Debug)]
pub struct EffectBuckets {
    totals: [EffectTotal; QUANTITY_COUNT],
}

impl EffectBuckets {
    /// Create empty buckets (no effects)
    pub fn new() -> Self {
        Self {
            totals: [EffectTotal::default(); QUANTITY_COUNT],
        }
    }

    /// Feed one effect into the bucket of the quantity it targets.
    pub fn add(&mut self, effect: &StatusEffect) {
        effect.apply(&mut self.totals[effect.quantity().index()]);
    }

    /// Feed many effects at once.
    pub fn extend<'a>(&mut self, effects: impl IntoIterator<Item = &'a StatusEffect>) {
        for effect in effects {
            self.add(effect);
        }
    }

    pub fn get(&self, quantity: Quantity) -> &EffectTotal {
        &self.totals[quantity.index()]
    }
}

impl Default for EffectBuckets {
    fn default() -> Self {
        Self::new()
    }
}

/// Trait for stat layers that follow the Base -> Bonuses -> Final pattern.
///
/// ```text
/// Layer 1: PrimaryStats     + EffectBuckets -> PrimaryEffective
/// Layer 2: PrimaryEffective + EffectBuckets -> StatSheet
/// ```
///
/// # Examples
///
/// ```
/// # use progression_core::stats::*;
/// # use progression_core::stats::bonus::*;
/// let base = PrimaryStats::new(&progression_core::ProgressionConfig::default());
/// let primary = PrimaryEffective::from_base(&base);
/// let sheet = StatSheet::from_base(&primary);
/// // MaxLife: 50 + 10 × VIT(10)
/// assert_eq!(sheet.get(Quantity::MaxLife), 150.0);
/// ```
pub trait StatLayer {
    /// The base/input type for this layer
    type Base;

    /// The bonuses type for this layer
    type Bonuses;

    /// The final/output type for this layer
    type Final;

    /// Compute the final values from base and bonuses
    fn compute(base: &Self::Base, bonuses: &Self::Bonuses) -> Self::Final;

    /// Create an empty bonus holder
    fn empty_bonuses() -> Self::Bonuses;

    /// Compute with no bonuses (convenience method)
    fn from_base(base: &Self::Base) -> Self::Final {
        Self::compute(base, &Self::empty_bonuses())
    }
}

/// Bounds configuration for a specific quantity.
///
/// - **Primary stats**: [0, 9999]
/// - **Chances**: [0, 100]
/// - **Resistances**: [-100, 100]
/// - **Cooldown reduction**: [0, 80], a skill never becomes free to spam
/// - **Everything else**: non-negative
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatBounds {
    pub min: f64,
    pub max: f64,
}

impl StatBounds {
    pub const PRIMARY: Self = Self {
        min: 0.0,
        max: 9999.0,
    };

    pub const CHANCE: Self = Self {
        min: 0.0,
        max: 100.0,
    };

    pub const RESISTANCE: Self = Self {
        min: -100.0,
        max: 100.0,
    };

    pub const COOLDOWN_REDUCTION: Self = Self {
        min: 0.0,
        max: 80.0,
    };

    pub const NON_NEGATIVE: Self = Self {
        min: 0.0,
        max: f64::MAX,
    };

    /// No bounds (unclamped)
    pub const UNCLAMPED: Self = Self {
        min: f64::MIN,
        max: f64::MAX,
    };

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aura::StatusEffect;

    #[test]
    fn fixed_before_percental() {
        let mut buckets = EffectBuckets::new();
        buckets.add(&StatusEffect::fixed(Quantity::MovementSpeed, 10.0));
        buckets.add(&StatusEffect::percental(Quantity::MovementSpeed, 5.0));
        buckets.add(&StatusEffect::percental(Quantity::MovementSpeed, 10.0));

        let total = buckets.get(Quantity::MovementSpeed);
        assert_eq!(total.resolve(100.0, StatBounds::NON_NEGATIVE), 126.5);
    }

    #[test]
    fn effects_only_touch_their_quantity() {
        let mut buckets = EffectBuckets::new();
        buckets.add(&StatusEffect::fixed(Quantity::Armor, 25.0));

        assert!(buckets.get(Quantity::MaxLife).is_empty());
        assert_eq!(buckets.get(Quantity::Armor).fixed, 25.0);
    }

    #[test]
    fn negative_magnitudes_clamp_to_domain() {
        let mut total = EffectTotal::default();
        total.add_fixed(-40.0);
        assert_eq!(total.resolve(10.0, StatBounds::CHANCE), 0.0);

        let mut total = EffectTotal::default();
        total.add_percent(-150.0);
        assert_eq!(total.resolve(60.0, StatBounds::NON_NEGATIVE), 0.0);
    }

    #[test]
    fn chance_clamps_at_hundred() {
        let mut total = EffectTotal::default();
        total.add_fixed(95.0);
        total.add_percent(50.0);
        assert_eq!(total.resolve(5.0, StatBounds::CHANCE), 100.0);
    }
}
