//! Derived Stats - Layer 2 of the stat system.
//!
//! Combat and resource quantities derived from the effective primary stats.
//! These are NOT stored - recomputed by the aggregator when its inputs change.

use super::bonus::{EffectBuckets, StatLayer};
use super::primary::{PrimaryEffective, Stat};
use super::quantity::{QUANTITY_COUNT, Quantity};

/// Every quantity resolved for one character.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatSheet {
    values: [f64; QUANTITY_COUNT],
}

impl StatSheet {
    pub fn get(&self, quantity: Quantity) -> f64 {
        self.values[quantity.index()]
    }

    /// Base value of a derived quantity before any effect is applied.
    ///
    /// Base formulas:
    /// - MaxLife: 50 + VIT × 10
    /// - MaxMana: 20 + INT × 5
    /// - LifeRegen: VIT × 0.1, ManaRegen: INT × 0.2
    /// - Melee/Ranged/Spell damage: STR / DEX / INT
    /// - AttackSpeed: 100 + AGI × 0.5
    /// - CritChance: 5 + LCK × 0.2, CritDamage: 150 + LCK × 0.5
    /// - BlockChance: DEX × 0.2, BlockValue: STR × 0.5
    /// - Armor: (VIT + AGI) × 0.5, DodgeChance: AGI × 0.2
    /// - Resistances and CooldownReduction: 0, MovementSpeed: 100
    pub fn base_value(quantity: Quantity, primary: &PrimaryEffective) -> f64 {
        let str = primary.get(Stat::Strength);
        let dex = primary.get(Stat::Dexterity);
        let vit = primary.get(Stat::Vitality);
        let agi = primary.get(Stat::Agility);
        let int = primary.get(Stat::Intelligence);
        let lck = primary.get(Stat::Luck);

        match quantity {
            Quantity::Strength => str,
            Quantity::Dexterity => dex,
            Quantity::Vitality => vit,
            Quantity::Agility => agi,
            Quantity::Intelligence => int,
            Quantity::Luck => lck,
            Quantity::MaxLife => 50.0 + vit * 10.0,
            Quantity::MaxMana => 20.0 + int * 5.0,
            Quantity::LifeRegen => vit * 0.1,
            Quantity::ManaRegen => int * 0.2,
            Quantity::MeleeDamage => str,
            Quantity::RangedDamage => dex,
            Quantity::SpellDamage => int,
            Quantity::AttackSpeed => 100.0 + agi * 0.5,
            Quantity::CritChance => 5.0 + lck * 0.2,
            Quantity::CritDamage => 150.0 + lck * 0.5,
            Quantity::BlockChance => dex * 0.2,
            Quantity::BlockValue => str * 0.5,
            Quantity::Armor => (vit + agi) * 0.5,
            Quantity::DodgeChance => agi * 0.2,
            Quantity::FireResistance
            | Quantity::IceResistance
            | Quantity::LightningResistance
            | Quantity::PoisonResistance
            | Quantity::CooldownReduction => 0.0,
            Quantity::MovementSpeed => 100.0,
        }
    }
}

/// Layer 2: Derived Stats Layer
///
/// Base: PrimaryEffective (output from Layer 1)
/// Bonuses: EffectBuckets (auras and equipment)
/// Final: StatSheet (every quantity)
///
/// Primary quantities are copied from Layer 1, which already applied their
/// effects.
impl StatLayer for StatSheet {
    type Base = PrimaryEffective;
    type Bonuses = EffectBuckets;
    type Final = Self;

    fn compute(base: &Self::Base, bonuses: &Self::Bonuses) -> Self::Final {
        let mut values = [0.0; QUANTITY_COUNT];
        for (slot, quantity) in values.iter_mut().zip(quantities()) {
            let raw = Self::base_value(quantity, base);
            *slot = if quantity.is_primary() {
                raw
            } else {
                bonuses.get(quantity).resolve(raw, quantity.bounds())
            };
        }
        Self { values }
    }

    fn empty_bonuses() -> Self::Bonuses {
        EffectBuckets::new()
    }
}

fn quantities() -> impl Iterator<Item = Quantity> {
    <Quantity as strum::IntoEnumIterator>::iter()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aura::StatusEffect;
    use crate::config::ProgressionConfig;
    use crate::stats::primary::PrimaryStats;

    fn effective(buckets: &EffectBuckets) -> PrimaryEffective {
        let stats = PrimaryStats::new(&ProgressionConfig::default());
        PrimaryEffective::compute(&stats, buckets)
    }

    #[test]
    fn baseline_character_sheet() {
        let buckets = EffectBuckets::new();
        let sheet = StatSheet::compute(&effective(&buckets), &buckets);

        assert_eq!(sheet.get(Quantity::MaxLife), 150.0);
        assert_eq!(sheet.get(Quantity::MaxMana), 70.0);
        assert_eq!(sheet.get(Quantity::CritChance), 7.0);
        assert_eq!(sheet.get(Quantity::MovementSpeed), 100.0);
        assert_eq!(sheet.get(Quantity::FireResistance), 0.0);
    }

    #[test]
    fn primary_effects_flow_into_derived_quantities() {
        let mut buckets = EffectBuckets::new();
        buckets.add(&StatusEffect::fixed(Quantity::Vitality, 5.0));
        let sheet = StatSheet::compute(&effective(&buckets), &buckets);

        assert_eq!(sheet.get(Quantity::Vitality), 15.0);
        // 50 + 15 × 10
        assert_eq!(sheet.get(Quantity::MaxLife), 200.0);
    }

    #[test]
    fn primary_effects_are_not_applied_twice() {
        let mut buckets = EffectBuckets::new();
        buckets.add(&StatusEffect::percental(Quantity::Strength, 50.0));
        let sheet = StatSheet::compute(&effective(&buckets), &buckets);

        assert_eq!(sheet.get(Quantity::Strength), 15.0);
    }

    #[test]
    fn derived_effects_clamp_to_domain() {
        let mut buckets = EffectBuckets::new();
        buckets.add(&StatusEffect::fixed(Quantity::CritChance, 500.0));
        buckets.add(&StatusEffect::fixed(Quantity::FireResistance, -300.0));
        let sheet = StatSheet::compute(&effective(&buckets), &buckets);

        assert_eq!(sheet.get(Quantity::CritChance), 100.0);
        assert_eq!(sheet.get(Quantity::FireResistance), -100.0);
    }
}
