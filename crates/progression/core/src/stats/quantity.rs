//! Quantities - every value the aggregator produces.
//!
//! The six primary stats appear here as their *effective* values (base plus
//! effects), followed by the derived combat quantities computed from them.

use strum::EnumCount;

use super::bonus::StatBounds;
use super::primary::Stat;

/// A primary attribute or derived statistic targeted by status effects.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
    strum::EnumCount,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Quantity {
    // ========================================================================
    // Primary stats (effective values)
    // ========================================================================
    Strength,
    Dexterity,
    Vitality,
    Agility,
    Intelligence,
    Luck,

    // ========================================================================
    // Resources
    // ========================================================================
    MaxLife,
    MaxMana,
    /// Life regenerated per second.
    LifeRegen,
    /// Mana regenerated per second.
    ManaRegen,

    // ========================================================================
    // Offense
    // ========================================================================
    MeleeDamage,
    RangedDamage,
    SpellDamage,
    /// Attack speed in percent of the weapon's base rate.
    AttackSpeed,
    CritChance,
    /// Damage multiplier of a critical hit, in percent.
    CritDamage,

    // ========================================================================
    // Defense
    // ========================================================================
    BlockChance,
    BlockValue,
    Armor,
    DodgeChance,
    FireResistance,
    IceResistance,
    LightningResistance,
    PoisonResistance,

    // ========================================================================
    // Utility
    // ========================================================================
    /// Movement speed in percent of the base walking speed.
    MovementSpeed,
    /// Percentage shaved off every skill cooldown.
    CooldownReduction,
}

/// Number of quantities; sizes every per-quantity table.
pub const QUANTITY_COUNT: usize = <Quantity as EnumCount>::COUNT;

impl Quantity {
    /// Dense index used by per-quantity tables.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The primary stat this quantity mirrors, if any.
    pub const fn as_primary(self) -> Option<Stat> {
        match self {
            Self::Strength => Some(Stat::Strength),
            Self::Dexterity => Some(Stat::Dexterity),
            Self::Vitality => Some(Stat::Vitality),
            Self::Agility => Some(Stat::Agility),
            Self::Intelligence => Some(Stat::Intelligence),
            Self::Luck => Some(Stat::Luck),
            _ => None,
        }
    }

    pub const fn is_primary(self) -> bool {
        self.as_primary().is_some()
    }

    /// Valid domain of this quantity; results are clamped into it.
    pub const fn bounds(self) -> StatBounds {
        match self {
            Self::Strength
            | Self::Dexterity
            | Self::Vitality
            | Self::Agility
            | Self::Intelligence
            | Self::Luck => StatBounds::PRIMARY,
            Self::CritChance | Self::BlockChance | Self::DodgeChance => StatBounds::CHANCE,
            Self::FireResistance
            | Self::IceResistance
            | Self::LightningResistance
            | Self::PoisonResistance => StatBounds::RESISTANCE,
            Self::CooldownReduction => StatBounds::COOLDOWN_REDUCTION,
            Self::MaxLife
            | Self::MaxMana
            | Self::LifeRegen
            | Self::ManaRegen
            | Self::MeleeDamage
            | Self::RangedDamage
            | Self::SpellDamage
            | Self::AttackSpeed
            | Self::CritDamage
            | Self::BlockValue
            | Self::Armor
            | Self::MovementSpeed => StatBounds::NON_NEGATIVE,
        }
    }
}

impl From<Stat> for Quantity {
    fn from(stat: Stat) -> Self {
        match stat {
            Stat::Strength => Self::Strength,
            Stat::Dexterity => Self::Dexterity,
            Stat::Vitality => Self::Vitality,
            Stat::Agility => Self::Agility,
            Stat::Intelligence => Self::Intelligence,
            Stat::Luck => Self::Luck,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn indices_are_dense() {
        for (position, quantity) in Quantity::iter().enumerate() {
            assert_eq!(quantity.index(), position);
        }
        assert_eq!(Quantity::iter().count(), QUANTITY_COUNT);
    }

    #[test]
    fn primary_mapping_round_trips() {
        for stat in Stat::iter() {
            let quantity = Quantity::from(stat);
            assert_eq!(quantity.as_primary(), Some(stat));
        }
        assert_eq!(Quantity::CritChance.as_primary(), None);
    }

    #[test]
    fn parses_snake_case_names() {
        assert_eq!("crit_chance".parse::<Quantity>().unwrap(), Quantity::CritChance);
        assert_eq!(Quantity::MaxLife.to_string(), "max_life");
    }
}
