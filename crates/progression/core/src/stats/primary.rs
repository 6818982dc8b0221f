//! Primary Stats - Layer 1 of the stat system.
//!
//! Primary stats (STR, DEX, VIT, AGI, INT, LCK) and the free stat points used
//! to raise them are the only stat values that are permanently stored. All
//! other stats are derived from these.
//!
//! # Investment economy
//!
//! Raising a stat by one costs `cost_curve.cost_at(current value)` free points.
//! Lowering it again refunds `cost_curve.cost_at(current value - 1)`, the price
//! of the step that produced the current value. Because the curve is keyed on
//! value alone, invest followed by undo is always point-neutral.

use strum::EnumCount;

use super::bonus::{EffectBuckets, StatBounds, StatLayer};
use super::quantity::Quantity;
use crate::config::{CostCurve, ProgressionConfig};
use crate::error::{ErrorSeverity, ProgressionError};

/// The six primary attributes that define a character.
///
/// - **Strength**: melee damage, block value
/// - **Dexterity**: ranged damage, block chance
/// - **Vitality**: life, life regeneration, armor
/// - **Agility**: attack speed, dodge, armor
/// - **Intelligence**: mana, spell damage
/// - **Luck**: critical strikes
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
pub enum Stat {
    Strength,
    Dexterity,
    Vitality,
    Agility,
    Intelligence,
    Luck,
}

pub const STAT_COUNT: usize = <Stat as EnumCount>::COUNT;

impl Stat {
    pub const ALL: [Stat; STAT_COUNT] = [
        Stat::Strength,
        Stat::Dexterity,
        Stat::Vitality,
        Stat::Agility,
        Stat::Intelligence,
        Stat::Luck,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Errors raised by the stat investment economy.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StatError {
    #[error("no free stat points")]
    NoFreePoints,

    #[error("raising {stat} costs {required} points but only {available} are free")]
    InsufficientPoints {
        stat: Stat,
        required: u32,
        available: u32,
    },

    #[error("{stat} is already at its cap of {cap}")]
    AtCap { stat: Stat, cap: i32 },

    #[error("{stat} is already at its floor of {floor}")]
    AtFloor { stat: Stat, floor: i32 },

    #[error("{stat} value {value} is outside [{floor}, {cap}]")]
    OutOfRange {
        stat: Stat,
        value: i32,
        floor: i32,
        cap: i32,
    },

    #[error("{free} free of {granted} granted points does not match the invested stats")]
    PointsMismatch { free: u32, granted: u32 },
}

impl ProgressionError for StatError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NoFreePoints | Self::InsufficientPoints { .. } => ErrorSeverity::Recoverable,
            Self::AtCap { .. } | Self::AtFloor { .. } => ErrorSeverity::Validation,
            Self::OutOfRange { .. } | Self::PointsMismatch { .. } => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NoFreePoints => "STAT_NO_FREE_POINTS",
            Self::InsufficientPoints { .. } => "STAT_INSUFFICIENT_POINTS",
            Self::AtCap { .. } => "STAT_AT_CAP",
            Self::AtFloor { .. } => "STAT_AT_FLOOR",
            Self::OutOfRange { .. } => "STAT_OUT_OF_RANGE",
            Self::PointsMismatch { .. } => "STAT_POINTS_MISMATCH",
        }
    }
}

/// Base values of the primary stats plus the free-point purse.
///
/// Invariant: `granted_points == spent_points() + free_points`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrimaryStats {
    values: [i32; STAT_COUNT],
    floors: [i32; STAT_COUNT],
    cap: i32,
    cost_curve: CostCurve,
    free_points: u32,
    granted_points: u32,
    revision: u64,
}

impl PrimaryStats {
    /// Fresh stats at the configured starting value with no free points.
    pub fn new(config: &ProgressionConfig) -> Self {
        let start = config.starting_stat_value;
        Self {
            values: [start; STAT_COUNT],
            floors: [start; STAT_COUNT],
            cap: config.stat_cap,
            cost_curve: config.cost_curve.clone(),
            free_points: 0,
            granted_points: 0,
            revision: 0,
        }
    }

    /// Rebuild stats from persisted values.
    pub fn restore(
        config: &ProgressionConfig,
        values: [i32; STAT_COUNT],
        floors: [i32; STAT_COUNT],
        granted_points: u32,
        free_points: u32,
    ) -> Result<Self, StatError> {
        for stat in Stat::ALL {
            let (value, floor) = (values[stat.index()], floors[stat.index()]);
            if floor < 0 || value < floor || value > config.stat_cap {
                return Err(StatError::OutOfRange {
                    stat,
                    value,
                    floor,
                    cap: config.stat_cap,
                });
            }
        }
        if free_points > granted_points {
            return Err(StatError::PointsMismatch {
                free: free_points,
                granted: granted_points,
            });
        }

        let stats = Self {
            values,
            floors,
            cap: config.stat_cap,
            cost_curve: config.cost_curve.clone(),
            free_points,
            granted_points,
            revision: 0,
        };
        if stats.refundable_points() != stats.spent_points() {
            return Err(StatError::PointsMismatch {
                free: free_points,
                granted: granted_points,
            });
        }
        Ok(stats)
    }

    pub fn value(&self, stat: Stat) -> i32 {
        self.values[stat.index()]
    }

    pub fn floor(&self, stat: Stat) -> i32 {
        self.floors[stat.index()]
    }

    pub fn cap(&self) -> i32 {
        self.cap
    }

    pub fn values(&self) -> [i32; STAT_COUNT] {
        self.values
    }

    pub fn floors(&self) -> [i32; STAT_COUNT] {
        self.floors
    }

    pub fn free_points(&self) -> u32 {
        self.free_points
    }

    pub fn granted_points(&self) -> u32 {
        self.granted_points
    }

    /// Points currently tied up in investments.
    pub fn spent_points(&self) -> u32 {
        self.granted_points - self.free_points
    }

    /// Monotonic counter bumped on every base value change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Add free points (level-up, quest reward).
    pub fn grant_points(&mut self, points: u32) {
        self.free_points += points;
        self.granted_points += points;
        tracing::debug!(points, free = self.free_points, "granted stat points");
    }

    /// True iff there is at least one free point and the stat is below its cap.
    ///
    /// Affordability is checked by [`Self::invest_in_stat`].
    pub fn can_invest_in_stat(&self, stat: Stat) -> bool {
        self.free_points > 0 && self.value(stat) < self.cap
    }

    /// Free points needed to raise `stat` by one from its current value.
    pub fn points_required_for_stat(&self, stat: Stat) -> u32 {
        self.cost_curve.cost_at(self.value(stat))
    }

    /// Free points refunded by lowering `stat` by one from its current value.
    ///
    /// Returns 0 when the stat sits on its floor.
    pub fn points_gained_by_decreasing_stat(&self, stat: Stat) -> u32 {
        let value = self.value(stat);
        if value <= self.floor(stat) {
            return 0;
        }
        self.cost_curve.cost_at(value - 1)
    }

    /// Spend points to raise `stat` by one. Returns the points paid.
    pub fn invest_in_stat(&mut self, stat: Stat) -> Result<u32, StatError> {
        if self.free_points == 0 {
            return Err(StatError::NoFreePoints);
        }
        if self.value(stat) >= self.cap {
            return Err(StatError::AtCap {
                stat,
                cap: self.cap,
            });
        }
        let required = self.points_required_for_stat(stat);
        if required > self.free_points {
            return Err(StatError::InsufficientPoints {
                stat,
                required,
                available: self.free_points,
            });
        }

        self.free_points -= required;
        self.values[stat.index()] += 1;
        self.revision += 1;
        self.debug_check_invariants();

        tracing::debug!(%stat, value = self.value(stat), cost = required, "invested in stat");
        Ok(required)
    }

    /// Lower `stat` by one and refund points. Returns the points refunded.
    pub fn undo_investment_in_stat(&mut self, stat: Stat) -> Result<u32, StatError> {
        let floor = self.floor(stat);
        if self.value(stat) <= floor {
            return Err(StatError::AtFloor { stat, floor });
        }
        let refund = self.points_gained_by_decreasing_stat(stat);

        self.values[stat.index()] -= 1;
        self.free_points += refund;
        self.revision += 1;
        self.debug_check_invariants();

        tracing::debug!(%stat, value = self.value(stat), refund, "undid stat investment");
        Ok(refund)
    }

    /// Points that would be refunded by lowering every stat to its floor.
    pub fn refundable_points(&self) -> u32 {
        Stat::ALL
            .iter()
            .map(|&stat| {
                (self.floor(stat)..self.value(stat))
                    .map(|value| self.cost_curve.cost_at(value))
                    .sum::<u32>()
            })
            .sum()
    }

    fn debug_check_invariants(&self) {
        debug_assert!(self.free_points <= self.granted_points);
        debug_assert!(
            Stat::ALL
                .iter()
                .all(|&stat| self.value(stat) >= self.floor(stat) && self.value(stat) >= 0)
        );
        debug_assert_eq!(self.refundable_points(), self.spent_points());
    }
}

/// Effective primary stats - base values with primary-targeting effects applied.
///
/// Never stored; always recomputed when needed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PrimaryEffective {
    values: [f64; STAT_COUNT],
}

impl PrimaryEffective {
    pub fn get(&self, stat: Stat) -> f64 {
        self.values[stat.index()]
    }
}

/// Layer 1: Primary Stats Layer
///
/// Base: PrimaryStats (stored values)
/// Bonuses: EffectBuckets (auras and equipment)
/// Final: PrimaryEffective
impl StatLayer for PrimaryEffective {
    type Base = PrimaryStats;
    type Bonuses = EffectBuckets;
    type Final = Self;

    fn compute(base: &Self::Base, bonuses: &Self::Bonuses) -> Self::Final {
        const BOUNDS: StatBounds = StatBounds::PRIMARY;

        let mut values = [0.0; STAT_COUNT];
        for stat in Stat::ALL {
            values[stat.index()] = bonuses
                .get(Quantity::from(stat))
                .resolve(f64::from(base.value(stat)), BOUNDS);
        }
        Self { values }
    }

    fn empty_bonuses() -> Self::Bonuses {
        EffectBuckets::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aura::StatusEffect;
    use crate::config::CostTier;

    fn stats_with_points(points: u32) -> PrimaryStats {
        let mut stats = PrimaryStats::new(&ProgressionConfig::default());
        stats.grant_points(points);
        stats
    }

    #[test]
    fn invest_spends_points_and_raises_stat() {
        let mut stats = stats_with_points(3);

        assert_eq!(stats.invest_in_stat(Stat::Strength), Ok(1));
        assert_eq!(stats.value(Stat::Strength), 11);
        assert_eq!(stats.free_points(), 2);
        assert_eq!(stats.spent_points(), 1);
    }

    #[test]
    fn invest_without_points_fails_unchanged() {
        let mut stats = stats_with_points(0);
        let before = stats.clone();

        assert!(!stats.can_invest_in_stat(Stat::Luck));
        assert_eq!(stats.invest_in_stat(Stat::Luck), Err(StatError::NoFreePoints));
        assert_eq!(stats, before);
    }

    #[test]
    fn invest_fails_when_cost_exceeds_purse() {
        let config = ProgressionConfig::default().with_cost_curve(
            CostCurve::new(vec![CostTier::new(0, 1), CostTier::new(11, 3)]).unwrap(),
        );
        let mut stats = PrimaryStats::new(&config);
        stats.grant_points(2);

        assert_eq!(stats.invest_in_stat(Stat::Vitality), Ok(1));
        assert!(stats.can_invest_in_stat(Stat::Vitality));
        assert_eq!(
            stats.invest_in_stat(Stat::Vitality),
            Err(StatError::InsufficientPoints {
                stat: Stat::Vitality,
                required: 3,
                available: 1
            })
        );
        assert_eq!(stats.value(Stat::Vitality), 11);
        assert_eq!(stats.free_points(), 1);
    }

    #[test]
    fn invest_stops_at_cap() {
        let config = ProgressionConfig::default().with_stat_cap(11);
        let mut stats = PrimaryStats::new(&config);
        stats.grant_points(5);

        assert!(stats.invest_in_stat(Stat::Agility).is_ok());
        assert!(!stats.can_invest_in_stat(Stat::Agility));
        assert_eq!(
            stats.invest_in_stat(Stat::Agility),
            Err(StatError::AtCap {
                stat: Stat::Agility,
                cap: 11
            })
        );
    }

    #[test]
    fn undo_refunds_price_of_last_step() {
        let config = ProgressionConfig::default().with_cost_curve(
            CostCurve::new(vec![CostTier::new(0, 1), CostTier::new(11, 2)]).unwrap(),
        );
        let mut stats = PrimaryStats::new(&config);
        stats.grant_points(3);

        // 10 -> 11 costs 1, 11 -> 12 costs 2
        stats.invest_in_stat(Stat::Dexterity).unwrap();
        stats.invest_in_stat(Stat::Dexterity).unwrap();
        assert_eq!(stats.free_points(), 0);

        assert_eq!(stats.points_gained_by_decreasing_stat(Stat::Dexterity), 2);
        assert_eq!(stats.undo_investment_in_stat(Stat::Dexterity), Ok(2));
        assert_eq!(stats.points_gained_by_decreasing_stat(Stat::Dexterity), 1);
        assert_eq!(stats.undo_investment_in_stat(Stat::Dexterity), Ok(1));
        assert_eq!(stats.free_points(), 3);
    }

    #[test]
    fn undo_at_floor_fails() {
        let mut stats = stats_with_points(1);
        assert_eq!(stats.points_gained_by_decreasing_stat(Stat::Intelligence), 0);
        assert_eq!(
            stats.undo_investment_in_stat(Stat::Intelligence),
            Err(StatError::AtFloor {
                stat: Stat::Intelligence,
                floor: 10
            })
        );
        assert_eq!(stats.free_points(), 1);
    }

    #[test]
    fn revision_bumps_only_on_change() {
        let mut stats = stats_with_points(1);
        let start = stats.revision();
        let _ = stats.undo_investment_in_stat(Stat::Luck);
        assert_eq!(stats.revision(), start);
        stats.invest_in_stat(Stat::Luck).unwrap();
        assert_eq!(stats.revision(), start + 1);
    }

    #[test]
    fn restore_rejects_values_below_floor() {
        let config = ProgressionConfig::default();
        let mut values = [10; STAT_COUNT];
        values[Stat::Luck.index()] = 9;
        let result = PrimaryStats::restore(&config, values, [10; STAT_COUNT], 0, 0);
        assert!(matches!(result, Err(StatError::OutOfRange { stat: Stat::Luck, .. })));
    }

    #[test]
    fn effective_layer_applies_primary_effects() {
        let stats = stats_with_points(0);
        let mut buckets = EffectBuckets::new();
        buckets.add(&StatusEffect::fixed(Quantity::Strength, 5.0));
        buckets.add(&StatusEffect::percental(Quantity::Strength, 20.0));

        let effective = PrimaryEffective::compute(&stats, &buckets);
        assert_eq!(effective.get(Stat::Strength), 18.0);
        assert_eq!(effective.get(Stat::Dexterity), 10.0);
    }
}
