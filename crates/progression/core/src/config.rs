//! Progression configuration constants and tunable parameters.

/// One step of the stat cost curve.
///
/// Raising a stat whose current value is at least `from_value` costs `cost`
/// free points, until the next tier takes over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CostTier {
    pub from_value: i32,
    pub cost: u32,
}

impl CostTier {
    pub const fn new(from_value: i32, cost: u32) -> Self {
        Self { from_value, cost }
    }
}

/// Price of raising a primary stat by one, keyed on its current value.
///
/// Tiers are sorted by `from_value` and their costs never decrease, which
/// makes the curve monotonic in the stat's value.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<CostTier>", into = "Vec<CostTier>"))]
pub struct CostCurve {
    tiers: Vec<CostTier>,
}

impl CostCurve {
    /// Build a curve, validating ordering and monotonicity.
    pub fn new(mut tiers: Vec<CostTier>) -> Result<Self, ConfigError> {
        if tiers.is_empty() {
            return Err(ConfigError::EmptyCostCurve);
        }
        tiers.sort_by_key(|tier| tier.from_value);

        for pair in tiers.windows(2) {
            if pair[0].from_value == pair[1].from_value {
                return Err(ConfigError::DuplicateTier(pair[1].from_value));
            }
            if pair[1].cost < pair[0].cost {
                return Err(ConfigError::DecreasingCost {
                    from_value: pair[1].from_value,
                });
            }
        }
        if tiers.iter().any(|tier| tier.cost == 0) {
            return Err(ConfigError::FreeTier);
        }

        Ok(Self { tiers })
    }

    /// Flat curve: every point costs the same.
    pub fn flat(cost: u32) -> Self {
        Self {
            tiers: vec![CostTier::new(i32::MIN, cost.max(1))],
        }
    }

    /// Points needed to raise a stat currently at `value` by one.
    ///
    /// Values below the first tier pay the first tier's price.
    pub fn cost_at(&self, value: i32) -> u32 {
        self.tiers
            .iter()
            .rev()
            .find(|tier| tier.from_value <= value)
            .or_else(|| self.tiers.first())
            .map_or(1, |tier| tier.cost)
    }

    pub fn tiers(&self) -> &[CostTier] {
        &self.tiers
    }
}

impl Default for CostCurve {
    fn default() -> Self {
        Self {
            tiers: vec![
                CostTier::new(0, 1),
                CostTier::new(40, 2),
                CostTier::new(70, 3),
                CostTier::new(90, 4),
            ],
        }
    }
}

impl TryFrom<Vec<CostTier>> for CostCurve {
    type Error = ConfigError;

    fn try_from(tiers: Vec<CostTier>) -> Result<Self, Self::Error> {
        Self::new(tiers)
    }
}

impl From<CostCurve> for Vec<CostTier> {
    fn from(curve: CostCurve) -> Self {
        curve.tiers
    }
}

/// Progression configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ProgressionConfig {
    /// Value every primary stat starts at. Investments can never be undone
    /// below this floor.
    pub starting_stat_value: i32,
    /// Highest value a primary stat can be raised to by investment.
    pub stat_cap: i32,
    /// Free stat points granted on each level-up.
    pub stat_points_per_level: u32,
    /// Talent points granted on each level-up.
    pub talent_points_per_level: u32,
    /// Price of raising a stat by one.
    pub cost_curve: CostCurve,
}

impl ProgressionConfig {
    // ===== compile-time constants =====
    /// Highest level any talent definition may declare.
    pub const MAX_TALENT_LEVEL: u8 = 20;
    /// Highest character level reachable through `level_up`.
    pub const MAX_CHARACTER_LEVEL: u32 = 100;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_STARTING_STAT_VALUE: i32 = 10;
    pub const DEFAULT_STAT_CAP: i32 = 100;
    pub const DEFAULT_STAT_POINTS_PER_LEVEL: u32 = 5;
    pub const DEFAULT_TALENT_POINTS_PER_LEVEL: u32 = 1;

    pub fn new() -> Self {
        Self {
            starting_stat_value: Self::DEFAULT_STARTING_STAT_VALUE,
            stat_cap: Self::DEFAULT_STAT_CAP,
            stat_points_per_level: Self::DEFAULT_STAT_POINTS_PER_LEVEL,
            talent_points_per_level: Self::DEFAULT_TALENT_POINTS_PER_LEVEL,
            cost_curve: CostCurve::default(),
        }
    }

    pub fn with_cost_curve(mut self, cost_curve: CostCurve) -> Self {
        self.cost_curve = cost_curve;
        self
    }

    pub fn with_stat_cap(mut self, stat_cap: i32) -> Self {
        self.stat_cap = stat_cap;
        self
    }

    /// Check cross-field consistency after loading from data files.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.starting_stat_value < 0 {
            return Err(ConfigError::NegativeStartingValue(self.starting_stat_value));
        }
        if self.stat_cap < self.starting_stat_value {
            return Err(ConfigError::CapBelowStart {
                cap: self.stat_cap,
                start: self.starting_stat_value,
            });
        }
        Ok(())
    }
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors raised while validating configuration data.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("cost curve needs at least one tier")]
    EmptyCostCurve,

    #[error("cost curve has two tiers starting at value {0}")]
    DuplicateTier(i32),

    #[error("cost curve decreases at value {from_value}")]
    DecreasingCost { from_value: i32 },

    #[error("cost curve tiers must cost at least one point")]
    FreeTier,

    #[error("starting stat value {0} is negative")]
    NegativeStartingValue(i32),

    #[error("stat cap {cap} is below the starting value {start}")]
    CapBelowStart { cap: i32, start: i32 },
}

impl crate::error::ProgressionError for ConfigError {
    fn severity(&self) -> crate::error::ErrorSeverity {
        crate::error::ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyCostCurve => "CONFIG_EMPTY_COST_CURVE",
            Self::DuplicateTier(_) => "CONFIG_DUPLICATE_TIER",
            Self::DecreasingCost { .. } => "CONFIG_DECREASING_COST",
            Self::FreeTier => "CONFIG_FREE_TIER",
            Self::NegativeStartingValue(_) => "CONFIG_NEGATIVE_START",
            Self::CapBelowStart { .. } => "CONFIG_CAP_BELOW_START",
        }
    }
}
