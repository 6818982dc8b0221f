//! Active skills granted by talents.

use crate::stats::{Quantity, StatSheet};

use super::definition::SkillSpec;

/// Runtime state of a talent's skill.
///
/// Created lazily by the owning talent on first request and dropped when the
/// talent returns to level 0.
#[derive(Clone, Debug, PartialEq)]
pub struct Skill {
    name: String,
    level: u8,
    base_cooldown: f32,
    mana_cost: f64,
    /// Seconds until the skill can be used again.
    cooling: f32,
}

impl Skill {
    pub fn from_spec(spec: &SkillSpec, level: u8) -> Self {
        let mut skill = Self {
            name: spec.name.clone(),
            level: 0,
            base_cooldown: spec.cooldown,
            mana_cost: spec.mana_cost,
            cooling: 0.0,
        };
        skill.rescale(spec, level);
        skill
    }

    /// Apply a new talent level. Cooldown state is kept.
    pub fn rescale(&mut self, spec: &SkillSpec, level: u8) {
        self.level = level;
        let steps = f64::from(level.saturating_sub(1));
        self.mana_cost = (spec.mana_cost + spec.mana_cost_per_level * steps).max(0.0);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn mana_cost(&self) -> f64 {
        self.mana_cost
    }

    pub fn base_cooldown(&self) -> f32 {
        self.base_cooldown
    }

    /// Cooldown after the published cooldown reduction percentage.
    pub fn cooldown(&self, sheet: &StatSheet) -> f32 {
        let reduction = sheet.get(Quantity::CooldownReduction) as f32;
        self.base_cooldown * (1.0 - reduction / 100.0)
    }

    pub fn is_ready(&self) -> bool {
        self.cooling <= 0.0
    }

    pub fn remaining_cooldown(&self) -> f32 {
        self.cooling
    }

    /// Use the skill if it is off cooldown. Starts the reduced cooldown.
    pub fn trigger(&mut self, sheet: &StatSheet) -> bool {
        if !self.is_ready() {
            return false;
        }
        self.cooling = self.cooldown(sheet);
        tracing::debug!(skill = %self.name, cooldown = self.cooling, "skill used");
        true
    }

    pub fn tick(&mut self, delta: f32) {
        self.cooling = (self.cooling - delta).max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aura::StatusEffect;
    use crate::config::ProgressionConfig;
    use crate::stats::{EffectBuckets, PrimaryEffective, PrimaryStats, StatLayer};

    fn bash() -> SkillSpec {
        SkillSpec {
            name: "Bash".into(),
            cooldown: 10.0,
            mana_cost: 20.0,
            mana_cost_per_level: -2.0,
        }
    }

    fn sheet_with_reduction(percent: f64) -> StatSheet {
        let stats = PrimaryStats::new(&ProgressionConfig::default());
        let mut buckets = EffectBuckets::new();
        buckets.add(&StatusEffect::fixed(Quantity::CooldownReduction, percent));
        let primaries = PrimaryEffective::compute(&stats, &buckets);
        StatSheet::compute(&primaries, &buckets)
    }

    #[test]
    fn mana_cost_scales_with_level() {
        let spec = bash();
        let mut skill = Skill::from_spec(&spec, 1);
        assert_eq!(skill.mana_cost(), 20.0);
        skill.rescale(&spec, 4);
        assert_eq!(skill.mana_cost(), 14.0);
        assert_eq!(skill.level(), 4);
    }

    #[test]
    fn cooldown_reads_reduction() {
        let skill = Skill::from_spec(&bash(), 1);
        assert_eq!(skill.cooldown(&sheet_with_reduction(0.0)), 10.0);
        assert_eq!(skill.cooldown(&sheet_with_reduction(25.0)), 7.5);
        // capped at 80%
        assert!((skill.cooldown(&sheet_with_reduction(95.0)) - 2.0).abs() < 1e-5);
    }

    #[test]
    fn trigger_respects_cooldown() {
        let sheet = sheet_with_reduction(50.0);
        let mut skill = Skill::from_spec(&bash(), 1);

        assert!(skill.trigger(&sheet));
        assert!(!skill.trigger(&sheet));
        skill.tick(4.0);
        assert!(!skill.is_ready());
        skill.tick(1.0);
        assert!(skill.trigger(&sheet));
    }
}
