//! Talent definitions - pure configuration data.
//!
//! A definition says what a talent does at every level. It carries no runtime
//! state; the [`Talent`](super::Talent) node pairs it with a level and the
//! aura/skill it currently owns. Catalogs of definitions are loaded from data
//! files by the content crate.

use crate::aura::{Manipulation, StatusEffect};
use crate::stats::{PrimaryStats, Quantity, Stat};

use super::proc::CombatEvent;

/// Prerequisite edge as written in data: `talent` must be at `min_level`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RequirementSpec {
    pub talent: String,
    pub min_level: u8,
}

/// Extra magnitude that grows with a primary stat's base value.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatScaling {
    pub stat: Stat,
    /// Magnitude added per stat point, per talent level.
    pub ratio: f64,
}

/// A status effect whose magnitude depends on the talent's level.
///
/// ```text
/// magnitude(level) = base + per_level × (level - 1) [+ ratio × stat × level]
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectScaling {
    pub quantity: Quantity,
    pub kind: Manipulation,
    pub base: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub per_level: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub per_stat: Option<StatScaling>,
}

impl EffectScaling {
    pub fn new(quantity: Quantity, kind: Manipulation, base: f64, per_level: f64) -> Self {
        Self {
            quantity,
            kind,
            base,
            per_level,
            per_stat: None,
        }
    }

    pub fn scaled_by(mut self, stat: Stat, ratio: f64) -> Self {
        self.per_stat = Some(StatScaling { stat, ratio });
        self
    }

    /// Magnitude ignoring any stat scaling.
    pub fn magnitude_at(&self, level: u8) -> f64 {
        let steps = f64::from(level.saturating_sub(1));
        self.base + self.per_level * steps
    }

    /// Build the effect for a level, reading base stats for stat scaling.
    pub fn effect_at(&self, level: u8, stats: &PrimaryStats) -> StatusEffect {
        let mut magnitude = self.magnitude_at(level);
        if let Some(scaling) = self.per_stat {
            magnitude += scaling.ratio * f64::from(stats.value(scaling.stat)) * f64::from(level);
        }
        StatusEffect::new(self.quantity, self.kind, magnitude)
    }
}

/// Active skill granted by a talent.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillSpec {
    pub name: String,
    /// Cooldown in seconds before cooldown reduction.
    pub cooldown: f32,
    pub mana_cost: f64,
    /// Mana cost change per talent level above 1.
    #[cfg_attr(feature = "serde", serde(default))]
    pub mana_cost_per_level: f64,
}

/// Chance-based timed aura fired by a combat event.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProcSpec {
    /// Name of the aura installed when the proc fires.
    pub aura: String,
    pub event: CombatEvent,
    /// Proc chance in percent at level 1.
    pub chance: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub chance_per_level: f64,
    /// Seconds the proc aura lasts.
    pub duration: f32,
    pub effects: Vec<EffectScaling>,
}

impl ProcSpec {
    pub fn chance_at(&self, level: u8) -> f64 {
        self.chance + self.chance_per_level * f64::from(level.saturating_sub(1))
    }
}

/// Everything a talent does, keyed by a stable string identifier.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TalentDefinition {
    /// Stable identifier used in requirements and save records.
    pub key: String,
    pub name: String,
    pub max_level: u8,
    #[cfg_attr(feature = "serde", serde(default))]
    pub requirements: Vec<RequirementSpec>,
    /// Talents drawn below this one in the tree layout. Informational only;
    /// invest/undo legality is derived from `requirements`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub dependents: Vec<String>,
    /// Passive effects, installed as one permanent aura while the talent is
    /// active.
    #[cfg_attr(feature = "serde", serde(default))]
    pub effects: Vec<EffectScaling>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub skill: Option<SkillSpec>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub on_event: Option<ProcSpec>,
    /// Description template. `{level}` and `{max}` expand to levels, `{0}`,
    /// `{1}`, ... to passive magnitudes, `{chance}` and `{duration}` to the
    /// proc's values, `{pN}` to proc effect magnitudes.
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub symbol: Option<String>,
}

impl TalentDefinition {
    pub fn new(key: impl Into<String>, name: impl Into<String>, max_level: u8) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            max_level,
            requirements: Vec::new(),
            dependents: Vec::new(),
            effects: Vec::new(),
            skill: None,
            on_event: None,
            description: String::new(),
            symbol: None,
        }
    }

    pub fn requires(mut self, talent: impl Into<String>, min_level: u8) -> Self {
        self.requirements.push(RequirementSpec {
            talent: talent.into(),
            min_level,
        });
        self
    }

    pub fn leads_to(mut self, talent: impl Into<String>) -> Self {
        self.dependents.push(talent.into());
        self
    }

    pub fn effect(mut self, scaling: EffectScaling) -> Self {
        self.effects.push(scaling);
        self
    }

    pub fn skill(mut self, skill: SkillSpec) -> Self {
        self.skill = Some(skill);
        self
    }

    pub fn proc_on(mut self, proc_spec: ProcSpec) -> Self {
        self.on_event = Some(proc_spec);
        self
    }

    pub fn described(mut self, template: impl Into<String>) -> Self {
        self.description = template.into();
        self
    }

    /// True when any passive effect scales with a primary stat; such talents
    /// must refresh whenever base stats change.
    pub fn reads_stats(&self) -> bool {
        self.effects.iter().any(|effect| effect.per_stat.is_some())
    }

    /// Render the description for `level`. Level 0 previews level 1.
    ///
    /// Pure: no side effects, no access to character state. Stat-scaled
    /// effects show only their level-based part.
    pub fn describe(&self, level: u8) -> String {
        let level = level.clamp(1, self.max_level.max(1));
        let mut text = self
            .description
            .replace("{level}", &level.to_string())
            .replace("{max}", &self.max_level.to_string());

        for (index, effect) in self.effects.iter().enumerate() {
            text = text.replace(&format!("{{{index}}}"), &format_value(effect.magnitude_at(level)));
        }
        if let Some(proc_spec) = &self.on_event {
            text = text
                .replace("{chance}", &format_value(proc_spec.chance_at(level)))
                .replace("{duration}", &format_value(f64::from(proc_spec.duration)));
            for (index, effect) in proc_spec.effects.iter().enumerate() {
                text = text.replace(
                    &format!("{{p{index}}}"),
                    &format_value(effect.magnitude_at(level)),
                );
            }
        }
        text
    }
}

fn format_value(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded}")
}
