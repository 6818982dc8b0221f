//! A single talent: definition plus runtime lifecycle state.

use arrayvec::ArrayVec;
use strum::{AsRefStr, Display};

use crate::aura::{Aura, AuraId, AuraLifecycle, AuraList, AuraSource};
use crate::rng::RngOracle;
use crate::stats::PrimaryStats;

use super::TalentId;
use super::definition::TalentDefinition;
use super::proc::ProcRegistry;
use super::skill::Skill;

/// Dormant at level 0, Active at level 1 and above.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, AsRefStr)]
pub enum LifecycleState {
    #[default]
    Dormant,
    Active,
}

/// Lifecycle hooks, in the order they can run for one level change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, AsRefStr)]
pub enum LifecycleHook {
    Initialize,
    Refresh,
    Uninitialize,
}

/// Outcome of a level change: old and new level and the hooks that ran.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelChange {
    pub talent: TalentId,
    pub from: u8,
    pub to: u8,
    pub hooks: ArrayVec<LifecycleHook, 2>,
}

/// Prerequisite edge resolved to a talent id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TalentRequirement {
    pub talent: TalentId,
    pub min_level: u8,
}

/// The character state a talent's hooks are allowed to touch.
pub struct TalentContext<'a> {
    pub auras: &'a mut AuraList,
    pub procs: &'a mut ProcRegistry,
    pub stats: &'a PrimaryStats,
}

/// A leveled node of the talent tree.
///
/// The talent exclusively owns its passive aura, its proc aura and its skill.
/// It never reaches into another talent's state.
#[derive(Clone, Debug)]
pub struct Talent {
    id: TalentId,
    definition: TalentDefinition,
    level: u8,
    state: LifecycleState,
    requirements: Vec<TalentRequirement>,
    dependents: Vec<TalentId>,
    passive: Option<AuraId>,
    proc_aura: Option<AuraId>,
    skill: Option<Skill>,
}

impl Talent {
    pub(crate) fn new(
        id: TalentId,
        definition: TalentDefinition,
        requirements: Vec<TalentRequirement>,
        dependents: Vec<TalentId>,
    ) -> Self {
        Self {
            id,
            definition,
            level: 0,
            state: LifecycleState::Dormant,
            requirements,
            dependents,
            passive: None,
            proc_aura: None,
            skill: None,
        }
    }

    pub fn id(&self) -> TalentId {
        self.id
    }

    pub fn key(&self) -> &str {
        &self.definition.key
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn definition(&self) -> &TalentDefinition {
        &self.definition
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn max_level(&self) -> u8 {
        self.definition.max_level
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == LifecycleState::Active
    }

    /// Prerequisites (AND-combined).
    pub fn requirements(&self) -> &[TalentRequirement] {
        &self.requirements
    }

    /// Layout successors. Not consulted for invest/undo legality.
    pub fn dependents(&self) -> &[TalentId] {
        &self.dependents
    }

    pub fn passive_aura(&self) -> Option<AuraId> {
        self.passive
    }

    pub fn proc_aura(&self) -> Option<AuraId> {
        self.proc_aura
    }

    pub fn skill(&self) -> Option<&Skill> {
        self.skill.as_ref()
    }

    pub fn skill_mut(&mut self) -> Option<&mut Skill> {
        self.skill.as_mut()
    }

    /// Description at the current level (level 0 previews level 1).
    pub fn description(&self) -> String {
        self.definition.describe(self.level)
    }

    /// Move to `to` and run the matching lifecycle hooks.
    ///
    /// 0→n runs Initialize then Refresh, n→0 runs Uninitialize, any other
    /// change runs Refresh. Setting the current level runs nothing.
    pub(crate) fn set_level(&mut self, to: u8, ctx: &mut TalentContext<'_>) -> LevelChange {
        debug_assert!(to <= self.definition.max_level, "talent level above max");

        let from = self.level;
        let mut hooks = ArrayVec::new();
        self.level = to;

        match (from, to) {
            (f, t) if f == t => {}
            (0, _) => {
                self.initialize(ctx);
                hooks.push(LifecycleHook::Initialize);
                self.refresh(ctx);
                hooks.push(LifecycleHook::Refresh);
            }
            (_, 0) => {
                self.uninitialize(ctx);
                hooks.push(LifecycleHook::Uninitialize);
            }
            _ => {
                self.refresh(ctx);
                hooks.push(LifecycleHook::Refresh);
            }
        }

        LevelChange {
            talent: self.id,
            from,
            to,
            hooks,
        }
    }

    fn initialize(&mut self, ctx: &mut TalentContext<'_>) {
        debug_assert_eq!(self.state, LifecycleState::Dormant, "initialize on an active talent");

        if !self.definition.effects.is_empty() {
            self.passive = Some(ctx.auras.allocate_id());
        }
        if let Some(proc_spec) = &self.definition.on_event {
            self.proc_aura = Some(ctx.auras.allocate_id());
            ctx.procs.subscribe(self.id, proc_spec.event);
        }
        self.state = LifecycleState::Active;
        tracing::debug!(talent = self.key(), "talent initialized");
    }

    /// Regenerate owned effects for the current level.
    ///
    /// Effects are rebuilt as fresh values and swapped in through
    /// [`AuraList::replace`], which always invalidates the aggregator.
    pub(crate) fn refresh(&mut self, ctx: &mut TalentContext<'_>) {
        debug_assert_eq!(self.state, LifecycleState::Active, "refresh on a dormant talent");

        if let Some(id) = self.passive {
            ctx.auras.replace(self.build_passive(id, ctx.stats));
        }
        // A running proc keeps its timer but picks up the new magnitudes.
        if let Some(id) = self.proc_aura
            && let Some(remaining) = ctx.auras.get(id).and_then(Aura::remaining)
            && let Some(aura) = self.build_proc(id, ctx.stats)
        {
            ctx.auras.replace(aura.with_remaining(remaining));
        }
        if let (Some(skill), Some(spec)) = (self.skill.as_mut(), self.definition.skill.as_ref()) {
            skill.rescale(spec, self.level);
        }
        tracing::trace!(talent = self.key(), level = self.level, "talent refreshed");
    }

    fn uninitialize(&mut self, ctx: &mut TalentContext<'_>) {
        debug_assert_eq!(self.state, LifecycleState::Active, "uninitialize on a dormant talent");

        if let Some(id) = self.passive.take() {
            ctx.auras.remove(id);
        }
        if let Some(id) = self.proc_aura.take() {
            ctx.auras.remove(id);
        }
        ctx.procs.unsubscribe(self.id);
        self.skill = None;
        self.state = LifecycleState::Dormant;
        tracing::debug!(talent = self.key(), "talent uninitialized");
    }

    /// Lazily build the skill. Dormant talents and talents without a skill
    /// return `None`.
    pub fn create_skill(&mut self) -> Option<&mut Skill> {
        if !self.is_active() {
            return None;
        }
        let spec = self.definition.skill.as_ref()?;
        let level = self.level;
        Some(self.skill.get_or_insert_with(|| Skill::from_spec(spec, level)))
    }

    /// Roll this talent's proc and, on success, (re)install its timed aura.
    pub(crate) fn fire_proc(
        &self,
        auras: &mut AuraList,
        stats: &PrimaryStats,
        rng: &dyn RngOracle,
        seed: u64,
    ) -> Option<AuraId> {
        let proc_spec = self.definition.on_event.as_ref()?;
        let id = self.proc_aura?;
        if !rng.chance(seed, proc_spec.chance_at(self.level)) {
            return None;
        }

        let aura = self.build_proc(id, stats)?;
        if auras.contains(id) {
            // Re-arm and pick up current magnitudes.
            auras.replace(aura);
        } else {
            auras.add(aura);
        }
        tracing::debug!(talent = self.key(), aura = %proc_spec.aura, "proc fired");
        Some(id)
    }

    fn build_passive(&self, id: AuraId, stats: &PrimaryStats) -> Aura {
        let effects = self
            .definition
            .effects
            .iter()
            .map(|scaling| scaling.effect_at(self.level, stats));
        let mut aura = Aura::new(id, self.definition.name.clone(), AuraLifecycle::Permanent)
            .with_effects(effects)
            .with_source(AuraSource::Talent(self.definition.key.clone()))
            .with_description(self.description());
        if let Some(symbol) = &self.definition.symbol {
            aura = aura.with_symbol(symbol.clone());
        }
        aura
    }

    fn build_proc(&self, id: AuraId, stats: &PrimaryStats) -> Option<Aura> {
        let proc_spec = self.definition.on_event.as_ref()?;
        let effects = proc_spec
            .effects
            .iter()
            .map(|scaling| scaling.effect_at(self.level, stats));
        Some(
            Aura::new(
                id,
                proc_spec.aura.clone(),
                AuraLifecycle::Timed {
                    duration: proc_spec.duration,
                },
            )
            .with_effects(effects)
            .with_source(AuraSource::Proc(self.definition.key.clone())),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aura::Manipulation;
    use crate::config::ProgressionConfig;
    use crate::rng::FixedRoll;
    use crate::stats::Quantity;
    use crate::talent::definition::{EffectScaling, ProcSpec, SkillSpec};
    use crate::talent::proc::CombatEvent;

    struct Fixture {
        auras: AuraList,
        procs: ProcRegistry,
        stats: PrimaryStats,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                auras: AuraList::new(),
                procs: ProcRegistry::new(),
                stats: PrimaryStats::new(&ProgressionConfig::default()),
            }
        }

        fn ctx(&mut self) -> TalentContext<'_> {
            TalentContext {
                auras: &mut self.auras,
                procs: &mut self.procs,
                stats: &self.stats,
            }
        }
    }

    fn iron_skin() -> Talent {
        let definition = TalentDefinition::new("iron_skin", "Iron Skin", 3)
            .effect(EffectScaling::new(Quantity::Armor, Manipulation::Fixed, 5.0, 5.0))
            .skill(SkillSpec {
                name: "Harden".into(),
                cooldown: 20.0,
                mana_cost: 10.0,
                mana_cost_per_level: 0.0,
            })
            .proc_on(ProcSpec {
                aura: "Bulwark".into(),
                event: CombatEvent::Block,
                chance: 50.0,
                chance_per_level: 0.0,
                duration: 3.0,
                effects: vec![EffectScaling::new(
                    Quantity::BlockChance,
                    Manipulation::Fixed,
                    10.0,
                    0.0,
                )],
            });
        Talent::new(TalentId(0), definition, Vec::new(), Vec::new())
    }

    #[test]
    fn lifecycle_hooks_follow_level_changes() {
        let mut fx = Fixture::new();
        let mut talent = iron_skin();

        let up = talent.set_level(1, &mut fx.ctx());
        assert_eq!(up.hooks.as_slice(), &[LifecycleHook::Initialize, LifecycleHook::Refresh]);

        let up = talent.set_level(2, &mut fx.ctx());
        assert_eq!(up.hooks.as_slice(), &[LifecycleHook::Refresh]);

        let down = talent.set_level(0, &mut fx.ctx());
        assert_eq!(down.hooks.as_slice(), &[LifecycleHook::Uninitialize]);
        assert_eq!(talent.state(), LifecycleState::Dormant);

        let same = talent.set_level(0, &mut fx.ctx());
        assert!(same.hooks.is_empty());
    }

    #[test]
    fn passive_aura_tracks_level() {
        let mut fx = Fixture::new();
        let mut talent = iron_skin();

        talent.set_level(1, &mut fx.ctx());
        let id = talent.passive_aura().unwrap();
        assert_eq!(fx.auras.get(id).unwrap().effects()[0].magnitude(), 5.0);

        let revision = fx.auras.revision();
        talent.set_level(3, &mut fx.ctx());
        assert!(fx.auras.revision() > revision);
        assert_eq!(fx.auras.get(id).unwrap().effects()[0].magnitude(), 15.0);
        assert_eq!(
            fx.auras.get(id).unwrap().source(),
            &AuraSource::Talent("iron_skin".into())
        );

        talent.set_level(0, &mut fx.ctx());
        assert!(fx.auras.is_empty());
        assert!(talent.passive_aura().is_none());
    }

    #[test]
    fn proc_subscription_follows_lifecycle() {
        let mut fx = Fixture::new();
        let mut talent = iron_skin();

        talent.set_level(1, &mut fx.ctx());
        assert!(fx.procs.is_subscribed(talent.id()));

        assert!(talent.fire_proc(&mut fx.auras, &fx.stats, &FixedRoll(99), 0).is_none());
        let fired = talent.fire_proc(&mut fx.auras, &fx.stats, &FixedRoll(0), 0).unwrap();
        assert_eq!(fx.auras.get(fired).unwrap().remaining(), Some(3.0));

        talent.set_level(0, &mut fx.ctx());
        assert!(!fx.procs.is_subscribed(talent.id()));
        assert!(!fx.auras.contains(fired));
    }

    #[test]
    fn skill_is_lazy_and_dropped_when_dormant() {
        let mut fx = Fixture::new();
        let mut talent = iron_skin();

        assert!(talent.create_skill().is_none());
        talent.set_level(1, &mut fx.ctx());
        assert!(talent.skill().is_none());
        assert_eq!(talent.create_skill().unwrap().name(), "Harden");
        assert!(talent.skill().is_some());

        talent.set_level(2, &mut fx.ctx());
        assert_eq!(talent.skill().unwrap().level(), 2);

        talent.set_level(0, &mut fx.ctx());
        assert!(talent.skill().is_none());
    }
}
