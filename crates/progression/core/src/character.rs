//! Character facade - the single owner of all progression state.
//!
//! Every mutation goes through here so the couplings between the pieces stay
//! in one place:
//!
//! - a stat investment or undo re-checks equipment requirements and refreshes
//!   talents whose effects read base stats,
//! - talent level changes mutate the aura list through the talent hooks,
//! - every input carries a revision, so the next stat query recomputes.

use crate::aura::{Aura, AuraId, AuraList, AuraSource};
use crate::config::ProgressionConfig;
use crate::equipment::{Equipment, EquipmentError, Item};
use crate::error::{ErrorSeverity, ProgressionError};
use crate::rng::RngOracle;
use crate::stats::{
    EffectSource, PrimaryStats, Quantity, Stat, StatAggregator, StatError, StatSheet,
};
use crate::talent::{
    CombatEvent, LevelChange, NetworkError, ProcRegistry, TalentContext, TalentDefinition,
    TalentError, TalentId, TalentTree,
};

/// Errors raised by character-level operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CharacterError {
    #[error("character is already at max level {0}")]
    MaxLevel(u32),
}

impl ProgressionError for CharacterError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Recoverable
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::MaxLevel(_) => "CHARACTER_MAX_LEVEL",
        }
    }
}

/// Progression state of one character.
#[derive(Debug)]
pub struct Character {
    pub(crate) config: ProgressionConfig,
    pub(crate) level: u32,
    pub(crate) stats: PrimaryStats,
    pub(crate) auras: AuraList,
    pub(crate) equipment: Equipment,
    pub(crate) procs: ProcRegistry,
    pub(crate) talents: TalentTree,
    pub(crate) aggregator: StatAggregator,
    pub(crate) event_nonce: u64,
}

impl Character {
    /// Level 1 character with starting stats, no points and no talents.
    pub fn new(config: ProgressionConfig, talents: TalentTree) -> Self {
        let stats = PrimaryStats::new(&config);
        Self {
            config,
            level: 1,
            stats,
            auras: AuraList::new(),
            equipment: Equipment::new(),
            procs: ProcRegistry::new(),
            talents,
            aggregator: StatAggregator::new(),
            event_nonce: 0,
        }
    }

    /// Build the talent tree from definitions and create a character.
    pub fn from_definitions(
        config: ProgressionConfig,
        definitions: Vec<TalentDefinition>,
    ) -> Result<Self, NetworkError> {
        let talents = TalentTree::setup_network(definitions)?;
        Ok(Self::new(config, talents))
    }

    // ===== accessors =====

    pub fn config(&self) -> &ProgressionConfig {
        &self.config
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn stats(&self) -> &PrimaryStats {
        &self.stats
    }

    pub fn auras(&self) -> &AuraList {
        &self.auras
    }

    pub fn equipment(&self) -> &Equipment {
        &self.equipment
    }

    pub fn procs(&self) -> &ProcRegistry {
        &self.procs
    }

    pub fn talents(&self) -> &TalentTree {
        &self.talents
    }

    // ===== leveling =====

    /// Raise the character level and grant stat and talent points.
    pub fn level_up(&mut self) -> Result<u32, CharacterError> {
        if self.level >= ProgressionConfig::MAX_CHARACTER_LEVEL {
            return Err(CharacterError::MaxLevel(self.level));
        }
        self.level += 1;
        self.stats.grant_points(self.config.stat_points_per_level);
        self.talents.grant_points(self.config.talent_points_per_level);
        tracing::debug!(level = self.level, "character leveled up");
        Ok(self.level)
    }

    // ===== stat economy =====

    pub fn can_invest_in_stat(&self, stat: Stat) -> bool {
        self.stats.can_invest_in_stat(stat)
    }

    pub fn points_required_for_stat(&self, stat: Stat) -> u32 {
        self.stats.points_required_for_stat(stat)
    }

    pub fn points_gained_by_decreasing_stat(&self, stat: Stat) -> u32 {
        self.stats.points_gained_by_decreasing_stat(stat)
    }

    /// Raise a stat by one. Returns the points paid.
    pub fn invest_in_stat(&mut self, stat: Stat) -> Result<u32, StatError> {
        let paid = self.stats.invest_in_stat(stat)?;
        self.after_stat_change();
        Ok(paid)
    }

    /// Lower a stat by one. Returns the points refunded.
    pub fn undo_investment_in_stat(&mut self, stat: Stat) -> Result<u32, StatError> {
        let refund = self.stats.undo_investment_in_stat(stat)?;
        self.after_stat_change();
        Ok(refund)
    }

    fn after_stat_change(&mut self) {
        self.equipment.recheck(&self.stats);
        let mut ctx = TalentContext {
            auras: &mut self.auras,
            procs: &mut self.procs,
            stats: &self.stats,
        };
        self.talents.refresh_stat_scaled(&mut ctx);
    }

    // ===== talents =====

    pub fn talent_id(&self, key: &str) -> Option<TalentId> {
        self.talents.id_of(key)
    }

    pub fn can_invest_talent(&self, id: TalentId) -> bool {
        self.talents.can_invest(id)
    }

    pub fn can_undo_talent(&self, id: TalentId) -> bool {
        self.talents.can_undo(id)
    }

    pub fn invest_talent(&mut self, id: TalentId) -> Result<LevelChange, TalentError> {
        let mut ctx = TalentContext {
            auras: &mut self.auras,
            procs: &mut self.procs,
            stats: &self.stats,
        };
        self.talents.invest(id, &mut ctx)
    }

    pub fn undo_talent(&mut self, id: TalentId) -> Result<LevelChange, TalentError> {
        let mut ctx = TalentContext {
            auras: &mut self.auras,
            procs: &mut self.procs,
            stats: &self.stats,
        };
        self.talents.undo(id, &mut ctx)
    }

    /// Respec all talents. Returns the refunded points.
    pub fn reset_talents(&mut self) -> u32 {
        let mut ctx = TalentContext {
            auras: &mut self.auras,
            procs: &mut self.procs,
            stats: &self.stats,
        };
        self.talents.reset(&mut ctx)
    }

    /// Use a talent's skill if it is off cooldown. The skill is created on
    /// first use.
    pub fn use_skill(&mut self, id: TalentId) -> bool {
        let sheet = self.stat_sheet();
        self.talents
            .get_mut(id)
            .and_then(|talent| talent.create_skill())
            .is_some_and(|skill| skill.trigger(&sheet))
    }

    // ===== auras =====

    /// Identity for an externally created aura.
    pub fn allocate_aura_id(&mut self) -> AuraId {
        self.auras.allocate_id()
    }

    /// Add an external aura. Returns false when nothing was inserted.
    ///
    /// Auras tagged as talent or proc auras, or carrying an identity a
    /// talent owns, are refused: those are installed by talent hooks only.
    pub fn add_aura(&mut self, aura: Aura) -> bool {
        if *aura.source() != AuraSource::External {
            tracing::warn!(
                name = aura.name(),
                source = ?aura.source(),
                "refusing non-external aura"
            );
            return false;
        }
        if let Some(owner) = self.talents.aura_owner(aura.id()) {
            tracing::warn!(
                id = %aura.id(),
                talent = owner.key(),
                "refusing aura owned by a talent"
            );
            return false;
        }
        self.auras.add(aura)
    }

    /// Remove an external aura. Talent passives and proc auras follow their
    /// talent's lifecycle and are left in place.
    pub fn remove_aura(&mut self, id: AuraId) -> Option<Aura> {
        if let Some(owner) = self.talents.aura_owner(id) {
            tracing::warn!(id = %id, talent = owner.key(), "refusing to remove talent aura");
            return None;
        }
        self.auras.remove(id)
    }

    /// Advance timers by `delta` seconds. Returns the auras that expired.
    ///
    /// Call once per update step before querying stats for that frame.
    pub fn update(&mut self, delta: f32) -> Vec<Aura> {
        self.talents.tick_skills(delta);
        self.auras.tick(delta)
    }

    /// Let subscribed talents react to a combat event. Returns the proc
    /// auras that fired.
    pub fn on_combat_event(
        &mut self,
        event: CombatEvent,
        rng: &dyn RngOracle,
        seed: u64,
    ) -> Vec<AuraId> {
        self.event_nonce += 1;
        let mut ctx = TalentContext {
            auras: &mut self.auras,
            procs: &mut self.procs,
            stats: &self.stats,
        };
        self.talents
            .dispatch(event, &mut ctx, rng, seed, self.event_nonce)
    }

    // ===== equipment =====

    pub fn equip(&mut self, item: Item) -> Result<(), EquipmentError> {
        self.equipment.equip(item, &self.stats)
    }

    pub fn unequip(&mut self, name: &str) -> Option<Item> {
        self.equipment.unequip(name)
    }

    // ===== derived stats =====

    /// Current value of one quantity.
    pub fn stat(&self, quantity: Quantity) -> f64 {
        self.aggregator
            .get(quantity, &self.stats, &self.effect_sources())
    }

    /// Every quantity at once.
    pub fn stat_sheet(&self) -> StatSheet {
        self.aggregator.sheet(&self.stats, &self.effect_sources())
    }

    /// Times the derived stats were recomputed. Diagnostic.
    pub fn recomputations(&self) -> u64 {
        self.aggregator.recomputations()
    }

    fn effect_sources(&self) -> [&dyn EffectSource; 2] {
        [&self.auras, &self.equipment]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aura::{AuraLifecycle, Manipulation, StatusEffect};
    use crate::rng::FixedRoll;
    use crate::talent::{EffectScaling, ProcSpec, SkillSpec};

    fn definitions() -> Vec<TalentDefinition> {
        vec![
            TalentDefinition::new("toughness", "Toughness", 3).effect(EffectScaling::new(
                Quantity::MaxLife,
                Manipulation::Percental,
                5.0,
                5.0,
            )),
            TalentDefinition::new("bulwark", "Bulwark", 2)
                .requires("toughness", 1)
                .effect(
                    EffectScaling::new(Quantity::BlockValue, Manipulation::Fixed, 0.0, 0.0)
                        .scaled_by(Stat::Strength, 1.0),
                ),
            TalentDefinition::new("riposte", "Riposte", 1)
                .skill(SkillSpec {
                    name: "Riposte".into(),
                    cooldown: 8.0,
                    mana_cost: 5.0,
                    mana_cost_per_level: 0.0,
                })
                .proc_on(ProcSpec {
                    aura: "Counter Stance".into(),
                    event: CombatEvent::Block,
                    chance: 25.0,
                    chance_per_level: 0.0,
                    duration: 2.0,
                    effects: vec![EffectScaling::new(
                        Quantity::CritChance,
                        Manipulation::Fixed,
                        20.0,
                        0.0,
                    )],
                }),
        ]
    }

    fn character() -> Character {
        Character::from_definitions(ProgressionConfig::default(), definitions()).unwrap()
    }

    #[test]
    fn level_up_grants_points() {
        let mut hero = character();
        assert_eq!(hero.level_up(), Ok(2));
        assert_eq!(hero.stats().free_points(), 5);
        assert_eq!(hero.talents().available_points(), 1);
    }

    #[test]
    fn level_up_stops_at_max() {
        let mut hero = character();
        while hero.level() < ProgressionConfig::MAX_CHARACTER_LEVEL {
            hero.level_up().unwrap();
        }
        assert_eq!(
            hero.level_up(),
            Err(CharacterError::MaxLevel(ProgressionConfig::MAX_CHARACTER_LEVEL))
        );
    }

    #[test]
    fn talent_invest_updates_stats() {
        let mut hero = character();
        hero.level_up().unwrap();
        let toughness = hero.talent_id("toughness").unwrap();

        // 50 + 10 × 10
        assert_eq!(hero.stat(Quantity::MaxLife), 150.0);
        hero.invest_talent(toughness).unwrap();
        assert_eq!(hero.stat(Quantity::MaxLife), 157.5);
        hero.undo_talent(toughness).unwrap();
        assert_eq!(hero.stat(Quantity::MaxLife), 150.0);
    }

    #[test]
    fn stat_scaled_talent_follows_investment() {
        let mut hero = character();
        hero.level_up().unwrap();
        hero.level_up().unwrap();
        hero.invest_talent(hero.talent_id("toughness").unwrap()).unwrap();
        hero.invest_talent(hero.talent_id("bulwark").unwrap()).unwrap();

        // 0.5 × 10 base + 1.0 × 10 × 1 from the talent
        assert_eq!(hero.stat(Quantity::BlockValue), 15.0);
        hero.invest_in_stat(Stat::Strength).unwrap();
        // 0.5 × 11 + 11
        assert_eq!(hero.stat(Quantity::BlockValue), 16.5);
        hero.undo_investment_in_stat(Stat::Strength).unwrap();
        assert_eq!(hero.stat(Quantity::BlockValue), 15.0);
    }

    #[test]
    fn equipment_deactivates_after_stat_undo() {
        let mut hero = character();
        hero.level_up().unwrap();
        hero.invest_in_stat(Stat::Strength).unwrap();
        hero.equip(
            Item::new("Maul")
                .requires(Stat::Strength, 11)
                .with_effect(StatusEffect::fixed(Quantity::MeleeDamage, 7.0)),
        )
        .unwrap();
        assert_eq!(hero.stat(Quantity::MeleeDamage), 18.0);

        hero.undo_investment_in_stat(Stat::Strength).unwrap();
        assert_eq!(hero.equipment().is_active("Maul"), Some(false));
        assert_eq!(hero.stat(Quantity::MeleeDamage), 10.0);
    }

    #[test]
    fn procs_fire_and_expire() {
        let mut hero = character();
        hero.level_up().unwrap();
        let riposte = hero.talent_id("riposte").unwrap();
        hero.invest_talent(riposte).unwrap();

        let base_crit = hero.stat(Quantity::CritChance);
        assert!(hero.on_combat_event(CombatEvent::Block, &FixedRoll(99), 1).is_empty());
        assert!(hero.on_combat_event(CombatEvent::Dodge, &FixedRoll(0), 1).is_empty());

        let fired = hero.on_combat_event(CombatEvent::Block, &FixedRoll(0), 1);
        assert_eq!(fired.len(), 1);
        assert_eq!(hero.stat(Quantity::CritChance), base_crit + 20.0);

        assert_eq!(hero.update(2.0).len(), 1);
        assert_eq!(hero.stat(Quantity::CritChance), base_crit);
    }

    #[test]
    fn skill_cooldown_runs_on_update() {
        let mut hero = character();
        hero.level_up().unwrap();
        let riposte = hero.talent_id("riposte").unwrap();
        assert!(!hero.use_skill(riposte));

        hero.invest_talent(riposte).unwrap();
        assert!(hero.use_skill(riposte));
        assert!(!hero.use_skill(riposte));
        hero.update(8.0);
        assert!(hero.use_skill(riposte));
    }

    #[test]
    fn external_auras_invalidate_cache() {
        let mut hero = character();
        let before = hero.stat(Quantity::Armor);
        let id = hero.allocate_aura_id();
        hero.add_aura(
            Aura::new(id, "Stoneskin", AuraLifecycle::Timed { duration: 5.0 })
                .with_effect(StatusEffect::fixed(Quantity::Armor, 30.0)),
        );
        assert_eq!(hero.stat(Quantity::Armor), before + 30.0);
        assert!(hero.remove_aura(id).is_some());
        assert_eq!(hero.stat(Quantity::Armor), before);
    }

    #[test]
    fn talent_auras_cannot_be_claimed_from_outside() {
        let mut hero = character();
        hero.level_up().unwrap();
        let potion = hero.allocate_aura_id();
        assert!(hero.add_aura(
            Aura::new(potion, "Potion", AuraLifecycle::Permanent)
                .with_effect(StatusEffect::fixed(Quantity::Armor, 50.0)),
        ));
        let armor = hero.stat(Quantity::Armor);

        let toughness = hero.talent_id("toughness").unwrap();
        hero.invest_talent(toughness).unwrap();
        let passive = hero.talents().get(toughness).unwrap().passive_aura().unwrap();
        assert_ne!(passive, potion);
        assert_eq!(hero.auras().len(), 2);
        assert_eq!(hero.stat(Quantity::Armor), armor);

        let impostor = Aura::new(passive, "Impostor", AuraLifecycle::Permanent)
            .with_effect(StatusEffect::fixed(Quantity::Armor, 1.0));
        assert!(!hero.add_aura(impostor));
        assert_eq!(hero.auras().get(passive).unwrap().name(), "Toughness");

        let id = hero.allocate_aura_id();
        let tagged = Aura::new(id, "Toughness", AuraLifecycle::Permanent)
            .with_source(AuraSource::Talent("toughness".into()));
        assert!(!hero.add_aura(tagged));
        assert_eq!(hero.auras().len(), 2);
    }

    #[test]
    fn talent_auras_cannot_be_removed_from_outside() {
        let mut hero = character();
        hero.level_up().unwrap();
        hero.level_up().unwrap();
        let toughness = hero.talent_id("toughness").unwrap();
        let riposte = hero.talent_id("riposte").unwrap();
        hero.invest_talent(toughness).unwrap();
        hero.invest_talent(riposte).unwrap();
        let passive = hero.talents().get(toughness).unwrap().passive_aura().unwrap();
        let fired = hero.on_combat_event(CombatEvent::Block, &FixedRoll(0), 1);

        assert!(hero.remove_aura(passive).is_none());
        assert!(hero.remove_aura(fired[0]).is_none());
        assert!(hero.auras().contains(passive));
        assert!(hero.auras().contains(fired[0]));
        assert!(hero.talents().get(toughness).unwrap().is_active());
        assert_eq!(hero.stat(Quantity::MaxLife), 157.5);
    }

    #[test]
    fn repeated_queries_hit_the_cache() {
        let hero = character();
        hero.stat(Quantity::MaxLife);
        hero.stat(Quantity::Armor);
        hero.stat_sheet();
        assert_eq!(hero.recomputations(), 1);
    }
}
