//! Shared fixtures for integration tests.
#![allow(dead_code)]

use progression_core::{
    Character, CombatEvent, EffectScaling, Manipulation, ProcSpec, ProgressionConfig, Quantity,
    SkillSpec, Stat, TalentDefinition, TalentTree,
};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Small two-branch catalog exercising every talent feature.
///
/// ```text
/// might ─@2─▶ cleave ─@1─▶ rampage
///   └───@1──▶ iron_will
/// focus ─@1─▶ arcane_surge
/// ```
pub fn catalog() -> Vec<TalentDefinition> {
    vec![
        TalentDefinition::new("might", "Might", 5)
            .effect(EffectScaling::new(Quantity::Strength, Manipulation::Fixed, 2.0, 2.0))
            .leads_to("cleave")
            .leads_to("iron_will"),
        TalentDefinition::new("cleave", "Cleave", 3)
            .requires("might", 2)
            .effect(EffectScaling::new(
                Quantity::MeleeDamage,
                Manipulation::Percental,
                10.0,
                5.0,
            ))
            .skill(SkillSpec {
                name: "Cleave".into(),
                cooldown: 6.0,
                mana_cost: 8.0,
                mana_cost_per_level: 1.0,
            })
            .leads_to("rampage"),
        TalentDefinition::new("rampage", "Rampage", 2)
            .requires("cleave", 1)
            .proc_on(ProcSpec {
                aura: "Rampage".into(),
                event: CombatEvent::MeleeCrit,
                chance: 30.0,
                chance_per_level: 20.0,
                duration: 5.0,
                effects: vec![EffectScaling::new(
                    Quantity::AttackSpeed,
                    Manipulation::Percental,
                    15.0,
                    10.0,
                )],
            }),
        TalentDefinition::new("iron_will", "Iron Will", 3)
            .requires("might", 1)
            .effect(
                EffectScaling::new(Quantity::Armor, Manipulation::Fixed, 5.0, 0.0)
                    .scaled_by(Stat::Vitality, 0.5),
            ),
        TalentDefinition::new("focus", "Focus", 4)
            .effect(EffectScaling::new(Quantity::MaxMana, Manipulation::Percental, 5.0, 5.0))
            .leads_to("arcane_surge"),
        TalentDefinition::new("arcane_surge", "Arcane Surge", 1)
            .requires("focus", 1)
            .proc_on(ProcSpec {
                aura: "Surge".into(),
                event: CombatEvent::SpellCast,
                chance: 50.0,
                chance_per_level: 0.0,
                duration: 3.0,
                effects: vec![EffectScaling::new(
                    Quantity::SpellDamage,
                    Manipulation::Fixed,
                    12.0,
                    0.0,
                )],
            }),
    ]
}

pub fn tree() -> TalentTree {
    TalentTree::setup_network(catalog()).expect("catalog is valid")
}

pub fn character() -> Character {
    Character::new(ProgressionConfig::default(), tree())
}
