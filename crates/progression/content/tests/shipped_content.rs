//! The shipped data directory produces a playable character.

use progression_content::ContentFactory;
use progression_core::{CombatEvent, FixedRoll, Quantity, Stat};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn warrior_path_from_shipped_data() {
    init_tracing();
    let factory = ContentFactory::shipped();
    let mut hero = factory.new_character().unwrap();
    assert_eq!(hero.level(), 1);
    assert_eq!(hero.talents().len(), 15);

    for _ in 0..4 {
        hero.level_up().unwrap();
    }
    let might = hero.talent_id("might").unwrap();
    let cleave = hero.talent_id("cleave").unwrap();
    let rampage = hero.talent_id("rampage").unwrap();

    assert!(!hero.can_invest_talent(cleave));
    hero.invest_talent(might).unwrap();
    hero.invest_talent(might).unwrap();
    hero.invest_talent(cleave).unwrap();
    hero.invest_talent(rampage).unwrap();
    assert_eq!(hero.talents().available_points(), 0);

    // 10 base + might at rank 2
    assert_eq!(hero.stat(Quantity::Strength), 14.0);
    assert!(hero.use_skill(cleave));

    let before = hero.stat(Quantity::AttackSpeed);
    let fired = hero.on_combat_event(CombatEvent::MeleeCrit, &FixedRoll(0), 7);
    assert_eq!(fired.len(), 1);
    assert!(hero.stat(Quantity::AttackSpeed) > before);
}

#[test]
fn saved_character_reloads_against_shipped_data() {
    init_tracing();
    let factory = ContentFactory::shipped();
    let mut hero = factory.new_character().unwrap();
    hero.level_up().unwrap();
    hero.invest_in_stat(Stat::Vitality).unwrap();
    let focus = hero.talent_id("focus").unwrap();
    hero.invest_talent(focus).unwrap();

    let bytes = hero.save().unwrap();
    let restored = factory.load_character(&bytes).unwrap();

    assert_eq!(restored.level(), 2);
    assert_eq!(restored.stats().value(Stat::Vitality), 11);
    assert_eq!(restored.talents().level(focus), 1);
    assert_eq!(
        restored.stat(Quantity::Intelligence),
        hero.stat(Quantity::Intelligence)
    );
}
