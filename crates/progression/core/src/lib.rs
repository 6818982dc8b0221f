//! Character progression engine.
//!
//! `progression-core` owns the rules that turn investments into numbers: the
//! primary stat economy, the prerequisite-gated talent tree, and the layered
//! aggregation of status effects into derived statistics. All mutation flows
//! through [`Character`], and every derived value is read back through its
//! memoizing [`StatAggregator`].
pub mod aura;
pub mod character;
pub mod config;
pub mod equipment;
pub mod error;
pub mod rng;
#[cfg(feature = "serde")]
pub mod save;
pub mod stats;
pub mod talent;

pub use aura::{
    Aura, AuraFlags, AuraId, AuraLifecycle, AuraList, AuraSource, Manipulation, StatusEffect,
};
pub use character::{Character, CharacterError};
pub use config::{ConfigError, CostCurve, CostTier, ProgressionConfig};
pub use equipment::{Equipment, EquipmentError, Item, StatRequirement};
pub use error::{ErrorSeverity, ProgressionError};
pub use rng::{FixedRoll, PcgRng, RngOracle, compute_seed};
#[cfg(feature = "serde")]
pub use save::{AuraRecord, CharacterRecord, SAVE_VERSION, SaveError};
pub use stats::{
    EffectBuckets, EffectSource, EffectTotal, PrimaryEffective, PrimaryStats, QUANTITY_COUNT,
    Quantity, STAT_COUNT, Stat, StatAggregator, StatBounds, StatError, StatLayer, StatSheet,
};
pub use talent::{
    CombatEvent, EffectScaling, LevelChange, LifecycleHook, LifecycleState, NetworkError,
    ProcRegistry, ProcSpec, RequirementSpec, Skill, SkillSpec, StatScaling, Talent,
    TalentContext, TalentDefinition, TalentError, TalentId, TalentRequirement, TalentTree,
};
