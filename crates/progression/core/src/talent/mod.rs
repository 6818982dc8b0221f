//! Talents and the prerequisite-gated talent tree.
//!
//! # Lifecycle
//!
//! ```text
//!   Dormant (level 0) ──invest──▶ Active (level ≥ 1)
//!        ▲                           │
//!        └────────undo to 0──────────┘
//! ```
//!
//! - 0→1 runs `Initialize` (allocate auras, subscribe procs) then `Refresh`.
//! - Every other level change while active runs `Refresh`, which rebuilds
//!   the talent's effects as fresh values and swaps them into the aura list.
//! - 1→0 runs `Uninitialize` (remove auras, unsubscribe, drop skill).
//!
//! Concrete talents are data ([`TalentDefinition`]); there is one runtime
//! node type ([`Talent`]).

pub mod definition;
pub mod node;
pub mod proc;
pub mod skill;
pub mod tree;

pub use definition::{
    EffectScaling, ProcSpec, RequirementSpec, SkillSpec, StatScaling, TalentDefinition,
};
pub use node::{
    LevelChange, LifecycleHook, LifecycleState, Talent, TalentContext, TalentRequirement,
};
pub use proc::{CombatEvent, ProcRegistry};
pub use skill::Skill;
pub use tree::{NetworkError, TalentError, TalentTree};

/// Index of a talent within its tree, in definition order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TalentId(pub u16);

impl TalentId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl core::fmt::Display for TalentId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "talent#{}", self.0)
    }
}
