//! Auras - named, lifecycle-bound bundles of status effects.
//!
//! # Ownership
//!
//! - An [`Aura`] is owned by at most one [`AuraList`] at a time.
//! - Identity is the [`AuraId`] handed out by the owning list; add and
//!   remove are identity-based.
//! - Status effects live and die with their aura.
//!
//! # Lifecycle
//!
//! - **Permanent**: stays until removed (talent passives, equipment sets)
//! - **Timed**: counts down on [`AuraList::tick`] and removes itself at zero
//!   (procs, temporary combat effects)

pub mod effect;
pub mod list;

pub use effect::{Manipulation, StatusEffect};
pub use list::AuraList;

use bitflags::bitflags;

/// Identity of an aura within its owning list.
///
/// Only [`AuraList::allocate_id`] mints identities, so two auras built by
/// different owners can never share one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AuraId(u32);

impl core::fmt::Display for AuraId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "aura#{}", self.0)
    }
}

/// Permanent vs. timed lifetime.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AuraLifecycle {
    Permanent,
    /// Expires `duration` seconds after it was (re)armed.
    Timed { duration: f32 },
}

bitflags! {
    /// Display and classification flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct AuraFlags: u8 {
        /// Shown in the buff bar.
        const VISIBLE = 1 << 0;
        /// Harmful effect (drawn as a debuff).
        const DEBUFF = 1 << 1;
    }
}

impl Default for AuraFlags {
    fn default() -> Self {
        AuraFlags::VISIBLE
    }
}

/// Who installed an aura. Persistence uses this to decide which auras are
/// rebuilt by talent lifecycles and which are restored from the record.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AuraSource {
    /// Passive aura owned by the talent with this key.
    Talent(String),
    /// Timed aura fired by the proc of the talent with this key.
    Proc(String),
    /// Anything else (potions, enemy debuffs, scripted effects).
    External,
}

/// A named bundle of status effects with a lifecycle.
#[derive(Clone, Debug, PartialEq)]
pub struct Aura {
    id: AuraId,
    name: String,
    effects: Vec<StatusEffect>,
    lifecycle: AuraLifecycle,
    remaining: f32,
    flags: AuraFlags,
    source: AuraSource,
    symbol: Option<String>,
    description: Option<String>,
}

impl Aura {
    pub fn new(id: AuraId, name: impl Into<String>, lifecycle: AuraLifecycle) -> Self {
        let remaining = match lifecycle {
            AuraLifecycle::Permanent => 0.0,
            AuraLifecycle::Timed { duration } => duration,
        };
        Self {
            id,
            name: name.into(),
            effects: Vec::new(),
            lifecycle,
            remaining,
            flags: AuraFlags::default(),
            source: AuraSource::External,
            symbol: None,
            description: None,
        }
    }

    pub fn with_effect(mut self, effect: StatusEffect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = StatusEffect>) -> Self {
        self.effects.extend(effects);
        self
    }

    pub fn with_flags(mut self, flags: AuraFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_source(mut self, source: AuraSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Override the remaining time of a timed aura (used when restoring).
    pub fn with_remaining(mut self, remaining: f32) -> Self {
        if self.is_timed() {
            self.remaining = remaining;
        }
        self
    }

    pub fn id(&self) -> AuraId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn effects(&self) -> &[StatusEffect] {
        &self.effects
    }

    pub fn lifecycle(&self) -> AuraLifecycle {
        self.lifecycle
    }

    pub fn is_timed(&self) -> bool {
        matches!(self.lifecycle, AuraLifecycle::Timed { .. })
    }

    /// Seconds left for timed auras; `None` for permanent ones.
    pub fn remaining(&self) -> Option<f32> {
        self.is_timed().then_some(self.remaining)
    }

    pub fn flags(&self) -> AuraFlags {
        self.flags
    }

    pub fn is_visible(&self) -> bool {
        self.flags.contains(AuraFlags::VISIBLE)
    }

    pub fn source(&self) -> &AuraSource {
        &self.source
    }

    pub fn symbol(&self) -> Option<&str> {
        self.symbol.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub(crate) fn rearm(&mut self) {
        if let AuraLifecycle::Timed { duration } = self.lifecycle {
            self.remaining = duration;
        }
    }

    /// Advance the timer. Returns true once a timed aura has run out.
    pub(crate) fn advance(&mut self, delta: f32) -> bool {
        match self.lifecycle {
            AuraLifecycle::Permanent => false,
            AuraLifecycle::Timed { .. } => {
                self.remaining = (self.remaining - delta).max(0.0);
                self.remaining <= 0.0
            }
        }
    }
}
