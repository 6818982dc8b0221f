//! Combat-event subscriptions for proc talents.
//!
//! A talent with a proc subscribes while it is active. The character
//! dispatches combat events through the registry; each subscriber rolls its
//! own chance against the injected RNG oracle.

use strum::{AsRefStr, Display, EnumIter, EnumString};

use super::TalentId;

/// Combat occurrences that can trigger procs.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombatEvent {
    MeleeHit,
    MeleeCrit,
    SpellCast,
    Block,
    Dodge,
    DamageTaken,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Subscription {
    talent: TalentId,
    event: CombatEvent,
}

/// Which active talents listen to which combat events.
#[derive(Clone, Debug, Default)]
pub struct ProcRegistry {
    subscriptions: Vec<Subscription>,
}

impl ProcRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the talent was already subscribed to the event.
    pub fn subscribe(&mut self, talent: TalentId, event: CombatEvent) -> bool {
        let subscription = Subscription { talent, event };
        if self.subscriptions.contains(&subscription) {
            return false;
        }
        tracing::debug!(talent = talent.0, %event, "proc subscribed");
        self.subscriptions.push(subscription);
        true
    }

    /// Drop every subscription of a talent. Returns how many were removed.
    pub fn unsubscribe(&mut self, talent: TalentId) -> usize {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|sub| sub.talent != talent);
        let removed = before - self.subscriptions.len();
        if removed > 0 {
            tracing::debug!(talent = talent.0, "proc unsubscribed");
        }
        removed
    }

    pub fn is_subscribed(&self, talent: TalentId) -> bool {
        self.subscriptions.iter().any(|sub| sub.talent == talent)
    }

    /// Talents listening to `event`, in subscription order.
    pub fn subscribers(&self, event: CombatEvent) -> impl Iterator<Item = TalentId> + '_ {
        self.subscriptions
            .iter()
            .filter(move |sub| sub.event == event)
            .map(|sub| sub.talent)
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}
