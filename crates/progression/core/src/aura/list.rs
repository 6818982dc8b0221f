//! The per-character collection of active auras.
//!
//! The list is the only writable path to the set of active modifiers. Every
//! membership or content change bumps its revision, which the aggregator
//! compares against its cached sheet.

use super::{Aura, AuraId, StatusEffect};
use crate::stats::EffectSource;

/// Active auras of one character, each with a unique identity.
#[derive(Clone, Debug, Default)]
pub struct AuraList {
    auras: Vec<Aura>,
    next_id: u32,
    revision: u64,
}

impl AuraList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out a fresh identity for an aura that will be added to this list.
    pub fn allocate_id(&mut self) -> AuraId {
        let id = AuraId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Insert an aura.
    ///
    /// If an aura with the same identity is already present the call is a
    /// no-op for membership and returns false; a timed aura still gets its
    /// timer re-armed to full duration. Re-arming changes no value, so it
    /// does not invalidate.
    ///
    /// Identities this list never handed out are refused, since a later
    /// allocation would hand the same identity to another owner.
    pub fn add(&mut self, mut aura: Aura) -> bool {
        if !self.is_allocated(aura.id()) {
            tracing::warn!(
                id = %aura.id(),
                name = aura.name(),
                "refusing aura with foreign identity"
            );
            return false;
        }
        if let Some(existing) = self.get_mut(aura.id()) {
            existing.rearm();
            return false;
        }

        aura.rearm();
        self.insert(aura);
        true
    }

    /// Insert an aura keeping its remaining time, for rebuilding saved state.
    pub(crate) fn restore(&mut self, aura: Aura) -> bool {
        if !self.is_allocated(aura.id()) || self.contains(aura.id()) {
            return false;
        }
        self.insert(aura);
        true
    }

    /// Remove an aura by identity. Returns the aura if it was present.
    pub fn remove(&mut self, id: AuraId) -> Option<Aura> {
        let position = self.auras.iter().position(|aura| aura.id() == id)?;
        let aura = self.auras.remove(position);
        tracing::debug!(id = %id, name = aura.name(), "aura removed");
        self.touch();
        Some(aura)
    }

    /// Swap in new contents for an aura, inserting it when absent.
    ///
    /// This is the refresh path: talents rebuild their aura with regenerated
    /// effects and replace the old one. Always invalidates.
    pub fn replace(&mut self, aura: Aura) {
        match self.get_mut(aura.id()) {
            Some(existing) => {
                *existing = aura;
                self.touch();
            }
            None => {
                self.add(aura);
            }
        }
    }

    /// Advance every timed aura by `delta` seconds and drop the ones that
    /// ran out. Returns the expired auras.
    pub fn tick(&mut self, delta: f32) -> Vec<Aura> {
        let mut expired = Vec::new();
        let mut index = 0;
        while index < self.auras.len() {
            if self.auras[index].advance(delta) {
                expired.push(self.auras.remove(index));
            } else {
                index += 1;
            }
        }

        if !expired.is_empty() {
            for aura in &expired {
                tracing::debug!(id = %aura.id(), name = aura.name(), "aura expired");
            }
            self.touch();
        }
        expired
    }

    pub fn contains(&self, id: AuraId) -> bool {
        self.auras.iter().any(|aura| aura.id() == id)
    }

    pub fn get(&self, id: AuraId) -> Option<&Aura> {
        self.auras.iter().find(|aura| aura.id() == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Aura> {
        self.auras.iter().find(|aura| aura.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Aura> {
        self.auras.iter()
    }

    /// Auras flagged for display, in insertion order.
    pub fn visible(&self) -> impl Iterator<Item = &Aura> {
        self.auras.iter().filter(|aura| aura.is_visible())
    }

    pub fn len(&self) -> usize {
        self.auras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.auras.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn is_allocated(&self, id: AuraId) -> bool {
        id.0 < self.next_id
    }

    fn insert(&mut self, aura: Aura) {
        tracing::debug!(id = %aura.id(), name = aura.name(), "aura added");
        self.auras.push(aura);
        self.touch();
    }

    fn get_mut(&mut self, id: AuraId) -> Option<&mut Aura> {
        self.auras.iter_mut().find(|aura| aura.id() == id)
    }

    fn touch(&mut self) {
        self.revision += 1;
        debug_assert!(self.has_unique_ids(), "aura list holds a duplicate identity");
    }

    fn has_unique_ids(&self) -> bool {
        self.auras
            .iter()
            .enumerate()
            .all(|(i, a)| self.auras[i + 1..].iter().all(|b| a.id() != b.id()))
    }
}

impl EffectSource for AuraList {
    fn revision(&self) -> u64 {
        self.revision
    }

    fn for_each_effect(&self, visit: &mut dyn FnMut(&StatusEffect)) {
        for effect in self.auras.iter().flat_map(|aura| aura.effects()) {
            visit(effect);
        }
    }
}
