//! Stat aggregation - the single recomputation path for derived values.
//!
//! The aggregator memoizes one [`StatSheet`] stamped with the revisions of its
//! inputs. Every input (base stats, equipment, aura list) bumps its revision on
//! mutation, so a query after any mutation always recomputes. A stale sheet can
//! never be observed.

use core::cell::Cell;

use super::bonus::{EffectBuckets, StatLayer};
use super::derived::StatSheet;
use super::primary::{PrimaryEffective, PrimaryStats};
use super::quantity::Quantity;
use crate::aura::StatusEffect;

/// A collaborator that feeds status effects into the aggregation buckets.
///
/// Implemented by the aura list and by equipment. Sources are read-only from
/// the aggregator's point of view.
pub trait EffectSource {
    /// Monotonic counter bumped whenever the set of yielded effects changes.
    fn revision(&self) -> u64;

    /// Visit every currently active effect.
    fn for_each_effect(&self, visit: &mut dyn FnMut(&StatusEffect));
}

#[derive(Clone, Copy, Debug)]
struct CachedSheet {
    stamp: u64,
    sheet: StatSheet,
}

/// Computes and caches derived statistics.
#[derive(Debug, Default)]
pub struct StatAggregator {
    cache: Cell<Option<CachedSheet>>,
    recomputations: Cell<u64>,
}

impl StatAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve one quantity.
    pub fn get(
        &self,
        quantity: Quantity,
        base: &PrimaryStats,
        sources: &[&dyn EffectSource],
    ) -> f64 {
        self.sheet(base, sources).get(quantity)
    }

    /// Resolve every quantity, reusing the cached sheet when no input changed.
    ///
    /// `sources` must name the same collaborators on every call.
    pub fn sheet(&self, base: &PrimaryStats, sources: &[&dyn EffectSource]) -> StatSheet {
        let stamp = Self::stamp(base, sources);
        if let Some(cached) = self.cache.get()
            && cached.stamp == stamp
        {
            return cached.sheet;
        }

        let sheet = Self::compute(base, sources);
        self.cache.set(Some(CachedSheet { stamp, sheet }));
        self.recomputations.set(self.recomputations.get() + 1);
        tracing::trace!(stamp, "recomputed stat sheet");
        sheet
    }

    /// Compute a sheet from scratch, bypassing the cache.
    pub fn compute(base: &PrimaryStats, sources: &[&dyn EffectSource]) -> StatSheet {
        let mut buckets = EffectBuckets::new();
        for source in sources {
            source.for_each_effect(&mut |effect| buckets.add(effect));
        }
        let primary = PrimaryEffective::compute(base, &buckets);
        StatSheet::compute(&primary, &buckets)
    }

    /// True when the next query will recompute.
    pub fn is_stale(&self, base: &PrimaryStats, sources: &[&dyn EffectSource]) -> bool {
        self.cache
            .get()
            .is_none_or(|cached| cached.stamp != Self::stamp(base, sources))
    }

    /// Drop the cached sheet unconditionally.
    pub fn invalidate(&mut self) {
        self.cache.set(None);
    }

    /// Number of full recomputations performed so far.
    pub fn recomputations(&self) -> u64 {
        self.recomputations.get()
    }

    // Revisions only ever grow, so their sum changes whenever any input does.
    fn stamp(base: &PrimaryStats, sources: &[&dyn EffectSource]) -> u64 {
        sources
            .iter()
            .fold(base.revision(), |acc, source| acc.wrapping_add(source.revision()))
    }
}
