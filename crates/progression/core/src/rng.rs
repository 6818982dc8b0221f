//! RNG oracle for deterministic proc rolls.
//!
//! Only proc-based talents need randomness, so the oracle is injected at the
//! call that dispatches combat events instead of being looked up globally.
//!
//! # Determinism
//!
//! Given the same seed, every implementation must produce the same value.
//! Replays and tests depend on this.

/// RNG oracle for deterministic random number generation.
pub trait RngOracle {
    /// Generate a random u32 value from a seed.
    fn next_u32(&self, seed: u64) -> u32;

    /// Roll a d100 (1-100 inclusive).
    fn roll_d100(&self, seed: u64) -> u32 {
        (self.next_u32(seed) % 100) + 1
    }

    /// Percentage check: true with probability `chance` percent.
    ///
    /// Chances at or below 0 never pass; chances at or above 100 always do.
    fn chance(&self, seed: u64, chance: f64) -> bool {
        if chance <= 0.0 {
            return false;
        }
        if chance >= 100.0 {
            return true;
        }
        f64::from(self.roll_d100(seed)) <= chance
    }
}

/// PCG random number generator (PCG-XSH-RR, 64-bit state, 32-bit output).
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::pcg_output(Self::pcg_step(seed))
    }
}

/// Oracle that always returns the same roll. Useful for forcing or
/// suppressing procs.
#[derive(Clone, Copy, Debug)]
pub struct FixedRoll(pub u32);

impl RngOracle for FixedRoll {
    fn next_u32(&self, _seed: u64) -> u32 {
        self.0
    }
}

/// Derive a per-roll seed from the dispatch seed and the proccing talent.
///
/// Distinct talents reacting to the same event roll independently.
pub fn compute_seed(base_seed: u64, event_nonce: u64, talent: u16) -> u64 {
    let mut hash = base_seed;
    hash ^= event_nonce.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= u64::from(talent).wrapping_mul(0x517cc1b727220a95);

    // Final avalanche step
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;

    hash
}
