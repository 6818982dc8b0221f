//! Stat System - layered architecture.
//!
//! # Architecture
//!
//! ```text
//! [ Primary Stats (Layer 1) ]   base values + free points (stored)
//!      ↓
//! [ Derived Stats (Layer 2) ]   formulas over effective primaries (computed)
//!      ↓
//! [ Aggregator ]                memoized sheet, invalidated by revisions
//! ```
//!
//! ## Principles
//!
//! 1. **SSOT**: Only primary base values and point counters are stored
//! 2. **Unidirectional Flow**: Derived values never feed back into primaries
//! 3. **One Recomputation Path**: Every query goes through [`StatAggregator`]
//! 4. **Deterministic**: Pure functions of base values and active effects
//!
//! ## Effect Stack
//!
//! All layers use the same calculation order:
//! `Base → Σ Fixed → × (1 + Σ Percental / 100) → Clamp`

pub mod aggregator;
pub mod bonus;
pub mod derived;
pub mod primary;
pub mod quantity;

// Re-export primary types
pub use aggregator::{EffectSource, StatAggregator};
pub use bonus::{EffectBuckets, EffectTotal, StatBounds, StatLayer};
pub use derived::StatSheet;
pub use primary::{PrimaryEffective, PrimaryStats, STAT_COUNT, Stat, StatError};
pub use quantity::{QUANTITY_COUNT, Quantity};
