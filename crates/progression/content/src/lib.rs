//! Data-driven progression content and loaders.
//!
//! This crate houses the shipped talent catalog and progression tuning and
//! provides loaders for their RON/TOML data files:
//! - Talent catalogs, grouped into branches (data-driven via RON)
//! - Progression configuration and the stat cost curve (data-driven via TOML)
//!
//! Concrete talents are data rows here. `progression-core` only knows the
//! generic [`TalentDefinition`](progression_core::TalentDefinition) shape.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, ContentFactory, TalentBranch, TalentCatalog, TalentLoader};
