//! Content loaders for reading progression data from files.
//!
//! Each loader parses one file format into `progression-core` types and
//! validates it the same way the core would at runtime.

pub mod config;
pub mod factory;
pub mod talents;

pub use config::ConfigLoader;
pub use factory::ContentFactory;
pub use talents::{TalentBranch, TalentCatalog, TalentLoader};

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
