//! Content factory for building characters from data files.

use std::path::{Path, PathBuf};

use progression_core::{Character, ProgressionConfig, TalentTree};

use crate::loaders::{ConfigLoader, LoadResult, TalentCatalog, TalentLoader};

/// Content factory that loads all progression content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// └── talents.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Factory over the data directory shipped with this crate.
    pub fn shipped() -> Self {
        Self::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("data"))
    }

    /// Load progression configuration from `config.toml`.
    pub fn load_config(&self) -> LoadResult<ProgressionConfig> {
        let path = self.data_dir.join("config.toml");
        ConfigLoader::load(&path)
    }

    /// Load the talent catalog from `talents.ron`.
    pub fn load_talents(&self) -> LoadResult<TalentCatalog> {
        let path = self.data_dir.join("talents.ron");
        TalentLoader::load(&path)
    }

    /// Build a fresh talent tree from `talents.ron`.
    pub fn build_tree(&self) -> LoadResult<TalentTree> {
        self.load_talents()?.build_tree()
    }

    /// Create a level 1 character from the directory's config and catalog.
    pub fn new_character(&self) -> LoadResult<Character> {
        let config = self.load_config()?;
        let tree = self.build_tree()?;
        Ok(Character::new(config, tree))
    }

    /// Restore a saved character against the directory's config and catalog.
    pub fn load_character(&self, bytes: &[u8]) -> LoadResult<Character> {
        let config = self.load_config()?;
        let tree = self.build_tree()?;
        Character::load(config, tree, bytes)
            .map_err(|e| anyhow::anyhow!("Failed to restore character: {}", e))
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
