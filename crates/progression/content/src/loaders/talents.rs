//! Talent catalog loader.

use std::path::Path;

use progression_core::{TalentDefinition, TalentTree};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Shipped catalog, embedded at compile time.
const BUILTIN_TALENTS: &str = include_str!("../../data/talents.ron");

/// A named group of talents drawn as one column of the tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TalentBranch {
    pub name: String,
    pub talents: Vec<TalentDefinition>,
}

/// Talent catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TalentCatalog {
    pub branches: Vec<TalentBranch>,
}

impl TalentCatalog {
    pub fn branch(&self, name: &str) -> Option<&TalentBranch> {
        self.branches.iter().find(|branch| branch.name == name)
    }

    /// Every definition, branch by branch.
    pub fn definitions(&self) -> impl Iterator<Item = &TalentDefinition> {
        self.branches.iter().flat_map(|branch| branch.talents.iter())
    }

    pub fn len(&self) -> usize {
        self.branches.iter().map(|branch| branch.talents.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wire the catalog into a fresh talent tree.
    pub fn build_tree(&self) -> LoadResult<TalentTree> {
        TalentTree::setup_network(self.definitions().cloned().collect())
            .map_err(|e| anyhow::anyhow!("Invalid talent network: {}", e))
    }
}

/// Loader for talent catalogs from RON files.
pub struct TalentLoader;

impl TalentLoader {
    /// Load a talent catalog from a RON file.
    ///
    /// The catalog is also wired into a throwaway tree so broken
    /// requirements are reported at load time rather than at character
    /// creation.
    pub fn load(path: &Path) -> LoadResult<TalentCatalog> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parse a talent catalog from RON text.
    pub fn parse(content: &str) -> LoadResult<TalentCatalog> {
        let catalog: TalentCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse talent catalog RON: {}", e))?;
        let tree = catalog.build_tree()?;

        tracing::debug!(
            branches = catalog.branches.len(),
            talents = tree.len(),
            "loaded talent catalog"
        );
        Ok(catalog)
    }

    /// The catalog shipped with the crate.
    pub fn builtin() -> LoadResult<TalentCatalog> {
        Self::parse(BUILTIN_TALENTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_three_branches() {
        let catalog = TalentLoader::builtin().unwrap();
        let names: Vec<_> = catalog.branches.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["warrior", "ranger", "mage"]);
        assert_eq!(catalog.len(), 15);
    }

    #[test]
    fn builtin_covers_passives_skills_and_procs() {
        let catalog = TalentLoader::builtin().unwrap();
        assert!(catalog.definitions().any(|t| t.skill.is_some()));
        assert!(catalog.definitions().any(|t| t.on_event.is_some()));
        assert!(catalog.definitions().any(|t| t.reads_stats()));
        assert!(catalog.definitions().all(|t| !t.description.is_empty()));
    }

    #[test]
    fn descriptions_render() {
        let catalog = TalentLoader::builtin().unwrap();
        let rampage = catalog.definitions().find(|t| t.key == "rampage").unwrap();
        assert_eq!(
            rampage.describe(2),
            "35% on melee crit: attack speed +25% for 5s."
        );
    }

    #[test]
    fn unknown_requirement_fails_to_load() {
        let err = TalentLoader::parse(
            r#"(
                branches: [
                    (
                        name: "broken",
                        talents: [
                            (
                                key: "orphan",
                                name: "Orphan",
                                max_level: 1,
                                requirements: [(talent: "missing", min_level: 1)],
                            ),
                        ],
                    ),
                ],
            )"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Invalid talent network"));
    }

    #[test]
    fn malformed_ron_fails_to_load() {
        let err = TalentLoader::parse("(branches: [").unwrap_err();
        assert!(err.to_string().contains("Failed to parse talent catalog RON"));
    }
}
