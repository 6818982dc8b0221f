//! Progression configuration loader.

use std::path::Path;

use progression_core::ProgressionConfig;

use crate::loaders::{LoadResult, read_file};

/// Shipped tuning, embedded at compile time.
const BUILTIN_CONFIG: &str = include_str!("../../data/config.toml");

/// Loader for progression configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// Missing keys fall back to [`ProgressionConfig::default`]. The cost
    /// curve and cross-field constraints are validated.
    pub fn load(path: &Path) -> LoadResult<ProgressionConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parse config data from TOML text.
    pub fn parse(content: &str) -> LoadResult<ProgressionConfig> {
        let config: ProgressionConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid progression config: {}", e))?;

        tracing::debug!(
            stat_cap = config.stat_cap,
            tiers = config.cost_curve.tiers().len(),
            "loaded progression config"
        );
        Ok(config)
    }

    /// The configuration shipped with the crate.
    pub fn builtin() -> LoadResult<ProgressionConfig> {
        Self::parse(BUILTIN_CONFIG)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use progression_core::CostTier;

    #[test]
    fn builtin_matches_defaults() {
        assert_eq!(ConfigLoader::builtin().unwrap(), ProgressionConfig::default());
    }

    #[test]
    fn missing_keys_use_defaults() {
        let config = ConfigLoader::parse("stat_cap = 60").unwrap();
        assert_eq!(config.stat_cap, 60);
        assert_eq!(
            config.starting_stat_value,
            ProgressionConfig::DEFAULT_STARTING_STAT_VALUE
        );
    }

    #[test]
    fn custom_curve_is_sorted() {
        let config = ConfigLoader::parse(
            r#"
            [[cost_curve]]
            from_value = 50
            cost = 3

            [[cost_curve]]
            from_value = 0
            cost = 1
            "#,
        )
        .unwrap();
        assert_eq!(
            config.cost_curve.tiers(),
            &[CostTier::new(0, 1), CostTier::new(50, 3)]
        );
    }

    #[test]
    fn decreasing_curve_is_rejected() {
        let err = ConfigLoader::parse(
            r#"
            [[cost_curve]]
            from_value = 0
            cost = 2

            [[cost_curve]]
            from_value = 10
            cost = 1
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Failed to parse config TOML"));
    }

    #[test]
    fn cap_below_start_is_rejected() {
        let err = ConfigLoader::parse("starting_stat_value = 20\nstat_cap = 15").unwrap_err();
        assert!(err.to_string().contains("Invalid progression config"));
    }
}
