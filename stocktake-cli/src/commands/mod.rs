//! Subcommand handlers.

pub mod coverage;
pub mod merge;
pub mod relations;
pub mod scan;

use std::path::Path;

use stocktake_core::config::StocktakeConfig;

use crate::error::CliError;

/// Load the engine configuration for a command.
///
/// A missing config file at the default location is not an error — the
/// defaults (plus `STOCKTAKE_*` env overrides) apply. An explicitly broken
/// file is fatal before any work begins.
pub async fn load_config(path: &Path) -> Result<StocktakeConfig, CliError> {
    if path.is_file() {
        Ok(StocktakeConfig::load(path).await?)
    } else {
        let mut config = StocktakeConfig::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }
}
