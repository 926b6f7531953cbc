//! `stocktake coverage` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use stocktake_core::codec::{InventoryCodec, JsonInventoryCodec};
use stocktake_reconcile::{Aggregator, ContestedFile};

use crate::cli::CoverageArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `coverage` command.
///
/// Unsanctioned duplicate ownership is a data-quality report, not a
/// failure — the command exits zero either way.
pub async fn execute(
    args: CoverageArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let config = super::load_config(config_path).await?;

    let inventory = JsonInventoryCodec::new()
        .read_inventory(&args.inventory)
        .map_err(stocktake_core::error::StocktakeError::from)?;

    let aggregator = Aggregator::new(&config.merge.allowed_duplicate_patterns)
        .map_err(stocktake_core::error::StocktakeError::from)?;
    let report = aggregator
        .aggregate(&inventory)
        .map_err(stocktake_core::error::StocktakeError::from)?;

    let mut exclusive = 0;
    let mut allowed = 0;
    for coverage in &report.coverages {
        exclusive += coverage.exclusive.len();
        allowed += coverage.allowed_duplicates.len();
    }

    let view = CoverageView {
        inventory: args.inventory.display().to_string(),
        exclusive_files: exclusive,
        allowed_duplicates: allowed,
        contested: report.contested,
    };
    writer.render(&view)?;

    Ok(())
}

#[derive(Serialize)]
pub struct CoverageView {
    pub inventory: String,
    pub exclusive_files: usize,
    pub allowed_duplicates: usize,
    pub contested: Vec<ContestedFile>,
}

impl Render for CoverageView {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Coverage: {}", self.inventory.bold())?;
        writeln!(w, "Exclusive files: {}", self.exclusive_files)?;
        writeln!(w, "Allowed duplicates: {}", self.allowed_duplicates)?;

        if self.contested.is_empty() {
            writeln!(w, "{}", "No unsanctioned duplicate ownership.".green())?;
        } else {
            writeln!(
                w,
                "Unsanctioned duplicates: {}",
                self.contested.len().to_string().red().bold()
            )?;
            writeln!(w, "{:<50} Claimants", "Path")?;
            writeln!(w, "{}", "-".repeat(80))?;
            for contested in &self.contested {
                writeln!(
                    w,
                    "{:<50} {}",
                    contested.path,
                    contested.claimants.join(", ")
                )?;
            }
        }
        Ok(())
    }
}
