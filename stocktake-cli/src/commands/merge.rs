//! `stocktake merge` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use stocktake_core::codec::{InventoryCodec, JsonInventoryCodec};
use stocktake_core::inventory::Inventory;
use stocktake_reconcile::{MergeEngine, MergePolicy, MergeStats};

use crate::cli::MergeArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `merge` command.
///
/// Inputs are merged in argument order into an empty target; the result is
/// the canonical inventory.
pub async fn execute(
    args: MergeArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let config = super::load_config(config_path).await?;

    let codec = JsonInventoryCodec::new();
    let mut sources = Vec::with_capacity(args.inputs.len());
    for input in &args.inputs {
        let inventory = codec
            .read_inventory(input)
            .map_err(stocktake_core::error::StocktakeError::from)?;
        info!(path = %input.display(), "loaded source inventory");
        sources.push(inventory);
    }

    let engine = MergeEngine::new(MergePolicy::from_core(&config.merge))
        .map_err(stocktake_core::error::StocktakeError::from)?;

    let mut target = Inventory::new();
    let stats = engine.merge_inventories(&sources, &mut target);

    codec
        .write_inventory(&target, &args.output)
        .map_err(stocktake_core::error::StocktakeError::from)?;

    let report = MergeReport {
        sources: args.inputs.len(),
        artifacts: target.artifacts.len(),
        assets: target.assets.len(),
        licenses: target.license_data.len(),
        stats,
        written_to: args.output.display().to_string(),
    };
    writer.render(&report)?;

    Ok(())
}

#[derive(Serialize)]
pub struct MergeReport {
    pub sources: usize,
    pub artifacts: usize,
    pub assets: usize,
    pub licenses: usize,
    pub stats: MergeStats,
    pub written_to: String,
}

impl Render for MergeReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Merged {} inventories", self.sources)?;
        writeln!(
            w,
            "Canonical inventory: {} artifacts, {} assets, {} licenses",
            self.artifacts, self.assets, self.licenses
        )?;
        writeln!(
            w,
            "Appended: {}  Deduplicated: {}  Checksums backfilled: {}",
            self.stats.artifacts_appended,
            self.stats.duplicates_dropped.to_string().bold(),
            self.stats.checksums_backfilled,
        )?;
        writeln!(w, "Inventory written to {}", self.written_to)?;
        Ok(())
    }
}
