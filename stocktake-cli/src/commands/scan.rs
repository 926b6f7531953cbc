//! `stocktake scan` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use stocktake_core::codec::{InventoryCodec, JsonInventoryCodec};
use stocktake_scan::{ScanEngineBuilder, ScanEngineConfig};

use crate::cli::ScanArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `scan` command.
///
/// Archive codecs are external collaborators; the CLI scans with the
/// default (no-op) unpacker, so archives are inventoried but not exploded.
pub async fn execute(
    args: ScanArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let config = super::load_config(config_path).await?;

    let mut engine_config = ScanEngineConfig::from_core(&config.scan);
    engine_config.root_dir = args.path.display().to_string();
    if let Some(scratch) = args.scratch {
        engine_config.scratch_dir = scratch;
    }
    if let Some(reference) = args.reference {
        engine_config.reference_dir = reference;
    }
    if args.no_component_patterns {
        engine_config.detect_component_patterns = false;
    }

    info!(path = %args.path.display(), "starting inventory scan");

    let (engine, _event_rx) = ScanEngineBuilder::new()
        .config(engine_config)
        .build()
        .map_err(stocktake_core::error::StocktakeError::from)?;

    let inventory = engine
        .scan_once()
        .await
        .map_err(stocktake_core::error::StocktakeError::from)?;

    let mut written_to = None;
    if let Some(output) = &args.output {
        JsonInventoryCodec::new()
            .write_inventory(&inventory, output)
            .map_err(stocktake_core::error::StocktakeError::from)?;
        written_to = Some(output.display().to_string());
    }

    let error_count = inventory
        .artifacts
        .iter()
        .map(|a| a.errors().len())
        .sum();

    let report = ScanReport {
        root: args.path.display().to_string(),
        artifacts: inventory.artifacts.len(),
        component_patterns: inventory.component_patterns.len(),
        degraded_artifacts: error_count,
        written_to,
    };
    writer.render(&report)?;

    Ok(())
}

#[derive(Serialize)]
pub struct ScanReport {
    pub root: String,
    pub artifacts: usize,
    pub component_patterns: usize,
    pub degraded_artifacts: usize,
    pub written_to: Option<String>,
}

impl Render for ScanReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Scan: {}", self.root.bold())?;
        writeln!(w, "Artifacts: {}", self.artifacts)?;
        writeln!(w, "Component patterns: {}", self.component_patterns)?;

        if self.degraded_artifacts > 0 {
            writeln!(
                w,
                "Degraded artifacts: {}",
                self.degraded_artifacts.to_string().yellow().bold()
            )?;
        } else {
            writeln!(w, "Degraded artifacts: {}", "0".green())?;
        }

        if let Some(path) = &self.written_to {
            writeln!(w, "Inventory written to {path}")?;
        }
        Ok(())
    }
}
