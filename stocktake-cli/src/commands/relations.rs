//! `stocktake relations` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use stocktake_core::codec::{InventoryCodec, JsonInventoryCodec};
use stocktake_relations::{Relationship, RelationshipRegistry};

use crate::cli::RelationsArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `relations` command.
///
/// Builds the relationship graph from inventory markers and prints the
/// finalized (minimal) edge list.
pub async fn execute(
    args: RelationsArgs,
    _config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let inventory = JsonInventoryCodec::new()
        .read_inventory(&args.inventory)
        .map_err(stocktake_core::error::StocktakeError::from)?;

    let mut registry = RelationshipRegistry::build_from_inventory(&inventory);
    registry.finalize_relationships();

    let view = RelationsView {
        inventory: args.inventory.display().to_string(),
        edges: registry.relationships().to_vec(),
    };
    writer.render(&view)?;

    Ok(())
}

#[derive(Serialize)]
pub struct RelationsView {
    pub inventory: String,
    pub edges: Vec<Relationship>,
}

impl Render for RelationsView {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Relations: {}", self.inventory.bold())?;
        if self.edges.is_empty() {
            writeln!(w, "No relationships derived from markers.")?;
            return Ok(());
        }
        for edge in &self.edges {
            writeln!(w, "  {edge}")?;
        }
        writeln!(w, "{} edges", self.edges.len())?;
        Ok(())
    }
}
