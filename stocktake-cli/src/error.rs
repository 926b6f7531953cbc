//! CLI error type.

use stocktake_core::error::StocktakeError;

/// Errors surfaced to the CLI user.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Engine-level error (config, scan, merge, inventory)
    #[error("{0}")]
    Engine(#[from] StocktakeError),

    /// Subcommand usage error
    #[error("command error: {0}")]
    Command(String),

    /// I/O error while reading or writing documents
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON rendering error
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_error_display() {
        let err = CliError::Command("at least two inputs required".to_owned());
        assert!(err.to_string().contains("at least two inputs"));
    }

    #[test]
    fn engine_error_converts() {
        let engine = StocktakeError::Config(stocktake_core::error::ConfigError::ParseFailed {
            reason: "bad".to_owned(),
        });
        let err: CliError = engine.into();
        assert!(matches!(err, CliError::Engine(_)));
    }
}
