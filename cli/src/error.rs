//! Error types for the CLI

use thiserror::Error;
use ujquery_core::QueryGenError;

use crate::config::ConfigError;

/// CLI errors
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A query could not be rendered
    #[error("Query generation failed: {0}")]
    Query(#[from] QueryGenError),

    /// A query name requested on the command line is not in the catalog
    #[error("Unknown query: {0} (run 'ujquery list' for available names)")]
    UnknownQuery(String),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(String),
}
