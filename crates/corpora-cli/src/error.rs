//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Ingestion error
    #[error("Ingestion error: {0}")]
    Ingest(#[from] corpora_ingest::IngestError),

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] corpora_store::StoreError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The corpus database has not been built yet
    #[error("No corpus database at {0}. Run 'ingest' first.")]
    NotIngested(String),
}
