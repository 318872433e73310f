//! Project file handling for the CLI.

use crate::error::{CliError, Result};
use corpora_ingest::CorpusConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A corpus project file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Corpus configuration
    pub corpus: CorpusConfig,

    /// Output settings
    #[serde(default)]
    pub settings: Settings,
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Config {
    /// Parse a project file; relative paths stay relative.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.corpus.validate().map_err(CliError::Config)?;
        Ok(config)
    }

    /// Load a project file, resolving relative paths against its directory.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CliError::Config(format!(
                "Project file {} not found",
                path.display()
            )));
        }
        let contents = fs::read_to_string(path)?;
        let mut config = Self::from_toml(&contents)?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        config.corpus.resolve_paths(base);
        Ok(config)
    }

    /// Save the project file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}
