//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use corpora_domain::MetaFilter;
use corpora_store::quantity;
use std::path::PathBuf;

/// Corpora CLI - Ingest and query structured text corpora.
#[derive(Debug, Parser)]
#[command(name = "corpora")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Project file path
    #[arg(short, long, global = true, env = "CORPORA_PROJECT", default_value = "corpora.toml")]
    pub config: PathBuf,

    /// Log debug detail to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (sentence text only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Rebuild the corpus database from the corpus directory
    Ingest(IngestArgs),

    /// Compute and store sentence embeddings
    Embed,

    /// Query sentences by subfolder, file, text category and metadata
    Query(QueryArgs),

    /// List every sentence in the corpus
    Sentences(SentencesArgs),

    /// List classified meta properties
    Properties,
}

/// Arguments for the ingest command.
#[derive(Debug, Parser)]
pub struct IngestArgs {
    /// Compute embeddings after ingestion, regardless of the project setting
    #[arg(long)]
    pub embed: bool,
}

/// Arguments for the query command.
#[derive(Debug, Parser)]
pub struct QueryArgs {
    /// Restrict to a subfolder (repeatable)
    #[arg(short, long = "subfolder")]
    pub subfolders: Vec<String>,

    /// Restrict to a file path (repeatable)
    #[arg(long = "file")]
    pub files: Vec<String>,

    /// Restrict to a text category (repeatable)
    #[arg(short = 't', long = "category")]
    pub categories: Vec<String>,

    /// Meta filter: `label:property=value`, `=a,b,c` or `=min..max` (numbers or dates);
    /// `age=3` is short for `age:age=3` (repeatable, AND-ed)
    #[arg(short, long = "meta", value_parser = parse_meta_filter)]
    pub meta: Vec<MetaFilter>,

    /// Include embeddings in the output
    #[arg(long)]
    pub embeddings: bool,
}

/// Arguments for the sentences command.
#[derive(Debug, Parser)]
pub struct SentencesArgs {
    /// Print sentence texts only
    #[arg(long)]
    pub texts_only: bool,
}

/// Parse a `--meta` argument.
pub fn parse_meta_filter(arg: &str) -> std::result::Result<MetaFilter, String> {
    let (identity, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected label:property=value, got '{}'", arg))?;

    let (label, property) = match identity.split_once(':') {
        Some((label, property)) => (label.trim(), property.trim()),
        None => (identity.trim(), identity.trim()),
    };
    if label.is_empty() || property.is_empty() {
        return Err(format!("missing label or property name in '{}'", arg));
    }

    if let Some((min, max)) = value.split_once("..") {
        let min = quantity(min).ok_or_else(|| format!("invalid range minimum '{}'", min))?;
        let max = quantity(max).ok_or_else(|| format!("invalid range maximum '{}'", max))?;
        return Ok(MetaFilter::range(label, property, min, max));
    }

    if value.contains(',') {
        let values: Vec<String> = value.split(',').map(|v| v.trim().to_string()).collect();
        return Ok(MetaFilter::any_of(label, property, values));
    }

    Ok(MetaFilter::equals(label, property, value))
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}
