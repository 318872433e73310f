//! Embed command implementation.

use crate::commands::open_store;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use corpora_ingest::{attach_embeddings, MockEmbeddingModel};
use tracing::info;

/// Execute the embed command.
pub async fn execute_embed(config: &Config, formatter: &Formatter) -> Result<()> {
    let mut store = open_store(config)?;
    let dimension = config.corpus.embedding_dimension;

    info!("Embedding sentences with dimension {}", dimension);
    let model = MockEmbeddingModel::new(dimension);
    let count = attach_embeddings(&mut store, &model)?;

    println!(
        "{}",
        formatter.success(&format!("Embedded {} sentence(s)", count))
    );

    Ok(())
}
