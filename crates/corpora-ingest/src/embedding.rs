//! Sentence embedding post-pass
//!
//! Embeddings are computed after ingestion over the persisted sentence order
//! and written back in one bulk overwrite.
//!
//! # Examples
//!
//! ```rust
//! use corpora_domain::traits::EmbeddingModel;
//! use corpora_ingest::MockEmbeddingModel;
//!
//! let model = MockEmbeddingModel::new(16);
//! let texts = vec!["The sky is blue".to_string()];
//! let first = model.encode(&texts).unwrap();
//! assert_eq!(first[0].len(), 16);
//!
//! // Same text always produces same embedding
//! assert_eq!(first, model.encode(&texts).unwrap());
//! ```

use crate::error::IngestError;
use corpora_domain::traits::{CorpusStore, EmbeddingModel};
use std::collections::hash_map::DefaultHasher;
use std::fmt::Display;
use std::hash::{Hash, Hasher};
use thiserror::Error;
use tracing::info;

/// Errors that can occur during embedding generation
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// Invalid model or input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Model inference error
    #[error("Model inference failed: {0}")]
    InferenceFailed(String),
}

/// Deterministic hash-based embedding model
///
/// Vectors are normalized to unit length and depend only on the text, so
/// identical sentences always get identical embeddings.
#[derive(Debug, Clone)]
pub struct MockEmbeddingModel {
    dimension: usize,
}

impl MockEmbeddingModel {
    /// Create a model producing vectors of `dimension` values
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    /// Hash text with a seed to get a deterministic value in [-1, 1]
    fn hash_with_seed(text: &str, seed: u64) -> f32 {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        seed.hash(&mut hasher);
        let hash_value = hasher.finish();

        let normalized = (hash_value as f64 / u64::MAX as f64) * 2.0 - 1.0;
        normalized as f32
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let mut embedding: Vec<f32> = (0..self.dimension)
            .map(|i| Self::hash_with_seed(text, i as u64))
            .collect();

        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut embedding {
                *value /= magnitude;
            }
        }
        embedding
    }
}

impl EmbeddingModel for MockEmbeddingModel {
    type Error = EmbeddingError;

    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, Self::Error> {
        if self.dimension == 0 {
            return Err(EmbeddingError::InvalidInput(
                "Embedding dimension must be greater than 0".to_string(),
            ));
        }
        Ok(texts.iter().map(|t| self.embed(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Embed every stored sentence and write the vectors back in row order
///
/// Returns the number of sentences embedded.
pub fn attach_embeddings<S, M>(store: &mut S, model: &M) -> Result<usize, IngestError>
where
    S: CorpusStore,
    S::Error: Display,
    M: EmbeddingModel + ?Sized,
    M::Error: Display,
{
    let texts = store
        .all_sentence_texts()
        .map_err(|e| IngestError::Store(e.to_string()))?;

    info!("Embedding {} sentences", texts.len());

    let vectors = model
        .encode(&texts)
        .map_err(|e| IngestError::Embedding(e.to_string()))?;

    if vectors.len() != texts.len() {
        return Err(IngestError::Embedding(format!(
            "Model returned {} vectors for {} sentences",
            vectors.len(),
            texts.len()
        )));
    }
    if let Some(v) = vectors.iter().find(|v| v.len() != model.dimension()) {
        return Err(IngestError::Embedding(format!(
            "Model returned a vector of length {}, expected {}",
            v.len(),
            model.dimension()
        )));
    }

    store
        .replace_embeddings(&vectors)
        .map_err(|e| IngestError::Store(e.to_string()))?;

    info!("Stored {} embeddings", vectors.len());
    Ok(vectors.len())
}
