//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::meta::{MetaIdentity, MetaProperty, StoredValue};
use crate::query::{FileRecord, QueryFilter, QueryResult};
use crate::sentence::Sentence;
use std::collections::BTreeMap;

/// Trait for storing and querying a processed corpus
///
/// Implemented by the infrastructure layer (corpora-store)
pub trait CorpusStore {
    /// Error type for store operations
    type Error;

    /// Write one file's sentences, meta references and subfolder membership
    /// in a single transaction; returns the number of sentences written
    fn insert_file(&mut self, record: &FileRecord) -> Result<usize, Self::Error>;

    /// Query sentences matching a filter
    fn query(&self, filter: &QueryFilter) -> Result<QueryResult, Self::Error>;

    /// Every sentence in insertion order
    fn all_sentences(&self, include_embeddings: bool) -> Result<Vec<Sentence>, Self::Error>;

    /// Every sentence text in insertion order
    fn all_sentence_texts(&self) -> Result<Vec<String>, Self::Error>;

    /// Number of stored sentences
    fn sentence_count(&self) -> Result<usize, Self::Error>;

    /// Overwrite all embeddings; `vectors[i]` goes to the i-th inserted sentence
    fn replace_embeddings(&mut self, vectors: &[Vec<f32>]) -> Result<(), Self::Error>;

    /// Distinct stored values for every meta identity
    fn meta_value_sets(&self) -> Result<BTreeMap<MetaIdentity, Vec<StoredValue>>, Self::Error>;

    /// Persist a classification, replacing any previous one for the identity
    fn save_meta_property(&mut self, property: &MetaProperty) -> Result<(), Self::Error>;

    /// All persisted classifications
    fn meta_properties(&self) -> Result<Vec<MetaProperty>, Self::Error>;
}

/// Trait for splitting a text block into sentences
pub trait SentenceTokenizer {
    /// Split text into ordered sentences
    fn sent_tokenize(&self, text: &str) -> Vec<String>;
}

/// Trait for sentence embedding models
///
/// Output must be order-preserving and 1:1 with the input.
pub trait EmbeddingModel {
    /// Error type for model operations
    type Error;

    /// Embed every text, in order
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, Self::Error>;

    /// Length of the vectors this model produces
    fn dimension(&self) -> usize;
}
