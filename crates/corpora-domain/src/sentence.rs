//! Sentence module - sentence-level records extracted from corpus files

use std::collections::{BTreeMap, BTreeSet};

/// Store-assigned sentence identifier
pub type SentenceId = i64;

/// A sentence produced by extraction, before the store assigns an id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedSentence {
    /// Sentence text
    pub text: String,

    /// Ordinal, within its file, of the text block the sentence was split from
    pub group_id: usize,

    /// Names of every TEXT label matched on the path to the source leaf
    pub text_categories: BTreeSet<String>,

    /// Aligned annotation tiers (transcript sources only)
    pub tiers: BTreeMap<String, String>,
}

impl ExtractedSentence {
    /// Create a sentence without tiers
    pub fn new(
        text: impl Into<String>,
        group_id: usize,
        text_categories: BTreeSet<String>,
    ) -> Self {
        Self {
            text: text.into(),
            group_id,
            text_categories,
            tiers: BTreeMap::new(),
        }
    }

    /// Attach an annotation tier
    pub fn with_tier(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tiers.insert(name.into(), value.into());
        self
    }
}

/// A persisted sentence
#[derive(Debug, Clone, PartialEq)]
pub struct Sentence {
    /// Store-assigned identifier
    pub id: SentenceId,

    /// Sentence text
    pub text: String,

    /// File the sentence came from
    pub file_path: String,

    /// Ordinal of the source text block within the file
    pub group_id: usize,

    /// Text categories of the sentence
    pub text_categories: BTreeSet<String>,

    /// Annotation tiers
    pub tiers: BTreeMap<String, String>,

    /// Embedding vector, once the embedding pass has run
    pub embedding: Option<Vec<f32>>,
}
