//! Query module - write payloads and compositional read filters

use crate::meta::MetaPropertyReference;
use crate::sentence::{ExtractedSentence, Sentence};
use std::collections::BTreeMap;

/// Everything written for one file, inside one transaction
#[derive(Debug, Clone, Default)]
pub struct FileRecord {
    /// Path of the source file
    pub file_path: String,

    /// Sentences in extraction order
    pub sentences: Vec<ExtractedSentence>,

    /// Metadata references for the file
    pub meta_refs: Vec<MetaPropertyReference>,

    /// Names of the configured subfolders containing the file
    pub subfolders: Vec<String>,
}

/// Condition a meta filter applies to the stored value
#[derive(Debug, Clone, PartialEq)]
pub enum MetaCondition {
    /// Value equals this text
    Equals(String),

    /// Value is one of these texts
    AnyOf(Vec<String>),

    /// Numeric value lies in `[min, max]`
    Range {
        /// Inclusive lower bound
        min: f64,
        /// Inclusive upper bound
        max: f64,
    },
}

/// Filter on one metadata property
#[derive(Debug, Clone, PartialEq)]
pub struct MetaFilter {
    /// META label name
    pub label_name: String,

    /// Property name
    pub property_name: String,

    /// Value condition
    pub condition: MetaCondition,
}

impl MetaFilter {
    /// Filter for an exact value
    pub fn equals(
        label_name: impl Into<String>,
        property_name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            label_name: label_name.into(),
            property_name: property_name.into(),
            condition: MetaCondition::Equals(value.into()),
        }
    }

    /// Filter for any of a list of values
    pub fn any_of<S: Into<String>>(
        label_name: impl Into<String>,
        property_name: impl Into<String>,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            label_name: label_name.into(),
            property_name: property_name.into(),
            condition: MetaCondition::AnyOf(values.into_iter().map(Into::into).collect()),
        }
    }

    /// Filter for a numeric range
    pub fn range(
        label_name: impl Into<String>,
        property_name: impl Into<String>,
        min: f64,
        max: f64,
    ) -> Self {
        Self {
            label_name: label_name.into(),
            property_name: property_name.into(),
            condition: MetaCondition::Range { min, max },
        }
    }
}

/// Query criteria for retrieving sentences
///
/// Every populated field narrows the result; fields are AND-ed together and
/// values within one list field are OR-ed. The default filter matches every
/// sentence.
#[derive(Debug, Clone, Default)]
pub struct QueryFilter {
    /// Keep sentences from files in any of these subfolders
    pub subfolders: Vec<String>,

    /// Keep sentences from any of these files
    pub file_paths: Vec<String>,

    /// Keep sentences tagged with any of these text categories
    pub text_categories: Vec<String>,

    /// Keep sentences whose file satisfies every meta filter
    pub meta_filters: Vec<MetaFilter>,

    /// Load embeddings into the returned sentences
    pub include_embeddings: bool,
}

impl QueryFilter {
    /// Filter that matches everything
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to subfolders
    pub fn in_subfolders<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.subfolders.extend(names.into_iter().map(Into::into));
        self
    }

    /// Restrict to files
    pub fn in_files<S: Into<String>>(mut self, paths: impl IntoIterator<Item = S>) -> Self {
        self.file_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Restrict to text categories
    pub fn with_categories<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.text_categories.extend(names.into_iter().map(Into::into));
        self
    }

    /// Add a meta filter
    pub fn with_meta(mut self, filter: MetaFilter) -> Self {
        self.meta_filters.push(filter);
        self
    }

    /// Load embeddings
    pub fn with_embeddings(mut self) -> Self {
        self.include_embeddings = true;
        self
    }
}

/// Result of a sentence query
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    /// Matching sentences, ordered by id
    pub sentences: Vec<Sentence>,

    /// Metadata of every file contributing at least one sentence
    pub meta_by_file: BTreeMap<String, Vec<MetaPropertyReference>>,
}

impl QueryResult {
    /// Number of matching sentences
    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    /// Whether nothing matched
    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }
}
