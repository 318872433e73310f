//! Meta module - per-file metadata references and their corpus-wide classification

use crate::document::Scalar;
use crate::label::MetaKind;
use std::collections::BTreeSet;

/// A raw metadata value attached to one file
#[derive(Debug, Clone, PartialEq)]
pub struct MetaPropertyReference {
    /// File the value belongs to
    pub file_path: String,

    /// Name of the META label that produced the value
    pub label_name: String,

    /// Property name: the label name, or the attribute name for attribute-mode labels
    pub property_name: String,

    /// The value as found in the document
    pub value: Scalar,
}

impl MetaPropertyReference {
    /// Create a reference
    pub fn new(
        file_path: impl Into<String>,
        label_name: impl Into<String>,
        property_name: impl Into<String>,
        value: impl Into<Scalar>,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            label_name: label_name.into(),
            property_name: property_name.into(),
            value: value.into(),
        }
    }

    /// The (label_name, property_name) identity this reference belongs to
    pub fn identity(&self) -> MetaIdentity {
        MetaIdentity::new(&self.label_name, &self.property_name)
    }
}

/// Corpus-wide identity of a metadata property
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MetaIdentity {
    /// META label name
    pub label_name: String,

    /// Property name
    pub property_name: String,
}

impl MetaIdentity {
    /// Create an identity
    pub fn new(label_name: impl Into<String>, property_name: impl Into<String>) -> Self {
        Self {
            label_name: label_name.into(),
            property_name: property_name.into(),
        }
    }
}

/// A metadata value as read back from the store
///
/// Values are written as text, so anything other than `Text` means the
/// store was modified outside ingestion.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
    /// Text value
    Text(String),

    /// Integer value
    Integer(i64),

    /// Real value
    Real(f64),

    /// SQL NULL
    Null,

    /// Binary value
    Blob(Vec<u8>),
}

/// Value summary of a classified property
#[derive(Debug, Clone, PartialEq)]
pub enum MetaSummary {
    /// Range over the numeric domain of the values
    Quantitative {
        /// Smallest value
        min: f64,
        /// Largest value
        max: f64,
    },

    /// Every distinct value, unconverted
    Categorical(BTreeSet<String>),
}

/// A metadata property classified over the whole corpus
#[derive(Debug, Clone, PartialEq)]
pub struct MetaProperty {
    /// Property identity
    pub identity: MetaIdentity,

    /// Classification and value summary
    pub summary: MetaSummary,
}

impl MetaProperty {
    /// The property's kind
    pub fn kind(&self) -> MetaKind {
        match self.summary {
            MetaSummary::Quantitative { .. } => MetaKind::Quantitative,
            MetaSummary::Categorical(_) => MetaKind::Categorical,
        }
    }
}
