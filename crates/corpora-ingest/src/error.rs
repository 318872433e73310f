//! Error types for ingestion

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning a file into a document tree
#[derive(Error, Debug)]
pub enum DocumentError {
    /// File could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File bytes are not valid UTF-8
    #[error("Decode error: {0}")]
    Decode(#[from] std::string::FromUtf8Error),

    /// Malformed JSON
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed XML
    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),

    /// A line grammar pattern failed to compile
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// Extension has no document converter
    #[error("No support for extension {0:?} yet")]
    UnsupportedFormat(String),
}

/// Structural violations found while walking one document
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StructuralError {
    /// A document-level META label matched twice with different values
    #[error("Multiple instances of document-level label \"{label}\" found")]
    DuplicateMetaLabel {
        /// Label name
        label: String,
    },

    /// An attribute-mode META label produced the same attribute twice
    #[error("Multiple values for attribute \"{attribute}\" found for document-level meta label \"{label}\"")]
    DuplicateMetaAttribute {
        /// Label name
        label: String,
        /// Attribute name
        attribute: String,
    },

    /// A matched value is not a string, number or boolean
    #[error("Incompatible value for label \"{label}\": {found}")]
    IncompatibleValue {
        /// Label name
        label: String,
        /// Description of what was found
        found: String,
    },
}

/// Errors raised by the type inference pass for one property identity
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InferenceError {
    /// A stored value is not numeric, date-like or string
    #[error("Incompatible meta property value: {0}")]
    IncompatibleValue(String),

    /// The identity has no values
    #[error("No values to classify")]
    Empty,
}

/// Errors that can occur during ingestion
#[derive(Error, Debug)]
pub enum IngestError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Document conversion failed
    #[error("{source} in {}", .path.display())]
    Document {
        /// Offending file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: DocumentError,
    },

    /// Structural violation in a document
    #[error("{source} in {}", .path.display())]
    Structural {
        /// Offending file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: StructuralError,
    },

    /// Corpus store error
    #[error("Store error: {0}")]
    Store(String),

    /// Embedding model error
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Corpus traversal error
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// Background task failed to complete
    #[error("Task join error: {0}")]
    Join(String),
}

impl From<toml::de::Error> for IngestError {
    fn from(e: toml::de::Error) -> Self {
        IngestError::Config(format!("Failed to parse TOML: {}", e))
    }
}
